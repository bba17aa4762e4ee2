// File: tests/common/mod.rs
// Scripted event backend and view harness shared by the view tests.
#![allow(dead_code)]

use chrono::{DateTime, TimeZone, Utc};
use eventdesk::client::{ApiError, EventService};
use eventdesk::model::{
    CreateEventRequest, Event, EventFilter, EventId, EventStatus, Page, UpdateEventRequest,
};
use eventdesk::notify::{Notifier, Subscription};
use eventdesk::routes::{Navigator, Route};
use eventdesk::timer::RuntimeClock;
use eventdesk::views::ViewContext;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::mpsc::UnboundedReceiver;

pub fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 3, 1, 9, 0, 0).unwrap()
}

pub fn event(id: EventId, status: EventStatus, start: DateTime<Utc>) -> Event {
    Event {
        id,
        name: format!("Event {}", id),
        description: None,
        start_date: start,
        start_date_local: None,
        end_date: start + chrono::TimeDelta::hours(2),
        end_date_local: None,
        location: None,
        status,
        created_at: start - chrono::TimeDelta::days(1),
        updated_at: start,
        deleted_at: None,
        timezone: None,
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Get(EventId, String),
    Start(EventId, String),
    Stop(EventId, String),
    List(EventFilter),
    Create(CreateEventRequest, String),
    Update(EventId, UpdateEventRequest, String),
    Delete(EventId),
}

#[derive(Default)]
struct State {
    event: Option<Event>,
    get_failures: VecDeque<ApiError>,
    start_failure: Option<ApiError>,
    stop_failure: Option<ApiError>,
    stop_delay: Option<Duration>,
    calls: Vec<Call>,
}

/// In-memory backend holding a single event. Transitions behave like the
/// server's unless a failure is scripted.
#[derive(Default)]
pub struct FakeEvents {
    state: Mutex<State>,
}

impl FakeEvents {
    pub fn with(event: Event) -> Arc<Self> {
        let fake = Self::default();
        fake.state.lock().unwrap().event = Some(event);
        Arc::new(fake)
    }

    pub fn set_status(&self, status: EventStatus) {
        if let Some(e) = self.state.lock().unwrap().event.as_mut() {
            e.status = status;
        }
    }

    pub fn set_start(&self, start: DateTime<Utc>) {
        if let Some(e) = self.state.lock().unwrap().event.as_mut() {
            e.start_date = start;
        }
    }

    pub fn fail_next_get(&self, err: ApiError) {
        self.state.lock().unwrap().get_failures.push_back(err);
    }

    pub fn fail_start(&self, err: ApiError) {
        self.state.lock().unwrap().start_failure = Some(err);
    }

    pub fn fail_stop(&self, err: ApiError) {
        self.state.lock().unwrap().stop_failure = Some(err);
    }

    /// Makes `stop_event` take `delay` before answering.
    pub fn slow_stop(&self, delay: Duration) {
        self.state.lock().unwrap().stop_delay = Some(delay);
    }

    pub fn calls(&self) -> Vec<Call> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn count(&self, pred: impl Fn(&Call) -> bool) -> usize {
        self.calls().iter().filter(|c| pred(c)).count()
    }

    fn current(state: &State, id: EventId) -> Result<Event, ApiError> {
        state
            .event
            .clone()
            .filter(|e| e.id == id)
            .ok_or_else(|| ApiError::NotFound {
                message: "Event not found".to_string(),
            })
    }

    fn transition(
        &self,
        id: EventId,
        failure: fn(&mut State) -> Option<ApiError>,
        to: EventStatus,
    ) -> Result<Event, ApiError> {
        let mut state = self.state.lock().unwrap();
        if let Some(err) = failure(&mut state) {
            return Err(err);
        }
        Self::current(&state, id)?;
        let event = state.event.as_mut().unwrap();
        event.status = to;
        Ok(event.clone())
    }
}

impl EventService for FakeEvents {
    async fn get_event(&self, id: EventId, timezone: &str) -> Result<Event, ApiError> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(Call::Get(id, timezone.to_string()));
        if let Some(err) = state.get_failures.pop_front() {
            return Err(err);
        }
        Self::current(&state, id)
    }

    async fn start_event(&self, id: EventId, timezone: &str) -> Result<Event, ApiError> {
        self.state
            .lock()
            .unwrap()
            .calls
            .push(Call::Start(id, timezone.to_string()));
        self.transition(id, |s| s.start_failure.take(), EventStatus::Ongoing)
    }

    async fn stop_event(&self, id: EventId, timezone: &str) -> Result<Event, ApiError> {
        let delay = {
            let mut state = self.state.lock().unwrap();
            state.calls.push(Call::Stop(id, timezone.to_string()));
            state.stop_delay
        };
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        self.transition(id, |s| s.stop_failure.take(), EventStatus::Completed)
    }

    async fn list_events(&self, filter: &EventFilter) -> Result<Page<Event>, ApiError> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(Call::List(filter.clone()));
        let data: Vec<Event> = state.event.clone().into_iter().collect();
        Ok(Page {
            total: data.len() as u64,
            data,
            page: filter.page.unwrap_or(1),
            limit: filter.limit.unwrap_or(10),
            total_pages: 1,
        })
    }

    async fn create_event(
        &self,
        data: &CreateEventRequest,
        timezone: &str,
    ) -> Result<Event, ApiError> {
        let mut state = self.state.lock().unwrap();
        state
            .calls
            .push(Call::Create(data.clone(), timezone.to_string()));
        let mut created = event(100, EventStatus::Draft, data.start_date);
        created.name = data.name.clone();
        created.end_date = data.end_date;
        state.event = Some(created.clone());
        Ok(created)
    }

    async fn update_event(
        &self,
        id: EventId,
        data: &UpdateEventRequest,
        timezone: &str,
    ) -> Result<Event, ApiError> {
        let mut state = self.state.lock().unwrap();
        state
            .calls
            .push(Call::Update(id, data.clone(), timezone.to_string()));
        let mut updated = Self::current(&state, id)?;
        if let Some(name) = &data.name {
            updated.name = name.clone();
        }
        if let Some(start) = data.start_date {
            updated.start_date = start;
        }
        if let Some(end) = data.end_date {
            updated.end_date = end;
        }
        state.event = Some(updated.clone());
        Ok(updated)
    }

    async fn delete_event(&self, id: EventId) -> Result<(), ApiError> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(Call::Delete(id));
        Self::current(&state, id)?;
        state.event = None;
        Ok(())
    }
}

/// Everything a view test observes: notifications and navigation.
pub struct Harness {
    pub ctx: ViewContext<FakeEvents>,
    pub toasts: Subscription,
    pub routes: UnboundedReceiver<Route>,
}

impl Harness {
    /// Views run in `timezone` with a clock that starts at `now` and moves
    /// with tokio time; 1 s ticks and 30 s polls.
    pub fn new(fake: Arc<FakeEvents>, timezone: &str, now: DateTime<Utc>) -> Self {
        let notifier = Notifier::new();
        let toasts = notifier.subscribe();
        let (navigator, routes) = Navigator::channel();
        let ctx = ViewContext::new(fake, notifier, navigator, timezone)
            .with_clock(Arc::new(RuntimeClock::starting_at(now)))
            .with_intervals(Duration::from_secs(1), Duration::from_secs(30));
        Self {
            ctx,
            toasts,
            routes,
        }
    }

    pub fn messages(&mut self) -> Vec<String> {
        self.toasts.drain().into_iter().map(|n| n.message).collect()
    }

    pub fn next_route(&mut self) -> Option<Route> {
        self.routes.try_recv().ok()
    }
}
