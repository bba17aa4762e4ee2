// File: ./src/views/timer.rs
//! Live timer screen for an ONGOING event.
//!
//! While active the view owns two schedules:
//!
//! - the [`ElapsedTimer`], recomputing `HH:MM:SS` every tick;
//! - a status poller reloading the event every `poll` interval.
//!
//! The poller is how the view notices that someone else stopped the event.
//! When a reload comes back with any status other than ONGOING it cancels
//! the elapsed schedule first and then navigates to the detail route, so no
//! tick fires for an event the user is no longer looking at.
use crate::client::EventService;
use crate::lifecycle::{self, EventAction, TimerGate};
use crate::model::{Event, EventId};
use crate::routes::Route;
use crate::timer::{ElapsedReading, ElapsedTimer, PeriodicTask};
use crate::views::{ViewContext, ViewError};
use std::ops::ControlFlow;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::watch;

pub struct TimerView<S> {
    ctx: ViewContext<S>,
    id: EventId,
    event: Arc<Mutex<Option<Event>>>,
    timer: ElapsedTimer,
    poller: PeriodicTask,
}

impl<S: EventService> TimerView<S> {
    pub fn new(ctx: ViewContext<S>, id: EventId) -> Self {
        let timer = ElapsedTimer::with_tick(ctx.clock.clone(), ctx.tick);
        Self {
            ctx,
            id,
            event: Arc::new(Mutex::new(None)),
            timer,
            poller: PeriodicTask::new("status-poll"),
        }
    }

    pub fn id(&self) -> EventId {
        self.id
    }

    /// Last copy of the event seen by the view or its poller.
    pub fn event(&self) -> Option<Event> {
        lock(&self.event).clone()
    }

    pub fn reading(&self) -> ElapsedReading {
        self.timer.current()
    }

    pub fn subscribe(&self) -> watch::Receiver<ElapsedReading> {
        self.timer.subscribe()
    }

    pub fn is_ticking(&self) -> bool {
        self.timer.is_active()
    }

    pub fn is_polling(&self) -> bool {
        self.poller.is_active()
    }

    /// Loads the event and, if it is ONGOING, starts both schedules.
    ///
    /// A load failure leaves everything stopped. Any other status sends the
    /// user to the detail route without starting anything.
    pub async fn activate(&mut self) -> Result<TimerGate, ViewError> {
        self.deactivate();

        let event = self
            .ctx
            .service
            .get_event(self.id, &self.ctx.timezone)
            .await
            .map_err(|e| self.ctx.report(ViewError::Load(e)))?;
        let (status, start) = (event.status, event.start_date);
        *lock(&self.event) = Some(event);

        let gate = lifecycle::timer_gate(self.id, status);
        match &gate {
            TimerGate::Run => {
                self.timer.activate(start);
                self.start_polling();
                log::info!("Timer running for event {} since {}", self.id, start);
            }
            TimerGate::Leave(route) => {
                log::info!("Event {} is {}, leaving timer", self.id, status);
                self.ctx.navigator.go(*route);
            }
        }
        Ok(gate)
    }

    fn start_polling(&self) {
        let id = self.id;
        let service = self.ctx.service.clone();
        let timezone = self.ctx.timezone.clone();
        let navigator = self.ctx.navigator.clone();
        let snapshot = self.event.clone();
        let timer = self.timer.handle();

        self.poller.start_after(self.ctx.poll, self.ctx.poll, move || {
            let service = service.clone();
            let timezone = timezone.clone();
            let navigator = navigator.clone();
            let snapshot = snapshot.clone();
            let timer = timer.clone();
            async move {
                let event = match service.get_event(id, &timezone).await {
                    Ok(event) => event,
                    Err(e) => {
                        log::warn!("Status poll for event {} failed: {}", id, e);
                        return ControlFlow::Continue(());
                    }
                };
                let (status, start) = (event.status, event.start_date);
                *lock(&snapshot) = Some(event);

                match lifecycle::timer_gate(id, status) {
                    TimerGate::Run => {
                        // Restarts only if the server moved the start instant.
                        timer.activate(start);
                        ControlFlow::Continue(())
                    }
                    TimerGate::Leave(route) => {
                        log::info!("Event {} is now {}, leaving timer", id, status);
                        timer.deactivate();
                        navigator.go(route);
                        ControlFlow::Break(())
                    }
                }
            }
        });
    }

    /// Stops the event on the server. On success both schedules end and the
    /// view moves to the detail route; on failure the elapsed display keeps
    /// running and polling resumes.
    pub async fn stop(&mut self) -> Result<Event, ViewError> {
        let current = self.event();
        lifecycle::check(current.as_ref(), EventAction::Stop)
            .map_err(|e| self.ctx.report(e.into()))?;

        // A poll seeing COMPLETED mid-request would navigate a second time.
        let was_polling = self.poller.stop();
        let stopped = match self.ctx.service.stop_event(self.id, &self.ctx.timezone).await {
            Ok(event) => event,
            Err(e) => {
                if was_polling {
                    self.start_polling();
                }
                return Err(self.ctx.report(ViewError::Action(e)));
            }
        };

        log::info!("Event {} stopped", self.id);
        *lock(&self.event) = Some(stopped.clone());
        self.deactivate();
        self.ctx.notifier.success("Event stopped successfully!");
        self.ctx.navigator.go(Route::EventDetail(self.id));
        Ok(stopped)
    }

    /// Cancels both schedules. Safe to call repeatedly.
    pub fn deactivate(&self) {
        self.poller.stop();
        self.timer.deactivate();
    }
}

impl<S> Drop for TimerView<S> {
    fn drop(&mut self) {
        self.poller.stop();
    }
}

fn lock(event: &Mutex<Option<Event>>) -> MutexGuard<'_, Option<Event>> {
    event.lock().unwrap_or_else(PoisonError::into_inner)
}
