// File: ./src/views/detail.rs
use crate::client::EventService;
use crate::lifecycle::{self, EventAction, Permissions};
use crate::model::{Event, EventId};
use crate::routes::Route;
use crate::views::{ViewContext, ViewError};

/// Single-event screen: shows the event and offers the actions its status allows.
pub struct DetailView<S> {
    ctx: ViewContext<S>,
    id: EventId,
    event: Option<Event>,
}

impl<S: EventService> DetailView<S> {
    pub fn new(ctx: ViewContext<S>, id: EventId) -> Self {
        Self {
            ctx,
            id,
            event: None,
        }
    }

    pub fn id(&self) -> EventId {
        self.id
    }

    pub fn event(&self) -> Option<&Event> {
        self.event.as_ref()
    }

    pub fn permissions(&self) -> Permissions {
        Permissions::for_event(self.event.as_ref())
    }

    /// Fetches the event in the view's timezone. On failure the previous
    /// copy (if any) is kept.
    pub async fn load(&mut self) -> Result<&Event, ViewError> {
        let event = self
            .ctx
            .service
            .get_event(self.id, &self.ctx.timezone)
            .await
            .map_err(|e| self.ctx.report(ViewError::Load(e)))?;
        Ok(self.event.insert(event))
    }

    /// Starts the event and moves on to its timer.
    pub async fn start(&mut self) -> Result<(), ViewError> {
        lifecycle::check(self.event.as_ref(), EventAction::Start)
            .map_err(|e| self.ctx.report(e.into()))?;

        let started = self
            .ctx
            .service
            .start_event(self.id, &self.ctx.timezone)
            .await
            .map_err(|e| self.ctx.report(ViewError::Action(e)))?;

        log::info!("Event {} started", self.id);
        self.event = Some(started);
        self.ctx.notifier.success("Event started successfully!");
        self.ctx.navigator.go(Route::EventTimer(self.id));
        Ok(())
    }

    pub fn view_timer(&self) -> Result<(), ViewError> {
        self.guarded_go(EventAction::ViewTimer, Route::EventTimer(self.id))
    }

    pub fn edit(&self) -> Result<(), ViewError> {
        self.guarded_go(EventAction::Edit, Route::EventEdit(self.id))
    }

    fn guarded_go(&self, action: EventAction, route: Route) -> Result<(), ViewError> {
        lifecycle::check(self.event.as_ref(), action).map_err(|e| self.ctx.report(e.into()))?;
        self.ctx.navigator.go(route);
        Ok(())
    }
}
