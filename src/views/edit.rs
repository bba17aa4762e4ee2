// File: ./src/views/edit.rs
use crate::client::EventService;
use crate::lifecycle::{self, EditGate, EventAction};
use crate::model::{Event, EventId};
use crate::routes::Route;
use crate::timezone;
use crate::views::form::{EventForm, FormError};
use crate::views::{ViewContext, ViewError};

/// What the edit screen shows after loading.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditState {
    Form(EventForm),
    /// The event is past editing; show `message` and a link to `details`.
    Blocked { message: String, details: Route },
}

pub struct EditView<S> {
    ctx: ViewContext<S>,
    id: EventId,
    event: Option<Event>,
}

impl<S: EventService> EditView<S> {
    pub fn new(ctx: ViewContext<S>, id: EventId) -> Self {
        Self {
            ctx,
            id,
            event: None,
        }
    }

    pub fn event(&self) -> Option<&Event> {
        self.event.as_ref()
    }

    /// Loads the event and decides between the form and the blocked notice.
    pub async fn open(&mut self) -> Result<EditState, ViewError> {
        let event = self
            .ctx
            .service
            .get_event(self.id, &self.ctx.timezone)
            .await
            .map_err(|e| self.ctx.report(ViewError::Load(e)))?;
        let event = self.event.insert(event);

        match lifecycle::edit_gate(event) {
            EditGate::Allowed => {
                // Prefer the zone the event was saved in.
                let saved = event
                    .timezone
                    .as_deref()
                    .and_then(|tz| timezone::parse_zone(tz).ok());
                let zone = match saved {
                    Some(zone) => zone,
                    None => timezone::parse_zone(&self.ctx.timezone)
                        .map_err(|e| self.ctx.report(FormError::from(e).into()))?,
                };
                Ok(EditState::Form(EventForm::from_event(event, zone)))
            }
            EditGate::Blocked { message, details } => {
                self.ctx.notifier.warning(message.clone());
                Ok(EditState::Blocked { message, details })
            }
        }
    }

    /// Validates and saves the form, then returns to the event list.
    pub async fn submit(&mut self, form: &EventForm) -> Result<Event, ViewError> {
        lifecycle::check(self.event.as_ref(), EventAction::Edit)
            .map_err(|e| self.ctx.report(e.into()))?;
        let valid = form
            .validate(&self.ctx.timezone)
            .map_err(|e| self.ctx.report(e.into()))?;
        let zone = valid.zone.name().to_string();

        let updated = self
            .ctx
            .service
            .update_event(self.id, &valid.into_update(), &zone)
            .await
            .map_err(|e| self.ctx.report(ViewError::Action(e)))?;

        log::info!("Event {} updated", self.id);
        self.event = Some(updated.clone());
        self.ctx.notifier.success("Event updated successfully!");
        self.ctx.navigator.go(Route::Events);
        Ok(updated)
    }
}
