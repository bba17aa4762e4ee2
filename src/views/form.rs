// File: ./src/views/form.rs
// Event form input, its validation, and the create-event controller.
use crate::client::EventService;
use crate::model::{CreateEventRequest, Event, UpdateEventRequest};
use crate::routes::Route;
use crate::timezone::{self, LOCAL_INPUT_FORMAT, TimezoneError};
use crate::views::{ViewContext, ViewError};
use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormError {
    #[error("Please fill in all required fields")]
    MissingFields,
    #[error("Start date must be before end date")]
    DateOrder,
    #[error(transparent)]
    Timezone(#[from] TimezoneError),
}

/// Raw form input. Dates are wall-clock `YYYY-MM-DDTHH:MM` strings read in
/// `timezone` (or the view's zone when unset).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventForm {
    pub name: String,
    pub description: String,
    pub location: String,
    pub start_local: String,
    pub end_local: String,
    pub timezone: Option<String>,
}

/// A form that passed validation, with dates converted to UTC. Text
/// fields are trimmed; an empty one means "no value".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidEvent {
    pub name: String,
    pub description: String,
    pub location: String,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub zone: Tz,
}

fn non_empty(s: &str) -> Option<String> {
    let s = s.trim();
    (!s.is_empty()).then(|| s.to_string())
}

impl EventForm {
    /// Pre-fills the form from an event, rendering its dates in `zone`.
    pub fn from_event(event: &Event, zone: Tz) -> Self {
        let render = |instant| {
            timezone::utc_to_local(instant, zone)
                .format(LOCAL_INPUT_FORMAT)
                .to_string()
        };
        Self {
            name: event.name.clone(),
            description: event.description.clone().unwrap_or_default(),
            location: event.location.clone().unwrap_or_default(),
            start_local: render(event.start_date),
            end_local: render(event.end_date),
            timezone: Some(zone.name().to_string()),
        }
    }

    pub fn validate(&self, default_zone: &str) -> Result<ValidEvent, FormError> {
        if self.name.trim().is_empty()
            || self.start_local.trim().is_empty()
            || self.end_local.trim().is_empty()
        {
            return Err(FormError::MissingFields);
        }
        let zone = match self.timezone.as_deref().filter(|z| !z.trim().is_empty()) {
            Some(name) => timezone::parse_zone(name)?,
            None => timezone::parse_zone(default_zone)?,
        };
        let start_date = timezone::local_input_to_utc(&self.start_local, zone)?;
        let end_date = timezone::local_input_to_utc(&self.end_local, zone)?;
        if start_date >= end_date {
            return Err(FormError::DateOrder);
        }
        Ok(ValidEvent {
            name: self.name.trim().to_string(),
            description: self.description.trim().to_string(),
            location: self.location.trim().to_string(),
            start_date,
            end_date,
            zone,
        })
    }
}

impl ValidEvent {
    pub fn into_create(self) -> CreateEventRequest {
        CreateEventRequest {
            name: self.name,
            description: non_empty(&self.description),
            start_date: self.start_date,
            end_date: self.end_date,
            location: non_empty(&self.location),
        }
    }

    /// Sends every field, so an emptied description or location clears
    /// the stored value instead of keeping it.
    pub fn into_update(self) -> UpdateEventRequest {
        UpdateEventRequest {
            name: Some(self.name),
            description: Some(self.description),
            start_date: Some(self.start_date),
            end_date: Some(self.end_date),
            location: Some(self.location),
        }
    }
}

pub struct CreateEventForm<S> {
    ctx: ViewContext<S>,
}

impl<S: EventService> CreateEventForm<S> {
    pub fn new(ctx: ViewContext<S>) -> Self {
        Self { ctx }
    }

    /// Creates the event and returns to the list.
    pub async fn submit(&self, form: &EventForm) -> Result<Event, ViewError> {
        let valid = form
            .validate(&self.ctx.timezone)
            .map_err(|e| self.ctx.report(e.into()))?;
        let zone = valid.zone.name().to_string();
        let created = self
            .ctx
            .service
            .create_event(&valid.into_create(), &zone)
            .await
            .map_err(|e| self.ctx.report(ViewError::Action(e)))?;

        log::info!("Created event {} ({})", created.id, created.name);
        self.ctx.notifier.success("Event created successfully!");
        self.ctx.navigator.go(Route::Events);
        Ok(created)
    }
}
