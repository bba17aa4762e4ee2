// File: ./src/lifecycle.rs
//! Status-driven permissions for event actions.
//!
//! The server owns every transition. This module only answers "may the
//! user do X with this event right now", and what to show instead when
//! the answer is no.
use crate::model::{Event, EventId, EventStatus};
use crate::routes::Route;
use strum::{Display, EnumIter};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter)]
pub enum EventAction {
    #[strum(to_string = "edit")]
    Edit,
    #[strum(to_string = "start")]
    Start,
    #[strum(to_string = "stop")]
    Stop,
    #[strum(to_string = "view the timer of")]
    ViewTimer,
}

/// One row of the permission table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Permissions {
    pub editable: bool,
    pub can_start: bool,
    pub can_stop: bool,
    pub can_view_timer: bool,
}

impl Permissions {
    pub const NONE: Permissions = Permissions {
        editable: false,
        can_start: false,
        can_stop: false,
        can_view_timer: false,
    };

    pub fn for_status(status: EventStatus) -> Self {
        match status {
            EventStatus::Draft | EventStatus::Published => Permissions {
                editable: true,
                can_start: true,
                can_stop: false,
                can_view_timer: false,
            },
            EventStatus::Ongoing => Permissions {
                editable: false,
                can_start: false,
                can_stop: true,
                can_view_timer: true,
            },
            EventStatus::Completed | EventStatus::Cancelled => Self::NONE,
        }
    }

    /// Nothing is permitted until an event has loaded.
    pub fn for_event(event: Option<&Event>) -> Self {
        event.map_or(Self::NONE, |e| Self::for_status(e.status))
    }

    pub fn allows(&self, action: EventAction) -> bool {
        match action {
            EventAction::Edit => self.editable,
            EventAction::Start => self.can_start,
            EventAction::Stop => self.can_stop,
            EventAction::ViewTimer => self.can_view_timer,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GuardError {
    #[error("Event is still loading")]
    NotLoaded,
    #[error("Cannot {action} event with status: {status}")]
    NotPermitted {
        action: EventAction,
        status: EventStatus,
    },
}

/// Fails unless `action` is valid for the (possibly not yet loaded) event.
pub fn check(event: Option<&Event>, action: EventAction) -> Result<(), GuardError> {
    let event = event.ok_or(GuardError::NotLoaded)?;
    if Permissions::for_status(event.status).allows(action) {
        Ok(())
    } else {
        Err(GuardError::NotPermitted {
            action,
            status: event.status,
        })
    }
}

/// What an edit attempt resolves to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditGate {
    Allowed,
    /// Show `message` and offer `details` instead of the form.
    Blocked { message: String, details: Route },
}

pub fn edit_gate(event: &Event) -> EditGate {
    if Permissions::for_status(event.status).editable {
        EditGate::Allowed
    } else {
        EditGate::Blocked {
            message: format!(
                "Cannot edit event with status: {}. Only DRAFT and PUBLISHED events can be edited.",
                event.status
            ),
            details: Route::EventDetail(event.id),
        }
    }
}

/// What the timer view does with a freshly (re)loaded event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TimerGate {
    Run,
    /// Someone else moved the event out of ONGOING.
    Leave(Route),
}

pub fn timer_gate(event_id: EventId, status: EventStatus) -> TimerGate {
    if Permissions::for_status(status).can_view_timer {
        TimerGate::Run
    } else {
        TimerGate::Leave(Route::EventDetail(event_id))
    }
}
