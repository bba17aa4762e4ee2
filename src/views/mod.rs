// File: ./src/views/mod.rs
//! Headless view controllers.
//!
//! Each controller holds the state one screen would hold (the loaded
//! event, form input, running schedules) and reports outcomes through the
//! shared [`Notifier`] and [`Navigator`]. Front ends render the state and
//! forward user intents as method calls.
pub mod detail;
pub mod edit;
pub mod form;
pub mod list;
pub mod timer;

pub use detail::DetailView;
pub use edit::{EditState, EditView};
pub use form::{CreateEventForm, EventForm, FormError};
pub use list::EventListView;
pub use timer::TimerView;

use crate::client::{ApiError, EventService};
use crate::config::Config;
use crate::lifecycle::GuardError;
use crate::notify::Notifier;
use crate::routes::Navigator;
use crate::timer::{Clock, DEFAULT_TICK, SystemClock};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_POLL: Duration = Duration::from_secs(30);

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ViewError {
    /// The screen has nothing to show.
    #[error("{0}")]
    Load(ApiError),
    /// The screen keeps its previous state.
    #[error("{0}")]
    Action(ApiError),
    #[error(transparent)]
    Guard(#[from] GuardError),
    #[error(transparent)]
    Form(#[from] FormError),
}

impl ViewError {
    pub fn api(&self) -> Option<&ApiError> {
        match self {
            ViewError::Load(e) | ViewError::Action(e) => Some(e),
            _ => None,
        }
    }
}

/// Collaborators shared by every view.
pub struct ViewContext<S> {
    pub service: Arc<S>,
    pub notifier: Notifier,
    pub navigator: Navigator,
    pub clock: Arc<dyn Clock>,
    /// IANA zone sent with timezone-aware requests.
    pub timezone: String,
    pub tick: Duration,
    pub poll: Duration,
}

// Manual impl: `S` itself need not be Clone.
impl<S> Clone for ViewContext<S> {
    fn clone(&self) -> Self {
        Self {
            service: self.service.clone(),
            notifier: self.notifier.clone(),
            navigator: self.navigator.clone(),
            clock: self.clock.clone(),
            timezone: self.timezone.clone(),
            tick: self.tick,
            poll: self.poll,
        }
    }
}

impl<S: EventService> ViewContext<S> {
    pub fn new(
        service: Arc<S>,
        notifier: Notifier,
        navigator: Navigator,
        timezone: impl Into<String>,
    ) -> Self {
        Self {
            service,
            notifier,
            navigator,
            clock: Arc::new(SystemClock),
            timezone: timezone.into(),
            tick: DEFAULT_TICK,
            poll: DEFAULT_POLL,
        }
    }

    /// Takes tick and poll intervals from the configuration.
    pub fn configured(mut self, config: &Config) -> Self {
        self.tick = config.tick_interval();
        self.poll = config.status_poll_interval();
        self
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_intervals(mut self, tick: Duration, poll: Duration) -> Self {
        self.tick = tick;
        self.poll = poll;
        self
    }

    /// Publishes `err` to the user and hands it back for `?` chains.
    pub(crate) fn report(&self, err: ViewError) -> ViewError {
        match &err {
            ViewError::Guard(_) | ViewError::Form(_) => self.notifier.warning(err.to_string()),
            ViewError::Load(_) | ViewError::Action(_) => self.notifier.error(err.to_string()),
        };
        err
    }
}
