// File: ./src/timer/clock.rs
// Wall-clock sources for elapsed-time computation.
use chrono::{DateTime, TimeDelta, Utc};
use std::fmt::Debug;
use tokio::time::Instant;

pub trait Clock: Send + Sync + Debug {
    fn now(&self) -> DateTime<Utc>;
}

/// The real system clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A wall clock that advances with tokio's clock instead of the OS one.
///
/// Anchored to `origin` at construction; under `tokio::time::pause` it moves
/// only when the runtime's time does, which keeps timer tests deterministic.
#[derive(Debug, Clone, Copy)]
pub struct RuntimeClock {
    origin: DateTime<Utc>,
    anchor: Instant,
}

impl RuntimeClock {
    pub fn starting_at(origin: DateTime<Utc>) -> Self {
        Self {
            origin,
            anchor: Instant::now(),
        }
    }
}

impl Clock for RuntimeClock {
    fn now(&self) -> DateTime<Utc> {
        let passed = TimeDelta::from_std(self.anchor.elapsed()).unwrap_or(TimeDelta::MAX);
        self.origin
            .checked_add_signed(passed)
            .unwrap_or(DateTime::<Utc>::MAX_UTC)
    }
}
