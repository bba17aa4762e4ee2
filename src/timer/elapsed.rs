// File: ./src/timer/elapsed.rs
//! Live `HH:MM:SS` display of the time passed since a fixed start instant.
use crate::timer::clock::Clock;
use crate::timer::format::{elapsed_ms, format_elapsed};
use crate::timer::schedule::PeriodicTask;
use chrono::{DateTime, Utc};
use std::ops::ControlFlow;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::watch;
use tokio::time::Duration;

pub const DEFAULT_TICK: Duration = Duration::from_millis(1000);

/// One recomputation of the display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElapsedReading {
    pub elapsed_ms: u64,
    pub text: String,
}

impl ElapsedReading {
    pub fn at(start: DateTime<Utc>, now: DateTime<Utc>) -> Self {
        let elapsed_ms = elapsed_ms(start, now);
        Self {
            elapsed_ms,
            text: format_elapsed(elapsed_ms),
        }
    }
}

impl Default for ElapsedReading {
    fn default() -> Self {
        Self {
            elapsed_ms: 0,
            text: format_elapsed(0),
        }
    }
}

#[derive(Debug, Default)]
struct Slot {
    start: Option<DateTime<Utc>>,
    // Bumped on every (de)activation; a tick only publishes for its own.
    generation: u64,
}

#[derive(Debug)]
struct Shared {
    clock: Arc<dyn Clock>,
    tick: Duration,
    task: PeriodicTask,
    slot: Arc<Mutex<Slot>>,
    tx: Arc<watch::Sender<ElapsedReading>>,
}

fn lock(slot: &Mutex<Slot>) -> MutexGuard<'_, Slot> {
    slot.lock().unwrap_or_else(PoisonError::into_inner)
}

impl Shared {
    fn activate(&self, start: DateTime<Utc>) {
        let mut slot = lock(&self.slot);
        if slot.start == Some(start) && self.task.is_active() {
            return;
        }
        // Old schedule goes first so two never overlap.
        self.task.stop();
        slot.start = Some(start);
        slot.generation += 1;
        let generation = slot.generation;

        self.tx.send_replace(ElapsedReading::at(start, self.clock.now()));

        let clock = self.clock.clone();
        let tx = self.tx.clone();
        let shared_slot = self.slot.clone();
        self.task.start_after(self.tick, self.tick, move || {
            // A tick already running elsewhere when the schedule is
            // aborted finds a newer generation and publishes nothing.
            let slot = lock(&shared_slot);
            if slot.generation == generation {
                tx.send_replace(ElapsedReading::at(start, clock.now()));
            }
            std::future::ready(ControlFlow::Continue(()))
        });
    }

    fn deactivate(&self) {
        let mut slot = lock(&self.slot);
        self.task.stop();
        slot.start = None;
        slot.generation += 1;
    }
}

/// Owns the 1-second recomputation schedule. Dropping it cancels the
/// schedule; use [`ElapsedTimer::handle`] to control it from other tasks.
#[derive(Debug)]
pub struct ElapsedTimer {
    shared: Arc<Shared>,
}

/// Non-owning control over an [`ElapsedTimer`].
#[derive(Debug, Clone)]
pub struct TimerHandle {
    shared: Arc<Shared>,
}

impl ElapsedTimer {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self::with_tick(clock, DEFAULT_TICK)
    }

    pub fn with_tick(clock: Arc<dyn Clock>, tick: Duration) -> Self {
        let (tx, _) = watch::channel(ElapsedReading::default());
        Self {
            shared: Arc::new(Shared {
                clock,
                tick,
                task: PeriodicTask::new("elapsed-timer"),
                slot: Arc::new(Mutex::new(Slot::default())),
                tx: Arc::new(tx),
            }),
        }
    }

    /// Computes the display now and every tick from here on. Calling it
    /// again with a different start restarts the schedule; with the same
    /// start while running it is a no-op.
    pub fn activate(&self, start: DateTime<Utc>) {
        self.shared.activate(start);
    }

    pub fn deactivate(&self) {
        self.shared.deactivate();
    }

    pub fn is_active(&self) -> bool {
        self.shared.task.is_active()
    }

    pub fn start_instant(&self) -> Option<DateTime<Utc>> {
        lock(&self.shared.slot).start
    }

    pub fn subscribe(&self) -> watch::Receiver<ElapsedReading> {
        self.shared.tx.subscribe()
    }

    pub fn current(&self) -> ElapsedReading {
        self.shared.tx.borrow().clone()
    }

    pub fn handle(&self) -> TimerHandle {
        TimerHandle {
            shared: self.shared.clone(),
        }
    }
}

impl Drop for ElapsedTimer {
    fn drop(&mut self) {
        self.shared.deactivate();
    }
}

impl TimerHandle {
    pub fn activate(&self, start: DateTime<Utc>) {
        self.shared.activate(start);
    }

    pub fn deactivate(&self) {
        self.shared.deactivate();
    }

    pub fn is_active(&self) -> bool {
        self.shared.task.is_active()
    }
}
