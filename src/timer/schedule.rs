// File: ./src/timer/schedule.rs
//! Explicitly owned periodic work.
//!
//! A `PeriodicTask` runs at most one schedule at a time: starting it again
//! aborts the previous schedule before spawning the new one, and `stop`
//! aborts synchronously. Clones share the same slot, so any holder can
//! cancel the schedule.
use std::future::Future;
use std::ops::ControlFlow;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::task::JoinHandle;
use tokio::time::{self, Duration, Instant, MissedTickBehavior};

#[derive(Clone, Debug)]
pub struct PeriodicTask {
    name: &'static str,
    slot: Arc<Mutex<Option<JoinHandle<()>>>>,
}

impl PeriodicTask {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            slot: Arc::new(Mutex::new(None)),
        }
    }

    /// Runs `job` immediately and then every `period`.
    pub fn start<F, Fut>(&self, period: Duration, job: F)
    where
        F: FnMut() -> Fut + Send + 'static,
        Fut: Future<Output = ControlFlow<()>> + Send + 'static,
    {
        self.start_after(Duration::ZERO, period, job);
    }

    /// Runs `job` after `delay`, then every `period`, until it breaks or the
    /// task is stopped.
    pub fn start_after<F, Fut>(&self, delay: Duration, period: Duration, mut job: F)
    where
        F: FnMut() -> Fut + Send + 'static,
        Fut: Future<Output = ControlFlow<()>> + Send + 'static,
    {
        let mut slot = self.lock();
        if let Some(previous) = slot.take() {
            previous.abort();
            log::debug!("{}: replaced running schedule", self.name);
        }

        let name = self.name;
        let handle = tokio::spawn(async move {
            let mut interval = time::interval_at(Instant::now() + delay, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                interval.tick().await;
                if job().await.is_break() {
                    log::debug!("{}: schedule finished", name);
                    break;
                }
            }
        });
        *slot = Some(handle);
        log::debug!("{}: schedule started ({:?} period)", self.name, period);
    }

    /// Cancels the schedule. Returns whether one was running.
    ///
    /// Aborting does not wait: on a multi-thread runtime a job already
    /// executing may still finish its current run. Jobs that publish state
    /// check their own generation before doing so (see `ElapsedTimer`).
    pub fn stop(&self) -> bool {
        match self.lock().take() {
            Some(handle) => {
                let was_running = !handle.is_finished();
                handle.abort();
                if was_running {
                    log::debug!("{}: schedule cancelled", self.name);
                }
                was_running
            }
            None => false,
        }
    }

    pub fn is_active(&self) -> bool {
        self.lock().as_ref().is_some_and(|h| !h.is_finished())
    }

    fn lock(&self) -> MutexGuard<'_, Option<JoinHandle<()>>> {
        self.slot.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
