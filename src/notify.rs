// File: ./src/notify.rs
//! Transient user-facing notifications ("toasts").
//!
//! A single `Notifier` is created by the application and handed to every
//! view. Front ends subscribe for as long as they display notifications;
//! the `Subscription` unregisters itself on drop.
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use tokio::sync::mpsc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Success,
    Info,
    Warning,
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Success => write!(f, "ok"),
            Severity::Info => write!(f, "info"),
            Severity::Warning => write!(f, "warning"),
            Severity::Error => write!(f, "error"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub message: String,
    pub severity: Severity,
}

#[derive(Debug, Default)]
struct Registry {
    next_id: u64,
    listeners: HashMap<u64, mpsc::UnboundedSender<Notification>>,
}

#[derive(Debug, Clone, Default)]
pub struct Notifier {
    registry: Arc<Mutex<Registry>>,
}

impl Notifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&self) -> Subscription {
        let (tx, rx) = mpsc::unbounded_channel();
        let mut registry = self.lock();
        let id = registry.next_id;
        registry.next_id += 1;
        registry.listeners.insert(id, tx);
        Subscription {
            id,
            rx,
            registry: Arc::downgrade(&self.registry),
        }
    }

    /// Delivers to every live subscriber and returns how many received it.
    pub fn publish(&self, message: impl Into<String>, severity: Severity) -> usize {
        let notification = Notification {
            message: message.into(),
            severity,
        };
        log::debug!("notify [{}] {}", severity, notification.message);
        let mut registry = self.lock();
        registry
            .listeners
            .retain(|_, tx| tx.send(notification.clone()).is_ok());
        registry.listeners.len()
    }

    pub fn success(&self, message: impl Into<String>) -> usize {
        self.publish(message, Severity::Success)
    }

    pub fn info(&self, message: impl Into<String>) -> usize {
        self.publish(message, Severity::Info)
    }

    pub fn warning(&self, message: impl Into<String>) -> usize {
        self.publish(message, Severity::Warning)
    }

    pub fn error(&self, message: impl Into<String>) -> usize {
        self.publish(message, Severity::Error)
    }

    pub fn subscriber_count(&self) -> usize {
        self.lock().listeners.len()
    }

    fn lock(&self) -> MutexGuard<'_, Registry> {
        self.registry.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Receiving end of one subscription.
#[derive(Debug)]
pub struct Subscription {
    id: u64,
    rx: mpsc::UnboundedReceiver<Notification>,
    registry: Weak<Mutex<Registry>>,
}

impl Subscription {
    pub async fn recv(&mut self) -> Option<Notification> {
        self.rx.recv().await
    }

    pub fn try_recv(&mut self) -> Option<Notification> {
        self.rx.try_recv().ok()
    }

    /// Everything published so far and not yet read.
    pub fn drain(&mut self) -> Vec<Notification> {
        let mut out = Vec::new();
        while let Ok(n) = self.rx.try_recv() {
            out.push(n);
        }
        out
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(registry) = self.registry.upgrade() {
            registry
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .listeners
                .remove(&self.id);
        }
    }
}
