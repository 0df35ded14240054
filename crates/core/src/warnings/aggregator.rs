use std::sync::{Mutex, MutexGuard};

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Trait for receiving human-readable messages about partial failures.
///
/// # Design Rules
///
/// - Calls must be fast and must not block on I/O
/// - Recording a message never fails and never affects the caller
pub trait MessageSink: Send + Sync {
    /// Record a warning about a skipped record.
    fn warn(&self, message: String);

    /// Record an error that the user should see.
    fn error(&self, message: String);
}

/// One recorded message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Message {
    pub text: String,
    pub created_at: DateTime<Utc>,
}

/// In-memory [`MessageSink`] drained once per processing cycle.
///
/// Messages stay queued until consumed: nothing expires and nothing is
/// dropped between cycles. Order matches the order of the calls.
#[derive(Debug, Default)]
pub struct MessageAggregator {
    warnings: Mutex<Vec<Message>>,
    errors: Mutex<Vec<Message>>,
}

impl MessageAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return and clear the queued warnings.
    pub fn consume_warnings(&self) -> Vec<String> {
        texts(drain(&self.warnings))
    }

    /// Return and clear the queued errors.
    pub fn consume_errors(&self) -> Vec<String> {
        texts(drain(&self.errors))
    }

    /// Like [`consume_warnings`](Self::consume_warnings), keeping timestamps.
    pub fn consume_warning_messages(&self) -> Vec<Message> {
        drain(&self.warnings)
    }

    /// Like [`consume_errors`](Self::consume_errors), keeping timestamps.
    pub fn consume_error_messages(&self) -> Vec<Message> {
        drain(&self.errors)
    }

    pub fn pending_warnings(&self) -> usize {
        lock(&self.warnings).len()
    }

    pub fn pending_errors(&self) -> usize {
        lock(&self.errors).len()
    }
}

impl MessageSink for MessageAggregator {
    fn warn(&self, message: String) {
        log::warn!("{}", message);
        push(&self.warnings, message);
    }

    fn error(&self, message: String) {
        log::error!("{}", message);
        push(&self.errors, message);
    }
}

// Poisoned locks are recovered: push and take never leave the Vec half-updated.
fn lock(queue: &Mutex<Vec<Message>>) -> MutexGuard<'_, Vec<Message>> {
    queue.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

fn push(queue: &Mutex<Vec<Message>>, text: String) {
    lock(queue).push(Message {
        text,
        created_at: Utc::now(),
    });
}

fn drain(queue: &Mutex<Vec<Message>>) -> Vec<Message> {
    std::mem::take(&mut *lock(queue))
}

fn texts(messages: Vec<Message>) -> Vec<String> {
    messages.into_iter().map(|m| m.text).collect()
}
