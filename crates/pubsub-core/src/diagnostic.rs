//! Recovered error conditions and the sinks that receive them.
//!
//! The registry never surfaces failures to the caller of `subscribe`,
//! `unsubscribe` or `publish`. Instead it builds a [`Diagnostic`] and hands it
//! to the [`DiagnosticSink`] it was constructed with.

use parking_lot::Mutex;
use std::sync::Arc;
use thiserror::Error;

/// Registry operation a diagnostic was raised from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Subscribe,
    Unsubscribe,
}

impl Operation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::Subscribe => "subscribe",
            Operation::Unsubscribe => "unsubscribe",
        }
    }
}

impl std::fmt::Display for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Diagnostic {
    #[error("attempt to {operation} with an empty event name; known events: {known_events:?}")]
    InvalidEventName {
        operation: Operation,
        known_events: Vec<String>,
    },

    #[error("attempt to unsubscribe from unknown event '{event}'; known events: {known_events:?}")]
    UnknownEvent {
        event: String,
        known_events: Vec<String>,
    },

    #[error("callback #{position} of '{event}' (observer {observer}) failed: {message}")]
    CallbackFailure {
        event: String,
        /// `Debug` rendering of the observer identity.
        observer: String,
        /// Zero-based dispatch position within the event's sequence.
        position: usize,
        message: String,
    },
}

impl Diagnostic {
    pub fn event(&self) -> Option<&str> {
        match self {
            Diagnostic::InvalidEventName { .. } => None,
            Diagnostic::UnknownEvent { event, .. } | Diagnostic::CallbackFailure { event, .. } => {
                Some(event)
            }
        }
    }
}

pub trait DiagnosticSink: Send + Sync {
    fn report(&self, diagnostic: &Diagnostic);
}

/// Default sink: emits every diagnostic through `tracing`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl DiagnosticSink for TracingSink {
    fn report(&self, diagnostic: &Diagnostic) {
        match diagnostic {
            Diagnostic::InvalidEventName {
                operation,
                known_events,
            } => {
                tracing::error!(
                    operation = operation.as_str(),
                    known_events = ?known_events,
                    "{}",
                    diagnostic
                );
            }
            Diagnostic::UnknownEvent {
                event,
                known_events,
            } => {
                tracing::error!(event = %event, known_events = ?known_events, "{}", diagnostic);
            }
            Diagnostic::CallbackFailure {
                event,
                observer,
                position,
                ..
            } => {
                tracing::warn!(
                    event = %event,
                    observer = %observer,
                    position = *position,
                    "{}",
                    diagnostic
                );
            }
        }
    }
}

/// Sink that keeps every diagnostic in memory.
///
/// Clones share the same buffer, so a test can hand one clone to the
/// registry and inspect the other.
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    entries: Arc<Mutex<Vec<Diagnostic>>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> Vec<Diagnostic> {
        self.entries.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }

    pub fn clear(&self) {
        self.entries.lock().clear();
    }
}

impl DiagnosticSink for MemorySink {
    fn report(&self, diagnostic: &Diagnostic) {
        self.entries.lock().push(diagnostic.clone());
    }
}
