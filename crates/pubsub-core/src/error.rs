use thiserror::Error;

use crate::diagnostic::{Diagnostic, Operation};

/// Errors returned by the strict `try_*` registry operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("event name must not be empty")]
    EmptyEventName {
        operation: Operation,
        known_events: Vec<String>,
    },

    #[error("unknown event: {event}")]
    UnknownEvent {
        event: String,
        known_events: Vec<String>,
    },
}

impl RegistryError {
    pub fn known_events(&self) -> &[String] {
        match self {
            RegistryError::EmptyEventName { known_events, .. }
            | RegistryError::UnknownEvent { known_events, .. } => known_events,
        }
    }
}

impl From<RegistryError> for Diagnostic {
    fn from(err: RegistryError) -> Self {
        match err {
            RegistryError::EmptyEventName {
                operation,
                known_events,
            } => Diagnostic::InvalidEventName {
                operation,
                known_events,
            },
            RegistryError::UnknownEvent {
                event,
                known_events,
            } => Diagnostic::UnknownEvent {
                event,
                known_events,
            },
        }
    }
}

pub type Result<T> = std::result::Result<T, RegistryError>;
