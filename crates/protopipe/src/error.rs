//! Error types for schema registry and record pipeline operations.

use std::fmt;

/// Main error type for registry, produce, and consume operations.
///
/// Library code never terminates the process; every failure surfaces here and
/// the binary decides what to do with it.
#[derive(Debug, Clone, PartialEq)]
pub enum PipeError {
    /// Reading an input file (schema text, record JSON) failed.
    Io {
        context: String,
        reason: String,
    },
    /// Input bytes did not parse into an address book record.
    InvalidRecord {
        context: String,
        reason: String,
    },
    /// HTTP or broker connection error before any response was produced.
    Transport {
        context: String,
        reason: String,
    },
    /// The schema registry answered with a non-success status.
    Registry {
        status: u16,
        body: String,
    },
    /// The broker did not acknowledge a produced record in time.
    Delivery {
        topic: String,
        reason: String,
    },
    /// Consumption ended on a non-retryable fetch error.
    Fetch {
        reason: String,
    },
}

impl fmt::Display for PipeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PipeError::Io { context, reason } => {
                write!(f, "I/O error in {context}: {reason}")
            }
            PipeError::InvalidRecord { context, reason } => {
                write!(f, "Invalid record in {context}: {reason}")
            }
            PipeError::Transport { context, reason } => {
                write!(f, "Transport error in {context}: {reason}")
            }
            PipeError::Registry { status, body } => {
                write!(f, "Schema registry returned status {status}: {body}")
            }
            PipeError::Delivery { topic, reason } => {
                write!(f, "Delivery to topic '{topic}' failed: {reason}")
            }
            PipeError::Fetch { reason } => {
                write!(f, "Fetch failed: {reason}")
            }
        }
    }
}

impl std::error::Error for PipeError {}

impl PipeError {
    /// Errors caused by the caller's input rather than the environment.
    pub fn is_invalid_input(&self) -> bool {
        matches!(
            self,
            PipeError::Io { .. } | PipeError::InvalidRecord { .. }
        )
    }

    /// Errors caused by the registry or broker side.
    pub fn is_infrastructure(&self) -> bool {
        matches!(
            self,
            PipeError::Transport { .. }
                | PipeError::Registry { .. }
                | PipeError::Delivery { .. }
                | PipeError::Fetch { .. }
        )
    }

    pub fn from_io_error(e: std::io::Error, context: &str) -> Self {
        PipeError::Io {
            context: context.to_string(),
            reason: e.to_string(),
        }
    }

    pub fn from_parse_error(e: impl std::fmt::Display, context: &str) -> Self {
        PipeError::InvalidRecord {
            context: context.to_string(),
            reason: e.to_string(),
        }
    }

    pub fn from_transport_error(e: impl std::fmt::Display, context: &str) -> Self {
        PipeError::Transport {
            context: context.to_string(),
            reason: e.to_string(),
        }
    }
}
