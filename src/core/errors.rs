/*!
 * Error Types
 * Centralized error handling with thiserror
 */

use super::types::{AllocationKind, Size};
use thiserror::Error;

/// Buffer subsystem errors
///
/// Allocation, growth, and configuration failures propagate to the caller
/// and are never retried. Non-fatal release conditions (already released,
/// hook absent) are reported through boolean results instead.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BufferError {
    #[error("Malformed configuration value for `{key}`: {value:?} ({reason})")]
    Configuration {
        key: String,
        value: String,
        reason: String,
    },

    #[error("Invalid buffer size: {0} bytes")]
    InvalidSize(Size),

    #[error("Allocation failure: requested {requested} bytes of {kind} memory")]
    AllocationFailure { requested: Size, kind: AllocationKind },

    #[error("Capacity overflow: cannot grow {current} bytes by {required} more")]
    CapacityOverflow { current: Size, required: Size },

    #[error("Invalid state: {0}")]
    InvalidState(String),

    #[error("I/O failure while {context}: {message}")]
    Io { context: String, message: String },
}

impl BufferError {
    pub(crate) fn io(context: impl Into<String>, err: std::io::Error) -> Self {
        BufferError::Io {
            context: context.into(),
            message: err.to_string(),
        }
    }
}

impl From<BufferError> for std::io::Error {
    fn from(err: BufferError) -> Self {
        std::io::Error::new(std::io::ErrorKind::Other, err.to_string())
    }
}
