//! Errors surfaced by the bridge
//!
//! Every error is local to one invocation. A non-zero status from the entry
//! point is not an error; it is returned in the invocation record.

use thiserror::Error;

/// Errors that can occur while marshalling arguments or reaching an entry point
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BridgeError {
    /// A native buffer could not be reserved. `index` is `None` when the
    /// failure hit the table rather than an argument.
    #[error("Failed to allocate {bytes} bytes for the argument buffer")]
    Allocation { index: Option<usize>, bytes: usize },

    #[error("Argument {index} cannot be encoded as UTF-8: {reason}")]
    Encoding { index: usize, reason: String },

    #[error("Argument {index} contains an interior NUL byte at offset {position}")]
    InteriorNul { index: usize, position: usize },

    #[error("Argument count {count} does not fit in a native argc")]
    TooManyArguments { count: usize },

    #[error("Entry point panicked: {message}")]
    EntryPointPanicked { message: String },

    #[error("Library error: {0}")]
    Library(String),

    #[error("Invalid config: {0}")]
    InvalidConfig(String),
}

impl BridgeError {
    /// True for errors raised before the entry point was reached
    pub fn is_marshalling(&self) -> bool {
        matches!(
            self,
            BridgeError::Allocation { .. }
                | BridgeError::Encoding { .. }
                | BridgeError::InteriorNul { .. }
                | BridgeError::TooManyArguments { .. }
        )
    }
}
