#![forbid(unsafe_code)]

//! Errors raised by concrete mediators built on the registry.
//!
//! The registry itself never fails; these errors only come from the
//! composing layer, where a colleague may outlive its mediator.

use std::fmt;

/// Errors from mediator operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MediatorError {
    /// The colleague tried to talk through a mediator that no longer exists.
    MediatorDropped {
        /// Name of the colleague that attempted to send.
        colleague: String,
    },
}

impl fmt::Display for MediatorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MediatorDropped { colleague } => {
                write!(f, "mediator for '{colleague}' has been dropped")
            }
        }
    }
}

impl std::error::Error for MediatorError {}
