//! Core error types.

use thiserror::Error;

/// Errors raised by core model parsing.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CoreError {
    /// A collection name that the dashboard does not keep.
    #[error("unknown collection: {0}")]
    UnknownCollection(String),
}
