//! Error types for voicepool-alloc.
//!
//! Running out of voices is not an error: a dropped note is reported as an
//! empty allocation. Errors only come from the configuration boundary.

use thiserror::Error;

/// Result type alias for voicepool-alloc operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in voicepool-alloc.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum Error {
    /// Invalid configuration parameter.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}
