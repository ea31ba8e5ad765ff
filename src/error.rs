//! Centralized error type for the voicepool umbrella crate.
//!
//! Wraps subsystem errors so `?` propagates naturally across crate boundaries.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Voice allocation: {0}")]
    Alloc(#[from] voicepool_alloc::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
