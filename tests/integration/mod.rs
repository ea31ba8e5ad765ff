//! Integration test modules for voicepool
//!
//! - allocation: Capacity, caps, exclusive groups
//! - stealing: Victim selection
//! - modes: Mono/legato/unison and glide
//! - lifecycle: Release tails, sustain, reclaim, stop, resize

pub mod allocation;
pub mod lifecycle;
pub mod stealing;
