//! Voice allocation for samplers.
//!
//! Decides which voice slot plays each incoming note, which voice gets
//! stolen when the pool is full, and when a finished voice returns to the
//! pool. Rendering is left to the caller: the DSP layer reads [`Voice`]
//! fields (pitch, gain, sample position) and writes back `amplitude`.
//!
//! - **[`VoiceManager`]** - Pool owner; poly, mono, legato and unison modes
//! - **[`VoiceConfig`]** - Polyphony caps, stealing policy, glide, unison
//! - **[`NoteTrigger`]** / **[`VoiceEvent`]** - What the host feeds in
//! - **[`UnisonLayout`]** - Detune and pan spread of a unison stack
//! - **[`glide_rate`]** / **[`should_glide`]** - Portamento helpers
//!
//! # Quick Start
//!
//! ```
//! use voicepool_alloc::{NoteTrigger, StealingMode, VoiceConfig, VoiceManager};
//!
//! let config = VoiceConfig::poly(16).with_stealing(StealingMode::Quietest);
//! let mut manager = VoiceManager::new(config)?;
//!
//! let voices = manager.allocate_voice(&NoteTrigger::new(60, 100).zone("piano"), 0.0);
//! assert_eq!(voices.len(), 1);
//!
//! manager.release_note(60, 0.5);
//! // ...render the release tail, writing `amplitude`, then:
//! manager.voices_mut()[voices[0]].amplitude = 0.0;
//! assert_eq!(manager.process_finished_voices(), 1);
//! # Ok::<(), voicepool_alloc::Error>(())
//! ```

pub mod error;
pub use error::{Error, Result};

mod config;

pub use config::{
    NotePriority, PortamentoMode, StealingMode, VoiceConfig, VoiceConfigUpdate, VoiceMode,
};

mod voice;

pub use voice::{Voice, VoiceId, VoiceState, ZoneId, SILENCE_THRESHOLD};

mod event;

pub use event::{NoteTrigger, VoiceEvent};

mod glide;

pub use glide::{glide_rate, should_glide};

mod unison;

pub use unison::{UnisonLayout, UnisonVoiceParams, MAX_UNISON_VOICES};

mod tracking;

mod manager;

pub use manager::{AllocatedVoices, HeldNote, VoiceManager, VoiceStats, MAX_NOTE};
