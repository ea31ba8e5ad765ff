//! # Voicepool - Sampler Voice Engine
//!
//! Voice allocation for sample-based instruments.
//!
//! ## Architecture
//!
//! Voicepool is an umbrella crate that coordinates:
//! - **voicepool-alloc** - Voice pool, polyphony caps, stealing, mono/legato/unison, glide
//!
//! Rendering (envelopes, sample streaming, mixing) is out of scope. The host's
//! DSP layer reads the voices the manager hands out and reports their
//! amplitude back so finished voices can be reclaimed.
//!
//! ## Quick Start
//!
//! ```
//! use voicepool::prelude::*;
//!
//! let mut manager = VoiceManager::new(VoiceConfig::poly(8).with_zone_limit(2))?;
//!
//! for note in [36, 38, 36] {
//!     manager.handle_event(VoiceEvent::note_on(NoteTrigger::new(note, 110).zone("drums"), 0.0));
//! }
//! assert_eq!(manager.voices_for_zone("drums").count(), 2);
//! # Ok::<(), voicepool::Error>(())
//! ```

/// Re-export of voicepool-alloc for direct access
pub use voicepool_alloc as alloc;

pub use voicepool_alloc::{
    AllocatedVoices, HeldNote, NotePriority, NoteTrigger, PortamentoMode, StealingMode,
    UnisonLayout, UnisonVoiceParams, Voice, VoiceConfig, VoiceConfigUpdate, VoiceEvent, VoiceId,
    VoiceManager, VoiceMode, VoiceState, VoiceStats, ZoneId, MAX_NOTE, MAX_UNISON_VOICES,
    SILENCE_THRESHOLD,
};

mod error;

pub use error::{Error, Result};

/// Convenience prelude for common imports
pub mod prelude {
    // Manager
    pub use crate::{AllocatedVoices, VoiceManager, VoiceStats};

    // Requests
    pub use crate::{NoteTrigger, VoiceEvent};

    // Config
    pub use crate::{
        NotePriority, PortamentoMode, StealingMode, VoiceConfig, VoiceConfigUpdate, VoiceMode,
    };

    // Voices
    pub use crate::{Voice, VoiceId, VoiceState, ZoneId};

    pub use crate::{Error, Result};
}
