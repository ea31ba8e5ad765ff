//! Voice manager configuration.
//!
//! [`VoiceConfig`] is a plain value snapshot read on every allocation.
//! Hosts change it through [`VoiceConfigUpdate`], which only carries the
//! fields being changed and is merged into the live config.

use crate::unison::MAX_UNISON_VOICES;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};

/// Voice playing mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VoiceMode {
    /// Polyphonic - one voice per note
    #[default]
    Poly,
    /// Monophonic - each note releases the previous one and retriggers
    Mono,
    /// Legato - overlapping notes glide the sounding voice instead of retriggering
    Legato,
    /// Several detuned voices per note
    Unison,
}

/// Which held note governs a mono/legato voice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotePriority {
    /// Most recent note wins
    #[default]
    Last,
    /// Highest held note wins
    Highest,
    /// Lowest held note wins
    Lowest,
}

/// Victim selection policy when capacity runs out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StealingMode {
    /// Steal the voice that started longest ago
    #[default]
    Oldest,
    /// Steal the voice with the lowest amplitude
    Quietest,
    /// Prefer a voice from the requesting zone, otherwise the oldest
    SameNote,
    /// Steal the voice furthest (in semitones) from the last allocated note
    Furthest,
    /// Never steal - drop new notes when full
    #[serde(alias = "none")]
    NoSteal,
}

/// Portamento/glide mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PortamentoMode {
    /// Glide into every new note
    Always,
    /// Glide only between overlapping (legato) notes
    #[serde(alias = "legato")]
    LegatoOnly,
    /// Disabled (pitch jumps)
    #[default]
    Off,
}

/// Configuration for the voice manager.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VoiceConfig {
    /// Maximum number of simultaneous voices (also the pool size)
    pub max_polyphony: usize,
    /// Maximum voices per zone (0 = unbounded)
    pub per_zone_limit: usize,
    /// Maximum voices per group (0 = unbounded)
    pub per_group_limit: usize,
    pub mode: VoiceMode,
    pub note_priority: NotePriority,
    pub stealing_mode: StealingMode,
    /// Voices per note in unison mode (1-16)
    pub unison_voices: usize,
    /// Outermost unison detune in cents
    pub unison_detune: f32,
    /// 0.0 = mono, 1.0 = full stereo
    pub unison_spread: f32,
    /// Glide time in seconds
    pub portamento_time: f32,
    pub portamento_mode: PortamentoMode,
    /// Fade-out time in seconds the DSP layer applies to voices cut by an exclusive group
    pub steal_release_time: f32,
    /// Legato mode restarts a voice for every note instead of gliding
    pub legato_retrigger: bool,
}

impl Default for VoiceConfig {
    fn default() -> Self {
        Self {
            max_polyphony: 32,
            per_zone_limit: 0,
            per_group_limit: 0,
            mode: VoiceMode::Poly,
            note_priority: NotePriority::Last,
            stealing_mode: StealingMode::Oldest,
            unison_voices: 1,
            unison_detune: 0.0,
            unison_spread: 0.0,
            portamento_time: 0.0,
            portamento_mode: PortamentoMode::Off,
            steal_release_time: 0.005,
            legato_retrigger: false,
        }
    }
}

impl VoiceConfig {
    /// Polyphonic preset with `voices` slots.
    pub fn poly(voices: usize) -> Self {
        Self {
            max_polyphony: voices,
            ..Default::default()
        }
    }

    /// Monophonic preset.
    pub fn mono() -> Self {
        Self {
            mode: VoiceMode::Mono,
            ..Default::default()
        }
    }

    /// Legato preset with a 100ms legato-only glide.
    pub fn legato() -> Self {
        Self {
            mode: VoiceMode::Legato,
            portamento_mode: PortamentoMode::LegatoOnly,
            portamento_time: 0.1,
            ..Default::default()
        }
    }

    /// Unison preset.
    pub fn unison(voices: usize, detune_cents: f32, spread: f32) -> Self {
        Self {
            mode: VoiceMode::Unison,
            unison_voices: voices,
            unison_detune: detune_cents,
            unison_spread: spread,
            ..Default::default()
        }
    }

    pub fn with_max_polyphony(mut self, voices: usize) -> Self {
        self.max_polyphony = voices;
        self
    }

    pub fn with_stealing(mut self, mode: StealingMode) -> Self {
        self.stealing_mode = mode;
        self
    }

    pub fn with_note_priority(mut self, priority: NotePriority) -> Self {
        self.note_priority = priority;
        self
    }

    pub fn with_zone_limit(mut self, limit: usize) -> Self {
        self.per_zone_limit = limit;
        self
    }

    pub fn with_group_limit(mut self, limit: usize) -> Self {
        self.per_group_limit = limit;
        self
    }

    pub fn with_portamento(mut self, mode: PortamentoMode, time: f32) -> Self {
        self.portamento_mode = mode;
        self.portamento_time = time;
        self
    }

    pub fn with_legato_retrigger(mut self, retrigger: bool) -> Self {
        self.legato_retrigger = retrigger;
        self
    }

    /// Check every parameter range.
    pub fn validate(&self) -> Result<()> {
        if self.max_polyphony == 0 {
            return Err(Error::InvalidConfig(
                "max_polyphony must be at least 1".into(),
            ));
        }
        if self.unison_voices == 0 || self.unison_voices > MAX_UNISON_VOICES {
            return Err(Error::InvalidConfig(format!(
                "unison_voices must be in 1..={MAX_UNISON_VOICES}, got {}",
                self.unison_voices
            )));
        }
        if !(0.0..=1.0).contains(&self.unison_spread) {
            return Err(Error::InvalidConfig(format!(
                "unison_spread must be in 0.0..=1.0, got {}",
                self.unison_spread
            )));
        }
        for (name, value) in [
            ("unison_detune", self.unison_detune),
            ("portamento_time", self.portamento_time),
            ("steal_release_time", self.steal_release_time),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(Error::InvalidConfig(format!(
                    "{name} must be a non-negative number, got {value}"
                )));
            }
        }
        Ok(())
    }

    /// Return a copy with every field set in `update` replaced.
    pub fn merged(&self, update: &VoiceConfigUpdate) -> Self {
        Self {
            max_polyphony: update.max_polyphony.unwrap_or(self.max_polyphony),
            per_zone_limit: update.per_zone_limit.unwrap_or(self.per_zone_limit),
            per_group_limit: update.per_group_limit.unwrap_or(self.per_group_limit),
            mode: update.mode.unwrap_or(self.mode),
            note_priority: update.note_priority.unwrap_or(self.note_priority),
            stealing_mode: update.stealing_mode.unwrap_or(self.stealing_mode),
            unison_voices: update.unison_voices.unwrap_or(self.unison_voices),
            unison_detune: update.unison_detune.unwrap_or(self.unison_detune),
            unison_spread: update.unison_spread.unwrap_or(self.unison_spread),
            portamento_time: update.portamento_time.unwrap_or(self.portamento_time),
            portamento_mode: update.portamento_mode.unwrap_or(self.portamento_mode),
            steal_release_time: update
                .steal_release_time
                .unwrap_or(self.steal_release_time),
            legato_retrigger: update.legato_retrigger.unwrap_or(self.legato_retrigger),
        }
    }
}

/// Partial configuration; `None` fields keep their current value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VoiceConfigUpdate {
    pub max_polyphony: Option<usize>,
    pub per_zone_limit: Option<usize>,
    pub per_group_limit: Option<usize>,
    pub mode: Option<VoiceMode>,
    pub note_priority: Option<NotePriority>,
    pub stealing_mode: Option<StealingMode>,
    pub unison_voices: Option<usize>,
    pub unison_detune: Option<f32>,
    pub unison_spread: Option<f32>,
    pub portamento_time: Option<f32>,
    pub portamento_mode: Option<PortamentoMode>,
    pub steal_release_time: Option<f32>,
    pub legato_retrigger: Option<bool>,
}

impl From<VoiceConfig> for VoiceConfigUpdate {
    fn from(config: VoiceConfig) -> Self {
        Self {
            max_polyphony: Some(config.max_polyphony),
            per_zone_limit: Some(config.per_zone_limit),
            per_group_limit: Some(config.per_group_limit),
            mode: Some(config.mode),
            note_priority: Some(config.note_priority),
            stealing_mode: Some(config.stealing_mode),
            unison_voices: Some(config.unison_voices),
            unison_detune: Some(config.unison_detune),
            unison_spread: Some(config.unison_spread),
            portamento_time: Some(config.portamento_time),
            portamento_mode: Some(config.portamento_mode),
            steal_release_time: Some(config.steal_release_time),
            legato_retrigger: Some(config.legato_retrigger),
        }
    }
}
