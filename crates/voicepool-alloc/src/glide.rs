//! Portamento: pointing voices at a new pitch.
//!
//! The manager only sets `target_pitch` and `portamento_rate`; the glide
//! itself advances in [`Voice::update_pitch`] on the render thread.

use crate::config::{PortamentoMode, VoiceConfig};
use crate::voice::Voice;

/// Linear glide speed in semitones per second.
#[inline]
pub fn glide_rate(from: f32, to: f32, time: f32) -> f32 {
    if time > 0.0 {
        (to - from).abs() / time
    } else {
        0.0
    }
}

/// True if a transition should glide rather than jump.
#[inline]
pub fn should_glide(config: &VoiceConfig, is_legato: bool) -> bool {
    let enabled = match config.portamento_mode {
        PortamentoMode::Off => false,
        PortamentoMode::Always => true,
        PortamentoMode::LegatoOnly => is_legato,
    };
    enabled && config.portamento_time > 0.0
}

/// Point `voice` at `target` (semitones), gliding if the config allows.
pub(crate) fn set_target(voice: &mut Voice, target: f32, config: &VoiceConfig, is_legato: bool) {
    voice.target_pitch = target;

    if should_glide(config, is_legato) {
        voice.portamento_rate = glide_rate(voice.current_pitch, target, config.portamento_time);
    } else {
        voice.current_pitch = target;
        voice.portamento_rate = 0.0;
    }
}

/// Legato: move a sounding voice to `note` without restarting it.
///
/// The voice's pitch moves by the same number of semitones as its note, so
/// any offset between the two is kept.
pub(crate) fn retarget(voice: &mut Voice, note: u8, config: &VoiceConfig) {
    let delta = note as f32 - voice.note() as f32;
    let target = voice.target_pitch + delta;
    set_target(voice, target, config, true);
    voice.set_note(note);
}

/// Start a fresh voice at `from` and glide to its own pitch.
///
/// `is_legato` is true when the previous note was still sounding.
pub(crate) fn glide_in(voice: &mut Voice, from: f32, config: &VoiceConfig, is_legato: bool) {
    let target = voice.target_pitch;
    voice.current_pitch = from;
    set_target(voice, target, config, is_legato);
}
