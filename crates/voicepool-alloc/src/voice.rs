//! Voice record and lifecycle state machine.
//!
//! A [`Voice`] is one slot of the manager's fixed pool. Its identity fields
//! (note, zone, group, ...) are only written by the manager, because the
//! tracking index is keyed on them. The DSP layer owns `amplitude`, the pitch
//! fields while a glide runs, and the sample-playback fields.
//!
//! ```text
//! Free -> Starting -> Playing -> Releasing -> Free
//!            |           |           |
//!            +-----------+-----------+--> Stealing -> Free
//! ```

use crate::event::NoteTrigger;
use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt;
use std::sync::Arc;

/// Slot index of a voice in the pool.
pub type VoiceId = usize;

/// Amplitude below which a releasing or stolen voice counts as silent.
pub const SILENCE_THRESHOLD: f32 = 0.001;

/// Identifier of the zone (sample mapping region) a voice plays.
///
/// Cheap to clone; hashes like the underlying string so indexes can be
/// queried with a plain `&str`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ZoneId(Arc<str>);

impl ZoneId {
    pub fn new(id: &str) -> Self {
        Self(Arc::from(id))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for ZoneId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ZoneId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for ZoneId {
    fn from(id: String) -> Self {
        Self(Arc::from(id))
    }
}

impl fmt::Display for ZoneId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Lifecycle state of a voice slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum VoiceState {
    /// Idle and available for allocation
    #[default]
    Free,
    /// Allocated, waiting for the DSP layer's first audible block
    Starting,
    /// Sounding (attack/decay/sustain)
    Playing,
    /// Note-off received, release tail running
    Releasing,
    /// Forcibly cut, fading out before reclaim
    Stealing,
}

/// One playback slot.
#[derive(Debug, Clone)]
pub struct Voice {
    id: VoiceId,
    state: VoiceState,
    zone_id: Option<ZoneId>,
    note: u8,
    velocity: u8,
    start_time: f64,
    release_time: Option<f64>,
    output: usize,
    group: u32,
    exclusive_group: Option<u32>,
    stolen: bool,
    sustained: bool,

    /// Current level, written by the DSP layer every block
    pub amplitude: f32,

    /// Pitch the voice was started at (semitones, MIDI note scale)
    pub base_pitch: f32,
    /// Pitch the glide is heading to
    pub target_pitch: f32,
    /// Pitch right now
    pub current_pitch: f32,
    /// Glide speed in semitones per second (0 = jump)
    pub portamento_rate: f32,

    /// Position of this voice in its unison stack
    pub unison_index: usize,
    /// Detune in cents
    pub unison_detune: f32,
    /// -1.0 = left, 1.0 = right
    pub unison_pan: f32,

    // Owned by the playback engine, zeroed on reset.
    pub sample_position: f64,
    pub sample_increment: f64,
    pub looping: bool,
    pub loop_start: usize,
    pub loop_end: usize,
}

impl Voice {
    /// Create a free voice for slot `id`.
    pub fn new(id: VoiceId) -> Self {
        Self {
            id,
            state: VoiceState::Free,
            zone_id: None,
            note: 0,
            velocity: 0,
            start_time: 0.0,
            release_time: None,
            output: 0,
            group: 0,
            exclusive_group: None,
            stolen: false,
            sustained: false,
            amplitude: 0.0,
            base_pitch: 0.0,
            target_pitch: 0.0,
            current_pitch: 0.0,
            portamento_rate: 0.0,
            unison_index: 0,
            unison_detune: 0.0,
            unison_pan: 0.0,
            sample_position: 0.0,
            sample_increment: 0.0,
            looping: false,
            loop_start: 0,
            loop_end: 0,
        }
    }

    #[inline]
    pub fn id(&self) -> VoiceId {
        self.id
    }

    #[inline]
    pub fn state(&self) -> VoiceState {
        self.state
    }

    #[inline]
    pub fn zone_id(&self) -> Option<&ZoneId> {
        self.zone_id.as_ref()
    }

    #[inline]
    pub fn note(&self) -> u8 {
        self.note
    }

    #[inline]
    pub fn velocity(&self) -> u8 {
        self.velocity
    }

    #[inline]
    pub fn start_time(&self) -> f64 {
        self.start_time
    }

    #[inline]
    pub fn release_time(&self) -> Option<f64> {
        self.release_time
    }

    #[inline]
    pub fn output(&self) -> usize {
        self.output
    }

    #[inline]
    pub fn group(&self) -> u32 {
        self.group
    }

    #[inline]
    pub fn exclusive_group(&self) -> Option<u32> {
        self.exclusive_group
    }

    /// True if this voice was last ended by stealing.
    #[inline]
    pub fn stolen(&self) -> bool {
        self.stolen
    }

    /// True if the sustain pedal is holding this voice past its note-off.
    #[inline]
    pub fn sustained(&self) -> bool {
        self.sustained
    }

    #[inline]
    pub fn is_free(&self) -> bool {
        self.state == VoiceState::Free
    }

    /// Any state but `Free`: the DSP layer should render this voice.
    #[inline]
    pub fn is_active(&self) -> bool {
        self.state != VoiceState::Free
    }

    /// `Starting` or `Playing`: the key is (logically) still down.
    #[inline]
    pub fn is_sounding(&self) -> bool {
        matches!(self.state, VoiceState::Starting | VoiceState::Playing)
    }

    #[inline]
    pub fn is_releasing(&self) -> bool {
        matches!(self.state, VoiceState::Releasing | VoiceState::Stealing)
    }

    /// Voices already being stolen (or free) are never picked again.
    #[inline]
    pub fn can_be_stolen(&self) -> bool {
        matches!(
            self.state,
            VoiceState::Starting | VoiceState::Playing | VoiceState::Releasing
        )
    }

    /// Output gain derived from velocity (0.0-1.0).
    #[inline]
    pub fn gain(&self) -> f32 {
        self.velocity as f32 / 127.0
    }

    /// Pitch including unison detune, in semitones.
    #[inline]
    pub fn pitch(&self) -> f32 {
        self.current_pitch + self.unison_detune / 100.0
    }

    #[inline]
    pub fn is_gliding(&self) -> bool {
        self.current_pitch != self.target_pitch
    }

    /// Advance the pitch glide by `delta_time` seconds.
    ///
    /// RT-safe. Call once per block while [`is_gliding`](Self::is_gliding).
    pub fn update_pitch(&mut self, delta_time: f32) {
        let remaining = self.target_pitch - self.current_pitch;
        if remaining == 0.0 {
            return;
        }

        let step = self.portamento_rate * delta_time;
        if self.portamento_rate <= 0.0 || remaining.abs() <= step {
            self.current_pitch = self.target_pitch;
            self.portamento_rate = 0.0;
        } else {
            self.current_pitch += step.copysign(remaining);
        }
    }

    /// Transition `Free -> Starting` for a new note.
    pub(crate) fn start(&mut self, trigger: &NoteTrigger, time: f64) {
        let pitch = trigger.note as f32;

        self.state = VoiceState::Starting;
        self.zone_id = trigger.zone_id.clone();
        self.note = trigger.note;
        self.velocity = trigger.velocity.min(127);
        self.start_time = time;
        self.release_time = None;
        self.output = trigger.output;
        self.group = trigger.group;
        self.exclusive_group = trigger.exclusive_group;
        self.stolen = false;
        self.sustained = false;
        self.amplitude = self.gain();
        self.base_pitch = pitch;
        self.target_pitch = pitch;
        self.current_pitch = pitch;
        self.portamento_rate = 0.0;
        self.unison_index = 0;
        self.unison_detune = 0.0;
        self.unison_pan = 0.0;
        self.sample_position = 0.0;
        self.sample_increment = 0.0;
        self.looping = false;
        self.loop_start = 0;
        self.loop_end = 0;
    }

    /// Transition `Starting -> Playing` once the first block was rendered.
    pub fn play(&mut self) {
        if self.state == VoiceState::Starting {
            self.state = VoiceState::Playing;
        }
    }

    /// Note-off: `Starting`/`Playing` -> `Releasing`.
    pub(crate) fn release(&mut self, time: f64) {
        if self.is_sounding() {
            self.state = VoiceState::Releasing;
            self.release_time = Some(time);
            self.sustained = false;
        }
    }

    /// Sustain pedal is holding this voice past its note-off.
    pub(crate) fn hold(&mut self) {
        if self.is_sounding() {
            self.sustained = true;
        }
    }

    /// Capacity reclaim or exclusive-group cut.
    pub(crate) fn steal(&mut self, time: f64) {
        self.state = VoiceState::Stealing;
        self.release_time = Some(time);
        self.stolen = true;
        self.sustained = false;
    }

    /// Return to `Free`, clearing everything but the slot id.
    pub(crate) fn reset(&mut self) {
        *self = Self::new(self.id);
    }

    /// Move a sounding voice to another note without restarting it (legato).
    ///
    /// The new note is a key that is down, so a sustain-pedal hold left over
    /// from the previous note no longer applies.
    pub(crate) fn set_note(&mut self, note: u8) {
        self.note = note;
        self.sustained = false;
    }
}
