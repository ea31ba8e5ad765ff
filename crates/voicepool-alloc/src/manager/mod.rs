//! The voice manager.
//!
//! Owns a fixed pool of [`Voice`] slots plus the tracking indexes, and
//! decides which slot plays each incoming note. Allocation, stealing and
//! release never allocate memory once every zone, group and exclusive group
//! in use has been seen once; only [`VoiceManager::set_config`] (when
//! growing) and [`VoiceManager::stats`] do.
//!
//! The manager is not thread-safe. Drive it from one thread (usually the
//! audio thread) and feed it events in timestamp order.

mod alloc;
mod priority;
mod release;
mod stats;
mod steal;

pub use priority::HeldNote;
pub use stats::VoiceStats;

use crate::config::VoiceConfig;
use crate::event::VoiceEvent;
use crate::tracking::TrackingIndex;
use crate::unison::{UnisonLayout, MAX_UNISON_VOICES};
use crate::voice::{Voice, VoiceId};
use crate::Result;
use priority::HeldNotes;
use smallvec::SmallVec;

/// Voices started by one note-on. Inline up to [`MAX_UNISON_VOICES`], so a
/// full unison stack never spills to the heap.
pub type AllocatedVoices = SmallVec<[VoiceId; MAX_UNISON_VOICES]>;

/// Highest MIDI note the manager accepts.
pub const MAX_NOTE: u8 = 127;

/// Reference note for [`StealingMode::Furthest`](crate::StealingMode::Furthest)
/// before anything has played.
pub(crate) const DEFAULT_LAST_NOTE: u8 = 60;

/// Polyphonic voice allocator for a sampler.
#[derive(Debug, Clone)]
pub struct VoiceManager {
    config: VoiceConfig,
    voices: Vec<Voice>,
    index: TrackingIndex,
    held: HeldNotes,
    unison: UnisonLayout,
    last_note: Option<u8>,
    /// Timestamp of the most recent event
    last_time: f64,
    sustain: bool,
    peak_voices: usize,
    total_stolen: u64,
}

impl VoiceManager {
    /// Build a manager with `config.max_polyphony` free voices.
    pub fn new(config: VoiceConfig) -> Result<Self> {
        config.validate()?;

        let voices = (0..config.max_polyphony).map(Voice::new).collect();
        let unison = UnisonLayout::new(
            config.unison_voices,
            config.unison_detune,
            config.unison_spread,
        );

        let index = TrackingIndex::with_capacity(config.max_polyphony);

        Ok(Self {
            config,
            voices,
            index,
            held: HeldNotes::default(),
            unison,
            last_note: None,
            last_time: 0.0,
            sustain: false,
            peak_voices: 0,
            total_stolen: 0,
        })
    }

    pub fn config(&self) -> &VoiceConfig {
        &self.config
    }

    /// All slots, free ones included. Slot `i` has id `i`.
    pub fn voices(&self) -> &[Voice] {
        &self.voices
    }

    /// Mutable slots for the render thread (amplitude, sample position, pitch).
    pub fn voices_mut(&mut self) -> &mut [Voice] {
        &mut self.voices
    }

    pub fn voice(&self, id: VoiceId) -> Option<&Voice> {
        self.voices.get(id)
    }

    pub fn voice_mut(&mut self, id: VoiceId) -> Option<&mut Voice> {
        self.voices.get_mut(id)
    }

    pub fn pool_size(&self) -> usize {
        self.voices.len()
    }

    /// Voices in any state but `Free`.
    pub fn active_count(&self) -> usize {
        self.voices.iter().filter(|v| v.is_active()).count()
    }

    /// Voices fading out (`Releasing` or `Stealing`).
    pub fn releasing_count(&self) -> usize {
        self.voices.iter().filter(|v| v.is_releasing()).count()
    }

    pub fn free_count(&self) -> usize {
        self.voices.iter().filter(|v| v.is_free()).count()
    }

    /// Most recently allocated note.
    pub fn last_note(&self) -> Option<u8> {
        self.last_note
    }

    /// Sustain pedal state.
    pub fn sustain(&self) -> bool {
        self.sustain
    }

    /// Iterate over every non-free voice in slot order.
    pub fn active_voices(&self) -> impl Iterator<Item = &Voice> {
        self.voices.iter().filter(|v| v.is_active())
    }

    pub fn voices_for_note(&self, note: u8) -> impl Iterator<Item = &Voice> {
        self.lookup(self.index.by_note.get(&note))
    }

    pub fn voices_for_zone(&self, zone: &str) -> impl Iterator<Item = &Voice> {
        self.lookup(self.index.by_zone.get(zone))
    }

    pub fn voices_for_group(&self, group: u32) -> impl Iterator<Item = &Voice> {
        self.lookup(self.index.by_group.get(&group))
    }

    fn lookup<'a>(&'a self, ids: &'a [VoiceId]) -> impl Iterator<Item = &'a Voice> {
        ids.iter().filter_map(|&id| self.voices.get(id))
    }

    /// True when no voice is indexed under any key.
    pub fn tracking_is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Advance every active glide by `delta_time` seconds.
    pub fn update_pitches(&mut self, delta_time: f32) {
        for voice in self.voices.iter_mut().filter(|v| v.is_active()) {
            voice.update_pitch(delta_time);
        }
    }

    /// Dispatch a timestamped event. Returns the voices a note-on started.
    ///
    /// A note-on with velocity 0 is a note-off.
    pub fn handle_event(&mut self, event: VoiceEvent) -> AllocatedVoices {
        match event {
            VoiceEvent::NoteOn { trigger, time } if trigger.velocity == 0 => {
                self.release_note(trigger.note, time);
            }
            VoiceEvent::NoteOn { trigger, time } => {
                return self.allocate_voice(&trigger, time);
            }
            VoiceEvent::NoteOff { note, time } => self.release_note(note, time),
            VoiceEvent::ReleaseAll { time } => self.release_all(time),
            VoiceEvent::StopAll => self.stop_all(),
            VoiceEvent::Sustain { on, time } => self.set_sustain(on, time),
        }
        AllocatedVoices::new()
    }
}
