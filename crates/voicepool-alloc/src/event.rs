//! Inbound requests from the zone/trigger layer.

use crate::voice::ZoneId;
use serde::{Deserialize, Serialize};

/// Everything the manager needs to start a note.
///
/// # Example
/// ```ignore
/// let hat = NoteTrigger::new(42, 100).zone("closed_hat").exclusive_group(1);
/// let voices = manager.allocate_voice(&hat, now);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NoteTrigger {
    #[serde(default)]
    pub zone_id: Option<ZoneId>,
    /// MIDI note number (0-127)
    pub note: u8,
    /// MIDI velocity (0-127)
    pub velocity: u8,
    /// Bus/channel index the voice renders into
    #[serde(default)]
    pub output: usize,
    #[serde(default)]
    pub group: u32,
    /// Starting this note cuts every other voice sharing the id
    #[serde(default)]
    pub exclusive_group: Option<u32>,
}

impl NoteTrigger {
    pub fn new(note: u8, velocity: u8) -> Self {
        Self {
            zone_id: None,
            note: note.min(127),
            velocity: velocity.min(127),
            output: 0,
            group: 0,
            exclusive_group: None,
        }
    }

    pub fn zone(mut self, zone: impl Into<ZoneId>) -> Self {
        self.zone_id = Some(zone.into());
        self
    }

    pub fn output(mut self, output: usize) -> Self {
        self.output = output;
        self
    }

    pub fn group(mut self, group: u32) -> Self {
        self.group = group;
        self
    }

    pub fn exclusive_group(mut self, group: u32) -> Self {
        self.exclusive_group = Some(group);
        self
    }
}

/// Event stream understood by [`VoiceManager::handle_event`](crate::VoiceManager::handle_event).
///
/// `time` is the caller's clock in seconds (e.g. audio-clock time) and must
/// not decrease between events.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum VoiceEvent {
    /// Velocity 0 is handled as a note-off
    NoteOn { trigger: NoteTrigger, time: f64 },
    NoteOff { note: u8, time: f64 },
    /// Release every voice (all notes off)
    ReleaseAll { time: f64 },
    /// Silence every voice immediately (panic / transport stop)
    StopAll,
    /// Sustain pedal (CC 64)
    Sustain { on: bool, time: f64 },
}

impl VoiceEvent {
    pub fn note_on(trigger: NoteTrigger, time: f64) -> Self {
        Self::NoteOn { trigger, time }
    }

    pub fn note_off(note: u8, time: f64) -> Self {
        Self::NoteOff { note, time }
    }
}
