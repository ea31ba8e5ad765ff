//! Held-note table and note priority.

use super::VoiceManager;
use crate::config::NotePriority;

/// A key that is currently down.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HeldNote {
    pub velocity: u8,
    /// Caller time of the note-on, seconds
    pub time: f64,
}

/// Fixed-size table of held keys, indexed by MIDI note.
///
/// Callers only pass notes up to [`MAX_NOTE`](super::MAX_NOTE).
#[derive(Debug, Clone)]
pub(crate) struct HeldNotes {
    notes: [Option<HeldNote>; 128],
    count: usize,
}

impl Default for HeldNotes {
    fn default() -> Self {
        Self {
            notes: [None; 128],
            count: 0,
        }
    }
}

impl HeldNotes {
    pub fn press(&mut self, note: u8, velocity: u8, time: f64) {
        let slot = &mut self.notes[usize::from(note)];
        if slot.is_none() {
            self.count += 1;
        }
        *slot = Some(HeldNote { velocity, time });
    }

    /// Returns true if the note was held.
    pub fn release(&mut self, note: u8) -> bool {
        let was_held = self.notes[usize::from(note)].take().is_some();
        if was_held {
            self.count -= 1;
        }
        was_held
    }

    pub fn get(&self, note: u8) -> Option<HeldNote> {
        self.notes[usize::from(note)]
    }

    pub fn clear(&mut self) {
        self.notes = [None; 128];
        self.count = 0;
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    pub fn iter(&self) -> impl Iterator<Item = (u8, HeldNote)> + '_ {
        self.notes
            .iter()
            .enumerate()
            .filter_map(|(note, held)| held.map(|h| (note as u8, h)))
    }

    /// Note that should sound when `new_note` arrives.
    pub fn apply_priority(&self, new_note: u8, priority: NotePriority) -> u8 {
        match priority {
            NotePriority::Last => new_note,
            NotePriority::Highest => self.iter().map(|(n, _)| n).fold(new_note, u8::max),
            NotePriority::Lowest => self.iter().map(|(n, _)| n).fold(new_note, u8::min),
        }
    }

    /// Note that should sound after a release, `None` if nothing is held.
    pub fn find_priority_note(&self, priority: NotePriority) -> Option<u8> {
        if self.is_empty() {
            return None;
        }
        match priority {
            NotePriority::Highest => self.iter().map(|(n, _)| n).max(),
            NotePriority::Lowest => self.iter().map(|(n, _)| n).min(),
            NotePriority::Last => {
                let mut latest: Option<(u8, f64)> = None;
                for (note, held) in self.iter() {
                    match latest {
                        Some((_, time)) if held.time <= time => {}
                        _ => latest = Some((note, held.time)),
                    }
                }
                latest.map(|(note, _)| note)
            }
        }
    }
}

impl VoiceManager {
    /// Note to sound for a new note-on, given the keys currently held.
    pub fn apply_note_priority(&self, new_note: u8) -> u8 {
        self.held.apply_priority(new_note, self.config.note_priority)
    }

    /// Note to return to after a note-off, `None` if no key is held.
    pub fn find_priority_note(&self) -> Option<u8> {
        self.held.find_priority_note(self.config.note_priority)
    }

    /// Keys currently held (mono and legato modes), ascending.
    pub fn held_notes(&self) -> impl Iterator<Item = u8> + '_ {
        self.held.iter().map(|(note, _)| note)
    }
}
