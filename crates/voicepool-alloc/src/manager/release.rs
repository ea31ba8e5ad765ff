//! Note-off, sustain pedal, hard stop and reclaiming silent voices.

use super::{VoiceManager, MAX_NOTE};
use crate::config::VoiceMode;
use crate::voice::SILENCE_THRESHOLD;

impl VoiceManager {
    /// Handle a note-off.
    ///
    /// In legato mode with other keys still held, the sounding voices glide
    /// back to the priority note instead of releasing. Otherwise every
    /// sounding voice of `note` starts its release (or is held by the sustain
    /// pedal). Notes above [`MAX_NOTE`] are ignored.
    pub fn release_note(&mut self, note: u8, time: f64) {
        self.last_time = time;
        if note > MAX_NOTE {
            return;
        }
        self.held.release(note);

        if self.config.mode == VoiceMode::Legato {
            if let Some(target) = self.find_priority_note() {
                self.retarget_sounding(target);
                return;
            }
        }

        for &id in self.index.by_note.get(&note) {
            let voice = &mut self.voices[id];
            if self.sustain {
                voice.hold();
            } else {
                voice.release(time);
            }
        }
    }

    /// Release every sounding voice (all notes off).
    ///
    /// Indexes are left alone; they empty as voices are reclaimed.
    pub fn release_all(&mut self, time: f64) {
        self.last_time = time;
        self.held.clear();
        for voice in &mut self.voices {
            voice.release(time);
        }
    }

    /// Silence everything immediately, skipping release tails (panic / transport stop).
    pub fn stop_all(&mut self) {
        self.index.clear();
        self.held.clear();
        for voice in &mut self.voices {
            voice.reset();
        }
    }

    /// Sustain pedal. Lifting it releases every voice it was holding.
    pub fn set_sustain(&mut self, on: bool, time: f64) {
        self.last_time = time;
        self.sustain = on;
        if on {
            return;
        }

        for voice in self.voices.iter_mut().filter(|v| v.sustained()) {
            voice.release(time);
        }
    }

    /// Free every releasing or stolen voice whose amplitude fell below
    /// [`SILENCE_THRESHOLD`]. Call once per audio block after the DSP layer
    /// updated amplitudes. Returns the number of voices freed.
    pub fn process_finished_voices(&mut self) -> usize {
        let mut freed = 0;

        for voice in &mut self.voices {
            if voice.is_releasing() && voice.amplitude < SILENCE_THRESHOLD {
                self.index.untrack(voice);
                voice.reset();
                freed += 1;
            }
        }

        debug_assert!(self.index.is_consistent(&self.voices));
        freed
    }
}
