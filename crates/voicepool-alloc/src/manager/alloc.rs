//! Note-on handling: exclusive-group cuts and the four allocation modes.

use super::{AllocatedVoices, VoiceManager, MAX_NOTE};
use crate::config::VoiceMode;
use crate::event::NoteTrigger;
use crate::glide;
use crate::voice::{VoiceId, ZoneId};

impl VoiceManager {
    /// Start voices for a note-on.
    ///
    /// Returns the slots that now play the note. An empty list means the note
    /// was dropped (caps reached and nothing could be stolen). In legato mode
    /// the list holds the voices that were re-pointed at the new note.
    /// Notes above [`MAX_NOTE`] are ignored.
    ///
    /// RT-safe once the pool is sized.
    pub fn allocate_voice(&mut self, trigger: &NoteTrigger, time: f64) -> AllocatedVoices {
        self.last_time = time;

        if trigger.note > MAX_NOTE {
            tracing::debug!("Ignored note-on for out-of-range note {}", trigger.note);
            return AllocatedVoices::new();
        }

        if let Some(group) = trigger.exclusive_group {
            self.cut_exclusive_group(group, time);
        }

        let voices = match self.config.mode {
            VoiceMode::Poly => self.allocate_poly(trigger, time, &[]).into_iter().collect(),
            VoiceMode::Mono => self.allocate_mono(trigger, time),
            VoiceMode::Legato => self.allocate_legato(trigger, time),
            VoiceMode::Unison => self.allocate_unison(trigger, time),
        };

        if voices.is_empty() {
            tracing::debug!(
                "Dropped note {} (zone {:?}): no voice available",
                trigger.note,
                trigger.zone_id.as_ref().map(ZoneId::as_str)
            );
        }

        self.peak_voices = self.peak_voices.max(self.active_count());
        voices
    }

    /// Every stealable voice in `group` goes to `Stealing` and fades out.
    fn cut_exclusive_group(&mut self, group: u32, time: f64) {
        for &id in self.index.by_exclusive.get(&group) {
            let voice = &mut self.voices[id];
            if voice.can_be_stolen() {
                tracing::trace!("Exclusive group {} cuts voice {}", group, id);
                voice.steal(time);
            }
        }
    }

    /// Start one voice, stealing if a cap is hit. Voices in `exclude` are never stolen.
    pub(crate) fn allocate_poly(
        &mut self,
        trigger: &NoteTrigger,
        time: f64,
        exclude: &[VoiceId],
    ) -> Option<VoiceId> {
        let zone_id = trigger.zone_id.as_ref().map(ZoneId::as_str);

        if let Some(scope) = self.limit_violation(zone_id, trigger.group) {
            self.steal_scoped(zone_id, trigger.group, scope, exclude, time)?;
        }

        let id = match self.find_free_voice() {
            Some(id) => id,
            None => self.steal_scoped(zone_id, trigger.group, Default::default(), exclude, time)?,
        };

        self.voices[id].start(trigger, time);
        self.index.track(&self.voices[id]);
        self.last_note = Some(trigger.note);

        Some(id)
    }

    fn find_free_voice(&self) -> Option<VoiceId> {
        self.voices.iter().position(|v| v.is_free())
    }

    /// The trigger that actually sounds under note priority.
    fn priority_trigger(&self, trigger: &NoteTrigger, note: u8) -> NoteTrigger {
        let velocity = self
            .held
            .get(note)
            .map_or(trigger.velocity, |held| held.velocity);

        NoteTrigger {
            note,
            velocity,
            ..trigger.clone()
        }
    }

    /// Pitch of the most recently started sounding voice, if any.
    fn sounding_pitch(&self) -> Option<f32> {
        let mut latest: Option<(f64, f32)> = None;
        for voice in self.voices.iter().filter(|v| v.is_sounding()) {
            match latest {
                Some((start, _)) if voice.start_time() < start => {}
                _ => latest = Some((voice.start_time(), voice.current_pitch)),
            }
        }
        latest.map(|(_, pitch)| pitch)
    }

    /// Release the sounding voices and start a fresh one for the winning note.
    ///
    /// Shared by mono mode and legato with retrigger.
    fn retrigger(&mut self, trigger: &NoteTrigger, note: u8, time: f64) -> AllocatedVoices {
        let overlapping = self.sounding_pitch();
        let previous_note = self.last_note;

        for voice in self.voices.iter_mut().filter(|v| v.is_sounding()) {
            voice.release(time);
        }

        let trigger = self.priority_trigger(trigger, note);
        let Some(id) = self.allocate_poly(&trigger, time, &[]) else {
            return AllocatedVoices::new();
        };

        let from = match overlapping {
            Some(pitch) => Some((pitch, true)),
            None => previous_note.map(|n| (n as f32, false)),
        };
        if let Some((pitch, is_legato)) = from {
            glide::glide_in(&mut self.voices[id], pitch, &self.config, is_legato);
        }

        smallvec::smallvec![id]
    }

    fn allocate_mono(&mut self, trigger: &NoteTrigger, time: f64) -> AllocatedVoices {
        self.held.press(trigger.note, trigger.velocity, time);
        let note = self.apply_note_priority(trigger.note);

        // A held note that keeps priority keeps sounding untouched.
        if note != trigger.note
            && self
                .index
                .by_note
                .get(&note)
                .iter()
                .any(|&id| self.voices[id].is_sounding())
        {
            return AllocatedVoices::new();
        }

        self.retrigger(trigger, note, time)
    }

    fn allocate_legato(&mut self, trigger: &NoteTrigger, time: f64) -> AllocatedVoices {
        self.held.press(trigger.note, trigger.velocity, time);
        let note = self.apply_note_priority(trigger.note);

        let any_sounding = self.voices.iter().any(|v| v.is_sounding());
        if any_sounding && !self.config.legato_retrigger {
            return self.retarget_sounding(note);
        }

        self.retrigger(trigger, note, time)
    }

    /// Glide every sounding voice to `note` and move its note-index entry.
    pub(crate) fn retarget_sounding(&mut self, note: u8) -> AllocatedVoices {
        let mut moved = AllocatedVoices::new();

        for voice in self.voices.iter_mut().filter(|v| v.is_sounding()) {
            let id = voice.id();
            let old_note = voice.note();
            glide::retarget(voice, note, &self.config);
            if old_note != note {
                self.index.by_note.remove(&old_note, id);
                self.index.by_note.insert(note, id);
            }
            moved.push(id);
        }

        if !moved.is_empty() {
            self.last_note = Some(note);
        }
        moved
    }

    fn allocate_unison(&mut self, trigger: &NoteTrigger, time: f64) -> AllocatedVoices {
        let count = self.unison.voice_count();
        let mut voices = AllocatedVoices::new();

        for i in 0..count {
            let Some(id) = self.allocate_poly(trigger, time, &voices) else {
                break;
            };

            let params = *self.unison.voice_params(i);
            let voice = &mut self.voices[id];
            voice.unison_index = i;
            voice.unison_detune = params.detune_cents;
            voice.unison_pan = params.pan;
            voices.push(id);
        }

        voices
    }
}
