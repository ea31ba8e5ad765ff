//! Statistics, reconfiguration and pool resizing.

use super::VoiceManager;
use crate::config::VoiceConfigUpdate;
use crate::unison::UnisonLayout;
use crate::voice::{Voice, ZoneId};
use crate::Result;
use serde::Serialize;

/// Snapshot of pool usage.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct VoiceStats {
    /// Voices in any state but `Free`
    pub active_voices: usize,
    /// Voices in `Releasing` or `Stealing`
    pub releasing_voices: usize,
    pub free_voices: usize,
    /// High-water mark of `active_voices` since the last [`VoiceManager::reset_stats`]
    pub peak_voices: usize,
    pub voices_stolen_total: u64,
    /// Active voices per zone, sorted by zone id
    pub by_zone: Vec<(ZoneId, usize)>,
    /// Active voices per group, sorted by group
    pub by_group: Vec<(u32, usize)>,
}

impl VoiceManager {
    /// Collect current statistics. Allocates; not for the audio thread.
    pub fn stats(&self) -> VoiceStats {
        let active_voices = self.active_count();

        let mut by_zone: Vec<(ZoneId, usize)> = self
            .index
            .by_zone
            .iter()
            .map(|(zone, ids)| (zone.clone(), ids.len()))
            .collect();
        by_zone.sort_unstable_by(|a, b| a.0.cmp(&b.0));

        let mut by_group: Vec<(u32, usize)> = self
            .index
            .by_group
            .iter()
            .map(|(&group, ids)| (group, ids.len()))
            .collect();
        by_group.sort_unstable_by_key(|&(group, _)| group);

        VoiceStats {
            active_voices,
            releasing_voices: self.releasing_count(),
            free_voices: self.voices.len() - active_voices,
            peak_voices: self.peak_voices,
            voices_stolen_total: self.total_stolen,
            by_zone,
            by_group,
        }
    }

    /// Restart the peak counter from the current load and zero the steal count.
    pub fn reset_stats(&mut self) {
        self.peak_voices = self.active_count();
        self.total_stolen = 0;
    }

    /// Merge `update` into the live config.
    ///
    /// Changing `max_polyphony` resizes the pool. A rejected update leaves the
    /// manager untouched. Not RT-safe when the pool grows.
    pub fn set_config(&mut self, update: impl Into<VoiceConfigUpdate>) -> Result<()> {
        let next = self.config.merged(&update.into());
        if let Err(e) = next.validate() {
            tracing::debug!("Rejected voice config: {}", e);
            return Err(e);
        }

        let resize = next.max_polyphony != self.voices.len();
        self.unison = UnisonLayout::new(next.unison_voices, next.unison_detune, next.unison_spread);
        self.config = next;

        if resize {
            self.resize_pool(self.config.max_polyphony);
        }
        Ok(())
    }

    /// Grow with fresh free voices, or cut every voice past `size` and drop it.
    fn resize_pool(&mut self, size: usize) {
        let old_size = self.voices.len();

        if size > old_size {
            self.voices.extend((old_size..size).map(Voice::new));
            self.index.set_capacity(size);
        } else {
            let time = self.last_time;
            for voice in &mut self.voices[size..] {
                if voice.is_active() {
                    self.index.untrack(voice);
                    voice.steal(time);
                }
            }
            self.voices.truncate(size);
        }

        tracing::debug!("Voice pool resized: {} -> {}", old_size, size);
        debug_assert!(self.index.is_consistent(&self.voices));
    }
}
