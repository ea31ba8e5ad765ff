//! Limit checks and voice stealing.

use super::VoiceManager;
use crate::config::StealingMode;
use crate::voice::{Voice, VoiceId, ZoneId};
use std::cmp::Ordering;

/// Which cap blocked an allocation, and so which voices may be stolen to lift it.
///
/// A polyphony-only failure may steal from the whole pool. A zone or group
/// failure only steals inside that zone/group, otherwise the cap would stay hit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub(crate) struct StealScope {
    pub same_zone: bool,
    pub same_group: bool,
}

impl StealScope {
    fn admits(&self, voice: &Voice, zone_id: Option<&str>, group: u32) -> bool {
        (!self.same_zone || voice.zone_id().map(ZoneId::as_str) == zone_id)
            && (!self.same_group || voice.group() == group)
    }
}

/// First voice with the strictly greatest key, in slot order.
fn first_max_by<'a, K, I, F>(voices: I, key: F) -> Option<VoiceId>
where
    I: Iterator<Item = &'a Voice>,
    K: PartialOrd,
    F: Fn(&Voice) -> K,
{
    let mut best: Option<(VoiceId, K)> = None;
    for voice in voices {
        let k = key(voice);
        let better = match &best {
            Some((_, best_key)) => k.partial_cmp(best_key) == Some(Ordering::Greater),
            None => true,
        };
        if better {
            best = Some((voice.id(), k));
        }
    }
    best.map(|(id, _)| id)
}

impl VoiceManager {
    /// True if a voice for `zone_id`/`group` fits under every cap.
    pub fn check_limits(&self, zone_id: Option<&str>, group: u32) -> bool {
        self.limit_violation(zone_id, group).is_none()
    }

    /// `None` when all caps have room, otherwise the scope a steal must respect.
    pub(crate) fn limit_violation(&self, zone_id: Option<&str>, group: u32) -> Option<StealScope> {
        let polyphony_full = self.active_count() >= self.config.max_polyphony;

        let zone_limit = self.config.per_zone_limit;
        let zone_full = zone_limit > 0
            && zone_id.is_some_and(|zone| {
                self.count_stealable(self.index.by_zone.get(zone)) >= zone_limit
            });

        let group_limit = self.config.per_group_limit;
        let group_full =
            group_limit > 0 && self.count_stealable(self.index.by_group.get(&group)) >= group_limit;

        if polyphony_full || zone_full || group_full {
            Some(StealScope {
                same_zone: zone_full,
                same_group: group_full,
            })
        } else {
            None
        }
    }

    fn count_stealable(&self, ids: &[VoiceId]) -> usize {
        ids.iter()
            .filter(|&&id| self.voices[id].can_be_stolen())
            .count()
    }

    /// Steal one voice from the whole pool using the configured policy.
    ///
    /// The victim is untracked, marked stolen and reset to `Free` so its slot
    /// can be reused immediately. Returns `None` if stealing is disabled or
    /// nothing can be stolen.
    pub fn steal_voice(&mut self, zone_id: Option<&str>, group: u32, time: f64) -> Option<VoiceId> {
        self.steal_scoped(zone_id, group, StealScope::default(), &[], time)
    }

    /// Steal inside `scope`, never picking a voice listed in `exclude`.
    pub(crate) fn steal_scoped(
        &mut self,
        zone_id: Option<&str>,
        group: u32,
        scope: StealScope,
        exclude: &[VoiceId],
        time: f64,
    ) -> Option<VoiceId> {
        let victim = self.select_victim(zone_id, group, scope, exclude, time)?;

        self.index.untrack(&self.voices[victim]);

        let voice = &mut self.voices[victim];
        tracing::trace!(
            "Stealing voice {} (note {}, policy {:?})",
            victim,
            voice.note(),
            self.config.stealing_mode
        );
        voice.steal(time);
        voice.reset();
        self.total_stolen += 1;

        Some(victim)
    }

    fn select_victim(
        &self,
        zone_id: Option<&str>,
        group: u32,
        scope: StealScope,
        exclude: &[VoiceId],
        time: f64,
    ) -> Option<VoiceId> {
        let candidates = || {
            self.voices.iter().filter(move |v| {
                v.can_be_stolen() && !exclude.contains(&v.id()) && scope.admits(v, zone_id, group)
            })
        };
        let age = |v: &Voice| time - v.start_time();

        match self.config.stealing_mode {
            StealingMode::NoSteal => None,
            StealingMode::Oldest => first_max_by(candidates(), age),
            StealingMode::Quietest => first_max_by(candidates(), |v| -v.amplitude),
            StealingMode::SameNote => {
                let same_zone = candidates()
                    .filter(|v| zone_id.is_some() && v.zone_id().map(ZoneId::as_str) == zone_id);
                first_max_by(same_zone, age).or_else(|| first_max_by(candidates(), age))
            }
            StealingMode::Furthest => {
                let last = self.last_note.unwrap_or(super::DEFAULT_LAST_NOTE) as i32;
                first_max_by(candidates(), |v| (v.note() as i32 - last).abs())
            }
        }
    }
}
