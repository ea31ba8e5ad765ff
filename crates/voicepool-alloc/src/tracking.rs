//! Inverted indexes from note/zone/group/exclusive group to voice slots.
//!
//! Entries are slot indices into the manager's pool, never voice copies.
//! A free voice is in none of the indexes.

use crate::voice::{Voice, VoiceId, ZoneId};
use hashbrown::HashMap;
use std::borrow::Borrow;
use std::hash::Hash;

/// Key -> list of voice slots.
///
/// Keys stay in the map once seen and their lists keep their capacity, so
/// after warm-up insert and remove never touch the heap.
#[derive(Debug, Clone)]
pub(crate) struct MultiIndex<K> {
    map: HashMap<K, Vec<VoiceId>>,
    /// Capacity reserved for every new key's list (the pool size)
    capacity: usize,
}

impl<K: Hash + Eq> Default for MultiIndex<K> {
    fn default() -> Self {
        Self::with_capacity(0)
    }
}

impl<K: Hash + Eq> MultiIndex<K> {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            map: HashMap::new(),
            capacity,
        }
    }

    /// Make room for `key` without indexing anything under it.
    pub fn reserve_key(&mut self, key: K) {
        let capacity = self.capacity;
        self.map
            .entry(key)
            .or_insert_with(|| Vec::with_capacity(capacity));
    }

    /// Grow every list (and future ones) to hold `capacity` slots.
    pub fn set_capacity(&mut self, capacity: usize) {
        self.capacity = capacity;
        for ids in self.map.values_mut() {
            ids.reserve(capacity.saturating_sub(ids.len()));
        }
    }

    pub fn insert(&mut self, key: K, id: VoiceId) {
        let capacity = self.capacity;
        let ids = self
            .map
            .entry(key)
            .or_insert_with(|| Vec::with_capacity(capacity));
        if !ids.contains(&id) {
            ids.push(id);
        }
    }

    /// Emptied lists are kept for reuse.
    pub fn remove<Q>(&mut self, key: &Q, id: VoiceId)
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        if let Some(ids) = self.map.get_mut(key) {
            ids.retain(|&v| v != id);
        }
    }

    pub fn get<Q>(&self, key: &Q) -> &[VoiceId]
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.map.get(key).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Keys with at least one voice.
    pub fn iter(&self) -> impl Iterator<Item = (&K, &[VoiceId])> {
        self.map
            .iter()
            .filter(|(_, ids)| !ids.is_empty())
            .map(|(k, ids)| (k, ids.as_slice()))
    }

    pub fn clear(&mut self) {
        for ids in self.map.values_mut() {
            ids.clear();
        }
    }

    pub fn is_empty(&self) -> bool {
        self.map.values().all(Vec::is_empty)
    }

    fn ids(&self) -> impl Iterator<Item = VoiceId> + '_ {
        self.map.values().flatten().copied()
    }
}

/// The four lookup tables the manager keeps alongside the pool.
#[derive(Debug, Clone, Default)]
pub(crate) struct TrackingIndex {
    pub by_note: MultiIndex<u8>,
    pub by_zone: MultiIndex<ZoneId>,
    pub by_group: MultiIndex<u32>,
    pub by_exclusive: MultiIndex<u32>,
}

impl TrackingIndex {
    /// Indexes sized for a pool of `pool_size` voices, with every MIDI note
    /// and the default group already keyed.
    pub fn with_capacity(pool_size: usize) -> Self {
        let mut index = Self {
            by_note: MultiIndex::with_capacity(pool_size),
            by_zone: MultiIndex::with_capacity(pool_size),
            by_group: MultiIndex::with_capacity(pool_size),
            by_exclusive: MultiIndex::with_capacity(pool_size),
        };
        for note in 0..=127 {
            index.by_note.reserve_key(note);
        }
        index.by_group.reserve_key(0);
        index
    }

    /// Follow a pool resize.
    pub fn set_capacity(&mut self, pool_size: usize) {
        self.by_note.set_capacity(pool_size);
        self.by_zone.set_capacity(pool_size);
        self.by_group.set_capacity(pool_size);
        self.by_exclusive.set_capacity(pool_size);
    }

    /// Index a freshly started voice.
    pub fn track(&mut self, voice: &Voice) {
        let id = voice.id();
        self.by_note.insert(voice.note(), id);
        if let Some(zone) = voice.zone_id() {
            self.by_zone.insert(zone.clone(), id);
        }
        self.by_group.insert(voice.group(), id);
        if let Some(group) = voice.exclusive_group() {
            self.by_exclusive.insert(group, id);
        }
    }

    /// Remove a voice from every index (keys are read from the voice).
    pub fn untrack(&mut self, voice: &Voice) {
        let id = voice.id();
        self.by_note.remove(&voice.note(), id);
        if let Some(zone) = voice.zone_id() {
            self.by_zone.remove(zone, id);
        }
        self.by_group.remove(&voice.group(), id);
        if let Some(group) = voice.exclusive_group() {
            self.by_exclusive.remove(&group, id);
        }
    }

    pub fn clear(&mut self) {
        self.by_note.clear();
        self.by_zone.clear();
        self.by_group.clear();
        self.by_exclusive.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.by_note.is_empty()
            && self.by_zone.is_empty()
            && self.by_group.is_empty()
            && self.by_exclusive.is_empty()
    }

    /// True if no entry points past the pool or at a free voice.
    pub fn is_consistent(&self, voices: &[Voice]) -> bool {
        self.by_note
            .ids()
            .chain(self.by_zone.ids())
            .chain(self.by_group.ids())
            .chain(self.by_exclusive.ids())
            .all(|id| voices.get(id).is_some_and(Voice::is_active))
    }
}
