//! Stealing integration tests
//!
//! One test per policy, each filling a small pool and checking which slot
//! the next note lands in.

use crate::helpers::*;
use voicepool::prelude::*;

fn full_pool(mode: StealingMode, notes: &[(u8, f64)]) -> VoiceManager {
    let mut manager = test_manager(VoiceConfig::poly(notes.len()).with_stealing(mode));
    for &(note, time) in notes {
        note_on(&mut manager, "z", note, time);
    }
    render_block(&mut manager);
    manager
}

#[test]
fn test_oldest_takes_earliest_start() {
    let mut manager = full_pool(
        StealingMode::Oldest,
        &[(60, 2000.0), (62, 1000.0), (64, 3000.0)],
    );

    let ids = note_on(&mut manager, "z", 65, 4000.0);
    assert_eq!(ids.as_slice(), &[1]);
    assert_eq!(active_notes(&manager), vec![60, 64, 65]);
    assert_eq!(manager.stats().voices_stolen_total, 1);
}

#[test]
fn test_quietest_takes_lowest_amplitude() {
    let mut manager = full_pool(StealingMode::Quietest, &[(60, 0.0), (62, 1.0), (64, 2.0)]);
    manager.voice_mut(0).unwrap().amplitude = 0.8;
    manager.voice_mut(1).unwrap().amplitude = 0.6;
    manager.voice_mut(2).unwrap().amplitude = 0.05;

    let ids = note_on(&mut manager, "z", 67, 3.0);
    assert_eq!(ids.as_slice(), &[2]);
    assert_eq!(active_notes(&manager), vec![60, 62, 67]);
}

#[test]
fn test_releasing_voices_are_fair_game() {
    let mut manager = full_pool(StealingMode::Quietest, &[(60, 0.0), (62, 1.0)]);
    manager.handle_event(VoiceEvent::note_off(60, 2.0));
    manager.voice_mut(0).unwrap().amplitude = 0.1;
    manager.voice_mut(1).unwrap().amplitude = 0.7;

    let ids = note_on(&mut manager, "z", 64, 3.0);
    assert_eq!(ids.as_slice(), &[0]);
    assert_eq!(manager.voice(0).unwrap().state(), VoiceState::Starting);
}

#[test]
fn test_same_note_prefers_requesting_zone() {
    let mut manager = test_manager(VoiceConfig::poly(3).with_stealing(StealingMode::SameNote));
    note_on(&mut manager, "strings", 60, 0.0);
    note_on(&mut manager, "piano", 62, 1.0);
    note_on(&mut manager, "piano", 64, 2.0);

    let ids = note_on(&mut manager, "piano", 65, 3.0);
    assert_eq!(ids.as_slice(), &[1]);
    assert_eq!(manager.voices_for_zone("strings").count(), 1);

    // No voice of the zone left to take: fall back to the oldest overall
    let ids = note_on(&mut manager, "organ", 48, 4.0);
    assert_eq!(ids.as_slice(), &[0]);
    assert_eq!(manager.voices_for_zone("strings").count(), 0);
}

/// Distances 12, 12 and 0 from the last note: the first of the tied pair goes.
#[test]
fn test_furthest_tie_takes_first_slot() {
    let mut manager = full_pool(StealingMode::Furthest, &[(48, 0.0), (72, 1.0), (60, 2.0)]);
    assert_eq!(manager.last_note(), Some(60));

    let ids = note_on(&mut manager, "z", 61, 3.0);
    assert_eq!(ids.as_slice(), &[0]);
    assert_eq!(active_notes(&manager), vec![60, 61, 72]);
}

#[test]
fn test_furthest_uses_latest_note() {
    let mut manager = full_pool(StealingMode::Furthest, &[(40, 0.0), (60, 1.0), (84, 2.0)]);

    // Last note 84: note 40 is furthest
    let ids = note_on(&mut manager, "z", 83, 3.0);
    assert_eq!(ids.as_slice(), &[0]);

    // Last note 83: note 60 is now furthest
    let ids = note_on(&mut manager, "z", 82, 4.0);
    assert_eq!(ids.as_slice(), &[1]);
}

#[test]
fn test_steal_voice_directly() {
    let mut manager = full_pool(StealingMode::Oldest, &[(60, 0.0), (62, 1.0)]);

    assert_eq!(manager.steal_voice(Some("z"), 0, 2.0), Some(0));
    assert!(manager.voice(0).unwrap().is_free());
    assert_eq!(manager.free_count(), 1);
    assert_eq!(manager.stats().voices_stolen_total, 1);
}

#[test]
fn test_stealing_voices_are_not_stolen_again() {
    let mut manager = test_manager(VoiceConfig::poly(2));
    let hat = NoteTrigger::new(46, 100).exclusive_group(1);

    manager.allocate_voice(&hat, 0.0);
    manager.allocate_voice(&hat, 1.0);
    // Slot 0 is fading out; slot 1 sounds
    assert_eq!(manager.voice(0).unwrap().state(), VoiceState::Stealing);

    let ids = manager.allocate_voice(&NoteTrigger::new(60, 100), 2.0);
    assert_eq!(ids.as_slice(), &[1]);
    assert_eq!(manager.voice(0).unwrap().state(), VoiceState::Stealing);
}
