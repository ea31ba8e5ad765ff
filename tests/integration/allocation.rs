//! Allocation integration tests
//!
//! Fills the pool the way a sampler's trigger layer would and checks the
//! caps hold.

use crate::helpers::*;
use voicepool::prelude::*;

/// Four voices, a fifth note steals the oldest.
#[test]
fn test_full_pool_steals_oldest() {
    let mut manager = test_manager(VoiceConfig::poly(4).with_stealing(StealingMode::Oldest));

    for (time, note) in [60, 62, 64, 66].into_iter().enumerate() {
        let ids = note_on(&mut manager, "z", note, time as f64);
        assert_eq!(ids.len(), 1);
    }
    assert_eq!(manager.active_count(), 4);

    let ids = note_on(&mut manager, "z", 67, 4.0);
    assert_eq!(ids.len(), 1);
    assert_eq!(active_notes(&manager), vec![62, 64, 66, 67]);
    assert_eq!(manager.stats().voices_stolen_total, 1);
    assert_eq!(manager.voices_for_note(60).count(), 0);
}

/// A full zone steals inside the zone and leaves other zones alone.
#[test]
fn test_zone_limit_steals_within_zone() {
    let mut manager = test_manager(VoiceConfig::poly(8).with_zone_limit(2));

    note_on(&mut manager, "pad", 48, 0.0);
    note_on(&mut manager, "kick", 36, 1.0);
    note_on(&mut manager, "kick", 36, 2.0);
    note_on(&mut manager, "kick", 36, 3.0);

    assert_eq!(manager.voices_for_zone("kick").count(), 2);
    assert_eq!(manager.voices_for_zone("pad").count(), 1);
    assert_eq!(manager.active_count(), 3);

    // The kick started at t=1 went
    let mut starts: Vec<f64> = manager
        .voices_for_zone("kick")
        .map(Voice::start_time)
        .collect();
    starts.sort_by(f64::total_cmp);
    assert_eq!(starts, vec![2.0, 3.0]);
}

#[test]
fn test_group_limit_steals_within_group() {
    let mut manager = test_manager(VoiceConfig::poly(8).with_group_limit(1));

    let strings = NoteTrigger::new(55, 90).zone("strings").group(1);
    let brass = NoteTrigger::new(58, 90).zone("brass").group(2);

    manager.allocate_voice(&strings, 0.0);
    manager.allocate_voice(&brass, 0.5);
    manager.allocate_voice(&NoteTrigger { note: 57, ..strings.clone() }, 1.0);

    assert_eq!(manager.voices_for_group(1).count(), 1);
    assert_eq!(manager.voices_for_group(1).next().map(Voice::note), Some(57));
    assert_eq!(manager.voices_for_group(2).count(), 1);
    assert_eq!(manager.stats().voices_stolen_total, 1);
}

#[test]
fn test_check_limits_reports_caps() {
    let mut manager = test_manager(VoiceConfig::poly(2).with_zone_limit(1));
    assert!(manager.check_limits(Some("a"), 0));

    note_on(&mut manager, "a", 60, 0.0);
    assert!(!manager.check_limits(Some("a"), 0));
    assert!(manager.check_limits(Some("b"), 0));

    note_on(&mut manager, "b", 62, 1.0);
    assert!(!manager.check_limits(Some("c"), 0));
}

/// Closed hi-hat chokes the open one.
#[test]
fn test_exclusive_group_chokes_open_hat() {
    let mut manager = test_manager(VoiceConfig::poly(8));

    let open = NoteTrigger::new(46, 100).zone("open_hat").exclusive_group(1);
    let closed = NoteTrigger::new(42, 100).zone("closed_hat").exclusive_group(1);
    let snare = NoteTrigger::new(38, 100).zone("snare");

    let open_ids = manager.allocate_voice(&open, 0.0);
    manager.allocate_voice(&snare, 0.0);
    render_block(&mut manager);

    let closed_ids = manager.allocate_voice(&closed, 0.25);
    let choked = manager.voice(open_ids[0]).unwrap();
    assert_eq!(choked.state(), VoiceState::Stealing);
    assert!(choked.stolen());
    assert_eq!(choked.release_time(), Some(0.25));

    // Only the closed hat and the snare still sound
    assert_eq!(sounding_notes(&manager), vec![38, 42]);
    assert_ne!(open_ids[0], closed_ids[0]);

    // Choked voice is reclaimed once its fade ends; cuts do not count as steals
    assert_eq!(finish_tails(&mut manager), 1);
    assert_eq!(manager.active_count(), 2);
    assert_eq!(manager.stats().voices_stolen_total, 0);
}

#[test]
fn test_no_steal_drops_notes() {
    let mut manager = test_manager(VoiceConfig::poly(2).with_stealing(StealingMode::NoSteal));

    note_on(&mut manager, "z", 60, 0.0);
    note_on(&mut manager, "z", 62, 1.0);
    let ids = note_on(&mut manager, "z", 64, 2.0);

    assert!(ids.is_empty());
    assert_eq!(active_notes(&manager), vec![60, 62]);
    assert_eq!(manager.stats().voices_stolen_total, 0);
}

#[test]
fn test_trigger_fields_reach_the_voice() {
    let mut manager = test_manager(VoiceConfig::poly(4));
    let trigger = NoteTrigger::new(64, 127).zone("rhodes").output(3).group(7);

    let ids = manager.allocate_voice(&trigger, 1.5);
    let voice = manager.voice(ids[0]).unwrap();

    assert_eq!(voice.zone_id().map(ZoneId::as_str), Some("rhodes"));
    assert_eq!(voice.output(), 3);
    assert_eq!(voice.group(), 7);
    assert_eq!(voice.start_time(), 1.5);
    assert_eq!(voice.velocity(), 127);
    assert!((voice.gain() - 1.0).abs() < f32::EPSILON);
    assert_eq!(manager.last_note(), Some(64));
}
