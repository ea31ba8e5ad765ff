//! Voice lifecycle integration tests
//!
//! Drives voices through release tails, the sustain pedal, reclaim, hard
//! stop and live reconfiguration.

use crate::helpers::*;
use voicepool::prelude::*;
use voicepool::SILENCE_THRESHOLD;

#[test]
fn test_release_tail_then_reclaim() {
    let mut manager = test_manager(VoiceConfig::poly(4));

    let ids = note_on(&mut manager, "piano", 60, 0.0);
    render_block(&mut manager);
    manager.handle_event(VoiceEvent::note_off(60, 1.0));

    let id = ids[0];
    assert_eq!(manager.voice(id).unwrap().state(), VoiceState::Releasing);
    assert_eq!(manager.voice(id).unwrap().release_time(), Some(1.0));

    // Tail decays across a few blocks
    for amplitude in [0.5, 0.1, 0.01] {
        manager.voice_mut(id).unwrap().amplitude = amplitude;
        assert_eq!(manager.process_finished_voices(), 0);
    }

    manager.voice_mut(id).unwrap().amplitude = SILENCE_THRESHOLD / 2.0;
    assert_eq!(manager.process_finished_voices(), 1);
    assert!(manager.voice(id).unwrap().is_free());
    assert!(manager.tracking_is_empty());
}

/// Reclaiming with nothing below the threshold changes nothing.
#[test]
fn test_reclaim_is_idempotent() {
    let mut manager = test_manager(VoiceConfig::poly(4));
    note_on(&mut manager, "a", 60, 0.0);
    note_on(&mut manager, "a", 64, 0.0);
    manager.handle_event(VoiceEvent::note_off(64, 1.0));
    manager.voice_mut(1).unwrap().amplitude = 0.3;

    let before: Vec<VoiceState> = manager.voices().iter().map(Voice::state).collect();
    let stats_before = manager.stats();

    for _ in 0..3 {
        assert_eq!(manager.process_finished_voices(), 0);
    }

    let after: Vec<VoiceState> = manager.voices().iter().map(Voice::state).collect();
    assert_eq!(before, after);
    assert_eq!(stats_before, manager.stats());
}

#[test]
fn test_stop_all_clears_everything() {
    let mut manager = test_manager(VoiceConfig::poly(8));
    manager.allocate_voice(&NoteTrigger::new(60, 100).zone("a").group(1), 0.0);
    manager.allocate_voice(&NoteTrigger::new(42, 100).zone("hat").exclusive_group(3), 0.0);
    manager.handle_event(VoiceEvent::note_off(60, 1.0));

    manager.handle_event(VoiceEvent::StopAll);

    assert_eq!(manager.active_voices().count(), 0);
    assert!(manager.tracking_is_empty());
    assert_eq!(manager.free_count(), 8);
    assert!(manager.stats().by_zone.is_empty());
}

#[test]
fn test_release_all_lets_tails_ring() {
    let mut manager = test_manager(VoiceConfig::poly(4));
    for note in [48, 52, 55] {
        note_on(&mut manager, "pad", note, 0.0);
    }

    manager.handle_event(VoiceEvent::ReleaseAll { time: 2.0 });
    assert_eq!(manager.releasing_count(), 3);
    assert_eq!(manager.voices_for_zone("pad").count(), 3);

    assert_eq!(finish_tails(&mut manager), 3);
    assert!(manager.tracking_is_empty());
}

#[test]
fn test_sustain_pedal() {
    let mut manager = test_manager(VoiceConfig::poly(4));
    note_on(&mut manager, "piano", 60, 0.0);
    note_on(&mut manager, "piano", 64, 0.0);
    render_block(&mut manager);

    manager.handle_event(VoiceEvent::Sustain { on: true, time: 0.5 });
    manager.handle_event(VoiceEvent::note_off(60, 1.0));
    manager.handle_event(VoiceEvent::note_off(64, 1.0));
    assert_eq!(sounding_notes(&manager), vec![60, 64]);
    assert!(manager.voices().iter().filter(|v| v.is_active()).all(Voice::sustained));

    // Restrike while held, then lift the pedal
    note_on(&mut manager, "piano", 67, 1.5);
    manager.handle_event(VoiceEvent::Sustain { on: false, time: 2.0 });

    assert_eq!(sounding_notes(&manager), vec![67]);
    assert_eq!(manager.releasing_count(), 2);
    assert!(!manager.sustain());
}

#[test]
fn test_peak_and_reset_stats() {
    let mut manager = test_manager(VoiceConfig::poly(4));
    for note in [60, 62, 64] {
        note_on(&mut manager, "z", note, 0.0);
    }
    manager.handle_event(VoiceEvent::ReleaseAll { time: 1.0 });
    finish_tails(&mut manager);
    note_on(&mut manager, "z", 65, 2.0);

    let stats = manager.stats();
    assert_eq!(stats.active_voices, 1);
    assert_eq!(stats.peak_voices, 3);

    manager.reset_stats();
    assert_eq!(manager.stats().peak_voices, 1);
}

#[test]
fn test_json_config_update() {
    let mut manager = test_manager(VoiceConfig::poly(4));
    note_on(&mut manager, "z", 60, 0.0);

    let update: VoiceConfigUpdate =
        serde_json::from_str(r#"{"max_polyphony": 6, "stealing_mode": "quietest"}"#).unwrap();
    manager.set_config(update).unwrap();

    assert_eq!(manager.pool_size(), 6);
    assert_eq!(manager.config().stealing_mode, StealingMode::Quietest);
    assert_eq!(manager.config().mode, VoiceMode::Poly);
    assert_eq!(active_notes(&manager), vec![60]);
}

#[test]
fn test_shrink_drops_high_slots() {
    let mut manager = test_manager(VoiceConfig::poly(4));
    for (time, note) in [60, 62, 64, 66].into_iter().enumerate() {
        note_on(&mut manager, "z", note, time as f64);
    }

    manager
        .set_config(VoiceConfigUpdate {
            max_polyphony: Some(2),
            ..Default::default()
        })
        .unwrap();

    assert_eq!(manager.pool_size(), 2);
    assert_eq!(active_notes(&manager), vec![60, 62]);
    assert_eq!(manager.voices_for_zone("z").count(), 2);
    assert!(manager.voices_for_note(66).next().is_none());
}

#[test]
fn test_invalid_update_is_rejected() {
    let mut manager = test_manager(VoiceConfig::poly(4));
    let update = VoiceConfigUpdate {
        max_polyphony: Some(8),
        unison_voices: Some(32),
        ..Default::default()
    };

    let err = manager.set_config(update).unwrap_err();
    assert!(matches!(err, voicepool::alloc::Error::InvalidConfig(_)));
    assert_eq!(manager.pool_size(), 4);

    // Umbrella error wraps it
    let wrapped: Error = err.into();
    assert!(wrapped.to_string().starts_with("Voice allocation"));
}
