//! Auto-pause: emptying forces acknowledgment before time flows again.

use hourglass_core::{
    event::{IgnoreReason, SimEvent},
    glass::GlassStatus,
    observer::RecordingObserver,
    SimEngine,
};
use std::{collections::BTreeSet, time::Duration};

/// Two glasses; the 5s one empties while the 20s one has 15s left.
fn auto_paused() -> (SimEngine, u64, u64) {
    let mut engine = SimEngine::default();
    let short = engine.add_glass(5, None).expect("add short");
    let long = engine.add_glass(20, None).expect("add long");
    engine.start();
    engine.run_for(Duration::from_secs(5));
    assert!(engine.auto_paused(), "setup: short glass should have emptied");
    (engine, short, long)
}

#[test]
fn emptying_pauses_every_running_glass() {
    let (engine, short, long) = auto_paused();
    let snap = engine.snapshot();

    assert!(snap.paused && snap.auto_paused);
    assert_eq!(snap.glass(short).expect("short").status, GlassStatus::Empty);
    assert_eq!(snap.glass(long).expect("long").status, GlassStatus::Paused);
    assert_eq!(snap.count(GlassStatus::Running), 0);
}

#[test]
fn prompt_preselects_empty_glasses() {
    let (engine, short, long) = auto_paused();
    let prompt = engine.snapshot().acknowledgment.expect("prompt open");

    assert_eq!(prompt.rows.len(), 2);
    let preselected: Vec<u64> = prompt.preselected().collect();
    assert_eq!(preselected, vec![short]);
    assert!(prompt.rows.iter().any(|r| r.id == long && !r.preselected));
}

#[test]
fn start_is_refused_while_an_empty_glass_is_unacknowledged() {
    let (mut engine, _, _) = auto_paused();
    engine.dismiss_acknowledgment();
    assert!(engine.snapshot().acknowledgment.is_none());

    engine.start();

    let snap = engine.snapshot();
    assert!(snap.paused, "start must not resume");
    assert!(snap.auto_paused);
    assert!(snap.acknowledgment.is_some(), "start re-opens the prompt");
    assert!(matches!(
        engine.last_events(),
        [SimEvent::AcknowledgmentRequired { .. }]
    ));
}

#[test]
fn apply_with_flip_flips_selected_then_resumes() {
    let (mut engine, short, long) = auto_paused();

    engine.apply_acknowledgment(&BTreeSet::from([short]), true);

    let snap = engine.snapshot();
    assert!(!snap.paused && !snap.auto_paused && snap.running);
    let s = snap.glass(short).expect("short");
    assert_eq!(s.status, GlassStatus::Running);
    assert_eq!(s.remaining, 5.0);
    assert_eq!(s.flip_count, 1);
    assert_eq!(snap.glass(long).expect("long").status, GlassStatus::Running);
    assert!(snap.acknowledgment.is_none());
}

#[test]
fn apply_without_flip_skips_the_empty_glass() {
    let (mut engine, short, long) = auto_paused();

    engine.apply_acknowledgment(&BTreeSet::from([short]), false);

    let snap = engine.snapshot();
    assert!(!snap.auto_paused && !snap.paused);
    assert_eq!(snap.glass(short).expect("short").status, GlassStatus::Empty);
    assert_eq!(snap.glass(short).expect("short").flip_count, 0);
    assert_eq!(snap.glass(long).expect("long").status, GlassStatus::Running);

    // Time flows again for the survivor only.
    engine.run_for(Duration::from_secs(1));
    assert_eq!(engine.glass(long).expect("long").remaining, Duration::from_secs(14));
}

#[test]
fn apply_outside_auto_pause_is_ignored() {
    let mut engine = SimEngine::default();
    let id = engine.add_glass(5, None).expect("add glass");
    engine.start();
    let before = engine.snapshot();

    engine.apply_acknowledgment(&BTreeSet::from([id]), true);

    assert_eq!(engine.snapshot(), before);
    assert!(matches!(
        engine.last_events(),
        [SimEvent::CommandIgnored { reason: IgnoreReason::NoAcknowledgmentPending, .. }]
    ));
}

#[test]
fn flipping_the_last_empty_glass_lifts_auto_pause() {
    let (mut engine, short, long) = auto_paused();

    engine.flip(short);

    let snap = engine.snapshot();
    assert!(!snap.auto_paused && !snap.paused);
    assert_eq!(snap.glass(short).expect("short").status, GlassStatus::Running);
    assert_eq!(snap.glass(long).expect("long").status, GlassStatus::Running);
    assert!(engine.last_events().contains(&SimEvent::AutoPauseLifted));
}

#[test]
fn removing_the_last_empty_glass_lifts_auto_pause() {
    let (mut engine, short, long) = auto_paused();

    engine.remove_glass(short);

    let snap = engine.snapshot();
    assert!(!snap.auto_paused && !snap.paused);
    assert_eq!(snap.glasses.len(), 1);
    assert_eq!(snap.glass(long).expect("long").status, GlassStatus::Running);
}

#[test]
fn one_auto_pause_for_glasses_emptying_together() {
    let mut engine = SimEngine::default();
    let ids: Vec<u64> = (0..3).map(|_| engine.add_glass(2, None).expect("add")).collect();
    engine.register(Box::new(RecordingObserver::default()));
    engine.start();
    engine.run_for(Duration::from_secs(2));

    let recorder = engine.observer::<RecordingObserver>().expect("recorder");
    let auto_pauses: Vec<&SimEvent> = recorder
        .updates
        .iter()
        .flat_map(|(_, events)| events)
        .filter(|e| matches!(e, SimEvent::AutoPaused { .. }))
        .collect();
    assert_eq!(auto_pauses, vec![&SimEvent::AutoPaused { emptied: ids }]);
}

#[test]
fn manual_pause_needs_no_acknowledgment() {
    let mut engine = SimEngine::default();
    let id = engine.add_glass(30, None).expect("add glass");
    engine.start();
    engine.pause();

    let snap = engine.snapshot();
    assert!(snap.paused && !snap.auto_paused);
    assert!(snap.acknowledgment.is_none());
    assert_eq!(snap.glass(id).expect("glass").status, GlassStatus::Paused);

    engine.start();
    assert_eq!(engine.glass(id).expect("glass").status, GlassStatus::Running);
    assert!(engine.last_events().contains(&SimEvent::SimulationResumed));
}
