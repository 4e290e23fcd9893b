//! Adding, removing, resetting and clearing glasses.

use hourglass_core::{
    config::SimConfig,
    error::{SimError, ValidationError},
    event::SimEvent,
    glass::{Direction, GlassStatus},
    observer::RecordingObserver,
    SimEngine,
};
use std::time::Duration;

#[test]
fn new_glass_is_idle_and_full() {
    let mut engine = SimEngine::default();
    let id = engine.add_glass(90, Some("  Tea  ")).expect("add glass");

    let snap = engine.snapshot();
    let glass = snap.glass(id).expect("glass");
    assert_eq!(glass.name, "Tea");
    assert_eq!(glass.status, GlassStatus::Idle);
    assert_eq!(glass.remaining, 90.0);
    assert_eq!(glass.pct, 100.0);
    assert_eq!(glass.direction, Direction::TopToBottom);
    assert_eq!(glass.flip_count, 0);
}

#[test]
fn blank_name_takes_sequence_name() {
    let mut engine = SimEngine::default();
    let a = engine.add_glass(10, Some("   ")).expect("add a");
    let b = engine.add_glass(10, None).expect("add b");
    assert_eq!(engine.glass(a).expect("a").name, "A");
    assert_eq!(engine.glass(b).expect("b").name, "B");
}

#[test]
fn capacity_bounds_are_enforced() {
    let config = SimConfig { max_capacity_secs: 120, ..SimConfig::default() };
    let mut engine = SimEngine::new(config).expect("engine");

    assert!(matches!(
        engine.add_glass(0, None),
        Err(SimError::Validation(ValidationError::CapacityNotPositive))
    ));
    assert!(matches!(
        engine.add_glass(121, None),
        Err(SimError::Validation(ValidationError::CapacityTooLarge { max_secs: 120 }))
    ));
    assert!(engine.glasses().is_empty(), "rejected adds must not mutate state");
    assert!(engine.add_glass(120, None).is_ok());
}

#[test]
fn glass_limit_rejects_without_change() {
    let config = SimConfig { max_glasses: 2, ..SimConfig::default() };
    let mut engine = SimEngine::new(config).expect("engine");
    engine.add_glass(10, None).expect("add 1");
    engine.add_glass(10, None).expect("add 2");
    let before = engine.snapshot();

    let err = engine.add_glass(10, None).expect_err("third glass");
    assert!(matches!(err, SimError::GlassLimitReached { max: 2 }));
    assert_eq!(err.to_string(), "Max 2 reached");
    assert_eq!(engine.snapshot(), before);
}

#[test]
fn raw_input_is_validated() {
    let mut engine = SimEngine::default();

    let err = engine.add_glass_input("75", "0", None).expect_err("minutes too big");
    assert!(matches!(err, SimError::Validation(ValidationError::MinutesOutOfRange)));
    let err = engine.add_glass_input("", "", None).expect_err("blank");
    assert!(matches!(err, SimError::Validation(ValidationError::MissingCapacity)));

    let id = engine.add_glass_input("1", "15", Some("Egg")).expect("valid input");
    assert_eq!(engine.glass(id).expect("glass").capacity, Duration::from_secs(75));
}

#[test]
fn ids_are_never_reused() {
    let mut engine = SimEngine::default();
    let a = engine.add_glass(10, None).expect("add a");
    engine.remove_glass(a);
    let b = engine.add_glass(10, None).expect("add b");
    engine.clear_all();
    let c = engine.add_glass(10, None).expect("add c");

    assert!(a < b && b < c);
}

#[test]
fn remove_unknown_glass_is_a_no_op() {
    let mut engine = SimEngine::default();
    engine.add_glass(10, None).expect("add glass");
    let before = engine.snapshot();
    engine.remove_glass(77);
    assert_eq!(engine.snapshot(), before);
}

#[test]
fn reset_restores_glasses_but_keeps_them() {
    let mut engine = SimEngine::default();
    let id = engine.add_glass(20, None).expect("add glass");
    engine.set_speed(2.0).expect("speed");
    engine.start();
    engine.run_for(Duration::from_secs(3));
    engine.flip(id);

    engine.reset();

    let snap = engine.snapshot();
    assert!(!snap.running && !snap.paused && !snap.auto_paused);
    assert_eq!(snap.elapsed, 0.0);
    assert_eq!(snap.total_flips, 0);
    assert!(snap.log.is_empty());
    assert_eq!(snap.speed_multiplier, 2.0, "speed survives reset");
    let glass = snap.glass(id).expect("glass");
    assert_eq!(glass.status, GlassStatus::Idle);
    assert_eq!(glass.remaining, 20.0);
    assert_eq!(glass.direction, Direction::TopToBottom);
    assert_eq!(glass.flip_count, 0);
}

#[test]
fn clear_all_rewinds_name_sequence() {
    let mut engine = SimEngine::default();
    engine.add_glass(10, None).expect("add");
    engine.add_glass(10, None).expect("add");
    engine.set_goal(30).expect("goal");
    engine.start();
    engine.run_for(Duration::from_secs(1));

    engine.clear_all();

    let snap = engine.snapshot();
    assert!(snap.glasses.is_empty());
    assert!(!snap.running);
    assert_eq!(snap.elapsed, 0.0);
    assert_eq!(snap.goal_target, Some(30));

    let id = engine.add_glass(10, None).expect("add after clear");
    assert_eq!(engine.glass(id).expect("glass").name, "A");
}

#[test]
fn clear_all_on_empty_collection_is_ignored() {
    let mut engine = SimEngine::default();
    engine.add_glass(10, None).expect("add");
    engine.remove_glass(1);
    engine.add_glass(10, None).expect("add");
    engine.remove_glass(2);

    engine.clear_all();

    // Name counter was not rewound: the next auto name continues.
    let id = engine.add_glass(10, None).expect("add");
    assert_eq!(engine.glass(id).expect("glass").name, "C");
}

#[test]
fn observers_see_each_completed_mutation_once() {
    let mut engine = SimEngine::default();
    engine.register(Box::new(RecordingObserver::default()));

    let id = engine.add_glass(10, Some("Tea")).expect("add glass");
    engine.start();
    engine.flip(999);
    engine.pause();
    engine.clear_goal();

    let recorder = engine.observer::<RecordingObserver>().expect("recorder");
    assert_eq!(recorder.updates.len(), 3, "ignored commands must not notify");

    let (snap, events) = &recorder.updates[0];
    assert_eq!(snap.glasses.len(), 1);
    assert_eq!(
        events,
        &vec![SimEvent::GlassAdded { id, name: "Tea".into(), capacity_secs: 10 }]
    );

    let (snap, events) = &recorder.updates[2];
    assert!(snap.paused);
    assert_eq!(events, &vec![SimEvent::SimulationPaused]);
}

#[test]
fn rejected_add_does_not_notify() {
    let mut engine = SimEngine::default();
    engine.register(Box::new(RecordingObserver::default()));

    assert!(engine.add_glass(0, None).is_err());
    assert!(engine.add_glass_input("1", "99", None).is_err());

    let recorder = engine.observer::<RecordingObserver>().expect("recorder");
    assert!(recorder.updates.is_empty());
}
