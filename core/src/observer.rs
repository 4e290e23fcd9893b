//! Observer trait for the presentation side.
//!
//! RULE: Observers only read. They receive a snapshot after each completed
//! mutation and never hold a reference into the engine.

use crate::{event::SimEvent, snapshot::SimSnapshot};
use std::any::Any;

pub trait SimObserver: Send {
    /// Unique stable name for this observer.
    fn name(&self) -> &'static str;

    /// Called once per completed mutation, after state is final.
    ///
    /// - `snapshot`: the full post-mutation state
    /// - `events`:   what this mutation caused, in order
    fn on_update(&mut self, snapshot: &SimSnapshot, events: &[SimEvent]);

    /// For downcasting in tests and tooling only.
    fn as_any(&self) -> &dyn Any;
}

/// Forwards events to the `log` facade, one line per notable event.
#[derive(Debug, Default)]
pub struct LogObserver;

impl SimObserver for LogObserver {
    fn name(&self) -> &'static str { "log" }

    fn on_update(&mut self, _snapshot: &SimSnapshot, events: &[SimEvent]) {
        for event in events {
            match event {
                SimEvent::GlassEmptied { name, .. } => log::info!("{name} is empty!"),
                SimEvent::GlassFlipped { name, flip_count, .. } => {
                    log::info!("{name} flipped × {flip_count}")
                }
                SimEvent::GlassAdded { name, capacity_secs, .. } => log::info!(
                    "{name} added ({})",
                    crate::format::format_short(*capacity_secs as f64)
                ),
                SimEvent::GoalReached { .. } => log::info!("GOAL REACHED, simulation stopped"),
                SimEvent::GoalSet { target_secs } => log::info!(
                    "Goal set: {}",
                    crate::format::format_hms(*target_secs as f64)
                ),
                SimEvent::AllCleared { .. } => log::info!("Cleared all hourglasses"),
                SimEvent::SimulationReset => log::info!("All hourglasses reset"),
                other => log::trace!("event {}", other.kind()),
            }
        }
    }

    fn as_any(&self) -> &dyn Any { self }
}

/// Keeps every update it sees. Meant for tests.
#[derive(Debug, Default)]
pub struct RecordingObserver {
    pub updates: Vec<(SimSnapshot, Vec<SimEvent>)>,
}

impl SimObserver for RecordingObserver {
    fn name(&self) -> &'static str { "recording" }

    fn on_update(&mut self, snapshot: &SimSnapshot, events: &[SimEvent]) {
        self.updates.push((snapshot.clone(), events.to_vec()));
    }

    fn as_any(&self) -> &dyn Any { self }
}
