//! Events emitted by engine operations.
//!
//! Each operation collects the events it caused; observers receive them
//! together with the post-mutation snapshot.

use crate::types::{DeltaSecs, GlassId};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SimEvent {
    // ── Glass collection ───────────────────────────
    GlassAdded {
        id: GlassId,
        name: String,
        capacity_secs: u64,
    },
    GlassRemoved {
        id: GlassId,
        name: String,
    },
    AllCleared {
        removed: usize,
    },

    // ── Run control ────────────────────────────────
    SimulationStarted,
    SimulationResumed,
    SimulationPaused,
    SimulationReset,
    SpeedChanged {
        multiplier: f64,
    },

    // ── Sand ───────────────────────────────────────
    GlassEmptied {
        id: GlassId,
        name: String,
    },
    GlassFlipped {
        id: GlassId,
        name: String,
        flip_count: u32,
        remaining_secs: f64,
    },
    Jumped {
        glass: Option<GlassId>,
        delta_secs: DeltaSecs,
    },

    // ── Acknowledgment ─────────────────────────────
    AutoPaused {
        emptied: Vec<GlassId>,
    },
    AutoPauseLifted,
    AcknowledgmentRequired {
        empty: Vec<GlassId>,
    },
    AcknowledgmentDismissed,
    AcknowledgmentApplied {
        flipped: Vec<GlassId>,
    },

    // ── Goal ───────────────────────────────────────
    GoalSet {
        target_secs: u64,
    },
    GoalCleared,
    GoalReached {
        target_secs: u64,
        elapsed_secs: f64,
    },

    // ── No-ops ─────────────────────────────────────
    CommandIgnored {
        command: String,
        reason: IgnoreReason,
    },
}

/// Why an operation left the state unchanged.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum IgnoreReason {
    UnknownGlass,
    GlassEmpty,
    GoalReached,
    AlreadyRunning,
    NotRunning,
    NoAcknowledgmentPending,
    ZeroDelta,
    NothingToClear,
}

impl SimEvent {
    /// Stable name of the variant, for log lines.
    pub fn kind(&self) -> &'static str {
        match self {
            SimEvent::GlassAdded { .. }             => "glass_added",
            SimEvent::GlassRemoved { .. }           => "glass_removed",
            SimEvent::AllCleared { .. }             => "all_cleared",
            SimEvent::SimulationStarted             => "simulation_started",
            SimEvent::SimulationResumed             => "simulation_resumed",
            SimEvent::SimulationPaused              => "simulation_paused",
            SimEvent::SimulationReset               => "simulation_reset",
            SimEvent::SpeedChanged { .. }           => "speed_changed",
            SimEvent::GlassEmptied { .. }           => "glass_emptied",
            SimEvent::GlassFlipped { .. }           => "glass_flipped",
            SimEvent::Jumped { .. }                 => "jumped",
            SimEvent::AutoPaused { .. }             => "auto_paused",
            SimEvent::AutoPauseLifted               => "auto_pause_lifted",
            SimEvent::AcknowledgmentRequired { .. } => "acknowledgment_required",
            SimEvent::AcknowledgmentDismissed       => "acknowledgment_dismissed",
            SimEvent::AcknowledgmentApplied { .. }  => "acknowledgment_applied",
            SimEvent::GoalSet { .. }                => "goal_set",
            SimEvent::GoalCleared                   => "goal_cleared",
            SimEvent::GoalReached { .. }            => "goal_reached",
            SimEvent::CommandIgnored { .. }         => "command_ignored",
        }
    }
}
