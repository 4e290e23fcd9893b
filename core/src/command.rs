use crate::types::{DeltaSecs, GlassId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Every user intent the engine accepts, plus host clock samples.
/// Dispatched by `SimEngine::apply`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "cmd", rename_all = "snake_case")]
pub enum Command {
    // ── Glass collection ─────────────────────────
    AddGlass {
        capacity_secs: u64,
        #[serde(default)]
        name: Option<String>,
    },
    /// Raw minute/second fields, validated before adding.
    AddGlassInput {
        minutes: String,
        seconds: String,
        #[serde(default)]
        name: Option<String>,
    },
    RemoveGlass { id: GlassId },
    ClearAll,

    // ── Run control ──────────────────────────────
    Start,
    Pause,
    Reset,
    SetSpeed { multiplier: f64 },

    // ── Sand ─────────────────────────────────────
    Flip { id: GlassId },
    JumpGlobal { delta_secs: DeltaSecs },
    JumpSingle { id: GlassId, delta_secs: DeltaSecs },

    // ── Acknowledgment ───────────────────────────
    OpenAcknowledgment,
    DismissAcknowledgment,
    ApplyAcknowledgment {
        #[serde(default)]
        flip_selected: BTreeSet<GlassId>,
        flip_first: bool,
    },

    // ── Goal ─────────────────────────────────────
    SetGoal { seconds: u64 },
    SetGoalInput { minutes: String, seconds: String },
    ClearGoal,

    // ── Clock ────────────────────────────────────
    /// Host timestamp in milliseconds.
    Tick { at_ms: u64 },
    /// Raw elapsed real time in milliseconds, clamped like any sample.
    Advance { ms: u64 },
}
