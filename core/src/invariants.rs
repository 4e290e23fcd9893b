//! State laws that must hold after every operation.
//!
//! Checked against a snapshot so that tests and the soak runner see exactly
//! what an observer sees.

use crate::{
    error::{SimError, SimResult},
    glass::GlassStatus,
    snapshot::SimSnapshot,
};
use std::collections::HashSet;

const PCT_TOLERANCE: f64 = 1e-9;

pub fn check(snapshot: &SimSnapshot) -> SimResult<()> {
    let mut seen = HashSet::new();
    let mut flip_sum = 0u64;

    for g in &snapshot.glasses {
        if !seen.insert(g.id) {
            return violation(format!("duplicate glass id {}", g.id));
        }
        if g.remaining < 0.0 || g.remaining > g.capacity_secs {
            return violation(format!(
                "glass {} remaining {} outside [0, {}]",
                g.name, g.remaining, g.capacity_secs
            ));
        }
        let expected_pct = g.remaining / g.capacity_secs * 100.0;
        if (g.pct - expected_pct).abs() > PCT_TOLERANCE {
            return violation(format!("glass {} pct {} != {}", g.name, g.pct, expected_pct));
        }
        if g.status != GlassStatus::Idle && (g.status == GlassStatus::Empty) != (g.remaining == 0.0) {
            return violation(format!(
                "glass {} is {:?} with {}s remaining",
                g.name, g.status, g.remaining
            ));
        }
        flip_sum += u64::from(g.flip_count);
    }

    if snapshot.total_flips < flip_sum {
        return violation(format!(
            "total flips {} below per-glass sum {flip_sum}",
            snapshot.total_flips
        ));
    }
    if snapshot.auto_paused && !(snapshot.running && snapshot.paused) {
        return violation("auto-paused while not running and paused".to_string());
    }
    if snapshot.goal_reached && snapshot.running {
        return violation("goal reached but still running".to_string());
    }
    if snapshot.auto_paused && snapshot.count(GlassStatus::Running) > 0 {
        return violation("glass running during auto-pause".to_string());
    }
    Ok(())
}

fn violation(reason: String) -> SimResult<()> {
    Err(SimError::InvariantViolation { reason })
}
