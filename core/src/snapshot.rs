//! Immutable view of the engine handed to observers after every mutation.
//!
//! Times are in seconds so a renderer never touches `Duration`.

use crate::{
    flip_log::FlipRecord,
    glass::{Direction, Glass, GlassStatus},
    types::{secs, GlassId},
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GlassView {
    pub id:            GlassId,
    pub name:          String,
    pub status:        GlassStatus,
    pub capacity_secs: f64,
    pub remaining:     f64,
    pub pct:           f64,
    pub direction:     Direction,
    pub flip_count:    u32,
}

impl From<&Glass> for GlassView {
    fn from(g: &Glass) -> Self {
        Self {
            id:            g.id,
            name:          g.name.clone(),
            status:        g.status,
            capacity_secs: secs(g.capacity),
            remaining:     secs(g.remaining),
            pct:           g.pct(),
            direction:     g.direction,
            flip_count:    g.flip_count,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LogEntryView {
    pub at_global_time:          f64,
    pub glass_name:              String,
    pub remaining_at_flip:       f64,
    pub elapsed_since_last_flip: f64,
}

impl From<&FlipRecord> for LogEntryView {
    fn from(r: &FlipRecord) -> Self {
        Self {
            at_global_time:          secs(r.at_global_time),
            glass_name:              r.glass_name.clone(),
            remaining_at_flip:       secs(r.remaining_at_flip),
            elapsed_since_last_flip: secs(r.elapsed_since_last_flip),
        }
    }
}

/// One row of the acknowledgment prompt.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AckRow {
    pub id:          GlassId,
    pub name:        String,
    pub status:      GlassStatus,
    pub remaining:   f64,
    pub flip_count:  u32,
    /// Empty glasses come pre-checked for flipping.
    pub preselected: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AckPrompt {
    pub rows: Vec<AckRow>,
}

impl AckPrompt {
    pub fn build(glasses: &[Glass]) -> Self {
        let rows = glasses
            .iter()
            .map(|g| AckRow {
                id:          g.id,
                name:        g.name.clone(),
                status:      g.status,
                remaining:   secs(g.remaining),
                flip_count:  g.flip_count,
                preselected: g.status == GlassStatus::Empty,
            })
            .collect();
        Self { rows }
    }

    pub fn preselected(&self) -> impl Iterator<Item = GlassId> + '_ {
        self.rows.iter().filter(|r| r.preselected).map(|r| r.id)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SimSnapshot {
    pub glasses:          Vec<GlassView>,
    pub elapsed:          f64,
    pub running:          bool,
    pub paused:           bool,
    pub auto_paused:      bool,
    pub goal_target:      Option<u64>,
    pub goal_reached:     bool,
    pub total_flips:      u64,
    pub speed_multiplier: f64,
    pub log:              Vec<LogEntryView>,
    pub acknowledgment:   Option<AckPrompt>,
}

impl SimSnapshot {
    pub fn glass(&self, id: GlassId) -> Option<&GlassView> {
        self.glasses.iter().find(|g| g.id == id)
    }

    pub fn count(&self, status: GlassStatus) -> usize {
        self.glasses.iter().filter(|g| g.status == status).count()
    }

    /// Progress toward the goal in percent, capped at 100.
    pub fn goal_progress(&self) -> Option<f64> {
        self.goal_target
            .map(|target| (self.elapsed / target as f64 * 100.0).min(100.0))
    }
}
