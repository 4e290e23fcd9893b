//! A single hourglass and its state machine.
//!
//! Transitions:
//!   Idle    → Running   on start
//!   Running → Paused    on pause (manual, auto, or goal)
//!   Paused  → Running   on resume
//!   Running → Empty     when remaining reaches zero
//!   any     → Running | Paused | Idle   on flip, by global mode

use crate::{
    clock::GlobalMode,
    types::{secs, GlassId},
};
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum GlassStatus {
    Idle,
    Running,
    Paused,
    Empty,
}

impl GlassStatus {
    /// Running or Paused: the glass has started and still holds sand.
    pub fn is_active(self) -> bool {
        matches!(self, Self::Running | Self::Paused)
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Idle    => "IDLE",
            Self::Running => "RUNNING",
            Self::Paused  => "PAUSED",
            Self::Empty   => "EMPTY",
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    TopToBottom,
    BottomToTop,
}

impl Direction {
    pub fn toggled(self) -> Self {
        match self {
            Self::TopToBottom => Self::BottomToTop,
            Self::BottomToTop => Self::TopToBottom,
        }
    }
}

/// Status a glass takes right after being flipped.
///
/// The global mode decides, not the glass's own prior status. A stopped
/// simulation keeps the glass where it was, except that an emptied glass is
/// put back in motion since the flip also starts the simulation.
pub fn resolve_post_flip_status(mode: GlobalMode, prior: GlassStatus) -> GlassStatus {
    match mode {
        GlobalMode::Running => GlassStatus::Running,
        GlobalMode::Paused  => GlassStatus::Paused,
        GlobalMode::Stopped => match prior {
            GlassStatus::Empty  => GlassStatus::Running,
            GlassStatus::Paused => GlassStatus::Paused,
            GlassStatus::Idle | GlassStatus::Running => GlassStatus::Idle,
        },
    }
}

/// Name for the `index`-th auto-named glass: A..Z, AA..ZZ, AAA, ...
pub fn sequence_name(index: u64) -> String {
    let mut n = index + 1;
    let mut letters = Vec::new();
    while n > 0 {
        n -= 1;
        letters.push(b'A' + (n % 26) as u8);
        n /= 26;
    }
    letters.reverse();
    String::from_utf8_lossy(&letters).into_owned()
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Glass {
    pub id:            GlassId,
    pub name:          String,
    pub capacity:      Duration,
    pub remaining:     Duration,
    pub status:        GlassStatus,
    pub direction:     Direction,
    pub flip_count:    u32,
    /// Global elapsed at the last flip, start, or creation.
    pub last_flip_at:  Duration,
}

impl Glass {
    pub fn new(id: GlassId, name: String, capacity: Duration, created_at: Duration) -> Self {
        Self {
            id,
            name,
            capacity,
            remaining: capacity,
            status: GlassStatus::Idle,
            direction: Direction::TopToBottom,
            flip_count: 0,
            last_flip_at: created_at,
        }
    }

    /// Remaining sand as a percentage of capacity.
    pub fn pct(&self) -> f64 {
        if self.capacity.is_zero() {
            return 0.0;
        }
        secs(self.remaining) / secs(self.capacity) * 100.0
    }

    /// Remove sand. Returns true if this emptied the glass.
    pub fn drain(&mut self, by: Duration) -> bool {
        self.remaining = self.remaining.saturating_sub(by);
        if self.remaining.is_zero() && self.status != GlassStatus::Empty {
            self.status = GlassStatus::Empty;
            return true;
        }
        false
    }

    /// Put sand back, never beyond capacity. Status is untouched.
    pub fn refill(&mut self, by: Duration) {
        self.remaining = self.remaining.saturating_add(by).min(self.capacity);
    }

    /// Invert the glass: what had drained becomes what remains.
    /// Returns the remaining time before the flip.
    pub fn invert(&mut self, mode: GlobalMode, now: Duration) -> Duration {
        let before = self.remaining;
        self.flip_count += 1;
        self.remaining = self.capacity.saturating_sub(before);
        self.direction = self.direction.toggled();
        self.last_flip_at = now;
        self.status = resolve_post_flip_status(mode, self.status);
        before
    }

    /// Mark an active glass with no sand left as empty.
    /// Returns true if the status changed.
    pub fn settle(&mut self) -> bool {
        if self.status.is_active() && self.remaining.is_zero() {
            self.status = GlassStatus::Empty;
            return true;
        }
        false
    }

    /// Start counting if not yet started.
    pub fn activate(&mut self, now: Duration) {
        if self.status == GlassStatus::Idle {
            self.last_flip_at = now;
        }
        self.status = GlassStatus::Running;
    }

    pub fn reset(&mut self) {
        self.remaining = self.capacity;
        self.status = GlassStatus::Idle;
        self.direction = Direction::TopToBottom;
        self.flip_count = 0;
        self.last_flip_at = Duration::ZERO;
    }
}
