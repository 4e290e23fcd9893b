//! Simulation clock. Owns elapsed time, speed, run/pause flags and the
//! host sample marker.

use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SimClock {
    pub elapsed:      Duration,
    pub speed:        f64,
    pub running:      bool,
    pub paused:       bool,
    /// Host timestamp of the previous sample. `None` means the next sample
    /// only re-arms the marker.
    last_sample:      Option<Duration>,
    max_sample_delta: Duration,
}

/// Global simulation mode derived from the running/paused flags.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum GlobalMode {
    Stopped,
    Running,
    Paused,
}

impl SimClock {
    pub fn new(speed: f64, max_sample_delta: Duration) -> Self {
        Self {
            elapsed: Duration::ZERO,
            speed,
            running: false,
            paused: false,
            last_sample: None,
            max_sample_delta,
        }
    }

    pub fn mode(&self) -> GlobalMode {
        match (self.running, self.paused) {
            (false, _)    => GlobalMode::Stopped,
            (true, false) => GlobalMode::Running,
            (true, true)  => GlobalMode::Paused,
        }
    }

    /// True only while time is actually flowing.
    pub fn is_active(&self) -> bool {
        self.running && !self.paused
    }

    pub fn clear_marker(&mut self) {
        self.last_sample = None;
    }

    /// Take a host timestamp and return the clamped raw delta since the
    /// previous one, or `None` if this sample only arms the marker.
    pub fn sample(&mut self, now: Duration) -> Option<Duration> {
        let previous = self.last_sample.replace(now)?;
        Some(self.clamp(now.saturating_sub(previous)))
    }

    pub fn clamp(&self, raw: Duration) -> Duration {
        raw.min(self.max_sample_delta)
    }

    /// Apply the speed multiplier to a raw delta.
    pub fn scale(&self, raw: Duration) -> Duration {
        scale_by(raw, self.speed)
    }

    pub fn set_speed(&mut self, speed: f64) {
        self.speed = speed;
        self.last_sample = None;
    }

    /// Move elapsed by a signed number of seconds, never below zero.
    pub fn shift(&mut self, delta_secs: i64) {
        let magnitude = Duration::from_secs(delta_secs.unsigned_abs());
        self.elapsed = if delta_secs >= 0 {
            self.elapsed.saturating_add(magnitude)
        } else {
            self.elapsed.saturating_sub(magnitude)
        };
    }

    /// Back to a stopped clock at zero. Speed is kept.
    pub fn reset(&mut self) {
        self.elapsed = Duration::ZERO;
        self.running = false;
        self.paused = false;
        self.last_sample = None;
    }
}

/// Scale on the nanosecond count so that a multiplier of 1.0 (or any power
/// of two) is exact.
pub fn scale_by(raw: Duration, speed: f64) -> Duration {
    let nanos = (raw.as_nanos() as f64 * speed).round();
    if nanos <= 0.0 {
        return Duration::ZERO;
    }
    Duration::from_nanos(nanos.min(u64::MAX as f64) as u64)
}
