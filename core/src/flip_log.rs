//! Flip history, most recent first.

use crate::{
    format::{format_hms, format_short},
    types::{secs, GlassId},
};
use serde::{Deserialize, Serialize};
use std::{collections::VecDeque, fmt, time::Duration};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FlipRecord {
    pub at_global_time:          Duration,
    pub glass_id:                GlassId,
    pub glass_name:              String,
    pub remaining_at_flip:       Duration,
    pub elapsed_since_last_flip: Duration,
}

impl fmt::Display for FlipRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}  {}  rem {}  held {}",
            format_hms(secs(self.at_global_time)),
            self.glass_name,
            format_short(secs(self.remaining_at_flip)),
            format_short(secs(self.elapsed_since_last_flip)),
        )
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct FlipLog {
    entries: VecDeque<FlipRecord>,
    limit:   Option<usize>,
}

impl FlipLog {
    pub fn new(limit: Option<usize>) -> Self {
        Self { entries: VecDeque::new(), limit }
    }

    /// Record a flip at the front, dropping the oldest entry past the limit.
    pub fn record(&mut self, record: FlipRecord) {
        self.entries.push_front(record);
        if let Some(limit) = self.limit {
            self.entries.truncate(limit);
        }
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn latest(&self) -> Option<&FlipRecord> {
        self.entries.front()
    }

    pub fn iter(&self) -> impl Iterator<Item = &FlipRecord> {
        self.entries.iter()
    }
}
