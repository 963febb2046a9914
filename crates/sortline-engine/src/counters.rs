//! Cumulative line counters.

use serde::Serialize;
use sortline_core::{LaneIndex, OUTPUT_LANE_COUNT};

/// Process-wide totals, monotonically non-decreasing until a reset.
///
/// Per-lane arrays are indexed by [`LaneIndex::index()`]; slot 0 (the
/// incoming lane) is never incremented.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct Counters {
    /// Packages spawned.
    pub total_spawned: u64,
    /// Packages classified and diverted.
    pub total_assigned: u64,
    /// Per-lane diversions.
    pub assigned: [u64; OUTPUT_LANE_COUNT + 1],
    /// Per-lane exits.
    pub processed: [u64; OUTPUT_LANE_COUNT + 1],
    /// Packages that exited without ever being classified.
    pub unsorted: u64,
}

impl Counters {
    pub(crate) fn record_spawn(&mut self) {
        self.total_spawned += 1;
    }

    pub(crate) fn record_assignment(&mut self, lane: LaneIndex) {
        debug_assert!(lane.is_output());
        if let Some(n) = self.assigned.get_mut(lane.index()) {
            *n += 1;
            self.total_assigned += 1;
        }
    }

    pub(crate) fn record_processed(&mut self, lane: LaneIndex) {
        debug_assert!(lane.is_output());
        if let Some(n) = self.processed.get_mut(lane.index()) {
            *n += 1;
        }
    }

    pub(crate) fn record_unsorted(&mut self) {
        self.unsorted += 1;
    }

    /// Diversions onto `lane`.
    pub fn assigned(&self, lane: LaneIndex) -> u64 {
        self.assigned.get(lane.index()).copied().unwrap_or(0)
    }

    /// Exits from `lane`.
    pub fn processed(&self, lane: LaneIndex) -> u64 {
        self.processed.get(lane.index()).copied().unwrap_or(0)
    }

    /// Sum of per-lane exits.
    pub fn total_processed(&self) -> u64 {
        self.processed.iter().sum()
    }

    /// Packages that have left the line, sorted or not.
    pub fn total_exited(&self) -> u64 {
        self.total_processed() + self.unsorted
    }
}
