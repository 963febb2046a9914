//! Strongly-typed identifiers for pool slots, lanes, and ticks.

use std::fmt;

use serde::Serialize;

/// Number of output conveyors fed by the actuator.
///
/// Lane `0` is the incoming conveyor; output lanes are `1..=OUTPUT_LANE_COUNT`.
pub const OUTPUT_LANE_COUNT: usize = 4;

/// Identifies a slot within the package pool.
///
/// Slots are created once at pool construction and never added or
/// removed. `SlotId(n)` is the n-th slot in scan order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct SlotId(pub u32);

impl SlotId {
    /// Position of this slot in the pool's backing storage.
    pub fn index(self) -> usize {
        self.0 as usize
    }

    /// Display label for the package occupying this slot (`P1`, `P2`, ...).
    pub fn label(self) -> String {
        format!("P{}", self.0 + 1)
    }
}

impl fmt::Display for SlotId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for SlotId {
    fn from(v: u32) -> Self {
        Self(v)
    }
}

/// A conveyor lane: `0` is the incoming lane, `1..=4` the output lanes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct LaneIndex(pub u8);

impl LaneIndex {
    /// The incoming conveyor; also means "not yet assigned".
    pub const INCOMING: LaneIndex = LaneIndex(0);

    /// Construct an output lane index, or `None` if `n` is outside `1..=4`.
    pub fn output(n: u8) -> Option<Self> {
        if n >= 1 && n as usize <= OUTPUT_LANE_COUNT {
            Some(Self(n))
        } else {
            None
        }
    }

    /// All output lanes in ascending order.
    pub fn outputs() -> impl Iterator<Item = LaneIndex> {
        (1..=OUTPUT_LANE_COUNT as u8).map(LaneIndex)
    }

    /// Whether this is an output lane (`>= 1`).
    pub fn is_output(self) -> bool {
        self.0 >= 1
    }

    /// Position of this lane in per-lane tables sized `OUTPUT_LANE_COUNT + 1`.
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for LaneIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Monotonically increasing tick counter.
///
/// Incremented each time the simulation advances one step.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct TickId(pub u64);

impl fmt::Display for TickId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for TickId {
    fn from(v: u64) -> Self {
        Self(v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slot_labels_are_one_based() {
        assert_eq!(SlotId(0).label(), "P1");
        assert_eq!(SlotId(9).label(), "P10");
    }

    #[test]
    fn output_lane_bounds() {
        assert_eq!(LaneIndex::output(0), None);
        assert_eq!(LaneIndex::output(1), Some(LaneIndex(1)));
        assert_eq!(LaneIndex::output(4), Some(LaneIndex(4)));
        assert_eq!(LaneIndex::output(5), None);
        assert!(!LaneIndex::INCOMING.is_output());
    }

    #[test]
    fn outputs_iterates_all_lanes_in_order() {
        let lanes: Vec<_> = LaneIndex::outputs().collect();
        assert_eq!(lanes, vec![LaneIndex(1), LaneIndex(2), LaneIndex(3), LaneIndex(4)]);
    }
}
