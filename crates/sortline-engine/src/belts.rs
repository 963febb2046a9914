//! Per-lane residency queues and the cosmetic stripe offset.
//!
//! [`BeltManager`] records which packages are currently riding each
//! output lane, in arrival order. It is bookkeeping for display and
//! exit accounting only; scheduling never consults it.

use indexmap::IndexSet;
use sortline_core::{LaneIndex, SlotId, OUTPUT_LANE_COUNT};

/// Ordered residency queues for lanes `0..=OUTPUT_LANE_COUNT`.
///
/// Lane 0 (incoming) has a queue for indexing symmetry but never holds
/// anything: a package is queued exactly while it is `OnLane`.
#[derive(Clone, Debug)]
pub struct BeltManager {
    queues: Vec<IndexSet<SlotId>>,
    stripe_offset: f64,
    stripe_period: f64,
    stripe_speed: f64,
}

impl BeltManager {
    /// Empty queues with the stripe animation at offset zero.
    pub fn new(stripe_period: f64, stripe_speed: f64) -> Self {
        Self {
            queues: vec![IndexSet::new(); OUTPUT_LANE_COUNT + 1],
            stripe_offset: 0.0,
            stripe_period,
            stripe_speed,
        }
    }

    /// Append `slot` to `lane`'s queue.
    ///
    /// Returns `false` and changes nothing if `lane` is not an output
    /// lane or `slot` is already queued there.
    pub fn enqueue(&mut self, lane: LaneIndex, slot: SlotId) -> bool {
        if !lane.is_output() {
            return false;
        }
        debug_assert!(
            self.lane_of(slot).is_none_or(|l| l == lane),
            "slot {slot} already queued on another lane"
        );
        match self.queues.get_mut(lane.index()) {
            Some(q) => q.insert(slot),
            None => false,
        }
    }

    /// Remove `slot` from `lane`'s queue, preserving the order of the rest.
    ///
    /// Idempotent: returns `false` if it was not queued there.
    pub fn remove(&mut self, lane: LaneIndex, slot: SlotId) -> bool {
        self.queues
            .get_mut(lane.index())
            .is_some_and(|q| q.shift_remove(&slot))
    }

    /// Number of packages currently on `lane`.
    pub fn len(&self, lane: LaneIndex) -> usize {
        self.queues.get(lane.index()).map_or(0, IndexSet::len)
    }

    /// Whether no lane holds any package.
    pub fn is_empty(&self) -> bool {
        self.queues.iter().all(IndexSet::is_empty)
    }

    /// Packages on `lane` in arrival order.
    pub fn queue(&self, lane: LaneIndex) -> impl Iterator<Item = SlotId> + '_ {
        self.queues
            .get(lane.index())
            .into_iter()
            .flat_map(|q| q.iter().copied())
    }

    /// Whether `slot` is queued on `lane`.
    pub fn contains(&self, lane: LaneIndex, slot: SlotId) -> bool {
        self.queues
            .get(lane.index())
            .is_some_and(|q| q.contains(&slot))
    }

    /// The lane `slot` is queued on, if any.
    pub fn lane_of(&self, slot: SlotId) -> Option<LaneIndex> {
        self.queues
            .iter()
            .position(|q| q.contains(&slot))
            .map(|i| LaneIndex(i as u8))
    }

    /// Number of queues holding `slot`. Zero or one unless bookkeeping broke.
    pub fn membership_count(&self, slot: SlotId) -> usize {
        self.queues.iter().filter(|q| q.contains(&slot)).count()
    }

    /// Total packages across all lanes.
    pub fn total_len(&self) -> usize {
        self.queues.iter().map(IndexSet::len).sum()
    }

    /// Move the stripe animation one tick; the offset stays in `[0, period)`.
    pub fn advance_stripes(&mut self) {
        self.stripe_offset = (self.stripe_offset - self.stripe_speed).rem_euclid(self.stripe_period);
    }

    /// Current stripe offset.
    pub fn stripe_offset(&self) -> f64 {
        self.stripe_offset
    }

    /// Empty every queue and rewind the stripes.
    pub fn clear(&mut self) {
        for q in &mut self.queues {
            q.clear();
        }
        self.stripe_offset = 0.0;
    }
}
