//! Read-only views of line state for renderers and callers.
//!
//! [`Snapshot`] borrows the engine and is what lockstep callers get back
//! from each step. [`LineSnapshot`] is its owned, serializable form,
//! published by the realtime clock thread and printed by the binary.

use serde::Serialize;
use sortline_core::{
    LaneIndex, Package, PackageColor, SensorMode, SensorReading, SlotId, TickId,
};
use sortline_pool::PackagePool;

use crate::actuator::Actuator;
use crate::belts::BeltManager;
use crate::counters::Counters;

// ── Views ────────────────────────────────────────────────────────

/// One live package as a renderer sees it.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PackageView {
    /// Display id (`P1`..).
    pub id: String,
    /// Pool slot.
    pub slot: SlotId,
    /// Spawn count of the slot; distinguishes successive occupants.
    pub generation: u32,
    /// Left edge.
    pub x: f64,
    /// Top edge.
    pub y: f64,
    /// Box color.
    pub color: PackageColor,
    /// Current lane (0 until classified).
    pub lane: LaneIndex,
    /// Lifecycle state name.
    pub state: &'static str,
    /// The attribute the active mode's sensor reads.
    pub reading: SensorReading,
}

impl PackageView {
    fn new(pkg: &Package, mode: SensorMode) -> Self {
        Self {
            id: pkg.id.clone(),
            slot: pkg.slot,
            generation: pkg.generation,
            x: pkg.position.x,
            y: pkg.position.y,
            color: pkg.attributes.color,
            lane: pkg.lane,
            state: pkg.state.name(),
            reading: mode.read(&pkg.attributes),
        }
    }
}

/// Occupancy and cumulative counts for one output lane.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct LaneView {
    /// Output lane number.
    pub lane: LaneIndex,
    /// Packages currently riding the lane.
    pub queue_len: usize,
    /// Cumulative diversions onto the lane.
    pub assigned: u64,
    /// Cumulative exits from the lane.
    pub processed: u64,
    /// Ids of the queued packages in arrival order.
    pub queued: Vec<String>,
}

/// Line-wide totals.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct Totals {
    /// Packages spawned.
    pub total_spawned: u64,
    /// Packages diverted.
    pub total_assigned: u64,
    /// Packages that exited from an output lane.
    pub total_processed: u64,
    /// Packages that exited unclassified.
    pub unsorted: u64,
}

impl From<&Counters> for Totals {
    fn from(c: &Counters) -> Self {
        Self {
            total_spawned: c.total_spawned,
            total_assigned: c.total_assigned,
            total_processed: c.total_processed(),
            unsorted: c.unsorted,
        }
    }
}

// ── Snapshot ─────────────────────────────────────────────────────

/// Borrowed view of the line after a tick.
#[derive(Clone, Copy)]
pub struct Snapshot<'a> {
    pub(crate) tick: TickId,
    pub(crate) mode: SensorMode,
    pub(crate) pool: &'a PackagePool,
    pub(crate) belts: &'a BeltManager,
    pub(crate) counters: &'a Counters,
    pub(crate) actuator: &'a Actuator,
}

impl<'a> Snapshot<'a> {
    /// Tick this view was taken after.
    pub fn tick(&self) -> TickId {
        self.tick
    }

    /// Active classification mode.
    pub fn mode(&self) -> SensorMode {
        self.mode
    }

    /// Cumulative counters.
    pub fn counters(&self) -> &'a Counters {
        self.counters
    }

    /// The diverting arm.
    pub fn actuator(&self) -> &'a Actuator {
        self.actuator
    }

    /// Cosmetic belt stripe offset.
    pub fn stripe_offset(&self) -> f64 {
        self.belts.stripe_offset()
    }

    /// Every pool slot, live or not, in slot order.
    pub fn slots(&self) -> impl Iterator<Item = &'a Package> {
        self.pool.iter()
    }

    /// The package in `slot`.
    pub fn package(&self, slot: SlotId) -> Option<&'a Package> {
        self.pool.get(slot)
    }

    /// Live packages as renderer views, in slot order.
    pub fn packages(&self) -> impl Iterator<Item = PackageView> + 'a {
        let mode = self.mode;
        self.pool.active().map(move |p| PackageView::new(p, mode))
    }

    /// Number of live packages.
    pub fn active_count(&self) -> usize {
        self.pool.active_count()
    }

    /// Packages on `lane` in arrival order.
    pub fn queue(&self, lane: LaneIndex) -> impl Iterator<Item = SlotId> + 'a {
        self.belts.queue(lane)
    }

    /// Per-lane residency for slot membership checks.
    pub fn belts(&self) -> &'a BeltManager {
        self.belts
    }

    /// View of one output lane.
    pub fn lane(&self, lane: LaneIndex) -> LaneView {
        LaneView {
            lane,
            queue_len: self.belts.len(lane),
            assigned: self.counters.assigned(lane),
            processed: self.counters.processed(lane),
            queued: self
                .belts
                .queue(lane)
                .filter_map(|s| self.pool.get(s).map(|p| p.id.clone()))
                .collect(),
        }
    }

    /// Views of output lanes `1..=4`.
    pub fn lanes(&self) -> Vec<LaneView> {
        LaneIndex::outputs().map(|l| self.lane(l)).collect()
    }

    /// Line-wide totals.
    pub fn totals(&self) -> Totals {
        Totals::from(self.counters)
    }

    /// Copy everything into an owned, serializable snapshot.
    pub fn to_line_snapshot(&self) -> LineSnapshot {
        LineSnapshot {
            tick: self.tick,
            mode: self.mode,
            actuator: self.actuator.clone(),
            stripe_offset: self.stripe_offset(),
            packages: self.packages().collect(),
            lanes: self.lanes(),
            totals: self.totals(),
        }
    }
}

impl std::fmt::Debug for Snapshot<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Snapshot")
            .field("tick", &self.tick)
            .field("mode", &self.mode)
            .field("active", &self.pool.active_count())
            .finish_non_exhaustive()
    }
}

// ── LineSnapshot ─────────────────────────────────────────────────

/// Owned copy of the renderer-visible state after a tick.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct LineSnapshot {
    /// Tick this snapshot was taken after.
    pub tick: TickId,
    /// Active classification mode.
    pub mode: SensorMode,
    /// Arm position and reach.
    pub actuator: Actuator,
    /// Cosmetic belt stripe offset.
    pub stripe_offset: f64,
    /// Live packages in slot order.
    pub packages: Vec<PackageView>,
    /// Output lanes `1..=4`.
    pub lanes: Vec<LaneView>,
    /// Line-wide totals.
    pub totals: Totals,
}

impl LineSnapshot {
    /// View of one output lane, if it exists.
    pub fn lane(&self, lane: LaneIndex) -> Option<&LaneView> {
        self.lanes.iter().find(|l| l.lane == lane)
    }

    /// A live package by display id.
    pub fn package(&self, id: &str) -> Option<&PackageView> {
        self.packages.iter().find(|p| p.id == id)
    }
}
