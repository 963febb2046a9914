//! Per-tick metrics for the sorting line.
//!
//! [`StepMetrics`] describes what a single tick did. The engine fills it
//! in during `execute_tick()`; drivers hand it back to callers alongside
//! the snapshot.

use serde::Serialize;
use sortline_core::SlotId;

/// Timing and activity counts collected during a single tick.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct StepMetrics {
    /// Wall-clock time for the entire tick, in microseconds.
    pub total_us: u64,
    /// Slot activated by this tick's spawn check, if any.
    pub spawned: Option<SlotId>,
    /// A spawn was due but every slot was occupied.
    pub spawn_deferred: bool,
    /// Commands applied during the command phase.
    pub commands_applied: u32,
    /// Packages classified and diverted.
    pub classified: u32,
    /// Packages that reached their output lane.
    pub landed: u32,
    /// Packages that left the line and were recycled.
    pub exited: u32,
    /// Live packages after the tick.
    pub active_packages: u32,
}
