//! Audit events: one per sensor read, actuator dispatch, and mode change.
//!
//! The engine returns the events produced by each tick and also emits
//! them through `tracing`. Their `Display` form is the audit line body;
//! timestamps are added by whoever persists them.

use std::fmt;

use serde::Serialize;

use crate::id::{LaneIndex, SlotId, TickId};
use crate::mode::{SensorMode, SensorReading};

/// Something the audit trail records.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum AuditEvent {
    /// A sensor measured a package inside the decision window.
    SensorRead {
        /// Tick on which the read happened.
        tick: TickId,
        /// The package's slot.
        slot: SlotId,
        /// What the sensor saw.
        reading: SensorReading,
    },
    /// The actuator was dispatched to push a package onto a lane.
    ActuatorDispatch {
        /// Tick on which the dispatch happened.
        tick: TickId,
        /// The package's slot.
        slot: SlotId,
        /// Destination output lane.
        lane: LaneIndex,
    },
    /// The active classification mode changed.
    ModeChanged {
        /// Tick at which the change took effect.
        tick: TickId,
        /// The new mode.
        mode: SensorMode,
    },
}

impl AuditEvent {
    /// Tick the event belongs to.
    pub fn tick(&self) -> TickId {
        match *self {
            Self::SensorRead { tick, .. }
            | Self::ActuatorDispatch { tick, .. }
            | Self::ModeChanged { tick, .. } => tick,
        }
    }
}

impl fmt::Display for AuditEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SensorRead { slot, reading, .. } => {
                write!(
                    f,
                    "Read {} for {}: {reading}",
                    reading.mode().key(),
                    slot.label()
                )
            }
            Self::ActuatorDispatch { slot, lane, .. } => {
                write!(f, "Actuator: moving {} to output belt {lane}", slot.label())
            }
            Self::ModeChanged { mode, .. } => write!(f, "Mode changed to {mode}"),
        }
    }
}
