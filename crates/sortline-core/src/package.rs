//! Package data model: attributes, position, and lifecycle state.
//!
//! One [`Package`] lives in each pool slot for the whole run. Spawning
//! overwrites its attributes and position; exiting returns it to
//! [`LifecycleState::Inactive`]. Nothing is ever destroyed.

use std::fmt;

use serde::Serialize;

use crate::id::{LaneIndex, SlotId};

/// Inclusive bounds for a spawned package's weight.
pub const WEIGHT_RANGE: std::ops::RangeInclusive<u8> = 1..=20;

/// Surface color read by the color sensor.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum PackageColor {
    /// Red.
    Red,
    /// Green.
    Green,
    /// Blue.
    Blue,
    /// Yellow.
    Yellow,
    /// A color outside the sorting table. Never produced at spawn.
    Unknown,
}

impl PackageColor {
    /// Colors drawn at spawn, in table order.
    pub const ALL: [PackageColor; 4] = [Self::Red, Self::Green, Self::Blue, Self::Yellow];

    /// Display label, as printed by the sensor log.
    pub fn label(self) -> &'static str {
        match self {
            Self::Red => "Red",
            Self::Green => "Green",
            Self::Blue => "Blue",
            Self::Yellow => "Yellow",
            Self::Unknown => "Unknown",
        }
    }

    /// Parse a display label. Unrecognized labels map to [`Unknown`](Self::Unknown).
    pub fn from_label(label: &str) -> Self {
        Self::ALL
            .into_iter()
            .find(|c| c.label() == label)
            .unwrap_or(Self::Unknown)
    }
}

impl fmt::Display for PackageColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Size category read by the size sensor.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum PackageSize {
    /// Small.
    Small,
    /// Medium.
    Medium,
    /// Large.
    Large,
    /// Extra large.
    ExtraLarge,
    /// A size outside the sorting table. Never produced at spawn.
    Unknown,
}

impl PackageSize {
    /// Sizes drawn at spawn, in table order.
    pub const ALL: [PackageSize; 4] = [Self::Small, Self::Medium, Self::Large, Self::ExtraLarge];

    /// Display label, as printed by the sensor log.
    pub fn label(self) -> &'static str {
        match self {
            Self::Small => "Small",
            Self::Medium => "Medium",
            Self::Large => "Large",
            Self::ExtraLarge => "Extra Large",
            Self::Unknown => "Unknown",
        }
    }

    /// Parse a display label. Unrecognized labels map to [`Unknown`](Self::Unknown).
    pub fn from_label(label: &str) -> Self {
        Self::ALL
            .into_iter()
            .find(|s| s.label() == label)
            .unwrap_or(Self::Unknown)
    }
}

impl fmt::Display for PackageSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Attributes assigned at spawn and immutable until the slot is recycled.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct Attributes {
    /// Weight in kg, `1..=20` when drawn at spawn.
    pub weight: u8,
    /// Surface color.
    pub color: PackageColor,
    /// Size category.
    pub size: PackageSize,
}

impl Default for Attributes {
    fn default() -> Self {
        Self {
            weight: *WEIGHT_RANGE.start(),
            color: PackageColor::Red,
            size: PackageSize::Small,
        }
    }
}

/// Top-left corner of a package box, in screen units.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
pub struct Position {
    /// Horizontal coordinate; grows to the right.
    pub x: f64,
    /// Vertical coordinate; grows downward.
    pub y: f64,
}

/// Where a package is in its trip through the line.
///
/// Transitions only go forward:
/// `Inactive → Incoming → (Diverting → OnLane)? → Inactive`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub enum LifecycleState {
    /// Slot is free and may be respawned.
    Inactive,
    /// Riding the incoming conveyor, not yet classified.
    Incoming,
    /// Classified and descending toward its output lane.
    Diverting {
        /// Vertical position the package stops at.
        target_y: f64,
    },
    /// Riding its output lane toward the exit.
    OnLane,
}

impl LifecycleState {
    /// Whether the slot currently holds a live package.
    pub fn is_active(self) -> bool {
        !matches!(self, Self::Inactive)
    }

    /// Short name used in logs and snapshots.
    pub fn name(self) -> &'static str {
        match self {
            Self::Inactive => "inactive",
            Self::Incoming => "incoming",
            Self::Diverting { .. } => "diverting",
            Self::OnLane => "on_lane",
        }
    }
}

/// One pool slot's package record.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Package {
    /// Stable display identifier (`P1`, `P2`, ...). Never changes.
    pub id: String,
    /// The slot this record occupies.
    pub slot: SlotId,
    /// Number of times this slot has been spawned.
    pub generation: u32,
    /// Current position.
    pub position: Position,
    /// Spawn-time attributes.
    pub attributes: Attributes,
    /// `INCOMING` until classified, then the assigned output lane.
    pub lane: LaneIndex,
    /// Lifecycle state.
    pub state: LifecycleState,
}

impl Package {
    /// A fresh, inactive package for `slot`.
    pub fn new(slot: SlotId) -> Self {
        Self {
            id: slot.label(),
            slot,
            generation: 0,
            position: Position::default(),
            attributes: Attributes::default(),
            lane: LaneIndex::INCOMING,
            state: LifecycleState::Inactive,
        }
    }

    /// Whether the slot currently holds a live package.
    pub fn is_active(&self) -> bool {
        self.state.is_active()
    }

    /// The drop target, present only while diverting.
    pub fn target_y(&self) -> Option<f64> {
        match self.state {
            LifecycleState::Diverting { target_y } => Some(target_y),
            _ => None,
        }
    }
}
