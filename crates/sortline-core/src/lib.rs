//! Core types and traits for the sortline parcel-sorting simulation.
//!
//! This is the leaf crate with zero internal dependencies. It defines
//! the fundamental abstractions used throughout the sortline workspace:
//! slot and lane identifiers, the package data model, sensor modes and
//! their decision zones, commands, audit events, and the random-source
//! trait that feeds spawn attributes.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod audit;
pub mod command;
pub mod error;
pub mod id;
pub mod mode;
pub mod package;
pub mod source;

pub use audit::AuditEvent;
pub use command::Command;
pub use error::ParseModeError;
pub use id::{LaneIndex, SlotId, TickId, OUTPUT_LANE_COUNT};
pub use mode::{SensorMode, SensorReading};
pub use package::{Attributes, LifecycleState, Package, PackageColor, PackageSize, Position};
pub use source::{SeededSource, SpawnDraw, SpawnSource};
