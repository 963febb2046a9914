//! Sorting-line simulation engine.
//!
//! Provides the [`TickEngine`] that advances packages, the classifier,
//! the actuator and belt bookkeeping once per tick, plus two drivers:
//! [`LockstepLine`] for caller-driven headless runs and
//! [`RealtimeLine`] for a fixed-rate clock thread.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod actuator;
pub mod belts;
pub mod classifier;
pub mod clock;
pub mod config;
pub mod counters;
pub mod lockstep;
pub mod metrics;
pub mod realtime;
pub mod snapshot;
pub mod tick;

pub use actuator::Actuator;
pub use belts::BeltManager;
pub use classifier::{classify, lane_for, FALLBACK_LANE};
pub use clock::SpawnSchedule;
pub use config::{ConfigError, LineConfig, LineGeometry};
pub use counters::Counters;
pub use lockstep::{LockstepLine, StepResult};
pub use metrics::StepMetrics;
pub use realtime::{RealtimeLine, SubmitError};
pub use snapshot::{LaneView, LineSnapshot, PackageView, Snapshot, Totals};
pub use tick::{TickEngine, TickResult, AUDIT_TARGET};
