//! Sortline: a headless parcel-sorting line simulation.
//!
//! Packages are drawn from a fixed pool, ride an incoming conveyor past
//! a sensor, are classified by the active [`SensorMode`](prelude::SensorMode),
//! and are pushed by a single actuator onto one of four output lanes.
//!
//! This is the facade crate that re-exports the public API from the
//! `sortline-*` sub-crates and hosts the `sortline` binary.
//!
//! # Quick start
//!
//! ```rust
//! use sortline::prelude::*;
//!
//! let mut line = LockstepLine::new(LineConfig::default()).unwrap();
//! for _ in 0..600 {
//!     line.step_sync(vec![]);
//! }
//! let snap = line.snapshot();
//! assert_eq!(snap.tick(), TickId(600));
//! assert!(snap.totals().total_spawned >= 6);
//! ```
//!
//! # Modules
//!
//! | Module | Sub-crate | Contents |
//! |--------|-----------|----------|
//! | [`types`] | `sortline-core` | IDs, package model, modes, commands, audit events, random sources |
//! | [`pool`] | `sortline-pool` | Fixed-capacity package slot pool |
//! | [`engine`] | `sortline-engine` | Tick engine, classifier, actuator, belts, lockstep and realtime drivers |
//! | [`audit_log`] | | Timestamped append-only audit file |
//! | [`report`] | | Plain-text summaries of a snapshot |

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

/// Core types, IDs and the random-source trait (`sortline-core`).
pub use sortline_core as types;

/// Package slot pool (`sortline-pool`).
pub use sortline_pool as pool;

/// Simulation engine and drivers (`sortline-engine`).
///
/// [`engine::LockstepLine`] for caller-driven stepping,
/// [`engine::RealtimeLine`] for a 60 Hz background clock.
pub use sortline_engine as engine;

pub mod audit_log;
pub mod report;

/// Common imports for typical sortline usage.
///
/// ```rust
/// use sortline::prelude::*;
/// ```
pub mod prelude {
    // Core types
    pub use sortline_core::{
        Attributes, AuditEvent, Command, LaneIndex, LifecycleState, Package, PackageColor,
        PackageSize, SensorMode, SensorReading, SlotId, TickId,
    };

    // Random sources
    pub use sortline_core::{SeededSource, SpawnDraw, SpawnSource};

    // Pool
    pub use sortline_pool::{PackagePool, PoolConfig, PoolError};

    // Engine
    pub use sortline_engine::{
        ConfigError, Counters, LineConfig, LineGeometry, LineSnapshot, LockstepLine,
        RealtimeLine, Snapshot, StepMetrics, StepResult, SubmitError, TickEngine,
    };
}
