//! Lockstep (caller-driven) sorting line.
//!
//! [`LockstepLine`] is the headless API: each call to
//! [`step_sync()`](LockstepLine::step_sync) applies commands, executes
//! one tick, and returns a [`Snapshot`] of the result.
//!
//! # Ownership model
//!
//! `LockstepLine` is [`Send`] but not [`Sync`]. All mutating methods
//! take `&mut self`, and the returned [`Snapshot`] borrows from `self`,
//! so the caller cannot step again while holding a snapshot.

use sortline_core::{AuditEvent, Command, SensorMode, SpawnSource, TickId};

use crate::config::{ConfigError, LineConfig};
use crate::counters::Counters;
use crate::metrics::StepMetrics;
use crate::snapshot::Snapshot;
use crate::tick::TickEngine;

// Fails to compile if any field is !Send.
const _: () = {
    #[allow(dead_code)]
    fn assert_send<T: Send>() {}
    #[allow(dead_code)]
    fn check() {
        assert_send::<LockstepLine>();
    }
};

// ── StepResult ──────────────────────────────────────────────────

/// Result of a [`LockstepLine::step_sync()`] call.
pub struct StepResult<'l> {
    /// Read-only view of the line after this tick.
    pub snapshot: Snapshot<'l>,
    /// Audit events produced during the tick, in order.
    pub audit: Vec<AuditEvent>,
    /// Activity counts and timing for this tick.
    pub metrics: StepMetrics,
}

// ── LockstepLine ────────────────────────────────────────────────

/// Single-threaded sorting line stepped by the caller.
///
/// # Example
///
/// ```
/// use sortline_core::{Command, SensorMode};
/// use sortline_engine::{LineConfig, LockstepLine};
///
/// let mut line = LockstepLine::new(LineConfig::default()).unwrap();
/// let first = line.step_sync(vec![]);
/// assert_eq!(first.snapshot.totals().total_spawned, 1);
///
/// let step = line.step_sync(vec![Command::SetMode(SensorMode::Color)]);
/// assert_eq!(step.snapshot.mode(), SensorMode::Color);
/// ```
pub struct LockstepLine {
    engine: TickEngine,
    seed: u64,
}

impl LockstepLine {
    /// Validate `config` and build a line seeded with `config.seed`.
    pub fn new(config: LineConfig) -> Result<Self, ConfigError> {
        let seed = config.seed;
        Ok(Self {
            engine: TickEngine::new(config)?,
            seed,
        })
    }

    /// Build a line whose spawns come from `source` instead of the RNG.
    pub fn with_source(
        config: LineConfig,
        source: Box<dyn SpawnSource>,
    ) -> Result<Self, ConfigError> {
        let seed = config.seed;
        Ok(Self {
            engine: TickEngine::with_source(config, source)?,
            seed,
        })
    }

    /// Execute one tick synchronously.
    ///
    /// `commands` are applied in order during the tick's command phase,
    /// after the spawn check and before any package moves.
    pub fn step_sync(&mut self, commands: Vec<Command>) -> StepResult<'_> {
        let result = self.engine.execute_tick(&commands);
        StepResult {
            snapshot: self.engine.snapshot(),
            audit: result.audit,
            metrics: result.metrics,
        }
    }

    /// Switch the active mode immediately, between ticks.
    pub fn set_mode(&mut self, mode: SensorMode) -> AuditEvent {
        self.engine.set_mode(mode)
    }

    /// Reset to tick 0 with a new seed and return the empty state.
    pub fn reset(&mut self, seed: u64) -> Snapshot<'_> {
        self.engine.reset(seed);
        self.seed = seed;
        self.engine.snapshot()
    }

    /// Read-only view of the current state.
    pub fn snapshot(&self) -> Snapshot<'_> {
        self.engine.snapshot()
    }

    /// Last completed tick (0 after construction or reset).
    pub fn current_tick(&self) -> TickId {
        self.engine.current_tick()
    }

    /// Cumulative counters.
    pub fn counters(&self) -> &Counters {
        self.engine.counters()
    }

    /// Metrics from the most recent tick.
    pub fn last_metrics(&self) -> &StepMetrics {
        self.engine.last_metrics()
    }

    /// The current seed.
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// The underlying engine.
    pub fn engine(&self) -> &TickEngine {
        &self.engine
    }
}

impl std::fmt::Debug for LockstepLine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LockstepLine")
            .field("current_tick", &self.engine.current_tick())
            .field("seed", &self.seed)
            .field("mode", &self.engine.mode())
            .finish()
    }
}
