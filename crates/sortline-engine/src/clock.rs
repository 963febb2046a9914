//! Fixed-rate timing: the spawn schedule and the realtime clock thread.
//!
//! [`SpawnSchedule`] decides on which ticks a spawn is due. The clock
//! thread owns a [`TickEngine`] exclusively (moved in via
//! `thread::spawn`), ticks it at the configured rate, and publishes an
//! owned snapshot after every tick. Commands arrive over a bounded
//! crossbeam channel and are applied at the next tick's command phase.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock};
use std::thread;
use std::time::{Duration, Instant};

use crossbeam_channel::{Receiver, Sender, TrySendError};
use sortline_core::{AuditEvent, Command, TickId};
use tracing::{trace, warn};

use crate::snapshot::LineSnapshot;
use crate::tick::TickEngine;

// ── SpawnSchedule ────────────────────────────────────────────────

/// Tick-count spawn timer.
///
/// The first spawn is due on tick 1. A successful spawn pushes the next
/// one `interval` ticks out; a deferred spawn leaves it due, so it is
/// retried every tick until a slot frees.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SpawnSchedule {
    interval: u64,
    next_due: TickId,
}

impl SpawnSchedule {
    /// A schedule with its first spawn due on tick 1.
    pub fn new(interval: u64) -> Self {
        Self {
            interval,
            next_due: TickId(1),
        }
    }

    /// Whether a spawn should be attempted on `tick`.
    pub fn is_due(&self, tick: TickId) -> bool {
        tick >= self.next_due
    }

    /// Record a successful spawn on `tick`.
    pub fn record_spawn(&mut self, tick: TickId) {
        self.next_due = TickId(tick.0.saturating_add(self.interval));
    }

    /// Earliest tick the next spawn may happen on.
    pub fn next_due(&self) -> TickId {
        self.next_due
    }

    /// Ticks between successful spawns.
    pub fn interval(&self) -> u64 {
        self.interval
    }

    /// Back to "first spawn due on tick 1".
    pub fn reset(&mut self) {
        self.next_due = TickId(1);
    }
}

// ── ClockThread ──────────────────────────────────────────────────

/// Latest published snapshot, swapped after every tick.
pub(crate) type SnapshotCell = Arc<RwLock<Arc<LineSnapshot>>>;

/// State held by the clock thread's main loop.
pub(crate) struct ClockThread {
    engine: TickEngine,
    cmd_rx: Receiver<Command>,
    audit_tx: Sender<AuditEvent>,
    latest: SnapshotCell,
    shutdown_flag: Arc<AtomicBool>,
    audit_dropped: Arc<AtomicU64>,
    tick_budget: Duration,
    tick_limit: Option<TickId>,
}

impl ClockThread {
    pub(crate) fn new(
        engine: TickEngine,
        cmd_rx: Receiver<Command>,
        audit_tx: Sender<AuditEvent>,
        latest: SnapshotCell,
        shutdown_flag: Arc<AtomicBool>,
        audit_dropped: Arc<AtomicU64>,
        tick_rate_hz: f64,
    ) -> Self {
        Self {
            engine,
            cmd_rx,
            audit_tx,
            latest,
            shutdown_flag,
            audit_dropped,
            tick_budget: Duration::from_secs_f64(1.0 / tick_rate_hz),
            tick_limit: None,
        }
    }

    /// Stop on its own once `limit` ticks have run.
    pub(crate) fn with_tick_limit(mut self, limit: Option<TickId>) -> Self {
        self.tick_limit = limit;
        self
    }

    fn limit_reached(&self) -> bool {
        self.tick_limit
            .is_some_and(|limit| self.engine.current_tick() >= limit)
    }

    /// Main tick loop. Runs until `shutdown_flag` is set or the tick
    /// limit is reached.
    ///
    /// Consumes self and returns the `TickEngine` so the owner can
    /// recover it through the `JoinHandle`.
    pub(crate) fn run(mut self) -> TickEngine {
        while !self.shutdown_flag.load(Ordering::Acquire) && !self.limit_reached() {
            let tick_start = Instant::now();

            // 1. Drain the command channel.
            let commands: Vec<Command> = self.cmd_rx.try_iter().collect();

            // 2. Execute the tick.
            let result = self.engine.execute_tick(&commands);

            // 3. Forward audit events to whoever is listening.
            self.forward_audit(result.audit);

            // 4. Publish the snapshot.
            let snap = Arc::new(self.engine.owned_snapshot());
            *self.latest.write().unwrap_or_else(PoisonError::into_inner) = snap;

            trace!(
                tick = self.engine.current_tick().0,
                us = result.metrics.total_us,
                "clock tick"
            );

            // 5. Sleep for the rest of the budget.
            self.sleep_budget(tick_start);
        }
        self.engine
    }

    /// Send events without blocking; a full channel drops and counts them.
    fn forward_audit(&self, events: Vec<AuditEvent>) {
        for event in events {
            if let Err(TrySendError::Full(event)) = self.audit_tx.try_send(event) {
                self.audit_dropped.fetch_add(1, Ordering::Relaxed);
                warn!(%event, "audit channel full, event dropped");
            }
        }
    }

    /// Park until the tick budget is spent or shutdown is requested.
    ///
    /// `park_timeout` lets the owner's `unpark()` cut the wait short.
    fn sleep_budget(&self, tick_start: Instant) {
        let deadline = tick_start + self.tick_budget;
        loop {
            if self.shutdown_flag.load(Ordering::Acquire) {
                return;
            }
            let now = Instant::now();
            if now >= deadline {
                return;
            }
            thread::park_timeout(deadline - now);
        }
    }
}
