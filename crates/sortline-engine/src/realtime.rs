//! Fixed-rate sorting line on a background clock thread.
//!
//! ```text
//! Caller thread(s)                 Clock thread
//!     |                                |
//!     |--submit()--------------------->| cmd_rx.try_iter()
//!     |   [cmd_tx: bounded(64)]        | engine.execute_tick()
//!     |<--drain_audit()----------------| audit_tx.try_send()
//!     |                                | publish Arc<LineSnapshot>
//!     |--latest_snapshot()------------>| park(budget - elapsed)
//! ```
//!
//! [`shutdown()`](RealtimeLine::shutdown) is the quit signal: it stops
//! the loop and hands the engine back. Dropping the line also stops it.
//! A line built with [`with_tick_limit()`](RealtimeLine::with_tick_limit)
//! also stops by itself after exactly that many ticks.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock};
use std::thread::{self, JoinHandle};

use crossbeam_channel::{Receiver, Sender, TrySendError};
use sortline_core::{AuditEvent, Command, SensorMode, TickId};
use tracing::info;

use crate::clock::{ClockThread, SnapshotCell};
use crate::config::{ConfigError, LineConfig};
use crate::snapshot::LineSnapshot;
use crate::tick::TickEngine;

const COMMAND_CAPACITY: usize = 64;
const AUDIT_CAPACITY: usize = 4096;

// ── SubmitError ──────────────────────────────────────────────────

/// Error submitting a command to the clock thread.
#[derive(Debug, PartialEq, Eq)]
pub enum SubmitError {
    /// The clock thread has shut down.
    Shutdown,
    /// The command channel is full (back-pressure).
    ChannelFull,
}

impl std::fmt::Display for SubmitError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Shutdown => write!(f, "clock thread has shut down"),
            Self::ChannelFull => write!(f, "command channel full"),
        }
    }
}

impl std::error::Error for SubmitError {}

// ── RealtimeLine ─────────────────────────────────────────────────

/// A sorting line ticking on its own thread at `tick_rate_hz`.
pub struct RealtimeLine {
    cmd_tx: Option<Sender<Command>>,
    audit_rx: Receiver<AuditEvent>,
    latest: SnapshotCell,
    shutdown_flag: Arc<AtomicBool>,
    audit_dropped: Arc<AtomicU64>,
    clock: Option<JoinHandle<TickEngine>>,
}

impl RealtimeLine {
    /// Validate `config`, build the engine, and start the clock thread.
    pub fn new(config: LineConfig) -> Result<Self, ConfigError> {
        let tick_rate_hz = config.tick_rate_hz;
        let engine = TickEngine::new(config)?;
        Self::from_engine(engine, tick_rate_hz)
    }

    /// Like [`new()`](Self::new), but the clock stops after tick `ticks`.
    ///
    /// The recovered engine's tick is then exactly `ticks`.
    pub fn with_tick_limit(config: LineConfig, ticks: u64) -> Result<Self, ConfigError> {
        let tick_rate_hz = config.tick_rate_hz;
        let engine = TickEngine::new(config)?;
        Self::start(engine, tick_rate_hz, Some(TickId(ticks)))
    }

    /// Start a clock thread around an existing engine.
    pub fn from_engine(engine: TickEngine, tick_rate_hz: f64) -> Result<Self, ConfigError> {
        Self::start(engine, tick_rate_hz, None)
    }

    fn start(
        engine: TickEngine,
        tick_rate_hz: f64,
        tick_limit: Option<TickId>,
    ) -> Result<Self, ConfigError> {
        if !tick_rate_hz.is_finite() || tick_rate_hz <= 0.0 || !(1.0 / tick_rate_hz).is_finite() {
            return Err(ConfigError::InvalidTickRate {
                value: tick_rate_hz,
            });
        }
        let (cmd_tx, cmd_rx) = crossbeam_channel::bounded(COMMAND_CAPACITY);
        let (audit_tx, audit_rx) = crossbeam_channel::bounded(AUDIT_CAPACITY);
        let latest: SnapshotCell = Arc::new(RwLock::new(Arc::new(engine.owned_snapshot())));
        let shutdown_flag = Arc::new(AtomicBool::new(false));
        let audit_dropped = Arc::new(AtomicU64::new(0));

        let state = ClockThread::new(
            engine,
            cmd_rx,
            audit_tx,
            Arc::clone(&latest),
            Arc::clone(&shutdown_flag),
            Arc::clone(&audit_dropped),
            tick_rate_hz,
        )
        .with_tick_limit(tick_limit);
        let clock = thread::Builder::new()
            .name("sortline-clock".into())
            .spawn(move || state.run())
            .map_err(|e| ConfigError::ThreadSpawnFailed {
                reason: e.to_string(),
            })?;
        info!(tick_rate_hz, tick_limit = tick_limit.map(|t| t.0), "clock thread started");

        Ok(Self {
            cmd_tx: Some(cmd_tx),
            audit_rx,
            latest,
            shutdown_flag,
            audit_dropped,
            clock: Some(clock),
        })
    }

    /// Queue a command for the next tick.
    pub fn submit(&self, command: Command) -> Result<(), SubmitError> {
        let tx = self.cmd_tx.as_ref().ok_or(SubmitError::Shutdown)?;
        tx.try_send(command).map_err(|e| match e {
            TrySendError::Full(_) => SubmitError::ChannelFull,
            TrySendError::Disconnected(_) => SubmitError::Shutdown,
        })
    }

    /// Queue a mode switch for the next tick.
    pub fn set_mode(&self, mode: SensorMode) -> Result<(), SubmitError> {
        self.submit(Command::SetMode(mode))
    }

    /// The most recently published snapshot.
    pub fn latest_snapshot(&self) -> Arc<LineSnapshot> {
        let guard = self.latest.read().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(&*guard)
    }

    /// Tick of the most recently published snapshot.
    pub fn current_tick(&self) -> TickId {
        self.latest_snapshot().tick
    }

    /// Audit events produced since the last call, oldest first.
    ///
    /// Up to 4096 undrained events are buffered. Beyond that the clock
    /// thread drops new events rather than stall; see
    /// [`audit_dropped()`](Self::audit_dropped).
    pub fn drain_audit(&self) -> Vec<AuditEvent> {
        self.audit_rx.try_iter().collect()
    }

    /// Number of audit events dropped because the buffer was full.
    pub fn audit_dropped(&self) -> u64 {
        self.audit_dropped.load(Ordering::Relaxed)
    }

    /// Whether the clock thread is still running.
    pub fn is_running(&self) -> bool {
        self.clock.as_ref().is_some_and(|h| !h.is_finished())
    }

    /// Stop the clock thread and recover the engine.
    pub fn shutdown(mut self) -> Result<TickEngine, ConfigError> {
        self.stop()
    }

    fn stop(&mut self) -> Result<TickEngine, ConfigError> {
        self.shutdown_flag.store(true, Ordering::Release);
        self.cmd_tx.take();
        let handle = self.clock.take().ok_or(ConfigError::EngineRecoveryFailed)?;
        handle.thread().unpark();
        let engine = handle
            .join()
            .map_err(|_| ConfigError::EngineRecoveryFailed)?;
        info!(tick = engine.current_tick().0, "clock thread stopped");
        Ok(engine)
    }
}

impl Drop for RealtimeLine {
    fn drop(&mut self) {
        if self.clock.is_some() {
            let _ = self.stop();
        }
    }
}

impl std::fmt::Debug for RealtimeLine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RealtimeLine")
            .field("current_tick", &self.current_tick())
            .field("running", &self.is_running())
            .field("audit_dropped", &self.audit_dropped())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{Duration, Instant};

    fn fast_config() -> LineConfig {
        LineConfig {
            tick_rate_hz: 1000.0,
            ..LineConfig::default()
        }
    }

    fn wait_for_tick(line: &RealtimeLine, tick: u64) {
        let deadline = Instant::now() + Duration::from_secs(5);
        while line.current_tick().0 < tick {
            assert!(Instant::now() < deadline, "clock did not reach tick {tick}");
            thread::sleep(Duration::from_millis(5));
        }
    }

    #[test]
    fn lifecycle_start_and_shutdown() {
        let line = RealtimeLine::new(fast_config()).unwrap();
        wait_for_tick(&line, 3);
        assert!(line.is_running());
        let engine = line.shutdown().unwrap();
        assert!(engine.current_tick().0 >= 3);
        assert!(engine.counters().total_spawned >= 1);
    }

    #[test]
    fn initial_snapshot_is_tick_zero() {
        let config = LineConfig {
            tick_rate_hz: 0.5,
            ..LineConfig::default()
        };
        let line = RealtimeLine::new(config).unwrap();
        // The first tick runs immediately; the snapshot is either the
        // initial one or tick 1.
        assert!(line.current_tick().0 <= 1);
    }

    #[test]
    fn mode_command_flows_through() {
        let line = RealtimeLine::new(fast_config()).unwrap();
        line.set_mode(SensorMode::Color).unwrap();
        let deadline = Instant::now() + Duration::from_secs(5);
        while line.latest_snapshot().mode != SensorMode::Color {
            assert!(Instant::now() < deadline, "mode change never published");
            thread::sleep(Duration::from_millis(5));
        }
        let audit = line.drain_audit();
        assert!(audit.iter().any(|e| matches!(
            e,
            AuditEvent::ModeChanged {
                mode: SensorMode::Color,
                ..
            }
        )));
    }

    #[test]
    fn shutdown_fast_with_slow_tick_rate() {
        let config = LineConfig {
            tick_rate_hz: 0.5,
            ..LineConfig::default()
        };
        let line = RealtimeLine::new(config).unwrap();
        thread::sleep(Duration::from_millis(50));
        let start = Instant::now();
        line.shutdown().unwrap();
        assert!(start.elapsed() < Duration::from_secs(1));
    }

    #[test]
    fn drop_stops_thread() {
        let line = RealtimeLine::new(fast_config()).unwrap();
        wait_for_tick(&line, 1);
        drop(line);
    }

    #[test]
    fn tick_limit_stops_on_exact_tick() {
        let line = RealtimeLine::with_tick_limit(fast_config(), 10).unwrap();
        let deadline = Instant::now() + Duration::from_secs(5);
        while line.is_running() {
            assert!(Instant::now() < deadline, "clock did not stop at its limit");
            thread::sleep(Duration::from_millis(5));
        }
        assert_eq!(line.current_tick(), TickId(10));
        assert_eq!(line.set_mode(SensorMode::Color), Err(SubmitError::Shutdown));
        let engine = line.shutdown().unwrap();
        assert_eq!(engine.current_tick(), TickId(10));
    }

    #[test]
    fn drained_line_drops_no_audit() {
        let line = RealtimeLine::new(fast_config()).unwrap();
        line.set_mode(SensorMode::Size).unwrap();
        wait_for_tick(&line, 3);
        assert!(!line.drain_audit().is_empty());
        assert_eq!(line.audit_dropped(), 0);
    }

    #[test]
    fn invalid_rate_rejected() {
        let engine = TickEngine::new(LineConfig::default()).unwrap();
        let err = RealtimeLine::from_engine(engine, 0.0).unwrap_err();
        assert_eq!(err, ConfigError::InvalidTickRate { value: 0.0 });
    }

    #[test]
    fn submit_error_display() {
        assert_eq!(SubmitError::Shutdown.to_string(), "clock thread has shut down");
        assert_eq!(SubmitError::ChannelFull.to_string(), "command channel full");
    }
}
