//! Line configuration, validation, and error types.
//!
//! [`LineConfig`] is the builder-input for constructing a sorting line.
//! [`validate()`](LineConfig::validate) checks structural invariants at
//! startup; the engine constructors call it before allocating anything.

use std::error::Error;
use std::fmt;
use std::ops::RangeInclusive;

use sortline_core::source::DEFAULT_SPAWN_OFFSET;
use sortline_core::{LaneIndex, SensorMode};
use sortline_pool::{PoolConfig, PoolError};

// ── LineGeometry ──────────────────────────────────────────────────

/// Screen-space layout and per-tick motion constants.
///
/// Coordinates grow right and down. Defaults reproduce a 1100-unit-wide
/// line with one incoming lane above four output lanes.
#[derive(Clone, Debug, PartialEq)]
pub struct LineGeometry {
    /// Visible width of the line. Default: 1100.
    pub width: f64,
    /// Top of the incoming lane. Default: 120.
    pub incoming_y: f64,
    /// Height of the incoming lane. Default: 120.
    pub incoming_height: f64,
    /// Top of output lane 1. Default: 320.
    pub output_top_y: f64,
    /// Height of each output lane. Default: 70.
    pub output_lane_height: f64,
    /// Vertical gap between output lanes. Default: 40.
    pub output_gap: f64,
    /// Package box width. Default: 130.
    pub package_width: f64,
    /// Package box height. Default: 70.
    pub package_height: f64,
    /// Horizontal advance per tick on any lane. Default: 2.5.
    pub speed: f64,
    /// Vertical advance per tick while diverting. Default: 6.
    pub drop_speed: f64,
    /// How far past `width` a package travels before it exits. Default: 80.
    pub exit_margin: f64,
    /// Half-width of the decision window around a sensor. Default: 6.
    pub decision_half_width: f64,
    /// Distance behind `x = 0` a package spawns at. Default: `80..=500`.
    pub spawn_offset: RangeInclusive<u32>,
    /// Stripe spacing of the cosmetic belt animation. Default: 40.
    pub stripe_period: f64,
    /// Stripe movement per tick. Default: 4.
    pub stripe_speed: f64,
}

impl Default for LineGeometry {
    fn default() -> Self {
        Self {
            width: 1100.0,
            incoming_y: 120.0,
            incoming_height: 120.0,
            output_top_y: 320.0,
            output_lane_height: 70.0,
            output_gap: 40.0,
            package_width: 130.0,
            package_height: 70.0,
            speed: 2.5,
            drop_speed: 6.0,
            exit_margin: 80.0,
            decision_half_width: 6.0,
            spawn_offset: DEFAULT_SPAWN_OFFSET,
            stripe_period: 40.0,
            stripe_speed: 4.0,
        }
    }
}

impl LineGeometry {
    /// y given to a package spawned onto the incoming lane.
    pub fn spawn_y(&self) -> f64 {
        self.incoming_y + ((self.incoming_height - self.package_height) / 2.0).floor()
    }

    /// Top edge of an output lane.
    ///
    /// `lane` must be an output lane; the incoming lane maps to its own top.
    pub fn lane_top(&self, lane: LaneIndex) -> f64 {
        if !lane.is_output() {
            return self.incoming_y;
        }
        let i = f64::from(lane.0 - 1);
        self.output_top_y + i * (self.output_lane_height + self.output_gap)
    }

    /// y at which a package diverted to `lane` comes to rest.
    pub fn drop_target(&self, lane: LaneIndex) -> f64 {
        self.lane_top(lane) + ((self.output_lane_height - self.package_height) / 2.0).floor()
    }

    /// Fixed y of the actuator's base: the bottom of the incoming lane.
    pub fn actuator_base_y(&self) -> f64 {
        self.incoming_y + self.incoming_height
    }

    /// Offset subtracted from the actuator x when a package is snapped under it.
    pub fn snap_offset(&self) -> f64 {
        (self.package_width / 2.0).floor()
    }

    /// x beyond which a package leaves the line.
    pub fn exit_x(&self) -> f64 {
        self.width + self.exit_margin
    }

    /// Whether a package whose left edge is at `x` has its centre strictly
    /// inside the decision window around `sensor_x`.
    pub fn in_decision_window(&self, x: f64, sensor_x: f64) -> bool {
        let center = x + self.package_width / 2.0;
        sensor_x - self.decision_half_width < center && center < sensor_x + self.decision_half_width
    }

    /// Pool settings implied by this layout.
    pub(crate) fn pool_config(&self, capacity: usize) -> PoolConfig {
        PoolConfig {
            capacity,
            spawn_y: self.spawn_y(),
        }
    }
}

// ── ConfigError ────────────────────────────────────────────────────

/// Errors detected during [`LineConfig::validate()`] or while starting
/// and stopping a realtime line.
#[derive(Debug, PartialEq)]
pub enum ConfigError {
    /// Pool configuration is invalid.
    Pool(PoolError),
    /// tick_rate_hz is NaN, infinite, zero, or negative.
    InvalidTickRate {
        /// The invalid value.
        value: f64,
    },
    /// spawn_interval_ticks is zero.
    ZeroSpawnInterval,
    /// A per-tick rate is NaN, infinite, zero, or negative.
    InvalidSpeed {
        /// Which rate.
        name: &'static str,
        /// The invalid value.
        value: f64,
    },
    /// The spawn offset range is empty.
    InvalidSpawnOffset {
        /// Configured lower bound.
        start: u32,
        /// Configured upper bound.
        end: u32,
    },
    /// A layout dimension is not finite and positive.
    InvalidGeometry {
        /// Description of which dimension failed.
        reason: String,
    },
    /// Engine could not be recovered from the clock thread (e.g. thread panicked).
    EngineRecoveryFailed,
    /// The clock thread could not be spawned.
    ThreadSpawnFailed {
        /// Description of the failure.
        reason: String,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pool(e) => write!(f, "pool: {e}"),
            Self::InvalidTickRate { value } => {
                write!(f, "tick_rate_hz must be finite and positive, got {value}")
            }
            Self::ZeroSpawnInterval => write!(f, "spawn_interval_ticks must be at least 1"),
            Self::InvalidSpeed { name, value } => {
                write!(f, "{name} must be finite and positive, got {value}")
            }
            Self::InvalidSpawnOffset { start, end } => {
                write!(f, "spawn offset range {start}..={end} is empty")
            }
            Self::InvalidGeometry { reason } => write!(f, "invalid geometry: {reason}"),
            Self::EngineRecoveryFailed => {
                write!(f, "engine could not be recovered from clock thread")
            }
            Self::ThreadSpawnFailed { reason } => {
                write!(f, "thread spawn failed: {reason}")
            }
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Pool(e) => Some(e),
            _ => None,
        }
    }
}

impl From<PoolError> for ConfigError {
    fn from(e: PoolError) -> Self {
        Self::Pool(e)
    }
}

// ── LineConfig ─────────────────────────────────────────────────────

/// Complete configuration for constructing a sorting line.
#[derive(Clone, Debug, PartialEq)]
pub struct LineConfig {
    /// Number of reusable package slots. Default: 10.
    pub pool_capacity: usize,
    /// Clock rate for realtime mode. Default: 60.
    pub tick_rate_hz: f64,
    /// Ticks between successful spawns. Default: 96 (1.6 s at 60 Hz).
    pub spawn_interval_ticks: u64,
    /// RNG seed for spawn draws.
    pub seed: u64,
    /// Mode active at startup. Default: weight.
    pub initial_mode: SensorMode,
    /// Actuator extend/retract rate per tick. Default: 12.
    pub extend_rate: f64,
    /// Layout and motion constants.
    pub geometry: LineGeometry,
}

impl Default for LineConfig {
    fn default() -> Self {
        Self {
            pool_capacity: PoolConfig::DEFAULT_CAPACITY,
            tick_rate_hz: 60.0,
            spawn_interval_ticks: 96,
            seed: 0,
            initial_mode: SensorMode::Weight,
            extend_rate: 12.0,
            geometry: LineGeometry::default(),
        }
    }
}

impl LineConfig {
    /// Validate all structural invariants.
    pub fn validate(&self) -> Result<(), ConfigError> {
        // 1. Pool capacity.
        if self.pool_capacity == 0 {
            return Err(PoolError::ZeroCapacity.into());
        }
        if u32::try_from(self.pool_capacity).is_err() {
            return Err(PoolError::CapacityOverflow {
                requested: self.pool_capacity,
            }
            .into());
        }
        // 2. tick_rate_hz must be finite and positive, and its reciprocal
        //    must also be finite (Duration::from_secs_f64 panics on inf).
        let hz = self.tick_rate_hz;
        if !hz.is_finite() || hz <= 0.0 || !(1.0 / hz).is_finite() {
            return Err(ConfigError::InvalidTickRate { value: hz });
        }
        // 3. Spawn interval.
        if self.spawn_interval_ticks == 0 {
            return Err(ConfigError::ZeroSpawnInterval);
        }
        // 4. Per-tick rates.
        let g = &self.geometry;
        for (name, value) in [
            ("speed", g.speed),
            ("drop_speed", g.drop_speed),
            ("extend_rate", self.extend_rate),
        ] {
            if !value.is_finite() || value <= 0.0 {
                return Err(ConfigError::InvalidSpeed { name, value });
            }
        }
        // 5. Spawn offsets.
        if g.spawn_offset.is_empty() {
            return Err(ConfigError::InvalidSpawnOffset {
                start: *g.spawn_offset.start(),
                end: *g.spawn_offset.end(),
            });
        }
        // 6. Layout dimensions.
        for (name, value) in [
            ("width", g.width),
            ("incoming_height", g.incoming_height),
            ("output_lane_height", g.output_lane_height),
            ("package_width", g.package_width),
            ("package_height", g.package_height),
            ("decision_half_width", g.decision_half_width),
            ("stripe_period", g.stripe_period),
        ] {
            if !value.is_finite() || value <= 0.0 {
                return Err(ConfigError::InvalidGeometry {
                    reason: format!("{name} must be finite and positive, got {value}"),
                });
            }
        }
        for (name, value) in [
            ("incoming_y", g.incoming_y),
            ("output_top_y", g.output_top_y),
            ("output_gap", g.output_gap),
            ("exit_margin", g.exit_margin),
            ("stripe_speed", g.stripe_speed),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::InvalidGeometry {
                    reason: format!("{name} must be finite and non-negative, got {value}"),
                });
            }
        }
        // 7. A package must not be able to step over the decision window.
        if g.speed >= 2.0 * g.decision_half_width {
            return Err(ConfigError::InvalidGeometry {
                reason: format!(
                    "speed ({}) must be less than the decision window width ({})",
                    g.speed,
                    2.0 * g.decision_half_width
                ),
            });
        }
        // 8. Output lanes must sit below the incoming lane so drops go down.
        if g.output_top_y < g.actuator_base_y() {
            return Err(ConfigError::InvalidGeometry {
                reason: format!(
                    "output_top_y ({}) is above the incoming lane bottom ({})",
                    g.output_top_y,
                    g.actuator_base_y()
                ),
            });
        }
        Ok(())
    }
}
