//! Random source for spawn-time draws.
//!
//! All randomness in the simulation flows through [`SpawnSource`]. The
//! production implementation, [`SeededSource`], wraps a ChaCha8 RNG
//! seeded from a `u64`, so identical seeds produce identical runs. Tests
//! substitute scripted sources to pin exact attribute sequences.

use std::ops::RangeInclusive;

use rand::prelude::*;
use rand_chacha::ChaCha8Rng;

use crate::package::{Attributes, PackageColor, PackageSize, WEIGHT_RANGE};

/// Default distance range (in screen units) a package starts behind `x = 0`.
pub const DEFAULT_SPAWN_OFFSET: RangeInclusive<u32> = 80..=500;

/// Everything drawn at random when a slot is spawned.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SpawnDraw {
    /// Fresh attributes for the package.
    pub attributes: Attributes,
    /// Starting x; off-screen, so always negative for real draws.
    pub x: f64,
}

/// Supplier of spawn-time random draws.
///
/// `Send` so an engine owning a source can move onto a clock thread.
pub trait SpawnSource: Send {
    /// Produce the draw for the next spawn.
    ///
    /// Called only when a free slot exists, so a saturated pool never
    /// consumes randomness.
    fn next_spawn(&mut self) -> SpawnDraw;
}

/// ChaCha8-backed [`SpawnSource`] with uniform draws.
///
/// Weight is uniform in `1..=20`, color and size uniform over their
/// known sets, and x is `-d` for `d` uniform in the offset range.
#[derive(Clone, Debug)]
pub struct SeededSource {
    rng: ChaCha8Rng,
    offset: RangeInclusive<u32>,
}

impl SeededSource {
    /// Create a source seeded from `seed` with the default offset range.
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
            offset: DEFAULT_SPAWN_OFFSET,
        }
    }

    /// Override the spawn offset range. `offset` must be non-empty.
    pub fn with_offset_range(mut self, offset: RangeInclusive<u32>) -> Self {
        self.offset = offset;
        self
    }
}

impl SpawnSource for SeededSource {
    fn next_spawn(&mut self) -> SpawnDraw {
        let weight = self.rng.gen_range(WEIGHT_RANGE);
        let color = PackageColor::ALL[self.rng.gen_range(0..PackageColor::ALL.len())];
        let size = PackageSize::ALL[self.rng.gen_range(0..PackageSize::ALL.len())];
        let distance = self.rng.gen_range(self.offset.clone());
        SpawnDraw {
            attributes: Attributes {
                weight,
                color,
                size,
            },
            x: -f64::from(distance),
        }
    }
}
