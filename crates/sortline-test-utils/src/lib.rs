//! Test utilities for sortline development.
//!
//! Provides [`ScriptedSource`], a [`SpawnSource`] that replays a fixed
//! sequence of draws, and small constructors for the draws themselves.

#![forbid(unsafe_code)]
#![allow(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

use sortline_core::{Attributes, PackageColor, PackageSize, SpawnDraw, SpawnSource};

/// Starting x used by the fixture constructors: just off-screen.
pub const FIXTURE_SPAWN_X: f64 = -80.0;

/// Replays a scripted list of draws, cycling when exhausted.
///
/// Counts how many draws were taken so tests can assert that a
/// saturated pool does not consume randomness.
#[derive(Clone, Debug)]
pub struct ScriptedSource {
    draws: Vec<SpawnDraw>,
    next: usize,
    taken: usize,
}

impl ScriptedSource {
    /// # Panics
    ///
    /// Panics if `draws` is empty.
    pub fn new(draws: Vec<SpawnDraw>) -> Self {
        assert!(!draws.is_empty(), "ScriptedSource needs at least one draw");
        Self {
            draws,
            next: 0,
            taken: 0,
        }
    }

    /// Every spawn gets the same draw.
    pub fn repeating(draw: SpawnDraw) -> Self {
        Self::new(vec![draw])
    }

    /// Number of draws handed out so far.
    pub fn taken(&self) -> usize {
        self.taken
    }
}

impl SpawnSource for ScriptedSource {
    fn next_spawn(&mut self) -> SpawnDraw {
        let d = self.draws[self.next];
        self.next = (self.next + 1) % self.draws.len();
        self.taken += 1;
        d
    }
}

/// A draw with explicit attributes, starting at [`FIXTURE_SPAWN_X`].
pub fn draw(weight: u8, color: PackageColor, size: PackageSize) -> SpawnDraw {
    SpawnDraw {
        attributes: Attributes {
            weight,
            color,
            size,
        },
        x: FIXTURE_SPAWN_X,
    }
}

/// A draw that only pins the weight.
pub fn weight_draw(weight: u8) -> SpawnDraw {
    draw(weight, PackageColor::Red, PackageSize::Small)
}

/// A draw that only pins the color.
pub fn color_draw(color: PackageColor) -> SpawnDraw {
    draw(1, color, PackageSize::Small)
}

/// The same draw starting at a different x.
pub fn at_x(mut d: SpawnDraw, x: f64) -> SpawnDraw {
    d.x = x;
    d
}
