//! Pool configuration parameters.

/// Configuration for the package pool.
///
/// Validated at construction; immutable afterwards.
#[derive(Clone, Debug, PartialEq)]
pub struct PoolConfig {
    /// Number of package slots.
    ///
    /// Default: 10. Must be at least 1 and fit in `u32`.
    pub capacity: usize,

    /// Vertical position given to a package when it spawns onto the
    /// incoming lane.
    ///
    /// Default: 145 (incoming lane top 120, centred 70-unit box in a
    /// 120-unit lane).
    pub spawn_y: f64,
}

impl PoolConfig {
    /// Default slot count.
    pub const DEFAULT_CAPACITY: usize = 10;

    /// Default spawn y.
    pub const DEFAULT_SPAWN_Y: f64 = 145.0;

    /// Create a config with the given capacity and default spawn y.
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            spawn_y: Self::DEFAULT_SPAWN_Y,
        }
    }
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self::new(Self::DEFAULT_CAPACITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_capacity_is_ten() {
        let config = PoolConfig::default();
        assert_eq!(config.capacity, 10);
        assert_eq!(config.spawn_y, 145.0);
    }
}
