//! The package slot arena.
//!
//! [`PackagePool`] owns one [`Package`] record per slot. Slot order is
//! fixed at construction and every scan runs `0..N-1`, so which slot a
//! spawn lands in depends only on which slots are free.

use sortline_core::{LaneIndex, LifecycleState, Package, Position, SlotId, SpawnSource};
use tracing::{debug, trace};

use crate::config::PoolConfig;
use crate::error::PoolError;

/// Fixed-capacity set of reusable package slots.
///
/// No slot is added or removed after construction. [`spawn()`](Self::spawn)
/// reactivates the first inactive slot; [`recycle()`](Self::recycle)
/// returns a slot to the free state.
#[derive(Clone, Debug)]
pub struct PackagePool {
    slots: Vec<Package>,
    spawn_y: f64,
}

impl PackagePool {
    /// Allocate every slot up front. All start inactive.
    pub fn new(config: &PoolConfig) -> Result<Self, PoolError> {
        if config.capacity == 0 {
            return Err(PoolError::ZeroCapacity);
        }
        let n = u32::try_from(config.capacity).map_err(|_| PoolError::CapacityOverflow {
            requested: config.capacity,
        })?;
        let slots = (0..n).map(|i| Package::new(SlotId(i))).collect();
        Ok(Self {
            slots,
            spawn_y: config.spawn_y,
        })
    }

    /// Number of slots.
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Number of slots whose state is not `Inactive`.
    pub fn active_count(&self) -> usize {
        self.slots.iter().filter(|p| p.is_active()).count()
    }

    /// Whether every slot is occupied.
    pub fn is_saturated(&self) -> bool {
        self.slots.iter().all(|p| p.is_active())
    }

    /// Activate the first inactive slot with a fresh draw from `source`.
    ///
    /// The slot gets new attributes, the drawn off-screen x, the incoming
    /// lane's y, `lane = INCOMING` and state `Incoming`. Returns `None`
    /// without touching `source` if every slot is active; the caller
    /// retries on a later tick.
    pub fn spawn(&mut self, source: &mut dyn SpawnSource) -> Option<SlotId> {
        let Some(pkg) = self.slots.iter_mut().find(|p| !p.is_active()) else {
            trace!("spawn deferred: pool saturated");
            return None;
        };
        let draw = source.next_spawn();
        pkg.attributes = draw.attributes;
        pkg.position = Position {
            x: draw.x,
            y: self.spawn_y,
        };
        pkg.lane = LaneIndex::INCOMING;
        pkg.state = LifecycleState::Incoming;
        pkg.generation += 1;
        debug!(
            package = %pkg.id,
            generation = pkg.generation,
            weight = pkg.attributes.weight,
            color = %pkg.attributes.color,
            size = %pkg.attributes.size,
            x = pkg.position.x,
            "spawned"
        );
        Some(pkg.slot)
    }

    /// Return a slot to the free state, clearing its lane and drop target.
    ///
    /// Returns `false` if the slot was already inactive or does not exist.
    pub fn recycle(&mut self, slot: SlotId) -> bool {
        match self.slots.get_mut(slot.index()) {
            Some(pkg) if pkg.is_active() => {
                pkg.state = LifecycleState::Inactive;
                pkg.lane = LaneIndex::INCOMING;
                true
            }
            _ => false,
        }
    }

    /// Mark every slot inactive and forget spawn generations.
    pub fn reset(&mut self) {
        for pkg in &mut self.slots {
            *pkg = Package::new(pkg.slot);
        }
    }

    /// The package in `slot`, if the slot exists.
    pub fn get(&self, slot: SlotId) -> Option<&Package> {
        self.slots.get(slot.index())
    }

    /// Mutable access to the package in `slot`, if the slot exists.
    pub fn get_mut(&mut self, slot: SlotId) -> Option<&mut Package> {
        self.slots.get_mut(slot.index())
    }

    /// All slots in scan order.
    pub fn iter(&self) -> std::slice::Iter<'_, Package> {
        self.slots.iter()
    }

    /// All slots in scan order, mutably.
    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, Package> {
        self.slots.iter_mut()
    }

    /// Live packages in scan order.
    pub fn active(&self) -> impl Iterator<Item = &Package> {
        self.slots.iter().filter(|p| p.is_active())
    }
}
