//! Property tests: line-wide invariants hold on every tick of random
//! runs with random pool sizes, spawn rates and mode-switch schedules.

use proptest::prelude::*;
use sortline_core::{Command, LifecycleState, SensorMode};
use sortline_engine::{LineConfig, LockstepLine, Snapshot};

fn state_rank(state: LifecycleState) -> u8 {
    match state {
        LifecycleState::Inactive => 0,
        LifecycleState::Incoming => 1,
        LifecycleState::Diverting { .. } => 2,
        LifecycleState::OnLane => 3,
    }
}

/// Checks everything that must hold after any tick. Returns a message
/// naming the first violation.
fn check_snapshot(snap: &Snapshot<'_>, capacity: usize) -> Result<(), String> {
    // Pool bound.
    if snap.active_count() > capacity {
        return Err(format!("{} active > capacity {capacity}", snap.active_count()));
    }

    // Single-queue membership iff OnLane, on its own lane.
    for pkg in snap.slots() {
        let belts = snap.belts();
        let n = belts.membership_count(pkg.slot);
        let on_lane = pkg.state == LifecycleState::OnLane;
        if n != usize::from(on_lane) {
            return Err(format!("{} in {n} queues while {}", pkg.id, pkg.state.name()));
        }
        if on_lane && belts.lane_of(pkg.slot) != Some(pkg.lane) {
            return Err(format!("{} queued on the wrong lane", pkg.id));
        }
        if pkg.target_y().is_some() != matches!(pkg.state, LifecycleState::Diverting { .. }) {
            return Err(format!("{} has a drop target outside Diverting", pkg.id));
        }
        if pkg.state == LifecycleState::Incoming && pkg.lane.is_output() {
            return Err(format!("{} incoming with a lane", pkg.id));
        }
    }

    // Counter conservation.
    let c = snap.counters();
    if c.total_assigned != c.assigned.iter().sum::<u64>() {
        return Err("total_assigned != sum(assigned)".into());
    }
    if c.total_processed() != c.processed.iter().sum::<u64>() {
        return Err("total_processed != sum(processed)".into());
    }
    if c.total_spawned != c.total_exited() + snap.active_count() as u64 {
        return Err(format!(
            "spawned {} != exited {} + active {}",
            c.total_spawned,
            c.total_exited(),
            snap.active_count()
        ));
    }
    if c.assigned[0] != 0 || c.processed[0] != 0 {
        return Err("incoming lane counted".into());
    }
    Ok(())
}

fn mode_strategy() -> impl Strategy<Value = SensorMode> {
    prop_oneof![
        Just(SensorMode::Weight),
        Just(SensorMode::Color),
        Just(SensorMode::Size),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    #[test]
    fn invariants_hold_every_tick(
        seed in any::<u64>(),
        capacity in 1usize..12,
        interval in 1u64..120,
        switches in proptest::collection::vec((0u64..1500, mode_strategy()), 0..6),
    ) {
        let config = LineConfig {
            pool_capacity: capacity,
            spawn_interval_ticks: interval,
            seed,
            ..LineConfig::default()
        };
        let mut line = LockstepLine::new(config).unwrap();
        // (generation, rank) per slot from the previous tick.
        let mut prev: Vec<(u32, u8)> = vec![(0, 0); capacity];
        let mut prev_exited = 0u64;

        for t in 1..=1500u64 {
            let commands: Vec<Command> = switches
                .iter()
                .filter(|(at, _)| *at == t)
                .map(|&(_, m)| Command::SetMode(m))
                .collect();
            let r = line.step_sync(commands);
            let snap = r.snapshot;

            if let Err(msg) = check_snapshot(&snap, capacity) {
                prop_assert!(false, "tick {}: {}", t, msg);
            }

            // Every exit bumps exactly one of processed / unsorted.
            let exited = snap.counters().total_exited();
            prop_assert_eq!(exited - prev_exited, u64::from(r.metrics.exited));
            prev_exited = exited;

            // One-way state machine within a generation.
            for pkg in snap.slots() {
                let rank = state_rank(pkg.state);
                let (gen, prev_rank) = prev[pkg.slot.index()];
                if pkg.generation == gen && rank != 0 {
                    prop_assert!(
                        rank >= prev_rank,
                        "{} went from rank {} to {}",
                        pkg.id, prev_rank, rank
                    );
                }
                prev[pkg.slot.index()] = (pkg.generation, rank);
            }
        }
    }

    #[test]
    fn same_seed_same_trajectory(seed in any::<u64>(), mode in mode_strategy()) {
        let config = LineConfig { seed, initial_mode: mode, ..LineConfig::default() };
        let mut a = LockstepLine::new(config.clone()).unwrap();
        let mut b = LockstepLine::new(config).unwrap();
        for _ in 0..400 {
            let ra = a.step_sync(vec![]);
            let audit_a = ra.audit;
            let sa = ra.snapshot.to_line_snapshot();
            let rb = b.step_sync(vec![]);
            prop_assert_eq!(&audit_a, &rb.audit);
            prop_assert_eq!(sa, rb.snapshot.to_line_snapshot());
        }
    }
}
