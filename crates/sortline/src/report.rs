//! Plain-text rendering of a [`LineSnapshot`].

use std::fmt::Write;

use sortline_core::SensorReading;
use sortline_engine::{LaneView, LineSnapshot, PackageView};

/// One line per output lane, then the line-wide totals.
pub fn summary(snap: &LineSnapshot) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "MODE: {} ({}) at tick {}",
        snap.mode.key().to_uppercase(),
        snap.mode.sensor_name(),
        snap.tick
    );
    for lane in &snap.lanes {
        let _ = writeln!(out, "{}", lane_line(lane));
    }
    let t = &snap.totals;
    let _ = writeln!(out, "Input spawned: {}", t.total_spawned);
    let _ = writeln!(out, "Total assigned: {}", t.total_assigned);
    let _ = writeln!(out, "Total processed: {}", t.total_processed);
    let _ = write!(out, "Unsorted left incoming: {}", t.unsorted);
    out
}

/// `Belt 2 - current:1 assigned:4 processed:3`
pub fn lane_line(lane: &LaneView) -> String {
    format!(
        "Belt {} - current:{} assigned:{} processed:{}",
        lane.lane, lane.queue_len, lane.assigned, lane.processed
    )
}

/// `P3 W:12kg Bin:2`, with the attribute the active sensor reads.
pub fn package_line(pkg: &PackageView) -> String {
    let attr = match pkg.reading {
        SensorReading::Weight(w) => format!("W:{w}kg"),
        SensorReading::Color(c) => format!("C:{c}"),
        SensorReading::Size(s) => format!("S:{s}"),
    };
    format!("{} {attr} Bin:{}", pkg.id, pkg.lane)
}

#[cfg(test)]
mod tests {
    use super::*;
    use sortline_core::{LaneIndex, PackageColor, PackageSize, SlotId};
    use sortline_engine::{LineConfig, LockstepLine};

    #[test]
    fn lane_line_format() {
        let lane = LaneView {
            lane: LaneIndex(2),
            queue_len: 1,
            assigned: 4,
            processed: 3,
            queued: vec!["P7".into()],
        };
        assert_eq!(lane_line(&lane), "Belt 2 - current:1 assigned:4 processed:3");
    }

    #[test]
    fn package_line_uses_reading() {
        let mut pkg = PackageView {
            id: "P3".into(),
            slot: SlotId(2),
            generation: 1,
            x: 10.0,
            y: 145.0,
            color: PackageColor::Blue,
            lane: LaneIndex(2),
            state: "on_lane",
            reading: SensorReading::Weight(12),
        };
        assert_eq!(package_line(&pkg), "P3 W:12kg Bin:2");
        pkg.reading = SensorReading::Size(PackageSize::ExtraLarge);
        assert_eq!(package_line(&pkg), "P3 S:Extra Large Bin:2");
        pkg.reading = SensorReading::Color(PackageColor::Blue);
        assert_eq!(package_line(&pkg), "P3 C:Blue Bin:2");
    }

    #[test]
    fn summary_lists_every_lane() {
        let mut line = LockstepLine::new(LineConfig::default()).unwrap();
        for _ in 0..10 {
            line.step_sync(vec![]);
        }
        let text = summary(&line.snapshot().to_line_snapshot());
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "MODE: WEIGHT (Weight Sensor) at tick 10");
        assert_eq!(lines[1], "Belt 1 - current:0 assigned:0 processed:0");
        assert!(lines[4].starts_with("Belt 4"));
        assert_eq!(lines[5], "Input spawned: 1");
        assert_eq!(lines[8], "Unsorted left incoming: 0");
    }
}
