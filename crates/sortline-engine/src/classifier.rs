//! Sensor classification: attribute + mode → output lane.
//!
//! Pure functions with no side effects. The engine records the audit
//! entry for each read; nothing here logs.
//!
//! | Mode   | Rule |
//! |--------|------|
//! | Weight | `≤5 → 1`, `≤10 → 2`, `≤15 → 3`, else `4` |
//! | Color  | Red 1, Green 2, Blue 3, Yellow 4, anything else 1 |
//! | Size   | Small 1, Medium 2, Large 3, Extra Large 4, anything else 1 |

use sortline_core::{Attributes, LaneIndex, PackageColor, PackageSize, SensorMode, SensorReading};

/// Lane a package goes to when its attribute is not in the table.
pub const FALLBACK_LANE: LaneIndex = LaneIndex(1);

/// Read the mode's sensor and map the reading to a lane.
pub fn classify(attributes: &Attributes, mode: SensorMode) -> (LaneIndex, SensorReading) {
    let reading = mode.read(attributes);
    (lane_for(reading), reading)
}

/// Map a single reading to its output lane.
pub fn lane_for(reading: SensorReading) -> LaneIndex {
    match reading {
        SensorReading::Weight(w) => weight_lane(w),
        SensorReading::Color(c) => color_lane(c),
        SensorReading::Size(s) => size_lane(s),
    }
}

fn weight_lane(weight: u8) -> LaneIndex {
    match weight {
        0..=5 => LaneIndex(1),
        6..=10 => LaneIndex(2),
        11..=15 => LaneIndex(3),
        _ => LaneIndex(4),
    }
}

fn color_lane(color: PackageColor) -> LaneIndex {
    match color {
        PackageColor::Red => LaneIndex(1),
        PackageColor::Green => LaneIndex(2),
        PackageColor::Blue => LaneIndex(3),
        PackageColor::Yellow => LaneIndex(4),
        PackageColor::Unknown => FALLBACK_LANE,
    }
}

fn size_lane(size: PackageSize) -> LaneIndex {
    match size {
        PackageSize::Small => LaneIndex(1),
        PackageSize::Medium => LaneIndex(2),
        PackageSize::Large => LaneIndex(3),
        PackageSize::ExtraLarge => LaneIndex(4),
        PackageSize::Unknown => FALLBACK_LANE,
    }
}
