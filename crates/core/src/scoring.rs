use crate::grid::Grid;
use crate::slots;

/// Added for every session that does not start on the hour.
pub const OFF_HOUR_PENALTY: i64 = 100;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EnergyBreakdown {
    pub starts: usize,
    pub off_hour_starts: usize,
    pub distance_total: i64,
    pub energy: i64,
}

/// Penalty for one start: off-hour surcharge plus distance (in slots) from
/// the preferred start.
#[inline]
pub fn start_penalty(start: u32, ideal_slot: u32) -> i64 {
    let offset = slots::slot_in_day(start);
    let off_hour = if slots::is_whole_hour(start) {
        0
    } else {
        OFF_HOUR_PENALTY
    };
    off_hour + (offset as i64 - ideal_slot as i64).abs()
}

/// Objective minimised by the annealer. Lower is better.
pub fn energy(grid: &Grid, ideal_slot: u32) -> i64 {
    grid.starts()
        .map(|(_, p)| start_penalty(p.start, ideal_slot))
        .sum()
}

pub fn breakdown(grid: &Grid, ideal_slot: u32) -> EnergyBreakdown {
    breakdown_of_starts(grid.starts().map(|(_, p)| p.start), ideal_slot)
}

pub fn breakdown_of_starts(starts: impl IntoIterator<Item = u32>, ideal_slot: u32) -> EnergyBreakdown {
    let mut b = EnergyBreakdown::default();
    for start in starts {
        b.starts += 1;
        if !slots::is_whole_hour(start) {
            b.off_hour_starts += 1;
        }
        b.distance_total += (slots::slot_in_day(start) as i64 - ideal_slot as i64).abs();
    }
    b.energy = b.off_hour_starts as i64 * OFF_HOUR_PENALTY + b.distance_total;
    b
}
