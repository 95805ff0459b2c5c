//! Half-hour slot arithmetic for the Monday–Friday teaching week.

pub const SLOTS_PER_DAY: u32 = 48;
pub const DAYS: u32 = 5;
pub const SLOTS_PER_WEEK: u32 = SLOTS_PER_DAY * DAYS;

/// 08:00.
pub const OPEN_SLOT: u32 = 16;
/// 20:00, exclusive.
pub const CLOSE_SLOT: u32 = 40;

/// Longest session that fits inside one operating day.
pub const MAX_DURATION: u32 = CLOSE_SLOT - OPEN_SLOT;

const DAY_NAMES: [&str; DAYS as usize] = ["mon", "tue", "wed", "thu", "fri"];

#[inline]
pub fn day_of(slot: u32) -> u32 {
    slot / SLOTS_PER_DAY
}

#[inline]
pub fn slot_in_day(slot: u32) -> u32 {
    slot % SLOTS_PER_DAY
}

#[inline]
pub fn is_whole_hour(slot: u32) -> bool {
    slot_in_day(slot) % 2 == 0
}

#[inline]
pub fn ideal_slot(hour: u32) -> u32 {
    hour * 2
}

/// Operating-hours part of the placement rules: the block must start no
/// earlier than 08:00, end no later than 20:00 and stay inside the week.
pub fn within_hours(start: u32, duration: u32) -> bool {
    if duration == 0 || start >= SLOTS_PER_WEEK {
        return false;
    }
    let offset = slot_in_day(start);
    offset >= OPEN_SLOT && offset + duration <= CLOSE_SLOT
}

/// `"wed 13:30"` style label, used in logs and violation details.
pub fn label(slot: u32) -> String {
    let day = DAY_NAMES
        .get(day_of(slot) as usize)
        .copied()
        .unwrap_or("???");
    let offset = slot_in_day(slot);
    format!("{day} {:02}:{:02}", offset / 2, (offset % 2) * 30)
}
