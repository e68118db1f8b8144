use std::collections::HashSet;

use chrono::{DateTime, NaiveDate, Utc};

use crate::models::{Slot, SlotGridConfig};

/// Derive the full day's slot list for one (provider, date) pair.
///
/// An hour is available when it is not occupied and its full date+hour
/// instant is still ahead of `now`. The instant comparison, not the bare
/// hour-of-day, is what keeps future dates fully open and rules out
/// earlier-today hours even when nobody booked them.
///
/// Output ordering is the grid order: morning block before afternoon block,
/// ascending hours within each. Pure for fixed inputs.
pub fn derive_day_slots(
    grid: &SlotGridConfig,
    date: NaiveDate,
    occupied: &HashSet<u32>,
    now: DateTime<Utc>,
) -> Vec<Slot> {
    grid.hours()
        .filter_map(|hour| {
            // Hours outside 0-23 cannot form an instant and yield no slot.
            let instant = date.and_hms_opt(hour, 0, 0)?.and_utc();
            Some(Slot {
                hour,
                label: format!("{:02}:00", hour),
                available: !occupied.contains(&hour) && instant > now,
            })
        })
        .collect()
}
