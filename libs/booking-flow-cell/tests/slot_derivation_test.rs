use std::collections::HashSet;

use chrono::{DateTime, NaiveDate, Utc};

use booking_flow_cell::models::SlotGridConfig;
use booking_flow_cell::services::slots::derive_day_slots;

fn day(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn at(date: NaiveDate, hour: u32) -> DateTime<Utc> {
    date.and_hms_opt(hour, 0, 0).unwrap().and_utc()
}

fn occupied(hours: &[u32]) -> HashSet<u32> {
    hours.iter().copied().collect()
}

#[test]
fn test_full_grid_shape() {
    let grid = SlotGridConfig::default();
    let date = day(2026, 9, 15);
    // Well before the day starts, nothing occupied.
    let now = at(day(2026, 9, 1), 12);

    let slots = derive_day_slots(&grid, date, &occupied(&[]), now);

    assert_eq!(slots.len(), 9);
    let hours: Vec<u32> = slots.iter().map(|s| s.hour).collect();
    assert_eq!(hours, vec![8, 9, 10, 11, 13, 14, 15, 16, 17]);
    assert!(!hours.contains(&12));

    assert_eq!(slots[0].label, "08:00");
    assert_eq!(slots[4].label, "13:00");
    assert_eq!(slots[8].label, "17:00");
    assert!(slots.iter().all(|s| s.available));
}

#[test]
fn test_occupied_hours_marked_unavailable() {
    let grid = SlotGridConfig::default();
    let date = day(2026, 9, 15);
    let now = at(day(2026, 9, 1), 12);

    let slots = derive_day_slots(&grid, date, &occupied(&[9, 15]), now);

    for slot in &slots {
        let expected = !matches!(slot.hour, 9 | 15);
        assert_eq!(slot.available, expected, "hour {}", slot.hour);
    }
}

#[test]
fn test_derivation_is_idempotent() {
    let grid = SlotGridConfig::default();
    let date = day(2026, 9, 15);
    let now = at(day(2026, 9, 15), 10);
    let taken = occupied(&[13]);

    let first = derive_day_slots(&grid, date, &taken, now);
    let second = derive_day_slots(&grid, date, &taken, now);

    assert_eq!(first, second);
}

#[test]
fn test_same_day_afternoon_excludes_past_hours() {
    // Scenario: it is 14:00 on the selected day and hour 15 is occupied.
    let grid = SlotGridConfig::default();
    let date = day(2026, 9, 15);
    let now = at(date, 14);

    let slots = derive_day_slots(&grid, date, &occupied(&[15]), now);

    for slot in &slots {
        let expected = matches!(slot.hour, 16 | 17);
        assert_eq!(slot.available, expected, "hour {}", slot.hour);
    }
    // 14:00 itself is not strictly in the future and cannot be booked.
    assert!(!slots.iter().find(|s| s.hour == 14).unwrap().available);
}

#[test]
fn test_future_date_is_fully_open() {
    // Scenario: tomorrow with nothing booked; today's clock is irrelevant.
    let grid = SlotGridConfig::default();
    let today = day(2026, 9, 15);
    let now = at(today, 23);

    let slots = derive_day_slots(&grid, day(2026, 9, 16), &occupied(&[]), now);

    assert_eq!(slots.len(), 9);
    assert!(slots.iter().all(|s| s.available));
}

#[test]
fn test_past_date_is_fully_unavailable() {
    let grid = SlotGridConfig::default();
    let now = at(day(2026, 9, 15), 8);

    let slots = derive_day_slots(&grid, day(2026, 9, 14), &occupied(&[]), now);

    assert_eq!(slots.len(), 9);
    assert!(slots.iter().all(|s| !s.available));
}

#[test]
fn test_occupied_hour_outside_grid_is_ignored() {
    let grid = SlotGridConfig::default();
    let date = day(2026, 9, 15);
    let now = at(day(2026, 9, 1), 12);

    let slots = derive_day_slots(&grid, date, &occupied(&[12]), now);

    assert_eq!(slots.len(), 9);
    assert!(slots.iter().all(|s| s.available));
}

#[test]
fn test_custom_grid_ranges() {
    let grid = SlotGridConfig {
        morning_hours: 9..=10,
        afternoon_hours: 14..=15,
    };
    let date = day(2026, 9, 15);
    let now = at(day(2026, 9, 1), 12);

    let slots = derive_day_slots(&grid, date, &occupied(&[14]), now);

    let hours: Vec<u32> = slots.iter().map(|s| s.hour).collect();
    assert_eq!(hours, vec![9, 10, 14, 15]);
    assert!(!slots[2].available);
    assert_eq!(grid.slot_count(), 4);
}
