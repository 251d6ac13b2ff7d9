// Calendar resolution invariants: week boundaries, month ranges,
// ordinal weeks and navigation shifts.

use chrono::{Datelike, Duration, NaiveDate, Weekday};
use laporin::modules::calendar::{
    month_range, resolve_period, shift_month, shift_week, start_of_week, week_of_month,
    weeks_in_month, PeriodKeyword, PeriodRange,
};
use proptest::prelude::*;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// Every relative keyword resolves to a range containing or adjacent to
/// the reference date
#[test]
fn test_relative_keywords_anchor_to_reference() {
    let reference = date(2026, 8, 26); // Wednesday

    let today = resolve_period(PeriodKeyword::Today, reference, Weekday::Mon).unwrap();
    assert_eq!(today, PeriodRange::single_day(reference));

    let yesterday = resolve_period(PeriodKeyword::Yesterday, reference, Weekday::Mon).unwrap();
    assert_eq!(yesterday.start, date(2026, 8, 25));
    assert_eq!(yesterday.days(), 1);

    let this_week = resolve_period(PeriodKeyword::ThisWeek, reference, Weekday::Mon).unwrap();
    assert!(this_week.contains(reference));
    assert_eq!(this_week.days(), 7);
    assert_eq!(this_week.start.weekday(), Weekday::Mon);

    let this_month = resolve_period(PeriodKeyword::ThisMonth, reference, Weekday::Mon).unwrap();
    assert_eq!(this_month.start, date(2026, 8, 1));
    assert_eq!(this_month.end, date(2026, 9, 1));
}

/// last_week ends exactly where this_week starts, on any day of the week
#[test]
fn test_week_adjacency_is_stable_across_boundary_days() {
    for offset in 0..7 {
        let reference = date(2026, 8, 24) + Duration::days(offset);
        let this_week = resolve_period(PeriodKeyword::ThisWeek, reference, Weekday::Mon).unwrap();
        let last_week = resolve_period(PeriodKeyword::LastWeek, reference, Weekday::Mon).unwrap();

        assert_eq!(this_week.start, date(2026, 8, 24));
        assert_eq!(last_week.end, this_week.start);
    }
}

/// The week containing the 1st is week 1 even when it began in the
/// previous month
#[test]
fn test_week_of_month_boundary_rule() {
    // August 2026 starts on a Saturday
    assert_eq!(week_of_month(date(2026, 8, 1), Weekday::Mon), 1);
    assert_eq!(week_of_month(date(2026, 8, 2), Weekday::Mon), 1);
    assert_eq!(week_of_month(date(2026, 8, 3), Weekday::Mon), 2);
    // September 1st resets to week 1 even mid-week
    assert_eq!(week_of_month(date(2026, 9, 1), Weekday::Mon), 1);
}

#[test]
fn test_weeks_in_month_cover_every_day() {
    let weeks = weeks_in_month(2026, 8, Weekday::Mon).unwrap();
    let month = month_range(2026, 8).unwrap();

    for day in month.iter_days() {
        assert!(
            weeks.iter().any(|(_, week)| week.contains(day)),
            "day {} not covered by any week section",
            day
        );
    }
    // Ordinals are consecutive from 1
    for (index, (ordinal, _)) in weeks.iter().enumerate() {
        assert_eq!(*ordinal, index as u32 + 1);
    }
}

#[test]
fn test_shift_month_keeps_calendar_months_aligned() {
    let january = month_range(2026, 1).unwrap();
    let february = shift_month(january, 1).unwrap();
    assert_eq!(february, month_range(2026, 2).unwrap());

    // Year boundary rolls both month and year
    let december = month_range(2025, 12).unwrap();
    assert_eq!(shift_month(december, 1).unwrap(), january);
    assert_eq!(shift_month(january, -1).unwrap(), december);
}

#[test]
fn test_invalid_periods_are_rejected() {
    assert!(month_range(2026, 0).is_err());
    assert!(month_range(2026, 13).is_err());
    assert!(PeriodRange::new(date(2026, 8, 10), date(2026, 8, 10)).is_err());
    assert!(PeriodRange::new(date(2026, 8, 10), date(2026, 8, 1)).is_err());
}

proptest! {
    /// start_of_week always lands on the configured weekday, at most
    /// six days before the input
    #[test]
    fn prop_start_of_week_lands_on_week_start(days in 0i64..3650, start_idx in 0u8..7) {
        let reference = date(2024, 1, 1) + Duration::days(days);
        let week_start = match start_idx {
            0 => Weekday::Mon,
            1 => Weekday::Tue,
            2 => Weekday::Wed,
            3 => Weekday::Thu,
            4 => Weekday::Fri,
            5 => Weekday::Sat,
            _ => Weekday::Sun,
        };
        let start = start_of_week(reference, week_start);

        prop_assert_eq!(start.weekday(), week_start);
        let gap = (reference - start).num_days();
        prop_assert!((0..7).contains(&gap));
    }

    /// week_of_month never decreases as the month progresses
    #[test]
    fn prop_week_of_month_is_monotone(year in 2024i32..2030, month in 1u32..13) {
        let period = month_range(year, month).unwrap();
        let mut previous = 0;
        for day in period.iter_days() {
            let ordinal = week_of_month(day, Weekday::Mon);
            prop_assert!(ordinal >= previous);
            previous = ordinal;
        }
        prop_assert!(previous >= 4);
    }

    /// shift_week is its own inverse
    #[test]
    fn prop_shift_week_round_trips(days in 0i64..3650, delta in -52i32..52) {
        let start = date(2024, 1, 1) + Duration::days(days);
        let week = PeriodRange::new(start, start + Duration::days(7)).unwrap();
        let there = shift_week(week, delta).unwrap();
        let back = shift_week(there, -delta).unwrap();
        prop_assert_eq!(back, week);
    }
}
