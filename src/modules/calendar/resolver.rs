use chrono::{Datelike, Duration, Months, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

use crate::core::{AppError, Result};
use crate::modules::calendar::locale;

/// Half-open date range: `start` inclusive, `end` exclusive.
///
/// All report and query scoping uses business-local calendar days,
/// never timestamp instants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeriodRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl PeriodRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self> {
        if start >= end {
            return Err(AppError::invalid_period(format!(
                "start {} must be before end {}",
                start, end
            )));
        }
        Ok(Self { start, end })
    }

    /// Single calendar day `[date, date + 1)`
    pub fn single_day(date: NaiveDate) -> Self {
        Self {
            start: date,
            end: date + Duration::days(1),
        }
    }

    /// Number of calendar days covered
    pub fn days(&self) -> i64 {
        (self.end - self.start).num_days()
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && date < self.end
    }

    /// Last day inside the range (end is exclusive)
    pub fn last_day(&self) -> NaiveDate {
        self.end - Duration::days(1)
    }

    /// Iterate every day in the range, in order
    pub fn iter_days(&self) -> impl Iterator<Item = NaiveDate> {
        let start = self.start;
        (0..self.days()).map(move |offset| start + Duration::days(offset))
    }

    /// Whether this is exactly one calendar month
    pub fn is_calendar_month(&self) -> bool {
        self.start.day() == 1
            && self.end.day() == 1
            && self
                .start
                .checked_add_months(Months::new(1))
                .map(|next| next == self.end)
                .unwrap_or(false)
    }

    /// Human label: "17 Agustus 2026", "Agustus 2026" or "11 Agu - 17 Agu 2026"
    pub fn label(&self) -> String {
        if self.days() == 1 {
            locale::format_date_long(self.start)
        } else if self.is_calendar_month() {
            format!(
                "{} {}",
                locale::month_name(self.start.month()),
                self.start.year()
            )
        } else {
            format!(
                "{} - {} {}",
                locale::format_date_short(self.start),
                locale::format_date_short(self.last_day()),
                self.last_day().year()
            )
        }
    }
}

/// Period vocabulary understood by reports and the query extractor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PeriodKeyword {
    Today,
    Yesterday,
    ThisWeek,
    LastWeek,
    ThisMonth,
    LastMonth,
    /// Explicit month and year, e.g. "bulan Januari 2026"
    Explicit {
        month: u32,
        year: i32,
    },
}

/// First day of the week containing `date` under the given week-start rule
pub fn start_of_week(date: NaiveDate, week_start: Weekday) -> NaiveDate {
    let offset = (date.weekday().num_days_from_monday() + 7
        - week_start.num_days_from_monday())
        % 7;
    date - Duration::days(offset as i64)
}

/// Calendar month range `[1st, 1st of next month)`
pub fn month_range(year: i32, month: u32) -> Result<PeriodRange> {
    if !(1..=12).contains(&month) {
        return Err(AppError::invalid_period(format!(
            "month {} out of range 1..=12",
            month
        )));
    }
    let start = NaiveDate::from_ymd_opt(year, month, 1)
        .ok_or_else(|| AppError::invalid_period(format!("invalid year {}", year)))?;
    let end = start
        .checked_add_months(Months::new(1))
        .ok_or_else(|| AppError::invalid_period(format!("month rollover from {}", start)))?;
    PeriodRange::new(start, end)
}

/// Map a period keyword and a reference date to a concrete range.
///
/// Weeks are the 7-day span starting on `week_start` that contains the
/// reference date, so this_week/last_week stay stable on boundary days.
pub fn resolve_period(
    keyword: PeriodKeyword,
    reference: NaiveDate,
    week_start: Weekday,
) -> Result<PeriodRange> {
    match keyword {
        PeriodKeyword::Today => Ok(PeriodRange::single_day(reference)),
        PeriodKeyword::Yesterday => Ok(PeriodRange::single_day(reference - Duration::days(1))),
        PeriodKeyword::ThisWeek => {
            let start = start_of_week(reference, week_start);
            PeriodRange::new(start, start + Duration::days(7))
        }
        PeriodKeyword::LastWeek => {
            let start = start_of_week(reference, week_start) - Duration::days(7);
            PeriodRange::new(start, start + Duration::days(7))
        }
        PeriodKeyword::ThisMonth => month_range(reference.year(), reference.month()),
        PeriodKeyword::LastMonth => {
            let prev = reference
                .with_day(1)
                .and_then(|d| d.checked_sub_months(Months::new(1)))
                .ok_or_else(|| AppError::invalid_period("month rollback"))?;
            month_range(prev.year(), prev.month())
        }
        PeriodKeyword::Explicit { month, year } => month_range(year, month),
    }
}

/// 1-based ordinal week-of-month.
///
/// The week containing the 1st is week 1 even when it started in the
/// previous month; this boundary rule drives weekly report sections.
pub fn week_of_month(date: NaiveDate, week_start: Weekday) -> u32 {
    let first = date.with_day(1).expect("day 1 always exists");
    let first_week_start = start_of_week(first, week_start);
    let this_week_start = start_of_week(date, week_start);
    ((this_week_start - first_week_start).num_days() / 7) as u32 + 1
}

/// Enumerate a month's weeks for period pickers and navigation menus:
/// week 1 is the week containing the 1st; later weeks are those starting
/// inside the month. The final week may extend into the next month.
pub fn weeks_in_month(
    year: i32,
    month: u32,
    week_start: Weekday,
) -> Result<Vec<(u32, PeriodRange)>> {
    let month_period = month_range(year, month)?;
    let mut weeks = Vec::new();
    let mut cursor = start_of_week(month_period.start, week_start);
    let mut ordinal = 1;

    while cursor < month_period.end && (ordinal == 1 || cursor.month() == month) {
        weeks.push((ordinal, PeriodRange::new(cursor, cursor + Duration::days(7))?));
        cursor += Duration::days(7);
        ordinal += 1;
    }

    Ok(weeks)
}

fn add_months_signed(date: NaiveDate, delta: i32) -> Result<NaiveDate> {
    let shifted = if delta >= 0 {
        date.checked_add_months(Months::new(delta as u32))
    } else {
        date.checked_sub_months(Months::new(delta.unsigned_abs()))
    };
    shifted.ok_or_else(|| AppError::invalid_period(format!("month shift {} from {}", delta, date)))
}

/// Adjacent-month navigation. Calendar-month periods stay calendar months
/// (year boundaries roll month and year together); other periods shift
/// both endpoints with day clamping.
pub fn shift_month(period: PeriodRange, delta: i32) -> Result<PeriodRange> {
    if period.is_calendar_month() {
        let anchor = add_months_signed(period.start, delta)?;
        return month_range(anchor.year(), anchor.month());
    }
    let start = add_months_signed(period.start, delta)?;
    let end = add_months_signed(period.end, delta)?;
    PeriodRange::new(start, end)
}

/// Adjacent-week navigation: shift the whole range by `delta` weeks
pub fn shift_week(period: PeriodRange, delta: i32) -> Result<PeriodRange> {
    let offset = Duration::days(7 * delta as i64);
    PeriodRange::new(period.start + offset, period.end + offset)
}
