use chrono::{Datelike, Duration, NaiveDate, Weekday};
use regex::Regex;
use tracing::debug;

use crate::modules::calendar::{locale, resolve_period, PeriodKeyword, PeriodRange};
use crate::modules::ledger::models::ReferenceData;

/// Metric the user is asking about
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Metric {
    Revenue,
    Profit,
    TransactionCount,
    BestWorker,
    BestBranch,
    TopService,
}

/// Structured filter extracted from one free-text question.
///
/// Unmatched dimensions stay `None`, meaning unscoped rather than zero;
/// the resolver supplies defaults.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryFilter {
    pub period: Option<PeriodRange>,
    pub period_label: Option<String>,
    pub branch_id: Option<String>,
    pub worker_id: Option<String>,
    pub metric: Option<Metric>,
    pub raw_text: String,
}

/// Deterministic, rule-based filter extraction. Never fails: text with
/// no recognizable tokens yields a fully-unset filter.
pub struct FilterExtractor {
    range_full: Regex,
    range_short: Regex,
    single_date: Regex,
    month_only: Regex,
}

const MONTH_TOKENS: &str = "januari|februari|september|desember|oktober|november|agustus\
|maret|april|juni|juli|mei|jan|feb|mar|apr|jun|jul|agu|ags|aug|sep|okt|oct|nov|des|dec";

const RANGE_SEP: &str = r"\s*(?:sampai|hingga|s/d|s\.d\.|sd|ke|-)\s*";

impl FilterExtractor {
    pub fn new() -> Self {
        let date = format!(r"(?:tanggal\s+|tgl\s+)?(\d{{1,2}})\s+({MONTH_TOKENS})\b\s*(\d{{4}})?");
        Self {
            range_full: Regex::new(&format!("{date}{RANGE_SEP}{date}"))
                .expect("static range regex"),
            range_short: Regex::new(&format!(
                r"(?:tanggal\s+|tgl\s+)?(\d{{1,2}}){RANGE_SEP}(\d{{1,2}})\s+({MONTH_TOKENS})\b\s*(\d{{4}})?"
            ))
            .expect("static range regex"),
            single_date: Regex::new(&date).expect("static date regex"),
            month_only: Regex::new(&format!(
                r"\b(?:bulan\s+)?({MONTH_TOKENS})\b\s*(\d{{4}})?"
            ))
            .expect("static month regex"),
        }
    }

    /// Extract a structured filter from free text. Recognizes relative
    /// period keywords, explicit dates/ranges/months, branch and worker
    /// mentions (names and aliases), and metric keywords.
    pub fn extract(
        &self,
        raw_text: &str,
        reference_date: NaiveDate,
        reference: &ReferenceData,
        week_start: Weekday,
    ) -> QueryFilter {
        let lower = raw_text.to_lowercase();

        let (period, period_label) = self.extract_period(&lower, reference_date, week_start);
        let metric = extract_metric(&lower);
        let branch_id = reference
            .resolve_branch(&lower)
            .map(|b| b.branch_id.clone());
        let worker_id = reference
            .resolve_worker(&lower)
            .map(|w| w.worker_id.clone());

        let filter = QueryFilter {
            period,
            period_label,
            branch_id,
            worker_id,
            metric,
            raw_text: raw_text.to_string(),
        };
        debug!(?filter, "extracted query filter");
        filter
    }

    /// Priority: explicit range > single date > explicit month >
    /// relative keyword. No match leaves the period unset.
    fn extract_period(
        &self,
        lower: &str,
        reference_date: NaiveDate,
        week_start: Weekday,
    ) -> (Option<PeriodRange>, Option<String>) {
        if let Some(period) = self.parse_range(lower, reference_date) {
            return (Some(period), Some(period.label()));
        }
        if let Some(date) = self.parse_single_date(lower, reference_date) {
            let period = PeriodRange::single_day(date);
            return (Some(period), Some(period.label()));
        }
        if let Some((month, year)) = self.parse_month(lower, reference_date) {
            if let Ok(period) = resolve_period(
                PeriodKeyword::Explicit { month, year },
                reference_date,
                week_start,
            ) {
                return (Some(period), Some(period.label()));
            }
        }

        let keyword = [
            ("hari ini", PeriodKeyword::Today),
            ("kemarin", PeriodKeyword::Yesterday),
            ("minggu lalu", PeriodKeyword::LastWeek),
            ("minggu ini", PeriodKeyword::ThisWeek),
            ("bulan lalu", PeriodKeyword::LastMonth),
            ("bulan ini", PeriodKeyword::ThisMonth),
        ]
        .into_iter()
        .find(|(token, _)| lower.contains(token));

        match keyword {
            Some((token, kw)) => match resolve_period(kw, reference_date, week_start) {
                Ok(period) => (Some(period), Some(token.to_string())),
                Err(_) => (None, None),
            },
            None => (None, None),
        }
    }

    fn parse_range(&self, lower: &str, reference_date: NaiveDate) -> Option<PeriodRange> {
        // "15 jan 2026 sampai 17 jan 2026" (years optional, borrowed
        // from the other side when only one is present)
        if let Some(caps) = self.range_full.captures(lower) {
            let year1 = caps.get(3).and_then(|m| m.as_str().parse().ok());
            let year2 = caps.get(6).and_then(|m| m.as_str().parse().ok());
            let y1 = year1.or(year2).unwrap_or(reference_date.year());
            let y2 = year2.or(year1).unwrap_or(reference_date.year());
            let start = build_date(&caps[1], &caps[2], y1);
            let end = build_date(&caps[4], &caps[5], y2);
            if let (Some(start), Some(end)) = (start, end) {
                if end >= start {
                    return PeriodRange::new(start, end + Duration::days(1)).ok();
                }
            }
        }

        // Same-month shorthand: "1 s/d 5 januari 2026"
        if let Some(caps) = self.range_short.captures(lower) {
            let year = caps
                .get(4)
                .and_then(|m| m.as_str().parse().ok())
                .unwrap_or(reference_date.year());
            let start = build_date(&caps[1], &caps[3], year);
            let end = build_date(&caps[2], &caps[3], year);
            if let (Some(start), Some(end)) = (start, end) {
                if end >= start {
                    return PeriodRange::new(start, end + Duration::days(1)).ok();
                }
            }
        }

        None
    }

    fn parse_single_date(&self, lower: &str, reference_date: NaiveDate) -> Option<NaiveDate> {
        let caps = self.single_date.captures(lower)?;
        let year = caps
            .get(3)
            .and_then(|m| m.as_str().parse().ok())
            .unwrap_or(reference_date.year());
        build_date(&caps[1], &caps[2], year)
    }

    fn parse_month(&self, lower: &str, reference_date: NaiveDate) -> Option<(u32, i32)> {
        let caps = self.month_only.captures(lower)?;
        let month = locale::month_number(&caps[1])?;
        let year = caps
            .get(2)
            .and_then(|m| m.as_str().parse().ok())
            .unwrap_or(reference_date.year());
        Some((month, year))
    }
}

impl Default for FilterExtractor {
    fn default() -> Self {
        Self::new()
    }
}

fn build_date(day: &str, month_name: &str, year: i32) -> Option<NaiveDate> {
    let day: u32 = day.parse().ok()?;
    let month = locale::month_number(month_name)?;
    NaiveDate::from_ymd_opt(year, month, day)
}

/// Keyword metric matching, mirroring the menu vocabulary the bot's
/// users already know. First category hit wins.
fn extract_metric(lower: &str) -> Option<Metric> {
    const RANKING: &[&str] = &["terbaik", "ranking", "peringkat", "top capster"];
    const COMPARISON: &[&str] = &["banding", "perbandingan", "vs cabang"];
    const POPULARITY: &[&str] = &["terlaris", "terpopuler", "paling laku", "layanan populer"];
    const PROFIT: &[&str] = &["laba", "rugi", "profit", "untung", "keuntungan", "margin"];
    const REVENUE: &[&str] = &[
        "pendapatan",
        "revenue",
        "omzet",
        "omset",
        "pemasukan",
        "income",
    ];
    const COUNT: &[&str] = &["transaksi", "jumlah"];

    let contains_any = |tokens: &[&str]| tokens.iter().any(|t| lower.contains(t));

    if contains_any(RANKING) {
        // "cabang terbaik" asks for a branch, not a capster
        if lower.contains("cabang") && !lower.contains("capster") {
            Some(Metric::BestBranch)
        } else {
            Some(Metric::BestWorker)
        }
    } else if contains_any(COMPARISON) {
        Some(Metric::BestBranch)
    } else if contains_any(POPULARITY) {
        Some(Metric::TopService)
    } else if contains_any(PROFIT) {
        Some(Metric::Profit)
    } else if contains_any(REVENUE) {
        Some(Metric::Revenue)
    } else if contains_any(COUNT) {
        Some(Metric::TransactionCount)
    } else {
        None
    }
}
