//! Indonesian month and day names used in period labels and the
//! query extractor's vocabulary.

use chrono::{Datelike, NaiveDate, Weekday};

/// Full month names, indexed by month number - 1
pub const MONTHS_ID: [&str; 12] = [
    "Januari",
    "Februari",
    "Maret",
    "April",
    "Mei",
    "Juni",
    "Juli",
    "Agustus",
    "September",
    "Oktober",
    "November",
    "Desember",
];

/// Full month name for a 1-based month number
pub fn month_name(month: u32) -> &'static str {
    MONTHS_ID
        .get(month as usize - 1)
        .copied()
        .unwrap_or("Bulan?")
}

/// Resolve an Indonesian (or common English) month name or abbreviation
/// to its 1-based number. Case-insensitive.
pub fn month_number(name: &str) -> Option<u32> {
    let lower = name.to_lowercase();
    match lower.as_str() {
        "januari" | "jan" => Some(1),
        "februari" | "feb" => Some(2),
        "maret" | "mar" => Some(3),
        "april" | "apr" => Some(4),
        "mei" => Some(5),
        "juni" | "jun" => Some(6),
        "juli" | "jul" => Some(7),
        "agustus" | "agu" | "ags" | "aug" => Some(8),
        "september" | "sep" => Some(9),
        "oktober" | "okt" | "oct" => Some(10),
        "november" | "nov" => Some(11),
        "desember" | "des" | "dec" => Some(12),
        _ => None,
    }
}

/// Indonesian day name
pub fn day_name(weekday: Weekday) -> &'static str {
    match weekday {
        Weekday::Mon => "Senin",
        Weekday::Tue => "Selasa",
        Weekday::Wed => "Rabu",
        Weekday::Thu => "Kamis",
        Weekday::Fri => "Jumat",
        Weekday::Sat => "Sabtu",
        Weekday::Sun => "Minggu",
    }
}

/// "17 Agustus 2026"
pub fn format_date_long(date: NaiveDate) -> String {
    format!("{} {} {}", date.day(), month_name(date.month()), date.year())
}

/// "17 Agu"
pub fn format_date_short(date: NaiveDate) -> String {
    let abbrev = &month_name(date.month())[..3];
    format!("{} {}", date.day(), abbrev)
}
