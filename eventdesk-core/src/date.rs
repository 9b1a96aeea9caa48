//! ISO-8601 handling for event dates.
//!
//! Event dates are kept as the strings the user supplied. This module decides
//! whether such a string is a valid date, how it orders against other dates,
//! and how it reads on screen.

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime};
use std::cmp::Ordering;

const DATE_FORMAT: &str = "%Y-%m-%d";

const OFFSET_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f%:z",
    "%Y-%m-%dT%H:%M%:z",
    "%Y-%m-%d %H:%M:%S%.f%:z",
    "%Y-%m-%d %H:%M%:z",
];

const LOCAL_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
];

const DATE_DISPLAY: &str = "%B %d, %Y";
const DATETIME_DISPLAY: &str = "%B %d, %Y at %I:%M %p";

/// A successfully parsed event date.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IsoDate {
    /// `YYYY-MM-DD`
    Date(NaiveDate),
    /// Date-time without an offset
    Local(NaiveDateTime),
    /// Date-time with an explicit offset (`Z` included)
    Offset(DateTime<FixedOffset>),
}

/// Rewrite the ISO-8601 spellings chrono has no format item for: `Z`, a
/// comma before the fraction, an hour without minutes (`T10`) and an offset
/// without minutes (`+05`).
fn normalize(input: &str) -> String {
    let s = input.replace('Z', "+00:00").replace(',', ".");

    let (Some(date), Some(sep), Some(time)) = (s.get(..10), s.get(10..11), s.get(11..)) else {
        return s;
    };
    if sep != "T" && sep != " " {
        return s;
    }

    let (clock, offset) = match time.find(['+', '-']) {
        Some(i) => time.split_at(i),
        None => (time, ""),
    };
    let all_digits = |part: &str| !part.is_empty() && part.bytes().all(|b| b.is_ascii_digit());

    let clock = if clock.len() == 2 && all_digits(clock) {
        format!("{clock}:00")
    } else {
        clock.to_string()
    };
    let offset = if offset.len() == 3 && all_digits(&offset[1..]) {
        format!("{offset}:00")
    } else {
        offset.to_string()
    };

    format!("{date}{sep}{clock}{offset}")
}

/// Parse an ISO-8601 date or date-time.
///
/// A `Z` suffix stands for `+00:00`, so `2024-01-15T10:30:00.123Z` is
/// accepted, as are `2024-01-15T10`, `10:30:00,5` and `+05`.
pub fn parse_iso(input: &str) -> Option<IsoDate> {
    let normalized = normalize(input);
    let s = normalized.as_str();

    if let Ok(date) = NaiveDate::parse_from_str(s, DATE_FORMAT) {
        return Some(IsoDate::Date(date));
    }

    OFFSET_FORMATS
        .iter()
        .find_map(|fmt| DateTime::parse_from_str(s, fmt).ok())
        .map(IsoDate::Offset)
        .or_else(|| {
            LOCAL_FORMATS
                .iter()
                .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
                .map(IsoDate::Local)
        })
}

pub fn is_valid_date(input: &str) -> bool {
    parse_iso(input).is_some()
}

/// Ordering key for an event date.
///
/// Naive and offset-aware keys have no defined order between them;
/// `partial_cmp` returns `None` for such a pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateKey {
    Naive(NaiveDateTime),
    Aware(DateTime<FixedOffset>),
}

impl DateKey {
    /// Key given to dates that cannot be parsed at all.
    pub const MIN: DateKey = DateKey::Naive(NaiveDateTime::MIN);

    pub fn is_aware(&self) -> bool {
        matches!(self, DateKey::Aware(_))
    }
}

impl PartialOrd for DateKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        match (self, other) {
            (DateKey::Naive(a), DateKey::Naive(b)) => Some(a.cmp(b)),
            (DateKey::Aware(a), DateKey::Aware(b)) => Some(a.cmp(b)),
            _ => None,
        }
    }
}

/// Compute the sort key for a date string.
///
/// Tries a full ISO-8601 parse first, then a plain `YYYY-MM-DD`.
/// Anything else sorts as [`DateKey::MIN`].
pub fn sort_key(input: &str) -> DateKey {
    match parse_iso(input) {
        Some(IsoDate::Date(date)) => DateKey::Naive(date.and_time(NaiveTime::default())),
        Some(IsoDate::Local(datetime)) => DateKey::Naive(datetime),
        Some(IsoDate::Offset(datetime)) => DateKey::Aware(datetime),
        None => NaiveDate::parse_from_str(input.trim(), DATE_FORMAT)
            .map(|date| DateKey::Naive(date.and_time(NaiveTime::default())))
            .unwrap_or(DateKey::MIN),
    }
}

/// Render a date string in long form, e.g. "March 01, 2024" or
/// "March 01, 2024 at 02:30 PM". Unparseable input comes back unchanged.
pub fn format_date_display(input: &str) -> String {
    match parse_iso(input) {
        Some(IsoDate::Date(date)) => date.format(DATE_DISPLAY).to_string(),
        Some(IsoDate::Local(datetime)) => datetime.format(DATETIME_DISPLAY).to_string(),
        Some(IsoDate::Offset(datetime)) => datetime.format(DATETIME_DISPLAY).to_string(),
        None => input.to_string(),
    }
}
