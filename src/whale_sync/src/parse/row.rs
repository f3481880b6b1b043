//! Column parsers for a single data row.
//!
//! Each returns `None` for malformed input; the caller skips the row.

use chrono::NaiveDate;

use crate::models::ReportStatus;

/// Parses a strict `M/D/YYYY` date (one- or two-digit month/day, four-digit year).
pub fn parse_date(input: &str) -> Option<NaiveDate> {
    let mut parts = input.trim().split('/');
    let (m, d, y) = (parts.next()?, parts.next()?, parts.next()?);
    if parts.next().is_some() {
        return None;
    }
    let digits = |s: &str, min: usize, max: usize| {
        (min..=max).contains(&s.len()) && s.bytes().all(|b| b.is_ascii_digit())
    };
    if !digits(m, 1, 2) || !digits(d, 1, 2) || !digits(y, 4, 4) {
        return None;
    }
    NaiveDate::from_ymd_opt(y.parse().ok()?, m.parse().ok()?, d.parse().ok()?)
}

/// Parses a non-negative tour count.
pub fn parse_tours(input: &str) -> Option<u32> {
    let s = input.trim();
    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    s.parse().ok().filter(|n| i32::try_from(*n).is_ok())
}

/// A detail cell of exactly "bad weather" (any case) cancels the day.
pub fn parse_status(detail: &str) -> ReportStatus {
    if detail.trim().eq_ignore_ascii_case("bad weather") {
        ReportStatus::BadWeather
    } else {
        ReportStatus::Ok
    }
}
