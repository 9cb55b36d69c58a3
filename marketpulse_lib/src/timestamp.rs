//! Timestamp parsing for post records.
//!
//! Posts arrive with the authoring time in whatever shape the upstream export
//! produced: RFC 3339, ISO without offset, date-only, US locale, or the dotted
//! Korean locale format (`2024. 1. 10. 오후 3:04:05`). Everything is reduced to
//! a naive wall-clock [`NaiveDateTime`]; offsets are dropped rather than
//! converted so that the calendar day a post shows in the source is the day it
//! is filtered and bucketed under.

use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveDateTime, NaiveTime, Timelike};

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y/%m/%d %H:%M:%S",
    "%Y/%m/%d %H:%M",
    "%m/%d/%Y, %I:%M:%S %p",
    "%m/%d/%Y %I:%M:%S %p",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
    "%m/%d/%y, %I:%M:%S %p",
    "%m/%d/%y %I:%M:%S %p",
    "%m/%d/%y %I:%M %p",
    "%m/%d/%y %H:%M:%S",
    "%m/%d/%y %H:%M",
];

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y", "%m/%d/%y"];

/// `%Y` also accepts one to three digit years, which turns a short-year
/// `1/10/24` into year 1 or 24. Such results are discarded so the `%y`
/// patterns get their turn.
const MIN_YEAR: i32 = 1000;

fn plausible(dt: NaiveDateTime) -> Option<NaiveDateTime> {
    (dt.year() >= MIN_YEAR).then_some(dt)
}

/// Parse a raw timestamp string into a naive wall-clock time.
///
/// Returns `None` when no known encoding matches. Date-only inputs resolve to
/// midnight.
pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Some(dt) = DateTime::parse_from_rfc3339(raw)
        .ok()
        .and_then(|dt| plausible(dt.naive_local()))
    {
        return Some(dt);
    }

    let datetime = DATETIME_FORMATS
        .iter()
        .filter_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .find_map(plausible);
    if datetime.is_some() {
        return datetime;
    }

    let date = DATE_FORMATS
        .iter()
        .filter_map(|fmt| NaiveDate::parse_from_str(raw, fmt).ok())
        .find_map(|date| plausible(start_of_day(date)));
    if date.is_some() {
        return date;
    }

    parse_dotted_locale(raw)
}

/// Parse a calendar date in `YYYY-MM-DD` form.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d").ok()
}

/// First instant of the given calendar day.
pub fn start_of_day(date: NaiveDate) -> NaiveDateTime {
    date.and_time(NaiveTime::MIN)
}

/// Last millisecond of the given calendar day (23:59:59.999).
pub fn end_of_day(date: NaiveDate) -> NaiveDateTime {
    start_of_day(date) + Duration::milliseconds(86_399_999)
}

/// `YYYY. M. D.` optionally followed by a 12- or 24-hour clock.
fn parse_dotted_locale(raw: &str) -> Option<NaiveDateTime> {
    let mut parts = raw.splitn(4, '.');
    let year_part = parts.next()?.trim();
    if year_part.len() != 4 {
        return None;
    }
    let year: i32 = year_part.parse().ok()?;
    let month: u32 = parts.next()?.trim().parse().ok()?;
    let day: u32 = parts.next()?.trim().parse().ok()?;
    let date = NaiveDate::from_ymd_opt(year, month, day)?;

    let rest = parts.next().unwrap_or("").trim();
    if rest.is_empty() {
        return Some(start_of_day(date));
    }
    Some(date.and_time(parse_clock(rest)?))
}

fn parse_clock(raw: &str) -> Option<NaiveTime> {
    let (meridiem, clock) = split_meridiem(raw);
    let time = NaiveTime::parse_from_str(clock, "%H:%M:%S")
        .or_else(|_| NaiveTime::parse_from_str(clock, "%H:%M"))
        .ok()?;

    match meridiem {
        Some(Meridiem::Pm) if time.hour() < 12 => time.with_hour(time.hour() + 12),
        Some(Meridiem::Am) if time.hour() == 12 => time.with_hour(0),
        _ => Some(time),
    }
}

#[derive(Clone, Copy)]
enum Meridiem {
    Am,
    Pm,
}

fn split_meridiem(raw: &str) -> (Option<Meridiem>, &str) {
    const MARKERS: &[(&str, Meridiem)] = &[
        ("오전", Meridiem::Am),
        ("오후", Meridiem::Pm),
        ("AM", Meridiem::Am),
        ("PM", Meridiem::Pm),
        ("am", Meridiem::Am),
        ("pm", Meridiem::Pm),
    ];
    for &(marker, meridiem) in MARKERS {
        if let Some(rest) = raw.strip_prefix(marker) {
            return (Some(meridiem), rest.trim());
        }
        if let Some(rest) = raw.strip_suffix(marker) {
            return (Some(meridiem), rest.trim());
        }
    }
    (None, raw)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dt(y: i32, m: u32, d: u32, h: u32, min: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, min, s)
            .unwrap()
    }

    #[test]
    fn iso_with_seconds() {
        assert_eq!(
            parse_timestamp("2024-01-10T00:00:01"),
            Some(dt(2024, 1, 10, 0, 0, 1))
        );
    }

    #[test]
    fn iso_with_fraction() {
        let parsed = parse_timestamp("2024-01-10T08:30:00.250").unwrap();
        assert_eq!(parsed.date(), NaiveDate::from_ymd_opt(2024, 1, 10).unwrap());
        assert_eq!(parsed.nanosecond(), 250_000_000);
    }

    #[test]
    fn rfc3339_keeps_wall_clock() {
        assert_eq!(
            parse_timestamp("2024-01-09T23:59:00-05:00"),
            Some(dt(2024, 1, 9, 23, 59, 0))
        );
        assert_eq!(
            parse_timestamp("2024-01-09T23:59:00Z"),
            Some(dt(2024, 1, 9, 23, 59, 0))
        );
    }

    #[test]
    fn space_separated() {
        assert_eq!(
            parse_timestamp("2024-03-05 14:22:10"),
            Some(dt(2024, 3, 5, 14, 22, 10))
        );
        assert_eq!(
            parse_timestamp("2024-03-05 14:22"),
            Some(dt(2024, 3, 5, 14, 22, 0))
        );
    }

    #[test]
    fn date_only_is_midnight() {
        assert_eq!(parse_timestamp("2024-01-01"), Some(dt(2024, 1, 1, 0, 0, 0)));
        assert_eq!(parse_timestamp("2024/01/01"), Some(dt(2024, 1, 1, 0, 0, 0)));
    }

    #[test]
    fn us_locale() {
        assert_eq!(parse_timestamp("01/10/2024"), Some(dt(2024, 1, 10, 0, 0, 0)));
        assert_eq!(
            parse_timestamp("1/10/2024, 3:04:05 PM"),
            Some(dt(2024, 1, 10, 15, 4, 5))
        );
    }

    #[test]
    fn us_locale_short_year() {
        assert_eq!(parse_timestamp("1/10/24 15:04"), Some(dt(2024, 1, 10, 15, 4, 0)));
        assert_eq!(parse_timestamp("12/31/23 9:15"), Some(dt(2023, 12, 31, 9, 15, 0)));
        assert_eq!(parse_timestamp("3/5/24 14:00:30"), Some(dt(2024, 3, 5, 14, 0, 30)));
        assert_eq!(parse_timestamp("1/10/24"), Some(dt(2024, 1, 10, 0, 0, 0)));
        assert_eq!(
            parse_timestamp("1/10/24, 3:04:05 PM"),
            Some(dt(2024, 1, 10, 15, 4, 5))
        );
    }

    #[test]
    fn never_yields_short_years() {
        let inputs = [
            "1/10/24",
            "12/31/23 9:15",
            "3/5/24 14:00",
            "24/1/10",
            "24-01-10",
            "999-01-01",
            "1/2/3",
            "0024-01-10T00:00:00Z",
        ];
        for input in inputs {
            if let Some(parsed) = parse_timestamp(input) {
                assert!(parsed.year() >= 1000, "{} parsed as {}", input, parsed);
            }
        }
    }

    #[test]
    fn dotted_locale() {
        assert_eq!(parse_timestamp("2024. 1. 10."), Some(dt(2024, 1, 10, 0, 0, 0)));
        assert_eq!(
            parse_timestamp("2024. 1. 10. 오후 3:04:05"),
            Some(dt(2024, 1, 10, 15, 4, 5))
        );
        assert_eq!(
            parse_timestamp("2024. 1. 10. 오전 12:30:00"),
            Some(dt(2024, 1, 10, 0, 30, 0))
        );
    }

    #[test]
    fn garbage_is_none() {
        assert_eq!(parse_timestamp(""), None);
        assert_eq!(parse_timestamp("yesterday"), None);
        assert_eq!(parse_timestamp("2024-13-40"), None);
        assert_eq!(parse_timestamp("3.14"), None);
    }

    #[test]
    fn day_bounds() {
        let date = NaiveDate::from_ymd_opt(2024, 1, 10).unwrap();
        assert_eq!(start_of_day(date), dt(2024, 1, 10, 0, 0, 0));
        let end = end_of_day(date);
        assert_eq!(end.date(), date);
        assert_eq!(end.time(), NaiveTime::from_hms_milli_opt(23, 59, 59, 999).unwrap());
    }

    #[test]
    fn parse_date_requires_iso() {
        assert_eq!(parse_date(" 2024-01-10 "), NaiveDate::from_ymd_opt(2024, 1, 10));
        assert_eq!(parse_date("01/10/2024"), None);
    }
}
