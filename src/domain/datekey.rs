use thiserror::Error;
use time::{format_description::FormatItem, macros::format_description, Date, Duration};

/// Diary rows are bucketed by the client's local calendar day, exchanged as
/// `YYYY-MM-DD` strings. The server never re-interprets them in another
/// timezone; it only parses, formats and does day arithmetic.
const DAY_KEY_FORMAT: &[FormatItem<'static>] = format_description!("[year]-[month]-[day]");

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DayKeyError {
    #[error("invalid day key: {0:?}")]
    Invalid(String),
}

pub fn format_day_key(date: Date) -> String {
    format!(
        "{:04}-{:02}-{:02}",
        date.year(),
        u8::from(date.month()),
        date.day()
    )
}

/// Strict parse: four-digit year, zero-padded month and day, real calendar
/// date. Anything else is rejected.
pub fn parse_day_key(s: &str) -> Result<Date, DayKeyError> {
    Date::parse(s, DAY_KEY_FORMAT).map_err(|_| DayKeyError::Invalid(s.to_string()))
}

pub fn add_days(date: Date, days: i64) -> Date {
    date.saturating_add(Duration::days(days))
}

pub fn clamp_day(date: Date, min: Date, max: Date) -> Date {
    date.clamp(min, max)
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::date;

    #[test]
    fn format_pads_month_and_day() {
        assert_eq!(format_day_key(date!(2024 - 03 - 07)), "2024-03-07");
        assert_eq!(format_day_key(date!(2024 - 12 - 31)), "2024-12-31");
    }

    #[test]
    fn parse_and_format_round_trip() {
        for key in ["2023-01-01", "2024-02-29", "1999-12-31"] {
            let parsed = parse_day_key(key).expect(key);
            assert_eq!(format_day_key(parsed), key);
        }
    }

    #[test]
    fn parse_rejects_malformed_keys() {
        for bad in [
            "2024-3-07",
            "24-03-07",
            "2024/03/07",
            "2024-13-01",
            "2023-02-29",
            "2024-03-07T00:00:00",
            "",
            "today",
        ] {
            assert!(parse_day_key(bad).is_err(), "accepted {:?}", bad);
        }
    }

    #[test]
    fn add_days_crosses_month_and_year_boundaries() {
        assert_eq!(add_days(date!(2024 - 01 - 31), 1), date!(2024 - 02 - 01));
        assert_eq!(add_days(date!(2024 - 12 - 31), 1), date!(2025 - 01 - 01));
        assert_eq!(add_days(date!(2024 - 03 - 01), -1), date!(2024 - 02 - 29));
    }

    #[test]
    fn clamp_day_stays_inside_range() {
        let min = date!(2024 - 01 - 01);
        let max = date!(2024 - 01 - 31);
        assert_eq!(clamp_day(date!(2023 - 12 - 25), min, max), min);
        assert_eq!(clamp_day(date!(2024 - 02 - 05), min, max), max);
        assert_eq!(
            clamp_day(date!(2024 - 01 - 15), min, max),
            date!(2024 - 01 - 15)
        );
    }
}
