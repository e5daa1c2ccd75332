// Date fields: DDMMAA (day, month, last two digits of the year).
use super::raw_value;
use chrono::{Datelike, NaiveDate, NaiveDateTime};
use cnab_shared::FieldValue;

pub const DATE_WIDTH: usize = 6;
const EMPTY_DATE: &str = "000000";

// Tried in order; the first format that yields a valid calendar date wins.
const DATE_FORMATS: [&str; 6] = ["%Y-%m-%d", "%d/%m/%Y", "%Y/%m/%d", "%d-%m-%Y", "%Y%m%d", "%d%m%Y"];

// Spreadsheet exports sometimes carry a midnight timestamp.
const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

// "25-11-29" must not read as the year 25.
fn has_four_digit_year(date: &NaiveDate) -> bool {
    (1000..=9999).contains(&date.year())
}

/// Parses a date string against the accepted formats, falling back to a
/// `YYYY-MM-DD HH:MM:SS` timestamp.
pub fn parse_date(s: &str) -> Option<NaiveDate> {
    DATE_FORMATS
        .iter()
        .find_map(|format| {
            NaiveDate::parse_from_str(s, format)
                .ok()
                .filter(has_four_digit_year)
        })
        .or_else(|| {
            NaiveDateTime::parse_from_str(s, TIMESTAMP_FORMAT)
                .ok()
                .map(|dt| dt.date())
                .filter(has_four_digit_year)
        })
}

pub fn format_date(value: Option<&FieldValue>) -> String {
    let date = match raw_value(value) {
        None => None,
        Some(FieldValue::Date(d)) => Some(*d),
        Some(other) => parse_date(&other.to_string()),
    };

    match date {
        Some(d) => format!("{:02}{:02}{:02}", d.day(), d.month(), d.year().rem_euclid(100)),
        None => EMPTY_DATE.to_string(),
    }
}
