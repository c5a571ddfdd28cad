use chrono::{Local, NaiveDate};

/// Storage format for expense dates. ISO dates compare lexicographically in
/// the same order as chronologically, which the filter queries rely on.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

pub fn parse_date(s: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(s, DATE_FORMAT).ok()
}

/// The `"YYYY-MM"` bucket a calendar date falls into, or `None` when the
/// input is not a valid ISO date.
pub fn month_key(date: &str) -> Option<String> {
    parse_date(date).map(|d| d.format("%Y-%m").to_string())
}

pub fn today() -> String {
    Local::now().date_naive().format(DATE_FORMAT).to_string()
}
