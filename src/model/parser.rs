// Handles date input typed into the date selector
use chrono::NaiveDate;

/// Accepts `YYYY-MM-DD` or `MM/DD/YYYY`, surrounding whitespace ignored.
pub fn parse_date_input(input: &str) -> Option<NaiveDate> {
    let input = input.trim();
    if input.is_empty() {
        return None;
    }
    if let Ok(d) = NaiveDate::parse_from_str(input, "%Y-%m-%d") {
        return Some(d);
    }
    NaiveDate::parse_from_str(input, "%m/%d/%Y").ok()
}

/// Weekday-month-day-year form used in the results header, e.g. `Sat Jan 01 2022`.
pub fn format_header_date(date: NaiveDate) -> String {
    date.format("%a %b %d %Y").to_string()
}
