//! Display formatting for event dates.

use chrono::{Datelike, NaiveDate, Weekday};

/// Short Swiss German weekday names
fn weekday_short(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "Mo.",
        Weekday::Tue => "Di.",
        Weekday::Wed => "Mi.",
        Weekday::Thu => "Do.",
        Weekday::Fri => "Fr.",
        Weekday::Sat => "Sa.",
        Weekday::Sun => "So.",
    }
}

/// Format a date the way de-CH shows short dates with a weekday,
/// e.g. `Fr., 10.05.2024`.
pub fn format_date(date: NaiveDate) -> String {
    format!(
        "{}, {}",
        weekday_short(date.weekday()),
        date.format("%d.%m.%Y")
    )
}
