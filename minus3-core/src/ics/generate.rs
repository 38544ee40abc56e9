//! ICS generation for one event.

use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;
use icalendar::{Calendar, Component, EventLike};

use crate::config::CalendarConfig;
use crate::event::Event;
use crate::naming::ics_filename;

pub const ICS_MIME: &str = "text/calendar;charset=utf-8";

/// A ready-to-download calendar file
#[derive(Debug, Clone, PartialEq)]
pub struct CalendarFile {
    pub filename: String,
    pub mime: &'static str,
    pub body: String,
}

/// Build the downloadable calendar file for `event`.
///
/// `stamp` is the creation time written to DTSTAMP.
pub fn export_event(
    event: &Event,
    settings: &CalendarConfig,
    tz: &Tz,
    stamp: DateTime<Utc>,
) -> CalendarFile {
    CalendarFile {
        filename: ics_filename(&event.title),
        mime: ICS_MIME,
        body: generate_ics(event, settings, tz, stamp),
    }
}

/// Generate .ics content for an event
pub fn generate_ics(
    event: &Event,
    settings: &CalendarConfig,
    tz: &Tz,
    stamp: DateTime<Utc>,
) -> String {
    let (start, end) = event_window(event, tz);

    let mut cal = Calendar::new();

    let mut ics_event = icalendar::Event::new();
    ics_event.uid(&format!("{}@{}", event.id, settings.uid_domain));
    ics_event.summary(&event.title);

    ics_event.add_property("DTSTAMP", format_utc(stamp));
    ics_event.add_property("DTSTART", format_utc(start));
    ics_event.add_property("DTEND", format_utc(end));

    if let Some(ref desc) = event.description {
        ics_event.description(&normalize_breaks(desc));
    }

    if let Some(loc) = event.location() {
        ics_event.location(&loc);
    }

    let ics_event = ics_event.done();
    cal.push(ics_event);
    let cal = cal.done();

    strip_ics_bloat(&cal.to_string(), &settings.product_id)
}

/// Clean up ICS output from the icalendar crate
/// - Replace PRODID with our product id
/// - Remove CALSCALE:GREGORIAN (it's the default)
fn strip_ics_bloat(ics: &str, product_id: &str) -> String {
    let mut result = String::with_capacity(ics.len());

    for line in ics.lines() {
        if line.starts_with("PRODID:") {
            result.push_str("PRODID:");
            result.push_str(product_id);
            result.push_str("\r\n");
            continue;
        }

        if line == "CALSCALE:GREGORIAN" {
            continue;
        }

        result.push_str(line);
        result.push_str("\r\n");
    }

    result
}

/// The icalendar crate escapes `\n` only, so CRLF and lone CR become LF first
fn normalize_breaks(text: &str) -> String {
    text.replace("\r\n", "\n").replace('\r', "\n")
}

/// Start and end of an event in UTC.
///
/// Clock times are local to `tz`. A missing start time means midnight, a
/// missing end time means the start time (zero-length event). An end time
/// earlier than the start time belongs to the following day.
pub fn event_window(event: &Event, tz: &Tz) -> (DateTime<Utc>, DateTime<Utc>) {
    let start_time = event.start_time.unwrap_or(NaiveTime::MIN);
    let end_time = event.end_time.unwrap_or(start_time);

    let end_date = if end_time < start_time {
        event.date.succ_opt().unwrap_or(event.date)
    } else {
        event.date
    };

    (
        local_to_utc(tz, event.date, start_time),
        local_to_utc(tz, end_date, end_time),
    )
}

/// Interpret a wall-clock time in `tz`.
///
/// Times skipped by a DST change move forward by an hour; repeated times
/// take the earlier instant.
fn local_to_utc(tz: &Tz, date: NaiveDate, time: NaiveTime) -> DateTime<Utc> {
    let local = NaiveDateTime::new(date, time);

    tz.from_local_datetime(&local)
        .earliest()
        .or_else(|| tz.from_local_datetime(&(local + Duration::hours(1))).earliest())
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|| local.and_utc())
}

fn format_utc(dt: DateTime<Utc>) -> String {
    dt.format("%Y%m%dT%H%M%SZ").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono_tz::Europe::Zurich;

    /// RFC 5545 content line limit
    const MAX_LINE_OCTETS: usize = 75;

    fn make_test_event() -> Event {
        serde_json::from_value(serde_json::json!({
            "id": "x1",
            "title": "Test",
            "date": "2024-05-10",
            "start_time": "20:00",
        }))
        .unwrap()
    }

    fn stamp() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 4, 1, 12, 0, 0).unwrap()
    }

    fn line_value<'a>(ics: &'a str, name: &str) -> Option<&'a str> {
        ics.lines()
            .find_map(|l| l.strip_prefix(name).and_then(|rest| rest.strip_prefix(':')))
    }

    /// Undo line folding
    fn unfold(ics: &str) -> String {
        ics.replace("\r\n ", "")
    }

    #[test]
    fn test_missing_end_equals_start() {
        let event = make_test_event();
        let ics = generate_ics(&event, &CalendarConfig::default(), &Zurich, stamp());

        assert_eq!(line_value(&ics, "DTSTART"), Some("20240510T180000Z"));
        assert_eq!(line_value(&ics, "DTEND"), Some("20240510T180000Z"));
    }

    #[test]
    fn test_envelope_and_identity() {
        let event = make_test_event();
        let ics = generate_ics(&event, &CalendarConfig::default(), &Zurich, stamp());

        assert!(ics.starts_with("BEGIN:VCALENDAR\r\nVERSION:2.0\r\nPRODID:-//minus3//DE\r\n"));
        assert!(ics.ends_with("END:VEVENT\r\nEND:VCALENDAR\r\n"));
        assert_eq!(line_value(&ics, "UID"), Some("x1@minus3"));
        assert_eq!(line_value(&ics, "DTSTAMP"), Some("20240401T120000Z"));
        assert_eq!(line_value(&ics, "SUMMARY"), Some("Test"));
        assert!(line_value(&ics, "DESCRIPTION").is_none());
        assert!(line_value(&ics, "LOCATION").is_none());
    }

    #[test]
    fn test_uid_is_deterministic() {
        let event = make_test_event();
        let settings = CalendarConfig::default();
        let later = stamp() + Duration::days(3);
        let a = generate_ics(&event, &settings, &Zurich, stamp());
        let b = generate_ics(&event, &settings, &Zurich, later);
        assert_eq!(line_value(&a, "UID"), line_value(&b, "UID"));
    }

    #[test]
    fn test_missing_start_is_local_midnight() {
        let mut event = make_test_event();
        event.start_time = None;
        let (start, end) = event_window(&event, &Zurich);
        assert_eq!(format_utc(start), "20240509T220000Z");
        assert_eq!(start, end);
    }

    #[test]
    fn test_explicit_end_time() {
        let mut event = make_test_event();
        event.end_time = NaiveTime::from_hms_opt(23, 30, 0);
        let (_, end) = event_window(&event, &Zurich);
        assert_eq!(format_utc(end), "20240510T213000Z");
    }

    #[test]
    fn test_end_after_midnight_rolls_to_next_day() {
        let mut event = make_test_event();
        event.end_time = NaiveTime::from_hms_opt(1, 0, 0);
        let (start, end) = event_window(&event, &Zurich);
        assert_eq!(format_utc(end), "20240510T230000Z");
        assert!(end > start);
    }

    #[test]
    fn test_winter_offset() {
        let mut event = make_test_event();
        event.date = NaiveDate::from_ymd_opt(2024, 12, 6).unwrap();
        let (start, _) = event_window(&event, &Zurich);
        assert_eq!(format_utc(start), "20241206T190000Z");
    }

    #[test]
    fn test_dst_gap_moves_forward() {
        let mut event = make_test_event();
        event.date = NaiveDate::from_ymd_opt(2024, 3, 31).unwrap();
        event.start_time = NaiveTime::from_hms_opt(2, 30, 0);
        let (start, _) = event_window(&event, &Zurich);
        assert_eq!(format_utc(start), "20240331T013000Z");
    }

    #[test]
    fn test_dst_overlap_takes_earlier() {
        let mut event = make_test_event();
        event.date = NaiveDate::from_ymd_opt(2024, 10, 27).unwrap();
        event.start_time = NaiveTime::from_hms_opt(2, 30, 0);
        let (start, _) = event_window(&event, &Zurich);
        assert_eq!(format_utc(start), "20241027T003000Z");
    }

    #[test]
    fn test_utc_zone_passthrough() {
        let event = make_test_event();
        let (start, _) = event_window(&event, &Tz::UTC);
        assert_eq!(format_utc(start), "20240510T200000Z");
    }

    #[test]
    fn test_description_and_location_escaped() {
        let mut event = make_test_event();
        event.description = Some("Erster Absatz\nZweiter; mit Komma, und \\".into());
        event.venue = Some("Kulturkeller".into());
        event.address = Some("Hauptgasse 3".into());

        let ics = generate_ics(&event, &CalendarConfig::default(), &Zurich, stamp());
        let ics = unfold(&ics);

        assert_eq!(
            line_value(&ics, "DESCRIPTION"),
            Some("Erster Absatz\\nZweiter\\; mit Komma\\, und \\\\")
        );
        assert_eq!(line_value(&ics, "LOCATION"), Some("Kulturkeller\\, Hauptgasse 3"));
    }

    #[test]
    fn test_crlf_in_description_is_one_break() {
        let mut event = make_test_event();
        event.description = Some("a\r\nb\rc".into());
        let ics = generate_ics(&event, &CalendarConfig::default(), &Zurich, stamp());
        assert_eq!(line_value(&ics, "DESCRIPTION"), Some("a\\nb\\nc"));
    }

    #[test]
    fn test_product_id_replaced_and_calscale_dropped() {
        let settings = CalendarConfig {
            product_id: "-//kulturkeller//DE".into(),
            ..CalendarConfig::default()
        };
        let ics = generate_ics(&make_test_event(), &settings, &Zurich, stamp());

        assert_eq!(line_value(&ics, "PRODID"), Some("-//kulturkeller//DE"));
        assert!(!ics.contains("ICALENDAR-RS"), "Default PRODID left in:\n{}", ics);
        assert!(!ics.contains("CALSCALE"), "CALSCALE left in:\n{}", ics);
        assert_eq!(ics.matches("DTSTAMP:").count(), 1);
        assert_eq!(ics.matches("UID:").count(), 1);
    }

    #[test]
    fn test_long_lines_are_folded() {
        let mut event = make_test_event();
        let long = "Ein sehr langer Beschreibungstext über Musik und Gäste ".repeat(8);
        event.description = Some(long.clone());

        let ics = generate_ics(&event, &CalendarConfig::default(), &Zurich, stamp());

        for line in ics.split("\r\n") {
            assert!(line.len() <= MAX_LINE_OCTETS, "line too long: {line:?}");
        }
        assert_eq!(line_value(&unfold(&ics), "DESCRIPTION"), Some(long.as_str()));
    }

    #[test]
    fn test_fold_keeps_multibyte_chars_whole() {
        let mut event = make_test_event();
        event.title = "ä".repeat(60);
        let ics = generate_ics(&event, &CalendarConfig::default(), &Zurich, stamp());

        for line in ics.split("\r\n") {
            assert!(line.len() <= MAX_LINE_OCTETS, "line too long: {line:?}");
        }
        assert_eq!(line_value(&unfold(&ics), "SUMMARY"), Some(event.title.as_str()));
    }

    #[test]
    fn test_export_event_file() {
        let mut event = make_test_event();
        event.title = "Duo Nachtfalter + Gäste".into();
        let file = export_event(&event, &CalendarConfig::default(), &Zurich, stamp());

        assert_eq!(file.filename, "duo-nachtfalter-gaste.ics");
        assert_eq!(file.mime, "text/calendar;charset=utf-8");
        assert!(file.body.contains("SUMMARY:Duo Nachtfalter + Gäste\r\n"));
    }

    #[test]
    fn test_output_parses_as_calendar() {
        let mut event = make_test_event();
        event.description = Some("Zeile 1\nZeile 2".into());
        let ics = generate_ics(&event, &CalendarConfig::default(), &Zurich, stamp());

        let cal: Calendar = ics.parse().unwrap();
        let parsed = cal
            .components
            .iter()
            .find_map(|c| c.as_event())
            .expect("Should contain a VEVENT");
        assert_eq!(parsed.get_summary(), Some("Test"));
        assert_eq!(parsed.get_uid(), Some("x1@minus3"));
    }
}
