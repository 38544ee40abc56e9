//! Calendar file generation.
//!
//! This module writes single-event `.ics` files according to RFC 5545.

mod generate;

pub use generate::{CalendarFile, ICS_MIME, event_window, export_event, generate_ics};
