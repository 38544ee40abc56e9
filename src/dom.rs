//! What the page runtime needs from its host document.
//!
//! Views only talk to these traits. The browser binding lives in `web`
//! (wasm32 only); [`crate::testing::MemoryDom`] is an in-memory host.

use std::time::Duration;

use minus3_core::SiteResult;
use minus3_core::ics::CalendarFile;

/// Element ids the pages render into
pub mod ids {
    pub const EVENT_LIST: &str = "eventList";
    pub const SEARCH: &str = "search";
    pub const MONTH_FILTER: &str = "monthFilter";

    pub const EVENT: &str = "event";
    pub const EVENT_IMAGE: &str = "eventImage";
    pub const EVENT_TITLE: &str = "eventTitle";
    pub const EVENT_SUBTITLE: &str = "eventSubtitle";
    pub const EVENT_DATE: &str = "eventDate";
    pub const EVENT_DOOR: &str = "eventDoor";
    pub const EVENT_START: &str = "eventStart";
    pub const EVENT_VENUE: &str = "eventVenue";
    pub const EVENT_DESC: &str = "eventDesc";
    pub const TICKET_LINK: &str = "ticketLink";
    pub const CAL_LINK: &str = "calLink";
    pub const ARTISTS: &str = "artists";

    pub const GALLERY: &str = "gallery";
}

/// Element access by id. Calls on ids that are not in the document do nothing.
pub trait Dom {
    fn has_element(&self, id: &str) -> bool;
    /// Replace the element's children with `html`
    fn set_html(&self, id: &str, html: &str);
    /// Append `html` after the element's existing children
    fn append_html(&self, id: &str, html: &str);
    fn set_text(&self, id: &str, text: &str);
    fn set_attribute(&self, id: &str, name: &str, value: &str);
    fn hide(&self, id: &str);
    /// Replace the element itself, attributes included, with `html`
    fn replace_element(&self, id: &str, html: &str);
    /// Value of a query parameter of the page URL
    fn query_param(&self, key: &str) -> Option<String>;
}

/// Short-lived downloadable resources (object URLs in a browser)
pub trait Downloads {
    /// Make `file` downloadable and return a handle to it
    fn create_resource(&self, file: &CalendarFile) -> SiteResult<String>;
    /// Start downloading the resource behind `handle` as `filename`
    fn trigger_download(&self, handle: &str, filename: &str);
    /// Free the resource once `delay` has passed
    fn release_after(&self, handle: String, delay: Duration);
}

/// The two places the mobile navigation reflects its state
pub trait NavHandles {
    /// Add or remove `class` on the site header
    fn set_header_class(&self, class: &str, on: bool);
    /// Set `aria-expanded` on the toggle button
    fn set_toggle_expanded(&self, expanded: bool);
}

impl<T: NavHandles + ?Sized> NavHandles for &T {
    fn set_header_class(&self, class: &str, on: bool) {
        (**self).set_header_class(class, on)
    }

    fn set_toggle_expanded(&self, expanded: bool) {
        (**self).set_toggle_expanded(expanded)
    }
}

/// Browser timers take an `i32` millisecond count; longer delays saturate.
pub fn timer_millis(delay: Duration) -> i32 {
    i32::try_from(delay.as_millis()).unwrap_or(i32::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timer_millis_saturates() {
        assert_eq!(timer_millis(Duration::from_millis(1500)), 1500);
        assert_eq!(timer_millis(Duration::from_millis(u64::MAX)), i32::MAX);
        assert_eq!(timer_millis(Duration::from_millis(i32::MAX as u64 + 1)), i32::MAX);
    }
}
