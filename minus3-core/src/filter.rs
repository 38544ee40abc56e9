//! Program filtering: free-text search and month selection.

use std::collections::BTreeSet;

use crate::event::Event;

/// Distinct `YYYY-MM` buckets present in `events`, sorted ascending.
pub fn month_buckets(events: &[Event]) -> Vec<String> {
    events
        .iter()
        .map(month_key)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// `YYYY-MM` of an event's date
pub fn month_key(event: &Event) -> String {
    event.date.format("%Y-%m").to_string()
}

/// Current state of the program's search box and month select.
///
/// Empty query and empty month match everything; both must hold for an
/// event to be included.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProgramFilter {
    query: String,
    month: String,
}

impl ProgramFilter {
    pub fn new(query: &str, month: &str) -> Self {
        let mut filter = ProgramFilter::default();
        filter.set_query(query);
        filter.set_month(month);
        filter
    }

    pub fn set_query(&mut self, query: &str) {
        self.query = query.to_lowercase();
    }

    pub fn set_month(&mut self, month: &str) {
        self.month = month.trim().to_string();
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn month(&self) -> &str {
        &self.month
    }

    pub fn is_empty(&self) -> bool {
        self.query.is_empty() && self.month.is_empty()
    }

    pub fn matches(&self, event: &Event) -> bool {
        let matches_query =
            self.query.is_empty() || event.searchable_text().to_lowercase().contains(&self.query);
        let matches_month = self.month.is_empty() || event_date_iso(event).starts_with(&self.month);
        matches_query && matches_month
    }

    /// Events matching the filter, in source order
    pub fn apply<'a>(&self, events: &'a [Event]) -> Vec<&'a Event> {
        events.iter().filter(|e| self.matches(e)).collect()
    }
}

fn event_date_iso(event: &Event) -> String {
    event.date.format("%Y-%m-%d").to_string()
}
