//! Typed records for the site's JSON data.
//!
//! `data/events.json` holds a list of [`Event`]s and `data/past.json` a list of
//! [`PastItem`]s. Records are validated once at the load boundary (see
//! [`EventCatalog::new`]) and are read-only afterwards.

use std::collections::HashSet;

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::{SiteError, SiteResult};

/// One listed happening
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub id: String,
    pub title: String,
    pub date: NaiveDate,

    #[serde(default, with = "clock_time", skip_serializing_if = "Option::is_none")]
    pub start_time: Option<NaiveTime>,
    #[serde(default, with = "clock_time", skip_serializing_if = "Option::is_none")]
    pub end_time: Option<NaiveTime>,
    #[serde(default, with = "clock_time", skip_serializing_if = "Option::is_none")]
    pub door_time: Option<NaiveTime>,

    #[serde(default, deserialize_with = "non_empty")]
    pub venue: Option<String>,
    #[serde(default, deserialize_with = "non_empty")]
    pub address: Option<String>,
    #[serde(default, deserialize_with = "non_empty")]
    pub city: Option<String>,
    #[serde(default, deserialize_with = "non_empty")]
    pub genre: Option<String>,

    /// Free text, one paragraph per line
    #[serde(default, deserialize_with = "non_empty")]
    pub description: Option<String>,

    #[serde(default, deserialize_with = "non_empty")]
    pub image: Option<String>,
    /// CSS `object-position` value for the image crop
    #[serde(default, deserialize_with = "non_empty")]
    pub image_pos: Option<String>,

    #[serde(default, deserialize_with = "non_empty")]
    pub ticket_url: Option<String>,
    #[serde(default, deserialize_with = "non_empty")]
    pub ticket_cta: Option<String>,

    #[serde(default)]
    pub artists: Vec<Artist>,
}

/// A performer listed on an event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Artist {
    pub name: String,
    #[serde(default, deserialize_with = "non_empty")]
    pub role: Option<String>,
    #[serde(default, deserialize_with = "non_empty")]
    pub image: Option<String>,
    #[serde(default)]
    pub links: Vec<Link>,
}

/// External link of an artist (website, label page, ...)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Link {
    pub url: String,
    pub label: String,
}

/// A gallery picture from a past event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PastItem {
    pub src: String,
    #[serde(default, deserialize_with = "non_empty")]
    pub caption: Option<String>,
}

impl Event {
    /// Text the program search matches against: title, city, venue, genre
    /// and artist names, space-joined.
    pub fn searchable_text(&self) -> String {
        let artists = self
            .artists
            .iter()
            .map(|a| a.name.as_str())
            .collect::<Vec<_>>()
            .join(" ");

        [
            self.title.as_str(),
            self.city.as_deref().unwrap_or(""),
            self.venue.as_deref().unwrap_or(""),
            self.genre.as_deref().unwrap_or(""),
            artists.as_str(),
        ]
        .join(" ")
    }

    /// Venue and address joined with ", ", skipping missing parts
    pub fn location(&self) -> Option<String> {
        join_present(&[self.venue.as_deref(), self.address.as_deref()], ", ")
    }

    /// City and venue joined with " • ", skipping missing parts
    pub fn subtitle(&self) -> Option<String> {
        join_present(&[self.city.as_deref(), self.venue.as_deref()], " • ")
    }

    /// Description split into paragraphs, one per line
    pub fn paragraphs(&self) -> Vec<&str> {
        match &self.description {
            Some(desc) => desc.split('\n').map(|p| p.trim_end_matches('\r')).collect(),
            None => vec![],
        }
    }
}

fn join_present(parts: &[Option<&str>], sep: &str) -> Option<String> {
    let present: Vec<&str> = parts.iter().flatten().copied().collect();
    if present.is_empty() {
        None
    } else {
        Some(present.join(sep))
    }
}

/// The validated event collection of one page view.
#[derive(Debug, Clone, Default)]
pub struct EventCatalog {
    events: Vec<Event>,
}

impl EventCatalog {
    /// Validate `events` loaded from `source`.
    ///
    /// Every id must be non-empty, URL-safe and unique across the collection.
    pub fn new(source: &str, events: Vec<Event>) -> SiteResult<Self> {
        let mut seen = HashSet::new();

        for event in &events {
            if !is_url_safe(&event.id) {
                return Err(SiteError::Invalid {
                    path: source.to_string(),
                    reason: format!("event id '{}' is not URL-safe", event.id),
                });
            }
            if !seen.insert(event.id.as_str()) {
                return Err(SiteError::Invalid {
                    path: source.to_string(),
                    reason: format!("duplicate event id '{}'", event.id),
                });
            }
        }

        Ok(EventCatalog { events })
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Look up an event by id
    pub fn find(&self, id: &str) -> SiteResult<&Event> {
        self.events
            .iter()
            .find(|e| e.id == id)
            .ok_or_else(|| SiteError::NotFound(id.to_string()))
    }
}

/// Ids end up in query strings and calendar UIDs, so only RFC 3986
/// unreserved characters are allowed.
pub fn is_url_safe(id: &str) -> bool {
    !id.is_empty()
        && id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '.' | '_' | '~'))
}

/// Parse a clock time as written in the data files: `H`, `HH:MM` or `HH:MM:SS`.
/// An empty string means "no time".
pub fn parse_clock(s: &str) -> Result<Option<NaiveTime>, String> {
    let s = s.trim();
    if s.is_empty() {
        return Ok(None);
    }

    if let Ok(t) = NaiveTime::parse_from_str(s, "%H:%M:%S") {
        return Ok(Some(t));
    }
    if let Ok(t) = NaiveTime::parse_from_str(s, "%H:%M") {
        return Ok(Some(t));
    }
    s.parse::<u32>()
        .ok()
        .and_then(|h| NaiveTime::from_hms_opt(h, 0, 0))
        .map(Some)
        .ok_or_else(|| format!("invalid clock time '{s}'"))
}

fn non_empty<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value.filter(|s| !s.trim().is_empty()))
}

mod clock_time {
    use chrono::NaiveTime;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(time: &Option<NaiveTime>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match time {
            Some(t) => serializer.serialize_str(&t.format("%H:%M").to_string()),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<NaiveTime>, D::Error>
    where
        D: Deserializer<'de>,
    {
        match Option::<String>::deserialize(deserializer)? {
            Some(s) => super::parse_clock(&s).map_err(serde::de::Error::custom),
            None => Ok(None),
        }
    }
}
