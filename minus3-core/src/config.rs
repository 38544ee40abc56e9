//! Site configuration.
//!
//! Every setting has a built-in default; a TOML document only needs the keys it
//! wants to change:
//!
//! ```toml
//! [calendar]
//! timezone = "Europe/Zurich"
//!
//! [nav]
//! breakpoint = 900
//! ```

use std::time::Duration;

use chrono_tz::Tz;
use config::{Config, File, FileFormat};
use serde::{Deserialize, Serialize};

use crate::error::{SiteError, SiteResult};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    pub data: DataConfig,
    pub calendar: CalendarConfig,
    pub program: ProgramConfig,
    pub nav: NavConfig,
    pub text: TextConfig,
}

/// Where the JSON data lives, relative to the page
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DataConfig {
    pub events_path: String,
    pub past_path: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CalendarConfig {
    /// Namespace appended to event ids to build calendar UIDs
    pub uid_domain: String,
    pub product_id: String,
    /// IANA zone the event clock times are written in. Detected from the host when unset.
    ///
    /// The deployed site pins this to `Europe/Zurich` in `site.toml`, so
    /// exported times follow the venue's clock rather than the visitor's.
    pub timezone: Option<String>,
    /// How long a download URL stays alive after the download was triggered
    pub release_delay_ms: u64,
}

/// Title line-break rule for program cards
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProgramConfig {
    /// Separator that starts a new title line (e.g. "Duo A + Trio B")
    pub title_separator: Option<String>,
    /// Treat a literal `\n` in a title as a line break
    pub break_escaped_newlines: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NavConfig {
    /// Viewport width (px) above which the mobile menu is always closed
    pub breakpoint: u32,
    /// Header class marking the open menu
    pub open_class: String,
}

/// User-visible strings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TextConfig {
    pub no_results: String,
    pub not_found: String,
    pub load_failed: String,
    pub default_caption: String,
    pub ticket_label: String,
    pub ticket_note: String,
}

impl Default for DataConfig {
    fn default() -> Self {
        DataConfig {
            events_path: "data/events.json".into(),
            past_path: "data/past.json".into(),
        }
    }
}

impl Default for CalendarConfig {
    fn default() -> Self {
        CalendarConfig {
            uid_domain: "minus3".into(),
            product_id: "-//minus3//DE".into(),
            timezone: None,
            release_delay_ms: 1500,
        }
    }
}

impl Default for ProgramConfig {
    fn default() -> Self {
        ProgramConfig {
            title_separator: Some(" + ".into()),
            break_escaped_newlines: true,
        }
    }
}

impl Default for NavConfig {
    fn default() -> Self {
        NavConfig {
            breakpoint: 820,
            open_class: "nav-open".into(),
        }
    }
}

impl Default for TextConfig {
    fn default() -> Self {
        TextConfig {
            no_results: "Keine Treffer.".into(),
            not_found: "Event nicht gefunden.".into(),
            load_failed: "Die Daten konnten nicht geladen werden. Bitte später nochmals versuchen."
                .into(),
            default_caption: "Vergangenes Event".into(),
            ticket_label: "Tickets nur an der Abendkasse".into(),
            ticket_note: "Bezahlt wird an der Abendkasse bar oder mit TWINT. \
                          Die Einnahmen gehen fair geteilt an Künstler:innen und Veranstalter."
                .into(),
        }
    }
}

impl SiteConfig {
    /// Defaults overridden by the keys present in `overrides` (TOML).
    pub fn from_toml(overrides: &str) -> SiteResult<Self> {
        let settings = Config::builder()
            .add_source(File::from_str(overrides, FileFormat::Toml))
            .build()
            .map_err(|e| SiteError::Config(e.to_string()))?;

        settings
            .try_deserialize()
            .map_err(|e| SiteError::Config(e.to_string()))
    }

    pub fn release_delay(&self) -> Duration {
        Duration::from_millis(self.calendar.release_delay_ms)
    }

    /// Zone event clock times are interpreted in
    pub fn timezone(&self) -> SiteResult<Tz> {
        match &self.calendar.timezone {
            Some(name) => name
                .parse::<Tz>()
                .map_err(|e| SiteError::Config(format!("Unknown time zone '{name}': {e}"))),
            None => Ok(host_timezone()),
        }
    }
}

fn host_timezone() -> Tz {
    match iana_time_zone::get_timezone() {
        Ok(name) => name.parse().unwrap_or_else(|_| {
            tracing::warn!("Host time zone '{}' is unknown, using UTC", name);
            Tz::UTC
        }),
        Err(e) => {
            tracing::warn!("Could not detect host time zone ({}), using UTC", e);
            Tz::UTC
        }
    }
}
