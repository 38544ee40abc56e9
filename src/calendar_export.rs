//! "Add to calendar": turn an event into a downloadable `.ics` file.

use std::time::Duration;

use chrono::{DateTime, Utc};
use chrono_tz::Tz;

use minus3_core::config::{CalendarConfig, SiteConfig};
use minus3_core::ics::{CalendarFile, export_event};
use minus3_core::{Event, SiteResult};

use crate::dom::Downloads;

pub struct CalendarExporter {
    settings: CalendarConfig,
    tz: Tz,
    release_delay: Duration,
}

impl CalendarExporter {
    pub fn new(settings: CalendarConfig, tz: Tz, release_delay: Duration) -> Self {
        CalendarExporter {
            settings,
            tz,
            release_delay,
        }
    }

    pub fn from_config(config: &SiteConfig) -> SiteResult<Self> {
        Ok(CalendarExporter::new(
            config.calendar.clone(),
            config.timezone()?,
            config.release_delay(),
        ))
    }

    pub fn build(&self, event: &Event, stamp: DateTime<Utc>) -> CalendarFile {
        export_event(event, &self.settings, &self.tz, stamp)
    }

    /// Hand the calendar file to the host as a download.
    ///
    /// The resource only lives for the configured release delay after the
    /// download has been triggered.
    pub fn export<H: Downloads>(
        &self,
        host: &H,
        event: &Event,
        stamp: DateTime<Utc>,
    ) -> SiteResult<()> {
        let file = self.build(event, stamp);
        let handle = host.create_resource(&file)?;

        host.trigger_download(&handle, &file.filename);
        tracing::info!(
            "Calendar download {} started, releasing in {:?}",
            file.filename,
            self.release_delay
        );

        host.release_after(handle, self.release_delay);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MemoryDom;
    use chrono::TimeZone;

    fn event() -> Event {
        serde_json::from_value(serde_json::json!({
            "id": "x1",
            "title": "Test",
            "date": "2024-05-10",
            "start_time": "20:00",
        }))
        .unwrap()
    }

    fn exporter() -> CalendarExporter {
        CalendarExporter::new(
            CalendarConfig::default(),
            chrono_tz::Europe::Zurich,
            Duration::from_millis(1500),
        )
    }

    #[test]
    fn test_export_triggers_and_schedules_release() {
        let dom = MemoryDom::new();
        let stamp = Utc.with_ymd_and_hms(2024, 4, 1, 12, 0, 0).unwrap();

        exporter().export(&dom, &event(), stamp).unwrap();

        let downloads = dom.downloads();
        assert_eq!(downloads.len(), 1);
        assert_eq!(downloads[0].filename, "test.ics");
        assert_eq!(downloads[0].mime, "text/calendar;charset=utf-8");
        assert!(downloads[0].body.contains("DTSTART:20240510T180000Z"));
        assert!(downloads[0].body.contains("DTEND:20240510T180000Z"));

        assert_eq!(dom.live_resources().len(), 1);
        dom.advance(Duration::from_millis(1000));
        assert_eq!(dom.live_resources().len(), 1, "released too early");
        dom.advance(Duration::from_millis(500));
        assert!(dom.live_resources().is_empty(), "resource leaked");
    }

    #[test]
    fn test_failed_resource_creation_is_reported() {
        let dom = MemoryDom::new().refusing_downloads();
        let err = exporter().export(&dom, &event(), Utc::now()).unwrap_err();
        assert!(matches!(err, minus3_core::SiteError::Download(_)));
        assert!(dom.downloads().is_empty());
    }
}
