//! Event detail page.

use chrono::Utc;
use maud::{Markup, html};

use minus3_core::config::{SiteConfig, TextConfig};
use minus3_core::date_format::format_date;
use minus3_core::loader::DataSource;
use minus3_core::{Artist, Event, SiteError, SiteResult};

use crate::calendar_export::CalendarExporter;
use crate::dom::{Dom, Downloads, ids};
use crate::views::load_failed;

/// Shown in place of a missing door or start time
const NO_TIME: &str = "-";

/// What the detail page ended up showing
pub enum DetailOutcome {
    /// The page URL carries no `id`; nothing was rendered
    NoId,
    /// No event has the requested id
    NotFound(String),
    Shown(EventDetailView),
}

/// One event with all details, plus its calendar download.
pub struct EventDetailView {
    event: Event,
    config: SiteConfig,
}

impl EventDetailView {
    /// Render the event selected by the page's `id` query parameter.
    pub async fn init<D: Dom, S: DataSource>(
        dom: &D,
        source: &S,
        config: &SiteConfig,
    ) -> SiteResult<DetailOutcome> {
        let Some(id) = dom.query_param("id").filter(|id| !id.is_empty()) else {
            return Ok(DetailOutcome::NoId);
        };

        let catalog = match source.load_events().await {
            Ok(catalog) => catalog,
            Err(e) => {
                dom.set_html(ids::EVENT, &load_failed(&config.text).into_string());
                return Err(e);
            }
        };

        match catalog.find(&id) {
            Ok(event) => {
                let view = EventDetailView {
                    event: event.clone(),
                    config: config.clone(),
                };
                view.render(dom);
                Ok(DetailOutcome::Shown(view))
            }
            Err(SiteError::NotFound(id)) => {
                tracing::info!("No event with id '{}'", id);
                dom.set_html(ids::EVENT, &not_found(&config.text).into_string());
                Ok(DetailOutcome::NotFound(id))
            }
            Err(e) => Err(e),
        }
    }

    pub fn event(&self) -> &Event {
        &self.event
    }

    /// "Add to calendar" was clicked
    pub fn on_calendar_click<H: Downloads>(&self, host: &H) -> SiteResult<()> {
        let exporter = CalendarExporter::from_config(&self.config)?;
        exporter.export(host, &self.event, Utc::now())
    }

    fn render<D: Dom>(&self, dom: &D) {
        let ev = &self.event;

        match &ev.image {
            Some(src) => {
                dom.set_attribute(ids::EVENT_IMAGE, "src", src);
                dom.set_attribute(ids::EVENT_IMAGE, "alt", &ev.title);
                if let Some(pos) = &ev.image_pos {
                    dom.set_attribute(ids::EVENT_IMAGE, "style", &format!("object-position: {pos}"));
                }
            }
            None => dom.hide(ids::EVENT_IMAGE),
        }

        dom.set_text(ids::EVENT_TITLE, &ev.title);
        dom.set_text(ids::EVENT_SUBTITLE, &ev.subtitle().unwrap_or_default());
        dom.set_text(ids::EVENT_DATE, &format_date(ev.date));
        dom.set_text(ids::EVENT_DOOR, &clock(ev.door_time));
        dom.set_text(ids::EVENT_START, &clock(ev.start_time));
        dom.set_text(ids::EVENT_VENUE, &ev.location().unwrap_or_default());
        dom.set_html(ids::EVENT_DESC, &render_description(ev).into_string());
        dom.replace_element(ids::TICKET_LINK, &render_ticket(&self.config.text).into_string());
        dom.set_html(ids::ARTISTS, &render_artists(&ev.artists).into_string());
    }
}

fn clock(time: Option<chrono::NaiveTime>) -> String {
    time.map(|t| t.format("%H:%M").to_string())
        .unwrap_or_else(|| NO_TIME.to_string())
}

pub fn not_found(text: &TextConfig) -> Markup {
    html! { p { (text.not_found) } }
}

/// One paragraph per description line
pub fn render_description(event: &Event) -> Markup {
    html! {
        @for para in event.paragraphs() {
            p { (para) }
        }
    }
}

/// Tickets are sold at the box office only, so the page's ticket link is
/// swapped for an inert control carrying the payment note. The replacement
/// keeps the `ticketLink` id.
pub fn render_ticket(text: &TextConfig) -> Markup {
    html! {
        div.ticket id=(ids::TICKET_LINK) {
            button.btn type="button" disabled aria-disabled="true" { (text.ticket_label) }
            p.muted.ticket-note { (text.ticket_note) }
        }
    }
}

pub fn render_artists(artists: &[Artist]) -> Markup {
    html! {
        @for artist in artists {
            div.artist {
                @if let Some(image) = &artist.image {
                    img src=(image) alt=(artist.name);
                } @else {
                    div {}
                }
                div {
                    div {
                        strong { (artist.name) }
                        @if let Some(role) = &artist.role { " – " (role) }
                    }
                    @if !artist.links.is_empty() {
                        div.muted {
                            @for (i, link) in artist.links.iter().enumerate() {
                                @if i > 0 { " • " }
                                a href=(link.url) target="_blank" rel="noopener" { (link.label) }
                            }
                        }
                    }
                }
            }
        }
    }
}
