//! Program listing with live search and month filter.

use maud::{Markup, html};
use url::form_urlencoded;

use minus3_core::config::{ProgramConfig, SiteConfig, TextConfig};
use minus3_core::date_format::format_date;
use minus3_core::filter::{ProgramFilter, month_buckets};
use minus3_core::loader::DataSource;
use minus3_core::{Event, EventCatalog, SiteResult};

use crate::dom::{Dom, ids};
use crate::views::load_failed;

/// The program page: every event as a card, re-rendered on each filter change.
pub struct ProgramView {
    catalog: EventCatalog,
    filter: ProgramFilter,
    program: ProgramConfig,
    text: TextConfig,
}

impl ProgramView {
    /// Load the events and render the unfiltered list.
    ///
    /// Returns `None` when the page has no event list.
    pub async fn init<D: Dom, S: DataSource>(
        dom: &D,
        source: &S,
        config: &SiteConfig,
    ) -> SiteResult<Option<Self>> {
        if !dom.has_element(ids::EVENT_LIST) {
            return Ok(None);
        }

        let catalog = match source.load_events().await {
            Ok(catalog) => catalog,
            Err(e) => {
                dom.set_html(ids::EVENT_LIST, &load_failed(&config.text).into_string());
                return Err(e);
            }
        };

        let view = ProgramView::new(catalog, config);
        dom.append_html(ids::MONTH_FILTER, &view.month_options().into_string());
        view.render(dom);

        Ok(Some(view))
    }

    pub fn new(catalog: EventCatalog, config: &SiteConfig) -> Self {
        ProgramView {
            catalog,
            filter: ProgramFilter::default(),
            program: config.program.clone(),
            text: config.text.clone(),
        }
    }

    /// Search box changed
    pub fn on_search_input<D: Dom>(&mut self, dom: &D, query: &str) {
        self.filter.set_query(query);
        self.render(dom);
    }

    /// Month select changed
    pub fn on_month_change<D: Dom>(&mut self, dom: &D, month: &str) {
        self.filter.set_month(month);
        self.render(dom);
    }

    pub fn months(&self) -> Vec<String> {
        month_buckets(self.catalog.events())
    }

    pub fn visible(&self) -> Vec<&Event> {
        self.filter.apply(self.catalog.events())
    }

    fn render<D: Dom>(&self, dom: &D) {
        let items = self.visible();
        tracing::debug!(
            "Program filter {:?}/{:?}: {} of {} events",
            self.filter.query(),
            self.filter.month(),
            items.len(),
            self.catalog.len()
        );
        dom.set_html(
            ids::EVENT_LIST,
            &render_list(&items, &self.program, &self.text).into_string(),
        );
    }

    fn month_options(&self) -> Markup {
        html! {
            @for month in self.months() {
                option value=(month) { (month) }
            }
        }
    }
}

/// The card list, or the "no results" note when nothing matches
pub fn render_list(items: &[&Event], program: &ProgramConfig, text: &TextConfig) -> Markup {
    if items.is_empty() {
        return html! { p.muted { (text.no_results) } };
    }

    html! {
        @for event in items {
            (render_card(event, program))
        }
    }
}

fn render_card(event: &Event, program: &ProgramConfig) -> Markup {
    html! {
        a.card href=(event_href(&event.id)) {
            div.thumb {
                @if let Some(image) = &event.image {
                    img src=(image) alt=(event.title) loading="lazy"
                        style=[event.image_pos.as_ref().map(|p| format!("object-position: {p}"))];
                }
            }
            div.content {
                div.meta { (format_date(event.date)) " • " (event.city.as_deref().unwrap_or("")) }
                h3 {
                    @for (i, line) in title_lines(&event.title, program).iter().enumerate() {
                        @if i > 0 { br; }
                        (line)
                    }
                }
                div.meta {
                    (event.venue.as_deref().unwrap_or(""))
                    @if let Some(genre) = &event.genre { " • " (genre) }
                }
            }
        }
    }
}

/// Link to the detail page of an event
pub fn event_href(id: &str) -> String {
    let encoded: String = form_urlencoded::byte_serialize(id.as_bytes()).collect();
    format!("event.html?id={encoded}")
}

/// Split a title into display lines according to the line-break rule.
/// Real newlines always break.
pub fn title_lines(title: &str, program: &ProgramConfig) -> Vec<String> {
    let mut lines: Vec<String> = title.lines().map(str::to_string).collect();

    if let Some(sep) = program.title_separator.as_deref().filter(|s| !s.is_empty()) {
        lines = split_all(lines, sep);
    }
    if program.break_escaped_newlines {
        lines = split_all(lines, "\\n");
    }

    lines
}

fn split_all(lines: Vec<String>, sep: &str) -> Vec<String> {
    lines
        .iter()
        .flat_map(|line| line.split(sep).map(str::to_string))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(id: &str, date: &str, title: &str) -> Event {
        serde_json::from_value(serde_json::json!({
            "id": id,
            "title": title,
            "date": date,
            "city": "Solothurn",
            "venue": "Kulturkeller",
        }))
        .unwrap()
    }

    #[test]
    fn test_title_lines_plus_separator() {
        let rule = ProgramConfig::default();
        assert_eq!(
            title_lines("Duo Nachtfalter + Trio Grau", &rule),
            vec!["Duo Nachtfalter", "Trio Grau"]
        );
    }

    #[test]
    fn test_title_lines_escaped_newline() {
        let rule = ProgramConfig::default();
        assert_eq!(title_lines(r"Erste Zeile\nZweite", &rule), vec!["Erste Zeile", "Zweite"]);
    }

    #[test]
    fn test_title_lines_rule_disabled() {
        let rule = ProgramConfig {
            title_separator: None,
            break_escaped_newlines: false,
        };
        assert_eq!(title_lines("A + B", &rule), vec!["A + B"]);
        assert_eq!(title_lines(r"A\nB", &rule), vec![r"A\nB"]);
    }

    #[test]
    fn test_plus_without_spaces_is_not_a_break() {
        let rule = ProgramConfig::default();
        assert_eq!(title_lines("C+C Music", &rule), vec!["C+C Music"]);
    }

    #[test]
    fn test_card_markup() {
        let mut ev = event("x1", "2024-05-10", "Duo A + Trio B");
        ev.genre = Some("Jazz".into());
        let html = render_list(&[&ev], &ProgramConfig::default(), &TextConfig::default()).into_string();

        assert!(html.contains(r#"href="event.html?id=x1""#), "{html}");
        assert!(html.contains("Fr., 10.05.2024 • Solothurn"), "{html}");
        assert!(html.contains("Duo A<br>Trio B"), "{html}");
        assert!(html.contains("Kulturkeller • Jazz"), "{html}");
        assert!(!html.contains("<img"), "no image, no thumbnail: {html}");
    }

    #[test]
    fn test_card_thumbnail() {
        let mut ev = event("x1", "2024-05-10", "Test");
        ev.image = Some("img/x1.jpg".into());
        ev.image_pos = Some("center 30%".into());
        let html = render_list(&[&ev], &ProgramConfig::default(), &TextConfig::default()).into_string();

        assert!(html.contains(r#"src="img/x1.jpg""#), "{html}");
        assert!(html.contains(r#"loading="lazy""#), "{html}");
        assert!(html.contains("object-position: center 30%"), "{html}");
    }

    #[test]
    fn test_text_is_escaped() {
        let ev = event("x1", "2024-05-10", "<script>alert(1)</script>");
        let html = render_list(&[&ev], &ProgramConfig::default(), &TextConfig::default()).into_string();
        assert!(!html.contains("<script>"), "{html}");
        assert!(html.contains("&lt;script&gt;"), "{html}");
    }

    #[test]
    fn test_empty_list_placeholder() {
        let html = render_list(&[], &ProgramConfig::default(), &TextConfig::default()).into_string();
        assert_eq!(html, r#"<p class="muted">Keine Treffer.</p>"#);
    }

    #[test]
    fn test_event_href_encodes() {
        assert_eq!(event_href("x1"), "event.html?id=x1");
        assert_eq!(event_href("a b&c"), "event.html?id=a+b%26c");
    }
}
