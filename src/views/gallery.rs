//! Gallery of past events.

use maud::{Markup, html};

use minus3_core::config::{SiteConfig, TextConfig};
use minus3_core::loader::DataSource;
use minus3_core::{PastItem, SiteResult};

use crate::dom::{Dom, ids};
use crate::views::load_failed;

pub struct GalleryView;

impl GalleryView {
    /// Fill the gallery with the past-event pictures.
    ///
    /// Returns the number of pictures, or `None` when the page has no gallery.
    pub async fn init<D: Dom, S: DataSource>(
        dom: &D,
        source: &S,
        config: &SiteConfig,
    ) -> SiteResult<Option<usize>> {
        if !dom.has_element(ids::GALLERY) {
            return Ok(None);
        }

        let items = match source.load_past().await {
            Ok(items) => items,
            Err(e) => {
                dom.set_html(ids::GALLERY, &load_failed(&config.text).into_string());
                return Err(e);
            }
        };

        dom.set_html(ids::GALLERY, &render_gallery(&items, &config.text).into_string());
        Ok(Some(items.len()))
    }
}

pub fn render_gallery(items: &[PastItem], text: &TextConfig) -> Markup {
    html! {
        @for item in items {
            @let caption = item.caption.as_deref().unwrap_or(&text.default_caption);
            figure {
                img src=(item.src) alt=(caption) loading="lazy";
                figcaption { (caption) }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gallery_keeps_source_order_and_defaults_caption() {
        let items = vec![
            PastItem { src: "img/b.jpg".into(), caption: Some("Sommerfest".into()) },
            PastItem { src: "img/a.jpg".into(), caption: None },
        ];

        let html = render_gallery(&items, &TextConfig::default()).into_string();

        assert_eq!(html.matches("<figure>").count(), 2);
        assert!(html.find("img/b.jpg").unwrap() < html.find("img/a.jpg").unwrap());
        assert!(html.contains("<figcaption>Sommerfest</figcaption>"), "{html}");
        assert!(html.contains("<figcaption>Vergangenes Event</figcaption>"), "{html}");
        assert_eq!(html.matches(r#"loading="lazy""#).count(), 2);
    }

    #[test]
    fn test_empty_gallery() {
        assert_eq!(render_gallery(&[], &TextConfig::default()).into_string(), "");
    }
}
