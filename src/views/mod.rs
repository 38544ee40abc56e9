//! Page views: each loads its data, renders into the document and keeps
//! whatever state later UI events need.

mod detail;
mod gallery;
mod program;

pub use detail::{DetailOutcome, EventDetailView, render_artists, render_description, render_ticket};
pub use gallery::{GalleryView, render_gallery};
pub use program::{ProgramView, event_href, render_list, title_lines};

use maud::{Markup, html};
use minus3_core::config::TextConfig;

/// Shown in a page container when its data could not be loaded
pub(crate) fn load_failed(text: &TextConfig) -> Markup {
    html! { p.muted.load-error { (text.load_failed) } }
}
