//! Browser runtime for the minus3 program site.
//!
//! Each page of the site includes the same module; on load it looks at which
//! containers the document has and wires up the matching views:
//! - `eventList` program listing with search and month filter ([`views::ProgramView`])
//! - `event` detail page for `?id=...` with calendar download ([`views::EventDetailView`])
//! - `gallery` pictures of past events ([`views::GalleryView`])
//!
//! The mobile navigation ([`nav::NavController`]) is attached on every page.

pub mod calendar_export;
pub mod dom;
pub mod nav;
#[cfg(any(test, feature = "testing"))]
pub mod testing;
pub mod views;

#[cfg(target_arch = "wasm32")]
mod web;
