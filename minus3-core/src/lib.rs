//! Core types for the minus3 site.
//!
//! This crate holds everything that does not touch the browser:
//! - `event` typed records for `events.json` / `past.json`, validated on load
//! - `loader` fetching the JSON data over HTTP
//! - `filter` program search and month buckets
//! - `ics` calendar file generation
//! - `config` site settings

pub mod config;
pub mod date_format;
pub mod error;
pub mod event;
pub mod filter;
pub mod ics;
pub mod loader;
pub mod naming;

pub use config::SiteConfig;
pub use error::{SiteError, SiteResult};
pub use event::*;
