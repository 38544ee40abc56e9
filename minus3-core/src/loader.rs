//! Fetching the site's JSON data.

use chrono::Utc;
use reqwest::header::{CACHE_CONTROL, PRAGMA};
use serde::de::DeserializeOwned;
use url::Url;

use crate::config::DataConfig;
use crate::error::{SiteError, SiteResult};
use crate::event::{Event, EventCatalog, PastItem};

/// Something that can hand out the site's data.
///
/// [`DataLoader`] fetches over HTTP; tests use in-memory sources.
#[allow(async_fn_in_trait)]
pub trait DataSource {
    async fn load_events(&self) -> SiteResult<EventCatalog>;
    async fn load_past(&self) -> SiteResult<Vec<PastItem>>;
}

/// HTTP loader for the JSON resources next to the page
pub struct DataLoader {
    http: reqwest::Client,
    base_url: Url,
    paths: DataConfig,
}

impl DataLoader {
    /// `base_url` is the page URL; data paths are resolved against it.
    pub fn new(base_url: Url, paths: DataConfig) -> Self {
        DataLoader {
            http: reqwest::Client::new(),
            base_url,
            paths,
        }
    }

    /// Fetch `path` bypassing every cache and decode it as `T`.
    ///
    /// A non-success status is a [`SiteError::Load`]; there are no retries.
    pub async fn load_json<T: DeserializeOwned>(&self, path: &str) -> SiteResult<T> {
        let url = resource_url(&self.base_url, path, Utc::now().timestamp_millis())?;

        tracing::debug!("Fetching {}", url);

        let resp = self
            .http
            .get(url)
            .header(CACHE_CONTROL, "no-store")
            .header(PRAGMA, "no-cache")
            .send()
            .await
            .map_err(|source| SiteError::Fetch {
                path: path.to_string(),
                source,
            })?;

        let status = resp.status();
        if !status.is_success() {
            tracing::warn!("Loading {} failed with HTTP {}", path, status);
            return Err(SiteError::Load {
                path: path.to_string(),
                status: status.as_u16(),
            });
        }

        let body = resp.bytes().await.map_err(|source| SiteError::Fetch {
            path: path.to_string(),
            source,
        })?;

        decode_json(path, &body)
    }
}

impl DataSource for DataLoader {
    async fn load_events(&self) -> SiteResult<EventCatalog> {
        let path = &self.paths.events_path;
        let events: Vec<Event> = self.load_json(path).await?;
        let catalog = EventCatalog::new(path, events)?;
        tracing::info!("Loaded {} events from {}", catalog.len(), path);
        Ok(catalog)
    }

    async fn load_past(&self) -> SiteResult<Vec<PastItem>> {
        let path = &self.paths.past_path;
        let items: Vec<PastItem> = self.load_json(path).await?;
        tracing::info!("Loaded {} gallery items from {}", items.len(), path);
        Ok(items)
    }
}

/// Resolve `path` against the page URL and add a cache-busting query parameter.
pub fn resource_url(base: &Url, path: &str, nonce: i64) -> SiteResult<Url> {
    let mut url = base.join(path).map_err(|e| SiteError::Invalid {
        path: path.to_string(),
        reason: format!("not a valid resource path: {e}"),
    })?;
    url.query_pairs_mut().append_pair("_", &nonce.to_string());
    Ok(url)
}

/// Decode a JSON body, reporting schema mismatches against `path`.
pub fn decode_json<T: DeserializeOwned>(path: &str, body: &[u8]) -> SiteResult<T> {
    serde_json::from_slice(body).map_err(|source| {
        tracing::warn!("{} does not match the expected schema: {}", path, source);
        SiteError::Schema {
            path: path.to_string(),
            source,
        }
    })
}
