//! OpenLeg API client
//!
//! Queries the NY Senate Open Legislation API (v3) for update feeds, session
//! listings, and full document payloads.
//!
//! # API Reference
//! - Endpoint: https://legislation.nysenate.gov/api/3/{resource}/...
//! - Updates feed: /api/3/{resource}/updates/{from}/{to}
//! - Authentication: API key via `key` query parameter

use crate::client::types::{Envelope, ItemList, UpdateToken};
use crate::error::{ImportError, Result};
use chrono::{DateTime, Utc};
use legisync_common::config::ApiConfig;
use reqwest::{header, Client};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::{sleep, Instant};
use tracing::debug;

/// Courtesy interval between consecutive upstream requests
const RATE_LIMIT_INTERVAL: Duration = Duration::from_millis(100);

/// Page size used when draining an updates feed
const UPDATES_PAGE_LIMIT: u32 = 100;

/// User-Agent header for upstream requests
const USER_AGENT: &str = concat!("legisync-ol/", env!("CARGO_PKG_VERSION"));

/// OpenLeg API client
///
/// One instance is shared across all importers; requests are spaced by a
/// fixed courtesy interval so a large update window does not hammer the
/// upstream service.
pub struct OpenlegClient {
    /// HTTP client for API requests
    http_client: Client,
    /// Base URL, e.g. `https://legislation.nysenate.gov/api/3`
    base_url: String,
    /// API key passed as the `key` query parameter
    api_key: Option<String>,
    /// Rate limiter (last request time)
    rate_limiter: Arc<Mutex<Option<Instant>>>,
}

impl OpenlegClient {
    /// Create new OpenLeg client from bootstrap configuration
    pub fn new(config: &ApiConfig) -> Self {
        let mut headers = header::HeaderMap::new();
        headers.insert(
            header::USER_AGENT,
            header::HeaderValue::from_static(USER_AGENT),
        );

        Self {
            http_client: Client::builder()
                .timeout(Duration::from_secs(config.timeout_secs))
                .default_headers(headers)
                .build()
                .expect("Failed to create HTTP client"),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.key.clone(),
            rate_limiter: Arc::new(Mutex::new(None)),
        }
    }

    /// Drain the updates feed for `resource` over `[from, to)`
    ///
    /// The feed is paginated; pages are pulled until the reported total is
    /// reached. Tokens identify changed records, they do not carry the
    /// record payloads.
    pub async fn updates(
        &self,
        resource: &str,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<UpdateToken>> {
        let path = format!(
            "{}/updates/{}/{}",
            resource,
            format_upstream_time(from),
            format_upstream_time(to)
        );

        let mut tokens: Vec<UpdateToken> = Vec::new();
        let mut offset: u32 = 1;

        loop {
            let envelope = self
                .get_envelope(
                    &path,
                    vec![
                        ("detail".to_string(), "true".to_string()),
                        ("limit".to_string(), UPDATES_PAGE_LIMIT.to_string()),
                        ("offset".to_string(), offset.to_string()),
                    ],
                )
                .await?;

            let total = envelope.total.unwrap_or(0);
            let list: ItemList<UpdateToken> = parse_result(&path, envelope)?;
            let page_len = list.items.len();
            tokens.extend(list.items);

            if page_len == 0 || tokens.len() as u32 >= total {
                break;
            }
            offset += page_len as u32;
        }

        debug!(resource, count = tokens.len(), "updates feed drained");
        Ok(tokens)
    }

    /// One page of a session listing for `resource`
    ///
    /// `offset` is 1-based; `limit == 0` leaves the page size to the
    /// upstream default.
    pub async fn search(
        &self,
        resource: &str,
        year: i32,
        limit: u32,
        offset: u32,
    ) -> Result<Vec<serde_json::Value>> {
        let path = format!("{}/{}", resource, year);

        let mut query = vec![("offset".to_string(), offset.to_string())];
        if limit > 0 {
            query.push(("limit".to_string(), limit.to_string()));
        }

        let envelope = self.get_envelope(&path, query).await?;
        let list: ItemList<serde_json::Value> = parse_result(&path, envelope)?;

        debug!(resource, year, count = list.items.len(), "session page fetched");
        Ok(list.items)
    }

    /// Fetch the full payload of one record
    ///
    /// `id` is the canonical slash form (`2021/S123`), which maps directly
    /// onto the upstream path.
    pub async fn document(&self, resource: &str, id: &str) -> Result<serde_json::Value> {
        let path = format!("{}/{}", resource, id);
        let envelope = self.get_envelope(&path, Vec::new()).await?;

        envelope.result.ok_or_else(|| ImportError::Upstream {
            url: path,
            message: "response carried no result".to_string(),
        })
    }

    /// Perform one GET and decode the common envelope
    ///
    /// # Errors
    /// Returns error if:
    /// - Network request fails or times out
    /// - HTTP status is not success
    /// - Envelope reports `success: false`
    async fn get_envelope(&self, path: &str, query: Vec<(String, String)>) -> Result<Envelope> {
        self.enforce_rate_limit().await;

        let url = format!("{}/{}", self.base_url, path);
        debug!(url = %url, "GET OpenLeg");

        let mut pairs = query;
        if let Some(key) = &self.api_key {
            pairs.push(("key".to_string(), key.clone()));
        }

        let response = self
            .http_client
            .get(&url)
            .query(&pairs)
            .send()
            .await?
            .error_for_status()?;

        let envelope: Envelope = response.json().await?;

        if !envelope.success {
            return Err(ImportError::Upstream {
                url,
                message: envelope
                    .message
                    .unwrap_or_else(|| "unspecified upstream failure".to_string()),
            });
        }

        Ok(envelope)
    }

    /// Enforce the courtesy interval between requests
    async fn enforce_rate_limit(&self) {
        let mut last_request = self.rate_limiter.lock().await;

        if let Some(last_time) = *last_request {
            let elapsed = last_time.elapsed();
            if elapsed < RATE_LIMIT_INTERVAL {
                let sleep_duration = RATE_LIMIT_INTERVAL - elapsed;
                debug!(
                    sleep_ms = sleep_duration.as_millis(),
                    "Rate limiting: sleeping before OpenLeg request"
                );
                sleep(sleep_duration).await;
            }
        }

        *last_request = Some(Instant::now());
    }
}

/// Decode an envelope's `result` into the expected list shape
fn parse_result<T: serde::de::DeserializeOwned>(path: &str, envelope: Envelope) -> Result<T> {
    let result = envelope.result.ok_or_else(|| ImportError::Upstream {
        url: path.to_string(),
        message: "response carried no result".to_string(),
    })?;

    Ok(serde_json::from_value(result)?)
}

/// Upstream path timestamps: second-resolution ISO, no zone suffix
fn format_upstream_time(t: DateTime<Utc>) -> String {
    t.format("%Y-%m-%dT%H:%M:%S").to_string()
}
