//! Client for the UptimeRobot read-only API.
//!
//! Every layer reports API-level failure as `(false, payload)` so the
//! pagination loop can branch on it. Transport and decoding faults are
//! returned as [`ApiError`].

mod models;

pub use models::*;

use serde_json::Value;
use std::collections::BTreeMap;
use thiserror::Error;

/// Production API base URL.
pub const BASE_URL: &str = "https://api.uptimerobot.com/v2/";

const GET_MONITORS: &str = "getMonitors";

/// Form parameters sent with a request.
pub type Params = BTreeMap<String, String>;

/// API client error types.
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("network error: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("invalid JSON response: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Wrapper around the read-only API.
#[derive(Debug, Clone)]
pub struct ReadApi {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl ReadApi {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self::with_base_url(api_key, BASE_URL)
    }

    /// Create a client against a different base URL.
    pub fn with_base_url(api_key: impl Into<String>, base_url: impl Into<String>) -> Self {
        let mut base_url = base_url.into();
        if !base_url.ends_with('/') {
            base_url.push('/');
        }

        Self {
            client: reqwest::Client::new(),
            base_url,
            api_key: api_key.into(),
        }
    }

    /// POST `payload` (plus the API key) to `endpoint`.
    ///
    /// Returns `(true, body)` when the body's `stat` is `"ok"`, and
    /// `(false, body)` for any other JSON body.
    pub async fn request(&self, endpoint: &str, payload: &Params) -> Result<(bool, Value), ApiError> {
        let mut form = payload.clone();
        form.insert("api_key".to_string(), self.api_key.clone());

        let url = format!("{}{}", self.base_url, endpoint);
        let response = self.client.post(&url).form(&form).send().await?;
        let body = response.bytes().await?;
        let content: Value = serde_json::from_slice(&body)?;

        let ok = content.get("stat").and_then(Value::as_str) == Some("ok");
        Ok((ok, content))
    }

    /// Fetch one page of monitors.
    ///
    /// `optional_params` is merged into the payload, see
    /// <https://uptimerobot.com/api/#getMonitorsWrap>. Do not include the
    /// API key.
    pub async fn get_page(&self, optional_params: &Params) -> Result<(bool, Value), ApiError> {
        let mut payload = Params::new();
        payload.insert("format".to_string(), "json".to_string());
        payload.extend(
            optional_params
                .iter()
                .map(|(k, v)| (k.clone(), v.clone())),
        );

        self.request(GET_MONITORS, &payload).await
    }

    /// Fetch every monitor, following pagination.
    ///
    /// Stops at the first failed or malformed page and returns
    /// `(false, monitors fetched so far)`.
    pub async fn get_all(&self, optional_params: &Params) -> Result<(bool, Vec<Monitor>), ApiError> {
        let mut monitors = Vec::new();
        let mut offset: u64 = 0;

        loop {
            let mut params = optional_params.clone();
            params.insert("offset".to_string(), offset.to_string());

            let (ok, content) = self.get_page(&params).await?;
            if !ok {
                tracing::warn!(
                    "getMonitors failed at offset {}: {}",
                    offset,
                    failure_message(&content)
                );
                return Ok((false, monitors));
            }

            let page: Page = match serde_json::from_value(content) {
                Ok(page) => page,
                Err(e) => {
                    tracing::warn!("Malformed getMonitors page at offset {}: {}", offset, e);
                    return Ok((false, monitors));
                }
            };

            let pagination = match page.pagination {
                Some(p) if p.limit > 0 || p.total == 0 => p,
                other => {
                    tracing::warn!(
                        "Invalid pagination block at offset {}: {:?}",
                        offset,
                        other
                    );
                    return Ok((false, monitors));
                }
            };

            let (Some(next_offset), Some(covered)) = (
                offset.checked_add(pagination.limit),
                pagination.offset.checked_add(pagination.limit),
            ) else {
                tracing::warn!(
                    "Pagination block overflows at offset {}: {:?}",
                    offset,
                    pagination
                );
                return Ok((false, monitors));
            };

            tracing::debug!(
                "Fetched {} monitors (offset={}, limit={}, total={})",
                page.monitors.len(),
                pagination.offset,
                pagination.limit,
                pagination.total
            );

            monitors.extend(page.monitors);
            offset = next_offset;

            if pagination.total <= covered {
                break;
            }
        }

        Ok((true, monitors))
    }
}

/// Best-effort description of a failed response body.
fn failure_message(content: &Value) -> String {
    content
        .pointer("/error/message")
        .and_then(Value::as_str)
        .map(str::to_string)
        .unwrap_or_else(|| content.to_string())
}
