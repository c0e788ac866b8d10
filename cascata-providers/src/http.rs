//! Thin `reqwest` wrapper shared by every HTTP connector.

use std::time::Duration;

use cascata_core::{CascataError, Decimal};
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use url::Url;

const USER_AGENT: &str = concat!("cascata/", env!("CARGO_PKG_VERSION"));

/// Transport ceiling; the orchestrator's per-provider timeout is normally tighter.
const TRANSPORT_TIMEOUT: Duration = Duration::from_secs(30);

/// One client per connector, rooted at a base URL that tests can override.
#[derive(Debug, Clone)]
pub struct HttpClient {
    provider: &'static str,
    base: String,
    client: Client,
}

impl HttpClient {
    /// Client for `provider` rooted at `base` (scheme and host, optionally a path prefix).
    #[must_use]
    pub fn new(provider: &'static str, base: impl Into<String>) -> Self {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(TRANSPORT_TIMEOUT)
            .build()
            .unwrap_or_default();
        Self {
            provider,
            base: base.into().trim_end_matches('/').to_string(),
            client,
        }
    }

    /// Base URL without a trailing slash.
    #[must_use]
    pub fn base(&self) -> &str {
        &self.base
    }

    fn url(&self, path: &str, query: &[(&str, &str)]) -> Result<Url, CascataError> {
        let raw = format!("{}{path}", self.base);
        let mut url = Url::parse(&raw).map_err(|e| {
            CascataError::InvalidArg(format!("{}: invalid url {raw}: {e}", self.provider))
        })?;
        if !query.is_empty() {
            url.query_pairs_mut().extend_pairs(query);
        }
        Ok(url)
    }

    /// GET `path` and return the body of a 2xx response.
    ///
    /// # Errors
    /// Transport failures, HTTP 429, 5xx, and any other non-2xx status map to
    /// `ProviderUnavailable`.
    pub async fn get_text(&self, path: &str, query: &[(&str, &str)]) -> Result<String, CascataError> {
        let url = self.url(path, query)?;
        tracing::debug!(provider = self.provider, path, "GET");
        let resp = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| CascataError::unavailable(self.provider, e.without_url().to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(self.status_error(status, &body));
        }
        resp.text().await.map_err(|e| {
            CascataError::unavailable(self.provider, format!("reading body: {}", e.without_url()))
        })
    }

    /// GET `path` and decode a JSON body.
    ///
    /// # Errors
    /// As [`HttpClient::get_text`], plus `ProviderInvalidResponse` when the
    /// body does not decode as `T`.
    pub async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<T, CascataError> {
        let body = self.get_text(path, query).await?;
        serde_json::from_str(&body)
            .map_err(|e| CascataError::invalid_response(self.provider, format!("undecodable body: {e}")))
    }

    fn status_error(&self, status: StatusCode, body: &str) -> CascataError {
        let code = status.as_u16();
        if status == StatusCode::TOO_MANY_REQUESTS {
            return CascataError::unavailable(self.provider, "rate limited (HTTP 429)");
        }
        if status.is_server_error() {
            return CascataError::unavailable(self.provider, format!("upstream error (HTTP {code})"));
        }
        let snippet: String = body.trim().chars().take(160).collect();
        CascataError::unavailable(self.provider, format!("HTTP {code}: {snippet}"))
    }
}

/// Finite float to decimal; `None` for NaN and infinities.
pub(crate) fn dec_f64(v: f64) -> Option<Decimal> {
    Decimal::try_from(v).ok()
}

/// Decimal from a vendor string, tolerating whitespace and a trailing `%`.
pub(crate) fn dec_str(s: &str) -> Option<Decimal> {
    s.trim().trim_end_matches('%').trim().parse().ok()
}
