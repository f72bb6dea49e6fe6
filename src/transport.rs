//! Outbound HTTP for submitted test messages.

use serde_json::Value;

use crate::error::SubmitError;

#[cfg(feature = "remote")]
use std::time::Duration;

/// Default timeout for HTTP requests (10 seconds).
#[cfg(feature = "remote")]
const HTTP_TIMEOUT: Duration = Duration::from_secs(10);

/// Status and unparsed body of a completed HTTP exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportResponse {
    pub status: u16,
    pub body: String,
}

impl TransportResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Sends one JSON POST. Implementations do not interpret the response.
pub trait Transport {
    fn post_json(&self, url: &str, body: &Value) -> Result<TransportResponse, SubmitError>;
}

/// Check if a string looks like a URL (starts with http:// or https://).
#[cfg(feature = "remote")]
pub fn is_url(s: &str) -> bool {
    s.starts_with("http://") || s.starts_with("https://")
}

/// Resolve an endpoint against a base URL.
///
/// Absolute URLs are returned unchanged. Everything else follows RFC 3986
/// reference resolution: `/asyncapi/try` replaces the base path, so
/// `http://host/api` gives `http://host/asyncapi/try`, while a path without
/// a leading slash is resolved relative to the base's last `/`.
#[cfg(feature = "remote")]
pub fn join_url(base: Option<&str>, url: &str) -> Result<String, SubmitError> {
    if is_url(url) {
        return Ok(url.to_string());
    }
    let Some(base) = base else {
        return Err(SubmitError::InvalidUrl {
            url: url.to_string(),
        });
    };
    reqwest::Url::parse(base)
        .and_then(|base| base.join(url))
        .map(String::from)
        .map_err(|_| SubmitError::InvalidUrl {
            url: format!("{} (base {})", url, base),
        })
}

/// Blocking reqwest transport.
///
/// Requires the `remote` feature (enabled by default).
#[cfg(feature = "remote")]
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::blocking::Client,
    base_url: Option<String>,
}

#[cfg(feature = "remote")]
impl HttpTransport {
    /// Build a transport; `base_url` resolves origin-relative endpoints.
    ///
    /// # Errors
    ///
    /// Returns `SubmitError::Network` if the HTTP client can't be built.
    pub fn new(base_url: Option<String>) -> Result<Self, SubmitError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(HTTP_TIMEOUT)
            .build()
            .map_err(|source| SubmitError::Network {
                url: base_url.clone().unwrap_or_default(),
                source,
            })?;
        Ok(Self { client, base_url })
    }
}

#[cfg(feature = "remote")]
impl Transport for HttpTransport {
    fn post_json(&self, url: &str, body: &Value) -> Result<TransportResponse, SubmitError> {
        let target = join_url(self.base_url.as_deref(), url)?;
        tracing::debug!(url = %target, "posting test message");

        let response = self
            .client
            .post(&target)
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .body(body.to_string())
            .send()
            .map_err(|source| SubmitError::Network {
                url: target.clone(),
                source,
            })?;

        let status = response.status().as_u16();
        let body = response.text().map_err(|source| SubmitError::Network {
            url: target.clone(),
            source,
        })?;

        Ok(TransportResponse { status, body })
    }
}
