//! HTTP seam between the bridge and the image generator.

use crate::Result;
#[cfg(feature = "http")]
use crate::{BridgeConfig, Error};
#[cfg(feature = "http")]
use reqwest::blocking::Client;
#[cfg(feature = "http")]
use std::time::Duration;

/// Status and text body of an HTTP exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn ok(body: impl Into<String>) -> Self {
        Self {
            status: 200,
            body: body.into(),
        }
    }

    /// True for any 2xx status.
    pub fn is_ok(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Something that can POST a JSON body and hand back the response.
///
/// Implementations return `Error::Transport` when no HTTP response was
/// obtained at all. Any response, whatever its status, is `Ok`.
pub trait Transport: Send + Sync {
    fn post_json(&self, url: &str, body: String) -> Result<HttpResponse>;
}

/// Blocking reqwest-backed transport.
#[cfg(feature = "http")]
pub struct HttpTransport {
    client: Client,
}

#[cfg(feature = "http")]
impl HttpTransport {
    pub fn new(config: &BridgeConfig) -> Result<Self> {
        let mut headers = reqwest::header::HeaderMap::new();
        for (k, v) in &config.headers {
            let name = reqwest::header::HeaderName::from_bytes(k.as_bytes())
                .map_err(|e| Error::Config(format!("Invalid header name {:?}: {}", k, e)))?;
            let value = reqwest::header::HeaderValue::from_str(v)
                .map_err(|e| Error::Config(format!("Invalid header value for {:?}: {}", k, e)))?;
            headers.insert(name, value);
        }

        // The blocking client applies a 30s timeout unless told otherwise
        let client = Client::builder()
            .user_agent(config.user_agent.clone())
            .default_headers(headers)
            .timeout(request_timeout(config))
            .build()
            .map_err(|e| Error::Config(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self { client })
    }
}

/// Per-request timeout; `None` disables it entirely.
#[cfg(feature = "http")]
pub fn request_timeout(config: &BridgeConfig) -> Option<Duration> {
    if config.timeout_ms > 0 {
        Some(Duration::from_millis(config.timeout_ms))
    } else {
        None
    }
}

#[cfg(feature = "http")]
impl Transport for HttpTransport {
    fn post_json(&self, url: &str, body: String) -> Result<HttpResponse> {
        log::debug!("POST {} ({} bytes)", url, body.len());
        let res = self
            .client
            .post(url)
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .body(body)
            .send()
            .map_err(|e| Error::Transport(e.to_string()))?;

        let status = res.status();
        let body = match res.text() {
            Ok(text) => text,
            Err(e) if status.is_success() => return Err(Error::Body(e.to_string())),
            Err(e) => {
                log::warn!("Discarding unreadable body of {} response: {}", status, e);
                String::new()
            }
        };

        Ok(HttpResponse {
            status: status.as_u16(),
            body,
        })
    }
}
