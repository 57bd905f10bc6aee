//! Mandelbridge
//!
//! A small bridge between a Mandelbrot parameter form and a remote image
//! generator: read four text fields, POST them as JSON, and show the returned
//! base64 PNG as a data URI on an image element.
//!
//! # Features
//!
//! - **Injected page surface**: the form, image and console sit behind the
//!   [`View`] trait; [`MemoryDocument`] is an in-memory page
//! - **Swappable transport**: [`Transport`] with a blocking reqwest backend
//!   (feature `http`, default)
//! - **Unified failures**: transport and non-OK responses both come back as
//!   [`Error`] and are reported on the console
//!
//! # Example
//!
//! ```no_run
//! use mandelbridge::{Bridge, BridgeConfig, FormFields, MemoryDocument, View};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let page = MemoryDocument::with_fields(
//!     Default::default(),
//!     &FormFields::new("-0.5", "0", "0", "256"),
//! );
//! let bridge = Bridge::with_http(BridgeConfig::default(), page)?;
//! bridge.click()?;
//! println!("{:?}", bridge.view().image_source());
//! # Ok(())
//! # }
//! ```

use std::collections::HashMap;

pub mod error;
pub use error::{Error, FailureKind, Result};

pub mod data_uri;
pub mod request;
pub mod transport;
pub mod view;

pub mod bridge;

// Background-task wrapper for overlapping clicks
pub mod async_api;

pub use async_api::AsyncBridge;
pub use bridge::{Bridge, Outcome, ResponseOrdering, Submission};
pub use data_uri::DataUriStyle;
pub use request::FormFields;
#[cfg(feature = "http")]
pub use transport::HttpTransport;
pub use transport::{HttpResponse, Transport};
pub use view::{ConsoleMessage, ElementIds, MemoryDocument, View};

/// Endpoint served by the generator when run locally
pub const DEFAULT_ENDPOINT: &str = "http://127.0.0.1:5000/calculate";

/// Configuration for a [`Bridge`]
///
/// Defaults reproduce the behavior of the page the generator ships with:
/// - requests go to [`DEFAULT_ENDPOINT`] with no timeout
/// - the data URI keeps the space after the comma
/// - the last response to arrive wins
///
/// # Examples
///
/// ```
/// let cfg = mandelbridge::BridgeConfig::default();
/// assert!(cfg.endpoint.ends_with("/calculate"));
/// ```
#[derive(Debug, Clone)]
pub struct BridgeConfig {
    /// URL the form is POSTed to
    pub endpoint: String,
    /// User agent string to send with requests
    pub user_agent: String,
    /// Request timeout in milliseconds (0 => no timeout)
    pub timeout_ms: u64,
    /// Extra HTTP headers sent with every request
    pub headers: HashMap<String, String>,
    /// Prefix flavor of the generated data URI
    pub uri_style: DataUriStyle,
    /// Which response wins when submissions overlap
    pub ordering: ResponseOrdering,
    /// Identifiers of the page elements
    pub element_ids: ElementIds,
    /// Echo the `real` field to the console on every click
    pub echo_real_on_click: bool,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            user_agent: concat!("mandelbridge/", env!("CARGO_PKG_VERSION")).to_string(),
            timeout_ms: 0,
            headers: HashMap::new(),
            uri_style: DataUriStyle::default(),
            ordering: ResponseOrdering::default(),
            element_ids: ElementIds::default(),
            echo_real_on_click: true,
        }
    }
}

impl BridgeConfig {
    /// Check that the endpoint is an absolute http(s) URL.
    pub fn validate(&self) -> Result<()> {
        #[cfg(feature = "http")]
        {
            let url = url::Url::parse(&self.endpoint)
                .map_err(|e| Error::Config(format!("Invalid endpoint {:?}: {}", self.endpoint, e)))?;
            if !matches!(url.scheme(), "http" | "https") {
                return Err(Error::Config(format!(
                    "Unsupported endpoint scheme: {}",
                    url.scheme()
                )));
            }
        }

        #[cfg(not(feature = "http"))]
        {
            if self.endpoint.trim().is_empty() {
                return Err(Error::Config("Endpoint is empty".into()));
            }
        }

        Ok(())
    }
}
