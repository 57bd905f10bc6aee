//! The request record sent to the image generator.

use serde::Serialize;

/// Raw contents of the four input fields, captured at click time.
///
/// Values are kept exactly as typed: no trimming, no numeric parsing. The
/// server is the only party that interprets them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FormFields {
    pub real: String,
    pub imaginary: String,
    pub zoom: String,
    pub iterations: String,
}

impl FormFields {
    pub fn new(
        real: impl Into<String>,
        imaginary: impl Into<String>,
        zoom: impl Into<String>,
        iterations: impl Into<String>,
    ) -> Self {
        Self {
            real: real.into(),
            imaginary: imaginary.into(),
            zoom: zoom.into(),
            iterations: iterations.into(),
        }
    }

    /// Serialize to the JSON body expected by the `/calculate` endpoint.
    pub fn to_json(&self) -> crate::Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}
