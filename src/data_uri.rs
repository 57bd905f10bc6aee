//! Building the image `src` from the server payload.

use base64::Engine as _;

/// MIME prefix shared by both URI styles.
const PNG_PREFIX: &str = "data:image/png;base64,";

/// How the data URI prefix is written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DataUriStyle {
    /// `data:image/png;base64, ` with a space after the comma, byte-for-byte
    /// what the existing page produces.
    #[default]
    Compatible,
    /// `data:image/png;base64,` with no separator.
    Standard,
}

impl DataUriStyle {
    pub fn prefix(self) -> &'static str {
        match self {
            DataUriStyle::Compatible => "data:image/png;base64, ",
            DataUriStyle::Standard => PNG_PREFIX,
        }
    }
}

/// Concatenate the prefix and the response body. The body is used as-is.
pub fn png_data_uri(body: &str, style: DataUriStyle) -> String {
    let prefix = style.prefix();
    let mut uri = String::with_capacity(prefix.len() + body.len());
    uri.push_str(prefix);
    uri.push_str(body);
    uri
}

/// Extract the raw PNG bytes from a payload or a data URI.
///
/// The generator emits MIME-style base64 (line breaks every 76 columns), so
/// all ASCII whitespace is dropped before decoding.
pub fn decode_payload(payload: &str) -> crate::Result<Vec<u8>> {
    let body = payload.strip_prefix(PNG_PREFIX).unwrap_or(payload);
    let compact: String = body.chars().filter(|c| !c.is_ascii_whitespace()).collect();
    if compact.is_empty() {
        return Err(crate::Error::Payload("empty payload".into()));
    }
    Ok(base64::engine::general_purpose::STANDARD.decode(compact)?)
}
