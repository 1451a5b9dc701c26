//! Base64 data URLs: the representation of every image in the booth.
//!
//! An image travels through the workflow as `data:<mime>;base64,<payload>`.
//! The remote service only ever sees the payload (everything after the
//! first comma) and only ever returns bare payloads, which the booth
//! wraps back into a data URL with a GIF media type.

use std::fmt;
use std::str::FromStr;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;

/// Media type the booth assigns to payloads returned by the remote service.
pub const PIXEL_ART_MEDIA_TYPE: &str = "image/gif";

/// Errors that can occur while parsing or decoding a data URL.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DataUrlError {
    /// The string does not start with `data:`.
    #[error("not a data URL")]
    MissingScheme,

    /// No comma separates the header from the payload.
    #[error("data URL has no payload separator")]
    MissingSeparator,

    /// The header does not declare base64 encoding.
    #[error("data URL is not base64 encoded")]
    NotBase64,

    /// The payload is empty.
    #[error("data URL payload is empty")]
    EmptyPayload,

    /// The payload is not valid base64.
    #[error("invalid base64 payload: {0}")]
    InvalidBase64(String),
}

/// A non-empty base64 data URL.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DataUrl {
    media_type: String,
    payload: String,
}

impl DataUrl {
    /// Parse a `data:<mime>;base64,<payload>` string.
    ///
    /// # Errors
    ///
    /// Returns a [`DataUrlError`] if the scheme, separator, or base64
    /// marker is missing, or if the payload is empty. The payload
    /// itself is not decoded here.
    pub fn parse(s: &str) -> Result<Self, DataUrlError> {
        let rest = s.strip_prefix("data:").ok_or(DataUrlError::MissingScheme)?;
        let (header, payload) = rest
            .split_once(',')
            .ok_or(DataUrlError::MissingSeparator)?;
        let media_type = header
            .strip_suffix(";base64")
            .ok_or(DataUrlError::NotBase64)?;
        Self::from_payload(media_type, payload)
    }

    /// Wrap a bare base64 payload with the given media type.
    ///
    /// # Errors
    ///
    /// Returns [`DataUrlError::EmptyPayload`] if `payload` is empty.
    pub fn from_payload(media_type: &str, payload: &str) -> Result<Self, DataUrlError> {
        let payload = payload.trim();
        if payload.is_empty() {
            return Err(DataUrlError::EmptyPayload);
        }
        Ok(Self {
            media_type: media_type.to_owned(),
            payload: payload.to_owned(),
        })
    }

    /// Wrap a payload returned by the remote service.
    ///
    /// # Errors
    ///
    /// Returns [`DataUrlError::EmptyPayload`] if `payload` is empty.
    pub fn pixel_art(payload: &str) -> Result<Self, DataUrlError> {
        Self::from_payload(PIXEL_ART_MEDIA_TYPE, payload)
    }

    /// Base64-encode raw bytes into a data URL.
    ///
    /// # Errors
    ///
    /// Returns [`DataUrlError::EmptyPayload`] if `bytes` is empty.
    pub fn encode(media_type: &str, bytes: &[u8]) -> Result<Self, DataUrlError> {
        Self::from_payload(media_type, &STANDARD.encode(bytes))
    }

    /// The declared media type (may be empty).
    #[must_use]
    pub fn media_type(&self) -> &str {
        &self.media_type
    }

    /// The base64 payload, i.e. the data URL with its header stripped.
    #[must_use]
    pub fn payload(&self) -> &str {
        &self.payload
    }

    /// Decode the payload into raw bytes.
    ///
    /// # Errors
    ///
    /// Returns [`DataUrlError::InvalidBase64`] if the payload is not
    /// valid standard base64.
    pub fn decode(&self) -> Result<Vec<u8>, DataUrlError> {
        STANDARD
            .decode(self.payload.as_bytes())
            .map_err(|e| DataUrlError::InvalidBase64(e.to_string()))
    }
}

impl fmt::Display for DataUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "data:{};base64,{}", self.media_type, self.payload)
    }
}

impl FromStr for DataUrl {
    type Err = DataUrlError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Filename extensions accepted for upload, with their media types.
pub const IMAGE_EXTENSIONS: [(&str, &str); 6] = [
    ("png", "image/png"),
    ("jpg", "image/jpeg"),
    ("jpeg", "image/jpeg"),
    ("gif", "image/gif"),
    ("bmp", "image/bmp"),
    ("webp", "image/webp"),
];

/// Value for a file input's `accept` attribute, e.g. `.png,.jpg,...`.
#[must_use]
pub fn upload_accept() -> String {
    IMAGE_EXTENSIONS
        .iter()
        .map(|(ext, _)| format!(".{ext}"))
        .collect::<Vec<_>>()
        .join(",")
}

/// Guess an image media type from a filename extension.
///
/// Returns `None` for anything not listed in [`IMAGE_EXTENSIONS`].
#[must_use]
pub fn media_type_for_filename(name: &str) -> Option<&'static str> {
    let (_, ext) = name.rsplit_once('.')?;
    IMAGE_EXTENSIONS
        .iter()
        .find(|(known, _)| known.eq_ignore_ascii_case(ext))
        .map(|&(_, media_type)| media_type)
}
