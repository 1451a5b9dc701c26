//! JSON bodies exchanged with the face-detection and pixel-art service.
//!
//! These types are shared by the browser client, the proxy, and the
//! upstream client so all three agree on the wire format.

use serde::{Deserialize, Serialize};

/// Index of the convert variant the booth displays.
pub const PIXEL_FACE_INDEX: usize = 2;

/// `{ "image": "<base64>" }`: the detect/convert request body and the
/// detect response body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImagePayload {
    /// Base64 image data without a data-URL header.
    pub image: String,
}

impl ImagePayload {
    /// Build a payload from a base64 string.
    #[must_use]
    pub fn new(image: impl Into<String>) -> Self {
        Self {
            image: image.into(),
        }
    }
}

/// One entry of the convert response.
///
/// The service returns `{ "image": ... }` objects; bare strings are
/// accepted as well. Anything else is kept as-is so that an odd
/// alternate never fails the whole response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ConvertedVariant {
    /// `{ "image": "<base64>" }`
    Object(ImagePayload),
    /// `"<base64>"`
    Bare(String),
    /// Any other JSON value, including `null`.
    Other(serde_json::Value),
}

impl ConvertedVariant {
    /// The base64 payload of this variant, if it carries one.
    #[must_use]
    pub fn image(&self) -> Option<&str> {
        match self {
            Self::Object(payload) => Some(&payload.image),
            Self::Bare(image) => Some(image),
            Self::Other(_) => None,
        }
    }
}

/// `{ "images": [...] }`: the convert response body.
///
/// The service returns three ordered variants. Only
/// [`PIXEL_FACE_INDEX`] is displayed; the first two have no documented
/// meaning and are kept as opaque alternates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConvertResponse {
    /// Ordered image variants.
    pub images: Vec<ConvertedVariant>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn convert_response_accepts_objects_and_bare_strings() {
        let json = r#"{"images":[{"image":"x"},"y",{"image":"BBB"}]}"#;
        let resp: ConvertResponse = serde_json::from_str(json).unwrap();
        let images: Vec<Option<&str>> = resp.images.iter().map(ConvertedVariant::image).collect();
        assert_eq!(images, [Some("x"), Some("y"), Some("BBB")]);
    }

    #[test]
    fn unrecognised_alternates_are_kept_opaque() {
        let json = r#"{"images":[null,{"url":"u"},{"image":"BBB"}]}"#;
        let resp: ConvertResponse = serde_json::from_str(json).unwrap();
        assert_eq!(resp.images[0], ConvertedVariant::Other(serde_json::Value::Null));
        assert!(matches!(resp.images[1], ConvertedVariant::Other(_)));
        assert_eq!(resp.images[1].image(), None);
        assert_eq!(resp.images[2].image(), Some("BBB"));
    }

    #[test]
    fn image_payload_serializes_as_single_field() {
        let json = serde_json::to_string(&ImagePayload::new("AAA")).unwrap();
        assert_eq!(json, r#"{"image":"AAA"}"#);
    }

    #[test]
    fn unknown_fields_are_ignored() {
        let resp: ImagePayload =
            serde_json::from_str(r#"{"image":"AAA","box":[1,2,3,4]}"#).unwrap();
        assert_eq!(resp.image, "AAA");
    }
}
