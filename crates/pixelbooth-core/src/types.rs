//! Shared types for the pixelbooth workflow.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Re-export `RgbaImage` so downstream crates can pass decoded face and
/// background rasters around without depending on `image` directly.
pub use image::RgbaImage;

/// Default side length of the square booth viewport, in CSS pixels.
pub const DEFAULT_VIEWPORT: u32 = 256;

/// Default proxy route prefix the browser client posts to.
pub const DEFAULT_ENDPOINT: &str = "/api/pixelme";

/// Request body ceiling enforced by the proxy for the passport booth.
pub const PASSPORT_BODY_LIMIT: usize = 5 * 1024 * 1024;

/// Image dimensions in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dimensions {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl Dimensions {
    /// Create a new dimension pair.
    #[must_use]
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Width divided by height, or `None` for a zero-height image.
    #[must_use]
    pub fn aspect_ratio(self) -> Option<f64> {
        if self.height == 0 {
            None
        } else {
            Some(f64::from(self.width) / f64::from(self.height))
        }
    }
}

/// Which flavour of the booth is running.
///
/// Both variants share the same state machine. They differ only in how
/// the viewport is drawn and how large a request the proxy accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BoothVariant {
    /// Full booth: shows the raw capture before conversion, clips the
    /// composite to a circle, and bottom-aligns the finished portrait.
    #[default]
    Passport,
    /// Minimal booth: no separate preview of the raw capture, no clip,
    /// and a slightly larger centered portrait.
    Sing,
}

impl BoothVariant {
    /// Fraction of the viewport the finished portrait occupies.
    #[must_use]
    pub const fn complete_scale(self) -> f64 {
        match self {
            Self::Passport => 0.85,
            Self::Sing => 0.9,
        }
    }

    /// Whether the composite is clipped to a circle.
    #[must_use]
    pub const fn clips_to_circle(self) -> bool {
        matches!(self, Self::Passport)
    }

    /// Whether the `selected` state shows the raw capture on its own
    /// (no background, no clip).
    #[must_use]
    pub const fn previews_selection(self) -> bool {
        matches!(self, Self::Passport)
    }

    /// Request body ceiling the proxy should enforce, or `None` for
    /// unlimited.
    #[must_use]
    pub const fn body_limit(self) -> Option<usize> {
        match self {
            Self::Passport => Some(PASSPORT_BODY_LIMIT),
            Self::Sing => None,
        }
    }

    /// Lowercase name, matching the serde representation.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Passport => "passport",
            Self::Sing => "sing",
        }
    }
}

impl fmt::Display for BoothVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// An unrecognized booth variant name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown booth variant {0:?}, expected \"passport\" or \"sing\"")]
pub struct UnknownVariant(pub String);

impl FromStr for BoothVariant {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "passport" => Ok(Self::Passport),
            "sing" => Ok(Self::Sing),
            _ => Err(UnknownVariant(s.to_owned())),
        }
    }
}

/// Configuration for one booth instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BoothConfig {
    /// Side length of the square viewport in pixels.
    pub viewport: u32,
    /// Which booth flavour to run.
    pub variant: BoothVariant,
    /// Route prefix of the proxy; `detect` and `convert` are appended.
    pub endpoint: String,
}

impl Default for BoothConfig {
    fn default() -> Self {
        Self {
            viewport: DEFAULT_VIEWPORT,
            variant: BoothVariant::default(),
            endpoint: DEFAULT_ENDPOINT.to_owned(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn aspect_ratio_of_zero_height_is_none() {
        assert_eq!(Dimensions::new(10, 0).aspect_ratio(), None);
        assert_eq!(Dimensions::new(200, 100).aspect_ratio(), Some(2.0));
    }

    #[test]
    fn variants_differ_only_in_presentation() {
        assert!(BoothVariant::Passport.clips_to_circle());
        assert!(!BoothVariant::Sing.clips_to_circle());
        assert!(BoothVariant::Passport.previews_selection());
        assert!(!BoothVariant::Sing.previews_selection());
        assert_eq!(BoothVariant::Passport.body_limit(), Some(5 * 1024 * 1024));
        assert_eq!(BoothVariant::Sing.body_limit(), None);
    }

    #[test]
    fn variant_names_round_trip_through_from_str() {
        for variant in [BoothVariant::Passport, BoothVariant::Sing] {
            assert_eq!(variant.name().parse::<BoothVariant>().unwrap(), variant);
        }
        assert_eq!("  Sing ".parse::<BoothVariant>().unwrap(), BoothVariant::Sing);
        assert!("omnidrive".parse::<BoothVariant>().is_err());
    }

    #[test]
    fn config_deserializes_with_defaults() {
        let config: BoothConfig = serde_json::from_str(r#"{"variant":"sing"}"#).unwrap();
        assert_eq!(config.variant, BoothVariant::Sing);
        assert_eq!(config.viewport, DEFAULT_VIEWPORT);
        assert_eq!(config.endpoint, DEFAULT_ENDPOINT);
    }
}
