//! Two-step remote conversion: detect and crop the face, then turn the
//! crop into pixel art.
//!
//! The second call consumes the first call's output, so the steps are
//! strictly sequential. Each step consumes the previous stage and
//! returns the next one, carrying every intermediate image:
//!
//! ```rust
//! # use pixelbooth_core::{Conversion, ConversionError, ConversionService, DataUrl};
//! # async fn run(service: &impl ConversionService, photo: DataUrl) -> Result<(), ConversionError> {
//! let converted = Conversion::new(photo)
//!     .detect(service)
//!     .await?
//!     .convert(service)
//!     .await?;
//!
//! let portrait = converted.pixel_face();
//! # let _ = portrait;
//! # Ok(())
//! # }
//! ```
//!
//! No timeout or retry is applied. A service that never answers leaves
//! the future pending.

use std::fmt;

use async_trait::async_trait;

use crate::data_url::{DataUrl, DataUrlError};
use crate::wire::{ConvertResponse, ImagePayload, PIXEL_FACE_INDEX};

/// Errors reported by a [`ConversionService`] implementation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ServiceError {
    /// The request never produced a response (network failure, DNS,
    /// connection reset).
    #[error("transport error: {0}")]
    Transport(String),

    /// The service answered with a non-success status code.
    #[error("service returned status {status}: {body}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Response body, as text.
        body: String,
    },

    /// The response body could not be parsed.
    #[error("malformed response: {0}")]
    Malformed(String),
}

/// The remote face-detection and pixel-art service.
///
/// Implemented by the browser fetch client and the native upstream
/// client. Futures are not required to be `Send` because the browser
/// implementation runs on a single-threaded event loop.
#[async_trait(?Send)]
pub trait ConversionService {
    /// Detect the face in `request.image` and return the cropped face.
    async fn detect_face(&self, request: &ImagePayload) -> Result<ImagePayload, ServiceError>;

    /// Convert a cropped face into pixel-art variants.
    async fn convert_face(&self, request: &ImagePayload)
    -> Result<ConvertResponse, ServiceError>;
}

/// Which remote step an outcome belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConversionStage {
    /// Face detection and cropping.
    Detect,
    /// Pixel-art conversion.
    Convert,
}

impl ConversionStage {
    /// Lowercase name for logs and messages.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Detect => "detect",
            Self::Convert => "convert",
        }
    }
}

impl fmt::Display for ConversionStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Errors produced while running a conversion.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConversionError {
    /// The service call for `stage` failed.
    #[error("{stage} request failed: {source}")]
    Service {
        /// Step that failed.
        stage: ConversionStage,
        /// Underlying service error.
        #[source]
        source: ServiceError,
    },

    /// The service returned an image that could not be wrapped.
    #[error("{stage} returned an unusable image: {source}")]
    InvalidImage {
        /// Step that returned the image.
        stage: ConversionStage,
        /// Why the image was rejected.
        #[source]
        source: DataUrlError,
    },

    /// The convert response had fewer variants than expected.
    #[error("convert returned {found} image variants, expected at least {expected}")]
    MissingVariant {
        /// Minimum number of variants required.
        expected: usize,
        /// Number of variants received.
        found: usize,
    },
}

impl ConversionError {
    /// The step this error belongs to.
    #[must_use]
    pub const fn stage(&self) -> ConversionStage {
        match self {
            Self::Service { stage, .. } | Self::InvalidImage { stage, .. } => *stage,
            Self::MissingVariant { .. } => ConversionStage::Convert,
        }
    }
}

/// Entry point for the typestate conversion pipeline.
pub struct Conversion;

impl Conversion {
    /// Start a conversion of `source`.
    ///
    /// Nothing is sent until [`Pending::detect`] is awaited.
    pub const fn new(source: DataUrl) -> Pending {
        Pending { source }
    }
}

// ───────────────────────── Stage 0: Pending ──────────────────────────

/// A conversion that has not contacted the service yet.
#[must_use = "conversion stages are consumed by advancing; call .detect() to continue"]
#[derive(Debug, Clone)]
pub struct Pending {
    source: DataUrl,
}

impl Pending {
    /// The image that will be sent for detection.
    #[must_use]
    pub const fn source(&self) -> &DataUrl {
        &self.source
    }

    /// Send the source to the detect endpoint and advance to [`Detected`].
    ///
    /// # Errors
    ///
    /// Returns [`ConversionError::Service`] if the call fails and
    /// [`ConversionError::InvalidImage`] if the response carries an
    /// empty image.
    pub async fn detect<S>(self, service: &S) -> Result<Detected, ConversionError>
    where
        S: ConversionService + ?Sized,
    {
        let stage = ConversionStage::Detect;
        tracing::info!(bytes = self.source.payload().len(), "requesting face detection");

        let request = ImagePayload::new(self.source.payload());
        let response = service
            .detect_face(&request)
            .await
            .map_err(|source| ConversionError::Service { stage, source })?;
        let cropped = DataUrl::pixel_art(&response.image)
            .map_err(|source| ConversionError::InvalidImage { stage, source })?;

        Ok(Detected {
            source: self.source,
            cropped,
        })
    }
}

// ───────────────────────── Stage 1: Detected ─────────────────────────

/// A conversion whose face has been detected and cropped.
#[must_use = "conversion stages are consumed by advancing; call .convert() to continue"]
#[derive(Debug, Clone)]
pub struct Detected {
    source: DataUrl,
    cropped: DataUrl,
}

impl Detected {
    /// The image that was sent for detection.
    #[must_use]
    pub const fn source(&self) -> &DataUrl {
        &self.source
    }

    /// The cropped face returned by the detect endpoint.
    #[must_use]
    pub const fn cropped_face(&self) -> &DataUrl {
        &self.cropped
    }

    /// Send the cropped face to the convert endpoint and advance to
    /// [`Converted`].
    ///
    /// # Errors
    ///
    /// Returns [`ConversionError::Service`] if the call fails,
    /// [`ConversionError::MissingVariant`] if fewer than three variants
    /// come back, and [`ConversionError::InvalidImage`] if the displayed
    /// variant is empty or missing its image. The alternates are not
    /// validated; unusable ones are kept as `None`.
    pub async fn convert<S>(self, service: &S) -> Result<Converted, ConversionError>
    where
        S: ConversionService + ?Sized,
    {
        let stage = ConversionStage::Convert;
        tracing::info!("requesting pixel-art conversion");

        let request = ImagePayload::new(self.cropped.payload());
        let response = service
            .convert_face(&request)
            .await
            .map_err(|source| ConversionError::Service { stage, source })?;

        if response.images.len() <= PIXEL_FACE_INDEX {
            return Err(ConversionError::MissingVariant {
                expected: PIXEL_FACE_INDEX + 1,
                found: response.images.len(),
            });
        }

        let pixel_face = response.images[PIXEL_FACE_INDEX]
            .image()
            .map_or(Err(DataUrlError::EmptyPayload), DataUrl::pixel_art)
            .map_err(|source| ConversionError::InvalidImage { stage, source })?;

        let variants = response
            .images
            .iter()
            .map(|variant| variant.image().and_then(|image| DataUrl::pixel_art(image).ok()))
            .collect();

        Ok(Converted {
            source: self.source,
            cropped: self.cropped,
            pixel_face,
            variants,
        })
    }
}

// ───────────────────────── Stage 2: Converted ────────────────────────

/// A finished conversion.
#[must_use = "call .into_result() or read .pixel_face()"]
#[derive(Debug, Clone)]
pub struct Converted {
    source: DataUrl,
    cropped: DataUrl,
    pixel_face: DataUrl,
    variants: Vec<Option<DataUrl>>,
}

impl Converted {
    /// The cropped face from the detect step.
    #[must_use]
    pub const fn cropped_face(&self) -> &DataUrl {
        &self.cropped
    }

    /// Every variant returned by the convert step, in service order.
    ///
    /// Entries without a usable image are `None`.
    #[must_use]
    pub fn variants(&self) -> &[Option<DataUrl>] {
        &self.variants
    }

    /// The variant the booth displays.
    #[must_use]
    pub const fn pixel_face(&self) -> &DataUrl {
        &self.pixel_face
    }

    /// Consume the stage and return every intermediate.
    pub fn into_result(self) -> ConversionResult {
        ConversionResult {
            source: self.source,
            cropped_face: self.cropped,
            pixel_face: self.pixel_face,
            variants: self.variants,
        }
    }
}

/// Every image produced by one conversion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversionResult {
    /// What was sent to detection.
    pub source: DataUrl,
    /// Cropped face from the detect step.
    pub cropped_face: DataUrl,
    /// The variant the booth displays.
    pub pixel_face: DataUrl,
    /// All convert variants, in service order. `None` where the service
    /// returned no usable image.
    pub variants: Vec<Option<DataUrl>>,
}

#[cfg(test)]
pub(crate) mod testing {
    //! Scripted service used by the workflow and conversion tests.

    use std::cell::RefCell;

    use super::*;
    use crate::wire::ConvertedVariant;

    /// Replays fixed responses and records every request it receives.
    pub struct ScriptedService {
        pub detect: Result<ImagePayload, ServiceError>,
        pub convert: Result<ConvertResponse, ServiceError>,
        pub calls: RefCell<Vec<(ConversionStage, String)>>,
    }

    impl ScriptedService {
        pub fn new(detect: &str, convert: &[&str]) -> Self {
            Self {
                detect: Ok(ImagePayload::new(detect)),
                convert: Ok(ConvertResponse {
                    images: convert
                        .iter()
                        .map(|s| ConvertedVariant::Bare((*s).to_owned()))
                        .collect(),
                }),
                calls: RefCell::new(Vec::new()),
            }
        }

        pub fn failing_detect(error: ServiceError) -> Self {
            Self {
                detect: Err(error),
                ..Self::new("unused", &["a", "b", "c"])
            }
        }

        pub fn failing_convert(detect: &str, error: ServiceError) -> Self {
            Self {
                convert: Err(error),
                ..Self::new(detect, &[])
            }
        }
    }

    #[async_trait(?Send)]
    impl ConversionService for ScriptedService {
        async fn detect_face(
            &self,
            request: &ImagePayload,
        ) -> Result<ImagePayload, ServiceError> {
            self.calls
                .borrow_mut()
                .push((ConversionStage::Detect, request.image.clone()));
            self.detect.clone()
        }

        async fn convert_face(
            &self,
            request: &ImagePayload,
        ) -> Result<ConvertResponse, ServiceError> {
            self.calls
                .borrow_mut()
                .push((ConversionStage::Convert, request.image.clone()));
            self.convert.clone()
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::testing::ScriptedService;
    use super::*;

    fn photo() -> DataUrl {
        DataUrl::parse("data:image/png;base64,UEhPVE8=").unwrap()
    }

    #[tokio::test]
    async fn detect_sends_payload_without_header() {
        let service = ScriptedService::new("AAA", &["x", "y", "BBB"]);
        let detected = Conversion::new(photo()).detect(&service).await.unwrap();

        assert_eq!(
            service.calls.borrow().as_slice(),
            [(ConversionStage::Detect, "UEhPVE8=".to_owned())]
        );
        assert_eq!(
            detected.cropped_face().to_string(),
            "data:image/gif;base64,AAA"
        );
    }

    #[tokio::test]
    async fn convert_feeds_the_cropped_face_forward() {
        let service = ScriptedService::new("AAA", &["x", "y", "BBB"]);
        let converted = Conversion::new(photo())
            .detect(&service)
            .await
            .unwrap()
            .convert(&service)
            .await
            .unwrap();

        let calls = service.calls.borrow();
        assert_eq!(calls[1], (ConversionStage::Convert, "AAA".to_owned()));
        assert_eq!(converted.pixel_face().payload(), "BBB");
        assert_eq!(converted.variants().len(), 3);
        assert_eq!(converted.cropped_face().payload(), "AAA");
    }

    #[tokio::test]
    async fn alternate_variants_are_retained() {
        let service = ScriptedService::new("AAA", &["x", "y", "BBB"]);
        let result = Conversion::new(photo())
            .detect(&service)
            .await
            .unwrap()
            .convert(&service)
            .await
            .unwrap()
            .into_result();

        let payloads: Vec<Option<&str>> = result
            .variants
            .iter()
            .map(|variant| variant.as_ref().map(DataUrl::payload))
            .collect();
        assert_eq!(payloads, [Some("x"), Some("y"), Some("BBB")]);
        assert_eq!(result.pixel_face.payload(), "BBB");
        assert_eq!(result.source, photo());
    }

    #[tokio::test]
    async fn empty_alternate_does_not_fail_conversion() {
        let service = ScriptedService::new("AAA", &["", "y", "BBB"]);
        let converted = Conversion::new(photo())
            .detect(&service)
            .await
            .unwrap()
            .convert(&service)
            .await
            .unwrap();

        assert_eq!(converted.pixel_face().payload(), "BBB");
        assert!(converted.variants()[0].is_none());
        assert_eq!(converted.variants()[1].as_ref().map(DataUrl::payload), Some("y"));
    }

    #[tokio::test]
    async fn opaque_alternates_do_not_fail_conversion() {
        let mut service = ScriptedService::new("AAA", &[]);
        service.convert = Ok(serde_json::from_str(
            r#"{"images":[null,{"url":"u"},{"image":"BBB"}]}"#,
        )
        .unwrap());
        let result = Conversion::new(photo())
            .detect(&service)
            .await
            .unwrap()
            .convert(&service)
            .await
            .unwrap()
            .into_result();

        assert_eq!(result.pixel_face.payload(), "BBB");
        assert_eq!(result.variants.len(), 3);
        assert!(result.variants[0].is_none());
        assert!(result.variants[1].is_none());
    }

    #[tokio::test]
    async fn empty_pixel_face_is_rejected() {
        let service = ScriptedService::new("AAA", &["x", "y", ""]);
        let err = Conversion::new(photo())
            .detect(&service)
            .await
            .unwrap()
            .convert(&service)
            .await
            .unwrap_err();
        assert_eq!(
            err,
            ConversionError::InvalidImage {
                stage: ConversionStage::Convert,
                source: DataUrlError::EmptyPayload,
            }
        );
    }

    #[tokio::test]
    async fn detect_failure_is_reported_with_stage() {
        let service = ScriptedService::failing_detect(ServiceError::Status {
            status: 500,
            body: "boom".into(),
        });
        let err = Conversion::new(photo()).detect(&service).await.unwrap_err();

        assert_eq!(err.stage(), ConversionStage::Detect);
        assert!(matches!(err, ConversionError::Service { .. }));
        assert!(err.to_string().contains("500"));
    }

    #[tokio::test]
    async fn empty_cropped_face_is_rejected() {
        let service = ScriptedService::new("", &["x", "y", "BBB"]);
        let err = Conversion::new(photo()).detect(&service).await.unwrap_err();
        assert_eq!(
            err,
            ConversionError::InvalidImage {
                stage: ConversionStage::Detect,
                source: DataUrlError::EmptyPayload,
            }
        );
    }

    #[tokio::test]
    async fn short_convert_response_is_rejected() {
        let service = ScriptedService::new("AAA", &["x", "y"]);
        let err = Conversion::new(photo())
            .detect(&service)
            .await
            .unwrap()
            .convert(&service)
            .await
            .unwrap_err();
        assert_eq!(
            err,
            ConversionError::MissingVariant {
                expected: 3,
                found: 2
            }
        );
        assert_eq!(err.stage(), ConversionStage::Convert);
    }
}
