//! pixelbooth-core: the booth workflow without any I/O.
//!
//! A photo moves through
//! ready -> selected -> detecting -> converting -> complete:
//! capture or upload, face detection and cropping, pixel-art conversion,
//! and display composited over a decorative background.
//!
//! This crate has **no browser or network dependencies**. Remote calls go
//! through the [`ConversionService`] trait, and compositing renders into
//! in-memory rasters. Browser and HTTP plumbing lives in `pixelbooth-io`
//! and `pixelbooth-proxy`.

pub mod background;
pub mod compose;
pub mod conversion;
pub mod data_url;
pub mod layout;
pub mod types;
pub mod wire;
pub mod workflow;

pub use compose::{ComposeError, Compositor};
pub use conversion::{
    Conversion, ConversionError, ConversionResult, ConversionService, ConversionStage, Converted,
    Detected, Pending, ServiceError,
};
pub use data_url::{DataUrl, DataUrlError};
pub use layout::{Controls, FaceLayout, SceneView};
pub use types::{
    BoothConfig, BoothVariant, DEFAULT_VIEWPORT, Dimensions, RgbaImage, UnknownVariant,
};
pub use wire::{ConvertResponse, ConvertedVariant, ImagePayload};
pub use workflow::{Action, Booth, BoothError, WorkflowState};
