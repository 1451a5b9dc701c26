//! pixelbooth-io: Browser I/O and Dioxus component library.
//!
//! Handles webcam capture, file uploads, calls to the conversion proxy,
//! Blob URL display and downloads, and provides the [`PhotoBooth`]
//! component that ties them to the workflow in `pixelbooth-core`.

pub mod analytics;
pub mod camera;
pub mod components;
pub mod download;
pub mod raster;
pub mod remote;

pub use components::{BoothControls, FileUpload, PhotoBooth, Viewport};
pub use remote::ProxyClient;
