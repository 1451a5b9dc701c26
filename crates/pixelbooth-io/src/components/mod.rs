//! Dioxus UI components for pixelbooth.

mod booth;
mod controls;
mod upload;
mod viewport;

pub use booth::PhotoBooth;
pub use controls::BoothControls;
pub use upload::FileUpload;
pub use viewport::{VIDEO_ID, Viewport};
