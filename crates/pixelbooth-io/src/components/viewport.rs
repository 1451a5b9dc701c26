//! The round booth viewport: live camera feed or the composited photo.

use dioxus::prelude::*;
use pixelbooth_core::RgbaImage;

use crate::raster;

/// DOM id of the camera `<video>` element.
pub const VIDEO_ID: &str = "pixelbooth-camera";

/// Props for the [`Viewport`] component.
#[derive(Props, Clone, PartialEq)]
pub struct ViewportProps {
    /// Side length in CSS pixels.
    size: u32,
    /// Composited frame to show. `None` shows the camera feed.
    frame: Option<RgbaImage>,
    /// Whether the camera feed and frame are cropped to a circle.
    #[props(default = true)]
    round: bool,
    /// Shown in place of the camera feed when there is no frame, e.g.
    /// because camera access was refused.
    #[props(default)]
    notice: Option<String>,
}

/// Square viewport that shows either the live camera or a rendered
/// frame.
///
/// The `<video>` element stays mounted (hidden) while a frame is shown
/// so the stream does not have to be re-attached after a reset.
#[component]
pub fn Viewport(props: ViewportProps) -> Element {
    let size = props.size;
    let mut prev_blob_url: Signal<Option<String>> = use_signal(|| None);

    {
        let prev_blob_url = prev_blob_url;
        use_drop(move || {
            if let Some(ref url) = *prev_blob_url.peek() {
                raster::revoke_blob_url(url);
            }
        });
    }

    if let Some(ref prev) = prev_blob_url.take() {
        raster::revoke_blob_url(prev);
    }

    let shape = if props.round { "rounded-full" } else { "rounded" };
    let live = props.frame.is_none() && props.notice.is_none();
    let video_class = if live { "block" } else { "hidden" };

    let picture = match props.frame.as_ref().map(raster::rgba_image_to_blob_url) {
        Some(Ok(url)) => {
            prev_blob_url.set(Some(url.clone()));
            rsx! {
                img {
                    src: "{url}",
                    class: "absolute inset-0 w-full h-full [image-rendering:pixelated]",
                    alt: "Booth photo",
                }
            }
        }
        Some(Err(e)) => rsx! {
            p { class: "absolute inset-0 flex items-center justify-center text-[var(--text-error)] text-sm p-4",
                "Failed to render photo: {e}"
            }
        },
        None => match props.notice {
            Some(ref notice) => rsx! {
                p { class: "absolute inset-0 flex items-center justify-center text-center text-[var(--text-secondary)] text-sm p-6",
                    "{notice}"
                }
            },
            None => rsx! {},
        },
    };

    rsx! {
        div {
            class: "relative overflow-hidden bg-[var(--preview-bg)] {shape}",
            style: "width: {size}px; height: {size}px;",

            video {
                id: VIDEO_ID,
                class: "{video_class} w-full h-full object-cover -scale-x-100",
                autoplay: true,
                muted: true,
                "playsinline": "true",
            }

            {picture}
        }
    }
}
