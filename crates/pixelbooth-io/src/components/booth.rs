//! The photo booth: camera, viewport, and controls wired to a [`Booth`].
//!
//! The two remote steps run in a spawned task and are recorded on the
//! booth one at a time, so the viewport re-renders between them
//! (translucent capture, then cropped face, then the opaque portrait).

use std::rc::Rc;

use dioxus::prelude::*;
use pixelbooth_core::compose::encode_png;
use pixelbooth_core::{
    Booth, BoothConfig, ComposeError, Compositor, Controls, ConversionError, DataUrl, RgbaImage,
};

use super::viewport::VIDEO_ID;
use super::{BoothControls, Viewport};
use crate::analytics::{self, BoothEvent};
use crate::camera::{self, Camera};
use crate::download;
use crate::remote::ProxyClient;

/// Filename offered when saving the finished portrait.
const PORTRAIT_FILENAME: &str = "pixel-portrait.png";

/// Props for the [`PhotoBooth`] component.
#[derive(Props, Clone, PartialEq)]
pub struct PhotoBoothProps {
    config: BoothConfig,
}

#[component]
pub fn PhotoBooth(props: PhotoBoothProps) -> Element {
    let BoothConfig {
        viewport: size,
        variant,
        endpoint,
    } = props.config;

    let mut booth = use_signal(move || Booth::new(variant));
    let mut error = use_signal(|| Option::<String>::None);
    let mut camera: Signal<Option<Camera>> = use_signal(|| None);
    let mut camera_error = use_signal(|| Option::<String>::None);
    let compositor = use_hook(move || Rc::new(Compositor::with_default_background(size)));
    let client = use_hook(move || Rc::new(ProxyClient::new(endpoint)));

    // Open the camera once, after the <video> element is mounted.
    use_effect(move || {
        spawn(async move {
            match Camera::open(size).await {
                Ok(cam) => {
                    if let Err(e) = cam.attach(VIDEO_ID) {
                        camera_error.set(Some(e.to_string()));
                    }
                    camera.set(Some(cam));
                }
                Err(e) => {
                    tracing::warn!(error = %e, "camera unavailable");
                    camera_error.set(Some(e.to_string()));
                }
            }
        });
    });

    let mut acquire = move |photo: DataUrl, event: BoothEvent| {
        if let Err(e) = booth.write().acquire(photo) {
            tracing::warn!(error = %e, "photo ignored");
            return;
        }
        error.set(None);
        analytics::track(event);
    };

    let on_upload = move |photo: DataUrl| acquire(photo, BoothEvent::Upload);

    let on_capture = move |()| match camera::snapshot(VIDEO_ID, size) {
        Ok(photo) => acquire(photo, BoothEvent::Capture),
        Err(e) => error.set(Some(e.to_string())),
    };

    let on_back = move |()| {
        if let Err(e) = booth.write().reset() {
            tracing::warn!(error = %e, "reset ignored");
            return;
        }
        error.set(None);
    };

    let on_confirm = {
        let compositor = Rc::clone(&compositor);
        let client = Rc::clone(&client);
        move |()| {
            // The passport booth detects on what the viewport shows.
            let snapshot = if variant.previews_selection() {
                match compositor
                    .as_ref()
                    .as_ref()
                    .map_err(ToString::to_string)
                    .and_then(|c| c.snapshot(&booth.read(), size).map_err(|e| e.to_string()))
                {
                    Ok(snapshot) => snapshot,
                    Err(e) => {
                        error.set(Some(format!("Could not capture the viewport: {e}")));
                        return;
                    }
                }
            } else {
                None
            };

            let started = match snapshot {
                Some(snapshot) => booth.write().begin_with(snapshot),
                None => booth.write().begin(),
            };
            let pending = match started {
                Ok(pending) => pending,
                Err(e) => {
                    tracing::warn!(error = %e, "conversion not started");
                    return;
                }
            };

            let client = Rc::clone(&client);
            spawn(async move {
                let detected = match pending.detect(client.as_ref()).await {
                    Ok(detected) => detected,
                    Err(e) => return record_failure(booth, error, &e),
                };
                if let Err(e) = booth.write().detected(&detected) {
                    tracing::warn!(error = %e, "detect result dropped");
                    return;
                }

                let converted = match detected.convert(client.as_ref()).await {
                    Ok(converted) => converted,
                    Err(e) => return record_failure(booth, error, &e),
                };
                if let Err(e) = booth.write().converted(&converted) {
                    tracing::warn!(error = %e, "convert result dropped");
                    return;
                }
                analytics::track(BoothEvent::Complete(variant));
            });
        }
    };

    let on_save = {
        let compositor = Rc::clone(&compositor);
        move |()| {
            let saved = render(&compositor, &booth.read(), size).and_then(|frame| {
                let frame = frame.ok_or_else(|| "nothing to save".to_owned())?;
                let png = encode_png(&frame).map_err(|e| e.to_string())?;
                download::trigger_download(&png, PORTRAIT_FILENAME, "image/png")
                    .map_err(|e| e.to_string())
            });
            match saved {
                Ok(()) => analytics::track(BoothEvent::Download),
                Err(e) => error.set(Some(format!("Download failed: {e}"))),
            }
        }
    };

    let state = booth.read().state();
    let (frame, render_error) = match render(&compositor, &booth.read(), size) {
        Ok(frame) => (frame, None),
        Err(e) => (None, Some(e)),
    };
    let round = frame.is_none() && variant.clips_to_circle();
    // The failed strip shows `error` itself.
    let banner = error().filter(|_| Controls::for_state(state) != Controls::Failed);

    rsx! {
        div { class: "flex flex-col items-center gap-4",
            Viewport { size, frame, round, notice: camera_error() }

            p { class: "text-(--muted) text-xs uppercase tracking-wide", "{state}" }

            if let Some(ref err) = banner {
                p { class: "text-(--text-error) text-sm", "{err}" }
            }
            if let Some(ref err) = render_error {
                p { class: "text-(--text-error) text-sm", "{err}" }
            }

            BoothControls {
                controls: Controls::for_state(state),
                camera_ready: camera.read().is_some(),
                error: error(),
                on_capture,
                on_upload,
                on_confirm,
                on_back,
                on_save,
            }
        }
    }
}

/// Draw the booth's current frame, if it has an image.
fn render(
    compositor: &Result<Compositor, ComposeError>,
    booth: &Booth,
    size: u32,
) -> Result<Option<RgbaImage>, String> {
    compositor
        .as_ref()
        .map_err(ToString::to_string)?
        .render_booth(booth, size)
        .map_err(|e| e.to_string())
}

fn record_failure(
    mut booth: Signal<Booth>,
    mut error: Signal<Option<String>>,
    failure: &ConversionError,
) {
    analytics::track(BoothEvent::Failed(failure.stage()));
    error.set(Some(failure.to_string()));
    if let Err(e) = booth.write().fail(failure) {
        tracing::warn!(error = %e, "failure not recorded");
    }
}
