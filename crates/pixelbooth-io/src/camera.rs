//! Webcam capture via `getUserMedia`.
//!
//! The booth asks for a square, front-facing stream, shows it in a
//! `<video>` element, and takes snapshots by drawing the current frame
//! onto an offscreen canvas. Snapshots are mirrored horizontally so the
//! saved photo matches what the user saw.

use pixelbooth_core::DataUrl;
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;
use web_sys::{
    CanvasRenderingContext2d, HtmlCanvasElement, HtmlVideoElement, MediaStream,
    MediaStreamConstraints, MediaStreamTrack,
};

/// Errors that can occur while using the webcam.
#[derive(Debug, thiserror::Error)]
pub enum CameraError {
    /// The user or browser refused camera access.
    #[error("camera unavailable: {0}")]
    Denied(String),

    /// The video element has no frame to capture yet.
    #[error("camera is not ready")]
    NotReady,

    /// The captured frame could not be encoded as a data URL.
    #[error("invalid snapshot: {0}")]
    Snapshot(#[from] pixelbooth_core::DataUrlError),

    /// A browser API call returned an error.
    #[error("browser API error: {0}")]
    JsError(String),
}

impl From<JsValue> for CameraError {
    fn from(value: JsValue) -> Self {
        Self::JsError(format!("{value:?}"))
    }
}

/// An open webcam stream. Tracks stop when the camera is dropped.
pub struct Camera {
    stream: MediaStream,
}

impl Camera {
    /// Ask for a front-facing `size` x `size` video stream.
    ///
    /// # Errors
    ///
    /// Returns [`CameraError::Denied`] if the permission prompt is
    /// refused or no camera exists.
    #[allow(clippy::future_not_send)] // WASM is single-threaded; MediaStream is !Send
    pub async fn open(size: u32) -> Result<Self, CameraError> {
        let window =
            web_sys::window().ok_or_else(|| CameraError::JsError("no global window".into()))?;
        let devices = window.navigator().media_devices()?;

        let video = js_sys::Object::new();
        js_sys::Reflect::set(&video, &"facingMode".into(), &"user".into())?;
        js_sys::Reflect::set(&video, &"width".into(), &size.into())?;
        js_sys::Reflect::set(&video, &"height".into(), &size.into())?;

        let constraints = MediaStreamConstraints::new();
        constraints.set_video(&video);
        constraints.set_audio(&JsValue::FALSE);

        let promise = devices.get_user_media_with_constraints(&constraints)?;
        let stream = JsFuture::from(promise)
            .await
            .map_err(|e| CameraError::Denied(format!("{e:?}")))?
            .dyn_into::<MediaStream>()
            .map_err(|e| CameraError::JsError(format!("not a MediaStream: {e:?}")))?;

        tracing::debug!(size, "camera opened");
        Ok(Self { stream })
    }

    /// Show the stream in the `<video>` element with id `video_id`.
    ///
    /// # Errors
    ///
    /// Returns [`CameraError::JsError`] if the element is missing.
    pub fn attach(&self, video_id: &str) -> Result<(), CameraError> {
        let video = video_element(video_id)?;
        video.set_src_object(Some(&self.stream));
        Ok(())
    }

    /// Stop every track of the stream.
    pub fn stop(&self) {
        for track in self.stream.get_tracks().iter() {
            if let Ok(track) = track.dyn_into::<MediaStreamTrack>() {
                track.stop();
            }
        }
    }
}

impl Drop for Camera {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Capture the current frame of `video_id` as a mirrored square PNG.
///
/// The largest centered square of the frame is scaled to `size` x
/// `size`.
///
/// # Errors
///
/// Returns [`CameraError::NotReady`] before the first frame arrives
/// and [`CameraError::JsError`] if canvas operations fail.
pub fn snapshot(video_id: &str, size: u32) -> Result<DataUrl, CameraError> {
    let video = video_element(video_id)?;
    let (vw, vh) = (video.video_width(), video.video_height());
    if vw == 0 || vh == 0 {
        return Err(CameraError::NotReady);
    }

    let document = web_sys::window()
        .and_then(|w| w.document())
        .ok_or_else(|| CameraError::JsError("no document".into()))?;
    let canvas = document
        .create_element("canvas")?
        .dyn_into::<HtmlCanvasElement>()
        .map_err(|e| CameraError::JsError(format!("failed to cast canvas: {e:?}")))?;
    canvas.set_width(size);
    canvas.set_height(size);

    let ctx = canvas
        .get_context("2d")?
        .ok_or_else(|| CameraError::JsError("no 2d context".into()))?
        .dyn_into::<CanvasRenderingContext2d>()
        .map_err(|e| CameraError::JsError(format!("failed to cast context: {e:?}")))?;

    let side = f64::from(vw.min(vh));
    let sx = (f64::from(vw) - side) / 2.0;
    let sy = (f64::from(vh) - side) / 2.0;
    let dest = f64::from(size);

    ctx.translate(dest, 0.0)?;
    ctx.scale(-1.0, 1.0)?;
    ctx.draw_image_with_html_video_element_and_sw_and_sh_and_dx_and_dy_and_dw_and_dh(
        &video, sx, sy, side, side, 0.0, 0.0, dest, dest,
    )?;

    let url = canvas.to_data_url_with_type("image/png")?;
    Ok(DataUrl::parse(&url)?)
}

fn video_element(id: &str) -> Result<HtmlVideoElement, CameraError> {
    web_sys::window()
        .and_then(|w| w.document())
        .and_then(|d| d.get_element_by_id(id))
        .ok_or_else(|| CameraError::JsError(format!("no element #{id}")))?
        .dyn_into::<HtmlVideoElement>()
        .map_err(|e| CameraError::JsError(format!("#{id} is not a video: {e:?}")))
}
