//! Layered viewport compositing via `tiny-skia`.
//!
//! A [`SceneView`] says what to draw; [`Compositor`] draws it: the
//! background stretched over the viewport, then the face at its layout
//! position and opacity, both through the optional circular clip.
//! Sampling is nearest-neighbour so pixel art keeps hard edges.

use image::{ImageEncoder, Rgba};
use tiny_skia::{
    BlendMode, ColorU8, FillRule, FilterQuality, Mask, PathBuilder, Pixmap, PixmapPaint, Transform,
};

use crate::data_url::{DataUrl, DataUrlError};
use crate::layout::{CircleClip, SceneView, scene};
use crate::types::{Dimensions, RgbaImage};
use crate::workflow::Booth;

/// Errors that can occur while compositing.
#[derive(Debug, thiserror::Error)]
pub enum ComposeError {
    /// The image data could not be decoded or encoded.
    #[error("image codec error: {0}")]
    Image(#[from] image::ImageError),

    /// The data URL payload was not valid base64.
    #[error(transparent)]
    DataUrl(#[from] DataUrlError),

    /// A canvas of the requested size could not be allocated.
    #[error("cannot allocate a {width}x{height} canvas")]
    Canvas {
        /// Requested width.
        width: u32,
        /// Requested height.
        height: u32,
    },

    /// The clip circle is degenerate.
    #[error("invalid clip circle of radius {0}")]
    Clip(f64),
}

/// Decode a data URL into an RGBA raster.
///
/// # Errors
///
/// Returns [`ComposeError::DataUrl`] for invalid base64 and
/// [`ComposeError::Image`] for unrecognized image data.
pub fn decode_image(url: &DataUrl) -> Result<RgbaImage, ComposeError> {
    let bytes = url.decode()?;
    Ok(image::load_from_memory(&bytes)?.to_rgba8())
}

/// Encode an RGBA raster as PNG bytes.
///
/// # Errors
///
/// Returns [`ComposeError::Image`] if PNG encoding fails.
pub fn encode_png(image: &RgbaImage) -> Result<Vec<u8>, ComposeError> {
    let mut png_bytes = Vec::new();
    let encoder = image::codecs::png::PngEncoder::new(&mut png_bytes);
    encoder.write_image(
        image.as_raw(),
        image.width(),
        image.height(),
        image::ExtendedColorType::Rgba8,
    )?;
    Ok(png_bytes)
}

/// Encode an RGBA raster as a PNG data URL.
///
/// # Errors
///
/// Returns [`ComposeError::Image`] if PNG encoding fails.
pub fn png_data_url(image: &RgbaImage) -> Result<DataUrl, ComposeError> {
    Ok(DataUrl::encode("image/png", &encode_png(image)?)?)
}

/// Draws booth scenes over a fixed background.
pub struct Compositor {
    background: Pixmap,
}

impl Compositor {
    /// Create a compositor with a custom background.
    ///
    /// # Errors
    ///
    /// Returns [`ComposeError::Canvas`] if the background is empty.
    pub fn new(background: &RgbaImage) -> Result<Self, ComposeError> {
        Ok(Self {
            background: to_pixmap(background)?,
        })
    }

    /// Create a compositor with the built-in orb background rendered at
    /// `viewport` resolution.
    ///
    /// # Errors
    ///
    /// Returns [`ComposeError::Canvas`] if `viewport` is zero.
    pub fn with_default_background(viewport: u32) -> Result<Self, ComposeError> {
        Self::new(&crate::background::orb(viewport))
    }

    /// Draw `scene` with `face` as the face layer.
    ///
    /// # Errors
    ///
    /// Returns [`ComposeError::Canvas`] if the viewport is zero-sized and
    /// [`ComposeError::Clip`] if the clip circle is degenerate.
    #[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
    pub fn render(&self, scene: &SceneView, face: &RgbaImage) -> Result<RgbaImage, ComposeError> {
        let size = scene.viewport;
        let mut canvas = Pixmap::new(size, size).ok_or(ComposeError::Canvas {
            width: size,
            height: size,
        })?;
        let mask = scene
            .clip
            .map(|clip| circle_mask(size, clip))
            .transpose()?;

        if scene.background {
            let sx = size as f32 / self.background.width() as f32;
            let sy = size as f32 / self.background.height() as f32;
            canvas.draw_pixmap(
                0,
                0,
                self.background.as_ref(),
                &layer_paint(1.0),
                Transform::from_scale(sx, sy),
                mask.as_ref(),
            );
        }

        let layout = scene.face;
        let drawable = face.width() > 0
            && face.height() > 0
            && layout.width > 0.0
            && layout.height > 0.0;
        if drawable {
            let face_pixmap = to_pixmap(face)?;
            let sx = (layout.width / f64::from(face.width())) as f32;
            let sy = (layout.height / f64::from(face.height())) as f32;
            let transform = Transform::from_row(sx, 0.0, 0.0, sy, layout.x as f32, layout.y as f32);
            canvas.draw_pixmap(
                0,
                0,
                face_pixmap.as_ref(),
                &layer_paint(layout.opacity as f32),
                transform,
                mask.as_ref(),
            );
        }

        Ok(from_pixmap(&canvas))
    }

    /// Draw the booth's current image for its current state.
    ///
    /// Returns `Ok(None)` when the booth holds no image.
    ///
    /// # Errors
    ///
    /// Returns [`ComposeError`] if the image cannot be decoded or drawn.
    pub fn render_booth(
        &self,
        booth: &Booth,
        viewport: u32,
    ) -> Result<Option<RgbaImage>, ComposeError> {
        let Some(url) = booth.image() else {
            return Ok(None);
        };
        let face = decode_image(url)?;
        let natural = Dimensions::new(face.width(), face.height());
        let view = scene(booth.state(), natural, viewport, booth.variant());
        self.render(&view, &face).map(Some)
    }

    /// Render the booth's viewport as a PNG data URL, the way it looks
    /// right now.
    ///
    /// Returns `Ok(None)` when the booth holds no image.
    ///
    /// # Errors
    ///
    /// Returns [`ComposeError`] if rendering or encoding fails.
    pub fn snapshot(&self, booth: &Booth, viewport: u32) -> Result<Option<DataUrl>, ComposeError> {
        self.render_booth(booth, viewport)?
            .map(|image| png_data_url(&image))
            .transpose()
    }
}

/// Paint settings shared by every layer.
const fn layer_paint(opacity: f32) -> PixmapPaint {
    PixmapPaint {
        opacity,
        blend_mode: BlendMode::SourceOver,
        quality: FilterQuality::Nearest,
    }
}

/// Build an anti-aliased mask that keeps only the inside of `clip`.
#[allow(clippy::cast_possible_truncation)]
fn circle_mask(size: u32, clip: CircleClip) -> Result<Mask, ComposeError> {
    let path = PathBuilder::from_circle(clip.cx as f32, clip.cy as f32, clip.radius as f32)
        .ok_or(ComposeError::Clip(clip.radius))?;
    let mut mask = Mask::new(size, size).ok_or(ComposeError::Canvas {
        width: size,
        height: size,
    })?;
    mask.fill_path(&path, FillRule::Winding, true, Transform::identity());
    Ok(mask)
}

/// Convert a straight-alpha `RgbaImage` into a premultiplied `Pixmap`.
fn to_pixmap(image: &RgbaImage) -> Result<Pixmap, ComposeError> {
    let (width, height) = image.dimensions();
    let mut pixmap = Pixmap::new(width, height).ok_or(ComposeError::Canvas { width, height })?;
    for (dst, src) in pixmap.pixels_mut().iter_mut().zip(image.pixels()) {
        let [r, g, b, a] = src.0;
        *dst = ColorU8::from_rgba(r, g, b, a).premultiply();
    }
    Ok(pixmap)
}

/// Convert a premultiplied `Pixmap` back into a straight-alpha `RgbaImage`.
fn from_pixmap(pixmap: &Pixmap) -> RgbaImage {
    let mut image = RgbaImage::new(pixmap.width(), pixmap.height());
    for (dst, src) in image.pixels_mut().zip(pixmap.pixels()) {
        let c = src.demultiply();
        *dst = Rgba([c.red(), c.green(), c.blue(), c.alpha()]);
    }
    image
}
