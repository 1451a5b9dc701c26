//! Built-in decorative background: a glowing orb with drifting cloud
//! bands, generated procedurally so the booth ships without image assets.

use image::Rgba;

use crate::types::RgbaImage;

/// Warm glow at the center of the orb.
const CORE: [f64; 3] = [255.0, 236.0, 179.0];
/// Deep violet at the rim.
const RIM: [f64; 3] = [88.0, 80.0, 236.0];
/// Cloud highlight color.
const CLOUD: [f64; 3] = [255.0, 255.0, 255.0];
/// Maximum cloud contribution at the orb center.
const CLOUD_STRENGTH: f64 = 0.35;

/// Render the default background at `size` x `size`.
///
/// The output is fully opaque. Returns an empty image for `size == 0`.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn orb(size: u32) -> RgbaImage {
    let mut img = RgbaImage::new(size, size);
    if size == 0 {
        return img;
    }

    let s = f64::from(size);
    let center = s / 2.0;

    for (x, y, pixel) in img.enumerate_pixels_mut() {
        let px = f64::from(x) + 0.5;
        let py = f64::from(y) + 0.5;

        // Normalized distance from the center; 1.0 at the inscribed circle.
        let t = ((px - center).hypot(py - center) / center).min(1.0);

        // Horizontal bands that wobble vertically.
        let u = px / s;
        let v = py / s;
        let band = (v * 9.0 + (u * 7.0).sin() * 0.8).sin().mul_add(0.5, 0.5);
        let cloud = band * band * CLOUD_STRENGTH * (1.0 - t);

        let mut rgb = [0u8; 3];
        for c in 0..3 {
            let base = CORE[c].mul_add(1.0 - t, RIM[c] * t);
            let value = base.mul_add(1.0 - cloud, CLOUD[c] * cloud);
            rgb[c] = value.round().clamp(0.0, 255.0) as u8;
        }
        *pixel = Rgba([rgb[0], rgb[1], rgb[2], 255]);
    }
    img
}
