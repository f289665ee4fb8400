//
// prepare.rs
// EOTRH-Score-rs
//
// Decodes an uploaded radiograph and conditions it for texture analysis:
// single-channel luminance with the observed intensity range stretched to 0..=255.
//

use image::GrayImage;
use tracing::debug;

use crate::error::TextureError;

/// Decodes raw image bytes into the prepared grayscale raster the ROI pipeline
/// reads from. Fails only when the bytes cannot be decoded at all.
pub fn decode_radiograph(bytes: &[u8]) -> Result<GrayImage, TextureError> {
    let decoded = image::load_from_memory(bytes)?;
    let gray = decoded.to_luma8();
    debug!(
        width = gray.width(),
        height = gray.height(),
        "radiograph decoded"
    );
    Ok(rescale_intensity(gray))
}

/// Linearly maps the observed min/max onto 0/255 so that narrow dynamic range
/// does not bias entropy comparisons between images. A flat image maps to zeros.
fn rescale_intensity(mut img: GrayImage) -> GrayImage {
    let (mut min, mut max) = (u8::MAX, u8::MIN);
    for p in img.pixels() {
        min = min.min(p[0]);
        max = max.max(p[0]);
    }

    if max <= min {
        for p in img.pixels_mut() {
            p[0] = 0;
        }
        return img;
    }

    let range = f32::from(max - min);
    for p in img.pixels_mut() {
        p[0] = (f32::from(p[0] - min) * 255.0 / range).round() as u8;
    }
    img
}
