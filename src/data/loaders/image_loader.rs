//! Loader for standard raster formats (PNG, JPEG, BMP, WebP).
//!
//! Gray images become a single band and color images three (alpha is
//! dropped). Sample values keep their native bit depth.

use std::path::Path;

use image::{ColorType, DynamicImage};
use ndarray::{Array3, ArrayD};

use super::{read_bytes, widen};
use crate::data::loader::{CubeLoader, FormatKind};
use crate::data::{AxisOrder, RawCube};
use crate::error::{EngineError, Result};

/// Loader for standard image formats.
///
/// Output shape is `(rows, cols, bands)`.
pub struct ImageLoader;

impl ImageLoader {
    /// Decode an image held in memory.
    pub fn decode(bytes: &[u8]) -> Result<ArrayD<f64>> {
        let img = image::load_from_memory(bytes)
            .map_err(|e| EngineError::malformed_with("failed to decode image", e))?;

        let (width, height) = (img.width() as usize, img.height() as usize);
        let color = img.color();
        let (bands, values) = planes(img, color);

        let data = Array3::from_shape_vec((height, width, bands), values)
            .map_err(|e| EngineError::malformed_with("image buffer size mismatch", e))?;

        log::trace!(
            "ImageLoader: loaded {}x{} {:?} image as {} band(s)",
            width,
            height,
            color,
            bands
        );
        Ok(data.into_dyn())
    }
}

/// Band count and interleaved samples, at the image's own depth.
fn planes(img: DynamicImage, color: ColorType) -> (usize, Vec<f64>) {
    match color {
        ColorType::L8 | ColorType::La8 => (1, widen(&img.into_luma8().into_raw())),
        ColorType::L16 | ColorType::La16 => (1, widen(&img.into_luma16().into_raw())),
        ColorType::Rgb16 | ColorType::Rgba16 => (3, widen(&img.into_rgb16().into_raw())),
        ColorType::Rgb32F | ColorType::Rgba32F => (3, widen(&img.into_rgb32f().into_raw())),
        _ => (3, widen(&img.into_rgb8().into_raw())),
    }
}

impl CubeLoader for ImageLoader {
    fn id(&self) -> &'static str {
        "image"
    }

    fn display_name(&self) -> &'static str {
        "Standard Image"
    }

    fn kind(&self) -> FormatKind {
        FormatKind::GenericRaster
    }

    fn can_load(&self, data: &[u8]) -> bool {
        // Check common image magic bytes
        if data.len() < 8 {
            return false;
        }

        // PNG: 89 50 4E 47 0D 0A 1A 0A
        if data.starts_with(&[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A]) {
            return true;
        }

        // JPEG: FF D8 FF
        if data.starts_with(&[0xFF, 0xD8, 0xFF]) {
            return true;
        }

        // BMP: 42 4D (BM)
        if data.starts_with(&[0x42, 0x4D]) {
            return true;
        }

        // WebP: RIFF....WEBP
        data.len() >= 12 && data.starts_with(b"RIFF") && &data[8..12] == b"WEBP"
    }

    fn load(&self, path: &Path) -> Result<RawCube> {
        let bytes = read_bytes(path)?;
        let data = Self::decode(&bytes)?;
        Ok(RawCube::new(data, FormatKind::GenericRaster, path).with_native_order(AxisOrder::Hwc))
    }
}
