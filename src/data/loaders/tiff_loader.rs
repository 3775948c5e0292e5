//! Loader for multi-page TIFF / GeoTIFF rasters.
//!
//! Every page contributes its samples per pixel as bands, so a stack of
//! single-band pages and one multi-sample page both read as
//! `(bands, rows, cols)`.

use std::io::Cursor;
use std::path::Path;

use ndarray::{Array3, ArrayD, Axis, concatenate};
use tiff::decoder::{Decoder, DecodingResult, Limits};

use super::{read_bytes, widen};
use crate::data::loader::{CubeLoader, FormatKind};
use crate::data::{AxisOrder, RawCube};
use crate::error::{EngineError, Result};

/// Loader for `.tif`/`.tiff` files.
pub struct TiffLoader;

impl TiffLoader {
    /// Decode all pages of a TIFF held in memory.
    pub fn decode(bytes: &[u8]) -> Result<ArrayD<f64>> {
        let mut decoder = Decoder::new(Cursor::new(bytes))
            .map_err(|e| EngineError::malformed_with("invalid TIFF file", e))?
            .with_limits(Limits::unlimited());

        let mut pages: Vec<Array3<f64>> = Vec::new();
        let mut geometry: Option<(u32, u32)> = None;

        loop {
            let (width, height) = decoder
                .dimensions()
                .map_err(|e| EngineError::malformed_with("unreadable TIFF page header", e))?;
            if let Some(expected) = geometry {
                if expected != (width, height) {
                    return Err(EngineError::malformed(format!(
                        "TIFF page {} is {}x{}, expected {}x{}",
                        pages.len(),
                        width,
                        height,
                        expected.0,
                        expected.1
                    )));
                }
            }
            geometry = Some((width, height));

            let image = decoder
                .read_image()
                .map_err(|e| EngineError::malformed_with("unreadable TIFF page data", e))?;
            pages.push(page_planes(image, width as usize, height as usize)?);

            if !decoder.more_images() {
                break;
            }
            decoder
                .next_image()
                .map_err(|e| EngineError::malformed_with("unreadable TIFF directory", e))?;
        }

        let views: Vec<_> = pages.iter().map(|p| p.view()).collect();
        let stacked = concatenate(Axis(0), &views)
            .map_err(|e| EngineError::malformed_with("TIFF pages do not stack", e))?;

        log::debug!(
            "TiffLoader: {} page(s) stacked to {:?}",
            pages.len(),
            stacked.shape()
        );
        Ok(stacked.into_dyn())
    }
}

/// One page as `(samples_per_pixel, rows, cols)`.
fn page_planes(image: DecodingResult, width: usize, height: usize) -> Result<Array3<f64>> {
    #[allow(unreachable_patterns)]
    let values = match image {
        DecodingResult::U8(v) => widen(&v),
        DecodingResult::U16(v) => widen(&v),
        DecodingResult::U32(v) => widen(&v),
        DecodingResult::U64(v) => widen(&v),
        DecodingResult::I8(v) => widen(&v),
        DecodingResult::I16(v) => widen(&v),
        DecodingResult::I32(v) => widen(&v),
        DecodingResult::I64(v) => widen(&v),
        DecodingResult::F32(v) => widen(&v),
        DecodingResult::F64(v) => v,
        _ => return Err(EngineError::malformed("unsupported TIFF sample format")),
    };

    let pixels = width * height;
    if pixels == 0 || values.len() % pixels != 0 {
        return Err(EngineError::malformed(format!(
            "TIFF page of {}x{} holds {} samples",
            width,
            height,
            values.len()
        )));
    }
    let samples_per_pixel = values.len() / pixels;

    let chunky = Array3::from_shape_vec((height, width, samples_per_pixel), values)
        .map_err(|e| EngineError::malformed_with("TIFF page geometry", e))?;
    Ok(chunky
        .permuted_axes([2, 0, 1])
        .as_standard_layout()
        .into_owned())
}

impl CubeLoader for TiffLoader {
    fn id(&self) -> &'static str {
        "tiff"
    }

    fn display_name(&self) -> &'static str {
        "TIFF / GeoTIFF (.tif)"
    }

    fn kind(&self) -> FormatKind {
        FormatKind::GeoTiff
    }

    fn can_load(&self, data: &[u8]) -> bool {
        // TIFF: 49 49 2A 00 (little endian) or 4D 4D 00 2A (big endian),
        // BigTIFF uses 2B in place of 2A
        data.starts_with(&[0x49, 0x49, 0x2A, 0x00])
            || data.starts_with(&[0x4D, 0x4D, 0x00, 0x2A])
            || data.starts_with(&[0x49, 0x49, 0x2B, 0x00])
            || data.starts_with(&[0x4D, 0x4D, 0x00, 0x2B])
    }

    fn load(&self, path: &Path) -> Result<RawCube> {
        let bytes = read_bytes(path)?;
        let data = Self::decode(&bytes)?;
        Ok(RawCube::new(data, FormatKind::GeoTiff, path).with_native_order(AxisOrder::Chw))
    }
}
