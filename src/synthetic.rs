//! Synthetic cube generation.
//!
//! Produces deterministic cubes with a distinct pattern per band, so that
//! channel navigation and point sampling are easy to eyeball without real
//! data. Used by the `demo` command and by tests.

use crate::data::Cube;
use crate::error::Result;

/// Generate a `[height, width, bands]` cube with a different pattern per band.
///
/// - Band 0: horizontal gradient
/// - Band 1: vertical gradient
/// - Band 2: diagonal gradient
/// - Band 3: checkerboard
/// - Band 4: radial gradient
/// - Band 5: concentric rings
/// - Band 6: noise-like pattern
/// - Band 7+: offset gradients
///
/// All values lie in `[0, 1]`. Fails only if a dimension is zero.
pub fn generate_cube(height: usize, width: usize, bands: usize) -> Result<Cube> {
    log::info!(
        "Generating synthetic cube: {}x{} with {} bands",
        width,
        height,
        bands
    );

    Cube::from_shape_fn(height, width, bands, |(y, x, band)| {
        band_pixel(band, x, y, width, height)
    })
}

/// Value of one band at `(x, y)`.
fn band_pixel(band: usize, x: usize, y: usize, width: usize, height: usize) -> f64 {
    let fx = x as f64 / width as f64;
    let fy = y as f64 / height as f64;

    match band {
        0 => fx,
        1 => fy,
        2 => (fx + fy) / 2.0,

        3 => {
            // cells scale with the image so small cubes still alternate
            let cell = (width.min(height) / 4).max(1);
            if ((x / cell) + (y / cell)) % 2 == 0 {
                0.8
            } else {
                0.2
            }
        }

        4 => {
            let dist = radius(fx, fy);
            (1.0 - dist * 2.0).clamp(0.0, 1.0)
        }

        5 => ((radius(fx, fy) * 20.0).sin() * 0.5 + 0.5).clamp(0.0, 1.0),

        6 => {
            let noise = ((x as f64 * 12.9898 + y as f64 * 78.233).sin() * 43758.5453)
                .fract()
                .abs();
            noise * 0.5 + fy * 0.5
        }

        _ => {
            let offset = (band as f64 * 0.1) % 1.0;
            ((fx + offset) % 1.0 + fy) / 2.0
        }
    }
}

/// Distance from the image centre in normalized coordinates.
fn radius(fx: f64, fy: f64) -> f64 {
    let cx = fx - 0.5;
    let cy = fy - 0.5;
    (cx * cx + cy * cy).sqrt()
}
