//! Stateless image processing on channel slices and whole cubes.
//!
//! Slice operations (`normalize`, `enhance`) are total: degenerate input
//! produces a defined output instead of an error. Cube operations live in
//! [`orientation`] and always return a new cube.

pub mod orientation;

use ndarray::{Array2, ArrayBase, Data, Ix2};

pub use orientation::{Orientation, flip_horizontal, flip_vertical, rotate90};

/// Rescale a slice to `[0, 1]` using its own minimum and maximum.
///
/// A constant slice maps to all zeros.
pub fn normalize<S>(slice: &ArrayBase<S, Ix2>) -> Array2<f64>
where
    S: Data<Elem = f64>,
{
    let Some((min, max)) = min_max(slice) else {
        return Array2::zeros(slice.raw_dim());
    };

    let range = max - min;
    if range == 0.0 || !range.is_finite() {
        return Array2::zeros(slice.raw_dim());
    }

    slice.mapv(|v| {
        let scaled = (v - min) / range;
        // NaN samples render as black
        if scaled.is_nan() {
            0.0
        } else {
            scaled.clamp(0.0, 1.0)
        }
    })
}

/// Apply linear contrast and brightness, clamping the result to `[0, 1]`.
///
/// Any `contrast`/`brightness` value is accepted; the clamp is the only bound.
pub fn enhance<S>(slice: &ArrayBase<S, Ix2>, contrast: f64, brightness: f64) -> Array2<f64>
where
    S: Data<Elem = f64>,
{
    slice.mapv(|v| {
        let adjusted = v * contrast + brightness;
        if adjusted.is_nan() {
            0.0
        } else {
            adjusted.clamp(0.0, 1.0)
        }
    })
}

/// Minimum and maximum over finite samples, `None` when there are none.
fn min_max<S>(slice: &ArrayBase<S, Ix2>) -> Option<(f64, f64)>
where
    S: Data<Elem = f64>,
{
    slice
        .iter()
        .copied()
        .filter(|v| v.is_finite())
        .fold(None, |acc, v| match acc {
            None => Some((v, v)),
            Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::array;

    #[test]
    fn test_normalize_constant_is_zero() {
        let slice = Array2::from_elem((2, 2), 7.0);
        assert_eq!(normalize(&slice), Array2::<f64>::zeros((2, 2)));
    }

    #[test]
    fn test_normalize_hits_both_ends() {
        let slice = array![[3.0, -1.0], [5.0, 1.0]];
        let out = normalize(&slice);

        let min = out.iter().copied().fold(f64::INFINITY, f64::min);
        let max = out.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        assert_eq!(min, 0.0);
        assert_eq!(max, 1.0);
        assert_abs_diff_eq!(out[[0, 0]], 4.0 / 6.0, epsilon = 1e-12);
    }

    #[test]
    fn test_normalize_range_for_many_inputs() {
        let inputs = [
            array![[0.0, 1e-12], [1e12, -1e12]],
            array![[42.0, 43.0], [44.0, 45.0]],
            array![[-5.5, -5.5], [-5.5, -2.0]],
        ];
        for slice in inputs {
            let out = normalize(&slice);
            assert!(out.iter().all(|v| (0.0..=1.0).contains(v)));
        }
    }

    #[test]
    fn test_normalize_empty() {
        let slice = Array2::<f64>::zeros((0, 3));
        assert_eq!(normalize(&slice).dim(), (0, 3));
    }

    #[test]
    fn test_enhance_example() {
        let slice = array![[0.3]];
        assert_eq!(enhance(&slice, 2.0, 0.5)[[0, 0]], 1.0);
    }

    #[test]
    fn test_enhance_always_clamped() {
        let slice = array![[0.0, 0.25], [0.5, 1.0]];
        for (contrast, brightness) in [(100.0, -3.0), (-4.0, 0.2), (0.0, 9.0), (1e9, 1e9)] {
            let out = enhance(&slice, contrast, brightness);
            assert!(
                out.iter().all(|v| (0.0..=1.0).contains(v)),
                "contrast {} brightness {}",
                contrast,
                brightness
            );
        }
    }

    #[test]
    fn test_enhance_identity() {
        let slice = array![[0.1, 0.9]];
        assert_eq!(enhance(&slice, 1.0, 0.0), slice);
    }
}
