//! Axis-order tags and standardization to the canonical `[H, W, C]` layout.

use std::fmt;
use std::str::FromStr;

use ndarray::{Array2, ArrayD, Axis, Ix3};
use serde::{Deserialize, Serialize};

use crate::data::Cube;
use crate::error::{EngineError, Result};
use crate::processing::normalize;

/// On-disk layout of a raw cube before standardization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum AxisOrder {
    /// Channels, height, width (band-sequential)
    #[default]
    Chw,
    /// Channels, width, height
    Cwh,
    /// Height, width, channels (channels-last)
    Hwc,
    /// Width, height, channels
    Whc,
}

impl AxisOrder {
    /// All tags in display order.
    pub fn all() -> &'static [AxisOrder] {
        &[AxisOrder::Chw, AxisOrder::Cwh, AxisOrder::Hwc, AxisOrder::Whc]
    }

    /// Lowercase tag as used in the UI and config files.
    pub fn tag(&self) -> &'static str {
        match self {
            AxisOrder::Chw => "chw",
            AxisOrder::Cwh => "cwh",
            AxisOrder::Hwc => "hwc",
            AxisOrder::Whc => "whc",
        }
    }

    /// Raw axis index that becomes canonical axis `i` (H, W, C).
    pub fn permutation(&self) -> [usize; 3] {
        match self {
            AxisOrder::Chw => [1, 2, 0],
            AxisOrder::Cwh => [2, 1, 0],
            AxisOrder::Hwc => [0, 1, 2],
            AxisOrder::Whc => [1, 0, 2],
        }
    }

    /// Permutation that maps a canonical cube back to this raw layout.
    pub fn inverse_permutation(&self) -> [usize; 3] {
        let forward = self.permutation();
        let mut inverse = [0; 3];
        for (canonical, &raw) in forward.iter().enumerate() {
            inverse[raw] = canonical;
        }
        inverse
    }
}

impl fmt::Display for AxisOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.tag())
    }
}

impl FromStr for AxisOrder {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "chw" => Ok(AxisOrder::Chw),
            "cwh" => Ok(AxisOrder::Cwh),
            "hwc" => Ok(AxisOrder::Hwc),
            "whc" => Ok(AxisOrder::Whc),
            other => Err(EngineError::malformed(format!(
                "unknown axis order '{}' (expected chw, cwh, hwc or whc)",
                other
            ))),
        }
    }
}

/// Reorder a raw 3-D array into a canonical `(H, W, C)` cube.
///
/// Fails with `MalformedFile` when the array is not 3-dimensional.
pub fn standardize(raw: ArrayD<f64>, order: AxisOrder) -> Result<Cube> {
    let ndim = raw.ndim();
    let raw = raw.into_dimensionality::<Ix3>().map_err(|e| {
        EngineError::malformed_with(format!("expected a 3-D array, got {} dimensions", ndim), e)
    })?;

    let canonical = raw
        .permuted_axes(order.permutation())
        .as_standard_layout()
        .into_owned();

    Cube::new(canonical)
}

/// Undo [`standardize`]: return the cube in the given raw layout.
pub fn destandardize(cube: &Cube, order: AxisOrder) -> ArrayD<f64> {
    cube.data()
        .view()
        .permuted_axes(order.inverse_permutation())
        .as_standard_layout()
        .into_owned()
        .into_dyn()
}

/// Normalized first channel of a raw array read with the given order.
pub fn preview(raw: &ArrayD<f64>, order: AxisOrder) -> Result<Array2<f64>> {
    let view = raw.view().into_dimensionality::<Ix3>().map_err(|e| {
        EngineError::malformed_with(
            format!("expected a 3-D array, got {} dimensions", raw.ndim()),
            e,
        )
    })?;

    let canonical = view.permuted_axes(order.permutation());
    if canonical.len_of(Axis(2)) == 0 {
        return Err(EngineError::malformed("cube has no channels"));
    }
    Ok(normalize(&canonical.index_axis(Axis(2), 0)))
}

/// Describe the standardization for display, e.g.
/// `Original dimensions: (3, 4, 5) (chw) → Standardized [H, W, C]: (4, 5, 3)`.
pub fn dimension_info(raw_shape: &[usize], order: AxisOrder, cube: &Cube) -> String {
    let (h, w, c) = cube.dim();
    format!(
        "Original dimensions: {} ({}) → Standardized [H, W, C]: ({}, {}, {})",
        format_shape(raw_shape),
        order,
        h,
        w,
        c
    )
}

fn format_shape(shape: &[usize]) -> String {
    let parts: Vec<String> = shape.iter().map(|d| d.to_string()).collect();
    format!("({})", parts.join(", "))
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{Array3, IxDyn};

    fn ramp(shape: &[usize]) -> ArrayD<f64> {
        let len: usize = shape.iter().product();
        ArrayD::from_shape_vec(IxDyn(shape), (0..len).map(|v| v as f64).collect()).unwrap()
    }

    #[test]
    fn test_chw_shape() {
        let cube = standardize(ramp(&[3, 4, 5]), AxisOrder::Chw).unwrap();
        assert_eq!(cube.dim(), (4, 5, 3));
    }

    #[test]
    fn test_all_orders_produce_hwc() {
        // raw dims chosen so every axis length is distinct
        let expected = [
            (AxisOrder::Chw, [2, 3, 4], (3, 4, 2)),
            (AxisOrder::Cwh, [2, 3, 4], (4, 3, 2)),
            (AxisOrder::Hwc, [2, 3, 4], (2, 3, 4)),
            (AxisOrder::Whc, [2, 3, 4], (3, 2, 4)),
        ];
        for (order, raw_shape, dim) in expected {
            let cube = standardize(ramp(&raw_shape), order).unwrap();
            assert_eq!(cube.dim(), dim, "order {}", order);
        }
    }

    #[test]
    fn test_sample_placement_chw() {
        let raw = ramp(&[3, 4, 5]);
        let cube = standardize(raw.clone(), AxisOrder::Chw).unwrap();
        for c in 0..3 {
            for h in 0..4 {
                for w in 0..5 {
                    assert_eq!(cube.data()[[h, w, c]], raw[[c, h, w]]);
                }
            }
        }
    }

    #[test]
    fn test_round_trip_is_exact() {
        for &order in AxisOrder::all() {
            let raw = ramp(&[3, 4, 5]).mapv(|v| v * 0.1 + 1e-9);
            let cube = standardize(raw.clone(), order).unwrap();
            let back = destandardize(&cube, order);
            assert_eq!(back, raw, "order {}", order);
        }
    }

    #[test]
    fn test_inverse_permutation() {
        assert_eq!(AxisOrder::Chw.inverse_permutation(), [2, 0, 1]);
        assert_eq!(AxisOrder::Cwh.inverse_permutation(), [2, 1, 0]);
        assert_eq!(AxisOrder::Whc.inverse_permutation(), [1, 0, 2]);
    }

    #[test]
    fn test_rejects_2d() {
        let err = standardize(ramp(&[4, 4]), AxisOrder::Hwc).unwrap_err();
        assert!(matches!(err, EngineError::MalformedFile { .. }));
    }

    #[test]
    fn test_parse_tags() {
        assert_eq!("CHW".parse::<AxisOrder>().unwrap(), AxisOrder::Chw);
        assert_eq!(" whc ".parse::<AxisOrder>().unwrap(), AxisOrder::Whc);
        assert!("hcw".parse::<AxisOrder>().is_err());
    }

    #[test]
    fn test_preview_transposes_for_cwh() {
        // raw (C, W, H) = (1, 2, 3): preview must be H x W
        let raw = ramp(&[1, 2, 3]);
        let preview = preview(&raw, AxisOrder::Cwh).unwrap();
        assert_eq!(preview.dim(), (3, 2));
        assert_eq!(preview[[0, 0]], 0.0);
        assert_eq!(preview[[2, 1]], 1.0);
    }

    #[test]
    fn test_dimension_info() {
        let cube = Cube::new(Array3::zeros((4, 5, 3))).unwrap();
        assert_eq!(
            dimension_info(&[3, 4, 5], AxisOrder::Chw, &cube),
            "Original dimensions: (3, 4, 5) (chw) → Standardized [H, W, C]: (4, 5, 3)"
        );
    }
}
