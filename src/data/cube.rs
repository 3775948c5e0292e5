//! Hyperspectral cube data structures.

use std::path::{Path, PathBuf};

use ndarray::{Array3, ArrayD, ArrayView1, ArrayView2, Axis};

use crate::data::{AxisOrder, FormatKind};
use crate::error::{EngineError, Result};

/// A cube exactly as it was decoded from disk, before axis standardization.
#[derive(Debug, Clone)]
pub struct RawCube {
    /// Samples in on-disk axis order
    pub data: ArrayD<f64>,
    /// Format the cube was decoded with
    pub kind: FormatKind,
    /// File the samples came from (after directory resolution)
    pub source: PathBuf,
    /// Axis order implied by the format itself, when it defines one
    pub native_order: Option<AxisOrder>,
}

impl RawCube {
    /// Wrap decoded samples.
    pub fn new(data: ArrayD<f64>, kind: FormatKind, source: impl Into<PathBuf>) -> Self {
        Self {
            data,
            kind,
            source: source.into(),
            native_order: None,
        }
    }

    /// Attach the axis order the format defines.
    pub fn with_native_order(mut self, order: AxisOrder) -> Self {
        self.native_order = Some(order);
        self
    }

    /// Shape in on-disk order.
    pub fn shape(&self) -> &[usize] {
        self.data.shape()
    }

    /// Path of the decoded file.
    pub fn source(&self) -> &Path {
        &self.source
    }
}

/// A standardized cube with canonical axes `(height, width, channel)`.
///
/// All dimensions are guaranteed to be non-zero. Orientation operations
/// produce a new `Cube` rather than mutating this one.
#[derive(Debug, Clone, PartialEq)]
pub struct Cube {
    data: Array3<f64>,
}

impl Cube {
    /// Wrap an `(H, W, C)` array, rejecting empty dimensions.
    pub fn new(data: Array3<f64>) -> Result<Self> {
        let (h, w, c) = data.dim();
        if h == 0 || w == 0 || c == 0 {
            return Err(EngineError::malformed(format!(
                "cube dimensions must be positive, got ({}, {}, {})",
                h, w, c
            )));
        }
        Ok(Self { data })
    }

    /// Wrap an array whose dimensions are already known to be non-zero.
    pub(crate) fn from_valid(data: Array3<f64>) -> Self {
        debug_assert!(data.dim().0 > 0 && data.dim().1 > 0 && data.dim().2 > 0);
        Self { data }
    }

    /// Build a cube from a generator function over `(y, x, channel)`.
    pub fn from_shape_fn<F>(height: usize, width: usize, channels: usize, f: F) -> Result<Self>
    where
        F: FnMut((usize, usize, usize)) -> f64,
    {
        Self::new(Array3::from_shape_fn((height, width, channels), f))
    }

    /// Number of rows.
    pub fn height(&self) -> usize {
        self.data.dim().0
    }

    /// Number of columns.
    pub fn width(&self) -> usize {
        self.data.dim().1
    }

    /// Number of spectral channels.
    pub fn channels(&self) -> usize {
        self.data.dim().2
    }

    /// `(H, W, C)` tuple.
    pub fn dim(&self) -> (usize, usize, usize) {
        self.data.dim()
    }

    /// Borrow the underlying array.
    pub fn data(&self) -> &Array3<f64> {
        &self.data
    }

    /// Consume the cube and return the underlying array.
    pub fn into_inner(self) -> Array3<f64> {
        self.data
    }

    /// View of one channel as an `H × W` slice.
    pub fn channel(&self, index: usize) -> Result<ArrayView2<'_, f64>> {
        if index >= self.channels() {
            return Err(EngineError::index_out_of_range(
                "channel",
                index,
                self.channels(),
            ));
        }
        Ok(self.data.index_axis(Axis(2), index))
    }

    /// Spectrum at row `y`, column `x`.
    pub fn spectrum(&self, x: usize, y: usize) -> Result<ArrayView1<'_, f64>> {
        if x >= self.width() {
            return Err(EngineError::index_out_of_range("x", x, self.width()));
        }
        if y >= self.height() {
            return Err(EngineError::index_out_of_range("y", y, self.height()));
        }
        Ok(self.data.slice(ndarray::s![y, x, ..]))
    }
}
