//! Flip and rotate operations over the spatial plane of a cube.
//!
//! Every operation is applied identically to all channels and returns a new
//! cube; the channel count never changes.

use ndarray::{Axis, s};

use crate::data::Cube;

/// A single orientation change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    /// Reverse the row order (top ↔ bottom)
    FlipVertical,
    /// Reverse the column order (left ↔ right)
    FlipHorizontal,
    /// Rotate the image plane 90° counter-clockwise
    Rotate90,
}

impl Orientation {
    /// Apply this operation, returning a new cube.
    pub fn apply(&self, cube: &Cube) -> Cube {
        match self {
            Orientation::FlipVertical => flip_vertical(cube),
            Orientation::FlipHorizontal => flip_horizontal(cube),
            Orientation::Rotate90 => rotate90(cube),
        }
    }

    /// Short human-readable name.
    pub fn name(&self) -> &'static str {
        match self {
            Orientation::FlipVertical => "vertical flip",
            Orientation::FlipHorizontal => "horizontal flip",
            Orientation::Rotate90 => "rotate 90°",
        }
    }
}

/// Reverse the order of rows (the `H` axis).
pub fn flip_vertical(cube: &Cube) -> Cube {
    rebuild(cube.data().slice(s![..;-1, .., ..]).to_owned())
}

/// Reverse the order of columns (the `W` axis).
pub fn flip_horizontal(cube: &Cube) -> Cube {
    rebuild(cube.data().slice(s![.., ..;-1, ..]).to_owned())
}

/// Rotate the `H × W` plane 90° counter-clockwise.
///
/// `out[i, j, c] = in[j, W - 1 - i, c]`; the result has shape `(W, H, C)`.
pub fn rotate90(cube: &Cube) -> Cube {
    let mut view = cube.data().view();
    view.invert_axis(Axis(1));
    view.swap_axes(0, 1);
    rebuild(view.as_standard_layout().into_owned())
}

// dimensions are a permutation of a valid cube's, so never empty
fn rebuild(data: ndarray::Array3<f64>) -> Cube {
    Cube::from_valid(data)
}
