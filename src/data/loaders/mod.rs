//! Built-in cube loaders.
//!
//! This module contains one implementation of the `CubeLoader` trait per
//! `FormatKind`, plus the small helpers they share.

mod envi_loader;
mod image_loader;
mod mat_loader;
mod npy_loader;
mod tiff_loader;

#[cfg(test)]
mod tests;

use std::io::ErrorKind;
use std::path::Path;

pub use envi_loader::{EnviDataType, EnviHeader, EnviLoader, Interleave};
pub use image_loader::ImageLoader;
pub use mat_loader::MatLoader;
pub use npy_loader::NpyLoader;
pub use tiff_loader::TiffLoader;

use crate::error::{EngineError, Result};

/// Read a whole file, mapping a missing file to `FileNotFound`.
pub(crate) fn read_bytes(path: &Path) -> Result<Vec<u8>> {
    std::fs::read(path).map_err(|e| match e.kind() {
        ErrorKind::NotFound => EngineError::FileNotFound {
            path: path.to_path_buf(),
        },
        _ => EngineError::Io(e),
    })
}

/// Lossless-enough widening of on-disk sample types to `f64`.
pub(crate) trait Sample: Copy {
    fn to_f64(self) -> f64;
}

macro_rules! impl_sample {
    ($($t:ty),*) => {
        $(
            impl Sample for $t {
                #[inline]
                fn to_f64(self) -> f64 {
                    self as f64
                }
            }
        )*
    };
}

impl_sample!(u8, i8, u16, i16, u32, i32, u64, i64, f32);

impl Sample for f64 {
    #[inline]
    fn to_f64(self) -> f64 {
        self
    }
}

/// Widen a sample vector.
pub(crate) fn widen<T: Sample>(values: &[T]) -> Vec<f64> {
    values.iter().map(|v| v.to_f64()).collect()
}
