//! Loader for NumPy `.npy` files.
//!
//! Samples are widened to `f64` without rescaling; the axis order is left to
//! the caller since `.npy` carries no layout convention.

use std::io::Cursor;
use std::path::Path;

use ndarray::ArrayD;
use ndarray_npy::{ReadNpyError, ReadNpyExt, ReadableElement};

use super::{Sample, read_bytes};
use crate::data::loader::{CubeLoader, FormatKind};
use crate::data::RawCube;
use crate::error::{EngineError, Result};

type NpyReader = fn(&[u8]) -> std::result::Result<ArrayD<f64>, ReadNpyError>;

/// Loader for NumPy `.npy` files.
///
/// Supported data types: `f64`, `f32`, `u8`, `i8`, `u16`, `i16`, `u32`,
/// `i32`, `u64`, `i64`. Any other descriptor (object arrays, strings,
/// booleans) is rejected as malformed.
pub struct NpyLoader;

impl NpyLoader {
    /// NumPy magic bytes: \x93NUMPY
    const MAGIC: &'static [u8] = &[0x93, b'N', b'U', b'M', b'P', b'Y'];

    /// Decode `.npy` bytes, trying each supported dtype in turn.
    pub fn decode(bytes: &[u8]) -> Result<ArrayD<f64>> {
        let readers: [(&str, NpyReader); 10] = [
            ("f64", read_as::<f64>),
            ("f32", read_as::<f32>),
            ("u8", read_as::<u8>),
            ("u16", read_as::<u16>),
            ("i16", read_as::<i16>),
            ("i32", read_as::<i32>),
            ("i64", read_as::<i64>),
            ("u32", read_as::<u32>),
            ("u64", read_as::<u64>),
            ("i8", read_as::<i8>),
        ];

        for (dtype, reader) in readers {
            match reader(bytes) {
                Ok(array) => {
                    log::debug!("NpyLoader: decoded {:?} as {}", array.shape(), dtype);
                    return Ok(array);
                }
                Err(ReadNpyError::WrongDescriptor(descr)) => {
                    log::trace!("NpyLoader: not {} ({:?})", dtype, descr);
                }
                Err(e) => {
                    return Err(EngineError::malformed_with("invalid .npy file", e));
                }
            }
        }

        Err(EngineError::malformed(
            ".npy file does not contain a numeric array",
        ))
    }
}

fn read_as<T>(bytes: &[u8]) -> std::result::Result<ArrayD<f64>, ReadNpyError>
where
    T: ReadableElement + Sample,
{
    let array = ArrayD::<T>::read_npy(Cursor::new(bytes))?;
    Ok(array.mapv(|v| v.to_f64()))
}

impl CubeLoader for NpyLoader {
    fn id(&self) -> &'static str {
        "npy"
    }

    fn display_name(&self) -> &'static str {
        "NumPy Array (.npy)"
    }

    fn kind(&self) -> FormatKind {
        FormatKind::RawArray
    }

    fn can_load(&self, data: &[u8]) -> bool {
        data.starts_with(Self::MAGIC)
    }

    fn load(&self, path: &Path) -> Result<RawCube> {
        let bytes = read_bytes(path)?;
        let data = Self::decode(&bytes)?;
        Ok(RawCube::new(data, FormatKind::RawArray, path))
    }
}
