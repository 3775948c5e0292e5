//! Loader for MATLAB level-5 `.mat` containers.
//!
//! A `.mat` file can hold many variables; the loader keeps the 3-D numeric
//! array with the largest element count (first one wins on ties).

use std::io::Cursor;
use std::path::Path;

use matfile::{MatFile, NumericData};
use ndarray::{ArrayD, IxDyn, ShapeBuilder};

use super::{read_bytes, widen};
use crate::data::loader::{CubeLoader, FormatKind};
use crate::data::RawCube;
use crate::error::{EngineError, Result};

/// Loader for MATLAB `.mat` files (level 5, optionally compressed).
///
/// Only the real part of complex arrays is kept.
pub struct MatLoader;

impl MatLoader {
    /// Level-5 files open with a 116-byte text header starting with this.
    const MAGIC: &'static [u8] = b"MATLAB 5.0 MAT-file";

    /// Decode a `.mat` container held in memory.
    pub fn decode(bytes: &[u8]) -> Result<ArrayD<f64>> {
        let mat = MatFile::parse(Cursor::new(bytes))
            .map_err(|e| EngineError::malformed_with("invalid .mat file", e))?;

        let mut best: Option<&matfile::Array> = None;
        for array in mat.arrays() {
            log::trace!("MatLoader: variable '{}' {:?}", array.name(), array.size());
            if array.size().len() != 3 {
                continue;
            }
            let count: usize = array.size().iter().product();
            let best_count: usize = best.map_or(0, |b| b.size().iter().product());
            if best.is_none() || count > best_count {
                best = Some(array);
            }
        }

        let array = best.ok_or_else(|| {
            EngineError::no_array("no 3-D numeric variable in .mat file")
        })?;

        let values = real_part(array.data());
        let shape = IxDyn(array.size()).f();
        let data = ArrayD::from_shape_vec(shape, values).map_err(|e| {
            EngineError::malformed_with(
                format!("variable '{}' has inconsistent size", array.name()),
                e,
            )
        })?;

        log::debug!(
            "MatLoader: selected '{}' with shape {:?}",
            array.name(),
            data.shape()
        );
        Ok(data)
    }
}

/// Column-major real samples widened to `f64`.
fn real_part(data: &NumericData) -> Vec<f64> {
    match data {
        NumericData::Int8 { real, .. } => widen(real),
        NumericData::UInt8 { real, .. } => widen(real),
        NumericData::Int16 { real, .. } => widen(real),
        NumericData::UInt16 { real, .. } => widen(real),
        NumericData::Int32 { real, .. } => widen(real),
        NumericData::UInt32 { real, .. } => widen(real),
        NumericData::Int64 { real, .. } => widen(real),
        NumericData::UInt64 { real, .. } => widen(real),
        NumericData::Single { real, .. } => widen(real),
        NumericData::Double { real, .. } => real.clone(),
    }
}

impl CubeLoader for MatLoader {
    fn id(&self) -> &'static str {
        "mat"
    }

    fn display_name(&self) -> &'static str {
        "MATLAB Matrix (.mat)"
    }

    fn kind(&self) -> FormatKind {
        FormatKind::MatlabMatrix
    }

    fn can_load(&self, data: &[u8]) -> bool {
        data.starts_with(Self::MAGIC)
    }

    fn load(&self, path: &Path) -> Result<RawCube> {
        let bytes = read_bytes(path)?;
        let data = Self::decode(&bytes)?;
        Ok(RawCube::new(data, FormatKind::MatlabMatrix, path))
    }
}
