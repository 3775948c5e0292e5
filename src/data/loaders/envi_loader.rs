//! Loader for ENVI header + binary pairs.
//!
//! The `.hdr` text file describes the cube geometry; samples live in a
//! companion binary next to it. Whatever the interleave, the loader returns
//! the cube as `(lines, samples, bands)`.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use ndarray::{Array3, ArrayD};

use super::read_bytes;
use crate::data::loader::{CubeLoader, FormatKind};
use crate::data::{AxisOrder, RawCube};
use crate::error::{EngineError, Result};

/// Extensions tried, in order, when looking for the binary next to a header.
const DATA_EXTENSIONS: &[&str] = &["img", "dat", "raw", "bsq", "bil", "bip"];

/// Sample layout of the binary file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Interleave {
    /// Band sequential: `(bands, lines, samples)`
    Bsq,
    /// Band interleaved by line: `(lines, bands, samples)`
    Bil,
    /// Band interleaved by pixel: `(lines, samples, bands)`
    Bip,
}

impl FromStr for Interleave {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "bsq" => Ok(Interleave::Bsq),
            "bil" => Ok(Interleave::Bil),
            "bip" => Ok(Interleave::Bip),
            other => Err(EngineError::malformed(format!(
                "unknown ENVI interleave '{}'",
                other
            ))),
        }
    }
}

/// ENVI `data type` codes the loader understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnviDataType {
    U8,
    I16,
    I32,
    F32,
    F64,
    U16,
    U32,
    I64,
    U64,
}

impl EnviDataType {
    /// Map the numeric header code. Complex types (6, 9) are not supported.
    pub fn from_code(code: u32) -> Result<Self> {
        Ok(match code {
            1 => EnviDataType::U8,
            2 => EnviDataType::I16,
            3 => EnviDataType::I32,
            4 => EnviDataType::F32,
            5 => EnviDataType::F64,
            12 => EnviDataType::U16,
            13 => EnviDataType::U32,
            14 => EnviDataType::I64,
            15 => EnviDataType::U64,
            other => {
                return Err(EngineError::malformed(format!(
                    "unsupported ENVI data type {}",
                    other
                )));
            }
        })
    }

    /// Bytes per sample.
    pub fn size(&self) -> usize {
        match self {
            EnviDataType::U8 => 1,
            EnviDataType::I16 | EnviDataType::U16 => 2,
            EnviDataType::I32 | EnviDataType::U32 | EnviDataType::F32 => 4,
            EnviDataType::F64 | EnviDataType::I64 | EnviDataType::U64 => 8,
        }
    }
}

/// Parsed subset of an ENVI header.
#[derive(Debug, Clone, PartialEq)]
pub struct EnviHeader {
    pub samples: usize,
    pub lines: usize,
    pub bands: usize,
    pub header_offset: usize,
    pub data_type: EnviDataType,
    pub interleave: Interleave,
    pub big_endian: bool,
}

impl EnviHeader {
    /// Parse header text.
    ///
    /// `samples`, `lines`, `bands` and `data type` are required; `header
    /// offset` defaults to 0, `interleave` to BSQ and `byte order` to little
    /// endian.
    pub fn parse(text: &str) -> Result<Self> {
        if !text.trim_start().starts_with("ENVI") {
            return Err(EngineError::malformed("ENVI header must start with 'ENVI'"));
        }

        let fields = parse_fields(text);
        let required = |key: &str| -> Result<usize> {
            let value = fields
                .get(key)
                .ok_or_else(|| EngineError::malformed(format!("ENVI header missing '{}'", key)))?;
            parse_number(key, value)
        };
        let optional = |key: &str, default: usize| -> Result<usize> {
            fields
                .get(key)
                .map_or(Ok(default), |value| parse_number(key, value))
        };

        let code = required("data type")?;
        let code = u32::try_from(code).map_err(|e| {
            EngineError::malformed_with(format!("ENVI data type code {} out of range", code), e)
        })?;
        let data_type = EnviDataType::from_code(code)?;
        let interleave = match fields.get("interleave") {
            Some(value) => value.parse()?,
            None => Interleave::Bsq,
        };

        Ok(Self {
            samples: required("samples")?,
            lines: required("lines")?,
            bands: required("bands")?,
            header_offset: optional("header offset", 0)?,
            data_type,
            interleave,
            big_endian: optional("byte order", 0)? == 1,
        })
    }

    /// Number of samples in the cube.
    pub fn sample_count(&self) -> Result<usize> {
        self.samples
            .checked_mul(self.lines)
            .and_then(|n| n.checked_mul(self.bands))
            .ok_or_else(|| EngineError::malformed("ENVI geometry overflows"))
    }

    /// Number of payload bytes after the header offset.
    pub fn byte_count(&self) -> Result<usize> {
        self.sample_count()?
            .checked_mul(self.data_type.size())
            .ok_or_else(|| EngineError::malformed("ENVI geometry overflows"))
    }
}

/// `key = value` pairs with lowercased keys; `{ ... }` values may span lines.
fn parse_fields(text: &str) -> HashMap<String, String> {
    let mut fields = HashMap::new();
    let mut lines = text.lines().skip(1);

    while let Some(line) = lines.next() {
        let Some((key, value)) = line.split_once('=') else {
            continue;
        };
        let mut value = value.trim().to_string();
        if value.starts_with('{') {
            while !value.contains('}') {
                match lines.next() {
                    Some(more) => {
                        value.push(' ');
                        value.push_str(more.trim());
                    }
                    None => break,
                }
            }
        }
        fields.insert(key.trim().to_ascii_lowercase(), value);
    }

    fields
}

fn parse_number(key: &str, value: &str) -> Result<usize> {
    value.trim().parse().map_err(|e| {
        EngineError::malformed_with(format!("ENVI header field '{}' = '{}'", key, value), e)
    })
}

/// Binary companion of `header`: same stem with no extension or one of the
/// usual data extensions.
pub fn find_data_file(header: &Path) -> Result<PathBuf> {
    let stem = header.with_extension("");
    if stem != header && stem.is_file() {
        return Ok(stem);
    }
    DATA_EXTENSIONS
        .iter()
        .flat_map(|ext| [ext.to_string(), ext.to_ascii_uppercase()])
        .map(|ext| stem.with_extension(ext))
        .find(|candidate| candidate.is_file())
        .ok_or_else(|| {
            EngineError::no_array(format!(
                "no data file found next to header {}",
                header.display()
            ))
        })
}

macro_rules! decode_as {
    ($bytes:expr, $t:ty, $big_endian:expr) => {{
        const N: usize = std::mem::size_of::<$t>();
        $bytes
            .chunks_exact(N)
            .map(|chunk| {
                let mut buf = [0u8; N];
                buf.copy_from_slice(chunk);
                let value = if $big_endian {
                    <$t>::from_be_bytes(buf)
                } else {
                    <$t>::from_le_bytes(buf)
                };
                value as f64
            })
            .collect::<Vec<f64>>()
    }};
}

/// Decode raw sample bytes into `f64` in file order.
#[allow(trivial_numeric_casts)]
fn decode_samples(bytes: &[u8], data_type: EnviDataType, big_endian: bool) -> Vec<f64> {
    match data_type {
        EnviDataType::U8 => bytes.iter().map(|&b| f64::from(b)).collect(),
        EnviDataType::I16 => decode_as!(bytes, i16, big_endian),
        EnviDataType::U16 => decode_as!(bytes, u16, big_endian),
        EnviDataType::I32 => decode_as!(bytes, i32, big_endian),
        EnviDataType::U32 => decode_as!(bytes, u32, big_endian),
        EnviDataType::F32 => decode_as!(bytes, f32, big_endian),
        EnviDataType::F64 => decode_as!(bytes, f64, big_endian),
        EnviDataType::I64 => decode_as!(bytes, i64, big_endian),
        EnviDataType::U64 => decode_as!(bytes, u64, big_endian),
    }
}

/// Decode a binary body described by `header` into `(lines, samples, bands)`.
pub fn decode_body(header: &EnviHeader, body: &[u8]) -> Result<ArrayD<f64>> {
    let needed = header.byte_count()?;
    let payload = body.get(header.header_offset..).unwrap_or(&[]);
    if payload.len() < needed {
        return Err(EngineError::malformed(format!(
            "ENVI data file too short: need {} bytes after offset {}, found {}",
            needed,
            header.header_offset,
            payload.len()
        )));
    }

    let values = decode_samples(&payload[..needed], header.data_type, header.big_endian);
    let (lines, samples, bands) = (header.lines, header.samples, header.bands);

    let (file_shape, to_lsb) = match header.interleave {
        Interleave::Bsq => ((bands, lines, samples), [1, 2, 0]),
        Interleave::Bil => ((lines, bands, samples), [0, 2, 1]),
        Interleave::Bip => ((lines, samples, bands), [0, 1, 2]),
    };

    let array = Array3::from_shape_vec(file_shape, values)
        .map_err(|e| EngineError::malformed_with("ENVI geometry does not match data", e))?;

    Ok(array
        .permuted_axes(to_lsb)
        .as_standard_layout()
        .into_owned()
        .into_dyn())
}

/// Loader for ENVI `.hdr` files.
pub struct EnviLoader;

impl EnviLoader {
    const MAGIC: &'static [u8] = b"ENVI";
}

impl CubeLoader for EnviLoader {
    fn id(&self) -> &'static str {
        "envi"
    }

    fn display_name(&self) -> &'static str {
        "ENVI Header (.hdr)"
    }

    fn kind(&self) -> FormatKind {
        FormatKind::EnviHeader
    }

    fn can_load(&self, data: &[u8]) -> bool {
        data.starts_with(Self::MAGIC)
    }

    fn load(&self, path: &Path) -> Result<RawCube> {
        let text = String::from_utf8(read_bytes(path)?)
            .map_err(|e| EngineError::malformed_with("ENVI header is not UTF-8 text", e))?;
        let header = EnviHeader::parse(&text)?;
        log::debug!("EnviLoader: {:?}", header);

        let data_file = find_data_file(path)?;
        let body = read_bytes(&data_file)?;
        let data = decode_body(&header, &body)?;

        Ok(RawCube::new(data, FormatKind::EnviHeader, data_file).with_native_order(AxisOrder::Hwc))
    }
}
