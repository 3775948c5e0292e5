//! ENVI header + binary fixture tests.

use tempfile::TempDir;

use super::write_fixture;
use crate::data::loaders::{EnviLoader, Interleave};
use crate::data::{AxisOrder, CubeLoader, FormatKind, standardize};
use crate::error::EngineError;

const LINES: usize = 2;
const SAMPLES: usize = 3;
const BANDS: usize = 4;

fn value(line: usize, sample: usize, band: usize) -> f32 {
    (line * 100 + sample * 10 + band) as f32
}

fn header_text(interleave: &str, data_type: u32, byte_order: u32, offset: usize) -> String {
    format!(
        "ENVI\n\
         description = {{fixture}}\n\
         samples = {SAMPLES}\n\
         lines = {LINES}\n\
         bands = {BANDS}\n\
         header offset = {offset}\n\
         file type = ENVI Standard\n\
         data type = {data_type}\n\
         interleave = {interleave}\n\
         byte order = {byte_order}\n"
    )
}

/// Sample coordinates `(line, sample, band)` in file order for `interleave`.
fn file_order(interleave: Interleave) -> Vec<(usize, usize, usize)> {
    let mut order = Vec::new();
    match interleave {
        Interleave::Bsq => {
            for b in 0..BANDS {
                for l in 0..LINES {
                    for s in 0..SAMPLES {
                        order.push((l, s, b));
                    }
                }
            }
        }
        Interleave::Bil => {
            for l in 0..LINES {
                for b in 0..BANDS {
                    for s in 0..SAMPLES {
                        order.push((l, s, b));
                    }
                }
            }
        }
        Interleave::Bip => {
            for l in 0..LINES {
                for s in 0..SAMPLES {
                    for b in 0..BANDS {
                        order.push((l, s, b));
                    }
                }
            }
        }
    }
    order
}

fn f32_body(interleave: Interleave) -> Vec<u8> {
    file_order(interleave)
        .into_iter()
        .flat_map(|(l, s, b)| value(l, s, b).to_le_bytes())
        .collect()
}

fn assert_cube(data: &ndarray::ArrayD<f64>) {
    assert_eq!(data.shape(), &[LINES, SAMPLES, BANDS]);
    for l in 0..LINES {
        for s in 0..SAMPLES {
            for b in 0..BANDS {
                assert_eq!(data[[l, s, b]], f64::from(value(l, s, b)));
            }
        }
    }
}

#[test]
fn test_all_interleaves_read_as_lines_samples_bands() {
    for (tag, interleave) in [
        ("bsq", Interleave::Bsq),
        ("bil", Interleave::Bil),
        ("bip", Interleave::Bip),
    ] {
        let dir = TempDir::new().unwrap();
        let header = write_fixture(dir.path(), "scene.hdr", header_text(tag, 4, 0, 0).as_bytes());
        write_fixture(dir.path(), "scene.img", &f32_body(interleave));

        let raw = EnviLoader.load(&header).unwrap();
        assert_eq!(raw.kind, FormatKind::EnviHeader);
        assert_eq!(raw.native_order, Some(AxisOrder::Hwc));
        assert_cube(&raw.data);
    }
}

#[test]
fn test_big_endian_u16_with_offset() {
    let dir = TempDir::new().unwrap();
    let offset = 7;
    let header = write_fixture(
        dir.path(),
        "scene.hdr",
        header_text("bip", 12, 1, offset).as_bytes(),
    );

    let mut body = vec![0xAAu8; offset];
    for (l, s, b) in file_order(Interleave::Bip) {
        body.extend_from_slice(&(value(l, s, b) as u16).to_be_bytes());
    }
    // companion with no extension
    write_fixture(dir.path(), "scene", &body);

    let raw = EnviLoader.load(&header).unwrap();
    assert_cube(&raw.data);
}

#[test]
fn test_standardizes_as_hwc() {
    let dir = TempDir::new().unwrap();
    let header = write_fixture(dir.path(), "scene.hdr", header_text("bsq", 4, 0, 0).as_bytes());
    write_fixture(dir.path(), "scene.dat", &f32_body(Interleave::Bsq));

    let raw = EnviLoader.load(&header).unwrap();
    let cube = standardize(raw.data, AxisOrder::Hwc).unwrap();
    assert_eq!(cube.dim(), (LINES, SAMPLES, BANDS));
    assert_eq!(cube.spectrum(2, 1).unwrap()[3], 123.0);
}

#[test]
fn test_missing_companion() {
    let dir = TempDir::new().unwrap();
    let header = write_fixture(dir.path(), "scene.hdr", header_text("bsq", 4, 0, 0).as_bytes());

    assert!(matches!(
        EnviLoader.load(&header),
        Err(EngineError::NoArrayFound { .. })
    ));
}

#[test]
fn test_truncated_companion() {
    let dir = TempDir::new().unwrap();
    let header = write_fixture(dir.path(), "scene.hdr", header_text("bsq", 4, 0, 0).as_bytes());
    let mut body = f32_body(Interleave::Bsq);
    body.truncate(body.len() / 2);
    write_fixture(dir.path(), "scene.img", &body);

    assert!(matches!(
        EnviLoader.load(&header),
        Err(EngineError::MalformedFile { .. })
    ));
}

#[test]
fn test_oversized_geometry_is_malformed() {
    let dir = TempDir::new().unwrap();
    let text = "ENVI\n\
                samples = 4294967296\n\
                lines = 4294967296\n\
                bands = 1\n\
                data type = 4\n";
    let header = write_fixture(dir.path(), "scene.hdr", text.as_bytes());
    write_fixture(dir.path(), "scene.img", &f32_body(Interleave::Bsq));

    assert!(matches!(
        EnviLoader.load(&header),
        Err(EngineError::MalformedFile { .. })
    ));
}

#[test]
fn test_data_type_code_out_of_range() {
    let dir = TempDir::new().unwrap();
    // 2^32 + 4 must not wrap around to float32
    let text = "ENVI\n\
                samples = 3\n\
                lines = 2\n\
                bands = 4\n\
                data type = 4294967300\n";
    let header = write_fixture(dir.path(), "scene.hdr", text.as_bytes());
    write_fixture(dir.path(), "scene.img", &f32_body(Interleave::Bsq));

    assert!(matches!(
        EnviLoader.load(&header),
        Err(EngineError::MalformedFile { .. })
    ));
}
