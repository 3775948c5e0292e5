//! NumPy fixture tests.

use std::fs::File;

use ndarray::{Array2, Array3, ArrayD, IxDyn, ShapeBuilder};
use ndarray_npy::WriteNpyExt;
use tempfile::TempDir;

use super::write_fixture;
use crate::data::loaders::NpyLoader;
use crate::data::{AxisOrder, CubeLoader, FormatKind, standardize};
use crate::error::EngineError;

#[test]
fn test_load_f32_cube() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("cube.npy");
    let array = Array3::<f32>::from_shape_fn((3, 4, 5), |(c, h, w)| (c * 100 + h * 10 + w) as f32);
    array.write_npy(File::create(&path).unwrap()).unwrap();

    let raw = NpyLoader.load(&path).unwrap();
    assert_eq!(raw.kind, FormatKind::RawArray);
    assert_eq!(raw.shape(), &[3, 4, 5]);
    assert_eq!(raw.native_order, None);
    assert_eq!(raw.data[[2, 3, 4]], 234.0);

    // load-then-standardize: (3, 4, 5) read as CHW is (4, 5, 3)
    let cube = standardize(raw.data, AxisOrder::Chw).unwrap();
    assert_eq!(cube.dim(), (4, 5, 3));
}

#[test]
fn test_integer_dtypes_keep_raw_values() {
    let dir = TempDir::new().unwrap();

    let u16_path = dir.path().join("u16.npy");
    Array3::<u16>::from_elem((2, 2, 2), 60_000)
        .write_npy(File::create(&u16_path).unwrap())
        .unwrap();
    let raw = NpyLoader.load(&u16_path).unwrap();
    assert!(raw.data.iter().all(|&v| v == 60_000.0));

    let i16_path = dir.path().join("i16.npy");
    Array3::<i16>::from_elem((1, 2, 3), -7)
        .write_npy(File::create(&i16_path).unwrap())
        .unwrap();
    let raw = NpyLoader.load(&i16_path).unwrap();
    assert!(raw.data.iter().all(|&v| v == -7.0));

    let i64_path = dir.path().join("i64.npy");
    Array3::<i64>::from_elem((1, 1, 2), 1 << 40)
        .write_npy(File::create(&i64_path).unwrap())
        .unwrap();
    let raw = NpyLoader.load(&i64_path).unwrap();
    assert_eq!(raw.data[[0, 0, 1]], (1u64 << 40) as f64);
}

#[test]
fn test_fortran_order_is_honored() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("fortran.npy");
    let values: Vec<f64> = (0..24).map(f64::from).collect();
    let array = ArrayD::from_shape_vec(IxDyn(&[2, 3, 4]).f(), values).unwrap();
    array.write_npy(File::create(&path).unwrap()).unwrap();

    let raw = NpyLoader.load(&path).unwrap();
    assert_eq!(raw.data, array);
    assert_eq!(raw.data[[1, 2, 3]], (1 + 2 * 2 + 3 * 6) as f64);
}

#[test]
fn test_two_dimensional_array_fails_standardization() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("flat.npy");
    Array2::<f64>::zeros((4, 4))
        .write_npy(File::create(&path).unwrap())
        .unwrap();

    let raw = NpyLoader.load(&path).unwrap();
    assert!(matches!(
        standardize(raw.data, AxisOrder::Hwc),
        Err(EngineError::MalformedFile { .. })
    ));
}

#[test]
fn test_boolean_array_is_malformed() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("mask.npy");
    Array3::<bool>::from_elem((2, 2, 2), true)
        .write_npy(File::create(&path).unwrap())
        .unwrap();

    assert!(matches!(
        NpyLoader.load(&path),
        Err(EngineError::MalformedFile { .. })
    ));
}

#[test]
fn test_truncated_file_is_malformed() {
    let dir = TempDir::new().unwrap();
    let mut bytes = Vec::new();
    Array3::<f32>::zeros((4, 4, 4)).write_npy(&mut bytes).unwrap();
    bytes.truncate(bytes.len() - 10);
    let path = write_fixture(dir.path(), "cube.npy", &bytes);

    assert!(matches!(
        NpyLoader.load(&path),
        Err(EngineError::MalformedFile { .. })
    ));
}

#[test]
fn test_missing_file() {
    let dir = TempDir::new().unwrap();
    let err = NpyLoader.load(&dir.path().join("absent.npy")).unwrap_err();
    assert!(matches!(err, EngineError::FileNotFound { .. }));
}
