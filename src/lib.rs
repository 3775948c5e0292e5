//! hsiview - Hyperspectral cube processing engine
//!
//! Loads hyperspectral cubes from several on-disk formats, standardizes them
//! to `[height, width, channel]`, and supports channel browsing, contrast
//! enhancement, orientation changes, spectral point collection and CSV
//! export of the collected signatures.

pub mod config;
pub mod constants;
pub mod data;
pub mod error;
pub mod export;
pub mod model;
pub mod processing;
pub mod state;
pub mod synthetic;

pub use config::{ConfigError, EngineConfig, LogLevel};
pub use data::{AxisOrder, Cube, FormatKind, LoaderRegistry, RawCube};
pub use error::{EngineError, Result};
pub use model::{PointStore, SpectralPoint, WavelengthRange};
pub use state::{LoadWorker, Session};
