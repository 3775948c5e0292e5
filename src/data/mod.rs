//! Cube data structures, axis standardization and format loaders.
//!
//! This module provides:
//! - `RawCube`: decoded samples in on-disk axis order
//! - `Cube`: the canonical `(H, W, C)` cube every engine operation works on
//! - `AxisOrder` and `standardize`: the mapping between the two
//! - `LoaderRegistry`: one loader per `FormatKind`
//!
//! ## Adding New Formats
//!
//! 1. Add a `FormatKind` variant with its tags and extensions
//! 2. Create a loader in `loaders/` implementing `CubeLoader`
//! 3. Register it in `LoaderRegistry::new()`
//!
//! ```rust,ignore
//! use hsiview::data::{CubeLoader, FormatKind, RawCube};
//! use hsiview::error::Result;
//!
//! pub struct MyFormatLoader;
//!
//! impl CubeLoader for MyFormatLoader {
//!     fn id(&self) -> &'static str { "myformat" }
//!     fn display_name(&self) -> &'static str { "My Format" }
//!     fn kind(&self) -> FormatKind { FormatKind::MyFormat }
//!     fn can_load(&self, data: &[u8]) -> bool { /* check magic bytes */ }
//!     fn load(&self, path: &Path) -> Result<RawCube> { /* ... */ }
//! }
//! ```

mod axis_order;
mod cube;
mod loader;
pub mod loaders;

pub use axis_order::{AxisOrder, destandardize, dimension_info, preview, standardize};
pub use cube::{Cube, RawCube};
pub use loader::{CubeLoader, FormatKind, LoaderRegistry, resolve_directory};
