//! Trait-based cube loading system.
//!
//! Every supported on-disk format is one [`FormatKind`] variant with exactly
//! one [`CubeLoader`] implementation registered in the [`LoaderRegistry`].
//! Callers pick the loader by kind (or by UI format tag) and always receive a
//! [`RawCube`] in on-disk axis order.
//!
//! ## Supported Formats
//!
//! - **NumPy Arrays**: `.npy` (also accepted under the `raw` tag)
//! - **MATLAB**: level-5 `.mat` containers, largest 3-D numeric variable
//! - **ENVI**: `.hdr` header plus companion binary (BSQ, BIL or BIP)
//! - **TIFF / GeoTIFF**: multi-page `.tif`/`.tiff`, pages stacked as bands
//! - **Standard Images**: PNG, JPEG, BMP, WebP (gray or RGB planes)
//!
//! ## Usage
//!
//! ```rust,ignore
//! use hsiview::data::{LoaderRegistry, FormatKind};
//!
//! let registry = LoaderRegistry::new();
//! let raw = registry.load_tag("scene/", "hdr")?;
//! ```

use std::fmt;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use crate::constants::MAGIC_PROBE_LEN;
use crate::data::RawCube;
use crate::error::{EngineError, Result};

/// Closed set of formats the engine can decode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FormatKind {
    /// Single NumPy array file
    RawArray,
    /// MATLAB level-5 container
    MatlabMatrix,
    /// ENVI text header with companion binary
    EnviHeader,
    /// Multi-page TIFF / GeoTIFF
    GeoTiff,
    /// 8/16-bit gray or RGB raster image
    GenericRaster,
}

impl FormatKind {
    /// All kinds in registration order.
    pub fn all() -> &'static [FormatKind] {
        &[
            FormatKind::RawArray,
            FormatKind::MatlabMatrix,
            FormatKind::EnviHeader,
            FormatKind::GeoTiff,
            FormatKind::GenericRaster,
        ]
    }

    /// Map a UI format tag to a kind.
    ///
    /// `hsd` is listed in the UI but has no decoder, so it is rejected like
    /// any unknown tag.
    pub fn from_tag(tag: &str) -> Result<Self> {
        match tag.trim().trim_start_matches('.').to_ascii_lowercase().as_str() {
            "npy" | "raw" => Ok(FormatKind::RawArray),
            "mat" => Ok(FormatKind::MatlabMatrix),
            "hdr" => Ok(FormatKind::EnviHeader),
            "tif" | "tiff" => Ok(FormatKind::GeoTiff),
            "png" | "jpg" | "jpeg" | "bmp" | "webp" => Ok(FormatKind::GenericRaster),
            _ => Err(EngineError::unsupported(tag.trim())),
        }
    }

    /// Canonical tag for this kind.
    pub fn tag(&self) -> &'static str {
        match self {
            FormatKind::RawArray => "npy",
            FormatKind::MatlabMatrix => "mat",
            FormatKind::EnviHeader => "hdr",
            FormatKind::GeoTiff => "tif",
            FormatKind::GenericRaster => "png",
        }
    }

    /// File extensions handled by this kind (lowercase, without dots).
    pub fn extensions(&self) -> &'static [&'static str] {
        match self {
            FormatKind::RawArray => &["npy", "raw"],
            FormatKind::MatlabMatrix => &["mat"],
            FormatKind::EnviHeader => &["hdr"],
            FormatKind::GeoTiff => &["tif", "tiff"],
            FormatKind::GenericRaster => &["png", "jpg", "jpeg", "bmp", "webp"],
        }
    }
}

impl fmt::Display for FormatKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FormatKind::RawArray => "raw-array",
            FormatKind::MatlabMatrix => "matlab-matrix",
            FormatKind::EnviHeader => "envi-header",
            FormatKind::GeoTiff => "geotiff",
            FormatKind::GenericRaster => "generic-raster",
        };
        f.write_str(name)
    }
}

/// Trait for cube format loaders.
///
/// Each [`FormatKind`] has one implementation that turns a file path into a
/// [`RawCube`].
pub trait CubeLoader: Send + Sync {
    /// Unique identifier for this loader (e.g., "npy", "envi").
    fn id(&self) -> &'static str;

    /// Human-readable name for UI display.
    fn display_name(&self) -> &'static str;

    /// Format this loader decodes.
    fn kind(&self) -> FormatKind;

    /// File extensions this loader handles (lowercase, without dots).
    fn extensions(&self) -> &'static [&'static str] {
        self.kind().extensions()
    }

    /// Check the leading bytes of a file for this format's signature.
    ///
    /// Used for auto-detection when no tag is given.
    fn can_load(&self, data: &[u8]) -> bool;

    /// Decode the file at `path`.
    ///
    /// `path` always names a regular file; directory resolution happens in
    /// the registry.
    fn load(&self, path: &Path) -> Result<RawCube>;
}

/// Registry of available cube loaders.
///
/// Provides format detection, directory resolution and a unified loading
/// interface.
pub struct LoaderRegistry {
    loaders: Vec<Box<dyn CubeLoader>>,
}

impl LoaderRegistry {
    /// Create a new registry with all built-in loaders.
    pub fn new() -> Self {
        let mut registry = Self {
            loaders: Vec::new(),
        };

        registry.register(Box::new(super::loaders::NpyLoader));
        registry.register(Box::new(super::loaders::MatLoader));
        registry.register(Box::new(super::loaders::EnviLoader));
        registry.register(Box::new(super::loaders::TiffLoader));
        registry.register(Box::new(super::loaders::ImageLoader));

        registry
    }

    /// Create a registry with no loaders.
    pub fn empty() -> Self {
        Self {
            loaders: Vec::new(),
        }
    }

    /// Register a loader, replacing any existing loader for the same kind.
    pub fn register(&mut self, loader: Box<dyn CubeLoader>) {
        if let Some(slot) = self.loaders.iter_mut().find(|l| l.kind() == loader.kind()) {
            log::debug!("Replacing {} loader with {}", slot.id(), loader.id());
            *slot = loader;
        } else {
            self.loaders.push(loader);
        }
    }

    /// Loader registered for `kind`.
    pub fn loader_for(&self, kind: FormatKind) -> Result<&dyn CubeLoader> {
        self.loaders
            .iter()
            .find(|l| l.kind() == kind)
            .map(|l| l.as_ref())
            .ok_or_else(|| EngineError::unsupported(kind.tag()))
    }

    /// Get all registered loaders.
    pub fn loaders(&self) -> &[Box<dyn CubeLoader>] {
        &self.loaders
    }

    /// Get all supported file extensions (for file filtering).
    pub fn supported_extensions(&self) -> Vec<&'static str> {
        let mut extensions: Vec<&'static str> = self
            .loaders
            .iter()
            .flat_map(|l| l.extensions().iter().copied())
            .collect();
        extensions.sort();
        extensions.dedup();
        extensions
    }

    /// Check if a filename has a supported extension.
    pub fn is_supported_file(&self, filename: &str) -> bool {
        let lower = filename.to_lowercase();
        self.supported_extensions()
            .iter()
            .any(|ext| lower.ends_with(&format!(".{}", ext)))
    }

    /// Load a cube of a known kind.
    ///
    /// A directory resolves to its first file (lexicographic) carrying one of
    /// the kind's extensions.
    pub fn load(&self, path: &Path, kind: FormatKind) -> Result<RawCube> {
        let loader = self.loader_for(kind)?;
        let file = resolve_input(path, loader.extensions())?;
        self.load_file(loader, &file)
    }

    /// Load a cube using a UI format tag such as `"npy"` or `"hdr"`.
    ///
    /// A directory resolves to its first file (lexicographic) whose name ends
    /// with `.<tag>`.
    pub fn load_tag(&self, path: &Path, tag: &str) -> Result<RawCube> {
        let kind = FormatKind::from_tag(tag)?;
        let loader = self.loader_for(kind)?;
        let suffix = tag.trim().trim_start_matches('.').to_ascii_lowercase();
        let file = resolve_input(path, &[suffix.as_str()])?;
        self.load_file(loader, &file)
    }

    /// Load a file, detecting its format from magic bytes then extension.
    pub fn load_auto(&self, path: &Path) -> Result<RawCube> {
        let kind = self.detect(path)?;
        self.load(path, kind)
    }

    /// Detect the format of a file.
    ///
    /// Magic bytes win; the extension is the fallback. Directories are not
    /// probed.
    pub fn detect(&self, path: &Path) -> Result<FormatKind> {
        if !path.exists() {
            return Err(EngineError::FileNotFound {
                path: path.to_path_buf(),
            });
        }
        if path.is_dir() {
            return Err(EngineError::no_array(format!(
                "cannot detect the format of directory {}",
                path.display()
            )));
        }

        let probe = read_probe(path)?;
        if let Some(loader) = self.loaders.iter().find(|l| l.can_load(&probe)) {
            log::trace!("Detected {} by magic bytes: {}", loader.kind(), path.display());
            return Ok(loader.kind());
        }

        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .unwrap_or_default();
        self.loaders
            .iter()
            .find(|l| l.extensions().contains(&extension.as_str()))
            .map(|l| {
                log::trace!("Detected {} by extension: {}", l.kind(), path.display());
                l.kind()
            })
            .ok_or_else(|| EngineError::unsupported(extension))
    }

    fn load_file(&self, loader: &dyn CubeLoader, file: &Path) -> Result<RawCube> {
        log::trace!("Trying {} loader on {}", loader.id(), file.display());
        let raw = loader.load(file)?;
        log::info!(
            "Loaded {} with {} loader: shape {:?}",
            file.display(),
            loader.id(),
            raw.shape()
        );
        Ok(raw)
    }
}

impl Default for LoaderRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Turn a user-supplied path into the file to decode.
fn resolve_input(path: &Path, suffixes: &[&str]) -> Result<PathBuf> {
    if !path.exists() {
        return Err(EngineError::FileNotFound {
            path: path.to_path_buf(),
        });
    }
    if path.is_dir() {
        resolve_directory(path, suffixes)
    } else {
        Ok(path.to_path_buf())
    }
}

/// First regular file in `dir`, by name, ending with `.<suffix>` for any of
/// `suffixes` (case-insensitive).
pub fn resolve_directory(dir: &Path, suffixes: &[&str]) -> Result<PathBuf> {
    let mut matches: Vec<PathBuf> = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        let entry_path = entry.path();
        if !entry_path.is_file() {
            continue;
        }
        let name = entry.file_name().to_string_lossy().to_lowercase();
        if suffixes
            .iter()
            .any(|suffix| name.ends_with(&format!(".{}", suffix.to_ascii_lowercase())))
        {
            matches.push(entry_path);
        }
    }

    matches.sort();
    let first = matches.into_iter().next().ok_or_else(|| {
        let wanted: Vec<String> = suffixes.iter().map(|s| format!(".{}", s)).collect();
        EngineError::no_array(format!(
            "no {} files found in directory {}",
            wanted.join("/"),
            dir.display()
        ))
    })?;

    log::debug!("Resolved directory {} to {}", dir.display(), first.display());
    Ok(first)
}

/// Leading bytes of a file for magic-byte checks.
fn read_probe(path: &Path) -> Result<Vec<u8>> {
    let file = File::open(path)?;
    let mut probe = Vec::with_capacity(MAGIC_PROBE_LEN);
    file.take(MAGIC_PROBE_LEN as u64).read_to_end(&mut probe)?;
    Ok(probe)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_has_one_loader_per_kind() {
        let registry = LoaderRegistry::new();
        assert_eq!(registry.loaders().len(), FormatKind::all().len());
        for &kind in FormatKind::all() {
            assert_eq!(registry.loader_for(kind).unwrap().kind(), kind);
        }
    }

    #[test]
    fn test_tag_mapping() {
        assert_eq!(FormatKind::from_tag("npy").unwrap(), FormatKind::RawArray);
        assert_eq!(FormatKind::from_tag("raw").unwrap(), FormatKind::RawArray);
        assert_eq!(FormatKind::from_tag("MAT").unwrap(), FormatKind::MatlabMatrix);
        assert_eq!(FormatKind::from_tag("hdr").unwrap(), FormatKind::EnviHeader);
        assert_eq!(FormatKind::from_tag(".tiff").unwrap(), FormatKind::GeoTiff);
        assert_eq!(FormatKind::from_tag("png").unwrap(), FormatKind::GenericRaster);
    }

    #[test]
    fn test_placeholder_tag_is_unsupported() {
        for tag in ["hsd", "h5", ""] {
            assert!(matches!(
                FormatKind::from_tag(tag),
                Err(EngineError::UnsupportedFormat { .. })
            ));
        }
    }

    #[test]
    fn test_supported_extensions() {
        let registry = LoaderRegistry::new();
        let extensions = registry.supported_extensions();

        assert!(extensions.contains(&"npy"));
        assert!(extensions.contains(&"mat"));
        assert!(extensions.contains(&"hdr"));
        assert!(extensions.contains(&"tif"));
        assert!(extensions.contains(&"png"));
    }

    #[test]
    fn test_is_supported_file() {
        let registry = LoaderRegistry::new();

        assert!(registry.is_supported_file("scene.hdr"));
        assert!(registry.is_supported_file("data.npy"));
        assert!(registry.is_supported_file("IMAGE.PNG")); // case insensitive
        assert!(!registry.is_supported_file("document.pdf"));
    }

    #[test]
    fn test_missing_path() {
        let registry = LoaderRegistry::new();
        let err = registry
            .load(Path::new("/definitely/not/here.npy"), FormatKind::RawArray)
            .unwrap_err();
        assert!(matches!(err, EngineError::FileNotFound { .. }));
    }

    #[test]
    fn test_empty_registry_rejects_kind() {
        let registry = LoaderRegistry::empty();
        assert!(matches!(
            registry.loader_for(FormatKind::RawArray),
            Err(EngineError::UnsupportedFormat { .. })
        ));
    }
}
