//! Error types for cube loading, navigation and export.

use std::path::PathBuf;
use thiserror::Error;

/// Boxed underlying cause kept for diagnostics.
pub type BoxedCause = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Result type for engine operations.
pub type Result<T> = std::result::Result<T, EngineError>;

/// Errors that can occur while loading, browsing or exporting a cube.
#[derive(Error, Debug)]
pub enum EngineError {
    /// Input path does not exist or cannot be read
    #[error("File not found: {path:?}")]
    FileNotFound {
        /// The path that was requested
        path: PathBuf,
    },

    /// Format tag is not backed by a loader
    #[error("Unsupported file format: {tag}")]
    UnsupportedFormat {
        /// The tag that was requested (e.g. "hsd")
        tag: String,
    },

    /// No suitable 3-D array or matching file was found
    #[error("No array found: {message}")]
    NoArrayFound {
        /// What was searched for
        message: String,
    },

    /// File could be read but its content is not a usable cube
    #[error("Malformed file: {message}")]
    MalformedFile {
        /// Description of what went wrong
        message: String,
        /// Decoder error that caused the failure, if any
        #[source]
        source: Option<BoxedCause>,
    },

    /// Wavelength endpoints were only partially supplied or are inconsistent
    #[error("Invalid wavelength range: {message}")]
    InvalidWavelengthRange {
        /// Human-readable validation message
        message: String,
    },

    /// Index outside the valid range of the current cube
    #[error("{what} index {index} out of range (valid: 0..{bound})")]
    IndexOutOfRange {
        /// Which axis or coordinate was out of range
        what: &'static str,
        /// The offending index
        index: usize,
        /// Exclusive upper bound
        bound: usize,
    },

    /// Export requested with no collected points
    #[error("Nothing to export: no spectral points have been collected")]
    EmptyExport,

    /// Operation requires a loaded cube
    #[error("No cube loaded")]
    NoCubeLoaded,

    /// Load request was superseded before it finished
    #[error("Load request {token} was cancelled")]
    Cancelled {
        /// Token of the abandoned request
        token: u64,
    },

    /// I/O error while writing output
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV serialization error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

impl EngineError {
    /// Create a malformed-file error with a message only.
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::MalformedFile {
            message: message.into(),
            source: None,
        }
    }

    /// Create a malformed-file error wrapping the decoder error.
    pub fn malformed_with<E>(message: impl Into<String>, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::MalformedFile {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create a no-array-found error.
    pub fn no_array(message: impl Into<String>) -> Self {
        Self::NoArrayFound {
            message: message.into(),
        }
    }

    /// Create an unsupported-format error.
    pub fn unsupported(tag: impl Into<String>) -> Self {
        Self::UnsupportedFormat { tag: tag.into() }
    }

    /// Create an invalid-wavelength-range error.
    pub fn invalid_wavelength(message: impl Into<String>) -> Self {
        Self::InvalidWavelengthRange {
            message: message.into(),
        }
    }

    /// Create an index-out-of-range error.
    pub fn index_out_of_range(what: &'static str, index: usize, bound: usize) -> Self {
        Self::IndexOutOfRange { what, index, bound }
    }
}
