//! Global constants for hsiview

/// Axis column label when a wavelength range is known
pub const WAVELENGTH_AXIS_LABEL: &str = "Wavelength (nm)";

/// Axis column label when only channel indices are available
pub const CHANNEL_AXIS_LABEL: &str = "Channel";

/// Default file name for exported spectral signatures
pub const DEFAULT_EXPORT_FILENAME: &str = "spectral_signatures.csv";

/// Default format tag when none is configured
pub const DEFAULT_FORMAT_TAG: &str = "npy";

/// Default synthetic cube width
pub const DEFAULT_TEST_WIDTH: usize = 64;

/// Default synthetic cube height
pub const DEFAULT_TEST_HEIGHT: usize = 48;

/// Default number of spectral channels for synthetic cubes
pub const DEFAULT_TEST_BANDS: usize = 16;

/// Number of bytes read from a file for magic-byte detection (one MAT header)
pub const MAGIC_PROBE_LEN: usize = 128;
