//! Session-level models: channel navigation, collected points and
//! wavelength calibration.

mod navigator;
mod points;
mod wavelength;

pub use navigator::ChannelNavigator;
pub use points::{PointStore, SpectralPoint};
pub use wavelength::{WavelengthRange, axis_for, axis_label};
