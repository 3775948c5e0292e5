//! The browsing session: one cube plus everything derived from it.
//!
//! `Session` is the single owner of the live cube, the channel navigator,
//! the collected points and the wavelength calibration. Every operation a
//! front end can trigger goes through it.

use std::path::{Path, PathBuf};

use ndarray::{Array2, ArrayView2};

use super::load_worker::{LoadOutcome, LoadRequest, LoadToken, LoadWorker};
use crate::data::{AxisOrder, Cube, FormatKind, LoaderRegistry, RawCube, dimension_info, standardize};
use crate::error::{EngineError, Result};
use crate::export;
use crate::model::{ChannelNavigator, PointStore, SpectralPoint, WavelengthRange};
use crate::processing::{self, Orientation};

/// A standardized cube together with where it came from.
#[derive(Debug, Clone)]
pub struct LoadedCube {
    /// Canonical `(H, W, C)` cube
    pub cube: Cube,
    /// Shape before standardization
    pub raw_shape: Vec<usize>,
    /// Axis order the raw data was read with
    pub axis_order: AxisOrder,
    /// Resolved source file
    pub source: PathBuf,
    /// Format it was decoded with
    pub kind: FormatKind,
}

impl LoadedCube {
    /// Standardize a freshly decoded cube.
    pub fn from_raw(raw: RawCube, axis_order: AxisOrder) -> Result<Self> {
        if let Some(native) = raw.native_order {
            if native != axis_order {
                log::warn!(
                    "{} data is natively {} but was declared {}",
                    raw.kind,
                    native,
                    axis_order
                );
            }
        }

        let raw_shape = raw.shape().to_vec();
        let RawCube {
            data, kind, source, ..
        } = raw;
        let cube = standardize(data, axis_order)?;

        Ok(Self {
            cube,
            raw_shape,
            axis_order,
            source,
            kind,
        })
    }

    /// Human-readable description of the standardization.
    pub fn dimension_info(&self) -> String {
        dimension_info(&self.raw_shape, self.axis_order, &self.cube)
    }
}

/// Engine state for one user session.
pub struct Session {
    registry: LoaderRegistry,
    loaded: Option<LoadedCube>,
    navigator: ChannelNavigator,
    points: PointStore,
    wavelength_range: Option<WavelengthRange>,
    last_error: Option<String>,
    pending_load: Option<LoadToken>,
}

impl Session {
    /// Empty session with all built-in loaders.
    pub fn new() -> Self {
        Self::with_registry(LoaderRegistry::new())
    }

    /// Empty session loading through `registry`.
    pub fn with_registry(registry: LoaderRegistry) -> Self {
        Self {
            registry,
            loaded: None,
            navigator: ChannelNavigator::default(),
            points: PointStore::new(),
            wavelength_range: None,
            last_error: None,
            pending_load: None,
        }
    }

    // ========================================================================
    // Loading
    // ========================================================================

    /// Load a cube synchronously from a file or directory.
    pub fn load_cube(&mut self, path: &Path, tag: &str, axis_order: AxisOrder) -> Result<()> {
        let result = self
            .registry
            .load_tag(path, tag)
            .and_then(|raw| LoadedCube::from_raw(raw, axis_order));
        let loaded = self.record(result)?;
        self.install_loaded(loaded);
        Ok(())
    }

    /// Standardize and install an already decoded cube.
    pub fn install_cube(&mut self, raw: RawCube, axis_order: AxisOrder) -> Result<()> {
        let loaded = self.record(LoadedCube::from_raw(raw, axis_order))?;
        self.install_loaded(loaded);
        Ok(())
    }

    /// Replace the live cube.
    ///
    /// The channel goes back to 0 and collected points are dropped since they
    /// refer to the previous cube.
    pub fn install_loaded(&mut self, loaded: LoadedCube) {
        log::info!("Session: {}", loaded.dimension_info());
        self.navigator.reset(loaded.cube.channels());
        let dropped = self.points.clear();
        if dropped > 0 {
            log::debug!("Session: dropped {} point(s) from previous cube", dropped);
        }
        self.loaded = Some(loaded);
        self.last_error = None;
    }

    /// Queue a background load; earlier pending loads become stale.
    pub fn request_load(
        &mut self,
        worker: &mut LoadWorker,
        path: impl Into<PathBuf>,
        tag: &str,
        axis_order: AxisOrder,
    ) -> LoadToken {
        let token = worker.request(LoadRequest {
            path: path.into(),
            tag: tag.to_string(),
            axis_order,
        });
        self.pending_load = Some(token);
        token
    }

    /// Apply a worker outcome if it answers the latest request.
    ///
    /// Returns `false` when the outcome was stale and discarded.
    pub fn accept(&mut self, outcome: LoadOutcome) -> bool {
        if self.pending_load != Some(outcome.token) {
            log::debug!("Session: discarding stale load {}", outcome.token.value());
            return false;
        }
        self.pending_load = None;

        if let Ok(loaded) = self.record(outcome.result) {
            self.install_loaded(loaded);
        }
        true
    }

    /// True while a requested load has not been accepted yet.
    pub fn is_loading(&self) -> bool {
        self.pending_load.is_some()
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    /// The live cube.
    pub fn cube(&self) -> Option<&Cube> {
        self.loaded.as_ref().map(|l| &l.cube)
    }

    /// The live cube with its load metadata.
    pub fn loaded(&self) -> Option<&LoadedCube> {
        self.loaded.as_ref()
    }

    /// Standardization summary of the live cube.
    pub fn dimension_info(&self) -> Option<String> {
        self.loaded.as_ref().map(LoadedCube::dimension_info)
    }

    /// Message of the last failed load or export.
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Channel navigator state.
    pub fn navigator(&self) -> &ChannelNavigator {
        &self.navigator
    }

    /// Current channel index.
    pub fn current_channel(&self) -> usize {
        self.navigator.current()
    }

    /// Collected points.
    pub fn points(&self) -> &PointStore {
        &self.points
    }

    /// Active wavelength calibration.
    pub fn wavelength_range(&self) -> Option<&WavelengthRange> {
        self.wavelength_range.as_ref()
    }

    fn require_cube(&self) -> Result<&Cube> {
        self.cube().ok_or(EngineError::NoCubeLoaded)
    }

    // ========================================================================
    // Wavelengths
    // ========================================================================

    /// Set or clear the calibration from optional endpoints.
    ///
    /// On error the previous calibration is kept.
    pub fn set_wavelength_range(&mut self, start: Option<f64>, end: Option<f64>) -> Result<()> {
        self.wavelength_range = WavelengthRange::from_inputs(start, end)?;
        Ok(())
    }

    // ========================================================================
    // Channel navigation
    // ========================================================================

    /// Jump to a channel.
    pub fn set_channel(&mut self, index: usize) -> Result<()> {
        self.require_cube()?;
        self.navigator.set(index)
    }

    /// Step to the next channel, saturating at the last.
    pub fn next_channel(&mut self) -> Result<usize> {
        self.require_cube()?;
        Ok(self.navigator.next())
    }

    /// Step to the previous channel, saturating at 0.
    pub fn prev_channel(&mut self) -> Result<usize> {
        self.require_cube()?;
        Ok(self.navigator.prev())
    }

    /// Raw samples of the current channel.
    pub fn current_slice(&self) -> Result<ArrayView2<'_, f64>> {
        self.require_cube()?.channel(self.navigator.current())
    }

    /// Current channel normalized to `[0, 1]`, then contrast/brightness
    /// adjusted.
    pub fn enhance(&self, contrast: f64, brightness: f64) -> Result<Array2<f64>> {
        let slice = self.current_slice()?;
        Ok(processing::enhance(
            &processing::normalize(&slice),
            contrast,
            brightness,
        ))
    }

    // ========================================================================
    // Orientation
    // ========================================================================

    /// Replace the cube with an oriented copy.
    pub fn orient(&mut self, orientation: Orientation) -> Result<()> {
        let loaded = self.loaded.as_mut().ok_or(EngineError::NoCubeLoaded)?;
        loaded.cube = orientation.apply(&loaded.cube);
        self.navigator.clamp_to(loaded.cube.channels());
        log::debug!(
            "Session: applied {}, cube is now {:?}",
            orientation.name(),
            loaded.cube.dim()
        );
        Ok(())
    }

    /// Reverse row order.
    pub fn flip_vertical(&mut self) -> Result<()> {
        self.orient(Orientation::FlipVertical)
    }

    /// Reverse column order.
    pub fn flip_horizontal(&mut self) -> Result<()> {
        self.orient(Orientation::FlipHorizontal)
    }

    /// Rotate 90° counter-clockwise.
    pub fn rotate90(&mut self) -> Result<()> {
        self.orient(Orientation::Rotate90)
    }

    // ========================================================================
    // Points
    // ========================================================================

    /// Capture the full spectrum at column `x`, row `y`.
    pub fn add_point(&mut self, x: usize, y: usize) -> Result<&SpectralPoint> {
        let cube = self.loaded.as_ref().map(|l| &l.cube).ok_or(EngineError::NoCubeLoaded)?;
        self.points.append(x, y, cube)
    }

    /// Capture a channel sub-range of the spectrum at `(x, y)`.
    pub fn add_point_range(
        &mut self,
        x: usize,
        y: usize,
        channels: std::ops::Range<usize>,
    ) -> Result<&SpectralPoint> {
        let cube = self.loaded.as_ref().map(|l| &l.cube).ok_or(EngineError::NoCubeLoaded)?;
        self.points.append_range(x, y, cube, channels)
    }

    /// Remove the most recent point.
    pub fn undo_point(&mut self) -> Option<SpectralPoint> {
        self.points.undo()
    }

    /// Remove all points.
    pub fn clear_points(&mut self) -> usize {
        self.points.clear()
    }

    // ========================================================================
    // Export
    // ========================================================================

    /// Collected signatures as CSV bytes.
    pub fn export_csv(&mut self) -> Result<Vec<u8>> {
        let result = export::export_csv(&self.points, self.wavelength_range.as_ref());
        self.record(result)
    }

    /// Write collected signatures to `path`.
    pub fn export_to_path(&mut self, path: &Path) -> Result<()> {
        let result = export::export_to_path(&self.points, self.wavelength_range.as_ref(), path);
        self.record(result)
    }

    /// Remember the outcome of a load or export for display.
    fn record<T>(&mut self, result: Result<T>) -> Result<T> {
        match &result {
            Ok(_) => self.last_error = None,
            Err(e) => {
                log::warn!("Session: {}", e);
                self.last_error = Some(e.to_string());
            }
        }
        result
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}
