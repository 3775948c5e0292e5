//! Collected spectral signatures.
//!
//! A [`SpectralPoint`] is a snapshot: the spectrum is copied out of the cube
//! when the point is added, so later flips, rotations or enhancements of the
//! cube never reach points already stored.

use std::ops::Range;

use crate::data::Cube;
use crate::error::{EngineError, Result};

/// One clicked pixel and the spectrum captured there.
#[derive(Debug, Clone, PartialEq)]
pub struct SpectralPoint {
    /// Column index
    pub x: usize,
    /// Row index
    pub y: usize,
    /// Samples for channels `first_channel..first_channel + spectrum.len()`
    pub spectrum: Vec<f64>,
    /// First captured channel
    pub first_channel: usize,
    /// Channel count of the cube the point was taken from
    pub channel_count: usize,
}

impl SpectralPoint {
    /// Sample at `channel`, `None` outside the captured range.
    pub fn sample(&self, channel: usize) -> Option<f64> {
        channel
            .checked_sub(self.first_channel)
            .and_then(|offset| self.spectrum.get(offset).copied())
    }

    /// Channels covered by `spectrum`.
    pub fn channel_range(&self) -> Range<usize> {
        self.first_channel..self.first_channel + self.spectrum.len()
    }

    /// Column header for the `ordinal`-th point (1-based), e.g. `Point 1 (2, 1)`.
    pub fn label(&self, ordinal: usize) -> String {
        format!("Point {} ({}, {})", ordinal, self.x, self.y)
    }
}

/// Ordered collection of spectral points with undo and clear.
#[derive(Debug, Clone, Default)]
pub struct PointStore {
    points: Vec<SpectralPoint>,
}

impl PointStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Capture the full spectrum at `(x, y)`.
    pub fn append(&mut self, x: usize, y: usize, cube: &Cube) -> Result<&SpectralPoint> {
        self.append_range(x, y, cube, 0..cube.channels())
    }

    /// Capture channels `channels` of the spectrum at `(x, y)`.
    pub fn append_range(
        &mut self,
        x: usize,
        y: usize,
        cube: &Cube,
        channels: Range<usize>,
    ) -> Result<&SpectralPoint> {
        let spectrum = cube.spectrum(x, y)?;
        if channels.is_empty() || channels.end > cube.channels() {
            let bad = if channels.is_empty() {
                channels.start
            } else {
                channels.end - 1
            };
            return Err(EngineError::index_out_of_range(
                "channel",
                bad,
                cube.channels(),
            ));
        }

        let point = SpectralPoint {
            x,
            y,
            spectrum: spectrum.slice(ndarray::s![channels.clone()]).to_vec(),
            first_channel: channels.start,
            channel_count: cube.channels(),
        };
        log::debug!(
            "Points: added ({}, {}) with {} channel(s), {} stored",
            x,
            y,
            point.spectrum.len(),
            self.points.len() + 1
        );
        self.points.push(point);
        Ok(&self.points[self.points.len() - 1])
    }

    /// Remove and return the most recent point; no-op when empty.
    pub fn undo(&mut self) -> Option<SpectralPoint> {
        let point = self.points.pop()?;
        log::debug!(
            "Points: undid ({}, {}), {} remaining",
            point.x,
            point.y,
            self.points.len()
        );
        Some(point)
    }

    /// Remove every point, returning how many were dropped.
    pub fn clear(&mut self) -> usize {
        let removed = self.points.len();
        self.points.clear();
        log::debug!("Points: cleared {}", removed);
        removed
    }

    /// Number of stored points.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// True when no points are stored.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// All points in insertion order.
    pub fn all(&self) -> &[SpectralPoint] {
        &self.points
    }

    /// Most recently added point.
    pub fn last(&self) -> Option<&SpectralPoint> {
        self.points.last()
    }

    /// Iterate in insertion order.
    pub fn iter(&self) -> std::slice::Iter<'_, SpectralPoint> {
        self.points.iter()
    }
}

impl<'a> IntoIterator for &'a PointStore {
    type Item = &'a SpectralPoint;
    type IntoIter = std::slice::Iter<'a, SpectralPoint>;

    fn into_iter(self) -> Self::IntoIter {
        self.points.iter()
    }
}
