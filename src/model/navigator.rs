//! Current-channel state with bounded stepping.

use crate::error::{EngineError, Result};

/// Tracks which spectral channel is displayed.
///
/// The index always stays inside `[0, channels - 1]`; stepping past either
/// end saturates instead of wrapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ChannelNavigator {
    current: usize,
    channels: usize,
}

impl ChannelNavigator {
    /// Navigator for a cube with `channels` bands, starting at channel 0.
    pub fn new(channels: usize) -> Self {
        Self {
            current: 0,
            channels,
        }
    }

    /// Current channel index.
    pub fn current(&self) -> usize {
        self.current
    }

    /// Number of channels being navigated.
    pub fn channels(&self) -> usize {
        self.channels
    }

    /// Step forward, saturating at the last channel.
    pub fn next(&mut self) -> usize {
        if self.current + 1 < self.channels {
            self.current += 1;
        }
        self.current
    }

    /// Step back, saturating at channel 0.
    pub fn prev(&mut self) -> usize {
        self.current = self.current.saturating_sub(1);
        self.current
    }

    /// Jump to `index`.
    pub fn set(&mut self, index: usize) -> Result<()> {
        if index >= self.channels {
            return Err(EngineError::index_out_of_range(
                "channel",
                index,
                self.channels,
            ));
        }
        self.current = index;
        Ok(())
    }

    /// Re-bound after the cube was replaced by one with `channels` bands.
    ///
    /// The index is kept when still valid and pulled down to the last channel
    /// otherwise.
    pub fn clamp_to(&mut self, channels: usize) {
        self.channels = channels;
        if self.current >= channels {
            self.current = channels.saturating_sub(1);
        }
    }

    /// Start over at channel 0 with a new channel count.
    pub fn reset(&mut self, channels: usize) {
        *self = Self::new(channels);
    }

    /// Display text, e.g. `Channel: 3 / 10`.
    pub fn label(&self) -> String {
        if self.channels == 0 {
            return "Channel: - / 0".to_string();
        }
        format!("Channel: {} / {}", self.current + 1, self.channels)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_next_saturates() {
        let mut nav = ChannelNavigator::new(3);
        assert_eq!(nav.next(), 1);
        assert_eq!(nav.next(), 2);
        assert_eq!(nav.next(), 2);
    }

    #[test]
    fn test_prev_saturates() {
        let mut nav = ChannelNavigator::new(3);
        assert_eq!(nav.prev(), 0);
        nav.set(2).unwrap();
        assert_eq!(nav.prev(), 1);
    }

    #[test]
    fn test_random_walk_stays_in_bounds() {
        let mut nav = ChannelNavigator::new(5);
        // deterministic pseudo-random walk
        let mut state = 17u32;
        for _ in 0..500 {
            state = state.wrapping_mul(1_103_515_245).wrapping_add(12_345);
            if state & 0x100 == 0 {
                nav.next();
            } else {
                nav.prev();
            }
            assert!(nav.current() < 5);
        }
    }

    #[test]
    fn test_set_out_of_range() {
        let mut nav = ChannelNavigator::new(4);
        assert!(matches!(
            nav.set(4),
            Err(EngineError::IndexOutOfRange { index: 4, bound: 4, .. })
        ));
        assert_eq!(nav.current(), 0);
    }

    #[test]
    fn test_clamp_to_smaller_cube() {
        let mut nav = ChannelNavigator::new(10);
        nav.set(8).unwrap();
        nav.clamp_to(20);
        assert_eq!(nav.current(), 8);
        nav.clamp_to(4);
        assert_eq!(nav.current(), 3);
    }

    #[test]
    fn test_empty_navigator() {
        let mut nav = ChannelNavigator::default();
        assert_eq!(nav.next(), 0);
        assert_eq!(nav.prev(), 0);
        assert!(nav.set(0).is_err());
    }

    #[test]
    fn test_label() {
        let mut nav = ChannelNavigator::new(10);
        nav.next();
        nav.next();
        assert_eq!(nav.label(), "Channel: 3 / 10");
    }
}
