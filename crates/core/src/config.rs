//! Board configuration
//!
//! Dimensions, palette, seed and effect durations are supplied once when a
//! [`Session`](crate::Session) is created and never change afterwards.

use thiserror::Error;

use crate::types::{
    Color, DEFAULT_BOARD_HEIGHT, DEFAULT_BOARD_WIDTH, FALL_IN_MS, MERGE_MS, PALETTE_SIZE,
    ROTATE_MS, SHIFT_MS,
};

/// Fixed durations of the asynchronous effects (milliseconds)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timing {
    pub merge_ms: u32,
    pub shift_ms: u32,
    pub fall_in_ms: u32,
    pub rotate_ms: u32,
}

impl Default for Timing {
    fn default() -> Self {
        Self {
            merge_ms: MERGE_MS,
            shift_ms: SHIFT_MS,
            fall_in_ms: FALL_IN_MS,
            rotate_ms: ROTATE_MS,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoardConfig {
    pub width: u8,
    pub height: u8,
    pub palette: [Color; PALETTE_SIZE],
    pub seed: u32,
    pub timing: Timing,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("board width must be at least 2, got {0}")]
    TooNarrow(u8),
    #[error("board height must be at least 2, got {0}")]
    TooShort(u8),
    #[error("palette lists {0} more than once")]
    DuplicatePaletteColor(Color),
}

impl BoardConfig {
    /// Default palette and timing with the given dimensions
    pub fn with_size(width: u8, height: u8) -> Self {
        Self {
            width,
            height,
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.width < 2 {
            return Err(ConfigError::TooNarrow(self.width));
        }
        if self.height < 2 {
            return Err(ConfigError::TooShort(self.height));
        }
        for (i, color) in self.palette.iter().enumerate() {
            if self.palette[..i].contains(color) {
                return Err(ConfigError::DuplicatePaletteColor(*color));
            }
        }
        Ok(())
    }
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            width: DEFAULT_BOARD_WIDTH,
            height: DEFAULT_BOARD_HEIGHT,
            palette: Color::ALL,
            seed: 1,
            timing: Timing::default(),
        }
    }
}
