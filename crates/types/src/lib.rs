//! Core types module - shared data structures and constants
//!
//! This module defines the fundamental types used throughout the engine.
//! All types are pure data structures with no external dependencies, making them
//! usable in any context (core logic, presentation layers, tooling).
//!
//! # Coordinates
//!
//! The board is a `width x height` grid of integer positions:
//!
//! - **x**: columns, `0` is the leftmost
//! - **y**: rows, `0` is the bottom row (gravity pulls toward `y = 0`)
//!
//! A 2x2 square is addressed by its bottom-left corner (its *origin*).
//!
//! # Timing Constants
//!
//! Every asynchronous effect has a fixed, bounded duration in milliseconds:
//!
//! | Constant | Value | Description |
//! |----------|-------|-------------|
//! | `TICK_MS` | 16 | Fixed timestep interval (~60 FPS) |
//! | `MERGE_MS` | 300 | Merge transfer of one group into another |
//! | `SHIFT_MS` | 250 | Rigid gravity shift by one gravity quad |
//! | `FALL_IN_MS` | 400 | Fall-in of a freshly spawned group |
//! | `ROTATE_MS` | 200 | Player rotation of a group |
//!
//! # Examples
//!
//! ```
//! use quadmerge_types::{Color, Coord, DEFAULT_BOARD_WIDTH};
//!
//! let color = Color::from_str("blue").unwrap();
//! assert_eq!(color, Color::Blue);
//!
//! let ring = Coord::new(2, 0).ring();
//! assert_eq!(ring[0], Coord::new(2, 0));
//! assert_eq!(ring[2], Coord::new(3, 1));
//!
//! assert_eq!(DEFAULT_BOARD_WIDTH, 6);
//! ```

use std::fmt;
use std::ops::{Add, Sub};

/// Default board width in cells
pub const DEFAULT_BOARD_WIDTH: u8 = 6;

/// Default board height in cells
pub const DEFAULT_BOARD_HEIGHT: u8 = 6;

/// Number of colors in a palette
pub const PALETTE_SIZE: usize = 6;

/// Fixed timestep interval in milliseconds (16ms ≈ 60 FPS)
pub const TICK_MS: u32 = 16;

/// Merge transfer duration (300ms)
pub const MERGE_MS: u32 = 300;

/// Gravity shift duration (250ms)
pub const SHIFT_MS: u32 = 250;

/// Spawn fall-in duration (400ms)
pub const FALL_IN_MS: u32 = 400;

/// Player rotation duration (200ms)
pub const ROTATE_MS: u32 = 200;

/// Side length of a match window and of a gravity quad
pub const QUAD_SIZE: i16 = 2;

/// The six cell colors
///
/// Colors carry equality only; the declaration order is used for indexing
/// (tallies, compact grids) and has no gameplay meaning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Color {
    Red,
    Green,
    Blue,
    Yellow,
    Purple,
    Orange,
}

impl Color {
    /// All colors in declaration order
    pub const ALL: [Color; PALETTE_SIZE] = [
        Color::Red,
        Color::Green,
        Color::Blue,
        Color::Yellow,
        Color::Purple,
        Color::Orange,
    ];

    /// Parse color from string (case-insensitive)
    ///
    /// # Examples
    ///
    /// ```
    /// use quadmerge_types::Color;
    ///
    /// assert_eq!(Color::from_str("red"), Some(Color::Red));
    /// assert_eq!(Color::from_str("ORANGE"), Some(Color::Orange));
    /// assert_eq!(Color::from_str("teal"), None);
    /// ```
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "red" => Some(Color::Red),
            "green" => Some(Color::Green),
            "blue" => Some(Color::Blue),
            "yellow" => Some(Color::Yellow),
            "purple" => Some(Color::Purple),
            "orange" => Some(Color::Orange),
            _ => None,
        }
    }

    /// Convert to lowercase string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Color::Red => "red",
            Color::Green => "green",
            Color::Blue => "blue",
            Color::Yellow => "yellow",
            Color::Purple => "purple",
            Color::Orange => "orange",
        }
    }

    /// Position in [`Color::ALL`]
    pub fn index(&self) -> usize {
        match self {
            Color::Red => 0,
            Color::Green => 1,
            Color::Blue => 2,
            Color::Yellow => 3,
            Color::Purple => 4,
            Color::Orange => 5,
        }
    }

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Integer grid position (also used as a translation delta)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Coord {
    pub x: i16,
    pub y: i16,
}

impl Coord {
    pub const fn new(x: i16, y: i16) -> Self {
        Self { x, y }
    }

    /// The 2x2 square whose bottom-left corner is `self`.
    ///
    /// Order is bottom-left, bottom-right, top-right, top-left, so rotating the
    /// array by one step corresponds to a quarter turn of the square.
    pub fn ring(self) -> [Coord; 4] {
        [
            self,
            Coord::new(self.x + 1, self.y),
            Coord::new(self.x + 1, self.y + 1),
            Coord::new(self.x, self.y + 1),
        ]
    }
}

impl Add for Coord {
    type Output = Coord;

    fn add(self, rhs: Coord) -> Coord {
        Coord::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Coord {
    type Output = Coord;

    fn sub(self, rhs: Coord) -> Coord {
        Coord::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl fmt::Display for Coord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Identity of a live piece group.
///
/// Ids are handed out monotonically by the board and never reused within a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GroupId(pub u32);

impl fmt::Display for GroupId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "group#{}", self.0)
    }
}

/// Ticket for an asynchronous effect (merge, shift, fall-in, rotation).
///
/// The presentation layer receives it with each move request and may hand it
/// back to signal completion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TaskId(pub u32);

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "task#{}", self.0)
    }
}

/// Staging slot handle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SlotId(pub u8);
