//! Core engine module - pure, deterministic, and testable
//!
//! This crate contains the board model and every structural rule of the
//! quad-matching game. It has **no dependency** on rendering, input or I/O:
//! presentation is reached only through the [`Presenter`] trait, and every
//! animation is an opaque asynchronous effect identified by a ticket.
//!
//! - **Deterministic**: Same seed produces identical spawns
//! - **Consistent**: The occupancy cache is rebuilt from groups after every mutation
//! - **Serialized**: One processing gate keeps merges, shifts and spawns from interleaving
//!
//! # Module Structure
//!
//! - [`board`]: W×H board, live piece groups and the derived occupancy cache
//! - [`group`]: Piece groups (rigid sets of colored cells)
//! - [`gate`]: The processing gate (`Idle | Matching | Spawning`)
//! - [`matcher`]: Single-color and 2x2 quad match detection
//! - [`gravity`]: Gravity quad classification and shift planning
//! - [`spawner`]: Empty quad detection and randomized dual-color layouts
//! - [`session`]: The explicit session object that runs ticks and owns pending tasks
//! - [`presenter`]: Boundary calls toward the presentation layer
//! - [`staging`]: Capacity-limited staging slot pool
//! - [`snapshot`]: Serializable view of the board
//!
//! # Rules
//!
//! - **Single-color groups** are collected whole, one notification per cell
//! - **Quad match**: a monochrome 2x2 window contributed by exactly two groups
//!   removes those four cells and merges the two groups
//! - **Gravity**: empty 2x2 gravity quads pull the content above them down,
//!   and the bottom row pulls content in from the right
//! - **Refill**: the topmost-leftmost empty gravity quad gets a fresh group of
//!   two cells in each of two distinct colors
//!
//! # Example
//!
//! ```
//! use quadmerge_core::{BoardConfig, NullPresenter, Session};
//!
//! let mut session = Session::new(BoardConfig::default()).unwrap();
//! let mut presenter = NullPresenter;
//! session.populate(&mut presenter);
//!
//! // Advance the simulation by one second.
//! for _ in 0..60 {
//!     session.tick(16, &mut presenter);
//! }
//! assert!(session.board().verify().is_ok());
//! ```

pub mod board;
pub mod config;
pub mod gate;
pub mod gravity;
pub mod group;
pub mod matcher;
pub mod presenter;
pub mod rng;
pub mod session;
pub mod snapshot;
pub mod spawner;
pub mod staging;

pub use quadmerge_types as types;

// Re-export commonly used types for convenience
pub use board::{Board, InvariantViolation, Occupant, OccupancyCache, PlacementError};
pub use config::{BoardConfig, ConfigError, Timing};
pub use gate::ProcessingGate;
pub use gravity::{QuadState, Shift, ShiftPlan};
pub use group::{GroupCell, PieceGroup};
pub use matcher::{QuadMatch, WindowVerdict};
pub use presenter::{
    Collected, Footprint, Motion, MoveRequest, NullPresenter, Presenter, PresenterEvent,
    RecordingPresenter,
};
pub use rng::SimpleRng;
pub use session::{MatchPass, RotateError, Session};
pub use snapshot::BoardSnapshot;
pub use staging::StagingSlots;
