//! Engine module - drives a session on a fixed timestep
//!
//! The core [`Session`](quadmerge_core::Session) only knows how to advance by a
//! given number of milliseconds. This crate adds the pieces a game loop needs:
//!
//! - [`command`]: player and presentation commands with typed rejections
//! - [`driver`]: owns a session plus its presenter and steps them in `TICK_MS` increments
//!
//! # Example
//!
//! ```
//! use quadmerge_core::{BoardConfig, NullPresenter, Session};
//! use quadmerge_engine::{Command, Driver};
//!
//! let session = Session::new(BoardConfig::default()).unwrap();
//! let mut driver = Driver::new(session, NullPresenter);
//! driver.apply(Command::Populate).unwrap();
//! let ticks = driver.run_until_settled(10_000).unwrap();
//! assert!(driver.session().is_settled());
//! assert!(ticks <= 10_000);
//! ```

pub mod command;
pub mod driver;

pub use quadmerge_core as core;
pub use quadmerge_types as types;

pub use command::{apply_command, Command, CommandError};
pub use driver::{Driver, Unsettled};
