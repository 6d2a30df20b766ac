//! Quad-merge tile engine (workspace facade crate).
//!
//! The implementation lives in dedicated crates under `crates/`; this package
//! re-exports them as `quadmerge::{core,engine,types}` and hosts the headless
//! `quadmerge-sim` runner.

pub use quadmerge_core as core;
pub use quadmerge_engine as engine;
pub use quadmerge_types as types;
