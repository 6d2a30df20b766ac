//! Simulation settings read from the environment

use anyhow::{Context, Result};
use log::LevelFilter;

use quadmerge::core::BoardConfig;
use quadmerge::types::{DEFAULT_BOARD_HEIGHT, DEFAULT_BOARD_WIDTH};

#[derive(Debug, Clone)]
pub struct SimConfig {
    pub board: BoardConfig,
    /// Upper bound on simulated ticks
    pub ticks: u64,
    /// Rotate a random idle group every N ticks (0 disables rotation)
    pub rotate_every: u64,
    pub staging_slots: u8,
    pub log_level: LevelFilter,
}

impl SimConfig {
    pub fn from_env() -> Result<Self> {
        use std::env;

        let width = env::var("QUADMERGE_WIDTH")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(DEFAULT_BOARD_WIDTH);
        let height = env::var("QUADMERGE_HEIGHT")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(DEFAULT_BOARD_HEIGHT);
        let seed = env::var("QUADMERGE_SEED")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(1);
        let ticks = env::var("QUADMERGE_TICKS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(2_000);
        let rotate_every = env::var("QUADMERGE_ROTATE_EVERY")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(0);
        let staging_slots = env::var("QUADMERGE_STAGING_SLOTS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(4);
        let log_level = env::var("QUADMERGE_LOG")
            .ok()
            .map(|s| s.trim().to_string())
            .and_then(|s| s.parse().ok())
            .unwrap_or(LevelFilter::Warn);

        let board = BoardConfig {
            seed,
            ..BoardConfig::with_size(width, height)
        };
        board
            .validate()
            .with_context(|| format!("invalid board {}x{}", width, height))?;

        Ok(Self {
            board,
            ticks,
            rotate_every,
            staging_slots,
            log_level,
        })
    }
}
