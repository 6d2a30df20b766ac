//! Headless quad-merge runner (default binary).
//!
//! Populates a board, runs the fixed-timestep driver for a bounded number of
//! ticks (optionally rotating a random idle group now and then) and prints the
//! final board snapshot as JSON on stdout.

mod config;
mod logger;

use anyhow::Result;
use log::info;

use quadmerge::core::{
    Collected, Presenter, PresenterEvent, RecordingPresenter, Session, SimpleRng,
};
use quadmerge::engine::{Command, Driver};
use quadmerge::types::GroupId;

use config::SimConfig;

fn main() -> Result<()> {
    let config = SimConfig::from_env()?;
    logger::init(config.log_level)
        .map_err(|e| anyhow::anyhow!("failed to install logger: {}", e))?;

    let session = Session::new(config.board.clone())?;
    let presenter = RecordingPresenter::with_staging(config.staging_slots);
    let mut driver = Driver::new(session, presenter);
    // Separate stream so player input does not perturb spawn colors.
    let mut rng = SimpleRng::new(config.board.seed ^ 0x9e37_79b9);

    driver.apply(Command::Populate)?;

    let mut ran = 0;
    while ran < config.ticks {
        driver.step();
        ran += 1;

        // Presentation hands staging slots back once their fly-out is done.
        let presenter = driver.presenter_mut();
        for event in presenter.take_events() {
            if let PresenterEvent::Collected(Collected {
                slot: Some(slot), ..
            }) = event
            {
                presenter.release_staging_slot(slot);
            }
        }

        if config.rotate_every > 0 && ran % config.rotate_every == 0 {
            let idle: Vec<GroupId> = driver
                .session()
                .board()
                .groups()
                .map(|g| g.id())
                .filter(|&id| !driver.session().is_busy(id))
                .collect();
            if let Some(&group) = rng.pick(&idle) {
                // Rejections are logged by the driver.
                let _ = driver.apply(Command::Rotate(group));
            }
        }

        if config.rotate_every == 0 && driver.session().is_settled() {
            break;
        }
    }

    let (session, presenter) = driver.into_parts();
    info!(
        "stopped after {} ticks with {} groups, settled: {}",
        ran,
        session.board().group_count(),
        session.is_settled()
    );
    if let Some(staging) = presenter.staging() {
        info!(
            "{} of {} staging slots free",
            staging.free_count(),
            staging.capacity()
        );
    }

    let snapshot = session.snapshot();
    println!("{}", serde_json::to_string_pretty(&snapshot)?);
    Ok(())
}
