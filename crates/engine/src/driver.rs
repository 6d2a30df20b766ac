//! Fixed-timestep driver
//!
//! Owns a [`Session`] and the [`Presenter`] it talks to, so a game loop only
//! has to call [`Driver::step`] once per frame and [`Driver::apply`] for input.

use log::warn;
use thiserror::Error;

use crate::command::{apply_command, Command, CommandError};
use crate::core::{Presenter, Session};
use crate::types::TICK_MS;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("board still busy after {ticks} ticks")]
pub struct Unsettled {
    pub ticks: u64,
}

#[derive(Debug)]
pub struct Driver<P: Presenter> {
    session: Session,
    presenter: P,
    step_ms: u32,
}

impl<P: Presenter> Driver<P> {
    pub fn new(session: Session, presenter: P) -> Self {
        Self {
            session,
            presenter,
            step_ms: TICK_MS,
        }
    }

    /// Use a custom timestep (milliseconds per [`Driver::step`])
    pub fn with_step(mut self, step_ms: u32) -> Self {
        self.step_ms = step_ms.max(1);
        self
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn presenter(&self) -> &P {
        &self.presenter
    }

    pub fn presenter_mut(&mut self) -> &mut P {
        &mut self.presenter
    }

    pub fn into_parts(self) -> (Session, P) {
        (self.session, self.presenter)
    }

    pub fn step(&mut self) {
        self.session.tick(self.step_ms, &mut self.presenter);
    }

    pub fn apply(&mut self, command: Command) -> Result<(), CommandError> {
        let result = apply_command(&mut self.session, command, &mut self.presenter);
        if let Err(err) = &result {
            warn!("{:?} rejected: {} ({})", command, err, err.code());
        }
        result
    }

    /// Step until [`Session::is_settled`], returning the number of steps taken
    pub fn run_until_settled(&mut self, max_ticks: u64) -> Result<u64, Unsettled> {
        for ticks in 0..=max_ticks {
            if self.session.is_settled() {
                return Ok(ticks);
            }
            if ticks < max_ticks {
                self.step();
            }
        }
        Err(Unsettled { ticks: max_ticks })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{BoardConfig, RecordingPresenter};

    #[test]
    fn empty_board_fills_up_and_settles() {
        let session = Session::new(BoardConfig::with_size(4, 4)).unwrap();
        let mut driver = Driver::new(session, RecordingPresenter::new());
        let ticks = driver.run_until_settled(20_000).unwrap();
        assert!(ticks > 0);
        let board = driver.session().board();
        assert!(board.verify().is_ok());
        assert!(board.group_count() > 0);
        assert!(driver.presenter().moves().count() >= 4);
    }

    #[test]
    fn zero_budget_reports_unsettled() {
        let session = Session::new(BoardConfig::with_size(4, 4)).unwrap();
        let mut driver = Driver::new(session, RecordingPresenter::new());
        assert_eq!(driver.run_until_settled(0), Err(Unsettled { ticks: 0 }));
    }

    #[test]
    fn custom_step_is_never_zero() {
        let session = Session::new(BoardConfig::default()).unwrap();
        let mut driver = Driver::new(session, RecordingPresenter::new()).with_step(0);
        driver.step();
        assert_eq!(driver.session().ticks(), 1);

        let (session, presenter) = driver.into_parts();
        assert_eq!(session.ticks(), 1);
        assert_eq!(presenter.moves().count(), 1);
    }
}
