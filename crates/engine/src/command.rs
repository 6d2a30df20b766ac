use thiserror::Error;

use crate::core::{Presenter, RotateError, Session};
use crate::types::{GroupId, TaskId};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Fill every empty gravity quad at once (initial board setup)
    Populate,
    /// Quarter turn clockwise of one group
    Rotate(GroupId),
    /// Presentation finished animating the task early
    Complete(TaskId),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum CommandError {
    #[error(transparent)]
    Rotate(#[from] RotateError),
    #[error("{0} is not pending")]
    UnknownTicket(TaskId),
    #[error("board is not idle")]
    NotIdle,
}

impl CommandError {
    pub fn code(self) -> &'static str {
        match self {
            CommandError::Rotate(e) => e.code(),
            CommandError::UnknownTicket(_) => "unknown_ticket",
            CommandError::NotIdle => "busy",
        }
    }

    pub fn message(self) -> &'static str {
        match self {
            CommandError::Rotate(e) => e.message(),
            CommandError::UnknownTicket(_) => "ticket does not belong to a pending task",
            CommandError::NotIdle => "board is resolving a match or spawn",
        }
    }
}

pub fn apply_command(
    session: &mut Session,
    command: Command,
    presenter: &mut impl Presenter,
) -> Result<(), CommandError> {
    match command {
        Command::Populate => {
            if !session.gate().is_idle() {
                return Err(CommandError::NotIdle);
            }
            session.populate(presenter);
            Ok(())
        }
        Command::Rotate(group) => {
            session.rotate_group(group, presenter)?;
            Ok(())
        }
        Command::Complete(ticket) => {
            if session.complete(ticket, presenter) {
                Ok(())
            } else {
                Err(CommandError::UnknownTicket(ticket))
            }
        }
    }
}
