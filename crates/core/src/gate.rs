//! Processing gate - the single coordination token
//!
//! Merges and spawns each hold the gate for the lifetime of their task, so the
//! token records which task owns it. Only the owner can release it.
//!
//! | State | gravity | spawn | quad merge |
//! |-------|---------|-------|------------|
//! | `Idle` | yes | yes | yes |
//! | `Matching` | no | no | no |
//! | `Spawning` | yes | no | no |

use crate::types::TaskId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProcessingGate {
    #[default]
    Idle,
    Matching(TaskId),
    Spawning(TaskId),
}

impl ProcessingGate {
    pub fn is_idle(&self) -> bool {
        matches!(self, ProcessingGate::Idle)
    }

    pub fn is_matching(&self) -> bool {
        matches!(self, ProcessingGate::Matching(_))
    }

    pub fn is_spawning(&self) -> bool {
        matches!(self, ProcessingGate::Spawning(_))
    }

    pub fn allows_gravity(&self) -> bool {
        !self.is_matching()
    }

    pub fn allows_spawn(&self) -> bool {
        self.is_idle()
    }

    pub fn allows_merge(&self) -> bool {
        self.is_idle()
    }

    /// Task currently holding the gate
    pub fn holder(&self) -> Option<TaskId> {
        match self {
            ProcessingGate::Idle => None,
            ProcessingGate::Matching(task) | ProcessingGate::Spawning(task) => Some(*task),
        }
    }

    pub fn begin_matching(&mut self, task: TaskId) -> bool {
        if !self.is_idle() {
            return false;
        }
        *self = ProcessingGate::Matching(task);
        true
    }

    pub fn begin_spawning(&mut self, task: TaskId) -> bool {
        if !self.is_idle() {
            return false;
        }
        *self = ProcessingGate::Spawning(task);
        true
    }

    /// Return to `Idle` if `task` holds the gate
    pub fn release(&mut self, task: TaskId) -> bool {
        if self.holder() != Some(task) {
            return false;
        }
        *self = ProcessingGate::Idle;
        true
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ProcessingGate::Idle => "idle",
            ProcessingGate::Matching(_) => "matching",
            ProcessingGate::Spawning(_) => "spawning",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_one_holder_at_a_time() {
        let mut gate = ProcessingGate::default();
        assert!(gate.begin_matching(TaskId(1)));
        assert!(!gate.begin_spawning(TaskId(2)));
        assert!(!gate.begin_matching(TaskId(3)));
        assert_eq!(gate.holder(), Some(TaskId(1)));
    }

    #[test]
    fn release_requires_the_holder() {
        let mut gate = ProcessingGate::default();
        gate.begin_spawning(TaskId(4));
        assert!(!gate.release(TaskId(5)));
        assert!(gate.is_spawning());
        assert!(gate.release(TaskId(4)));
        assert!(gate.is_idle());
        assert!(!gate.release(TaskId(4)));
    }

    #[test]
    fn spawning_still_allows_gravity() {
        let mut gate = ProcessingGate::default();
        gate.begin_spawning(TaskId(1));
        assert!(gate.allows_gravity());
        assert!(!gate.allows_spawn());
        assert!(!gate.allows_merge());

        gate.release(TaskId(1));
        gate.begin_matching(TaskId(2));
        assert!(!gate.allows_gravity());
        assert_eq!(gate.as_str(), "matching");
    }
}
