//! Session module - runs the board tick by tick
//!
//! A [`Session`] is the explicit context that ties the board, the processing
//! gate, the pending asynchronous tasks and the spawner RNG together. There is
//! no global state: callers own the session and hand a [`Presenter`] to every
//! call that may emit notifications.
//!
//! # Tick order
//!
//! 1. Advance pending task timers and finish every task that ran out
//! 2. Gravity, unless the gate is `Matching` or a shift is already in flight
//! 3. Spawn, if the gate is `Idle`, no shift is in flight and gravity planned nothing
//! 4. Match resolution, if the gate is `Idle`
//! 5. Invariant checkpoint, if the gate is `Idle`
//!
//! # Tasks
//!
//! Merges, shifts, fall-ins and rotations are animated by the presenter. Each
//! one is a pending task with a fixed duration. Structural mutation happens
//! entirely before the task starts (shift, spawn, rotation) or entirely after
//! it finishes (merge). A finished merge slides what is left of the newer
//! group onto the older group's square, into the cells the quad match
//! vacated, so the square it leaves behind can be refilled. Groups referenced by a pending task are *busy*:
//! gravity does not move them, quad merges do not take them, and they cannot
//! be rotated. A finishing task re-checks its groups and quietly skips any
//! that were destroyed in the meantime.

use arrayvec::ArrayVec;
use log::{debug, error, trace};
use thiserror::Error;

use crate::board::{Board, PlacementError};
use crate::config::{BoardConfig, ConfigError};
use crate::gate::ProcessingGate;
use crate::gravity;
use crate::group::GroupCell;
use crate::matcher::{self, QuadMatch};
use crate::presenter::{Collected, Footprint, Motion, MoveRequest, Presenter};
use crate::rng::SimpleRng;
use crate::snapshot::BoardSnapshot;
use crate::spawner;
use crate::types::{Color, Coord, GroupId, TaskId, PALETTE_SIZE};

#[derive(Debug, Clone, PartialEq, Eq)]
enum TaskKind {
    Merge { target: GroupId, source: GroupId },
    Shift { groups: Vec<GroupId> },
    FallIn { group: GroupId },
    Rotate { group: GroupId },
}

impl TaskKind {
    fn involves(&self, id: GroupId) -> bool {
        match self {
            TaskKind::Merge { target, source } => *target == id || *source == id,
            TaskKind::Shift { groups } => groups.contains(&id),
            TaskKind::FallIn { group } | TaskKind::Rotate { group } => *group == id,
        }
    }
}

#[derive(Debug, Clone)]
struct PendingTask {
    id: TaskId,
    remaining_ms: u32,
    kind: TaskKind,
}

/// A player rotation was refused
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum RotateError {
    #[error("{0} does not exist")]
    UnknownGroup(GroupId),
    #[error("{0} is still animating")]
    GroupBusy(GroupId),
    #[error("board is resolving a match or spawn")]
    GateBusy,
    #[error("rotation would not land on whole cells")]
    Misaligned,
    #[error("rotated cell {0} lies outside the board")]
    OutOfBounds(Coord),
    #[error("rotated cell {0} is occupied by {1}")]
    Blocked(Coord, GroupId),
}

impl RotateError {
    pub fn code(self) -> &'static str {
        match self {
            RotateError::UnknownGroup(_) => "unknown_group",
            RotateError::GroupBusy(_) | RotateError::GateBusy => "busy",
            RotateError::Misaligned | RotateError::OutOfBounds(_) | RotateError::Blocked(..) => {
                "invalid_rotation"
            }
        }
    }

    pub fn message(self) -> &'static str {
        match self {
            RotateError::UnknownGroup(_) => "group does not exist",
            RotateError::GroupBusy(_) => "group is still animating",
            RotateError::GateBusy => "board is resolving a match or spawn",
            RotateError::Misaligned => "rotation would not land on whole cells",
            RotateError::OutOfBounds(_) => "rotated group would leave the board",
            RotateError::Blocked(..) => "rotated group would overlap another group",
        }
    }
}

/// What one match-resolution pass did
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MatchPass {
    /// Single-color groups collected whole
    pub cleared_groups: usize,
    /// Quad match confirmed in this pass
    pub quad: Option<QuadMatch>,
    /// Merge task started for the quad match
    pub merge: Option<TaskId>,
}

#[derive(Debug, Clone)]
pub struct Session {
    config: BoardConfig,
    board: Board,
    gate: ProcessingGate,
    tasks: Vec<PendingTask>,
    /// In-flight gravity shift; suppresses further shifts and spawning
    shift_in_flight: Option<TaskId>,
    rng: SimpleRng,
    next_task: u32,
    collected: [u32; PALETTE_SIZE],
    ticks: u64,
}

impl Session {
    pub fn new(config: BoardConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            board: Board::new(config.width, config.height),
            gate: ProcessingGate::Idle,
            tasks: Vec::new(),
            shift_in_flight: None,
            rng: SimpleRng::new(config.seed),
            next_task: 1,
            collected: [0; PALETTE_SIZE],
            ticks: 0,
            config,
        })
    }

    pub fn config(&self) -> &BoardConfig {
        &self.config
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn gate(&self) -> ProcessingGate {
        self.gate
    }

    pub fn shift_in_flight(&self) -> Option<TaskId> {
        self.shift_in_flight
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    pub fn pending_tasks(&self) -> usize {
        self.tasks.len()
    }

    pub fn has_task(&self, ticket: TaskId) -> bool {
        self.tasks.iter().any(|t| t.id == ticket)
    }

    /// Tally of collected notifications per color (indexed by [`Color::index`])
    pub fn collected_counts(&self) -> &[u32; PALETTE_SIZE] {
        &self.collected
    }

    pub fn collected_of(&self, color: Color) -> u32 {
        self.collected[color.index()]
    }

    pub fn is_busy(&self, group: GroupId) -> bool {
        self.tasks.iter().any(|t| t.kind.involves(group))
    }

    pub fn snapshot(&self) -> BoardSnapshot {
        BoardSnapshot::capture(self)
    }

    /// Nothing left to do without player input
    pub fn is_settled(&self) -> bool {
        self.gate.is_idle()
            && self.tasks.is_empty()
            && gravity::plan(&self.board, |_| false).is_empty()
            && spawner::find_empty_quad(self.board.cache()).is_none()
            && matcher::single_color_groups(&self.board).is_empty()
            && matcher::find_quad_match(&self.board, |_| false).is_none()
    }

    fn allocate_task(&mut self) -> TaskId {
        let id = TaskId(self.next_task);
        self.next_task = self.next_task.wrapping_add(1);
        id
    }

    fn push_task(&mut self, id: TaskId, duration_ms: u32, kind: TaskKind) {
        self.tasks.push(PendingTask {
            id,
            remaining_ms: duration_ms,
            kind,
        });
    }

    /// Register a group for level setup. No matching runs until the next tick
    /// or an explicit [`Session::resolve_matches`].
    pub fn insert_group(&mut self, cells: Vec<GroupCell>) -> Result<GroupId, PlacementError> {
        self.board.place_group(cells)
    }

    /// Initial board setup: fill every empty gravity quad at once, then resolve matches.
    ///
    /// Returns the number of groups created. Does nothing unless the gate is `Idle`.
    pub fn populate(&mut self, presenter: &mut impl Presenter) -> usize {
        if !self.gate.is_idle() {
            return 0;
        }
        let empty: Vec<Coord> = gravity::gravity_quads(self.board.cache())
            .filter(|&o| gravity::classify(self.board.cache(), o) == gravity::QuadState::Empty)
            .collect();
        for &origin in &empty {
            let colors = spawner::roll_layout(&mut self.rng, &self.config.palette);
            self.board.spawn_quad(origin, colors);
        }
        debug!("populated {} empty quads", empty.len());
        self.resolve_matches(presenter);
        empty.len()
    }

    /// Advance the session by `elapsed_ms`
    pub fn tick(&mut self, elapsed_ms: u32, presenter: &mut impl Presenter) {
        self.ticks += 1;

        let mut finished = Vec::new();
        for task in &mut self.tasks {
            task.remaining_ms = task.remaining_ms.saturating_sub(elapsed_ms);
            if task.remaining_ms == 0 {
                finished.push(task.id);
            }
        }
        for id in finished {
            self.finish_task(id, presenter);
        }

        let shifted = self.resolve_gravity(presenter);
        if !shifted {
            self.try_spawn(presenter);
        }
        if self.gate.is_idle() {
            self.resolve_matches(presenter);
        }
        self.checkpoint();
    }

    /// Completion signal from the presenter. Returns false for an unknown or
    /// already finished ticket.
    pub fn complete(&mut self, ticket: TaskId, presenter: &mut impl Presenter) -> bool {
        let finished = self.finish_task(ticket, presenter);
        if finished {
            self.checkpoint();
        }
        finished
    }

    fn finish_task(&mut self, id: TaskId, presenter: &mut impl Presenter) -> bool {
        let Some(idx) = self.tasks.iter().position(|t| t.id == id) else {
            return false;
        };
        let task = self.tasks.remove(idx);
        match task.kind {
            TaskKind::Merge { target, source } => {
                match self.board.merge_groups(target, source) {
                    Some(merged) if merged.relocated => {
                        debug!("{}: {} slid into {} ({} cells)", id, source, target, merged.len)
                    }
                    Some(merged) => debug!(
                        "{}: {} absorbed {} in place ({} cells)",
                        id, target, source, merged.len
                    ),
                    None => debug!("{}: merge of {} into {} aborted, group gone", id, source, target),
                }
                self.gate.release(id);
                self.board.rebuild_cache();
                self.resolve_gravity(presenter);
                self.resolve_matches(presenter);
            }
            TaskKind::Shift { groups } => {
                if self.shift_in_flight == Some(id) {
                    self.shift_in_flight = None;
                }
                let gone = groups
                    .iter()
                    .filter(|&&g| !self.board.contains_group(g))
                    .count();
                if gone > 0 {
                    debug!("{}: {} shifted group(s) destroyed mid-flight", id, gone);
                }
                self.board.rebuild_cache();
                self.resolve_matches(presenter);
            }
            TaskKind::FallIn { group } => {
                self.gate.release(id);
                if !self.board.contains_group(group) {
                    debug!("{}: spawned {} destroyed before landing", id, group);
                }
                self.board.rebuild_cache();
                self.resolve_matches(presenter);
            }
            TaskKind::Rotate { group } => {
                if !self.board.contains_group(group) {
                    debug!("{}: rotated {} destroyed mid-turn", id, group);
                }
                self.board.rebuild_cache();
                self.resolve_matches(presenter);
            }
        }
        true
    }

    fn collect(&mut self, color: Color, at: Footprint, presenter: &mut impl Presenter) {
        self.collected[color.index()] += 1;
        let slot = presenter.acquire_staging_slot();
        if slot.is_none() {
            trace!("no staging slot free for {} at {}", color, at.origin);
        }
        presenter.on_collected(Collected { color, at, slot });
        presenter.on_spawn_effect(at);
    }

    /// One match-resolution pass: single-color groups, then at most one quad merge.
    ///
    /// When no merge holds the gate afterwards, gravity runs as well.
    pub fn resolve_matches(&mut self, presenter: &mut impl Presenter) -> MatchPass {
        let mut pass = MatchPass::default();

        for (id, color) in matcher::single_color_groups(&self.board) {
            let Some(group) = self.board.remove_group(id) else {
                continue;
            };
            debug!("{} is all {}; collecting {} cells", id, color, group.len());
            for cell in group.cells() {
                self.collect(cell.color, Footprint::cell(cell.pos), presenter);
            }
            pass.cleared_groups += 1;
        }

        if self.gate.allows_merge() {
            let tasks = &self.tasks;
            let found = matcher::find_quad_match(&self.board, |g| {
                tasks.iter().any(|t| t.kind.involves(g))
            });
            if let Some(quad) = found {
                pass.quad = Some(quad);
                pass.merge = self.confirm_quad(quad, presenter);
            }
        }

        if self.gate.is_idle() {
            self.resolve_gravity(presenter);
        }
        pass
    }

    fn confirm_quad(&mut self, quad: QuadMatch, presenter: &mut impl Presenter) -> Option<TaskId> {
        debug!("quad match: {} at {} from {} and {}", quad.color, quad.origin, quad.groups[0], quad.groups[1]);
        self.collect(quad.color, Footprint::quad(quad.origin), presenter);

        let positions = quad.positions();
        for id in quad.groups {
            self.board.take_cells(id, &positions);
        }
        self.board.rebuild_cache();

        let live: ArrayVec<GroupId, 2> = quad
            .groups
            .into_iter()
            .filter(|&g| self.board.contains_group(g))
            .collect();
        if live.len() < 2 {
            debug!("quad at {} left {} live group(s); nothing to merge", quad.origin, live.len());
            return None;
        }

        // The older group survives.
        let (target, source) = (live[0], live[1]);
        let ticket = self.allocate_task();
        if !self.gate.begin_matching(ticket) {
            return None;
        }
        let home = self
            .board
            .group(target)
            .map_or(quad.origin, |g| g.origin());
        self.push_task(
            ticket,
            self.config.timing.merge_ms,
            TaskKind::Merge { target, source },
        );
        presenter.request_move(MoveRequest {
            ticket,
            group: source,
            target: home,
            motion: Motion::Merge { into: target },
            duration_ms: self.config.timing.merge_ms,
        });
        Some(ticket)
    }

    /// Plan and start a gravity shift. Returns true if one started.
    pub fn resolve_gravity(&mut self, presenter: &mut impl Presenter) -> bool {
        if !self.gate.allows_gravity() || self.shift_in_flight.is_some() {
            return false;
        }
        let tasks = &self.tasks;
        let plan = gravity::plan(&self.board, |g| tasks.iter().any(|t| t.kind.involves(g)));
        if plan.is_empty() {
            return false;
        }

        gravity::apply(&mut self.board, &plan);
        let ticket = self.allocate_task();
        let duration_ms = self.config.timing.shift_ms;
        debug!("{}: shifting {} group(s)", ticket, plan.len());
        for shift in plan.shifts() {
            let Some(target) = self.board.group(shift.group).and_then(|g| g.anchor()) else {
                continue;
            };
            presenter.request_move(MoveRequest {
                ticket,
                group: shift.group,
                target,
                motion: Motion::Shift { delta: shift.delta },
                duration_ms,
            });
        }
        self.shift_in_flight = Some(ticket);
        self.push_task(
            ticket,
            duration_ms,
            TaskKind::Shift {
                groups: plan.groups().collect(),
            },
        );
        true
    }

    /// Spawn into the topmost-leftmost empty gravity quad
    pub fn try_spawn(&mut self, presenter: &mut impl Presenter) -> Option<GroupId> {
        if !self.gate.allows_spawn() || self.shift_in_flight.is_some() {
            return None;
        }
        let origin = spawner::find_empty_quad(self.board.cache())?;
        let colors = spawner::roll_layout(&mut self.rng, &self.config.palette);
        let ticket = self.allocate_task();
        if !self.gate.begin_spawning(ticket) {
            return None;
        }
        let group = self.board.spawn_quad(origin, colors);
        debug!("{}: spawned {} at {}", ticket, group, origin);
        let duration_ms = self.config.timing.fall_in_ms;
        self.push_task(ticket, duration_ms, TaskKind::FallIn { group });
        presenter.request_move(MoveRequest {
            ticket,
            group,
            target: origin,
            motion: Motion::FallIn,
            duration_ms,
        });
        Some(group)
    }

    /// Player rotation: a quarter turn clockwise about the group's bounding-box centre
    pub fn rotate_group(
        &mut self,
        id: GroupId,
        presenter: &mut impl Presenter,
    ) -> Result<TaskId, RotateError> {
        if !self.gate.is_idle() {
            return Err(RotateError::GateBusy);
        }
        let group = self.board.group(id).ok_or(RotateError::UnknownGroup(id))?;
        if self.is_busy(id) {
            return Err(RotateError::GroupBusy(id));
        }
        let rotated = group.rotated_cw().ok_or(RotateError::Misaligned)?;
        for cell in &rotated {
            if !self.board.in_bounds(cell.pos) {
                return Err(RotateError::OutOfBounds(cell.pos));
            }
            if let Some(owner) = self.board.owner_at(cell.pos) {
                if owner != id {
                    return Err(RotateError::Blocked(cell.pos, owner));
                }
            }
        }

        self.board.replace_cells(id, rotated);
        let ticket = self.allocate_task();
        let duration_ms = self.config.timing.rotate_ms;
        let target = self
            .board
            .group(id)
            .and_then(|g| g.anchor())
            .unwrap_or_default();
        self.push_task(ticket, duration_ms, TaskKind::Rotate { group: id });
        presenter.request_move(MoveRequest {
            ticket,
            group: id,
            target,
            motion: Motion::Rotate,
            duration_ms,
        });
        Ok(ticket)
    }

    /// Idle-point consistency check
    fn checkpoint(&mut self) {
        if !self.gate.is_idle() {
            return;
        }
        if let Err(violation) = self.board.verify() {
            if cfg!(debug_assertions) {
                panic!("board invariant violated: {}", violation);
            }
            error!("board invariant violated: {}; rebuilding cache", violation);
            self.board.rebuild_cache();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::presenter::{NullPresenter, RecordingPresenter};
    use Color::*;

    fn cells(list: &[(i16, i16, Color)]) -> Vec<GroupCell> {
        list.iter()
            .map(|&(x, y, c)| GroupCell::new(Coord::new(x, y), c))
            .collect()
    }

    fn session(width: u8, height: u8) -> Session {
        Session::new(BoardConfig::with_size(width, height)).unwrap()
    }

    #[test]
    fn test_new_session_is_idle_and_empty() {
        let s = session(4, 4);
        assert!(s.gate().is_idle());
        assert_eq!(s.board().group_count(), 0);
        assert_eq!(s.pending_tasks(), 0);
        assert!(Session::new(BoardConfig::with_size(1, 4)).is_err());
    }

    #[test]
    fn test_populate_fills_every_quad() {
        let mut s = session(6, 6);
        let created = s.populate(&mut NullPresenter);
        assert_eq!(created, 9);
        // Fresh groups are never single-color; only a quad merge can have
        // taken cells away, and at most one merge starts per pass.
        if s.gate().is_matching() {
            assert_eq!(s.board().cache().len(), 32);
        } else {
            assert_eq!(s.board().cache().len(), 36);
        }
        assert!(s.board().verify().is_ok());
    }

    #[test]
    fn test_spawn_sets_gate_until_fall_in_completes() {
        let mut s = session(2, 2);
        let mut p = RecordingPresenter::new();
        let group = s.try_spawn(&mut p).unwrap();
        assert!(s.gate().is_spawning());
        assert!(s.is_busy(group));
        assert_eq!(s.try_spawn(&mut p), None);

        let ticket = p.moves().next().unwrap().ticket;
        assert!(s.complete(ticket, &mut p));
        assert!(s.gate().is_idle());
        assert!(!s.complete(ticket, &mut p));
    }

    #[test]
    fn test_merge_abort_when_source_destroyed() {
        let mut s = session(4, 2);
        let mut p = RecordingPresenter::new();
        s.insert_group(cells(&[(0, 0, Red), (0, 1, Green), (1, 0, Blue), (1, 1, Blue)]))
            .unwrap();
        let b = s
            .insert_group(cells(&[(2, 0, Blue), (2, 1, Blue), (3, 0, Red), (3, 1, Yellow)]))
            .unwrap();
        let pass = s.resolve_matches(&mut p);
        let ticket = pass.merge.unwrap();

        // Destroy the source while the merge animates.
        s.board.remove_group(b);
        assert!(s.complete(ticket, &mut p));
        assert!(s.gate().is_idle());
        assert_eq!(s.board().group_count(), 1);
        assert!(s.board().verify().is_ok());
    }

    #[test]
    fn test_quad_that_empties_a_contributor_skips_merge() {
        let mut s = session(4, 2);
        let mut p = RecordingPresenter::new();
        // A group lying wholly inside a monochrome window is single colored and
        // normally goes in the single-color pass, so confirm the quad directly.
        let inner = s.insert_group(cells(&[(1, 0, Blue), (1, 1, Blue)])).unwrap();
        let outer = s
            .insert_group(cells(&[(2, 0, Blue), (2, 1, Blue), (3, 0, Red), (3, 1, Yellow)]))
            .unwrap();
        let quad = QuadMatch {
            origin: Coord::new(1, 0),
            color: Blue,
            groups: [inner, outer],
        };

        assert_eq!(s.confirm_quad(quad, &mut p), None);
        assert!(s.gate().is_idle());
        assert_eq!(s.pending_tasks(), 0);
        assert!(!s.board().contains_group(inner));
        assert_eq!(s.board().group(outer).unwrap().len(), 2);
        assert_eq!(s.collected_of(Blue), 1);
        assert_eq!(p.collected().count(), 1);
        assert!(p.moves().next().is_none());
        assert!(s.board().verify().is_ok());
    }

    #[test]
    fn test_merge_request_targets_the_older_square() {
        let mut s = session(4, 4);
        let mut p = RecordingPresenter::new();
        // Older group on top, newer below: the newer remainder slides up.
        let below = s
            .insert_group(cells(&[(0, 0, Red), (1, 0, Green), (1, 1, Blue), (0, 1, Blue)]))
            .unwrap();
        let above = s
            .insert_group(cells(&[(0, 2, Blue), (1, 2, Blue), (1, 3, Yellow), (0, 3, Orange)]))
            .unwrap();
        let ticket = s.resolve_matches(&mut p).merge.unwrap();
        let request = *p.moves().next().unwrap();
        assert_eq!(request.group, above);
        assert_eq!(request.target, Coord::new(0, 0));
        assert_eq!(request.motion, Motion::Merge { into: below });

        assert!(s.complete(ticket, &mut p));
        let merged = s.board().group(below).unwrap();
        assert_eq!(merged.len(), 4);
        assert_eq!(merged.color_at(Coord::new(0, 1)), Some(Orange));
        assert_eq!(merged.color_at(Coord::new(1, 1)), Some(Yellow));
        assert!(!s.board().positions_occupied(&[Coord::new(0, 2)]));
        assert!(s.board().verify().is_ok());
    }

    #[test]
    fn test_rotate_rejections() {
        let mut s = session(4, 4);
        let mut p = RecordingPresenter::new();
        let bar = s
            .insert_group(cells(&[(0, 0, Red), (0, 1, Blue)]))
            .unwrap();
        assert_eq!(s.rotate_group(bar, &mut p), Err(RotateError::Misaligned));
        assert_eq!(
            s.rotate_group(GroupId(77), &mut p),
            Err(RotateError::UnknownGroup(GroupId(77)))
        );

        let plus = s
            .insert_group(cells(&[
                (2, 1, Red),
                (2, 2, Blue),
                (2, 3, Green),
                (3, 2, Yellow),
                (1, 2, Orange),
            ]))
            .unwrap();
        assert!(s.rotate_group(plus, &mut p).is_ok());
        // The arms swap colors, the footprint stays.
        let turned = s.board().group(plus).unwrap();
        assert_eq!(turned.color_at(Coord::new(1, 2)), Some(Red));
        assert_eq!(turned.color_at(Coord::new(2, 3)), Some(Orange));
        assert_eq!(s.rotate_group(plus, &mut p), Err(RotateError::GroupBusy(plus)));
    }

    #[test]
    fn test_rotate_error_codes() {
        assert_eq!(RotateError::GateBusy.code(), "busy");
        assert_eq!(RotateError::Misaligned.code(), "invalid_rotation");
        assert_eq!(RotateError::UnknownGroup(GroupId(1)).code(), "unknown_group");
        assert!(!RotateError::Blocked(Coord::new(0, 0), GroupId(2)).message().is_empty());
    }
}
