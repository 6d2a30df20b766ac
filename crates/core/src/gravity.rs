//! Gravity - quad classification and shift planning
//!
//! The board is partitioned into non-overlapping 2x2 *gravity quads* (step 2 in
//! both axes). A trailing odd column or row belongs to no quad.
//!
//! Planning runs two passes over a working copy of the occupancy:
//!
//! 1. **Vertical**: each `Empty` quad looks straight up (same x-span) for the
//!    first quad with anything in it; the groups overlapping that quad move
//!    down by one quad height.
//! 2. **Horizontal** (bottom row only): an `Empty` quad pulls the groups
//!    overlapping its right-hand neighbour one quad width to the left.
//!
//! Every candidate is checked against the working copy before it is accepted:
//! each moved cell must stay on the board and land on a free position (or one
//! vacated by the same candidate). Rejected candidates are simply dropped and
//! re-evaluated on a later tick. Accepted candidates form one batch that is
//! applied atomically.

use log::trace;

use crate::board::{Board, OccupancyCache, Occupant};
use crate::types::{Coord, GroupId, QUAD_SIZE};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuadState {
    Full,
    Empty,
    Mixed,
}

pub fn classify(cache: &OccupancyCache, origin: Coord) -> QuadState {
    let occupied = origin
        .ring()
        .iter()
        .filter(|&&p| cache.is_occupied(p))
        .count();
    match occupied {
        4 => QuadState::Full,
        0 => QuadState::Empty,
        _ => QuadState::Mixed,
    }
}

/// Number of gravity quad columns and rows
pub fn quad_grid(cache: &OccupancyCache) -> (i16, i16) {
    (
        cache.width() as i16 / QUAD_SIZE,
        cache.height() as i16 / QUAD_SIZE,
    )
}

/// Origin of gravity quad (`col`, `row`)
pub fn quad_origin(col: i16, row: i16) -> Coord {
    Coord::new(col * QUAD_SIZE, row * QUAD_SIZE)
}

/// Origins of every gravity quad, bottom row first, left to right
pub fn gravity_quads(cache: &OccupancyCache) -> impl Iterator<Item = Coord> {
    let (cols, rows) = quad_grid(cache);
    (0..rows).flat_map(move |row| (0..cols).map(move |col| quad_origin(col, row)))
}

/// One group's planned displacement
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Shift {
    pub group: GroupId,
    pub delta: Coord,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ShiftPlan {
    shifts: Vec<Shift>,
}

impl ShiftPlan {
    pub fn shifts(&self) -> &[Shift] {
        &self.shifts
    }

    pub fn is_empty(&self) -> bool {
        self.shifts.is_empty()
    }

    pub fn len(&self) -> usize {
        self.shifts.len()
    }

    pub fn groups(&self) -> impl Iterator<Item = GroupId> + '_ {
        self.shifts.iter().map(|s| s.group)
    }

    fn contains(&self, group: GroupId) -> bool {
        self.shifts.iter().any(|s| s.group == group)
    }
}

const DOWN: Coord = Coord::new(0, -QUAD_SIZE);
const LEFT: Coord = Coord::new(-QUAD_SIZE, 0);

/// Plan this tick's shifts. Groups for which `is_busy` holds never move.
pub fn plan(board: &Board, is_busy: impl Fn(GroupId) -> bool) -> ShiftPlan {
    let mut working = board.cache().clone();
    let mut plan = ShiftPlan::default();
    let (cols, rows) = quad_grid(&working);

    for col in 0..cols {
        for row in 0..rows {
            let empty = quad_origin(col, row);
            if classify(&working, empty) != QuadState::Empty {
                continue;
            }
            let source = (row + 1..rows)
                .map(|r| quad_origin(col, r))
                .find(|&o| classify(&working, o) != QuadState::Empty);
            if let Some(source) = source {
                try_accept(board, &mut working, &mut plan, source, DOWN, &is_busy);
            }
        }
    }

    for col in 0..cols - 1 {
        let empty = quad_origin(col, 0);
        if classify(&working, empty) != QuadState::Empty {
            continue;
        }
        let neighbour = quad_origin(col + 1, 0);
        if classify(&working, neighbour) != QuadState::Empty {
            try_accept(board, &mut working, &mut plan, neighbour, LEFT, &is_busy);
        }
    }

    plan
}

/// Validate moving every group overlapping `source` by `delta` and, if it fits,
/// record it in `plan` and update `working`.
fn try_accept(
    board: &Board,
    working: &mut OccupancyCache,
    plan: &mut ShiftPlan,
    source: Coord,
    delta: Coord,
    is_busy: &impl Fn(GroupId) -> bool,
) -> bool {
    let mut movers: Vec<GroupId> = Vec::new();
    for pos in source.ring() {
        if let Some(owner) = working.owner_at(pos) {
            if !movers.contains(&owner) {
                movers.push(owner);
            }
        }
    }
    if movers.is_empty() {
        return false;
    }
    if movers.iter().any(|&g| is_busy(g) || plan.contains(g)) {
        trace!("shift of quad {} skipped: group busy or already moving", source);
        return false;
    }

    for &id in &movers {
        let Some(group) = board.group(id) else {
            return false;
        };
        for pos in group.positions() {
            let dest = pos + delta;
            if !working.in_bounds(dest) {
                trace!("shift of {} blocked: {} leaves the board", id, dest);
                return false;
            }
            if let Some(owner) = working.owner_at(dest) {
                if !movers.contains(&owner) {
                    trace!("shift of {} blocked at {} by {}", id, dest, owner);
                    return false;
                }
            }
        }
    }

    for &id in &movers {
        if let Some(group) = board.group(id) {
            for pos in group.positions() {
                working.clear_at(pos);
            }
        }
    }
    for &id in &movers {
        if let Some(group) = board.group(id) {
            for cell in group.cells() {
                working.set(
                    cell.pos + delta,
                    Occupant {
                        color: cell.color,
                        group: id,
                    },
                );
            }
        }
        plan.shifts.push(Shift { group: id, delta });
    }
    true
}

/// Apply a plan to the board (translation plus cache rebuild)
pub fn apply(board: &mut Board, plan: &ShiftPlan) {
    let moves: Vec<(GroupId, Coord)> = plan.shifts.iter().map(|s| (s.group, s.delta)).collect();
    board.translate_groups(&moves);
}
