//! Match detection
//!
//! Two kinds of match exist:
//!
//! - **Single-color group**: every cell of a live group shares one color. The
//!   whole group is collected regardless of its size or shape.
//! - **Quad match**: an overlapping 2x2 window (step 1 in both axes) whose four
//!   cells are occupied, share one color and come from exactly two distinct
//!   groups. Windows fed by one group, or by three or more, are left alone.
//!
//! This module only finds matches; [`Session`](crate::Session) resolves them.

use arrayvec::ArrayVec;
use log::trace;

use crate::board::Board;
use crate::types::{Color, Coord, GroupId};

/// A confirmed quad match
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuadMatch {
    pub origin: Coord,
    pub color: Color,
    /// The two contributing groups, lower id first
    pub groups: [GroupId; 2],
}

impl QuadMatch {
    pub fn positions(&self) -> [Coord; 4] {
        self.origin.ring()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WindowVerdict {
    /// At least one position is empty or off the board
    Incomplete,
    /// All four occupied, more than one color
    Mixed,
    /// All four occupied with one color; contributors sorted by id
    Monochrome {
        color: Color,
        contributors: ArrayVec<GroupId, 4>,
    },
}

pub fn inspect_window(board: &Board, origin: Coord) -> WindowVerdict {
    let cache = board.cache();
    let mut occupants = ArrayVec::<_, 4>::new();
    for pos in origin.ring() {
        match cache.get(pos) {
            Some(o) => occupants.push(o),
            None => return WindowVerdict::Incomplete,
        }
    }
    let color = occupants[0].color;
    if occupants.iter().any(|o| o.color != color) {
        return WindowVerdict::Mixed;
    }
    let mut contributors = ArrayVec::<GroupId, 4>::new();
    for o in &occupants {
        if !contributors.contains(&o.group) {
            contributors.push(o.group);
        }
    }
    contributors.sort_unstable();
    WindowVerdict::Monochrome {
        color,
        contributors,
    }
}

/// Every live group whose cells all share one color, in creation order
pub fn single_color_groups(board: &Board) -> Vec<(GroupId, Color)> {
    board
        .groups()
        .filter_map(|g| g.single_color().map(|c| (g.id(), c)))
        .collect()
}

/// First window (x outer, y inner) that is a confirmed quad match.
///
/// Windows touching a group for which `is_busy` holds are skipped; they are
/// picked up by a later pass once the group's task finishes.
pub fn find_quad_match(board: &Board, is_busy: impl Fn(GroupId) -> bool) -> Option<QuadMatch> {
    let width = board.width() as i16;
    let height = board.height() as i16;
    for x in 0..width - 1 {
        for y in 0..height - 1 {
            let origin = Coord::new(x, y);
            let WindowVerdict::Monochrome {
                color,
                contributors,
            } = inspect_window(board, origin)
            else {
                continue;
            };
            if contributors.len() != 2 {
                trace!(
                    "window {} is {} but fed by {} group(s); not a match",
                    origin,
                    color,
                    contributors.len()
                );
                continue;
            }
            if contributors.iter().any(|&g| is_busy(g)) {
                trace!("window {} deferred: a contributing group is busy", origin);
                continue;
            }
            return Some(QuadMatch {
                origin,
                color,
                groups: [contributors[0], contributors[1]],
            });
        }
    }
    None
}
