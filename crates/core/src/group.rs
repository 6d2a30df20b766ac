//! Piece groups - rigid sets of colored cells
//!
//! A group is the unit that moves, rotates and merges. Its grid positions are
//! authoritative data: presentation reads them, never the other way around.
//! Fresh groups are 2x2 squares holding two cells of each of two colors; they
//! shrink when a quad match takes cells away and grow when they absorb another
//! group.

use crate::types::{Color, Coord, GroupId};

/// One colored cell at an absolute grid position
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GroupCell {
    pub pos: Coord,
    pub color: Color,
}

impl GroupCell {
    pub const fn new(pos: Coord, color: Color) -> Self {
        Self { pos, color }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PieceGroup {
    id: GroupId,
    cells: Vec<GroupCell>,
    /// Corner the group was laid out from; travels with the group and survives
    /// cell removal, so a shrunken group still knows its home square.
    origin: Coord,
}

impl PieceGroup {
    pub fn new(id: GroupId, cells: Vec<GroupCell>) -> Self {
        let mut group = Self {
            id,
            cells,
            origin: Coord::default(),
        };
        group.origin = group.anchor().unwrap_or_default();
        group
    }

    /// A 2x2 group at `origin`; `colors` follow [`Coord::ring`] order
    pub fn quad(id: GroupId, origin: Coord, colors: [Color; 4]) -> Self {
        let cells = origin
            .ring()
            .iter()
            .zip(colors)
            .map(|(&pos, color)| GroupCell::new(pos, color))
            .collect();
        Self { id, cells, origin }
    }

    pub fn id(&self) -> GroupId {
        self.id
    }

    pub fn origin(&self) -> Coord {
        self.origin
    }

    pub fn cells(&self) -> &[GroupCell] {
        &self.cells
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn positions(&self) -> impl Iterator<Item = Coord> + '_ {
        self.cells.iter().map(|c| c.pos)
    }

    pub fn contains(&self, pos: Coord) -> bool {
        self.cells.iter().any(|c| c.pos == pos)
    }

    pub fn color_at(&self, pos: Coord) -> Option<Color> {
        self.cells.iter().find(|c| c.pos == pos).map(|c| c.color)
    }

    /// The shared color when every cell has the same one; `None` for an empty group
    pub fn single_color(&self) -> Option<Color> {
        let first = self.cells.first()?.color;
        self.cells
            .iter()
            .all(|c| c.color == first)
            .then_some(first)
    }

    /// Remove and return every cell lying on one of `positions`
    pub fn take_cells_in(&mut self, positions: &[Coord]) -> Vec<GroupCell> {
        let mut taken = Vec::new();
        self.cells.retain(|c| {
            if positions.contains(&c.pos) {
                taken.push(*c);
                false
            } else {
                true
            }
        });
        taken
    }

    /// Move all of `other`'s cells into this group, leaving `other` empty.
    /// This group keeps its origin.
    pub fn absorb(&mut self, other: &mut PieceGroup) {
        self.cells.append(&mut other.cells);
    }

    pub fn translate(&mut self, delta: Coord) {
        for cell in &mut self.cells {
            cell.pos = cell.pos + delta;
        }
        self.origin = self.origin + delta;
    }

    /// Swap in a new cell layout; the origin follows the bounding box
    pub(crate) fn replace_cells(&mut self, cells: Vec<GroupCell>) {
        let before = self.anchor();
        self.cells = cells;
        if let (Some(before), Some(after)) = (before, self.anchor()) {
            self.origin = self.origin + (after - before);
        }
    }

    /// Bottom-left and top-right corners of the bounding box
    pub fn bounds(&self) -> Option<(Coord, Coord)> {
        let first = self.cells.first()?.pos;
        let (mut lo, mut hi) = (first, first);
        for c in &self.cells[1..] {
            lo.x = lo.x.min(c.pos.x);
            lo.y = lo.y.min(c.pos.y);
            hi.x = hi.x.max(c.pos.x);
            hi.y = hi.y.max(c.pos.y);
        }
        Some((lo, hi))
    }

    /// Bottom-left corner of the bounding box; the position presentation anchors the group at
    pub fn anchor(&self) -> Option<Coord> {
        self.bounds().map(|(lo, _)| lo)
    }

    /// Cells after a quarter turn clockwise about the bounding-box centre.
    ///
    /// Returns `None` when the turn would not land on integer cells (a bounding
    /// box whose width and height differ in parity).
    pub fn rotated_cw(&self) -> Option<Vec<GroupCell>> {
        let (lo, hi) = self.bounds()?;
        // Work in doubled coordinates so the centre is integral.
        let cx = lo.x + hi.x;
        let cy = lo.y + hi.y;
        self.cells
            .iter()
            .map(|c| {
                let dx = 2 * c.pos.x - cx;
                let dy = 2 * c.pos.y - cy;
                // (dx, dy) -> (dy, -dx) is clockwise with y pointing up.
                let nx = cx + dy;
                let ny = cy - dx;
                if nx % 2 != 0 || ny % 2 != 0 {
                    return None;
                }
                Some(GroupCell::new(Coord::new(nx / 2, ny / 2), c.color))
            })
            .collect()
    }
}
