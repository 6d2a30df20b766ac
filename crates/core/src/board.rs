//! Board module - live piece groups and the derived occupancy cache
//!
//! The board owns the set of live [`PieceGroup`]s. The [`OccupancyCache`] is a
//! flat position → (color, owner) lookup derived from those groups. It is never
//! a source of truth: every structural mutation goes through a board method
//! that ends with a full [`Board::rebuild_cache`], so the cache can always be
//! reconstructed from the groups alone.
//!
//! Coordinates: (x, y) where x ranges 0..width (left to right) and y ranges
//! 0..height (bottom to top).

use std::collections::BTreeMap;

use thiserror::Error;

use crate::group::{GroupCell, PieceGroup};
use crate::types::{Color, Coord, GroupId};

/// What the cache knows about an occupied position
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Occupant {
    pub color: Color,
    pub group: GroupId,
}

/// Position → occupant lookup, flat row-major storage (y * width + x)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OccupancyCache {
    width: u8,
    height: u8,
    slots: Vec<Option<Occupant>>,
}

impl OccupancyCache {
    pub fn new(width: u8, height: u8) -> Self {
        Self {
            width,
            height,
            slots: vec![None; width as usize * height as usize],
        }
    }

    #[inline(always)]
    fn index(&self, pos: Coord) -> Option<usize> {
        if pos.x < 0 || pos.x >= self.width as i16 || pos.y < 0 || pos.y >= self.height as i16 {
            return None;
        }
        Some(pos.y as usize * self.width as usize + pos.x as usize)
    }

    pub fn width(&self) -> u8 {
        self.width
    }

    pub fn height(&self) -> u8 {
        self.height
    }

    pub fn in_bounds(&self, pos: Coord) -> bool {
        self.index(pos).is_some()
    }

    pub fn get(&self, pos: Coord) -> Option<Occupant> {
        self.index(pos).and_then(|idx| self.slots[idx])
    }

    pub fn color_at(&self, pos: Coord) -> Option<Color> {
        self.get(pos).map(|o| o.color)
    }

    pub fn owner_at(&self, pos: Coord) -> Option<GroupId> {
        self.get(pos).map(|o| o.group)
    }

    pub fn is_occupied(&self, pos: Coord) -> bool {
        self.get(pos).is_some()
    }

    /// True iff every given position has an entry
    pub fn positions_occupied(&self, positions: &[Coord]) -> bool {
        positions.iter().all(|&p| self.is_occupied(p))
    }

    /// Store an occupant, returning whatever was there before.
    /// Out-of-bounds positions are ignored.
    pub(crate) fn set(&mut self, pos: Coord, occupant: Occupant) -> Option<Occupant> {
        let idx = self.index(pos)?;
        self.slots[idx].replace(occupant)
    }

    pub(crate) fn clear_at(&mut self, pos: Coord) -> Option<Occupant> {
        let idx = self.index(pos)?;
        self.slots[idx].take()
    }

    pub fn clear(&mut self) {
        for slot in &mut self.slots {
            *slot = None;
        }
    }

    /// Number of occupied positions
    pub fn len(&self) -> usize {
        self.slots.iter().filter(|s| s.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.iter().all(|s| s.is_none())
    }

    /// Occupied positions in row-major order (bottom row first)
    pub fn iter(&self) -> impl Iterator<Item = (Coord, Occupant)> + '_ {
        let width = self.width as usize;
        self.slots.iter().enumerate().filter_map(move |(idx, slot)| {
            slot.map(|o| (Coord::new((idx % width) as i16, (idx / width) as i16), o))
        })
    }
}

/// A group could not be registered
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PlacementError {
    #[error("a group needs at least one cell")]
    Empty,
    #[error("cell {0} lies outside the board")]
    OutOfBounds(Coord),
    #[error("cell {0} is listed twice")]
    DuplicatePosition(Coord),
    #[error("cell {0} is already occupied by {1}")]
    Occupied(Coord, GroupId),
}

/// The board broke one of its structural invariants
#[derive(Debug, Error, PartialEq, Eq)]
pub enum InvariantViolation {
    #[error("{first} and {second} both occupy {pos}")]
    Overlap {
        pos: Coord,
        first: GroupId,
        second: GroupId,
    },
    #[error("{group} has a cell outside the board at {pos}")]
    OutOfBounds { group: GroupId, pos: Coord },
    #[error("{0} is live but empty")]
    EmptyGroup(GroupId),
    #[error("occupancy cache disagrees with the groups at {0}")]
    CacheDivergence(Coord),
}

/// Result of [`Board::merge_groups`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Merged {
    pub len: usize,
    /// The absorbed cells slid onto the target's origin
    pub relocated: bool,
}

#[derive(Debug, Clone)]
pub struct Board {
    width: u8,
    height: u8,
    groups: BTreeMap<GroupId, PieceGroup>,
    cache: OccupancyCache,
    next_id: u32,
}

impl Board {
    pub fn new(width: u8, height: u8) -> Self {
        Self {
            width,
            height,
            groups: BTreeMap::new(),
            cache: OccupancyCache::new(width, height),
            next_id: 1,
        }
    }

    pub fn width(&self) -> u8 {
        self.width
    }

    pub fn height(&self) -> u8 {
        self.height
    }

    pub fn in_bounds(&self, pos: Coord) -> bool {
        self.cache.in_bounds(pos)
    }

    pub fn cache(&self) -> &OccupancyCache {
        &self.cache
    }

    pub fn color_at(&self, pos: Coord) -> Option<Color> {
        self.cache.color_at(pos)
    }

    pub fn owner_at(&self, pos: Coord) -> Option<GroupId> {
        self.cache.owner_at(pos)
    }

    pub fn positions_occupied(&self, positions: &[Coord]) -> bool {
        self.cache.positions_occupied(positions)
    }

    pub fn group(&self, id: GroupId) -> Option<&PieceGroup> {
        self.groups.get(&id)
    }

    pub fn contains_group(&self, id: GroupId) -> bool {
        self.groups.contains_key(&id)
    }

    /// Live groups in creation order
    pub fn groups(&self) -> impl Iterator<Item = &PieceGroup> {
        self.groups.values()
    }

    pub fn group_count(&self) -> usize {
        self.groups.len()
    }

    /// Clear and repopulate the cache from all live groups.
    ///
    /// Returns the number of positions claimed by more than one group (zero
    /// whenever the board is consistent).
    pub fn rebuild_cache(&mut self) -> usize {
        self.cache.clear();
        let mut collisions = 0;
        for group in self.groups.values() {
            for cell in group.cells() {
                let occupant = Occupant {
                    color: cell.color,
                    group: group.id(),
                };
                if self.cache.set(cell.pos, occupant).is_some() {
                    collisions += 1;
                }
            }
        }
        collisions
    }

    /// A freshly derived cache, independent of the live one
    pub fn rebuilt_cache(&self) -> OccupancyCache {
        let mut cache = OccupancyCache::new(self.width, self.height);
        for group in self.groups.values() {
            for cell in group.cells() {
                cache.set(
                    cell.pos,
                    Occupant {
                        color: cell.color,
                        group: group.id(),
                    },
                );
            }
        }
        cache
    }

    /// Check position exclusivity, bounds and cache consistency
    pub fn verify(&self) -> Result<(), InvariantViolation> {
        let mut derived = OccupancyCache::new(self.width, self.height);
        for group in self.groups.values() {
            if group.is_empty() {
                return Err(InvariantViolation::EmptyGroup(group.id()));
            }
            for cell in group.cells() {
                if !derived.in_bounds(cell.pos) {
                    return Err(InvariantViolation::OutOfBounds {
                        group: group.id(),
                        pos: cell.pos,
                    });
                }
                let occupant = Occupant {
                    color: cell.color,
                    group: group.id(),
                };
                if let Some(prev) = derived.set(cell.pos, occupant) {
                    return Err(InvariantViolation::Overlap {
                        pos: cell.pos,
                        first: prev.group,
                        second: group.id(),
                    });
                }
            }
        }
        if derived != self.cache {
            let pos = (0..self.height as i16)
                .flat_map(|y| (0..self.width as i16).map(move |x| Coord::new(x, y)))
                .find(|&p| derived.get(p) != self.cache.get(p))
                .unwrap_or_default();
            return Err(InvariantViolation::CacheDivergence(pos));
        }
        Ok(())
    }

    fn allocate_id(&mut self) -> GroupId {
        let id = GroupId(self.next_id);
        self.next_id += 1;
        id
    }

    /// Validate and register a group of arbitrary shape
    pub fn place_group(&mut self, cells: Vec<GroupCell>) -> Result<GroupId, PlacementError> {
        if cells.is_empty() {
            return Err(PlacementError::Empty);
        }
        for (i, cell) in cells.iter().enumerate() {
            if !self.in_bounds(cell.pos) {
                return Err(PlacementError::OutOfBounds(cell.pos));
            }
            if cells[..i].iter().any(|c| c.pos == cell.pos) {
                return Err(PlacementError::DuplicatePosition(cell.pos));
            }
            if let Some(owner) = self.owner_at(cell.pos) {
                return Err(PlacementError::Occupied(cell.pos, owner));
            }
        }
        let id = self.allocate_id();
        self.groups.insert(id, PieceGroup::new(id, cells));
        self.rebuild_cache();
        Ok(id)
    }

    /// Register a fresh 2x2 group; the caller guarantees the square is empty
    pub(crate) fn spawn_quad(&mut self, origin: Coord, colors: [Color; 4]) -> GroupId {
        debug_assert!(origin.ring().iter().all(|&p| self.in_bounds(p)));
        debug_assert!(!origin.ring().iter().any(|&p| self.cache.is_occupied(p)));
        let id = self.allocate_id();
        self.groups.insert(id, PieceGroup::quad(id, origin, colors));
        self.rebuild_cache();
        id
    }

    /// Destroy a group, returning it
    pub fn remove_group(&mut self, id: GroupId) -> Option<PieceGroup> {
        let group = self.groups.remove(&id)?;
        self.rebuild_cache();
        Some(group)
    }

    /// Remove the cells of `id` lying on `positions`; a group left empty is destroyed.
    ///
    /// Only the taken entries are cleared from the cache. Callers finish the
    /// mutation with a full [`Board::rebuild_cache`].
    pub(crate) fn take_cells(&mut self, id: GroupId, positions: &[Coord]) -> Vec<GroupCell> {
        let Some(group) = self.groups.get_mut(&id) else {
            return Vec::new();
        };
        let taken = group.take_cells_in(positions);
        if group.is_empty() {
            self.groups.remove(&id);
        }
        for cell in &taken {
            self.cache.clear_at(cell.pos);
        }
        taken
    }

    /// Slide `source` onto `target`'s origin, move every cell of `source`
    /// into `target` and destroy `source`.
    ///
    /// The slide only happens when every destination is on the board and free
    /// (or held by `source` itself); otherwise the cells join `target` where
    /// they are. Returns `None` (and changes nothing) when either group no
    /// longer exists.
    pub(crate) fn merge_groups(&mut self, target: GroupId, source: GroupId) -> Option<Merged> {
        if target == source || !self.groups.contains_key(&target) {
            return None;
        }
        let delta = self.groups.get(&target)?.origin() - self.groups.get(&source)?.origin();
        let relocated = delta != Coord::default()
            && self.groups.get(&source)?.positions().all(|pos| {
                let dest = pos + delta;
                self.cache.in_bounds(dest)
                    && self.cache.owner_at(dest).map_or(true, |owner| owner == source)
            });

        let mut absorbed = self.groups.remove(&source)?;
        if relocated {
            absorbed.translate(delta);
        }
        let merged = self.groups.get_mut(&target)?;
        merged.absorb(&mut absorbed);
        let len = merged.len();
        self.rebuild_cache();
        Some(Merged { len, relocated })
    }

    /// Translate each listed group by its delta
    pub(crate) fn translate_groups(&mut self, moves: &[(GroupId, Coord)]) {
        for &(id, delta) in moves {
            if let Some(group) = self.groups.get_mut(&id) {
                group.translate(delta);
            }
        }
        self.rebuild_cache();
    }

    pub(crate) fn replace_cells(&mut self, id: GroupId, cells: Vec<GroupCell>) -> bool {
        let Some(group) = self.groups.get_mut(&id) else {
            return false;
        };
        group.replace_cells(cells);
        self.rebuild_cache();
        true
    }

    /// Row-major grid bottom row first: 0 = empty, otherwise `color.index() + 1`
    pub fn write_u8_grid(&self, out: &mut Vec<Vec<u8>>) {
        out.clear();
        for y in 0..self.height as i16 {
            let row = (0..self.width as i16)
                .map(|x| {
                    self.color_at(Coord::new(x, y))
                        .map_or(0, |c| c.index() as u8 + 1)
                })
                .collect();
            out.push(row);
        }
    }
}
