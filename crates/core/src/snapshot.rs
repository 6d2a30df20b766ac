use serde::Serialize;

use crate::session::Session;
use crate::types::{Color, PALETTE_SIZE};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CellSnapshot {
    pub x: i16,
    pub y: i16,
    pub color: &'static str,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GroupSnapshot {
    pub id: u32,
    pub busy: bool,
    pub cells: Vec<CellSnapshot>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CollectedSnapshot {
    pub color: &'static str,
    pub count: u32,
}

/// Serializable view of a session.
///
/// `grid` is row-major with the bottom row first: 0 = empty, otherwise
/// `color.index() + 1`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BoardSnapshot {
    pub width: u8,
    pub height: u8,
    pub gate: &'static str,
    pub ticks: u64,
    pub pending_tasks: usize,
    pub groups: Vec<GroupSnapshot>,
    pub grid: Vec<Vec<u8>>,
    pub collected: Vec<CollectedSnapshot>,
}

impl BoardSnapshot {
    pub fn capture(session: &Session) -> Self {
        let board = session.board();
        let groups = board
            .groups()
            .map(|g| GroupSnapshot {
                id: g.id().0,
                busy: session.is_busy(g.id()),
                cells: g
                    .cells()
                    .iter()
                    .map(|c| CellSnapshot {
                        x: c.pos.x,
                        y: c.pos.y,
                        color: c.color.as_str(),
                    })
                    .collect(),
            })
            .collect();

        let mut grid = Vec::with_capacity(board.height() as usize);
        board.write_u8_grid(&mut grid);

        let counts = session.collected_counts();
        let collected = (0..PALETTE_SIZE)
            .filter_map(|i| Color::from_index(i).map(|c| (c, counts[i])))
            .map(|(color, count)| CollectedSnapshot {
                color: color.as_str(),
                count,
            })
            .collect();

        Self {
            width: board.width(),
            height: board.height(),
            gate: session.gate().as_str(),
            ticks: session.ticks(),
            pending_tasks: session.pending_tasks(),
            groups,
            grid,
            collected,
        }
    }

    /// Number of occupied positions
    pub fn occupied(&self) -> usize {
        self.grid
            .iter()
            .flat_map(|row| row.iter())
            .filter(|&&v| v != 0)
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BoardConfig;
    use crate::group::GroupCell;
    use crate::types::Coord;

    #[test]
    fn snapshot_serializes_groups_and_grid() {
        let mut session = Session::new(BoardConfig::with_size(2, 2)).unwrap();
        session
            .insert_group(vec![
                GroupCell::new(Coord::new(0, 0), Color::Red),
                GroupCell::new(Coord::new(1, 0), Color::Blue),
            ])
            .unwrap();
        let snap = session.snapshot();
        assert_eq!(snap.occupied(), 2);
        assert_eq!(snap.gate, "idle");

        let json = serde_json::to_value(&snap).unwrap();
        assert_eq!(json["groups"][0]["cells"][1]["color"], "blue");
        assert_eq!(json["grid"][0][0], 1);
        assert_eq!(json["grid"][1][0], 0);
        assert_eq!(json["collected"].as_array().unwrap().len(), PALETTE_SIZE);
    }
}
