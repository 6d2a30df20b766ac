//! Spawner - refills empty gravity quads
//!
//! New groups always fill a whole gravity quad with two cells of each of two
//! distinct palette colors. The base layout puts the first color on the
//! bottom half; a random quarter turn (0/90/180/270 degrees) decides which
//! half actually gets it.

use crate::board::OccupancyCache;
use crate::gravity::{classify, quad_grid, quad_origin, QuadState};
use crate::rng::SimpleRng;
use crate::types::{Color, Coord, PALETTE_SIZE};

/// First empty gravity quad scanning top to bottom, left to right
pub fn find_empty_quad(cache: &OccupancyCache) -> Option<Coord> {
    let (cols, rows) = quad_grid(cache);
    (0..rows)
        .rev()
        .flat_map(|row| (0..cols).map(move |col| quad_origin(col, row)))
        .find(|&origin| classify(cache, origin) == QuadState::Empty)
}

/// Two distinct palette colors, each picked uniformly (re-rolled until they differ)
pub fn roll_colors(rng: &mut SimpleRng, palette: &[Color; PALETTE_SIZE]) -> (Color, Color) {
    loop {
        let first = palette[rng.next_range(PALETTE_SIZE as u32) as usize];
        let second = palette[rng.next_range(PALETTE_SIZE as u32) as usize];
        if first != second {
            return (first, second);
        }
    }
}

/// Colors in [`Coord::ring`] order after `quarter_turns` quarter turns of the base layout
pub fn layout(first: Color, second: Color, quarter_turns: u8) -> [Color; 4] {
    let base = [first, first, second, second];
    let k = quarter_turns as usize % 4;
    [base[k], base[(k + 1) % 4], base[(k + 2) % 4], base[(k + 3) % 4]]
}

pub fn roll_layout(rng: &mut SimpleRng, palette: &[Color; PALETTE_SIZE]) -> [Color; 4] {
    let (first, second) = roll_colors(rng, palette);
    let turns = rng.next_range(4) as u8;
    layout(first, second, turns)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::Board;
    use crate::group::GroupCell;
    use Color::*;

    #[test]
    fn scan_prefers_top_left() {
        let mut board = Board::new(4, 4);
        assert_eq!(find_empty_quad(board.cache()), Some(Coord::new(0, 2)));
        board
            .place_group(vec![GroupCell::new(Coord::new(1, 3), Red)])
            .unwrap();
        assert_eq!(find_empty_quad(board.cache()), Some(Coord::new(2, 2)));
    }

    #[test]
    fn full_board_has_no_empty_quad() {
        let mut board = Board::new(2, 2);
        board
            .place_group(vec![GroupCell::new(Coord::new(0, 0), Red)])
            .unwrap();
        assert_eq!(find_empty_quad(board.cache()), None);
    }

    #[test]
    fn layouts_keep_halves_together() {
        assert_eq!(layout(Red, Blue, 0), [Red, Red, Blue, Blue]);
        assert_eq!(layout(Red, Blue, 1), [Red, Blue, Blue, Red]);
        assert_eq!(layout(Red, Blue, 2), [Blue, Blue, Red, Red]);
        assert_eq!(layout(Red, Blue, 3), [Blue, Red, Red, Blue]);
        assert_eq!(layout(Red, Blue, 4), layout(Red, Blue, 0));
    }

    #[test]
    fn rolled_layouts_have_two_distinct_colors() {
        let mut rng = SimpleRng::new(99);
        for _ in 0..500 {
            let colors = roll_layout(&mut rng, &Color::ALL);
            let first = colors[0];
            let same = colors.iter().filter(|&&c| c == first).count();
            assert_eq!(same, 2);
            assert!(colors.iter().any(|&c| c != first));
        }
    }
}
