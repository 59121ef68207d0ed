//! Pure Minesweeper board engine.
//!
//! Boards are generated from an explicit seed so both players of a duo
//! match can derive identical minefields from the seed stored on the
//! match record. Nothing in here touches the store or the clock.

use rand::{Rng, SeedableRng, rngs::StdRng};

/// A single cell of a Minesweeper grid.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Cell {
    /// Whether the cell hides a mine.
    pub is_mine: bool,
    /// Whether the cell has been revealed.
    pub is_revealed: bool,
    /// Whether the player placed a flag on the cell.
    pub is_flagged: bool,
    /// Number of mines in the eight surrounding cells.
    pub adjacent_mines: u8,
}

/// Outcome of revealing a single cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RevealOutcome {
    /// One or more safe cells were revealed; the round continues.
    Revealed,
    /// The revealed cell was a mine; every mine is now visible.
    Exploded,
    /// Every non-mine cell is revealed; the board is cleared.
    Cleared,
    /// The cell was already revealed or flagged; nothing changed.
    NoOp,
}

/// A per-client, per-round Minesweeper grid.
#[derive(Debug, Clone)]
pub struct Board {
    width: u32,
    height: u32,
    mines: u32,
    cells: Vec<Cell>,
}

impl Board {
    /// Generate a board of `width`×`height` with `mines` mines placed by a
    /// seeded RNG. The same `(dimensions, seed)` pair always yields the
    /// same minefield. `mines` is capped below the cell count so placement
    /// always terminates.
    pub fn generate(width: u32, height: u32, mines: u32, seed: u64) -> Self {
        let total = width * height;
        let mines = mines.min(total.saturating_sub(1));
        let mut cells = vec![Cell::default(); total as usize];
        let mut rng = StdRng::seed_from_u64(seed);

        let mut placed = 0;
        while placed < mines {
            let row = rng.random_range(0..height);
            let col = rng.random_range(0..width);
            let idx = (row * width + col) as usize;
            if cells[idx].is_mine {
                continue;
            }
            cells[idx].is_mine = true;
            placed += 1;

            for (r, c) in neighbours(row, col, width, height) {
                cells[(r * width + c) as usize].adjacent_mines += 1;
            }
        }

        Self {
            width,
            height,
            mines,
            cells,
        }
    }

    /// Board width in cells.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Board height in cells.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Cell at `(row, col)`, or `None` when out of bounds.
    pub fn cell(&self, row: u32, col: u32) -> Option<&Cell> {
        if row >= self.height || col >= self.width {
            return None;
        }
        Some(&self.cells[(row * self.width + col) as usize])
    }

    /// Reveal a cell, flood-filling outward from zero-adjacency cells.
    ///
    /// Revealing a mine exposes every mine on the board. Revealed or
    /// flagged cells are left untouched.
    pub fn reveal(&mut self, row: u32, col: u32) -> RevealOutcome {
        if row >= self.height || col >= self.width {
            return RevealOutcome::NoOp;
        }
        let idx = (row * self.width + col) as usize;
        if self.cells[idx].is_revealed || self.cells[idx].is_flagged {
            return RevealOutcome::NoOp;
        }

        self.cells[idx].is_revealed = true;

        if self.cells[idx].is_mine {
            for cell in self.cells.iter_mut().filter(|c| c.is_mine) {
                cell.is_revealed = true;
            }
            return RevealOutcome::Exploded;
        }

        if self.cells[idx].adjacent_mines == 0 {
            self.flood_from(row, col);
        }

        if self.is_cleared() {
            RevealOutcome::Cleared
        } else {
            RevealOutcome::Revealed
        }
    }

    /// Toggle a flag on an unrevealed cell.
    pub fn toggle_flag(&mut self, row: u32, col: u32) {
        if row >= self.height || col >= self.width {
            return;
        }
        let idx = (row * self.width + col) as usize;
        if !self.cells[idx].is_revealed {
            self.cells[idx].is_flagged = !self.cells[idx].is_flagged;
        }
    }

    /// Mines left to flag: total mines minus placed flags. Can go
    /// negative when the player over-flags.
    pub fn mines_remaining(&self) -> i64 {
        let flagged = self.cells.iter().filter(|c| c.is_flagged).count() as i64;
        i64::from(self.mines) - flagged
    }

    /// Fraction of non-mine cells currently revealed, in `[0, 1]`.
    pub fn progress(&self) -> f32 {
        let mut safe = 0u32;
        let mut revealed = 0u32;
        for cell in &self.cells {
            if !cell.is_mine {
                safe += 1;
                if cell.is_revealed {
                    revealed += 1;
                }
            }
        }
        if safe == 0 {
            0.0
        } else {
            revealed as f32 / safe as f32
        }
    }

    /// True when every non-mine cell has been revealed.
    pub fn is_cleared(&self) -> bool {
        self.cells.iter().all(|c| c.is_mine || c.is_revealed)
    }

    /// Iterative flood fill from a zero-adjacency cell, revealing its
    /// neighbourhood and cascading through further zero cells.
    fn flood_from(&mut self, row: u32, col: u32) {
        let mut stack = vec![(row, col)];
        while let Some((r, c)) = stack.pop() {
            for (nr, nc) in neighbours(r, c, self.width, self.height) {
                let idx = (nr * self.width + nc) as usize;
                if self.cells[idx].is_revealed || self.cells[idx].is_flagged {
                    continue;
                }
                self.cells[idx].is_revealed = true;
                if self.cells[idx].adjacent_mines == 0 {
                    stack.push((nr, nc));
                }
            }
        }
    }
}

/// In-bounds neighbours of `(row, col)`, excluding the cell itself.
fn neighbours(row: u32, col: u32, width: u32, height: u32) -> Vec<(u32, u32)> {
    let mut out = Vec::with_capacity(8);
    for r in row.saturating_sub(1)..=(row + 1).min(height - 1) {
        for c in col.saturating_sub(1)..=(col + 1).min(width - 1) {
            if r != row || c != col {
                out.push((r, c));
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_seed_yields_identical_boards() {
        let a = Board::generate(16, 16, 40, 42);
        let b = Board::generate(16, 16, 40, 42);
        assert_eq!(a.cells, b.cells);
    }

    #[test]
    fn different_seeds_differ() {
        let a = Board::generate(16, 16, 40, 1);
        let b = Board::generate(16, 16, 40, 2);
        assert_ne!(a.cells, b.cells);
    }

    #[test]
    fn mine_count_matches_request() {
        let board = Board::generate(9, 9, 10, 7);
        let mines = board.cells.iter().filter(|c| c.is_mine).count();
        assert_eq!(mines, 10);
    }

    #[test]
    fn adjacency_counts_are_consistent() {
        let board = Board::generate(9, 9, 10, 99);
        for row in 0..9 {
            for col in 0..9 {
                let expected = neighbours(row, col, 9, 9)
                    .into_iter()
                    .filter(|&(r, c)| board.cell(r, c).unwrap().is_mine)
                    .count() as u8;
                assert_eq!(board.cell(row, col).unwrap().adjacent_mines, expected);
            }
        }
    }

    #[test]
    fn revealing_a_mine_explodes_and_exposes_all_mines() {
        let mut board = Board::generate(9, 9, 10, 3);
        let (mr, mc) = first_mine(&board);
        assert_eq!(board.reveal(mr, mc), RevealOutcome::Exploded);
        for cell in board.cells.iter().filter(|c| c.is_mine) {
            assert!(cell.is_revealed);
        }
    }

    #[test]
    fn clearing_all_safe_cells_wins() {
        let mut board = Board::generate(8, 8, 10, 11);
        let mut last = RevealOutcome::NoOp;
        for row in 0..8 {
            for col in 0..8 {
                if !board.cell(row, col).unwrap().is_mine {
                    let outcome = board.reveal(row, col);
                    if outcome != RevealOutcome::NoOp {
                        last = outcome;
                    }
                }
            }
        }
        assert_eq!(last, RevealOutcome::Cleared);
        assert!((board.progress() - 1.0).abs() < f32::EPSILON);
    }

    #[test]
    fn flood_fill_reveals_zero_neighbourhood() {
        // A sparse board is all but guaranteed to contain a zero cell.
        let mut board = Board::generate(16, 16, 4, 5);
        let zero = (0..16 * 16).find_map(|i| {
            let (r, c) = (i / 16, i % 16);
            let cell = board.cell(r, c).unwrap();
            (!cell.is_mine && cell.adjacent_mines == 0).then_some((r, c))
        });
        let (r, c) = zero.expect("sparse board should contain a zero cell");
        board.reveal(r, c);
        let revealed = board.cells.iter().filter(|cell| cell.is_revealed).count();
        assert!(revealed > 1, "flood fill should cascade beyond one cell");
    }

    #[test]
    fn flagging_blocks_reveal_and_tracks_remaining() {
        let mut board = Board::generate(9, 9, 10, 17);
        let (r, c) = first_safe(&board);
        board.toggle_flag(r, c);
        assert_eq!(board.mines_remaining(), 9);
        assert_eq!(board.reveal(r, c), RevealOutcome::NoOp);
        board.toggle_flag(r, c);
        assert_eq!(board.mines_remaining(), 10);
    }

    #[test]
    fn progress_counts_only_safe_cells() {
        let mut board = Board::generate(9, 9, 10, 23);
        assert_eq!(board.progress(), 0.0);
        let (r, c) = first_safe(&board);
        board.reveal(r, c);
        assert!(board.progress() > 0.0);
        assert!(board.progress() <= 1.0);
    }

    fn first_mine(board: &Board) -> (u32, u32) {
        coords(board, true)
    }

    fn first_safe(board: &Board) -> (u32, u32) {
        coords(board, false)
    }

    fn coords(board: &Board, mine: bool) -> (u32, u32) {
        for row in 0..board.height() {
            for col in 0..board.width() {
                if board.cell(row, col).unwrap().is_mine == mine {
                    return (row, col);
                }
            }
        }
        unreachable!("board contains both mines and safe cells");
    }
}
