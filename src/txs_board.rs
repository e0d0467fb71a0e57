// Board engine
// Owns the grid, places mines, labels adjacency and runs the reveal cascade

use crate::txs_square::{Square, SquareError, SquareKind};
use rand::prelude::*;
use thiserror::Error;
use tracing::{debug, info};

/// Smallest allowed height or width
pub const MIN_SIDE: usize = 3;
/// Largest allowed height or width
pub const MAX_SIDE: usize = 60000;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BoardError {
    #[error("Board's height and width must be from {min} to {max}")]
    InvalidDimensions { min: usize, max: usize },

    #[error("Board's mine quantity must be from 1 to {max}")]
    InvalidMineCount { max: usize },

    #[error("Chosen square (row {row}, column {col}) is out of bound")]
    OutOfBounds { row: isize, col: isize },

    #[error("Mine at (row {row}, column {col}) lies outside the board")]
    InvalidMine { row: usize, col: usize },

    #[error("Mine at (row {row}, column {col}) is listed twice")]
    DuplicateMine { row: usize, col: usize },

    #[error("The game is over, start a new one")]
    GameOver,

    #[error(transparent)]
    Square(#[from] SquareError),
}

/// Outcome of an open
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayStatus {
    Normal, // game continues
    Win,    // every non-mine square is open
    Lose,   // a mine was opened
}

/// Minefield state for one game
#[derive(Debug, Clone)]
pub struct Board {
    h: usize,            // rows
    w: usize,            // columns
    mines: usize,        // total mine count
    grid: Vec<Square>,   // row-major squares
    opened: usize,       // squares opened by the player
    flags: usize,        // squares currently flagged
    status: PlayStatus,  // last reported outcome
}

/// In-bound 8-connected neighbours of (r, c)
fn neighbors(h: usize, w: usize, r: usize, c: usize) -> impl Iterator<Item = (usize, usize)> {
    (r.saturating_sub(1)..=(r + 1).min(h - 1))
        .flat_map(move |nr| (c.saturating_sub(1)..=(c + 1).min(w - 1)).map(move |nc| (nr, nc)))
        .filter(move |&pos| pos != (r, c))
}

/// Check the board shape, returning the largest legal mine count
fn max_mines_for(h: usize, w: usize) -> Result<usize, BoardError> {
    let side_ok = |v: usize| (MIN_SIDE..=MAX_SIDE).contains(&v);
    if !side_ok(h) || !side_ok(w) {
        return Err(BoardError::InvalidDimensions {
            min: MIN_SIDE,
            max: MAX_SIDE,
        });
    }
    Ok(h * w - 1)
}

impl Board {
    /// Create a board with randomly placed mines
    pub fn new(h: usize, w: usize, mines: usize) -> Result<Self, BoardError> {
        Board::with_rng(h, w, mines, &mut thread_rng())
    }

    /// Create a board drawing mine positions from `rng`
    /// Positions are drawn uniformly and redrawn on collision until `mines` are placed
    pub fn with_rng<R: Rng + ?Sized>(
        h: usize,
        w: usize,
        mines: usize,
        rng: &mut R,
    ) -> Result<Self, BoardError> {
        let max = max_mines_for(h, w)?;
        if mines < 1 || mines > max {
            return Err(BoardError::InvalidMineCount { max });
        }

        let n = h * w;
        let mut taken = vec![false; n];
        let mut positions = Vec::with_capacity(mines);
        let mut draws = 0usize;
        while positions.len() < mines {
            let i = rng.gen_range(0..n);
            draws += 1;
            if !taken[i] {
                taken[i] = true;
                positions.push((i / w, i % w));
            }
        }
        debug!(h, w, mines, draws, "placed mines");

        Board::with_mines(h, w, &positions)
    }

    /// Create a board with mines at the given (row, column) positions
    pub fn with_mines(h: usize, w: usize, positions: &[(usize, usize)]) -> Result<Self, BoardError> {
        let max = max_mines_for(h, w)?;
        if positions.is_empty() || positions.len() > max {
            return Err(BoardError::InvalidMineCount { max });
        }

        let mut is_mine = vec![false; h * w];
        for &(row, col) in positions {
            if row >= h || col >= w {
                return Err(BoardError::InvalidMine { row, col });
            }
            let idx = row * w + col;
            if is_mine[idx] {
                return Err(BoardError::DuplicateMine { row, col });
            }
            is_mine[idx] = true;
        }

        Board::from_layout(h, w, positions.len(), &is_mine)
    }

    // Label every square from the mine layout
    fn from_layout(h: usize, w: usize, mines: usize, is_mine: &[bool]) -> Result<Self, BoardError> {
        let mut grid = Vec::with_capacity(h * w);
        for r in 0..h {
            for c in 0..w {
                let kind = if is_mine[r * w + c] {
                    SquareKind::Mine
                } else {
                    let adj = neighbors(h, w, r, c)
                        .filter(|&(nr, nc)| is_mine[nr * w + nc])
                        .count();
                    SquareKind::from_adjacent(adj as u8)?
                };
                grid.push(Square::new(kind));
            }
        }
        info!(h, w, mines, "new board");

        Ok(Board {
            h,
            w,
            mines,
            grid,
            opened: 0,
            flags: 0,
            status: PlayStatus::Normal,
        })
    }

    /// Board dimensions as (height, width)
    pub fn size(&self) -> (usize, usize) {
        (self.h, self.w)
    }

    pub fn mine_count(&self) -> usize {
        self.mines
    }

    pub fn opened_count(&self) -> usize {
        self.opened
    }

    pub fn flag_count(&self) -> usize {
        self.flags
    }

    /// Mine counter for display (total mines - flags)
    /// Can be negative if the player places too many flags
    pub fn mines_left(&self) -> isize {
        self.mines as isize - self.flag_count() as isize
    }

    pub fn status(&self) -> PlayStatus {
        self.status
    }

    /// Convert a signed coordinate to a grid index
    fn locate(&self, row: isize, col: isize) -> Result<usize, BoardError> {
        if row < 0 || col < 0 || row as usize >= self.h || col as usize >= self.w {
            return Err(BoardError::OutOfBounds { row, col });
        }
        Ok(row as usize * self.w + col as usize)
    }

    fn ensure_playing(&self) -> Result<(), BoardError> {
        match self.status {
            PlayStatus::Normal => Ok(()),
            PlayStatus::Win | PlayStatus::Lose => Err(BoardError::GameOver),
        }
    }

    /// Read-only access for rendering
    pub fn square(&self, row: isize, col: isize) -> Result<&Square, BoardError> {
        let idx = self.locate(row, col)?;
        Ok(&self.grid[idx])
    }

    /// Toggle the flag on a closed square and return it
    pub fn toggle_flag(&mut self, row: isize, col: isize) -> Result<&Square, BoardError> {
        let idx = self.locate(row, col)?;
        self.ensure_playing()?;

        self.grid[idx].toggle_flag()?;
        if self.grid[idx].is_flagged() {
            self.flags += 1;
        } else {
            self.flags -= 1;
        }
        Ok(&self.grid[idx])
    }

    /// Open a square
    /// - A blank square cascades to every connected blank and their numbered border
    /// - A mine ends the game (Lose)
    /// - Opening the last non-mine square wins
    pub fn open_square(&mut self, row: isize, col: isize) -> Result<PlayStatus, BoardError> {
        let idx = self.locate(row, col)?;
        self.ensure_playing()?;

        let count = self.flood_open(idx)?;
        self.opened += count;

        self.status = if self.grid[idx].kind().is_mine() {
            PlayStatus::Lose
        } else if self.opened == self.h * self.w - self.mines {
            PlayStatus::Win
        } else {
            PlayStatus::Normal
        };
        debug!(row, col, count, status = ?self.status, "opened");
        if self.status != PlayStatus::Normal {
            info!(status = ?self.status, opened = self.opened, "game finished");
        }

        Ok(self.status)
    }

    /// Open `start` and, when it is blank, every square reachable through blanks
    /// Only the failure of `start` itself is reported. Squares in the cascade that
    /// are flagged or already open are skipped. Uses an explicit stack; each square
    /// is pushed at most once because it is opened before being pushed.
    fn flood_open(&mut self, start: usize) -> Result<usize, BoardError> {
        self.grid[start].open()?;
        let mut count = 1;
        if !self.grid[start].kind().is_blank() {
            return Ok(count);
        }

        let mut stack = vec![start];
        while let Some(idx) = stack.pop() {
            let (r, c) = (idx / self.w, idx % self.w);
            for (nr, nc) in neighbors(self.h, self.w, r, c) {
                let n = nr * self.w + nc;
                if self.grid[n].open().is_err() {
                    continue;
                }
                count += 1;
                if self.grid[n].kind().is_blank() {
                    stack.push(n);
                }
            }
        }
        Ok(count)
    }

    /// Expose every mine so the field can be shown after a loss
    /// Does nothing unless the game is lost. Flagged mines keep their flag
    /// and stay closed; the opened counter is not changed.
    pub fn reveal_mines(&mut self) {
        if self.status != PlayStatus::Lose {
            return;
        }
        for sq in self
            .grid
            .iter_mut()
            .filter(|s| s.kind().is_mine() && !s.is_flagged())
        {
            sq.expose();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use std::collections::HashSet;

    fn count_mine_neighbors(board: &Board, r: usize, c: usize) -> u8 {
        let (h, w) = board.size();
        neighbors(h, w, r, c)
            .filter(|&(nr, nc)| board.square(nr as isize, nc as isize).unwrap().kind().is_mine())
            .count() as u8
    }

    fn assert_labels_consistent(board: &Board) {
        let (h, w) = board.size();
        let mut mines = 0;
        for r in 0..h {
            for c in 0..w {
                let adj = count_mine_neighbors(board, r, c);
                match board.square(r as isize, c as isize).unwrap().kind() {
                    SquareKind::Mine => mines += 1,
                    SquareKind::Number(n) => assert_eq!(n, adj, "number at ({}, {})", r, c),
                    SquareKind::Blank => assert_eq!(adj, 0, "blank at ({}, {})", r, c),
                }
            }
        }
        assert_eq!(mines, board.mine_count());
    }

    fn opened_set(board: &Board) -> HashSet<(usize, usize)> {
        let (h, w) = board.size();
        let mut set = HashSet::new();
        for r in 0..h {
            for c in 0..w {
                if board.square(r as isize, c as isize).unwrap().is_opened() {
                    set.insert((r, c));
                }
            }
        }
        set
    }

    // 8x8, mines form a wall along row 3 (cols 0-5) and column 5 (rows 0-2),
    // plus one in the far corner
    fn walled_board() -> Board {
        let mines = [
            (0, 5),
            (1, 5),
            (2, 5),
            (3, 0),
            (3, 1),
            (3, 2),
            (3, 3),
            (3, 4),
            (3, 5),
            (7, 7),
        ];
        Board::with_mines(8, 8, &mines).unwrap()
    }

    // 3x3 with a single mine in the top-left corner
    fn corner_board() -> Board {
        Board::with_mines(3, 3, &[(0, 0)]).unwrap()
    }

    #[test]
    fn test_create_board() {
        let board = Board::new(5, 15, 6).unwrap();
        assert_eq!(board.size(), (5, 15));
        assert_eq!(board.mine_count(), 6);
        assert_eq!(board.opened_count(), 0);
        assert_eq!(board.status(), PlayStatus::Normal);
        assert_labels_consistent(&board);

        let non_mines = (0..5)
            .flat_map(|r| (0..15).map(move |c| (r, c)))
            .filter(|&(r, c)| !board.square(r, c).unwrap().kind().is_mine())
            .count();
        assert_eq!(non_mines, 69);
    }

    #[test]
    fn test_invalid_mine_count() {
        assert_eq!(
            Board::new(5, 5, 25).unwrap_err(),
            BoardError::InvalidMineCount { max: 24 }
        );
        assert_eq!(
            Board::new(5, 5, 0).unwrap_err(),
            BoardError::InvalidMineCount { max: 24 }
        );
        assert!(Board::new(5, 5, 24).is_ok());
    }

    #[test]
    fn test_invalid_dimensions() {
        let err = BoardError::InvalidDimensions {
            min: MIN_SIDE,
            max: MAX_SIDE,
        };
        assert_eq!(Board::new(2, 5, 1).unwrap_err(), err);
        assert_eq!(Board::new(5, 2, 1).unwrap_err(), err);
        assert_eq!(Board::new(MAX_SIDE + 1, 5, 1).unwrap_err(), err);
        assert_eq!(Board::with_mines(3, 0, &[(0, 0)]).unwrap_err(), err);
        assert!(err.to_string().contains("60000"));
    }

    #[test]
    fn test_with_mines_rejects_bad_layout() {
        assert_eq!(
            Board::with_mines(3, 3, &[(0, 0), (3, 1)]).unwrap_err(),
            BoardError::InvalidMine { row: 3, col: 1 }
        );
        assert_eq!(
            Board::with_mines(3, 3, &[(1, 1), (1, 1)]).unwrap_err(),
            BoardError::DuplicateMine { row: 1, col: 1 }
        );
        assert_eq!(
            Board::with_mines(3, 3, &[]).unwrap_err(),
            BoardError::InvalidMineCount { max: 8 }
        );
    }

    #[test]
    fn test_seeded_boards_match() {
        let a = Board::with_rng(9, 9, 10, &mut StdRng::seed_from_u64(7)).unwrap();
        let b = Board::with_rng(9, 9, 10, &mut StdRng::seed_from_u64(7)).unwrap();
        for r in 0..9 {
            for c in 0..9 {
                assert_eq!(a.square(r, c).unwrap().kind(), b.square(r, c).unwrap().kind());
            }
        }
    }

    #[test]
    fn test_bounds() {
        let mut board = walled_board();
        let oob = |row, col| BoardError::OutOfBounds { row, col };

        assert_eq!(board.open_square(-1, 0).unwrap_err(), oob(-1, 0));
        assert_eq!(board.open_square(0, -1).unwrap_err(), oob(0, -1));
        assert_eq!(board.open_square(8, 0).unwrap_err(), oob(8, 0));
        assert_eq!(board.open_square(0, 8).unwrap_err(), oob(0, 8));
        assert_eq!(board.toggle_flag(8, 8).unwrap_err(), oob(8, 8));
        assert_eq!(board.square(-1, -1).unwrap_err(), oob(-1, -1));
        assert_eq!(board.opened_count(), 0);

        assert!(board.square(0, 0).is_ok());
        assert!(board.square(7, 7).is_ok());
        assert!(board.toggle_flag(7, 7).is_ok());

        // the lower-left and upper-right corners belong to the same open area
        assert_eq!(walled_board().open_square(7, 0), Ok(PlayStatus::Normal));
        assert_eq!(walled_board().open_square(0, 7), Ok(PlayStatus::Normal));
    }

    #[test]
    fn test_walled_board_labels() {
        let board = walled_board();
        assert_labels_consistent(&board);
        assert_eq!(board.square(2, 4).unwrap().kind(), SquareKind::Number(5));
        assert_eq!(board.square(1, 3).unwrap().kind(), SquareKind::Blank);
        assert_eq!(board.square(0, 4).unwrap().kind(), SquareKind::Number(2));
    }

    #[test]
    fn test_flood_fill_region() {
        let mut board = walled_board();
        assert_eq!(board.open_square(0, 0), Ok(PlayStatus::Normal));

        let expected: HashSet<(usize, usize)> =
            (0..=2).flat_map(|r| (0..=4).map(move |c| (r, c))).collect();
        assert_eq!(opened_set(&board), expected);
        assert_eq!(board.opened_count(), 15);
    }

    #[test]
    fn test_open_number_no_cascade() {
        let mut board = walled_board();
        assert_eq!(board.open_square(2, 4), Ok(PlayStatus::Normal));
        assert_eq!(board.opened_count(), 1);
        assert_eq!(opened_set(&board).len(), 1);
    }

    #[test]
    fn test_open_twice() {
        let mut board = walled_board();
        board.open_square(0, 0).unwrap();
        let before = board.opened_count();

        assert_eq!(
            board.open_square(0, 0).unwrap_err(),
            BoardError::Square(SquareError::AlreadyOpened)
        );
        assert_eq!(
            board.open_square(2, 4).unwrap_err(),
            BoardError::Square(SquareError::AlreadyOpened)
        );
        assert_eq!(board.opened_count(), before);
    }

    #[test]
    fn test_flag_rules() {
        let mut board = walled_board();
        let sq = board.toggle_flag(0, 0).unwrap();
        assert!(sq.is_flagged());
        assert_eq!(board.flag_count(), 1);
        assert_eq!(board.mines_left(), 9);

        assert_eq!(
            board.open_square(0, 0).unwrap_err(),
            BoardError::Square(SquareError::Flagged)
        );
        assert_eq!(board.opened_count(), 0);

        board.toggle_flag(0, 0).unwrap();
        assert_eq!(board.flag_count(), 0);
        board.open_square(0, 0).unwrap();
        assert_eq!(
            board.toggle_flag(1, 1).unwrap_err(),
            BoardError::Square(SquareError::AlreadyOpened)
        );
    }

    #[test]
    fn test_cascade_skips_flagged() {
        let mut board = corner_board();
        board.toggle_flag(0, 2).unwrap();

        assert_eq!(board.open_square(2, 2), Ok(PlayStatus::Normal));
        assert_eq!(board.opened_count(), 7);
        assert!(!board.square(0, 2).unwrap().is_opened());
        assert!(board.square(0, 2).unwrap().is_flagged());

        board.toggle_flag(0, 2).unwrap();
        assert_eq!(board.open_square(0, 2), Ok(PlayStatus::Win));
    }

    #[test]
    fn test_win_by_cascade() {
        let mut board = corner_board();
        assert_eq!(board.open_square(2, 2), Ok(PlayStatus::Win));
        assert_eq!(board.opened_count(), 8);
        assert!(!board.square(0, 0).unwrap().is_opened());
    }

    #[test]
    fn test_win_by_numbers() {
        let mut board = Board::with_mines(3, 3, &[(0, 0), (0, 2), (2, 0), (2, 2)]).unwrap();
        for (r, c) in [(0, 1), (1, 0), (1, 1), (1, 2)] {
            assert_eq!(board.open_square(r, c), Ok(PlayStatus::Normal));
        }
        assert_eq!(board.open_square(2, 1), Ok(PlayStatus::Win));
    }

    #[test]
    fn test_lose() {
        let mut board = corner_board();
        assert_eq!(board.open_square(0, 0), Ok(PlayStatus::Lose));
        assert_eq!(board.opened_count(), 1);
        assert!(board.square(0, 0).unwrap().is_opened());
    }

    #[test]
    fn test_no_moves_after_game_over() {
        let mut board = corner_board();
        board.open_square(0, 0).unwrap();
        assert_eq!(board.open_square(2, 2).unwrap_err(), BoardError::GameOver);
        assert_eq!(board.toggle_flag(2, 2).unwrap_err(), BoardError::GameOver);
        assert_eq!(board.status(), PlayStatus::Lose);
        assert_eq!(board.opened_count(), 1);
    }

    #[test]
    fn test_reveal_mines() {
        let mut board = walled_board();
        board.open_square(3, 3).unwrap();
        board.reveal_mines();
        for (r, c) in [(0, 5), (3, 0), (7, 7)] {
            assert!(board.square(r, c).unwrap().is_opened());
        }
        assert_eq!(board.opened_count(), 1);
        assert!(!board.square(0, 0).unwrap().is_opened());
    }

    #[test]
    fn test_reveal_mines_needs_loss() {
        let mut board = Board::with_mines(3, 3, &[(0, 0)]).unwrap();
        board.toggle_flag(0, 0).unwrap();
        board.reveal_mines();
        let sq = board.square(0, 0).unwrap();
        assert!(!sq.is_opened());
        assert!(sq.is_flagged());

        // the game goes on: unflag and step on the mine
        board.toggle_flag(0, 0).unwrap();
        assert_eq!(board.open_square(0, 0), Ok(PlayStatus::Lose));
    }

    #[test]
    fn test_reveal_mines_keeps_flags() {
        let mut board = walled_board();
        board.toggle_flag(7, 7).unwrap();
        assert_eq!(board.open_square(0, 5), Ok(PlayStatus::Lose));
        board.reveal_mines();

        let flagged = board.square(7, 7).unwrap();
        assert!(flagged.is_flagged());
        assert!(!flagged.is_opened());
        assert!(board.square(3, 0).unwrap().is_opened());
        assert_eq!(board.flag_count(), 1);
    }

    #[test]
    fn test_deep_cascade_large_board() {
        // one mine in a corner of a large field: a single open reveals everything else
        let mut board = Board::with_mines(600, 600, &[(599, 599)]).unwrap();
        assert_eq!(board.open_square(0, 0), Ok(PlayStatus::Win));
        assert_eq!(board.opened_count(), 600 * 600 - 1);
    }

    proptest! {
        #[test]
        fn prop_labels_match_mines(h in 3usize..24, w in 3usize..24, seed: u64, density in 0.0f64..1.0) {
            let max = h * w - 1;
            let mines = 1 + ((max - 1) as f64 * density) as usize;
            let board = Board::with_rng(h, w, mines, &mut StdRng::seed_from_u64(seed)).unwrap();
            assert_labels_consistent(&board);
        }

        #[test]
        fn prop_open_counts_each_square_once(h in 3usize..20, w in 3usize..20, seed: u64, r in 0usize..20, c in 0usize..20) {
            let (r, c) = (r % h, c % w);
            let mines = (h * w / 8).max(1);
            let mut board = Board::with_rng(h, w, mines, &mut StdRng::seed_from_u64(seed)).unwrap();
            let status = board.open_square(r as isize, c as isize).unwrap();

            prop_assert_eq!(board.opened_count(), opened_set(&board).len());
            let kind = board.square(r as isize, c as isize).unwrap().kind();
            match kind {
                SquareKind::Mine => prop_assert_eq!(status, PlayStatus::Lose),
                SquareKind::Number(_) => prop_assert_eq!(board.opened_count(), 1),
                SquareKind::Blank => {
                    // every open blank has all of its neighbours open
                    for &(or, oc) in &opened_set(&board) {
                        if board.square(or as isize, oc as isize).unwrap().kind().is_blank() {
                            for (nr, nc) in neighbors(h, w, or, oc) {
                                prop_assert!(board.square(nr as isize, nc as isize).unwrap().is_opened());
                            }
                        }
                    }
                }
            }
            let safe = h * w - mines;
            if status != PlayStatus::Lose {
                prop_assert_eq!(status == PlayStatus::Win, board.opened_count() == safe);
            }
        }

        #[test]
        fn prop_opening_every_safe_square_wins(h in 3usize..12, w in 3usize..12, seed: u64) {
            let mines = (h * w / 5).max(1);
            let mut board = Board::with_rng(h, w, mines, &mut StdRng::seed_from_u64(seed)).unwrap();
            let mut last = PlayStatus::Normal;
            for r in 0..h as isize {
                for c in 0..w as isize {
                    let sq = board.square(r, c).unwrap();
                    if sq.kind().is_mine() || sq.is_opened() {
                        continue;
                    }
                    prop_assert_eq!(last, PlayStatus::Normal);
                    last = board.open_square(r, c).unwrap();
                }
            }
            prop_assert_eq!(last, PlayStatus::Win);
            prop_assert_eq!(board.opened_count(), h * w - mines);
        }
    }
}
