//! Game state: board, falling piece, collision, locking, line clears,
//! scoring.

use crate::GameConfig;
use crate::highscore::{HighScoreStore, ScoreStoreError};
use crate::input::Command;
use crate::shapes::{GRID_SIZE, RandomCatalog, Shape, ShapeCatalog, ShapeGrid, ShapeKind, rotate_cw};
use std::collections::VecDeque;

/// Single cell: empty or locked with the kind that filled it. The kind
/// tag only drives rendering colour; occupancy treats any filled cell
/// the same.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cell {
    Empty,
    Filled(ShapeKind),
}

impl Cell {
    #[inline]
    pub fn is_empty(self) -> bool {
        self == Cell::Empty
    }
}

/// Board of locked cells. rows[0] is the top row; dimensions are fixed
/// after creation.
#[derive(Debug, Clone)]
pub struct Board {
    width: usize,
    height: usize,
    rows: VecDeque<Vec<Cell>>,
}

impl Board {
    pub fn new(width: u16, height: u16) -> Self {
        let (w, h) = (width as usize, height as usize);
        let rows = (0..h).map(|_| vec![Cell::Empty; w]).collect();
        Self {
            width: w,
            height: h,
            rows,
        }
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    /// Cell at (x, y), or None out of bounds.
    #[inline]
    pub fn cell(&self, x: usize, y: usize) -> Option<Cell> {
        self.rows.get(y).and_then(|row| row.get(x)).copied()
    }

    /// True iff (x, y) is inside the board and holds a locked cell.
    /// Out-of-bounds coordinates report unoccupied; rows above the top
    /// (negative y) may be probed during rotation near spawn.
    pub fn is_occupied(&self, x: i32, y: i32) -> bool {
        if x < 0 || y < 0 {
            return false;
        }
        matches!(self.cell(x as usize, y as usize), Some(Cell::Filled(_)))
    }

    /// Lock a shape grid into the board. The caller has already ruled out
    /// collisions; cells that the forced descent drove past an edge are
    /// dropped rather than written out of bounds.
    pub fn place(&mut self, grid: &ShapeGrid, kind: ShapeKind, x: i32, y: i32) {
        for (r, row) in grid.iter().enumerate() {
            for (c, &filled) in row.iter().enumerate() {
                if !filled {
                    continue;
                }
                let (tx, ty) = (x + c as i32, y + r as i32);
                if tx < 0 || ty < 0 {
                    continue;
                }
                if let Some(cell) = self
                    .rows
                    .get_mut(ty as usize)
                    .and_then(|row| row.get_mut(tx as usize))
                {
                    *cell = Cell::Filled(kind);
                }
            }
        }
    }

    /// Remove every complete row and insert an empty row at the top for
    /// each, preserving height. Returns the number of lines cleared.
    pub fn clear_complete_lines(&mut self) -> usize {
        let complete: Vec<usize> = (0..self.height)
            .filter(|&y| self.rows[y].iter().all(|c| !c.is_empty()))
            .collect();
        // Removing row y and pushing a fresh top row leaves every index
        // below y unchanged, so the collected indices stay valid when
        // applied in scan order.
        for &y in &complete {
            self.rows.remove(y);
            self.rows.push_front(vec![Cell::Empty; self.width]);
        }
        complete.len()
    }
}

/// The falling piece: current grid (rotation folded into the grid) and
/// top-left anchor in board coordinates.
#[derive(Debug, Clone)]
pub struct Piece {
    pub kind: ShapeKind,
    pub grid: ShapeGrid,
    pub x: i32,
    pub y: i32,
}

impl Piece {
    /// Spawn at the horizontally centred column, row 0.
    pub fn spawn(shape: Shape, board_width: usize) -> Self {
        Self {
            kind: shape.kind,
            grid: shape.grid,
            x: board_width as i32 / 2 - GRID_SIZE as i32 / 2,
            y: 0,
        }
    }

    /// Board coordinates of the piece's filled cells.
    pub fn cells(&self) -> impl Iterator<Item = (i32, i32)> + '_ {
        self.grid.iter().enumerate().flat_map(move |(r, row)| {
            row.iter()
                .enumerate()
                .filter(|&(_, &filled)| filled)
                .map(move |(c, _)| (self.x + c as i32, self.y + r as i32))
        })
    }
}

/// True if any filled cell of `grid` placed at (x, y) leaves the board's
/// sides or bottom, or lands on a locked cell. The top boundary is not
/// checked: a shape may probe negative rows without being flagged.
pub fn would_collide(board: &Board, grid: &ShapeGrid, x: i32, y: i32) -> bool {
    for (r, row) in grid.iter().enumerate() {
        for (c, &filled) in row.iter().enumerate() {
            if !filled {
                continue;
            }
            let (tx, ty) = (x + c as i32, y + r as i32);
            if tx < 0 || tx >= board.width() as i32 || ty >= board.height() as i32 {
                return true;
            }
            if board.is_occupied(tx, ty) {
                return true;
            }
        }
    }
    false
}

/// Result of a rotation attempt: the grid to keep using, and whether the
/// rotated form was accepted.
#[derive(Debug, Clone)]
pub struct RotationOutcome {
    pub applied: bool,
    pub grid: ShapeGrid,
}

/// Rotate clockwise if the rotated grid fits at the current anchor,
/// otherwise keep the original orientation. Rejection is silent.
pub fn try_rotate(board: &Board, grid: &ShapeGrid, x: i32, y: i32) -> RotationOutcome {
    let rotated = rotate_cw(grid);
    if would_collide(board, &rotated, x, y) {
        RotationOutcome {
            applied: false,
            grid: *grid,
        }
    } else {
        RotationOutcome {
            applied: true,
            grid: rotated,
        }
    }
}

/// One playthrough: board, falling piece, score and high score.
#[derive(Debug)]
pub struct GameState {
    pub board: Board,
    pub piece: Piece,
    pub score: u32,
    pub high_score: u32,
    pub lines_cleared: u32,
    pub game_over: bool,
    catalog: Box<dyn ShapeCatalog>,
    store: HighScoreStore,
    /// Last high-score write failure; reported once after the session.
    pub save_error: Option<ScoreStoreError>,
}

impl GameState {
    pub fn new(config: &GameConfig) -> Self {
        let catalog: Box<dyn ShapeCatalog> = match config.seed {
            Some(seed) => Box::new(RandomCatalog::seeded(seed)),
            None => Box::new(RandomCatalog::new()),
        };
        let store = HighScoreStore::new(config.score_file.clone());
        Self::with_catalog(config, catalog, store)
    }

    /// Build a session with an explicit catalog and score store.
    pub fn with_catalog(
        config: &GameConfig,
        mut catalog: Box<dyn ShapeCatalog>,
        store: HighScoreStore,
    ) -> Self {
        let board = Board::new(config.width, config.height);
        let piece = Piece::spawn(catalog.next_shape(), board.width());
        let high_score = store.load();
        Self {
            board,
            piece,
            score: 0,
            high_score,
            lines_cleared: 0,
            game_over: false,
            catalog,
            store,
            save_error: None,
        }
    }

    /// Advance one turn. Rotate and the horizontal moves carry one
    /// unconditional row of descent; soft and hard drop only descend
    /// where the board allows; an unrecognized command moves nothing.
    /// The forced descent skips collision checking, so a move can drive
    /// the piece one row into the stack; the lock check picks that up.
    pub fn step(&mut self, cmd: Command) {
        if self.game_over {
            return;
        }
        match cmd {
            Command::Rotate => {
                let outcome = try_rotate(&self.board, &self.piece.grid, self.piece.x, self.piece.y);
                self.piece.grid = outcome.grid;
                self.piece.y += 1;
            }
            Command::MoveLeft => {
                if !would_collide(&self.board, &self.piece.grid, self.piece.x - 1, self.piece.y) {
                    self.piece.x -= 1;
                }
                self.piece.y += 1;
            }
            Command::MoveRight => {
                if !would_collide(&self.board, &self.piece.grid, self.piece.x + 1, self.piece.y) {
                    self.piece.x += 1;
                }
                self.piece.y += 1;
            }
            Command::SoftDrop => {
                if !would_collide(&self.board, &self.piece.grid, self.piece.x, self.piece.y + 1) {
                    self.piece.y += 1;
                }
            }
            Command::HardDrop => {
                while !would_collide(&self.board, &self.piece.grid, self.piece.x, self.piece.y + 1)
                {
                    self.piece.y += 1;
                }
            }
            Command::Restart | Command::Quit | Command::Unrecognized => {}
        }

        if would_collide(&self.board, &self.piece.grid, self.piece.x, self.piece.y + 1) {
            self.lock_piece();
        }
        if would_collide(&self.board, &self.piece.grid, self.piece.x, self.piece.y) {
            self.game_over = true;
        }
    }

    /// Transfer the piece's cells into the board, clear lines, score, and
    /// spawn the next piece. Score goes up by 1 per lock regardless of
    /// how many lines cleared.
    fn lock_piece(&mut self) {
        self.board
            .place(&self.piece.grid, self.piece.kind, self.piece.x, self.piece.y);
        self.lines_cleared += self.board.clear_complete_lines() as u32;
        self.score += 1;
        if self.score > self.high_score {
            self.high_score = self.score;
            if let Err(err) = self.store.save(self.high_score) {
                self.save_error = Some(err);
            }
        }
        self.piece = Piece::spawn(self.catalog.next_shape(), self.board.width());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shapes::ScriptedCatalog;
    use tempfile::TempDir;

    fn config_in(dir: &TempDir, width: u16, height: u16) -> GameConfig {
        GameConfig {
            width,
            height,
            score_file: dir.path().join("highscore.txt"),
            seed: None,
        }
    }

    fn scripted(config: &GameConfig, kinds: &[ShapeKind]) -> GameState {
        let catalog = Box::new(ScriptedCatalog::new(kinds.to_vec()));
        let store = HighScoreStore::new(config.score_file.clone());
        GameState::with_catalog(config, catalog, store)
    }

    fn fill_row(board: &mut Board, y: usize, kind: ShapeKind) {
        board.rows[y] = vec![Cell::Filled(kind); board.width];
    }

    #[test]
    fn clearing_an_empty_board_does_nothing() {
        let mut board = Board::new(10, 20);
        let before = board.rows.clone();
        assert_eq!(board.clear_complete_lines(), 0);
        assert_eq!(board.rows, before);
    }

    #[test]
    fn clearing_keeps_incomplete_rows_in_relative_order() {
        let mut board = Board::new(10, 6);
        // Rows 2 and 4 complete; rows 3 and 5 carry distinct markers.
        fill_row(&mut board, 2, ShapeKind::I);
        fill_row(&mut board, 4, ShapeKind::I);
        board.rows[3][1] = Cell::Filled(ShapeKind::S);
        board.rows[5][2] = Cell::Filled(ShapeKind::T);

        assert_eq!(board.clear_complete_lines(), 2);
        assert_eq!(board.height(), board.rows.len());
        // Two fresh empty rows at the top, survivors shifted down in order.
        for y in 0..4 {
            assert!(board.rows[y].iter().all(|c| c.is_empty()), "row {y}");
        }
        assert_eq!(board.cell(1, 4), Some(Cell::Filled(ShapeKind::S)));
        assert_eq!(board.cell(2, 5), Some(Cell::Filled(ShapeKind::T)));
    }

    #[test]
    fn clearing_adjacent_rows_does_not_double_shift() {
        let mut board = Board::new(10, 6);
        fill_row(&mut board, 4, ShapeKind::O);
        fill_row(&mut board, 5, ShapeKind::O);
        board.rows[3][0] = Cell::Filled(ShapeKind::Z);

        assert_eq!(board.clear_complete_lines(), 2);
        assert_eq!(board.cell(0, 5), Some(Cell::Filled(ShapeKind::Z)));
        for y in 0..5 {
            assert!(board.rows[y].iter().all(|c| c.is_empty()), "row {y}");
        }
    }

    #[test]
    fn collision_at_the_side_and_bottom_bounds() {
        let board = Board::new(10, 20);
        let grid = ShapeKind::I.base_grid();
        // Filled cells sit in grid row 1, columns 0..=3.
        assert!(would_collide(&board, &grid, -1, 0), "left wall");
        assert!(would_collide(&board, &grid, 7, 0), "right wall");
        assert!(would_collide(&board, &grid, 3, 19), "floor");
        assert!(!would_collide(&board, &grid, 3, 18), "resting row is legal");
        assert!(!would_collide(&board, &grid, 0, 0));
        assert!(!would_collide(&board, &grid, 6, 0));
    }

    #[test]
    fn negative_rows_are_not_collisions() {
        let board = Board::new(10, 20);
        // O fills grid rows 0 and 1; at y = -1 its top half probes row -1.
        let grid = ShapeKind::O.base_grid();
        assert!(!would_collide(&board, &grid, 3, -1));
    }

    #[test]
    fn collision_with_locked_cells() {
        let mut board = Board::new(10, 20);
        board.rows[19][4] = Cell::Filled(ShapeKind::J);
        let grid = ShapeKind::O.base_grid();
        // O at x = 3 covers columns 4 and 5.
        assert!(would_collide(&board, &grid, 3, 18));
        assert!(!would_collide(&board, &grid, 5, 18));
    }

    #[test]
    fn rotation_is_rejected_against_the_wall_but_kept_in_the_open() {
        let board = Board::new(10, 20);
        let vertical = rotate_cw(&ShapeKind::I.base_grid());

        let open = try_rotate(&board, &ShapeKind::I.base_grid(), 3, 0);
        assert!(open.applied);
        assert_eq!(open.grid, vertical);

        // Vertical bar at x = 7: rotating back to horizontal needs
        // columns 7..=10, which leaves the board.
        let blocked = try_rotate(&board, &vertical, 7, 0);
        assert!(!blocked.applied);
        assert_eq!(blocked.grid, vertical);
    }

    #[test]
    fn spawn_is_horizontally_centred_at_the_top() {
        let dir = tempfile::tempdir().unwrap();
        let state = scripted(&config_in(&dir, 10, 20), &[ShapeKind::I]);
        assert_eq!((state.piece.x, state.piece.y), (3, 0));

        let state = scripted(&config_in(&dir, 8, 20), &[ShapeKind::I]);
        assert_eq!((state.piece.x, state.piece.y), (2, 0));
    }

    #[test]
    fn descent_per_command_is_asymmetric() {
        let dir = tempfile::tempdir().unwrap();
        let mut state = scripted(&config_in(&dir, 10, 20), &[ShapeKind::I]);

        state.step(Command::MoveLeft);
        assert_eq!((state.piece.x, state.piece.y), (2, 1), "left adds a row");
        state.step(Command::MoveRight);
        assert_eq!((state.piece.x, state.piece.y), (3, 2), "right adds a row");
        state.step(Command::Rotate);
        assert_eq!(state.piece.y, 3, "rotate adds a row");
        state.step(Command::SoftDrop);
        assert_eq!(state.piece.y, 4, "soft drop is a single row");
        state.step(Command::Unrecognized);
        assert_eq!(state.piece.y, 4, "no-op turn has no gravity");
    }

    #[test]
    fn rejected_moves_still_descend() {
        let dir = tempfile::tempdir().unwrap();
        let mut state = scripted(&config_in(&dir, 10, 20), &[ShapeKind::I]);
        // Walk the bar into the left wall, then keep pushing.
        for _ in 0..3 {
            state.step(Command::MoveLeft);
        }
        assert_eq!((state.piece.x, state.piece.y), (0, 3));
        state.step(Command::MoveLeft);
        assert_eq!((state.piece.x, state.piece.y), (0, 4), "move rejected, descent kept");
    }

    #[test]
    fn rejected_rotation_keeps_the_grid_and_descends() {
        let dir = tempfile::tempdir().unwrap();
        let mut state = scripted(&config_in(&dir, 10, 20), &[ShapeKind::I]);
        let vertical = rotate_cw(&ShapeKind::I.base_grid());
        state.piece.grid = vertical;
        state.piece.x = 7;

        state.step(Command::Rotate);
        assert_eq!(state.piece.grid, vertical, "orientation kept on rejection");
        assert_eq!(state.piece.y, 1, "forced descent still applies");
        assert_eq!(state.score, 0);
    }

    #[test]
    fn hard_drop_locks_on_the_bottom_row() {
        let dir = tempfile::tempdir().unwrap();
        let mut state = scripted(&config_in(&dir, 10, 20), &[ShapeKind::I]);

        state.step(Command::HardDrop);
        assert_eq!(state.score, 1);
        for x in 3..7 {
            assert_eq!(state.board.cell(x, 19), Some(Cell::Filled(ShapeKind::I)));
        }
        // Next piece is already falling from the top.
        assert_eq!((state.piece.x, state.piece.y), (3, 0));
        assert!(!state.game_over);
    }

    #[test]
    fn soft_drop_on_a_resting_piece_locks_it() {
        let dir = tempfile::tempdir().unwrap();
        let mut state = scripted(&config_in(&dir, 10, 20), &[ShapeKind::O]);
        state.piece.y = 18;

        state.step(Command::SoftDrop);
        assert_eq!(state.score, 1);
        assert_eq!(state.board.cell(4, 19), Some(Cell::Filled(ShapeKind::O)));
    }

    #[test]
    fn a_noop_turn_still_locks_a_resting_piece() {
        let dir = tempfile::tempdir().unwrap();
        let mut state = scripted(&config_in(&dir, 10, 20), &[ShapeKind::O]);
        state.piece.y = 18;

        state.step(Command::Unrecognized);
        assert_eq!(state.score, 1, "lock check runs on every turn");
    }

    #[test]
    fn forced_descent_can_overlap_the_stack_before_locking() {
        let dir = tempfile::tempdir().unwrap();
        let mut state = scripted(&config_in(&dir, 10, 20), &[ShapeKind::O]);
        // Partial bottom row; the O rests on it at y = 17.
        for x in 0..9 {
            state.board.rows[19][x] = Cell::Filled(ShapeKind::J);
        }
        state.piece.y = 17;

        // The shift is legal, the forced descent drives the piece one row
        // into the stack, and the lock check then locks it there.
        state.step(Command::MoveLeft);
        assert_eq!(state.score, 1);
        assert_eq!(state.board.cell(3, 18), Some(Cell::Filled(ShapeKind::O)));
        assert_eq!(state.board.cell(4, 18), Some(Cell::Filled(ShapeKind::O)));
        assert!(!state.game_over);
    }

    #[test]
    fn rotating_near_the_floor_drops_the_cell_driven_past_the_edge() {
        let dir = tempfile::tempdir().unwrap();
        let mut state = scripted(&config_in(&dir, 10, 20), &[ShapeKind::I]);
        // The horizontal bar sits one command above the floor. Rotating
        // succeeds (the vertical form fits), but the forced descent then
        // pushes its lowest cell one row below the board before the lock
        // check fires; place drops that cell instead of writing past the
        // edge.
        state.piece.y = 16;

        state.step(Command::Rotate);
        assert_eq!(state.score, 1);
        for y in 17..20 {
            assert_eq!(state.board.cell(5, y), Some(Cell::Filled(ShapeKind::I)));
        }
        let filled = (0..20)
            .flat_map(|y| (0..10).map(move |x| (x, y)))
            .filter(|&(x, y)| state.board.cell(x, y) != Some(Cell::Empty))
            .count();
        assert_eq!(filled, 3, "the below-floor cell is dropped");
        assert!(!state.game_over);
    }

    #[test]
    fn locking_scores_one_point_even_for_a_double_clear() {
        let dir = tempfile::tempdir().unwrap();
        let mut state = scripted(&config_in(&dir, 10, 20), &[ShapeKind::O]);
        // Rows 18 and 19 complete except the two columns the O will fill.
        for y in [18, 19] {
            for x in 0..10 {
                if x != 4 && x != 5 {
                    state.board.rows[y][x] = Cell::Filled(ShapeKind::J);
                }
            }
        }

        state.step(Command::HardDrop);
        assert_eq!(state.score, 1, "flat increment regardless of lines");
        assert_eq!(state.lines_cleared, 2);
        for y in [18, 19] {
            assert!(state.board.rows[y].iter().all(|c| c.is_empty()), "row {y}");
        }
    }

    #[test]
    fn high_score_is_persisted_exactly_when_it_increases() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_in(&dir, 10, 20);
        let store = HighScoreStore::new(config.score_file.clone());
        store.save(2).unwrap();

        let mut state = scripted(&config, &[ShapeKind::O]);
        assert_eq!(state.high_score, 2, "loaded at session start");

        state.step(Command::HardDrop);
        state.step(Command::HardDrop);
        assert_eq!(state.score, 2);
        assert_eq!(state.high_score, 2);
        assert_eq!(store.load(), 2, "no write until the record is beaten");

        state.step(Command::HardDrop);
        assert_eq!(state.score, 3);
        assert_eq!(state.high_score, 3);
        assert_eq!(store.load(), 3, "written immediately on improvement");
        assert!(state.save_error.is_none());
    }

    #[test]
    fn stacking_to_the_top_ends_the_game() {
        let dir = tempfile::tempdir().unwrap();
        let mut state = scripted(&config_in(&dir, 10, 20), &[ShapeKind::O]);
        for _ in 0..10 {
            state.step(Command::HardDrop);
        }
        assert!(state.game_over);
        assert_eq!(state.score, 10);

        // A finished session ignores further commands.
        state.step(Command::HardDrop);
        assert_eq!(state.score, 10);
    }

    #[test]
    fn filling_a_row_with_positioned_drops_clears_it() {
        let dir = tempfile::tempdir().unwrap();
        // 8-wide board: two line pieces tile the bottom row exactly.
        let mut state = scripted(&config_in(&dir, 8, 20), &[ShapeKind::I]);

        state.step(Command::MoveLeft);
        state.step(Command::MoveLeft);
        assert_eq!(state.piece.x, 0);
        state.step(Command::HardDrop);
        assert_eq!(state.score, 1);
        assert_eq!(state.lines_cleared, 0);
        assert_eq!(state.board.cell(0, 19), Some(Cell::Filled(ShapeKind::I)));

        state.step(Command::MoveRight);
        state.step(Command::MoveRight);
        assert_eq!(state.piece.x, 4);
        state.step(Command::HardDrop);

        assert_eq!(state.score, 2);
        assert_eq!(state.lines_cleared, 1);
        for y in 0..state.board.height() {
            assert!(
                state.board.rows[y].iter().all(|c| c.is_empty()),
                "row {y} should be empty after the clear",
            );
        }
        assert!(!state.game_over);
    }
}
