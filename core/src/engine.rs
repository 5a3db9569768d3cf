use alloc::collections::{BTreeSet, VecDeque};
use alloc::vec::Vec;
use ndarray::Array2;
use serde::{Deserialize, Serialize};

use crate::*;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameStatus {
    NotStarted,
    InProgress,
    Won,
    Lost,
}

impl GameStatus {
    pub const fn is_not_started(self) -> bool {
        matches!(self, Self::NotStarted)
    }

    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Won | Self::Lost)
    }
}

impl Default for GameStatus {
    fn default() -> Self {
        Self::NotStarted
    }
}

/// Read-only counters for the status line: state, clock, flags, mines.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameState {
    pub status: GameStatus,
    pub elapsed_ticks: u32,
    pub flag_count: CellCount,
    pub mine_count: CellCount,
}

/// Owns the board and every game rule.
///
/// Mines are placed lazily on the first reveal of each game, so that reveal
/// can never lose. All calls run to completion synchronously; invalid input
/// (out of bounds, terminal game, flagged or already-revealed target) is
/// answered with an empty [`ChangeSet`] rather than an error.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GameEngine {
    config: GameConfig,
    layout: Option<MineLayout>,
    board: Array2<CellMark>,
    revealed_count: CellCount,
    flag_count: CellCount,
    elapsed_ticks: u32,
    status: GameStatus,
    triggered_mine: Option<GridPos>,
    seed: u64,
}

impl GameEngine {
    /// Starts a fresh engine. `seed` drives mine placement; the caller picks
    /// it (this crate has no entropy source of its own).
    pub fn new(difficulty: Difficulty, seed: u64) -> Result<Self> {
        let config = difficulty.config();
        config.validate()?;
        Ok(Self {
            config,
            layout: None,
            board: Array2::default(config.size().board_index()),
            revealed_count: 0,
            flag_count: 0,
            elapsed_ticks: 0,
            status: GameStatus::NotStarted,
            triggered_mine: None,
            seed,
        })
    }

    /// Builds an engine over an already-placed layout, bypassing generation.
    /// Meant for scripted games and tests.
    pub fn with_layout(layout: MineLayout) -> Self {
        let (rows, cols) = layout.size();
        let config = GameConfig::new(rows, cols, layout.mine_count());
        Self {
            config,
            board: Array2::default(config.size().board_index()),
            layout: Some(layout),
            revealed_count: 0,
            flag_count: 0,
            elapsed_ticks: 0,
            status: GameStatus::NotStarted,
            triggered_mine: None,
            seed: 0,
        }
    }

    /// Discards the current game and starts over, deriving a fresh placement
    /// seed from the previous one.
    pub fn new_game(&mut self, difficulty: Difficulty) -> Result<ChangeSet> {
        let seed = advance_seed(self.seed);
        self.new_game_with_seed(difficulty, seed)
    }

    /// Deterministic restart for callers that manage seeds themselves.
    ///
    /// An invalid configuration is rejected without touching the game in
    /// progress.
    pub fn new_game_with_seed(&mut self, difficulty: Difficulty, seed: u64) -> Result<ChangeSet> {
        let config = difficulty.config();
        config.validate()?;

        self.config = config;
        self.layout = None;
        self.board = Array2::default(config.size().board_index());
        self.revealed_count = 0;
        self.flag_count = 0;
        self.elapsed_ticks = 0;
        self.status = GameStatus::NotStarted;
        self.triggered_mine = None;
        self.seed = seed;

        log::debug!("new {}x{} game, {} mines", config.rows, config.cols, config.mines);

        // Full-board "cleared" notification.
        let mut set = ChangeSet::unchanged(self.status);
        for row in 0..config.rows {
            for col in 0..config.cols {
                set.push((row, col), CellSnapshot::default());
            }
        }
        Ok(set)
    }

    pub fn state(&self) -> GameState {
        GameState {
            status: self.status,
            elapsed_ticks: self.elapsed_ticks,
            flag_count: self.flag_count,
            mine_count: self.config.mines,
        }
    }

    pub fn status(&self) -> GameStatus {
        self.status
    }

    pub fn size(&self) -> GridPos {
        self.config.size()
    }

    pub fn total_mines(&self) -> CellCount {
        self.config.mines
    }

    /// Mines minus flags; goes negative when the player over-flags.
    pub fn mines_left(&self) -> i32 {
        i32::from(self.config.mines) - i32::from(self.flag_count)
    }

    pub fn triggered_mine(&self) -> Option<GridPos> {
        self.triggered_mine
    }

    pub fn cell_mark_at(&self, pos: GridPos) -> CellMark {
        self.board[pos.board_index()]
    }

    /// Presentation view of one cell. Mines are only disclosed once the game
    /// has ended; after a loss every mine reads as revealed, even under a
    /// flag, so the final display can show the whole layout.
    pub fn snapshot_at(&self, pos: GridPos) -> CellSnapshot {
        let mark = self.board[pos.board_index()];
        let is_mine = self.status.is_terminal()
            && self
                .layout
                .as_ref()
                .is_some_and(|layout| layout.contains_mine(pos));
        let lost = matches!(self.status, GameStatus::Lost);
        CellSnapshot {
            is_mine,
            is_revealed: mark.is_revealed() || (lost && is_mine),
            is_flagged: mark == CellMark::Flagged,
            neighbor_mines: match mark {
                CellMark::Revealed(count) => count,
                _ => 0,
            },
        }
    }

    /// Advances the logical clock by one unit. The cadence is owned by the
    /// caller; the engine never reads wall-clock time.
    pub fn tick(&mut self) {
        if matches!(self.status, GameStatus::InProgress) {
            self.elapsed_ticks += 1;
        }
    }

    /// Flips the flag on a hidden cell.
    pub fn toggle_flag(&mut self, pos: GridPos) -> ChangeSet {
        use CellMark::*;

        if self.status.is_terminal() || !self.in_bounds(pos) {
            return ChangeSet::unchanged(self.status);
        }

        match self.board[pos.board_index()] {
            Hidden => {
                self.board[pos.board_index()] = Flagged;
                self.flag_count += 1;
            }
            Flagged => {
                self.board[pos.board_index()] = Hidden;
                self.flag_count -= 1;
            }
            _ => return ChangeSet::unchanged(self.status),
        }

        let mut set = ChangeSet::unchanged(self.status);
        set.push(pos, self.snapshot_at(pos));
        set
    }

    /// Reveals a cell, flood-filling through zero-count regions.
    pub fn reveal(&mut self, pos: GridPos) -> ChangeSet {
        if self.status.is_terminal() || !self.in_bounds(pos) {
            return ChangeSet::unchanged(self.status);
        }
        if !matches!(self.board[pos.board_index()], CellMark::Hidden) {
            return ChangeSet::unchanged(self.status);
        }

        if self.layout.is_none() {
            let layout = RejectionMineGenerator::new(self.seed).generate(self.config, pos);
            self.layout = Some(layout);
        }
        self.mark_started();

        if self.has_mine(pos) {
            self.lose_at(pos)
        } else {
            self.reveal_safe(pos)
        }
    }

    /// Losing reveal: expose every mine for the final display.
    fn lose_at(&mut self, pos: GridPos) -> ChangeSet {
        self.board[pos.board_index()] = CellMark::Detonated;
        self.triggered_mine = Some(pos);
        self.status = GameStatus::Lost;
        log::debug!("mine hit at {:?}", pos);

        let mines: Vec<GridPos> = self
            .layout
            .as_ref()
            .map(|layout| layout.iter_mines().collect())
            .unwrap_or_default();

        let mut set = ChangeSet::unchanged(self.status);
        set.triggered_mine = Some(pos);
        for &mine_pos in &mines {
            // Flagged mines keep their flag mark; their snapshot still reads
            // as revealed now that the game is lost.
            if matches!(self.board[mine_pos.board_index()], CellMark::Hidden) {
                self.board[mine_pos.board_index()] = CellMark::Mine;
            }
            set.push(mine_pos, self.snapshot_at(mine_pos));
        }
        set.mines = mines;
        set
    }

    /// Safe reveal with an explicit work queue instead of recursion, so large
    /// boards cannot exhaust the stack. Traversal order does not affect which
    /// cells end up revealed.
    fn reveal_safe(&mut self, pos: GridPos) -> ChangeSet {
        let mut changed: Vec<GridPos> = Vec::new();

        let first_count = self.adjacent_mines(pos);
        self.board[pos.board_index()] = CellMark::Revealed(first_count);
        self.revealed_count += 1;
        changed.push(pos);

        if first_count == 0 {
            let mut visited = BTreeSet::from([pos]);
            let mut to_visit: VecDeque<GridPos> = self
                .board
                .neighbors(pos)
                .filter(|&neighbor| {
                    matches!(self.board[neighbor.board_index()], CellMark::Hidden)
                })
                .collect();

            while let Some(visit_pos) = to_visit.pop_front() {
                if !visited.insert(visit_pos) {
                    continue;
                }

                // Flagged cells stop the cascade, as does anything already open.
                if !matches!(self.board[visit_pos.board_index()], CellMark::Hidden) {
                    continue;
                }

                let count = self.adjacent_mines(visit_pos);
                self.board[visit_pos.board_index()] = CellMark::Revealed(count);
                self.revealed_count += 1;
                changed.push(visit_pos);
                log::trace!("flood revealed {:?}, {} adjacent mines", visit_pos, count);

                if count == 0 {
                    to_visit.extend(
                        self.board
                            .neighbors(visit_pos)
                            .filter(|&neighbor| {
                                matches!(self.board[neighbor.board_index()], CellMark::Hidden)
                            })
                            .filter(|neighbor| !visited.contains(neighbor)),
                    );
                }
            }
        }

        if self.revealed_count == self.safe_cell_count() {
            self.status = GameStatus::Won;
            log::debug!("board cleared after {} ticks", self.elapsed_ticks);
        }

        let mut set = ChangeSet::unchanged(self.status);
        for &changed_pos in &changed {
            set.push(changed_pos, self.snapshot_at(changed_pos));
        }
        set
    }

    fn mark_started(&mut self) {
        if self.status.is_not_started() {
            self.status = GameStatus::InProgress;
            log::debug!("first reveal, game in progress");
        }
    }

    fn in_bounds(&self, pos: GridPos) -> bool {
        pos.0 < self.config.rows && pos.1 < self.config.cols
    }

    fn has_mine(&self, pos: GridPos) -> bool {
        self.layout
            .as_ref()
            .is_some_and(|layout| layout.contains_mine(pos))
    }

    fn adjacent_mines(&self, pos: GridPos) -> u8 {
        self.layout
            .as_ref()
            .map_or(0, |layout| layout.adjacent_mine_count(pos))
    }

    fn safe_cell_count(&self) -> CellCount {
        self.layout
            .as_ref()
            .map_or_else(|| self.config.total_cells(), MineLayout::safe_cell_count)
    }
}

const fn advance_seed(seed: u64) -> u64 {
    seed.wrapping_mul(0x5851_F42D_4C95_7F2D)
        .wrapping_add(0x1405_7B7E_F767_814F)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scripted(size: GridPos, mines: &[GridPos]) -> GameEngine {
        GameEngine::with_layout(MineLayout::from_mine_coords(size, mines).unwrap())
    }

    #[test]
    fn new_game_has_no_mines_and_not_started() {
        let engine = GameEngine::new(Difficulty::Beginner, 1).unwrap();

        let state = engine.state();
        assert_eq!(state.status, GameStatus::NotStarted);
        assert_eq!(state.mine_count, 10);
        assert_eq!(state.flag_count, 0);
        assert_eq!(state.elapsed_ticks, 0);
        assert_eq!(engine.size(), (9, 9));
        for row in 0..9 {
            for col in 0..9 {
                assert_eq!(engine.cell_mark_at((row, col)), CellMark::Hidden);
            }
        }
    }

    #[test]
    fn invalid_configs_are_rejected() {
        assert!(GameEngine::new(Difficulty::Custom(GameConfig::new(0, 5, 1)), 0).is_err());
        assert!(GameEngine::new(Difficulty::Custom(GameConfig::new(9, 9, 72)), 0).is_err());
    }

    #[test]
    fn first_reveal_places_mines_outside_the_safe_zone() {
        // 9x9, 10 mines, first reveal dead center: rows 3-5 x cols 3-5 clean.
        for seed in 0..16 {
            let mut engine = GameEngine::new(Difficulty::Beginner, seed).unwrap();
            let set = engine.reveal((4, 4));

            assert_ne!(set.status, GameStatus::Lost);
            assert!(matches!(
                set.status,
                GameStatus::InProgress | GameStatus::Won
            ));

            let layout = engine.layout.as_ref().unwrap();
            assert_eq!(layout.mine_count(), 10, "seed {}", seed);
            for row in 3..=5 {
                for col in 3..=5 {
                    assert!(!layout.contains_mine((row, col)), "seed {}", seed);
                }
            }
            // Mines stay undisclosed while the game is live.
            for row in 0..9 {
                for col in 0..9 {
                    assert!(!engine.snapshot_at((row, col)).is_mine);
                }
            }
        }
    }

    #[test]
    fn first_reveal_is_never_a_loss_even_on_tiny_boards() {
        for seed in 0..64 {
            let config = GameConfig::new(2, 2, 3);
            let mut engine = GameEngine::new(Difficulty::Custom(config), seed).unwrap();
            let set = engine.reveal((0, 0));
            assert_ne!(set.status, GameStatus::Lost, "seed {}", seed);
        }
    }

    #[test]
    fn zero_mine_board_wins_on_first_reveal() {
        let config = GameConfig::new(2, 2, 0);
        let mut engine = GameEngine::new(Difficulty::Custom(config), 5).unwrap();

        let set = engine.reveal((0, 0));

        assert_eq!(set.status, GameStatus::Won);
        assert_eq!(set.cells.len(), 4);
        assert_eq!(engine.status(), GameStatus::Won);
        for row in 0..2 {
            for col in 0..2 {
                assert_eq!(engine.cell_mark_at((row, col)), CellMark::Revealed(0));
            }
        }
    }

    #[test]
    fn numbered_reveal_does_not_cascade() {
        let mut engine = scripted((3, 3), &[(0, 0)]);

        let set = engine.reveal((1, 1));

        assert_eq!(set.status, GameStatus::InProgress);
        assert_eq!(set.cells.len(), 1);
        assert_eq!(set.cells[0].pos, (1, 1));
        assert_eq!(engine.cell_mark_at((1, 1)), CellMark::Revealed(1));
        assert_eq!(engine.cell_mark_at((0, 1)), CellMark::Hidden);
    }

    #[test]
    fn flood_fill_reveals_exactly_the_zero_closure() {
        // A wall of mines down column 2 splits the board; revealing in the
        // left half must never leak into the right half.
        let wall = &[(0, 2), (1, 2), (2, 2), (3, 2), (4, 2)];
        let mut engine = scripted((5, 5), wall);

        let set = engine.reveal((0, 0));

        assert_eq!(set.status, GameStatus::InProgress);
        assert_eq!(set.cells.len(), 10);
        for change in &set.cells {
            assert!(change.pos.1 < 2);
        }
        for row in 0..5 {
            assert_eq!(engine.cell_mark_at((row, 0)), CellMark::Revealed(0));
            assert!(matches!(
                engine.cell_mark_at((row, 1)),
                CellMark::Revealed(count) if count > 0
            ));
            assert_eq!(engine.cell_mark_at((row, 3)), CellMark::Hidden);
        }
    }

    #[test]
    fn flags_stop_the_cascade() {
        let mut engine = scripted((1, 5), &[]);

        engine.toggle_flag((0, 2));
        let set = engine.reveal((0, 0));

        assert_eq!(engine.cell_mark_at((0, 1)), CellMark::Revealed(0));
        assert_eq!(engine.cell_mark_at((0, 2)), CellMark::Flagged);
        assert_eq!(engine.cell_mark_at((0, 3)), CellMark::Hidden);
        assert_eq!(set.status, GameStatus::InProgress);
    }

    #[test]
    fn revealing_a_mine_loses_and_exposes_every_mine() {
        let mut engine = scripted((3, 3), &[(0, 0), (2, 2)]);

        engine.reveal((1, 1));
        let set = engine.reveal((2, 2));

        assert_eq!(set.status, GameStatus::Lost);
        assert_eq!(set.triggered_mine, Some((2, 2)));
        assert_eq!(set.mines, alloc::vec![(0, 0), (2, 2)]);
        assert_eq!(engine.cell_mark_at((2, 2)), CellMark::Detonated);
        assert_eq!(engine.cell_mark_at((0, 0)), CellMark::Mine);
        assert!(engine.snapshot_at((0, 0)).is_mine);
        assert!(engine.snapshot_at((0, 0)).is_revealed);
    }

    #[test]
    fn flagged_mines_keep_their_flag_on_loss() {
        let mut engine = scripted((2, 2), &[(0, 0), (1, 1)]);

        engine.toggle_flag((0, 0));
        let set = engine.reveal((1, 1));

        assert_eq!(set.status, GameStatus::Lost);
        assert_eq!(engine.cell_mark_at((0, 0)), CellMark::Flagged);
        assert_eq!(engine.state().flag_count, 1);

        let flagged_mine = engine.snapshot_at((0, 0));
        assert!(flagged_mine.is_flagged);
        assert!(flagged_mine.is_mine);
        assert!(flagged_mine.is_revealed);
        assert!(set.cells.iter().any(|change| change.pos == (0, 0)));
        assert!(set.mines.contains(&(0, 0)));
    }

    #[test]
    fn terminal_games_ignore_further_input() {
        let mut engine = scripted((2, 2), &[(0, 0)]);
        engine.reveal((0, 0));
        assert_eq!(engine.status(), GameStatus::Lost);

        let before = engine.clone();
        assert!(engine.reveal((1, 1)).is_empty());
        assert!(engine.toggle_flag((1, 1)).is_empty());
        engine.tick();
        assert_eq!(engine, before);
    }

    #[test]
    fn reveal_of_flagged_cell_is_a_no_op() {
        let mut engine = scripted((2, 2), &[(0, 0)]);

        engine.toggle_flag((1, 1));
        let set = engine.reveal((1, 1));

        assert!(set.is_empty());
        assert_eq!(engine.cell_mark_at((1, 1)), CellMark::Flagged);
    }

    #[test]
    fn out_of_bounds_input_is_ignored() {
        let mut engine = scripted((2, 2), &[(0, 0)]);

        assert!(engine.reveal((5, 5)).is_empty());
        assert!(engine.toggle_flag((0, 9)).is_empty());
        assert_eq!(engine.status(), GameStatus::NotStarted);
    }

    #[test]
    fn flag_bookkeeping_tracks_toggles() {
        let mut engine = scripted((2, 2), &[(0, 0)]);

        assert_eq!(engine.mines_left(), 1);
        engine.toggle_flag((0, 1));
        engine.toggle_flag((1, 0));
        assert_eq!(engine.state().flag_count, 2);
        assert_eq!(engine.mines_left(), -1);

        engine.toggle_flag((0, 1));
        assert_eq!(engine.state().flag_count, 1);
        assert_eq!(engine.mines_left(), 0);
    }

    #[test]
    fn flagging_a_revealed_cell_is_a_no_op() {
        let mut engine = scripted((2, 2), &[(0, 0)]);

        engine.reveal((1, 1));
        let set = engine.toggle_flag((1, 1));

        assert!(set.is_empty());
        assert_eq!(engine.state().flag_count, 0);
    }

    #[test]
    fn win_requires_all_safe_cells_revealed() {
        let mut engine = scripted((1, 3), &[(0, 2)]);

        // (0,1) borders the mine, so it reveals alone and cannot win yet.
        assert_eq!(engine.reveal((0, 1)).status, GameStatus::InProgress);
        assert_eq!(engine.reveal((0, 0)).status, GameStatus::Won);
        assert_eq!(engine.cell_mark_at((0, 2)), CellMark::Hidden);
    }

    #[test]
    fn tick_only_counts_while_in_progress() {
        let mut engine = scripted((1, 3), &[(0, 2)]);

        engine.tick();
        assert_eq!(engine.state().elapsed_ticks, 0);

        engine.reveal((0, 1));
        engine.tick();
        engine.tick();
        assert_eq!(engine.state().elapsed_ticks, 2);

        engine.reveal((0, 0));
        assert_eq!(engine.status(), GameStatus::Won);
        engine.tick();
        assert_eq!(engine.state().elapsed_ticks, 2);
    }

    #[test]
    fn new_game_clears_the_whole_board() {
        let mut engine = GameEngine::new(Difficulty::Beginner, 11).unwrap();
        engine.reveal((4, 4));
        engine.toggle_flag((0, 0));
        engine.tick();

        let set = engine
            .new_game(Difficulty::Custom(GameConfig::new(4, 4, 2)))
            .unwrap();

        assert_eq!(set.status, GameStatus::NotStarted);
        assert_eq!(set.cells.len(), 16);
        assert!(set.cells.iter().all(|c| c.cell == CellSnapshot::default()));

        let state = engine.state();
        assert_eq!(state.status, GameStatus::NotStarted);
        assert_eq!(state.flag_count, 0);
        assert_eq!(state.elapsed_ticks, 0);
        assert_eq!(state.mine_count, 2);
    }

    #[test]
    fn rejected_new_game_leaves_the_current_game_alone() {
        let mut engine = GameEngine::new(Difficulty::Beginner, 11).unwrap();
        engine.reveal((4, 4));
        let before = engine.clone();

        let result = engine.new_game(Difficulty::Custom(GameConfig::new(3, 3, 100)));

        assert!(result.is_err());
        assert_eq!(engine, before);
    }

    #[test]
    fn successive_games_use_different_layouts() {
        let mut engine = GameEngine::new(Difficulty::Beginner, 42).unwrap();
        engine.reveal((4, 4));
        let first = engine.clone();

        engine.new_game(Difficulty::Beginner).unwrap();
        engine.reveal((4, 4));

        assert_ne!(engine, first);
    }

    #[test]
    fn state_and_changeset_round_trip_through_serde() {
        let mut engine = scripted((3, 3), &[(0, 0)]);
        let set = engine.reveal((2, 2));

        let state_json = serde_json::to_string(&engine.state()).unwrap();
        let state: GameState = serde_json::from_str(&state_json).unwrap();
        assert_eq!(state, engine.state());

        let set_json = serde_json::to_string(&set).unwrap();
        let parsed: ChangeSet = serde_json::from_str(&set_json).unwrap();
        assert_eq!(parsed, set);
    }
}
