#![no_std]

extern crate alloc;

use core::ops::Index;
use ndarray::Array2;
use serde::{Deserialize, Serialize};

pub use cell::*;
pub use changes::*;
pub use engine::*;
pub use error::*;
pub use generator::*;
pub use types::*;

mod cell;
mod changes;
mod engine;
mod error;
mod generator;
mod types;

/// Named board presets plus free-form configurations.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Difficulty {
    /// 9x9 board with 10 mines.
    Beginner,
    /// 16x16 board with 40 mines.
    Intermediate,
    /// 16x30 board with 99 mines.
    Expert,
    Custom(GameConfig),
}

impl Difficulty {
    pub const fn config(self) -> GameConfig {
        match self {
            Self::Beginner => GameConfig::new(9, 9, 10),
            Self::Intermediate => GameConfig::new(16, 16, 40),
            Self::Expert => GameConfig::new(16, 30, 99),
            Self::Custom(config) => config,
        }
    }
}

/// Board dimensions and mine count for one game.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GameConfig {
    pub rows: Coord,
    pub cols: Coord,
    pub mines: CellCount,
}

impl GameConfig {
    pub const fn new(rows: Coord, cols: Coord, mines: CellCount) -> Self {
        Self { rows, cols, mines }
    }

    pub const fn size(&self) -> GridPos {
        (self.rows, self.cols)
    }

    pub const fn total_cells(&self) -> CellCount {
        cell_count(self.rows, self.cols)
    }

    /// Highest mine count this board accepts, exclusive bound.
    ///
    /// Boards larger than one safe zone must leave a full 3x3 neighborhood
    /// free for the first reveal; boards of at most 9 cells only reserve the
    /// clicked cell itself.
    pub const fn mine_limit(&self) -> CellCount {
        let total = self.total_cells();
        if total > 9 { total - 9 } else { total }
    }

    pub const fn validate(&self) -> Result<()> {
        if self.rows == 0 || self.cols == 0 || self.mines >= self.mine_limit() {
            Err(GameError::InvalidConfig {
                rows: self.rows,
                cols: self.cols,
                mines: self.mines,
            })
        } else {
            Ok(())
        }
    }
}

/// Placed mines for one game: a boolean mask plus the mine total.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MineLayout {
    mask: Array2<bool>,
    mine_count: CellCount,
}

impl MineLayout {
    pub fn from_mask(mask: Array2<bool>) -> Self {
        let mine_count = mask
            .iter()
            .filter(|&&mined| mined)
            .count()
            .try_into()
            .expect("mine count fits in CellCount");
        Self { mask, mine_count }
    }

    pub fn from_mine_coords(size: GridPos, mines: &[GridPos]) -> Result<Self> {
        let mut mask: Array2<bool> = Array2::default(size.board_index());

        for &pos in mines {
            if pos.0 >= size.0 || pos.1 >= size.1 {
                return Err(GameError::OutOfBounds);
            }
            mask[pos.board_index()] = true;
        }

        Ok(Self::from_mask(mask))
    }

    pub fn size(&self) -> GridPos {
        let dim = self.mask.dim();
        (
            dim.0.try_into().expect("board rows fit in Coord"),
            dim.1.try_into().expect("board cols fit in Coord"),
        )
    }

    pub fn total_cells(&self) -> CellCount {
        self.mask.len().try_into().expect("board fits in CellCount")
    }

    pub fn safe_cell_count(&self) -> CellCount {
        self.total_cells() - self.mine_count
    }

    pub fn mine_count(&self) -> CellCount {
        self.mine_count
    }

    pub fn contains_mine(&self, pos: GridPos) -> bool {
        self[pos]
    }

    pub fn adjacent_mine_count(&self, pos: GridPos) -> u8 {
        self.mask
            .neighbors(pos)
            .filter(|&neighbor| self[neighbor])
            .count()
            .try_into()
            .expect("at most 8 neighbors")
    }

    /// Mine positions in row-major order.
    pub fn iter_mines(&self) -> impl Iterator<Item = GridPos> + '_ {
        let (rows, cols) = self.size();
        (0..rows)
            .flat_map(move |row| (0..cols).map(move |col| (row, col)))
            .filter(|&pos| self[pos])
    }
}

impl Index<GridPos> for MineLayout {
    type Output = bool;

    fn index(&self, pos: GridPos) -> &Self::Output {
        &self.mask[pos.board_index()]
    }
}
