use alloc::vec::Vec;
use serde::{Deserialize, Serialize};

use crate::{CellSnapshot, GameStatus, GridPos};

/// One cell whose visible attributes changed.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CellChange {
    pub pos: GridPos,
    pub cell: CellSnapshot,
}

/// Everything the presentation layer needs to redraw after one engine call.
///
/// `cells` is ordered by when each cell changed. `mines` lists every mined
/// position, and is only populated when the set describes a lost game, so a
/// renderer can drive its reveal-all display without re-querying the engine.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeSet {
    pub cells: Vec<CellChange>,
    pub status: GameStatus,
    pub triggered_mine: Option<GridPos>,
    pub mines: Vec<GridPos>,
}

impl ChangeSet {
    /// A set describing no change at all, as returned for ignored input.
    pub fn unchanged(status: GameStatus) -> Self {
        Self {
            cells: Vec::new(),
            status,
            triggered_mine: None,
            mines: Vec::new(),
        }
    }

    pub(crate) fn push(&mut self, pos: GridPos, cell: CellSnapshot) {
        self.cells.push(CellChange { pos, cell });
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty() && self.mines.is_empty() && self.triggered_mine.is_none()
    }
}
