use serde::{Deserialize, Serialize};

/// Player-visible mark stored for every board cell.
///
/// `Mine` and `Detonated` only appear after a lost game, when the engine
/// exposes the full mine layout for the end-of-game display.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum CellMark {
    Hidden,
    Flagged,
    Revealed(u8),
    Mine,
    Detonated,
}

impl CellMark {
    pub const fn is_revealed(self) -> bool {
        matches!(self, Self::Revealed(_) | Self::Mine | Self::Detonated)
    }
}

impl Default for CellMark {
    fn default() -> Self {
        Self::Hidden
    }
}

/// Flat read-only view of one cell, as handed to the presentation layer.
///
/// `is_mine` is reported truthfully only once the game has ended; while a
/// game is live every snapshot claims `false` so that change notifications
/// stay safe to show.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CellSnapshot {
    pub is_mine: bool,
    pub is_revealed: bool,
    pub is_flagged: bool,
    pub neighbor_mines: u8,
}
