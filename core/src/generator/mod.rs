use crate::*;
pub use random::*;

mod random;

/// Strategy seam for producing a mine layout once the first reveal is known.
///
/// `safe_pos` is the first-revealed cell; implementations must never place a
/// mine there, and should keep its whole neighborhood clear when the board
/// has room for it.
pub trait MineGenerator {
    fn generate(self, config: GameConfig, safe_pos: GridPos) -> MineLayout;
}
