use super::*;

/// Uniform rejection-sampling generator that keeps a safe zone around the
/// first-revealed cell.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct RejectionMineGenerator {
    seed: u64,
}

impl RejectionMineGenerator {
    pub const fn new(seed: u64) -> Self {
        Self { seed }
    }
}

/// Exclusion applied around the first reveal while sampling.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum SafeZone {
    /// Full clipped 3x3 neighborhood.
    Neighborhood,
    /// Only the revealed cell itself, for boards too small for a zone.
    SingleCell,
}

impl SafeZone {
    fn excludes(self, pos: GridPos, safe_pos: GridPos) -> bool {
        match self {
            Self::SingleCell => pos == safe_pos,
            Self::Neighborhood => {
                pos.0.abs_diff(safe_pos.0) <= 1 && pos.1.abs_diff(safe_pos.1) <= 1
            }
        }
    }

    fn cell_span(self, config: GameConfig, safe_pos: GridPos) -> CellCount {
        match self {
            Self::SingleCell => 1,
            Self::Neighborhood => {
                let row_span = clipped_span(safe_pos.0, config.rows);
                let col_span = clipped_span(safe_pos.1, config.cols);
                CellCount::from(row_span) * CellCount::from(col_span)
            }
        }
    }
}

/// Width of the 3-cell window centered on `axis`, clipped at the board edge.
fn clipped_span(axis: Coord, limit: Coord) -> u8 {
    let lo = axis.saturating_sub(1);
    let hi = if axis + 1 >= limit { limit - 1 } else { axis + 1 };
    hi - lo + 1
}

impl MineGenerator for RejectionMineGenerator {
    fn generate(self, config: GameConfig, safe_pos: GridPos) -> MineLayout {
        use ndarray::Array2;
        use rand::prelude::*;

        let total = config.total_cells();

        let zone = if total > 9 {
            SafeZone::Neighborhood
        } else {
            log::warn!(
                "board of {} cells cannot fit a safe neighborhood, only excluding {:?}",
                total,
                safe_pos
            );
            SafeZone::SingleCell
        };

        let candidates = total - zone.cell_span(config, safe_pos);
        let mut requested = config.mines;
        if requested > candidates {
            log::warn!(
                "requested {} mines but only {} candidate cells, clamping",
                requested,
                candidates
            );
            requested = candidates;
        }

        let mut mask: Array2<bool> = Array2::default(config.size().board_index());
        let mut placed = 0;
        let mut rng = SmallRng::seed_from_u64(self.seed);

        while placed < requested {
            let pos: GridPos = (
                rng.random_range(0..config.rows),
                rng.random_range(0..config.cols),
            );

            if zone.excludes(pos, safe_pos) || mask[pos.board_index()] {
                continue;
            }

            mask[pos.board_index()] = true;
            placed += 1;
        }

        let layout = MineLayout::from_mask(mask);
        if layout.mine_count() != config.mines {
            log::warn!(
                "placed {} mines, configuration asked for {}",
                layout.mine_count(),
                config.mines
            );
        }
        layout
    }
}
