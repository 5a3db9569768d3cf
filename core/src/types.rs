use ndarray::Array2;

/// Single board axis, large enough for any supported board edge.
pub type Coord = u8;

/// Count type for mines, flags, and total-cell counts.
pub type CellCount = u16;

/// Board position as `(row, col)`.
pub type GridPos = (Coord, Coord);

/// Conversion from a board position to an `ndarray` index.
pub trait AsBoardIndex {
    type Output;
    fn board_index(self) -> Self::Output;
}

impl AsBoardIndex for GridPos {
    type Output = [usize; 2];

    fn board_index(self) -> Self::Output {
        [self.0.into(), self.1.into()]
    }
}

/// Saturating `rows * cols` in the count domain.
pub const fn cell_count(rows: Coord, cols: Coord) -> CellCount {
    let rows = rows as CellCount;
    let cols = cols as CellCount;
    rows.saturating_mul(cols)
}

const MOORE_OFFSETS: [(i8, i8); 8] = [
    (-1, -1),
    (-1, 0),
    (-1, 1),
    (0, -1),
    (0, 1),
    (1, -1),
    (1, 0),
    (1, 1),
];

/// Offsets `pos` by `delta`, returning the neighbor only while it stays on the board.
fn offset_pos(pos: GridPos, delta: (i8, i8), bounds: GridPos) -> Option<GridPos> {
    let (row, col) = pos;
    let (d_row, d_col) = delta;
    let (rows, cols) = bounds;

    let next_row = row.checked_add_signed(d_row)?;
    if next_row >= rows {
        return None;
    }

    let next_col = col.checked_add_signed(d_col)?;
    if next_col >= cols {
        return None;
    }

    Some((next_row, next_col))
}

/// Iterator over the in-bounds Moore neighborhood of a position.
#[derive(Debug)]
pub struct MooreNeighbors {
    center: GridPos,
    bounds: GridPos,
    next_offset: u8,
}

impl MooreNeighbors {
    pub fn new(center: GridPos, bounds: GridPos) -> Self {
        Self {
            center,
            bounds,
            next_offset: 0,
        }
    }
}

impl Iterator for MooreNeighbors {
    type Item = GridPos;

    fn next(&mut self) -> Option<Self::Item> {
        while usize::from(self.next_offset) < MOORE_OFFSETS.len() {
            let delta = MOORE_OFFSETS[usize::from(self.next_offset)];
            self.next_offset += 1;

            if let Some(neighbor) = offset_pos(self.center, delta, self.bounds) {
                return Some(neighbor);
            }
        }
        None
    }
}

pub trait NeighborsExt {
    fn neighbors(&self, pos: GridPos) -> MooreNeighbors;
}

impl<T> NeighborsExt for Array2<T> {
    fn neighbors(&self, pos: GridPos) -> MooreNeighbors {
        let dim = self.dim();
        let bounds = (
            dim.0.try_into().expect("board rows fit in Coord"),
            dim.1.try_into().expect("board cols fit in Coord"),
        );
        MooreNeighbors::new(pos, bounds)
    }
}
