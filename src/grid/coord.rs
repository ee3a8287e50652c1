use std::fmt;

/// Address of an interactive control in the grid.
///
/// `row` and `col` index the visual table. `slot` picks a sub-control inside a
/// composite cell; plain cells only ever use slot 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CellCoord {
    pub row: usize,
    pub col: usize,
    pub slot: usize,
}

impl CellCoord {
    pub const fn new(row: usize, col: usize) -> Self {
        CellCoord { row, col, slot: 0 }
    }

    pub const fn with_slot(row: usize, col: usize, slot: usize) -> Self {
        CellCoord { row, col, slot }
    }

    /// The primary control of the visual cell this coordinate lives in
    pub const fn primary(self) -> Self {
        CellCoord {
            slot: 0,
            ..self
        }
    }

    pub const fn is_primary(self) -> bool {
        self.slot == 0
    }

    /// True when both coordinates address the same visual cell (slot ignored)
    pub fn same_cell(self, other: CellCoord) -> bool {
        self.row == other.row && self.col == other.col
    }
}

impl fmt::Display for CellCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.slot == 0 {
            write!(f, "r{}c{}", self.row, self.col)
        } else {
            write!(f, "r{}c{}.{}", self.row, self.col, self.slot)
        }
    }
}

/// Current grid size, supplied by the host on every navigation call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridDims {
    pub rows: usize,
    pub cols: usize,
}

/// Direction for focus movement and dropdown highlight stepping
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}
