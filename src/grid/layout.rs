use std::ops::Range;

use ratatui::layout::Rect;

use super::column::ColumnSpec;
use super::coord::CellCoord;

/// Narrowest a flexible column is allowed to get
const MIN_FLEX_WIDTH: u16 = 8;

/// Horizontal extent of one column and of its sub-slots
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnGeom {
    pub x: u16,
    pub width: u16,
    /// `(x, width)` per slot; a single entry for plain cells
    pub slots: Vec<(u16, u16)>,
}

/// Screen geometry of the grid for one frame: header row, then data rows
/// starting at the scroll offset. Used for drawing and mouse hit-testing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GridLayout {
    pub area: Rect,
    pub columns: Vec<ColumnGeom>,
    pub scroll: usize,
    pub row_count: usize,
}

impl GridLayout {
    pub fn compute(area: Rect, specs: &[ColumnSpec], row_count: usize, scroll: usize) -> Self {
        let gaps = specs.len().saturating_sub(1) as u16;
        let fixed: u16 = specs.iter().map(|c| c.width).sum();
        let flex_count = specs.iter().filter(|c| c.is_flexible()).count() as u16;
        let spare = area.width.saturating_sub(fixed + gaps);
        let flex_width = if flex_count == 0 {
            0
        } else {
            (spare / flex_count).max(MIN_FLEX_WIDTH)
        };

        let right = area.x + area.width;
        let mut x = area.x;
        let mut columns = Vec::with_capacity(specs.len());
        for spec in specs {
            let wanted = if spec.is_flexible() { flex_width } else { spec.width };
            let width = wanted.min(right.saturating_sub(x));
            columns.push(ColumnGeom {
                x,
                width,
                slots: split_slots(x, width, spec.cell.slot_count()),
            });
            x = (x + width + 1).min(right);
        }

        GridLayout {
            area,
            columns,
            scroll,
            row_count,
        }
    }

    pub fn header_y(&self) -> u16 {
        self.area.y
    }

    /// Number of data rows that fit below the header
    pub fn body_height(&self) -> usize {
        self.area.height.saturating_sub(1) as usize
    }

    /// Data rows currently on screen
    pub fn visible_rows(&self) -> Range<usize> {
        let start = self.scroll.min(self.row_count);
        let end = (self.scroll + self.body_height()).min(self.row_count);
        start..end
    }

    fn row_y(&self, row: usize) -> Option<u16> {
        if !self.visible_rows().contains(&row) {
            return None;
        }
        Some(self.area.y + 1 + (row - self.scroll) as u16)
    }

    /// Whole visual cell (all slots) of `coord`
    pub fn cell_rect(&self, coord: CellCoord) -> Option<Rect> {
        let y = self.row_y(coord.row)?;
        let col = self.columns.get(coord.col)?;
        Some(Rect::new(col.x, y, col.width, 1))
    }

    /// Exact slot area of `coord`
    pub fn slot_rect(&self, coord: CellCoord) -> Option<Rect> {
        let y = self.row_y(coord.row)?;
        let col = self.columns.get(coord.col)?;
        let &(x, width) = col.slots.get(coord.slot)?;
        Some(Rect::new(x, y, width, 1))
    }

    /// Map a terminal position to the control under it
    pub fn hit_test(&self, x: u16, y: u16) -> Option<CellCoord> {
        if y <= self.area.y || y >= self.area.y + self.area.height {
            return None;
        }
        let row = self.scroll + (y - self.area.y - 1) as usize;
        if row >= self.row_count {
            return None;
        }
        let (col, geom) = self
            .columns
            .iter()
            .enumerate()
            .find(|(_, g)| g.width > 0 && x >= g.x && x < g.x + g.width)?;
        let slot = geom
            .slots
            .iter()
            .rposition(|&(sx, _)| x >= sx)
            .unwrap_or(0);
        Some(CellCoord::with_slot(row, col, slot))
    }
}

/// Split a column between its slots, one separator cell between neighbours
fn split_slots(x: u16, width: u16, count: usize) -> Vec<(u16, u16)> {
    if count <= 1 {
        return vec![(x, width)];
    }
    let count = count as u16;
    let usable = width.saturating_sub(count - 1);
    let each = usable / count;
    let mut slots = Vec::with_capacity(count as usize);
    let mut sx = x;
    for i in 0..count {
        let w = if i == count - 1 {
            (x + width).saturating_sub(sx)
        } else {
            each
        };
        slots.push((sx, w));
        sx = (sx + w + 1).min(x + width);
    }
    slots
}

/// Keep `focused_row` inside a window of `visible` rows starting at `scroll`
pub fn scroll_to_show(scroll: usize, focused_row: usize, visible: usize) -> usize {
    if visible == 0 {
        return scroll;
    }
    if focused_row < scroll {
        focused_row
    } else if focused_row >= scroll + visible {
        focused_row + 1 - visible
    } else {
        scroll
    }
}

/// Place a floating list of `width`x`height` against `trigger`: below it when
/// there is room, above otherwise, and never past the viewport's right edge.
pub fn place_overlay(trigger: Rect, viewport: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(viewport.width);
    let below = trigger.y + trigger.height;
    let room_below = (viewport.y + viewport.height).saturating_sub(below);
    let room_above = trigger.y.saturating_sub(viewport.y);
    let (y, height) = if height <= room_below || room_below >= room_above {
        (below, height.min(room_below))
    } else {
        let h = height.min(room_above);
        (trigger.y - h, h)
    };
    let max_x = (viewport.x + viewport.width).saturating_sub(width);
    let x = trigger.x.clamp(viewport.x, max_x.max(viewport.x));
    Rect::new(x, y, width, height)
}
