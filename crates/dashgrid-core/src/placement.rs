//! First-fit placement of new widgets on the grid.

use crate::layout::LayoutItem;
use thiserror::Error;

/// Placement precondition failures. These are caller bugs: the size must be
/// checked against the grid before asking for a slot.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlacementError {
    #[error("Widget width {w} exceeds the {columns}-column grid")]
    TooWide { w: u32, columns: u32 },
    #[error("Widget size {w}x{h} is empty")]
    EmptySize { w: u32, h: u32 },
}

/// A cell coordinate on the grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GridPosition {
    pub x: u32,
    pub y: u32,
}

/// A rectangle of grid cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GridRect {
    pub x: u32,
    pub y: u32,
    pub w: u32,
    pub h: u32,
}

impl GridRect {
    pub const fn new(x: u32, y: u32, w: u32, h: u32) -> Self {
        Self { x, y, w, h }
    }

    /// Axis-aligned intersection. Touching edges do not intersect.
    pub fn intersects(&self, other: &GridRect) -> bool {
        let (x, y) = (u64::from(self.x), u64::from(self.y));
        let (ox, oy) = (u64::from(other.x), u64::from(other.y));
        x < ox + u64::from(other.w)
            && x + u64::from(self.w) > ox
            && y < oy + u64::from(other.h)
            && y + u64::from(self.h) > oy
    }
}

/// Find the topmost, leftmost slot where a `w`x`h` widget fits without
/// overlapping `existing`.
///
/// Rows are scanned from 0 to the bottom of the existing content inclusive,
/// columns left to right. If every candidate collides, the widget goes to
/// column 0 on the first row below all content. The result depends only on
/// the arguments.
pub fn find_placement(
    existing: &[LayoutItem],
    w: u32,
    h: u32,
    columns: u32,
) -> Result<GridPosition, PlacementError> {
    if w == 0 || h == 0 {
        return Err(PlacementError::EmptySize { w, h });
    }
    if w > columns {
        return Err(PlacementError::TooWide { w, columns });
    }

    let max_y = existing.iter().map(LayoutItem::bottom).max().unwrap_or(0);

    match scan(existing, w, h, columns, max_y) {
        Some(position) => Ok(position),
        None => {
            log::debug!("No free {}x{} slot above row {}, appending below", w, h, max_y);
            Ok(GridPosition { x: 0, y: max_y })
        }
    }
}

/// Row-major first-fit scan. `None` means every candidate collided.
///
/// The topmost free row is always row 0 or the bottom edge of some item, so
/// only those rows are tried. This gives the same answer as walking every row
/// while staying proportional to the item count when stored coordinates are
/// huge.
fn scan(existing: &[LayoutItem], w: u32, h: u32, columns: u32, max_y: u32) -> Option<GridPosition> {
    let mut rows: Vec<u32> = existing
        .iter()
        .map(LayoutItem::bottom)
        .filter(|&row| row <= max_y)
        .collect();
    rows.push(0);
    rows.sort_unstable();
    rows.dedup();

    for row in rows {
        for col in 0..=columns - w {
            let candidate = GridRect::new(col, row, w, h);
            if !existing.iter().any(|item| candidate.intersects(&item.rect())) {
                return Some(GridPosition { x: col, y: row });
            }
        }
    }
    None
}
