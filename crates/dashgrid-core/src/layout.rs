//! Dashboard layouts and their wire encoding.

use crate::catalog::WidgetCatalog;
use crate::placement::GridRect;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use thiserror::Error;

/// Errors decoding or encoding the layout string.
#[derive(Debug, Error)]
pub enum LayoutCodecError {
    #[error("Malformed layout: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// One placed widget.
///
/// Serialized as `{ "i": widgetId, "x", "y", "w", "h" }`, the shape the grid
/// renderer consumes and emits.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct LayoutItem {
    #[serde(rename = "i")]
    pub widget_id: String,
    pub x: u32,
    pub y: u32,
    pub w: u32,
    pub h: u32,
}

impl LayoutItem {
    pub fn new(widget_id: impl Into<String>, x: u32, y: u32, w: u32, h: u32) -> Self {
        Self {
            widget_id: widget_id.into(),
            x,
            y,
            w,
            h,
        }
    }

    /// The cells covered by this item.
    pub fn rect(&self) -> GridRect {
        GridRect::new(self.x, self.y, self.w, self.h)
    }

    /// Check whether two items cover a common cell.
    pub fn overlaps(&self, other: &LayoutItem) -> bool {
        self.rect().intersects(&other.rect())
    }

    /// Row just below this item. Saturates at `u32::MAX`.
    pub fn bottom(&self) -> u32 {
        self.y.saturating_add(self.h)
    }

    /// Check that the item is non-empty, inside `columns` and above
    /// [`MAX_ROWS`].
    pub fn fits(&self, columns: u32) -> bool {
        self.w > 0
            && self.h > 0
            && self.x.checked_add(self.w).is_some_and(|right| right <= columns)
            && self.y.checked_add(self.h).is_some_and(|bottom| bottom <= MAX_ROWS)
    }
}

/// Rows a layout may occupy. Anything reaching further is corrupt data.
pub const MAX_ROWS: u32 = 10_000;

/// A problem found by [`DashboardLayout::violations`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LayoutViolation {
    Overlap(String, String),
    DuplicateWidget(String),
    OutOfBounds(String),
    IllegalSize(String),
    UnknownWidget(String),
}

/// An ordered set of placed widgets belonging to one user.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DashboardLayout {
    items: Vec<LayoutItem>,
}

impl DashboardLayout {
    /// Create an empty layout.
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap an item list as-is. No invariants are checked.
    pub fn from_items(items: Vec<LayoutItem>) -> Self {
        Self { items }
    }

    /// The arrangement shown to users with nothing saved.
    ///
    /// Laid out for the default five-column grid.
    pub fn default_arrangement() -> Self {
        Self::from_items(vec![
            LayoutItem::new("events", 0, 0, 2, 2),
            LayoutItem::new("membership-fees", 2, 0, 2, 2),
            LayoutItem::new("users-stats", 4, 0, 1, 1),
            LayoutItem::new("prayer-times", 4, 1, 1, 2),
            LayoutItem::new("tasks", 0, 2, 1, 2),
            LayoutItem::new("activity", 1, 2, 1, 3),
            LayoutItem::new("messages", 2, 2, 1, 2),
            LayoutItem::new("shop", 3, 3, 2, 2),
        ])
    }

    pub fn items(&self) -> &[LayoutItem] {
        &self.items
    }

    pub fn into_items(self) -> Vec<LayoutItem> {
        self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Check whether a widget is placed.
    pub fn contains(&self, widget_id: &str) -> bool {
        self.items.iter().any(|item| item.widget_id == widget_id)
    }

    /// Get the item for a widget.
    pub fn get(&self, widget_id: &str) -> Option<&LayoutItem> {
        self.items.iter().find(|item| item.widget_id == widget_id)
    }

    /// Append an item.
    pub fn push(&mut self, item: LayoutItem) {
        self.items.push(item);
    }

    /// Remove the item for a widget, preserving the order of the rest.
    pub fn remove(&mut self, widget_id: &str) -> Option<LayoutItem> {
        let pos = self.items.iter().position(|item| item.widget_id == widget_id)?;
        Some(self.items.remove(pos))
    }

    /// Replace every item.
    pub fn replace_items(&mut self, items: Vec<LayoutItem>) {
        self.items = items;
    }

    /// First row below all content (0 when empty).
    pub fn bottom(&self) -> u32 {
        self.items.iter().map(LayoutItem::bottom).max().unwrap_or(0)
    }

    /// Items sorted by widget id, for order-insensitive comparison.
    pub fn item_set(&self) -> Vec<LayoutItem> {
        let mut items = self.items.clone();
        items.sort();
        items
    }

    /// The first item that does not [fit](LayoutItem::fits) the grid.
    pub fn out_of_bounds(&self, columns: u32) -> Option<&LayoutItem> {
        self.items.iter().find(|item| !item.fits(columns))
    }

    /// Every invariant this layout breaks against a catalog and column count.
    pub fn violations(&self, catalog: &WidgetCatalog, columns: u32) -> Vec<LayoutViolation> {
        let mut found = Vec::new();
        let mut seen = HashSet::new();

        for (idx, item) in self.items.iter().enumerate() {
            if !seen.insert(item.widget_id.as_str()) {
                found.push(LayoutViolation::DuplicateWidget(item.widget_id.clone()));
            }
            if !item.fits(columns) {
                found.push(LayoutViolation::OutOfBounds(item.widget_id.clone()));
            }
            match catalog.get(&item.widget_id) {
                Ok(def) if !def.supports(item.w, item.h) => {
                    found.push(LayoutViolation::IllegalSize(item.widget_id.clone()));
                }
                Ok(_) => {}
                Err(_) => found.push(LayoutViolation::UnknownWidget(item.widget_id.clone())),
            }
            for other in &self.items[idx + 1..] {
                if item.overlaps(other) {
                    found.push(LayoutViolation::Overlap(
                        item.widget_id.clone(),
                        other.widget_id.clone(),
                    ));
                }
            }
        }

        found
    }

    /// Encode as the JSON item array stored in the `layout` field.
    pub fn to_wire(&self) -> Result<String, LayoutCodecError> {
        Ok(serde_json::to_string(&self.items)?)
    }

    /// Decode the JSON item array stored in the `layout` field.
    pub fn from_wire(layout: &str) -> Result<Self, LayoutCodecError> {
        let items: Vec<LayoutItem> = serde_json::from_str(layout)?;
        Ok(Self { items })
    }
}

impl From<Vec<LayoutItem>> for DashboardLayout {
    fn from(items: Vec<LayoutItem>) -> Self {
        Self::from_items(items)
    }
}
