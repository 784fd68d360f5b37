//! Inputs handed to the grid renderer.

use crate::config::GridConfig;
use crate::layout::LayoutItem;
use serde::Serialize;

/// Everything the drag/resize grid needs to draw a dashboard.
///
/// The grid performs its own compaction and collision handling while the
/// user drags, and reports settled layouts back through
/// [`EditSession::update_from_grid`](super::EditSession::update_from_grid).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GridProps<'a> {
    pub cols: u32,
    pub row_height: u32,
    pub margin: [u32; 2],
    pub is_draggable: bool,
    pub is_resizable: bool,
    pub layout: &'a [LayoutItem],
}

impl<'a> GridProps<'a> {
    pub(crate) fn new(config: &GridConfig, editable: bool, layout: &'a [LayoutItem]) -> Self {
        Self {
            cols: config.columns,
            row_height: config.row_height,
            margin: [config.margin, config.margin],
            is_draggable: editable,
            is_resizable: editable,
            layout,
        }
    }
}
