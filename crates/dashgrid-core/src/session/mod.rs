//! Edit sessions over a user's dashboard.
//!
//! A session owns the working copy (the draft) of one user's layout and moves
//! it through `Viewing -> Editing -> Saving`:
//! - additions are placed with first-fit placement
//! - settled grid updates replace the draft only while editing
//! - saves are single-flight and never drop the draft on failure
//! - cancel restores the last persisted layout

mod edit;
mod grid;
mod mode;

pub use edit::EditSession;
pub use grid::GridProps;
pub use mode::EditMode;

use crate::placement::PlacementError;
use crate::storage::StorageError;
use thiserror::Error;

/// Errors reported by [`EditSession`] operations. None of them change the
/// draft.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Widget is already on the dashboard: {0}")]
    DuplicateWidget(String),
    #[error("Size {w}x{h} is not offered by widget {widget_id}")]
    InvalidSize { widget_id: String, w: u32, h: u32 },
    #[error("Unknown widget: {0}")]
    UnknownWidget(String),
    #[error("Dashboard is not in edit mode (currently {mode})")]
    NotEditing { mode: EditMode },
    #[error("A save is already in progress")]
    SaveInFlight,
    #[error(transparent)]
    Placement(#[from] PlacementError),
    #[error("Failed to persist layout: {0}")]
    Persistence(#[from] StorageError),
}
