//! Dashgrid Core Library
//!
//! Per-user dashboard layouts: the widget catalog, first-fit placement, the
//! view/edit/save session state machine and layout persistence.

pub mod catalog;
pub mod config;
pub mod layout;
pub mod placement;
pub mod session;
pub mod storage;

pub use catalog::{CatalogError, WidgetCatalog, WidgetDefinition, WidgetSize};
pub use config::{ConfigError, GridConfig};
pub use layout::{DashboardLayout, LayoutCodecError, LayoutItem, LayoutViolation, MAX_ROWS};
pub use placement::{find_placement, GridPosition, GridRect, PlacementError};
pub use session::{EditMode, EditSession, GridProps, SessionError};
pub use storage::{
    FileStorage, LayoutOwner, LayoutStore, MemoryStorage, StorageError, StorageResult, StoredLayout,
};
