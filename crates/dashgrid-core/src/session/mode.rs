//! Edit mode definitions.

use std::fmt;

/// Where a dashboard is in its edit lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum EditMode {
    /// Read-only display of the persisted layout.
    #[default]
    Viewing,
    /// The draft is mutable.
    Editing,
    /// A write is in flight; the draft is frozen until it resolves.
    Saving,
}

impl EditMode {
    /// Check if the draft accepts changes.
    pub fn is_editing(self) -> bool {
        self == Self::Editing
    }

    /// Check if a save is in flight.
    pub fn is_saving(self) -> bool {
        self == Self::Saving
    }
}

impl fmt::Display for EditMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Viewing => "viewing",
            Self::Editing => "editing",
            Self::Saving => "saving",
        };
        f.write_str(name)
    }
}
