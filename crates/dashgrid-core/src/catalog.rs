//! Registry of widgets that can be placed on a dashboard.
//!
//! The catalog is configuration: it is built once, validated, and shared
//! read-only (usually behind an `Arc`) with every session. Rendering handles
//! and icons are carried through as opaque strings.

use crate::layout::DashboardLayout;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use thiserror::Error;

/// Catalog errors.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Widget not found: {0}")]
    NotFound(String),
    #[error("Duplicate widget id: {0}")]
    DuplicateId(String),
    #[error("Widget {0} declares no sizes")]
    NoSizes(String),
    #[error("Widget {id} declares a zero-sized option {w}x{h}")]
    ZeroSize { id: String, w: u32, h: u32 },
    #[error("Default size {w}x{h} of widget {id} is not one of its sizes")]
    DefaultNotListed { id: String, w: u32, h: u32 },
    #[error("Invalid catalog: {0}")]
    Parse(#[from] serde_json::Error),
}

/// A legal widget size in grid cells.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WidgetSize {
    pub w: u32,
    pub h: u32,
    /// Display label, e.g. `"2x2"`.
    pub label: String,
}

impl WidgetSize {
    /// Create a size labelled `WxH`.
    pub fn new(w: u32, h: u32) -> Self {
        Self {
            w,
            h,
            label: format!("{}x{}", w, h),
        }
    }

    /// Check whether this size has the given dimensions.
    pub fn matches(&self, w: u32, h: u32) -> bool {
        self.w == w && self.h == h
    }
}

/// A placeable widget.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WidgetDefinition {
    /// Stable key, referenced by layout items.
    pub id: String,
    pub name: String,
    pub description: String,
    /// Icon reference for the widget picker.
    pub icon: String,
    /// Legal sizes, in display order.
    pub sizes: Vec<WidgetSize>,
    pub default_size: WidgetSize,
    /// Render handle understood by the rendering layer only.
    pub component: String,
}

impl WidgetDefinition {
    /// Check whether `(w, h)` is one of the declared sizes.
    pub fn supports(&self, w: u32, h: u32) -> bool {
        self.sizes.iter().any(|size| size.matches(w, h))
    }

    /// Look up a declared size by dimensions.
    pub fn size(&self, w: u32, h: u32) -> Option<&WidgetSize> {
        self.sizes.iter().find(|size| size.matches(w, h))
    }

    fn validate(&self) -> Result<(), CatalogError> {
        if self.sizes.is_empty() {
            return Err(CatalogError::NoSizes(self.id.clone()));
        }
        if let Some(size) = self.sizes.iter().find(|s| s.w == 0 || s.h == 0) {
            return Err(CatalogError::ZeroSize {
                id: self.id.clone(),
                w: size.w,
                h: size.h,
            });
        }
        if !self.supports(self.default_size.w, self.default_size.h) {
            return Err(CatalogError::DefaultNotListed {
                id: self.id.clone(),
                w: self.default_size.w,
                h: self.default_size.h,
            });
        }
        Ok(())
    }
}

/// Immutable set of widget definitions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct WidgetCatalog {
    definitions: Vec<WidgetDefinition>,
}

impl WidgetCatalog {
    /// Build a catalog, validating every definition.
    pub fn from_definitions(definitions: Vec<WidgetDefinition>) -> Result<Self, CatalogError> {
        let mut seen = HashSet::new();
        for def in &definitions {
            if !seen.insert(def.id.as_str()) {
                return Err(CatalogError::DuplicateId(def.id.clone()));
            }
            def.validate()?;
        }
        Ok(Self { definitions })
    }

    /// Parse a catalog from a JSON array of definitions.
    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        let definitions: Vec<WidgetDefinition> = serde_json::from_str(json)?;
        Self::from_definitions(definitions)
    }

    /// The widgets shipped with the application.
    pub fn builtin() -> Self {
        let defs = vec![
            widget("events", "Events", "Upcoming events with images", "CalendarDays", LARGE, (2, 2), "EventsWidget"),
            widget("membership-fees", "Membership fees", "Membership fee overview with chart", "TrendingUp", LARGE, (2, 2), "MembershipFeeWidget"),
            widget("tasks", "Tasks", "Active tasks", "ListTodo", LARGE, (1, 2), "TasksWidget"),
            widget("activity", "Activity", "Points, badges and certificates", "Trophy", &[(1, 3), (2, 2), (2, 3)], (1, 3), "ActivityWidget"),
            widget("messages", "Messages", "Latest messages", "Mail", LARGE, (1, 2), "MessagesWidget"),
            widget("shop", "Shop", "Latest shop listings", "ShoppingBag", LARGE, (1, 2), "ShopWidget"),
            widget("announcements", "Announcements", "Latest announcements", "Megaphone", LARGE, (2, 2), "AnnouncementsWidget"),
            widget("users-stats", "Users", "User statistics", "Users", COMPACT, (2, 1), "UsersStatsWidget"),
            widget("prayer-times", "Prayer times", "Today's prayer times", "Clock", COMPACT, (1, 2), "PrayerTimesWidget"),
            widget("work-groups", "Sections", "Work groups", "Users2", &[(1, 1), (2, 1), (2, 2)], (2, 1), "WorkGroupsWidget"),
            widget("documents", "Documents", "Quick access to documents", "FileText", TILE, (1, 1), "DocumentsWidget"),
            widget("settings", "Settings", "Quick access to settings", "Settings", TILE, (1, 1), "SettingsWidget"),
            widget("guide", "Guide", "Help and guide", "HelpCircle", TILE, (1, 1), "GuideWidget"),
            widget("imam-qa", "Ask the imam", "Questions for the imam", "MessageCircleQuestion", TILE, (1, 1), "ImamQAWidget"),
        ];
        Self { definitions: defs }
    }

    /// Look up a definition by id.
    pub fn get(&self, widget_id: &str) -> Result<&WidgetDefinition, CatalogError> {
        self.definitions
            .iter()
            .find(|def| def.id == widget_id)
            .ok_or_else(|| CatalogError::NotFound(widget_id.to_string()))
    }

    /// Check whether a widget id is registered.
    pub fn contains(&self, widget_id: &str) -> bool {
        self.definitions.iter().any(|def| def.id == widget_id)
    }

    /// Definitions not yet placed on `layout`, in catalog order.
    pub fn list_available(&self, layout: &DashboardLayout) -> Vec<&WidgetDefinition> {
        self.definitions
            .iter()
            .filter(|def| !layout.contains(&def.id))
            .collect()
    }

    /// All definitions in catalog order.
    pub fn iter(&self) -> impl Iterator<Item = &WidgetDefinition> {
        self.definitions.iter()
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }
}

impl Default for WidgetCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}

const LARGE: &[(u32, u32)] = &[(1, 2), (2, 2), (2, 3)];
const COMPACT: &[(u32, u32)] = &[(1, 1), (2, 1), (1, 2)];
const TILE: &[(u32, u32)] = &[(1, 1)];

fn widget(
    id: &str,
    name: &str,
    description: &str,
    icon: &str,
    sizes: &[(u32, u32)],
    default_size: (u32, u32),
    component: &str,
) -> WidgetDefinition {
    WidgetDefinition {
        id: id.to_string(),
        name: name.to_string(),
        description: description.to_string(),
        icon: icon.to_string(),
        sizes: sizes.iter().map(|&(w, h)| WidgetSize::new(w, h)).collect(),
        default_size: WidgetSize::new(default_size.0, default_size.1),
        component: component.to_string(),
    }
}
