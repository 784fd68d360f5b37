//! The edit session state machine.

use super::grid::GridProps;
use super::mode::EditMode;
use super::SessionError;
use crate::catalog::{WidgetCatalog, WidgetDefinition};
use crate::config::GridConfig;
use crate::layout::{DashboardLayout, LayoutItem};
use crate::placement::find_placement;
use crate::storage::{LayoutOwner, LayoutStore, StorageError, StorageResult, StoredLayout};
use std::sync::Arc;

/// One user's dashboard: the persisted snapshot plus a working draft.
#[derive(Debug, Clone)]
pub struct EditSession {
    owner: LayoutOwner,
    catalog: Arc<WidgetCatalog>,
    config: GridConfig,
    mode: EditMode,
    /// Working copy. Equal to `snapshot` outside of editing.
    draft: DashboardLayout,
    /// Last persisted layout, or the default arrangement if nothing is stored.
    snapshot: DashboardLayout,
    /// Whether `snapshot` came from the store.
    persisted: bool,
    /// Id of the stored record, reused on every save.
    record_id: Option<String>,
}

impl EditSession {
    /// Create a session over an already-loaded layout.
    ///
    /// `None` means the user has nothing stored; the default arrangement is
    /// shown instead.
    pub fn new(
        owner: LayoutOwner,
        catalog: Arc<WidgetCatalog>,
        config: GridConfig,
        persisted: Option<DashboardLayout>,
    ) -> Self {
        let is_persisted = persisted.is_some();
        let snapshot = persisted.unwrap_or_else(DashboardLayout::default_arrangement);
        Self {
            owner,
            catalog,
            config,
            mode: EditMode::Viewing,
            draft: snapshot.clone(),
            snapshot,
            persisted: is_persisted,
            record_id: None,
        }
    }

    /// Load a user's layout from a store.
    ///
    /// Missing, unreadable or out-of-grid layouts fall back to the default
    /// arrangement.
    /// Only store failures (I/O, locking) are returned as errors.
    pub async fn load<S>(
        owner: LayoutOwner,
        store: &S,
        catalog: Arc<WidgetCatalog>,
        config: GridConfig,
    ) -> Result<Self, SessionError>
    where
        S: LayoutStore + ?Sized,
    {
        let (persisted, record_id) = match store.read(&owner).await {
            Ok(record) => match record.decode() {
                Ok(layout) => match layout.out_of_bounds(config.columns) {
                    None => (Some(layout), record.id),
                    Some(item) => {
                        log::warn!(
                            "Stored layout for {} places {} outside the grid, using default",
                            owner,
                            item.widget_id
                        );
                        (None, record.id)
                    }
                },
                Err(e) => {
                    log::warn!("Stored layout for {} is malformed, using default: {}", owner, e);
                    (None, record.id)
                }
            },
            Err(StorageError::NotFound(_)) => {
                log::debug!("No stored layout for {}, using default", owner);
                (None, None)
            }
            Err(StorageError::Serialization(e)) => {
                log::warn!("Stored record for {} is unreadable, using default: {}", owner, e);
                (None, None)
            }
            Err(e) => return Err(SessionError::Persistence(e)),
        };

        let mut session = Self::new(owner, catalog, config, persisted);
        session.record_id = record_id;
        Ok(session)
    }

    pub fn owner(&self) -> &LayoutOwner {
        &self.owner
    }

    pub fn catalog(&self) -> &WidgetCatalog {
        &self.catalog
    }

    pub fn config(&self) -> &GridConfig {
        &self.config
    }

    pub fn mode(&self) -> EditMode {
        self.mode
    }

    /// The layout currently on screen.
    pub fn draft(&self) -> &DashboardLayout {
        &self.draft
    }

    /// The layout cancel returns to.
    pub fn snapshot(&self) -> &DashboardLayout {
        &self.snapshot
    }

    /// Check whether the snapshot was read from or written to the store.
    pub fn is_persisted(&self) -> bool {
        self.persisted
    }

    /// Check whether the draft differs from the snapshot, ignoring order.
    pub fn is_dirty(&self) -> bool {
        self.draft.item_set() != self.snapshot.item_set()
    }

    /// Start editing a copy of the snapshot. No-op if already editing.
    pub fn enter_edit(&mut self) -> Result<(), SessionError> {
        match self.mode {
            EditMode::Editing => Ok(()),
            EditMode::Saving => Err(SessionError::SaveInFlight),
            EditMode::Viewing => {
                self.draft = self.snapshot.clone();
                self.mode = EditMode::Editing;
                log::debug!("{}: editing", self.owner);
                Ok(())
            }
        }
    }

    /// Add a widget at the first free slot and return the placed item.
    pub fn add_widget(&mut self, widget_id: &str, w: u32, h: u32) -> Result<LayoutItem, SessionError> {
        self.require_editing()?;

        if self.draft.contains(widget_id) {
            return Err(SessionError::DuplicateWidget(widget_id.to_string()));
        }
        let def = self
            .catalog
            .get(widget_id)
            .map_err(|_| SessionError::UnknownWidget(widget_id.to_string()))?;
        if !def.supports(w, h) {
            return Err(SessionError::InvalidSize {
                widget_id: widget_id.to_string(),
                w,
                h,
            });
        }

        let position = find_placement(self.draft.items(), w, h, self.config.columns)?;
        let item = LayoutItem::new(widget_id, position.x, position.y, w, h);
        log::debug!("{}: placed {} at ({}, {})", self.owner, widget_id, position.x, position.y);
        self.draft.push(item.clone());
        Ok(item)
    }

    /// Add a widget at its default size.
    pub fn add_widget_default(&mut self, widget_id: &str) -> Result<LayoutItem, SessionError> {
        let (w, h) = match self.catalog.get(widget_id) {
            Ok(def) => (def.default_size.w, def.default_size.h),
            Err(_) => return Err(SessionError::UnknownWidget(widget_id.to_string())),
        };
        self.add_widget(widget_id, w, h)
    }

    /// Remove a widget from the draft. Returns `None` if it wasn't placed.
    pub fn remove_widget(&mut self, widget_id: &str) -> Result<Option<LayoutItem>, SessionError> {
        self.require_editing()?;
        Ok(self.draft.remove(widget_id))
    }

    /// Replace the draft with the default arrangement.
    pub fn reset_to_default(&mut self) -> Result<(), SessionError> {
        self.require_editing()?;
        self.draft = DashboardLayout::default_arrangement();
        Ok(())
    }

    /// Accept a settled layout from the grid renderer.
    ///
    /// Applied only while editing; late events from a view that has already
    /// gone back to viewing, or that arrive mid-save, are dropped. So are
    /// layouts with an item outside the grid. Returns whether the update was
    /// applied.
    pub fn update_from_grid(&mut self, items: Vec<LayoutItem>) -> bool {
        if !self.mode.is_editing() {
            log::debug!("{}: ignoring grid update while {}", self.owner, self.mode);
            return false;
        }
        if let Some(item) = items.iter().find(|item| !item.fits(self.config.columns)) {
            log::warn!("{}: ignoring grid update, {} is outside the grid", self.owner, item.widget_id);
            return false;
        }
        self.draft.replace_items(items);
        true
    }

    /// Freeze the draft and produce the record to write.
    ///
    /// Returns `None` if a save is already in flight. Every `Some` must be
    /// followed by exactly one [`finish_save`](Self::finish_save).
    pub fn begin_save(&mut self) -> Result<Option<StoredLayout>, SessionError> {
        if self.mode.is_saving() {
            return Ok(None);
        }
        let record = StoredLayout::encode(&self.draft, self.record_id.clone())
            .map_err(|e| SessionError::Persistence(e.into()))?;
        self.record_id = record.id.clone();
        self.mode = EditMode::Saving;
        Ok(Some(record))
    }

    /// Resolve an in-flight save.
    ///
    /// On success the draft becomes the snapshot and the session returns to
    /// viewing. On failure it returns to editing with the draft untouched.
    pub fn finish_save(&mut self, result: StorageResult<()>) -> Result<(), SessionError> {
        if !self.mode.is_saving() {
            log::warn!("{}: save completion arrived while {}, ignoring", self.owner, self.mode);
            return Ok(());
        }
        match result {
            Ok(()) => {
                self.snapshot = self.draft.clone();
                self.persisted = true;
                self.mode = EditMode::Viewing;
                log::debug!("{}: saved {} widgets", self.owner, self.snapshot.len());
                Ok(())
            }
            Err(e) => {
                self.mode = EditMode::Editing;
                log::warn!("{}: save failed, draft kept: {}", self.owner, e);
                Err(SessionError::Persistence(e))
            }
        }
    }

    /// Write the draft to `store`.
    ///
    /// Returns `Ok(false)` without writing if a save is already in flight.
    pub async fn save<S>(&mut self, store: &S) -> Result<bool, SessionError>
    where
        S: LayoutStore + ?Sized,
    {
        let Some(record) = self.begin_save()? else {
            return Ok(false);
        };
        let result = store.write(&self.owner, &record).await;
        self.finish_save(result)?;
        Ok(true)
    }

    /// Discard the draft and go back to viewing the snapshot.
    pub fn cancel(&mut self) -> Result<(), SessionError> {
        if self.mode.is_saving() {
            return Err(SessionError::SaveInFlight);
        }
        self.draft = self.snapshot.clone();
        self.mode = EditMode::Viewing;
        Ok(())
    }

    /// Widgets that can still be added.
    pub fn available_widgets(&self) -> Vec<&WidgetDefinition> {
        self.catalog.list_available(&self.draft)
    }

    /// Draft items paired with their definitions, in draft order.
    ///
    /// Items whose widget is no longer in the catalog are skipped but stay in
    /// the layout, so they come back if the widget is registered again.
    pub fn renderable_items(&self) -> Vec<(&LayoutItem, &WidgetDefinition)> {
        self.draft
            .items()
            .iter()
            .filter_map(|item| match self.catalog.get(&item.widget_id) {
                Ok(def) => Some((item, def)),
                Err(_) => {
                    log::warn!("{}: skipping unknown widget {}", self.owner, item.widget_id);
                    None
                }
            })
            .collect()
    }

    /// Inputs for the grid renderer.
    pub fn grid_props(&self) -> GridProps<'_> {
        GridProps::new(&self.config, self.mode.is_editing(), self.draft.items())
    }

    fn require_editing(&self) -> Result<(), SessionError> {
        match self.mode {
            EditMode::Editing => Ok(()),
            EditMode::Saving => Err(SessionError::SaveInFlight),
            EditMode::Viewing => Err(SessionError::NotEditing { mode: self.mode }),
        }
    }
}
