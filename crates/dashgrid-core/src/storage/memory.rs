//! In-memory storage implementation.

use super::{BoxFuture, LayoutOwner, LayoutStore, StorageError, StorageResult, StoredLayout};
use std::collections::HashMap;
use std::sync::RwLock;

/// In-memory storage for testing and ephemeral use.
#[derive(Default)]
pub struct MemoryStorage {
    layouts: RwLock<HashMap<LayoutOwner, StoredLayout>>,
}

impl MemoryStorage {
    /// Create a new empty memory storage.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored layouts.
    pub fn len(&self) -> usize {
        self.layouts.read().map(|map| map.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn get(&self, owner: &LayoutOwner) -> StorageResult<StoredLayout> {
        let layouts = self
            .layouts
            .read()
            .map_err(|e| StorageError::Other(format!("Lock error: {}", e)))?;
        layouts
            .get(owner)
            .cloned()
            .ok_or_else(|| StorageError::NotFound(owner.to_string()))
    }

    fn put(&self, owner: &LayoutOwner, layout: Option<&StoredLayout>) -> StorageResult<()> {
        let mut layouts = self
            .layouts
            .write()
            .map_err(|e| StorageError::Other(format!("Lock error: {}", e)))?;
        match layout {
            Some(layout) => layouts.insert(owner.clone(), layout.clone()),
            None => layouts.remove(owner),
        };
        Ok(())
    }
}

impl LayoutStore for MemoryStorage {
    fn read(&self, owner: &LayoutOwner) -> BoxFuture<'_, StorageResult<StoredLayout>> {
        let result = self.get(owner);
        Box::pin(async move { result })
    }

    fn write(&self, owner: &LayoutOwner, layout: &StoredLayout) -> BoxFuture<'_, StorageResult<()>> {
        let result = self.put(owner, Some(layout));
        Box::pin(async move { result })
    }

    fn delete(&self, owner: &LayoutOwner) -> BoxFuture<'_, StorageResult<()>> {
        let result = self.put(owner, None);
        Box::pin(async move { result })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::block_on;

    fn alice() -> LayoutOwner {
        LayoutOwner::new("tenant-a", "alice")
    }

    #[test]
    fn test_write_and_read() {
        let storage = MemoryStorage::new();
        let record = StoredLayout::new("[]");

        block_on(storage.write(&alice(), &record)).unwrap();
        let loaded = block_on(storage.read(&alice())).unwrap();

        assert_eq!(loaded, record);
    }

    #[test]
    fn test_not_found() {
        let storage = MemoryStorage::new();
        let result = block_on(storage.read(&alice()));

        assert!(matches!(result, Err(StorageError::NotFound(key)) if key == "tenant-a/alice"));
    }

    #[test]
    fn test_scoped_by_tenant_and_user() {
        let storage = MemoryStorage::new();
        block_on(storage.write(&alice(), &StoredLayout::new("[1]"))).unwrap();

        let same_user_other_tenant = LayoutOwner::new("tenant-b", "alice");
        assert!(block_on(storage.read(&same_user_other_tenant)).is_err());
        assert!(block_on(storage.read(&LayoutOwner::new("tenant-a", "bob"))).is_err());
    }

    #[test]
    fn test_stores_garbage_verbatim() {
        let storage = MemoryStorage::new();
        let record = StoredLayout::new("not json at all");

        block_on(storage.write(&alice(), &record)).unwrap();
        assert_eq!(block_on(storage.read(&alice())).unwrap().layout, "not json at all");
    }

    #[test]
    fn test_delete() {
        let storage = MemoryStorage::new();
        block_on(storage.write(&alice(), &StoredLayout::new("[]"))).unwrap();
        assert_eq!(storage.len(), 1);

        block_on(storage.delete(&alice())).unwrap();
        assert!(storage.is_empty());
        // Deleting again is fine
        block_on(storage.delete(&alice())).unwrap();
    }
}
