//! File-based storage implementation.

use super::{BoxFuture, LayoutOwner, LayoutStore, StorageError, StorageResult, StoredLayout};
use std::fs;
use std::path::{Path, PathBuf};

/// File-based storage.
///
/// Stores each layout record as `<base>/<tenant>/<user>.json`.
pub struct FileStorage {
    /// Base directory for layout storage.
    base_path: PathBuf,
}

impl FileStorage {
    /// Create a new file storage with the given base directory.
    ///
    /// Creates the directory if it doesn't exist.
    pub fn new(base_path: PathBuf) -> StorageResult<Self> {
        if !base_path.exists() {
            fs::create_dir_all(&base_path).map_err(|e| {
                StorageError::Io(format!("Failed to create storage directory: {}", e))
            })?;
        }
        Ok(Self { base_path })
    }

    /// Create file storage in the default location.
    ///
    /// On Unix: `~/.local/share/dashgrid/layouts/`
    /// On Windows: `%LOCALAPPDATA%\dashgrid\layouts\`
    pub fn default_location() -> StorageResult<Self> {
        let base = dirs::data_local_dir()
            .or_else(dirs::home_dir)
            .ok_or_else(|| StorageError::Io("Could not determine home directory".to_string()))?;

        Self::new(base.join("dashgrid").join("layouts"))
    }

    /// Get the file path for an owner.
    fn layout_path(&self, owner: &LayoutOwner) -> PathBuf {
        self.base_path
            .join(sanitize(&owner.tenant_id))
            .join(format!("{}.json", sanitize(&owner.user_id)))
    }

    /// Get the base path.
    pub fn base_path(&self) -> &Path {
        &self.base_path
    }
}

/// Encode a key component as a single path segment.
///
/// ASCII alphanumerics and `-` pass through; every other byte, `_` included,
/// becomes `_xx` (lowercase hex), so distinct components never share a file.
fn sanitize(component: &str) -> String {
    if component.is_empty() {
        return "_".to_string();
    }
    let mut safe = String::with_capacity(component.len());
    for byte in component.bytes() {
        if byte.is_ascii_alphanumeric() || byte == b'-' {
            safe.push(char::from(byte));
        } else {
            safe.push_str(&format!("_{:02x}", byte));
        }
    }
    safe
}

impl LayoutStore for FileStorage {
    fn read(&self, owner: &LayoutOwner) -> BoxFuture<'_, StorageResult<StoredLayout>> {
        let path = self.layout_path(owner);
        let key = owner.to_string();

        Box::pin(async move {
            if !path.exists() {
                return Err(StorageError::NotFound(key));
            }

            let json = fs::read_to_string(&path).map_err(|e| {
                StorageError::Io(format!("Failed to read {}: {}", path.display(), e))
            })?;

            serde_json::from_str(&json).map_err(|e| {
                StorageError::Serialization(format!("Failed to parse {}: {}", path.display(), e))
            })
        })
    }

    fn write(&self, owner: &LayoutOwner, layout: &StoredLayout) -> BoxFuture<'_, StorageResult<()>> {
        let path = self.layout_path(owner);
        let json = match serde_json::to_string_pretty(layout) {
            Ok(j) => j,
            Err(e) => {
                return Box::pin(async move { Err(StorageError::Serialization(e.to_string())) });
            }
        };

        Box::pin(async move {
            if let Some(dir) = path.parent() {
                fs::create_dir_all(dir).map_err(|e| {
                    StorageError::Io(format!("Failed to create {}: {}", dir.display(), e))
                })?;
            }
            fs::write(&path, json).map_err(|e| {
                StorageError::Io(format!("Failed to write {}: {}", path.display(), e))
            })
        })
    }

    fn delete(&self, owner: &LayoutOwner) -> BoxFuture<'_, StorageResult<()>> {
        let path = self.layout_path(owner);

        Box::pin(async move {
            if path.exists() {
                fs::remove_file(&path).map_err(|e| {
                    StorageError::Io(format!("Failed to delete {}: {}", path.display(), e))
                })?;
            }
            Ok(())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::block_on;
    use tempfile::tempdir;

    #[test]
    fn test_file_storage_write_read() {
        let dir = tempdir().unwrap();
        let storage = FileStorage::new(dir.path().to_path_buf()).unwrap();
        let owner = LayoutOwner::new("tenant-1", "user-1");
        let record = StoredLayout::new(r#"[{"i":"guide","x":0,"y":0,"w":1,"h":1}]"#);

        block_on(storage.write(&owner, &record)).unwrap();
        let loaded = block_on(storage.read(&owner)).unwrap();

        assert_eq!(loaded, record);
        assert!(dir.path().join("tenant-1").join("user-1.json").exists());
    }

    #[test]
    fn test_file_storage_not_found() {
        let dir = tempdir().unwrap();
        let storage = FileStorage::new(dir.path().to_path_buf()).unwrap();

        let result = block_on(storage.read(&LayoutOwner::new("t", "nobody")));
        assert!(matches!(result, Err(StorageError::NotFound(_))));
    }

    #[test]
    fn test_file_storage_corrupt_file() {
        let dir = tempdir().unwrap();
        let storage = FileStorage::new(dir.path().to_path_buf()).unwrap();
        let owner = LayoutOwner::new("t", "u");

        fs::create_dir_all(dir.path().join("t")).unwrap();
        fs::write(dir.path().join("t").join("u.json"), "{ truncated").unwrap();

        let result = block_on(storage.read(&owner));
        assert!(matches!(result, Err(StorageError::Serialization(_))));
    }

    #[test]
    fn test_file_storage_delete() {
        let dir = tempdir().unwrap();
        let storage = FileStorage::new(dir.path().to_path_buf()).unwrap();
        let owner = LayoutOwner::new("t", "u");

        block_on(storage.write(&owner, &StoredLayout::new("[]"))).unwrap();
        block_on(storage.delete(&owner)).unwrap();
        assert!(matches!(block_on(storage.read(&owner)), Err(StorageError::NotFound(_))));
        block_on(storage.delete(&owner)).unwrap();
    }

    #[test]
    fn test_file_storage_sanitizes_owner() {
        let dir = tempdir().unwrap();
        let storage = FileStorage::new(dir.path().to_path_buf()).unwrap();
        let owner = LayoutOwner::new("../escape", "a/b:c");

        block_on(storage.write(&owner, &StoredLayout::new("[]"))).unwrap();

        // Stays inside the base directory and is loadable with the same key
        assert!(dir.path().join("_2e_2e_2fescape").join("a_2fb_3ac.json").exists());
        assert!(block_on(storage.read(&owner)).is_ok());
    }

    #[test]
    fn test_sanitize() {
        assert_eq!(sanitize(""), "_");
        assert_eq!(sanitize("ok-id9"), "ok-id9");
        assert_eq!(sanitize("ok_id"), "ok_5fid");
        assert_eq!(sanitize("_"), "_5f");
        assert_eq!(sanitize("é"), "_c3_a9");
        assert_ne!(sanitize("acme.org"), sanitize("acme_org"));
    }

    #[test]
    fn test_file_storage_punctuation_does_not_collide() {
        let dir = tempdir().unwrap();
        let storage = FileStorage::new(dir.path().to_path_buf()).unwrap();
        let dotted = LayoutOwner::new("acme.org", "alice");
        let underscored = LayoutOwner::new("acme_org", "alice");

        block_on(storage.write(&dotted, &StoredLayout::new(r#"["secret"]"#))).unwrap();

        assert!(matches!(
            block_on(storage.read(&underscored)),
            Err(StorageError::NotFound(_))
        ));

        block_on(storage.write(&underscored, &StoredLayout::new("[]"))).unwrap();
        assert_eq!(block_on(storage.read(&dotted)).unwrap().layout, r#"["secret"]"#);
        assert_eq!(block_on(storage.read(&underscored)).unwrap().layout, "[]");
    }
}
