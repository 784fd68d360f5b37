//! Server configuration from the environment.

use dashgrid_core::{CatalogError, GridConfig, WidgetCatalog};
use std::net::SocketAddr;
use std::path::PathBuf;
use thiserror::Error;

/// Default listen address.
pub const DEFAULT_ADDR: &str = "0.0.0.0:3030";

pub const ENV_ADDR: &str = "DASHGRID_ADDR";
pub const ENV_STORAGE: &str = "DASHGRID_STORAGE";
pub const ENV_DATA_DIR: &str = "DASHGRID_DATA_DIR";
pub const ENV_GRID_CONFIG: &str = "DASHGRID_GRID_CONFIG";
pub const ENV_CATALOG: &str = "DASHGRID_CATALOG";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid DASHGRID_ADDR {0:?}")]
    InvalidAddr(String),
    #[error("Unknown DASHGRID_STORAGE {0:?} (expected \"file\" or \"memory\")")]
    UnknownStorage(String),
    #[error("Failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error(transparent)]
    Grid(#[from] dashgrid_core::ConfigError),
    #[error(transparent)]
    Catalog(#[from] CatalogError),
}

/// Where layouts are kept.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageKind {
    /// JSON files under a directory, or the platform data dir if `None`.
    File(Option<PathBuf>),
    /// Process memory; lost on restart.
    Memory,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub addr: SocketAddr,
    pub storage: StorageKind,
    pub grid: GridConfig,
    pub catalog: WidgetCatalog,
}

impl ServerConfig {
    /// Read configuration from process environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read configuration through `lookup`, which maps a variable name to its
    /// value.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let addr_str = lookup(ENV_ADDR).unwrap_or_else(|| DEFAULT_ADDR.to_string());
        let addr: SocketAddr = addr_str
            .parse()
            .map_err(|_| ConfigError::InvalidAddr(addr_str.clone()))?;

        let storage = match lookup(ENV_STORAGE).as_deref() {
            None | Some("file") => StorageKind::File(lookup(ENV_DATA_DIR).map(PathBuf::from)),
            Some("memory") => StorageKind::Memory,
            Some(other) => return Err(ConfigError::UnknownStorage(other.to_string())),
        };

        let grid = match lookup(ENV_GRID_CONFIG) {
            Some(path) => GridConfig::from_json(&read(path)?)?,
            None => GridConfig::default(),
        };

        let catalog = match lookup(ENV_CATALOG) {
            Some(path) => WidgetCatalog::from_json(&read(path)?)?,
            None => WidgetCatalog::builtin(),
        };

        Ok(Self {
            addr,
            storage,
            grid,
            catalog,
        })
    }
}

fn read(path: String) -> Result<String, ConfigError> {
    let path = PathBuf::from(path);
    std::fs::read_to_string(&path).map_err(|source| ConfigError::Read { path, source })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> Result<ServerConfig, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        ServerConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config(&[]).unwrap();
        assert_eq!(config.addr.port(), 3030);
        assert_eq!(config.storage, StorageKind::File(None));
        assert_eq!(config.grid, GridConfig::default());
        assert_eq!(config.catalog.len(), 14);
    }

    #[test]
    fn test_memory_storage() {
        let config = config(&[(ENV_STORAGE, "memory")]).unwrap();
        assert_eq!(config.storage, StorageKind::Memory);
    }

    #[test]
    fn test_data_dir() {
        let config = config(&[(ENV_DATA_DIR, "/var/lib/dashgrid")]).unwrap();
        assert_eq!(config.storage, StorageKind::File(Some(PathBuf::from("/var/lib/dashgrid"))));
    }

    #[test]
    fn test_invalid_values() {
        assert!(matches!(config(&[(ENV_ADDR, "not an addr")]), Err(ConfigError::InvalidAddr(_))));
        assert!(matches!(config(&[(ENV_STORAGE, "s3")]), Err(ConfigError::UnknownStorage(_))));
        assert!(matches!(
            config(&[(ENV_GRID_CONFIG, "/definitely/not/here.json")]),
            Err(ConfigError::Read { .. })
        ));
    }

    #[test]
    fn test_grid_and_catalog_files() {
        let dir = tempfile::tempdir().unwrap();
        let grid_path = dir.path().join("grid.json");
        let catalog_path = dir.path().join("catalog.json");
        std::fs::write(&grid_path, r#"{ "columns": 6, "row_height": 80 }"#).unwrap();
        std::fs::write(
            &catalog_path,
            r#"[{ "id": "clock", "name": "Clock", "description": "", "icon": "Clock",
                  "sizes": [{ "w": 1, "h": 1, "label": "1x1" }],
                  "defaultSize": { "w": 1, "h": 1, "label": "1x1" },
                  "component": "ClockWidget" }]"#,
        )
        .unwrap();

        let config = config(&[
            (ENV_GRID_CONFIG, grid_path.to_str().unwrap()),
            (ENV_CATALOG, catalog_path.to_str().unwrap()),
        ])
        .unwrap();

        assert_eq!(config.grid.columns, 6);
        assert_eq!(config.catalog.len(), 1);
    }
}
