//! Grid geometry shared by placement and the grid renderer.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Number of columns the dashboard grid is laid out on.
pub const DEFAULT_COLUMNS: u32 = 5;

/// Height of one grid row, in pixels.
pub const DEFAULT_ROW_HEIGHT: u32 = 120;

/// Gap between cells, in pixels.
pub const DEFAULT_MARGIN: u32 = 12;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Grid must have at least one column")]
    NoColumns,
    #[error("Invalid grid configuration: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Grid geometry.
///
/// Placement only looks at `columns`. Row height and margin are handed
/// through to the grid renderer untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridConfig {
    /// Number of columns.
    pub columns: u32,
    /// Row height in pixels.
    pub row_height: u32,
    /// Horizontal and vertical cell margin in pixels.
    pub margin: u32,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            columns: DEFAULT_COLUMNS,
            row_height: DEFAULT_ROW_HEIGHT,
            margin: DEFAULT_MARGIN,
        }
    }
}

impl GridConfig {
    /// Parse a configuration from JSON. Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Check the configuration is usable.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.columns == 0 {
            return Err(ConfigError::NoColumns);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = GridConfig::default();
        assert_eq!(config.columns, 5);
        assert_eq!(config.row_height, 120);
        assert_eq!(config.margin, 12);
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let config = GridConfig::from_json(r#"{ "columns": 8 }"#).unwrap();
        assert_eq!(config.columns, 8);
        assert_eq!(config.row_height, DEFAULT_ROW_HEIGHT);
        assert_eq!(config.margin, DEFAULT_MARGIN);
    }

    #[test]
    fn test_zero_columns_rejected() {
        let result = GridConfig::from_json(r#"{ "columns": 0 }"#);
        assert!(matches!(result, Err(ConfigError::NoColumns)));
    }

    #[test]
    fn test_garbage_rejected() {
        assert!(matches!(GridConfig::from_json("nope"), Err(ConfigError::Parse(_))));
    }
}
