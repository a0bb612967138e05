//! Board configuration.

use crate::grid::{GridPos, DEFAULT_GRID_SIZE, MAX_GRID_SIZE};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("Invalid config JSON: {0}")]
    Parse(String),

    #[error("Grid size must be positive")]
    EmptyGrid,

    #[error("Grid size {0} exceeds the limit of {MAX_GRID_SIZE}")]
    GridTooLarge(usize),

    #[error("Start position {0:?} is outside a {1}x{1} grid")]
    StartOutOfBounds(GridPos, usize),
}

/// Size of the placement grid and where the start tile goes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BoardConfig {
    /// Side length of the square grid
    pub grid_size: usize,
    /// Cell of the start tile
    pub start: GridPos,
}

impl BoardConfig {
    /// Parse and validate a JSON config; missing fields take defaults
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: BoardConfig =
            serde_json::from_str(json).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.grid_size == 0 {
            return Err(ConfigError::EmptyGrid);
        }
        if self.grid_size > MAX_GRID_SIZE {
            return Err(ConfigError::GridTooLarge(self.grid_size));
        }
        let limit = self.grid_size as i64;
        let inside = |v: i32| (0..limit).contains(&(v as i64));
        if !inside(self.start.x) || !inside(self.start.z) {
            return Err(ConfigError::StartOutOfBounds(self.start, self.grid_size));
        }
        Ok(())
    }
}

impl Default for BoardConfig {
    fn default() -> Self {
        let middle = (DEFAULT_GRID_SIZE / 2) as i32;
        Self {
            grid_size: DEFAULT_GRID_SIZE,
            start: GridPos::new(middle, middle),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_starts_in_the_middle() {
        let config = BoardConfig::default();
        assert_eq!(config.grid_size, 170);
        assert_eq!(config.start, GridPos::new(85, 85));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let config = BoardConfig::from_json(r#"{ "grid_size": 20, "start": { "x": 10, "z": 10 } }"#)
            .unwrap();
        assert_eq!(config.grid_size, 20);

        let config = BoardConfig::from_json("{}").unwrap();
        assert_eq!(config, BoardConfig::default());
    }

    #[test]
    fn test_invalid_configs_rejected() {
        assert!(matches!(
            BoardConfig::from_json(r#"{ "grid_size": 10 }"#),
            Err(ConfigError::StartOutOfBounds(_, 10))
        ));
        assert_eq!(
            BoardConfig::from_json(r#"{ "grid_size": 0 }"#),
            Err(ConfigError::EmptyGrid)
        );
        assert_eq!(
            BoardConfig::from_json(r#"{ "grid_size": 2048, "start": { "x": 1, "z": 1 } }"#),
            Err(ConfigError::GridTooLarge(2048))
        );
        assert!(
            BoardConfig::from_json(r#"{ "grid_size": 5000000000, "start": { "x": 1, "z": 1 } }"#)
                .is_err()
        );
        assert!(matches!(
            BoardConfig::from_json("not json"),
            Err(ConfigError::Parse(_))
        ));
    }
}
