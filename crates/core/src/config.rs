//! Game configuration
//!
//! Layered the same way everywhere: defaults, then an optional JSON file, then
//! environment overrides, then [`GameConfig::validate`]. Every field has a
//! default so a partial JSON document is enough.
//!
//! ```
//! use gem_crush_core::config::GameConfig;
//!
//! let cfg = GameConfig::from_json_str(r#"{"board":{"width":5,"palette":["red","blue"]}}"#).unwrap();
//! assert_eq!(cfg.board.width, 5);
//! assert_eq!(cfg.board.height, 8);
//! assert!(cfg.rules.chain_cascades);
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::{
    GemKind, WorldPos, DEFAULT_BOARD_HEIGHT, DEFAULT_BOARD_WIDTH, DEFAULT_CELL_SIZE,
    DEFAULT_MAX_CASCADES, EXPLODE_STEP_MS, FALL_STEP_MS, REFILL_STEP_MS, SWAP_MS,
};

/// Rejected configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("board dimensions must be positive, got {width}x{height}")]
    InvalidDimensions { width: i32, height: i32 },
    #[error("cell size must be a positive finite number, got {0}")]
    InvalidCellSize(f32),
    #[error("gem palette must contain at least one kind")]
    EmptyPalette,
    #[error("max_cascades must be at least 1")]
    ZeroCascadeCap,
    #[error("layout row {row} has {found} cells, expected {expected}")]
    RaggedLayout {
        row: usize,
        found: usize,
        expected: usize,
    },
    #[error("invalid value for {key}: {value}")]
    InvalidEnv { key: &'static str, value: String },
    #[error("failed to read config {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config json: {0}")]
    Json(#[from] serde_json::Error),
}

/// Board shape, projection and gem palette
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BoardConfig {
    pub width: i32,
    pub height: i32,
    pub cell_size: f32,
    pub origin: WorldPos,
    pub palette: Vec<GemKind>,
    pub seed: u32,
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            width: DEFAULT_BOARD_WIDTH,
            height: DEFAULT_BOARD_HEIGHT,
            cell_size: DEFAULT_CELL_SIZE,
            origin: WorldPos::default(),
            palette: GemKind::ALL.to_vec(),
            seed: 1,
        }
    }
}

impl BoardConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.width <= 0 || self.height <= 0 {
            return Err(ConfigError::InvalidDimensions {
                width: self.width,
                height: self.height,
            });
        }
        if !self.cell_size.is_finite() || self.cell_size <= 0.0 {
            return Err(ConfigError::InvalidCellSize(self.cell_size));
        }
        if self.palette.is_empty() {
            return Err(ConfigError::EmptyPalette);
        }
        Ok(())
    }
}

/// How a turn resolves
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TurnPolicy {
    /// Re-run matching after a refill until the board is stable
    pub chain_cascades: bool,
    /// Maximum matching passes per turn when chaining
    pub max_cascades: u32,
    /// Swap the pair back when the first pass finds nothing
    pub revert_unmatched_swaps: bool,
    /// Only edge-adjacent cells may be swapped
    pub require_adjacent: bool,
}

impl Default for TurnPolicy {
    fn default() -> Self {
        Self {
            chain_cascades: true,
            max_cascades: DEFAULT_MAX_CASCADES,
            revert_unmatched_swaps: false,
            require_adjacent: false,
        }
    }
}

/// Time each stage is given for its presentation before the next one runs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StageTimings {
    pub swap_ms: u32,
    pub explode_step_ms: u32,
    pub fall_step_ms: u32,
    pub refill_step_ms: u32,
}

impl Default for StageTimings {
    fn default() -> Self {
        Self {
            swap_ms: SWAP_MS,
            explode_step_ms: EXPLODE_STEP_MS,
            fall_step_ms: FALL_STEP_MS,
            refill_step_ms: REFILL_STEP_MS,
        }
    }
}

impl StageTimings {
    /// Every stage completes immediately (headless play, tests)
    pub fn instant() -> Self {
        Self {
            swap_ms: 0,
            explode_step_ms: 0,
            fall_step_ms: 0,
            refill_step_ms: 0,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub board: BoardConfig,
    pub rules: TurnPolicy,
    pub timings: StageTimings,
}

impl GameConfig {
    pub fn from_json_str(s: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(s)?)
    }

    /// Read a JSON config file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json_str(&text)
    }

    /// Apply `GEM_CRUSH_*` overrides from the process environment
    pub fn apply_env(&mut self) -> Result<(), ConfigError> {
        self.apply_env_from(|key| std::env::var(key).ok())
    }

    /// Apply overrides from an arbitrary lookup
    ///
    /// Recognized keys: `GEM_CRUSH_SEED`, `GEM_CRUSH_WIDTH`, `GEM_CRUSH_HEIGHT`,
    /// `GEM_CRUSH_CASCADES` (`0`/`1`/`true`/`false`).
    pub fn apply_env_from<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = lookup("GEM_CRUSH_SEED") {
            self.board.seed = parse_env("GEM_CRUSH_SEED", &v)?;
        }
        if let Some(v) = lookup("GEM_CRUSH_WIDTH") {
            self.board.width = parse_env("GEM_CRUSH_WIDTH", &v)?;
        }
        if let Some(v) = lookup("GEM_CRUSH_HEIGHT") {
            self.board.height = parse_env("GEM_CRUSH_HEIGHT", &v)?;
        }
        if let Some(v) = lookup("GEM_CRUSH_CASCADES") {
            self.rules.chain_cascades = match v.trim().to_lowercase().as_str() {
                "1" | "true" | "on" => true,
                "0" | "false" | "off" => false,
                _ => {
                    return Err(ConfigError::InvalidEnv {
                        key: "GEM_CRUSH_CASCADES",
                        value: v,
                    })
                }
            };
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.board.validate()?;
        if self.rules.max_cascades == 0 {
            return Err(ConfigError::ZeroCascadeCap);
        }
        Ok(())
    }
}

fn parse_env<T: std::str::FromStr>(key: &'static str, value: &str) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::InvalidEnv {
        key,
        value: value.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults_validate() {
        let cfg = GameConfig::default();
        assert!(cfg.validate().is_ok());
        assert_eq!(cfg.board.palette.len(), 6);
        assert!(!cfg.rules.revert_unmatched_swaps);
    }

    #[test]
    fn test_empty_palette_rejected() {
        let mut cfg = GameConfig::default();
        cfg.board.palette.clear();
        assert!(matches!(cfg.validate(), Err(ConfigError::EmptyPalette)));
    }

    #[test]
    fn test_bad_dimensions_and_cell_size_rejected() {
        let mut cfg = GameConfig::default();
        cfg.board.width = 0;
        assert!(matches!(
            cfg.validate(),
            Err(ConfigError::InvalidDimensions { width: 0, .. })
        ));

        let mut cfg = GameConfig::default();
        cfg.board.cell_size = f32::NAN;
        assert!(matches!(cfg.validate(), Err(ConfigError::InvalidCellSize(_))));

        let mut cfg = GameConfig::default();
        cfg.rules.max_cascades = 0;
        assert!(matches!(cfg.validate(), Err(ConfigError::ZeroCascadeCap)));
    }

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> = [
            ("GEM_CRUSH_SEED", "42"),
            ("GEM_CRUSH_WIDTH", "5"),
            ("GEM_CRUSH_CASCADES", "off"),
        ]
        .into_iter()
        .collect();

        let mut cfg = GameConfig::default();
        cfg.apply_env_from(|k| env.get(k).map(|v| v.to_string()))
            .unwrap();
        assert_eq!(cfg.board.seed, 42);
        assert_eq!(cfg.board.width, 5);
        assert_eq!(cfg.board.height, 8);
        assert!(!cfg.rules.chain_cascades);
    }

    #[test]
    fn test_env_rejects_garbage() {
        let mut cfg = GameConfig::default();
        let err = cfg
            .apply_env_from(|k| (k == "GEM_CRUSH_HEIGHT").then(|| "tall".to_string()))
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnv { key: "GEM_CRUSH_HEIGHT", .. }));
    }

    #[test]
    fn test_json_rejects_unknown_kind() {
        let err = GameConfig::from_json_str(r#"{"board":{"palette":["teal"]}}"#).unwrap_err();
        assert!(matches!(err, ConfigError::Json(_)));
    }

    #[test]
    fn test_missing_file_reports_path() {
        let err = GameConfig::load("/definitely/not/here.json").unwrap_err();
        assert!(err.to_string().contains("/definitely/not/here.json"));
    }
}
