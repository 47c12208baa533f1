//! Engine configuration, loaded once when a story's engine is built.
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Pages a SCENE-scoped promise may stay tracked before it expires.
pub const DEFAULT_SCENE_PROMISE_EXPIRY: u32 = 4;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("RON deserialization error: {0}")]
    Ron(#[from] ron::error::SpannedError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// A SCENE promise whose age exceeds this is dropped. `None` disables
    /// expiry.
    pub scene_promise_expiry: Option<u32>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            scene_promise_expiry: Some(DEFAULT_SCENE_PROMISE_EXPIRY),
        }
    }
}

impl EngineConfig {
    /// Load a configuration from a RON file.
    pub fn load_from_ron(path: &Path) -> Result<EngineConfig, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse_ron(&contents)
    }

    /// Parse a configuration from a RON string. Missing fields keep their
    /// defaults.
    pub fn parse_ron(input: &str) -> Result<EngineConfig, ConfigError> {
        Ok(ron::from_str(input)?)
    }
}
