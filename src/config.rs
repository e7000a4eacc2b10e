//! Engine configuration persistence
//!
//! Stores settings in `~/.config/chordmap/config.yaml`

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::keymap::{KeymapError, MergePolicy, Platform};

/// Settings for building and driving a matcher
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// How long an ambiguous sequence waits for another key
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// Platform whose override table is applied; detected when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub platform: Option<String>,

    /// Reject duplicate sequences within one keymap layer
    #[serde(default)]
    pub strict: bool,
}

fn default_timeout_ms() -> u64 {
    crate::keymap::DEFAULT_TIMEOUT.as_millis() as u64
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            timeout_ms: default_timeout_ms(),
            platform: None,
            strict: false,
        }
    }
}

impl EngineConfig {
    /// Load config from disk, or return defaults if not found
    pub fn load() -> Self {
        let Some(path) = crate::config_paths::config_file() else {
            tracing::debug!("No config directory available, using defaults");
            return Self::default();
        };
        Self::load_from(&path)
    }

    /// Load config from a specific file, falling back to defaults
    pub fn load_from(path: &Path) -> Self {
        if !path.exists() {
            tracing::debug!(
                "Config file not found at {}, using defaults",
                path.display()
            );
            return Self::default();
        }

        match std::fs::read_to_string(path) {
            Ok(content) => match serde_yaml::from_str(&content) {
                Ok(config) => {
                    tracing::info!("Loaded config from {}", path.display());
                    config
                }
                Err(e) => {
                    tracing::warn!("Failed to parse config at {}: {}", path.display(), e);
                    Self::default()
                }
            },
            Err(e) => {
                tracing::warn!("Failed to read config at {}: {}", path.display(), e);
                Self::default()
            }
        }
    }

    /// Save config to disk
    ///
    /// Creates the config directory if it doesn't exist.
    pub fn save(&self) -> Result<(), String> {
        let path = crate::config_paths::config_file()
            .ok_or_else(|| "No config directory available".to_string())?;
        self.save_to(&path)
    }

    pub fn save_to(&self, path: &Path) -> Result<(), String> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| format!("Failed to create config directory: {}", e))?;
        }

        let content = serde_yaml::to_string(self)
            .map_err(|e| format!("Failed to serialize config: {}", e))?;

        std::fs::write(path, content)
            .map_err(|e| format!("Failed to write config to {}: {}", path.display(), e))?;

        tracing::info!("Saved config to {}", path.display());
        Ok(())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// The configured platform, or the one we were compiled for
    pub fn platform(&self) -> Result<Platform, KeymapError> {
        match &self.platform {
            Some(name) => name
                .parse()
                .map_err(|_| KeymapError::InvalidPlatform(name.clone())),
            None => Ok(Platform::current()),
        }
    }

    pub fn policy(&self) -> MergePolicy {
        if self.strict {
            MergePolicy::Strict
        } else {
            MergePolicy::LastWins
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = EngineConfig::default();
        assert_eq!(config.timeout(), Duration::from_millis(1000));
        assert_eq!(config.platform().unwrap(), Platform::current());
        assert_eq!(config.policy(), MergePolicy::LastWins);
    }

    #[test]
    fn test_missing_fields_use_defaults() {
        let config: EngineConfig = serde_yaml::from_str("strict: true\n").unwrap();
        assert_eq!(config.timeout_ms, 1000);
        assert!(config.platform.is_none());
        assert_eq!(config.policy(), MergePolicy::Strict);
    }

    #[test]
    fn test_platform_names() {
        let config = EngineConfig {
            platform: Some("macos".to_string()),
            ..Default::default()
        };
        assert_eq!(config.platform().unwrap(), Platform::Mac);

        let config = EngineConfig {
            platform: Some("beos".to_string()),
            ..Default::default()
        };
        assert_eq!(
            config.platform(),
            Err(KeymapError::InvalidPlatform("beos".to_string()))
        );
    }
}
