//! TOML-based application configuration.
//!
//! Stores user preferences including:
//! - Storage root override for strategy artifacts and profile state
//! - Decision engine weights
//! - Weekly review thresholds
//! - Thinking tool advisor limits
//!
//! Configuration is stored at `~/.config/priomatrix/config.toml`.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use super::{data_dir, ensure_dir, StorageRoot};
use crate::decision::DecisionEngineOptions;
use crate::error::{ConfigError, Result};

/// Weekly review configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReviewConfig {
    /// Days without progress before an active task counts as stalled.
    #[serde(default = "default_stalled_after_days")]
    pub stalled_after_days: u32,
    /// Ranked tasks copied into the report's focus list.
    #[serde(default = "default_top_focus_count")]
    pub top_focus_count: usize,
}

/// Thinking tool advisor configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdvisorConfig {
    #[serde(default = "default_max_tools")]
    pub max_tools: usize,
}

/// Intent recognizer configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntentConfig {
    /// Likelihood at or above which text is treated as a task.
    #[serde(default = "default_task_threshold")]
    pub task_threshold: f64,
}

/// Application configuration.
///
/// Serialized to/from TOML at `~/.config/priomatrix/config.toml`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Config {
    /// Storage root for strategy artifacts. Defaults to the data directory.
    #[serde(default)]
    pub storage_root: Option<String>,
    #[serde(default)]
    pub decision: DecisionEngineOptions,
    #[serde(default)]
    pub review: ReviewConfig,
    #[serde(default)]
    pub advisor: AdvisorConfig,
    #[serde(default)]
    pub intent: IntentConfig,
}

const MAX_STALLED_AFTER_DAYS: u32 = 3650;

fn default_stalled_after_days() -> u32 {
    3
}
fn default_top_focus_count() -> usize {
    5
}
fn default_max_tools() -> usize {
    3
}
fn default_task_threshold() -> f64 {
    0.55
}

impl Default for ReviewConfig {
    fn default() -> Self {
        Self {
            stalled_after_days: default_stalled_after_days(),
            top_focus_count: default_top_focus_count(),
        }
    }
}

impl Default for AdvisorConfig {
    fn default() -> Self {
        Self {
            max_tools: default_max_tools(),
        }
    }
}

impl Default for IntentConfig {
    fn default() -> Self {
        Self {
            task_threshold: default_task_threshold(),
        }
    }
}

impl Config {
    fn get_json_value_by_path<'a>(
        root: &'a serde_json::Value,
        key: &str,
    ) -> Option<&'a serde_json::Value> {
        if key.is_empty() {
            return None;
        }

        let mut current = root;
        for part in key.split('.') {
            current = current.get(part)?;
        }
        Some(current)
    }

    fn set_json_value_by_path(
        root: &mut serde_json::Value,
        key: &str,
        value: &str,
    ) -> Result<(), ConfigError> {
        let unknown = || ConfigError::UnknownKey(key.to_string());
        let invalid = |message: String| ConfigError::InvalidValue {
            key: key.to_string(),
            message,
        };

        let mut parts = key.split('.').peekable();
        if parts.peek().map_or(true, |p| p.is_empty()) {
            return Err(unknown());
        }

        let mut current = root;
        while let Some(part) = parts.next() {
            let is_leaf = parts.peek().is_none();
            if is_leaf {
                let obj = current.as_object_mut().ok_or_else(unknown)?;
                let existing = obj.get(part).ok_or_else(unknown)?;

                let new_value = match existing {
                    serde_json::Value::Bool(_) => serde_json::Value::Bool(
                        value.parse::<bool>().map_err(|e| invalid(e.to_string()))?,
                    ),
                    serde_json::Value::Number(_) => {
                        if let Ok(n) = value.parse::<u64>() {
                            serde_json::Value::Number(n.into())
                        } else if let Ok(n) = value.parse::<f64>() {
                            serde_json::Number::from_f64(n)
                                .map(serde_json::Value::Number)
                                .ok_or_else(|| invalid(format!("cannot parse '{value}' as number")))?
                        } else {
                            return Err(invalid(format!("cannot parse '{value}' as number")));
                        }
                    }
                    serde_json::Value::Object(_) | serde_json::Value::Array(_) => {
                        serde_json::from_str(value).map_err(|e| invalid(e.to_string()))?
                    }
                    _ => serde_json::Value::String(value.into()),
                };

                obj.insert(part.to_string(), new_value);
                return Ok(());
            }

            current = current.get_mut(part).ok_or_else(unknown)?;
        }

        Err(unknown())
    }

    /// Default location of `config.toml`.
    pub fn default_path() -> Result<PathBuf> {
        Ok(data_dir()?.join("config.toml"))
    }

    /// Load from the default location, writing defaults if absent.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::default_path()?)
    }

    /// Load from `path` or create it with defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be parsed,
    /// or if the default config cannot be written to disk.
    pub fn load_from(path: &Path) -> Result<Self> {
        match std::fs::read_to_string(path) {
            Ok(content) => {
                let cfg: Config = toml::from_str(&content).map_err(|e| ConfigError::LoadFailed {
                    path: path.to_path_buf(),
                    message: e.to_string(),
                })?;
                Ok(cfg)
            }
            Err(_) => {
                let cfg = Self::default();
                cfg.save_to(path)?;
                Ok(cfg)
            }
        }
    }

    /// Read `path` when it exists, defaults otherwise. Never writes.
    pub fn load_if_exists(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        Self::load_from(path)
    }

    /// Persist to the default location.
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::default_path()?)
    }

    /// Persist to `path`.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        let save_failed = |message: String| ConfigError::SaveFailed {
            path: path.to_path_buf(),
            message,
        };
        let content = toml::to_string_pretty(self).map_err(|e| save_failed(e.to_string()))?;
        if let Some(parent) = path.parent() {
            ensure_dir(parent)?;
        }
        std::fs::write(path, content).map_err(|e| save_failed(e.to_string()))?;
        Ok(())
    }

    /// Resolve the storage root: explicit setting or the data directory.
    pub fn storage_root(&self) -> Result<StorageRoot> {
        match self.storage_root.as_deref() {
            Some(root) if !root.trim().is_empty() => StorageRoot::new(root.trim()),
            _ => StorageRoot::new(data_dir()?),
        }
    }

    /// Get a config value as string by dot-separated key.
    pub fn get(&self, key: &str) -> Option<String> {
        let json = serde_json::to_value(self).ok()?;
        let val = Self::get_json_value_by_path(&json, key)?;
        match val {
            serde_json::Value::String(s) => Some(s.clone()),
            serde_json::Value::Null => Some(String::new()),
            other => Some(other.to_string()),
        }
    }

    /// Set a config value by dot-separated key, validating the result.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        let mut json = serde_json::to_value(&*self).map_err(|e| ConfigError::InvalidValue {
            key: key.to_string(),
            message: e.to_string(),
        })?;
        Self::set_json_value_by_path(&mut json, key, value)?;

        let updated: Config =
            serde_json::from_value(json).map_err(|e| ConfigError::InvalidValue {
                key: key.to_string(),
                message: e.to_string(),
            })?;
        updated.validate()?;
        *self = updated;
        Ok(())
    }

    /// Reject negative or non-finite weights, thresholds outside [0, 1] and
    /// stall windows outside 1..=3650 days.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, weight) in self.decision.named_weights() {
            if !weight.is_finite() || weight < 0.0 {
                return Err(ConfigError::InvalidValue {
                    key: format!("decision.{name}"),
                    message: format!("weight must be a non-negative number, got {weight}"),
                });
            }
        }
        if !(0.0..=1.0).contains(&self.intent.task_threshold) {
            return Err(ConfigError::InvalidValue {
                key: "intent.task_threshold".into(),
                message: format!("must be in [0, 1], got {}", self.intent.task_threshold),
            });
        }
        if !(1..=MAX_STALLED_AFTER_DAYS).contains(&self.review.stalled_after_days) {
            return Err(ConfigError::InvalidValue {
                key: "review.stalled_after_days".into(),
                message: format!(
                    "must be between 1 and {MAX_STALLED_AFTER_DAYS}, got {}",
                    self.review.stalled_after_days
                ),
            });
        }
        Ok(())
    }
}
