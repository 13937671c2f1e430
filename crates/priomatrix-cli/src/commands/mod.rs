//! Subcommand implementations and the input plumbing they share.

pub mod config;
pub mod goals;
pub mod intent;
pub mod profile;
pub mod rank;
pub mod review;
pub mod tools;

use std::path::{Path, PathBuf};

use chrono::Duration;
use priomatrix_core::{
    Config, LifeProfileEngine, LifeProfileSnapshot, LongTermGoal, StorageRoot, TaskRecord,
};
use serde::de::DeserializeOwned;
use tracing::debug;

pub type CmdResult = Result<(), Box<dyn std::error::Error>>;

const CONFIG_FILE: &str = "config.toml";

/// Longest idle span accepted on the command line.
const MAX_HOURS: f64 = 24.0 * 365.0;

/// Global options resolved once per invocation.
pub struct Context {
    root: Option<PathBuf>,
}

impl Context {
    pub fn new(root: Option<PathBuf>) -> Self {
        Self { root }
    }

    /// `<root>/config.toml` with `--root`, else the user's config file.
    pub fn config_path(&self) -> Result<PathBuf, Box<dyn std::error::Error>> {
        match &self.root {
            Some(root) => Ok(root.join(CONFIG_FILE)),
            None => Ok(Config::default_path()?),
        }
    }

    /// With `--root`, `<root>/config.toml` when present and defaults
    /// otherwise, leaving the user's config directory untouched.
    pub fn config(&self) -> Result<Config, Box<dyn std::error::Error>> {
        let config = match &self.root {
            Some(_) => Config::load_if_exists(&self.config_path()?)?,
            None => Config::load()?,
        };
        Ok(config)
    }

    /// `--root` when given, else the configured root.
    pub fn storage_root(&self, config: &Config) -> Result<StorageRoot, Box<dyn std::error::Error>> {
        let root = match &self.root {
            Some(root) => StorageRoot::new(root.clone())?,
            None => config.storage_root()?,
        };
        debug!(root = %root.path().display(), "resolved storage root");
        Ok(root)
    }
}

pub fn read_json_file<T: DeserializeOwned>(path: &Path) -> Result<T, Box<dyn std::error::Error>> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| format!("cannot read {}: {e}", path.display()))?;
    let value = serde_json::from_str(&content)
        .map_err(|e| format!("invalid JSON in {}: {e}", path.display()))?;
    Ok(value)
}

pub fn load_tasks(path: &Path) -> Result<Vec<TaskRecord>, Box<dyn std::error::Error>> {
    read_json_file(path)
}

/// Goals file, or no goals when not given.
pub fn load_goals(path: Option<&Path>) -> Result<Vec<LongTermGoal>, Box<dyn std::error::Error>> {
    path.map_or_else(|| Ok(Vec::new()), read_json_file)
}

/// Life profile file, else the last derived profile under `root`, else
/// the neutral profile.
pub fn load_life_profile(
    path: Option<&Path>,
    root: &StorageRoot,
) -> Result<LifeProfileSnapshot, Box<dyn std::error::Error>> {
    match path {
        Some(path) => read_json_file(path),
        None => Ok(LifeProfileEngine::new(root).load_or_default()),
    }
}

pub fn print_json<T: serde::Serialize>(value: &T) -> CmdResult {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Hours given on the command line, capped at a year; negative or
/// non-finite reads as zero.
pub fn hours(value: f64) -> Duration {
    if value.is_finite() && value > 0.0 {
        Duration::minutes((value.min(MAX_HOURS) * 60.0).round() as i64)
    } else {
        Duration::zero()
    }
}
