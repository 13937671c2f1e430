mod config;

pub use config::{AdvisorConfig, Config, IntentConfig, ReviewConfig};

use std::fs;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::{Result, StorageError, ValidationError};

/// Returns `~/.config/priomatrix[-dev]/` based on PRIOMATRIX_ENV.
///
/// Set PRIOMATRIX_ENV=dev to use development data directory.
///
/// # Errors
/// Returns an error if the home directory is unknown or creating the
/// config directory fails.
pub fn data_dir() -> Result<PathBuf> {
    let base_dir = dirs::home_dir()
        .ok_or_else(|| StorageError::DataDirUnavailable("home directory not found".into()))?
        .join(".config");

    let env = std::env::var("PRIOMATRIX_ENV").unwrap_or_else(|_| "production".to_string());

    let dir = if env == "dev" {
        base_dir.join("priomatrix-dev")
    } else {
        base_dir.join("priomatrix")
    };

    ensure_dir(&dir)?;
    Ok(dir)
}

/// Validated root directory under which every engine keeps its files.
///
/// Construction only checks that the path is non-empty; directories are
/// created on first write so that read-only queries never touch the disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageRoot {
    path: PathBuf,
}

impl StorageRoot {
    /// Wrap a path, rejecting empty ones.
    pub fn new(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        if path.as_os_str().is_empty() {
            return Err(ValidationError::EmptyStorageRoot.into());
        }
        Ok(Self { path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// `<root>/strategy`
    pub fn strategy_dir(&self) -> PathBuf {
        self.path.join("strategy")
    }

    /// `<root>/profile`
    pub fn profile_dir(&self) -> PathBuf {
        self.path.join("profile")
    }
}

pub(crate) fn ensure_dir(dir: &Path) -> Result<()> {
    fs::create_dir_all(dir).map_err(|source| StorageError::CreateDirFailed {
        path: dir.to_path_buf(),
        source,
    })?;
    Ok(())
}

/// Write `content` to `path` via a sibling temp file and a rename, so a crash
/// mid-write never leaves a truncated file behind.
pub fn write_atomic(path: &Path, content: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent() {
        ensure_dir(parent)?;
    }

    let temp_path = path.with_extension("tmp");
    fs::write(&temp_path, content).map_err(|source| StorageError::WriteFailed {
        path: temp_path.clone(),
        source,
    })?;

    if let Err(source) = fs::rename(&temp_path, path) {
        let _ = fs::remove_file(&temp_path);
        return Err(StorageError::WriteFailed {
            path: path.to_path_buf(),
            source,
        }
        .into());
    }

    Ok(())
}

/// Serialize `value` as pretty JSON and write it atomically.
pub fn write_json_atomic<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let content =
        serde_json::to_string_pretty(value).map_err(|source| StorageError::SerializeFailed {
            what: path.display().to_string(),
            source,
        })?;
    write_atomic(path, content.as_bytes())
}

/// Read and decode a JSON file; `Ok(None)` when it does not exist yet.
pub fn read_json<T: DeserializeOwned>(path: &Path) -> Result<Option<T>> {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(source) => {
            return Err(StorageError::ReadFailed {
                path: path.to_path_buf(),
                source,
            }
            .into())
        }
    };

    let value = serde_json::from_str(&content).map_err(|source| StorageError::Corrupt {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(Some(value))
}
