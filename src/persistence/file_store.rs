use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use super::{KeyValueStore, StoreError};

const STORAGE_DIR: &str = "hitbox-bongocat";
const STORAGE_FILE: &str = "storage.toml";

/// Key-value store persisted as a flat TOML table of strings.
///
/// The whole table is cached in memory and rewritten on every change. Writes only
/// happen on calibration completion, import, reset and colour changes, so the
/// file never sits in the per-frame path.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    entries: BTreeMap<String, String>,
}

impl FileStore {
    /// Opens the store at `path`. A missing file yields an empty store, an
    /// unparsable one is logged and treated as empty.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();

        let entries = if path.exists() {
            let content = fs::read_to_string(&path)
                .map_err(|e| StoreError::ReadError(format!("{}: {}", path.display(), e)))?;

            match toml::from_str::<BTreeMap<String, String>>(&content) {
                Ok(entries) => {
                    info!("Loaded {} stored entries from {}", entries.len(), path.display());
                    entries
                }
                Err(e) => {
                    warn!(
                        "Storage file {} is malformed, starting empty: {}",
                        path.display(),
                        e
                    );
                    BTreeMap::new()
                }
            }
        } else {
            debug!("No storage file at {}, starting empty", path.display());
            BTreeMap::new()
        };

        Ok(Self { path, entries })
    }

    /// `<config dir>/hitbox-bongocat/storage.toml`
    pub fn default_path() -> PathBuf {
        let mut path = get_config_dir();
        path.push(STORAGE_DIR);
        path.push(STORAGE_FILE);
        path
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn flush(&self) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent)
                    .map_err(|e| StoreError::WriteError(format!("{}: {}", parent.display(), e)))?;
            }
        }

        let content = toml::to_string_pretty(&self.entries)
            .map_err(|e| StoreError::SerializationError(e.to_string()))?;

        fs::write(&self.path, content)
            .map_err(|e| StoreError::WriteError(format!("{}: {}", self.path.display(), e)))?;

        debug!("Storage flushed to {}", self.path.display());
        Ok(())
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        self.entries.insert(key.to_string(), value.to_string());
        self.flush()
    }

    fn remove(&mut self, key: &str) -> Result<(), StoreError> {
        if self.entries.remove(key).is_some() {
            self.flush()?;
        }
        Ok(())
    }
}

/// Config directory of the current user, falling back to the home directory
/// and finally the working directory.
pub fn get_config_dir() -> PathBuf {
    dirs::config_dir()
        .or_else(dirs::home_dir)
        .unwrap_or_else(|| {
            warn!("Could not determine config directory, using current directory");
            PathBuf::from(".")
        })
}
