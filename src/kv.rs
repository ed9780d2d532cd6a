//! Persistent key/value storage for engine settings.
//!
//! The host application owns the real store; [`FileKeyValueStore`] keeps a
//! flat JSON object in `~/.nomie/storage.json` (or a custom directory) for the
//! CLI, and [`MemoryKeyValueStore`] is used by embedders that persist
//! elsewhere and by tests.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::{Context, Result};
use tracing::{debug, warn};

/// File name used inside the config directory.
const STORE_FILE: &str = "storage.json";

/// String key/value store.
///
/// `set_many` and `remove_many` apply all keys together: a reader never
/// observes some of the keys updated and others not.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set_many(&self, entries: &[(&str, &str)]) -> Result<()>;
    fn remove_many(&self, keys: &[&str]) -> Result<()>;
}

/// Resolve the default config directory (`~/.nomie`).
pub fn default_config_dir() -> Result<PathBuf> {
    Ok(dirs::home_dir()
        .context("Could not determine home directory")?
        .join(".nomie"))
}

/// JSON-file backed store.
pub struct FileKeyValueStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileKeyValueStore {
    /// Create a store in `config_dir`, defaulting to `~/.nomie`.
    pub fn new(config_dir: Option<PathBuf>) -> Result<Self> {
        let base_dir = match config_dir {
            Some(dir) => dir,
            None => default_config_dir()?,
        };

        std::fs::create_dir_all(&base_dir)
            .with_context(|| format!("Failed to create config directory: {:?}", base_dir))?;

        Ok(Self {
            path: base_dir.join(STORE_FILE),
            lock: Mutex::new(()),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_map(&self) -> Result<BTreeMap<String, String>> {
        if !self.path.exists() {
            return Ok(BTreeMap::new());
        }

        let content = std::fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read store file: {:?}", self.path))?;

        match serde_json::from_str(&content) {
            Ok(map) => Ok(map),
            Err(e) => {
                warn!("Ignoring unreadable store file {:?}: {}", self.path, e);
                Ok(BTreeMap::new())
            }
        }
    }

    /// Write through a sibling temp file and rename it over the original.
    fn write_map(&self, map: &BTreeMap<String, String>) -> Result<()> {
        let content = serde_json::to_string_pretty(map).context("Failed to serialize store")?;
        let tmp = self.path.with_extension("json.tmp");

        std::fs::write(&tmp, content)
            .with_context(|| format!("Failed to write store file: {:?}", tmp))?;
        std::fs::rename(&tmp, &self.path)
            .with_context(|| format!("Failed to replace store file: {:?}", self.path))?;

        debug!("Store written to {:?}", self.path);
        Ok(())
    }

    fn with_lock<T>(&self, f: impl FnOnce() -> Result<T>) -> Result<T> {
        let _guard = self
            .lock
            .lock()
            .map_err(|_| anyhow::anyhow!("Store lock poisoned"))?;
        f()
    }
}

impl KeyValueStore for FileKeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        self.with_lock(|| Ok(self.read_map()?.get(key).cloned()))
    }

    fn set_many(&self, entries: &[(&str, &str)]) -> Result<()> {
        self.with_lock(|| {
            let mut map = self.read_map()?;
            for (key, value) in entries {
                map.insert((*key).to_string(), (*value).to_string());
            }
            self.write_map(&map)
        })
    }

    fn remove_many(&self, keys: &[&str]) -> Result<()> {
        self.with_lock(|| {
            let mut map = self.read_map()?;
            let before = map.len();
            map.retain(|k, _| !keys.contains(&k.as_str()));
            if map.len() == before {
                return Ok(());
            }
            self.write_map(&map)
        })
    }
}

/// In-process store.
#[derive(Debug, Default)]
pub struct MemoryKeyValueStore {
    map: Mutex<BTreeMap<String, String>>,
}

impl MemoryKeyValueStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn map(&self) -> Result<std::sync::MutexGuard<'_, BTreeMap<String, String>>> {
        self.map
            .lock()
            .map_err(|_| anyhow::anyhow!("Store lock poisoned"))
    }
}

impl KeyValueStore for MemoryKeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.map()?.get(key).cloned())
    }

    fn set_many(&self, entries: &[(&str, &str)]) -> Result<()> {
        let mut map = self.map()?;
        for (key, value) in entries {
            map.insert((*key).to_string(), (*value).to_string());
        }
        Ok(())
    }

    fn remove_many(&self, keys: &[&str]) -> Result<()> {
        let mut map = self.map()?;
        for key in keys {
            map.remove(*key);
        }
        Ok(())
    }
}
