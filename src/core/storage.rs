//! Persistence collaborator.
//!
//! The shell persists three logical values (filesystem tree, current path,
//! current user) as serialized strings under prefixed keys. Where they end
//! up depends on the [`Storage`] implementation:
//!
//! - [`MemoryStorage`] - process-local map (default, tests)
//! - [`JsonFileStorage`] - one JSON object file holding every key (native)
//! - [`LocalStorage`] - browser `localStorage` (wasm32)

use std::collections::BTreeMap;

use crate::config::storage_keys;
use crate::core::error::StorageError;

/// Key/value store for serialized session state.
pub trait Storage {
    /// Read a value, `None` if absent or unreadable.
    fn load(&self, key: &str) -> Option<String>;

    /// Store a value, replacing any previous one.
    fn save(&mut self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Remove a value. Removing an absent key succeeds.
    fn remove(&mut self, key: &str) -> Result<(), StorageError>;
}

// =============================================================================
// Keys
// =============================================================================

/// Fully qualified storage keys for one session.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StorageKeys {
    pub filesystem: String,
    pub current_path: String,
    pub current_user: String,
}

impl StorageKeys {
    /// Build keys as `<prefix>_<name>`.
    pub fn with_prefix(prefix: &str) -> Self {
        let key = |name: &str| format!("{}_{}", prefix, name);
        Self {
            filesystem: key(storage_keys::FILESYSTEM),
            current_path: key(storage_keys::CURRENT_PATH),
            current_user: key(storage_keys::CURRENT_USER),
        }
    }

    pub fn all(&self) -> [&str; 3] {
        [&self.filesystem, &self.current_path, &self.current_user]
    }
}

// =============================================================================
// In-memory
// =============================================================================

/// Storage that lives as long as the value does.
#[derive(Clone, Debug, Default)]
pub struct MemoryStorage {
    values: BTreeMap<String, String>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl Storage for MemoryStorage {
    fn load(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn save(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        self.values.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        self.values.remove(key);
        Ok(())
    }
}

// =============================================================================
// JSON file (native)
// =============================================================================

#[cfg(not(target_arch = "wasm32"))]
pub use file::JsonFileStorage;

#[cfg(not(target_arch = "wasm32"))]
mod file {
    use std::collections::BTreeMap;
    use std::fs;
    use std::io;
    use std::path::{Path, PathBuf};

    use super::Storage;
    use crate::core::error::StorageError;

    /// Stores every key in a single JSON object file.
    ///
    /// The file is read once on open and rewritten in full on every change.
    /// A missing or unreadable file starts out empty.
    #[derive(Debug)]
    pub struct JsonFileStorage {
        path: PathBuf,
        values: BTreeMap<String, String>,
    }

    impl JsonFileStorage {
        pub fn open(path: impl Into<PathBuf>) -> Self {
            let path = path.into();
            let values = match fs::read_to_string(&path) {
                Ok(text) => serde_json::from_str(&text).unwrap_or_else(|err| {
                    tracing::warn!(path = %path.display(), %err, "ignoring corrupt state file");
                    BTreeMap::new()
                }),
                Err(err) if err.kind() == io::ErrorKind::NotFound => BTreeMap::new(),
                Err(err) => {
                    tracing::warn!(path = %path.display(), %err, "ignoring unreadable state file");
                    BTreeMap::new()
                }
            };
            Self { path, values }
        }

        pub fn path(&self) -> &Path {
            &self.path
        }

        fn flush(&self, key: &str) -> Result<(), StorageError> {
            let text = serde_json::to_string_pretty(&self.values).map_err(|source| {
                StorageError::Serialize {
                    key: key.to_string(),
                    source,
                }
            })?;
            fs::write(&self.path, text).map_err(|err| StorageError::Write {
                key: key.to_string(),
                reason: err.to_string(),
            })
        }
    }

    impl Storage for JsonFileStorage {
        fn load(&self, key: &str) -> Option<String> {
            self.values.get(key).cloned()
        }

        fn save(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
            self.values.insert(key.to_string(), value.to_string());
            self.flush(key)
        }

        fn remove(&mut self, key: &str) -> Result<(), StorageError> {
            if self.values.remove(key).is_none() {
                return Ok(());
            }
            self.flush(key).map_err(|err| match err {
                StorageError::Write { key, reason } => StorageError::Remove { key, reason },
                other => other,
            })
        }
    }
}

// =============================================================================
// localStorage (wasm32)
// =============================================================================

#[cfg(target_arch = "wasm32")]
pub use browser::LocalStorage;

#[cfg(target_arch = "wasm32")]
mod browser {
    use super::Storage;
    use crate::core::error::StorageError;

    /// `None` when there is no window or storage is blocked (private mode).
    fn local_storage() -> Option<web_sys::Storage> {
        web_sys::window()?.local_storage().ok()?
    }

    /// Browser `localStorage`, looked up on every access.
    #[derive(Clone, Copy, Debug, Default)]
    pub struct LocalStorage;

    impl Storage for LocalStorage {
        fn load(&self, key: &str) -> Option<String> {
            local_storage()?.get_item(key).ok()?
        }

        fn save(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
            let storage = local_storage().ok_or(StorageError::Unavailable)?;
            storage
                .set_item(key, value)
                .map_err(|err| StorageError::Write {
                    key: key.to_string(),
                    reason: format!("{:?}", err),
                })
        }

        fn remove(&mut self, key: &str) -> Result<(), StorageError> {
            let storage = local_storage().ok_or(StorageError::Unavailable)?;
            storage
                .remove_item(key)
                .map_err(|err| StorageError::Remove {
                    key: key.to_string(),
                    reason: format!("{:?}", err),
                })
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
