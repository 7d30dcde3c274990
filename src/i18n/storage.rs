//! Durable storage for the user's language choice, and detection of the
//! language to start with.

use crate::i18n::{LanguageCode, StorageError};
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};
use tracing::{debug, info, warn};

/// Storage key holding the persisted language code.
pub const LANGUAGE_STORAGE_KEY: &str = "wasla_language";

/// String key/value storage that survives page loads.
pub trait PreferenceStorage: Send + Sync + fmt::Debug {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;
}

/// Process-local storage, used in tests and when no file is configured.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    values: Mutex<HashMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Storage pre-populated with one entry.
    pub fn with_value(key: &str, value: &str) -> Self {
        let storage = Self::new();
        storage
            .values
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.to_string(), value.to_string());
        storage
    }
}

impl PreferenceStorage for MemoryStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self
            .values
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.values
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Preferences kept in a flat JSON object on disk.
#[derive(Debug)]
pub struct FileStorage {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl FileStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_all(&self) -> Result<Map<String, Value>, StorageError> {
        let contents = match std::fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Map::new()),
            Err(source) => {
                return Err(StorageError::Io {
                    path: self.path.display().to_string(),
                    source,
                })
            }
        };

        serde_json::from_str(&contents).map_err(|source| StorageError::Corrupt {
            path: self.path.display().to_string(),
            source,
        })
    }
}

impl PreferenceStorage for FileStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self
            .read_all()?
            .get(key)
            .and_then(Value::as_str)
            .map(str::to_string))
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let _guard = self.write_lock.lock().unwrap_or_else(PoisonError::into_inner);
        let io_err = |source| StorageError::Io {
            path: self.path.display().to_string(),
            source,
        };

        let mut values = match self.read_all() {
            Ok(values) => values,
            Err(StorageError::Corrupt { .. }) => {
                warn!(
                    "Preference file {} is corrupt, starting from an empty one",
                    self.path.display()
                );
                Map::new()
            }
            Err(e) => return Err(e),
        };
        values.insert(key.to_string(), Value::String(value.to_string()));

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(io_err)?;
        }
        let serialized = serde_json::to_string_pretty(&values).map_err(|source| {
            StorageError::Corrupt {
                path: self.path.display().to_string(),
                source,
            }
        })?;
        std::fs::write(&self.path, serialized).map_err(io_err)
    }
}

/// Reads and writes the persisted language choice.
#[derive(Debug, Clone)]
pub struct LanguageDetector {
    storage: Arc<dyn PreferenceStorage>,
    default_language: LanguageCode,
}

impl LanguageDetector {
    pub fn new(storage: Arc<dyn PreferenceStorage>, default_language: LanguageCode) -> Self {
        Self {
            storage,
            default_language,
        }
    }

    pub fn default_language(&self) -> LanguageCode {
        self.default_language
    }

    /// The persisted language if it is supported; otherwise the default,
    /// which is persisted before returning.
    pub fn detect(&self) -> LanguageCode {
        match self.storage.get(LANGUAGE_STORAGE_KEY) {
            Ok(Some(stored)) => match stored.parse::<LanguageCode>() {
                Ok(language) => {
                    info!("Language loaded from storage: {}", language);
                    return language;
                }
                Err(_) => warn!("Ignoring unsupported stored language '{}'", stored),
            },
            Ok(None) => debug!("No language preference stored"),
            Err(e) => warn!("Could not read language preference: {}", e),
        }

        if let Err(e) = self.persist(self.default_language) {
            warn!("Could not persist default language: {}", e);
        } else {
            info!("Default language saved: {}", self.default_language);
        }
        self.default_language
    }

    pub fn persist(&self, language: LanguageCode) -> Result<(), StorageError> {
        self.storage.set(LANGUAGE_STORAGE_KEY, language.code())
    }

    /// `persist` on tokio's blocking pool. Storage may hit the disk, which
    /// must not stall the async workers.
    pub async fn persist_blocking(&self, language: LanguageCode) -> Result<(), StorageError> {
        let detector = self.clone();
        tokio::task::spawn_blocking(move || detector.persist(language)).await?
    }

    /// Raw stored value, for diagnostics.
    pub fn stored(&self) -> Option<String> {
        self.storage.get(LANGUAGE_STORAGE_KEY).ok().flatten()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn detector(storage: MemoryStorage) -> (Arc<MemoryStorage>, LanguageDetector) {
        let storage = Arc::new(storage);
        let detector = LanguageDetector::new(storage.clone(), LanguageCode::En);
        (storage, detector)
    }

    #[test]
    fn test_detect_fresh_storage_persists_default() {
        let (storage, detector) = detector(MemoryStorage::new());
        assert_eq!(detector.detect(), LanguageCode::En);
        assert_eq!(
            storage.get(LANGUAGE_STORAGE_KEY).unwrap().as_deref(),
            Some("en")
        );
    }

    #[test]
    fn test_detect_stored_arabic() {
        let (_, detector) = detector(MemoryStorage::with_value(LANGUAGE_STORAGE_KEY, "ar"));
        assert_eq!(detector.detect(), LanguageCode::Ar);
    }

    #[test]
    fn test_detect_invalid_value_replaced() {
        let (storage, detector) = detector(MemoryStorage::with_value(LANGUAGE_STORAGE_KEY, "fr"));
        assert_eq!(detector.detect(), LanguageCode::En);
        assert_eq!(
            storage.get(LANGUAGE_STORAGE_KEY).unwrap().as_deref(),
            Some("en")
        );
    }

    #[test]
    fn test_file_storage_roundtrip() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nested").join("prefs.json");
        let storage = FileStorage::new(&path);

        assert_eq!(storage.get(LANGUAGE_STORAGE_KEY).unwrap(), None);
        storage.set(LANGUAGE_STORAGE_KEY, "ar").unwrap();
        storage.set("other", "value").unwrap();

        let reopened = FileStorage::new(&path);
        assert_eq!(
            reopened.get(LANGUAGE_STORAGE_KEY).unwrap().as_deref(),
            Some("ar")
        );
        assert_eq!(reopened.get("other").unwrap().as_deref(), Some("value"));
    }

    #[test]
    fn test_file_storage_corrupt_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("prefs.json");
        std::fs::write(&path, "not json").unwrap();
        let storage = FileStorage::new(&path);

        assert!(matches!(
            storage.get(LANGUAGE_STORAGE_KEY),
            Err(StorageError::Corrupt { .. })
        ));

        // A write replaces the corrupt file
        storage.set(LANGUAGE_STORAGE_KEY, "en").unwrap();
        assert_eq!(
            storage.get(LANGUAGE_STORAGE_KEY).unwrap().as_deref(),
            Some("en")
        );
    }

    #[test]
    fn test_detector_with_corrupt_file_falls_back() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("prefs.json");
        std::fs::write(&path, "[").unwrap();
        let detector = LanguageDetector::new(Arc::new(FileStorage::new(&path)), LanguageCode::En);

        assert_eq!(detector.detect(), LanguageCode::En);
        assert_eq!(detector.stored().as_deref(), Some("en"));
    }
}
