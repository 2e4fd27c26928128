use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use super::{Storage, StorageError};

/// File-backed storage that survives process restarts.
///
/// All keys live in a single JSON object on disk:
///
/// ```json
/// {
///   "epCredentials": "{\"access_token\":\"...\",\"expires\":1700000000,\"client_id\":\"...\"}",
///   "epCart": "0f3c..."
/// }
/// ```
///
/// The file is the only copy of the data. Reads go to disk, and every write
/// re-reads the file, applies the change and replaces the file through a
/// uniquely named temporary sibling and a rename. Several handles on one
/// path, in this process or another, see each other's keys and readers never
/// see a partially written record.
#[derive(Debug)]
pub struct LocalStorage {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl LocalStorage {
    /// Opens (or lazily creates) the store at `path`.
    ///
    /// A missing file starts an empty store. A file that exists but cannot be
    /// parsed is ignored with a warning and overwritten on the next write.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Io`] if the file exists but cannot be read.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let path = path.into();
        Self::load(&path)?;
        Ok(Self {
            path,
            write_lock: Mutex::new(()),
        })
    }

    /// Returns the path of the backing file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(path: &Path) -> Result<HashMap<String, String>, StorageError> {
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(HashMap::new()),
            Err(e) => return Err(e.into()),
        };

        match serde_json::from_str(&content) {
            Ok(entries) => Ok(entries),
            Err(e) => {
                tracing::warn!(
                    "Ignoring unreadable storage file {}: {}",
                    path.display(),
                    e
                );
                Ok(HashMap::new())
            }
        }
    }

    fn persist(&self, entries: &HashMap<String, String>) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_vec_pretty(entries)?;
        let tmp = self
            .path
            .with_extension(format!("{:08x}.tmp", rand::random::<u32>()));
        if let Err(e) = fs::write(&tmp, content).and_then(|()| fs::rename(&tmp, &self.path)) {
            let _ = fs::remove_file(&tmp);
            return Err(e.into());
        }
        Ok(())
    }

    fn update(&self, f: impl FnOnce(&mut HashMap<String, String>)) -> Result<(), StorageError> {
        let _guard = self
            .write_lock
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        let mut entries = Self::load(&self.path)?;
        f(&mut entries);
        self.persist(&entries)
    }
}

impl Storage for LocalStorage {
    fn get(&self, key: &str) -> Option<String> {
        match Self::load(&self.path) {
            Ok(mut entries) => entries.remove(key),
            Err(e) => {
                tracing::warn!("Failed to read storage file {}: {}", self.path.display(), e);
                None
            }
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.update(|entries| {
            entries.insert(key.to_string(), value.to_string());
        })
    }

    fn delete(&self, key: &str) -> Result<(), StorageError> {
        self.update(|entries| {
            entries.remove(key);
        })
    }
}
