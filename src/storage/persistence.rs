use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::debug;

use super::KeyValueStore;
use crate::error::StoreError;

const VALUE_EXTENSION: &str = "json";

/// Keeps each key in its own file under `base_path`.
#[derive(Debug)]
pub struct FileStore {
    base_path: PathBuf,
    // serializes writers so two saves never share a temp file
    write_lock: Mutex<()>,
}

impl FileStore {
    pub fn new(base_path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let base_path = base_path.as_ref().to_path_buf();

        // Create the base directory if it doesn't exist
        fs::create_dir_all(&base_path).map_err(|source| StoreError::Io {
            key: base_path.display().to_string(),
            source,
        })?;

        Ok(FileStore {
            base_path,
            write_lock: Mutex::new(()),
        })
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    fn value_path(&self, key: &str) -> PathBuf {
        self.base_path
            .join(format!("{}.{}", encode_key(key), VALUE_EXTENSION))
    }

    fn write_atomic(&self, path: &Path, value: &str) -> io::Result<()> {
        // Write to a temporary file first
        let temp_path = path.with_extension("tmp");
        let mut file = File::create(&temp_path)?;
        file.write_all(value.as_bytes())?;
        file.sync_all()?;

        // Rename temp file to final name (atomic operation on most filesystems)
        fs::rename(&temp_path, path)
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        match fs::read_to_string(self.value_path(key)) {
            Ok(text) => Ok(Some(text)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(source) => Err(StoreError::Io {
                key: key.to_string(),
                source,
            }),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let path = self.value_path(key);
        let _guard = self.write_lock.lock().map_err(|_| StoreError::Poisoned)?;
        self.write_atomic(&path, value)
            .map_err(|source| StoreError::Io {
                key: key.to_string(),
                source,
            })?;
        debug!(key, bytes = value.len(), "wrote value to disk");
        Ok(())
    }

    fn keys_with_prefix(&self, prefix: &str) -> Result<Vec<String>, StoreError> {
        let io_error = |source| StoreError::Io {
            key: prefix.to_string(),
            source,
        };
        let mut keys = Vec::new();

        for entry in fs::read_dir(&self.base_path).map_err(io_error)? {
            let path = entry.map_err(io_error)?.path();

            if path.extension().map_or(false, |ext| ext == VALUE_EXTENSION) {
                if let Some(key) = path
                    .file_stem()
                    .and_then(|stem| stem.to_str())
                    .and_then(decode_key)
                {
                    if key.starts_with(prefix) {
                        keys.push(key);
                    }
                }
            }
        }

        keys.sort();
        Ok(keys)
    }
}

/// Percent-encode everything outside `[A-Za-z0-9_.~-]`.
fn encode_key(key: &str) -> String {
    urlencoding::encode(key).into_owned()
}

fn decode_key(encoded: &str) -> Option<String> {
    urlencoding::decode(encoded).ok().map(|key| key.into_owned())
}
