use crate::domain::StoreError;
use crate::ports::BlobStore;
use std::collections::BTreeMap;
use std::io::Write;
use std::path::{Path, PathBuf};

#[cfg(feature = "locking")]
use crate::adapters::DataFileLock;

/// File-backed blob store.
///
/// Keeps every blob in memory and rewrites a single snapshot file on each
/// mutation. Suitable for shard stores holding a modest number of shards.
///
/// Snapshot format: `[key_len:u32 LE][key][value_len:u32 LE][value]...`.
/// A truncated trailing record (crash mid-write of an older format) is
/// ignored on load.
pub struct FileBackedBlobStore {
    data: BTreeMap<String, Vec<u8>>,
    path: PathBuf,
    #[cfg(feature = "locking")]
    _lock: DataFileLock,
}

impl FileBackedBlobStore {
    /// Open (or create) the store backed by `path`.
    ///
    /// # Errors
    ///
    /// Fails if the data file is locked by another store or cannot be read.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        let path = path.as_ref().to_path_buf();

        #[cfg(feature = "locking")]
        let lock = DataFileLock::acquire(&path)?;

        let data = match std::fs::read(&path) {
            Ok(bytes) => {
                let data = Self::decode(&bytes);
                tracing::info!(
                    "[ts-01] 💾 Loaded {} shards from {} ({} bytes)",
                    data.len(),
                    path.display(),
                    bytes.len()
                );
                data
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::info!("[ts-01] 📁 No existing data file at {}", path.display());
                BTreeMap::new()
            }
            Err(e) => return Err(e.into()),
        };

        Ok(Self {
            data,
            path,
            #[cfg(feature = "locking")]
            _lock: lock,
        })
    }

    /// Path of the snapshot file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn decode(bytes: &[u8]) -> BTreeMap<String, Vec<u8>> {
        let mut data = BTreeMap::new();
        let mut cursor = 0;

        while let Some((key, next)) = Self::read_field(bytes, cursor) {
            let Some((value, next)) = Self::read_field(bytes, next) else {
                break;
            };
            cursor = next;

            match String::from_utf8(key.to_vec()) {
                Ok(key) => {
                    data.insert(key, value.to_vec());
                }
                Err(_) => {
                    tracing::warn!("[ts-01] Skipping record with non UTF-8 key at offset {}", cursor);
                }
            }
        }

        data
    }

    fn read_field(bytes: &[u8], cursor: usize) -> Option<(&[u8], usize)> {
        let len_end = cursor.checked_add(4)?;
        let len = u32::from_le_bytes(bytes.get(cursor..len_end)?.try_into().ok()?) as usize;
        let end = len_end.checked_add(len)?;
        Some((bytes.get(len_end..end)?, end))
    }

    fn save_to_file(&self) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        let mut bytes = Vec::new();
        for (key, value) in &self.data {
            bytes.extend_from_slice(&(key.len() as u32).to_le_bytes());
            bytes.extend_from_slice(key.as_bytes());
            bytes.extend_from_slice(&(value.len() as u32).to_le_bytes());
            bytes.extend_from_slice(value);
        }

        // Write atomically via temp file
        let temp_path = self.path.with_extension("tmp");
        let mut file = std::fs::File::create(&temp_path)?;
        file.write_all(&bytes)?;
        file.sync_all()?;
        std::fs::rename(&temp_path, &self.path)?;

        Ok(())
    }
}

impl BlobStore for FileBackedBlobStore {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError> {
        Ok(self.data.get(key).cloned())
    }

    fn put(&mut self, key: String, value: Vec<u8>) -> Result<(), StoreError> {
        let previous = self.data.insert(key.clone(), value);
        if let Err(e) = self.save_to_file() {
            // Keep memory in step with disk
            match previous {
                Some(old) => self.data.insert(key, old),
                None => self.data.remove(&key),
            };
            return Err(e);
        }
        Ok(())
    }

    fn delete(&mut self, key: &str) -> Result<bool, StoreError> {
        let Some(previous) = self.data.remove(key) else {
            return Ok(false);
        };
        if let Err(e) = self.save_to_file() {
            self.data.insert(key.to_string(), previous);
            return Err(e);
        }
        Ok(true)
    }

    fn keys(&self) -> Result<Vec<String>, StoreError> {
        Ok(self.data.keys().cloned().collect())
    }

    fn len(&self) -> usize {
        self.data.len()
    }
}
