//! # Data File Lock
//!
//! Prevents two store processes from sharing one data file. Uses `fs2`
//! (flock on Unix, LockFile on Windows).

use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use fs2::FileExt;

use crate::domain::StoreError;

/// Exclusive lock beside a data file, released on drop.
pub struct DataFileLock {
    /// The lock file handle (kept open to maintain lock)
    file: File,
    /// Path to the lock file
    path: PathBuf,
}

impl DataFileLock {
    /// Acquire `<data_file>.lock` without waiting.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Locked` if another handle holds the lock.
    pub fn acquire(data_file: &Path) -> Result<Self, StoreError> {
        let path = Self::lock_path(data_file);
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        let mut file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(&path)?;

        file.try_lock_exclusive()
            .map_err(|_| StoreError::Locked { path: path.clone() })?;

        // PID is informational only
        file.set_len(0)?;
        writeln!(file, "{}", std::process::id())?;

        Ok(Self { file, path })
    }

    fn lock_path(data_file: &Path) -> PathBuf {
        let mut name = data_file.as_os_str().to_owned();
        name.push(".lock");
        PathBuf::from(name)
    }
}

impl Drop for DataFileLock {
    fn drop(&mut self) {
        let _ = FileExt::unlock(&self.file);
        let _ = std::fs::remove_file(&self.path);
    }
}
