//! Cache directory management.
//!
//! Every registry kind lives in one JSON file inside a shared directory:
//!
//! ```text
//! <cache_path>/
//! ├─ LOCK                      # Advisory lock for single-writer
//! ├─ game_registry.json
//! ├─ tournament_registry.json
//! ├─ player_registry.json
//! └─ announce_registry.json
//! ```
//!
//! The LOCK file keeps two mirror processes from rewriting the same files.

use crate::error::{RegistryError, RegistryResult};
use fs2::FileExt;
use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

const LOCK_FILE: &str = "LOCK";

/// Extension of registry backing files.
pub const REGISTRY_EXTENSION: &str = "json";

/// Holds an exclusive lock on a cache directory.
///
/// Only one `CacheDir` can exist per directory at a time; the lock is
/// released when the value is dropped.
#[derive(Debug)]
pub struct CacheDir {
    path: PathBuf,
    _lock_file: File,
}

impl CacheDir {
    /// Opens or creates a cache directory and takes its lock.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::Locked`] if another process holds the lock,
    /// or an I/O error if the directory cannot be created.
    pub fn open(path: &Path) -> RegistryResult<Self> {
        if !path.exists() {
            fs::create_dir_all(path)?;
        }

        if !path.is_dir() {
            return Err(RegistryError::Io(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                format!("cache path is not a directory: {}", path.display()),
            )));
        }

        let lock_file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(path.join(LOCK_FILE))?;

        if lock_file.try_lock_exclusive().is_err() {
            return Err(RegistryError::Locked);
        }

        Ok(Self {
            path: path.to_path_buf(),
            _lock_file: lock_file,
        })
    }

    /// Returns the directory path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns the backing file path for a registry name.
    #[must_use]
    pub fn registry_path(&self, name: &str) -> PathBuf {
        registry_file(&self.path, name)
    }
}

/// Path of the backing file for registry `name` inside `dir`.
#[must_use]
pub fn registry_file(dir: &Path, name: &str) -> PathBuf {
    dir.join(format!("{name}.{REGISTRY_EXTENSION}"))
}

/// Replaces `path` with `data` atomically.
///
/// Writes a sibling temporary file, syncs it, then renames it over the
/// target so a crash never leaves a half-written registry behind.
pub(crate) fn write_atomic(path: &Path, data: &[u8]) -> std::io::Result<()> {
    let mut temp_name = path.as_os_str().to_owned();
    temp_name.push(".tmp");
    let temp_path = PathBuf::from(temp_name);

    let mut file = File::create(&temp_path)?;
    file.write_all(data)?;
    file.sync_all()?;
    drop(file);

    fs::rename(&temp_path, path)?;
    sync_parent(path)
}

#[cfg(unix)]
fn sync_parent(path: &Path) -> std::io::Result<()> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => File::open(parent)?.sync_all(),
        _ => Ok(()),
    }
}

#[cfg(not(unix))]
fn sync_parent(_path: &Path) -> std::io::Result<()> {
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn creates_missing_directory() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("nested").join("cache");

        let dir = CacheDir::open(&path).unwrap();
        assert!(path.is_dir());
        assert_eq!(dir.path(), path);
    }

    #[test]
    fn second_open_is_locked() {
        let temp = tempdir().unwrap();
        let _dir = CacheDir::open(temp.path()).unwrap();

        let result = CacheDir::open(temp.path());
        assert!(matches!(result, Err(RegistryError::Locked)));
    }

    #[test]
    fn lock_released_on_drop() {
        let temp = tempdir().unwrap();
        {
            let _dir = CacheDir::open(temp.path()).unwrap();
        }
        let _again = CacheDir::open(temp.path()).unwrap();
    }

    #[test]
    fn registry_paths() {
        let temp = tempdir().unwrap();
        let dir = CacheDir::open(temp.path()).unwrap();
        assert_eq!(
            dir.registry_path("game_registry"),
            temp.path().join("game_registry.json")
        );
    }

    #[test]
    fn atomic_write_replaces_content() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("data.json");

        write_atomic(&path, b"[1]").unwrap();
        write_atomic(&path, b"[2]").unwrap();

        assert_eq!(fs::read(&path).unwrap(), b"[2]");
        assert!(!temp.path().join("data.json.tmp").exists());
    }

    #[test]
    fn file_in_place_of_directory() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("plain");
        fs::write(&path, b"x").unwrap();
        assert!(matches!(CacheDir::open(&path), Err(RegistryError::Io(_))));
    }
}
