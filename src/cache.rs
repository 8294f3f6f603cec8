//! Last-known IP cache backed by a plain-text file.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::error::{Result, SyncError};

/// The last confirmed-applied IP, held in memory and mirrored to a file.
///
/// The file holds exactly the IP string, nothing else; content is
/// whitespace-trimmed on load and written without a trailing newline.
/// There is no locking: the cache assumes at most one process instance
/// runs at a time.
#[derive(Debug)]
pub struct IpCache {
    path: PathBuf,
    value: Option<String>,
}

impl IpCache {
    /// Load the cache from an existing file.
    ///
    /// Fails with [`SyncError::CacheLoad`] if the file does not exist.
    pub fn load(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();

        let contents = match fs::read_to_string(&path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(SyncError::CacheLoad(format!(
                    "{} does not exist",
                    path.display()
                )));
            }
            Err(e) => return Err(e.into()),
        };

        Ok(Self {
            path,
            value: Some(contents.trim().to_string()),
        })
    }

    /// Create a new cache file, which must not already exist.
    ///
    /// Writes `initial` if given, otherwise leaves the file empty. Missing
    /// parent directories are created first so the default per-user cache
    /// location works on a fresh machine.
    pub fn create(path: impl Into<PathBuf>, initial: Option<&str>) -> Result<Self> {
        let path = path.into();

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent)?;
            }
        }

        let mut file = match fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
        {
            Ok(file) => file,
            Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {
                return Err(SyncError::CacheCreation(format!(
                    "{} already exists",
                    path.display()
                )));
            }
            Err(e) => return Err(e.into()),
        };

        if let Some(value) = initial {
            file.write_all(value.as_bytes())?;
        }

        Ok(Self {
            path,
            value: initial.map(str::to_string),
        })
    }

    /// The in-memory value, if any.
    pub fn value(&self) -> Option<&str> {
        self.value.as_deref()
    }

    /// The backing file location.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Compare a value against the in-memory value.
    ///
    /// With `update` set, a differing `value` replaces the in-memory value;
    /// the file is not touched either way.
    pub fn compare(&mut self, value: &str, update: bool) -> bool {
        let same = self.value.as_deref() == Some(value);

        if update && !same {
            self.value = Some(value.to_string());
        }

        same
    }

    /// Set the in-memory value; with `save` set, persist it immediately.
    pub fn update(&mut self, value: impl Into<String>, save: bool) -> Result<()> {
        self.value = Some(value.into());

        if save {
            self.save()?;
        }

        Ok(())
    }

    /// Write the in-memory value to the backing file, overwriting it.
    ///
    /// Fails with [`SyncError::CacheCreation`] if no value has been set.
    pub fn save(&self) -> Result<()> {
        let value = self.value.as_ref().ok_or_else(|| {
            SyncError::CacheCreation(format!("no value to save to {}", self.path.display()))
        })?;

        fs::write(&self.path, value)?;
        Ok(())
    }
}
