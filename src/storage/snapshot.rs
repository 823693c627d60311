//! Whole-table JSON snapshot files
//!
//! A snapshot holds one keyed table and is rewritten in full on every save.
//! Writers hold an exclusive lock on a sidecar `.lock` file while they fill
//! a temp file and rename it over the target, so saves from several
//! processes never interleave and readers only ever see a whole document.
//! Concurrent saves from separate processes are last-writer-wins.

use std::fs::{self, OpenOptions};
use std::io::{BufWriter, Write};
use std::marker::PhantomData;
use std::path::{Path, PathBuf};

use fs2::FileExt;
use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid snapshot {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to serialize snapshot: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// A JSON file holding a table of type `T`
#[derive(Debug, Clone)]
pub struct SnapshotFile<T> {
    path: PathBuf,
    _table: PhantomData<fn() -> T>,
}

impl<T> SnapshotFile<T>
where
    T: Serialize + DeserializeOwned + Default,
{
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            _table: PhantomData,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn lock_path(&self) -> PathBuf {
        self.path.with_extension("json.lock")
    }

    /// Reads the table; a missing file is an empty table
    pub fn load(&self) -> Result<T, StoreError> {
        if !self.path.exists() {
            return Ok(T::default());
        }

        let content = fs::read_to_string(&self.path).map_err(|source| StoreError::Read {
            path: self.path.clone(),
            source,
        })?;

        serde_json::from_str(&content).map_err(|source| StoreError::Parse {
            path: self.path.clone(),
            source,
        })
    }

    /// Loads the table, logging and discarding anything unreadable
    pub fn load_or_default(&self) -> T {
        match self.load() {
            Ok(table) => {
                tracing::debug!(path = %self.path.display(), "Loaded snapshot");
                table
            }
            Err(e) => {
                tracing::warn!(error = %e, "Could not load snapshot, starting empty");
                T::default()
            }
        }
    }

    /// Replaces the file with `table`, pretty-printed
    pub fn save(&self, table: &T) -> Result<(), StoreError> {
        let json = serde_json::to_string_pretty(table)?;
        let write_err = |source| StoreError::Write {
            path: self.path.clone(),
            source,
        };

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(write_err)?;
        }

        let lock = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(false)
            .open(self.lock_path())
            .map_err(write_err)?;
        lock.lock_exclusive().map_err(write_err)?;

        let temp_path = self.path.with_extension("json.tmp");
        {
            let file = OpenOptions::new()
                .write(true)
                .create(true)
                .truncate(true)
                .open(&temp_path)
                .map_err(write_err)?;

            let mut writer = BufWriter::new(&file);
            writer.write_all(json.as_bytes()).map_err(write_err)?;
            writer.flush().map_err(write_err)?;
        }

        // The lock is released when `lock` drops, after the rename
        fs::rename(&temp_path, &self.path).map_err(write_err)
    }
}
