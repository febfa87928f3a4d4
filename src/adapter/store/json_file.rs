//! JSON-file store: one pretty-printed file per collection.
//!
//! Commits stage every file of the batch as `<key>.json.tmp` and only
//! start renaming once all of them were written, so a failed serialize or
//! write leaves every collection untouched. The renames themselves are not
//! atomic as a group: if one fails, the collections already renamed are
//! logged and the remaining staged files are discarded.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde_json::Value;
use tracing::{debug, error};

use crate::error::{Result, StoreError};
use crate::port::{Collection, Store, WriteBatch};

/// Store rooted at a data directory.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    dir: PathBuf,
}

fn io_error(path: &Path, source: io::Error) -> StoreError {
    StoreError::Io {
        path: path.to_path_buf(),
        source,
    }
}

impl JsonFileStore {
    /// Open a store in `dir`, creating the directory if needed.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir).map_err(|e| io_error(&dir, e))?;
        Ok(Self { dir })
    }

    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// File holding `collection`.
    #[must_use]
    pub fn path_for(&self, collection: Collection) -> PathBuf {
        self.dir.join(format!("{}.json", collection.key()))
    }

    fn staging_path(&self, collection: Collection) -> PathBuf {
        self.dir.join(format!("{}.json.tmp", collection.key()))
    }

    fn discard(staged: &[(PathBuf, PathBuf)]) {
        for (tmp, _) in staged {
            let _ = fs::remove_file(tmp);
        }
    }
}

impl Store for JsonFileStore {
    fn load_collection(&self, collection: Collection) -> Result<Option<Value>> {
        let path = self.path_for(collection);
        let text = match fs::read_to_string(&path) {
            Ok(text) => text,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(io_error(&path, e).into()),
        };

        let value = serde_json::from_str(&text)
            .map_err(|source| StoreError::Corrupt { collection, source })?;
        Ok(Some(value))
    }

    fn commit(&self, batch: WriteBatch) -> Result<()> {
        let mut staged = Vec::with_capacity(batch.len());

        for (collection, value) in batch.into_entries() {
            let tmp = self.staging_path(collection);
            let written: Result<()> = serde_json::to_vec_pretty(&value)
                .map_err(Into::into)
                .and_then(|bytes| fs::write(&tmp, bytes).map_err(|e| io_error(&tmp, e).into()));
            if let Err(e) = written {
                Self::discard(&staged);
                let _ = fs::remove_file(&tmp);
                return Err(e);
            }
            staged.push((tmp, self.path_for(collection)));
        }

        for (done, (tmp, target)) in staged.iter().enumerate() {
            if let Err(e) = fs::rename(tmp, target) {
                let renamed: Vec<String> = staged[..done]
                    .iter()
                    .map(|(_, path)| path.display().to_string())
                    .collect();
                error!(
                    target_file = %target.display(),
                    renamed = ?renamed,
                    "Rename failed part-way through commit"
                );
                Self::discard(&staged[done..]);
                return Err(io_error(target, e).into());
            }
        }

        debug!(dir = %self.dir.display(), files = staged.len(), "Committed collections");
        Ok(())
    }
}
