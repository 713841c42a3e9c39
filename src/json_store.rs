// JSON file backed store

use crate::error::{Result, TodoError};
use crate::record::Todo;
use crate::snapshot;
use crate::store::{TodoStore, UserIndex};
use eyre::{Context, eyre};
use fs2::FileExt;
use parking_lot::Mutex;
use std::fs::{self, File, OpenOptions};
use std::path::{Path, PathBuf};
use tracing::{debug, error, info};
use uuid::Uuid;

/// Store that keeps every record in memory and mirrors the full set to a
/// single JSON file after each successful mutation
///
/// Disk writes happen while the store lock is held. A failed write is logged
/// and the in-memory change stands; the file catches up on the next
/// successful write.
pub struct JsonStore {
    path: PathBuf,
    items: Mutex<UserIndex>,
    // Advisory lock on `<file>.lock`, released on drop
    _lock: File,
}

impl JsonStore {
    /// Open or create a store backed by the JSON file at `path`
    ///
    /// Fails if the file exists but cannot be parsed, or if another process
    /// already holds the store open.
    pub fn open<P: AsRef<Path>>(path: P) -> eyre::Result<Self> {
        let path = path.as_ref().to_path_buf();

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).context("Failed to create store directory")?;
        }

        let lock_path = lock_path(&path);
        let lock = OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(&lock_path)
            .context("Failed to open store lock file")?;
        lock.try_lock_exclusive()
            .map_err(|_| eyre!("Store {} is already in use by another process", path.display()))?;

        let items: UserIndex = snapshot::read_snapshot(&path)?.into_iter().collect();
        info!(file = ?path, count = items.len(), "Opened JSON store");

        Ok(Self {
            path,
            items: Mutex::new(items),
            _lock: lock,
        })
    }

    pub fn len(&self) -> usize {
        self.items.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Write the current set; caller holds the lock
    fn persist(&self, items: &UserIndex) -> bool {
        match snapshot::write_snapshot(&self.path, &items.to_vec()) {
            Ok(()) => {
                debug!(file = ?self.path, count = items.len(), "persist: written");
                true
            }
            Err(e) => {
                error!(file = ?self.path, error = ?e, "Failed to write store file, in-memory state kept");
                false
            }
        }
    }
}

impl TodoStore for JsonStore {
    fn add_item(&self, item: Todo) -> Result<Todo> {
        let mut items = self.items.lock();
        let stored = items.insert(item);
        self.persist(&items);
        Ok(stored)
    }

    fn get_item(&self, user_id: &str, id: Uuid) -> Result<Todo> {
        self.items.lock().get(user_id, id).cloned().ok_or_else(TodoError::not_found)
    }

    fn update_item(&self, item: Todo) -> Result<Todo> {
        let mut items = self.items.lock();
        let stored = items.replace(item).ok_or_else(TodoError::not_found)?;
        self.persist(&items);
        Ok(stored)
    }

    fn close(&self) -> Result<()> {
        let items = self.items.lock();
        if self.persist(&items) {
            info!(file = ?self.path, count = items.len(), "JSON store closed");
            Ok(())
        } else {
            Err(TodoError::Internal(format!(
                "failed to flush store to {}",
                self.path.display()
            )))
        }
    }
}

fn lock_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".lock");
    path.with_file_name(name)
}
