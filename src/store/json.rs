//! JSON file store.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use super::{StoreError, UserRecord, UserStore};

/// Keeps every record in one pretty-printed JSON document.
///
/// The whole document is rewritten on each `put` through a temporary file
/// and a rename, so a crash leaves either the old or the new document.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    users: BTreeMap<u64, UserRecord>,
}

impl JsonFileStore {
    /// Opens the store, starting empty if the file does not exist yet.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref().to_path_buf();

        let users = if path.exists() {
            let content = std::fs::read_to_string(&path)?;
            if content.trim().is_empty() {
                BTreeMap::new()
            } else {
                serde_json::from_str(&content)?
            }
        } else {
            debug!("No player file at {}, starting empty", path.display());
            BTreeMap::new()
        };

        info!("Loaded {} players from {}", users.len(), path.display());

        Ok(Self { path, users })
    }

    /// Path of the backing file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn write(&self, users: &BTreeMap<u64, UserRecord>) -> Result<(), StoreError> {
        let json = serde_json::to_string_pretty(users)?;

        let mut tmp_name = self
            .path
            .file_name()
            .map(std::ffi::OsStr::to_os_string)
            .unwrap_or_default();
        tmp_name.push(".tmp");
        let tmp_path = self.path.with_file_name(tmp_name);

        std::fs::write(&tmp_path, json)?;
        std::fs::rename(&tmp_path, &self.path)?;
        Ok(())
    }
}

impl UserStore for JsonFileStore {
    fn get(&self, user_id: u64) -> Result<Option<UserRecord>, StoreError> {
        Ok(self.users.get(&user_id).cloned())
    }

    fn put(&mut self, user_id: u64, record: &UserRecord) -> Result<(), StoreError> {
        let mut next = self.users.clone();
        next.insert(user_id, record.clone());
        self.write(&next)?;
        self.users = next;
        Ok(())
    }

    fn len(&self) -> Result<usize, StoreError> {
        Ok(self.users.len())
    }
}
