//! In-process store.

use std::collections::HashMap;

use super::{StoreError, UserRecord, UserStore};

/// Keeps records in a `HashMap`. Nothing survives a restart.
#[derive(Debug, Default)]
pub struct MemoryStore {
    users: HashMap<u64, UserRecord>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl UserStore for MemoryStore {
    fn get(&self, user_id: u64) -> Result<Option<UserRecord>, StoreError> {
        Ok(self.users.get(&user_id).cloned())
    }

    fn put(&mut self, user_id: u64, record: &UserRecord) -> Result<(), StoreError> {
        self.users.insert(user_id, record.clone());
        Ok(())
    }

    fn len(&self) -> Result<usize, StoreError> {
        Ok(self.users.len())
    }
}
