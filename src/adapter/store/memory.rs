//! In-memory store for tests and throwaway ledgers.

use std::collections::HashMap;

use parking_lot::RwLock;
use serde_json::Value;

use crate::error::Result;
use crate::port::{Collection, Store, WriteBatch};

/// Collections held in a map, lost when dropped.
#[derive(Debug, Default)]
pub struct MemoryStore {
    collections: RwLock<HashMap<Collection, Value>>,
}

impl MemoryStore {
    /// Create a new empty memory store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of collections that have been written.
    #[must_use]
    pub fn len(&self) -> usize {
        self.collections.read().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.collections.read().is_empty()
    }
}

impl Store for MemoryStore {
    fn load_collection(&self, collection: Collection) -> Result<Option<Value>> {
        Ok(self.collections.read().get(&collection).cloned())
    }

    fn commit(&self, batch: WriteBatch) -> Result<()> {
        let mut collections = self.collections.write();
        for (collection, value) in batch.into_entries() {
            collections.insert(collection, value);
        }
        Ok(())
    }
}
