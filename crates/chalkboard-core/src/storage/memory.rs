//! Slots kept in process memory.

use super::{BoxFuture, Storage, StorageError, StorageResult};
use std::collections::HashMap;
use std::sync::Mutex;

/// Storage that lives as long as the process; used by tests and hosts
/// without persistence.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    slots: Mutex<HashMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of occupied slots.
    pub fn len(&self) -> usize {
        self.slots.lock().map_or(0, |slots| slots.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Storage for MemoryStorage {
    fn put(&self, slot: &str, json: String) -> BoxFuture<'_, StorageResult<()>> {
        let result = self
            .slots
            .lock()
            .map(|mut slots| {
                slots.insert(slot.to_string(), json);
            })
            .map_err(|_| StorageError::Poisoned);
        Box::pin(async move { result })
    }

    fn get(&self, slot: &str) -> BoxFuture<'_, StorageResult<Option<String>>> {
        let result = self
            .slots
            .lock()
            .map(|slots| slots.get(slot).cloned())
            .map_err(|_| StorageError::Poisoned);
        Box::pin(async move { result })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::block_on;

    #[test]
    fn test_put_replaces_slot() {
        let storage = MemoryStorage::new();
        assert!(storage.is_empty());

        block_on(storage.put("board", "first".to_string())).unwrap();
        block_on(storage.put("board", "second".to_string())).unwrap();

        assert_eq!(storage.len(), 1);
        assert_eq!(block_on(storage.get("board")).unwrap().as_deref(), Some("second"));
        assert_eq!(block_on(storage.get("other")).unwrap(), None);
    }
}
