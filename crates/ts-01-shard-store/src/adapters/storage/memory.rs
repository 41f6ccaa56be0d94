use crate::domain::StoreError;
use crate::ports::BlobStore;
use std::collections::BTreeMap;

/// Volatile blob store.
///
/// Used by tests and by store nodes started without a data file.
#[derive(Default)]
pub struct InMemoryBlobStore {
    data: BTreeMap<String, Vec<u8>>,
}

impl InMemoryBlobStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl BlobStore for InMemoryBlobStore {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError> {
        Ok(self.data.get(key).cloned())
    }

    fn put(&mut self, key: String, value: Vec<u8>) -> Result<(), StoreError> {
        self.data.insert(key, value);
        Ok(())
    }

    fn delete(&mut self, key: &str) -> Result<bool, StoreError> {
        Ok(self.data.remove(key).is_some())
    }

    fn keys(&self) -> Result<Vec<String>, StoreError> {
        Ok(self.data.keys().cloned().collect())
    }

    fn len(&self) -> usize {
        self.data.len()
    }
}
