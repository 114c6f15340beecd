//! Where saved tables go.

use std::sync::{Arc, Mutex, PoisonError};

use indexmap::IndexMap;

use super::blob::StateBlob;
use crate::core::PersistError;

/// Keyed storage for saved tables. Implementations decide the medium; the
/// engine only hands over and takes back [`StateBlob`]s.
pub trait PersistenceStore: Send {
    /// Store a blob under its table id, replacing any earlier save.
    fn save(&mut self, blob: &StateBlob) -> Result<(), PersistError>;

    fn load(&self, table_id: &str) -> Result<Option<StateBlob>, PersistError>;

    fn remove(&mut self, table_id: &str) -> Result<(), PersistError>;

    /// Saved table ids in save order.
    fn table_ids(&self) -> Result<Vec<String>, PersistError>;
}

/// In-process store holding encoded envelopes. Clones share contents, so a
/// caller can keep a handle to a store it gave away.
#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
    blobs: Arc<Mutex<IndexMap<String, Vec<u8>>>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.blobs.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Overwrite the stored bytes for a table, e.g. to simulate corruption.
    pub fn put_raw(&self, table_id: impl Into<String>, bytes: Vec<u8>) {
        self.blobs
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(table_id.into(), bytes);
    }
}

impl PersistenceStore for MemoryStore {
    fn save(&mut self, blob: &StateBlob) -> Result<(), PersistError> {
        let bytes = blob.to_bytes()?;
        self.put_raw(blob.table_id.clone(), bytes);
        Ok(())
    }

    fn load(&self, table_id: &str) -> Result<Option<StateBlob>, PersistError> {
        let blobs = self.blobs.lock().unwrap_or_else(PoisonError::into_inner);
        blobs.get(table_id).map(|bytes| StateBlob::from_bytes(bytes)).transpose()
    }

    fn remove(&mut self, table_id: &str) -> Result<(), PersistError> {
        self.blobs
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .shift_remove(table_id);
        Ok(())
    }

    fn table_ids(&self) -> Result<Vec<String>, PersistError> {
        Ok(self
            .blobs
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .cloned()
            .collect())
    }
}
