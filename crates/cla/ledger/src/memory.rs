//! In-memory state store for development and testing.

use async_trait::async_trait;
use cla_types::{ClaKey, StateMutations};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::RwLock;

use crate::error::{StorageError, StorageResult};
use crate::store::StateStore;

/// [`StateStore`] backed by a map. Writes replace whole values; keys are
/// held in their stored form.
pub struct InMemoryStateStore {
    values: RwLock<HashMap<ClaKey, serde_json::Value>>,
    unavailable: AtomicBool,
}

impl InMemoryStateStore {
    pub fn new() -> Self {
        Self {
            values: RwLock::new(HashMap::new()),
            unavailable: AtomicBool::new(false),
        }
    }

    /// Seed a value, bypassing the batch contract.
    pub fn insert<T: Serialize>(&self, key: ClaKey, value: &T) -> StorageResult<()> {
        let value = serde_json::to_value(value)?;
        let mut values = self.values.write().map_err(|_| StorageError::LockPoisoned)?;
        values.insert(key.stored_form(), value);
        Ok(())
    }

    /// Make every subsequent call fail with a backend error.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    pub fn len(&self) -> usize {
        self.values.read().map(|v| v.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn ensure_available(&self) -> StorageResult<()> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(StorageError::Backend("store unavailable".to_string()));
        }
        Ok(())
    }
}

impl Default for InMemoryStateStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl StateStore for InMemoryStateStore {
    async fn read_value(&self, key: &ClaKey) -> StorageResult<Option<serde_json::Value>> {
        self.ensure_available()?;
        let values = self.values.read().map_err(|_| StorageError::LockPoisoned)?;
        Ok(values.get(&key.stored_form()).cloned())
    }

    async fn write_batch(&self, mutations: &StateMutations) -> StorageResult<()> {
        self.ensure_available()?;
        let mut encoded = Vec::with_capacity(mutations.len());
        for (key, value) in mutations.iter() {
            encoded.push((key.stored_form(), serde_json::to_value(value)?));
        }

        let mut values = self.values.write().map_err(|_| StorageError::LockPoisoned)?;
        values.extend(encoded);
        Ok(())
    }
}
