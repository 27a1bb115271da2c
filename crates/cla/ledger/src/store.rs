//! State store contract.
//!
//! The durable store is owned by the hosting process. The engine reads
//! values one key at a time and hands back a batch of writes per event;
//! the store applies them last-writer-wins per key.

use async_trait::async_trait;
use cla_types::{ClaKey, StateMutations};
use serde::de::DeserializeOwned;

use crate::error::StorageResult;

/// Durable key/value store holding signature records and pending checks.
///
/// Implementations must address rows by [`ClaKey::stored_form`] on both
/// paths: writes arrive under the plain key, reads use the retrieval key, and
/// the two differ for bracketed logins such as `renovate[bot]`.
#[async_trait]
pub trait StateStore: Send + Sync {
    /// Raw value stored under `key`.
    async fn read_value(&self, key: &ClaKey) -> StorageResult<Option<serde_json::Value>>;

    /// Persist every write of one event, keyed by the stored form.
    async fn write_batch(&self, mutations: &StateMutations) -> StorageResult<()>;
}

/// Typed read of `key`. A stored `null` reads as absent.
pub async fn read_state<T: DeserializeOwned>(
    store: &dyn StateStore,
    key: &ClaKey,
) -> StorageResult<Option<T>> {
    match store.read_value(key).await? {
        None | Some(serde_json::Value::Null) => Ok(None),
        Some(value) => Ok(Some(serde_json::from_value(value)?)),
    }
}
