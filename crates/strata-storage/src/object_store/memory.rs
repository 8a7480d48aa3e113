//! In-memory ObjectStore for testing
//!
//! Deterministic object-storage simulation used by the move-protocol tests:
//! buckets are plain maps, every operation is recorded, and failures can be
//! injected ahead of time to exercise error propagation without a network.

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use chrono::Utc;
use parking_lot::RwLock;

use super::{ObjectLocation, ObjectMetadata, ObjectStore};
use strata_core::{CoreError, CoreResult};

/// Pre-queued result for the next storage call.
#[derive(Debug, Clone)]
pub enum StoreFailure {
    /// Transient backend error (e.g. 500, 503, timeout). Surfaces as
    /// `CoreError::StorageError`, untranslated, exactly as a real backend
    /// failure would.
    Transient(&'static str),

    /// Success (no error).
    Ok,
}

impl StoreFailure {
    fn to_error(&self) -> Option<CoreError> {
        match self {
            StoreFailure::Transient(msg) => {
                Some(CoreError::StorageError(format!("Transient: {}", msg)))
            }
            StoreFailure::Ok => None,
        }
    }
}

/// One recorded storage call.
#[derive(Debug, Clone)]
pub struct CallHistoryEntry {
    /// Operation type: "exists", "head", "move", "put".
    pub operation: String,

    /// Location the operation targeted (source location for moves).
    pub location: ObjectLocation,

    /// Whether the operation succeeded.
    pub success: bool,
}

/// In-memory ObjectStore implementation for tests and examples.
///
/// Objects live in per-bucket maps behind a `parking_lot::RwLock`. Buckets
/// spring into existence on first write, matching how the move protocol
/// treats buckets as pre-provisioned.
pub struct MemoryObjectStore {
    /// bucket -> key -> data
    buckets: Arc<RwLock<HashMap<String, HashMap<String, Bytes>>>>,

    /// Failure pattern queue (deterministic failures).
    failure_queue: Arc<RwLock<VecDeque<StoreFailure>>>,

    /// Call history (for assertions).
    call_history: Arc<RwLock<Vec<CallHistoryEntry>>>,
}

impl MemoryObjectStore {
    /// Create a new empty store with no queued failures.
    #[must_use]
    pub fn new() -> Self {
        Self {
            buckets: Arc::new(RwLock::new(HashMap::new())),
            failure_queue: Arc::new(RwLock::new(VecDeque::new())),
            call_history: Arc::new(RwLock::new(Vec::new())),
        }
    }

    /// Create a store with a deterministic failure pattern.
    ///
    /// Failures are consumed in order, one per storage call. Once the queue
    /// is empty, all operations succeed.
    #[must_use]
    pub fn new_with_failures(pattern: Vec<StoreFailure>) -> Self {
        let store = Self::new();
        *store.failure_queue.write() = pattern.into();
        store
    }

    /// Seed an object directly, bypassing the capability trait.
    pub fn put_object(&self, bucket: &str, key: &str, data: Bytes) {
        self.buckets
            .write()
            .entry(bucket.to_string())
            .or_default()
            .insert(key.to_string(), data);
        self.record_call("put", &ObjectLocation::new(bucket, key), true);
    }

    /// Check whether an object is present, without recording a call.
    #[must_use]
    pub fn contains(&self, bucket: &str, key: &str) -> bool {
        self.buckets
            .read()
            .get(bucket)
            .is_some_and(|objects| objects.contains_key(key))
    }

    /// Get call history for assertions.
    #[must_use]
    pub fn call_history(&self) -> Vec<CallHistoryEntry> {
        self.call_history.read().clone()
    }

    /// Clear call history.
    pub fn clear_history(&self) {
        self.call_history.write().clear();
    }

    /// Number of successful physical moves performed so far.
    #[must_use]
    pub fn moved_count(&self) -> usize {
        self.call_history
            .read()
            .iter()
            .filter(|entry| entry.operation == "move" && entry.success)
            .count()
    }

    /// Whether any physical move has happened.
    #[must_use]
    pub fn did_move(&self) -> bool {
        self.moved_count() > 0
    }

    /// Total number of objects across all buckets.
    #[must_use]
    pub fn object_count(&self) -> usize {
        self.buckets.read().values().map(HashMap::len).sum()
    }

    /// Pop the next queued failure, if any.
    fn check_failure(&self) -> Option<CoreError> {
        let mut queue = self.failure_queue.write();
        queue.pop_front().and_then(|failure| failure.to_error())
    }

    fn record_call(&self, operation: &str, location: &ObjectLocation, success: bool) {
        self.call_history.write().push(CallHistoryEntry {
            operation: operation.to_string(),
            location: location.clone(),
            success,
        });
    }
}

impl Default for MemoryObjectStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ObjectStore for MemoryObjectStore {
    async fn exists(&self, location: &ObjectLocation) -> CoreResult<bool> {
        if let Some(error) = self.check_failure() {
            self.record_call("exists", location, false);
            return Err(error);
        }

        self.record_call("exists", location, true);
        Ok(self.contains(&location.bucket, &location.key))
    }

    async fn head(&self, location: &ObjectLocation) -> CoreResult<Option<ObjectMetadata>> {
        if let Some(error) = self.check_failure() {
            self.record_call("head", location, false);
            return Err(error);
        }

        self.record_call("head", location, true);
        let buckets = self.buckets.read();
        let data = buckets
            .get(&location.bucket)
            .and_then(|objects| objects.get(&location.key));

        Ok(data.map(|data| ObjectMetadata {
            key: location.key.clone(),
            size_bytes: data.len() as u64,
            last_modified: Utc::now(),
            etag: Some(format!("{:x}", md5::compute(data.as_ref()))),
            storage_class: Some("STANDARD".to_string()),
        }))
    }

    async fn move_object(
        &self,
        source: &ObjectLocation,
        dest: &ObjectLocation,
        _preserve_metadata: bool,
    ) -> CoreResult<()> {
        // In-memory objects carry bytes only, so there is no metadata to
        // preserve or replace.
        if let Some(error) = self.check_failure() {
            self.record_call("move", source, false);
            return Err(error);
        }

        let mut buckets = self.buckets.write();
        let data = buckets
            .get_mut(&source.bucket)
            .and_then(|objects| objects.remove(&source.key));

        match data {
            Some(data) => {
                buckets
                    .entry(dest.bucket.clone())
                    .or_default()
                    .insert(dest.key.clone(), data);
                drop(buckets);
                self.record_call("move", source, true);
                Ok(())
            }
            None => {
                drop(buckets);
                self.record_call("move", source, false);
                Err(CoreError::not_found("object", source.to_string()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_move_relocates_data() {
        let store = MemoryObjectStore::new();
        store.put_object("main", "a/index.zip", Bytes::from("payload"));

        let source = ObjectLocation::new("main", "a/index.zip");
        let dest = ObjectLocation::new("archive", "b/index.zip");
        store.move_object(&source, &dest, true).await.unwrap();

        assert!(!store.contains("main", "a/index.zip"));
        assert!(store.contains("archive", "b/index.zip"));
        assert!(store.did_move());
    }

    #[tokio::test]
    async fn test_move_missing_source_is_not_found() {
        let store = MemoryObjectStore::new();
        let source = ObjectLocation::new("main", "missing/index.zip");
        let dest = ObjectLocation::new("archive", "missing/index.zip");

        let err = store.move_object(&source, &dest, true).await.unwrap_err();
        assert!(matches!(err, CoreError::NotFound { .. }));
        assert!(!store.did_move());
    }

    #[tokio::test]
    async fn test_failure_queue_consumed_in_order() {
        let store = MemoryObjectStore::new_with_failures(vec![
            StoreFailure::Transient("503 Service Unavailable"),
            StoreFailure::Ok,
        ]);
        let location = ObjectLocation::new("main", "a/index.zip");

        assert!(store.exists(&location).await.is_err());
        assert!(store.exists(&location).await.is_ok());
    }

    #[tokio::test]
    async fn test_head_reports_standard_storage_class() {
        let store = MemoryObjectStore::new();
        store.put_object("main", "a/index.zip", Bytes::from("payload"));

        let metadata = store
            .head(&ObjectLocation::new("main", "a/index.zip"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(metadata.size_bytes, 7);
        assert_eq!(metadata.storage_class.as_deref(), Some("STANDARD"));

        let absent = store
            .head(&ObjectLocation::new("main", "missing"))
            .await
            .unwrap();
        assert!(absent.is_none());
    }
}
