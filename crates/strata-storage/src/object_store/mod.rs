//! Object-storage capability consumed by the segment mover
//!
//! Strata never talks to a concrete cloud SDK from its move logic; it calls
//! this narrow trait instead. Two implementations ship with the crate:
//! - In-memory (deterministic test double with failure injection)
//! - Local filesystem (dev/test backend)
//!
//! Production backends are supplied by the surrounding system.

mod local;
mod memory;

pub use local::LocalObjectStore;
pub use memory::{CallHistoryEntry, MemoryObjectStore, StoreFailure};

use std::fmt;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use strata_core::CoreResult;

/// Bucket-qualified coordinates of one object.
///
/// Computed on demand from load specs and naming configuration; never
/// persisted.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ObjectLocation {
    pub bucket: String,
    pub key: String,
}

impl ObjectLocation {
    #[must_use]
    pub fn new(bucket: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            key: key.into(),
        }
    }
}

impl fmt::Display for ObjectLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.bucket, self.key)
    }
}

/// Object metadata returned by head operations
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObjectMetadata {
    /// Object key (path within its bucket)
    pub key: String,
    /// Size in bytes
    pub size_bytes: u64,
    /// Last modification timestamp
    pub last_modified: DateTime<Utc>,
    /// ETag (entity tag, None for local storage)
    pub etag: Option<String>,
    /// Storage class the backend reports for the object, when it has one
    pub storage_class: Option<String>,
}

/// Object Store trait - the storage capability segment relocation runs on
///
/// All implementations must be thread-safe (Send + Sync) and support
/// concurrent operations. Keys are UTF-8 strings treated as opaque
/// identifiers; locations qualify keys with a bucket because moves may cross
/// buckets.
///
/// There is deliberately no `put` here: nothing in the move protocol uploads
/// data. Test doubles and dev backends expose inherent `put_object` methods
/// for seeding state.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Check if an object exists
    ///
    /// # Errors
    ///
    /// - `CoreError::StorageError` if the operation fails
    async fn exists(&self, location: &ObjectLocation) -> CoreResult<bool>;

    /// Get object metadata without downloading
    ///
    /// Returns `None` when the object does not exist; absence is an expected
    /// answer during a move decision, not a failure.
    ///
    /// # Errors
    ///
    /// - `CoreError::StorageError` if the operation fails
    async fn head(&self, location: &ObjectLocation) -> CoreResult<Option<ObjectMetadata>>;

    /// Move an object to a new location in a single backend call
    ///
    /// The source ceases to exist once the call returns; callers never see a
    /// copy-then-delete window. When `preserve_metadata` is set the
    /// destination keeps the source object's metadata and storage class.
    ///
    /// # Errors
    ///
    /// - `CoreError::NotFound` if the source object does not exist
    /// - `CoreError::StorageError` if the operation fails
    async fn move_object(
        &self,
        source: &ObjectLocation,
        dest: &ObjectLocation,
        preserve_metadata: bool,
    ) -> CoreResult<()>;
}
