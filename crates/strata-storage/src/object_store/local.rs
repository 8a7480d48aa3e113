//! Local filesystem implementation of ObjectStore
//!
//! Stores objects as files under `base_dir/bucket/key`. Useful for
//! development and integration tests that want real I/O without a cloud
//! backend.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, Utc};

use super::{ObjectLocation, ObjectMetadata, ObjectStore};
use strata_core::{CoreError, CoreResult};

/// Local filesystem object store
///
/// Buckets are top-level directories under the base directory; keys are
/// relative paths within their bucket directory.
pub struct LocalObjectStore {
    base_dir: PathBuf,
}

impl LocalObjectStore {
    /// Create a new local object store
    ///
    /// Creates the base directory if it doesn't exist.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::IoError` if directory creation fails
    pub async fn new(base_dir: impl AsRef<Path>) -> CoreResult<Self> {
        let base_dir = base_dir.as_ref().to_path_buf();
        tokio::fs::create_dir_all(&base_dir).await?;
        Ok(Self { base_dir })
    }

    /// Seed an object directly, creating bucket and key directories as
    /// needed.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::IoError` if the write fails
    pub async fn put_object(&self, location: &ObjectLocation, data: Bytes) -> CoreResult<()> {
        let path = self.full_path(location);
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&path, &data).await?;
        Ok(())
    }

    /// Convert a location to its full filesystem path
    fn full_path(&self, location: &ObjectLocation) -> PathBuf {
        self.base_dir.join(&location.bucket).join(&location.key)
    }
}

#[async_trait]
impl ObjectStore for LocalObjectStore {
    async fn exists(&self, location: &ObjectLocation) -> CoreResult<bool> {
        match tokio::fs::metadata(self.full_path(location)).await {
            Ok(metadata) => Ok(metadata.is_file()),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(false),
            Err(err) => Err(err.into()),
        }
    }

    async fn head(&self, location: &ObjectLocation) -> CoreResult<Option<ObjectMetadata>> {
        let metadata = match tokio::fs::metadata(self.full_path(location)).await {
            Ok(metadata) => metadata,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(err.into()),
        };

        let last_modified: DateTime<Utc> = metadata.modified()?.into();
        Ok(Some(ObjectMetadata {
            key: location.key.clone(),
            size_bytes: metadata.len(),
            last_modified,
            etag: None,
            storage_class: None,
        }))
    }

    async fn move_object(
        &self,
        source: &ObjectLocation,
        dest: &ObjectLocation,
        _preserve_metadata: bool,
    ) -> CoreResult<()> {
        // A rename within one base directory is atomic and keeps file
        // metadata, so the preserve flag has nothing extra to do here.
        let source_path = self.full_path(source);
        let dest_path = self.full_path(dest);

        if let Some(parent) = dest_path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        match tokio::fs::rename(&source_path, &dest_path).await {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == ErrorKind::NotFound => {
                Err(CoreError::not_found("object", source.to_string()))
            }
            Err(err) => Err(err.into()),
        }
    }
}
