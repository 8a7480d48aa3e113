//! Segment relocation between deep-storage locations
//!
//! Moves the two backing objects of an immutable segment (payload +
//! descriptor) to a new bucket/prefix and returns a record pointing at the
//! destination. Idempotent under caller retries: a re-run finds the objects
//! already at the target and performs no physical moves.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info};

use strata_core::{load_spec_field, CoreError, CoreResult, SegmentRecord};

use crate::object_store::{ObjectLocation, ObjectStore};
use crate::paths;

/// Desired destination naming for a segment move.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MoveTarget {
    /// Destination bucket; the segment's current bucket when absent.
    #[serde(default)]
    pub bucket: Option<String>,

    /// Base-key prefix substituted for the current key's prefix. Empty means
    /// no prefix.
    #[serde(default)]
    pub base_key: String,
}

impl MoveTarget {
    #[must_use]
    pub fn new(bucket: impl Into<String>, base_key: impl Into<String>) -> Self {
        Self {
            bucket: Some(bucket.into()),
            base_key: base_key.into(),
        }
    }

    /// Target that changes the key prefix but stays in the current bucket.
    #[must_use]
    pub fn same_bucket(base_key: impl Into<String>) -> Self {
        Self {
            bucket: None,
            base_key: base_key.into(),
        }
    }
}

/// Result of relocating one component object.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveOutcome {
    /// Destination already holds the object; nothing was done.
    AlreadyAtTarget,
    /// The object was physically relocated.
    Moved,
    /// Neither source nor destination holds the object.
    SourceAbsent,
}

/// Relocates segment objects through the injected storage capability.
///
/// Holds no state beyond the capability reference. One `move_segment` call
/// runs its checks and at most two physical moves strictly in sequence, with
/// no internal retries; transient storage errors propagate to the caller's
/// retry harness untouched. Concurrent calls for different segments are
/// safe; callers must serialize moves of the same segment externally.
pub struct SegmentMover {
    store: Arc<dyn ObjectStore>,
}

impl SegmentMover {
    #[must_use]
    pub fn new(store: Arc<dyn ObjectStore>) -> Self {
        Self { store }
    }

    /// Moves a segment's payload and descriptor objects to the target
    /// naming and returns a record whose load spec points at the
    /// destination.
    ///
    /// The returned record points at the target even when nothing had to be
    /// physically moved, so a catalog update after a retried move always
    /// converges on the same coordinates. The input record is never
    /// modified.
    ///
    /// # Errors
    ///
    /// - `CoreError::ValidationError` when the load spec lacks `bucket` or
    ///   `key`, or the key is malformed
    /// - `CoreError::SegmentLoading` when either object exists at neither
    ///   its source nor its target location
    /// - any storage backend error, propagated as-is
    pub async fn move_segment(
        &self,
        segment: &SegmentRecord,
        target: &MoveTarget,
    ) -> CoreResult<SegmentRecord> {
        let source_bucket = load_spec_field(&segment.load_spec, "bucket")?.to_string();
        let source_key = load_spec_field(&segment.load_spec, "key")?.to_string();

        let target_bucket = target
            .bucket
            .clone()
            .unwrap_or_else(|| source_bucket.clone());
        let target_key = paths::rebase_segment_key(&source_key, &target.base_key)?;

        let payload_source = ObjectLocation::new(&source_bucket, &source_key);
        let payload_target = ObjectLocation::new(&target_bucket, &target_key);
        let descriptor_source =
            ObjectLocation::new(&source_bucket, paths::descriptor_path(&source_key));
        let descriptor_target =
            ObjectLocation::new(&target_bucket, paths::descriptor_path(&target_key));

        // Payload first; a fatal payload outcome must suppress the
        // descriptor attempt.
        self.relocate(segment, &payload_source, &payload_target)
            .await?;
        self.relocate(segment, &descriptor_source, &descriptor_target)
            .await?;

        let mut load_spec = segment.load_spec.clone();
        load_spec.insert("bucket".to_string(), Value::String(target_bucket));
        load_spec.insert("key".to_string(), Value::String(target_key));
        Ok(segment.with_load_spec(load_spec))
    }

    /// Runs the per-object decision and turns `SourceAbsent` into the
    /// unrecoverable loading error: an object that exists at neither
    /// location cannot be relocated, and the segment cannot be served from
    /// anywhere.
    async fn relocate(
        &self,
        segment: &SegmentRecord,
        source: &ObjectLocation,
        target: &ObjectLocation,
    ) -> CoreResult<MoveOutcome> {
        match self.move_object_if_needed(source, target).await? {
            MoveOutcome::SourceAbsent => Err(CoreError::segment_loading(
                segment.id(),
                format!("object exists at neither `{source}` nor `{target}`"),
            )),
            outcome => Ok(outcome),
        }
    }

    /// Minimal-action decision for one (source, target) pair:
    ///
    /// 1. Equal locations: already correct, no storage query at all.
    /// 2. Target exists: a previous attempt already succeeded, no move.
    /// 3. Source exists: move it, preserving the object's metadata.
    /// 4. Neither exists: `SourceAbsent`, for the caller to judge.
    async fn move_object_if_needed(
        &self,
        source: &ObjectLocation,
        target: &ObjectLocation,
    ) -> CoreResult<MoveOutcome> {
        if source == target {
            debug!(%source, "segment object already at its destination");
            return Ok(MoveOutcome::AlreadyAtTarget);
        }

        if self.store.exists(target).await? {
            debug!(%source, %target, "destination already holds segment object, not moving");
            return Ok(MoveOutcome::AlreadyAtTarget);
        }

        if self.store.exists(source).await? {
            info!(%source, %target, "moving segment object");
            self.store.move_object(source, target, true).await?;
            return Ok(MoveOutcome::Moved);
        }

        Ok(MoveOutcome::SourceAbsent)
    }
}
