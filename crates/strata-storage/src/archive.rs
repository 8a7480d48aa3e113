//! Archival relocation driven by configured naming
//!
//! Composition over the mover: the archiver owns no decision logic, it only
//! supplies the move targets that the archive and deep-storage naming
//! configuration describe.

use strata_core::{ArchiveConfig, CoreResult, DeepStorageConfig, SegmentRecord};

use crate::mover::{MoveTarget, SegmentMover};

/// Moves segments between the live deep-storage prefix and the archive
/// prefix.
pub struct SegmentArchiver {
    mover: SegmentMover,
    archive: ArchiveConfig,
    deep_storage: DeepStorageConfig,
}

impl SegmentArchiver {
    #[must_use]
    pub fn new(
        mover: SegmentMover,
        archive: ArchiveConfig,
        deep_storage: DeepStorageConfig,
    ) -> Self {
        Self {
            mover,
            archive,
            deep_storage,
        }
    }

    /// Relocates a segment into the configured archive bucket/prefix.
    ///
    /// # Errors
    ///
    /// Same contract as [`SegmentMover::move_segment`].
    pub async fn archive(&self, segment: &SegmentRecord) -> CoreResult<SegmentRecord> {
        let target = Self::target_for(&self.archive.bucket, &self.archive.base_key);
        self.mover.move_segment(segment, &target).await
    }

    /// Moves an archived segment back under the live deep-storage naming.
    ///
    /// # Errors
    ///
    /// Same contract as [`SegmentMover::move_segment`].
    pub async fn restore(&self, segment: &SegmentRecord) -> CoreResult<SegmentRecord> {
        let target = Self::target_for(&self.deep_storage.bucket, &self.deep_storage.base_key);
        self.mover.move_segment(segment, &target).await
    }

    /// An empty configured bucket means "stay in the segment's current
    /// bucket".
    fn target_for(bucket: &str, base_key: &str) -> MoveTarget {
        MoveTarget {
            bucket: (!bucket.is_empty()).then(|| bucket.to_string()),
            base_key: base_key.to_string(),
        }
    }
}
