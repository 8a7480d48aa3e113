//! Key construction rules for segment objects in deep storage
//!
//! Every segment is backed by two co-located objects: the payload archive
//! and a sidecar descriptor. Keys share a fixed trailing shape,
//! `datasource/interval/version/partition/filename`, under a configurable
//! base-key prefix.

use strata_core::{CoreError, CoreResult, SegmentRecord};

/// Filename of the primary payload object.
pub const PAYLOAD_FILENAME: &str = "index.zip";

/// Filename of the sidecar descriptor object.
pub const DESCRIPTOR_FILENAME: &str = "descriptor.json";

/// Trailing path components every segment key shares:
/// datasource, interval, version, partition, filename.
const SEGMENT_KEY_COMPONENTS: usize = 5;

/// Convention-default payload key for a segment under the given base key.
///
/// An empty base key places segment keys at the bucket root.
#[must_use]
pub fn segment_path(base_key: &str, segment: &SegmentRecord) -> String {
    let tail = format!(
        "{}/{}/{}/{}/{}",
        segment.datasource,
        segment.interval.path_form(),
        segment.version,
        segment.partition_num(),
        PAYLOAD_FILENAME
    );
    if base_key.is_empty() {
        tail
    } else {
        format!("{base_key}/{tail}")
    }
}

/// Descriptor key for a payload key: same directory, sidecar filename.
#[must_use]
pub fn descriptor_path(segment_path: &str) -> String {
    match segment_path.rsplit_once('/') {
        Some((dir, _)) => format!("{dir}/{DESCRIPTOR_FILENAME}"),
        None => DESCRIPTOR_FILENAME.to_string(),
    }
}

/// Replaces a segment key's leading base-key prefix with `target_base_key`,
/// preserving the trailing segment components verbatim.
///
/// # Errors
///
/// Returns `CoreError::ValidationError` when the key does not have the
/// expected trailing shape; such a key was not produced by any supported
/// naming convention and rebasing it would corrupt the path.
pub fn rebase_segment_key(source_key: &str, target_base_key: &str) -> CoreResult<String> {
    let components: Vec<&str> = source_key.split('/').collect();
    if components.len() < SEGMENT_KEY_COMPONENTS {
        return Err(CoreError::validation(format!(
            "segment key `{source_key}` has fewer than {SEGMENT_KEY_COMPONENTS} path components"
        )));
    }

    let tail = components[components.len() - SEGMENT_KEY_COMPONENTS..].join("/");
    Ok(if target_base_key.is_empty() {
        tail
    } else {
        format!("{target_base_key}/{tail}")
    })
}
