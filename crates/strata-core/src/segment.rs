use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{CoreError, CoreResult};

/// Time range covered by a segment, end-exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeInterval {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl TimeInterval {
    /// Creates an interval.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::ValidationError` when `end` is not after `start`.
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> CoreResult<Self> {
        if end <= start {
            return Err(CoreError::validation(format!(
                "interval end `{end}` must be after start `{start}`"
            )));
        }
        Ok(Self { start, end })
    }

    /// Renders the `_`-separated form used inside object keys.
    ///
    /// Object keys cannot contain the `/` of the display form, so paths use
    /// millisecond-precision RFC 3339 bounds joined by an underscore.
    #[must_use]
    pub fn path_form(&self) -> String {
        format!(
            "{}_{}",
            self.start.to_rfc3339_opts(SecondsFormat::Millis, true),
            self.end.to_rfc3339_opts(SecondsFormat::Millis, true)
        )
    }
}

impl fmt::Display for TimeInterval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{}",
            self.start.to_rfc3339_opts(SecondsFormat::Millis, true),
            self.end.to_rfc3339_opts(SecondsFormat::Millis, true)
        )
    }
}

/// Partitioning scheme of a segment within its interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ShardSpec {
    /// Single segment covers the whole interval.
    None,
    /// One of `partitions` numbered chunks.
    Numbered { partition_num: u32, partitions: u32 },
}

impl ShardSpec {
    /// Partition number of this chunk (0 for unsharded segments).
    #[must_use]
    pub fn partition_num(&self) -> u32 {
        match self {
            Self::None => 0,
            Self::Numbered { partition_num, .. } => *partition_num,
        }
    }
}

impl Default for ShardSpec {
    fn default() -> Self {
        Self::None
    }
}

/// Load specification: where a segment's bytes live.
///
/// Kept as an open map because load specs are polymorphic across storage
/// backends; object-storage specs carry at least `bucket` and `key`.
pub type LoadSpec = BTreeMap<String, Value>;

/// Fetches a required string field from a load spec.
///
/// # Errors
///
/// Returns `CoreError::ValidationError` when the field is missing or not a
/// string. Load specs come from the catalog, so a missing field is a
/// configuration error rather than a storage failure.
pub fn load_spec_field<'a>(load_spec: &'a LoadSpec, field: &str) -> CoreResult<&'a str> {
    load_spec
        .get(field)
        .and_then(Value::as_str)
        .ok_or_else(|| {
            CoreError::validation(format!("load spec is missing required field `{field}`"))
        })
}

/// Immutable descriptor for a persisted columnar segment.
///
/// Constructed by ingestion and catalog components; consumers never mutate a
/// record in place. Components that change where a segment lives produce a
/// new record via [`SegmentRecord::with_load_spec`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SegmentRecord {
    pub datasource: String,
    pub interval: TimeInterval,
    pub version: String,
    pub load_spec: LoadSpec,
    #[serde(default)]
    pub dimensions: Vec<String>,
    #[serde(default)]
    pub metrics: Vec<String>,
    #[serde(default)]
    pub shard_spec: ShardSpec,
    pub binary_version: u32,
    pub size_bytes: u64,
}

impl SegmentRecord {
    /// Canonical segment identifier used in logs, errors and object keys.
    #[must_use]
    pub fn id(&self) -> String {
        let mut id = format!(
            "{}_{}_{}",
            self.datasource,
            self.interval.path_form(),
            self.version
        );
        if self.partition_num() > 0 {
            id.push('_');
            id.push_str(&self.partition_num().to_string());
        }
        id
    }

    /// Partition number from the shard spec.
    #[must_use]
    pub fn partition_num(&self) -> u32 {
        self.shard_spec.partition_num()
    }

    /// Returns a new record with the given load spec and every other
    /// attribute cloned unchanged.
    #[must_use]
    pub fn with_load_spec(&self, load_spec: LoadSpec) -> Self {
        Self {
            load_spec,
            ..self.clone()
        }
    }
}
