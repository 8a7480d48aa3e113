//! Core domain types for the Strata segment store.

pub mod config;
pub mod error;
pub mod segment;

pub use config::{ArchiveConfig, DeepStorageConfig, StrataConfig};
pub use error::{CoreError, CoreResult};
pub use segment::{load_spec_field, LoadSpec, SegmentRecord, ShardSpec, TimeInterval};
