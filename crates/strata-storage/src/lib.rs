//! Object-storage capability and segment relocation for Strata.

pub mod archive;
pub mod error;
pub mod mover;
pub mod object_store;
pub mod paths;

pub use archive::SegmentArchiver;
pub use error::{Error, Result};
pub use mover::{MoveOutcome, MoveTarget, SegmentMover};
pub use object_store::{
    LocalObjectStore, MemoryObjectStore, ObjectLocation, ObjectMetadata, ObjectStore, StoreFailure,
};
