use thiserror::Error;

/// Canonical error type for segment and storage operations.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Entity was not found in the backing store.
    #[error("{entity} `{id}` was not found")]
    NotFound {
        /// Entity type name (e.g. `"object"`).
        entity: &'static str,
        /// Identifier of the missing entity.
        id: String,
    },

    /// Segment cannot be loaded from any known location.
    ///
    /// Raised when a segment's backing object exists at neither its source
    /// nor its target location. Not retryable: the data is gone or the
    /// segment record points somewhere it never lived.
    #[error("segment `{segment}` cannot be loaded: {message}")]
    SegmentLoading {
        /// Identifier of the affected segment.
        segment: String,
        /// Human-readable details naming the locations that were checked.
        message: String,
    },

    /// I/O error occurred during file or network operations.
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// Serialization error occurred.
    #[error("serialization error: {0}")]
    SerializationError(String),

    /// Deserialization error occurred.
    #[error("deserialization error: {0}")]
    DeserializationError(String),

    /// Storage backend error.
    #[error("storage error: {0}")]
    StorageError(String),

    /// Validation error for input data or configuration.
    #[error("validation error: {0}")]
    ValidationError(String),
}

impl CoreError {
    /// Creates a `NotFound` variant.
    #[must_use]
    pub fn not_found(entity: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity,
            id: id.into(),
        }
    }

    /// Creates a `SegmentLoading` variant.
    #[must_use]
    pub fn segment_loading(segment: impl Into<String>, message: impl Into<String>) -> Self {
        Self::SegmentLoading {
            segment: segment.into(),
            message: message.into(),
        }
    }

    /// Creates a `ValidationError` variant.
    #[must_use]
    pub fn validation(message: impl Into<String>) -> Self {
        Self::ValidationError(message.into())
    }
}

impl From<serde_json::Error> for CoreError {
    fn from(err: serde_json::Error) -> Self {
        if err.is_eof() || err.is_syntax() {
            Self::DeserializationError(err.to_string())
        } else {
            Self::SerializationError(err.to_string())
        }
    }
}

/// Convenient result alias for core operations.
pub type CoreResult<T> = Result<T, CoreError>;
