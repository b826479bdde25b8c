//! # Domain Errors
//!
//! Error taxonomy for the Register Engine.
//!
//! | Kind | Consumes a number? | Caller action |
//! |------|--------------------|---------------|
//! | `Validation` | never | correct the form and resubmit |
//! | `Contention` | never | resubmit ("please try again") |
//! | `Storage` | never | operator attention |
//!
//! Allocation and insert share one transaction, so no variant can leave a
//! half-assigned number behind.

use crate::domain::value_objects::EntryId;
use thiserror::Error;

/// Input rejected before any transaction is opened.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A required field was not supplied.
    #[error("missing required field: {0}")]
    MissingField(&'static str),

    /// A required text field was blank after trimming.
    #[error("field must not be empty: {0}")]
    EmptyField(&'static str),

    /// `appearer_names` was empty.
    #[error("at least one appearer name is required")]
    NoAppearers,

    /// One of the appearer names was blank.
    #[error("appearer name at position {position} is empty")]
    EmptyAppearerName {
        /// Zero-based position in the submitted list.
        position: usize,
    },

    /// The execution date could not be parsed or is out of range.
    #[error("invalid execution date: {0}")]
    InvalidDate(String),

    /// A text field exceeded the configured maximum length.
    #[error("field {field} exceeds {max} characters")]
    TooLong {
        /// Field name.
        field: &'static str,
        /// Configured maximum in characters.
        max: usize,
    },

    /// A query filter or pagination parameter is malformed.
    #[error("invalid filter: {reason}")]
    InvalidFilter {
        /// Human readable reason.
        reason: String,
    },

    /// An administrative patch carried no changes.
    #[error("administrative patch is empty")]
    EmptyPatch,
}

/// Failures of the persistence layer.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StorageError {
    /// Underlying database I/O failed.
    #[error("database error: {message}")]
    Database {
        /// Adapter message.
        message: String,
    },

    /// Transient conflict: lock wait timeout, busy row, serialization failure.
    ///
    /// The writer retries these from a fresh transaction.
    #[error("transaction conflict: {message}")]
    Conflict {
        /// Adapter message.
        message: String,
    },

    /// Record could not be encoded or decoded.
    #[error("serialization error: {message}")]
    Serialization {
        /// Codec message.
        message: String,
    },

    /// Stored bytes do not have the expected shape.
    #[error("data corruption: {message}")]
    Corruption {
        /// Description of the malformed record.
        message: String,
    },

    /// The index projector refused to derive rows.
    #[error("index projection failed: {message}")]
    Projection {
        /// Projector message.
        message: String,
    },

    /// The data directory is held by another process.
    #[error("database locked: {message}")]
    Locked {
        /// Lock holder description.
        message: String,
    },
}

/// Errors returned by every Register Engine operation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegisterError {
    /// Input was rejected; no counter was consumed.
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationError),

    /// Retry budget exhausted while competing for a counter row.
    #[error("register busy on {scope}: gave up after {attempts} attempts")]
    Contention {
        /// Scope key that was contended, e.g. `yearly/N/2025`.
        scope: String,
        /// Number of attempts made.
        attempts: u32,
    },

    /// Persistence failure.
    #[error("storage failure: {0}")]
    Storage(#[from] StorageError),

    /// No register entry with this id.
    #[error("register entry not found: {id}")]
    NotFound {
        /// Requested id or number, rendered for display.
        id: String,
    },

    /// The engine was constructed with an unusable configuration.
    #[error("invalid configuration: {0}")]
    Config(String),
}

impl RegisterError {
    /// Entry lookup miss.
    pub fn not_found(id: EntryId) -> Self {
        RegisterError::NotFound { id: id.to_string() }
    }

    /// Whether the internal writer may retry this error with a fresh transaction.
    pub fn is_transient(&self) -> bool {
        matches!(self, RegisterError::Storage(StorageError::Conflict { .. }))
    }

    /// Whether the *caller* may simply resubmit the same request.
    pub fn is_retryable(&self) -> bool {
        matches!(self, RegisterError::Contention { .. }) || self.is_transient()
    }

    /// Message suitable for an end user.
    pub fn user_message(&self) -> String {
        match self {
            RegisterError::Validation(e) => e.to_string(),
            RegisterError::Contention { .. } => {
                "The register is busy, please try again.".to_string()
            }
            RegisterError::NotFound { .. } => "The register entry does not exist.".to_string(),
            RegisterError::Storage(_) | RegisterError::Config(_) => {
                "The register is unavailable. Please contact the administrator.".to_string()
            }
        }
    }
}

/// Key-value store errors raised by storage adapters.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum KVStoreError {
    /// I/O error during read/write.
    #[error("KV store I/O error: {message}")]
    IOError {
        /// Adapter message.
        message: String,
    },
    /// Lock wait timed out or the engine reported a busy/expired transaction.
    #[error("KV store conflict: {message}")]
    Conflict {
        /// Adapter message.
        message: String,
    },
    /// Data corruption in the store.
    #[error("KV store corruption: {message}")]
    CorruptionError {
        /// Adapter message.
        message: String,
    },
}

impl From<KVStoreError> for StorageError {
    fn from(err: KVStoreError) -> Self {
        match err {
            KVStoreError::Conflict { message } => StorageError::Conflict { message },
            KVStoreError::CorruptionError { message } => StorageError::Corruption { message },
            KVStoreError::IOError { message } => StorageError::Database { message },
        }
    }
}

impl From<KVStoreError> for RegisterError {
    fn from(err: KVStoreError) -> Self {
        RegisterError::Storage(err.into())
    }
}

/// Serialization errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("serialization error: {message}")]
pub struct SerializationError {
    /// Codec message.
    pub message: String,
}

impl From<SerializationError> for StorageError {
    fn from(err: SerializationError) -> Self {
        StorageError::Serialization {
            message: err.message,
        }
    }
}

impl From<SerializationError> for RegisterError {
    fn from(err: SerializationError) -> Self {
        RegisterError::Storage(err.into())
    }
}

/// Index projection errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProjectionError {
    /// The entry carries no appearer names to index.
    #[error("entry has no appearer names")]
    NoAppearers,
    /// Projector-specific failure.
    #[error("{0}")]
    Rejected(String),
}

impl From<ProjectionError> for RegisterError {
    fn from(err: ProjectionError) -> Self {
        RegisterError::Storage(StorageError::Projection {
            message: err.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kv_conflict_maps_to_transient() {
        let err: RegisterError = KVStoreError::Conflict {
            message: "lock wait timeout".to_string(),
        }
        .into();
        assert!(err.is_transient());
        assert!(err.is_retryable());
    }

    #[test]
    fn test_kv_io_error_is_not_transient() {
        let err: RegisterError = KVStoreError::IOError {
            message: "disk failure".to_string(),
        }
        .into();

        match &err {
            RegisterError::Storage(StorageError::Database { message }) => {
                assert!(message.contains("disk failure"));
            }
            other => panic!("Expected Database error, got {other:?}"),
        }
        assert!(!err.is_transient());
    }

    #[test]
    fn test_contention_user_message() {
        let err = RegisterError::Contention {
            scope: "yearly/N/2025".to_string(),
            attempts: 5,
        };
        assert!(err.is_retryable());
        assert!(!err.is_transient());
        assert!(err.user_message().contains("try again"));
        assert!(err.to_string().contains("yearly/N/2025"));
    }

    #[test]
    fn test_projection_error_is_storage_class() {
        let err: RegisterError = ProjectionError::NoAppearers.into();
        assert!(matches!(
            err,
            RegisterError::Storage(StorageError::Projection { .. })
        ));
    }

    #[test]
    fn test_validation_display() {
        let err = ValidationError::EmptyAppearerName { position: 2 };
        assert!(err.to_string().contains("position 2"));
    }
}
