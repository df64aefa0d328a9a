//! Error types for the table layer.

use std::path::PathBuf;

use hdfview_core::{DatatypeClass, DatatypeError};

use crate::validation::ValidationFailure;

/// Result type alias for table operations.
pub type Result<T> = std::result::Result<T, TableError>;

/// Errors that make a table unusable, or refuse one table operation.
///
/// Checking an edit yields a [`ValidationFailure`] directly; applying one
/// wraps it as [`TableError::Rejected`].
#[derive(Debug, thiserror::Error)]
pub enum TableError {
    /// The dataset's datatype could not be used.
    #[error("Datatype error: {0}")]
    Datatype(#[from] DatatypeError),

    /// The selection vector does not match the flattened member count.
    #[error("Selection has {actual} flags but the compound has {expected} leaf members")]
    SelectionLength { expected: usize, actual: usize },

    /// The selection and the datatype disagree: members exist but no column
    /// could be mapped.
    #[error("Invalid column mapping of size 0 built for {description}")]
    InvalidMapping { description: String },

    /// The data source refused an operation.
    #[error("Data source error: {message}")]
    Source { message: String },

    /// A cell edit was rejected.
    #[error(transparent)]
    Rejected(#[from] ValidationFailure),
}

impl TableError {
    /// Create an invalid mapping error.
    pub fn invalid_mapping(description: impl Into<String>) -> Self {
        Self::InvalidMapping {
            description: description.into(),
        }
    }

    /// Create a data source error.
    pub fn data_source(message: impl Into<String>) -> Self {
        Self::Source {
            message: message.into(),
        }
    }
}

/// Reasons a specific value handler could not be built.
///
/// These never reach callers of the handler factory: the factory logs them
/// and substitutes the default handler.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum HandlerError {
    /// The handler was asked to wrap a datatype of the wrong class.
    #[error("{handler} handler cannot be built for a {found} datatype")]
    ClassMismatch {
        handler: &'static str,
        found: DatatypeClass,
    },

    /// A compound has no column to map.
    #[error("invalid mapping of size 0 built for {description}")]
    EmptyMapping { description: String },
}

impl HandlerError {
    pub fn class_mismatch(handler: &'static str, found: DatatypeClass) -> Self {
        Self::ClassMismatch { handler, found }
    }

    pub fn empty_mapping(description: impl Into<String>) -> Self {
        Self::EmptyMapping {
            description: description.into(),
        }
    }
}

/// Errors of the enum value to name round trip.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConversionError {
    /// The datatype handed to the converter is not an enumeration.
    #[error("Cannot convert values of a {class} datatype to enum names")]
    NotEnum { class: DatatypeClass },

    /// The handle is unknown or already closed.
    #[error("Invalid or closed type handle {0}")]
    InvalidHandle(i64),

    /// No member carries this value.
    #[error("No enum member has value {0}")]
    UnknownValue(i64),

    /// The native layer reported a failure.
    #[error("Native type conversion failed: {0}")]
    Native(String),
}

/// Errors loading or saving table view settings.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File I/O error.
    #[error("Failed to read settings '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The settings text is not valid TOML for this schema.
    #[error("Invalid settings: {0}")]
    Parse(#[from] toml::de::Error),

    /// The settings could not be serialized.
    #[error("Failed to serialize settings: {0}")]
    Serialize(#[from] toml::ser::Error),

    /// The index base must be 0 or 1.
    #[error("Index base must be 0 or 1, found {0}")]
    InvalidIndexBase(usize),
}

impl ConfigError {
    /// Create an I/O error.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
