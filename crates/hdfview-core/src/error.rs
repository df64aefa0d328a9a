//! Error types for datatype descriptions.

use crate::datatype::DatatypeClass;

/// Result type alias for datatype operations.
pub type Result<T> = std::result::Result<T, DatatypeError>;

/// Errors raised while building or inspecting a datatype tree.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DatatypeError {
    /// Two members of one compound share a name.
    #[error("Duplicate compound member name '{name}'")]
    DuplicateMember { name: String },

    /// A compound datatype was required.
    #[error("Expected a compound datatype, found {class}")]
    NotCompound { class: DatatypeClass },
}

impl DatatypeError {
    /// Create a duplicate member error.
    pub fn duplicate_member(name: impl Into<String>) -> Self {
        Self::DuplicateMember { name: name.into() }
    }

    /// Create a not-compound error.
    pub fn not_compound(class: DatatypeClass) -> Self {
        Self::NotCompound { class }
    }
}
