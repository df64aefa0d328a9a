//! Validation outcomes for proposed cell edits.
//!
//! Handlers answer a proposed edit with `Ok(())` or a [`ValidationCause`]
//! describing the first rule it broke. The table wraps the cause into a
//! [`ValidationFailure`] carrying the cell position and the rejected text,
//! which is what an editor shows to the user.
//!
//! A failure is a value, never a panic, and a rejected edit is never
//! partially applied.
//!
//! # Example
//!
//! ```
//! use hdfview_table::validation::{ValidationCause, ValidationFailure};
//!
//! let failure = ValidationFailure::new(3, 1, "256", ValidationCause::out_of_range("256", 0, 255));
//! assert_eq!(
//!     failure.to_string(),
//!     "Failed to update value at (3, 1) to '256': Value out of range. Value:\"256\" (valid range 0 to 255)"
//! );
//! ```

/// Message used when no specific handler exists for a datatype.
pub const NO_HANDLER_MESSAGE: &str =
    "A proper validator wasn't found for this type of data. Writing this type of data will be disabled.";

/// The rule a proposed edit broke.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationCause {
    /// The text does not parse as the expected kind of number.
    #[error("'{text}' is not a valid {expected}")]
    NotANumber { text: String, expected: String },

    /// A negative value was entered for an unsigned datatype.
    #[error("Invalid negative value for unsigned datatype. Value:\"{text}\"")]
    NegativeUnsigned { text: String },

    /// The value parses but does not fit the datatype.
    #[error("Value out of range. Value:\"{text}\" (valid range {min} to {max})")]
    OutOfRange { text: String, min: i128, max: i128 },

    /// A floating-point value overflows the datatype.
    #[error("Value out of range. Value:\"{text}\" overflows a {bits}-bit float")]
    FloatOverflow { text: String, bits: usize },

    /// Numbers of this byte size cannot be validated.
    #[error("No validation logic for numerical data of size {size}")]
    UnsupportedSize { size: usize },

    /// A fixed-length string is longer than its datatype.
    #[error("string size larger than datatype size by {overage} {}", byte_unit(.overage))]
    StringTooLong { overage: usize },

    /// Text for a character cell is neither one character nor a code.
    #[error("'{text}' is not a single character or character code")]
    InvalidCharacter { text: String },

    /// Text for an enum cell names no member and is not a valid value.
    #[error("'{text}' is not a member name or value of this enumeration")]
    UnknownEnumValue { text: String },

    /// Text for an opaque or bitfield cell is not a sequence of hex bytes.
    #[error("'{text}' is not {expected} hexadecimal byte(s)")]
    MalformedBytes { text: String, expected: usize },

    /// An array edit has the wrong number of elements.
    #[error("Number of data points {found} does not match expected {expected}")]
    ElementCount { expected: usize, found: usize },

    /// One element of an array or variable-length edit failed.
    #[error("element {index}: {cause}")]
    Element {
        index: usize,
        cause: Box<ValidationCause>,
    },

    /// The cell lies outside the table.
    #[error("cell is outside the table ({rows} rows, {columns} columns)")]
    OutOfBounds { rows: usize, columns: usize },

    /// The table does not accept edits.
    #[error("the table is read-only")]
    ReadOnly,

    /// No handler exists for this datatype.
    #[error("{}", NO_HANDLER_MESSAGE)]
    NoHandler,
}

fn byte_unit(count: &usize) -> &'static str {
    if *count > 1 { "bytes." } else { "byte." }
}

impl ValidationCause {
    pub fn not_a_number(text: impl Into<String>, expected: impl Into<String>) -> Self {
        Self::NotANumber {
            text: text.into(),
            expected: expected.into(),
        }
    }

    pub fn negative_unsigned(text: impl Into<String>) -> Self {
        Self::NegativeUnsigned { text: text.into() }
    }

    pub fn out_of_range(text: impl Into<String>, min: i128, max: i128) -> Self {
        Self::OutOfRange {
            text: text.into(),
            min,
            max,
        }
    }

    /// Wraps the cause of a failing element.
    pub fn element(index: usize, cause: ValidationCause) -> Self {
        Self::Element {
            index,
            cause: Box::new(cause),
        }
    }

    /// The innermost cause, looking through element wrappers.
    pub fn root(&self) -> &ValidationCause {
        match self {
            Self::Element { cause, .. } => cause.root(),
            other => other,
        }
    }
}

/// A rejected edit of one table cell.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Failed to update value at ({row}, {column}) to '{value}': {cause}")]
pub struct ValidationFailure {
    pub row: usize,
    pub column: usize,
    pub value: String,
    #[source]
    pub cause: ValidationCause,
}

impl ValidationFailure {
    pub fn new(row: usize, column: usize, value: impl Into<String>, cause: ValidationCause) -> Self {
        Self {
            row,
            column,
            value: value.into(),
            cause,
        }
    }
}
