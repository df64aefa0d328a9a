//! Raw cell values.
//!
//! A [`CellValue`] is what the data layer hands to the table after decoding
//! a field from the file. Its concrete variant matches the member's
//! datatype class: numbers for integer and float members, bytes for fixed
//! strings, opaque and bitfield members, nested vectors for array and
//! compound elements. Decoding is the data layer's job; this module only
//! carries the result.

/// An already-decoded value of one table cell.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum CellValue {
    /// No value was read for this cell.
    #[default]
    Null,
    /// Signed integer. Unsigned 64-bit data may also arrive here as its raw
    /// bit pattern.
    Int(i64),
    /// Unsigned integer.
    UInt(u64),
    /// Floating-point number.
    Float(f64),
    /// Decoded text.
    Text(String),
    /// Raw bytes: fixed strings, opaque and bitfield data.
    Bytes(Vec<u8>),
    /// Elements of an array or variable-length value.
    Array(Vec<CellValue>),
    /// One compound element, one value per member.
    Compound(Vec<CellValue>),
}

impl CellValue {
    pub fn is_null(&self) -> bool {
        matches!(self, CellValue::Null)
    }

    /// Returns the value as a wide integer, if it is an integer.
    pub fn as_i128(&self) -> Option<i128> {
        match self {
            CellValue::Int(n) => Some(i128::from(*n)),
            CellValue::UInt(n) => Some(i128::from(*n)),
            _ => None,
        }
    }

    /// Returns the value as a float, converting integers.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            CellValue::Float(n) => Some(*n),
            CellValue::Int(n) => Some(*n as f64),
            CellValue::UInt(n) => Some(*n as f64),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            CellValue::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            CellValue::Bytes(b) => Some(b),
            _ => None,
        }
    }

    /// Elements of an array or compound value.
    pub fn elements(&self) -> Option<&[CellValue]> {
        match self {
            CellValue::Array(items) | CellValue::Compound(items) => Some(items),
            _ => None,
        }
    }
}

impl From<i64> for CellValue {
    fn from(value: i64) -> Self {
        CellValue::Int(value)
    }
}

impl From<i32> for CellValue {
    fn from(value: i32) -> Self {
        CellValue::Int(i64::from(value))
    }
}

impl From<u64> for CellValue {
    fn from(value: u64) -> Self {
        CellValue::UInt(value)
    }
}

impl From<f64> for CellValue {
    fn from(value: f64) -> Self {
        CellValue::Float(value)
    }
}

impl From<f32> for CellValue {
    fn from(value: f32) -> Self {
        CellValue::Float(f64::from(value))
    }
}

impl From<&str> for CellValue {
    fn from(value: &str) -> Self {
        CellValue::Text(value.to_string())
    }
}

impl From<String> for CellValue {
    fn from(value: String) -> Self {
        CellValue::Text(value)
    }
}

impl From<Vec<u8>> for CellValue {
    fn from(value: Vec<u8>) -> Self {
        CellValue::Bytes(value)
    }
}
