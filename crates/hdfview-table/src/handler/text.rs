use std::fmt::Write;
use std::sync::Arc;

use hdfview_core::{CellValue, Datatype, StringLength};

use super::numeric::parse_integer;
use super::{integer_value, render_plain, write_integer, HandlerKind, RenderContext, ValueHandler};
use crate::error::HandlerError;
use crate::validation::ValidationCause;

/// Fixed and variable-length string members.
#[derive(Debug)]
pub struct StringHandler {
    datatype: Arc<Datatype>,
    /// Byte limit of fixed-length strings.
    limit: Option<usize>,
}

impl StringHandler {
    pub fn new(datatype: Arc<Datatype>) -> Result<Self, HandlerError> {
        let limit = match &*datatype {
            Datatype::String {
                length: StringLength::Fixed(size),
            } => Some(*size),
            Datatype::String { .. } => None,
            other if other.is_var_str() => None,
            other => return Err(HandlerError::class_mismatch("string", other.class())),
        };
        Ok(Self { datatype, limit })
    }
}

impl ValueHandler for StringHandler {
    fn kind(&self) -> HandlerKind {
        HandlerKind::String
    }

    fn datatype(&self) -> &Arc<Datatype> {
        &self.datatype
    }

    fn validate(&self, _column: usize, text: &str) -> Result<(), ValidationCause> {
        match self.limit {
            Some(limit) if text.len() > limit => Err(ValidationCause::StringTooLong {
                overage: text.len() - limit,
            }),
            _ => Ok(()),
        }
    }

    fn render(&self, _ctx: &RenderContext<'_>, _column: usize, value: &CellValue, out: &mut String) {
        match value {
            CellValue::Text(text) => out.push_str(text),
            CellValue::Bytes(bytes) => out.push_str(&bytes_to_text(bytes)),
            other => render_plain(other, out),
        }
    }

    fn parse(&self, column: usize, text: &str) -> Result<CellValue, ValidationCause> {
        self.validate(column, text)?;
        Ok(CellValue::Text(text.to_string()))
    }
}

/// Decodes a stored fixed-length string: bytes up to the first NUL,
/// trailing padding removed.
pub(crate) fn bytes_to_text(bytes: &[u8]) -> String {
    let end = bytes.iter().position(|&b| b == 0).unwrap_or(bytes.len());
    String::from_utf8_lossy(&bytes[..end]).trim_end().to_string()
}

/// Single-byte character members.
#[derive(Debug)]
pub struct CharHandler {
    datatype: Arc<Datatype>,
    signed: bool,
}

impl CharHandler {
    pub fn new(datatype: Arc<Datatype>) -> Result<Self, HandlerError> {
        match *datatype {
            Datatype::Char { signed } => Ok(Self { datatype, signed }),
            _ => Err(HandlerError::class_mismatch("char", datatype.class())),
        }
    }

    fn max_code(&self) -> u32 {
        if self.signed { 0x7f } else { 0xff }
    }

    /// A lone non-digit character is taken literally; anything else must be
    /// a character code.
    fn code_of(&self, text: &str) -> Result<i128, ValidationCause> {
        let mut chars = text.chars();
        if let (Some(c), None) = (chars.next(), chars.next()) {
            if !c.is_ascii_digit() {
                let code = c as u32;
                if code > self.max_code() {
                    return Err(ValidationCause::InvalidCharacter {
                        text: text.to_string(),
                    });
                }
                return Ok(i128::from(code));
            }
        }
        parse_integer(text, 1, self.signed, "character code").map_err(|cause| match cause {
            ValidationCause::NotANumber { .. } => ValidationCause::InvalidCharacter {
                text: text.to_string(),
            },
            other => other,
        })
    }
}

impl ValueHandler for CharHandler {
    fn kind(&self) -> HandlerKind {
        HandlerKind::Char
    }

    fn datatype(&self) -> &Arc<Datatype> {
        &self.datatype
    }

    fn validate(&self, _column: usize, text: &str) -> Result<(), ValidationCause> {
        self.code_of(text).map(drop)
    }

    fn render(&self, _ctx: &RenderContext<'_>, _column: usize, value: &CellValue, out: &mut String) {
        let code = match value {
            CellValue::Int(n) if !self.signed => Some((*n as u64) & 0xff),
            CellValue::Int(n) => u64::try_from(*n).ok(),
            CellValue::UInt(n) => Some(*n),
            _ => None,
        };
        match code.and_then(|c| u8::try_from(c).ok()) {
            // Digits and list delimiters are shown by code
            Some(byte)
                if byte.is_ascii_graphic()
                    && !byte.is_ascii_digit()
                    && !matches!(byte, b',' | b'[' | b']' | b'(' | b')') =>
            {
                out.push(char::from(byte))
            }
            Some(byte) => {
                let _ = write!(out, "{byte}");
            }
            None => {
                if !write_integer(value, 1, self.signed, out) {
                    render_plain(value, out);
                }
            }
        }
    }

    fn parse(&self, _column: usize, text: &str) -> Result<CellValue, ValidationCause> {
        self.code_of(text).map(|code| integer_value(code, self.signed))
    }
}
