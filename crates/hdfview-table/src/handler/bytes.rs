use std::fmt::Write;
use std::sync::{Arc, OnceLock};

use hdfview_core::{CellValue, Datatype};
use regex::Regex;

use super::{render_plain, HandlerKind, RenderContext, ValueHandler};
use crate::error::HandlerError;
use crate::validation::ValidationCause;

static HEX_BYTE: OnceLock<Option<Regex>> = OnceLock::new();

fn hex_byte() -> Option<&'static Regex> {
    HEX_BYTE
        .get_or_init(|| Regex::new(r"^[0-9A-Fa-f]{1,2}$").ok())
        .as_ref()
}

/// Bitfield and opaque members, shown as hexadecimal bytes.
#[derive(Debug)]
pub struct ByteHandler {
    datatype: Arc<Datatype>,
    kind: HandlerKind,
    size: usize,
}

impl ByteHandler {
    pub fn new(datatype: Arc<Datatype>) -> Result<Self, HandlerError> {
        let (kind, size) = match *datatype {
            Datatype::Bitfield { size } => (HandlerKind::Bitfield, size),
            Datatype::Opaque { size, .. } => (HandlerKind::Opaque, size),
            _ => return Err(HandlerError::class_mismatch("byte", datatype.class())),
        };
        Ok(Self {
            datatype,
            kind,
            size,
        })
    }

    fn separator(&self) -> char {
        match self.kind {
            HandlerKind::Bitfield => ':',
            _ => ' ',
        }
    }

    fn decode(&self, text: &str) -> Result<Vec<u8>, ValidationCause> {
        let malformed = || ValidationCause::MalformedBytes {
            text: text.to_string(),
            expected: self.size,
        };
        let pattern = hex_byte().ok_or_else(malformed)?;
        let tokens: Vec<&str> = text
            .split(|c: char| c == ':' || c == ',' || c.is_whitespace())
            .filter(|token| !token.is_empty())
            .collect();
        if tokens.len() != self.size {
            return Err(malformed());
        }
        tokens
            .into_iter()
            .map(|token| {
                if !pattern.is_match(token) {
                    return Err(malformed());
                }
                u8::from_str_radix(token, 16).map_err(|_| malformed())
            })
            .collect()
    }
}

impl ValueHandler for ByteHandler {
    fn kind(&self) -> HandlerKind {
        self.kind
    }

    fn datatype(&self) -> &Arc<Datatype> {
        &self.datatype
    }

    // Opaque bytes are space separated, so each byte is its own token
    fn element_tokens(&self) -> usize {
        match self.kind {
            HandlerKind::Opaque => self.size.max(1),
            _ => 1,
        }
    }

    fn validate(&self, _column: usize, text: &str) -> Result<(), ValidationCause> {
        self.decode(text).map(drop)
    }

    fn render(&self, _ctx: &RenderContext<'_>, _column: usize, value: &CellValue, out: &mut String) {
        match value {
            CellValue::Bytes(bytes) => {
                for (index, byte) in bytes.iter().enumerate() {
                    if index > 0 {
                        out.push(self.separator());
                    }
                    let _ = write!(out, "{byte:02x}");
                }
            }
            other => render_plain(other, out),
        }
    }

    fn parse(&self, _column: usize, text: &str) -> Result<CellValue, ValidationCause> {
        self.decode(text).map(CellValue::Bytes)
    }
}
