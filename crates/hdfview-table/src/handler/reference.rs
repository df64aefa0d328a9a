use std::sync::Arc;

use hdfview_core::{integer_range, CellValue, Datatype};

use super::{render_plain, HandlerKind, RenderContext, ValueHandler};
use crate::error::HandlerError;
use crate::validation::ValidationCause;

/// Object and region reference members, shown as unsigned addresses.
#[derive(Debug)]
pub struct ReferenceHandler {
    datatype: Arc<Datatype>,
    size: usize,
}

impl ReferenceHandler {
    pub fn new(datatype: Arc<Datatype>) -> Result<Self, HandlerError> {
        match *datatype {
            Datatype::Reference { size, .. } => Ok(Self { datatype, size }),
            _ => Err(HandlerError::class_mismatch("reference", datatype.class())),
        }
    }

    /// Accepts decimal or `0x`-prefixed hexadecimal addresses.
    fn address_of(&self, text: &str) -> Result<u64, ValidationCause> {
        let trimmed = text.trim();
        let parsed = match trimmed.strip_prefix("0x").or_else(|| trimmed.strip_prefix("0X")) {
            Some(hex) => u64::from_str_radix(hex, 16),
            None => trimmed.parse::<u64>(),
        };
        let max = integer_range(self.size.min(8), false).map_or(i128::from(u64::MAX), |(_, max)| max);
        let address = parsed.map_err(|_| {
            if trimmed.starts_with('-') {
                ValidationCause::negative_unsigned(text)
            } else if !trimmed.is_empty() && trimmed.bytes().all(|b| b.is_ascii_digit()) {
                ValidationCause::out_of_range(text, 0, max)
            } else {
                ValidationCause::not_a_number(text, "reference address")
            }
        })?;
        if i128::from(address) > max {
            return Err(ValidationCause::out_of_range(text, 0, max));
        }
        Ok(address)
    }
}

impl ValueHandler for ReferenceHandler {
    fn kind(&self) -> HandlerKind {
        HandlerKind::Reference
    }

    fn datatype(&self) -> &Arc<Datatype> {
        &self.datatype
    }

    fn validate(&self, _column: usize, text: &str) -> Result<(), ValidationCause> {
        self.address_of(text).map(drop)
    }

    fn render(&self, _ctx: &RenderContext<'_>, _column: usize, value: &CellValue, out: &mut String) {
        match value {
            CellValue::Int(n) => out.push_str(&(*n as u64).to_string()),
            CellValue::UInt(n) => out.push_str(&n.to_string()),
            other => render_plain(other, out),
        }
    }

    fn parse(&self, _column: usize, text: &str) -> Result<CellValue, ValidationCause> {
        self.address_of(text).map(CellValue::UInt)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hdfview_core::ReferenceKind;

    fn reference(size: usize) -> ReferenceHandler {
        ReferenceHandler::new(Arc::new(Datatype::Reference {
            size,
            kind: ReferenceKind::Object,
        }))
        .unwrap()
    }

    #[test]
    fn test_addresses() {
        let h = reference(8);
        assert_eq!(h.parse(0, "1024"), Ok(CellValue::UInt(1024)));
        assert_eq!(h.parse(0, "0x400"), Ok(CellValue::UInt(1024)));
        assert!(matches!(h.validate(0, "-1"), Err(ValidationCause::NegativeUnsigned { .. })));
        assert!(matches!(h.validate(0, "obj"), Err(ValidationCause::NotANumber { .. })));
    }

    #[test]
    fn test_small_reference_range() {
        let h = reference(4);
        assert!(h.validate(0, "4294967295").is_ok());
        assert!(matches!(
            h.validate(0, "4294967296"),
            Err(ValidationCause::OutOfRange { .. })
        ));
    }

    #[test]
    fn test_render_unsigned() {
        let mut out = String::new();
        reference(8).render(&RenderContext::plain(), 0, &CellValue::Int(-1), &mut out);
        assert_eq!(out, u64::MAX.to_string());
    }
}
