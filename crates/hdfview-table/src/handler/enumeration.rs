use std::sync::Arc;

use hdfview_core::logging::targets;
use hdfview_core::{CellValue, Datatype, IntegerBase};

use super::numeric::parse_integer;
use super::{integer_value, render_plain, write_integer, HandlerKind, RenderContext, ValueHandler};
use crate::enum_names::convert_value_to_name;
use crate::error::HandlerError;
use crate::validation::ValidationCause;

/// Enumeration members.
///
/// Edits may name a member or give a raw value in the range of the
/// underlying integer type.
#[derive(Debug)]
pub struct EnumHandler {
    datatype: Arc<Datatype>,
    base: IntegerBase,
}

impl EnumHandler {
    pub fn new(datatype: Arc<Datatype>) -> Result<Self, HandlerError> {
        match *datatype {
            Datatype::Enum { base, .. } => Ok(Self { datatype, base }),
            _ => Err(HandlerError::class_mismatch("enum", datatype.class())),
        }
    }

    fn value_of(&self, text: &str) -> Result<i128, ValidationCause> {
        let name = text.trim();
        if let Some(member) = self
            .datatype
            .enum_members()
            .iter()
            .find(|member| member.name == name)
        {
            return Ok(i128::from(member.value));
        }
        parse_integer(text, self.base.size, self.base.signed, "enum value").map_err(|cause| match cause {
            ValidationCause::NotANumber { .. } => ValidationCause::UnknownEnumValue {
                text: text.to_string(),
            },
            other => other,
        })
    }
}

impl ValueHandler for EnumHandler {
    fn kind(&self) -> HandlerKind {
        HandlerKind::Enum
    }

    fn datatype(&self) -> &Arc<Datatype> {
        &self.datatype
    }

    fn validate(&self, _column: usize, text: &str) -> Result<(), ValidationCause> {
        self.value_of(text).map(drop)
    }

    fn render(&self, ctx: &RenderContext<'_>, _column: usize, value: &CellValue, out: &mut String) {
        let raw = match value {
            CellValue::Int(n) => Some(*n),
            // Values past i64::MAX have no member to look up
            CellValue::UInt(n) => i64::try_from(*n).ok(),
            _ => None,
        };
        if let (Some(converter), Some(raw)) = (ctx.enum_names, raw) {
            match convert_value_to_name(converter, &self.datatype, raw) {
                Ok(name) => {
                    out.push_str(&name);
                    return;
                }
                Err(err) => {
                    tracing::debug!(
                        target: targets::ENUM_NAMES,
                        value = raw,
                        error = %err,
                        "enum name conversion failed, showing raw value"
                    );
                }
            }
        }
        if !write_integer(value, self.base.size, self.base.signed, out) {
            render_plain(value, out);
        }
    }

    fn parse(&self, _column: usize, text: &str) -> Result<CellValue, ValidationCause> {
        self.value_of(text).map(|value| integer_value(value, self.base.signed))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::enum_names::MemberTableConverter;
    use crate::format::NumberFormat;
    use hdfview_core::EnumMember;

    fn colors() -> EnumHandler {
        EnumHandler::new(Arc::new(Datatype::enumeration(
            IntegerBase::new(1, false),
            vec![
                EnumMember::new("RED", 0),
                EnumMember::new("GREEN", 1),
                EnumMember::new("BLUE", 2),
            ],
        )))
        .unwrap()
    }

    #[test]
    fn test_names_and_values_accepted() {
        let h = colors();
        assert!(h.validate(0, "GREEN").is_ok());
        assert!(h.validate(0, "2").is_ok());
        assert!(h.validate(0, "200").is_ok());
        assert!(matches!(h.validate(0, "300"), Err(ValidationCause::OutOfRange { .. })));
        assert!(matches!(
            h.validate(0, "PURPLE"),
            Err(ValidationCause::UnknownEnumValue { .. })
        ));
        assert_eq!(h.parse(0, "BLUE"), Ok(CellValue::UInt(2)));
    }

    #[test]
    fn test_render_with_and_without_names() {
        let h = colors();
        let converter = MemberTableConverter::new();
        let named = RenderContext {
            number_format: NumberFormat::Plain,
            enum_names: Some(&converter),
        };
        let mut out = String::new();
        h.render(&named, 0, &CellValue::UInt(1), &mut out);
        assert_eq!(out, "GREEN");

        out.clear();
        h.render(&RenderContext::plain(), 0, &CellValue::UInt(1), &mut out);
        assert_eq!(out, "1");

        out.clear();
        h.render(&named, 0, &CellValue::UInt(7), &mut out);
        assert_eq!(out, "7");
        assert_eq!(converter.open_handles(), 0);
    }

    #[test]
    fn test_large_unsigned_value_renders_raw() {
        let h = EnumHandler::new(Arc::new(Datatype::enumeration(
            IntegerBase::new(8, false),
            vec![EnumMember::new("ONE", 1), EnumMember::new("ALL", -1)],
        )))
        .unwrap();
        let converter = MemberTableConverter::new();
        let named = RenderContext {
            number_format: NumberFormat::Plain,
            enum_names: Some(&converter),
        };
        let mut out = String::new();
        h.render(&named, 0, &CellValue::UInt(u64::MAX), &mut out);
        assert_eq!(out, u64::MAX.to_string());
        assert!(h.validate(0, &out).is_ok());
        assert_eq!(converter.open_handles(), 0);
    }
}
