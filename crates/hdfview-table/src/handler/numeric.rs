use std::num::IntErrorKind;
use std::sync::Arc;

use hdfview_core::{integer_range, CellValue, Datatype};

use super::{integer_value, render_plain, write_integer, HandlerKind, RenderContext, ValueHandler};
use crate::error::HandlerError;
use crate::validation::ValidationCause;

/// Integer and floating-point members.
#[derive(Debug)]
pub struct NumericHandler {
    datatype: Arc<Datatype>,
}

impl NumericHandler {
    pub fn new(datatype: Arc<Datatype>) -> Result<Self, HandlerError> {
        match *datatype {
            Datatype::Integer { .. } | Datatype::Float { .. } => Ok(Self { datatype }),
            _ => Err(HandlerError::class_mismatch("numeric", datatype.class())),
        }
    }
}

impl ValueHandler for NumericHandler {
    fn kind(&self) -> HandlerKind {
        HandlerKind::Numeric
    }

    fn datatype(&self) -> &Arc<Datatype> {
        &self.datatype
    }

    fn validate(&self, column: usize, text: &str) -> Result<(), ValidationCause> {
        self.parse(column, text).map(drop)
    }

    fn render(&self, ctx: &RenderContext<'_>, _column: usize, value: &CellValue, out: &mut String) {
        match (&*self.datatype, value) {
            (Datatype::Integer { size, signed }, _) => {
                if !write_integer(value, *size, *signed, out) {
                    render_plain(value, out);
                }
            }
            (Datatype::Float { size: 4 }, CellValue::Float(n)) => {
                ctx.number_format.write_f32(*n as f32, out)
            }
            (Datatype::Float { .. }, CellValue::Float(n)) => ctx.number_format.write_f64(*n, out),
            (Datatype::Float { .. }, CellValue::Int(_) | CellValue::UInt(_)) => match value.as_f64() {
                Some(n) => ctx.number_format.write_f64(n, out),
                None => render_plain(value, out),
            },
            _ => render_plain(value, out),
        }
    }

    fn parse(&self, _column: usize, text: &str) -> Result<CellValue, ValidationCause> {
        match *self.datatype {
            Datatype::Integer { size, signed } => {
                let value = parse_integer(text, size, signed, &self.datatype.description())?;
                Ok(integer_value(value, signed))
            }
            Datatype::Float { size } => parse_float(text, size).map(CellValue::Float),
            _ => Err(ValidationCause::NoHandler),
        }
    }
}

/// Parses `text` as an integer of `size` bytes.
///
/// Parsing goes through `i128`, so every 8-byte unsigned value is compared
/// exactly against its range.
pub(crate) fn parse_integer(
    text: &str,
    size: usize,
    signed: bool,
    expected: &str,
) -> Result<i128, ValidationCause> {
    let (min, max) = integer_range(size, signed).ok_or(ValidationCause::UnsupportedSize { size })?;
    let value = text.trim().parse::<i128>().map_err(|err| match err.kind() {
        IntErrorKind::PosOverflow => ValidationCause::out_of_range(text, min, max),
        IntErrorKind::NegOverflow if !signed => ValidationCause::negative_unsigned(text),
        IntErrorKind::NegOverflow => ValidationCause::out_of_range(text, min, max),
        _ => ValidationCause::not_a_number(text, expected),
    })?;

    if !signed && value < 0 {
        return Err(ValidationCause::negative_unsigned(text));
    }
    if value < min || value > max {
        return Err(ValidationCause::out_of_range(text, min, max));
    }
    Ok(value)
}

fn parse_float(text: &str, size: usize) -> Result<f64, ValidationCause> {
    let trimmed = text.trim();
    let explicit_infinity = trimmed.to_ascii_lowercase().contains("inf");
    let value = match size {
        4 => trimmed.parse::<f32>().map(f64::from),
        8 => trimmed.parse::<f64>(),
        _ => return Err(ValidationCause::UnsupportedSize { size }),
    }
    .map_err(|_| ValidationCause::not_a_number(text, format!("{}-bit floating-point", size * 8)))?;

    if value.is_infinite() && !explicit_infinity {
        return Err(ValidationCause::FloatOverflow {
            text: text.to_string(),
            bits: size * 8,
        });
    }
    Ok(value)
}
