//! Per-datatype value handlers.
//!
//! Every member of a compound table is served by one [`ValueHandler`],
//! chosen by [`handler_for`] from the member's datatype class. A handler
//! checks proposed edits, renders stored values to display text and turns
//! accepted edits into typed [`CellValue`]s.
//!
//! Handlers form a tree mirroring the datatype: compound handlers own one
//! handler per visible member, array and variable-length handlers own the
//! handler of their element. Calls carry the handler-relative column
//! explicitly, so handlers are immutable after construction and may be
//! shared between threads.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//!
//! use hdfview_core::{CellValue, Datatype};
//! use hdfview_table::handler::{handler_for, HandlerKind, RenderContext};
//! use hdfview_table::selection::MemberScope;
//!
//! let handler = handler_for(&Arc::new(Datatype::uint8()), MemberScope::All);
//! assert_eq!(handler.kind(), HandlerKind::Numeric);
//! assert!(handler.validate(0, "255").is_ok());
//! assert!(handler.validate(0, "256").is_err());
//!
//! let mut out = String::new();
//! handler.render(&RenderContext::plain(), 0, &CellValue::UInt(7), &mut out);
//! assert_eq!(out, "7");
//! ```

mod bytes;
mod compound;
mod container;
mod enumeration;
mod fallback;
mod numeric;
mod reference;
mod text;

use std::fmt;
use std::sync::Arc;

use hdfview_core::logging::targets;
use hdfview_core::{CellValue, Datatype, DatatypeClass};

use crate::enum_names::EnumConverter;
use crate::error::HandlerError;
use crate::format::NumberFormat;
use crate::selection::MemberScope;
use crate::validation::ValidationCause;

pub use bytes::ByteHandler;
pub use compound::CompoundHandler;
pub use container::ContainerHandler;
pub use enumeration::EnumHandler;
pub use fallback::DefaultHandler;
pub use numeric::NumericHandler;
pub use reference::ReferenceHandler;
pub use text::{CharHandler, StringHandler};

/// Text shown for a cell without a value.
pub const NULL_TEXT: &str = "Null";

/// Text shown for a cell whose value could not be read.
pub const ERROR_TEXT: &str = "*ERROR*";

/// Which handler implementation serves a member.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HandlerKind {
    Numeric,
    String,
    Char,
    Enum,
    Bitfield,
    Opaque,
    Reference,
    Array,
    VariableLength,
    Compound,
    Default,
}

impl fmt::Display for HandlerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            HandlerKind::Numeric => "numeric",
            HandlerKind::String => "string",
            HandlerKind::Char => "char",
            HandlerKind::Enum => "enum",
            HandlerKind::Bitfield => "bitfield",
            HandlerKind::Opaque => "opaque",
            HandlerKind::Reference => "reference",
            HandlerKind::Array => "array",
            HandlerKind::VariableLength => "variable-length",
            HandlerKind::Compound => "compound",
            HandlerKind::Default => "default",
        };
        f.write_str(name)
    }
}

/// Display options passed down the handler tree while rendering.
#[derive(Clone, Copy)]
pub struct RenderContext<'a> {
    pub number_format: NumberFormat,
    /// Converter used to show enum members by name; `None` shows values.
    pub enum_names: Option<&'a dyn EnumConverter>,
}

impl RenderContext<'static> {
    /// Plain numbers, enum values shown as numbers.
    pub fn plain() -> Self {
        Self {
            number_format: NumberFormat::Plain,
            enum_names: None,
        }
    }
}

impl fmt::Debug for RenderContext<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RenderContext")
            .field("number_format", &self.number_format)
            .field("enum_names", &self.enum_names.is_some())
            .finish()
    }
}

/// Validation, rendering and parsing of one member's values.
pub trait ValueHandler: Send + Sync + fmt::Debug {
    fn kind(&self) -> HandlerKind;

    /// The datatype this handler serves.
    fn datatype(&self) -> &Arc<Datatype>;

    /// Number of table columns the handler spans.
    fn columns(&self) -> usize {
        1
    }

    /// Checks a proposed edit of `column`, relative to this handler.
    fn validate(&self, column: usize, text: &str) -> Result<(), ValidationCause>;

    /// Appends the display text of `value` to `out`.
    fn render(&self, ctx: &RenderContext<'_>, column: usize, value: &CellValue, out: &mut String);

    /// Converts an accepted edit of `column` into the value to store.
    fn parse(&self, column: usize, text: &str) -> Result<CellValue, ValidationCause>;

    /// Number of tokens one value takes inside an array or variable-length
    /// cell.
    ///
    /// Container cells are edited as a flat token list. Most values are one
    /// token; opaque data takes one per byte and a compound element the sum
    /// over its members.
    fn element_tokens(&self) -> usize {
        1
    }

    /// Checks one container element spread over `tokens`.
    ///
    /// A failure carries the offset of the offending token within `tokens`.
    fn validate_element(&self, tokens: &[&str]) -> Result<(), (usize, ValidationCause)> {
        check_token_count(tokens, self.element_tokens()).map_err(|cause| (0, cause))?;
        self.validate(0, &tokens.join(" ")).map_err(|cause| (0, cause))
    }

    /// Builds one whole element from `tokens`.
    ///
    /// Used for the elements of arrays, where a compound element is
    /// entered as a flat list of its leaf values.
    fn parse_element(&self, tokens: &[&str]) -> Result<CellValue, ValidationCause> {
        check_token_count(tokens, self.element_tokens())?;
        self.parse(0, &tokens.join(" "))
    }
}

pub(crate) fn check_token_count(tokens: &[&str], expected: usize) -> Result<(), ValidationCause> {
    if tokens.len() == expected {
        Ok(())
    } else {
        Err(ValidationCause::ElementCount {
            expected,
            found: tokens.len(),
        })
    }
}

/// Chooses and builds the handler for `datatype`.
///
/// Construction failures are logged and answered with a
/// [`DefaultHandler`], which rejects every edit.
pub fn handler_for(datatype: &Arc<Datatype>, scope: MemberScope<'_>) -> Box<dyn ValueHandler> {
    let built: Result<Box<dyn ValueHandler>, HandlerError> = match datatype.class() {
        DatatypeClass::Integer | DatatypeClass::Float => {
            NumericHandler::new(Arc::clone(datatype)).map(boxed)
        }
        DatatypeClass::Char => CharHandler::new(Arc::clone(datatype)).map(boxed),
        DatatypeClass::String => StringHandler::new(Arc::clone(datatype)).map(boxed),
        DatatypeClass::Enum => EnumHandler::new(Arc::clone(datatype)).map(boxed),
        DatatypeClass::Bitfield | DatatypeClass::Opaque => {
            ByteHandler::new(Arc::clone(datatype)).map(boxed)
        }
        DatatypeClass::Reference => ReferenceHandler::new(Arc::clone(datatype)).map(boxed),
        DatatypeClass::VariableLength if datatype.is_var_str() => {
            StringHandler::new(Arc::clone(datatype)).map(boxed)
        }
        DatatypeClass::Array | DatatypeClass::VariableLength => {
            ContainerHandler::new(Arc::clone(datatype)).map(boxed)
        }
        DatatypeClass::Compound => CompoundHandler::new(Arc::clone(datatype), scope).map(boxed),
    };

    match built {
        Ok(handler) => {
            tracing::trace!(
                target: targets::HANDLER,
                kind = %handler.kind(),
                datatype = %datatype,
                "built value handler"
            );
            handler
        }
        Err(err) => {
            tracing::debug!(
                target: targets::HANDLER,
                datatype = %datatype,
                error = %err,
                "falling back to default handler"
            );
            Box::new(DefaultHandler::new(Arc::clone(datatype)))
        }
    }
}

/// One handler per member of `local`, in order.
pub fn build_handlers(
    all_selected: &[Arc<Datatype>],
    local: &[Arc<Datatype>],
) -> Vec<Box<dyn ValueHandler>> {
    local
        .iter()
        .map(|member| handler_for(member, MemberScope::Selected(all_selected)))
        .collect()
}

fn boxed<H: ValueHandler + 'static>(handler: H) -> Box<dyn ValueHandler> {
    Box::new(handler)
}

/// Appends `value` without datatype knowledge.
pub fn render_plain(value: &CellValue, out: &mut String) {
    use std::fmt::Write;

    match value {
        CellValue::Null => out.push_str(NULL_TEXT),
        CellValue::Int(n) => {
            let _ = write!(out, "{n}");
        }
        CellValue::UInt(n) => {
            let _ = write!(out, "{n}");
        }
        CellValue::Float(n) => {
            let _ = write!(out, "{n}");
        }
        CellValue::Text(s) => out.push_str(s),
        CellValue::Bytes(bytes) => out.push_str(&text::bytes_to_text(bytes)),
        CellValue::Array(items) => join(items, out, |item, out| render_plain(item, out)),
        CellValue::Compound(items) => {
            out.push('[');
            join(items, out, |item, out| render_plain(item, out));
            out.push(']');
        }
    }
}

/// Renders `items` separated by `", "`.
pub(crate) fn join<T>(items: &[T], out: &mut String, mut render: impl FnMut(&T, &mut String)) {
    for (index, item) in items.iter().enumerate() {
        if index > 0 {
            out.push_str(", ");
        }
        render(item, out);
    }
}

/// Appends an integer value of a `size`-byte integer, reinterpreting
/// negative bit patterns of unsigned types. Returns `false` when `value`
/// holds no integer.
pub(crate) fn write_integer(value: &CellValue, size: usize, signed: bool, out: &mut String) -> bool {
    use std::fmt::Write;

    match value {
        CellValue::Int(n) if !signed && *n < 0 => {
            let _ = write!(out, "{}", (*n as u64) & unsigned_mask(size));
        }
        CellValue::Int(n) => {
            let _ = write!(out, "{n}");
        }
        CellValue::UInt(n) => {
            let _ = write!(out, "{n}");
        }
        _ => return false,
    }
    true
}

fn unsigned_mask(size: usize) -> u64 {
    if size >= 8 {
        u64::MAX
    } else {
        (1u64 << (size * 8)) - 1
    }
}

/// The stored form of an integer accepted for a signed or unsigned column.
pub(crate) fn integer_value(value: i128, signed: bool) -> CellValue {
    if signed {
        CellValue::Int(value as i64)
    } else {
        CellValue::UInt(value as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hdfview_core::{CompoundMember, EnumMember, IntegerBase, ReferenceKind};

    fn kind_of(datatype: Datatype) -> HandlerKind {
        handler_for(&Arc::new(datatype), MemberScope::All).kind()
    }

    #[test]
    fn test_factory_dispatch() {
        assert_eq!(kind_of(Datatype::int32()), HandlerKind::Numeric);
        assert_eq!(kind_of(Datatype::float64()), HandlerKind::Numeric);
        assert_eq!(kind_of(Datatype::Char { signed: true }), HandlerKind::Char);
        assert_eq!(kind_of(Datatype::fixed_string(4)), HandlerKind::String);
        assert_eq!(kind_of(Datatype::var_string()), HandlerKind::String);
        assert_eq!(
            kind_of(Datatype::vlen(Datatype::fixed_string(1))),
            HandlerKind::String
        );
        assert_eq!(
            kind_of(Datatype::enumeration(
                IntegerBase::new(1, false),
                vec![EnumMember::new("A", 0)]
            )),
            HandlerKind::Enum
        );
        assert_eq!(kind_of(Datatype::Bitfield { size: 2 }), HandlerKind::Bitfield);
        assert_eq!(
            kind_of(Datatype::Opaque {
                size: 2,
                tag: "blob".into()
            }),
            HandlerKind::Opaque
        );
        assert_eq!(
            kind_of(Datatype::Reference {
                size: 8,
                kind: ReferenceKind::Object
            }),
            HandlerKind::Reference
        );
        assert_eq!(
            kind_of(Datatype::array(Datatype::int8(), vec![2])),
            HandlerKind::Array
        );
        assert_eq!(kind_of(Datatype::vlen(Datatype::int8())), HandlerKind::VariableLength);
    }

    #[test]
    fn test_empty_compound_falls_back_to_default() {
        let empty = Datatype::compound(Vec::new()).unwrap();
        let handler = handler_for(&Arc::new(empty), MemberScope::All);
        assert_eq!(handler.kind(), HandlerKind::Default);
        assert_eq!(handler.validate(0, "1"), Err(ValidationCause::NoHandler));
    }

    #[test]
    fn test_build_handlers_one_per_member() {
        let dtype = Datatype::compound(vec![
            CompoundMember::new("a", Datatype::int8()),
            CompoundMember::new("b", Datatype::fixed_string(3)),
        ])
        .unwrap();
        let local = MemberScope::All.filter(&dtype);
        let handlers = build_handlers(&local, &local);
        let kinds: Vec<HandlerKind> = handlers.iter().map(|h| h.kind()).collect();
        assert_eq!(kinds, vec![HandlerKind::Numeric, HandlerKind::String]);
    }

    #[test]
    fn test_render_plain() {
        let mut out = String::new();
        render_plain(
            &CellValue::Compound(vec![CellValue::Int(1), CellValue::Null, "x".into()]),
            &mut out,
        );
        assert_eq!(out, "[1, Null, x]");
    }

    #[test]
    fn test_unsigned_reinterpretation() {
        let mut out = String::new();
        assert!(write_integer(&CellValue::Int(-1), 1, false, &mut out));
        assert_eq!(out, "255");
        out.clear();
        assert!(write_integer(&CellValue::Int(-1), 8, false, &mut out));
        assert_eq!(out, u64::MAX.to_string());
        out.clear();
        assert!(!write_integer(&CellValue::Float(1.0), 4, true, &mut out));
    }
}
