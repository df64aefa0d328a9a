use std::sync::Arc;

use hdfview_core::{CellValue, Datatype};

use super::{handler_for, join, render_plain, HandlerKind, RenderContext, ValueHandler};
use crate::error::HandlerError;
use crate::selection::MemberScope;
use crate::validation::ValidationCause;

fn is_delimiter(c: char) -> bool {
    c.is_whitespace() || matches!(c, ',' | '[' | ']' | ')')
}

/// Splits container text into element tokens.
///
/// Whitespace, commas and brackets separate tokens. A parenthesised group
/// stays one token, so a nested variable-length value such as `(1, 2)`
/// reaches its own handler whole.
fn tokenize(text: &str) -> Vec<&str> {
    let mut tokens = Vec::new();
    let mut start = None;
    let mut depth = 0usize;
    for (index, c) in text.char_indices() {
        if depth > 0 {
            match c {
                '(' => depth += 1,
                ')' => depth -= 1,
                _ => {}
            }
        } else if c == '(' {
            if start.is_none() {
                start = Some(index);
            }
            depth = 1;
        } else if is_delimiter(c) {
            if let Some(begin) = start.take() {
                tokens.push(&text[begin..index]);
            }
        } else if start.is_none() {
            start = Some(index);
        }
    }
    if let Some(begin) = start {
        tokens.push(&text[begin..]);
    }
    tokens
}

/// Removes the parentheses enclosing a whole variable-length value.
fn strip_parens(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(inner) = trimmed.strip_prefix('(') else {
        return trimmed;
    };
    let mut depth = 1usize;
    for (index, c) in inner.char_indices() {
        match c {
            '(' => depth += 1,
            ')' => {
                depth -= 1;
                if depth == 0 {
                    return if index + 1 == inner.len() {
                        &inner[..index]
                    } else {
                        trimmed
                    };
                }
            }
            _ => {}
        }
    }
    inner
}

/// Array and variable-length members.
///
/// The whole sequence lives in one table column and is edited as a list of
/// element values. Elements are checked by the handler of the base type;
/// an element may span several tokens, one per leaf of a compound or one
/// per byte of opaque data.
#[derive(Debug)]
pub struct ContainerHandler {
    datatype: Arc<Datatype>,
    base: Box<dyn ValueHandler>,
    /// Required token count, for fixed-size arrays of non-string elements.
    expected_tokens: Option<usize>,
}

impl ContainerHandler {
    pub fn new(datatype: Arc<Datatype>) -> Result<Self, HandlerError> {
        let base_type = match datatype.base() {
            Some(base) => Arc::clone(base),
            None => return Err(HandlerError::class_mismatch("container", datatype.class())),
        };
        // The element occupies a single column, so all of its members take part
        let base = handler_for(&base_type, MemberScope::All);
        let expected_tokens = match *datatype {
            Datatype::Array { .. } if !base_type.is_string() && !base_type.is_var_str() => {
                Some(datatype.array_order() * base.element_tokens().max(1))
            }
            _ => None,
        };
        Ok(Self {
            datatype,
            base,
            expected_tokens,
        })
    }

    fn is_array(&self) -> bool {
        matches!(*self.datatype, Datatype::Array { .. })
    }

    fn tokenize<'t>(&self, text: &'t str) -> Vec<&'t str> {
        if self.is_array() {
            tokenize(text)
        } else {
            tokenize(strip_parens(text))
        }
    }

    /// Byte size of one element when elements are opaque or bitfield data.
    fn packed_element_size(&self) -> Option<usize> {
        match **self.datatype.base()? {
            Datatype::Bitfield { size } | Datatype::Opaque { size, .. } if size > 0 => Some(size),
            _ => None,
        }
    }

    fn element_width(&self) -> usize {
        self.base.element_tokens().max(1)
    }

    fn check_count(&self, tokens: &[&str]) -> Result<(), ValidationCause> {
        let found = tokens.len();
        let width = self.element_width();
        match self.expected_tokens {
            Some(expected) if found != expected => Err(ValidationCause::ElementCount { expected, found }),
            None if found % width != 0 => Err(ValidationCause::ElementCount {
                expected: found.next_multiple_of(width),
                found,
            }),
            _ => Ok(()),
        }
    }

    /// Checks every element, reporting the offending token index.
    fn check_elements(&self, tokens: &[&str]) -> Result<(), (usize, ValidationCause)> {
        let width = self.element_width();
        for (index, chunk) in tokens.chunks(width).enumerate() {
            self.base
                .validate_element(chunk)
                .map_err(|(offset, cause)| (index * width + offset, cause))?;
        }
        Ok(())
    }

    fn parse_tokens(&self, tokens: &[&str]) -> Result<CellValue, ValidationCause> {
        let width = self.element_width();
        let items = tokens
            .chunks(width)
            .enumerate()
            .map(|(index, chunk)| {
                self.base
                    .parse_element(chunk)
                    .map_err(|cause| ValidationCause::element(index * width, cause))
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(CellValue::Array(items))
    }
}

impl ValueHandler for ContainerHandler {
    fn kind(&self) -> HandlerKind {
        if self.is_array() {
            HandlerKind::Array
        } else {
            HandlerKind::VariableLength
        }
    }

    fn datatype(&self) -> &Arc<Datatype> {
        &self.datatype
    }

    fn validate(&self, _column: usize, text: &str) -> Result<(), ValidationCause> {
        let tokens = self.tokenize(text);
        self.check_count(&tokens)?;
        self.check_elements(&tokens)
            .map_err(|(index, cause)| ValidationCause::element(index, cause))
    }

    fn render(&self, ctx: &RenderContext<'_>, _column: usize, value: &CellValue, out: &mut String) {
        let vlen = !self.is_array();
        if vlen {
            out.push('(');
        }
        match (value, self.packed_element_size()) {
            (CellValue::Array(items), _) => {
                join(items, out, |item, out| self.base.render(ctx, 0, item, out))
            }
            // Opaque and bitfield arrays may arrive as one contiguous buffer
            (CellValue::Bytes(bytes), Some(size)) => {
                let elements: Vec<CellValue> = bytes
                    .chunks(size)
                    .map(|chunk| CellValue::Bytes(chunk.to_vec()))
                    .collect();
                join(&elements, out, |item, out| self.base.render(ctx, 0, item, out));
            }
            _ => render_plain(value, out),
        }
        if vlen {
            out.push(')');
        }
    }

    fn parse(&self, _column: usize, text: &str) -> Result<CellValue, ValidationCause> {
        let tokens = self.tokenize(text);
        self.check_count(&tokens)?;
        self.parse_tokens(&tokens)
    }

    // A variable-length value nested in another container is one
    // parenthesised token; a nested array contributes all of its tokens.
    fn element_tokens(&self) -> usize {
        match self.expected_tokens {
            Some(expected) => expected,
            None if self.is_array() => self.datatype.array_order(),
            None => 1,
        }
    }

    fn validate_element(&self, tokens: &[&str]) -> Result<(), (usize, ValidationCause)> {
        if !self.is_array() {
            return match tokens {
                [token] => self.validate(0, token).map_err(|cause| (0, cause)),
                _ => Err((
                    0,
                    ValidationCause::ElementCount {
                        expected: 1,
                        found: tokens.len(),
                    },
                )),
            };
        }
        self.check_count(tokens).map_err(|cause| (0, cause))?;
        self.check_elements(tokens)
    }

    fn parse_element(&self, tokens: &[&str]) -> Result<CellValue, ValidationCause> {
        if !self.is_array() {
            return match tokens {
                [token] => self.parse(0, token),
                _ => Err(ValidationCause::ElementCount {
                    expected: 1,
                    found: tokens.len(),
                }),
            };
        }
        self.check_count(tokens)?;
        self.parse_tokens(tokens)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hdfview_core::CompoundMember;

    fn container(datatype: Datatype) -> ContainerHandler {
        ContainerHandler::new(Arc::new(datatype)).unwrap()
    }

    fn u16_array() -> ContainerHandler {
        container(Datatype::array(Datatype::uint16(), vec![3]))
    }

    #[test]
    fn test_array_render() {
        let mut out = String::new();
        u16_array().render(
            &RenderContext::plain(),
            0,
            &CellValue::Array(vec![4u64.into(), 5u64.into(), 6u64.into()]),
            &mut out,
        );
        assert_eq!(out, "4, 5, 6");
    }

    #[test]
    fn test_array_validate() {
        let h = u16_array();
        assert!(h.validate(0, "4, 5, 6").is_ok());
        assert!(h.validate(0, "[4 5 6]").is_ok());
        let err = h.validate(0, "4, 5, 70000").unwrap_err();
        match err {
            ValidationCause::Element { index, cause } => {
                assert_eq!(index, 2);
                assert!(matches!(*cause, ValidationCause::OutOfRange { .. }));
            }
            other => panic!("unexpected cause {other:?}"),
        }
        assert_eq!(
            h.validate(0, "4, 5"),
            Err(ValidationCause::ElementCount { expected: 3, found: 2 })
        );
    }

    #[test]
    fn test_string_array_skips_count() {
        let h = container(Datatype::array(Datatype::fixed_string(4), vec![2]));
        assert!(h.validate(0, "ab, cd, ef").is_ok());
        assert!(matches!(
            h.validate(0, "abcdef"),
            Err(ValidationCause::Element { index: 0, .. })
        ));
    }

    #[test]
    fn test_vlen() {
        let h = container(Datatype::vlen(Datatype::int8()));
        assert_eq!(h.kind(), HandlerKind::VariableLength);
        assert!(h.validate(0, "(1, 2, 3, 4)").is_ok());
        assert!(h.validate(0, "()").is_ok());
        assert!(matches!(
            h.validate(0, "(1, 200)"),
            Err(ValidationCause::Element { index: 1, .. })
        ));
        let mut out = String::new();
        h.render(
            &RenderContext::plain(),
            0,
            &CellValue::Array(vec![1i64.into(), 2i64.into()]),
            &mut out,
        );
        assert_eq!(out, "(1, 2)");
        assert_eq!(
            h.parse(0, "(1, 2)"),
            Ok(CellValue::Array(vec![CellValue::Int(1), CellValue::Int(2)]))
        );
    }

    #[test]
    fn test_packed_bitfield_array() {
        let h = container(Datatype::array(Datatype::Bitfield { size: 2 }, vec![3]));
        let mut out = String::new();
        h.render(
            &RenderContext::plain(),
            0,
            &CellValue::Bytes(vec![0x01, 0x02, 0x03, 0x04, 0x05, 0x06]),
            &mut out,
        );
        assert_eq!(out, "01:02, 03:04, 05:06");
        assert!(h.validate(0, &out).is_ok());
    }

    fn accepts_own_rendering(h: &ContainerHandler, value: &CellValue) -> String {
        let mut out = String::new();
        h.render(&RenderContext::plain(), 0, value, &mut out);
        assert_eq!(h.validate(0, &out), Ok(()), "rendered {out:?}");
        out
    }

    fn opaque(size: usize) -> Datatype {
        Datatype::Opaque {
            size,
            tag: "blob".into(),
        }
    }

    #[test]
    fn test_tokenize_keeps_groups() {
        assert_eq!(tokenize("(1, 2), (3)"), vec!["(1, 2)", "(3)"]);
        assert_eq!(tokenize("[4 5,6]"), vec!["4", "5", "6"]);
        assert_eq!(tokenize("((1), 2), x"), vec!["((1), 2)", "x"]);
        assert_eq!(strip_parens(" (1, 2) "), "1, 2");
        assert_eq!(strip_parens("(1), (2)"), "(1), (2)");
        assert_eq!(strip_parens("(1, 2"), "1, 2");
    }

    #[test]
    fn test_opaque_array_accepts_rendering() {
        let h = container(Datatype::array(opaque(2), vec![2]));
        let value = CellValue::Array(vec![
            CellValue::Bytes(vec![0x01, 0x02]),
            CellValue::Bytes(vec![0x03, 0x04]),
        ]);
        assert_eq!(accepts_own_rendering(&h, &value), "01 02, 03 04");
        assert_eq!(h.parse(0, "01 02, 03 04"), Ok(value));
        assert_eq!(
            h.validate(0, "01 02, 03"),
            Err(ValidationCause::ElementCount { expected: 4, found: 3 })
        );
    }

    #[test]
    fn test_opaque_vlen_accepts_rendering() {
        let h = container(Datatype::vlen(opaque(2)));
        let value = CellValue::Array(vec![CellValue::Bytes(vec![0x01, 0x02])]);
        assert_eq!(accepts_own_rendering(&h, &value), "(01 02)");
        assert!(matches!(
            h.validate(0, "(01 02 03)"),
            Err(ValidationCause::ElementCount { expected: 4, found: 3 })
        ));
    }

    #[test]
    fn test_array_of_vlen_accepts_rendering() {
        let h = container(Datatype::array(Datatype::vlen(Datatype::int8()), vec![2]));
        let value = CellValue::Array(vec![
            CellValue::Array(vec![CellValue::Int(1), CellValue::Int(2)]),
            CellValue::Array(vec![CellValue::Int(3)]),
        ]);
        assert_eq!(accepts_own_rendering(&h, &value), "(1, 2), (3)");
        assert_eq!(h.parse(0, "(1, 2), (3)"), Ok(value));
        assert_eq!(
            h.validate(0, "(1, 2), (3, 300)"),
            Err(ValidationCause::element(
                1,
                ValidationCause::element(1, ValidationCause::out_of_range("300", -128, 127))
            ))
        );
        assert_eq!(
            h.validate(0, "(1, 2)"),
            Err(ValidationCause::ElementCount { expected: 2, found: 1 })
        );
    }

    #[test]
    fn test_array_of_compound_with_array_member() {
        let element = Datatype::compound(vec![
            CompoundMember::new("a", Datatype::int8()),
            CompoundMember::new("v", Datatype::array(Datatype::int8(), vec![2])),
        ])
        .unwrap();
        let h = container(Datatype::array(element, vec![1]));
        let value = CellValue::Array(vec![CellValue::Compound(vec![
            CellValue::Int(1),
            CellValue::Array(vec![CellValue::Int(2), CellValue::Int(3)]),
        ])]);
        assert_eq!(accepts_own_rendering(&h, &value), "[1, 2, 3]");
        assert_eq!(h.parse(0, "[1, 2, 3]"), Ok(value));
        assert_eq!(
            h.validate(0, "1, 2, -300"),
            Err(ValidationCause::element(2, ValidationCause::out_of_range("-300", -128, 127)))
        );
    }

    #[test]
    fn test_vlen_of_compound_needs_whole_elements() {
        let element = Datatype::compound(vec![
            CompoundMember::new("x", Datatype::int8()),
            CompoundMember::new("y", Datatype::int8()),
        ])
        .unwrap();
        let h = container(Datatype::vlen(element));
        assert!(h.validate(0, "([1, 2], [3, 4])").is_ok());
        assert_eq!(
            h.validate(0, "([1, 2], [3])"),
            Err(ValidationCause::ElementCount { expected: 4, found: 3 })
        );
    }

    #[test]
    fn test_array_of_compound() {
        let point = Datatype::compound(vec![
            CompoundMember::new("x", Datatype::int8()),
            CompoundMember::new("y", Datatype::uint8()),
        ])
        .unwrap();
        let h = container(Datatype::array(point, vec![2]));
        assert!(h.validate(0, "[1, 2], [3, 4]").is_ok());
        assert_eq!(
            h.validate(0, "1, 2, 3, -4"),
            Err(ValidationCause::element(3, ValidationCause::negative_unsigned("-4")))
        );
        let parsed = h.parse(0, "1, 2, 3, 4").unwrap();
        assert_eq!(
            parsed,
            CellValue::Array(vec![
                CellValue::Compound(vec![CellValue::Int(1), CellValue::UInt(2)]),
                CellValue::Compound(vec![CellValue::Int(3), CellValue::UInt(4)]),
            ])
        );
        let mut out = String::new();
        h.render(&RenderContext::plain(), 0, &parsed, &mut out);
        assert_eq!(out, "[1, 2], [3, 4]");
    }
}
