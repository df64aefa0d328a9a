use std::sync::Arc;

use hdfview_core::{CellValue, Datatype};

use super::{
    check_token_count, handler_for, join, render_plain, HandlerKind, RenderContext, ValueHandler,
};
use crate::column_map::ColumnIndexMap;
use crate::error::HandlerError;
use crate::selection::MemberScope;
use crate::validation::ValidationCause;

/// Compound members, and the dataset's own compound type.
///
/// Holds one handler per visible member and a [`ColumnIndexMap`] over the
/// columns those members span. A call for column `c` is routed to the
/// member owning `c % columns()`, with the column made relative to that
/// member's first column. The modulo lets a multi-column dataset reuse the
/// same handler for every repetition of its fields.
#[derive(Debug)]
pub struct CompoundHandler {
    datatype: Arc<Datatype>,
    members: Vec<Box<dyn ValueHandler>>,
    map: ColumnIndexMap,
}

impl CompoundHandler {
    pub fn new(datatype: Arc<Datatype>, scope: MemberScope<'_>) -> Result<Self, HandlerError> {
        if !datatype.is_compound() {
            return Err(HandlerError::class_mismatch("compound", datatype.class()));
        }
        let local = scope.filter(&datatype);
        let map = ColumnIndexMap::build_scoped(scope, &local);
        if map.is_empty() {
            return Err(HandlerError::empty_mapping(datatype.description()));
        }
        let members = local.iter().map(|member| handler_for(member, scope)).collect();
        Ok(Self {
            datatype,
            members,
            map,
        })
    }

    pub fn map(&self) -> &ColumnIndexMap {
        &self.map
    }

    /// Handlers of the visible members, in declaration order.
    pub fn members(&self) -> &[Box<dyn ValueHandler>] {
        &self.members
    }

    /// The member handler owning `column` and the column relative to it.
    pub fn member_at(&self, column: usize) -> Option<(&dyn ValueHandler, usize)> {
        let cell = column % self.map.len();
        let slot = self.map.slot(cell)?;
        let handler = self.members.get(slot.handler)?;
        Some((handler.as_ref(), cell - slot.group_start))
    }

    /// The `width` tokens of the member starting at `offset`.
    fn member_tokens<'t, 's>(
        &self,
        tokens: &'t [&'s str],
        offset: usize,
        width: usize,
    ) -> Result<&'t [&'s str], ValidationCause> {
        tokens
            .get(offset..offset + width)
            .ok_or_else(|| ValidationCause::ElementCount {
                expected: self.element_tokens(),
                found: tokens.len(),
            })
    }
}

impl ValueHandler for CompoundHandler {
    fn kind(&self) -> HandlerKind {
        HandlerKind::Compound
    }

    fn datatype(&self) -> &Arc<Datatype> {
        &self.datatype
    }

    fn columns(&self) -> usize {
        self.map.len()
    }

    fn validate(&self, column: usize, text: &str) -> Result<(), ValidationCause> {
        let (handler, relative) = self.member_at(column).ok_or(ValidationCause::NoHandler)?;
        handler.validate(relative, text)
    }

    fn render(&self, ctx: &RenderContext<'_>, column: usize, value: &CellValue, out: &mut String) {
        if let CellValue::Compound(items) = value {
            out.push('[');
            let mut index = 0;
            join(items, out, |item, out| {
                match self.members.get(index) {
                    Some(handler) => handler.render(ctx, 0, item, out),
                    None => render_plain(item, out),
                }
                index += 1;
            });
            out.push(']');
            return;
        }
        match self.member_at(column) {
            Some((handler, relative)) => handler.render(ctx, relative, value, out),
            None => render_plain(value, out),
        }
    }

    fn parse(&self, column: usize, text: &str) -> Result<CellValue, ValidationCause> {
        let (handler, relative) = self.member_at(column).ok_or(ValidationCause::NoHandler)?;
        handler.parse(relative, text)
    }

    fn element_tokens(&self) -> usize {
        self.members.iter().map(|handler| handler.element_tokens()).sum()
    }

    fn validate_element(&self, tokens: &[&str]) -> Result<(), (usize, ValidationCause)> {
        let mut offset = 0;
        for handler in &self.members {
            let head = self
                .member_tokens(tokens, offset, handler.element_tokens())
                .map_err(|cause| (0, cause))?;
            handler
                .validate_element(head)
                .map_err(|(inner, cause)| (offset + inner, cause))?;
            offset += head.len();
        }
        check_token_count(tokens, offset).map_err(|cause| (0, cause))
    }

    fn parse_element(&self, tokens: &[&str]) -> Result<CellValue, ValidationCause> {
        let mut offset = 0;
        let mut values = Vec::with_capacity(self.members.len());
        for handler in &self.members {
            let head = self.member_tokens(tokens, offset, handler.element_tokens())?;
            values.push(handler.parse_element(head)?);
            offset += head.len();
        }
        check_token_count(tokens, offset)?;
        Ok(CellValue::Compound(values))
    }
}
