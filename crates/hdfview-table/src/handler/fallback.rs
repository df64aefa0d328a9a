use std::sync::Arc;

use hdfview_core::{CellValue, Datatype};

use super::{render_plain, HandlerKind, RenderContext, ValueHandler};
use crate::validation::ValidationCause;

/// Handler for datatypes no specific handler could be built for.
///
/// Values are still displayed, but every edit is refused.
#[derive(Debug)]
pub struct DefaultHandler {
    datatype: Arc<Datatype>,
}

impl DefaultHandler {
    pub fn new(datatype: Arc<Datatype>) -> Self {
        Self { datatype }
    }
}

impl ValueHandler for DefaultHandler {
    fn kind(&self) -> HandlerKind {
        HandlerKind::Default
    }

    fn datatype(&self) -> &Arc<Datatype> {
        &self.datatype
    }

    fn validate(&self, _column: usize, _text: &str) -> Result<(), ValidationCause> {
        Err(ValidationCause::NoHandler)
    }

    fn render(&self, _ctx: &RenderContext<'_>, _column: usize, value: &CellValue, out: &mut String) {
        render_plain(value, out);
    }

    fn parse(&self, _column: usize, _text: &str) -> Result<CellValue, ValidationCause> {
        Err(ValidationCause::NoHandler)
    }
}
