//! Table adapter over a compound dataset.
//!
//! [`CompoundTableModel`] presents the selected members of a compound
//! dataset as a grid. Each selected leaf member is one field; a dataset
//! with several columns per row repeats the fields, so the table has
//! `width * fields` columns and column `c` shows field `c % fields` of
//! repetition `c / fields`.
//!
//! Values come from a [`CompoundDataSource`], are shown through the value
//! handler tree, and edits are checked before they reach the source.
//! Accepted edits stay in memory until [`CompoundTableModel::update_in_file`].
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//!
//! use hdfview_core::{CellValue, CompoundMember, Datatype};
//! use hdfview_table::config::TableViewConfig;
//! use hdfview_table::selection::SelectedMemberSet;
//! use hdfview_table::table::{CompoundTableModel, MemoryDataSource};
//!
//! let dtype = Datatype::compound(vec![
//!     CompoundMember::new("id", Datatype::uint8()),
//!     CompoundMember::new("name", Datatype::fixed_string(4)),
//! ])?;
//! let members = SelectedMemberSet::all(Arc::new(dtype))?;
//! let source = MemoryDataSource::new(2, 1, vec![vec![CellValue::UInt(1), "ab".into()]])?;
//! let table = CompoundTableModel::new(members, source, TableViewConfig::default())?;
//!
//! assert_eq!(table.display_text(0, 1).as_deref(), Some("ab"));
//! assert!(table.validate(0, 0, "256").is_err());
//! assert!(table.set_data(0, 0, "7")?);
//! assert_eq!(table.display_text(0, 0).as_deref(), Some("7"));
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use hdfview_core::logging::targets;
use hdfview_core::{CellValue, PerfSpan};
use parking_lot::RwLock;

use crate::config::TableViewConfig;
use crate::enum_names::{EnumConverter, MemberTableConverter};
use crate::error::{HandlerError, Result, TableError};
use crate::handler::{CompoundHandler, RenderContext, ValueHandler, ERROR_TEXT};
use crate::header::ColumnHeaders;
use crate::selection::SelectedMemberSet;
use crate::validation::{ValidationCause, ValidationFailure};

/// Storage behind a compound table.
///
/// `field` indexes the selected leaf members in flattened order,
/// `sub_column` the repetition of those fields within a row.
pub trait CompoundDataSource: Send + Sync {
    fn row_count(&self) -> usize;

    /// Number of dataset columns per row.
    fn width(&self) -> usize {
        1
    }

    fn value(&self, row: usize, field: usize, sub_column: usize) -> Result<CellValue>;

    /// Stores an accepted edit in memory.
    fn commit(&self, row: usize, field: usize, sub_column: usize, value: CellValue) -> Result<()>;

    /// Writes the in-memory data to the file.
    fn flush(&self) -> Result<()>;
}

/// A data source holding every row in memory.
///
/// Flushing copies the working data into a separate persisted snapshot,
/// which stands in for the file.
#[derive(Debug)]
pub struct MemoryDataSource {
    fields: usize,
    width: usize,
    rows: RwLock<Vec<Vec<CellValue>>>,
    persisted: RwLock<Vec<Vec<CellValue>>>,
}

impl MemoryDataSource {
    /// Creates a source from rows of `width * fields` values each.
    pub fn new(fields: usize, width: usize, rows: Vec<Vec<CellValue>>) -> Result<Self> {
        let expected = fields * width.max(1);
        if let Some((index, row)) = rows.iter().enumerate().find(|(_, row)| row.len() != expected) {
            return Err(TableError::data_source(format!(
                "row {index} has {} values, expected {expected}",
                row.len()
            )));
        }
        Ok(Self {
            fields,
            width: width.max(1),
            persisted: RwLock::new(rows.clone()),
            rows: RwLock::new(rows),
        })
    }

    /// The data as of the last flush.
    pub fn persisted(&self) -> Vec<Vec<CellValue>> {
        self.persisted.read().clone()
    }

    fn offset(&self, row: usize, field: usize, sub_column: usize) -> Result<usize> {
        if field >= self.fields || sub_column >= self.width {
            return Err(TableError::data_source(format!(
                "no field {field} in column {sub_column} of row {row}"
            )));
        }
        Ok(sub_column * self.fields + field)
    }
}

impl CompoundDataSource for MemoryDataSource {
    fn row_count(&self) -> usize {
        self.rows.read().len()
    }

    fn width(&self) -> usize {
        self.width
    }

    fn value(&self, row: usize, field: usize, sub_column: usize) -> Result<CellValue> {
        let offset = self.offset(row, field, sub_column)?;
        self.rows
            .read()
            .get(row)
            .and_then(|cells| cells.get(offset))
            .cloned()
            .ok_or_else(|| TableError::data_source(format!("row {row} out of range")))
    }

    fn commit(&self, row: usize, field: usize, sub_column: usize, value: CellValue) -> Result<()> {
        let offset = self.offset(row, field, sub_column)?;
        let mut rows = self.rows.write();
        let cell = rows
            .get_mut(row)
            .and_then(|cells| cells.get_mut(offset))
            .ok_or_else(|| TableError::data_source(format!("row {row} out of range")))?;
        *cell = value;
        Ok(())
    }

    fn flush(&self) -> Result<()> {
        let rows = self.rows.read().clone();
        *self.persisted.write() = rows;
        Ok(())
    }
}

/// Grid view of a compound dataset with validated editing.
pub struct CompoundTableModel<S> {
    members: SelectedMemberSet,
    root: CompoundHandler,
    headers: ColumnHeaders,
    source: S,
    config: TableViewConfig,
    enum_names: Arc<dyn EnumConverter>,
    dirty: AtomicBool,
}

impl<S: CompoundDataSource> CompoundTableModel<S> {
    /// Builds the handler tree and column map for `members`.
    ///
    /// Fails with [`TableError::InvalidMapping`] when the selection leaves
    /// no column to show.
    pub fn new(members: SelectedMemberSet, source: S, config: TableViewConfig) -> Result<Self> {
        let _perf = PerfSpan::new("build_compound_table");

        let root = CompoundHandler::new(Arc::clone(members.compound()), members.scope()).map_err(
            |err| match err {
                HandlerError::EmptyMapping { description } => TableError::invalid_mapping(description),
                other => TableError::invalid_mapping(other.to_string()),
            },
        )?;
        let headers = ColumnHeaders::new(&members, source.width());

        tracing::debug!(
            target: targets::TABLE,
            fields = root.columns(),
            width = source.width(),
            rows = source.row_count(),
            "built compound table"
        );
        Ok(Self {
            members,
            root,
            headers,
            source,
            config,
            enum_names: Arc::new(MemberTableConverter::new()),
            dirty: AtomicBool::new(false),
        })
    }

    /// Replaces the converter used to show enum members by name.
    pub fn with_enum_converter(mut self, converter: Arc<dyn EnumConverter>) -> Self {
        self.enum_names = converter;
        self
    }

    pub fn row_count(&self) -> usize {
        self.source.row_count()
    }

    /// Selected leaf members per dataset column.
    pub fn field_count(&self) -> usize {
        self.root.columns()
    }

    pub fn column_count(&self) -> usize {
        self.source.width() * self.field_count()
    }

    pub fn members(&self) -> &SelectedMemberSet {
        &self.members
    }

    pub fn root_handler(&self) -> &CompoundHandler {
        &self.root
    }

    pub fn headers(&self) -> &ColumnHeaders {
        &self.headers
    }

    pub fn config(&self) -> &TableViewConfig {
        &self.config
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Returns `true` when accepted edits have not been written to the file.
    pub fn is_dirty(&self) -> bool {
        self.dirty.load(Ordering::Acquire)
    }

    fn in_bounds(&self, row: usize, column: usize) -> bool {
        row < self.row_count() && column < self.column_count()
    }

    fn locate(&self, column: usize) -> (usize, usize) {
        let fields = self.field_count();
        (column % fields, column / fields)
    }

    fn render_context(&self) -> RenderContext<'_> {
        RenderContext {
            number_format: self.config.number_format,
            enum_names: self
                .config
                .convert_enum_names
                .then_some(self.enum_names.as_ref()),
        }
    }

    /// Display text of a cell, or `None` outside the table.
    pub fn display_text(&self, row: usize, column: usize) -> Option<String> {
        if !self.in_bounds(row, column) {
            return None;
        }
        let (field, sub_column) = self.locate(column);
        let value = match self.source.value(row, field, sub_column) {
            Ok(value) => value,
            Err(err) => {
                tracing::debug!(target: targets::TABLE, row, column, error = %err, "failed to read cell");
                return Some(ERROR_TEXT.to_string());
            }
        };
        let mut out = String::new();
        self.root.render(&self.render_context(), column, &value, &mut out);
        Some(out)
    }

    /// Checks a proposed edit without applying it.
    pub fn validate(&self, row: usize, column: usize, text: &str) -> std::result::Result<(), ValidationFailure> {
        tracing::trace!(target: targets::TABLE, row, column, "validating cell edit");
        let outcome = if !self.in_bounds(row, column) {
            Err(ValidationCause::OutOfBounds {
                rows: self.row_count(),
                columns: self.column_count(),
            })
        } else if self.config.read_only {
            Err(ValidationCause::ReadOnly)
        } else {
            self.root.validate(column, text)
        };
        outcome.map_err(|cause| {
            let failure = ValidationFailure::new(row, column, text, cause);
            tracing::debug!(target: targets::TABLE, error = %failure, "rejected cell edit");
            failure
        })
    }

    /// Validates and applies an edit in memory.
    ///
    /// Returns `false` when the text matches what the cell already shows.
    pub fn set_data(&self, row: usize, column: usize, text: &str) -> Result<bool> {
        self.validate(row, column, text)?;
        if self.display_text(row, column).as_deref() == Some(text) {
            tracing::trace!(target: targets::TABLE, row, column, "cell unchanged");
            return Ok(false);
        }
        let value = self
            .root
            .parse(column, text)
            .map_err(|cause| ValidationFailure::new(row, column, text, cause))?;
        let (field, sub_column) = self.locate(column);
        self.source.commit(row, field, sub_column, value)?;
        self.dirty.store(true, Ordering::Release);
        tracing::debug!(target: targets::TABLE, row, column, "updated cell in memory");
        Ok(true)
    }

    /// Writes pending edits to the file. Returns `true` if anything was
    /// written.
    pub fn update_in_file(&self) -> Result<bool> {
        if self.config.read_only || !self.is_dirty() {
            return Ok(false);
        }
        self.source.flush()?;
        self.dirty.store(false, Ordering::Release);
        tracing::debug!(target: targets::TABLE, "flushed table edits");
        Ok(true)
    }

    /// Label of a cell for status lines, such as `"3, pos->lat[0] =  "`.
    pub fn cell_label(&self, row: usize, column: usize) -> Option<String> {
        if !self.in_bounds(row, column) {
            return None;
        }
        let (_, sub_column) = self.locate(column);
        let header = self.headers.get(column)?;
        Some(format!(
            "{}, {}[{}] =  ",
            row + self.config.index_base,
            header.path,
            sub_column
        ))
    }
}

impl<S> std::fmt::Debug for CompoundTableModel<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompoundTableModel")
            .field("members", &self.members.selected_paths())
            .field("root", &self.root)
            .field("config", &self.config)
            .field("dirty", &self.dirty.load(Ordering::Acquire))
            .finish_non_exhaustive()
    }
}
