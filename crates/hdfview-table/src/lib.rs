//! Compound dataset tables for HDFView.
//!
//! A compound dataset is shown as a table with one column per selected leaf
//! member, nested compounds flattened into adjacent columns. This crate
//! provides:
//!
//! - **Selection**: which members of the compound take part
//!   ([`selection`])
//! - **Column Mapping**: physical column to member handler dispatch
//!   ([`column_map`])
//! - **Value Handlers**: per-datatype validation, display and parsing of
//!   cell values ([`handler`])
//! - **Table Adapter**: row and column counts, cell text and validated
//!   edits over a data source ([`table`])
//!
//! Settings live in [`config`], column header text in [`header`].
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//!
//! use hdfview_core::{CompoundMember, Datatype};
//! use hdfview_table::column_map::ColumnIndexMap;
//! use hdfview_table::selection::SelectedMemberSet;
//!
//! let dtype = Datatype::compound(vec![
//!     CompoundMember::new("a", Datatype::int32()),
//!     CompoundMember::new(
//!         "nested",
//!         Datatype::compound(vec![
//!             CompoundMember::new("x", Datatype::int8()),
//!             CompoundMember::new("y", Datatype::int8()),
//!         ])?,
//!     ),
//!     CompoundMember::new("b", Datatype::float32()),
//! ])?;
//! let members = SelectedMemberSet::all(Arc::new(dtype))?;
//! let map = ColumnIndexMap::build(members.selected_types(), &members.local_types());
//!
//! let handlers: Vec<usize> = map.slots().iter().map(|slot| slot.handler).collect();
//! assert_eq!(handlers, [0, 1, 1, 2]);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod column_map;
pub mod config;
pub mod enum_names;
pub mod error;
pub mod format;
pub mod handler;
pub mod header;
pub mod selection;
pub mod table;
pub mod validation;

pub use column_map::{ColumnIndexMap, ColumnSlot};
pub use config::TableViewConfig;
pub use error::{Result, TableError};
pub use handler::{handler_for, HandlerKind, RenderContext, ValueHandler};
pub use selection::{filter_selected, MemberScope, SelectedMemberSet};
pub use table::{CompoundDataSource, CompoundTableModel, MemoryDataSource};
pub use validation::{ValidationCause, ValidationFailure};

static_assertions::assert_impl_all!(ColumnIndexMap: Send, Sync);
static_assertions::assert_impl_all!(SelectedMemberSet: Send, Sync);
static_assertions::assert_impl_all!(handler::CompoundHandler: Send, Sync);
static_assertions::assert_impl_all!(CompoundTableModel<MemoryDataSource>: Send, Sync);
static_assertions::assert_impl_all!(enum_names::MemberTableConverter: Send, Sync);
