//! Core types for HDFView compound dataset tables.
//!
//! This crate provides the pieces shared by the table layer:
//!
//! - **Datatype Tree**: read-only description of scalar, string, enum,
//!   bitfield/opaque, reference, array, variable-length and compound types
//! - **Cell Values**: already-decoded raw values handed over by the data layer
//! - **Logging**: `tracing` targets and helpers
//!
//! # Example
//!
//! ```
//! use hdfview_core::datatype::{flatten_members, CompoundMember, Datatype};
//!
//! let dtype = Datatype::compound(vec![
//!     CompoundMember::new("id", Datatype::uint32()),
//!     CompoundMember::new(
//!         "pos",
//!         Datatype::compound(vec![
//!             CompoundMember::new("x", Datatype::float64()),
//!             CompoundMember::new("y", Datatype::float64()),
//!         ])?,
//!     ),
//! ])?;
//!
//! let paths: Vec<String> = flatten_members(&dtype)?
//!     .into_iter()
//!     .map(|member| member.path)
//!     .collect();
//! assert_eq!(paths, ["id", "pos->x", "pos->y"]);
//! # Ok::<(), hdfview_core::DatatypeError>(())
//! ```

pub mod datatype;
mod error;
pub mod logging;
pub mod value;

pub use datatype::{
    flatten_members, integer_range, CompoundMember, Datatype, DatatypeClass, EnumMember,
    FlatMember, IntegerBase, ReferenceKind, StringLength, MEMBER_SEPARATOR,
};
pub use error::{DatatypeError, Result};
pub use logging::PerfSpan;
pub use value::CellValue;

static_assertions::assert_impl_all!(Datatype: Send, Sync);
static_assertions::assert_impl_all!(CellValue: Send, Sync);
