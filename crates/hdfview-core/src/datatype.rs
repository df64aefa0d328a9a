//! Read-only description of a dataset's datatype.
//!
//! A [`Datatype`] is a tree: compound types own an ordered list of named
//! members, array and variable-length types own a single base type. The
//! variant fixes which piece of shape information is meaningful, so a
//! compound never carries a byte size of its own and an array never carries
//! members.
//!
//! Member datatypes are shared as [`Arc<Datatype>`]. Two members are "the
//! same member" only when their `Arc`s point at the same allocation
//! ([`Arc::ptr_eq`]); structurally equal members at different positions are
//! distinct. Selection of table columns relies on this identity.
//!
//! # Example
//!
//! ```
//! use hdfview_core::datatype::{CompoundMember, Datatype};
//!
//! let point = Datatype::compound(vec![
//!     CompoundMember::new("x", Datatype::int8()),
//!     CompoundMember::new("y", Datatype::int8()),
//! ])
//! .unwrap();
//!
//! assert!(point.is_compound());
//! assert_eq!(point.members().len(), 2);
//! assert_eq!(point.size(), Some(2));
//! ```

use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use crate::error::{DatatypeError, Result};

/// Separator used when joining nested compound member names.
pub const MEMBER_SEPARATOR: &str = "->";

/// The class of a datatype, independent of its shape parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DatatypeClass {
    Integer,
    Float,
    Char,
    String,
    Enum,
    Bitfield,
    Opaque,
    Reference,
    Array,
    VariableLength,
    Compound,
}

impl fmt::Display for DatatypeClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Integer => "integer",
            Self::Float => "float",
            Self::Char => "char",
            Self::String => "string",
            Self::Enum => "enum",
            Self::Bitfield => "bitfield",
            Self::Opaque => "opaque",
            Self::Reference => "reference",
            Self::Array => "array",
            Self::VariableLength => "variable-length",
            Self::Compound => "compound",
        };
        f.write_str(name)
    }
}

/// Length of a string datatype.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StringLength {
    /// Fixed number of bytes per element.
    Fixed(usize),
    /// Length resolved per element at read time.
    Variable,
}

/// Kind of an HDF5 reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ReferenceKind {
    #[default]
    Object,
    Region,
}

/// Integer storage of an enumeration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct IntegerBase {
    pub size: usize,
    pub signed: bool,
}

impl IntegerBase {
    pub const fn new(size: usize, signed: bool) -> Self {
        Self { size, signed }
    }

    /// Inclusive value range representable by this base, or `None` for
    /// sizes other than 1, 2, 4 and 8 bytes.
    pub fn range(&self) -> Option<(i128, i128)> {
        integer_range(self.size, self.signed)
    }
}

/// Inclusive range of an integer of `size` bytes.
pub fn integer_range(size: usize, signed: bool) -> Option<(i128, i128)> {
    if !matches!(size, 1 | 2 | 4 | 8) {
        return None;
    }
    let bits = (size * 8) as u32;
    if signed {
        let max = (1i128 << (bits - 1)) - 1;
        Some((-max - 1, max))
    } else {
        Some((0, (1i128 << bits) - 1))
    }
}

/// A named value of an enumeration datatype.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EnumMember {
    pub name: String,
    pub value: i64,
}

impl EnumMember {
    pub fn new(name: impl Into<String>, value: i64) -> Self {
        Self {
            name: name.into(),
            value,
        }
    }
}

/// A named member of a compound datatype.
#[derive(Debug, Clone)]
pub struct CompoundMember {
    name: String,
    datatype: Arc<Datatype>,
}

impl CompoundMember {
    /// Creates a member owning a fresh datatype node.
    pub fn new(name: impl Into<String>, datatype: Datatype) -> Self {
        Self {
            name: name.into(),
            datatype: Arc::new(datatype),
        }
    }

    /// Creates a member from an already shared datatype node.
    pub fn shared(name: impl Into<String>, datatype: Arc<Datatype>) -> Self {
        Self {
            name: name.into(),
            datatype,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn datatype(&self) -> &Arc<Datatype> {
        &self.datatype
    }
}

/// Description of one field or sub-field of a dataset.
#[derive(Debug, Clone)]
pub enum Datatype {
    Integer { size: usize, signed: bool },
    Float { size: usize },
    Char { signed: bool },
    String { length: StringLength },
    Enum {
        base: IntegerBase,
        members: Vec<EnumMember>,
    },
    Bitfield { size: usize },
    Opaque { size: usize, tag: String },
    Reference { size: usize, kind: ReferenceKind },
    Array {
        base: Arc<Datatype>,
        dims: Vec<usize>,
    },
    VariableLength { base: Arc<Datatype> },
    Compound { members: Vec<CompoundMember> },
}

impl Datatype {
    pub fn int8() -> Self {
        Self::Integer { size: 1, signed: true }
    }

    pub fn uint8() -> Self {
        Self::Integer { size: 1, signed: false }
    }

    pub fn int16() -> Self {
        Self::Integer { size: 2, signed: true }
    }

    pub fn uint16() -> Self {
        Self::Integer { size: 2, signed: false }
    }

    pub fn int32() -> Self {
        Self::Integer { size: 4, signed: true }
    }

    pub fn uint32() -> Self {
        Self::Integer { size: 4, signed: false }
    }

    pub fn int64() -> Self {
        Self::Integer { size: 8, signed: true }
    }

    pub fn uint64() -> Self {
        Self::Integer { size: 8, signed: false }
    }

    pub fn float32() -> Self {
        Self::Float { size: 4 }
    }

    pub fn float64() -> Self {
        Self::Float { size: 8 }
    }

    /// Fixed-length string of `size` bytes.
    pub fn fixed_string(size: usize) -> Self {
        Self::String {
            length: StringLength::Fixed(size),
        }
    }

    pub fn var_string() -> Self {
        Self::String {
            length: StringLength::Variable,
        }
    }

    pub fn enumeration(base: IntegerBase, members: Vec<EnumMember>) -> Self {
        Self::Enum { base, members }
    }

    pub fn array(base: Datatype, dims: Vec<usize>) -> Self {
        Self::Array {
            base: Arc::new(base),
            dims,
        }
    }

    pub fn vlen(base: Datatype) -> Self {
        Self::VariableLength {
            base: Arc::new(base),
        }
    }

    /// Creates a compound datatype, rejecting duplicate member names.
    pub fn compound(members: Vec<CompoundMember>) -> Result<Self> {
        let mut seen = HashSet::with_capacity(members.len());
        for member in &members {
            if !seen.insert(member.name.as_str()) {
                crate::core_debug!(name = %member.name, "rejecting compound with duplicate member");
                return Err(DatatypeError::duplicate_member(&member.name));
            }
        }
        Ok(Self::Compound { members })
    }

    pub fn class(&self) -> DatatypeClass {
        match self {
            Self::Integer { .. } => DatatypeClass::Integer,
            Self::Float { .. } => DatatypeClass::Float,
            Self::Char { .. } => DatatypeClass::Char,
            Self::String { .. } => DatatypeClass::String,
            Self::Enum { .. } => DatatypeClass::Enum,
            Self::Bitfield { .. } => DatatypeClass::Bitfield,
            Self::Opaque { .. } => DatatypeClass::Opaque,
            Self::Reference { .. } => DatatypeClass::Reference,
            Self::Array { .. } => DatatypeClass::Array,
            Self::VariableLength { .. } => DatatypeClass::VariableLength,
            Self::Compound { .. } => DatatypeClass::Compound,
        }
    }

    /// Byte size of one element, or `None` when the size is only known per
    /// element at read time.
    pub fn size(&self) -> Option<usize> {
        match self {
            Self::Integer { size, .. }
            | Self::Float { size }
            | Self::Bitfield { size }
            | Self::Opaque { size, .. }
            | Self::Reference { size, .. } => Some(*size),
            Self::Char { .. } => Some(1),
            Self::String { length } => match length {
                StringLength::Fixed(size) => Some(*size),
                StringLength::Variable => None,
            },
            Self::Enum { base, .. } => Some(base.size),
            Self::Array { base, .. } => base.size().map(|size| size * self.array_order()),
            Self::VariableLength { .. } => None,
            Self::Compound { members } => members
                .iter()
                .map(|member| member.datatype.size())
                .sum(),
        }
    }

    /// Returns `true` for unsigned integers, chars and enums.
    pub fn is_unsigned(&self) -> bool {
        match self {
            Self::Integer { signed, .. } | Self::Char { signed } => !signed,
            Self::Enum { base, .. } => !base.signed,
            _ => false,
        }
    }

    /// The element type of an array or variable-length datatype.
    pub fn base(&self) -> Option<&Arc<Datatype>> {
        match self {
            Self::Array { base, .. } | Self::VariableLength { base } => Some(base),
            _ => None,
        }
    }

    /// Direct members of a compound datatype; empty for every other class.
    pub fn members(&self) -> &[CompoundMember] {
        match self {
            Self::Compound { members } => members,
            _ => &[],
        }
    }

    /// Enumeration members; empty for every other class.
    pub fn enum_members(&self) -> &[EnumMember] {
        match self {
            Self::Enum { members, .. } => members,
            _ => &[],
        }
    }

    pub fn is_compound(&self) -> bool {
        matches!(self, Self::Compound { .. })
    }

    pub fn is_string(&self) -> bool {
        matches!(self, Self::String { .. })
    }

    /// Returns `true` for variable-length strings, in either spelling HDF5
    /// uses for them.
    pub fn is_var_str(&self) -> bool {
        match self {
            Self::String { length } => *length == StringLength::Variable,
            Self::VariableLength { base } => base.is_string(),
            _ => false,
        }
    }

    /// Number of base elements in one array element; 1 for non-arrays.
    pub fn array_order(&self) -> usize {
        match self {
            Self::Array { dims, .. } => dims.iter().product(),
            _ => 1,
        }
    }

    /// Short human-readable description used in diagnostics.
    pub fn description(&self) -> String {
        match self {
            Self::Integer { size, signed } => {
                let sign = if *signed { "" } else { "unsigned " };
                format!("{}{}-bit integer", sign, size * 8)
            }
            Self::Float { size } => format!("{}-bit floating-point", size * 8),
            Self::Char { signed } => {
                if *signed {
                    "8-bit character".to_string()
                } else {
                    "unsigned 8-bit character".to_string()
                }
            }
            Self::String { length } => match length {
                StringLength::Fixed(size) => format!("string, length = {size}"),
                StringLength::Variable => "string, length = variable".to_string(),
            },
            Self::Enum { base, members } => {
                let names: Vec<String> = members
                    .iter()
                    .map(|member| format!("{}={}", member.name, member.value))
                    .collect();
                format!("{}-bit enum ({})", base.size * 8, names.join(", "))
            }
            Self::Bitfield { size } => format!("{}-bit bitfield", size * 8),
            Self::Opaque { size, tag } => format!("{size}-byte opaque, tag = {tag}"),
            Self::Reference { kind, .. } => match kind {
                ReferenceKind::Object => "object reference".to_string(),
                ReferenceKind::Region => "dataset region reference".to_string(),
            },
            Self::Array { base, dims } => {
                let dims: Vec<String> = dims.iter().map(ToString::to_string).collect();
                format!("array [{}] of {}", dims.join("x"), base.description())
            }
            Self::VariableLength { base } => {
                format!("variable-length of {}", base.description())
            }
            Self::Compound { members } => {
                let names: Vec<&str> = members.iter().map(|member| member.name()).collect();
                format!("compound {{{}}}", names.join(", "))
            }
        }
    }
}

impl fmt::Display for Datatype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.description())
    }
}

/// A leaf of a flattened compound datatype.
#[derive(Debug, Clone)]
pub struct FlatMember {
    /// Member names from the outermost compound down, joined with
    /// [`MEMBER_SEPARATOR`].
    pub path: String,
    pub datatype: Arc<Datatype>,
}

/// Flattens a compound datatype into its leaf members.
///
/// Nested compounds are expanded depth-first, left to right; arrays and
/// variable-length members are leaves even when their element is a compound.
/// Returns an error for non-compound datatypes.
pub fn flatten_members(compound: &Datatype) -> Result<Vec<FlatMember>> {
    if !compound.is_compound() {
        return Err(DatatypeError::not_compound(compound.class()));
    }
    let mut out = Vec::new();
    flatten_into(compound, "", &mut out);
    crate::core_trace!(leaves = out.len(), "flattened compound members");
    Ok(out)
}

fn flatten_into(compound: &Datatype, prefix: &str, out: &mut Vec<FlatMember>) {
    for member in compound.members() {
        let path = if prefix.is_empty() {
            member.name.clone()
        } else {
            format!("{prefix}{MEMBER_SEPARATOR}{}", member.name)
        };
        if member.datatype.is_compound() {
            flatten_into(&member.datatype, &path, out);
        } else {
            out.push(FlatMember {
                path,
                datatype: Arc::clone(&member.datatype),
            });
        }
    }
}
