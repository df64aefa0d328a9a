//! Enum value to member name conversion.
//!
//! Turning a stored enum value into its member name requires opening a
//! native type handle, asking the library for the name, and closing the
//! handle again. [`EnumConverter`] models that round trip so the table can
//! run against the real library or against [`MemberTableConverter`], which
//! answers from the datatype's own member list.
//!
//! [`OpenType`] owns an open handle and closes it on drop, so every exit
//! path of a conversion releases the handle.

use std::collections::HashMap;
use std::sync::atomic::{AtomicI64, Ordering};

use hdfview_core::logging::targets;
use hdfview_core::{Datatype, EnumMember};
use parking_lot::Mutex;

use crate::error::ConversionError;

/// An open native datatype handle.
#[derive(Debug, PartialEq, Eq, Hash)]
pub struct TypeHandle(pub i64);

/// Native enum value to name conversion.
pub trait EnumConverter: Send + Sync {
    /// Opens a native handle for `datatype`.
    fn open(&self, datatype: &Datatype) -> Result<TypeHandle, ConversionError>;

    /// Returns the name of the member with `value`.
    fn value_to_name(&self, handle: &TypeHandle, value: i64) -> Result<String, ConversionError>;

    /// Releases `handle`.
    fn close(&self, handle: &TypeHandle) -> Result<(), ConversionError>;
}

/// An open type handle that is closed when dropped.
pub struct OpenType<'a> {
    converter: &'a dyn EnumConverter,
    handle: TypeHandle,
}

impl<'a> OpenType<'a> {
    pub fn open(converter: &'a dyn EnumConverter, datatype: &Datatype) -> Result<Self, ConversionError> {
        let handle = converter.open(datatype)?;
        Ok(Self { converter, handle })
    }

    pub fn handle(&self) -> &TypeHandle {
        &self.handle
    }

    pub fn value_to_name(&self, value: i64) -> Result<String, ConversionError> {
        self.converter.value_to_name(&self.handle, value)
    }
}

impl Drop for OpenType<'_> {
    fn drop(&mut self) {
        if let Err(err) = self.converter.close(&self.handle) {
            tracing::debug!(
                target: targets::ENUM_NAMES,
                handle = self.handle.0,
                error = %err,
                "failed to close type handle"
            );
        }
    }
}

impl std::fmt::Debug for OpenType<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenType").field("handle", &self.handle).finish()
    }
}

/// Converts `value` to a member name of the enum `datatype`, opening and
/// closing a handle around the lookup.
pub fn convert_value_to_name(
    converter: &dyn EnumConverter,
    datatype: &Datatype,
    value: i64,
) -> Result<String, ConversionError> {
    let open = OpenType::open(converter, datatype)?;
    open.value_to_name(value)
}

/// In-process converter answering from the datatype's member list.
#[derive(Debug, Default)]
pub struct MemberTableConverter {
    next_id: AtomicI64,
    open: Mutex<HashMap<i64, Vec<EnumMember>>>,
}

impl MemberTableConverter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of handles opened and not yet closed.
    pub fn open_handles(&self) -> usize {
        self.open.lock().len()
    }
}

impl EnumConverter for MemberTableConverter {
    fn open(&self, datatype: &Datatype) -> Result<TypeHandle, ConversionError> {
        if !matches!(datatype, Datatype::Enum { .. }) {
            return Err(ConversionError::NotEnum {
                class: datatype.class(),
            });
        }
        let id = self.next_id.fetch_add(1, Ordering::Relaxed) + 1;
        self.open.lock().insert(id, datatype.enum_members().to_vec());
        tracing::trace!(target: targets::ENUM_NAMES, handle = id, "opened enum type");
        Ok(TypeHandle(id))
    }

    fn value_to_name(&self, handle: &TypeHandle, value: i64) -> Result<String, ConversionError> {
        let open = self.open.lock();
        let members = open
            .get(&handle.0)
            .ok_or(ConversionError::InvalidHandle(handle.0))?;
        members
            .iter()
            .find(|member| member.value == value)
            .map(|member| member.name.clone())
            .ok_or(ConversionError::UnknownValue(value))
    }

    fn close(&self, handle: &TypeHandle) -> Result<(), ConversionError> {
        match self.open.lock().remove(&handle.0) {
            Some(_) => Ok(()),
            None => Err(ConversionError::InvalidHandle(handle.0)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hdfview_core::IntegerBase;

    fn colors() -> Datatype {
        Datatype::enumeration(
            IntegerBase::new(1, false),
            vec![EnumMember::new("RED", 0), EnumMember::new("GREEN", 1)],
        )
    }

    #[test]
    fn test_round_trip_releases_handle() {
        let converter = MemberTableConverter::new();
        assert_eq!(convert_value_to_name(&converter, &colors(), 1).unwrap(), "GREEN");
        assert_eq!(converter.open_handles(), 0);
    }

    #[test]
    fn test_unknown_value_still_releases_handle() {
        let converter = MemberTableConverter::new();
        let result = convert_value_to_name(&converter, &colors(), 9);
        assert_eq!(result, Err(ConversionError::UnknownValue(9)));
        assert_eq!(converter.open_handles(), 0);
    }

    #[test]
    fn test_non_enum_rejected() {
        let converter = MemberTableConverter::new();
        let result = convert_value_to_name(&converter, &Datatype::int8(), 0);
        assert!(matches!(result, Err(ConversionError::NotEnum { .. })));
    }

    #[test]
    fn test_double_close_is_invalid() {
        let converter = MemberTableConverter::new();
        let handle = converter.open(&colors()).unwrap();
        converter.close(&handle).unwrap();
        assert_eq!(
            converter.close(&handle),
            Err(ConversionError::InvalidHandle(handle.0))
        );
    }
}
