//! Column header text.
//!
//! Nested members are named by their full path (`outer->inner`). A header
//! shows the short name, the part after the last separator, while the group
//! path is used to span the enclosing compound's name over its columns.

use hdfview_core::{flatten_members, Datatype, MEMBER_SEPARATOR};

use crate::selection::SelectedMemberSet;

/// Header of one physical column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnHeader {
    /// Full member path.
    pub path: String,
    /// Path of the enclosing compound, empty for top-level members.
    pub group: String,
    /// Text shown in the header cell.
    pub label: String,
}

impl ColumnHeader {
    fn for_member(path: &str, datatype: &Datatype) -> Self {
        let (group, name) = match path.rfind(MEMBER_SEPARATOR) {
            Some(at) => (&path[..at], &path[at + MEMBER_SEPARATOR.len()..]),
            None => ("", path),
        };
        let mut label = name.to_string();
        if let Datatype::Array { base, .. } = datatype {
            if let Ok(fields) = flatten_members(base) {
                let names: Vec<&str> = fields.iter().map(|field| field.path.as_str()).collect();
                label.push_str(&format!("\n\n[ {} ]", names.join(", ")));
            }
        }
        Self {
            path: path.to_string(),
            group: group.to_string(),
            label,
        }
    }

    /// The member name without its enclosing groups.
    pub fn short_name(&self) -> &str {
        self.label.split('\n').next().unwrap_or_default()
    }
}

/// Headers of every physical column of a compound table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColumnHeaders {
    headers: Vec<ColumnHeader>,
    fields: usize,
}

impl ColumnHeaders {
    /// Headers for the selected members, repeated `width` times.
    pub fn new(members: &SelectedMemberSet, width: usize) -> Self {
        let field_headers: Vec<ColumnHeader> = members
            .selected_members()
            .map(|member| ColumnHeader::for_member(&member.path, &member.datatype))
            .collect();
        let fields = field_headers.len();
        let headers = std::iter::repeat_n(field_headers, width.max(1))
            .flatten()
            .collect();
        Self { headers, fields }
    }

    pub fn len(&self) -> usize {
        self.headers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.headers.is_empty()
    }

    pub fn get(&self, column: usize) -> Option<&ColumnHeader> {
        self.headers.get(column)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ColumnHeader> + '_ {
        self.headers.iter()
    }

    /// Header labels of one repetition of the fields.
    pub fn field_labels(&self) -> Vec<&str> {
        self.headers[..self.fields]
            .iter()
            .map(|header| header.label.as_str())
            .collect()
    }
}
