//! Member selection for compound datasets.
//!
//! A user may hide some members of a compound dataset. The dataset then
//! reports its selection as the flattened list of selected leaf datatypes,
//! and every compound level filters its own direct members against that
//! list with [`filter_selected`].
//!
//! Nested compounds are never filtered out at their parent's level: they are
//! transparent groups whose own members are filtered when the walk reaches
//! them.

use std::sync::Arc;

use hdfview_core::datatype::{flatten_members, Datatype, FlatMember};
use hdfview_core::logging::targets;

use crate::error::{Result, TableError};

/// Returns the direct members of `compound` that take part in the table.
///
/// A member is kept when it is itself a compound, or when its datatype is
/// pointer-identical to an entry of `all_selected`. Order follows the
/// compound's declaration order. The compound is never modified; a
/// non-compound argument yields an empty list.
pub fn filter_selected(all_selected: &[Arc<Datatype>], compound: &Datatype) -> Vec<Arc<Datatype>> {
    compound
        .members()
        .iter()
        .map(|member| member.datatype())
        .filter(|dtype| {
            dtype.is_compound() || all_selected.iter().any(|selected| Arc::ptr_eq(selected, *dtype))
        })
        .cloned()
        .collect()
}

/// Which members of a compound take part when walking it.
#[derive(Debug, Clone, Copy)]
pub enum MemberScope<'a> {
    /// Only members found in the dataset's selected leaf list.
    Selected(&'a [Arc<Datatype>]),
    /// Every member. Used for compounds reached through an array or
    /// variable-length element, which occupy a single table column.
    All,
}

impl MemberScope<'_> {
    /// Direct members of `compound` visible in this scope.
    pub fn filter(&self, compound: &Datatype) -> Vec<Arc<Datatype>> {
        match self {
            MemberScope::Selected(all_selected) => filter_selected(all_selected, compound),
            MemberScope::All => compound
                .members()
                .iter()
                .map(|member| Arc::clone(member.datatype()))
                .collect(),
        }
    }
}

/// The members of a compound dataset chosen for display.
///
/// Built once per table session from the dataset's compound datatype and a
/// selection vector over its flattened leaf members. Changing the selection
/// means building a new set, and with it a new column map.
#[derive(Debug, Clone)]
pub struct SelectedMemberSet {
    compound: Arc<Datatype>,
    leaves: Vec<FlatMember>,
    selected: Vec<usize>,
    selected_types: Vec<Arc<Datatype>>,
}

impl SelectedMemberSet {
    /// Creates a selection from one flag per flattened leaf member.
    pub fn new(compound: Arc<Datatype>, selection: &[bool]) -> Result<Self> {
        let leaves = flatten_members(&compound)?;
        if leaves.len() != selection.len() {
            return Err(TableError::SelectionLength {
                expected: leaves.len(),
                actual: selection.len(),
            });
        }
        let selected: Vec<usize> = selection
            .iter()
            .enumerate()
            .filter_map(|(index, &on)| on.then_some(index))
            .collect();
        let selected_types = selected
            .iter()
            .map(|&index| Arc::clone(&leaves[index].datatype))
            .collect();
        tracing::debug!(
            target: targets::SELECTION,
            leaves = leaves.len(),
            selected = selected.len(),
            "built member selection"
        );
        Ok(Self {
            compound,
            leaves,
            selected,
            selected_types,
        })
    }

    /// Selects every leaf member.
    pub fn all(compound: Arc<Datatype>) -> Result<Self> {
        let count = flatten_members(&compound)?.len();
        Self::new(compound, &vec![true; count])
    }

    /// The dataset's compound datatype.
    pub fn compound(&self) -> &Arc<Datatype> {
        &self.compound
    }

    /// Selected leaf datatypes in flattened order.
    pub fn selected_types(&self) -> &[Arc<Datatype>] {
        &self.selected_types
    }

    /// Selected leaf members with their full paths.
    pub fn selected_members(&self) -> impl Iterator<Item = &FlatMember> + '_ {
        self.selected.iter().map(|&index| &self.leaves[index])
    }

    /// Full paths (`outer->inner`) of the selected leaves.
    pub fn selected_paths(&self) -> Vec<&str> {
        self.selected_members().map(|member| member.path.as_str()).collect()
    }

    /// Returns `true` if the leaf at `index` of the flattened list is selected.
    pub fn is_selected(&self, index: usize) -> bool {
        self.selected.binary_search(&index).is_ok()
    }

    /// Number of flattened leaf members, selected or not.
    pub fn leaf_count(&self) -> usize {
        self.leaves.len()
    }

    pub fn len(&self) -> usize {
        self.selected.len()
    }

    pub fn is_empty(&self) -> bool {
        self.selected.is_empty()
    }

    /// The dataset compound's own direct members after filtering.
    pub fn local_types(&self) -> Vec<Arc<Datatype>> {
        filter_selected(&self.selected_types, &self.compound)
    }

    pub fn scope(&self) -> MemberScope<'_> {
        MemberScope::Selected(&self.selected_types)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hdfview_core::datatype::CompoundMember;

    fn dataset_type() -> Arc<Datatype> {
        Arc::new(
            Datatype::compound(vec![
                CompoundMember::new("a", Datatype::int32()),
                CompoundMember::new(
                    "nested",
                    Datatype::compound(vec![
                        CompoundMember::new("x", Datatype::int8()),
                        CompoundMember::new("y", Datatype::int8()),
                    ])
                    .unwrap(),
                ),
                CompoundMember::new("b", Datatype::float32()),
            ])
            .unwrap(),
        )
    }

    #[test]
    fn test_filter_keeps_selected_and_compounds() {
        let dtype = dataset_type();
        let selected = vec![Arc::clone(dtype.members()[2].datatype())];
        let kept = filter_selected(&selected, &dtype);
        assert_eq!(kept.len(), 2);
        assert!(kept[0].is_compound());
        assert!(Arc::ptr_eq(&kept[1], dtype.members()[2].datatype()));
    }

    #[test]
    fn test_filter_uses_identity_not_equality() {
        let dtype = dataset_type();
        // A structurally identical int32 that is not the member itself
        let lookalike = vec![Arc::new(Datatype::int32())];
        let kept = filter_selected(&lookalike, &dtype);
        assert_eq!(kept.len(), 1);
        assert!(kept[0].is_compound());
    }

    #[test]
    fn test_filter_does_not_touch_input() {
        let dtype = dataset_type();
        let _ = filter_selected(&[], &dtype);
        assert_eq!(dtype.members().len(), 3);
    }

    #[test]
    fn test_filter_non_compound_is_empty() {
        assert!(filter_selected(&[], &Datatype::int8()).is_empty());
    }

    #[test]
    fn test_all_scope_keeps_everything() {
        let dtype = dataset_type();
        assert_eq!(MemberScope::All.filter(&dtype).len(), 3);
        assert_eq!(MemberScope::Selected(&[]).filter(&dtype).len(), 1);
    }

    #[test]
    fn test_selection_vector_maps_to_leaves() {
        let set = SelectedMemberSet::new(dataset_type(), &[true, false, true, true]).unwrap();
        assert_eq!(set.len(), 3);
        assert_eq!(set.leaf_count(), 4);
        assert_eq!(set.selected_paths(), vec!["a", "nested->y", "b"]);
        assert!(set.is_selected(2));
        assert!(!set.is_selected(1));
    }

    #[test]
    fn test_selection_length_mismatch() {
        let result = SelectedMemberSet::new(dataset_type(), &[true, true]);
        assert!(matches!(
            result,
            Err(TableError::SelectionLength { expected: 4, actual: 2 })
        ));
    }

    #[test]
    fn test_selection_requires_compound() {
        let result = SelectedMemberSet::all(Arc::new(Datatype::int8()));
        assert!(matches!(result, Err(TableError::Datatype(_))));
    }

    #[test]
    fn test_local_types() {
        let set = SelectedMemberSet::new(dataset_type(), &[false, true, true, false]).unwrap();
        let local = set.local_types();
        // `a` and `b` are deselected, the nested compound always stays
        assert_eq!(local.len(), 1);
        assert!(local[0].is_compound());
    }
}
