//! Physical column to value handler mapping.
//!
//! A compound table flattens nested compounds into adjacent columns, but
//! keeps one value handler per *top-level* member: a nested compound is a
//! single compound handler that dispatches further inside itself. For
//!
//! ```text
//!  ___________________________________
//! |             Compound              |
//! |___________________________________|
//! |     |     |    Compound     |     |
//! | int | int |_________________| int |
//! |     |     | int | int | int |     |
//! |_____|_____|_____|_____|_____|_____|
//! ```
//!
//! the handlers are `[numeric, numeric, compound, numeric]` and columns map
//! to them as `0=0, 1=1, 2=2, 3=2, 4=2, 5=3`. Each column also records the
//! first column of its top-level group (`0, 1, 2, 2, 2, 5`), so that a
//! column can be turned into an index relative to the nested handler.
//!
//! The map is a flat array of [`ColumnSlot`]s indexed by physical column,
//! built in one depth-first, left-to-right walk.

use std::collections::BTreeMap;
use std::sync::Arc;

use hdfview_core::Datatype;
use hdfview_core::logging::targets;

use crate::selection::MemberScope;

/// Dispatch information for one physical column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ColumnSlot {
    /// Index of the top-level member handler owning this column.
    pub handler: usize,
    /// Physical column of the first column in the same top-level group.
    pub group_start: usize,
}

/// Column dispatch table for one compound level.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColumnIndexMap {
    slots: Vec<ColumnSlot>,
    handlers: usize,
}

impl ColumnIndexMap {
    /// Builds the map for `local` members, filtering nested compounds
    /// against the dataset's selected leaves.
    pub fn build(all_selected: &[Arc<Datatype>], local: &[Arc<Datatype>]) -> Self {
        Self::build_scoped(MemberScope::Selected(all_selected), local)
    }

    /// Builds the map for `local` members, filtering nested compounds with
    /// `scope`.
    pub fn build_scoped(scope: MemberScope<'_>, local: &[Arc<Datatype>]) -> Self {
        let mut builder = Builder {
            scope,
            slots: Vec::new(),
            handler: 0,
            group_start: 0,
        };
        builder.walk(local, 0);
        tracing::trace!(
            target: targets::COLUMN_MAP,
            members = local.len(),
            columns = builder.slots.len(),
            "built column index map"
        );
        Self {
            slots: builder.slots,
            handlers: builder.handler,
        }
    }

    /// Number of mapped physical columns.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Returns `true` when no column is mapped, meaning nothing is editable.
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn slot(&self, column: usize) -> Option<ColumnSlot> {
        self.slots.get(column).copied()
    }

    pub fn slots(&self) -> &[ColumnSlot] {
        &self.slots
    }

    pub fn handler_index(&self, column: usize) -> Option<usize> {
        self.slot(column).map(|slot| slot.handler)
    }

    pub fn group_start(&self, column: usize) -> Option<usize> {
        self.slot(column).map(|slot| slot.group_start)
    }

    /// Column index relative to the start of its top-level group.
    pub fn relative_column(&self, column: usize) -> Option<usize> {
        self.slot(column).map(|slot| column - slot.group_start)
    }

    /// Number of top-level handlers, including members that map no
    /// column.
    pub fn handler_count(&self) -> usize {
        self.handlers
    }

    /// The column to handler mapping as an ordered map.
    pub fn column_to_handler(&self) -> BTreeMap<usize, usize> {
        self.slots
            .iter()
            .enumerate()
            .map(|(column, slot)| (column, slot.handler))
            .collect()
    }

    /// The column to group start mapping as an ordered map.
    pub fn column_to_group_start(&self) -> BTreeMap<usize, usize> {
        self.slots
            .iter()
            .enumerate()
            .map(|(column, slot)| (column, slot.group_start))
            .collect()
    }
}

struct Builder<'a> {
    scope: MemberScope<'a>,
    slots: Vec<ColumnSlot>,
    handler: usize,
    group_start: usize,
}

impl Builder<'_> {
    fn walk(&mut self, members: &[Arc<Datatype>], depth: usize) {
        for member in members {
            if member.is_compound() {
                if depth == 0 {
                    self.group_start = self.slots.len();
                }
                let nested = self.scope.filter(member);
                self.walk(&nested, depth + 1);
            } else {
                let group_start = if depth == 0 {
                    self.slots.len()
                } else {
                    self.group_start
                };
                self.slots.push(ColumnSlot {
                    handler: self.handler,
                    group_start,
                });
            }

            // One handler per top-level member, however many columns it spans
            if depth == 0 {
                self.handler += 1;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hdfview_core::CompoundMember;

    use crate::selection::SelectedMemberSet;

    fn example() -> Arc<Datatype> {
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

    fn map_for(set: &SelectedMemberSet) -> ColumnIndexMap {
        ColumnIndexMap::build(set.selected_types(), &set.local_types())
    }

    #[test]
    fn test_nested_example() {
        let set = SelectedMemberSet::all(example()).unwrap();
        let map = map_for(&set);
        assert_eq!(map.len(), 4);
        assert_eq!(
            map.column_to_handler(),
            BTreeMap::from([(0, 0), (1, 1), (2, 1), (3, 2)])
        );
        assert_eq!(
            map.column_to_group_start(),
            BTreeMap::from([(0, 0), (1, 1), (2, 1), (3, 3)])
        );
        assert_eq!(map.relative_column(2), Some(1));
        assert_eq!(map.handler_count(), 3);
    }

    #[test]
    fn test_doc_diagram_layout() {
        let inner = Datatype::compound(vec![
            CompoundMember::new("c", Datatype::int32()),
            CompoundMember::new("d", Datatype::int32()),
            CompoundMember::new("e", Datatype::int32()),
        ])
        .unwrap();
        let dtype = Arc::new(
            Datatype::compound(vec![
                CompoundMember::new("a", Datatype::int32()),
                CompoundMember::new("b", Datatype::int32()),
                CompoundMember::new("inner", inner),
                CompoundMember::new("f", Datatype::int32()),
            ])
            .unwrap(),
        );
        let map = map_for(&SelectedMemberSet::all(dtype).unwrap());
        let handlers: Vec<usize> = map.slots().iter().map(|s| s.handler).collect();
        let starts: Vec<usize> = map.slots().iter().map(|s| s.group_start).collect();
        assert_eq!(handlers, vec![0, 1, 2, 2, 2, 3]);
        assert_eq!(starts, vec![0, 1, 2, 2, 2, 5]);
    }

    #[test]
    fn test_deselected_nested_member() {
        // Drop `nested->x`: columns a, y, b
        let set = SelectedMemberSet::new(example(), &[true, false, true, true]).unwrap();
        let map = map_for(&set);
        assert_eq!(
            map.column_to_handler(),
            BTreeMap::from([(0, 0), (1, 1), (2, 2)])
        );
        assert_eq!(
            map.column_to_group_start(),
            BTreeMap::from([(0, 0), (1, 1), (2, 2)])
        );
    }

    #[test]
    fn test_fully_deselected_nested_compound_keeps_handler_slot() {
        let set = SelectedMemberSet::new(example(), &[true, false, false, true]).unwrap();
        let map = map_for(&set);
        // The empty nested compound still consumes handler 1
        assert_eq!(map.column_to_handler(), BTreeMap::from([(0, 0), (1, 2)]));
        assert_eq!(map.handler_count(), 3);
    }

    #[test]
    fn test_trailing_deselected_compound_counts_as_handler() {
        let dtype = Arc::new(
            Datatype::compound(vec![
                CompoundMember::new("a", Datatype::int8()),
                CompoundMember::new(
                    "tail",
                    Datatype::compound(vec![CompoundMember::new("z", Datatype::int8())])
                        .unwrap(),
                ),
            ])
            .unwrap(),
        );
        let set = SelectedMemberSet::new(dtype, &[true, false]).unwrap();
        let map = map_for(&set);
        assert_eq!(map.len(), 1);
        assert_eq!(map.handler_count(), 2);
        assert_eq!(map.handler_count(), set.local_types().len());
    }

    #[test]
    fn test_doubly_nested_group_start() {
        let inner = Datatype::compound(vec![
            CompoundMember::new("q", Datatype::int8()),
            CompoundMember::new("r", Datatype::int8()),
        ])
        .unwrap();
        let middle = Datatype::compound(vec![
            CompoundMember::new("p", Datatype::int8()),
            CompoundMember::new("inner", inner),
        ])
        .unwrap();
        let dtype = Arc::new(
            Datatype::compound(vec![
                CompoundMember::new("a", Datatype::int8()),
                CompoundMember::new("middle", middle),
            ])
            .unwrap(),
        );
        let map = map_for(&SelectedMemberSet::all(dtype).unwrap());
        assert_eq!(
            map.column_to_handler(),
            BTreeMap::from([(0, 0), (1, 1), (2, 1), (3, 1)])
        );
        assert_eq!(
            map.column_to_group_start(),
            BTreeMap::from([(0, 0), (1, 1), (2, 1), (3, 1)])
        );
        assert_eq!(map.relative_column(3), Some(2));
    }

    #[test]
    fn test_empty_local_gives_empty_map() {
        let map = ColumnIndexMap::build(&[], &[]);
        assert!(map.is_empty());
        assert_eq!(map.handler_count(), 0);
        assert_eq!(map.handler_index(0), None);
    }

    #[test]
    fn test_array_members_are_single_columns() {
        let dtype = Arc::new(
            Datatype::compound(vec![
                CompoundMember::new("v", Datatype::array(Datatype::uint16(), vec![3])),
                CompoundMember::new("s", Datatype::vlen(Datatype::int32())),
            ])
            .unwrap(),
        );
        let map = map_for(&SelectedMemberSet::all(dtype).unwrap());
        assert_eq!(map.len(), 2);
        assert_eq!(map.column_to_handler(), BTreeMap::from([(0, 0), (1, 1)]));
    }

    #[test]
    fn test_all_scope_ignores_selection() {
        let dtype = example();
        let local = MemberScope::All.filter(&dtype);
        let map = ColumnIndexMap::build_scoped(MemberScope::All, &local);
        assert_eq!(map.len(), 4);
    }
}
