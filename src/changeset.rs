/// Changeset - Change Log for TableSorter
///
/// Every mutation of a table (loading data, inserting or removing a row,
/// editing a cell, sorting, cancelling an edit) is appended to the table's
/// changeset. Observers that hold on to selections or cached rows read the
/// log to find out what moved since they last looked.
///
/// # Usage Pattern
///
/// 1. Table operations generate `TableChange` events
/// 2. Changes accumulate in the table's changeset buffer
/// 3. An observer reads `changes()` (or `drain()`s them) and reacts
/// 4. Draining or clearing bumps the generation counter

use crate::column::{CellValue, Row};
use crate::sorter::SortKey;

/// Represents a single change to a table
#[derive(Debug, Clone, PartialEq)]
pub enum TableChange {
    /// All rows were replaced; the permutation was reset to identity
    RowsLoaded { count: usize },

    /// A row was inserted with the given origin index
    RowInserted { origin: usize },

    /// The row at `position` (origin `origin`) was removed
    RowRemoved {
        position: usize,
        origin: usize,
        data: Row,
    },

    /// A cell value was updated
    CellUpdated {
        origin: usize,
        column: usize,
        old_value: CellValue,
        new_value: CellValue,
    },

    /// Rows were reordered by `key`, performing `swaps` row swaps
    Sorted { key: SortKey, swaps: usize },

    /// An open cell edit was discarded
    EditCancelled { origin: usize, column: usize },
}

impl TableChange {
    /// Returns true if this change alters the set of rows (not just their order or contents)
    pub fn is_structural(&self) -> bool {
        matches!(
            self,
            TableChange::RowsLoaded { .. }
                | TableChange::RowInserted { .. }
                | TableChange::RowRemoved { .. }
        )
    }

    /// Returns true if positions may have moved
    pub fn reorders(&self) -> bool {
        self.is_structural() || matches!(self, TableChange::Sorted { swaps, .. } if *swaps > 0)
    }
}

/// A collection of changes recorded since the last drain
#[derive(Debug, Clone, Default)]
pub struct Changeset {
    changes: Vec<TableChange>,
    /// Generation counter - incremented each time changeset is cleared
    generation: u64,
}

impl Changeset {
    pub fn new() -> Self {
        Changeset {
            changes: Vec::new(),
            generation: 0,
        }
    }

    /// Add a change to the changeset
    pub fn push(&mut self, change: TableChange) {
        self.changes.push(change);
    }

    /// Returns all changes since the last clear
    pub fn changes(&self) -> &[TableChange] {
        &self.changes
    }

    /// Returns the current generation number
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Clear all changes and increment generation
    pub fn clear(&mut self) {
        self.changes.clear();
        self.generation += 1;
    }

    /// Returns true if there are no pending changes
    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    /// Returns the number of pending changes
    pub fn len(&self) -> usize {
        self.changes.len()
    }

    /// Drain changes, returning ownership and clearing the buffer
    pub fn drain(&mut self) -> Vec<TableChange> {
        self.generation += 1;
        std::mem::take(&mut self.changes)
    }
}

/// Helper to keep origin indices dense after an insert or remove
///
/// When a row is inserted with origin I, every origin >= I is incremented.
/// When the row with origin I is removed, every origin > I is decremented.
pub struct IndexAdjuster;

impl IndexAdjuster {
    /// Adjust an origin index after an insertion at `insert_origin`
    pub fn adjust_for_insert(origin: usize, insert_origin: usize) -> usize {
        if origin >= insert_origin {
            origin + 1
        } else {
            origin
        }
    }

    /// Adjust an origin index after removing `removed_origin`.
    /// Returns None if `origin` was the removed one.
    pub fn adjust_for_delete(origin: usize, removed_origin: usize) -> Option<usize> {
        if origin == removed_origin {
            None
        } else if origin > removed_origin {
            Some(origin - 1)
        } else {
            Some(origin)
        }
    }

    /// Adjust an entire permutation for an insert
    pub fn adjust_mapping_for_insert(mapping: &mut [usize], insert_origin: usize) {
        for origin in mapping.iter_mut() {
            *origin = Self::adjust_for_insert(*origin, insert_origin);
        }
    }

    /// Adjust an entire permutation for a removal.
    /// Returns the positions that still point at the removed origin (the caller removes them).
    pub fn adjust_mapping_for_delete(mapping: &mut [usize], removed_origin: usize) -> Vec<usize> {
        let mut stale = Vec::new();

        for (position, origin) in mapping.iter_mut().enumerate() {
            match Self::adjust_for_delete(*origin, removed_origin) {
                Some(adjusted) => *origin = adjusted,
                None => stale.push(position),
            }
        }

        stale
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_changeset_basic() {
        let mut cs = Changeset::new();
        assert!(cs.is_empty());
        assert_eq!(cs.generation(), 0);

        cs.push(TableChange::RowInserted { origin: 0 });

        assert!(!cs.is_empty());
        assert_eq!(cs.len(), 1);

        cs.clear();
        assert!(cs.is_empty());
        assert_eq!(cs.generation(), 1);
    }

    #[test]
    fn test_changeset_drain() {
        let mut cs = Changeset::new();
        cs.push(TableChange::RowsLoaded { count: 3 });
        cs.push(TableChange::Sorted {
            key: SortKey::ascending(0),
            swaps: 0,
        });

        let drained = cs.drain();
        assert_eq!(drained.len(), 2);
        assert!(drained[0].reorders());
        assert!(!drained[1].reorders());
        assert!(cs.is_empty());
        assert_eq!(cs.generation(), 1);
    }

    #[test]
    fn test_index_adjuster_insert() {
        assert_eq!(IndexAdjuster::adjust_for_insert(0, 2), 0);
        assert_eq!(IndexAdjuster::adjust_for_insert(1, 2), 1);
        assert_eq!(IndexAdjuster::adjust_for_insert(2, 2), 3);
        assert_eq!(IndexAdjuster::adjust_for_insert(3, 2), 4);
    }

    #[test]
    fn test_index_adjuster_delete() {
        assert_eq!(IndexAdjuster::adjust_for_delete(0, 2), Some(0));
        assert_eq!(IndexAdjuster::adjust_for_delete(1, 2), Some(1));
        assert_eq!(IndexAdjuster::adjust_for_delete(2, 2), None);
        assert_eq!(IndexAdjuster::adjust_for_delete(3, 2), Some(2));
    }

    #[test]
    fn test_mapping_adjust_for_insert() {
        // A sorted permutation; origin 3 is about to be inserted
        let mut mapping = vec![4, 0, 2, 1, 3];
        IndexAdjuster::adjust_mapping_for_insert(&mut mapping, 3);
        assert_eq!(mapping, vec![5, 0, 2, 1, 4]);
    }

    #[test]
    fn test_mapping_adjust_for_delete() {
        let mut mapping = vec![4, 0, 2, 1, 3];
        let stale = IndexAdjuster::adjust_mapping_for_delete(&mut mapping, 2);
        assert_eq!(stale, vec![2]);
        // The stale entry is left for the caller to remove
        assert_eq!(mapping, vec![3, 0, 2, 1, 2]);
    }
}
