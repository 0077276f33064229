/// In-place row sorting with permutation tracking
///
/// Rows are reordered with a recursive two-pointer (Hoare) partition keyed on
/// one column. Every physical swap of two rows is mirrored by the same swap in
/// the permutation, so `permutation[i]` always names the origin index of the
/// row at current position `i`.
///
/// # Stability
///
/// The partition sort is not stable. Rows whose sort cells compare equal end
/// up in whatever relative order the partitioning leaves them. Two equal rows
/// are never swapped with each other, which makes re-sorting an already sorted
/// table a no-op, but ties introduced by a fresh sort are otherwise arbitrary.
/// Use `TieBreak::OriginIndex` when ties must come out in a reproducible
/// order.

use crate::column::{CellValue, Row};
use crate::compare::compare_cells;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Sort order specification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortDirection {
    /// Ascending order (smallest first, nulls last)
    Ascending,
    /// Descending order (largest first, nulls first)
    Descending,
}

impl SortDirection {
    pub fn from_ascending(ascending: bool) -> Self {
        if ascending {
            SortDirection::Ascending
        } else {
            SortDirection::Descending
        }
    }

    pub fn is_ascending(&self) -> bool {
        matches!(self, SortDirection::Ascending)
    }

    pub fn reversed(&self) -> Self {
        match self {
            SortDirection::Ascending => SortDirection::Descending,
            SortDirection::Descending => SortDirection::Ascending,
        }
    }

    fn apply(&self, ordering: Ordering) -> Ordering {
        match self {
            SortDirection::Ascending => ordering,
            SortDirection::Descending => ordering.reverse(),
        }
    }
}

/// How rows with equal sort cells are ordered relative to each other
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TieBreak {
    /// Leave ties wherever partitioning puts them
    #[default]
    Unstable,
    /// Order ties by ascending origin index, in either direction
    OriginIndex,
}

/// The active sort: a column and a direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortKey {
    pub column: usize,
    pub direction: SortDirection,
}

impl SortKey {
    pub fn ascending(column: usize) -> Self {
        SortKey {
            column,
            direction: SortDirection::Ascending,
        }
    }

    pub fn descending(column: usize) -> Self {
        SortKey {
            column,
            direction: SortDirection::Descending,
        }
    }
}

/// Tracks the last sort request so a repeated request on the same column
/// flips direction.
#[derive(Debug, Clone, Default)]
pub struct SortState {
    active: Option<SortKey>,
}

impl SortState {
    pub fn new() -> Self {
        SortState { active: None }
    }

    pub fn active(&self) -> Option<SortKey> {
        self.active
    }

    pub fn set(&mut self, key: SortKey) {
        self.active = Some(key);
    }

    pub fn clear(&mut self) {
        self.active = None;
    }

    /// Direction for a toggle request on `column`
    pub fn toggled_direction(&self, column: usize, first: SortDirection) -> SortDirection {
        match self.active {
            Some(key) if key.column == column => key.direction.reversed(),
            _ => first,
        }
    }
}

/// Sort `rows` in place by `key`, mirroring swaps into `permutation`.
///
/// `permutation` must have the same length as `rows`, and `key.column` must be
/// in range for every row; the table checks both before calling. Returns the
/// number of row swaps performed.
pub fn partition_sort(
    rows: &mut [Row],
    permutation: &mut [usize],
    key: SortKey,
    tie_break: TieBreak,
) -> usize {
    debug_assert_eq!(rows.len(), permutation.len());
    if rows.len() < 2 {
        return 0;
    }

    let mut sorter = PartitionSort {
        rows,
        permutation,
        column: key.column,
        direction: key.direction,
        tie_break,
        swaps: 0,
    };
    let hi = sorter.rows.len() - 1;
    sorter.sort_range(0, hi);
    sorter.swaps
}

struct PartitionSort<'a> {
    rows: &'a mut [Row],
    permutation: &'a mut [usize],
    column: usize,
    direction: SortDirection,
    tie_break: TieBreak,
    swaps: usize,
}

impl PartitionSort<'_> {
    /// Order of the row at `position` against the pivot, under the direction
    fn order_at(&self, position: usize, pivot: &CellValue, pivot_origin: usize) -> Ordering {
        let cell = &self.rows[position][self.column];
        let ordering = self.direction.apply(compare_cells(cell, pivot));
        match (ordering, self.tie_break) {
            (Ordering::Equal, TieBreak::OriginIndex) => self.permutation[position].cmp(&pivot_origin),
            _ => ordering,
        }
    }

    fn swap(&mut self, a: usize, b: usize) {
        let pivot = self.rows[b][self.column].clone();
        if self.order_at(a, &pivot, self.permutation[b]) == Ordering::Equal {
            return;
        }
        self.rows.swap(a, b);
        self.permutation.swap(a, b);
        self.swaps += 1;
    }

    fn sort_range(&mut self, mut lo0: usize, mut hi0: usize) {
        while lo0 < hi0 {
            log::trace!("partition [{}, {}]", lo0, hi0);

            let mid = lo0 + (hi0 - lo0) / 2;
            let pivot = self.rows[mid][self.column].clone();
            let pivot_origin = self.permutation[mid];

            // Signed pointers: `hi` may step one below `lo0`
            let (lower, upper) = (lo0 as isize, hi0 as isize);
            let mut lo = lower;
            let mut hi = upper;

            while lo <= hi {
                while lo < upper && self.order_at(lo as usize, &pivot, pivot_origin) == Ordering::Less {
                    lo += 1;
                }
                while hi > lower && self.order_at(hi as usize, &pivot, pivot_origin) == Ordering::Greater {
                    hi -= 1;
                }
                if lo <= hi {
                    if lo < hi {
                        self.swap(lo as usize, hi as usize);
                    }
                    lo += 1;
                    hi -= 1;
                }
            }

            // Remaining ranges: [lo0, hi] and [lo, hi0]. Recurse into the
            // smaller one and keep looping on the larger.
            let left = (hi > lower).then(|| (lo0, hi as usize));
            let right = (lo < upper).then(|| (lo as usize, hi0));

            match (left, right) {
                (Some(l), Some(r)) => {
                    let (small, large) = if l.1 - l.0 <= r.1 - r.0 { (l, r) } else { (r, l) };
                    self.sort_range(small.0, small.1);
                    lo0 = large.0;
                    hi0 = large.1;
                }
                (Some((l0, l1)), None) => {
                    lo0 = l0;
                    hi0 = l1;
                }
                (None, Some((r0, r1))) => {
                    lo0 = r0;
                    hi0 = r1;
                }
                (None, None) => return,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rows_of(values: Vec<CellValue>) -> (Vec<Row>, Vec<usize>) {
        let perm = (0..values.len()).collect();
        (values.into_iter().map(|v| vec![v]).collect(), perm)
    }

    fn column(rows: &[Row]) -> Vec<CellValue> {
        rows.iter().map(|r| r[0].clone()).collect()
    }

    #[test]
    fn test_sort_ascending() {
        let (mut rows, mut perm) = rows_of(vec![5.into(), 1.into(), 4.into(), 2.into(), 3.into()]);
        partition_sort(&mut rows, &mut perm, SortKey::ascending(0), TieBreak::Unstable);
        let ints: Vec<i32> = column(&rows).iter().filter_map(|v| v.as_i32()).collect();
        assert_eq!(ints, vec![1, 2, 3, 4, 5]);
        assert_eq!(perm, vec![1, 3, 4, 2, 0]);
    }

    #[test]
    fn test_sort_descending_puts_nulls_first() {
        let (mut rows, mut perm) = rows_of(vec![
            1.into(),
            CellValue::Null,
            3.into(),
            2.into(),
        ]);
        partition_sort(&mut rows, &mut perm, SortKey::descending(0), TieBreak::Unstable);
        assert_eq!(
            column(&rows),
            vec![CellValue::Null, 3.into(), 2.into(), 1.into()]
        );
        assert_eq!(perm, vec![1, 2, 3, 0]);
    }

    #[test]
    fn test_sorted_input_performs_no_swaps() {
        let (mut rows, mut perm) = rows_of(vec![1.into(), 1.into(), 2.into(), 2.into(), 3.into()]);
        let swaps = partition_sort(&mut rows, &mut perm, SortKey::ascending(0), TieBreak::Unstable);
        assert_eq!(swaps, 0);
        assert_eq!(perm, vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn test_all_equal_rows_stay_put() {
        let (mut rows, mut perm) = rows_of(vec![7.into(); 9]);
        let swaps = partition_sort(&mut rows, &mut perm, SortKey::descending(0), TieBreak::Unstable);
        assert_eq!(swaps, 0);
        assert_eq!(perm, (0..9).collect::<Vec<_>>());
    }

    #[test]
    fn test_origin_tie_break() {
        let (mut rows, mut perm) = rows_of(vec![
            "b".into(),
            "a".into(),
            "b".into(),
            "a".into(),
            "b".into(),
        ]);
        // Scramble first so ties are out of origin order
        partition_sort(&mut rows, &mut perm, SortKey::descending(0), TieBreak::Unstable);
        partition_sort(&mut rows, &mut perm, SortKey::ascending(0), TieBreak::OriginIndex);
        assert_eq!(perm, vec![1, 3, 0, 2, 4]);

        partition_sort(&mut rows, &mut perm, SortKey::descending(0), TieBreak::OriginIndex);
        assert_eq!(perm, vec![0, 2, 4, 1, 3]);
    }

    #[test]
    fn test_larger_input_is_sorted_and_permutation_tracks_rows() {
        // Deterministic pseudo-random sequence with duplicates, nulls and NaN
        let mut x: u32 = 12345;
        let values: Vec<CellValue> = (0..500)
            .map(|_| {
                x = x.wrapping_mul(1_103_515_245).wrapping_add(12345);
                match (x >> 16) % 60 {
                    0..=4 => CellValue::Null,
                    5..=7 => CellValue::Float64(f64::NAN),
                    n => CellValue::Float64((n % 25) as f64 - 10.0),
                }
            })
            .collect();

        for direction in [SortDirection::Ascending, SortDirection::Descending] {
            for tie_break in [TieBreak::Unstable, TieBreak::OriginIndex] {
                let key = SortKey { column: 0, direction };
                let (mut rows, mut perm) = rows_of(values.clone());

                partition_sort(&mut rows, &mut perm, key, tie_break);

                for (position, pair) in rows.windows(2).enumerate() {
                    let ordering = direction.apply(compare_cells(&pair[0][0], &pair[1][0]));
                    assert_ne!(ordering, Ordering::Greater, "{:?} {:?}", direction, tie_break);
                    if tie_break == TieBreak::OriginIndex && ordering == Ordering::Equal {
                        assert!(perm[position] < perm[position + 1]);
                    }
                }
                for (position, origin) in perm.iter().enumerate() {
                    assert_eq!(rows[position][0].to_string(), values[*origin].to_string());
                }
                let mut seen = perm.clone();
                seen.sort_unstable();
                assert_eq!(seen, (0..500).collect::<Vec<_>>());

                let sorted_perm = perm.clone();
                let swaps = partition_sort(&mut rows, &mut perm, key, tie_break);
                assert_eq!(swaps, 0, "{:?} {:?}", direction, tie_break);
                assert_eq!(perm, sorted_perm);
            }
        }
    }

    #[test]
    fn test_sort_state_toggle() {
        let mut state = SortState::new();
        assert_eq!(state.toggled_direction(2, SortDirection::Ascending), SortDirection::Ascending);
        state.set(SortKey::ascending(2));
        assert_eq!(state.toggled_direction(2, SortDirection::Ascending), SortDirection::Descending);
        assert_eq!(state.toggled_direction(1, SortDirection::Ascending), SortDirection::Ascending);
        state.clear();
        assert!(state.active().is_none());
    }
}
