/// Three-way comparison of cell values
///
/// The policy used by the row sorter:
///
/// 1. identical cells (same reference, or both null) are equal
/// 2. a null sorts after any non-null value
/// 3. two values of the same variant use that variant's natural order
/// 4. anything else compares by textual rendering
///
/// Each rule is symmetric, so `compare_cells(a, b)` is always the reverse of
/// `compare_cells(b, a)`. The partition sort relies on that to terminate with
/// its pointers in range.

use crate::column::CellValue;
use std::cmp::Ordering;

/// Which rule of the policy decides a pair of cells
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparison {
    Identical,
    /// Left side is null, right is not
    NullFirst,
    /// Right side is null, left is not
    NullSecond,
    Natural,
    Textual,
}

impl Comparison {
    pub fn classify(a: &CellValue, b: &CellValue) -> Self {
        if std::ptr::eq(a, b) {
            return Comparison::Identical;
        }
        match (a, b) {
            (CellValue::Null, CellValue::Null) => Comparison::Identical,
            (CellValue::Null, _) => Comparison::NullFirst,
            (_, CellValue::Null) => Comparison::NullSecond,
            _ if std::mem::discriminant(a) == std::mem::discriminant(b) => Comparison::Natural,
            _ => Comparison::Textual,
        }
    }
}

/// Compare two cells under the sorter's policy (ascending sense)
pub fn compare_cells(a: &CellValue, b: &CellValue) -> Ordering {
    match Comparison::classify(a, b) {
        Comparison::Identical => Ordering::Equal,
        Comparison::NullFirst => Ordering::Greater,
        Comparison::NullSecond => Ordering::Less,
        Comparison::Natural => natural_order(a, b),
        Comparison::Textual => a.to_string().cmp(&b.to_string()),
    }
}

fn natural_order(a: &CellValue, b: &CellValue) -> Ordering {
    match (a, b) {
        (CellValue::Int32(a), CellValue::Int32(b)) => a.cmp(b),
        (CellValue::Int64(a), CellValue::Int64(b)) => a.cmp(b),
        // total_cmp keeps NaN and signed zeros in a total order
        (CellValue::Float32(a), CellValue::Float32(b)) => a.total_cmp(b),
        (CellValue::Float64(a), CellValue::Float64(b)) => a.total_cmp(b),
        (CellValue::String(a), CellValue::String(b)) => a.cmp(b),
        (CellValue::Bool(a), CellValue::Bool(b)) => a.cmp(b),
        (a, b) => a.to_string().cmp(&b.to_string()),
    }
}
