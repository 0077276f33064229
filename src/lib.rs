/// TableSorter - Index-Tracking Row Sorter
///
/// Sorts the rows of a table in place by one column while keeping a
/// permutation from each current position back to the row's origin index, so
/// selections and cached row references survive a re-sort.

pub mod error;
pub mod column;
pub mod compare;
pub mod sorter;
pub mod config;
pub mod coerce;
pub mod changeset;
pub mod edit;
pub mod table;
pub mod session;

pub use error::{CoerceError, Result, TableError};
pub use column::{CellValue, ColumnType, Row};
pub use compare::{compare_cells, Comparison};
pub use sorter::{partition_sort, SortDirection, SortKey, SortState, TieBreak};
pub use config::SorterConfig;
pub use coerce::ParserRegistry;
pub use changeset::{Changeset, IndexAdjuster, TableChange};
pub use edit::EditSession;
pub use table::{Schema, Table};
pub use session::{composite_key, Session};
