/// TableSorter Table Implementation
///
/// A Table is an ordered collection of rows with a schema. Rows are stored in
/// their current (display) order; a permutation maps each current position
/// back to the row's origin index, i.e. its position in load order.
///
/// # Examples
///
/// ```
/// use tablesorter::{CellValue, ColumnType, Schema, Table};
///
/// let schema = Schema::new(vec![
///     ("name".to_string(), ColumnType::String, false),
///     ("score".to_string(), ColumnType::Int32, true),
/// ]);
/// let mut table = Table::new("scores".to_string(), schema);
///
/// table.append_row(vec!["Bob".into(), 85.into()]).unwrap();
/// table.append_row(vec!["Alice".into(), 92.into()]).unwrap();
/// table.append_row(vec!["Carol".into(), CellValue::Null]).unwrap();
///
/// table.sort_by_column(1, false).unwrap();
///
/// // Nulls come first when descending
/// assert_eq!(table.get_value(0, 0).unwrap().as_string(), Some("Carol"));
/// assert_eq!(table.get_value(1, 0).unwrap().as_string(), Some("Alice"));
/// assert_eq!(table.permutation(), &[2, 1, 0]);
/// assert_eq!(table.origin_index(Some(1)).unwrap(), Some(1));
/// assert_eq!(table.origin_index(None).unwrap(), None);
/// ```

use crate::changeset::{Changeset, IndexAdjuster, TableChange};
use crate::coerce::{self, ParserRegistry};
use crate::column::{CellValue, ColumnType, Row};
use crate::config::SorterConfig;
use crate::edit::EditSession;
use crate::error::{Result, TableError};
use crate::sorter::{partition_sort, SortDirection, SortKey, SortState};

/// Schema definition with column names and types.
///
/// ```
/// use tablesorter::{Schema, ColumnType};
///
/// let schema = Schema::new(vec![
///     ("name".to_string(), ColumnType::String, false),   // Required
///     ("value".to_string(), ColumnType::Any, true),      // Nullable, any type
/// ]);
///
/// assert_eq!(schema.len(), 2);
/// assert_eq!(schema.get_column_index("value"), Some(1));
/// ```
#[derive(Debug, Clone)]
pub struct Schema {
    columns: Vec<(String, ColumnType, bool)>, // (name, type, nullable)
}

impl Schema {
    /// Creates a new schema from (column_name, column_type, is_nullable) tuples.
    pub fn new(columns: Vec<(String, ColumnType, bool)>) -> Self {
        Schema { columns }
    }

    /// Returns the number of columns in the schema.
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    /// Returns true if the schema has no columns.
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Returns a list of all column names.
    pub fn get_column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|(name, _, _)| name.as_str()).collect()
    }

    /// Returns the index of a column by name, or None if not found.
    pub fn get_column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|(n, _, _)| n == name)
    }

    /// Returns (name, type, nullable) for the column at `index`.
    pub fn get_column_info(&self, index: usize) -> Option<(&str, ColumnType, bool)> {
        self.columns
            .get(index)
            .map(|(name, ty, nullable)| (name.as_str(), *ty, *nullable))
    }

    pub fn get_column_type(&self, index: usize) -> Option<ColumnType> {
        self.columns.get(index).map(|(_, ty, _)| *ty)
    }
}

/// A sortable table owning its rows.
pub struct Table {
    name: String,
    schema: Schema,
    /// Rows in current order
    rows: Vec<Row>,
    /// permutation[position] = origin index
    permutation: Vec<usize>,
    sort_state: SortState,
    config: SorterConfig,
    parsers: ParserRegistry,
    edit: Option<EditSession>,
    changeset: Changeset,
}

impl Table {
    /// Create an empty table with the default sorter configuration.
    pub fn new(name: String, schema: Schema) -> Self {
        Self::with_config(name, schema, SorterConfig::default())
    }

    pub fn with_config(name: String, schema: Schema, config: SorterConfig) -> Self {
        Table {
            name,
            schema,
            rows: Vec::new(),
            permutation: Vec::new(),
            sort_state: SortState::new(),
            config,
            parsers: ParserRegistry::default(),
            edit: None,
            changeset: Changeset::new(),
        }
    }

    /// Create an empty table with room for `capacity` rows.
    pub fn with_capacity(name: String, schema: Schema, capacity: usize) -> Self {
        let mut table = Self::new(name, schema);
        table.rows.reserve(capacity);
        table.permutation.reserve(capacity);
        table
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn config(&self) -> &SorterConfig {
        &self.config
    }

    pub fn set_config(&mut self, config: SorterConfig) {
        self.config = config;
    }

    /// Parsers used to coerce edited text into cell values
    pub fn parsers(&self) -> &ParserRegistry {
        &self.parsers
    }

    pub fn parsers_mut(&mut self) -> &mut ParserRegistry {
        &mut self.parsers
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_count(&self) -> usize {
        self.schema.len()
    }

    // ========================================================================
    // Reads
    // ========================================================================

    pub fn get_row(&self, position: usize) -> Result<&Row> {
        self.check_position(position)?;
        Ok(&self.rows[position])
    }

    pub fn get_value(&self, position: usize, column: usize) -> Result<&CellValue> {
        self.check_column(column)?;
        Ok(&self.get_row(position)?[column])
    }

    pub fn get_value_by_name(&self, position: usize, column: &str) -> Result<&CellValue> {
        let col_idx = self
            .schema
            .get_column_index(column)
            .ok_or_else(|| TableError::ColumnNotFound(column.to_string()))?;
        self.get_value(position, col_idx)
    }

    /// Current position of the row with the given origin index (linear scan).
    pub fn position_of_origin(&self, origin: usize) -> Result<usize> {
        self.permutation
            .iter()
            .position(|&o| o == origin)
            .ok_or(TableError::RowOutOfRange {
                row: origin,
                rows: self.len(),
            })
    }

    pub fn row_by_origin(&self, origin: usize) -> Result<&Row> {
        let position = self.position_of_origin(origin)?;
        Ok(&self.rows[position])
    }

    /// Rows in current order
    pub fn iter_rows(&self) -> std::slice::Iter<'_, Row> {
        self.rows.iter()
    }

    /// Cells of one column, in current order
    pub fn column_values(&self, column: usize) -> Result<Vec<&CellValue>> {
        self.check_column(column)?;
        Ok(self.rows.iter().map(|row| &row[column]).collect())
    }

    // ========================================================================
    // Writes
    // ========================================================================

    /// Overwrite one cell. Returns the previous value.
    ///
    /// The row keeps its position; call a sort again to reorder.
    pub fn set_value(&mut self, position: usize, column: usize, value: CellValue) -> Result<CellValue> {
        self.check_position(position)?;
        self.validate_cell(column, &value)?;

        let old_value = std::mem::replace(&mut self.rows[position][column], value.clone());
        self.changeset.push(TableChange::CellUpdated {
            origin: self.permutation[position],
            column,
            old_value: old_value.clone(),
            new_value: value,
        });

        Ok(old_value)
    }

    /// Replace all rows. The permutation is reset to identity and the active
    /// sort, if any, is applied again.
    pub fn load_rows(&mut self, rows: Vec<Row>) -> Result<()> {
        for row in &rows {
            self.validate_row(row)?;
        }

        self.cancel_active_edit();
        self.permutation = (0..rows.len()).collect();
        self.rows = rows;

        log::debug!("table '{}': loaded {} rows", self.name, self.rows.len());
        self.changeset.push(TableChange::RowsLoaded {
            count: self.rows.len(),
        });

        self.resort();
        Ok(())
    }

    /// Append a row with the next origin index. Returns that origin index.
    pub fn append_row(&mut self, row: Row) -> Result<usize> {
        let origin = self.len();
        self.insert_row(origin, row)?;
        Ok(origin)
    }

    /// Insert a row with the given origin index. Rows whose origin index is
    /// `>= origin` are renumbered up by one; the active sort is re-applied.
    pub fn insert_row(&mut self, origin: usize, row: Row) -> Result<()> {
        if origin > self.len() {
            return Err(TableError::RowOutOfRange {
                row: origin,
                rows: self.len() + 1,
            });
        }
        self.validate_row(&row)?;

        self.cancel_active_edit();
        IndexAdjuster::adjust_mapping_for_insert(&mut self.permutation, origin);
        self.rows.push(row);
        self.permutation.push(origin);

        log::debug!("table '{}': inserted row with origin {}", self.name, origin);
        self.changeset.push(TableChange::RowInserted { origin });

        self.resort();
        Ok(())
    }

    /// Remove the row at a current position and return it. Rows with a larger
    /// origin index are renumbered down by one.
    pub fn remove_row(&mut self, position: usize) -> Result<Row> {
        self.check_position(position)?;

        self.cancel_active_edit();
        let origin = self.permutation[position];
        for stale in IndexAdjuster::adjust_mapping_for_delete(&mut self.permutation, origin)
            .into_iter()
            .rev()
        {
            self.permutation.remove(stale);
        }
        let row = self.rows.remove(position);

        log::debug!(
            "table '{}': removed row at position {} (origin {})",
            self.name,
            position,
            origin
        );
        self.changeset.push(TableChange::RowRemoved {
            position,
            origin,
            data: row.clone(),
        });

        self.resort();
        Ok(row)
    }

    // ========================================================================
    // Sorting
    // ========================================================================

    /// Sort rows by `column`, ascending or descending.
    ///
    /// An open cell edit is cancelled first. Fails if `column` is out of range.
    pub fn sort_by_column(&mut self, column: usize, ascending: bool) -> Result<()> {
        self.check_column(column)?;
        self.cancel_active_edit();

        let key = SortKey {
            column,
            direction: SortDirection::from_ascending(ascending),
        };
        self.sort_state.set(key);
        self.apply_sort(key);
        Ok(())
    }

    /// Sort by `column`, flipping direction if the previous request was on the
    /// same column. Returns the direction used.
    pub fn toggle_sort(&mut self, column: usize) -> Result<SortDirection> {
        self.check_column(column)?;
        let direction = self
            .sort_state
            .toggled_direction(column, self.config.first_direction);
        self.sort_by_column(column, direction.is_ascending())?;
        Ok(direction)
    }

    /// The active sort key, if any sort has been requested
    pub fn sort_key(&self) -> Option<SortKey> {
        self.sort_state.active()
    }

    /// Origin index of the row at `position`. `None` ("no selection") is
    /// passed through unchanged.
    pub fn origin_index(&self, position: Option<usize>) -> Result<Option<usize>> {
        match position {
            None => Ok(None),
            Some(position) => {
                self.check_position(position)?;
                Ok(Some(self.permutation[position]))
            }
        }
    }

    /// Current position → origin index for every row
    pub fn permutation(&self) -> &[usize] {
        &self.permutation
    }

    fn resort(&mut self) {
        if let Some(key) = self.sort_state.active() {
            self.apply_sort(key);
        }
    }

    fn apply_sort(&mut self, key: SortKey) {
        let swaps = partition_sort(
            &mut self.rows,
            &mut self.permutation,
            key,
            self.config.tie_break,
        );
        log::debug!(
            "table '{}': sorted {} rows by column {} {:?} ({} swaps)",
            self.name,
            self.rows.len(),
            key.column,
            key.direction,
            swaps
        );
        self.changeset.push(TableChange::Sorted { key, swaps });
    }

    // ========================================================================
    // Cell editing
    // ========================================================================

    /// Open an edit on a cell, cancelling any edit already open. The pending
    /// text starts as the cell's current rendering (empty for null).
    pub fn begin_edit(&mut self, position: usize, column: usize) -> Result<()> {
        let current = self.get_value(position, column)?;
        let text = if current.is_null() {
            String::new()
        } else {
            current.to_string()
        };

        self.cancel_active_edit();
        self.edit = Some(EditSession::new(self.permutation[position], column, text));
        Ok(())
    }

    /// Replace the pending text of the open edit
    pub fn edit_text(&mut self, text: impl Into<String>) -> Result<()> {
        let edit = self.edit.as_mut().ok_or(TableError::NoActiveEdit)?;
        edit.set_text(text);
        Ok(())
    }

    pub fn editing(&self) -> Option<&EditSession> {
        self.edit.as_ref()
    }

    /// Coerce the pending text to the column's type and write it to the cell.
    ///
    /// If the text does not parse or the value is rejected by the schema, the
    /// edit stays open and the error is returned.
    pub fn commit_edit(&mut self) -> Result<CellValue> {
        let edit = self.edit.as_ref().ok_or(TableError::NoActiveEdit)?;
        let column = edit.column();
        let column_type = self
            .schema
            .get_column_type(column)
            .ok_or(TableError::ColumnOutOfRange {
                column,
                columns: self.column_count(),
            })?;

        let value = self.parsers.parse_for(column_type, edit.text())?;
        let position = self.position_of_origin(edit.origin())?;
        let old_value = self.set_value(position, column, value)?;

        self.edit = None;
        Ok(old_value)
    }

    /// Discard the open edit. Returns false if none was open.
    pub fn cancel_edit(&mut self) -> bool {
        self.cancel_active_edit()
    }

    fn cancel_active_edit(&mut self) -> bool {
        match self.edit.take() {
            Some(edit) => {
                log::debug!(
                    "table '{}': cancelled edit of origin {} column {}",
                    self.name,
                    edit.origin(),
                    edit.column()
                );
                self.changeset.push(TableChange::EditCancelled {
                    origin: edit.origin(),
                    column: edit.column(),
                });
                true
            }
            None => false,
        }
    }

    // ========================================================================
    // Change log
    // ========================================================================

    pub fn changeset(&self) -> &Changeset {
        &self.changeset
    }

    pub fn changeset_generation(&self) -> u64 {
        self.changeset.generation()
    }

    /// Drains and returns all pending changes, clearing the buffer
    pub fn drain_changes(&mut self) -> Vec<TableChange> {
        self.changeset.drain()
    }

    pub fn has_pending_changes(&self) -> bool {
        !self.changeset.is_empty()
    }

    // ========================================================================
    // Validation
    // ========================================================================

    fn check_column(&self, column: usize) -> Result<()> {
        if column >= self.column_count() {
            return Err(TableError::ColumnOutOfRange {
                column,
                columns: self.column_count(),
            });
        }
        Ok(())
    }

    fn check_position(&self, position: usize) -> Result<()> {
        if position >= self.len() {
            return Err(TableError::RowOutOfRange {
                row: position,
                rows: self.len(),
            });
        }
        Ok(())
    }

    fn validate_cell(&self, column: usize, value: &CellValue) -> Result<()> {
        let (name, column_type, nullable) =
            self.schema
                .get_column_info(column)
                .ok_or(TableError::ColumnOutOfRange {
                    column,
                    columns: self.column_count(),
                })?;

        if value.is_null() {
            if !nullable {
                return Err(TableError::NotNullable(name.to_string()));
            }
            return Ok(());
        }

        if !column_type.accepts(value) {
            return Err(TableError::TypeMismatch {
                column: name.to_string(),
                expected: column_type.tag().to_string(),
                found: value.type_name().to_string(),
            });
        }
        Ok(())
    }

    fn validate_row(&self, row: &Row) -> Result<()> {
        if row.len() != self.column_count() {
            return Err(TableError::ArityMismatch {
                expected: self.column_count(),
                found: row.len(),
            });
        }
        for (column, value) in row.iter().enumerate() {
            self.validate_cell(column, value)?;
        }
        Ok(())
    }

    // ========================================================================
    // Import / Export
    // ========================================================================

    /// Export rows in current order as CSV.
    ///
    /// ```
    /// use tablesorter::{ColumnType, Schema, Table};
    ///
    /// let schema = Schema::new(vec![
    ///     ("id".to_string(), ColumnType::Int32, false),
    ///     ("name".to_string(), ColumnType::String, false),
    /// ]);
    /// let mut table = Table::new("test".to_string(), schema);
    /// table.append_row(vec![1.into(), "Alice, Jr.".into()]).unwrap();
    ///
    /// let csv = table.to_csv();
    /// assert_eq!(csv, "id,name\n1,\"Alice, Jr.\"\n");
    /// ```
    pub fn to_csv(&self) -> String {
        let mut result = String::new();
        result.push_str(&self.schema.get_column_names().join(","));
        result.push('\n');

        for row in &self.rows {
            let values: Vec<String> = row
                .iter()
                .map(|value| match value {
                    CellValue::Null => String::new(),
                    CellValue::String(s) => {
                        // Escape quotes and wrap if contains comma/quote/newline
                        if s.contains(',') || s.contains('"') || s.contains('\n') {
                            format!("\"{}\"", s.replace('"', "\"\""))
                        } else {
                            s.clone()
                        }
                    }
                    other => other.to_string(),
                })
                .collect();
            result.push_str(&values.join(","));
            result.push('\n');
        }
        result
    }

    /// Export rows in current order as a JSON array. Each element carries the
    /// row's origin index and its cells keyed by column name.
    ///
    /// ```
    /// use tablesorter::{ColumnType, Schema, Table};
    ///
    /// let schema = Schema::new(vec![("n".to_string(), ColumnType::Int32, false)]);
    /// let mut table = Table::new("t".to_string(), schema);
    /// table.append_row(vec![2.into()]).unwrap();
    /// table.append_row(vec![1.into()]).unwrap();
    /// table.sort_by_column(0, true).unwrap();
    ///
    /// let json: serde_json::Value = serde_json::from_str(&table.to_json().unwrap()).unwrap();
    /// assert_eq!(json[0]["origin"], 1);
    /// assert_eq!(json[0]["values"]["n"], 1);
    /// ```
    pub fn to_json(&self) -> Result<String> {
        let column_names = self.schema.get_column_names();
        let rows: Vec<serde_json::Value> = self
            .rows
            .iter()
            .zip(&self.permutation)
            .map(|(row, origin)| {
                let values: serde_json::Map<String, serde_json::Value> = column_names
                    .iter()
                    .zip(row)
                    .map(|(name, value)| (name.to_string(), value.to_json()))
                    .collect();

                let mut obj = serde_json::Map::new();
                obj.insert("origin".to_string(), serde_json::Value::from(*origin));
                obj.insert("values".to_string(), serde_json::Value::Object(values));
                serde_json::Value::Object(obj)
            })
            .collect();

        Ok(serde_json::to_string_pretty(&rows)?)
    }

    /// Create a table from a CSV string.
    ///
    /// The first line is the header. Column types are inferred from the first
    /// data row (blank cells infer as strings) and every column is nullable.
    ///
    /// ```
    /// use tablesorter::Table;
    ///
    /// let csv = "id,name,score\n1,Alice,95.5\n2,Bob,87.0";
    /// let table = Table::from_csv("students", csv).unwrap();
    /// assert_eq!(table.len(), 2);
    /// assert_eq!(table.get_value(1, 1).unwrap().as_string(), Some("Bob"));
    /// ```
    pub fn from_csv(name: &str, csv: &str) -> Result<Table> {
        let mut all_rows = parse_csv_rows(csv);
        if all_rows.is_empty() {
            return Err(TableError::EmptyCsv);
        }

        let column_names = all_rows.remove(0);
        if column_names.iter().all(|c| c.is_empty()) {
            return Err(TableError::EmptyCsv);
        }

        let records: Vec<Vec<String>> = all_rows
            .into_iter()
            .filter(|row| !row.iter().all(|f| f.is_empty()))
            .collect();

        let types: Vec<ColumnType> = match records.first() {
            None => vec![ColumnType::String; column_names.len()],
            Some(first) => first
                .iter()
                .map(|v| coerce::infer_type(v).unwrap_or(ColumnType::String))
                .collect(),
        };

        let schema = Schema::new(
            column_names
                .iter()
                .zip(&types)
                .map(|(name, ty)| (name.clone(), *ty, true))
                .collect(),
        );
        let mut table = Table::new(name.to_string(), schema);

        let mut rows = Vec::with_capacity(records.len());
        for record in &records {
            if record.len() != column_names.len() {
                return Err(TableError::ArityMismatch {
                    expected: column_names.len(),
                    found: record.len(),
                });
            }
            let row = record
                .iter()
                .zip(&types)
                .map(|(text, ty)| table.parsers.parse_for(*ty, text))
                .collect::<std::result::Result<Row, _>>()?;
            rows.push(row);
        }

        table.load_rows(rows)?;
        table.changeset.clear();
        Ok(table)
    }
}

/// Parse a CSV string into rows, handling quoted fields with embedded newlines
fn parse_csv_rows(csv: &str) -> Vec<Vec<String>> {
    let mut rows = Vec::new();
    let mut current_row = Vec::new();
    let mut current_field = String::new();
    let mut in_quotes = false;
    let mut chars = csv.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '"' if in_quotes => {
                // Doubled quote inside a quoted field
                if chars.peek() == Some(&'"') {
                    chars.next();
                    current_field.push('"');
                } else {
                    in_quotes = false;
                }
            }
            '"' => in_quotes = true,
            ',' if !in_quotes => {
                current_row.push(std::mem::take(&mut current_field));
            }
            '\n' if !in_quotes => {
                current_row.push(std::mem::take(&mut current_field));
                rows.push(std::mem::take(&mut current_row));
            }
            '\r' if !in_quotes => {}
            _ => current_field.push(c),
        }
    }

    if !current_field.is_empty() || !current_row.is_empty() {
        current_row.push(current_field);
        rows.push(current_row);
    }

    rows
}

impl std::fmt::Debug for Table {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Table {{ name: '{}', columns: {}, rows: {}, sort: {:?} }}",
            self.name,
            self.schema.len(),
            self.rows.len(),
            self.sort_state.active()
        )
    }
}
