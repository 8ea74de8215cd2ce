//! FILENAME: core/collector-engine/src/table.rs
//! Data Table - the tabular result set handed to report renderers.
//!
//! Columns are named and typed and may be added at any time, also while rows
//! are being filled; adding a column that already exists is a no-op. Rows map
//! column names to values; a missing cell reads as `CellValue::Empty`.

use rustc_hash::FxHashMap;
use serde::ser::SerializeStruct;
use serde::{Deserialize, Serialize, Serializer};

// ============================================================================
// CELL VALUES
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ColumnType {
    Text,
    Number,
    Boolean,
}

impl ColumnType {
    /// The value a cell of this type takes when no data is available.
    pub fn default_value(&self) -> CellValue {
        match self {
            ColumnType::Text => CellValue::Text(String::new()),
            ColumnType::Number => CellValue::Number(0.0),
            ColumnType::Boolean => CellValue::Boolean(false),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum CellValue {
    Empty,
    Number(f64),
    Text(String),
    Boolean(bool),
}

static EMPTY_CELL: CellValue = CellValue::Empty;

impl CellValue {
    pub fn text(s: impl Into<String>) -> Self {
        CellValue::Text(s.into())
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, CellValue::Empty)
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            CellValue::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            CellValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            CellValue::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    pub fn display_value(&self) -> String {
        match self {
            CellValue::Empty => String::new(),
            CellValue::Number(n) => format!("{}", n),
            CellValue::Text(s) => s.clone(),
            CellValue::Boolean(b) => if *b { "TRUE" } else { "FALSE" }.to_string(),
        }
    }
}

impl From<f64> for CellValue {
    fn from(value: f64) -> Self {
        CellValue::Number(value)
    }
}

impl From<bool> for CellValue {
    fn from(value: bool) -> Self {
        CellValue::Boolean(value)
    }
}

impl From<&str> for CellValue {
    fn from(value: &str) -> Self {
        CellValue::Text(value.to_string())
    }
}

impl From<String> for CellValue {
    fn from(value: String) -> Self {
        CellValue::Text(value)
    }
}

// ============================================================================
// COLUMNS AND ROWS
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataColumn {
    pub name: String,
    pub column_type: ColumnType,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct DataRow {
    values: FxHashMap<String, CellValue>,
}

impl DataRow {
    pub fn new() -> Self {
        DataRow::default()
    }

    pub fn set(&mut self, column: impl Into<String>, value: CellValue) {
        self.values.insert(column.into(), value);
    }

    pub fn get(&self, column: &str) -> &CellValue {
        self.values.get(column).unwrap_or(&EMPTY_CELL)
    }

    pub fn contains(&self, column: &str) -> bool {
        self.values.contains_key(column)
    }

    /// Number of cells that have been written.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

// ============================================================================
// TABLE
// ============================================================================

#[derive(Debug, Clone, Default)]
pub struct DataTable {
    columns: Vec<DataColumn>,
    column_index: FxHashMap<String, usize>,
    rows: Vec<DataRow>,
}

impl DataTable {
    pub fn new() -> Self {
        DataTable::default()
    }

    /// Adds a column. Returns false (and leaves the table untouched) if a
    /// column with that name already exists.
    pub fn add_column(&mut self, name: &str, column_type: ColumnType) -> bool {
        if self.column_index.contains_key(name) {
            return false;
        }
        self.column_index.insert(name.to_string(), self.columns.len());
        self.columns.push(DataColumn {
            name: name.to_string(),
            column_type,
        });
        true
    }

    pub fn contains_column(&self, name: &str) -> bool {
        self.column_index.contains_key(name)
    }

    pub fn column(&self, name: &str) -> Option<&DataColumn> {
        self.column_index.get(name).map(|&i| &self.columns[i])
    }

    pub fn column_position(&self, name: &str) -> Option<usize> {
        self.column_index.get(name).copied()
    }

    pub fn columns(&self) -> &[DataColumn] {
        &self.columns
    }

    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|c| c.name.as_str())
    }

    pub fn new_row(&self) -> DataRow {
        DataRow::new()
    }

    pub fn add_row(&mut self, row: DataRow) {
        self.rows.push(row);
    }

    pub fn rows(&self) -> &[DataRow] {
        &self.rows
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn cell(&self, row: usize, column: &str) -> &CellValue {
        self.rows.get(row).map_or(&EMPTY_CELL, |r| r.get(column))
    }

    /// Appends `other`: columns not yet present are added in `other`'s order,
    /// rows are appended after the existing ones.
    pub fn merge(&mut self, other: DataTable) {
        for column in &other.columns {
            self.add_column(&column.name, column.column_type);
        }
        self.rows.extend(other.rows);
    }

    /// Row values in column order, for positional consumers.
    pub fn row_values(&self, row: usize) -> Vec<&CellValue> {
        match self.rows.get(row) {
            Some(r) => self.columns.iter().map(|c| r.get(&c.name)).collect(),
            None => Vec::new(),
        }
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }
}

impl Serialize for DataTable {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let rows: Vec<Vec<&CellValue>> = (0..self.rows.len()).map(|i| self.row_values(i)).collect();

        let mut state = serializer.serialize_struct("DataTable", 2)?;
        state.serialize_field("columns", &self.columns)?;
        state.serialize_field("rows", &rows)?;
        state.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_column_is_idempotent() {
        let mut table = DataTable::new();
        assert!(table.add_column("mass", ColumnType::Number));
        assert!(!table.add_column("mass", ColumnType::Text));

        assert_eq!(table.columns().len(), 1);
        assert_eq!(table.column("mass").unwrap().column_type, ColumnType::Number);
    }

    #[test]
    fn test_missing_cells_read_empty() {
        let mut table = DataTable::new();
        table.add_column("a", ColumnType::Text);
        table.add_column("b", ColumnType::Text);

        let mut row = table.new_row();
        row.set("a", CellValue::text("x"));
        table.add_row(row);

        assert_eq!(table.cell(0, "a"), &CellValue::text("x"));
        assert!(table.cell(0, "b").is_empty());
        assert!(table.cell(7, "a").is_empty());
    }

    #[test]
    fn test_merge_unions_columns_and_appends_rows() {
        let mut left = DataTable::new();
        left.add_column("System", ColumnType::Text);
        left.add_column("mass", ColumnType::Number);
        let mut row = left.new_row();
        row.set("System", CellValue::text("A"));
        left.add_row(row);

        let mut right = DataTable::new();
        right.add_column("System", ColumnType::Text);
        right.add_column("power", ColumnType::Number);
        let mut row = right.new_row();
        row.set("power", CellValue::Number(3.0));
        right.add_row(row);

        left.merge(right);

        let names: Vec<&str> = left.column_names().collect();
        assert_eq!(names, vec!["System", "mass", "power"]);
        assert_eq!(left.row_count(), 2);
        assert_eq!(left.cell(1, "power").as_number(), Some(3.0));
    }

    #[test]
    fn test_json_rows_follow_column_order() {
        let mut table = DataTable::new();
        table.add_column("b", ColumnType::Text);
        table.add_column("a", ColumnType::Number);
        let mut row = table.new_row();
        row.set("a", CellValue::Number(1.0));
        row.set("b", CellValue::text("x"));
        table.add_row(row);

        let json: serde_json::Value = serde_json::from_str(&table.to_json()).unwrap();
        assert_eq!(json["columns"][0]["name"], "b");
        assert_eq!(json["rows"][0][0]["Text"], "x");
        assert_eq!(json["rows"][0][1]["Number"], 1.0);
    }
}
