use crate::cell::CellValue;
use crate::error::{Result, TableError};
use std::collections::HashMap;

/// A table representing a 2D grid of cells (row-major storage)
///
/// Column names are optional; when set via [`Table::name_columns_by_row`]
/// the header row stays in place as row 0 and data rows follow it.
#[derive(Debug, Clone)]
pub struct Table {
    name: String,
    data: Vec<Vec<CellValue>>,
    column_names: Option<Vec<String>>,
    column_index: Option<HashMap<String, usize>>,
}

impl Table {
    /// Create a new empty table
    #[must_use]
    pub fn new() -> Self {
        Self::with_name("Sheet1")
    }

    /// Create a new empty table with a name
    #[must_use]
    pub fn with_name(name: &str) -> Self {
        Table {
            name: name.to_string(),
            data: Vec::new(),
            column_names: None,
            column_index: None,
        }
    }

    /// Create a table from a 2D vector of values
    #[must_use]
    pub fn from_data<T: Into<CellValue> + Clone>(data: Vec<Vec<T>>) -> Self {
        let converted: Vec<Vec<CellValue>> = data
            .into_iter()
            .map(|row| row.into_iter().map(Into::into).collect())
            .collect();

        Table {
            name: "Sheet1".to_string(),
            data: converted,
            column_names: None,
            column_index: None,
        }
    }

    /// Get the table name
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Set the table name
    pub fn set_name(&mut self, name: &str) {
        self.name = name.to_string();
    }

    /// Get the number of rows (including the header row, if named)
    #[must_use]
    pub fn row_count(&self) -> usize {
        self.data.len()
    }

    /// Get the number of columns
    #[must_use]
    pub fn col_count(&self) -> usize {
        self.data.first().map_or(0, Vec::len)
    }

    /// Check if the table is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Number of data rows, excluding the header row when columns are named
    #[must_use]
    pub fn data_row_count(&self) -> usize {
        self.data.len().saturating_sub(self.header_offset())
    }

    // ===== Cell Access =====

    /// Get a cell value by row and column index (0-based)
    pub fn get(&self, row: usize, col: usize) -> Result<&CellValue> {
        self.data
            .get(row)
            .and_then(|r| r.get(col))
            .ok_or(TableError::IndexOutOfBounds {
                row,
                col,
                rows: self.row_count(),
                cols: self.col_count(),
            })
    }

    /// Set a cell value by row and column index (0-based)
    pub fn set<T: Into<CellValue>>(&mut self, row: usize, col: usize, value: T) -> Result<()> {
        let rows = self.row_count();
        let cols = self.col_count();
        let cell = self
            .data
            .get_mut(row)
            .and_then(|r| r.get_mut(col))
            .ok_or(TableError::IndexOutOfBounds {
                row,
                col,
                rows,
                cols,
            })?;
        *cell = value.into();
        Ok(())
    }

    /// Get a cell value by row index and column name
    pub fn get_by_name(&self, row: usize, col_name: &str) -> Result<&CellValue> {
        let col = self.column_index_by_name(col_name)?;
        self.get(row, col)
    }

    /// Set a cell value by row index and column name
    pub fn set_by_name<T: Into<CellValue>>(
        &mut self,
        row: usize,
        col_name: &str,
        value: T,
    ) -> Result<()> {
        let col = self.column_index_by_name(col_name)?;
        self.set(row, col, value)
    }

    // ===== Row Operations =====

    /// Get an entire row by index (0-based)
    pub fn row(&self, index: usize) -> Result<&Vec<CellValue>> {
        self.data.get(index).ok_or(TableError::RowIndexOutOfBounds {
            index,
            count: self.row_count(),
        })
    }

    /// Append a row to the end of the table
    pub fn row_append<T: Into<CellValue>>(&mut self, data: Vec<T>) -> Result<()> {
        let row: Vec<CellValue> = data.into_iter().map(Into::into).collect();

        if !self.data.is_empty() && row.len() != self.col_count() {
            return Err(TableError::LengthMismatch {
                expected: self.col_count(),
                actual: row.len(),
            });
        }

        self.data.push(row);
        Ok(())
    }

    /// Iterate over all rows (including the header row, if named)
    pub fn rows(&self) -> impl Iterator<Item = &Vec<CellValue>> {
        self.data.iter()
    }

    /// Iterate over data rows, skipping the header row when columns are named
    pub fn data_rows(&self) -> impl Iterator<Item = &Vec<CellValue>> {
        self.data.iter().skip(self.header_offset())
    }

    /// Keep only rows matching the predicate; the header row is always kept.
    /// Returns the number of rows removed.
    pub fn filter_rows<F>(&mut self, predicate: F) -> usize
    where
        F: Fn(&[CellValue]) -> bool,
    {
        let offset = self.header_offset();
        let original_len = self.data.len();
        let mut index = 0usize;
        self.data.retain(|row| {
            let keep = index < offset || predicate(row);
            index += 1;
            keep
        });
        original_len - self.data.len()
    }

    // ===== Column Operations =====

    /// Get an entire column by index (0-based)
    pub fn column(&self, index: usize) -> Result<Vec<CellValue>> {
        if index >= self.col_count() {
            return Err(TableError::ColumnIndexOutOfBounds {
                index,
                count: self.col_count(),
            });
        }

        Ok(self
            .data
            .iter()
            .map(|row| row.get(index).cloned().unwrap_or(CellValue::Null))
            .collect())
    }

    /// Get an entire column by name (header cell excluded)
    pub fn column_by_name(&self, name: &str) -> Result<Vec<CellValue>> {
        let index = self.column_index_by_name(name)?;
        let column = self.column(index)?;
        Ok(column.into_iter().skip(self.header_offset()).collect())
    }

    /// Apply a function to a specific column by name (header cell excluded)
    pub fn column_map_by_name<F>(&mut self, name: &str, f: F) -> Result<()>
    where
        F: Fn(&CellValue) -> CellValue,
    {
        let index = self.column_index_by_name(name)?;
        let offset = self.header_offset();
        for row in self.data.iter_mut().skip(offset) {
            if let Some(cell) = row.get_mut(index) {
                *cell = f(cell);
            }
        }
        Ok(())
    }

    /// Keep only the specified columns, in the given order
    pub fn select_columns(&mut self, columns: &[&str]) -> Result<()> {
        let indices: Result<Vec<usize>> = columns
            .iter()
            .map(|name| self.column_index_by_name(name))
            .collect();
        let indices = indices?;

        for row in &mut self.data {
            let new_row: Vec<CellValue> = indices
                .iter()
                .filter_map(|&i| row.get(i).cloned())
                .collect();
            *row = new_row;
        }

        if self.column_names.is_some() {
            let new_names: Vec<String> = columns.iter().map(|s| (*s).to_string()).collect();
            self.column_names = Some(new_names);
            self.rebuild_column_index();
        }
        Ok(())
    }

    // ===== Named Access =====

    /// Use the specified row as column headers
    ///
    /// # Errors
    ///
    /// Returns `TableError::DuplicateColumnName` if the header row contains duplicate names.
    pub fn name_columns_by_row(&mut self, row_index: usize) -> Result<()> {
        let header_row = self.row(row_index)?;
        let names: Vec<String> = header_row.iter().map(CellValue::as_str).collect();

        let mut index_map = HashMap::new();
        for (i, name) in names.iter().enumerate() {
            if index_map.contains_key(name) {
                return Err(TableError::DuplicateColumnName { name: name.clone() });
            }
            index_map.insert(name.clone(), i);
        }

        self.column_names = Some(names);
        self.column_index = Some(index_map);
        Ok(())
    }

    /// Get column names (if set)
    #[must_use]
    pub fn column_names(&self) -> Option<&Vec<String>> {
        self.column_names.as_ref()
    }

    /// Check whether a column name exists
    #[must_use]
    pub fn has_column(&self, name: &str) -> bool {
        self.column_index
            .as_ref()
            .is_some_and(|m| m.contains_key(name))
    }

    /// Get the column index by name
    pub fn column_index_by_name(&self, name: &str) -> Result<usize> {
        self.column_index
            .as_ref()
            .ok_or_else(|| {
                TableError::ColumnsNotNamed("Call name_columns_by_row() first".to_string())
            })?
            .get(name)
            .copied()
            .ok_or_else(|| TableError::ColumnNotFound {
                name: name.to_string(),
            })
    }

    // ===== Conversion =====

    /// Get internal data reference
    #[must_use]
    pub fn data(&self) -> &Vec<Vec<CellValue>> {
        &self.data
    }

    /// Get mutable internal data reference
    pub fn data_mut(&mut self) -> &mut Vec<Vec<CellValue>> {
        &mut self.data
    }

    /// First `n` data rows, for previews
    #[must_use]
    pub fn head(&self, n: usize) -> Vec<&Vec<CellValue>> {
        self.data_rows().take(n).collect()
    }

    /// Offset of the first data row (1 when a header row is named, 0 otherwise)
    #[must_use]
    pub fn header_offset(&self) -> usize {
        usize::from(self.column_names.is_some())
    }

    fn rebuild_column_index(&mut self) {
        if let Some(names) = &self.column_names {
            let mut index_map = HashMap::new();
            for (i, name) in names.iter().enumerate() {
                index_map.insert(name.clone(), i);
            }
            self.column_index = Some(index_map);
        }
    }
}

impl Default for Table {
    fn default() -> Self {
        Self::new()
    }
}
