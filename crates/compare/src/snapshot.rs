use crate::error::{CompareError, Result};
use escolar_table::{CellValue, CsvOptions, Table, XlsxReadOptions};
use std::collections::HashMap;
use std::path::Path;
use tracing::{debug, warn};

/// Options controlling how a snapshot is interpreted.
#[derive(Debug, Clone)]
pub struct SnapshotOptions {
    /// Column holding the row key (school name)
    pub key_column: String,
    /// Column holding the school's INEP code, carried into diff entries
    pub id_column: Option<String>,
}

impl Default for SnapshotOptions {
    fn default() -> Self {
        SnapshotOptions {
            key_column: "Escola".to_string(),
            id_column: Some("inep".to_string()),
        }
    }
}

impl SnapshotOptions {
    /// Set the key column
    #[must_use]
    pub fn with_key_column(mut self, name: &str) -> Self {
        self.key_column = name.to_string();
        self
    }

    /// Set the id column
    #[must_use]
    pub fn with_id_column(mut self, name: Option<&str>) -> Self {
        self.id_column = name.map(ToString::to_string);
        self
    }
}

/// One export of the school-performance spreadsheet, keyed by school name.
///
/// Construction cleans the data the same way the report pipeline expects it:
/// rows with a blank key are dropped and keys are coerced to trimmed strings.
#[derive(Debug, Clone)]
pub struct Snapshot {
    table: Table,
    key_column: String,
    id_column: Option<String>,
    key_index: usize,
}

impl Snapshot {
    /// Load a snapshot from an `.xlsx` or `.csv` file. The first row is the
    /// header row.
    pub fn load<P: AsRef<Path>>(path: P, options: SnapshotOptions) -> Result<Self> {
        let path = path.as_ref();
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_lowercase)
            .unwrap_or_default();

        let table = match ext.as_str() {
            "xlsx" => Table::from_xlsx_with_options(
                path,
                XlsxReadOptions::default().with_headers(true),
            )?,
            "csv" => Table::from_csv_with_options(
                path,
                CsvOptions::default().with_headers(true),
            )?,
            other => return Err(CompareError::UnsupportedFormat(other.to_string())),
        };

        debug!(
            path = %path.display(),
            rows = table.data_row_count(),
            "loaded snapshot"
        );
        Self::from_table(table, options)
    }

    /// Build a snapshot from an already-loaded table with named columns.
    pub fn from_table(mut table: Table, options: SnapshotOptions) -> Result<Self> {
        if table.column_names().is_none() {
            if table.is_empty() {
                return Ok(Snapshot {
                    table,
                    key_column: options.key_column,
                    id_column: options.id_column,
                    key_index: 0,
                });
            }
            return Err(CompareError::ColumnsNotNamed);
        }

        let key_index = table
            .column_index_by_name(&options.key_column)
            .map_err(|_| CompareError::KeyColumnNotFound {
                name: options.key_column.clone(),
            })?;

        // dropna(subset=[key]) + astype(str).str.strip()
        let dropped = table.filter_rows(|row| {
            !row.get(key_index).map_or(true, CellValue::is_blank)
        });
        if dropped > 0 {
            debug!(dropped, "dropped rows with blank key");
        }
        table.column_map_by_name(&options.key_column, |cell| {
            CellValue::String(cell.as_str().trim().to_string())
        })?;

        let snapshot = Snapshot {
            table,
            key_column: options.key_column,
            id_column: options.id_column,
            key_index,
        };

        for key in snapshot.duplicate_keys() {
            warn!(key = %key, column = %snapshot.key_column, "duplicate key in snapshot");
        }

        Ok(snapshot)
    }

    /// The key column name
    #[must_use]
    pub fn key_column(&self) -> &str {
        &self.key_column
    }

    /// The id column name, if configured and present in the data
    #[must_use]
    pub fn id_column(&self) -> Option<&str> {
        self.id_column
            .as_deref()
            .filter(|name| self.table.has_column(name))
    }

    /// The underlying table
    #[must_use]
    pub fn table(&self) -> &Table {
        &self.table
    }

    /// All keys, in row order
    #[must_use]
    pub fn keys(&self) -> Vec<String> {
        self.table
            .data_rows()
            .map(|row| {
                row.get(self.key_index)
                    .map(CellValue::as_str)
                    .unwrap_or_default()
            })
            .collect()
    }

    /// Data rows whose key matches, in row order. Duplicate keys yield
    /// several rows.
    #[must_use]
    pub fn rows_for_key(&self, key: &str) -> Vec<&Vec<CellValue>> {
        self.table
            .data_rows()
            .filter(|row| {
                row.get(self.key_index)
                    .map(CellValue::as_str)
                    .is_some_and(|k| k == key)
            })
            .collect()
    }

    /// Keys that appear more than once, in first-appearance order
    #[must_use]
    pub fn duplicate_keys(&self) -> Vec<String> {
        let keys = self.keys();
        let mut counts: HashMap<&str, usize> = HashMap::new();
        for key in &keys {
            *counts.entry(key.as_str()).or_default() += 1;
        }

        let mut seen = Vec::new();
        for key in &keys {
            if counts.get(key.as_str()).copied().unwrap_or(0) > 1
                && !seen.contains(key)
            {
                seen.push(key.clone());
            }
        }
        seen
    }

    /// All columns except the key column, in table order
    #[must_use]
    pub fn value_columns(&self) -> Vec<String> {
        self.table
            .column_names()
            .map(|names| {
                names
                    .iter()
                    .filter(|n| *n != &self.key_column)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default()
    }
}
