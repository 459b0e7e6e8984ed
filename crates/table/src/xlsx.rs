use crate::cell::CellValue;
use crate::error::{Result, TableError};
use crate::table::Table;
use calamine::{open_workbook, Data, Reader, Xlsx, XlsxError};
use rust_xlsxwriter::{Workbook, Worksheet};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// Options for reading Excel files
#[derive(Debug, Clone, Default)]
pub struct XlsxReadOptions {
    /// Whether the first row contains headers
    pub has_headers: bool,
}

impl XlsxReadOptions {
    /// Set whether the first row contains headers
    #[must_use]
    pub fn with_headers(mut self, has_headers: bool) -> Self {
        self.has_headers = has_headers;
        self
    }
}

fn xlsx_error(e: XlsxError) -> TableError {
    TableError::Io(std::io::Error::new(
        std::io::ErrorKind::Other,
        e.to_string(),
    ))
}

fn write_error<E: std::fmt::Display>(e: E) -> TableError {
    TableError::Io(std::io::Error::new(
        std::io::ErrorKind::Other,
        e.to_string(),
    ))
}

/// Convert calamine Data to CellValue
fn data_to_cell_value(data: &Data) -> CellValue {
    match data {
        Data::Empty => CellValue::Null,
        Data::Bool(b) => CellValue::Bool(*b),
        Data::Int(i) => CellValue::Int(*i),
        Data::Float(f) => CellValue::Float(*f),
        Data::String(s) => CellValue::String(s.clone()),
        // Excel stores dates as days since 1899-12-30
        Data::DateTime(dt) => CellValue::Float(dt.as_f64()),
        Data::DateTimeIso(s) => CellValue::String(s.clone()),
        Data::DurationIso(s) => CellValue::String(s.clone()),
        Data::Error(e) => CellValue::String(format!("#ERROR: {e:?}")),
    }
}

impl Table {
    /// Load a table from an Excel file (first sheet)
    ///
    /// # Errors
    ///
    /// Returns error if file cannot be opened or read.
    pub fn from_xlsx<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::from_xlsx_with_options(path, XlsxReadOptions::default())
    }

    /// Load a table from an Excel file with options
    ///
    /// # Errors
    ///
    /// Returns error if file cannot be opened or read.
    pub fn from_xlsx_with_options<P: AsRef<Path>>(
        path: P,
        options: XlsxReadOptions,
    ) -> Result<Self> {
        let workbook: Xlsx<BufReader<File>> =
            open_workbook(path.as_ref()).map_err(xlsx_error)?;

        let sheet_names = workbook.sheet_names().to_vec();
        if sheet_names.is_empty() {
            return Ok(Table::new());
        }

        Self::from_xlsx_sheet_with_options(path, &sheet_names[0], options)
    }

    /// Load a specific sheet from an Excel file by name
    ///
    /// # Errors
    ///
    /// Returns error if file cannot be opened, sheet not found, or read fails.
    pub fn from_xlsx_sheet<P: AsRef<Path>>(path: P, sheet_name: &str) -> Result<Self> {
        Self::from_xlsx_sheet_with_options(path, sheet_name, XlsxReadOptions::default())
    }

    /// Load a specific sheet from an Excel file with options
    pub fn from_xlsx_sheet_with_options<P: AsRef<Path>>(
        path: P,
        sheet_name: &str,
        options: XlsxReadOptions,
    ) -> Result<Self> {
        let mut workbook: Xlsx<BufReader<File>> =
            open_workbook(path.as_ref()).map_err(xlsx_error)?;

        let range = workbook
            .worksheet_range(sheet_name)
            .map_err(xlsx_error)?;

        let mut data: Vec<Vec<CellValue>> = Vec::new();
        for row in range.rows() {
            let row_data: Vec<CellValue> = row.iter().map(data_to_cell_value).collect();
            data.push(row_data);
        }

        let mut table = Table::with_name(sheet_name);
        *table.data_mut() = data;

        if options.has_headers && table.row_count() > 0 {
            table.name_columns_by_row(0)?;
        }

        Ok(table)
    }

    /// Get sheet names from an Excel file without loading data
    pub fn xlsx_sheet_names<P: AsRef<Path>>(path: P) -> Result<Vec<String>> {
        let workbook: Xlsx<BufReader<File>> =
            open_workbook(path.as_ref()).map_err(xlsx_error)?;

        Ok(workbook
            .sheet_names()
            .iter()
            .map(|s| s.to_string())
            .collect())
    }

    /// Save the table to an Excel file
    ///
    /// # Errors
    ///
    /// Returns error if file cannot be created or written.
    pub fn save_as_xlsx<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let mut workbook = Workbook::new();
        let worksheet = workbook.add_worksheet();

        self.write_to_worksheet(worksheet)?;

        workbook.save(path.as_ref()).map_err(write_error)?;
        Ok(())
    }

    /// Write table data to a worksheet
    fn write_to_worksheet(&self, worksheet: &mut Worksheet) -> Result<()> {
        worksheet.set_name(self.name()).map_err(write_error)?;

        for (row_idx, row) in self.data().iter().enumerate() {
            for (col_idx, cell) in row.iter().enumerate() {
                let row_num = u32::try_from(row_idx)
                    .map_err(|_| write_error("Row index overflow"))?;
                let col_num = u16::try_from(col_idx)
                    .map_err(|_| write_error("Column index overflow"))?;

                match cell {
                    CellValue::Null => {} // Leave empty
                    CellValue::Bool(b) => {
                        worksheet
                            .write_boolean(row_num, col_num, *b)
                            .map_err(write_error)?;
                    }
                    CellValue::Int(i) => {
                        // Note: Excel stores all numbers as f64, so integers > 2^53
                        // may lose precision
                        worksheet
                            .write_number(row_num, col_num, *i as f64)
                            .map_err(write_error)?;
                    }
                    CellValue::Float(f) => {
                        worksheet
                            .write_number(row_num, col_num, *f)
                            .map_err(write_error)?;
                    }
                    CellValue::String(s) => {
                        worksheet
                            .write_string(row_num, col_num, s)
                            .map_err(write_error)?;
                    }
                }
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_xlsx_write_and_read() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("test.xlsx");

        let table = Table::from_data(vec![
            vec!["Escola", "GRE", "IEG"],
            vec!["Escola A", "GRE 1", "7.5"],
            vec!["Escola B", "GRE 2", "6.1"],
        ]);
        table.save_as_xlsx(&path).unwrap();

        let loaded = Table::from_xlsx(&path).unwrap();
        assert_eq!(loaded.row_count(), 3);
        assert_eq!(loaded.col_count(), 3);
    }

    #[test]
    fn test_xlsx_types() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("types.xlsx");

        let mut table = Table::new();
        *table.data_mut() = vec![vec![
            CellValue::String("text".to_string()),
            CellValue::Int(42),
            CellValue::Float(6.25),
            CellValue::Bool(true),
        ]];

        table.save_as_xlsx(&path).unwrap();
        let loaded = Table::from_xlsx(&path).unwrap();

        assert!(matches!(loaded.get(0, 0).unwrap(), CellValue::String(s) if s == "text"));
        // Int becomes Float in Excel
        assert!(matches!(loaded.get(0, 1).unwrap(), CellValue::Float(f) if (*f - 42.0).abs() < 0.01));
        assert!(matches!(loaded.get(0, 2).unwrap(), CellValue::Float(f) if (*f - 6.25).abs() < 0.01));
        assert!(matches!(loaded.get(0, 3).unwrap(), CellValue::Bool(true)));
    }

    #[test]
    fn test_xlsx_with_headers() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("headers.xlsx");

        let table = Table::from_data(vec![
            vec!["Escola", "IEG"],
            vec!["Escola A", "7.5"],
        ]);
        table.save_as_xlsx(&path).unwrap();

        let no_headers = Table::from_xlsx(&path).unwrap();
        assert!(no_headers.column_names().is_none());

        let with_headers =
            Table::from_xlsx_with_options(&path, XlsxReadOptions::default().with_headers(true))
                .unwrap();
        let names = with_headers.column_names().unwrap();
        assert_eq!(names, &vec!["Escola".to_string(), "IEG".to_string()]);
    }

    #[test]
    fn test_xlsx_sheet_names() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("names.xlsx");

        let mut table = Table::from_data(vec![vec![1]]);
        table.set_name("Planilha1");
        table.save_as_xlsx(&path).unwrap();

        let names = Table::xlsx_sheet_names(&path).unwrap();
        assert_eq!(names, vec!["Planilha1".to_string()]);
    }
}
