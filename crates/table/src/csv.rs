use crate::cell::CellValue;
use crate::error::Result;
use crate::table::Table;
use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

/// CSV reader/writer options
#[derive(Debug, Clone)]
pub struct CsvOptions {
    /// Field delimiter (default: ',')
    pub delimiter: u8,
    /// Whether the first row contains headers
    pub has_headers: bool,
    /// Whether to use type inference when reading
    pub infer_types: bool,
}

impl Default for CsvOptions {
    fn default() -> Self {
        CsvOptions {
            delimiter: b',',
            has_headers: false,
            infer_types: true,
        }
    }
}

impl CsvOptions {
    /// Set the delimiter
    #[must_use]
    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    /// Set whether the first row contains headers
    #[must_use]
    pub fn with_headers(mut self, has_headers: bool) -> Self {
        self.has_headers = has_headers;
        self
    }

    /// Set whether to infer types
    #[must_use]
    pub fn with_type_inference(mut self, infer_types: bool) -> Self {
        self.infer_types = infer_types;
        self
    }
}

impl Table {
    /// Load a table from a CSV file
    pub fn from_csv<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::from_csv_with_options(path, CsvOptions::default())
    }

    /// Load a table from a CSV file with custom options
    pub fn from_csv_with_options<P: AsRef<Path>>(path: P, options: CsvOptions) -> Result<Self> {
        let file = File::open(path.as_ref())?;
        let reader = BufReader::new(file);
        Self::from_csv_reader(reader, options)
    }

    /// Load a table from a CSV string
    pub fn from_csv_str(content: &str) -> Result<Self> {
        Self::from_csv_str_with_options(content, CsvOptions::default())
    }

    /// Load a table from a CSV string with custom options
    pub fn from_csv_str_with_options(content: &str, options: CsvOptions) -> Result<Self> {
        Self::from_csv_reader(content.as_bytes(), options)
    }

    /// Load a table from a reader
    pub fn from_csv_reader<R: Read>(reader: R, options: CsvOptions) -> Result<Self> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .delimiter(options.delimiter)
            .has_headers(false) // We handle headers ourselves
            .flexible(true)
            .from_reader(reader);

        let mut data: Vec<Vec<CellValue>> = Vec::new();

        for result in csv_reader.records() {
            let record = result?;
            let row: Vec<CellValue> = record
                .iter()
                .map(|field| {
                    if options.infer_types {
                        CellValue::parse(field)
                    } else {
                        CellValue::String(field.to_string())
                    }
                })
                .collect();
            data.push(row);
        }

        // Pad short rows so every row has the full width
        let width = data.iter().map(Vec::len).max().unwrap_or(0);
        for row in &mut data {
            row.resize(width, CellValue::Null);
        }

        let mut table = Table::with_name("Sheet1");
        *table.data_mut() = data;

        if options.has_headers && table.row_count() > 0 {
            table.name_columns_by_row(0)?;
        }

        Ok(table)
    }

    /// Save the table to a CSV file
    pub fn save_as_csv<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        self.save_as_csv_with_options(path, CsvOptions::default())
    }

    /// Save the table to a CSV file with custom options
    pub fn save_as_csv_with_options<P: AsRef<Path>>(
        &self,
        path: P,
        options: CsvOptions,
    ) -> Result<()> {
        let file = File::create(path)?;
        let writer = BufWriter::new(file);
        self.write_csv(writer, options)
    }

    /// Write the table to a writer as CSV
    pub fn write_csv<W: Write>(&self, writer: W, options: CsvOptions) -> Result<()> {
        let mut csv_writer = csv::WriterBuilder::new()
            .delimiter(options.delimiter)
            .from_writer(writer);

        for row in self.data() {
            let record: Vec<String> = row.iter().map(CellValue::as_str).collect();
            csv_writer.write_record(&record)?;
        }

        csv_writer.flush()?;
        Ok(())
    }

    /// Convert the table to a CSV string
    #[must_use]
    pub fn to_csv_string(&self) -> String {
        let mut buffer = Vec::new();
        // Ignore errors for string conversion
        let _ = self.write_csv(&mut buffer, CsvOptions::default());
        String::from_utf8_lossy(&buffer).to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_from_csv_str() {
        let csv = "Escola,GRE,IEG\nEscola A,GRE 1,7.5\nEscola B,GRE 2,6";
        let table = Table::from_csv_str(csv).unwrap();

        assert_eq!(table.row_count(), 3);
        assert_eq!(table.col_count(), 3);
        assert_eq!(table.get(1, 2).unwrap(), &CellValue::Float(7.5));
        assert_eq!(table.get(2, 2).unwrap(), &CellValue::Int(6));
    }

    #[test]
    fn test_from_csv_with_headers() {
        let csv = "Escola,IEG\nEscola A,7.5";
        let options = CsvOptions::default().with_headers(true);
        let table = Table::from_csv_str_with_options(csv, options).unwrap();

        assert!(table.column_names().is_some());
        let iegs = table.column_by_name("IEG").unwrap();
        assert_eq!(iegs, vec![CellValue::Float(7.5)]);
    }

    #[test]
    fn test_type_inference_off() {
        let csv = "a,b\n1,2";
        let options = CsvOptions::default().with_type_inference(false);
        let table = Table::from_csv_str_with_options(csv, options).unwrap();
        assert_eq!(table.get(1, 0).unwrap(), &CellValue::String("1".to_string()));
    }

    #[test]
    fn test_short_rows_padded() {
        let csv = "a,b,c\n1,2";
        let table = Table::from_csv_str(csv).unwrap();
        assert_eq!(table.col_count(), 3);
        assert_eq!(table.get(1, 2).unwrap(), &CellValue::Null);
    }

    #[test]
    fn test_save_and_load_csv_file() {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("test.csv");

        let table = Table::from_data(vec![vec![1, 2], vec![3, 4]]);
        table.save_as_csv(&file_path).unwrap();

        let loaded = Table::from_csv(&file_path).unwrap();
        assert_eq!(loaded.row_count(), 2);
        assert_eq!(loaded.col_count(), 2);
    }
}
