//! Tabular data model for escolar
//!
//! Provides a small row-major table with optional named columns plus CSV and
//! XLSX load/save, enough to carry school-performance exports through the
//! comparison pipeline.
//!
//! # Examples
//!
//! ```
//! use escolar_table::Table;
//!
//! let mut table = Table::from_data(vec![
//!     vec!["Escola", "IEG"],
//!     vec!["Escola A", "7.5"],
//!     vec!["Escola B", "6.1"],
//! ]);
//! table.name_columns_by_row(0).unwrap();
//!
//! assert_eq!(table.data_row_count(), 2);
//! let iegs = table.column_by_name("IEG").unwrap();
//! assert_eq!(iegs.len(), 2);
//! ```
//!
//! ## Loading from files
//!
//! ```no_run
//! use escolar_table::{Table, XlsxReadOptions};
//!
//! let table = Table::from_xlsx_with_options(
//!     "atuais.xlsx",
//!     XlsxReadOptions::default().with_headers(true),
//! ).unwrap();
//! ```

mod cell;
mod csv;
mod error;
mod table;
mod xlsx;

/// Re-export cell value type.
pub use cell::CellValue;
/// Re-export CSV options.
pub use csv::CsvOptions;
/// Re-export table error types.
pub use error::{Result, TableError};
/// Re-export table type.
pub use table::Table;
/// Re-export XLSX read options.
pub use xlsx::XlsxReadOptions;
