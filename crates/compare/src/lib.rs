//! Snapshot comparison engine for escolar
//!
//! Compares two exports of the school-performance spreadsheet: loads and
//! cleans each snapshot, outer-joins them on the school key, scans the merged
//! rows for presence and value differences, and writes the difference report.
//!
//! # Example
//!
//! ```
//! use escolar_compare::{compare_snapshots, Snapshot, SnapshotOptions};
//! use escolar_table::Table;
//!
//! let mut prev = Table::from_data(vec![
//!     vec!["Escola", "inep", "IEG"],
//!     vec!["Escola A", "1001", "7.5"],
//! ]);
//! prev.name_columns_by_row(0).unwrap();
//! let mut cur = Table::from_data(vec![
//!     vec!["Escola", "inep", "IEG"],
//!     vec!["Escola A", "1001", "7.9"],
//! ]);
//! cur.name_columns_by_row(0).unwrap();
//!
//! let options = SnapshotOptions::default();
//! let prev = Snapshot::from_table(prev, options.clone()).unwrap();
//! let cur = Snapshot::from_table(cur, options).unwrap();
//!
//! let report = compare_snapshots(&prev, &cur).unwrap();
//! assert_eq!(report.len(), 1);
//! assert_eq!(report.entries()[0].column, "IEG");
//! ```

mod diff;
mod error;
mod merge;
mod report;
mod snapshot;

pub use diff::{diff, DiffEntry, DiffKind, DiffReport, ABSENT, PRESENT, STATUS_COLUMN};
pub use error::{CompareError, Result};
pub use merge::{merge, JoinKind, Merged, MergeOptions, MergedRow, Origin};
pub use report::{to_table as report_to_table, write as write_report, ReportColumns};
pub use snapshot::{Snapshot, SnapshotOptions};

/// Outer-join two snapshots on their key column and collect all differences.
///
/// The snapshots must share the same key column.
pub fn compare_snapshots(previous: &Snapshot, current: &Snapshot) -> Result<DiffReport> {
    let options = MergeOptions::default().with_keys(&[previous.key_column()]);
    let merged = merge(previous.table(), current.table(), &options)?;

    // id from the current snapshot, falling back to the previous one
    let id_column = current.id_column().or_else(|| previous.id_column());
    Ok(diff(&merged, id_column))
}
