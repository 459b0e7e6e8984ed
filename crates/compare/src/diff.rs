use crate::merge::{Merged, Origin};
use escolar_table::CellValue;
use tracing::debug;

/// Marker used in presence entries for a school present in a snapshot.
pub const PRESENT: &str = "Presente";
/// Marker used in presence entries for a school missing from a snapshot.
pub const ABSENT: &str = "Ausente";
/// Column name reported for presence entries.
pub const STATUS_COLUMN: &str = "Status";

/// What kind of difference an entry describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiffKind {
    /// The school exists in only one snapshot
    Presence,
    /// A cell changed between snapshots
    Value,
}

/// One reported difference.
#[derive(Debug, Clone)]
pub struct DiffEntry {
    /// School name (the merge key)
    pub key: String,
    /// INEP code, current side preferred, `N/A` when unavailable
    pub id: String,
    /// Column that differs, or `Status` for presence entries
    pub column: String,
    pub previous: String,
    pub current: String,
    pub kind: DiffKind,
}

/// All differences found between two snapshots, in merged-row order.
#[derive(Debug, Clone, Default)]
pub struct DiffReport {
    entries: Vec<DiffEntry>,
}

impl DiffReport {
    #[must_use]
    pub fn entries(&self) -> &[DiffEntry] {
        &self.entries
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &DiffEntry> {
        self.entries.iter()
    }
}

/// Compare two snapshot values for the diff.
///
/// Numbers compare by value regardless of Int/Float representation: calamine
/// reads every Excel number as Float while CSV inference yields Int, and the
/// same `7` must not diff against `7.0`.
fn values_equal(previous: &CellValue, current: &CellValue) -> bool {
    if previous == current {
        return true;
    }
    match (previous, current) {
        (CellValue::Int(_) | CellValue::Float(_), CellValue::Int(_) | CellValue::Float(_)) => {
            previous.as_float() == current.as_float()
        }
        _ => false,
    }
}

/// Scan merged rows and collect presence and value differences.
///
/// For one-sided rows a single `Status` entry is produced. For rows present
/// in both snapshots every common column (keys excluded) is compared;
/// null==null is skipped, every other mismatch is reported.
pub fn diff(merged: &Merged, id_column: Option<&str>) -> DiffReport {
    let common = merged.common_columns();
    let mut entries = Vec::new();

    for row in merged.rows() {
        let key = row.key_display();

        match row.origin {
            Origin::PreviousOnly => {
                entries.push(DiffEntry {
                    key,
                    id: entry_id(row.previous.as_ref(), row.current.as_ref(), id_column),
                    column: STATUS_COLUMN.to_string(),
                    previous: PRESENT.to_string(),
                    current: ABSENT.to_string(),
                    kind: DiffKind::Presence,
                });
            }
            Origin::CurrentOnly => {
                entries.push(DiffEntry {
                    key,
                    id: entry_id(row.previous.as_ref(), row.current.as_ref(), id_column),
                    column: STATUS_COLUMN.to_string(),
                    previous: ABSENT.to_string(),
                    current: PRESENT.to_string(),
                    kind: DiffKind::Presence,
                });
            }
            Origin::Both => {
                let (Some(prev), Some(cur)) = (row.previous.as_ref(), row.current.as_ref())
                else {
                    continue;
                };
                for column in &common {
                    let prev_val = prev.get(column).unwrap_or(&CellValue::Null);
                    let cur_val = cur.get(column).unwrap_or(&CellValue::Null);

                    if prev_val.is_null() && cur_val.is_null() {
                        continue;
                    }
                    if !values_equal(prev_val, cur_val) {
                        entries.push(DiffEntry {
                            key: key.clone(),
                            id: entry_id(Some(prev), Some(cur), id_column),
                            column: column.clone(),
                            previous: prev_val.as_str(),
                            current: cur_val.as_str(),
                            kind: DiffKind::Value,
                        });
                    }
                }
            }
        }
    }

    debug!(count = entries.len(), "diff complete");
    DiffReport { entries }
}

/// Id for an entry: current side first, then previous, else `N/A`.
fn entry_id(
    previous: Option<&indexmap::IndexMap<String, CellValue>>,
    current: Option<&indexmap::IndexMap<String, CellValue>>,
    id_column: Option<&str>,
) -> String {
    let Some(id_column) = id_column else {
        return "N/A".to_string();
    };
    current
        .and_then(|m| m.get(id_column))
        .filter(|v| !v.is_null())
        .or_else(|| previous.and_then(|m| m.get(id_column)).filter(|v| !v.is_null()))
        .map(CellValue::as_str)
        .unwrap_or_else(|| "N/A".to_string())
}
