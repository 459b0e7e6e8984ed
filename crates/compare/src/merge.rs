use crate::error::{CompareError, Result};
use escolar_table::{CellValue, Table};
use indexmap::IndexMap;
use std::collections::{HashMap, HashSet};

/// Where a merged row came from (the pandas `_merge` indicator).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Origin {
    Both,
    PreviousOnly,
    CurrentOnly,
}

/// Join behavior for [`merge`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinKind {
    /// Keep unmatched rows from both sides
    Outer,
    /// Keep only rows whose key exists on both sides
    Inner,
}

/// Options for merging two snapshots.
#[derive(Debug, Clone)]
pub struct MergeOptions {
    /// Key columns joined on; one for the report, three for the dashboard
    pub key_columns: Vec<String>,
    /// Suffix for previous-side columns that collide (default `_ant`)
    pub previous_suffix: String,
    /// Suffix for current-side columns that collide (default `_atu`)
    pub current_suffix: String,
    pub join: JoinKind,
}

impl Default for MergeOptions {
    fn default() -> Self {
        MergeOptions {
            key_columns: vec!["Escola".to_string()],
            previous_suffix: "_ant".to_string(),
            current_suffix: "_atu".to_string(),
            join: JoinKind::Outer,
        }
    }
}

impl MergeOptions {
    /// Set the key columns
    #[must_use]
    pub fn with_keys(mut self, keys: &[&str]) -> Self {
        self.key_columns = keys.iter().map(|k| (*k).to_string()).collect();
        self
    }

    /// Set the join kind
    #[must_use]
    pub fn with_join(mut self, join: JoinKind) -> Self {
        self.join = join;
        self
    }
}

/// A single merged row: the key plus the cells from each side, when present.
#[derive(Debug, Clone)]
pub struct MergedRow {
    /// One value per key column
    pub key: Vec<String>,
    pub origin: Origin,
    pub previous: Option<IndexMap<String, CellValue>>,
    pub current: Option<IndexMap<String, CellValue>>,
}

impl MergedRow {
    /// The composite key rendered for display (single-key merges render as
    /// the plain key).
    #[must_use]
    pub fn key_display(&self) -> String {
        self.key.join(" / ")
    }
}

/// Result of merging two snapshots.
#[derive(Debug, Clone)]
pub struct Merged {
    rows: Vec<MergedRow>,
    key_columns: Vec<String>,
    previous_columns: Vec<String>,
    current_columns: Vec<String>,
    previous_suffix: String,
    current_suffix: String,
}

impl Merged {
    /// Merged rows: previous-side order first, then unmatched current-side rows
    #[must_use]
    pub fn rows(&self) -> &[MergedRow] {
        &self.rows
    }

    /// The key columns the merge was performed on
    #[must_use]
    pub fn key_columns(&self) -> &[String] {
        &self.key_columns
    }

    /// Columns present in both inputs, excluding keys, in previous-side order
    #[must_use]
    pub fn common_columns(&self) -> Vec<String> {
        let current: HashSet<&String> = self.current_columns.iter().collect();
        self.previous_columns
            .iter()
            .filter(|name| current.contains(name) && !self.key_columns.contains(name))
            .cloned()
            .collect()
    }

    /// Flatten into a wide table: key columns first, then previous-side
    /// columns, then current-side columns. Colliding names get the
    /// configured suffixes, one-sided names stay as-is (pandas suffix rule).
    ///
    /// Errors when suffixing still produces a duplicate header, e.g. an
    /// input that already carries a literal `IEG_ant` column next to `IEG`.
    pub fn to_table(&self) -> Result<Table> {
        let common: HashSet<String> = self.common_columns().into_iter().collect();

        let prev_cols: Vec<(String, String)> = self
            .previous_columns
            .iter()
            .filter(|name| !self.key_columns.contains(name))
            .map(|name| {
                let out = if common.contains(name) {
                    format!("{name}{}", self.previous_suffix)
                } else {
                    name.clone()
                };
                (name.clone(), out)
            })
            .collect();
        let cur_cols: Vec<(String, String)> = self
            .current_columns
            .iter()
            .filter(|name| !self.key_columns.contains(name))
            .map(|name| {
                let out = if common.contains(name) {
                    format!("{name}{}", self.current_suffix)
                } else {
                    name.clone()
                };
                (name.clone(), out)
            })
            .collect();

        let mut header: Vec<CellValue> = self
            .key_columns
            .iter()
            .map(|n| CellValue::String(n.clone()))
            .collect();
        header.extend(prev_cols.iter().map(|(_, out)| CellValue::String(out.clone())));
        header.extend(cur_cols.iter().map(|(_, out)| CellValue::String(out.clone())));

        let mut data = vec![header];
        for row in &self.rows {
            let mut cells: Vec<CellValue> = row
                .key
                .iter()
                .map(|k| CellValue::String(k.clone()))
                .collect();
            for (name, _) in &prev_cols {
                cells.push(
                    row.previous
                        .as_ref()
                        .and_then(|m| m.get(name).cloned())
                        .unwrap_or(CellValue::Null),
                );
            }
            for (name, _) in &cur_cols {
                cells.push(
                    row.current
                        .as_ref()
                        .and_then(|m| m.get(name).cloned())
                        .unwrap_or(CellValue::Null),
                );
            }
            data.push(cells);
        }

        let mut table = Table::with_name("merged");
        *table.data_mut() = data;
        table.name_columns_by_row(0)?;
        Ok(table)
    }
}

/// Merge two tables with named columns on the configured key columns.
///
/// Keys are compared as rendered strings, blank keys included; snapshot
/// cleaning drops blank-key rows before they reach the merge. Duplicate keys
/// multiply matches pairwise, as in a SQL join.
pub fn merge(previous: &Table, current: &Table, options: &MergeOptions) -> Result<Merged> {
    let prev_names = named_columns(previous)?;
    let cur_names = named_columns(current)?;

    let prev_key_idx = key_indices(previous, &options.key_columns)?;
    let cur_key_idx = key_indices(current, &options.key_columns)?;

    // Current-side key -> row indices
    let mut current_map: HashMap<String, Vec<usize>> = HashMap::new();
    let current_rows: Vec<&Vec<CellValue>> = current.data_rows().collect();
    for (i, row) in current_rows.iter().enumerate() {
        current_map
            .entry(composite_key(row, &cur_key_idx))
            .or_default()
            .push(i);
    }

    let mut rows = Vec::new();
    let mut matched_current: HashSet<usize> = HashSet::new();

    for prev_row in previous.data_rows() {
        let key = composite_key(prev_row, &prev_key_idx);
        let key_values = key_values(prev_row, &prev_key_idx);

        if let Some(indices) = current_map.get(&key) {
            for &idx in indices {
                matched_current.insert(idx);
                rows.push(MergedRow {
                    key: key_values.clone(),
                    origin: Origin::Both,
                    previous: Some(row_map(prev_row, &prev_names)),
                    current: Some(row_map(current_rows[idx], &cur_names)),
                });
            }
        } else if options.join == JoinKind::Outer {
            rows.push(MergedRow {
                key: key_values,
                origin: Origin::PreviousOnly,
                previous: Some(row_map(prev_row, &prev_names)),
                current: None,
            });
        }
    }

    if options.join == JoinKind::Outer {
        for (i, row) in current_rows.iter().enumerate() {
            if !matched_current.contains(&i) {
                rows.push(MergedRow {
                    key: key_values(row, &cur_key_idx),
                    origin: Origin::CurrentOnly,
                    previous: None,
                    current: Some(row_map(row, &cur_names)),
                });
            }
        }
    }

    Ok(Merged {
        rows,
        key_columns: options.key_columns.clone(),
        previous_columns: prev_names,
        current_columns: cur_names,
        previous_suffix: options.previous_suffix.clone(),
        current_suffix: options.current_suffix.clone(),
    })
}

fn named_columns(table: &Table) -> Result<Vec<String>> {
    table
        .column_names()
        .cloned()
        .ok_or(CompareError::ColumnsNotNamed)
}

fn key_indices(table: &Table, keys: &[String]) -> Result<Vec<usize>> {
    keys.iter()
        .map(|name| {
            table
                .column_index_by_name(name)
                .map_err(|_| CompareError::KeyColumnNotFound { name: name.clone() })
        })
        .collect()
}

fn key_values(row: &[CellValue], indices: &[usize]) -> Vec<String> {
    indices
        .iter()
        .map(|&i| row.get(i).map(CellValue::as_str).unwrap_or_default())
        .collect()
}

fn composite_key(row: &[CellValue], indices: &[usize]) -> String {
    let mut key = String::new();
    for &i in indices {
        key.push_str(&row.get(i).map(CellValue::as_str).unwrap_or_default());
        key.push('\x1f');
    }
    key
}

fn row_map(row: &[CellValue], names: &[String]) -> IndexMap<String, CellValue> {
    names
        .iter()
        .enumerate()
        .map(|(i, name)| {
            (
                name.clone(),
                row.get(i).cloned().unwrap_or(CellValue::Null),
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(rows: Vec<Vec<&str>>) -> Table {
        let mut table = Table::from_data(rows);
        table.name_columns_by_row(0).unwrap();
        table
    }

    #[test]
    fn test_outer_merge_origins() {
        let prev = table(vec![
            vec!["Escola", "IEG"],
            vec!["A", "7.5"],
            vec!["B", "6.1"],
        ]);
        let cur = table(vec![
            vec!["Escola", "IEG"],
            vec!["A", "7.9"],
            vec!["C", "5.0"],
        ]);

        let merged = merge(&prev, &cur, &MergeOptions::default()).unwrap();
        let origins: Vec<Origin> = merged.rows().iter().map(|r| r.origin).collect();
        assert_eq!(
            origins,
            vec![Origin::Both, Origin::PreviousOnly, Origin::CurrentOnly]
        );
        assert_eq!(merged.rows()[2].key, vec!["C"]);
    }

    #[test]
    fn test_inner_merge_drops_one_sided() {
        let prev = table(vec![vec!["Escola"], vec!["A"], vec!["B"]]);
        let cur = table(vec![vec!["Escola"], vec!["B"], vec!["C"]]);

        let options = MergeOptions::default().with_join(JoinKind::Inner);
        let merged = merge(&prev, &cur, &options).unwrap();
        assert_eq!(merged.rows().len(), 1);
        assert_eq!(merged.rows()[0].key, vec!["B"]);
    }

    #[test]
    fn test_duplicate_keys_multiply() {
        let prev = table(vec![vec!["Escola", "x"], vec!["A", "1"], vec!["A", "2"]]);
        let cur = table(vec![vec!["Escola", "x"], vec!["A", "3"]]);

        let merged = merge(&prev, &cur, &MergeOptions::default()).unwrap();
        assert_eq!(merged.rows().len(), 2);
        assert!(merged.rows().iter().all(|r| r.origin == Origin::Both));
    }

    #[test]
    fn test_common_columns_exclude_keys() {
        let prev = table(vec![vec!["Escola", "inep", "IEG", "SoAnt"], vec!["A", "1", "5", "x"]]);
        let cur = table(vec![vec!["Escola", "inep", "IEG", "SoAtu"], vec!["A", "1", "6", "y"]]);

        let merged = merge(&prev, &cur, &MergeOptions::default()).unwrap();
        assert_eq!(merged.common_columns(), vec!["inep", "IEG"]);
    }

    #[test]
    fn test_composite_key_merge() {
        let prev = table(vec![
            vec!["Escola", "GRE", "Municipio", "IEG"],
            vec!["A", "G1", "M1", "5"],
            vec!["A", "G2", "M2", "6"],
        ]);
        let cur = table(vec![
            vec!["Escola", "GRE", "Municipio", "IEG"],
            vec!["A", "G1", "M1", "7"],
        ]);

        let options = MergeOptions::default()
            .with_keys(&["Escola", "GRE", "Municipio"])
            .with_join(JoinKind::Inner);
        let merged = merge(&prev, &cur, &options).unwrap();
        assert_eq!(merged.rows().len(), 1);
        assert_eq!(merged.rows()[0].key, vec!["A", "G1", "M1"]);
    }

    #[test]
    fn test_to_table_suffixes_collisions() {
        let prev = table(vec![vec!["Escola", "IEG", "SoAnt"], vec!["A", "5", "x"]]);
        let cur = table(vec![vec!["Escola", "IEG"], vec!["A", "6"]]);

        let merged = merge(&prev, &cur, &MergeOptions::default()).unwrap();
        let wide = merged.to_table().unwrap();
        let names = wide.column_names().unwrap();
        assert_eq!(
            names,
            &vec![
                "Escola".to_string(),
                "IEG_ant".to_string(),
                "SoAnt".to_string(),
                "IEG_atu".to_string(),
            ]
        );
        assert_eq!(wide.get_by_name(1, "IEG_atu").unwrap().as_str(), "6");
        assert_eq!(wide.get_by_name(1, "SoAnt").unwrap().as_str(), "x");
    }

    #[test]
    fn test_to_table_rejects_preexisting_suffixed_name() {
        // suffixing IEG collides with the literal IEG_ant column
        let prev = table(vec![vec!["Escola", "IEG", "IEG_ant"], vec!["A", "5", "4"]]);
        let cur = table(vec![vec!["Escola", "IEG"], vec!["A", "6"]]);

        let merged = merge(&prev, &cur, &MergeOptions::default()).unwrap();
        assert!(matches!(
            merged.to_table(),
            Err(CompareError::Table(
                escolar_table::TableError::DuplicateColumnName { .. }
            ))
        ));
    }

    #[test]
    fn test_blank_keys_join_like_values() {
        let prev = table(vec![vec!["Escola", "v"], vec!["", "1"]]);
        let cur = table(vec![vec!["Escola", "v"], vec!["", "2"]]);

        let merged = merge(&prev, &cur, &MergeOptions::default()).unwrap();
        assert_eq!(merged.rows().len(), 1);
        assert_eq!(merged.rows()[0].origin, Origin::Both);
    }
}
