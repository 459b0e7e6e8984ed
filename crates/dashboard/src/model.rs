use crate::chart::{ChartData, ChartKind, ChartSpec, Dataset};
use crate::error::{DashboardError, Result};
use escolar_compare::{merge, JoinKind, MergeOptions};
use escolar_table::{CellValue, Table};

/// Options controlling how the dashboard joins and labels the data.
#[derive(Debug, Clone)]
pub struct DashboardOptions {
    pub school_column: String,
    pub gre_column: String,
    pub municipio_column: String,
    pub previous_suffix: String,
    pub current_suffix: String,
}

impl Default for DashboardOptions {
    fn default() -> Self {
        DashboardOptions {
            school_column: "Escola".to_string(),
            gre_column: "GRE".to_string(),
            municipio_column: "Municipio".to_string(),
            previous_suffix: "_ant".to_string(),
            current_suffix: "_atu".to_string(),
        }
    }
}

/// Row filter: `None` keeps everything (the multiselect select-all default).
#[derive(Debug, Clone, Default)]
pub struct Filter {
    pub gres: Option<Vec<String>>,
    pub municipios: Option<Vec<String>>,
}

impl Filter {
    /// Restrict to the given GREs
    #[must_use]
    pub fn with_gres(mut self, gres: Vec<String>) -> Self {
        self.gres = Some(gres);
        self
    }

    /// Restrict to the given municipios
    #[must_use]
    pub fn with_municipios(mut self, municipios: Vec<String>) -> Self {
        self.municipios = Some(municipios);
        self
    }
}

/// Headline metrics for one indicator over the filtered rows.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricSummary {
    pub previous_mean: f64,
    pub current_mean: f64,
    pub delta: f64,
    pub school_count: usize,
}

/// Previous/current/delta for one school.
#[derive(Debug, Clone, PartialEq)]
pub struct SchoolDelta {
    pub school: String,
    pub previous: f64,
    pub current: f64,
    pub delta: f64,
}

/// An `I<n>` indicator column and the columns that feed it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndicatorGroup {
    pub name: String,
    pub related: Vec<String>,
}

/// Browsing model over the inner-joined snapshots.
///
/// Schools present in only one snapshot never reach the dashboard; the
/// difference report is the place to look for those.
#[derive(Debug, Clone)]
pub struct Dashboard {
    wide: Table,
    current_columns: Vec<String>,
    options: DashboardOptions,
    school_idx: usize,
    gre_idx: usize,
    municipio_idx: usize,
}

impl Dashboard {
    /// Inner-join two snapshot tables on school/GRE/municipio.
    ///
    /// School keys get the same cleaning snapshots get before the compare:
    /// blank-school rows are dropped and school names trimmed, so both
    /// pipelines agree on which schools match.
    pub fn build(
        previous: &Table,
        current: &Table,
        options: DashboardOptions,
    ) -> Result<Self> {
        let merge_options = MergeOptions {
            key_columns: vec![
                options.school_column.clone(),
                options.gre_column.clone(),
                options.municipio_column.clone(),
            ],
            previous_suffix: options.previous_suffix.clone(),
            current_suffix: options.current_suffix.clone(),
            join: JoinKind::Inner,
        };
        let previous = clean_school_keys(previous, &options.school_column)?;
        let current = clean_school_keys(current, &options.school_column)?;
        let merged = merge(&previous, &current, &merge_options)?;
        let wide = merged.to_table()?;

        let current_columns = current.column_names().cloned().unwrap_or_default();
        let school_idx = wide.column_index_by_name(&options.school_column)?;
        let gre_idx = wide.column_index_by_name(&options.gre_column)?;
        let municipio_idx = wide.column_index_by_name(&options.municipio_column)?;

        Ok(Dashboard {
            wide,
            current_columns,
            options,
            school_idx,
            gre_idx,
            municipio_idx,
        })
    }

    /// The wide merged table (suffixed previous/current columns)
    #[must_use]
    pub fn merged(&self) -> &Table {
        &self.wide
    }

    /// Number of merged schools before filtering
    #[must_use]
    pub fn school_count(&self) -> usize {
        self.wide.data_row_count()
    }

    /// Sorted unique GREs
    #[must_use]
    pub fn gres(&self) -> Vec<String> {
        let mut values: Vec<String> = self
            .wide
            .data_rows()
            .map(|row| cell_str(row, self.gre_idx))
            .collect();
        values.sort();
        values.dedup();
        values
    }

    /// Sorted unique municipios among rows passing the GRE filter
    /// (the cascading sidebar behavior)
    #[must_use]
    pub fn municipios(&self, filter: &Filter) -> Vec<String> {
        let gre_only = Filter {
            gres: filter.gres.clone(),
            municipios: None,
        };
        let mut values: Vec<String> = self
            .filtered_rows(&gre_only)
            .into_iter()
            .map(|row| cell_str(row, self.municipio_idx))
            .collect();
        values.sort();
        values.dedup();
        values
    }

    /// Headline metrics for an indicator over the filtered rows.
    ///
    /// Nulls are excluded from the means. Errors when the indicator columns
    /// are missing or when no row has a value on either side.
    pub fn summary(&self, indicator: &str, filter: &Filter) -> Result<MetricSummary> {
        let (prev_idx, cur_idx) = self.indicator_indices(indicator)?;
        let rows = self.filtered_rows(filter);

        let prev_values = numeric_column(&rows, prev_idx);
        let cur_values = numeric_column(&rows, cur_idx);
        if prev_values.is_empty() || cur_values.is_empty() {
            return Err(DashboardError::NoData);
        }

        let previous_mean = mean(&prev_values);
        let current_mean = mean(&cur_values);
        Ok(MetricSummary {
            previous_mean,
            current_mean,
            delta: current_mean - previous_mean,
            school_count: rows.len(),
        })
    }

    /// Per-school previous/current/delta, sorted by delta descending.
    ///
    /// Rows missing the indicator on either side are skipped.
    pub fn school_deltas(&self, indicator: &str, filter: &Filter) -> Result<Vec<SchoolDelta>> {
        let mut deltas = self.school_series(indicator, filter)?;
        deltas.sort_by(|a, b| {
            b.delta
                .partial_cmp(&a.delta)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        Ok(deltas)
    }

    /// Grouped bar chart comparing the indicator per school across snapshots
    /// (the melt + grouped-bar view).
    pub fn comparison_chart(&self, indicator: &str, filter: &Filter) -> Result<ChartSpec> {
        let series = self.school_series(indicator, filter)?;

        let mut spec = ChartSpec::new(
            ChartKind::Bar,
            format!("{indicator} por Escola (Anterior vs Atual)"),
        );
        spec.data = ChartData {
            labels: series.iter().map(|d| d.school.clone()).collect(),
            datasets: vec![
                Dataset {
                    label: "Anterior".to_string(),
                    data: series.iter().map(|d| d.previous).collect(),
                },
                Dataset {
                    label: "Atual".to_string(),
                    data: series.iter().map(|d| d.current).collect(),
                },
            ],
        };
        spec.options.y_axis_label = Some(indicator.to_string());
        spec.options.show_legend = true;
        Ok(spec)
    }

    /// Indicator columns (`I1`, `I2`, ...) of the current snapshot with
    /// their supporting columns: the two columns immediately before `I1`
    /// and `I2`, one before every other index (the export column layout).
    /// An indicator without enough preceding columns gets none.
    #[must_use]
    pub fn indicator_groups(&self) -> Vec<IndicatorGroup> {
        let mut indices: Vec<(u32, usize, String)> = self
            .current_columns
            .iter()
            .enumerate()
            .filter_map(|(pos, name)| {
                indicator_number(name).map(|n| (n, pos, name.clone()))
            })
            .collect();
        indices.sort_by_key(|(n, _, _)| *n);

        indices
            .into_iter()
            .map(|(n, pos, name)| {
                let take = if n <= 2 { 2 } else { 1 };
                let related = if pos >= take {
                    self.current_columns[pos - take..pos].to_vec()
                } else {
                    Vec::new()
                };
                IndicatorGroup { name, related }
            })
            .collect()
    }

    /// Filtered wide table for display
    pub fn detail_table(&self, filter: &Filter) -> Result<Table> {
        let mut data = Vec::with_capacity(self.wide.row_count());
        if let Some(header) = self.wide.data().first() {
            data.push(header.clone());
        }
        for row in self.filtered_rows(filter) {
            data.push(row.clone());
        }

        let mut table = Table::with_name("detalhado");
        *table.data_mut() = data;
        if !table.is_empty() {
            table.name_columns_by_row(0)?;
        }
        Ok(table)
    }

    fn school_series(&self, indicator: &str, filter: &Filter) -> Result<Vec<SchoolDelta>> {
        let (prev_idx, cur_idx) = self.indicator_indices(indicator)?;

        Ok(self
            .filtered_rows(filter)
            .into_iter()
            .filter_map(|row| {
                let previous = row.get(prev_idx).and_then(CellValue::as_float)?;
                let current = row.get(cur_idx).and_then(CellValue::as_float)?;
                Some(SchoolDelta {
                    school: cell_str(row, self.school_idx),
                    previous,
                    current,
                    delta: current - previous,
                })
            })
            .collect())
    }

    fn indicator_indices(&self, indicator: &str) -> Result<(usize, usize)> {
        let prev_name = format!("{indicator}{}", self.options.previous_suffix);
        let cur_name = format!("{indicator}{}", self.options.current_suffix);
        let prev_idx = self.wide.column_index_by_name(&prev_name);
        let cur_idx = self.wide.column_index_by_name(&cur_name);
        match (prev_idx, cur_idx) {
            (Ok(p), Ok(c)) => Ok((p, c)),
            _ => Err(DashboardError::IndicatorNotFound {
                name: indicator.to_string(),
            }),
        }
    }

    fn filtered_rows(&self, filter: &Filter) -> Vec<&Vec<CellValue>> {
        self.wide
            .data_rows()
            .filter(|row| {
                let gre_ok = filter
                    .gres
                    .as_ref()
                    .map_or(true, |allowed| allowed.contains(&cell_str(row, self.gre_idx)));
                let mun_ok = filter.municipios.as_ref().map_or(true, |allowed| {
                    allowed.contains(&cell_str(row, self.municipio_idx))
                });
                gre_ok && mun_ok
            })
            .collect()
    }
}

/// Drop rows with a blank school and trim school names (the cleaning
/// snapshots get on load).
fn clean_school_keys(table: &Table, school_column: &str) -> Result<Table> {
    let mut table = table.clone();
    let key_index = table.column_index_by_name(school_column)?;
    table.filter_rows(|row| !row.get(key_index).map_or(true, CellValue::is_blank));
    table.column_map_by_name(school_column, |cell| {
        CellValue::String(cell.as_str().trim().to_string())
    })?;
    Ok(table)
}

/// `I7` -> `Some(7)`; anything that is not `I` plus digits -> `None`
fn indicator_number(name: &str) -> Option<u32> {
    let digits = name.strip_prefix('I')?;
    if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

fn cell_str(row: &[CellValue], index: usize) -> String {
    row.get(index).map(CellValue::as_str).unwrap_or_default()
}

fn numeric_column(rows: &[&Vec<CellValue>], index: usize) -> Vec<f64> {
    rows.iter()
        .filter_map(|row| row.get(index).and_then(CellValue::as_float))
        .collect()
}

fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}
