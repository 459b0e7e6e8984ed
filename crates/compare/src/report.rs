use crate::diff::DiffReport;
use crate::error::{CompareError, Result};
use escolar_table::Table;
use std::path::Path;
use tracing::info;

/// Column headers of the difference report (the relatorio_diferencas.xlsx
/// schema).
#[derive(Debug, Clone)]
pub struct ReportColumns {
    pub key: String,
    pub id: String,
}

impl Default for ReportColumns {
    fn default() -> Self {
        ReportColumns {
            key: "Escola".to_string(),
            id: "inep".to_string(),
        }
    }
}

/// Render a diff report as a table: one header row plus one row per entry.
#[must_use]
pub fn to_table(report: &DiffReport, columns: &ReportColumns) -> Table {
    let mut data = vec![vec![
        columns.key.clone(),
        columns.id.clone(),
        "Coluna".to_string(),
        "Valor Anterior".to_string(),
        "Valor Atual".to_string(),
    ]];

    for entry in report.iter() {
        data.push(vec![
            entry.key.clone(),
            entry.id.clone(),
            entry.column.clone(),
            entry.previous.clone(),
            entry.current.clone(),
        ]);
    }

    let mut table = Table::from_data(data);
    table.set_name("Diferencas");
    table
}

/// Write a diff report to disk, picking the format from the extension
/// (`.xlsx` or `.csv`).
///
/// An empty report writes nothing.
pub fn write<P: AsRef<Path>>(
    report: &DiffReport,
    columns: &ReportColumns,
    path: P,
) -> Result<()> {
    if report.is_empty() {
        info!("no differences found, skipping report file");
        return Ok(());
    }

    let path = path.as_ref();
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_lowercase)
        .unwrap_or_default();

    let table = to_table(report, columns);
    match ext.as_str() {
        "xlsx" => table.save_as_xlsx(path)?,
        "csv" => table.save_as_csv(path)?,
        other => return Err(CompareError::UnsupportedFormat(other.to_string())),
    }

    info!(
        count = report.len(),
        path = %path.display(),
        "difference report written"
    );
    Ok(())
}
