//! # escolar-cli
//!
//! Command-line interface for comparing school-performance spreadsheet
//! exports and browsing the merged data.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use escolar_compare::{
    compare_snapshots, write_report, ReportColumns, Snapshot, SnapshotOptions,
};
use escolar_dashboard::{render_page, Dashboard, DashboardOptions, Filter};
use escolar_table::{CsvOptions, Table, XlsxReadOptions};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

/// escolar - compare school-performance spreadsheet exports
#[derive(Parser)]
#[command(name = "escolar")]
#[command(author, version, about = "Compare school-performance spreadsheet exports", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Compare two exports and write a difference report
    Compare {
        /// Previous export (.xlsx or .csv)
        previous: PathBuf,
        /// Current export (.xlsx or .csv)
        current: PathBuf,
        /// Report file (.xlsx or .csv)
        #[arg(short, long, default_value = "relatorio_diferencas.xlsx")]
        output: PathBuf,
        /// Key column
        #[arg(long, default_value = "Escola")]
        key: String,
        /// Id column carried into the report
        #[arg(long, default_value = "inep")]
        id: String,
    },
    /// Print the first rows and the column list of an export
    Inspect {
        /// Export file (.xlsx or .csv)
        file: PathBuf,
        /// Number of rows to print
        #[arg(short = 'n', long, default_value_t = 5)]
        rows: usize,
    },
    /// Render the comparison dashboard for the merged exports
    Dashboard {
        /// Previous export (.xlsx or .csv)
        previous: PathBuf,
        /// Current export (.xlsx or .csv)
        current: PathBuf,
        /// HTML output file
        #[arg(short, long, default_value = "dashboard.html")]
        output: PathBuf,
        /// Indicator column to compare
        #[arg(long, default_value = "IEG")]
        indicator: String,
        /// Restrict to these GREs (repeatable)
        #[arg(long = "gre")]
        gres: Vec<String>,
        /// Restrict to these municipios (repeatable)
        #[arg(long = "municipio")]
        municipios: Vec<String>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    if cli.verbose {
        tracing_subscriber::fmt()
            .with_env_filter(
                EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug")),
            )
            .init();
    }

    match cli.command {
        Commands::Compare {
            previous,
            current,
            output,
            key,
            id,
        } => run_compare(&previous, &current, &output, &key, &id),
        Commands::Inspect { file, rows } => run_inspect(&file, rows),
        Commands::Dashboard {
            previous,
            current,
            output,
            indicator,
            gres,
            municipios,
        } => run_dashboard(&previous, &current, &output, &indicator, gres, municipios),
    }
}

fn load_snapshot(path: &Path, options: SnapshotOptions) -> Result<Snapshot> {
    let snapshot = Snapshot::load(path, options)
        .with_context(|| format!("Failed to load {}", path.display()))?;

    for key in snapshot.duplicate_keys() {
        eprintln!(
            "{} duplicate '{}' in {}: {}",
            "WARNING:".yellow().bold(),
            snapshot.key_column(),
            path.display(),
            key
        );
    }
    Ok(snapshot)
}

fn run_compare(
    previous: &Path,
    current: &Path,
    output: &Path,
    key: &str,
    id: &str,
) -> Result<()> {
    let options = SnapshotOptions::default()
        .with_key_column(key)
        .with_id_column(Some(id));

    println!(
        "Loading files: {} and {}...",
        previous.display(),
        current.display()
    );
    let prev = load_snapshot(previous, options.clone())?;
    let cur = load_snapshot(current, options)?;

    let report = compare_snapshots(&prev, &cur)?;

    if report.is_empty() {
        println!("{}", "No differences found.".green());
        return Ok(());
    }

    println!(
        "Found {} differences.",
        report.len().to_string().red().bold()
    );

    let columns = ReportColumns {
        key: key.to_string(),
        id: id.to_string(),
    };
    write_report(&report, &columns, output)
        .with_context(|| format!("Failed to write report to {}", output.display()))?;
    println!("Report saved to {}", output.display());

    Ok(())
}

fn run_inspect(file: &Path, rows: usize) -> Result<()> {
    let table = load_table(file)?;

    println!("--- {} ---", file.display());
    match table.column_names() {
        Some(names) => println!("Columns: {}", names.join(", ")),
        None => println!("Columns: (none)"),
    }
    println!("Rows: {}", table.data_row_count());

    for row in table.head(rows) {
        let cells: Vec<String> = row.iter().map(|c| c.as_str()).collect();
        println!("{}", cells.join(" | "));
    }

    Ok(())
}

fn run_dashboard(
    previous: &Path,
    current: &Path,
    output: &Path,
    indicator: &str,
    gres: Vec<String>,
    municipios: Vec<String>,
) -> Result<()> {
    let prev = load_table(previous)?;
    let cur = load_table(current)?;

    let dashboard = Dashboard::build(&prev, &cur, DashboardOptions::default())
        .context("Failed to merge the exports")?;

    let mut filter = Filter::default();
    if !gres.is_empty() {
        filter = filter.with_gres(gres);
    }
    if !municipios.is_empty() {
        filter = filter.with_municipios(municipios);
    }

    let summary = dashboard
        .summary(indicator, &filter)
        .with_context(|| format!("No usable data for indicator '{indicator}'"))?;
    let deltas = dashboard.school_deltas(indicator, &filter)?;
    let chart = dashboard.comparison_chart(indicator, &filter)?;

    println!("{}", "Comparativo de Dados Escolares".cyan().bold());
    println!(
        "Media {indicator} Anterior: {:.2}",
        summary.previous_mean
    );
    println!(
        "Media {indicator} Atual:    {:.2} ({:+.2})",
        summary.current_mean, summary.delta
    );
    println!("Total de Escolas: {}", summary.school_count);

    println!();
    for delta in deltas.iter().take(10) {
        println!(
            "{:>8.2} -> {:>6.2}  {:+.2}  {}",
            delta.previous, delta.current, delta.delta, delta.school
        );
    }

    let html = render_page(indicator, &summary, &deltas, &chart);
    std::fs::write(output, html)
        .with_context(|| format!("Failed to write {}", output.display()))?;
    println!("\nDashboard saved to {}", output.display());

    Ok(())
}

fn load_table(path: &Path) -> Result<Table> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_lowercase)
        .unwrap_or_default();

    let table = match ext.as_str() {
        "xlsx" => Table::from_xlsx_with_options(
            path,
            XlsxReadOptions::default().with_headers(true),
        ),
        "csv" => {
            Table::from_csv_with_options(path, CsvOptions::default().with_headers(true))
        }
        other => anyhow::bail!("Unsupported file format: {other} (expected .xlsx or .csv)"),
    };

    table.with_context(|| format!("Failed to read file: {}", path.display()))
}
