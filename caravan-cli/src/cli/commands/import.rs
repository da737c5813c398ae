//! Import command handlers

use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use anyhow::Result;
use clap::{Subcommand, ValueEnum};
use colored::*;
use is_terminal::IsTerminal;

use crate::config::{self, AppConfig};
use crate::files::{DefaultSourceProbe, DryRunTransfer, FileTransfer, LocalFileTransfer};
use crate::migrate::source::{self, ImportManifest};
use crate::migrate::types::{ImportReport, RowOutcome};
use crate::migrate::{
    CollectingSink, FileImportTransform, FileRecordStore, ImportRunner, MemoryFileStore,
    SqliteFileStore,
};

#[derive(Debug, Subcommand)]
pub enum ImportCommands {
    /// Run the file import described by a manifest
    Run {
        /// Manifest file (TOML)
        manifest: std::path::PathBuf,

        /// Resolve paths and policies without moving bytes or touching the
        /// database
        #[arg(long)]
        dry_run: bool,

        /// Report output format
        #[arg(long, value_enum, default_value_t = ReportFormat::Text)]
        format: ReportFormat,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ReportFormat {
    Text,
    Json,
}

/// Handle the import command group
pub async fn handle_import_command(command: ImportCommands, config: &AppConfig) -> Result<()> {
    match command {
        ImportCommands::Run {
            manifest,
            dry_run,
            format,
        } => run_import(&manifest, dry_run, format, config).await,
    }
}

async fn run_import(
    manifest_path: &Path,
    dry_run: bool,
    format: ReportFormat,
    config: &AppConfig,
) -> Result<()> {
    if !std::io::stdout().is_terminal() {
        colored::control::set_override(false);
    }

    let manifest = ImportManifest::load(manifest_path)?;
    let rows_path = manifest.rows_path(manifest_path);
    let mut rows = source::load_rows(&rows_path)?;
    log::debug!("Loaded {} rows from {}", rows.len(), rows_path.display());

    let schemes = Arc::new(config.scheme_registry());
    let http = reqwest::Client::new();
    let probe = Arc::new(DefaultSourceProbe::with_client(schemes.clone(), http.clone()));
    let sink = Arc::new(CollectingSink::new());

    let (transfer, store): (Arc<dyn FileTransfer>, Arc<dyn FileRecordStore>) = if dry_run {
        (Arc::new(DryRunTransfer), Arc::new(MemoryFileStore::new()))
    } else {
        let pool = config::connect_database(&config.database_path()).await?;
        (
            Arc::new(LocalFileTransfer::with_client(schemes.clone(), http)),
            Arc::new(SqliteFileStore::new(pool)),
        )
    };

    let field = manifest.field.clone();
    let transform =
        FileImportTransform::new(manifest.import, transfer, store, probe, schemes, sink.clone());
    let runner = ImportRunner::new(&field, transform, sink);

    let start = Instant::now();
    let report = runner.run(&mut rows).await;
    let duration = start.elapsed();

    match format {
        ReportFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
        ReportFormat::Text => print_report(&report, dry_run, duration.as_secs_f64() * 1000.0),
    }

    if report.has_failures() {
        anyhow::bail!("{} of {} rows failed", report.failed_count(), report.total());
    }

    Ok(())
}

fn print_report(report: &ImportReport, dry_run: bool, millis: f64) {
    for (index, outcome) in report.outcomes.iter().enumerate() {
        let rendered = match outcome {
            RowOutcome::Imported { value } => format!("{}  {}", "imported".green(), value),
            RowOutcome::Skipped => "skipped".yellow().to_string(),
            RowOutcome::Failed { message } => format!("{}  {}", "failed".red(), message),
        };
        println!("  row {:>4}  {}", index + 1, rendered);
    }

    if !report.messages.is_empty() {
        println!();
        for message in &report.messages {
            println!("  {}  {}", "note".yellow(), message);
        }
    }

    println!();
    let summary = format!(
        "{} rows: {} imported, {} skipped, {} failed in {:.2}ms",
        report.total(),
        report.imported_count(),
        report.skipped_count(),
        report.failed_count(),
        millis
    );
    if dry_run {
        println!("{} {}", summary, "(dry run)".dimmed());
    } else {
        println!("{}", summary);
    }
}
