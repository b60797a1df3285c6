use std::path::{Path, PathBuf};

use anyhow::bail;
use clap::{Parser, Subcommand};

use journal_stats::config::ReportConfig;
use journal_stats::journal;
use journal_stats::output::{self, Format};
use journal_stats::report;

#[derive(Parser)]
#[command(
    name = "journal-stats",
    version,
    about = "Extract record metadata and activity statistics from Sugar Journal backups"
)]
struct Cli {
    /// Output file; .csv or .json extension selects the format
    #[arg(short, long, global = true, default_value = "journal_stats.csv")]
    output: PathBuf,

    /// Output format, overriding the extension
    #[arg(long, global = true, value_enum)]
    format: Option<Format>,

    /// Root directory containing one backup directory per laptop serial
    #[arg(short, long, global = true, default_value = "users")]
    directory: PathBuf,

    /// Show per-file processing details
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Emit one row per journal record
    All {
        /// Comma-separated metadata fields to emit as columns, in order
        #[arg(short, long = "metadata", value_delimiter = ',')]
        metadata: Vec<String>,
    },
    /// Aggregate records per activity with value-frequency breakdowns
    Activity {
        /// Comma-separated fields to tabulate per activity
        #[arg(short, long = "stats", value_delimiter = ',')]
        stats: Vec<String>,
    },
}

/// Resolve the output format: explicit flag first, then the file extension.
fn resolve_format(output: &Path, flag: Option<Format>) -> anyhow::Result<Format> {
    if let Some(format) = flag {
        return Ok(format);
    }
    match Format::from_path(output) {
        Some(format) => Ok(format),
        None => bail!(
            "unsupported output file format: {} (use .csv, .json, or --format)",
            output.display()
        ),
    }
}

fn cmd_report(cli: &Cli, cfg: &ReportConfig) -> anyhow::Result<i32> {
    let format = resolve_format(&cli.output, cli.format)?;
    let scan = journal::scan_backups(&cli.directory, cli.verbose)?;

    let table = match &cli.command {
        Commands::All { .. } => report::all_report(&scan.records, &cfg.metadata_fields),
        Commands::Activity { .. } => report::activity_report(&scan.records, &cfg.stats_fields),
    };

    output::write_table(&cli.output, format, &table)?;

    eprintln!(
        "[journal-stats] {} records, {} skipped",
        scan.records.len(),
        scan.skipped
    );
    eprintln!("[journal-stats] wrote {}", cli.output.display());
    Ok(0)
}

fn main() {
    let cli = Cli::parse();

    let cfg = match &cli.command {
        Commands::All { metadata } => ReportConfig::load().with_overrides(metadata, &[]),
        Commands::Activity { stats } => ReportConfig::load().with_overrides(&[], stats),
    };

    let exit_code = cmd_report(&cli, &cfg).unwrap_or_else(|e| {
        eprintln!("[journal-stats] error: {e:#}");
        1
    });
    std::process::exit(exit_code);
}
