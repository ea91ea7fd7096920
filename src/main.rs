//! foldertally - Counts files per Dropbox folder and publishes a trend report.
//!
//! Usage:
//!   foldertally run              Scan, update history, publish to GitHub Pages
//!   foldertally scan             Scan and print per-folder counts
//!   foldertally report           Scan and write the HTML report locally
//!   foldertally history          Show a local history file
//!   foldertally --help           Show help

mod pipeline;

use std::path::PathBuf;
use std::process::ExitCode;

use chrono::Utc;
use clap::{Args, Parser, Subcommand, ValueEnum};
use color_eyre::eyre::{Context, Report, Result};
use serde_json::json;
use tracing_subscriber::EnvFilter;

use foldertally_history::{DEFAULT_RETENTION_DAYS, FileStore, HistoryConfig, HistoryLedger};
use foldertally_remote::{DropboxClient, RetryConfig};
use foldertally_report::ReportModel;
use foldertally_scan::{FolderOutcome, ScanConfig};

use crate::pipeline::{RawRunSettings, RunOutcome, required};

#[derive(Parser)]
#[command(
    name = "foldertally",
    version,
    about = "Counts files per Dropbox folder and tracks the totals over time",
    long_about = "foldertally walks a Dropbox folder tree, counts the files directly \
                  inside every folder and keeps a rolling daily history of the totals.\n\n\
                  `foldertally run` publishes the report to GitHub Pages; the other \
                  subcommands work locally."
)]
struct Cli {
    /// Enable debug logging (overrides RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Scan Dropbox, update the history in GitHub and publish the report
    Run(RunArgs),

    /// Scan and print per-folder file counts
    Scan {
        #[command(flatten)]
        dropbox: DropboxArgs,

        /// Output format
        #[arg(short, long, default_value = "text")]
        format: OutputFormat,
    },

    /// Scan, update a local history file and write the HTML report
    Report {
        #[command(flatten)]
        dropbox: DropboxArgs,

        /// History file to read and update
        #[arg(long, default_value = "history.json")]
        history: PathBuf,

        /// Where to write the HTML report
        #[arg(short, long, default_value = "report.html")]
        output: PathBuf,

        /// Days of history to keep
        #[arg(long, env = "FOLDERTALLY_RETENTION_DAYS", default_value_t = DEFAULT_RETENTION_DAYS)]
        retention_days: u32,
    },

    /// Show a local history file and the change since the previous entry
    History {
        /// History file to read
        #[arg(default_value = "history.json")]
        path: PathBuf,

        /// Output format
        #[arg(short, long, default_value = "text")]
        format: OutputFormat,
    },
}

#[derive(Args, Clone)]
struct DropboxArgs {
    /// Dropbox API access token
    #[arg(long, env = "DROPBOX_ACCESS_TOKEN", hide_env_values = true)]
    dropbox_token: Option<String>,

    /// Folder to scan (empty scans the whole Dropbox)
    #[arg(long, env = "DROPBOX_ROOT_PATH", default_value = "")]
    root: String,

    /// Stop after this many folders
    #[arg(long)]
    max_folders: Option<usize>,

    /// Attempts per request before giving up on transient failures
    #[arg(long, env = "FOLDERTALLY_MAX_ATTEMPTS", default_value_t = 3)]
    max_attempts: usize,
}

impl DropboxArgs {
    fn client(&self) -> Result<DropboxClient> {
        let token = required("DROPBOX_ACCESS_TOKEN", self.dropbox_token.clone())?;
        Ok(DropboxClient::new(token).with_retry(RetryConfig::with_attempts(self.max_attempts)))
    }

    fn scan_config(&self) -> Result<ScanConfig> {
        let config = ScanConfig::builder()
            .root(self.root.clone())
            .max_folders(self.max_folders)
            .build()
            .wrap_err("Invalid scan settings")?;
        Ok(config)
    }
}

#[derive(Args)]
struct RunArgs {
    #[command(flatten)]
    dropbox: DropboxArgs,

    /// GitHub token with contents and pages permissions
    #[arg(long, env = "GITHUB_TOKEN", hide_env_values = true)]
    github_token: Option<String>,

    /// Owner of the repository receiving the report
    #[arg(long, env = "GITHUB_OWNER")]
    github_owner: Option<String>,

    /// Repository receiving the report
    #[arg(long, env = "GITHUB_REPO")]
    github_repo: Option<String>,

    /// Branch to commit to (defaults to the repository's default branch)
    #[arg(long, env = "GITHUB_BRANCH")]
    github_branch: Option<String>,

    /// Days of history to keep
    #[arg(long, env = "FOLDERTALLY_RETENTION_DAYS", default_value_t = DEFAULT_RETENTION_DAYS)]
    retention_days: u32,

    /// Repository path of the history file
    #[arg(long, default_value = "history.json")]
    history_file: String,

    /// Repository path of the published report
    #[arg(long, default_value = "index.html")]
    report_file: String,
}

impl From<RunArgs> for RawRunSettings {
    fn from(args: RunArgs) -> Self {
        Self {
            dropbox_token: args.dropbox.dropbox_token,
            root: args.dropbox.root,
            max_folders: args.dropbox.max_folders,
            github_token: args.github_token,
            github_owner: args.github_owner,
            github_repo: args.github_repo,
            github_branch: args.github_branch,
            retention_days: args.retention_days,
            history_file: args.history_file,
            report_file: args.report_file,
            max_attempts: args.dropbox.max_attempts,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum, Default)]
enum OutputFormat {
    #[default]
    Text,
    Json,
}

fn main() -> Result<ExitCode> {
    color_eyre::install()?;

    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Command::Run(args) => run_full(args),
        Command::Scan { dropbox, format } => {
            run_scan(&dropbox, format)?;
            Ok(ExitCode::SUCCESS)
        }
        Command::Report {
            dropbox,
            history,
            output,
            retention_days,
        } => {
            run_report(&dropbox, history, &output, retention_days)?;
            Ok(ExitCode::SUCCESS)
        }
        Command::History { path, format } => {
            run_history(path, format)?;
            Ok(ExitCode::SUCCESS)
        }
    }
}

/// Log to stderr; stdout carries command output only.
fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// Run the full pipeline and print its status as JSON.
fn run_full(args: RunArgs) -> Result<ExitCode> {
    let outcome = RawRunSettings::from(args)
        .validate()
        .map_err(Report::new)
        .and_then(|settings| pipeline::run(&settings, Utc::now().date_naive()))
        .unwrap_or_else(|err| RunOutcome::from_error(&err));

    println!("{}", serde_json::to_string(&outcome)?);
    Ok(ExitCode::from(outcome.exit_code()))
}

/// Scan and print per-folder counts.
fn run_scan(dropbox: &DropboxArgs, format: OutputFormat) -> Result<()> {
    let config = dropbox.scan_config()?;
    let report = pipeline::scan_tree(dropbox.client()?, &config);

    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        OutputFormat::Text => {
            println!();
            println!("{}", "─".repeat(60));
            println!(" {}", report.display_root());
            println!(
                " {} files in {} folders",
                report.totals.total_files, report.totals.total_folders
            );
            println!(" Scanned in {:.2}s", report.scan_duration.as_secs_f64());
            println!("{}", "─".repeat(60));
            for record in &report.records {
                match record.outcome() {
                    FolderOutcome::Counted(files) => println!("{files:>10}  {}", record.path()),
                    FolderOutcome::Failed(_) => println!("{:>10}  {}", "error", record.path()),
                }
            }
            if report.has_failures() {
                println!();
                println!("{} folder(s) could not be listed", report.totals.failed_folders);
                for record in report.failures() {
                    println!("  {}: {}", record.path(), record.error().unwrap_or_default());
                }
            }
        }
    }

    Ok(())
}

/// Scan, update a local history file and write the report next to it.
fn run_report(
    dropbox: &DropboxArgs,
    history_path: PathBuf,
    output: &std::path::Path,
    retention_days: u32,
) -> Result<()> {
    let config = dropbox.scan_config()?;
    let history = HistoryConfig::builder()
        .retention_days(retention_days)
        .build()
        .wrap_err("Invalid history settings")?;
    let store = FileStore::new(history_path);

    let (report, ledger) = pipeline::scan_and_record(
        dropbox.client()?,
        &store,
        &config,
        &history,
        Utc::now().date_naive(),
    );

    let model = ReportModel::assemble(&report, &ledger, history.retention_days);
    pipeline::write_report(&model, output)?;
    ledger.save(&store).wrap_err("Failed to save history")?;

    println!(
        "{} folders, {} files; report written to {}",
        report.totals.total_folders,
        report.totals.total_files,
        output.display()
    );
    Ok(())
}

/// Print a history file and the latest change.
fn run_history(path: PathBuf, format: OutputFormat) -> Result<()> {
    let ledger = HistoryLedger::load(&FileStore::new(path));
    let change = ledger.change_since_previous();

    match format {
        OutputFormat::Json => {
            let value = json!({
                "data": ledger.entries(),
                "change_since_previous": change,
            });
            println!("{}", serde_json::to_string_pretty(&value)?);
        }
        OutputFormat::Text => {
            if ledger.is_empty() {
                println!("No history recorded");
                return Ok(());
            }
            println!("{:<12} {:>12} {:>10}", "Date", "Files", "Folders");
            for entry in ledger.entries() {
                println!(
                    "{:<12} {:>12} {:>10}",
                    entry.date.to_string(),
                    entry.total_files,
                    entry.total_folders
                );
            }
            match change {
                Some(delta) => println!("\nChange since previous: {delta:+}"),
                None => println!("\nChange since previous: n/a"),
            }
        }
    }

    Ok(())
}
