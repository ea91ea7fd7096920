//! The scan, record and publish pipeline behind the `run` and `report` commands.

use std::path::Path;
use std::thread;

use chrono::NaiveDate;
use color_eyre::eyre::{Context, Report, Result};
use serde::Serialize;
use tracing::{debug, error, info};

use foldertally_core::{RawStore, SetupError};
use foldertally_history::{HistoryConfig, HistoryLedger};
use foldertally_remote::{
    DropboxClient, GitHubClient, GitHubFileStore, GitHubRepo, PublishedReport, RetryConfig,
};
use foldertally_report::{ReportModel, render_html};
use foldertally_scan::{ListingClient, ScanConfig, ScanReport, TreeScanner};

/// Log a progress line every this many folders.
const PROGRESS_EVERY: u64 = 250;

/// Settings for a full `run`, after validation.
#[derive(Debug, Clone)]
pub struct RunSettings {
    pub dropbox_token: String,
    pub github_token: String,
    pub repo: GitHubRepo,
    pub scan: ScanConfig,
    pub history: HistoryConfig,
    pub report_file: String,
    pub retry: RetryConfig,
}

/// Raw, possibly missing settings as collected from flags and environment.
#[derive(Debug, Clone)]
pub struct RawRunSettings {
    pub dropbox_token: Option<String>,
    pub root: String,
    pub max_folders: Option<usize>,
    pub github_token: Option<String>,
    pub github_owner: Option<String>,
    pub github_repo: Option<String>,
    pub github_branch: Option<String>,
    pub retention_days: u32,
    pub history_file: String,
    pub report_file: String,
    pub max_attempts: usize,
}

impl RawRunSettings {
    /// Check every setting and build the validated form.
    pub fn validate(self) -> Result<RunSettings, SetupError> {
        let dropbox_token = required("DROPBOX_ACCESS_TOKEN", self.dropbox_token)?;
        let github_token = required("GITHUB_TOKEN", self.github_token)?;
        let owner = required("GITHUB_OWNER", self.github_owner)?;
        let repo_name = required("GITHUB_REPO", self.github_repo)?;

        let mut repo = GitHubRepo::new(owner, repo_name);
        if let Some(branch) = self.github_branch.filter(|b| !b.trim().is_empty()) {
            repo = repo.with_branch(branch);
        }

        let scan = ScanConfig::builder()
            .root(self.root)
            .max_folders(self.max_folders)
            .build()
            .map_err(|e| SetupError::invalid("DROPBOX_ROOT_PATH", e.to_string()))?;
        let history = HistoryConfig::builder()
            .retention_days(self.retention_days)
            .file_name(self.history_file)
            .build()
            .map_err(|e| SetupError::invalid("FOLDERTALLY_RETENTION_DAYS", e.to_string()))?;

        if self.report_file.trim().is_empty() {
            return Err(SetupError::invalid("report file", "cannot be empty"));
        }
        if self.max_attempts == 0 {
            return Err(SetupError::invalid(
                "FOLDERTALLY_MAX_ATTEMPTS",
                "must be at least 1",
            ));
        }

        Ok(RunSettings {
            dropbox_token,
            github_token,
            repo,
            scan,
            history,
            report_file: self.report_file,
            retry: RetryConfig::with_attempts(self.max_attempts),
        })
    }
}

/// Return a setting's value, treating blank values as missing.
pub fn required(name: &str, value: Option<String>) -> Result<String, SetupError> {
    value
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| SetupError::missing(name))
}

/// Final status of a run, printed as JSON.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum RunOutcome {
    Success {
        folders_scanned: usize,
        total_files: u64,
        history_entries: usize,
        filename: String,
        pages_url: String,
    },
    Error {
        error_type: ErrorType,
        message: String,
    },
}

/// Failure category of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorType {
    Configuration,
    Runtime,
}

impl RunOutcome {
    /// Classify a failed run. Full details go to the log.
    pub fn from_error(err: &Report) -> Self {
        error!(error = ?err, "Run failed");
        match err.downcast_ref::<SetupError>() {
            Some(setup) => Self::Error {
                error_type: ErrorType::Configuration,
                message: format!("Configuration error: {setup}"),
            },
            None => Self::Error {
                error_type: ErrorType::Runtime,
                message: format!("Run failed: {err}"),
            },
        }
    }

    /// Process exit code for this outcome.
    pub fn exit_code(&self) -> u8 {
        match self {
            Self::Success { .. } => 0,
            Self::Error {
                error_type: ErrorType::Configuration,
                ..
            } => 2,
            Self::Error {
                error_type: ErrorType::Runtime,
                ..
            } => 1,
        }
    }
}

/// Scan the tree, logging progress from the scanner's broadcast channel.
pub fn scan_tree<C: ListingClient>(client: C, config: &ScanConfig) -> ScanReport {
    let scanner = TreeScanner::new(client);
    let mut progress_rx = scanner.subscribe();

    let logger = thread::spawn(move || {
        use tokio::sync::broadcast::error::RecvError;
        loop {
            match progress_rx.blocking_recv() {
                Ok(progress) if progress.folders_scanned % PROGRESS_EVERY == 0 => {
                    info!(
                        folders = progress.folders_scanned,
                        files = progress.files_counted,
                        queued = progress.queued,
                        rate = progress.folders_per_second(),
                        "Scan progress"
                    );
                }
                Ok(_) => {}
                Err(RecvError::Lagged(skipped)) => debug!(skipped, "Progress updates dropped"),
                Err(RecvError::Closed) => break,
            }
        }
    });

    let report = scanner.scan(config);
    drop(scanner);
    if logger.join().is_err() {
        debug!("Progress logger panicked");
    }
    report
}

/// Load the ledger, scan, and fold the scan totals into the ledger.
///
/// The ledger is trimmed to the retention window as of `today` but not saved.
pub fn scan_and_record<C, S>(
    client: C,
    store: &S,
    scan: &ScanConfig,
    history: &HistoryConfig,
    today: NaiveDate,
) -> (ScanReport, HistoryLedger)
where
    C: ListingClient,
    S: RawStore + ?Sized,
{
    let mut ledger = HistoryLedger::load(store);
    let report = scan_tree(client, scan);

    ledger
        .record_scan(today, &report.totals)
        .trim_as_of(today, history.retention_days);
    (report, ledger)
}

/// Run the full pipeline: scan Dropbox, update the GitHub-hosted history and
/// publish the report to GitHub Pages.
pub fn run(settings: &RunSettings, today: NaiveDate) -> Result<RunOutcome> {
    let dropbox = DropboxClient::new(&settings.dropbox_token).with_retry(settings.retry);
    let github = GitHubClient::new(&settings.github_token, settings.repo.clone())
        .with_retry(settings.retry);
    let history_store = GitHubFileStore::new(github.clone(), &settings.history.file_name);

    let (report, ledger) = scan_and_record(
        dropbox,
        &history_store,
        &settings.scan,
        &settings.history,
        today,
    );

    let model = ReportModel::assemble(&report, &ledger, settings.history.retention_days);
    let html = render_html(&model).wrap_err("Failed to render report")?;

    let published: PublishedReport = github
        .publish_report(&settings.report_file, &html)
        .wrap_err("Failed to upload report")?;
    ledger
        .save(&history_store)
        .wrap_err("Failed to save history")?;
    github.ensure_pages();

    Ok(RunOutcome::Success {
        folders_scanned: report.records.len(),
        total_files: report.totals.total_files,
        history_entries: ledger.len(),
        filename: published.file_name,
        pages_url: published.pages_url,
    })
}

/// Render a report to a local file.
pub fn write_report(model: &ReportModel, output: &Path) -> Result<()> {
    let html = render_html(model).wrap_err("Failed to render report")?;
    if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .wrap_err_with(|| format!("Failed to create {}", parent.display()))?;
    }
    std::fs::write(output, html).wrap_err_with(|| format!("Failed to write {}", output.display()))?;
    info!(path = %output.display(), "Report written");
    Ok(())
}
