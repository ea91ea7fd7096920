//! Scan progress reporting.

use std::time::{Duration, Instant};

use foldertally_core::FolderRecord;

/// Progress information during a scan.
#[derive(Debug, Clone)]
pub struct ScanProgress {
    /// Number of folders visited so far.
    pub folders_scanned: u64,
    /// Direct files counted so far (failed folders contribute nothing).
    pub files_counted: u64,
    /// Number of folders whose listing failed.
    pub errors_count: u64,
    /// Folders discovered but not yet visited.
    pub queued: usize,
    /// Folder just visited.
    pub current_path: String,
    /// Time elapsed since scan started.
    pub elapsed: Duration,
}

impl ScanProgress {
    /// Create initial progress state.
    pub fn new() -> Self {
        Self {
            folders_scanned: 0,
            files_counted: 0,
            errors_count: 0,
            queued: 0,
            current_path: String::new(),
            elapsed: Duration::ZERO,
        }
    }

    /// Calculate scan rate in folders per second.
    pub fn folders_per_second(&self) -> f64 {
        if self.elapsed.as_secs_f64() > 0.0 {
            self.folders_scanned as f64 / self.elapsed.as_secs_f64()
        } else {
            0.0
        }
    }
}

impl Default for ScanProgress {
    fn default() -> Self {
        Self::new()
    }
}

/// Internal progress tracker with timing.
#[derive(Debug)]
pub(crate) struct ProgressTracker {
    start_time: Instant,
    folders_scanned: u64,
    files_counted: u64,
    errors_count: u64,
    queued: usize,
    current_path: String,
}

impl ProgressTracker {
    pub fn new() -> Self {
        Self {
            start_time: Instant::now(),
            folders_scanned: 0,
            files_counted: 0,
            errors_count: 0,
            queued: 0,
            current_path: String::new(),
        }
    }

    pub fn record(&mut self, record: &FolderRecord, queued: usize) {
        self.folders_scanned += 1;
        match record.files() {
            Some(files) => self.files_counted += files,
            None => self.errors_count += 1,
        }
        self.queued = queued;
        self.current_path.clear();
        self.current_path.push_str(record.path());
    }

    pub fn snapshot(&self) -> ScanProgress {
        ScanProgress {
            folders_scanned: self.folders_scanned,
            files_counted: self.files_counted,
            errors_count: self.errors_count,
            queued: self.queued,
            current_path: self.current_path.clone(),
            elapsed: self.start_time.elapsed(),
        }
    }
}
