/// Trait for reporting organize progress.
///
/// CLI implements with tracing/indicatif. All methods have default no-op
/// implementations. Extraction percentages are computed by the engine's
/// single accumulator and are guaranteed non-decreasing per archive.
pub trait ProgressReporter: Send + Sync {
    fn on_extract_start(&self, _archive: &str, _total_bytes: u64) {}
    fn on_extract_progress(&self, _percent: u64) {}
    fn on_extract_complete(&self, _archive: &str, _members: usize, _duration_secs: f64) {}
    fn on_archive_hedged(&self, _archive: &str) {}
    fn on_index_start(&self) {}
    fn on_index_complete(&self, _moved: usize, _skipped: usize, _duration_secs: f64) {}
    fn on_sweep_start(&self) {}
    fn on_sweep_complete(&self, _folders: usize) {}
}

/// No-op progress reporter for silent operation.
pub struct SilentReporter;

impl ProgressReporter for SilentReporter {}
