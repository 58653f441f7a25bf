use indicatif::{ProgressBar, ProgressStyle};
use job_organizer_core::ProgressReporter;
use std::sync::Mutex;

/// CLI progress reporter using indicatif progress bars.
///
/// - Extraction: percentage bar (total archive bytes known upfront)
/// - Indexing and sweeping: spinners
pub struct CliReporter {
    bar: Mutex<Option<ProgressBar>>,
}

impl CliReporter {
    pub fn new() -> Self {
        Self {
            bar: Mutex::new(None),
        }
    }

    fn set_bar(&self, pb: ProgressBar) {
        let mut guard = self.bar.lock().unwrap();
        if let Some(old) = guard.take() {
            old.finish_and_clear();
        }
        *guard = Some(pb);
    }

    fn finish_bar(&self) {
        let mut guard = self.bar.lock().unwrap();
        if let Some(pb) = guard.take() {
            pb.finish_and_clear();
        }
    }

    fn spinner(&self, message: &'static str) {
        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::with_template("{spinner:.cyan} {msg}")
                .unwrap()
                .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏"),
        );
        pb.set_message(message);
        pb.enable_steady_tick(std::time::Duration::from_millis(80));
        self.set_bar(pb);
    }
}

impl ProgressReporter for CliReporter {
    fn on_extract_start(&self, archive: &str, _total_bytes: u64) {
        let pb = ProgressBar::new(100);
        pb.set_style(
            ProgressStyle::with_template(
                "  {spinner:.cyan} Extracting {msg} [{bar:30.cyan/dim}] {pos}%",
            )
            .unwrap()
            .progress_chars("━╸─")
            .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏"),
        );
        pb.set_message(archive.to_string());
        pb.enable_steady_tick(std::time::Duration::from_millis(80));
        self.set_bar(pb);
    }

    fn on_extract_progress(&self, percent: u64) {
        let guard = self.bar.lock().unwrap();
        if let Some(pb) = guard.as_ref() {
            pb.set_position(percent);
        }
    }

    fn on_extract_complete(&self, archive: &str, members: usize, duration_secs: f64) {
        self.finish_bar();
        eprintln!(
            "  \x1b[32m✓\x1b[0m Extracted {}: {} members in {:.2}s",
            archive, members, duration_secs
        );
    }

    fn on_archive_hedged(&self, archive: &str) {
        self.finish_bar();
        eprintln!("  \x1b[33m→\x1b[0m Archived {} without unpacking", archive);
    }

    fn on_index_start(&self) {
        self.spinner("Indexing extracted files...");
    }

    fn on_index_complete(&self, moved: usize, skipped: usize, duration_secs: f64) {
        self.finish_bar();
        eprintln!(
            "  \x1b[32m✓\x1b[0m Index complete: {} files moved, {} skipped in {:.2}s",
            moved, skipped, duration_secs
        );
    }

    fn on_sweep_start(&self) {
        self.spinner("Sweeping stray folders...");
    }

    fn on_sweep_complete(&self, folders: usize) {
        self.finish_bar();
        if folders > 0 {
            eprintln!("  \x1b[32m✓\x1b[0m Swept {} stray folders", folders);
        }
    }
}
