use crate::config::AppConfig;
use crate::error::Error;
use crate::extract;
use crate::indexer;
use crate::job::JobFolder;
use crate::mover::{self, CollisionPolicy, MoveOutcome, MoveResult, SkippedFile};
use crate::progress::ProgressReporter;
use crate::resources;
use crate::taxonomy::{Destination, Taxonomy};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{info, warn};

/// Orchestrates one job folder through extraction, indexing, loose-file
/// classification, the stray-folder sweep and resource staging.
pub struct JobOrganizer {
    config: AppConfig,
    taxonomy: &'static Taxonomy,
    cancel: Arc<AtomicBool>,
}

/// Aggregated outcome of one organize run. Partial failures never abort the
/// run; they are collected here so the job can get a second manual pass.
#[derive(Debug, Default)]
pub struct OrganizeSummary {
    pub archives_extracted: usize,
    pub archives_hedged: usize,
    /// Archives that could not be listed or unpacked; the job is incomplete.
    pub failed_archives: Vec<SkippedFile>,
    pub files_moved: usize,
    pub strays_swept: usize,
    /// Individual files that could not be moved or archived, with causes.
    pub skipped: Vec<SkippedFile>,
    pub companion_staged: bool,
    pub template_staged: bool,
    pub duration: Duration,
}

impl OrganizeSummary {
    /// True when every archive unpacked and every file landed where the
    /// taxonomy routes it.
    pub fn is_clean(&self) -> bool {
        self.failed_archives.is_empty() && self.skipped.is_empty()
    }

    fn absorb(&mut self, outcome: MoveOutcome) {
        self.files_moved += outcome.moved;
        self.skipped.extend(outcome.skipped);
    }
}

impl JobOrganizer {
    pub fn new(config: AppConfig) -> Self {
        Self {
            config,
            taxonomy: Taxonomy::standard(),
            cancel: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Token that aborts the run when set; checked between archives and
    /// between extracted members.
    pub fn cancel_token(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.cancel)
    }

    /// Run the full pipeline over one job folder:
    /// 1. Extract every archive found directly in the root
    /// 2. Index the scratch tree (classify + archive the remainder)
    /// 3. Classify files left directly in the root
    /// 4. Sweep stray subfolders, parking the residue in scratch
    /// 5. Archive the final scratch residue
    /// 6. Stage companion resources
    pub fn organize(
        &self,
        root: &Path,
        reporter: &dyn ProgressReporter,
    ) -> Result<OrganizeSummary, Error> {
        let start = Instant::now();
        let job = JobFolder::new(root);
        job.ensure_layout()?;
        let policy = self.config.collision_policy;
        let mut summary = OrganizeSummary::default();

        info!("Organizing job '{}'...", root.display());

        for path in self.root_archives(&job)? {
            if self.cancel.load(Ordering::Relaxed) {
                return Err(Error::Cancelled);
            }
            match extract::extract_archive(
                &path,
                &job,
                policy,
                self.config.worker_threads,
                reporter,
                &self.cancel,
            ) {
                Ok(extraction) if extraction.hedged => summary.archives_hedged += 1,
                Ok(_) => summary.archives_extracted += 1,
                Err(Error::Cancelled) => return Err(Error::Cancelled),
                Err(err) => {
                    warn!("Could not process archive '{}': {}", path.display(), err);
                    summary.failed_archives.push(SkippedFile {
                        path,
                        reason: err.to_string(),
                    });
                }
            }
        }

        let indexed = indexer::index_scratch(&job, self.taxonomy, policy, reporter)?;
        summary.absorb(indexed);

        let loose = self.classify_loose_files(&job, policy)?;
        summary.absorb(loose);

        reporter.on_sweep_start();
        let swept = self.sweep_strays(&job, policy, &mut summary)?;
        summary.strays_swept = swept;
        reporter.on_sweep_complete(swept);

        // The sweep parks residual folders in scratch; consume it again so
        // no file lingers there past the end of the run.
        let mut residue = MoveOutcome::default();
        indexer::archive_residue(&job, policy, &mut residue)?;
        summary.absorb(residue);

        let staged = resources::stage(
            &job,
            self.config.companion_executable.as_deref().map(Path::new),
            self.config.template_spreadsheet.as_deref().map(Path::new),
        );
        summary.companion_staged = staged.companion;
        summary.template_staged = staged.template;

        summary.duration = start.elapsed();
        info!(
            "Organized '{}' in {:.2}s: {} files moved, {} archives extracted, {} skipped",
            root.display(),
            summary.duration.as_secs_f64(),
            summary.files_moved,
            summary.archives_extracted,
            summary.skipped.len()
        );
        Ok(summary)
    }

    /// Archives sitting directly in the job root, discovered through the
    /// same rule table that routes loose archive files.
    fn root_archives(&self, job: &JobFolder) -> Result<Vec<PathBuf>, Error> {
        let mut archives = Vec::new();
        for entry in fs::read_dir(job.root())? {
            let entry = entry?;
            let path = entry.path();
            if !path.is_file() {
                continue;
            }
            let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
                continue;
            };
            if self
                .taxonomy
                .classify(name)
                .is_some_and(|m| m.destination == Destination::ZipFiles)
            {
                archives.push(path);
            }
        }
        archives.sort();
        Ok(archives)
    }

    /// Classify files left directly in the job root — deliverables that were
    /// never archived, plus archives that failed extraction.
    fn classify_loose_files(
        &self,
        job: &JobFolder,
        policy: CollisionPolicy,
    ) -> Result<MoveOutcome, Error> {
        let mut outcome = MoveOutcome::default();
        let mut files: Vec<PathBuf> = fs::read_dir(job.root())?
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| path.is_file())
            .collect();
        files.sort();

        for path in files {
            if !path.exists() {
                continue;
            }
            let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
                continue;
            };
            let Some(rule) = self.taxonomy.classify(name) else {
                continue;
            };
            let dest = job.destination_dir(rule.destination);
            outcome.merge(mover::move_matching(job.root(), &dest, rule.selector, policy)?);
        }
        Ok(outcome)
    }

    /// Sweep every top-level subfolder that is not part of the fixed layout:
    /// classify its immediate children, then relocate the residual folder
    /// into scratch. Per-folder failures are recorded and do not stop the
    /// sweep.
    fn sweep_strays(
        &self,
        job: &JobFolder,
        policy: CollisionPolicy,
        summary: &mut OrganizeSummary,
    ) -> Result<usize, Error> {
        let mut strays: Vec<PathBuf> = fs::read_dir(job.root())?
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| path.is_dir())
            .filter(|path| {
                path.file_name()
                    .and_then(|n| n.to_str())
                    .is_some_and(|name| !self.taxonomy.is_reserved(name))
            })
            .collect();
        strays.sort();

        if strays.is_empty() {
            return Ok(0);
        }

        fs::create_dir_all(job.scratch_dir())?;
        let mut swept = 0usize;
        for dir in strays {
            match self.sweep_one(&dir, job, policy) {
                Ok(outcome) => {
                    summary.absorb(outcome);
                    swept += 1;
                }
                Err(err) => {
                    warn!("Could not sweep folder '{}': {}", dir.display(), err);
                    summary.skipped.push(SkippedFile {
                        path: dir,
                        reason: err.to_string(),
                    });
                }
            }
        }
        Ok(swept)
    }

    fn sweep_one(
        &self,
        dir: &Path,
        job: &JobFolder,
        policy: CollisionPolicy,
    ) -> Result<MoveOutcome, Error> {
        let mut outcome = MoveOutcome::default();

        let mut children: Vec<PathBuf> = fs::read_dir(dir)?
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| path.is_file())
            .collect();
        children.sort();

        for path in children {
            if !path.exists() {
                continue;
            }
            let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
                continue;
            };
            let Some(rule) = self.taxonomy.classify(name) else {
                continue;
            };
            let dest = job.destination_dir(rule.destination);
            outcome.merge(mover::move_matching(dir, &dest, rule.selector, policy)?);
        }

        match mover::move_into(dir, &job.scratch_dir(), policy)? {
            MoveResult::Moved(_) => {}
            MoveResult::Skipped(reason) => outcome.skipped.push(SkippedFile {
                path: dir.to_path_buf(),
                reason,
            }),
        }
        Ok(outcome)
    }
}
