use crate::error::Error;
use crate::job::JobFolder;
use crate::mover::{self, CollisionPolicy, MoveResult};
use crate::progress::ProgressReporter;
use crate::taxonomy::Destination;
use rayon::prelude::*;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;
use std::time::Instant;
use tracing::{debug, info};
use zip::ZipArchive;

/// Result of consuming one archive found in the job root.
#[derive(Debug)]
pub struct ExtractionSummary {
    pub archive: PathBuf,
    pub members: usize,
    pub total_bytes: u64,
    /// True when the archive format is not zip and the file was moved whole
    /// into ARCHIVE instead of being unpacked.
    pub hedged: bool,
}

/// Completed-member byte accumulator for one archive.
///
/// Workers report finished members here; the percentage is computed inside
/// the lock so concurrent completions can never publish a regressing value.
struct ProgressTotals {
    total: u64,
    completed: Mutex<u64>,
}

impl ProgressTotals {
    fn new(total: u64) -> Self {
        Self {
            total,
            completed: Mutex::new(0),
        }
    }

    fn complete_member(&self, bytes: u64, reporter: &dyn ProgressReporter) {
        let mut completed = self.completed.lock().unwrap();
        *completed += bytes;
        let percent = if self.total == 0 {
            100
        } else {
            ((*completed as u128 * 100) / self.total as u128).min(100) as u64
        };
        reporter.on_extract_progress(percent);
    }
}

/// Consume one archive sitting in the job root.
///
/// Zip archives are fully unpacked into the job's scratch tree by a worker
/// pool of `worker_threads` threads, then the consumed zip itself is moved
/// into scratch for the indexer to route. Any other archive format is never
/// unpacked: the file is moved whole into ARCHIVE.
///
/// Either way, on success the archive no longer exists at its source path.
/// A corrupt or unreadable archive fails only this call; the caller carries
/// on with the job's remaining content.
pub fn extract_archive(
    archive_path: &Path,
    job: &JobFolder,
    policy: CollisionPolicy,
    worker_threads: usize,
    reporter: &dyn ProgressReporter,
    cancel: &AtomicBool,
) -> Result<ExtractionSummary, Error> {
    let display_name = archive_path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("archive")
        .to_string();
    let total_bytes = fs::metadata(archive_path)?.len();

    if !is_zip(archive_path) {
        return hedge_move(archive_path, job, policy, &display_name, total_bytes, reporter);
    }

    let scratch = job.scratch_dir();
    fs::create_dir_all(&scratch)?;

    // List members up front; an unreadable listing fails the archive before
    // anything is written.
    let member_count = ZipArchive::new(fs::File::open(archive_path)?)?.len();

    info!("Extracting '{}' ({} members)...", display_name, member_count);
    reporter.on_extract_start(&display_name, total_bytes);
    let start = Instant::now();
    let progress = ProgressTotals::new(total_bytes);

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(worker_threads.max(1))
        .build()?;
    pool.install(|| {
        (0..member_count).into_par_iter().try_for_each_init(
            || open_reader(archive_path),
            |reader, index| {
                let archive = match reader {
                    Ok(archive) => archive,
                    Err(err) => {
                        return Err(Error::Other(format!(
                            "could not reopen '{}': {}",
                            archive_path.display(),
                            err
                        )))
                    }
                };
                extract_member(archive, index, &scratch, &progress, reporter, cancel)
            },
        )
    })?;

    // All members are on disk. The consumed zip moves into scratch so the
    // indexing pass decides its resting place like any other scratch file.
    match mover::move_into(archive_path, &scratch, policy)? {
        MoveResult::Moved(_) => {}
        MoveResult::Skipped(reason) => {
            return Err(Error::Other(format!(
                "extracted '{}' but could not relocate the archive: {}",
                display_name, reason
            )))
        }
    }

    reporter.on_extract_progress(100);
    reporter.on_extract_complete(&display_name, member_count, start.elapsed().as_secs_f64());
    debug!(
        "Extracted '{}' in {:.2}s",
        display_name,
        start.elapsed().as_secs_f64()
    );

    Ok(ExtractionSummary {
        archive: archive_path.to_path_buf(),
        members: member_count,
        total_bytes,
        hedged: false,
    })
}

fn is_zip(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("zip"))
}

/// No general decompression support: the archive is relocated whole into
/// ARCHIVE and its contents stay opaque.
fn hedge_move(
    archive_path: &Path,
    job: &JobFolder,
    policy: CollisionPolicy,
    display_name: &str,
    total_bytes: u64,
    reporter: &dyn ProgressReporter,
) -> Result<ExtractionSummary, Error> {
    let archive_dir = job.destination_dir(Destination::Archive);
    fs::create_dir_all(&archive_dir)?;
    match mover::move_into(archive_path, &archive_dir, policy)? {
        MoveResult::Moved(_) => {
            info!("Archived '{}' without unpacking", display_name);
            reporter.on_archive_hedged(display_name);
            Ok(ExtractionSummary {
                archive: archive_path.to_path_buf(),
                members: 0,
                total_bytes,
                hedged: true,
            })
        }
        MoveResult::Skipped(reason) => Err(Error::Other(format!(
            "could not archive '{}': {}",
            display_name, reason
        ))),
    }
}

fn open_reader(path: &Path) -> Result<ZipArchive<fs::File>, Error> {
    Ok(ZipArchive::new(fs::File::open(path)?)?)
}

fn extract_member(
    archive: &mut ZipArchive<fs::File>,
    index: usize,
    scratch: &Path,
    progress: &ProgressTotals,
    reporter: &dyn ProgressReporter,
    cancel: &AtomicBool,
) -> Result<(), Error> {
    if cancel.load(Ordering::Relaxed) {
        return Err(Error::Cancelled);
    }

    let mut member = archive.by_index(index)?;
    let Some(relative) = member.enclosed_name() else {
        return Err(Error::UnsafeEntry {
            name: member.name().to_string(),
        });
    };
    let target = scratch.join(relative);
    let compressed = member.compressed_size();

    if member.is_dir() {
        fs::create_dir_all(&target)?;
    } else {
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent)?;
        }
        let mut out = fs::File::create(&target)?;
        io::copy(&mut member, &mut out)?;
    }

    // Partial member writes never count: bytes are added only once the
    // member is fully on disk.
    progress.complete_member(compressed, reporter);
    Ok(())
}
