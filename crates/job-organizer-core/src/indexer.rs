use crate::error::Error;
use crate::job::JobFolder;
use crate::mover::{self, CollisionPolicy, MoveOutcome, SkippedFile};
use crate::progress::ProgressReporter;
use crate::taxonomy::{Destination, Taxonomy};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, info, warn};
use walkdir::WalkDir;

/// Classify and relocate everything under the job's scratch tree, then fold
/// the unclassified remainder into ARCHIVE and delete the scratch tree.
///
/// Safe against re-runs: an absent scratch tree is a no-op, and a stale
/// scratch tree from an interrupted pass is simply consumed again.
pub fn index_scratch(
    job: &JobFolder,
    taxonomy: &Taxonomy,
    policy: CollisionPolicy,
    reporter: &dyn ProgressReporter,
) -> Result<MoveOutcome, Error> {
    let scratch = job.scratch_dir();
    if !scratch.exists() {
        debug!("No scratch tree at '{}', nothing to index", scratch.display());
        return Ok(MoveOutcome::default());
    }

    reporter.on_index_start();
    let start = Instant::now();
    let mut outcome = MoveOutcome::default();

    // Snapshot first: moving files while walking would invalidate the
    // iterator's view of the tree.
    let files: Vec<PathBuf> = WalkDir::new(&scratch)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file())
        .map(|entry| entry.into_path())
        .collect();

    for path in files {
        // Already moved as a sibling of an earlier match.
        if !path.exists() {
            continue;
        }
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        let Some(rule) = taxonomy.classify(name) else {
            continue;
        };
        let source = path.parent().unwrap_or(&scratch);
        let dest = job.destination_dir(rule.destination);
        match mover::move_matching(source, &dest, rule.selector, policy) {
            Ok(batch) => outcome.merge(batch),
            Err(err) => outcome.skipped.push(SkippedFile {
                path,
                reason: err.to_string(),
            }),
        }
    }

    archive_residue(job, policy, &mut outcome)?;

    info!(
        "Indexed scratch: {} files moved, {} skipped",
        outcome.moved,
        outcome.skipped.len()
    );
    reporter.on_index_complete(
        outcome.moved,
        outcome.skipped.len(),
        start.elapsed().as_secs_f64(),
    );
    Ok(outcome)
}

/// Copy whatever is left in scratch into ARCHIVE, then delete the scratch
/// tree. The scratch tree is only deleted when every remaining file made it
/// into the archival copy; otherwise it is left for a future pass.
pub(crate) fn archive_residue(
    job: &JobFolder,
    policy: CollisionPolicy,
    outcome: &mut MoveOutcome,
) -> Result<(), Error> {
    let scratch = job.scratch_dir();
    if !scratch.exists() {
        return Ok(());
    }

    let archive_dir = job.destination_dir(Destination::Archive);
    fs::create_dir_all(&archive_dir)?;

    let mut missed = 0usize;
    copy_tree(&scratch, &archive_dir, policy, outcome, &mut missed)?;

    if missed == 0 {
        fs::remove_dir_all(&scratch)?;
    } else {
        warn!(
            "{} scratch files could not be archived; leaving '{}' for a later pass",
            missed,
            scratch.display()
        );
    }
    Ok(())
}

/// Recursive copy merging into an existing destination tree. Files that
/// cannot be copied are recorded and counted in `missed` so the caller knows
/// the source tree is not yet safe to delete.
fn copy_tree(
    source: &Path,
    dest: &Path,
    policy: CollisionPolicy,
    outcome: &mut MoveOutcome,
    missed: &mut usize,
) -> Result<(), Error> {
    for entry in fs::read_dir(source)? {
        let entry = entry?;
        let path = entry.path();
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };

        if path.is_dir() {
            let target = dest.join(name);
            fs::create_dir_all(&target)?;
            copy_tree(&path, &target, policy, outcome, missed)?;
        } else {
            match mover::available_target(dest, name, policy) {
                Some(target) => {
                    if let Err(err) = fs::copy(&path, &target) {
                        warn!("Could not archive '{}': {}", path.display(), err);
                        outcome.skipped.push(SkippedFile {
                            path,
                            reason: err.to_string(),
                        });
                        *missed += 1;
                    }
                }
                None => {
                    outcome.skipped.push(SkippedFile {
                        path: path.clone(),
                        reason: format!(
                            "archival copy '{}' already exists",
                            dest.join(name).display()
                        ),
                    });
                    *missed += 1;
                }
            }
        }
    }
    Ok(())
}
