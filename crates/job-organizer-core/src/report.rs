use crate::schedule::JobRecord;
use crate::taxonomy::Destination;
use std::collections::BTreeSet;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

// A job with nothing in any of these is presumed to have received no real
// deliverables yet.
const MUST_HOLD_CONTENT: [Destination; 3] = [
    Destination::Drawings,
    Destination::Kss,
    Destination::ZipFiles,
];

/// Job folders (two levels: client/job) whose DRAWINGS, KSS and ZIP FILES
/// subfolders all exist and are all empty. Read-only.
pub fn find_empty_jobs(base: &Path) -> io::Result<Vec<PathBuf>> {
    let mut empty = Vec::new();
    for client in sorted_dirs(base)? {
        for job in sorted_dirs(&client)? {
            let mut all_empty = true;
            for destination in MUST_HOLD_CONTENT {
                let dir = job.join(destination.folder_name());
                if !dir.is_dir() || !dir_is_empty(&dir)? {
                    all_empty = false;
                    break;
                }
            }
            if all_empty {
                empty.push(job);
            }
        }
    }
    Ok(empty)
}

pub fn write_empty_jobs_report(report_path: &Path, jobs: &[PathBuf]) -> io::Result<()> {
    if let Some(parent) = report_path.parent() {
        fs::create_dir_all(parent)?;
    }
    let mut file = fs::File::create(report_path)?;
    if jobs.is_empty() {
        writeln!(
            file,
            "No job folders have all three DRAWINGS, KSS, and ZIP FILES empty."
        )?;
    } else {
        writeln!(file, "Job folders with empty DRAWINGS, KSS, and ZIP FILES:")?;
        for job in jobs {
            writeln!(file, "{}", job.display())?;
        }
    }
    Ok(())
}

/// On-disk `client/job` folders that have no matching schedule row.
/// Read-only: unmatched folders are listed, never renamed or touched.
pub fn unmatched_folders(base: &Path, schedule: &[JobRecord]) -> io::Result<Vec<String>> {
    let known: BTreeSet<String> = schedule.iter().map(JobRecord::folder_key).collect();

    let mut unmatched = Vec::new();
    for client in sorted_dirs(base)? {
        let Some(client_name) = client.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        for job in sorted_dirs(&client)? {
            let Some(job_name) = job.file_name().and_then(|n| n.to_str()) else {
                continue;
            };
            let key = format!("{client_name}/{job_name}");
            if !known.contains(&key) {
                unmatched.push(key);
            }
        }
    }
    Ok(unmatched)
}

fn sorted_dirs(dir: &Path) -> io::Result<Vec<PathBuf>> {
    let mut dirs: Vec<PathBuf> = fs::read_dir(dir)?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.is_dir())
        .collect();
    dirs.sort();
    Ok(dirs)
}

fn dir_is_empty(dir: &Path) -> io::Result<bool> {
    Ok(fs::read_dir(dir)?.next().is_none())
}
