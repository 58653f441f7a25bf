use crate::taxonomy::Selector;
use serde::Deserialize;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::warn;

/// What to do when a move target already exists at the destination.
///
/// None of the variants overwrite existing content: `Rename` picks a free
/// numbered name, `Skip` and `Fail` both leave the source file in place
/// (`Fail` additionally records the collision as an error for the caller).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CollisionPolicy {
    #[default]
    Rename,
    Skip,
    Fail,
}

/// A file the mover could not relocate, with the cause. Never fatal to the
/// batch; aggregated by the caller.
#[derive(Debug, Clone)]
pub struct SkippedFile {
    pub path: PathBuf,
    pub reason: String,
}

/// Result of one move batch.
#[derive(Debug, Default)]
pub struct MoveOutcome {
    pub moved: usize,
    pub skipped: Vec<SkippedFile>,
}

impl MoveOutcome {
    pub fn merge(&mut self, other: MoveOutcome) {
        self.moved += other.moved;
        self.skipped.extend(other.skipped);
    }
}

pub(crate) enum MoveResult {
    Moved(PathBuf),
    Skipped(String),
}

/// Move every immediate child of `source` whose name matches `selector` into
/// `dest`. Never recurses. A locked or otherwise unmovable file is recorded
/// and left in place; the batch continues.
pub fn move_matching(
    source: &Path,
    dest: &Path,
    selector: Selector,
    policy: CollisionPolicy,
) -> io::Result<MoveOutcome> {
    let mut outcome = MoveOutcome::default();

    for entry in fs::read_dir(source)? {
        let entry = entry?;
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        if !selector.matches(name) {
            continue;
        }

        match move_into(&path, dest, policy) {
            Ok(MoveResult::Moved(_)) => outcome.moved += 1,
            Ok(MoveResult::Skipped(reason)) => {
                warn!("Skipping '{}': {}", path.display(), reason);
                outcome.skipped.push(SkippedFile { path, reason });
            }
            Err(err) => {
                warn!("Could not move '{}': {}", path.display(), err);
                outcome.skipped.push(SkippedFile {
                    path,
                    reason: err.to_string(),
                });
            }
        }
    }

    Ok(outcome)
}

/// Relocate a single file or directory into `dest_dir`, resolving name
/// collisions per `policy`. Falls back to copy+delete for files when a plain
/// rename fails across filesystems.
pub(crate) fn move_into(
    path: &Path,
    dest_dir: &Path,
    policy: CollisionPolicy,
) -> io::Result<MoveResult> {
    let name = path
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("'{}' has no usable file name", path.display()),
            )
        })?;

    let Some(target) = available_target(dest_dir, name, policy) else {
        return Ok(MoveResult::Skipped(format!(
            "destination '{}' already exists",
            dest_dir.join(name).display()
        )));
    };

    match fs::rename(path, &target) {
        Ok(()) => Ok(MoveResult::Moved(target)),
        Err(err) if err.kind() == io::ErrorKind::PermissionDenied => Err(err),
        Err(err) => {
            if path.is_file() {
                fs::copy(path, &target)?;
                fs::remove_file(path)?;
                Ok(MoveResult::Moved(target))
            } else {
                Err(err)
            }
        }
    }
}

/// Pick the path to move to, or `None` when the occupied target means the
/// move must not happen under the given policy.
pub(crate) fn available_target(
    dest_dir: &Path,
    name: &str,
    policy: CollisionPolicy,
) -> Option<PathBuf> {
    let target = dest_dir.join(name);
    if !target.exists() {
        return Some(target);
    }
    match policy {
        CollisionPolicy::Rename => Some(numbered_target(dest_dir, name)),
        CollisionPolicy::Skip | CollisionPolicy::Fail => None,
    }
}

/// First free "name (n).ext" under `dest_dir`.
fn numbered_target(dest_dir: &Path, name: &str) -> PathBuf {
    let original = Path::new(name);
    let stem = original
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or(name);
    let suffix = original
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| format!(".{e}"))
        .unwrap_or_default();

    let mut n = 1u32;
    loop {
        let candidate = dest_dir.join(format!("{stem} ({n}){suffix}"));
        if !candidate.exists() {
            return candidate;
        }
        n += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::taxonomy::Selector;
    use tempfile::tempdir;

    #[test]
    fn test_move_matching_moves_only_matching_children() {
        let tmp = tempdir().unwrap();
        let source = tmp.path().join("src");
        let dest = tmp.path().join("dest");
        fs::create_dir_all(&source).unwrap();
        fs::create_dir_all(&dest).unwrap();

        fs::write(source.join("a.pdf"), "a").unwrap();
        fs::write(source.join("b.PDF"), "b").unwrap();
        fs::write(source.join("c.nc1"), "c").unwrap();

        let outcome = move_matching(
            &source,
            &dest,
            Selector::Extension("pdf"),
            CollisionPolicy::Rename,
        )
        .unwrap();

        assert_eq!(outcome.moved, 2);
        assert!(outcome.skipped.is_empty());
        assert!(dest.join("a.pdf").is_file());
        assert!(dest.join("b.PDF").is_file());
        assert!(source.join("c.nc1").is_file());
    }

    #[test]
    fn test_move_matching_does_not_recurse() {
        let tmp = tempdir().unwrap();
        let source = tmp.path().join("src");
        let nested = source.join("nested");
        let dest = tmp.path().join("dest");
        fs::create_dir_all(&nested).unwrap();
        fs::create_dir_all(&dest).unwrap();
        fs::write(nested.join("deep.pdf"), "deep").unwrap();

        let outcome = move_matching(
            &source,
            &dest,
            Selector::Extension("pdf"),
            CollisionPolicy::Rename,
        )
        .unwrap();

        assert_eq!(outcome.moved, 0);
        assert!(nested.join("deep.pdf").is_file());
    }

    #[test]
    fn test_collision_rename_appends_counter() {
        let tmp = tempdir().unwrap();
        let source = tmp.path().join("src");
        let dest = tmp.path().join("dest");
        fs::create_dir_all(&source).unwrap();
        fs::create_dir_all(&dest).unwrap();

        fs::write(dest.join("part.nc1"), "old").unwrap();
        fs::write(dest.join("part (1).nc1"), "older").unwrap();
        fs::write(source.join("part.nc1"), "new").unwrap();

        let outcome = move_matching(
            &source,
            &dest,
            Selector::Extension("nc1"),
            CollisionPolicy::Rename,
        )
        .unwrap();

        assert_eq!(outcome.moved, 1);
        assert_eq!(fs::read_to_string(dest.join("part (2).nc1")).unwrap(), "new");
        // Existing content untouched.
        assert_eq!(fs::read_to_string(dest.join("part.nc1")).unwrap(), "old");
    }

    #[test]
    fn test_collision_fail_leaves_source_in_place() {
        let tmp = tempdir().unwrap();
        let source = tmp.path().join("src");
        let dest = tmp.path().join("dest");
        fs::create_dir_all(&source).unwrap();
        fs::create_dir_all(&dest).unwrap();

        fs::write(dest.join("part.nc1"), "old").unwrap();
        fs::write(source.join("part.nc1"), "new").unwrap();

        let outcome = move_matching(
            &source,
            &dest,
            Selector::Extension("nc1"),
            CollisionPolicy::Fail,
        )
        .unwrap();

        assert_eq!(outcome.moved, 0);
        assert_eq!(outcome.skipped.len(), 1);
        assert!(source.join("part.nc1").is_file());
        assert_eq!(fs::read_to_string(dest.join("part.nc1")).unwrap(), "old");
    }

    #[test]
    fn test_numbered_target_without_extension() {
        let tmp = tempdir().unwrap();
        fs::write(tmp.path().join("README"), "x").unwrap();
        let target = available_target(tmp.path(), "README", CollisionPolicy::Rename).unwrap();
        assert_eq!(target, tmp.path().join("README (1)"));
    }
}
