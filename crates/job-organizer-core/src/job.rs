use crate::taxonomy::{Destination, SCRATCH_DIR_NAME};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// One unit of work: the root directory holding a job's raw deliverables and
/// the fixed set of destination subfolders.
#[derive(Debug, Clone)]
pub struct JobFolder {
    root: PathBuf,
}

impl JobFolder {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Create the job root and every destination subfolder. Idempotent; the
    /// scratch directory is not created here, it appears lazily on first
    /// extraction.
    pub fn ensure_layout(&self) -> io::Result<()> {
        for destination in Destination::ALL {
            fs::create_dir_all(self.destination_dir(destination))?;
        }
        Ok(())
    }

    pub fn destination_dir(&self, destination: Destination) -> PathBuf {
        self.root.join(destination.folder_name())
    }

    pub fn scratch_dir(&self) -> PathBuf {
        self.root.join(SCRATCH_DIR_NAME)
    }
}
