use crate::job::JobFolder;
use crate::taxonomy::Destination;
use std::fs;
use std::path::Path;
use tracing::{debug, info, warn};

/// Which optional resources ended up staged in the job folder.
#[derive(Debug, Default)]
pub struct StagedResources {
    pub companion: bool,
    pub template: bool,
}

/// Stage the companion tool into the job root and the template spreadsheet
/// into MATERIAL. Both are optional: a missing source is a warning, a
/// previously staged copy is left alone.
pub fn stage(
    job: &JobFolder,
    companion_executable: Option<&Path>,
    template_spreadsheet: Option<&Path>,
) -> StagedResources {
    let mut staged = StagedResources::default();

    if let Some(source) = companion_executable {
        staged.companion = stage_file(source, job.root());
    }
    if let Some(source) = template_spreadsheet {
        staged.template = stage_file(source, &job.destination_dir(Destination::Material));
    }
    staged
}

fn stage_file(source: &Path, dest_dir: &Path) -> bool {
    if !source.is_file() {
        warn!("Resource '{}' not found", source.display());
        return false;
    }
    let Some(name) = source.file_name() else {
        warn!("Resource '{}' has no file name", source.display());
        return false;
    };
    let target = dest_dir.join(name);
    if target.exists() {
        debug!("Resource '{}' already staged", target.display());
        return true;
    }
    match fs::copy(source, &target) {
        Ok(_) => {
            info!("Staged '{}' into '{}'", source.display(), dest_dir.display());
            true
        }
        Err(err) => {
            warn!("Could not stage '{}': {}", source.display(), err);
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_stage_copies_into_expected_locations() {
        let tmp = tempdir().unwrap();
        let exe = tmp.path().join("remarks.exe");
        let template = tmp.path().join("Material_Takeoff.xlsm");
        fs::write(&exe, "bin").unwrap();
        fs::write(&template, "xlsm").unwrap();

        let job = JobFolder::new(tmp.path().join("job"));
        job.ensure_layout().unwrap();

        let staged = stage(&job, Some(&exe), Some(&template));
        assert!(staged.companion);
        assert!(staged.template);
        assert!(job.root().join("remarks.exe").is_file());
        assert!(job
            .destination_dir(Destination::Material)
            .join("Material_Takeoff.xlsm")
            .is_file());
    }

    #[test]
    fn test_missing_resources_are_warnings_not_failures() {
        let tmp = tempdir().unwrap();
        let job = JobFolder::new(tmp.path().join("job"));
        job.ensure_layout().unwrap();

        let staged = stage(
            &job,
            Some(Path::new("/nonexistent/remarks.exe")),
            None,
        );
        assert!(!staged.companion);
        assert!(!staged.template);
    }
}
