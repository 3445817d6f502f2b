use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::error::AppError;

/// Name of the single output file written under the output directory.
pub const OUTPUT_FILE_NAME: &str = "flat_jobs_list.csv";

/// Result of the pre-flight existence check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Preflight {
    /// No output yet; the run should go ahead and write to this path.
    Proceed(PathBuf),
    /// Output already present at this path; the run is a no-op.
    Exists(PathBuf),
}

/// Check whether `<output_dir>/flat_jobs_list.csv` is already on disk.
///
/// Only looks at the filesystem; never creates anything. Symlinks are not
/// followed, so a dangling link still counts as existing output. Any lookup
/// failure other than "not found" is returned as an error.
pub fn check_output(output_dir: &Path) -> Result<Preflight, AppError> {
    let path = output_dir.join(OUTPUT_FILE_NAME);
    match std::fs::symlink_metadata(&path) {
        Ok(_) => Ok(Preflight::Exists(path)),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(Preflight::Proceed(path)),
        Err(e) => Err(AppError::IoError(e)),
    }
}
