use std::path::{Path, PathBuf};

use tracing::debug;

use crate::prep::PrepError;

/// Name fragments marking a read file; they also match the `.gz` forms.
pub const FASTQ_MARKERS: &[&str] = &[".fastq", ".fq"];

/// Check whether a file name carries a FASTQ marker
#[must_use]
pub fn is_fastq_name(name: &str) -> bool {
    FASTQ_MARKERS.iter().any(|marker| name.contains(marker))
}

/// Recursively collect every read file below `root`, sorted by path.
///
/// # Errors
///
/// Returns `PrepError::Pattern` if the root cannot be turned into a glob
/// pattern, or `PrepError::Walk` if a directory below it cannot be read.
pub fn discover(root: &Path) -> Result<Vec<PathBuf>, PrepError> {
    let escaped = glob::Pattern::escape(&root.to_string_lossy());
    let pattern = format!("{escaped}/**/*");

    let mut paths = Vec::new();
    for entry in glob::glob(&pattern)? {
        let path = entry?;
        let is_match = path
            .file_name()
            .is_some_and(|name| is_fastq_name(&name.to_string_lossy()));
        if is_match && path.is_file() {
            paths.push(path);
        }
    }
    paths.sort();

    debug!(
        root = %root.display(),
        files = paths.len(),
        "Found read files"
    );
    Ok(paths)
}
