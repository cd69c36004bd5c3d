// JamfLens - app/load.rs
//
// Turns command-line inputs (explicit files plus an optional directory to
// walk) into in-memory uploads. Per-file read failures are collected as
// IngestError::Io and never stop the batch.

use crate::core::discovery::{self, DiscoveryConfig};
use crate::core::ingest::Upload;
use crate::util::error::{DiscoveryError, IngestError};
use std::path::{Path, PathBuf};

/// Resolve the ordered list of input files.
///
/// Explicit files come first in the order given, followed by the sorted
/// discovery results for `dir`. A path listed twice is read once.
pub fn collect_inputs(
    files: &[PathBuf],
    dir: Option<&Path>,
    config: &DiscoveryConfig,
) -> Result<(Vec<PathBuf>, Vec<String>), DiscoveryError> {
    let mut inputs: Vec<PathBuf> = Vec::with_capacity(files.len());
    let mut warnings = Vec::new();

    for path in files {
        push_unique(&mut inputs, path.clone());
    }

    if let Some(root) = dir {
        let (found, walk_warnings) = discovery::discover_csv_files(root, config)?;
        warnings.extend(walk_warnings);
        for path in found {
            push_unique(&mut inputs, path);
        }
    }

    tracing::debug!(inputs = inputs.len(), "Input files resolved");
    Ok((inputs, warnings))
}

fn push_unique(inputs: &mut Vec<PathBuf>, path: PathBuf) {
    if !inputs.contains(&path) {
        inputs.push(path);
    }
}

/// Read each path into an upload, keeping batch order.
pub fn read_uploads(paths: &[PathBuf]) -> (Vec<Upload>, Vec<IngestError>) {
    let mut uploads = Vec::with_capacity(paths.len());
    let mut errors = Vec::new();

    for path in paths {
        let name = path.display().to_string();
        match std::fs::read(path) {
            Ok(bytes) => {
                tracing::debug!(file = %name, bytes = bytes.len(), "Read input file");
                uploads.push(Upload::new(name, bytes));
            }
            Err(e) => {
                tracing::warn!(file = %name, error = %e, "Cannot read input file");
                errors.push(IngestError::Io {
                    source_name: name,
                    source: e,
                });
            }
        }
    }

    (uploads, errors)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_explicit_files_precede_discovered_and_dedupe() {
        let dir = tempfile::tempdir().unwrap();
        let a = dir.path().join("a.csv");
        let b = dir.path().join("b.csv");
        fs::write(&a, "Computer Name\nPRO-1\n").unwrap();
        fs::write(&b, "Computer Name\nSEM-1\n").unwrap();

        let (inputs, warnings) =
            collect_inputs(&[b.clone()], Some(dir.path()), &DiscoveryConfig::default()).unwrap();
        assert!(warnings.is_empty());
        assert_eq!(inputs, vec![b, a]);
    }

    #[test]
    fn test_missing_file_becomes_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let good = dir.path().join("good.csv");
        fs::write(&good, "Computer Name\nPRO-1\n").unwrap();
        let missing = dir.path().join("missing.csv");

        let (uploads, errors) = read_uploads(&[missing, good]);
        assert_eq!(uploads.len(), 1);
        assert_eq!(errors.len(), 1);
        assert!(matches!(errors[0], IngestError::Io { .. }));
        assert!(errors[0].source_name().ends_with("missing.csv"));
    }
}
