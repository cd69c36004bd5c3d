// JamfLens - core/discovery.rs
//
// Collects inventory CSV files below a directory so a whole export folder
// can be loaded as one batch.
//
// Only metadata is touched here; reading bytes belongs to the app layer.
// Unreadable entries become warnings. An excluded directory is pruned, not
// just hidden. The result is sorted by path.

use crate::util::constants;
use crate::util::error::DiscoveryError;
use std::path::{Path, PathBuf};
use walkdir::{DirEntry, WalkDir};

/// Limits and name patterns for a directory walk.
#[derive(Debug, Clone)]
pub struct DiscoveryConfig {
    /// Levels below the root to descend (1 = root's files only).
    pub max_depth: usize,

    /// More matches than this aborts the walk.
    pub max_files: usize,

    /// File-name globs to accept. Empty accepts every non-excluded file.
    pub include_patterns: Vec<String>,

    /// File and directory name globs to skip.
    pub exclude_patterns: Vec<String>,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        fn owned(patterns: &[&str]) -> Vec<String> {
            patterns.iter().map(|p| p.to_string()).collect()
        }
        Self {
            max_depth: constants::DEFAULT_MAX_DEPTH,
            max_files: constants::DEFAULT_MAX_FILES,
            include_patterns: owned(constants::DEFAULT_INCLUDE_PATTERNS),
            exclude_patterns: owned(constants::DEFAULT_EXCLUDE_PATTERNS),
        }
    }
}

/// Compiled include/exclude globs.
struct NameFilter {
    include: Vec<glob::Pattern>,
    exclude: Vec<glob::Pattern>,
}

impl NameFilter {
    fn new(config: &DiscoveryConfig) -> Self {
        Self {
            include: compile(&config.include_patterns),
            exclude: compile(&config.exclude_patterns),
        }
    }

    fn excluded(&self, name: &str) -> bool {
        self.exclude.iter().any(|p| p.matches(name))
    }

    /// Directories are walked unless excluded; the root is always walked.
    fn descend(&self, entry: &DirEntry) -> bool {
        entry.depth() == 0
            || !entry.file_type().is_dir()
            || !self.excluded(&entry.file_name().to_string_lossy())
    }

    fn accepts_file(&self, name: &str) -> bool {
        !self.excluded(name)
            && (self.include.is_empty() || self.include.iter().any(|p| p.matches(name)))
    }
}

fn compile(patterns: &[String]) -> Vec<glob::Pattern> {
    let mut compiled = Vec::with_capacity(patterns.len());
    for raw in patterns {
        match glob::Pattern::new(raw) {
            Ok(p) => compiled.push(p),
            Err(e) => tracing::warn!(pattern = %raw, error = %e, "Skipping invalid glob"),
        }
    }
    compiled
}

/// Walk `root` and return the matching CSV files (sorted) with any
/// non-fatal warnings.
pub fn discover_csv_files(
    root: &Path,
    config: &DiscoveryConfig,
) -> Result<(Vec<PathBuf>, Vec<String>), DiscoveryError> {
    match std::fs::metadata(root) {
        Ok(meta) if meta.is_dir() => {}
        Ok(_) => {
            return Err(DiscoveryError::NotADirectory {
                path: root.to_path_buf(),
            })
        }
        Err(_) => {
            return Err(DiscoveryError::RootNotFound {
                path: root.to_path_buf(),
            })
        }
    }

    let limit = config.max_files.min(constants::ABSOLUTE_MAX_FILES);
    let depth = config.max_depth.min(constants::ABSOLUTE_MAX_DEPTH);
    let names = NameFilter::new(config);

    let mut found: Vec<PathBuf> = Vec::new();
    let mut warnings: Vec<String> = Vec::new();

    let entries = WalkDir::new(root)
        .max_depth(depth)
        .into_iter()
        .filter_entry(|e| names.descend(e));

    for item in entries {
        let entry = match item {
            Ok(entry) => entry,
            Err(err) => {
                warnings.push(format!("Skipped unreadable entry: {err}"));
                continue;
            }
        };
        if !entry.file_type().is_file() {
            continue;
        }

        let Some(name) = entry.file_name().to_str() else {
            warnings.push(format!(
                "Skipped '{}': file name is not valid UTF-8",
                entry.path().display()
            ));
            continue;
        };
        if !names.accepts_file(name) {
            continue;
        }

        if found.len() == limit {
            return Err(DiscoveryError::MaxFilesExceeded { max: limit });
        }
        found.push(entry.into_path());
    }

    found.sort();
    tracing::info!(
        root = %root.display(),
        depth,
        files = found.len(),
        warnings = warnings.len(),
        "CSV inputs discovered"
    );
    Ok((found, warnings))
}
