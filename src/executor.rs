//! Measuring and deleting the entries matched by cleanup patterns.

use crate::report::{Reporter, PLUGIN_NAME};
use crate::resolver::resolve;

use humansize::{format_size, BINARY};
use std::collections::HashMap;
use std::fs;
use std::io;
use std::ops::AddAssign;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;
use walkdir::WalkDir;

/// Savings accumulated over one cleanup invocation
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CleanupResult {
    pub bytes_freed: u64,
    /// One per matched entry; a removed directory counts once
    pub files_removed: u64,
}

impl CleanupResult {
    pub fn kilobytes_freed(&self) -> u64 {
        self.bytes_freed / 1024
    }
}

impl AddAssign for CleanupResult {
    fn add_assign(&mut self, other: Self) {
        self.bytes_freed += other.bytes_freed;
        self.files_removed += other.files_removed;
    }
}

/// Options controlling deletion behavior (runtime flags)
#[derive(Debug, Clone, Copy, Default)]
pub struct CleanOptions {
    /// Measure and report matches without deleting them
    pub dry_run: bool,
}

/// A failure on one matched path. The batch continues past it.
#[derive(Debug, Error)]
pub enum CleanupError {
    #[error("Unable to read {path}: {source}")]
    Measure {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("Unable to remove {path}: {source}")]
    Remove {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Size of an entry without following symlinks. Directories report the
/// total of the regular files below them; symlinks count as zero.
pub fn entry_size(path: &Path) -> io::Result<u64> {
    let metadata = fs::symlink_metadata(path)?;

    if metadata.is_symlink() {
        return Ok(0);
    }

    if !metadata.is_dir() {
        return Ok(metadata.len());
    }

    let total = WalkDir::new(path)
        .follow_links(false)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .filter_map(|e| e.metadata().ok())
        .map(|m| m.len())
        .sum();

    Ok(total)
}

/// Remove an entry, recursing into real directories only
pub fn remove_entry(path: &Path) -> io::Result<()> {
    let metadata = fs::symlink_metadata(path)?;

    if metadata.is_dir() {
        fs::remove_dir_all(path)
    } else {
        fs::remove_file(path)
    }
}

/// Entries a dry run has already counted, with the bytes attributed to each.
///
/// A real run deletes an entry on its first match, so later patterns never
/// see it again. A dry run leaves everything in place and uses this ledger to
/// reach the same totals.
#[derive(Debug, Default)]
pub struct DryRunLedger {
    counted: HashMap<PathBuf, u64>,
}

impl DryRunLedger {
    /// The path itself or one of its ancestors was already counted
    fn covers(&self, path: &Path) -> bool {
        self.counted.keys().any(|counted| path.starts_with(counted))
    }

    /// Bytes already attributed to entries below `path`
    fn counted_below(&self, path: &Path) -> u64 {
        self.counted
            .iter()
            .filter(|(counted, _)| counted.starts_with(path))
            .map(|(_, size)| size)
            .sum()
    }

    fn record(&mut self, path: &Path, size: u64) {
        self.counted.insert(path.to_path_buf(), size);
    }
}

fn clean_path<F>(
    path: &Path,
    options: CleanOptions,
    ledger: &mut DryRunLedger,
    reporter: &mut dyn Reporter,
    remove: &mut F,
) -> Result<u64, CleanupError>
where
    F: FnMut(&Path) -> io::Result<()>,
{
    let size = entry_size(path).map_err(|source| CleanupError::Measure {
        path: path.to_path_buf(),
        source,
    })?;

    if options.dry_run {
        let size = size.saturating_sub(ledger.counted_below(path));
        ledger.record(path, size);
        reporter.info(&format!(
            "Would remove: {} ({})",
            path.display(),
            format_size(size, BINARY)
        ));
        return Ok(size);
    }

    remove(path).map_err(|source| CleanupError::Remove {
        path: path.to_path_buf(),
        source,
    })?;

    debug!(path = %path.display(), size = %format_size(size, BINARY), "Removed");
    Ok(size)
}

/// Resolve every pattern under `root` and delete what it matches.
///
/// Each path is measured before removal and only counted once it is gone.
/// Failures are sent to the reporter's error channel and skipped.
pub fn clean(
    root: &Path,
    patterns: &[String],
    options: CleanOptions,
    reporter: &mut dyn Reporter,
) -> CleanupResult {
    clean_into(root, patterns, options, &mut DryRunLedger::default(), reporter)
}

/// Like [`clean`], sharing a dry-run ledger across several pattern lists
/// applied to the same root.
pub fn clean_into(
    root: &Path,
    patterns: &[String],
    options: CleanOptions,
    ledger: &mut DryRunLedger,
    reporter: &mut dyn Reporter,
) -> CleanupResult {
    clean_with(root, patterns, options, ledger, reporter, remove_entry)
}

fn clean_with<F>(
    root: &Path,
    patterns: &[String],
    options: CleanOptions,
    ledger: &mut DryRunLedger,
    reporter: &mut dyn Reporter,
    mut remove: F,
) -> CleanupResult
where
    F: FnMut(&Path) -> io::Result<()>,
{
    let mut result = CleanupResult::default();

    for pattern in patterns {
        for path in resolve(root, pattern) {
            if options.dry_run && ledger.covers(&path) {
                continue;
            }

            match clean_path(&path, options, ledger, reporter, &mut remove) {
                Ok(size) => {
                    result.bytes_freed += size;
                    result.files_removed += 1;
                }
                Err(err) => {
                    reporter.error(&format!("{}: Error occurred: {}", PLUGIN_NAME, err));
                }
            }
        }
    }

    result
}
