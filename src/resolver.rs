//! Glob expansion of cleanup patterns against a package's install root.

use glob::{MatchOptions, Pattern};
use std::ffi::OsStr;
use std::path::{Component, Path, PathBuf};
use tracing::{debug, warn};

/// Case-sensitive, and `*` or `?` never cross a separator. The leading-dot
/// rule is enforced per segment in [`respects_leading_dots`], since the glob
/// crate's own option also hides dotfiles from segments like `.*lint`.
const MATCH_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: true,
    require_literal_separator: true,
    require_literal_leading_dot: false,
};

/// Strip surrounding whitespace and any leading separators, so a pattern is
/// always relative to the install root.
pub fn normalize_pattern(pattern: &str) -> &str {
    pattern.trim().trim_start_matches(['/', '\\'])
}

/// A pattern may not address the root itself or step outside of it.
fn is_contained(pattern: &str) -> bool {
    if pattern.is_empty() {
        return false;
    }

    Path::new(pattern)
        .components()
        .all(|c| matches!(c, Component::Normal(_)))
}

/// Expand `pattern` against the entries under `root`.
///
/// Never fails: an unknown root, a rejected pattern or an expansion error
/// all yield an empty list. Results are sorted per directory level.
pub fn resolve(root: &Path, pattern: &str) -> Vec<PathBuf> {
    if root.as_os_str().is_empty() {
        return Vec::new();
    }

    let relative = normalize_pattern(pattern);
    if !is_contained(relative) {
        warn!(pattern, "Ignoring pattern that escapes the install root");
        return Vec::new();
    }

    let Some(root_str) = root.to_str() else {
        debug!(root = %root.display(), "Install root is not valid UTF-8, skipping");
        return Vec::new();
    };

    let full_pattern = format!(
        "{}{}{}",
        Pattern::escape(root_str),
        std::path::MAIN_SEPARATOR,
        relative
    );

    let paths = match glob::glob_with(&full_pattern, MATCH_OPTIONS) {
        Ok(paths) => paths,
        Err(err) => {
            debug!(pattern = %full_pattern, %err, "Invalid glob pattern");
            return Vec::new();
        }
    };

    // A single unreadable directory voids the whole pattern
    let matches = match paths.collect::<Result<Vec<_>, _>>() {
        Ok(matches) => matches,
        Err(err) => {
            debug!(pattern = %full_pattern, %err, "Glob expansion failed, treating as no match");
            return Vec::new();
        }
    };

    let segments: Vec<&str> = relative
        .split(['/', '\\'])
        .filter(|segment| !segment.is_empty())
        .collect();
    let matches = matches
        .into_iter()
        .filter(|path| respects_leading_dots(root, &segments, path));

    // Only the first segment is guaranteed to sit under the root; deeper
    // segments may pass through symlinked directories.
    if segments.len() > 1 {
        let Ok(canonical_root) = root.canonicalize() else {
            return Vec::new();
        };
        matches
            .filter(|path| is_within(path, &canonical_root))
            .collect()
    } else {
        matches.collect()
    }
}

/// A name starting with `.` only matches a segment that starts with `.` too.
/// The `.` and `..` entries never match, so `.*` cannot reach the parent.
fn respects_leading_dots(root: &Path, segments: &[&str], path: &Path) -> bool {
    let Ok(below_root) = path.strip_prefix(root) else {
        return false;
    };

    let names: Vec<&OsStr> = below_root
        .components()
        .map_while(|component| match component {
            Component::Normal(name) => Some(name),
            _ => None,
        })
        .collect();

    if names.len() != segments.len() || below_root.components().count() != names.len() {
        return false;
    }

    names.iter().zip(segments).all(|(name, segment)| {
        !name.to_string_lossy().starts_with('.') || segment.starts_with('.')
    })
}

fn is_within(path: &Path, canonical_root: &Path) -> bool {
    path.parent()
        .and_then(|parent| parent.canonicalize().ok())
        .is_some_and(|parent| parent.starts_with(canonical_root))
}
