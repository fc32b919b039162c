//! Collect the distinct translatable values of a resource tree.

use crate::resx::{extract_values, is_resx_file};
use anyhow::{bail, Result};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use walkdir::{DirEntry, WalkDir};

/// Insertion-ordered set of distinct, non-empty values.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DistinctValues {
    values: Vec<String>,
    seen: HashSet<String>,
}

impl DistinctValues {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a value; returns `false` if it was empty or already present.
    pub fn insert(&mut self, value: String) -> bool {
        if value.is_empty() || self.seen.contains(&value) {
            return false;
        }
        self.seen.insert(value.clone());
        self.values.push(value);
        true
    }

    pub fn contains(&self, value: &str) -> bool {
        self.seen.contains(value)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, String> {
        self.values.iter()
    }

    pub fn as_slice(&self) -> &[String] {
        &self.values
    }
}

impl<'a> IntoIterator for &'a DistinctValues {
    type Item = &'a String;
    type IntoIter = std::slice::Iter<'a, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Every entry under `root` in sorted path order, root included.
///
/// Entries that cannot be accessed are skipped with a warning; the scan and
/// the rewrite both walk through here so they see the same tree.
pub fn walk_tree(root: &Path) -> impl Iterator<Item = DirEntry> {
    WalkDir::new(root)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|entry| match entry {
            Ok(e) => Some(e),
            Err(e) => {
                warn!("Cannot access path: {}", e);
                None
            }
        })
}

/// Result of scanning a resource tree.
#[derive(Debug, Clone, Default)]
pub struct ScanOutcome {
    pub values: DistinctValues,
    /// Resource files whose values were collected
    pub files_scanned: usize,
    /// Resource files skipped because they could not be read or parsed
    pub skipped: Vec<PathBuf>,
}

/// Walk `root` recursively and collect the distinct values of every resource file.
///
/// Files are visited in sorted path order so the value order is reproducible.
/// A missing root is an error; unreadable or malformed files are skipped with
/// a warning.
pub fn collect_distinct_values(root: &Path) -> Result<ScanOutcome> {
    if !root.is_dir() {
        bail!("Source resources path {} is not a directory", root.display());
    }

    let mut outcome = ScanOutcome::default();

    for entry in walk_tree(root) {
        let path = entry.path();
        if !entry.file_type().is_file() || !is_resx_file(path) {
            continue;
        }

        let content = match std::fs::read_to_string(path) {
            Ok(c) => c,
            Err(e) => {
                warn!("Skipping {}: {}", path.display(), e);
                outcome.skipped.push(path.to_path_buf());
                continue;
            }
        };

        match extract_values(&content) {
            Ok(values) => {
                debug!("{}: {} values", path.display(), values.len());
                for value in values {
                    outcome.values.insert(value);
                }
                outcome.files_scanned += 1;
            }
            Err(e) => {
                warn!("Skipping {}: {}", path.display(), e);
                outcome.skipped.push(path.to_path_buf());
            }
        }
    }

    Ok(outcome)
}
