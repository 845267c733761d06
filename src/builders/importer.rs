use anyhow::{Context, Result};
use std::fs;

/// A source of extra exclusion entries for the scanner.
///
/// Implementations parse some external format into plain directory names
/// that the traversal will prune, so teams can reuse lists they already
/// maintain instead of duplicating them in `.codesweep.toml`.
pub trait ExclusionImporter {
    /// Reads exclusion entries from a file and returns the usable ones.
    fn import_from_file(&mut self, file_path: &str) -> Result<Vec<String>>;
}

/// Imports exclusions from a `.gitignore`-style file.
///
/// Only entries that reduce to a plain name are usable: the scanner prunes
/// by directory name, not by glob. Comments, blank lines, negations and
/// wildcard patterns are skipped.
pub struct GitignoreImporter;

impl GitignoreImporter {
    pub fn new() -> Self {
        Self
    }
}

impl Default for GitignoreImporter {
    fn default() -> Self {
        Self::new()
    }
}

impl ExclusionImporter for GitignoreImporter {
    fn import_from_file(&mut self, file_path: &str) -> Result<Vec<String>> {
        let content = fs::read_to_string(file_path).context("Failed to read import file")?;

        let mut entries = Vec::new();
        for line in content.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            if line.starts_with('!') || line.contains('*') || line.contains('?') {
                tracing::debug!("skipping unsupported gitignore entry {line:?}");
                continue;
            }

            // `build/` and `a/b/build` both reduce to the final segment.
            let name = line.trim_end_matches('/');
            let name = name.rsplit('/').next().unwrap_or(name);
            if !name.is_empty() {
                entries.push(name.to_string());
            }
        }

        Ok(entries)
    }
}
