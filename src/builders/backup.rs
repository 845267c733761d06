use anyhow::{Context, Result};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Keeps the pre-rewrite content of a file so nothing is lost if a sweep
/// goes wrong. The store is handed the original text immediately before the
/// engine overwrites the file; the sequence is deliberately not atomic — a
/// crash between the two writes leaves the original file unmodified.
pub trait BackupStore {
    /// Saves `original` for `path` and returns where it was stored.
    fn store(&mut self, path: &Path, original: &str) -> Result<PathBuf>;
}

/// Writes the backup next to the source file, as `<file>.<suffix>`.
///
/// Backups are created once per modified file and never deleted by the
/// tool; re-running a sweep overwrites the sibling with the then-current
/// original.
pub struct SiblingFileBackup {
    suffix: String,
}

impl SiblingFileBackup {
    pub fn new(suffix: &str) -> Self {
        Self {
            suffix: suffix.to_string(),
        }
    }

    fn backup_path(&self, path: &Path) -> PathBuf {
        let mut name = path.file_name().unwrap_or_default().to_os_string();
        name.push(format!(".{}", self.suffix));
        path.with_file_name(name)
    }
}

impl BackupStore for SiblingFileBackup {
    fn store(&mut self, path: &Path, original: &str) -> Result<PathBuf> {
        let backup_path = self.backup_path(path);
        fs::write(&backup_path, original)
            .with_context(|| format!("failed to write backup {}", backup_path.display()))?;
        Ok(backup_path)
    }
}

/// In-memory store, used by tests that only care about the engine's
/// backup-before-overwrite ordering.
pub struct MemoryBackup {
    pub saved: HashMap<PathBuf, String>,
}

impl MemoryBackup {
    pub fn new() -> Self {
        Self {
            saved: HashMap::new(),
        }
    }
}

impl Default for MemoryBackup {
    fn default() -> Self {
        Self::new()
    }
}

impl BackupStore for MemoryBackup {
    fn store(&mut self, path: &Path, original: &str) -> Result<PathBuf> {
        self.saved.insert(path.to_path_buf(), original.to_string());
        Ok(path.to_path_buf())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sibling_backup_path_appends_suffix() {
        let backup = SiblingFileBackup::new("bak");
        assert_eq!(
            backup.backup_path(Path::new("src/lib.rs")),
            PathBuf::from("src/lib.rs.bak")
        );
    }

    #[test]
    fn test_sibling_backup_writes_original() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("a.rs");
        fs::write(&file, "new content").unwrap();

        let mut backup = SiblingFileBackup::new("bak");
        let stored = backup.store(&file, "original content").unwrap();

        assert_eq!(stored, dir.path().join("a.rs.bak"));
        assert_eq!(fs::read_to_string(stored).unwrap(), "original content");
    }
}
