use anyhow::{Context, Result};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::builders::backup::{BackupStore, MemoryBackup, SiblingFileBackup};
use crate::builders::reporter::{AuditFinding, AuditSummary, RunSummary};
use crate::core::config::{BackupStrategy, SweepConfig};
use crate::core::git::{Git2Client, GitClient};

/// Result of running a rewriting sweep over one file's text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RewriteOutcome {
    /// The transformed text. Equal to the input when nothing matched.
    pub text: String,
    /// Number of distinct matches transformed.
    pub matches: usize,
}

/// A sweep that rewrites file content (doc-fences, todos, dead-tests).
///
/// Implementations are pure text transforms; the engine owns reading,
/// backups, and writing, so a rewriter never touches the filesystem.
pub trait FileRewriter {
    /// Tool name used in reports.
    fn name(&self) -> &str;

    /// Transforms the file text, returning the new text and match count.
    fn rewrite(&self, input: &str) -> RewriteOutcome;
}

/// One report-only finding inside a file.
#[derive(Debug, Clone)]
pub struct Finding {
    /// 1-based line number of the first line of the finding.
    pub line: usize,
    /// The offending statement, whitespace-collapsed for display.
    pub text: String,
    /// Optional qualifier (e.g. which detector or segment matched).
    pub note: Option<String>,
}

/// A sweep that reports findings without rewriting (split-uses).
pub trait FileAuditor {
    /// Tool name used in reports.
    fn name(&self) -> &str;

    /// Scans the file text and returns its findings.
    fn audit(&self, input: &str) -> Vec<Finding>;
}

/// Per-invocation switches shared by all scanning subcommands.
#[derive(Debug, Clone, Copy, Default)]
pub struct RunOptions {
    /// Descend into subdirectories of directory arguments.
    pub recursive: bool,
    /// Restrict candidates to files git reports as changed.
    pub changed_only: bool,
    /// Write changes back (rewriting sweeps only); dry-run otherwise.
    pub apply: bool,
}

/// Drives a sweep across the candidate files.
///
/// The engine walks the argument paths, filters to the configured source
/// extension, feeds each file to the tool, and (for rewriting sweeps under
/// `--apply`) performs the backup-then-overwrite sequence. A backup is
/// written before the corresponding file is overwritten, and only when at
/// least one change was detected. Files are processed one at a time; a
/// failure on one file never aborts the run.
pub struct SweepEngine {
    config: SweepConfig,
    backup: Box<dyn BackupStore>,
}

impl SweepEngine {
    pub fn new(config: SweepConfig) -> Self {
        let backup: Box<dyn BackupStore> = match config.backup.strategy {
            BackupStrategy::Sibling => Box::new(SiblingFileBackup::new(&config.backup.suffix)),
            BackupStrategy::Memory => Box::new(MemoryBackup::new()),
        };
        Self { config, backup }
    }

    /// Builds an engine with an explicit backup store (used by tests).
    pub fn with_backup(config: SweepConfig, backup: Box<dyn BackupStore>) -> Self {
        Self { config, backup }
    }

    pub fn config(&self) -> &SweepConfig {
        &self.config
    }

    /// Runs a rewriting sweep.
    pub fn run_rewriter(
        &mut self,
        rewriter: &dyn FileRewriter,
        paths: &[PathBuf],
        options: RunOptions,
    ) -> Result<RunSummary> {
        let files = self.collect_files(paths, options)?;
        let mut summary = RunSummary::new(rewriter.name(), options.apply);

        for file in files {
            let original = match fs::read_to_string(&file) {
                Ok(text) => text,
                Err(err) => {
                    tracing::debug!("skipping unreadable file {}: {err}", file.display());
                    continue;
                }
            };
            summary.files_scanned += 1;

            let outcome = rewriter.rewrite(&original);
            if outcome.matches == 0 || outcome.text == original {
                continue;
            }

            if options.apply
                && let Err(err) = self.write_with_backup(&file, &original, &outcome.text)
            {
                eprintln!("Failed to rewrite {}: {err:#}", file.display());
                continue;
            }
            summary.record(file, outcome.matches);
        }

        Ok(summary)
    }

    /// Runs a report-only sweep.
    pub fn run_auditor(
        &self,
        auditor: &dyn FileAuditor,
        paths: &[PathBuf],
        options: RunOptions,
    ) -> Result<AuditSummary> {
        let files = self.collect_files(paths, options)?;
        let mut summary = AuditSummary::new(auditor.name());

        for file in files {
            let text = match fs::read_to_string(&file) {
                Ok(text) => text,
                Err(err) => {
                    tracing::debug!("skipping unreadable file {}: {err}", file.display());
                    continue;
                }
            };
            summary.files_scanned += 1;

            for finding in auditor.audit(&text) {
                summary.findings.push(AuditFinding {
                    path: file.clone(),
                    line: finding.line,
                    text: finding.text,
                    note: finding.note,
                });
            }
        }

        Ok(summary)
    }

    fn write_with_backup(&mut self, path: &Path, original: &str, new_text: &str) -> Result<()> {
        let backup_path = self.backup.store(path, original)?;
        tracing::debug!("backup for {} at {}", path.display(), backup_path.display());
        fs::write(path, new_text).with_context(|| format!("failed to write {}", path.display()))?;
        Ok(())
    }

    /// Resolves the argument paths into the list of candidate files.
    ///
    /// Explicit file arguments are taken as-is. Directory arguments list
    /// their top-level source files, or the whole subtree with
    /// `--recursive`, pruning the ignored directory names. Anything else is
    /// reported to stderr and skipped.
    pub fn collect_files(&self, paths: &[PathBuf], options: RunOptions) -> Result<Vec<PathBuf>> {
        let ignored: HashSet<&str> = self
            .config
            .scan
            .ignored_dirs
            .iter()
            .map(String::as_str)
            .collect();
        let mut files = Vec::new();

        for path in paths {
            if path.is_file() {
                files.push(path.clone());
            } else if path.is_dir() {
                if options.recursive {
                    self.walk_tree(path, &ignored, &mut files);
                } else {
                    self.list_dir(path, &mut files)?;
                }
            } else {
                eprintln!("Skipping unknown path: {}", path.display());
            }
        }

        if options.changed_only {
            let git = Git2Client::discover(".")?;
            let changed = canonical_set(&git.changed_files()?);
            files.retain(|f| match fs::canonicalize(f) {
                Ok(abs) => changed.contains(&abs),
                Err(_) => false,
            });
        }

        Ok(files)
    }

    fn walk_tree(&self, root: &Path, ignored: &HashSet<&str>, files: &mut Vec<PathBuf>) {
        let walker = WalkDir::new(root)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|entry| {
                let pruned = entry.file_type().is_dir()
                    && entry
                        .file_name()
                        .to_str()
                        .is_some_and(|name| ignored.contains(name));
                if pruned {
                    tracing::debug!("pruning {}", entry.path().display());
                }
                !pruned
            });

        for entry in walker {
            match entry {
                Ok(entry) => {
                    if entry.file_type().is_file() && self.has_source_extension(entry.path()) {
                        files.push(entry.into_path());
                    }
                }
                Err(err) => tracing::debug!("walk error under {}: {err}", root.display()),
            }
        }
    }

    fn list_dir(&self, dir: &Path, files: &mut Vec<PathBuf>) -> Result<()> {
        let entries = fs::read_dir(dir)
            .with_context(|| format!("failed to list directory {}", dir.display()))?;
        let mut found = Vec::new();
        for entry in entries {
            let path = entry?.path();
            if path.is_file() && self.has_source_extension(&path) {
                found.push(path);
            }
        }
        found.sort();
        files.extend(found);
        Ok(())
    }

    fn has_source_extension(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext == self.config.scan.extension)
    }
}

fn canonical_set(paths: &[PathBuf]) -> HashSet<PathBuf> {
    paths
        .iter()
        .filter_map(|p| fs::canonicalize(p).ok())
        .collect()
}
