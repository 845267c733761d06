use anyhow::{Context, Result};
use serde::Serialize;
use std::path::{Path, PathBuf};

/// One rewritten (or rewritable, in a dry run) file.
#[derive(Debug, Serialize)]
pub struct FileChange {
    pub path: PathBuf,
    pub matches: usize,
}

/// Outcome of a rewriting sweep across all candidate files.
#[derive(Debug, Serialize)]
pub struct RunSummary {
    pub tool: String,
    pub files_scanned: usize,
    pub total_matches: usize,
    pub applied: bool,
    pub changes: Vec<FileChange>,
}

impl RunSummary {
    pub fn new(tool: &str, applied: bool) -> Self {
        Self {
            tool: tool.to_string(),
            files_scanned: 0,
            total_matches: 0,
            applied,
            changes: Vec::new(),
        }
    }

    pub fn record(&mut self, path: PathBuf, matches: usize) {
        self.total_matches += matches;
        self.changes.push(FileChange { path, matches });
    }

    pub fn has_findings(&self) -> bool {
        self.total_matches > 0
    }
}

/// One finding of a report-only sweep, anchored to a file and line.
#[derive(Debug, Serialize)]
pub struct AuditFinding {
    pub path: PathBuf,
    pub line: usize,
    pub text: String,
    pub note: Option<String>,
}

/// Outcome of a report-only sweep.
#[derive(Debug, Serialize)]
pub struct AuditSummary {
    pub tool: String,
    pub files_scanned: usize,
    pub findings: Vec<AuditFinding>,
}

impl AuditSummary {
    pub fn new(tool: &str) -> Self {
        Self {
            tool: tool.to_string(),
            files_scanned: 0,
            findings: Vec::new(),
        }
    }

    pub fn has_findings(&self) -> bool {
        !self.findings.is_empty()
    }
}

pub trait SweepReporter {
    fn report_run(&self, summary: &RunSummary) -> Result<()>;
    fn report_audit(&self, summary: &AuditSummary) -> Result<()>;
}

/// Prints sweep results to standard output.
pub struct ConsoleReporter;

impl ConsoleReporter {
    pub fn new() -> Self {
        Self
    }
}

impl Default for ConsoleReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl SweepReporter for ConsoleReporter {
    fn report_run(&self, summary: &RunSummary) -> Result<()> {
        println!("🧹 codesweep — {}", summary.tool);

        if summary.changes.is_empty() {
            println!("✓ No matches found ({} files scanned).", summary.files_scanned);
            return Ok(());
        }

        println!("Files with changes:");
        for change in &summary.changes {
            println!(
                "  🟡 {} ({} matches)",
                change.path.display(),
                change.matches
            );
        }

        println!("\n📈 Summary:");
        println!("  Files scanned: {}", summary.files_scanned);
        println!("  Files with matches: {}", summary.changes.len());
        println!("  Total matches: {}", summary.total_matches);

        if summary.applied {
            println!("  ✓ Changes written; originals kept as sibling backups");
        } else {
            println!("\nRun with --apply to write changes to files.");
        }

        Ok(())
    }

    fn report_audit(&self, summary: &AuditSummary) -> Result<()> {
        println!("🧹 codesweep — {}", summary.tool);

        if summary.findings.is_empty() {
            println!("✓ No findings ({} files scanned).", summary.files_scanned);
            return Ok(());
        }

        println!("Findings:");
        for finding in &summary.findings {
            match &finding.note {
                Some(note) => println!(
                    "  {}:{}: ({note}) {}",
                    finding.path.display(),
                    finding.line,
                    finding.text
                ),
                None => println!(
                    "  {}:{}: {}",
                    finding.path.display(),
                    finding.line,
                    finding.text
                ),
            }
        }

        println!("\n📈 Summary:");
        println!("  Files scanned: {}", summary.files_scanned);
        println!("  Findings: {}", summary.findings.len());

        Ok(())
    }
}

/// Writes a summary to `path`, picking the format from the file extension
/// (`.json`, `.yaml`/`.yml`, anything else is TOML).
pub fn export_summary<T: Serialize>(summary: &T, path: &Path) -> Result<()> {
    let format = path
        .extension()
        .and_then(|ext| ext.to_str())
        .unwrap_or("toml");

    let content = match format {
        "json" => serde_json::to_string_pretty(summary).context("Failed to serialize to JSON")?,
        "yaml" | "yml" => serde_yaml::to_string(summary).context("Failed to serialize to YAML")?,
        _ => toml::to_string_pretty(summary).context("Failed to serialize to TOML")?,
    };

    std::fs::write(path, content)
        .with_context(|| format!("Failed to write report {}", path.display()))?;

    Ok(())
}
