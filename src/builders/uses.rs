use anyhow::{Context, Result};
use regex::Regex;

use crate::core::engine::{FileAuditor, Finding};

/// A `use` statement whose braced group splits module paths, e.g.
/// `use foo::{bar::S1, baz::S2};`. Matched against the whitespace-collapsed
/// statement.
pub const SPLIT_USE_PATTERN: &str =
    r"^\s*(?:pub\s+)?use\s+[A-Za-z0-9_:]+::\{[^}]*::[^}]*\}.*;";

/// A `use` statement with path depth >= 3 (opt-in detector).
pub const DEEP_USE_PATTERN: &str =
    r"^\s*(?:pub\s+)?use\s+[A-Za-z0-9_]+(?:::[A-Za-z0-9_]+)?::(?:[A-Za-z0-9_]+::){2,}[A-Za-z0-9_]+.*;";

/// Configuration for the split-uses sweep.
#[derive(Debug, Clone, Default)]
pub struct UseOptions {
    /// Also run the depth-based (>= 3 segments) detector.
    pub deep: bool,
    /// Report statements containing any of these path segments.
    pub segments: Vec<String>,
    /// Path prefixes to skip, e.g. `std` or `crate::types`. A prefix of the
    /// form `crate::x` is compared against the statement's first two
    /// segments, anything else against the first.
    pub ignore_prefixes: Vec<String>,
}

/// Detects `use` statements that split module paths with braces, plus the
/// opt-in deep-path and segment-search variants.
///
/// Statements spanning multiple lines are collected first by tracking brace
/// balance until a semicolon on balanced braces, then the collapsed
/// statement is matched, so a formatted multi-line group is judged the same
/// as its single-line form.
pub struct UseAuditor {
    split: Regex,
    deep: Regex,
    options: UseOptions,
}

impl UseAuditor {
    pub fn new(options: UseOptions) -> Result<Self> {
        Ok(Self {
            split: Regex::new(SPLIT_USE_PATTERN).context("invalid split-use pattern")?,
            deep: Regex::new(DEEP_USE_PATTERN).context("invalid deep-use pattern")?,
            options,
        })
    }

    fn is_ignored(&self, statement: &str) -> bool {
        let Some(prefix) = statement_prefix(statement) else {
            return true;
        };
        self.options
            .ignore_prefixes
            .iter()
            .any(|ip| prefix == *ip || prefix.starts_with(&format!("{ip}::")))
    }
}

impl FileAuditor for UseAuditor {
    fn name(&self) -> &str {
        "split-uses"
    }

    fn audit(&self, input: &str) -> Vec<Finding> {
        let lines: Vec<&str> = input.lines().collect();
        let mut findings = Vec::new();
        let mut idx = 0;

        while idx < lines.len() {
            let trimmed = lines[idx].trim_start();
            let is_use = trimmed.starts_with("use ") || trimmed.starts_with("pub use ");
            if !is_use {
                idx += 1;
                continue;
            }

            let (statement, end) = collect_use_statement(&lines, idx);
            let collapsed = collapse(&statement);

            if !self.is_ignored(&collapsed) {
                if self.split.is_match(&collapsed) {
                    findings.push(Finding {
                        line: idx + 1,
                        text: collapsed.clone(),
                        note: Some("split".to_string()),
                    });
                }
                if self.options.deep && self.deep.is_match(&collapsed) {
                    findings.push(Finding {
                        line: idx + 1,
                        text: collapsed.clone(),
                        note: Some("deep".to_string()),
                    });
                }
                if let Some(path_part) = path_part(&collapsed) {
                    for segment in &self.options.segments {
                        if contains_segment(path_part, segment) {
                            findings.push(Finding {
                                line: idx + 1,
                                text: collapsed.clone(),
                                note: Some(format!("segment {segment}")),
                            });
                            break;
                        }
                    }
                }
            }

            idx = end + 1;
        }

        findings
    }
}

/// Collects a `use` statement that may span multiple lines. Lines are
/// appended until a semicolon appears on balanced braces (or the file
/// ends). Returns the combined text and the last consumed line index.
fn collect_use_statement(lines: &[&str], start: usize) -> (String, usize) {
    let mut text = lines[start].to_string();
    let mut balance = brace_balance(lines[start]);
    let mut idx = start;

    while (!text.contains(';') || balance > 0) && idx + 1 < lines.len() {
        idx += 1;
        text.push('\n');
        text.push_str(lines[idx]);
        balance += brace_balance(lines[idx]);
    }

    (text, idx)
}

fn brace_balance(line: &str) -> i32 {
    let opens = line.matches('{').count() as i32;
    let closes = line.matches('}').count() as i32;
    opens - closes
}

fn collapse(statement: &str) -> String {
    statement.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// The path portion of the statement, between `use` and the semicolon.
fn path_part(statement: &str) -> Option<&str> {
    let after_use = statement.split_once("use ")?.1;
    let before_semi = after_use.split_once(';').map_or(after_use, |(p, _)| p);
    Some(before_semi.trim())
}

/// Derives the prefix an ignore rule is matched against: `crate::<second>`
/// for crate-relative paths, otherwise the first segment.
fn statement_prefix(statement: &str) -> Option<String> {
    let path = path_part(statement)?;
    let segments: Vec<&str> = path.split("::").filter(|s| !s.is_empty()).collect();
    let first = segments.first()?;
    if *first == "crate" && segments.len() >= 2 {
        Some(format!("crate::{}", segments[1]))
    } else {
        Some((*first).to_string())
    }
}

fn contains_segment(path: &str, segment: &str) -> bool {
    path.contains(&format!("::{segment}::"))
        || path.ends_with(&format!("::{segment}"))
        || path.contains(&format!("::{segment},"))
}
