use anyhow::Result;
use std::collections::HashSet;

use crate::core::config::SweepConfig;

/// The `ConfigValidator` trait defines the interface for validating a
/// codesweep configuration before a sweep relies on it.
///
/// Issues are reported as human-readable strings rather than hard errors:
/// the caller decides whether they are fatal.
pub trait ConfigValidator {
    /// Performs a full validation and returns the list of issues found.
    fn validate_config(&self, config: &SweepConfig) -> Result<Vec<String>>;
}

/// The standard set of sanity checks on a configuration.
pub struct StandardValidator;

impl StandardValidator {
    pub fn new() -> Self {
        Self
    }

    fn check_scan_settings(&self, config: &SweepConfig, issues: &mut Vec<String>) {
        if config.scan.extension.is_empty() {
            issues.push("Scan extension must not be empty".to_string());
        }
        if config.scan.extension.starts_with('.') {
            issues.push(format!(
                "Scan extension {:?} must not include the leading dot",
                config.scan.extension
            ));
        }

        let mut seen = HashSet::new();
        for dir in &config.scan.ignored_dirs {
            if dir.is_empty() {
                issues.push("Ignored directory entries must not be empty".to_string());
            } else if dir.contains('/') || dir.contains('\\') {
                issues.push(format!(
                    "Ignored directory {dir:?} must be a plain name, not a path"
                ));
            }
            if !seen.insert(dir) {
                issues.push(format!("Duplicate ignored directory {dir:?}"));
            }
        }
    }

    fn check_fence_settings(&self, config: &SweepConfig, issues: &mut Vec<String>) {
        if config.fences.language.is_empty() {
            issues.push("Fence language must not be empty".to_string());
        }
        let suffix = &config.fences.ignore_suffix;
        if suffix.is_empty() {
            issues.push("Fence ignore suffix must not be empty".to_string());
        } else if suffix.contains(',') || suffix.contains(char::is_whitespace) {
            issues.push(format!(
                "Fence ignore suffix {suffix:?} must be a single tag token"
            ));
        }
    }

    fn check_backup_settings(&self, config: &SweepConfig, issues: &mut Vec<String>) {
        let suffix = &config.backup.suffix;
        if suffix.is_empty() {
            issues.push("Backup suffix must not be empty".to_string());
        } else if suffix.contains('/') || suffix.contains('\\') {
            issues.push(format!(
                "Backup suffix {suffix:?} must not contain path separators"
            ));
        }
    }
}

impl Default for StandardValidator {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigValidator for StandardValidator {
    /// Orchestrates the individual checks:
    /// - version compatibility,
    /// - scanner settings (extension shape, ignored directory entries),
    /// - fence settings (language, suffix token shape),
    /// - backup settings (suffix shape).
    fn validate_config(&self, config: &SweepConfig) -> Result<Vec<String>> {
        let mut issues = Vec::new();

        if config.version != "1.0" {
            issues.push(format!("Unsupported config version: {}", config.version));
        }

        self.check_scan_settings(config, &mut issues);
        self.check_fence_settings(config, &mut issues);
        self.check_backup_settings(config, &mut issues);

        Ok(issues)
    }
}
