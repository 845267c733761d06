use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::builders::importer::{ExclusionImporter, GitignoreImporter};
use crate::builders::validator::{ConfigValidator, StandardValidator};

/// Name of the configuration file, discovered by walking up from the
/// current directory.
pub const CONFIG_FILE_NAME: &str = ".codesweep.toml";

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ScanSettings {
    /// Source file extension the sweeps operate on (without the dot).
    pub extension: String,
    /// Directory names never descended into.
    pub ignored_dirs: Vec<String>,
    /// Import path prefixes the split-uses sweep skips.
    pub ignored_use_prefixes: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct FenceSettings {
    /// Language tag targeted by `--only-rust`-style filtering.
    pub language: String,
    /// Tag token appended to disable a fence.
    pub ignore_suffix: String,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub enum BackupStrategy {
    Sibling,
    Memory,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct BackupSettings {
    pub strategy: BackupStrategy,
    /// Suffix appended to the source file name for the sibling backup.
    pub suffix: String,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct GlobalSettings {
    pub verbose: bool,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct SweepConfig {
    pub version: String,
    pub scan: ScanSettings,
    pub fences: FenceSettings,
    pub backup: BackupSettings,
    pub global_settings: GlobalSettings,
}

impl Default for SweepConfig {
    fn default() -> Self {
        Self {
            version: "1.0".to_string(),
            scan: ScanSettings {
                extension: "rs".to_string(),
                ignored_dirs: vec![
                    "target".to_string(),
                    ".git".to_string(),
                    "node_modules".to_string(),
                ],
                ignored_use_prefixes: vec!["std".to_string()],
            },
            fences: FenceSettings {
                language: "rust".to_string(),
                ignore_suffix: "ignore".to_string(),
            },
            backup: BackupSettings {
                strategy: BackupStrategy::Sibling,
                suffix: "bak".to_string(),
            },
            global_settings: GlobalSettings { verbose: false },
        }
    }
}

pub struct ConfigManager {
    config_path: PathBuf,
    root: PathBuf,
}

impl ConfigManager {
    /// Discovers the workspace root by walking up from the current
    /// directory until a config file is found; falls back to the current
    /// directory with defaults.
    pub fn new() -> Result<Self> {
        let cwd = std::env::current_dir().context("cannot determine current directory")?;
        let root = find_config_root(&cwd).unwrap_or(cwd);
        let config_path = root.join(CONFIG_FILE_NAME);
        Ok(Self { config_path, root })
    }

    pub fn new_at(root: PathBuf) -> Self {
        let config_path = root.join(CONFIG_FILE_NAME);
        Self { config_path, root }
    }

    /// Uses an explicit config file path (the `--config` flag).
    pub fn with_explicit(config_path: PathBuf) -> Self {
        let root = config_path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));
        Self { config_path, root }
    }

    pub fn initialize(&self) -> Result<()> {
        if self.config_path.exists() {
            return Ok(());
        }
        self.save_config(&SweepConfig::default())?;
        Ok(())
    }

    pub fn validate_config(&self) -> Result<()> {
        let config = self.load_config()?;
        let validator = StandardValidator::new();
        let issues = validator.validate_config(&config)?;

        if issues.is_empty() {
            println!("✓ Configuration is valid.");
            Ok(())
        } else {
            println!("⚠️  Found issues in configuration:");
            for issue in issues {
                println!("  - {issue}");
            }
            anyhow::bail!("Configuration validation failed.");
        }
    }

    /// Prints the effective configuration (defaults merged with the file).
    pub fn show(&self) -> Result<()> {
        let config = self.load_config()?;
        let rendered =
            toml::to_string_pretty(&config).context("Failed to render configuration")?;
        println!("# {}", self.config_path.display());
        print!("{rendered}");
        Ok(())
    }

    /// Serializes the effective configuration into the requested format.
    pub fn export(&self, format: &str) -> Result<String> {
        let config = self.load_config()?;
        match format {
            "json" => serde_json::to_string_pretty(&config).context("Failed to serialize to JSON"),
            "yaml" => serde_yaml::to_string(&config).context("Failed to serialize to YAML"),
            _ => toml::to_string_pretty(&config).context("Failed to serialize to TOML"),
        }
    }

    /// Merges exclusion entries from a gitignore-style file into
    /// `scan.ignored_dirs`. Returns the number of entries added.
    pub fn import_exclusions(&self, file_path: &str) -> Result<usize> {
        let mut importer = GitignoreImporter::new();
        let entries = importer.import_from_file(file_path)?;

        let mut config = self.load_config()?;
        let mut added = 0;
        for entry in entries {
            if !config.scan.ignored_dirs.contains(&entry) {
                config.scan.ignored_dirs.push(entry);
                added += 1;
            }
        }
        if added > 0 {
            self.save_config(&config)?;
        }
        Ok(added)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

pub trait ConfigProvider {
    fn load_config(&self) -> Result<SweepConfig>;
    fn save_config(&self, config: &SweepConfig) -> Result<()>;
    fn config_path(&self) -> &Path;
}

impl ConfigProvider for ConfigManager {
    fn load_config(&self) -> Result<SweepConfig> {
        if !self.config_path.exists() {
            return Ok(SweepConfig::default());
        }

        let content =
            fs::read_to_string(&self.config_path).context("Failed to read config file")?;

        toml::from_str(&content).context("Failed to parse config file")
    }

    fn save_config(&self, config: &SweepConfig) -> Result<()> {
        let content = toml::to_string_pretty(config).context("Failed to serialize config")?;

        fs::write(&self.config_path, content).context("Failed to write config file")?;

        Ok(())
    }

    fn config_path(&self) -> &Path {
        &self.config_path
    }
}

fn find_config_root(start: &Path) -> Option<PathBuf> {
    let mut dir = start;

    loop {
        if dir.join(CONFIG_FILE_NAME).exists() {
            return Some(dir.to_path_buf());
        }
        dir = dir.parent()?;
    }
}
