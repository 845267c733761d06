use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use codesweep::builders::backup::{BackupStore, SiblingFileBackup};
use codesweep::builders::dead_tests::DeadTestSweeper;
use codesweep::builders::fences::{FenceOptions, FenceRewriter};
use codesweep::builders::mod_exports;
use codesweep::builders::reporter::{ConsoleReporter, SweepReporter, export_summary};
use codesweep::builders::todos::TodoRewriter;
use codesweep::builders::uses::{UseAuditor, UseOptions};
use codesweep::core::config::{ConfigManager, ConfigProvider};
use codesweep::core::engine::{FileRewriter, RunOptions, SweepEngine};
use codesweep::core::version;
use codesweep::utils;

/// Exit code for "matches were found" — distinct from success and from hard
/// failures so hooks and CI can react to it, whether or not `--apply` ran.
const FINDINGS_EXIT_CODE: i32 = 2;

#[derive(Parser)]
#[command(name = "codesweep")]
#[command(author, version, about = "Static hygiene sweeps for Rust source trees")]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

/// Switches shared by every scanning subcommand.
#[derive(Args)]
struct ScanArgs {
    /// Files or directories to sweep (default: current directory)
    #[arg(default_value = ".")]
    paths: Vec<PathBuf>,

    /// Descend into subdirectories
    #[arg(short, long)]
    recursive: bool,

    /// Only sweep files git reports as changed
    #[arg(long)]
    changed_only: bool,

    /// Write a serialized summary to this file (.json, .yaml or .toml)
    #[arg(long, value_name = "FILE")]
    report: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Disable or delete example code fences inside doc comments
    DocFences {
        #[command(flatten)]
        scan: ScanArgs,

        /// Write changes (default is a dry-run report)
        #[arg(long)]
        apply: bool,

        /// Delete fences and their content instead of disabling them
        #[arg(long)]
        delete: bool,

        /// Only touch fences tagged with the configured language
        #[arg(long)]
        only_rust: bool,

        /// Only consider fences in line-style doc comments
        #[arg(long)]
        line_doc_only: bool,
    },

    /// Report `use` statements whose braced groups split module paths
    SplitUses {
        #[command(flatten)]
        scan: ScanArgs,

        /// Also report paths with three or more segments
        #[arg(long)]
        deep: bool,

        /// Report statements containing this path segment (repeatable)
        #[arg(long = "segment", value_name = "SEG")]
        segments: Vec<String>,

        /// Skip statements under this path prefix (repeatable)
        #[arg(long = "ignore-prefix", value_name = "PREFIX")]
        ignore_prefixes: Vec<String>,
    },

    /// Normalize TODO/FIXME comments to the canonical shape
    Todos {
        #[command(flatten)]
        scan: ScanArgs,

        /// Write changes (default is a dry-run report)
        #[arg(long)]
        apply: bool,
    },

    /// Remove fully commented-out test functions
    DeadTests {
        #[command(flatten)]
        scan: ScanArgs,

        /// Write changes (default is a dry-run report)
        #[arg(long)]
        apply: bool,
    },

    /// Generate a directory's mod.rs re-export file
    ModExports {
        /// Directory whose modules should be re-exported
        dir: PathBuf,

        /// Write the generated file (default is a dry-run report)
        #[arg(long)]
        apply: bool,

        /// Overwrite a hand-written mod.rs
        #[arg(long)]
        force: bool,
    },

    /// Write a default .codesweep.toml at the workspace root
    Init,

    /// Install a git pre-commit hook that sweeps changed files
    InstallHooks,

    /// Inspect or modify the configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },

    /// Show the local version and the latest GitHub release
    Version,
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Print the effective configuration
    Show,
    /// Check the configuration for issues
    Validate,
    /// Serialize the configuration to a format
    Export {
        /// Output format: toml, json or yaml
        #[arg(default_value = "toml")]
        format: String,
    },
    /// Merge exclusions from a gitignore-style file
    Import {
        /// File to import exclusion entries from
        file: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let manager = match &cli.config {
        Some(path) => ConfigManager::with_explicit(path.clone()),
        None => ConfigManager::new()?,
    };
    let config = manager.load_config()?;

    let filter = if cli.verbose || config.global_settings.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    match cli.command {
        Commands::DocFences {
            scan,
            apply,
            delete,
            only_rust,
            line_doc_only,
        } => {
            let options = FenceOptions {
                delete,
                only_language: only_rust.then(|| config.fences.language.clone()),
                line_doc_only,
                ignore_suffix: config.fences.ignore_suffix.clone(),
            };
            let rewriter = FenceRewriter::new(options)?;
            let mut engine = SweepEngine::new(config);
            run_rewrite_sweep(&mut engine, &rewriter, &scan, apply)
        }
        Commands::SplitUses {
            scan,
            deep,
            segments,
            ignore_prefixes,
        } => {
            let mut prefixes = config.scan.ignored_use_prefixes.clone();
            prefixes.extend(ignore_prefixes);
            let auditor = UseAuditor::new(UseOptions {
                deep,
                segments,
                ignore_prefixes: prefixes,
            })?;
            let engine = SweepEngine::new(config);

            let options = RunOptions {
                recursive: scan.recursive,
                changed_only: scan.changed_only,
                apply: false,
            };
            let summary = engine.run_auditor(&auditor, &scan.paths, options)?;
            ConsoleReporter::new().report_audit(&summary)?;
            if let Some(path) = &scan.report {
                export_summary(&summary, path)?;
            }
            if summary.has_findings() {
                std::process::exit(FINDINGS_EXIT_CODE);
            }
            Ok(())
        }
        Commands::Todos { scan, apply } => {
            let rewriter = TodoRewriter::new()?;
            let mut engine = SweepEngine::new(config);
            run_rewrite_sweep(&mut engine, &rewriter, &scan, apply)
        }
        Commands::DeadTests { scan, apply } => {
            let rewriter = DeadTestSweeper::new()?;
            let mut engine = SweepEngine::new(config);
            run_rewrite_sweep(&mut engine, &rewriter, &scan, apply)
        }
        Commands::ModExports { dir, apply, force } => {
            let mut backup: Box<dyn BackupStore> =
                Box::new(SiblingFileBackup::new(&config.backup.suffix));
            let outcome = mod_exports::sync_mod_file(
                &dir,
                &config.scan.extension,
                apply,
                force,
                backup.as_mut(),
            )?;

            if outcome.refused {
                eprintln!(
                    "Refusing to overwrite hand-written {}; pass --force to replace it",
                    outcome.path.display()
                );
                std::process::exit(FINDINGS_EXIT_CODE);
            }
            if !outcome.changed {
                println!("✓ {} is up to date", outcome.path.display());
            } else if apply {
                println!("✓ Wrote {}", outcome.path.display());
            } else {
                println!("Would write {}:\n", outcome.path.display());
                print!("{}", outcome.text);
                println!("\nRun with --apply to write the file.");
                std::process::exit(FINDINGS_EXIT_CODE);
            }
            Ok(())
        }
        Commands::Init => utils::initialize_workspace(),
        Commands::InstallHooks => utils::install_hooks(),
        Commands::Config { action } => match action {
            ConfigAction::Show => manager.show(),
            ConfigAction::Validate => manager.validate_config(),
            ConfigAction::Export { format } => {
                print!("{}", manager.export(&format)?);
                Ok(())
            }
            ConfigAction::Import { file } => {
                let added = manager.import_exclusions(&file.to_string_lossy())?;
                println!("✓ Imported {added} exclusion entries");
                Ok(())
            }
        },
        Commands::Version => {
            version::run();
            Ok(())
        }
    }
}

/// Runs a rewriting sweep, reports it, and exits with the findings code
/// when anything matched.
fn run_rewrite_sweep(
    engine: &mut SweepEngine,
    rewriter: &dyn FileRewriter,
    scan: &ScanArgs,
    apply: bool,
) -> Result<()> {
    let options = RunOptions {
        recursive: scan.recursive,
        changed_only: scan.changed_only,
        apply,
    };
    let summary = engine.run_rewriter(rewriter, &scan.paths, options)?;
    ConsoleReporter::new().report_run(&summary)?;
    if let Some(path) = &scan.report {
        export_summary(&summary, path)?;
    }
    if summary.has_findings() {
        std::process::exit(FINDINGS_EXIT_CODE);
    }
    Ok(())
}
