// This file is the module declaration file for the `core` module.
// It declares the submodules under `src/core/` and exposes them to the
// rest of the crate.

// The `pub mod config;` declaration tells the Rust compiler to look for
// a file named `config.rs` within the same directory.
//
// `config` module:
// Manages the application's configuration. It defines the data structures
// for `.codesweep.toml` (`SweepConfig` and its sections), provides a
// `ConfigProvider` trait for abstracting configuration access, and includes
// a `ConfigManager` that handles discovery (walking up from the current
// directory), loading, saving, export and import.
pub mod config;

// `engine` module:
// The driver shared by every sweep. It defines the `FileRewriter` and
// `FileAuditor` traits, collects candidate files from the argument paths
// (with recursion, pruning and the `--changed-only` git filter), and
// performs the backup-then-overwrite sequence for rewriting sweeps.
pub mod engine;

// `git` module:
// A small `GitClient` trait over git2, used by the engine to restrict a
// sweep to the files git reports as changed.
pub mod git;

// `version` module:
// The `codesweep version` subcommand: compares the compiled-in version
// against the latest GitHub release.
pub mod version;
