use codesweep::builders::fences::{FenceOptions, FenceRewriter};
use codesweep::core::config::SweepConfig;
use codesweep::core::engine::{RunOptions, SweepEngine};
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

fn setup_source_file(content: &str) -> (TempDir, PathBuf) {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("lib.rs");
    fs::write(&file, content).unwrap();
    (dir, file)
}

fn apply_options() -> RunOptions {
    RunOptions {
        recursive: false,
        changed_only: false,
        apply: true,
    }
}

#[test]
fn test_disable_sweep_end_to_end() {
    let input = "/// Adds one.\n/// ```rust\n/// assert_eq!(add_one(1), 2);\n/// ```\npub fn add_one(x: i32) -> i32 { x + 1 }\n";
    let (dir, file) = setup_source_file(input);

    let rewriter = FenceRewriter::new(FenceOptions {
        line_doc_only: true,
        ..FenceOptions::default()
    })
    .unwrap();
    let mut engine = SweepEngine::new(SweepConfig::default());
    let summary = engine
        .run_rewriter(&rewriter, &[file.clone()], apply_options())
        .unwrap();

    assert_eq!(summary.total_matches, 1);
    let rewritten = fs::read_to_string(&file).unwrap();
    assert!(rewritten.contains("/// ```rust,ignore\n"));
    // Enclosed content and the closing fence are byte-identical.
    assert!(rewritten.contains("/// assert_eq!(add_one(1), 2);\n/// ```\n"));
    assert_eq!(
        fs::read_to_string(dir.path().join("lib.rs.bak")).unwrap(),
        input
    );
}

#[test]
fn test_delete_sweep_end_to_end() {
    let input = "/// ```rust\n/// let x = 1;\n/// ```\nfn keep() {}\n";
    let (_dir, file) = setup_source_file(input);

    let rewriter = FenceRewriter::new(FenceOptions {
        delete: true,
        ..FenceOptions::default()
    })
    .unwrap();
    let mut engine = SweepEngine::new(SweepConfig::default());
    let summary = engine
        .run_rewriter(&rewriter, &[file.clone()], apply_options())
        .unwrap();

    assert_eq!(summary.total_matches, 1);
    assert_eq!(fs::read_to_string(&file).unwrap(), "fn keep() {}\n");
}

#[test]
fn test_language_filtered_file_is_never_touched() {
    let input = "/// ```python\n/// print(1)\n/// ```\nfn keep() {}\n";
    let (dir, file) = setup_source_file(input);

    let rewriter = FenceRewriter::new(FenceOptions {
        only_language: Some("rust".to_string()),
        ..FenceOptions::default()
    })
    .unwrap();
    let mut engine = SweepEngine::new(SweepConfig::default());
    let summary = engine
        .run_rewriter(&rewriter, &[file.clone()], apply_options())
        .unwrap();

    assert_eq!(summary.total_matches, 0);
    assert_eq!(fs::read_to_string(&file).unwrap(), input);
    assert!(!dir.path().join("lib.rs.bak").exists());
}

#[test]
fn test_disable_sweep_is_idempotent_across_runs() {
    let input = "//! ```rust\n//! let x = 1;\n//! ```\n";
    let (_dir, file) = setup_source_file(input);

    let rewriter = FenceRewriter::new(FenceOptions::default()).unwrap();
    let mut engine = SweepEngine::new(SweepConfig::default());

    let first = engine
        .run_rewriter(&rewriter, &[file.clone()], apply_options())
        .unwrap();
    let after_first = fs::read_to_string(&file).unwrap();

    let second = engine
        .run_rewriter(&rewriter, &[file.clone()], apply_options())
        .unwrap();
    let after_second = fs::read_to_string(&file).unwrap();

    assert_eq!(first.total_matches, 1);
    assert_eq!(second.total_matches, 0);
    assert_eq!(after_first, after_second);
}

#[test]
fn test_directory_sweep_touches_only_matching_files() {
    let dir = tempfile::tempdir().unwrap();
    let fenced = dir.path().join("fenced.rs");
    let clean = dir.path().join("clean.rs");
    fs::write(&fenced, "/// ```rust\n/// x\n/// ```\n").unwrap();
    fs::write(&clean, "fn main() {}\n").unwrap();

    let rewriter = FenceRewriter::new(FenceOptions::default()).unwrap();
    let mut engine = SweepEngine::new(SweepConfig::default());
    let summary = engine
        .run_rewriter(&rewriter, &[dir.path().to_path_buf()], apply_options())
        .unwrap();

    assert_eq!(summary.files_scanned, 2);
    assert_eq!(summary.changes.len(), 1);
    assert!(dir.path().join("fenced.rs.bak").exists());
    assert!(!dir.path().join("clean.rs.bak").exists());
}
