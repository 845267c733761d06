use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

use crate::builders::backup::BackupStore;

/// First line of every generated export file. A `mod.rs` without this
/// marker is treated as hand-written and never overwritten unless forced.
pub const GENERATED_MARKER: &str = "// @generated by codesweep mod-exports";

/// File stems that are never re-exported.
const RESERVED_STEMS: &[&str] = &["mod", "lib", "main", "tests"];

/// What happened (or would happen) to a directory's `mod.rs`.
#[derive(Debug)]
pub struct ModExportsOutcome {
    pub path: PathBuf,
    pub text: String,
    /// The generated content differs from what is on disk.
    pub changed: bool,
    /// An existing hand-written `mod.rs` blocked the write.
    pub refused: bool,
}

/// Renders the export file for `dir`: one `pub mod x;` per sibling source
/// file plus one per subdirectory that itself contains a `mod.rs`, sorted
/// alphabetically.
pub fn generate_mod_file(dir: &Path, extension: &str) -> Result<String> {
    let mut modules = Vec::new();

    let entries = fs::read_dir(dir)
        .with_context(|| format!("failed to list directory {}", dir.display()))?;
    for entry in entries {
        let path = entry?.path();
        if path.is_dir() {
            if path.join("mod.rs").is_file()
                && let Some(name) = path.file_name().and_then(|n| n.to_str())
            {
                push_module(&mut modules, name);
            }
        } else if path.extension().and_then(|e| e.to_str()) == Some(extension)
            && let Some(stem) = path.file_stem().and_then(|s| s.to_str())
            && !RESERVED_STEMS.contains(&stem)
        {
            push_module(&mut modules, stem);
        }
    }

    modules.sort();
    modules.dedup();

    let mut text = String::new();
    text.push_str(GENERATED_MARKER);
    text.push_str("\n\n");
    for module in &modules {
        text.push_str(&format!("pub mod {module};\n"));
    }
    Ok(text)
}

/// Compares the generated export file against what is on disk and, with
/// `apply`, writes it — backing up any previous content first. An existing
/// file without the generated marker is refused unless `force` is set.
pub fn sync_mod_file(
    dir: &Path,
    extension: &str,
    apply: bool,
    force: bool,
    backup: &mut dyn BackupStore,
) -> Result<ModExportsOutcome> {
    let path = dir.join("mod.rs");
    let text = generate_mod_file(dir, extension)?;

    let existing = if path.is_file() {
        Some(fs::read_to_string(&path).with_context(|| format!("failed to read {}", path.display()))?)
    } else {
        None
    };

    let changed = existing.as_deref() != Some(text.as_str());
    let refused = changed
        && !force
        && existing
            .as_deref()
            .is_some_and(|content| !content.contains(GENERATED_MARKER));

    if apply && changed && !refused {
        if let Some(content) = &existing {
            backup.store(&path, content)?;
        }
        fs::write(&path, &text).with_context(|| format!("failed to write {}", path.display()))?;
    }

    Ok(ModExportsOutcome {
        path,
        text,
        changed,
        refused,
    })
}

fn push_module(modules: &mut Vec<String>, name: &str) {
    let valid = !name.is_empty()
        && name.chars().next().is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
        && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_');
    if valid {
        modules.push(name.to_string());
    } else {
        tracing::debug!("skipping non-identifier module name {name:?}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builders::backup::MemoryBackup;

    fn setup(files: &[&str]) -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        for file in files {
            fs::write(dir.path().join(file), "").unwrap();
        }
        dir
    }

    #[test]
    fn test_generates_sorted_exports() {
        let dir = setup(&["zeta.rs", "alpha.rs", "mod.rs"]);
        fs::create_dir(dir.path().join("nested")).unwrap();
        fs::write(dir.path().join("nested").join("mod.rs"), "").unwrap();

        let text = generate_mod_file(dir.path(), "rs").unwrap();
        assert_eq!(
            text,
            format!("{GENERATED_MARKER}\n\npub mod alpha;\npub mod nested;\npub mod zeta;\n")
        );
    }

    #[test]
    fn test_refuses_hand_written_mod_file() {
        let dir = setup(&["alpha.rs"]);
        fs::write(dir.path().join("mod.rs"), "pub mod alpha; // curated\n").unwrap();

        let mut backup = MemoryBackup::new();
        let outcome = sync_mod_file(dir.path(), "rs", true, false, &mut backup).unwrap();

        assert!(outcome.refused);
        assert_eq!(
            fs::read_to_string(dir.path().join("mod.rs")).unwrap(),
            "pub mod alpha; // curated\n"
        );
        assert!(backup.saved.is_empty());
    }

    #[test]
    fn test_force_overwrites_with_backup() {
        let dir = setup(&["alpha.rs"]);
        fs::write(dir.path().join("mod.rs"), "pub mod alpha; // curated\n").unwrap();

        let mut backup = MemoryBackup::new();
        let outcome = sync_mod_file(dir.path(), "rs", true, true, &mut backup).unwrap();

        assert!(outcome.changed);
        assert!(!outcome.refused);
        let written = fs::read_to_string(dir.path().join("mod.rs")).unwrap();
        assert!(written.starts_with(GENERATED_MARKER));
        assert!(written.contains("pub mod alpha;"));
        assert_eq!(
            backup.saved.values().next().map(String::as_str),
            Some("pub mod alpha; // curated\n")
        );
    }

    #[test]
    fn test_up_to_date_file_reports_no_change() {
        let dir = setup(&["alpha.rs"]);
        let text = generate_mod_file(dir.path(), "rs").unwrap();
        fs::write(dir.path().join("mod.rs"), &text).unwrap();

        let mut backup = MemoryBackup::new();
        let outcome = sync_mod_file(dir.path(), "rs", true, false, &mut backup).unwrap();

        assert!(!outcome.changed);
        assert!(!outcome.refused);
        assert!(backup.saved.is_empty());
    }
}
