use anyhow::Result;
use std::fs;
use std::path::Path;

const PRE_COMMIT_HOOK: &str = r#"#!/bin/sh
# codesweep - pre-commit hygiene sweep

# Check if codesweep is available
if ! command -v codesweep > /dev/null 2>&1; then
    echo "Warning: codesweep not found in PATH"
    exit 0
fi

# Dry-run sweeps over the files this commit touches. Findings exit with
# code 2, which blocks the commit until they are fixed (or applied).
codesweep doc-fences --only-rust --recursive --changed-only
if [ $? -ne 0 ]; then
    echo "codesweep: runnable doc fences in changed files; run 'codesweep doc-fences --apply'"
    exit 1
fi

codesweep split-uses --recursive --changed-only
if [ $? -ne 0 ]; then
    echo "codesweep: split use statements in changed files"
    exit 1
fi
"#;

/// Installs the pre-commit hook into `.git/hooks`, backing up any existing
/// hook that is not ours.
pub fn install_git_hooks(repo_root: &Path) -> Result<()> {
    let hooks_dir = repo_root.join(".git").join("hooks");
    fs::create_dir_all(&hooks_dir)?;

    install_hook(&hooks_dir, "pre-commit", PRE_COMMIT_HOOK)?;

    Ok(())
}

fn install_hook(hooks_dir: &Path, hook_name: &str, hook_content: &str) -> Result<()> {
    let hook_path = hooks_dir.join(hook_name);

    if hook_path.exists() {
        // Check if it's already our hook
        let existing_content = fs::read_to_string(&hook_path)?;
        if existing_content.contains("codesweep") {
            println!("ℹ️  {hook_name} hook already installed");
            return Ok(());
        }

        // Backup existing hook
        let backup_path = hooks_dir.join(format!("{hook_name}.backup"));
        fs::rename(&hook_path, backup_path)?;
        println!("ℹ️  Backed up existing {hook_name} hook");
    }

    fs::write(&hook_path, hook_content)?;

    // Make executable on Unix systems
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let mut perms = fs::metadata(&hook_path)?.permissions();
        perms.set_mode(0o755);
        fs::set_permissions(&hook_path, perms)?;
    }

    Ok(())
}
