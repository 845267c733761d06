use crate::builders::hooks;
use crate::core::config::{ConfigManager, ConfigProvider};
use crate::core::git::{Git2Client, GitClient};
use anyhow::Result;

pub fn initialize_workspace() -> Result<()> {
    let config_manager = ConfigManager::new()?;
    config_manager.initialize()?;
    println!("✓ Wrote {}", config_manager.config_path().display());
    println!("Run 'codesweep install-hooks' to sweep changed files before every commit");
    Ok(())
}

pub fn install_hooks() -> Result<()> {
    let git = Git2Client::discover(".")?;
    hooks::install_git_hooks(&git.repo_root())?;
    println!("✓ Installed pre-commit hygiene sweep");
    Ok(())
}
