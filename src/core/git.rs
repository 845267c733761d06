use anyhow::{Context, Result};
use git2::{Repository, Status, StatusOptions};
use std::path::{Path, PathBuf};

/// Trait defining the git operations the engine needs for `--changed-only`.
/// The abstraction keeps the engine decoupled from libgit2 and lets tests
/// substitute a fixed file list.
pub trait GitClient {
    /// Returns the repository's working directory root.
    fn repo_root(&self) -> PathBuf;

    /// Returns the files currently changed — staged or unstaged, including
    /// untracked — as absolute paths.
    fn changed_files(&self) -> Result<Vec<PathBuf>>;
}

/// Concrete implementation of `GitClient` using the git2 crate.
pub struct Git2Client {
    repo: Repository,
}

impl Git2Client {
    /// Opens the repository containing `path`, searching parent
    /// directories the way the git CLI does.
    pub fn discover<P: AsRef<Path>>(path: P) -> Result<Self> {
        let repo = Repository::discover(path).context("not inside a git repository")?;
        Ok(Self { repo })
    }
}

impl GitClient for Git2Client {
    fn repo_root(&self) -> PathBuf {
        self.repo
            .workdir()
            .unwrap_or(self.repo.path())
            .to_path_buf()
    }

    fn changed_files(&self) -> Result<Vec<PathBuf>> {
        let mut options = StatusOptions::new();
        options
            .include_untracked(true)
            .recurse_untracked_dirs(true)
            .include_ignored(false);

        let interesting = Status::INDEX_NEW
            | Status::INDEX_MODIFIED
            | Status::INDEX_RENAMED
            | Status::WT_NEW
            | Status::WT_MODIFIED
            | Status::WT_RENAMED;

        let root = self.repo_root();
        let statuses = self
            .repo
            .statuses(Some(&mut options))
            .context("failed to read git status")?;

        let mut files = Vec::new();
        for entry in statuses.iter() {
            if entry.status().intersects(interesting)
                && let Some(path) = entry.path()
            {
                files.push(root.join(path));
            }
        }
        Ok(files)
    }
}
