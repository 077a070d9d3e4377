//! Staged-file discovery using libgit2 (index vs HEAD)

use anyhow::{Context, Result};
use git2::{Repository, Status, StatusOptions};
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::classifier::relative_path;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChangeKind {
    Added,
    Modified,
    Renamed,
}

/// A file staged for commit, relative to the project root
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StagedFile {
    pub path: String,
    pub change: ChangeKind,
}

/// Repository handle scoped to one project root
pub struct StagedRepo {
    repo: Repository,
    workdir: PathBuf,
    project_root: PathBuf,
}

fn canonical(path: &Path) -> PathBuf {
    path.canonicalize().unwrap_or_else(|_| path.to_path_buf())
}

impl StagedRepo {
    /// Open the repository containing `project_root`
    pub fn open(project_root: &Path) -> Result<Self> {
        let repo = Repository::discover(project_root)
            .with_context(|| format!("Failed to open git repository at {:?}", project_root))?;
        let workdir = repo
            .workdir()
            .context("Repository has no working directory (bare repo?)")?
            .to_path_buf();
        debug!("Opened git repository at {:?}", repo.path());
        Ok(Self {
            repo,
            workdir: canonical(&workdir),
            project_root: canonical(project_root),
        })
    }

    /// Files whose index state differs from HEAD. Deletions are skipped;
    /// files outside the project root are skipped.
    pub fn staged_files(&self) -> Result<Vec<StagedFile>> {
        let mut opts = StatusOptions::new();
        opts.include_untracked(false)
            .include_ignored(false)
            .exclude_submodules(true)
            .renames_head_to_index(true);

        let statuses = self
            .repo
            .statuses(Some(&mut opts))
            .context("Failed to read repository status")?;

        let mut files = Vec::new();
        for entry in statuses.iter() {
            let status = entry.status();
            let change = if status.contains(Status::INDEX_NEW) {
                ChangeKind::Added
            } else if status.contains(Status::INDEX_RENAMED) {
                ChangeKind::Renamed
            } else if status.intersects(Status::INDEX_MODIFIED | Status::INDEX_TYPECHANGE) {
                ChangeKind::Modified
            } else {
                continue;
            };

            let repo_path = entry
                .head_to_index()
                .and_then(|delta| delta.new_file().path().map(Path::to_path_buf))
                .or_else(|| entry.path().map(PathBuf::from));
            let Some(repo_path) = repo_path else {
                continue;
            };

            let absolute = self.workdir.join(&repo_path);
            if let Some(path) = relative_path(&self.project_root, &absolute) {
                files.push(StagedFile { path, change });
            }
        }
        files.sort_by(|a, b| a.path.cmp(&b.path));
        Ok(files)
    }
}

/// Staged files under `project_root`; empty on any git error
pub fn staged_files(project_root: &Path) -> Vec<StagedFile> {
    match StagedRepo::open(project_root).and_then(|repo| repo.staged_files()) {
        Ok(files) => {
            debug!("{} staged files", files.len());
            files
        }
        Err(e) => {
            debug!("No staged files: {:#}", e);
            Vec::new()
        }
    }
}
