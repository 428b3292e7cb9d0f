//! Git operations
//!
//! Everything the review needs from the repository: where it is, which
//! files are staged, and the staged diff as text. The diff is taken
//! index-vs-HEAD, so unstaged edits never leak into a review.

use anyhow::{Context, Result};
use git2::{DiffFormat, DiffOptions, Repository, StatusOptions};
use std::path::{Path, PathBuf};

/// Open the repository containing `path`, searching upward.
pub fn discover_repo(path: &Path) -> Result<Repository> {
    Repository::discover(path).context("not inside a git repository")
}

/// Absolute path of the repository's working directory.
pub fn workdir(repo: &Repository) -> Result<PathBuf> {
    repo.workdir()
        .map(Path::to_path_buf)
        .context("repository has no working directory (bare repo)")
}

/// Paths of all files with staged changes, in index order.
pub fn staged_files(repo: &Repository) -> Result<Vec<String>> {
    let mut options = StatusOptions::new();
    options.include_untracked(false);

    let statuses = repo
        .statuses(Some(&mut options))
        .context("failed to read repository status")?;

    let mut files = Vec::new();
    for entry in statuses.iter() {
        let status = entry.status();
        if status.is_index_new()
            || status.is_index_modified()
            || status.is_index_renamed()
            || status.is_index_typechange()
            || status.is_index_deleted()
        {
            if let Some(path) = entry.path() {
                files.push(path.to_string());
            }
        }
    }
    Ok(files)
}

/// The staged diff (HEAD tree vs index) as unified diff text.
///
/// On an unborn branch there is no HEAD tree; everything staged then diffs
/// against an empty tree.
pub fn staged_diff(repo: &Repository) -> Result<String> {
    let head_tree = repo.head().ok().and_then(|head| head.peel_to_tree().ok());

    let mut options = DiffOptions::new();
    options.context_lines(3);

    let diff = repo
        .diff_tree_to_index(head_tree.as_ref(), None, Some(&mut options))
        .context("failed to compute staged diff")?;

    let mut text = String::new();
    diff.print(DiffFormat::Patch, |_delta, _hunk, line| {
        match line.origin() {
            '+' | '-' | ' ' => text.push(line.origin()),
            _ => {}
        }
        text.push_str(&String::from_utf8_lossy(line.content()));
        true
    })
    .context("failed to render staged diff")?;

    Ok(text)
}
