//! Git working directory access.
//!
//! The cryptor only reads and writes files relative to the repository root
//! and maintains `.gitignore` entries. It never commits or pushes.
//! Repository discovery and HEAD lookups go through `git2`, so worktrees and
//! submodules (where `.git` is a file) work like plain checkouts.

use std::fs::{self, File, OpenOptions};
use std::io::{Read, Write};
use std::path::{Component, Path, PathBuf};

use git2::{ErrorCode, Repository, RepositoryInitOptions};
use parking_lot::Mutex;
use tracing::{debug, trace};

use crate::core::constants::{DEFAULT_BRANCH, GITIGNORE_FILE};
use crate::error::{GitError, Result};

/// Minimal repository abstraction used by the cryptor and placeholders.
///
/// All `path` arguments are relative to [`Repo::workdir`] and may not leave
/// it.
pub trait Repo: Send + Sync {
    /// Repository root (working tree).
    fn workdir(&self) -> &Path;

    /// The git directory (`.git`, or the per-worktree directory).
    fn gitdir(&self) -> &Path;

    /// Open a file with explicit options.
    fn open_file(&self, path: &str, options: &OpenOptions) -> Result<File>;

    /// Create (or truncate) a file, creating parent directories.
    fn create_file(&self, path: &str) -> Result<File>;

    /// Whether a file exists in the working tree.
    fn exists(&self, path: &str) -> bool;

    /// Add an entry to the root ignore file if not already present.
    fn add_file_to_ignore(&self, path: &str) -> Result<()>;

    /// Remove an entry from the root ignore file.
    fn remove_file_from_ignore(&self, path: &str) -> Result<()>;

    /// Branch HEAD points to, or `None` on a detached HEAD.
    fn branch(&self) -> Result<Option<String>>;

    /// Commit HEAD resolves to, or `None` before the first commit.
    fn head_commit(&self) -> Result<Option<String>>;

    /// Read a whole file.
    fn read_file(&self, path: &str) -> Result<Vec<u8>> {
        let mut options = OpenOptions::new();
        options.read(true);
        let mut file = self.open_file(path, &options)?;
        let mut contents = Vec::new();
        file.read_to_end(&mut contents).map_err(|source| GitError::File {
            path: path.to_string(),
            source,
        })?;
        Ok(contents)
    }

    /// Replace a file's contents.
    fn write_file(&self, path: &str, contents: &[u8]) -> Result<()> {
        let mut file = self.create_file(path)?;
        file.write_all(contents).map_err(|source| GitError::File {
            path: path.to_string(),
            source,
        })?;
        Ok(())
    }
}

/// Normalized `/`-separated form of a path that stays inside the working tree.
///
/// `.` components are dropped.
///
/// # Errors
///
/// `GitError::OutsideWorkdir` for empty or absolute paths and for any `..`
/// component.
pub fn contained_path(path: &str) -> Result<String> {
    let mut parts = Vec::new();
    for component in Path::new(path).components() {
        match component {
            Component::Normal(part) => parts.push(part.to_string_lossy().into_owned()),
            Component::CurDir => {}
            Component::ParentDir | Component::RootDir | Component::Prefix(_) => {
                return Err(GitError::OutsideWorkdir(path.to_string()).into());
            }
        }
    }
    if parts.is_empty() {
        return Err(GitError::OutsideWorkdir(path.to_string()).into());
    }
    Ok(parts.join("/"))
}

/// Filesystem-backed repository.
pub struct Workdir {
    root: PathBuf,
    gitdir: PathBuf,
    repo: Mutex<Repository>,
}

impl std::fmt::Debug for Workdir {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Workdir")
            .field("root", &self.root)
            .field("gitdir", &self.gitdir)
            .finish()
    }
}

impl Workdir {
    /// Open the repository containing `path`, searching parent directories.
    ///
    /// # Errors
    ///
    /// Returns `GitError::NotARepository` if no repository is found and
    /// `GitError::Bare` for a repository without a working tree.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let start = path.as_ref();
        let repo = Repository::discover(start).map_err(|source| match source.code() {
            ErrorCode::NotFound => GitError::NotARepository(start.display().to_string()),
            _ => GitError::Repository {
                path: start.display().to_string(),
                source,
            },
        })?;
        let workdir = Self::from_repository(repo)?;
        debug!(root = %workdir.root.display(), "opened repository");
        Ok(workdir)
    }

    /// Create an empty repository at `path` with HEAD on `main`.
    ///
    /// Existing repositories are opened as-is.
    pub fn init(path: impl AsRef<Path>) -> Result<Self> {
        let root = path.as_ref();
        let repo = match Repository::open(root) {
            Ok(repo) => repo,
            Err(_) => {
                let mut options = RepositoryInitOptions::new();
                options.initial_head(DEFAULT_BRANCH);
                Repository::init_opts(root, &options).map_err(|source| GitError::Repository {
                    path: root.display().to_string(),
                    source,
                })?
            }
        };
        Self::from_repository(repo)
    }

    fn from_repository(repo: Repository) -> Result<Self> {
        let gitdir = normalize(repo.path());
        let root = repo
            .workdir()
            .map(normalize)
            .ok_or_else(|| GitError::Bare(gitdir.display().to_string()))?;
        Ok(Self {
            root,
            gitdir,
            repo: Mutex::new(repo),
        })
    }

    fn resolve(&self, path: &str) -> Result<PathBuf> {
        Ok(self.root.join(contained_path(path)?))
    }

    fn git_error(&self, source: git2::Error) -> crate::error::Error {
        GitError::Repository {
            path: self.root.display().to_string(),
            source,
        }
        .into()
    }

    fn update_ignore(&self, update: impl FnOnce(&str) -> String) -> Result<()> {
        let ignore = self.resolve(GITIGNORE_FILE)?;
        let existing = if ignore.exists() {
            fs::read_to_string(&ignore).map_err(|source| GitError::File {
                path: GITIGNORE_FILE.to_string(),
                source,
            })?
        } else {
            String::new()
        };

        let updated = update(&existing);
        if updated != existing {
            fs::write(&ignore, updated).map_err(|source| GitError::File {
                path: GITIGNORE_FILE.to_string(),
                source,
            })?;
        }
        Ok(())
    }
}

/// Drop the trailing separator libgit2 puts on directory paths.
fn normalize(path: &Path) -> PathBuf {
    path.components().collect()
}

impl Repo for Workdir {
    fn workdir(&self) -> &Path {
        &self.root
    }

    fn gitdir(&self) -> &Path {
        &self.gitdir
    }

    fn open_file(&self, path: &str, options: &OpenOptions) -> Result<File> {
        trace!(path, "opening file");
        options.open(self.resolve(path)?).map_err(|source| {
            GitError::File {
                path: path.to_string(),
                source,
            }
            .into()
        })
    }

    fn create_file(&self, path: &str) -> Result<File> {
        let full = self.resolve(path)?;
        if let Some(parent) = full.parent() {
            fs::create_dir_all(parent).map_err(|source| GitError::File {
                path: path.to_string(),
                source,
            })?;
        }
        File::create(&full).map_err(|source| {
            GitError::File {
                path: path.to_string(),
                source,
            }
            .into()
        })
    }

    fn exists(&self, path: &str) -> bool {
        self.resolve(path).is_ok_and(|full| full.exists())
    }

    fn add_file_to_ignore(&self, path: &str) -> Result<()> {
        let path = contained_path(path)?;
        debug!(path = %path, "adding to .gitignore");
        self.update_ignore(|existing| {
            if existing.lines().any(|l| l.trim() == path) {
                return existing.to_string();
            }
            let mut updated = existing.to_string();
            if !updated.is_empty() && !updated.ends_with('\n') {
                updated.push('\n');
            }
            updated.push_str(&path);
            updated.push('\n');
            updated
        })
    }

    fn remove_file_from_ignore(&self, path: &str) -> Result<()> {
        let path = contained_path(path)?;
        debug!(path = %path, "removing from .gitignore");
        self.update_ignore(|existing| {
            if !existing.lines().any(|l| l.trim() == path) {
                return existing.to_string();
            }
            existing
                .lines()
                .filter(|l| l.trim() != path)
                .map(|l| format!("{}\n", l))
                .collect()
        })
    }

    fn branch(&self) -> Result<Option<String>> {
        let repo = self.repo.lock();
        let result = match repo.head() {
            Ok(head) if head.is_branch() => Ok(head.shorthand().map(str::to_string)),
            Ok(_) => Ok(None),
            // No commit yet: HEAD is still a symbolic ref to the unborn branch.
            Err(e) if e.code() == ErrorCode::UnbornBranch => {
                let head = repo.find_reference("HEAD").map_err(|e| self.git_error(e))?;
                Ok(head
                    .symbolic_target()
                    .and_then(|target| target.strip_prefix("refs/heads/"))
                    .map(str::to_string))
            }
            Err(e) => Err(self.git_error(e)),
        };
        result
    }

    fn head_commit(&self) -> Result<Option<String>> {
        let repo = self.repo.lock();
        let head = match repo.head() {
            Ok(head) => head,
            Err(e) if matches!(e.code(), ErrorCode::UnbornBranch | ErrorCode::NotFound) => {
                return Ok(None);
            }
            Err(e) => return Err(self.git_error(e)),
        };
        let commit = head.peel_to_commit().map_err(|e| self.git_error(e))?;
        Ok(Some(commit.id().to_string()))
    }
}

/// Commit the current index on HEAD and return the commit id.
#[cfg(test)]
pub(crate) fn test_commit(workdir: &Path, message: &str) -> String {
    let repo = Repository::open(workdir).unwrap();
    let signature = git2::Signature::now("Test", "test@example.com").unwrap();
    let tree_id = repo.index().unwrap().write_tree().unwrap();
    let tree = repo.find_tree(tree_id).unwrap();
    let parent = repo.head().ok().and_then(|h| h.peel_to_commit().ok());
    let parents: Vec<&git2::Commit<'_>> = parent.iter().collect();
    repo.commit(Some("HEAD"), &signature, &signature, message, &tree, &parents)
        .unwrap()
        .to_string()
}
