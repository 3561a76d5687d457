//! Repository and cryptor lookup shared by commands.

use std::path::Path;
use std::sync::Arc;

use tracing::debug;

use crate::core::config::ProfileConfig;
use crate::core::git::{Repo, Workdir};
use crate::core::secrets::Cryptor;
use crate::error::Result;

/// Open the repository containing the current directory.
pub fn open_repo() -> Result<Arc<dyn Repo>> {
    let cwd = std::env::current_dir()?;
    Ok(Arc::new(Workdir::open(cwd)?))
}

/// Build a cryptor from `profile` for `repo`.
pub fn open_cryptor(repo: &Arc<dyn Repo>, profile: &str) -> Result<Cryptor> {
    debug!(profile, root = %repo.workdir().display(), "opening cryptor");
    Cryptor::builder()
        .repo(Arc::clone(repo))
        .keys_from_profile(profile)
        .build()
}

/// Cryptor for `profile` if the profile exists, `None` otherwise.
///
/// Read-only commands work without keys as long as nothing needs decrypting.
pub fn try_open_cryptor(repo: &Arc<dyn Repo>, profile: &str) -> Result<Option<Arc<Cryptor>>> {
    if !ProfileConfig::exists(repo.workdir(), profile) {
        debug!(profile, "profile missing, continuing without cryptor");
        return Ok(None);
    }
    Ok(Some(Arc::new(open_cryptor(repo, profile)?)))
}

/// A path given on the command line, relative to the repository root.
///
/// Command-line paths are relative to the current directory, which may be
/// below the root.
pub fn repo_path(workdir: &Path, path: &str) -> Result<String> {
    let full = std::env::current_dir()?.join(path);
    Ok(match full.strip_prefix(workdir) {
        Ok(relative) => relative.to_string_lossy().replace('\\', "/"),
        Err(_) => path.to_string(),
    })
}
