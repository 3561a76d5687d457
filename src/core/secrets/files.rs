//! Registering and unregistering secret files.

use tracing::info;

use super::{relative_path, Cryptor};
use crate::error::{Result, SecretsError};

impl Cryptor {
    /// Mark a file as secret, encrypt it for every recipient and ignore it in git.
    ///
    /// Adding an already registered path re-encrypts everything.
    ///
    /// # Errors
    ///
    /// Fails when keys or the repository are not configured, when `path`
    /// leaves the working tree, or when a registered file cannot be read.
    /// A failed call changes nothing.
    pub fn add_file(&self, path: &str) -> Result<()> {
        let mut state = self.state.write();
        let current = self.require_configured(&state)?;
        let repo = self.repo()?;
        let path = relative_path(repo.workdir(), path)?;

        self.update(&mut state, true, false, |secrets| {
            if secrets.registry.add(&path) {
                info!(path = %path, "registering secret file");
            }
            secrets.secrets.entry(current).or_default();
            Ok(())
        })?;
        repo.add_file_to_ignore(&path)
    }

    /// Stop treating a file as secret.
    ///
    /// Stored ciphertext for the path is dropped for every recipient and the
    /// ignore entry is removed. The working copy is left in place.
    ///
    /// # Errors
    ///
    /// `SecretsError::NotRegistered` if the path is not in the registry.
    pub fn remove_file(&self, path: &str) -> Result<()> {
        let mut state = self.state.write();
        self.require_configured(&state)?;
        let repo = self.repo()?;
        let path = relative_path(repo.workdir(), path)?;

        self.update(&mut state, false, false, |secrets| {
            if !secrets.registry.remove(&path) {
                return Err(SecretsError::NotRegistered(path.clone()).into());
            }
            info!(path = %path, "unregistering secret file");
            Ok(())
        })?;
        repo.remove_file_from_ignore(&path)
    }
}
