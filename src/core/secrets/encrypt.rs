//! Re-encryption and decryption of registered files.

use std::collections::HashSet;

use tracing::{debug, info, trace};
use zeroize::Zeroizing;

use super::{Cryptor, EncryptedSecretFile, EncryptedSecretFiles, State};
use crate::core::cipher::{self, parse_public_key, short_key, PublicKey};
use crate::error::{ConfigError, Result, SecretsError};

impl Cryptor {
    /// Re-encrypt registered files whose working copy changed.
    ///
    /// With `force`, every registered file is re-encrypted even when its
    /// content is unchanged. With `force_changed`, content changes are
    /// accepted without a confirmation prompt. The result is persisted; on
    /// failure nothing is.
    pub fn encrypt_changed(&self, force: bool, force_changed: bool) -> Result<()> {
        let mut state = self.state.write();
        self.require_configured(&state)?;
        self.update(&mut state, force, force_changed, |_| Ok(()))
    }

    /// Re-encrypt `secrets` in place with the keys held in `state`.
    pub(super) fn encrypt_changed_locked(
        &self,
        state: &State,
        secrets: &mut EncryptedSecretFiles,
        force: bool,
        force_changed: bool,
    ) -> Result<()> {
        let current = self.require_configured(state)?;
        let repo = self.repo()?;

        secrets.normalize_keys();
        secrets.prune();

        if !secrets.secrets.contains_key(&current) {
            return Err(SecretsError::KeyNotFound(current).into());
        }

        let private = self.private_key(state)?;
        let recipients = secrets
            .secrets
            .keys()
            .map(|k| Ok((k.clone(), parse_public_key(k)?)))
            .collect::<Result<Vec<(String, PublicKey)>>>()?;

        debug!(
            files = secrets.registry.files.len(),
            recipients = recipients.len(),
            force,
            "encrypting changed secrets"
        );

        let mut confirmed: HashSet<String> = HashSet::new();
        for path in secrets.registry.files.clone() {
            let content = Zeroizing::new(repo.read_file(&path)?);

            let previous = match secrets
                .secrets
                .get(&current)
                .and_then(|s| s.file(&path))
            {
                Some(stored) => Some(Zeroizing::new(
                    cipher::decrypt(&private, &stored.encrypted_data).map_err(|e| {
                        SecretsError::Decrypt {
                            path: path.clone(),
                            reason: e.to_string(),
                        }
                    })?,
                )),
                None => None,
            };

            let unchanged = previous
                .as_ref()
                .is_some_and(|p| p.as_slice() == content.as_slice());
            if unchanged && !force {
                trace!(path = %path, "unchanged");
                continue;
            }

            for (key, public) in &recipients {
                let encrypted_data = cipher::encrypt_large_string(public, &content).map_err(|e| {
                    SecretsError::Encrypt {
                        path: path.clone(),
                        key: short_key(key),
                        reason: e.to_string(),
                    }
                })?;

                if let Some(previous) = previous.as_ref() {
                    if !unchanged && confirmed.insert(path.clone()) {
                        self.ensure_diff_acceptable(&path, previous, &content, force_changed)?;
                    }
                }

                if let Some(entry) = secrets.secrets.get_mut(key) {
                    entry.upsert(EncryptedSecretFile {
                        path: path.clone(),
                        encrypted_data,
                    });
                }
            }
            info!(path = %path, recipients = recipients.len(), "encrypted");
        }
        Ok(())
    }

    /// Decrypt every file stored for the current key into the working tree.
    ///
    /// Files whose working copy differs are confirmed first unless
    /// `force_changed` is set.
    ///
    /// # Errors
    ///
    /// `SecretsError::KeyNotFound` when the current key has no entry at all.
    pub fn decrypt_all(&self, force_changed: bool) -> Result<()> {
        let state = self.state.write();
        let current = state
            .public_key
            .as_ref()
            .ok_or(ConfigError::NoPublicKey)?;
        let repo = self.repo()?;
        let entry = state
            .secrets
            .recipient(current)
            .ok_or_else(|| SecretsError::KeyNotFound(current.clone()))?;
        let private = self.private_key(&state)?;

        debug!(files = entry.secrets.len(), "decrypting secrets");
        for file in &entry.secrets {
            let plaintext = Zeroizing::new(cipher::decrypt(&private, &file.encrypted_data).map_err(
                |e| SecretsError::Decrypt {
                    path: file.path.clone(),
                    reason: e.to_string(),
                },
            )?);

            if repo.exists(&file.path) {
                let existing = Zeroizing::new(repo.read_file(&file.path)?);
                if existing.as_slice() == plaintext.as_slice() {
                    trace!(path = %file.path, "already up to date");
                    continue;
                }
                self.ensure_diff_acceptable(&file.path, &existing, &plaintext, force_changed)?;
            }

            repo.write_file(&file.path, &plaintext)?;
            info!(path = %file.path, "decrypted");
        }
        Ok(())
    }

    /// Decrypt one registered file without touching the working tree.
    pub fn get_and_decrypt_file_content(&self, path: &str) -> Result<Zeroizing<Vec<u8>>> {
        let state = self.state.read();
        let current = state
            .public_key
            .as_ref()
            .ok_or(ConfigError::NoPublicKey)?;
        let entry = state
            .secrets
            .recipient(current)
            .ok_or_else(|| SecretsError::KeyNotFound(current.clone()))?;
        let file = entry
            .file(path)
            .ok_or_else(|| SecretsError::NotRegistered(path.to_string()))?;

        let private = self.private_key(&state)?;
        let plaintext = cipher::decrypt(&private, &file.encrypted_data).map_err(|e| {
            SecretsError::Decrypt {
                path: path.to_string(),
                reason: e.to_string(),
            }
        })?;
        Ok(Zeroizing::new(plaintext))
    }
}
