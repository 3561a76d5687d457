//! Secrets cryptor.
//!
//! [`Cryptor`] owns the in-memory `secrets.yaml` state for one working
//! directory: which files are secret, and their ciphertext for every trusted
//! public key. Every public operation takes the single reader/writer lock for
//! its full duration, prompts included, so at most one mutation is in flight
//! per instance.

mod diff;
mod encrypt;
mod files;
mod model;
mod recipients;

use std::path::Path;
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};
use tracing::debug;
use zeroize::Zeroizing;

use crate::core::cipher::{self, trim_pub_key, PrivateKey};
use crate::core::config::ProfileConfig;
use crate::core::console::{Console, Terminal};
use crate::core::constants::{SC_CONFIG_DIR, SECRETS_FILE};
use crate::core::git::{contained_path, Repo};
use crate::error::{CipherError, ConfigError, Error, Result};

pub use diff::{Diff, DiffEntry, LineStatus};
pub use model::{EncryptedSecretFile, EncryptedSecretFiles, EncryptedSecrets, Registry};

/// Multi-recipient file encryption manager.
pub struct Cryptor {
    repo: Option<Arc<dyn Repo>>,
    console: Arc<dyn Console>,
    state: RwLock<State>,
    passphrase: Mutex<Option<Zeroizing<String>>>,
}

/// Everything guarded by the cryptor lock.
struct State {
    public_key: Option<String>,
    private_key: Option<Zeroizing<String>>,
    secrets: EncryptedSecretFiles,
}

impl std::fmt::Debug for Cryptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.read();
        f.debug_struct("Cryptor")
            .field("workdir", &self.repo.as_ref().map(|r| r.workdir().to_path_buf()))
            .field("public_key", &state.public_key.as_deref().map(cipher::short_key))
            .field("files", &state.secrets.registry.files)
            .field("recipients", &state.secrets.secrets.len())
            .finish()
    }
}

/// Builder for [`Cryptor`].
#[derive(Default)]
pub struct CryptorBuilder {
    public_key: Option<String>,
    private_key: Option<Zeroizing<String>>,
    passphrase: Option<Zeroizing<String>>,
    profile: Option<String>,
    repo: Option<Arc<dyn Repo>>,
    console: Option<Arc<dyn Console>>,
}

impl CryptorBuilder {
    /// Use an explicit key pair.
    pub fn keys(mut self, public_key: impl Into<String>, private_key: impl Into<String>) -> Self {
        self.public_key = Some(public_key.into());
        self.private_key = Some(Zeroizing::new(private_key.into()));
        self
    }

    /// Passphrase for an encrypted private key.
    pub fn passphrase(mut self, passphrase: impl Into<String>) -> Self {
        self.passphrase = Some(Zeroizing::new(passphrase.into()));
        self
    }

    /// Load keys from `.sc/cfg.<profile>.yaml` in the repository at build time.
    pub fn keys_from_profile(mut self, profile: impl Into<String>) -> Self {
        self.profile = Some(profile.into());
        self
    }

    pub fn repo(mut self, repo: Arc<dyn Repo>) -> Self {
        self.repo = Some(repo);
        self
    }

    pub fn console(mut self, console: Arc<dyn Console>) -> Self {
        self.console = Some(console);
        self
    }

    /// Build the cryptor and load `secrets.yaml` if the repository has one.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::NoRepo` when a profile is requested without a
    /// repository, or any error from loading the profile or secrets file.
    pub fn build(self) -> Result<Cryptor> {
        let mut public_key = self.public_key;
        let mut private_key = self.private_key;

        if let Some(profile) = &self.profile {
            let repo = self.repo.as_ref().ok_or(ConfigError::NoRepo)?;
            let pair = ProfileConfig::load(repo.workdir(), profile)?.key_pair()?;
            public_key = Some(pair.public_key);
            private_key = Some(pair.private_key);
        }

        let cryptor = Cryptor {
            repo: self.repo,
            console: self.console.unwrap_or_else(|| Arc::new(Terminal)),
            state: RwLock::new(State {
                public_key: public_key.map(|k| trim_pub_key(&k)),
                private_key,
                secrets: EncryptedSecretFiles::default(),
            }),
            passphrase: Mutex::new(self.passphrase),
        };

        if cryptor.repo.is_some() {
            cryptor.read_secret_files()?;
        }
        Ok(cryptor)
    }
}

impl Cryptor {
    pub fn builder() -> CryptorBuilder {
        CryptorBuilder::default()
    }

    /// Path of `secrets.yaml` relative to the repository root.
    pub fn secrets_file_path() -> String {
        format!("{}/{}", SC_CONFIG_DIR, SECRETS_FILE)
    }

    /// Normalized current public key, if configured.
    pub fn public_key(&self) -> Option<String> {
        self.state.read().public_key.clone()
    }

    /// Snapshot of the in-memory secrets state.
    pub fn get_secret_files(&self) -> EncryptedSecretFiles {
        self.state.read().secrets.clone()
    }

    /// Paths currently registered as secret.
    pub fn registered_files(&self) -> Vec<String> {
        self.state.read().secrets.registry.files.clone()
    }

    /// Load `secrets.yaml` from the repository, replacing in-memory state.
    ///
    /// A missing file yields empty state.
    pub fn read_secret_files(&self) -> Result<()> {
        let repo = self.repo()?;
        let mut state = self.state.write();

        let path = Self::secrets_file_path();
        if !repo.exists(&path) {
            debug!(path = %path, "no secrets file, starting empty");
            state.secrets = EncryptedSecretFiles::default();
            return Ok(());
        }

        let contents = repo.read_file(&path)?;
        let mut secrets: EncryptedSecretFiles = if contents.iter().all(u8::is_ascii_whitespace) {
            EncryptedSecretFiles::default()
        } else {
            serde_yaml::from_slice(&contents)?
        };
        secrets.normalize_keys();
        validate_paths(&secrets)?;

        debug!(
            files = secrets.registry.files.len(),
            recipients = secrets.secrets.len(),
            "secrets loaded"
        );
        state.secrets = secrets;
        Ok(())
    }

    /// Persist the in-memory state to `secrets.yaml`.
    pub fn marshal_secrets_file(&self) -> Result<()> {
        let state = self.state.read();
        self.marshal(&state.secrets)
    }

    fn marshal(&self, secrets: &EncryptedSecretFiles) -> Result<()> {
        let repo = self.repo()?;
        let path = Self::secrets_file_path();
        debug!(path = %path, "saving secrets");
        let contents = serde_yaml::to_string(secrets)?;
        repo.write_file(&path, contents.as_bytes())
    }

    /// Apply `change` to a copy of the secrets, re-encrypt and persist it.
    ///
    /// The copy replaces the in-memory state only once everything
    /// succeeded, so a failed operation leaves both the cryptor and
    /// `secrets.yaml` as they were.
    fn update(
        &self,
        state: &mut State,
        force: bool,
        force_changed: bool,
        change: impl FnOnce(&mut EncryptedSecretFiles) -> Result<()>,
    ) -> Result<()> {
        let mut next = state.secrets.clone();
        change(&mut next)?;
        self.encrypt_changed_locked(state, &mut next, force, force_changed)?;
        self.marshal(&next)?;
        state.secrets = next;
        Ok(())
    }

    fn repo(&self) -> Result<&dyn Repo> {
        self.repo
            .as_deref()
            .ok_or_else(|| ConfigError::NoRepo.into())
    }

    /// Fail fast unless keys and repository are configured.
    fn require_configured(&self, state: &State) -> Result<String> {
        let public_key = state
            .public_key
            .as_ref()
            .ok_or(ConfigError::NoPublicKey)?;
        if state.private_key.is_none() {
            return Err(ConfigError::NoPrivateKey.into());
        }
        self.repo()?;
        Ok(public_key.clone())
    }

    /// Parse the current private key, prompting once for a passphrase.
    ///
    /// A passphrase is cached only after it successfully opens the key.
    fn private_key(&self, state: &State) -> Result<PrivateKey> {
        let pem = state
            .private_key
            .as_ref()
            .ok_or(ConfigError::NoPrivateKey)?;
        let mut cached = self.passphrase.lock();

        match cipher::parse_private_key(pem, cached.as_deref().map(String::as_str)) {
            Err(Error::Cipher(CipherError::PassphraseMissing)) if cached.is_none() => {
                let answer = Zeroizing::new(
                    self.console
                        .read_password("Enter passphrase for private key")?,
                );
                let key = cipher::parse_private_key(pem, Some(answer.as_str()))?;
                *cached = Some(answer);
                Ok(key)
            }
            other => other,
        }
    }
}

/// Registry-relative form of a user-supplied path.
///
/// Absolute paths inside `workdir` are accepted; anything that would
/// resolve outside it is not.
fn relative_path(workdir: &Path, path: &str) -> Result<String> {
    let candidate = Path::new(path.trim());
    let relative = candidate.strip_prefix(workdir).unwrap_or(candidate);
    contained_path(&relative.to_string_lossy())
}

/// Reject a loaded `secrets.yaml` naming files outside the working tree.
fn validate_paths(secrets: &EncryptedSecretFiles) -> Result<()> {
    let stored = secrets
        .secrets
        .values()
        .flat_map(|recipient| recipient.secrets.iter().map(|file| &file.path));
    for path in secrets.registry.files.iter().chain(stored) {
        contained_path(path)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::console::Scripted;
    use crate::core::git::Workdir;
    use tempfile::TempDir;

    fn ed25519_keys() -> (String, String) {
        let (private, public) = cipher::generate_ed25519_key_pair().unwrap();
        (
            cipher::marshal_ed25519_public_key(&public).unwrap(),
            cipher::marshal_ed25519_private_key(&private).unwrap().to_string(),
        )
    }

    #[test]
    fn test_relative_path() {
        let root = Path::new("/repo");
        assert_eq!(relative_path(root, "./a/b.txt").unwrap(), "a/b.txt");
        assert_eq!(relative_path(root, "/repo/a.txt").unwrap(), "a.txt");
        assert_eq!(relative_path(root, "a.txt ").unwrap(), "a.txt");
    }

    #[test]
    fn test_relative_path_stays_in_workdir() {
        let root = Path::new("/repo");
        for path in ["../x", "/other/a.txt", "/repo/../x", "a/../../x", "."] {
            let err = relative_path(root, path).unwrap_err();
            assert!(err.to_string().contains("is outside the working tree"), "{}", path);
        }
    }

    #[test]
    fn test_load_rejects_escaping_paths() {
        let tmp = TempDir::new().unwrap();
        let repo = Arc::new(Workdir::init(tmp.path()).unwrap());
        let (public, private) = ed25519_keys();
        let crafted = format!(
            "registry:\n  files:\n  - ../escaped.txt\nsecrets:\n  {}:\n    secrets:\n    - path: ../escaped.txt\n      encryptedData: []\n",
            public
        );
        repo.write_file(&Cryptor::secrets_file_path(), crafted.as_bytes())
            .unwrap();

        let err = Cryptor::builder()
            .repo(repo)
            .keys(public, private)
            .build()
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "path '../escaped.txt' is outside the working tree"
        );
    }

    #[test]
    fn test_validate_paths_checks_stored_entries() {
        let mut secrets = EncryptedSecretFiles::default();
        secrets.registry.add("dir/a.txt");
        assert!(validate_paths(&secrets).is_ok());

        secrets
            .secrets
            .entry("ssh-ed25519 AAAA".to_string())
            .or_default()
            .upsert(EncryptedSecretFile {
                path: "/etc/passwd".to_string(),
                encrypted_data: Vec::new(),
            });
        assert!(validate_paths(&secrets).is_err());
    }

    #[test]
    fn test_build_without_repo_has_empty_state() {
        let (public, private) = ed25519_keys();
        let cryptor = Cryptor::builder().keys(public, private).build().unwrap();
        assert!(cryptor.get_secret_files().secrets.is_empty());
        assert!(cryptor.marshal_secrets_file().is_err());
    }

    #[test]
    fn test_profile_requires_repo() {
        let err = Cryptor::builder()
            .keys_from_profile("default")
            .build()
            .unwrap_err();
        assert_eq!(err.to_string(), "git repo is not configured");
    }

    #[test]
    fn test_build_from_profile() {
        let tmp = TempDir::new().unwrap();
        let repo = Arc::new(Workdir::init(tmp.path()).unwrap());
        let (public, private) = ed25519_keys();
        ProfileConfig {
            public_key: Some(format!("{} me@host", public)),
            private_key: Some(private),
            ..Default::default()
        }
        .save(tmp.path(), "default")
        .unwrap();

        let cryptor = Cryptor::builder()
            .repo(repo)
            .keys_from_profile("default")
            .build()
            .unwrap();
        assert_eq!(cryptor.public_key(), Some(public));
    }

    #[test]
    fn test_passphrase_prompted_once_and_cached() {
        let tmp = TempDir::new().unwrap();
        let repo = Arc::new(Workdir::init(tmp.path()).unwrap());
        let (private, public) = cipher::generate_ed25519_key_pair().unwrap();
        let encrypted = PrivateKey::Ed25519(private)
            .to_encrypted_pem("s3cret")
            .unwrap();
        let console = Arc::new(Scripted::new(["s3cret"]));

        let cryptor = Cryptor::builder()
            .repo(repo)
            .console(console.clone())
            .keys(
                cipher::marshal_ed25519_public_key(&public).unwrap(),
                encrypted.as_str(),
            )
            .build()
            .unwrap();

        let state = cryptor.state.read();
        assert!(cryptor.private_key(&state).is_ok());
        assert!(cryptor.private_key(&state).is_ok());
        assert_eq!(console.remaining(), 0);
    }

    #[test]
    fn test_wrong_passphrase_is_reported() {
        let (private, public) = cipher::generate_ed25519_key_pair().unwrap();
        let encrypted = PrivateKey::Ed25519(private)
            .to_encrypted_pem("right")
            .unwrap();

        let cryptor = Cryptor::builder()
            .console(Arc::new(Scripted::new(["wrong"])))
            .keys(
                cipher::marshal_ed25519_public_key(&public).unwrap(),
                encrypted.as_str(),
            )
            .build()
            .unwrap();

        let state = cryptor.state.read();
        let err = cryptor.private_key(&state).unwrap_err();
        assert!(err
            .to_string()
            .contains("failed to parse private key with passphrase"));
    }
}
