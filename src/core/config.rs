//! Profile configuration.
//!
//! Handles reading, writing, and validating `.sc/cfg.<profile>.yaml` files.
//! A profile carries the key pair used to encrypt and decrypt secrets, either
//! inline or as paths to key files.

use std::fs;
#[cfg(unix)]
use std::io::Write;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;
use zeroize::Zeroizing;

use crate::core::constants::SC_CONFIG_DIR;
use crate::error::{ConfigError, Result};

/// Contents of `.sc/cfg.<profile>.yaml`.
#[derive(Debug, Default, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ProfileConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub private_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub public_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub private_key_path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub public_key_path: Option<String>,
}

/// Key pair resolved from a profile.
pub struct KeyPair {
    pub public_key: String,
    pub private_key: Zeroizing<String>,
}

impl ProfileConfig {
    /// Path of a profile file under `workdir`.
    pub fn path(workdir: &Path, profile: &str) -> PathBuf {
        workdir
            .join(SC_CONFIG_DIR)
            .join(format!("cfg.{}.yaml", profile))
    }

    /// Whether a profile file exists.
    pub fn exists(workdir: &Path, profile: &str) -> bool {
        Self::path(workdir, profile).exists()
    }

    /// Load and validate a profile.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::ProfileNotFound` if the file doesn't exist,
    /// `ConfigError::Parse` if the YAML is malformed, or
    /// `ConfigError::Conflicting` if a key is set both inline and by path.
    pub fn load(workdir: &Path, profile: &str) -> Result<Self> {
        let path = Self::path(workdir, profile);
        debug!(path = %path.display(), "loading profile");

        if !path.exists() {
            return Err(ConfigError::ProfileNotFound(
                profile.to_string(),
                path.display().to_string(),
            )
            .into());
        }

        let contents = fs::read_to_string(&path).map_err(|source| ConfigError::ReadFile {
            path: path.display().to_string(),
            source,
        })?;
        let config: Self = serde_yaml::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: path.display().to_string(),
            source,
        })?;

        config.validate(profile)?;
        Ok(config)
    }

    /// Write the profile, restricting permissions on Unix.
    pub fn save(&self, workdir: &Path, profile: &str) -> Result<()> {
        let path = Self::path(workdir, profile);
        debug!(path = %path.display(), "saving profile");

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let contents = Zeroizing::new(serde_yaml::to_string(self)?);

        #[cfg(unix)]
        {
            use std::os::unix::fs::{OpenOptionsExt, PermissionsExt};

            let mut file = fs::OpenOptions::new()
                .create(true)
                .truncate(true)
                .write(true)
                .mode(0o600)
                .open(&path)?;
            // An existing file keeps its old mode on open; tighten it before writing.
            file.set_permissions(fs::Permissions::from_mode(0o600))?;
            file.write_all(contents.as_bytes())?;
            file.flush()?;
        }

        #[cfg(not(unix))]
        {
            fs::write(&path, contents.as_bytes())?;
        }

        Ok(())
    }

    /// Check that inline and path forms are not mixed.
    pub fn validate(&self, profile: &str) -> Result<()> {
        if self.private_key.is_some() && self.private_key_path.is_some() {
            return Err(ConfigError::Conflicting {
                profile: profile.to_string(),
                inline: "privateKey",
                path: "privateKeyPath",
            }
            .into());
        }
        if self.public_key.is_some() && self.public_key_path.is_some() {
            return Err(ConfigError::Conflicting {
                profile: profile.to_string(),
                inline: "publicKey",
                path: "publicKeyPath",
            }
            .into());
        }
        Ok(())
    }

    /// Resolve the key pair, reading key files when paths are configured.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::NoPublicKey`/`NoPrivateKey` when a key is absent.
    pub fn key_pair(&self) -> Result<KeyPair> {
        let public_key = match (&self.public_key, &self.public_key_path) {
            (Some(key), _) => key.clone(),
            (None, Some(path)) => read_key_file(path)?,
            (None, None) => return Err(ConfigError::NoPublicKey.into()),
        };
        let private_key = match (&self.private_key, &self.private_key_path) {
            (Some(key), _) => Zeroizing::new(key.clone()),
            (None, Some(path)) => Zeroizing::new(read_key_file(path)?),
            (None, None) => return Err(ConfigError::NoPrivateKey.into()),
        };
        Ok(KeyPair {
            public_key,
            private_key,
        })
    }
}

fn read_key_file(path: &str) -> Result<String> {
    let expanded = expand_home(path)?;
    fs::read_to_string(&expanded).map_err(|source| {
        ConfigError::ReadFile {
            path: expanded.display().to_string(),
            source,
        }
        .into()
    })
}

/// Expand a leading `~/` to the home directory.
pub fn expand_home(path: &str) -> Result<PathBuf> {
    match path.strip_prefix("~/") {
        Some(rest) => {
            let home = dirs::home_dir().ok_or(ConfigError::NoHomeDir)?;
            Ok(home.join(rest))
        }
        None => Ok(PathBuf::from(path)),
    }
}
