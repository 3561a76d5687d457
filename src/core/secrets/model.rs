//! Persisted shape of `secrets.yaml`.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::core::cipher::trim_pub_key;

/// Full contents of `secrets.yaml`.
///
/// `secrets` is keyed by the normalized public key of each recipient.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EncryptedSecretFiles {
    #[serde(default)]
    pub registry: Registry,
    #[serde(default)]
    pub secrets: BTreeMap<String, EncryptedSecrets>,
}

/// Files designated as secret, relative to the repository root.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Registry {
    #[serde(default)]
    pub files: Vec<String>,
}

/// Everything encrypted for one recipient.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EncryptedSecrets {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub public_key: Option<serde_yaml::Value>,
    #[serde(default)]
    pub secrets: Vec<EncryptedSecretFile>,
}

/// One registered file encrypted for one recipient.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EncryptedSecretFile {
    pub path: String,
    #[serde(default)]
    pub encrypted_data: Vec<String>,
}

impl Registry {
    pub fn contains(&self, path: &str) -> bool {
        self.files.iter().any(|f| f == path)
    }

    /// Add a path, keeping order. Returns `false` if already present.
    pub fn add(&mut self, path: &str) -> bool {
        if self.contains(path) {
            return false;
        }
        self.files.push(path.to_string());
        true
    }

    /// Remove a path. Returns `false` if it was not registered.
    pub fn remove(&mut self, path: &str) -> bool {
        let before = self.files.len();
        self.files.retain(|f| f != path);
        self.files.len() != before
    }
}

impl EncryptedSecrets {
    pub fn file(&self, path: &str) -> Option<&EncryptedSecretFile> {
        self.secrets.iter().find(|f| f.path == path)
    }

    /// Replace the entry for `file.path`, keeping paths unique.
    pub fn upsert(&mut self, file: EncryptedSecretFile) {
        self.secrets.retain(|f| f.path != file.path);
        self.secrets.push(file);
    }
}

impl EncryptedSecretFiles {
    /// Re-key recipients by their normalized public key.
    ///
    /// Entries whose keys collide after normalization are merged; files
    /// already present under the surviving key win.
    pub fn normalize_keys(&mut self) {
        if self.secrets.keys().all(|k| trim_pub_key(k) == *k) {
            return;
        }

        let mut normalized: BTreeMap<String, EncryptedSecrets> = BTreeMap::new();
        for (key, secrets) in std::mem::take(&mut self.secrets) {
            let entry = normalized.entry(trim_pub_key(&key)).or_default();
            for file in secrets.secrets {
                if entry.file(&file.path).is_none() {
                    entry.secrets.push(file);
                }
            }
            if entry.public_key.is_none() {
                entry.public_key = secrets.public_key;
            }
        }
        self.secrets = normalized;
    }

    /// Drop ciphertext for paths that left the registry.
    pub fn prune(&mut self) {
        let registry = &self.registry;
        for secrets in self.secrets.values_mut() {
            secrets.secrets.retain(|f| registry.contains(&f.path));
        }
    }

    /// Recipient entry for a (possibly unnormalized) public key.
    pub fn recipient(&self, public_key: &str) -> Option<&EncryptedSecrets> {
        self.secrets.get(&trim_pub_key(public_key))
    }
}
