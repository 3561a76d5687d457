//! Loading stacks from `.sc/stacks`.

use std::fs;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use tracing::{debug, trace};

use super::{ConfigRegistry, Stack, StacksMap};
use crate::core::constants::{
    CLIENT_DESCRIPTOR, SC_CONFIG_DIR, SECRETS_DESCRIPTOR, SERVER_DESCRIPTOR, STACKS_DIR,
};
use crate::core::git::Repo;
use crate::core::secrets::Cryptor;
use crate::error::{GitError, Result, StackError};

/// Reads stack descriptors from a repository.
///
/// A stack's `secrets.yaml` is usually itself a registered secret file. When
/// its working copy is missing and a [`Cryptor`] is attached, the decrypted
/// stored content is used instead.
pub struct StackReader {
    repo: Arc<dyn Repo>,
    registry: ConfigRegistry,
    cryptor: Option<Arc<Cryptor>>,
}

impl StackReader {
    pub fn new(repo: Arc<dyn Repo>) -> Self {
        Self {
            repo,
            registry: ConfigRegistry::default(),
            cryptor: None,
        }
    }

    pub fn with_registry(mut self, registry: ConfigRegistry) -> Self {
        self.registry = registry;
        self
    }

    pub fn with_cryptor(mut self, cryptor: Arc<Cryptor>) -> Self {
        self.cryptor = Some(cryptor);
        self
    }

    fn stack_path(name: &str, file: &str) -> String {
        format!("{}/{}/{}/{}", SC_CONFIG_DIR, STACKS_DIR, name, file)
    }

    /// Names of all stack directories, sorted.
    pub fn list(&self) -> Result<Vec<String>> {
        let dir = self.repo.workdir().join(SC_CONFIG_DIR).join(STACKS_DIR);
        if !dir.is_dir() {
            return Ok(Vec::new());
        }

        let entries = fs::read_dir(&dir).map_err(|source| GitError::File {
            path: dir.display().to_string(),
            source,
        })?;
        let mut names = Vec::new();
        for entry in entries {
            let entry = entry?;
            if entry.file_type()?.is_dir() {
                names.push(entry.file_name().to_string_lossy().into_owned());
            }
        }
        names.sort();
        Ok(names)
    }

    /// Load one stack. Missing descriptor files yield empty descriptors.
    ///
    /// # Errors
    ///
    /// `StackError::NotFound` if the stack directory does not exist,
    /// `StackError::Parse` for malformed YAML, or a config registry error.
    pub fn read(&self, name: &str) -> Result<Stack> {
        let dir = self
            .repo
            .workdir()
            .join(SC_CONFIG_DIR)
            .join(STACKS_DIR)
            .join(name);
        if !dir.is_dir() {
            return Err(StackError::NotFound(name.to_string()).into());
        }
        debug!(stack = name, "reading stack");

        let mut stack = Stack::new(name);
        stack.server = self.descriptor(name, SERVER_DESCRIPTOR)?;
        stack.secrets = self.descriptor(name, SECRETS_DESCRIPTOR)?;
        stack.client = self.descriptor(name, CLIENT_DESCRIPTOR)?;

        stack.server.decode_configs(name, &self.registry)?;
        stack.secrets.decode_configs(name, &self.registry)?;
        stack.client.decode_configs(name, &self.registry)?;
        Ok(stack)
    }

    /// Load every stack.
    pub fn read_all(&self) -> Result<StacksMap> {
        self.list()?
            .into_iter()
            .map(|name| Ok((name.clone(), self.read(&name)?)))
            .collect()
    }

    fn descriptor<T: DeserializeOwned + Default>(&self, stack: &str, file: &str) -> Result<T> {
        let path = Self::stack_path(stack, file);
        let contents = if self.repo.exists(&path) {
            self.repo.read_file(&path)?
        } else if let Some(cryptor) = self.cryptor.as_ref().filter(|c| {
            c.registered_files().contains(&path)
        }) {
            trace!(path = %path, "using stored secret content");
            cryptor.get_and_decrypt_file_content(&path)?.to_vec()
        } else {
            trace!(path = %path, "descriptor missing");
            return Ok(T::default());
        };

        if contents.iter().all(u8::is_ascii_whitespace) {
            return Ok(T::default());
        }
        serde_yaml::from_slice(&contents).map_err(|source| {
            StackError::Parse {
                stack: stack.to_string(),
                file: file.to_string(),
                source,
            }
            .into()
        })
    }
}
