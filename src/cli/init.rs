//! Init command - generate a key pair for a profile.

use tracing::info;

use crate::cli::{context, output};
use crate::core::cipher;
use crate::core::config::ProfileConfig;
use crate::core::constants::PROFILE_IGNORE_ENTRY;
use crate::error::{ConfigError, Result};

/// Generate keys and write `.sc/cfg.<profile>.yaml`.
pub fn execute(
    profile: &str,
    ed25519: bool,
    bits: usize,
    project: Option<String>,
    force: bool,
) -> Result<()> {
    let repo = context::open_repo()?;
    let workdir = repo.workdir();

    if ProfileConfig::exists(workdir, profile) && !force {
        return Err(ConfigError::AlreadyInitialized(profile.to_string()).into());
    }

    let (public_key, private_key) = if ed25519 {
        let (private, public) = cipher::generate_ed25519_key_pair()?;
        (
            cipher::marshal_ed25519_public_key(&public)?,
            cipher::marshal_ed25519_private_key(&private)?,
        )
    } else {
        let (private, public) = cipher::generate_key_pair(bits)?;
        (
            cipher::marshal_public_key(&public)?,
            cipher::marshal_rsa_private_key(&private)?,
        )
    };
    info!(profile, kind = if ed25519 { "ed25519" } else { "rsa" }, "generated key pair");

    let config = ProfileConfig {
        project_name: project,
        private_key: Some(private_key.to_string()),
        public_key: Some(public_key.clone()),
        ..Default::default()
    };
    config.save(workdir, profile)?;
    repo.add_file_to_ignore(PROFILE_IGNORE_ENTRY)?;

    let path = ProfileConfig::path(workdir, profile);
    output::success(&format!("initialized profile {}", output::key(profile)));
    output::kv("profile:", output::path(&path.display().to_string()));
    output::blank();
    output::data(&public_key);
    output::blank();
    output::hint(&format!(
        "share your public key so a teammate can run: {}",
        output::cmd("sc secrets allow \"<key>\"")
    ));
    Ok(())
}
