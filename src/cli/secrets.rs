//! Secrets commands.
//!
//! Thin wrappers over [`Cryptor`]: register files, encrypt and decrypt them,
//! and manage the set of trusted public keys.

use std::io::Write;

use tracing::info;

use crate::cli::{context, output};
use crate::core::cipher::{short_key, trim_pub_key};
use crate::core::secrets::Cryptor;
use crate::error::Result;

/// Register and encrypt files.
pub fn add(profile: &str, paths: &[String]) -> Result<()> {
    let repo = context::open_repo()?;
    let cryptor = context::open_cryptor(&repo, profile)?;
    for path in paths {
        let path = context::repo_path(repo.workdir(), path)?;
        info!(path = %path, "adding secret file");
        cryptor.add_file(&path)?;
        output::success(&format!("added {}", output::path(&path)));
    }
    Ok(())
}

/// Unregister files. Working copies are left in place.
pub fn delete(profile: &str, paths: &[String]) -> Result<()> {
    let repo = context::open_repo()?;
    let cryptor = context::open_cryptor(&repo, profile)?;
    for path in paths {
        let path = context::repo_path(repo.workdir(), path)?;
        info!(path = %path, "removing secret file");
        cryptor.remove_file(&path)?;
        output::success(&format!("removed {}", output::path(&path)));
    }
    Ok(())
}

/// List registered secret files.
pub fn list(profile: &str, json: bool) -> Result<()> {
    let cryptor = open(profile)?;
    let files = cryptor.registered_files();

    if json {
        let result = serde_json::json!({
            "files": files,
            "count": files.len()
        });
        output::data(&serde_json::to_string_pretty(&result)?);
    } else if files.is_empty() {
        output::dimmed("no secret files registered");
    } else {
        output::blank();
        output::header(&format!("{} secret files", files.len()));
        output::rule();
        for file in &files {
            output::list_item(file);
        }
    }
    Ok(())
}

/// Encrypt changed files for every recipient.
pub fn encrypt(profile: &str, force: bool, yes: bool) -> Result<()> {
    let cryptor = open(profile)?;
    cryptor.encrypt_changed(force, yes)?;
    output::success(&format!(
        "encrypted {} for {} recipients",
        count_files(&cryptor),
        cryptor.get_known_public_keys().len()
    ));
    Ok(())
}

/// Decrypt every registered file into the working tree.
pub fn decrypt(profile: &str, yes: bool) -> Result<()> {
    let cryptor = open(profile)?;
    cryptor.decrypt_all(yes)?;
    output::success(&format!("decrypted {}", count_files(&cryptor)));
    Ok(())
}

/// Trust a new public key.
pub fn allow(profile: &str, key: &str) -> Result<()> {
    let cryptor = open(profile)?;
    cryptor.add_public_key(key)?;
    output::success(&format!("allowed {}", output::key(&short_key(key))));
    Ok(())
}

/// Revoke a public key.
pub fn disallow(profile: &str, key: &str) -> Result<()> {
    let cryptor = open(profile)?;
    cryptor.remove_public_key(key)?;
    output::success(&format!("disallowed {}", output::key(&short_key(key))));
    output::hint("secrets it could read before remain readable from git history; rotate them");
    Ok(())
}

/// List trusted public keys.
pub fn keys(profile: &str, json: bool) -> Result<()> {
    let cryptor = open(profile)?;
    let current = cryptor.public_key().unwrap_or_default();
    let keys = cryptor.get_known_public_keys();

    if json {
        let entries: Vec<_> = keys
            .iter()
            .map(|k| {
                serde_json::json!({
                    "public_key": k,
                    "current": trim_pub_key(k) == current
                })
            })
            .collect();
        let result = serde_json::json!({
            "keys": entries,
            "count": keys.len()
        });
        output::data(&serde_json::to_string_pretty(&result)?);
    } else if keys.is_empty() {
        output::dimmed("no trusted keys");
    } else {
        output::blank();
        output::header(&format!("{} trusted keys", keys.len()));
        output::rule();
        for key in &keys {
            if trim_pub_key(key) == current {
                output::list_item(&format!("{} (you)", short_key(key)));
            } else {
                output::list_item(&short_key(key));
            }
        }
    }
    Ok(())
}

/// Print one decrypted file to stdout.
pub fn reveal(profile: &str, path: &str) -> Result<()> {
    let repo = context::open_repo()?;
    let cryptor = context::open_cryptor(&repo, profile)?;
    let path = context::repo_path(repo.workdir(), path)?;
    let content = cryptor.get_and_decrypt_file_content(&path)?;
    // Raw bytes for piping
    let mut stdout = std::io::stdout().lock();
    stdout.write_all(&content)?;
    stdout.flush()?;
    Ok(())
}

fn open(profile: &str) -> Result<Cryptor> {
    context::open_cryptor(&context::open_repo()?, profile)
}

fn count_files(cryptor: &Cryptor) -> String {
    match cryptor.registered_files().len() {
        1 => "1 file".to_string(),
        n => format!("{} files", n),
    }
}
