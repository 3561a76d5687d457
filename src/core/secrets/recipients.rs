//! Trusted public keys.

use tracing::info;

use super::Cryptor;
use crate::core::cipher::{parse_public_key, short_key, trim_pub_key};
use crate::error::{Result, SecretsError};

impl Cryptor {
    /// Trust a public key and encrypt every registered file for it.
    ///
    /// # Errors
    ///
    /// Fails if the key is not a valid RSA or Ed25519 authorized-key line, or
    /// an RSA key under 2048 bits. A failed call changes nothing.
    pub fn add_public_key(&self, public_key: &str) -> Result<()> {
        let mut state = self.state.write();
        let current = self.require_configured(&state)?;

        let key = trim_pub_key(public_key);
        parse_public_key(&key)?;
        info!(key = %short_key(&key), "adding recipient");

        self.update(&mut state, true, false, |secrets| {
            secrets.secrets.entry(current).or_default();
            secrets.secrets.entry(key).or_default();
            Ok(())
        })
    }

    /// Revoke a public key and re-encrypt for the remaining recipients.
    ///
    /// # Errors
    ///
    /// `SecretsError::UnknownRecipient` if the key is not trusted,
    /// `SecretsError::RemoveCurrentKey` for the cryptor's own key.
    pub fn remove_public_key(&self, public_key: &str) -> Result<()> {
        let mut state = self.state.write();
        let current = self.require_configured(&state)?;

        let key = trim_pub_key(public_key);
        if key == current {
            return Err(SecretsError::RemoveCurrentKey.into());
        }
        self.update(&mut state, true, false, |secrets| {
            if secrets.secrets.remove(&key).is_none() {
                return Err(SecretsError::UnknownRecipient(short_key(&key)).into());
            }
            info!(key = %short_key(&key), "removed recipient");
            Ok(())
        })
    }

    /// Normalized keys of every trusted recipient.
    pub fn get_known_public_keys(&self) -> Vec<String> {
        self.state.read().secrets.secrets.keys().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::sync::Arc;

    use tempfile::TempDir;

    use crate::core::cipher::{self, PrivateKey};
    use crate::core::console::Scripted;
    use crate::core::git::Workdir;
    use crate::core::secrets::Cryptor;

    fn keys() -> (String, String) {
        let (private, public) = cipher::generate_ed25519_key_pair().unwrap();
        (
            cipher::marshal_ed25519_public_key(&public).unwrap(),
            PrivateKey::Ed25519(private).to_pem().unwrap().to_string(),
        )
    }

    fn cryptor(tmp: &TempDir, (public, private): &(String, String)) -> Cryptor {
        Cryptor::builder()
            .repo(Arc::new(Workdir::init(tmp.path()).unwrap()))
            .console(Arc::new(Scripted::default()))
            .keys(public.as_str(), private.as_str())
            .build()
            .unwrap()
    }

    #[test]
    fn test_new_recipient_can_decrypt() {
        let tmp = TempDir::new().unwrap();
        let alice = keys();
        let bob = keys();
        fs::write(tmp.path().join("a.txt"), "shared").unwrap();

        let first = cryptor(&tmp, &alice);
        first.add_file("a.txt").unwrap();
        first
            .add_public_key(&format!("{} bob@laptop", bob.0))
            .unwrap();

        let second = cryptor(&tmp, &bob);
        assert_eq!(
            second.get_and_decrypt_file_content("a.txt").unwrap().as_slice(),
            b"shared"
        );
        assert_eq!(first.get_known_public_keys().len(), 2);
        assert!(first.get_known_public_keys().contains(&bob.0));
    }

    #[test]
    fn test_invalid_key_rejected() {
        let tmp = TempDir::new().unwrap();
        let first = cryptor(&tmp, &keys());
        assert!(first.add_public_key("ssh-rsa not-base64!").is_err());
        assert_eq!(first.get_known_public_keys().len(), 0);
    }

    #[test]
    fn test_removed_recipient_loses_access() {
        let tmp = TempDir::new().unwrap();
        let alice = keys();
        let bob = keys();
        fs::write(tmp.path().join("a.txt"), "shared").unwrap();

        let first = cryptor(&tmp, &alice);
        first.add_file("a.txt").unwrap();
        first.add_public_key(&bob.0).unwrap();
        first.remove_public_key(&bob.0).unwrap();

        let second = cryptor(&tmp, &bob);
        let err = second.decrypt_all(true).unwrap_err();
        assert!(err.to_string().contains("is not found in secrets"));
        assert!(err.to_string().contains(&bob.0));
    }

    #[test]
    fn test_cannot_remove_own_key() {
        let tmp = TempDir::new().unwrap();
        let alice = keys();
        let first = cryptor(&tmp, &alice);

        let err = first.remove_public_key(&alice.0).unwrap_err();
        assert_eq!(err.to_string(), "refusing to remove the current public key");
    }

    #[test]
    fn test_remove_unknown_key() {
        let tmp = TempDir::new().unwrap();
        let first = cryptor(&tmp, &keys());
        assert!(first.remove_public_key(&keys().0).is_err());
    }
}
