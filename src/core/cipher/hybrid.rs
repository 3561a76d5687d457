//! Ed25519 hybrid backend.
//!
//! Ed25519 keys cannot encrypt directly, so a symmetric key is derived with
//! HKDF-SHA256 (ikm = recipient public key, random salt) and the plaintext is
//! sealed with ChaCha20-Poly1305. Output layout: `base64(salt || nonce || ct)`.

use base64::{engine::general_purpose::STANDARD, Engine};
use chacha20poly1305::aead::{Aead, KeyInit};
use chacha20poly1305::{ChaCha20Poly1305, Key, Nonce};
use ed25519_dalek::{SigningKey, VerifyingKey};
use hkdf::Hkdf;
use rand::rngs::OsRng;
use rand::RngCore;
use sha2::Sha256;
use tracing::trace;
use zeroize::Zeroizing;

use super::Cipher;
use crate::core::constants::{ED25519_HKDF_INFO, ED25519_NONCE_LEN, ED25519_SALT_LEN};
use crate::error::{CipherError, Result};

/// HKDF + ChaCha20-Poly1305 cipher for Ed25519 recipients.
pub struct Ed25519Hybrid;

fn derive_key(public: &VerifyingKey, salt: &[u8]) -> Result<Zeroizing<[u8; 32]>> {
    let hk = Hkdf::<Sha256>::new(Some(salt), public.as_bytes());
    let mut key = Zeroizing::new([0u8; 32]);
    hk.expand(ED25519_HKDF_INFO, &mut *key)
        .map_err(|e| CipherError::EncryptionFailed(format!("key derivation: {}", e)))?;
    Ok(key)
}

impl Cipher for Ed25519Hybrid {
    type Recipient = VerifyingKey;
    type Identity = SigningKey;

    fn name(&self) -> &'static str {
        "ed25519-chacha20poly1305"
    }

    fn encrypt(&self, plaintext: &[u8], recipient: &VerifyingKey) -> Result<Vec<String>> {
        trace!(cipher = self.name(), plaintext_len = plaintext.len(), "encrypting");

        let mut salt = [0u8; ED25519_SALT_LEN];
        OsRng.fill_bytes(&mut salt);
        let key = derive_key(recipient, &salt)?;

        let mut nonce = [0u8; ED25519_NONCE_LEN];
        OsRng.fill_bytes(&mut nonce);

        let cipher = ChaCha20Poly1305::new(Key::from_slice(&key[..]));
        let sealed = cipher
            .encrypt(Nonce::from_slice(&nonce), plaintext)
            .map_err(|e| CipherError::EncryptionFailed(e.to_string()))?;

        let mut out = Vec::with_capacity(salt.len() + nonce.len() + sealed.len());
        out.extend_from_slice(&salt);
        out.extend_from_slice(&nonce);
        out.extend_from_slice(&sealed);

        Ok(vec![STANDARD.encode(out)])
    }

    fn decrypt(&self, chunks: &[String], identity: &SigningKey) -> Result<Vec<u8>> {
        trace!(cipher = self.name(), chunks = chunks.len(), "decrypting");
        if chunks.len() != 1 {
            return Err(CipherError::ChunkCount(chunks.len()).into());
        }

        let data = STANDARD
            .decode(&chunks[0])
            .map_err(|e| CipherError::DecryptionFailed(format!("invalid base64: {}", e)))?;
        if data.len() < ED25519_SALT_LEN + ED25519_NONCE_LEN {
            return Err(CipherError::CiphertextTooShort(data.len()).into());
        }

        let (salt, rest) = data.split_at(ED25519_SALT_LEN);
        let (nonce, sealed) = rest.split_at(ED25519_NONCE_LEN);
        let key = derive_key(&identity.verifying_key(), salt)?;

        let cipher = ChaCha20Poly1305::new(Key::from_slice(&key[..]));
        cipher
            .decrypt(Nonce::from_slice(nonce), sealed)
            .map_err(|e| CipherError::DecryptionFailed(e.to_string()).into())
    }
}
