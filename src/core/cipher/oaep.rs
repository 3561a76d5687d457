//! RSA-OAEP chunked backend.
//!
//! Each chunk holds at most `key_size / 2` plaintext bytes, which leaves room
//! for the OAEP/SHA-256 padding overhead on keys of 2048 bits and up.

use base64::{engine::general_purpose::STANDARD, Engine};
use rand::rngs::OsRng;
use rsa::traits::PublicKeyParts;
use rsa::{Oaep, RsaPrivateKey, RsaPublicKey};
use sha2::Sha256;
use tracing::trace;

use super::Cipher;
use crate::error::{CipherError, Result};

/// RSA-OAEP (SHA-256) chunked cipher.
pub struct RsaOaep;

impl Cipher for RsaOaep {
    type Recipient = RsaPublicKey;
    type Identity = RsaPrivateKey;

    fn name(&self) -> &'static str {
        "rsa-oaep"
    }

    fn encrypt(&self, plaintext: &[u8], recipient: &RsaPublicKey) -> Result<Vec<String>> {
        let chunk_size = recipient.size() / 2;
        trace!(
            cipher = self.name(),
            plaintext_len = plaintext.len(),
            chunk_size,
            "encrypting"
        );

        // An empty plaintext still produces one chunk so the entry is never empty.
        let pieces: Vec<&[u8]> = if plaintext.is_empty() {
            vec![plaintext]
        } else {
            plaintext.chunks(chunk_size).collect()
        };

        let mut rng = OsRng;
        let mut chunks = Vec::with_capacity(pieces.len());
        for piece in pieces {
            let encrypted = recipient
                .encrypt(&mut rng, Oaep::new::<Sha256>(), piece)
                .map_err(|e| CipherError::EncryptionFailed(e.to_string()))?;
            chunks.push(STANDARD.encode(encrypted));
        }

        trace!(cipher = self.name(), chunks = chunks.len(), "encrypted");
        Ok(chunks)
    }

    fn decrypt(&self, chunks: &[String], identity: &RsaPrivateKey) -> Result<Vec<u8>> {
        trace!(cipher = self.name(), chunks = chunks.len(), "decrypting");

        let mut plaintext = Vec::new();
        for (i, chunk) in chunks.iter().enumerate() {
            let encrypted = STANDARD.decode(chunk).map_err(|e| {
                CipherError::DecryptionFailed(format!("chunk {}: invalid base64: {}", i, e))
            })?;
            let decrypted = identity
                .decrypt(Oaep::new::<Sha256>(), &encrypted)
                .map_err(|e| CipherError::DecryptionFailed(format!("chunk {}: {}", i, e)))?;
            plaintext.extend_from_slice(&decrypted);
        }

        Ok(plaintext)
    }
}
