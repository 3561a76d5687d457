//! Cryptographic operations.
//!
//! Stateless encryption/decryption of secret file contents for a single
//! recipient key. Two schemes are supported, selected by the recipient's
//! key type:
//!
//! - **RSA**: plaintext split into `key_size / 2` byte chunks, each chunk
//!   encrypted with OAEP/SHA-256 and base64 encoded.
//! - **Ed25519**: hybrid scheme. A ChaCha20-Poly1305 key is derived with
//!   HKDF-SHA256 from the recipient public key and a random salt; the output
//!   is a single `base64(salt || nonce || ciphertext)` chunk.
//!
//! ## Adding a New Scheme
//!
//! 1. Implement the `Cipher` trait in a new file
//! 2. Add variants to [`PublicKey`] and [`PrivateKey`] in `keys`
//! 3. Dispatch to it from [`encrypt_large_string`] and [`decrypt`]

use crate::error::{CipherError, Result};

mod hybrid;
pub mod keys;
mod oaep;

pub use hybrid::Ed25519Hybrid;
pub use keys::{
    generate_ed25519_key_pair, generate_key_pair, marshal_ed25519_private_key,
    marshal_ed25519_public_key, marshal_public_key, marshal_rsa_private_key, parse_private_key,
    parse_public_key, short_key, trim_pub_key, PrivateKey, PublicKey,
};
pub use oaep::RsaOaep;

/// Encryption scheme for one recipient.
///
/// The ciphertext is an ordered list of base64 chunks; the order must be
/// preserved for decryption to reconstruct the plaintext.
pub trait Cipher {
    /// Public key the plaintext is encrypted for.
    type Recipient;

    /// Private key able to decrypt.
    type Identity;

    /// Encrypt plaintext for a single recipient.
    ///
    /// # Errors
    ///
    /// Returns `CipherError::EncryptionFailed` if any chunk cannot be sealed.
    fn encrypt(&self, plaintext: &[u8], recipient: &Self::Recipient) -> Result<Vec<String>>;

    /// Decrypt chunks produced by [`Cipher::encrypt`].
    ///
    /// # Errors
    ///
    /// Returns `CipherError` if a chunk fails to decode or decrypt.
    fn decrypt(&self, chunks: &[String], identity: &Self::Identity) -> Result<Vec<u8>>;

    /// Scheme name for logs.
    fn name(&self) -> &'static str;
}

/// Encrypt plaintext for a public key, dispatching on its type.
pub fn encrypt_large_string(key: &PublicKey, plaintext: &[u8]) -> Result<Vec<String>> {
    match key {
        PublicKey::Rsa(k) => RsaOaep.encrypt(plaintext, k),
        PublicKey::Ed25519(k) => Ed25519Hybrid.encrypt(plaintext, k),
    }
}

/// Decrypt RSA-OAEP chunks.
pub fn decrypt_large_string(key: &rsa::RsaPrivateKey, chunks: &[String]) -> Result<Vec<u8>> {
    RsaOaep.decrypt(chunks, key)
}

/// Decrypt the single hybrid chunk produced for an Ed25519 recipient.
pub fn decrypt_large_string_with_ed25519(
    key: &ed25519_dalek::SigningKey,
    chunks: &[String],
) -> Result<Vec<u8>> {
    Ed25519Hybrid.decrypt(chunks, key)
}

/// Decrypt chunks with any supported private key.
pub fn decrypt(key: &PrivateKey, chunks: &[String]) -> Result<Vec<u8>> {
    match key {
        PrivateKey::Rsa(k) => decrypt_large_string(k, chunks),
        PrivateKey::Ed25519(k) => decrypt_large_string_with_ed25519(k, chunks),
    }
}

/// Parse an authorized-key line and encrypt for it in one step.
///
/// # Errors
///
/// Returns `CipherError::UnsupportedKeyType` for keys that are neither RSA
/// nor Ed25519.
pub fn encrypt_for(public_key: &str, plaintext: &[u8]) -> Result<Vec<String>> {
    let key = parse_public_key(public_key)?;
    encrypt_large_string(&key, plaintext).map_err(|e| match e {
        crate::error::Error::Cipher(CipherError::EncryptionFailed(reason)) => {
            CipherError::EncryptionFailed(format!("{}: {}", short_key(public_key), reason)).into()
        }
        other => other,
    })
}
