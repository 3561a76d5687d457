//! Cipher engine properties.

mod support;

use proptest::prelude::*;
use simple_container::core::cipher::{
    self, decrypt, encrypt_large_string, parse_private_key, parse_public_key, trim_pub_key,
    PrivateKey, PublicKey,
};
use support::*;

fn rsa_pair() -> (PublicKey, PrivateKey) {
    let keys = rsa_keys();
    (
        parse_public_key(&keys.public).unwrap(),
        parse_private_key(&keys.private, None).unwrap(),
    )
}

#[test]
fn test_rsa_empty_and_multi_chunk() {
    let (public, private) = rsa_pair();

    let empty = encrypt_large_string(&public, b"").unwrap();
    assert_eq!(empty.len(), 1);
    assert_eq!(decrypt(&private, &empty).unwrap(), b"");

    // 2048-bit key: 128 plaintext bytes per chunk
    let large = vec![b'x'; 1000];
    let chunks = encrypt_large_string(&public, &large).unwrap();
    assert_eq!(chunks.len(), 8);
    assert_eq!(decrypt(&private, &chunks).unwrap(), large);
}

#[test]
fn test_rsa_chunk_order_matters() {
    let (public, private) = rsa_pair();
    let plaintext: Vec<u8> = (0..=255u8).collect();

    let mut chunks = encrypt_large_string(&public, &plaintext).unwrap();
    chunks.reverse();
    assert_ne!(decrypt(&private, &chunks).unwrap(), plaintext);
}

#[test]
fn test_ed25519_is_single_chunk_and_randomized() {
    let keys = ed25519_keys();
    let public = parse_public_key(&keys.public).unwrap();

    let first = encrypt_large_string(&public, b"same").unwrap();
    let second = encrypt_large_string(&public, b"same").unwrap();
    assert_eq!(first.len(), 1);
    assert_ne!(first, second);
}

#[test]
fn test_ed25519_rejects_multiple_chunks() {
    let keys = ed25519_keys();
    let public = parse_public_key(&keys.public).unwrap();
    let private = parse_private_key(&keys.private, None).unwrap();

    let mut chunks = encrypt_large_string(&public, b"one").unwrap();
    chunks.push(chunks[0].clone());
    let err = decrypt(&private, &chunks).unwrap_err();
    assert!(err.to_string().contains("exactly one chunk"));
}

#[test]
fn test_wrong_key_fails() {
    let alice = ed25519_keys();
    let bob = ed25519_keys();
    let chunks = cipher::encrypt_for(&alice.public, b"for alice").unwrap();

    let private = parse_private_key(&bob.private, None).unwrap();
    assert!(decrypt(&private, &chunks).is_err());
}

#[test]
fn test_encrypted_pkcs8_passphrase() {
    let (private, public) = cipher::generate_ed25519_key_pair().unwrap();
    let pem = PrivateKey::Ed25519(private).to_encrypted_pem("hunter2").unwrap();

    assert!(parse_private_key(&pem, None).is_err());
    assert!(parse_private_key(&pem, Some("wrong")).is_err());
    let key = parse_private_key(&pem, Some("hunter2")).unwrap();
    assert_eq!(key.public_key(), PublicKey::Ed25519(public));
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(16))]

    #[test]
    fn prop_rsa_roundtrip(plaintext in proptest::collection::vec(any::<u8>(), 0..600)) {
        let (public, private) = rsa_pair();
        let chunks = encrypt_large_string(&public, &plaintext).unwrap();
        prop_assert_eq!(decrypt(&private, &chunks).unwrap(), plaintext);
    }

    #[test]
    fn prop_ed25519_roundtrip(plaintext in proptest::collection::vec(any::<u8>(), 0..4096)) {
        let keys = ed25519_keys();
        let public = parse_public_key(&keys.public).unwrap();
        let private = parse_private_key(&keys.private, None).unwrap();

        let chunks = encrypt_large_string(&public, &plaintext).unwrap();
        prop_assert_eq!(decrypt(&private, &chunks).unwrap(), plaintext);
    }

    #[test]
    fn prop_trim_pub_key_idempotent(
        kind in "[a-z0-9-]{3,20}",
        data in "[A-Za-z0-9+/=]{4,80}",
        comment in "[ -~]{0,30}",
        padding in "[ \t]{0,3}",
    ) {
        let key = format!("{}{} {} {}", padding, kind, data, comment);
        let once = trim_pub_key(&key);
        prop_assert_eq!(trim_pub_key(&once), once.clone());
        prop_assert_eq!(once, format!("{} {}", kind, data));
    }
}
