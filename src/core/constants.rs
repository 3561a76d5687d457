//! Constants used throughout simple-container.
//!
//! Centralizes magic strings and configuration values.

/// Project configuration directory relative to the repository root.
pub const SC_CONFIG_DIR: &str = ".sc";

/// Encrypted secrets store inside [`SC_CONFIG_DIR`].
pub const SECRETS_FILE: &str = "secrets.yaml";

/// Directory holding per-stack descriptors inside [`SC_CONFIG_DIR`].
pub const STACKS_DIR: &str = "stacks";

/// Descriptor file names inside a stack directory.
pub const SERVER_DESCRIPTOR: &str = "server.yaml";
pub const SECRETS_DESCRIPTOR: &str = "secrets.yaml";
pub const CLIENT_DESCRIPTOR: &str = "client.yaml";

/// Profile name used when none is given.
pub const DEFAULT_PROFILE: &str = "default";

/// Gitignore entry protecting profile files (they may carry private keys).
pub const PROFILE_IGNORE_ENTRY: &str = ".sc/cfg.*.yaml";

/// Ignore file maintained in the repository root.
pub const GITIGNORE_FILE: &str = ".gitignore";

/// Hex digits kept by `${git:commit.short}`.
pub const SHORT_COMMIT_LEN: usize = 7;

/// Branch HEAD points to in repositories created by `Workdir::init`.
pub const DEFAULT_BRANCH: &str = "main";

/// Default RSA key size for generated profiles.
pub const DEFAULT_RSA_BITS: usize = 4096;

/// Smallest RSA modulus whose half-size chunk still fits OAEP/SHA-256.
pub const MIN_RSA_BITS: usize = 2048;

/// HKDF info string for the Ed25519 hybrid scheme.
pub const ED25519_HKDF_INFO: &[u8] = b"ed25519-chacha20poly1305";

/// HKDF salt length for the Ed25519 hybrid scheme.
pub const ED25519_SALT_LEN: usize = 32;

/// ChaCha20-Poly1305 nonce length.
pub const ED25519_NONCE_LEN: usize = 12;

/// Attempts allowed for a Y/N confirmation before giving up.
pub const CONFIRM_ATTEMPTS: usize = 3;

/// Maximum depth for placeholders whose resolved value holds more placeholders.
pub const MAX_PLACEHOLDER_DEPTH: usize = 8;

/// Number of trailing key characters shown in errors and logs.
pub const SHORT_KEY_LEN: usize = 16;
