//! Error types.
//!
//! Each concern has its own error enum; all of them fold into [`Error`] so
//! callers can use `?` across module boundaries.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Cipher(#[from] CipherError),

    #[error(transparent)]
    Secrets(#[from] SecretsError),

    #[error(transparent)]
    Git(#[from] GitError),

    #[error(transparent)]
    Stack(#[from] StackError),

    #[error(transparent)]
    Placeholder(#[from] PlaceholderError),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("yaml error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Missing or conflicting configuration. Raised before any I/O happens.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("public key is not configured")]
    NoPublicKey,

    #[error("private key is not configured")]
    NoPrivateKey,

    #[error("git repo is not configured")]
    NoRepo,

    #[error("profile '{0}' not found (expected {1})")]
    ProfileNotFound(String, String),

    #[error("profile '{profile}': both {inline} and {path} are set")]
    Conflicting {
        profile: String,
        inline: &'static str,
        path: &'static str,
    },

    #[error("failed to read {path}: {source}")]
    ReadFile {
        path: String,
        source: std::io::Error,
    },

    #[error("failed to parse {path}: {source}")]
    Parse {
        path: String,
        source: serde_yaml::Error,
    },

    #[error("profile '{0}' already exists")]
    AlreadyInitialized(String),

    #[error("unable to determine home directory")]
    NoHomeDir,
}

#[derive(Error, Debug)]
pub enum CipherError {
    #[error("failed to parse public key: {0}")]
    InvalidPublicKey(String),

    #[error("failed to parse private key: {0}")]
    InvalidPrivateKey(String),

    #[error("unsupported key type: {0}")]
    UnsupportedKeyType(String),

    #[error("passphrase is required to parse private key")]
    PassphraseMissing,

    #[error("failed to parse private key with passphrase: {0}")]
    WrongPassphrase(String),

    #[error("key generation failed: {0}")]
    GenerationFailed(String),

    #[error("RSA key size {0} is too small (minimum {1} bits)")]
    KeyTooSmall(usize, usize),

    #[error("encryption failed: {0}")]
    EncryptionFailed(String),

    #[error("decryption failed: {0}")]
    DecryptionFailed(String),

    #[error("ed25519 decryption expects exactly one chunk, got {0}")]
    ChunkCount(usize),

    #[error("ciphertext too short: {0} bytes")]
    CiphertextTooShort(usize),

    #[error("failed to encode key: {0}")]
    Encoding(String),
}

#[derive(Error, Debug)]
pub enum SecretsError {
    #[error("current public key ({0}) is not found in secrets")]
    KeyNotFound(String),

    #[error("Change is not accepted")]
    ChangeNotAccepted,

    #[error("invalid answer for {0}: expected Y or N (gave up after {1} attempts)")]
    NoAnswer(String, usize),

    #[error("file {0} is not registered as secret")]
    NotRegistered(String),

    #[error("public key {0} is not a known recipient")]
    UnknownRecipient(String),

    #[error("refusing to remove the current public key")]
    RemoveCurrentKey,

    #[error("failed to decrypt {path}: {reason}")]
    Decrypt { path: String, reason: String },

    #[error("failed to encrypt {path} for {key}: {reason}")]
    Encrypt {
        path: String,
        key: String,
        reason: String,
    },
}

#[derive(Error, Debug)]
pub enum GitError {
    #[error("not a git repository (or any parent): {0}")]
    NotARepository(String),

    #[error("repository at {0} has no working tree")]
    Bare(String),

    #[error("path '{0}' is outside the working tree")]
    OutsideWorkdir(String),

    #[error("git error in {path}: {source}")]
    Repository {
        path: String,
        source: git2::Error,
    },

    #[error("failed to access {path}: {source}")]
    File {
        path: String,
        source: std::io::Error,
    },
}

#[derive(Error, Debug)]
pub enum StackError {
    #[error("stack '{0}' not found")]
    NotFound(String),

    #[error("stack '{stack}': {field} inherits from missing stack '{parent}'")]
    MissingParent {
        stack: String,
        field: String,
        parent: String,
    },

    #[error("stack '{stack}': {field} inherits from '{parent}', which does not define it")]
    MissingInherited {
        stack: String,
        field: String,
        parent: String,
    },

    #[error("stack '{stack}': {field} declares both inherit '{parent}' and type '{kind}'")]
    InheritConflict {
        stack: String,
        field: String,
        parent: String,
        kind: String,
    },

    #[error("stack '{stack}': inheritance cycle through {chain}")]
    Cycle { stack: String, chain: String },

    #[error("stack '{stack}': unsupported {field} type '{kind}'")]
    UnsupportedType {
        stack: String,
        field: String,
        kind: String,
    },

    #[error("stack '{stack}': invalid {field} config: {reason}")]
    InvalidConfig {
        stack: String,
        field: String,
        reason: String,
    },

    #[error("stack '{stack}': failed to parse {file}: {source}")]
    Parse {
        stack: String,
        file: String,
        source: serde_yaml::Error,
    },
}

#[derive(Error, Debug)]
pub enum PlaceholderError {
    #[error("stack '{stack}': unknown placeholder kind '{kind}' in '{token}'")]
    UnknownKind {
        stack: String,
        kind: String,
        token: String,
    },

    #[error("stack '{stack}': failed to resolve ${{{kind}:{arg}}}: {reason}")]
    Unresolved {
        stack: String,
        kind: String,
        arg: String,
        reason: String,
    },

    #[error("stack '{stack}': placeholder nesting too deep in '{token}'")]
    TooDeep { stack: String, token: String },
}

pub type Result<T> = std::result::Result<T, Error>;
