//! Simple Container - infrastructure-as-config tooling.
//!
//! # Architecture
//!
//! ```text
//! src/
//! ├── cli/              # Command-line interface
//! │   ├── init          # Generate a profile key pair
//! │   ├── secrets       # Secret file registry, encryption, recipients
//! │   ├── stack         # List and resolve stacks
//! │   └── completions   # Shell completions
//! └── core/             # Core library components
//!     ├── cipher/       # RSA-OAEP and Ed25519 hybrid encryption
//!     ├── config        # .sc/cfg.<profile>.yaml profiles
//!     ├── console       # Prompt/print abstraction
//!     ├── git           # Working directory access
//!     ├── secrets/      # Multi-recipient secrets.yaml cryptor
//!     ├── stack/        # Stack descriptors and inheritance
//!     └── placeholders/ # ${kind:arg} substitution
//! ```
//!
//! # Features
//!
//! - Secret files encrypted for every trusted public key
//! - RSA and Ed25519 SSH keys, optionally passphrase protected
//! - Interactive diff confirmation before overwriting changed secrets
//! - Stack descriptors with inheritance and placeholder substitution

pub mod cli;
pub mod core;
pub mod error;
