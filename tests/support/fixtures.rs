//! Key pairs and cryptors for library-level tests.

use std::sync::{Arc, OnceLock};

use simple_container::core::cipher::{self, PrivateKey};
use simple_container::core::console::Scripted;
use simple_container::core::git::Workdir;
use simple_container::core::secrets::Cryptor;

/// Authorized-key line and private key PEM.
#[derive(Clone)]
pub struct Keys {
    pub public: String,
    pub private: String,
}

/// Fresh Ed25519 key pair.
pub fn ed25519_keys() -> Keys {
    let (private, public) = cipher::generate_ed25519_key_pair().expect("ed25519 keygen");
    Keys {
        public: cipher::marshal_ed25519_public_key(&public).expect("marshal public"),
        private: PrivateKey::Ed25519(private)
            .to_pem()
            .expect("marshal private")
            .to_string(),
    }
}

/// RSA 2048 key pair, generated once per test binary.
pub fn rsa_keys() -> Keys {
    static KEYS: OnceLock<Keys> = OnceLock::new();
    KEYS.get_or_init(|| {
        let (private, public) = cipher::generate_key_pair(2048).expect("rsa keygen");
        Keys {
            public: cipher::marshal_public_key(&public).expect("marshal public"),
            private: cipher::marshal_rsa_private_key(&private)
                .expect("marshal private")
                .to_string(),
        }
    })
    .clone()
}

/// Cryptor over `root` answering prompts from `answers`.
pub fn cryptor_with(root: &std::path::Path, keys: &Keys, console: Arc<Scripted>) -> Cryptor {
    Cryptor::builder()
        .repo(Arc::new(Workdir::init(root).expect("init repository")))
        .console(console)
        .keys(keys.public.as_str(), keys.private.as_str())
        .build()
        .expect("build cryptor")
}

/// Cryptor over `root` that fails any prompt.
pub fn cryptor(root: &std::path::Path, keys: &Keys) -> Cryptor {
    cryptor_with(root, keys, Arc::new(Scripted::default()))
}
