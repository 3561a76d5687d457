//! Command-line interface.

pub mod completions;
pub mod context;
pub mod init;
pub mod output;
pub mod secrets;
pub mod stack;

use clap::{Parser, Subcommand};

use crate::core::constants::DEFAULT_PROFILE;

/// Simple Container - secrets and stacks for infrastructure-as-config.
#[derive(Parser)]
#[command(
    name = "sc",
    about = "Encrypted secrets and stack resolution for infrastructure-as-config",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Profile to load keys from (.sc/cfg.<profile>.yaml)
    #[arg(short, long, global = true, env = "SC_PROFILE", default_value = DEFAULT_PROFILE)]
    pub profile: String,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

/// Top-level commands.
#[derive(Subcommand)]
pub enum Command {
    /// Generate a key pair and write the profile
    Init {
        /// Generate an Ed25519 key instead of RSA
        #[arg(long)]
        ed25519: bool,
        /// RSA key size in bits
        #[arg(long, default_value_t = crate::core::constants::DEFAULT_RSA_BITS)]
        bits: usize,
        /// Project name recorded in the profile
        #[arg(long)]
        project: Option<String>,
        /// Overwrite an existing profile
        #[arg(short, long)]
        force: bool,
    },

    /// Manage encrypted secret files
    Secrets {
        #[command(subcommand)]
        action: SecretsAction,
    },

    /// Inspect stacks
    Stack {
        #[command(subcommand)]
        action: StackAction,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Supported shells for completions.
#[derive(clap::ValueEnum, Clone, Debug)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    PowerShell,
}

/// Secrets subcommands.
#[derive(Subcommand)]
pub enum SecretsAction {
    /// Register files as secret and encrypt them
    Add {
        /// Paths relative to the repository root
        #[arg(required = true)]
        paths: Vec<String>,
    },

    /// Unregister secret files
    Delete {
        #[arg(required = true)]
        paths: Vec<String>,
    },

    /// List registered secret files
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Encrypt changed secret files for every recipient
    Encrypt {
        /// Re-encrypt files even if unchanged
        #[arg(short, long)]
        force: bool,
        /// Accept changes without confirmation
        #[arg(short, long)]
        yes: bool,
    },

    /// Decrypt all secret files into the working tree
    Decrypt {
        /// Overwrite local changes without confirmation
        #[arg(short, long)]
        yes: bool,
    },

    /// Trust a public key and re-encrypt for it
    Allow {
        /// SSH public key line ("ssh-rsa AAAA..." or "ssh-ed25519 AAAA...")
        key: String,
    },

    /// Revoke a public key
    Disallow {
        key: String,
    },

    /// List trusted public keys
    Keys {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print the decrypted content of one secret file
    Reveal {
        path: String,
    },
}

/// Stack subcommands.
#[derive(Subcommand)]
pub enum StackAction {
    /// List stacks
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print a stack after inheritance and placeholder resolution
    Resolve {
        /// Stack name
        name: String,
        /// Output as JSON instead of YAML
        #[arg(long)]
        json: bool,
    },
}

/// Execute a command.
pub fn execute(command: Command, profile: &str) -> crate::error::Result<()> {
    use Command::*;

    match command {
        Init {
            ed25519,
            bits,
            project,
            force,
        } => init::execute(profile, ed25519, bits, project, force),
        Secrets { action } => match action {
            SecretsAction::Add { paths } => secrets::add(profile, &paths),
            SecretsAction::Delete { paths } => secrets::delete(profile, &paths),
            SecretsAction::List { json } => secrets::list(profile, json),
            SecretsAction::Encrypt { force, yes } => secrets::encrypt(profile, force, yes),
            SecretsAction::Decrypt { yes } => secrets::decrypt(profile, yes),
            SecretsAction::Allow { key } => secrets::allow(profile, &key),
            SecretsAction::Disallow { key } => secrets::disallow(profile, &key),
            SecretsAction::Keys { json } => secrets::keys(profile, json),
            SecretsAction::Reveal { path } => secrets::reveal(profile, &path),
        },
        Stack { action } => match action {
            StackAction::List { json } => stack::list(json),
            StackAction::Resolve { name, json } => stack::resolve(profile, &name, json),
        },
        Completions { shell } => completions::execute(shell),
    }
}
