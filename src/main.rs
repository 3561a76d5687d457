//! sc - encrypted secrets and stack resolution for infrastructure-as-config.

use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use simple_container::cli::output;
use simple_container::cli::{execute, Cli};
use simple_container::error::{ConfigError, Error, SecretsError};

fn main() {
    let cli = Cli::parse();
    output::init_colors();

    let filter = EnvFilter::try_from_env("SC_LOG").unwrap_or_else(|_| {
        if cli.verbose {
            EnvFilter::new("simple_container=debug")
        } else {
            EnvFilter::new("simple_container=warn")
        }
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false).without_time())
        .init();

    if let Err(e) = execute(cli.command, &cli.profile) {
        let suggestion = match &e {
            Error::Config(ConfigError::ProfileNotFound(..))
            | Error::Config(ConfigError::NoPublicKey)
            | Error::Config(ConfigError::NoPrivateKey) => Some("run: sc init".to_string()),
            Error::Config(ConfigError::AlreadyInitialized(_)) => {
                Some("run: sc init --force to replace it".to_string())
            }
            Error::Secrets(SecretsError::KeyNotFound(_)) => Some(
                "ask a teammate to run: sc secrets allow \"<your public key>\"".to_string(),
            ),
            Error::Secrets(SecretsError::ChangeNotAccepted) => {
                Some("rerun with --yes to accept the change".to_string())
            }
            _ => None,
        };

        output::error(&e.to_string());
        if let Some(hint) = suggestion {
            output::hint(&hint);
        }
        std::process::exit(1);
    }
}
