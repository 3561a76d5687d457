//! `sc completions <shell>`.
//!
//! Prints a completion script for the `sc` binary to stdout. The script is
//! derived from the clap definition, so it covers `init` and every `secrets`
//! and `stack` subcommand with their flags.

use clap::CommandFactory;
use clap_complete::{generate, Shell as CompletionShell};

use crate::cli::{Cli, Shell};
use crate::error::Result;

/// Write the completion script for `shell` to stdout.
pub fn execute(shell: Shell) -> Result<()> {
    let mut cmd = Cli::command();
    let shell = match shell {
        Shell::Bash => CompletionShell::Bash,
        Shell::Zsh => CompletionShell::Zsh,
        Shell::Fish => CompletionShell::Fish,
        Shell::PowerShell => CompletionShell::PowerShell,
    };

    generate(shell, &mut cmd, "sc", &mut std::io::stdout());
    Ok(())
}
