//! # Completions Command Implementation
//!
//! Prints a `clap_complete` script for the requested shell to stdout.
//!
//! ```bash
//! phar-packager completions bash > ~/.local/share/bash-completion/completions/phar-packager
//! phar-packager completions zsh > ~/.zfunc/_phar-packager
//! ```

use anyhow::Result;
use clap::{Args, Command, CommandFactory};
use clap_complete::{generate, Shell};
use std::io::{self, Write};

use crate::cli::Cli;

/// Generate shell completion scripts
#[derive(Args, Debug)]
pub struct CompletionsArgs {
    /// The shell to generate completions for
    #[arg(value_enum)]
    pub shell: Shell,
}

/// Execute the `completions` command.
pub fn execute(args: CompletionsArgs) -> Result<()> {
    write_completions(args.shell, &mut Cli::command(), &mut io::stdout())
}

fn write_completions(shell: Shell, cmd: &mut Command, out: &mut dyn Write) -> Result<()> {
    let name = cmd.get_name().to_string();
    generate(shell, cmd, name, out);
    Ok(())
}
