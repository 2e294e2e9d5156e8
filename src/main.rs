//! # PHP Archive Packager CLI
//!
//! Binary entry point for `phar-packager`. It parses arguments with `clap`
//! and hands off to the subcommand; errors are printed by `anyhow` and turn
//! into exit status 1.
//!
//! All packaging logic lives in the `phar_packager` library crate.

mod cli;
mod commands;

use anyhow::Result;
use clap::Parser;

fn main() -> Result<()> {
    let cli = cli::Cli::parse();
    cli.execute()
}
