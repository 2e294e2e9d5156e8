//! CLI argument parsing and command dispatch

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use phar_packager::cache::{default_cache_root, CheckoutStore};
use phar_packager::git::SystemGit;
use phar_packager::output::{OutputConfig, Reporter};

use crate::commands;

/// Default manifest file name, looked up in the current directory.
pub const DEFAULT_MANIFEST: &str = "packager.xml";

/// PHP Archive Packager - Build a Phar from an XML manifest
#[derive(Parser, Debug)]
#[command(name = "phar-packager")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to execute (defaults to `build`)
    #[command(subcommand)]
    command: Option<Commands>,

    #[command(flatten)]
    global: GlobalArgs,
}

/// Flags shared by every subcommand.
#[derive(Args, Debug, Clone)]
pub struct GlobalArgs {
    /// Path to the package manifest
    #[arg(
        short = 'f',
        long = "file",
        global = true,
        value_name = "PATH",
        env = "PHAR_PACKAGER_MANIFEST",
        default_value = DEFAULT_MANIFEST
    )]
    pub manifest: PathBuf,

    /// Directory holding repository checkouts.
    ///
    /// Defaults to the system cache directory (`~/.cache/phar-packager` on
    /// Linux), or the temp directory when there is none.
    #[arg(long, global = true, value_name = "DIR", env = "PHAR_PACKAGER_CACHE")]
    pub cache_root: Option<PathBuf>,

    /// Kill any git command running longer than this many seconds
    #[arg(long, global = true, value_name = "SECONDS", env = "PHAR_PACKAGER_GIT_TIMEOUT")]
    pub git_timeout: Option<u64>,

    /// Colorize output (always, never, auto)
    #[arg(long, global = true, value_name = "WHEN", default_value = "auto")]
    pub color: String,

    /// Set log level (error, warn, info, debug, trace)
    #[arg(long, global = true, value_name = "LEVEL", default_value = "warn")]
    pub log_level: String,

    /// Print nothing but errors
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

impl GlobalArgs {
    pub fn output(&self) -> OutputConfig {
        OutputConfig::from_env_and_flag(&self.color)
    }

    pub fn reporter(&self) -> Reporter {
        Reporter::new(self.quiet, self.output())
    }

    /// Checkout store at the configured root, driving the system git.
    pub fn checkout_store(&self) -> Result<CheckoutStore> {
        let root = self.cache_root.clone().unwrap_or_else(default_cache_root);
        let timeout = self.git_timeout.map(Duration::from_secs);
        if timeout == Some(Duration::ZERO) {
            anyhow::bail!("--git-timeout must be at least one second");
        }
        std::fs::create_dir_all(&root)
            .with_context(|| format!("Failed to create cache root {}", root.display()))?;
        Ok(CheckoutStore::new(root, Arc::new(SystemGit::new(timeout))))
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Build the archive described by the manifest
    Build(commands::build::BuildArgs),

    /// Check the manifest without building anything
    Validate(commands::validate::ValidateArgs),

    /// List the entries of a built archive
    List(commands::list::ListArgs),

    /// Generate shell completion scripts
    Completions(commands::completions::CompletionsArgs),
}

impl Cli {
    /// Execute the CLI command
    pub fn execute(self) -> Result<()> {
        init_logging(&self.global.log_level);

        match self.command {
            None => commands::build::execute(commands::build::BuildArgs::default(), &self.global),
            Some(Commands::Build(args)) => commands::build::execute(args, &self.global),
            Some(Commands::Validate(args)) => commands::validate::execute(args, &self.global),
            Some(Commands::List(args)) => commands::list::execute(args, &self.global),
            Some(Commands::Completions(args)) => commands::completions::execute(args),
        }
    }
}

fn init_logging(level: &str) {
    // RUST_LOG wins over the flag
    let env = env_logger::Env::default().default_filter_or(level);
    // A second initialization only happens in tests driving `execute` twice
    let _ = env_logger::Builder::from_env(env)
        .format_timestamp(None)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_no_subcommand_defaults() {
        let cli = Cli::try_parse_from(["phar-packager"]).unwrap();
        assert!(cli.command.is_none());
        assert_eq!(cli.global.manifest, PathBuf::from(DEFAULT_MANIFEST));
        assert_eq!(cli.global.log_level, "warn");
        assert!(!cli.global.quiet);
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "phar-packager",
            "validate",
            "-f",
            "other.xml",
            "--git-timeout",
            "30",
            "-q",
        ])
        .unwrap();
        assert!(matches!(cli.command, Some(Commands::Validate(_))));
        assert_eq!(cli.global.manifest, PathBuf::from("other.xml"));
        assert_eq!(cli.global.git_timeout, Some(30));
        assert!(cli.global.quiet);
    }

    #[test]
    fn test_zero_timeout_is_rejected() {
        let cli = Cli::try_parse_from(["phar-packager", "--git-timeout", "0"]).unwrap();
        assert!(cli.global.checkout_store().is_err());
    }
}
