//! # CLI Command Implementations
//!
//! One module per subcommand of `phar-packager`. Each module has an `Args`
//! struct derived with `clap` and an `execute` function that drives the
//! `phar_packager` library.

pub mod build;
pub mod completions;
pub mod list;
pub mod validate;

use phar_packager::error::Error;
use phar_packager::suggestions;

/// Attach user-facing hints to a library error.
pub(crate) fn explain(err: Error) -> anyhow::Error {
    match err {
        Error::Process {
            command, output, ..
        } => suggestions::git_failed(&command, &output),
        other => other.into(),
    }
}
