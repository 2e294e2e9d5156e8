//! # Build Command Implementation
//!
//! This module implements the `build` subcommand, the default when no
//! subcommand is given. It runs the whole pipeline:
//!
//! 1. Read and validate the package manifest
//! 2. Import every block into the archive builder, preparing git checkouts on
//!    the way
//! 3. Configure the stub
//! 4. Commit the archive to its destination
//!
//! Nothing is written unless every step succeeds.

use anyhow::Result;
use clap::Args;
use std::time::Instant;

use phar_packager::config::PackageManifest;
use phar_packager::resolver::SourceResolver;
use phar_packager::suggestions;

use super::explain;
use crate::cli::GlobalArgs;

/// Build the archive described by the manifest
#[derive(Args, Debug, Default)]
pub struct BuildArgs {
    /// Fetch `<platform>` blocks from this repository instead of upstream.
    #[arg(long, value_name = "URL", env = "PHAR_PACKAGER_PLATFORM_URL")]
    pub platform_url: Option<String>,
}

/// Execute the `build` command.
pub fn execute(args: BuildArgs, global: &GlobalArgs) -> Result<()> {
    let start_time = Instant::now();
    let reporter = global.reporter();

    reporter.header("PHP Archive Packager");
    reporter.step(1, "reading the package manifest.");
    if !global.manifest.exists() {
        return Err(suggestions::manifest_not_found(&global.manifest));
    }
    let manifest = PackageManifest::load(&global.manifest).map_err(explain)?;

    if let Some(code) = &manifest.code {
        if let Some(dir) = code.target.destination.parent() {
            if !dir.is_dir() {
                return Err(suggestions::destination_dir_missing(dir));
            }
        }
    }

    let mut checkouts = global.checkout_store()?;
    let mut resolver = SourceResolver::new(&mut checkouts, &reporter);
    if let Some(url) = &args.platform_url {
        resolver = resolver.with_platform_url(url);
    }

    if let Some(summary) = resolver.build(&manifest).map_err(explain)? {
        reporter.success(&format!(
            "Wrote {} ({} entries, {} bytes) in {:.2?}",
            summary.path.display(),
            summary.entries,
            summary.bytes,
            start_time.elapsed()
        ));
    }
    Ok(())
}
