//! # Validate Command Implementation
//!
//! This module implements the `validate` subcommand, which loads the package
//! manifest and converts it into the typed schema without building anything.
//!
//! ## Functionality
//!
//! - **Manifest Validation**: parses the XML and rejects unknown tags, a
//!   missing destination, duplicate `code` or `platform` nodes.
//! - **Block Summary**: lists each import block with its namespace.
//! - **Source Check**: reports local files and folders that do not exist.
//!
//! This command never runs git and never touches the destination.

use anyhow::Result;
use clap::Args;

use phar_packager::config::{ImportEntry, PackageManifest, PackageSelection, SourceImport, StubConfig};
use phar_packager::output::{emoji, OutputConfig};
use phar_packager::suggestions;

use super::explain;
use crate::cli::GlobalArgs;

/// Check the manifest without building anything
#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Use strict validation (fail when local sources are missing).
    #[arg(long)]
    pub strict: bool,
}

/// Execute the `validate` command.
pub fn execute(args: ValidateArgs, global: &GlobalArgs) -> Result<()> {
    let out = global.output();
    let manifest_path = &global.manifest;
    println!(
        "{} Validating manifest: {}",
        emoji(&out, "🔍", "[SCAN]"),
        manifest_path.display()
    );

    if !manifest_path.exists() {
        return Err(suggestions::manifest_not_found(manifest_path));
    }
    let manifest = match PackageManifest::load(manifest_path) {
        Ok(manifest) => {
            println!("{} Manifest parsed successfully", emoji(&out, "✅", "[OK]"));
            manifest
        }
        Err(e) => {
            println!("{} Manifest validation failed", emoji(&out, "❌", "[ERR]"));
            return Err(explain(e));
        }
    };

    let Some(code) = &manifest.code else {
        println!(
            "{} No code section found; a build would write nothing",
            emoji(&out, "⚠️", "[WARN]")
        );
        return Ok(());
    };

    println!("\n{} Manifest Summary:", emoji(&out, "📊", "[INFO]"));
    println!("   Destination: {}", code.target.destination.display());
    if let Some(alias) = &code.target.alias {
        println!("   Alias: {}", alias);
    }
    println!("   Minify: {}", if code.target.minify { "yes" } else { "no" });
    match &code.stub {
        StubConfig::File(path) => println!("   Stub: {}", path.display()),
        StubConfig::Generated { cli, web } => println!(
            "   Stub: generated (cli {}, web {})",
            if cli.is_empty() { "index.php" } else { cli.as_str() },
            if web.is_empty() { "same as cli" } else { web.as_str() }
        ),
    }
    println!("   Import blocks: {}", code.blocks.len());

    let mut missing = 0;
    for (index, block) in code.blocks.iter().enumerate() {
        let namespace = if block.namespace.is_empty() {
            String::new()
        } else {
            format!(" [namespace {}]", block.namespace)
        };
        println!("   {}. {}{}", index + 1, describe(&block.entry), namespace);

        if let ImportEntry::Source(source) = &block.entry {
            let path = manifest.base_dir.join(source_path(source));
            if !path.exists() {
                missing += 1;
                println!(
                    "      {} {} does not exist",
                    emoji(&out, "⚠️", "[WARN]"),
                    path.display()
                );
            }
        }
    }

    report_result(&out, missing, args.strict)
}

fn report_result(out: &OutputConfig, missing: usize, strict: bool) -> Result<()> {
    println!();
    if missing == 0 {
        println!("{} Manifest is valid", emoji(out, "✅", "[OK]"));
        Ok(())
    } else if strict {
        anyhow::bail!("{} local source(s) are missing", missing)
    } else {
        println!(
            "{} Manifest is valid with {} missing local source(s)",
            emoji(out, "⚠️", "[WARN]"),
            missing
        );
        Ok(())
    }
}

fn source_path(source: &SourceImport) -> &str {
    match source {
        SourceImport::File { path, .. } | SourceImport::Folder { path, .. } => path,
    }
}

fn describe(entry: &ImportEntry) -> String {
    match entry {
        ImportEntry::Source(SourceImport::File { path, local_path }) => {
            format!("file {} -> /{}", path, local_path)
        }
        ImportEntry::Source(SourceImport::Folder {
            path,
            local_path,
            recursive,
        }) => format!(
            "folder {} -> /{}{}",
            path,
            local_path,
            if *recursive { " (recursive)" } else { "" }
        ),
        ImportEntry::Git(git) => format!(
            "git {} at {} ({} source(s))",
            git.url,
            git.reference,
            git.sources.len()
        ),
        ImportEntry::Platform(platform) => {
            let packages = match &platform.packages {
                PackageSelection::All => "all packages".to_string(),
                PackageSelection::Include(names) => format!("packages {}", names.join(", ")),
                PackageSelection::Exclude(names) => format!("all packages except {}", names.join(", ")),
            };
            format!("platform {} ({})", platform.version, packages)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use phar_packager::config::GitImport;

    #[test]
    fn test_describe_entries() {
        let folder = ImportEntry::Source(SourceImport::Folder {
            path: "src".to_string(),
            local_path: "lib".to_string(),
            recursive: true,
        });
        assert_eq!(describe(&folder), "folder src -> /lib (recursive)");

        let git = ImportEntry::Git(GitImport {
            url: "https://example.com/r.git".to_string(),
            reference: "v2".to_string(),
            local_path: String::new(),
            sources: Vec::new(),
        });
        assert_eq!(describe(&git), "git https://example.com/r.git at v2 (0 source(s))");
    }

    #[test]
    fn test_strict_fails_on_missing_sources() {
        let out = OutputConfig::plain();
        assert!(report_result(&out, 0, true).is_ok());
        assert!(report_result(&out, 2, false).is_ok());
        assert!(report_result(&out, 2, true).is_err());
    }
}
