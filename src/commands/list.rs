//! # List Command Implementation
//!
//! This module implements the `list` subcommand, which reads a built archive
//! back and lists its entries.
//!
//! ## Functionality
//!
//! - **Verification**: the signature and every entry checksum are checked
//!   while decoding; a damaged archive is an error.
//! - **Pattern Filtering**: supports glob patterns to filter the output
//! - **Detailed Output**: optional long format showing size and timestamp
//! - **Sorting**: entries can be kept in archive order or sorted by path or size
//!
//! This command is a safe, read-only operation that does not modify any files.

use anyhow::{Context, Result};
use clap::{Args, ValueEnum};
use std::path::PathBuf;

use phar_packager::archive::phar::{self, PharEntry};
use phar_packager::output::emoji;

use crate::cli::GlobalArgs;

/// List the entries of a built archive
#[derive(Args, Debug)]
pub struct ListArgs {
    /// Path to the archive.
    #[arg(value_name = "ARCHIVE")]
    pub archive: PathBuf,

    /// Filter entries by glob pattern (e.g., "*.php", "lib/**/*.php").
    #[arg(short, long, value_name = "PATTERN")]
    pub pattern: Option<String>,

    /// Use long listing format showing size and timestamp.
    #[arg(short, long)]
    pub long: bool,

    /// Sort order for the listing.
    #[arg(short, long, value_enum, default_value = "archive")]
    pub sort: SortOrder,

    /// Show only the number of entries.
    #[arg(long)]
    pub count: bool,

    /// Reverse the sort order.
    #[arg(short, long)]
    pub reverse: bool,
}

/// Sort order options for the listing
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Default)]
pub enum SortOrder {
    /// Order in which entries were written
    #[default]
    Archive,
    /// Sort by entry path
    Path,
    /// Sort by entry size
    Size,
}

/// Execute the `list` command.
pub fn execute(args: ListArgs, global: &GlobalArgs) -> Result<()> {
    let out = global.output();
    let archive = phar::read_archive(&args.archive)
        .with_context(|| format!("Failed to read archive {}", args.archive.display()))?;

    let mut entries: Vec<&PharEntry> = archive.entries.iter().collect();
    if let Some(pattern) = &args.pattern {
        let glob_pattern = glob::Pattern::new(pattern)
            .map_err(|e| anyhow::anyhow!("Invalid glob pattern '{}': {}", pattern, e))?;
        entries.retain(|entry| glob_pattern.matches(&entry.name));
    }
    sort_entries(&mut entries, args.sort);
    if args.reverse {
        entries.reverse();
    }

    if args.count {
        println!("{}", entries.len());
        return Ok(());
    }

    if !global.quiet {
        println!(
            "{} {} (alias {})",
            emoji(&out, "📦", "[PHAR]"),
            args.archive.display(),
            archive.alias
        );
    }

    for entry in &entries {
        if args.long {
            println!(
                "{:>8} {:>10} {}",
                format_size(entry.content.len()),
                entry.timestamp,
                entry.name
            );
        } else {
            println!("{}", entry.name);
        }
    }

    if !global.quiet {
        let total_size: usize = entries.iter().map(|e| e.content.len()).sum();
        println!();
        println!("{} entr(ies), {} total", entries.len(), format_size(total_size));
    }

    Ok(())
}

fn sort_entries(entries: &mut [&PharEntry], order: SortOrder) {
    match order {
        SortOrder::Archive => {}
        SortOrder::Path => entries.sort_by(|a, b| a.name.cmp(&b.name)),
        SortOrder::Size => entries.sort_by_key(|e| e.content.len()),
    }
}

/// Format a size in human-readable form
fn format_size(size: usize) -> String {
    const KB: usize = 1024;
    const MB: usize = KB * 1024;

    if size >= MB {
        format!("{:.1}M", size as f64 / MB as f64)
    } else if size >= KB {
        format!("{:.1}K", size as f64 / KB as f64)
    } else {
        format!("{}B", size)
    }
}
