//! # Importers
//!
//! An importer turns one import block of the manifest into archive entries.
//! Three kinds exist, one per source:
//!
//! - [`RawImporter`]: files and folders on the local filesystem, resolved
//!   against a base directory.
//! - [`GitImporter`]: files and folders from a repository checkout, prepared
//!   through the [`crate::cache::CheckoutStore`] before anything is read.
//! - [`PlatformImporter`]: the fixed layout of the platform bundle.
//!
//! Every importer receives the namespace of its block as an argument and
//! hands it on to each builder call, so no namespace state outlives the block.

pub mod git;
pub mod platform;
pub mod raw;

pub use git::GitImporter;
pub use platform::{select_packages, PlatformImporter, PLATFORM_URL};
pub use raw::RawImporter;

use crate::archive::ArchiveBuilder;
use crate::error::Result;

/// Imports one block into the archive.
pub trait Importer {
    /// Add the block's files to `builder`, rewriting source files to
    /// `namespace`. Returns the number of entries written.
    fn import(&mut self, builder: &mut ArchiveBuilder, namespace: &str) -> Result<usize>;
}
