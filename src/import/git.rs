//! Repository imports

use super::{Importer, RawImporter};
use crate::archive::ArchiveBuilder;
use crate::cache::CheckoutStore;
use crate::config::GitImport;
use crate::error::Result;
use log::info;

/// Imports files and folders from a git repository.
///
/// The checkout is brought to the requested ref and cleaned before any file
/// is read. Children resolve against the checkout root and land below the
/// block's `localPath`.
pub struct GitImporter<'a> {
    checkouts: &'a mut CheckoutStore,
    import: &'a GitImport,
}

impl<'a> GitImporter<'a> {
    pub fn new(checkouts: &'a mut CheckoutStore, import: &'a GitImport) -> Self {
        Self { checkouts, import }
    }
}

impl Importer for GitImporter<'_> {
    fn import(&mut self, builder: &mut ArchiveBuilder, namespace: &str) -> Result<usize> {
        let import = self.import;
        info!("Importing {} at {}", import.url, import.reference);
        let checkout = self.checkouts.prepare(&import.url, &import.reference)?;

        RawImporter::new(&checkout, &import.local_path, &import.sources).import(builder, namespace)
    }
}
