//! # Source Resolver
//!
//! Walks the `code` section of a [`PackageManifest`] in document order and
//! turns each import block into an importer call. The block's namespace is
//! handed to that call and to nothing else. Once every block is imported the
//! stub is configured and the archive is committed.
//!
//! A failure anywhere aborts the builder, so either the whole manifest
//! resolves and the archive is written, or nothing is written.

use crate::archive::{ArchiveBuilder, WriteSummary};
use crate::cache::CheckoutStore;
use crate::config::{CodeSection, ImportEntry, PackageManifest, SourceImport, StubConfig};
use crate::error::Result;
use crate::import::{GitImporter, Importer, PlatformImporter, RawImporter, PLATFORM_URL};
use crate::output::Reporter;
use log::{debug, info};
use std::path::Path;
use std::slice;

/// Drives importers over a manifest and commits the result.
pub struct SourceResolver<'a> {
    checkouts: &'a mut CheckoutStore,
    reporter: &'a Reporter,
    platform_url: String,
}

impl<'a> SourceResolver<'a> {
    pub fn new(checkouts: &'a mut CheckoutStore, reporter: &'a Reporter) -> Self {
        Self {
            checkouts,
            reporter,
            platform_url: PLATFORM_URL.to_string(),
        }
    }

    /// Fetch `<platform>` blocks from another repository.
    pub fn with_platform_url(mut self, url: &str) -> Self {
        self.platform_url = url.to_string();
        self
    }

    /// Build the archive a manifest describes.
    ///
    /// Returns `None` when the manifest has no `code` section; nothing is
    /// written in that case.
    pub fn build(&mut self, manifest: &PackageManifest) -> Result<Option<WriteSummary>> {
        let Some(code) = &manifest.code else {
            self.reporter.step(1, "no code section found in the manifest.");
            return Ok(None);
        };

        let builder = self.resolve(code, &manifest.base_dir)?;
        self.reporter.step(1, "writing the archive.");
        let summary = builder.write()?;
        info!(
            "Wrote {} entries ({} bytes) to {}",
            summary.entries,
            summary.bytes,
            summary.path.display()
        );
        Ok(Some(summary))
    }

    /// Import every block and configure the stub, without committing.
    pub fn resolve(&mut self, code: &CodeSection, base_dir: &Path) -> Result<ArchiveBuilder> {
        let mut builder = ArchiveBuilder::open(
            &code.target.destination,
            code.target.minify,
            code.target.alias.as_deref(),
        )?;

        match self.fill(&mut builder, code, base_dir) {
            Ok(()) => Ok(builder),
            Err(err) => {
                builder.abort();
                Err(err)
            }
        }
    }

    fn fill(&mut self, builder: &mut ArchiveBuilder, code: &CodeSection, base_dir: &Path) -> Result<()> {
        for block in &code.blocks {
            self.reporter.step(2, &format!("importing {}.", describe(&block.entry)));
            if !block.namespace.is_empty() {
                debug!("Block namespace: {}", block.namespace);
            }

            let count = match &block.entry {
                ImportEntry::Source(source) => {
                    RawImporter::new(base_dir, "", slice::from_ref(source)).import(builder, &block.namespace)?
                }
                ImportEntry::Git(git) => {
                    GitImporter::new(self.checkouts, git).import(builder, &block.namespace)?
                }
                ImportEntry::Platform(platform) => PlatformImporter::new(self.checkouts, platform)
                    .with_url(&self.platform_url)
                    .import(builder, &block.namespace)?,
            };
            debug!("Block added {} entries", count);
        }

        match &code.stub {
            StubConfig::File(path) => {
                self.reporter.step(1, "adding the stub.");
                builder.set_stub(path)?;
            }
            StubConfig::Generated { cli, web } => builder.set_stubs(cli, web),
        }
        Ok(())
    }
}

fn describe(entry: &ImportEntry) -> String {
    match entry {
        ImportEntry::Source(SourceImport::File { path, .. }) => path.clone(),
        ImportEntry::Source(SourceImport::Folder { path, .. }) => path.clone(),
        ImportEntry::Git(git) => format!("{} at {}", git.url, git.reference),
        ImportEntry::Platform(platform) => format!("platform {}", platform.version),
    }
}
