//! Local file and folder imports

use super::Importer;
use crate::archive::ArchiveBuilder;
use crate::config::SourceImport;
use crate::error::Result;
use crate::path::join_archive_path;
use log::info;
use std::path::Path;

/// Imports `<file>` and `<folder>` elements relative to a base directory.
///
/// `archive_prefix` is placed in front of each element's `localPath`.
pub struct RawImporter<'a> {
    base_dir: &'a Path,
    archive_prefix: &'a str,
    sources: &'a [SourceImport],
}

impl<'a> RawImporter<'a> {
    pub fn new(base_dir: &'a Path, archive_prefix: &'a str, sources: &'a [SourceImport]) -> Self {
        Self {
            base_dir,
            archive_prefix,
            sources,
        }
    }
}

impl Importer for RawImporter<'_> {
    fn import(&mut self, builder: &mut ArchiveBuilder, namespace: &str) -> Result<usize> {
        let mut count = 0;
        for source in self.sources {
            match source {
                SourceImport::File { path, local_path } => {
                    info!("Importing {}", path);
                    let archive_dir = join_archive_path(self.archive_prefix, local_path);
                    builder.add_file(&self.base_dir.join(path), &archive_dir, namespace)?;
                    count += 1;
                }
                SourceImport::Folder {
                    path,
                    local_path,
                    recursive,
                } => {
                    let archive_dir = join_archive_path(self.archive_prefix, local_path);
                    let dir = self.base_dir.join(path);
                    count += if *recursive {
                        info!("Importing {} recursively", path);
                        builder.add_directory_recursive(&dir, &archive_dir, namespace)?
                    } else {
                        info!("Importing {}", path);
                        builder.add_directory_shallow(&dir, &archive_dir, namespace)?
                    };
                }
            }
        }
        Ok(count)
    }
}
