//! # Archive Builder
//!
//! The builder is the single sink every importer writes into. It owns the
//! output location, the per-build settings (whitespace stripping, alias,
//! source filter) and the ordered buffer of entries. Nothing reaches the
//! filesystem until [`ArchiveBuilder::write`].
//!
//! ## Lifecycle
//!
//! 1. [`ArchiveBuilder::open`] validates the destination and settles the alias.
//! 2. Importers call `add_file`, `add_directory_shallow` and
//!    `add_directory_recursive`, each with the namespace of the import block
//!    they are processing. Entries go through the [`Transform`] pipeline and
//!    land in a [`MemoryFS`] keyed by archive path.
//! 3. One of the stub setters picks the bootstrap program.
//! 4. [`ArchiveBuilder::write`] encodes the container into a temporary file
//!    next to the destination and renames it into place, or
//!    [`ArchiveBuilder::abort`] drops everything.
//!
//! A failed commit leaves any previous archive at the destination untouched
//! and no temporary file behind.

pub mod phar;
pub mod stub;

use crate::error::{Error, Result};
use crate::filesystem::{self, File, MemoryFS, SourceFilter};
use crate::path;
use crate::transform::Transform;
use log::{debug, info, warn};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Result of a successful commit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteSummary {
    pub path: PathBuf,
    pub entries: usize,
    pub bytes: usize,
}

/// Buffers archive entries and commits them as one container.
#[derive(Debug)]
pub struct ArchiveBuilder {
    destination: PathBuf,
    alias: String,
    strip_whitespace: bool,
    filter: SourceFilter,
    entries: MemoryFS,
    stub: Option<String>,
}

impl ArchiveBuilder {
    /// Prepare a build targeting `destination`.
    ///
    /// The destination's parent directory must already exist. The alias
    /// defaults to the destination's file name.
    pub fn open(
        destination: impl AsRef<Path>,
        strip_whitespace: bool,
        alias: Option<&str>,
    ) -> Result<Self> {
        let destination = destination.as_ref();
        let file_name = destination
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .ok_or_else(|| Error::Configuration {
                message: format!("Destination {} has no file name", destination.display()),
                hint: Some("Point destination at a file such as build/app.phar".to_string()),
            })?;

        let parent = match destination.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        if !parent.is_dir() {
            return Err(Error::Configuration {
                message: format!("The path {} does not exist.", parent.display()),
                hint: Some("Create the destination directory before building".to_string()),
            });
        }
        let destination = parent.canonicalize()?.join(&file_name);

        let alias = alias
            .map(str::trim)
            .filter(|alias| !alias.is_empty())
            .map(str::to_string)
            .unwrap_or(file_name);

        debug!(
            "Opened archive {} (alias {}, strip whitespace: {})",
            destination.display(),
            alias,
            strip_whitespace
        );

        Ok(Self {
            destination,
            alias,
            strip_whitespace,
            filter: SourceFilter::php(),
            entries: MemoryFS::new(),
            stub: None,
        })
    }

    /// Absolute destination path.
    pub fn destination(&self) -> &Path {
        &self.destination
    }

    pub fn alias(&self) -> &str {
        &self.alias
    }

    /// The entries buffered so far, in archive order.
    pub fn entries(&self) -> &MemoryFS {
        &self.entries
    }

    /// The stub set so far, already terminated.
    pub fn stub(&self) -> Option<&str> {
        self.stub.as_deref()
    }

    /// Buffer one file at `archive_dir/<basename of source>`.
    ///
    /// Source files (per the filter) are transformed with the build's strip
    /// setting and `namespace`; other files are stored verbatim.
    pub fn add_file(&mut self, source: &Path, archive_dir: &str, namespace: &str) -> Result<()> {
        if !source.is_file() {
            return Err(Error::not_found(source));
        }
        let entry = path::entry_path(archive_dir, source);
        self.buffer(source, entry, namespace)
    }

    /// Buffer the source files directly inside `dir`. Returns the number of
    /// files added.
    pub fn add_directory_shallow(
        &mut self,
        dir: &Path,
        archive_dir: &str,
        namespace: &str,
    ) -> Result<usize> {
        let files = filesystem::list_source_files(dir, &self.filter)?;
        for file in &files {
            self.buffer(file, path::entry_path(archive_dir, file), namespace)?;
        }
        info!(
            "Added {} file(s) from {} to /{}",
            files.len(),
            dir.display(),
            path::normalize_archive_path(archive_dir)
        );
        Ok(files.len())
    }

    /// Buffer every source file below `dir`, parent directories first,
    /// mirroring the subdirectory structure under `archive_dir`. Returns the
    /// number of files added.
    pub fn add_directory_recursive(
        &mut self,
        dir: &Path,
        archive_dir: &str,
        namespace: &str,
    ) -> Result<usize> {
        let files = filesystem::walk_source_files(dir, &self.filter)?;
        for file in &files {
            let entry = path::mirrored_entry_path(archive_dir, dir, file);
            self.buffer(file, entry, namespace)?;
        }
        info!(
            "Added {} file(s) recursively from {} to /{}",
            files.len(),
            dir.display(),
            path::normalize_archive_path(archive_dir)
        );
        Ok(files.len())
    }

    fn buffer(&mut self, source: &Path, entry: String, namespace: &str) -> Result<()> {
        let content = fs::read(source)?;
        let content = if self.filter.matches(source) {
            Transform {
                strip_whitespace: self.strip_whitespace,
                namespace,
            }
            .apply(content)
        } else {
            content
        };

        debug!("Buffered {} as {} ({} bytes)", source.display(), entry, content.len());
        let replaced = self.entries.add_file(entry.clone(), File::new(content));
        if replaced.is_some() {
            warn!("Archive entry {} was overwritten by {}", entry, source.display());
        }
        Ok(())
    }

    /// Use the contents of `stub_path` as the stub.
    pub fn set_stub(&mut self, stub_path: &Path) -> Result<()> {
        if !stub_path.is_file() {
            return Err(Error::not_found(stub_path));
        }
        let code = fs::read_to_string(stub_path)?;
        self.set_stub_code(&code);
        Ok(())
    }

    /// Use the generated default stub running `cli` from the command line and
    /// `web` under a web server.
    pub fn set_stubs(&mut self, cli: &str, web: &str) {
        self.stub = Some(stub::default_stub(cli, web));
    }

    /// Use `code` as the stub.
    pub fn set_stub_code(&mut self, code: &str) {
        self.stub = Some(stub::terminate(code));
    }

    /// Encode and atomically commit the archive.
    pub fn write(self) -> Result<WriteSummary> {
        let stub = match &self.stub {
            Some(stub) => stub.clone(),
            None => {
                warn!("No stub set for {}; the archive will not be runnable", self.destination.display());
                stub::MINIMAL_STUB.to_string()
            }
        };
        let bytes = phar::encode(&stub, &self.alias, &self.entries);

        let commit_error = |message: String| Error::Archive {
            path: self.destination.display().to_string(),
            message,
        };
        let dir = self
            .destination
            .parent()
            .ok_or_else(|| commit_error("destination has no parent directory".to_string()))?;

        let mut temp = tempfile::Builder::new()
            .prefix(".phar-packager-")
            .suffix(".tmp")
            .tempfile_in(dir)
            .map_err(|e| commit_error(format!("failed to create temporary file: {}", e)))?;
        temp.write_all(&bytes)
            .and_then(|_| temp.as_file().sync_all())
            .map_err(|e| commit_error(format!("failed to write temporary file: {}", e)))?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(temp.path(), fs::Permissions::from_mode(0o755))
                .map_err(|e| commit_error(format!("failed to set permissions: {}", e)))?;
        }

        temp.persist(&self.destination)
            .map_err(|e| commit_error(format!("failed to move archive into place: {}", e.error)))?;

        info!(
            "Wrote {} ({} entries, {} bytes)",
            self.destination.display(),
            self.entries.len(),
            bytes.len()
        );
        Ok(WriteSummary {
            path: self.destination.clone(),
            entries: self.entries.len(),
            bytes: bytes.len(),
        })
    }

    /// Discard the build without touching the destination.
    pub fn abort(self) {
        debug!(
            "Aborted archive {} with {} buffered entries",
            self.destination.display(),
            self.entries.len()
        );
    }
}
