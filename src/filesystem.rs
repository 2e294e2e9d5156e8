//! Filesystem access for the packager
//!
//! Two halves live here:
//!
//! - [`MemoryFS`], the in-memory staging area the archive builder buffers
//!   entries into before commit. Unlike a plain map it remembers insertion
//!   order, which is the order entries are written to the container.
//! - Host filesystem helpers used to enumerate import sources: the
//!   source-file filter, shallow directory listing, the self-first recursive
//!   walk, and immediate subdirectory enumeration.

use crate::error::{Error, Result};
use glob::{MatchOptions, Pattern};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use walkdir::WalkDir;

/// A buffered file: its bytes plus the timestamp recorded in the archive
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct File {
    /// File content as bytes
    pub content: Vec<u8>,
    /// File modification time
    pub modified_time: SystemTime,
}

impl File {
    /// Create a new file with content, stamped now
    pub fn new(content: Vec<u8>) -> Self {
        Self {
            content,
            modified_time: SystemTime::now(),
        }
    }

    /// Create a new file from string content
    pub fn from_string(content: &str) -> Self {
        Self::new(content.as_bytes().to_vec())
    }
}

/// Ordered in-memory filesystem keyed by archive path.
///
/// Writing to an existing path replaces the bytes but keeps the entry's
/// original position (last writer wins).
#[derive(Debug, Clone, Default)]
pub struct MemoryFS {
    entries: Vec<(String, File)>,
    index: HashMap<String, usize>,
}

impl MemoryFS {
    /// Create a new empty filesystem
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a file, returning the file previously stored at `path`
    pub fn add_file(&mut self, path: impl Into<String>, file: File) -> Option<File> {
        let path = path.into();
        match self.index.get(&path) {
            Some(&slot) => Some(std::mem::replace(&mut self.entries[slot].1, file)),
            None => {
                self.index.insert(path.clone(), self.entries.len());
                self.entries.push((path, file));
                None
            }
        }
    }

    /// Add a file with string content
    pub fn add_file_string(&mut self, path: impl Into<String>, content: &str) -> Option<File> {
        self.add_file(path, File::from_string(content))
    }

    /// Get a file by archive path
    pub fn get_file(&self, path: &str) -> Option<&File> {
        self.index.get(path).map(|&slot| &self.entries[slot].1)
    }

    /// Check if a file exists
    pub fn exists(&self, path: &str) -> bool {
        self.index.contains_key(path)
    }

    /// List all archive paths in insertion order
    pub fn list_files(&self) -> Vec<String> {
        self.entries.iter().map(|(path, _)| path.clone()).collect()
    }

    /// Get the number of files
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if filesystem is empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over all files as (path, file) pairs in insertion order
    pub fn files(&self) -> impl Iterator<Item = (&str, &File)> {
        self.entries.iter().map(|(path, file)| (path.as_str(), file))
    }
}

/// Decides which files in an imported directory are source files.
#[derive(Debug, Clone)]
pub struct SourceFilter {
    pattern: Pattern,
}

impl SourceFilter {
    /// The default filter: PHP source files, case-insensitive.
    pub fn php() -> Self {
        Self {
            pattern: Pattern::new("*.php").expect("static glob is valid"),
        }
    }

    /// Returns true if the file name of `path` matches the filter.
    pub fn matches(&self, path: &Path) -> bool {
        let options = MatchOptions {
            case_sensitive: false,
            require_literal_separator: false,
            require_literal_leading_dot: false,
        };
        path.file_name()
            .map(|name| {
                self.pattern
                    .matches_with(&name.to_string_lossy(), options)
            })
            .unwrap_or(false)
    }
}

impl Default for SourceFilter {
    fn default() -> Self {
        Self::php()
    }
}

/// List the matching regular files directly inside `dir`, sorted by name.
pub fn list_source_files(dir: &Path, filter: &SourceFilter) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Err(Error::not_found(dir));
    }

    let mut files = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_file() && filter.matches(&path) {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

/// Walk `dir` depth-first, parent before children, and return every
/// matching regular file. Siblings are visited in name order so the result
/// is deterministic.
pub fn walk_source_files(dir: &Path, filter: &SourceFilter) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Err(Error::not_found(dir));
    }

    let mut files = Vec::new();
    for entry in WalkDir::new(dir).sort_by_file_name() {
        let entry = entry.map_err(|e| Error::Io(e.into()))?;
        let path = entry.path();
        if path.is_file() && filter.matches(path) {
            files.push(path.to_path_buf());
        }
    }
    Ok(files)
}

/// Names of the immediate subdirectories of `dir`, sorted.
pub fn subdirectory_names(dir: &Path) -> Result<Vec<String>> {
    if !dir.is_dir() {
        return Err(Error::not_found(dir));
    }

    let mut names = Vec::new();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        if entry.path().is_dir() {
            names.push(entry.file_name().to_string_lossy().into_owned());
        }
    }
    names.sort();
    Ok(names)
}
