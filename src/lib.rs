//! # PHP Archive Packager
//!
//! This library assembles a single-file PHP archive (a Phar) from a
//! declarative XML manifest. It is used by the `phar-packager` command-line
//! tool but the pieces can be driven directly.
//!
//! ## Quick Example
//!
//! ```
//! use phar_packager::manifest;
//! use phar_packager::config::{ImportEntry, PackageManifest};
//! use std::path::Path;
//!
//! let xml = r#"
//! <package destination="build/app.phar">
//!   <code cli="index.php">
//!     <file>index.php</file>
//!     <folder recursive="true" namespace="App" localPath="lib">src</folder>
//!   </code>
//! </package>
//! "#;
//! let tree = manifest::parse(xml, "packager.xml").unwrap();
//! let manifest = PackageManifest::from_tree(&tree, Path::new("/work/packager.xml")).unwrap();
//!
//! let code = manifest.code.unwrap();
//! assert_eq!(code.blocks.len(), 2);
//! assert_eq!(code.blocks[1].namespace, "App");
//! assert!(matches!(code.blocks[0].entry, ImportEntry::Source(_)));
//! ```
//!
//! ## Core Concepts
//!
//! - **Manifest (`manifest`, `config`)**: the XML document is read into a
//!   generic tree, then converted into a closed, typed schema. Unknown tags are
//!   rejected at conversion time.
//! - **Archive Builder (`archive`)**: buffers entries in memory, rewriting PHP
//!   sources on the way in (`transform`), and commits the finished container
//!   atomically together with its stub.
//! - **Repository Controller (`repository`, `git`, `cache`)**: drives the
//!   system `git` binary to keep deterministic checkouts of remote sources.
//! - **Importers (`import`)**: one per source kind (local files, a git
//!   repository, the platform bundle).
//! - **Source Resolver (`resolver`)**: walks the manifest and dispatches each
//!   block to its importer with the block's namespace.
//!
//! ## Execution Flow
//!
//! 1.  **Load**: read and validate the manifest.
//! 2.  **Import**: for every block, in document order, prepare any checkout
//!     and buffer its files into the builder.
//! 3.  **Stub**: configure the stub from a file or generate the default one.
//! 4.  **Commit**: encode the container and rename it over the destination.
//!
//! Any error aborts the build before the commit, so a failed build never
//! leaves a partial archive behind.

pub mod archive;
pub mod cache;
pub mod config;
pub mod error;
pub mod filesystem;
pub mod git;
pub mod import;
pub mod manifest;
pub mod output;
pub mod path;
pub mod repository;
pub mod resolver;
pub mod suggestions;
pub mod transform;

#[cfg(test)]
mod path_proptest;
