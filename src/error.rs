//! # Error Handling
//!
//! This module defines the centralized error type for `phar-packager`. It uses
//! `thiserror` to build a single `Error` enum whose variants mirror the failure
//! taxonomy of a build:
//!
//! - **`Configuration`**: a bad or missing manifest, a malformed destination,
//!   a duplicate `code` node. Always fatal, nothing is written.
//! - **`UnsupportedTag`**: a manifest element the importer that received it
//!   does not understand.
//! - **`NotFound`**: a source file or directory referenced by the manifest is
//!   missing.
//! - **`Process`**: an external `git` invocation exited non-zero (or could not
//!   be started, or timed out). Carries the exit code and combined output.
//! - **`InvalidRemote`** / **`AlreadyExists`** / **`InvalidArgument`**:
//!   repository bookkeeping preconditions were violated.
//! - **`Archive`**: the container could not be committed.
//!
//! Nothing in the crate retries. Every error propagates to the command layer,
//! which prints it and exits non-zero.

use thiserror::Error;

/// Main error type for phar-packager operations
#[derive(Error, Debug)]
pub enum Error {
    /// The manifest or the build configuration is unusable.
    #[error("Configuration error: {message}{}", hint.as_ref().map(|h| format!("\n  hint: {}", h)).unwrap_or_default())]
    Configuration {
        message: String,
        /// Optional hint for how to fix the configuration issue
        hint: Option<String>,
    },

    /// A manifest element could not be handled by the importer that received it.
    #[error("Unable to process tag <{tag}> in {context}{}", hint.as_ref().map(|h| format!("\n  hint: {}", h)).unwrap_or_default())]
    UnsupportedTag {
        tag: String,
        /// Where the tag was found, e.g. `code` or `git`
        context: String,
        hint: Option<String>,
    },

    /// A path referenced by the manifest does not exist (or has the wrong kind).
    #[error("The path {path} does not exist")]
    NotFound { path: String },

    /// An external process exited unsuccessfully.
    #[error("Command `{command}` failed with {}: {output}", code.map(|c| format!("code {}", c)).unwrap_or_else(|| "no exit code".to_string()))]
    Process {
        command: String,
        /// Exit code, `None` when the process was killed or never started
        code: Option<i32>,
        /// Combined stdout and stderr
        output: String,
    },

    /// A fetch was requested from something that is neither a URL nor a configured remote.
    #[error("No valid remote {remote} exists")]
    InvalidRemote { remote: String },

    /// A clone was requested on a root that already holds a repository.
    #[error("Repository already exists at {path}")]
    AlreadyExists { path: String },

    /// A repository bookkeeping call was made with an argument that conflicts with its state.
    #[error("Invalid argument: {message}")]
    InvalidArgument { message: String },

    /// The manifest XML could not be parsed.
    #[error("Manifest parsing error in {path}: {message}")]
    Manifest { path: String, message: String },

    /// The archive could not be encoded or committed.
    #[error("Archive error for {path}: {message}")]
    Archive { path: String, message: String },

    /// An I/O error, wrapped from `std::io::Error`.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A URL parsing error, wrapped from `url::ParseError`.
    #[error("URL parsing error: {0}")]
    UrlParse(#[from] url::ParseError),
}

impl Error {
    /// Shorthand for a `Configuration` error without a hint.
    pub fn config(message: impl Into<String>) -> Self {
        Error::Configuration {
            message: message.into(),
            hint: None,
        }
    }

    /// Shorthand for a `NotFound` error on a filesystem path.
    pub fn not_found(path: &std::path::Path) -> Self {
        Error::NotFound {
            path: path.display().to_string(),
        }
    }
}

/// A convenient type alias for `Result<T, Error>`.
pub type Result<T> = std::result::Result<T, Error>;
