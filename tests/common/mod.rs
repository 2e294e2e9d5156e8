//! Shared test utilities for integration and E2E tests.
//!
//! Add `mod common;` to a test file, then use the helpers:
//!
//! ```rust,ignore
//! mod common;
//! use common::prelude::*;
//!
//! #[test]
//! fn test_example() {
//!     let fixture = TestFixture::new()
//!         .with_manifest(manifests::SINGLE_FILE)
//!         .with_file("index.php", "<?php echo 1;");
//!     fixture.command().arg("build").assert().success();
//! }
//! ```

use assert_fs::prelude::*;
use std::path::{Path, PathBuf};
use std::process::Command;

/// Re-export commonly used test dependencies for convenience.
pub mod prelude {
    pub use assert_cmd::cargo::cargo_bin_cmd;
    pub use assert_fs::prelude::*;
    #[allow(unused_imports)]
    pub use assert_fs::TempDir;
    pub use predicates::prelude::*;

    #[allow(unused_imports)]
    pub use super::manifests;
    #[allow(unused_imports)]
    pub use super::{git_available, LocalRepo};
    pub use super::TestFixture;
}

/// Manifest snippets for testing.
#[allow(dead_code)]
pub mod manifests {
    /// One file at the archive root, default stub.
    pub const SINGLE_FILE: &str = r#"<?xml version="1.0"?>
<package destination="app.phar">
  <code cli="index.php">
    <file>index.php</file>
  </code>
</package>
"#;

    /// A file plus a namespaced recursive folder.
    pub const WITH_FOLDER: &str = r#"<?xml version="1.0"?>
<package destination="build/app.phar" alias="app.phar">
  <code cli="index.php">
    <file>index.php</file>
    <folder recursive="true" namespace="App" localPath="lib">src</folder>
  </code>
</package>
"#;

    /// No code section at all.
    pub const NO_CODE: &str = r#"<?xml version="1.0"?>
<package destination="app.phar"/>
"#;

    /// A misspelled import tag.
    pub const UNKNOWN_TAG: &str = r#"<?xml version="1.0"?>
<package destination="app.phar">
  <code>
    <fodler>src</fodler>
  </code>
</package>
"#;

    /// Not well-formed XML.
    pub const BROKEN_XML: &str = "<package destination=\"app.phar\"><code>";
}

/// Whether a usable `git` binary is on the PATH.
#[allow(dead_code)]
pub fn git_available() -> bool {
    Command::new("git")
        .arg("--version")
        .output()
        .map(|out| out.status.success())
        .unwrap_or(false)
}

fn git(cwd: &Path, args: &[&str]) {
    let status = Command::new("git")
        .args(args)
        .current_dir(cwd)
        .env("GIT_AUTHOR_NAME", "Test")
        .env("GIT_AUTHOR_EMAIL", "test@example.com")
        .env("GIT_COMMITTER_NAME", "Test")
        .env("GIT_COMMITTER_EMAIL", "test@example.com")
        .output()
        .expect("Failed to run git");
    assert!(
        status.status.success(),
        "git {:?} failed: {}",
        args,
        String::from_utf8_lossy(&status.stderr)
    );
}

/// A throwaway git repository on the local filesystem, cloneable via `file://`.
#[allow(dead_code)]
pub struct LocalRepo {
    dir: assert_fs::TempDir,
}

#[allow(dead_code)]
impl LocalRepo {
    /// Create a repository on branch `master` with an initial commit of `files`.
    pub fn new(files: &[(&str, &str)]) -> Self {
        let dir = assert_fs::TempDir::new().expect("Failed to create temp directory");
        git(dir.path(), &["init", "-q"]);
        git(dir.path(), &["checkout", "-q", "-b", "master"]);
        let repo = Self { dir };
        repo.commit(files, "initial");
        repo
    }

    /// Write `files` and commit them.
    pub fn commit(&self, files: &[(&str, &str)], message: &str) {
        for (path, content) in files {
            self.dir
                .child(path)
                .write_str(content)
                .expect("Failed to write file");
        }
        git(self.dir.path(), &["add", "-A"]);
        git(self.dir.path(), &["commit", "-q", "-m", message]);
    }

    /// Tag the current commit.
    pub fn tag(&self, name: &str) {
        git(self.dir.path(), &["tag", name]);
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// `file://` URL of the repository.
    pub fn url(&self) -> String {
        format!("file://{}", self.dir.path().display())
    }
}

/// A test fixture that provides a temporary package directory.
pub struct TestFixture {
    temp_dir: assert_fs::TempDir,
}

#[allow(dead_code)]
impl TestFixture {
    /// Create a new test fixture with an empty temporary directory.
    pub fn new() -> Self {
        Self {
            temp_dir: assert_fs::TempDir::new().expect("Failed to create temp directory"),
        }
    }

    /// Write `packager.xml` with the given content.
    pub fn with_manifest(self, content: &str) -> Self {
        self.with_file("packager.xml", content)
    }

    /// Add a file with the given path and content.
    pub fn with_file(self, path: &str, content: &str) -> Self {
        self.temp_dir
            .child(path)
            .write_str(content)
            .expect("Failed to write file");
        self
    }

    /// Create an empty directory.
    pub fn with_dir(self, path: &str) -> Self {
        self.temp_dir
            .child(path)
            .create_dir_all()
            .expect("Failed to create directory");
        self
    }

    /// Get the path to the temporary directory.
    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Get the path to the manifest.
    pub fn manifest_path(&self) -> PathBuf {
        self.temp_dir.path().join("packager.xml")
    }

    /// Create a child path in the temp directory.
    pub fn child(&self, path: &str) -> assert_fs::fixture::ChildPath {
        self.temp_dir.child(path)
    }

    /// Create a command running in this fixture's directory, with its own
    /// checkout cache and no colors.
    pub fn command(&self) -> assert_cmd::Command {
        let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("phar-packager");
        cmd.current_dir(self.path())
            .env_remove("PHAR_PACKAGER_MANIFEST")
            .env("PHAR_PACKAGER_CACHE", self.path().join(".cache"))
            .env("NO_COLOR", "1");
        cmd
    }
}

impl Default for TestFixture {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixture_with_manifest() {
        let fixture = TestFixture::new().with_manifest(manifests::SINGLE_FILE);
        assert!(fixture.manifest_path().exists());
    }

    #[test]
    fn test_fixture_with_dir() {
        let fixture = TestFixture::new().with_dir("build");
        assert!(fixture.path().join("build").is_dir());
    }
}
