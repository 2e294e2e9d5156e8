//! Manifest parsing tests using datatest-stable for test data discovery
//!
//! Every XML file below `tests/testdata/manifests/valid` must load into a
//! `PackageManifest`. Every file below `tests/testdata/manifests/invalid`
//! must be rejected, with an error message containing the text of its
//! `<!-- error: ... -->` comment.

use phar_packager::config::{ImportEntry, PackageManifest, PackageSelection};
use std::path::Path;

fn load(path: &Path) -> phar_packager::error::Result<PackageManifest> {
    let absolute = std::env::current_dir()?.join(path);
    PackageManifest::load(&absolute)
}

/// Expected error text embedded in an invalid manifest.
fn expected_error(content: &str) -> Option<&str> {
    let start = content.find("<!-- error:")? + "<!-- error:".len();
    let end = start + content[start..].find("-->")?;
    Some(content[start..end].trim())
}

fn test_valid_manifest(path: &Path) -> datatest_stable::Result<()> {
    let manifest = load(path).map_err(|e| format!("Failed to load {}: {}", path.display(), e))?;

    let Some(code) = &manifest.code else {
        return Ok(());
    };
    assert!(
        code.target.destination.starts_with(&manifest.base_dir),
        "destination of {} should resolve against the manifest directory",
        path.display()
    );
    assert!(
        !code.blocks.is_empty(),
        "{} should contain at least one import block",
        path.display()
    );

    for (idx, block) in code.blocks.iter().enumerate() {
        match &block.entry {
            ImportEntry::Git(git) => {
                assert!(!git.url.is_empty(), "git block {} in {} has empty url", idx, path.display());
                assert!(!git.reference.is_empty(), "git block {} in {} has empty ref", idx, path.display());
            }
            ImportEntry::Platform(platform) => {
                assert!(!platform.version.is_empty());
                if let PackageSelection::Include(names) | PackageSelection::Exclude(names) = &platform.packages {
                    let mut unique = names.clone();
                    unique.dedup();
                    assert_eq!(&unique, names, "package names in {} are not deduplicated", path.display());
                }
            }
            ImportEntry::Source(_) => {}
        }
    }
    Ok(())
}

fn test_invalid_manifest(path: &Path) -> datatest_stable::Result<()> {
    let content = std::fs::read_to_string(path)?;
    let expected = expected_error(&content)
        .ok_or_else(|| format!("{} has no <!-- error: ... --> comment", path.display()))?;

    match load(path) {
        Ok(_) => Err(format!("{} should have been rejected", path.display()).into()),
        Err(e) => {
            let message = e.to_string();
            assert!(
                message.contains(expected),
                "error for {} was {:?}, expected it to contain {:?}",
                path.display(),
                message,
                expected
            );
            Ok(())
        }
    }
}

datatest_stable::harness!(
    test_valid_manifest,
    "tests/testdata/manifests/valid",
    r".*\.xml$",
    test_invalid_manifest,
    "tests/testdata/manifests/invalid",
    r".*\.xml$"
);
