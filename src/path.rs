//! Archive path utilities for phar-packager
//!
//! Archive-relative paths are always normalized: no leading or trailing
//! separators, a single `/` between segments, no `.` segments.

use sha2::{Digest, Sha256};
use std::path::Path;

/// Normalize an archive-relative path.
///
/// Backslashes are treated as separators, surrounding whitespace is trimmed,
/// and empty or `.` segments are dropped.
pub fn normalize_archive_path(path: &str) -> String {
    path.trim()
        .split(['/', '\\'])
        .map(str::trim)
        .filter(|segment| !segment.is_empty() && *segment != ".")
        .collect::<Vec<_>>()
        .join("/")
}

/// Join two archive-relative path fragments and normalize the result.
pub fn join_archive_path(base: &str, extra: &str) -> String {
    normalize_archive_path(&format!("{}/{}", base, extra))
}

/// Compute the archive path of a file placed into the archive directory
/// `archive_dir`: the directory, then the file's basename.
pub fn entry_path(archive_dir: &str, source: &Path) -> String {
    let file_name = source
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    join_archive_path(archive_dir, &file_name)
}

/// Mirror the position of `file` below `root` under `archive_dir`.
///
/// `file` must live somewhere under `root`; the subdirectory chain between
/// them is appended to `archive_dir`, followed by the file's basename.
pub fn mirrored_entry_path(archive_dir: &str, root: &Path, file: &Path) -> String {
    let relative_dir = file
        .parent()
        .and_then(|parent| parent.strip_prefix(root).ok())
        .map(|rel| {
            rel.components()
                .map(|c| c.as_os_str().to_string_lossy().into_owned())
                .collect::<Vec<_>>()
                .join("/")
        })
        .unwrap_or_default();
    entry_path(&join_archive_path(archive_dir, &relative_dir), file)
}

/// Deterministic, filesystem-safe directory name for a checkout of `url`.
///
/// The name is the first 32 hex digits of the SHA-256 of the URL, so it is
/// stable across runs, processes and toolchain versions.
pub fn checkout_dir_name(url: &str) -> String {
    let digest = Sha256::digest(url.as_bytes());
    let mut name = hex::encode(digest);
    name.truncate(32);
    name
}
