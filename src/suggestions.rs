//! # Error Suggestions
//!
//! Helpers for error messages that say what went wrong AND how to fix it.
//! The tag helpers feed the `hint` of [`crate::error::Error::UnsupportedTag`];
//! the `anyhow` helpers are used by the command layer.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use crate::suggestions;
//!
//! // Instead of:
//! anyhow::bail!("Manifest not found: {}", path.display());
//!
//! // Use:
//! return Err(suggestions::manifest_not_found(path));
//! ```

use std::path::Path;

/// Tags accepted inside `<code>`.
pub const CODE_TAGS: [&str; 4] = ["file", "folder", "platform", "git"];

/// Tags accepted inside `<git>`.
pub const GIT_TAGS: [&str; 2] = ["file", "folder"];

/// Generate an error for when the manifest file is not found.
pub fn manifest_not_found(path: &Path) -> anyhow::Error {
    anyhow::anyhow!(
        "Manifest file not found: {path}\n\n\
         hint: Create a packager.xml file in the package directory\n\
         hint: Use -f/--file to specify a different path\n\
         hint: Set PHAR_PACKAGER_MANIFEST environment variable",
        path = path.display()
    )
}

/// Generate an error for a missing destination directory.
pub fn destination_dir_missing(dir: &Path) -> anyhow::Error {
    anyhow::anyhow!(
        "Destination directory does not exist: {dir}\n\n\
         hint: Create it first, e.g. mkdir -p {dir}\n\
         hint: destination is resolved relative to the manifest's directory",
        dir = dir.display()
    )
}

/// Generate an error for a failed git invocation.
pub fn git_failed(command: &str, output: &str) -> anyhow::Error {
    let hint = if output.contains("Authentication failed")
        || output.contains("Permission denied")
        || output.contains("Could not read from remote repository")
    {
        "hint: Check that your SSH key or credential helper can access the repository"
    } else if output.contains("did not match any") || output.contains("pathspec") {
        "hint: Check the ref/version attribute names an existing branch, tag or commit"
    } else {
        "hint: Run the command by hand in the checkout to see the full output"
    };

    anyhow::anyhow!("Git command failed: {command}\n{output}\n\n{hint}")
}

/// Hint text for an unknown tag, listing the accepted ones.
pub fn unsupported_tag_hint(tag: &str, valid: &[&str]) -> String {
    let did_you_mean = find_similar(tag, valid)
        .map(|s| format!("Did you mean <{s}>? "))
        .unwrap_or_default();
    let accepted = valid
        .iter()
        .map(|t| format!("<{t}>"))
        .collect::<Vec<_>>()
        .join(", ");
    format!("{did_you_mean}Valid tags here are: {accepted}")
}

/// Find a similar string from a list of candidates using edit distance.
///
/// Returns Some(candidate) if a close match is found (edit distance <= 2).
pub fn find_similar<'a>(input: &str, candidates: &[&'a str]) -> Option<&'a str> {
    candidates
        .iter()
        .filter_map(|&candidate| {
            let distance = edit_distance(input, candidate);
            if distance <= 2 && distance < input.len() {
                Some((candidate, distance))
            } else {
                None
            }
        })
        .min_by_key(|(_, distance)| *distance)
        .map(|(candidate, _)| candidate)
}

/// Calculate the Levenshtein edit distance between two strings.
fn edit_distance(a: &str, b: &str) -> usize {
    let a_chars: Vec<char> = a.chars().collect();
    let b_chars: Vec<char> = b.chars().collect();

    if a_chars.is_empty() {
        return b_chars.len();
    }
    if b_chars.is_empty() {
        return a_chars.len();
    }

    // Single-row dynamic programming.
    let mut row: Vec<usize> = (0..=b_chars.len()).collect();
    for (i, a_char) in a_chars.iter().enumerate() {
        let mut diagonal = row[0];
        row[0] = i + 1;
        for (j, b_char) in b_chars.iter().enumerate() {
            let cost = usize::from(a_char != b_char);
            let next = (row[j + 1] + 1).min(row[j] + 1).min(diagonal + cost);
            diagonal = row[j + 1];
            row[j + 1] = next;
        }
    }
    row[b_chars.len()]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manifest_not_found_includes_hints() {
        let message = manifest_not_found(Path::new("/pkg/packager.xml")).to_string();

        assert!(message.contains("Manifest file not found"));
        assert!(message.contains("/pkg/packager.xml"));
        assert!(message.contains("-f/--file"));
        assert!(message.contains("PHAR_PACKAGER_MANIFEST"));
    }

    #[test]
    fn test_destination_dir_missing() {
        let message = destination_dir_missing(Path::new("/pkg/build")).to_string();
        assert!(message.contains("mkdir -p /pkg/build"));
    }

    #[test]
    fn test_git_failed_picks_hint() {
        let auth = git_failed("git clone -q x y", "fatal: Authentication failed").to_string();
        assert!(auth.contains("credential helper"));

        let bad_ref = git_failed(
            "git checkout -q nope",
            "error: pathspec 'nope' did not match any file(s) known to git",
        )
        .to_string();
        assert!(bad_ref.contains("ref/version"));
    }

    #[test]
    fn test_unsupported_tag_hint_suggests_similar() {
        let hint = unsupported_tag_hint("foldr", &CODE_TAGS);
        assert!(hint.contains("Did you mean <folder>?"));
        assert!(hint.contains("<platform>"));
    }

    #[test]
    fn test_unsupported_tag_hint_without_close_match() {
        let hint = unsupported_tag_hint("platform", &GIT_TAGS);
        assert!(!hint.contains("Did you mean"));
        assert!(hint.contains("<file>, <folder>"));
    }

    #[test]
    fn test_edit_distance() {
        assert_eq!(edit_distance("folder", "folder"), 0);
        assert_eq!(edit_distance("foldr", "folder"), 1);
        assert_eq!(edit_distance("fiel", "file"), 2);
        assert_eq!(edit_distance("", "git"), 3);
        assert_eq!(edit_distance("platform", "git"), 7);
    }

    #[test]
    fn test_find_similar() {
        assert_eq!(find_similar("gti", &CODE_TAGS), Some("git"));
        assert_eq!(find_similar("files", &CODE_TAGS), Some("file"));
        assert_eq!(find_similar("package", &CODE_TAGS), None);
    }
}
