//! Property-based tests for archive path functions.
//!
//! These tests use proptest to generate random inputs and verify that
//! invariants hold for all possible inputs.

#[cfg(test)]
mod proptest_tests {
    use crate::path::{checkout_dir_name, join_archive_path, normalize_archive_path};
    use proptest::prelude::*;

    proptest! {
        /// Property: normalized paths never start or end with a separator
        #[test]
        fn normalize_has_no_outer_separators(input in "[a-z/\\\\. ]{0,40}") {
            let result = normalize_archive_path(&input);
            prop_assert!(!result.starts_with('/'));
            prop_assert!(!result.ends_with('/'));
        }

        /// Property: normalized paths never contain an empty segment
        #[test]
        fn normalize_has_single_separators(input in "[a-z/]{0,40}") {
            let result = normalize_archive_path(&input);
            prop_assert!(!result.contains("//"));
        }

        /// Property: normalization is idempotent
        #[test]
        fn normalize_is_idempotent(input in "[a-zA-Z0-9_/\\\\. -]{0,60}") {
            let once = normalize_archive_path(&input);
            let twice = normalize_archive_path(&once);
            prop_assert_eq!(once, twice);
        }

        /// Property: joining with an empty fragment is the same as normalizing
        #[test]
        fn join_with_empty_is_normalize(input in "[a-z/]{0,30}") {
            prop_assert_eq!(join_archive_path(&input, ""), normalize_archive_path(&input));
            prop_assert_eq!(join_archive_path("", &input), normalize_archive_path(&input));
        }

        /// Property: checkout names are deterministic fixed-width hex
        #[test]
        fn checkout_dir_name_is_stable(url in ".*") {
            let first = checkout_dir_name(&url);
            let second = checkout_dir_name(&url);
            prop_assert_eq!(first.len(), 32);
            prop_assert!(first.chars().all(|c| c.is_ascii_hexdigit()));
            prop_assert_eq!(first, second);
        }
    }
}
