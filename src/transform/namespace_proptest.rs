//! Property-based tests for the namespace header transform.

use super::namespace::{header_for, rewrite, split_header};
use proptest::prelude::*;

/// Namespace names: one or more identifier segments joined by backslashes.
fn namespace_name() -> impl Strategy<Value = String> {
    prop::collection::vec("[A-Za-z_][A-Za-z0-9_]{0,8}", 1..4).prop_map(|parts| parts.join("\\"))
}

/// Arbitrary multi-line source text.
fn source_text() -> impl Strategy<Value = String> {
    prop::collection::vec("[ -~]{0,20}", 0..8).prop_map(|lines| lines.join("\n"))
}

proptest! {
    /// Property: texts without the header shape keep their full body and only gain a header
    #[test]
    fn non_header_text_is_kept_whole(text in source_text(), ns in namespace_name()) {
        prop_assume!(split_header(&text).is_none());
        let out = rewrite(&text, &ns);
        prop_assert_eq!(out, format!("{}{}", header_for(&ns), text));
    }

    /// Property: an empty namespace never changes the text
    #[test]
    fn empty_namespace_is_identity(text in source_text()) {
        prop_assert_eq!(rewrite(&text, ""), text);
    }

    /// Property: rewriting twice with the same namespace equals rewriting once
    #[test]
    fn rewrite_is_idempotent(text in source_text(), ns in namespace_name()) {
        let once = rewrite(&text, &ns);
        let twice = rewrite(&once, &ns);
        prop_assert_eq!(once, twice);
    }

    /// Property: rewriting for a second namespace leaves no trace of the first
    #[test]
    fn rewrite_replaces_previous_namespace(text in source_text(), a in namespace_name(), b in namespace_name()) {
        let via_a = rewrite(&rewrite(&text, &a), &b);
        let direct = rewrite(&text, &b);
        prop_assert_eq!(via_a, direct);
    }
}
