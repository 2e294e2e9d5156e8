//! Namespace header rewriting
//!
//! A namespace header is the three-line prefix
//!
//! ```text
//! <?php
//! namespace Some\Name;
//! ?>
//! ```
//!
//! The transform is purely textual. It looks at the first three lines only:
//! when they have the header shape they are dropped, then a header for the
//! requested namespace is prepended. Files whose first lines do not have that
//! shape are kept whole and only receive the prepended header.

/// Opening tag that starts PHP code.
pub const OPEN_TAG: &str = "<?php";
/// Closing tag that ends PHP code.
pub const CLOSE_TAG: &str = "?>";
/// Keyword that starts a namespace declaration.
pub const NAMESPACE_KEYWORD: &str = "namespace";

/// Build the synthetic header for `namespace`.
pub fn header_for(namespace: &str) -> String {
    format!("{}\n{} {};\n{}\n", OPEN_TAG, NAMESPACE_KEYWORD, namespace, CLOSE_TAG)
}

/// Split off an existing namespace header.
///
/// Returns the text following the header when the first three lines have
/// the header shape, `None` otherwise (including for texts with fewer than
/// three lines).
pub fn split_header(text: &str) -> Option<&str> {
    let mut rest = text;
    let mut lines = [""; 3];
    for (i, line) in lines.iter_mut().enumerate() {
        match rest.find('\n') {
            Some(end) => {
                *line = &rest[..end];
                rest = &rest[end + 1..];
            }
            // The third line may be the last one, without a trailing newline.
            None if i == 2 && !rest.is_empty() => {
                *line = rest;
                rest = "";
            }
            None => return None,
        }
    }

    let [first, second, third] = lines;
    let declares_namespace = second
        .trim_start()
        .strip_prefix(NAMESPACE_KEYWORD)
        .is_some_and(|after| after.starts_with(char::is_whitespace));

    if first.starts_with(OPEN_TAG) && declares_namespace && third.trim_end().ends_with(CLOSE_TAG)
    {
        Some(rest)
    } else {
        None
    }
}

/// Rewrite the namespace header of `text` for `namespace`.
///
/// An empty namespace leaves the text untouched. Otherwise any existing
/// header is removed and a header for `namespace` is prepended. Applying the
/// rewrite twice with the same namespace gives the same text as applying it
/// once.
pub fn rewrite(text: &str, namespace: &str) -> String {
    let namespace = namespace.trim();
    if namespace.is_empty() {
        return text.to_string();
    }

    let body = split_header(text).unwrap_or(text);
    let mut out = header_for(namespace);
    out.push_str(body);
    out
}
