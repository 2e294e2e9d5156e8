//! # Source Transforms
//!
//! Transforms applied to every source file on its way into the archive, in
//! this order:
//!
//! 1. **Namespace** (`namespace`): split off an existing three-line namespace
//!    header, when the import block carries a `namespace` attribute.
//! 2. **Strip** (`strip`): remove comments and insignificant whitespace from
//!    the remaining body, when the package is built with `minify="true"`.
//! 3. The header for the requested namespace is prepended.
//!
//! Stripping folds the header's lines together, so the header is split off
//! first.
//!
//! Both operate on text. Content that is not valid UTF-8 is passed through
//! untouched.

pub mod namespace;
pub mod strip;

#[cfg(test)]
mod namespace_proptest;

/// Per-file transform settings.
#[derive(Debug, Clone, Copy, Default)]
pub struct Transform<'a> {
    /// Strip comments and whitespace.
    pub strip_whitespace: bool,
    /// Namespace to prepend; empty means no namespace rewriting.
    pub namespace: &'a str,
}

impl<'a> Transform<'a> {
    /// Returns true when applying this transform cannot change content.
    pub fn is_identity(&self) -> bool {
        !self.strip_whitespace && self.namespace.trim().is_empty()
    }

    /// Apply the transform to raw file content.
    pub fn apply(&self, content: Vec<u8>) -> Vec<u8> {
        if self.is_identity() {
            return content;
        }
        match String::from_utf8(content) {
            Ok(text) => self.apply_text(&text).into_bytes(),
            Err(err) => err.into_bytes(),
        }
    }

    /// Apply the transform to source text.
    pub fn apply_text(&self, text: &str) -> String {
        if !self.strip_whitespace {
            return namespace::rewrite(text, self.namespace);
        }
        let namespace = self.namespace.trim();
        if namespace.is_empty() {
            return strip::strip_whitespace(text);
        }
        let body = namespace::split_header(text).unwrap_or(text);
        let mut out = namespace::header_for(namespace);
        out.push_str(&strip::strip_whitespace(body));
        out
    }
}
