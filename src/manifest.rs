//! # Manifest Tree
//!
//! The generic, attributed element tree a package manifest is read into.
//! Nothing here knows what the tags mean: [`crate::config`] gives the tree
//! its schema. Element order, attribute order and nesting are preserved
//! exactly as written.
//!
//! A manifest looks like this:
//!
//! ```xml
//! <package destination="build/app.phar" minify="false">
//!   <code cli="bin/app.php">
//!     <folder localPath="lib" recursive="true">src</folder>
//!     <git url="https://github.com/acme/util.git" ref="v1.2" namespace="Acme\Util">
//!       <folder recursive="true">src</folder>
//!     </git>
//!   </code>
//! </package>
//! ```

use crate::error::{Error, Result};
use std::fs;
use std::path::Path;
use xot::{Node, Xot};

/// One element of the manifest.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ManifestNode {
    /// Element name (local part)
    pub tag: String,
    /// Attributes in document order
    pub attributes: Vec<(String, String)>,
    /// Concatenated, trimmed text content of the element itself
    pub text: String,
    /// Child elements in document order
    pub children: Vec<ManifestNode>,
}

impl ManifestNode {
    pub fn new(tag: &str) -> Self {
        Self {
            tag: tag.to_string(),
            ..Self::default()
        }
    }

    /// Builder-style attribute setter
    pub fn with_attr(mut self, name: &str, value: &str) -> Self {
        self.attributes.push((name.to_string(), value.to_string()));
        self
    }

    /// Builder-style text setter
    pub fn with_text(mut self, text: &str) -> Self {
        self.text = text.to_string();
        self
    }

    /// Builder-style child appender
    pub fn with_child(mut self, child: ManifestNode) -> Self {
        self.children.push(child);
        self
    }

    /// Value of the attribute `name`, if present.
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// First child named `tag`.
    pub fn child(&self, tag: &str) -> Option<&ManifestNode> {
        self.children.iter().find(|child| child.tag == tag)
    }

    /// All children named `tag`, in document order.
    pub fn children_named<'a>(&'a self, tag: &'a str) -> impl Iterator<Item = &'a ManifestNode> {
        self.children.iter().filter(move |child| child.tag == tag)
    }
}

/// Parse manifest XML. `source` names the document in error messages.
pub fn parse(text: &str, source: &str) -> Result<ManifestNode> {
    let mut xot = Xot::new();
    let document = xot.parse(text).map_err(|e| Error::Manifest {
        path: source.to_string(),
        message: e.to_string(),
    })?;

    let root = xot
        .children(document)
        .find(|&node| xot.is_element(node))
        .ok_or_else(|| Error::Manifest {
            path: source.to_string(),
            message: "document has no root element".to_string(),
        })?;

    Ok(convert(&xot, root))
}

/// Read and parse the manifest file at `path`.
pub fn load(path: &Path) -> Result<ManifestNode> {
    if !path.is_file() {
        return Err(Error::Configuration {
            message: format!("Manifest {} does not exist", path.display()),
            hint: Some("Pass the manifest with --file or run from the package directory".to_string()),
        });
    }
    let text = fs::read_to_string(path)?;
    parse(&text, &path.display().to_string())
}

fn convert(xot: &Xot, node: Node) -> ManifestNode {
    let tag = xot
        .element(node)
        .map(|element| xot.local_name_str(element.name()).to_string())
        .unwrap_or_default();

    let attributes = xot
        .attributes(node)
        .iter()
        .map(|(name, value)| (xot.local_name_str(name).to_string(), value.to_string()))
        .collect();

    let mut text = String::new();
    let mut children = Vec::new();
    for child in xot.children(node) {
        if xot.is_element(child) {
            children.push(convert(xot, child));
        } else if let Some(fragment) = xot.text_str(child) {
            text.push_str(fragment);
        }
    }

    ManifestNode {
        tag,
        attributes,
        text: text.trim().to_string(),
        children,
    }
}
