//! # Manifest Schema
//!
//! This module gives the generic [`ManifestNode`] tree its meaning. The
//! conversion is strict: every tag the packager cannot handle is rejected
//! here, before any git command runs or any file is read, and the result is
//! a closed set of types the resolver can match on exhaustively.
//!
//! ## Key Components
//!
//! - **`PackageManifest`**: the whole manifest. Holds at most one
//!   `CodeSection`; a manifest without one is valid and builds nothing.
//! - **`CodeSection`**: the archive target (destination, minify, alias), the
//!   ordered import blocks, and the stub configuration.
//! - **`ImportBlock`**: one child of `<code>` together with the namespace its
//!   files are rewritten to.
//! - **`ImportEntry`**: what a block imports: local files or folders
//!   (`SourceImport`), a `PlatformImport`, or a `GitImport`.
//!
//! ## Attribute rules
//!
//! `minify`, `recursive`, `legacy` and `exclude` are on only for the literal
//! `"true"`. `external` and `hard` are off only for the literal `"false"`.
//! Package attributes are read from the root element and fall back to the
//! `<code>` element.

use crate::error::{Error, Result};
use crate::manifest::{self, ManifestNode};
use crate::suggestions;
use std::path::{Path, PathBuf};

/// Ref checked out when a `git` or `platform` element names none.
pub const DEFAULT_REF: &str = "master";

/// A fully validated package manifest
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageManifest {
    /// Absolute path of the manifest file
    pub path: PathBuf,
    /// Directory relative manifest paths resolve against
    pub base_dir: PathBuf,
    /// The single `<code>` section, if any
    pub code: Option<CodeSection>,
}

/// Everything needed to build one archive
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeSection {
    pub target: ArchiveTarget,
    /// Import blocks in document order
    pub blocks: Vec<ImportBlock>,
    pub stub: StubConfig,
}

/// Where and how the archive is written
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveTarget {
    /// Output path, resolved against the manifest directory
    pub destination: PathBuf,
    /// Strip comments and whitespace from source files
    pub minify: bool,
    /// Archive alias; defaults to the destination file name
    pub alias: Option<String>,
}

/// One child of `<code>`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportBlock {
    /// Namespace written into every source file of the block; empty for none
    pub namespace: String,
    pub entry: ImportEntry,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImportEntry {
    /// `<file>` or `<folder>` on the local filesystem
    Source(SourceImport),
    /// `<platform>`: the curated platform bundle
    Platform(PlatformImport),
    /// `<git>`: files and folders from an arbitrary repository
    Git(GitImport),
}

/// A `<file>` or `<folder>` element
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceImport {
    File {
        /// Path relative to the importer's base directory
        path: String,
        /// Archive directory the file is placed in
        local_path: String,
    },
    Folder {
        path: String,
        local_path: String,
        recursive: bool,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GitImport {
    pub url: String,
    pub reference: String,
    /// Archive directory prefixed to every child's `localPath`
    pub local_path: String,
    pub sources: Vec<SourceImport>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlatformImport {
    /// Ref of the platform repository
    pub version: String,
    /// Archive directory prefixed to every imported path
    pub local_path: String,
    pub options: PlatformOptions,
    pub packages: PackageSelection,
}

/// Optional parts of the platform bundle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlatformOptions {
    /// Also import the legacy tree
    pub legacy: bool,
    /// Import the third-party libraries shipped with the platform
    pub external: bool,
    /// Import the bootstrap files the platform needs to load
    pub hard: bool,
}

impl Default for PlatformOptions {
    fn default() -> Self {
        Self {
            legacy: false,
            external: true,
            hard: true,
        }
    }
}

/// Which platform packages to import
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PackageSelection {
    /// Whole trees
    All,
    /// Exactly the named packages
    Include(Vec<String>),
    /// Every package except the named ones
    Exclude(Vec<String>),
}

/// How the archive stub is chosen
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StubConfig {
    /// A stub file, used verbatim
    File(PathBuf),
    /// The generated stub with separate CLI and web entry scripts
    Generated { cli: String, web: String },
}

impl PackageManifest {
    /// Load and validate the manifest at `path`.
    pub fn load(path: &Path) -> Result<Self> {
        let path = if path.is_absolute() {
            path.to_path_buf()
        } else {
            std::env::current_dir()?.join(path)
        };
        let tree = manifest::load(&path)?;
        Self::from_tree(&tree, &path)
    }

    /// Validate an already parsed tree read from `path`.
    pub fn from_tree(root: &ManifestNode, path: &Path) -> Result<Self> {
        let base_dir = path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));

        let code_nodes: Vec<&ManifestNode> = if root.tag == "code" {
            vec![root]
        } else {
            root.children_named("code").collect()
        };
        if code_nodes.len() > 1 {
            return Err(Error::Configuration {
                message: format!("Found {} <code> sections in the manifest", code_nodes.len()),
                hint: Some("A manifest describes one archive; merge them into one <code>".to_string()),
            });
        }

        let code = match code_nodes.first() {
            Some(code) => Some(convert_code(root, code, &base_dir)?),
            None => None,
        };

        Ok(Self {
            path: path.to_path_buf(),
            base_dir,
            code,
        })
    }
}

fn convert_code(root: &ManifestNode, code: &ManifestNode, base_dir: &Path) -> Result<CodeSection> {
    let package_attr = |name: &str| package_attr(root, code, name);

    let destination = package_attr("destination").ok_or_else(|| Error::Configuration {
        message: "The manifest does not name a destination".to_string(),
        hint: Some("Add destination=\"build/app.phar\" to the root element".to_string()),
    })?;
    let target = ArchiveTarget {
        destination: base_dir.join(destination),
        minify: package_attr("minify") == Some("true"),
        alias: package_attr("alias").map(str::to_string),
    };

    if code.children_named("platform").count() > 1 {
        return Err(Error::Configuration {
            message: "Only one platform entry can be in a manifest".to_string(),
            hint: None,
        });
    }

    let blocks = code
        .children
        .iter()
        .map(convert_block)
        .collect::<Result<Vec<_>>>()?;

    let stub = match code.attr("stub").map(str::trim).filter(|s| !s.is_empty()) {
        Some(stub) => StubConfig::File(base_dir.join(stub)),
        None => StubConfig::Generated {
            cli: code.attr("cli").unwrap_or_default().trim().to_string(),
            web: code.attr("web").unwrap_or_default().trim().to_string(),
        },
    };

    Ok(CodeSection {
        target,
        blocks,
        stub,
    })
}

fn package_attr<'a>(root: &'a ManifestNode, code: &'a ManifestNode, name: &str) -> Option<&'a str> {
    root.attr(name)
        .or_else(|| code.attr(name))
        .map(str::trim)
        .filter(|value| !value.is_empty())
}

fn convert_block(node: &ManifestNode) -> Result<ImportBlock> {
    let entry = match node.tag.as_str() {
        "file" | "folder" => ImportEntry::Source(convert_source(node)?),
        "platform" => ImportEntry::Platform(convert_platform(node)),
        "git" => ImportEntry::Git(convert_git(node)?),
        other => return Err(unsupported(other, "code", &suggestions::CODE_TAGS)),
    };

    Ok(ImportBlock {
        namespace: node.attr("namespace").unwrap_or_default().trim().to_string(),
        entry,
    })
}

fn convert_source(node: &ManifestNode) -> Result<SourceImport> {
    let path = node.text.trim().to_string();
    if path.is_empty() {
        return Err(Error::Configuration {
            message: format!("<{}> element without a path", node.tag),
            hint: Some(format!("Write the source path as the element text: <{0}>src</{0}>", node.tag)),
        });
    }
    let local_path = local_path(node);

    Ok(match node.tag.as_str() {
        "file" => SourceImport::File { path, local_path },
        _ => SourceImport::Folder {
            path,
            local_path,
            recursive: node.attr("recursive") == Some("true"),
        },
    })
}

fn convert_git(node: &ManifestNode) -> Result<GitImport> {
    let url = node
        .attr("url")
        .map(str::trim)
        .filter(|url| !url.is_empty())
        .ok_or_else(|| Error::Configuration {
            message: "<git> element without a url".to_string(),
            hint: Some("Add url=\"https://host/repo.git\" to the <git> element".to_string()),
        })?;

    let sources = node
        .children
        .iter()
        .map(|child| match child.tag.as_str() {
            "file" | "folder" => convert_source(child),
            other => Err(unsupported(other, "git", &suggestions::GIT_TAGS)),
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(GitImport {
        url: url.to_string(),
        reference: reference(node, "ref"),
        local_path: local_path(node),
        sources,
    })
}

fn convert_platform(node: &ManifestNode) -> PlatformImport {
    let options = PlatformOptions {
        legacy: node.attr("legacy") == Some("true"),
        external: node.attr("external") != Some("false"),
        hard: node.attr("hard") != Some("false"),
    };

    let packages = match node.child("packages") {
        Some(set) => {
            let mut names: Vec<String> = Vec::new();
            for package in set.children_named("package") {
                let name = package.attr("name").unwrap_or_default().trim();
                if !name.is_empty() && !names.iter().any(|n| n == name) {
                    names.push(name.to_string());
                }
            }
            if names.is_empty() {
                PackageSelection::All
            } else if set.attr("exclude") == Some("true") {
                PackageSelection::Exclude(names)
            } else {
                PackageSelection::Include(names)
            }
        }
        None => PackageSelection::All,
    };

    PlatformImport {
        version: reference(node, "version"),
        local_path: local_path(node),
        options,
        packages,
    }
}

fn local_path(node: &ManifestNode) -> String {
    node.attr("localPath").unwrap_or_default().trim().to_string()
}

fn reference(node: &ManifestNode, attr: &str) -> String {
    node.attr(attr)
        .map(str::trim)
        .filter(|r| !r.is_empty())
        .unwrap_or(DEFAULT_REF)
        .to_string()
}

fn unsupported(tag: &str, context: &str, valid: &[&str]) -> Error {
    Error::UnsupportedTag {
        tag: tag.to_string(),
        context: context.to_string(),
        hint: Some(suggestions::unsupported_tag_hint(tag, valid)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(xml: &str) -> Result<PackageManifest> {
        let tree = manifest::parse(xml, "test.xml")?;
        PackageManifest::from_tree(&tree, Path::new("/pkg/packager.xml"))
    }

    fn code_section(xml: &str) -> CodeSection {
        parse(xml).unwrap().code.unwrap()
    }

    #[test]
    fn test_minimal_manifest() {
        let code = code_section(r#"<packager destination="build/app.phar"><code><file>index.php</file></code></packager>"#);

        assert_eq!(code.target.destination, PathBuf::from("/pkg/build/app.phar"));
        assert!(!code.target.minify);
        assert_eq!(code.target.alias, None);
        assert_eq!(
            code.blocks,
            vec![ImportBlock {
                namespace: String::new(),
                entry: ImportEntry::Source(SourceImport::File {
                    path: "index.php".to_string(),
                    local_path: String::new(),
                }),
            }]
        );
        assert_eq!(
            code.stub,
            StubConfig::Generated {
                cli: String::new(),
                web: String::new()
            }
        );
    }

    #[test]
    fn test_package_attributes_fall_back_to_code() {
        let code = code_section(r#"<packager><code destination="/abs/out.phar" minify="true" alias="x"/></packager>"#);
        assert_eq!(code.target.destination, PathBuf::from("/abs/out.phar"));
        assert!(code.target.minify);
        assert_eq!(code.target.alias.as_deref(), Some("x"));
    }

    #[test]
    fn test_minify_requires_literal_true() {
        let code = code_section(r#"<p destination="a.phar" minify="yes"><code/></p>"#);
        assert!(!code.target.minify);
    }

    #[test]
    fn test_no_code_section() {
        let manifest = parse(r#"<packager destination="a.phar"/>"#).unwrap();
        assert!(manifest.code.is_none());
        assert_eq!(manifest.base_dir, PathBuf::from("/pkg"));
    }

    #[test]
    fn test_duplicate_code_is_configuration_error() {
        let err = parse(r#"<p destination="a.phar"><code/><code/></p>"#).unwrap_err();
        assert!(matches!(err, Error::Configuration { .. }));
    }

    #[test]
    fn test_missing_destination() {
        let err = parse("<p><code/></p>").unwrap_err();
        assert!(err.to_string().contains("destination"));
    }

    #[test]
    fn test_second_platform_is_rejected() {
        let err = parse(r#"<p destination="a.phar"><code><platform/><platform/></code></p>"#).unwrap_err();
        assert!(err.to_string().contains("Only one platform entry"));
    }

    #[test]
    fn test_unknown_tag_in_code() {
        let err = parse(r#"<p destination="a.phar"><code><foldr>src</foldr></code></p>"#).unwrap_err();
        match err {
            Error::UnsupportedTag { tag, context, hint } => {
                assert_eq!(tag, "foldr");
                assert_eq!(context, "code");
                assert!(hint.unwrap().contains("Did you mean <folder>?"));
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_unknown_tag_in_git() {
        let err = parse(
            r#"<p destination="a.phar"><code><git url="u"><platform/></git></code></p>"#,
        )
        .unwrap_err();
        assert!(matches!(err, Error::UnsupportedTag { ref context, .. } if context == "git"));
    }

    #[test]
    fn test_git_block() {
        let code = code_section(
            r#"<p destination="a.phar"><code>
                 <git url="https://example.com/r.git" localPath="vendor" namespace="Acme">
                   <folder recursive="true" localPath="src">lib</folder>
                   <file>init.php</file>
                 </git>
                 <git url="https://example.com/s.git" ref="v2"/>
               </code></p>"#,
        );

        assert_eq!(code.blocks[0].namespace, "Acme");
        assert_eq!(
            code.blocks[0].entry,
            ImportEntry::Git(GitImport {
                url: "https://example.com/r.git".to_string(),
                reference: "master".to_string(),
                local_path: "vendor".to_string(),
                sources: vec![
                    SourceImport::Folder {
                        path: "lib".to_string(),
                        local_path: "src".to_string(),
                        recursive: true,
                    },
                    SourceImport::File {
                        path: "init.php".to_string(),
                        local_path: String::new(),
                    },
                ],
            })
        );
        match &code.blocks[1].entry {
            ImportEntry::Git(git) => assert_eq!(git.reference, "v2"),
            other => panic!("unexpected entry: {:?}", other),
        }
    }

    #[test]
    fn test_git_requires_url() {
        let err = parse(r#"<p destination="a.phar"><code><git/></code></p>"#).unwrap_err();
        assert!(err.to_string().contains("url"));
    }

    #[test]
    fn test_platform_defaults() {
        let code = code_section(r#"<p destination="a.phar"><code><platform/></code></p>"#);
        assert_eq!(
            code.blocks[0].entry,
            ImportEntry::Platform(PlatformImport {
                version: "master".to_string(),
                local_path: String::new(),
                options: PlatformOptions::default(),
                packages: PackageSelection::All,
            })
        );
    }

    #[test]
    fn test_platform_flags_and_packages() {
        let code = code_section(
            r#"<p destination="a.phar"><code>
                 <platform version="12.1" legacy="true" external="no" hard="false">
                   <packages exclude="true">
                     <package name="database"/>
                     <package name="database"/>
                     <package name="form"/>
                   </packages>
                 </platform>
               </code></p>"#,
        );
        match &code.blocks[0].entry {
            ImportEntry::Platform(platform) => {
                assert_eq!(platform.version, "12.1");
                assert!(platform.options.legacy);
                // Only the literal "false" turns these off.
                assert!(platform.options.external);
                assert!(!platform.options.hard);
                assert_eq!(
                    platform.packages,
                    PackageSelection::Exclude(vec!["database".to_string(), "form".to_string()])
                );
            }
            other => panic!("unexpected entry: {:?}", other),
        }
    }

    #[test]
    fn test_platform_include_list_and_empty_set() {
        let code = code_section(
            r#"<p destination="a.phar"><code>
                 <platform><packages><package name="log"/></packages></platform>
               </code></p>"#,
        );
        assert!(matches!(
            &code.blocks[0].entry,
            ImportEntry::Platform(PlatformImport { packages: PackageSelection::Include(names), .. }) if names == &["log"]
        ));

        let code = code_section(r#"<p destination="a.phar"><code><platform><packages exclude="true"/></platform></code></p>"#);
        assert!(matches!(
            &code.blocks[0].entry,
            ImportEntry::Platform(PlatformImport { packages: PackageSelection::All, .. })
        ));
    }

    #[test]
    fn test_stub_file_wins_over_generated() {
        let code = code_section(r#"<p destination="a.phar"><code stub="stub.php" cli="x.php"/></p>"#);
        assert_eq!(code.stub, StubConfig::File(PathBuf::from("/pkg/stub.php")));

        let code = code_section(r#"<p destination="a.phar"><code cli="bin/cli.php" web="www/index.php"/></p>"#);
        assert_eq!(
            code.stub,
            StubConfig::Generated {
                cli: "bin/cli.php".to_string(),
                web: "www/index.php".to_string()
            }
        );
    }

    #[test]
    fn test_empty_file_element_is_rejected() {
        let err = parse(r#"<p destination="a.phar"><code><file/></code></p>"#).unwrap_err();
        assert!(matches!(err, Error::Configuration { .. }));
    }

    #[test]
    fn test_namespace_is_per_block() {
        let code = code_section(
            r#"<p destination="a.phar"><code>
                 <folder namespace="X">a</folder>
                 <folder>b</folder>
                 <folder namespace=" Y ">c</folder>
               </code></p>"#,
        );
        let namespaces: Vec<_> = code.blocks.iter().map(|b| b.namespace.as_str()).collect();
        assert_eq!(namespaces, vec!["X", "", "Y"]);
    }
}
