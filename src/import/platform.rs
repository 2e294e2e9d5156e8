//! Platform bundle imports
//!
//! The platform repository keeps its code under `libraries/`:
//!
//! ```text
//! libraries/
//!   import.php  loader.php  platform.php  import.legacy.php
//!   joomla/<package>/...      main package tree
//!   legacy/<package>/...      legacy package tree
//!   phpmailer/ phputf8/ simplepie/
//! ```
//!
//! Archive paths mirror that layout below the block's `localPath`.

use super::Importer;
use crate::archive::ArchiveBuilder;
use crate::cache::CheckoutStore;
use crate::config::{PackageSelection, PlatformImport};
use crate::error::{Error, Result};
use crate::filesystem::subdirectory_names;
use crate::path::join_archive_path;
use log::{debug, info};
use std::path::{Path, PathBuf};

/// Upstream repository of the platform bundle.
pub const PLATFORM_URL: &str = "http://github.com/joomla/joomla-platform.git";

const LIBRARIES_DIR: &str = "libraries";
const MAIN_TREE: &str = "joomla";
const LEGACY_TREE: &str = "legacy";
const EXTERNAL_LIBRARIES: [&str; 3] = ["phpmailer", "phputf8", "simplepie"];

/// Resolve a package selection against the main package tree.
///
/// Returns `None` for "everything". For an exclusion list the immediate
/// subdirectories of `main_tree` not named in the list are returned, sorted.
/// An inclusion list is returned as given. Either result is free of
/// duplicates.
pub fn select_packages(selection: &PackageSelection, main_tree: &Path) -> Result<Option<Vec<String>>> {
    let mut packages = match selection {
        PackageSelection::All => return Ok(None),
        PackageSelection::Include(names) => names.clone(),
        PackageSelection::Exclude(names) => subdirectory_names(main_tree)?
            .into_iter()
            .filter(|dir| !names.contains(dir))
            .collect(),
    };

    let mut seen = std::collections::HashSet::new();
    packages.retain(|name| seen.insert(name.clone()));
    Ok(Some(packages))
}

/// Imports the platform bundle at a version.
pub struct PlatformImporter<'a> {
    checkouts: &'a mut CheckoutStore,
    import: &'a PlatformImport,
    url: String,
}

impl<'a> PlatformImporter<'a> {
    pub fn new(checkouts: &'a mut CheckoutStore, import: &'a PlatformImport) -> Self {
        Self {
            checkouts,
            import,
            url: PLATFORM_URL.to_string(),
        }
    }

    /// Fetch the bundle from another repository with the same layout.
    pub fn with_url(mut self, url: &str) -> Self {
        self.url = url.to_string();
        self
    }
}

impl Importer for PlatformImporter<'_> {
    fn import(&mut self, builder: &mut ArchiveBuilder, namespace: &str) -> Result<usize> {
        let import = self.import;
        let options = import.options;
        info!("Importing platform {} from {}", import.version, self.url);

        let checkout = self.checkouts.prepare(&self.url, &import.version)?;
        let base = checkout.join(LIBRARIES_DIR);
        let prefix = import.local_path.as_str();
        let archive = |rel: &str| join_archive_path(prefix, rel);
        let mut count = 0;

        if options.hard {
            for required in ["import.php", "loader.php"] {
                if !base.join(required).is_file() {
                    return Err(Error::not_found(&base.join(required)));
                }
            }
            let mut bootstrap = vec!["loader.php", "platform.php", "import.php"];
            if options.legacy {
                bootstrap.push("import.legacy.php");
            }
            for file in bootstrap {
                builder.add_file(&base.join(file), prefix, namespace)?;
                count += 1;
            }
        }

        let main_tree = base.join(MAIN_TREE);
        let legacy_tree = base.join(LEGACY_TREE);
        match select_packages(&import.packages, &main_tree)? {
            None => {
                count += builder.add_directory_recursive(&main_tree, &archive(MAIN_TREE), namespace)?;
                if options.legacy {
                    count += builder.add_directory_recursive(&legacy_tree, &archive(LEGACY_TREE), namespace)?;
                }
            }
            Some(packages) => {
                debug!("Selected platform packages: {}", packages.join(", "));
                for package in &packages {
                    let main_rel = format!("{}/{}", MAIN_TREE, package);
                    count += builder.add_directory_recursive(&main_tree.join(package), &archive(&main_rel), namespace)?;

                    if options.legacy {
                        let legacy_dir: PathBuf = legacy_tree.join(package);
                        if legacy_dir.is_dir() {
                            let legacy_rel = format!("{}/{}", LEGACY_TREE, package);
                            count += builder.add_directory_recursive(&legacy_dir, &archive(&legacy_rel), namespace)?;
                        } else {
                            debug!("Package {} has no legacy counterpart", package);
                        }
                    }
                }
                count += builder.add_directory_shallow(&main_tree, &archive(MAIN_TREE), namespace)?;
                if options.legacy {
                    count += builder.add_directory_shallow(&legacy_tree, &archive(LEGACY_TREE), namespace)?;
                }
            }
        }

        if options.external {
            for library in EXTERNAL_LIBRARIES {
                count += builder.add_directory_recursive(&base.join(library), &archive(library), namespace)?;
            }
        }

        Ok(count)
    }
}
