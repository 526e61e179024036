// distro.rs -- local ROS distribution index

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::exception::GenError;
use crate::pkg_xml::Manifest;

/// One released package as recorded in the distribution index.
#[derive(Debug, Clone, Deserialize)]
pub struct ReleasePackage {
    pub version: String,
    /// Source tarball location for the SRC_URI line.
    pub src_uri: String,
    /// Release repository URL; the bug tracker address derives from it.
    #[serde(default)]
    pub release_repository: Option<String>,
    #[serde(default)]
    pub buildtool_depends: Vec<String>,
    #[serde(default)]
    pub build_depends: Vec<String>,
    #[serde(default)]
    pub run_depends: Vec<String>,
    /// Pre-extracted package.xml fields, when the index carries them inline.
    #[serde(default)]
    pub manifest: Option<Manifest>,
    /// Path to a package.xml to parse instead, relative to the index file.
    #[serde(default)]
    pub package_xml: Option<String>,
}

impl ReleasePackage {
    /// Bug tracker URL derived from the release repository:
    /// the "-release" marker is dropped and ".git" becomes "/issues".
    pub fn bug_url(&self) -> Option<String> {
        self.release_repository
            .as_ref()
            .map(|url| url.replace("-release", "").replace(".git", "/issues"))
    }
}

/// A distribution index loaded from a local YAML file: the distro name plus
/// every released package keyed by name. The key set doubles as the internal
/// package set used to split internal from external dependencies.
#[derive(Debug, Deserialize)]
pub struct DistroIndex {
    pub name: String,
    pub packages: BTreeMap<String, ReleasePackage>,
}

impl DistroIndex {
    pub fn load(path: &Path) -> Result<Self, GenError> {
        let text = fs::read_to_string(path)?;
        serde_yaml::from_str(&text).map_err(|e| GenError::TableLoad {
            path: path.display().to_string(),
            source: e,
        })
    }

    /// Whether `name` is satisfied inside this distribution.
    pub fn is_internal(&self, name: &str) -> bool {
        self.packages.contains_key(name)
    }

    pub fn get(&self, name: &str) -> Result<&ReleasePackage, GenError> {
        self.packages
            .get(name)
            .ok_or_else(|| GenError::UnknownPackage(name.to_string()))
    }

    /// Package names in sorted order (the generation pass order).
    pub fn package_names(&self) -> impl Iterator<Item = &str> {
        self.packages.keys().map(String::as_str)
    }
}
