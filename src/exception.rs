// exception.rs -- generator error types

use thiserror::Error;

#[derive(Debug, Error)]
pub enum GenError {
    /// A declared license string matched no known license family.
    #[error("could not match license \"{0}\"")]
    UnknownLicense(String),

    /// A dependency name could not be placed in any rosdep tier.
    #[error("could not resolve package {0} for Gentoo")]
    UnresolvedDependency(String),

    /// The distro index has no entry for the requested package.
    #[error("unknown package '{0}'")]
    UnknownPackage(String),

    #[error("malformed package manifest: {0}")]
    BadManifest(String),

    #[error("failed to load {path}: {source}")]
    TableLoad {
        path: String,
        #[source]
        source: serde_yaml::Error,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl GenError {
    /// The offending dependency name, when this is a resolution failure.
    pub fn unresolved_name(&self) -> Option<&str> {
        match self {
            GenError::UnresolvedDependency(name) => Some(name),
            _ => None,
        }
    }
}
