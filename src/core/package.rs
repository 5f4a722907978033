//! Plugin package discovery and on-disk layout.

use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// A plugin package directory discovered under the workspace root.
#[derive(Debug, Clone)]
pub struct Package {
    name: String,
    root: PathBuf,
}

impl Package {
    pub fn new(name: impl Into<String>, root: impl Into<PathBuf>) -> Self {
        Package {
            name: name.into(),
            root: root.into(),
        }
    }

    /// Directory name, which doubles as the package name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Root directory of the package.
    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn manifest_path(&self) -> PathBuf {
        self.root.join("Cargo.toml")
    }

    pub fn src_dir(&self) -> PathBuf {
        self.root.join("src")
    }

    /// Declared-commands artifact: the plugin's public command surface.
    pub fn commands_path(&self) -> PathBuf {
        self.root.join("src").join("commands.rs")
    }

    /// Platform-implementation artifact for the mobile side.
    pub fn mobile_path(&self) -> PathBuf {
        self.root.join("src").join("mobile.rs")
    }

    /// Generated TypeScript bindings consumed by guest code.
    pub fn bindings_path(&self) -> PathBuf {
        self.root.join("guest-js").join("index.ts")
    }
}

impl std::fmt::Display for Package {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// Errors from package discovery. These are the only fatal conditions
/// in a maintenance run.
#[derive(Debug, Error)]
pub enum DiscoverError {
    #[error("plugin root {0} does not exist or is not a directory")]
    RootMissing(PathBuf),

    #[error("failed to read plugin root {path}: {source}")]
    ReadRoot {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("no packages matching prefix `{prefix}` under {root}")]
    NoMatches { prefix: String, root: PathBuf },
}

/// Discover all package directories under `root` whose name starts
/// with `prefix`, sorted lexicographically for deterministic runs.
pub fn discover_packages(root: &Path, prefix: &str) -> Result<Vec<Package>, DiscoverError> {
    if !root.is_dir() {
        return Err(DiscoverError::RootMissing(root.to_path_buf()));
    }

    let entries = std::fs::read_dir(root).map_err(|source| DiscoverError::ReadRoot {
        path: root.to_path_buf(),
        source,
    })?;

    let mut packages: Vec<Package> = entries
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.path().is_dir())
        .filter_map(|entry| {
            let name = entry.file_name().to_string_lossy().into_owned();
            name.starts_with(prefix)
                .then(|| Package::new(name, entry.path()))
        })
        .collect();

    if packages.is_empty() {
        return Err(DiscoverError::NoMatches {
            prefix: prefix.to_string(),
            root: root.to_path_buf(),
        });
    }

    packages.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(packages)
}
