use std::fs;
use std::path::{Path, PathBuf};

use cargo_toml::Manifest;
use tracing::debug;

use crate::error::{DocketError, Result};

/// A crate library or binary root discovered from a manifest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrateRoot {
    /// Crate name with `-` normalized to `_`.
    pub name: String,
    /// Root source file.
    pub root: PathBuf,
    /// Directory holding the manifest.
    pub dir: PathBuf,
}

/// A parsed `Cargo.toml` and the directory it lives in.
#[derive(Debug)]
pub struct CargoPath {
    dir: PathBuf,
    manifest: Manifest,
}

impl CargoPath {
    /// Load the manifest in `dir`.
    pub fn load(dir: &Path) -> Result<Self> {
        let manifest_path = dir.join("Cargo.toml");
        if !manifest_path.is_file() {
            return Err(DocketError::Manifest {
                path: manifest_path,
                message: "no Cargo.toml in directory".to_string(),
            });
        }
        let manifest = Manifest::from_path(&manifest_path).map_err(|e| DocketError::Manifest {
            path: manifest_path.clone(),
            message: e.to_string(),
        })?;
        Ok(Self {
            dir: dir.to_path_buf(),
            manifest,
        })
    }

    /// The nearest directory at or above `start` that holds a `Cargo.toml`.
    pub fn nearest(start: &Path) -> Option<PathBuf> {
        let mut current = start.to_path_buf();
        loop {
            if current.join("Cargo.toml").is_file() {
                return Some(current);
            }
            if !current.pop() {
                return None;
            }
        }
    }

    /// The manifest path.
    pub fn manifest_path(&self) -> PathBuf {
        self.dir.join("Cargo.toml")
    }

    /// Whether this is a virtual workspace manifest with no package of its own.
    pub fn is_workspace(&self) -> bool {
        self.manifest.workspace.is_some() && self.manifest.package.is_none()
    }

    /// Crate name used for documentation: the library name, else the package name.
    pub fn crate_name(&self) -> Option<String> {
        let lib_name = self
            .manifest
            .lib
            .as_ref()
            .and_then(|lib| lib.name.clone());
        lib_name
            .or_else(|| {
                self.manifest
                    .package
                    .as_ref()
                    .map(|package| package.name.clone())
            })
            .map(|name| normalize_crate_name(&name))
    }

    /// The crate's documentation root: the library target, else `src/main.rs`.
    pub fn crate_root(&self) -> Result<CrateRoot> {
        let name = self.crate_name().ok_or_else(|| DocketError::Manifest {
            path: self.manifest_path(),
            message: "manifest has no [package] section".to_string(),
        })?;

        let declared = self
            .manifest
            .lib
            .as_ref()
            .and_then(|lib| lib.path.as_ref())
            .map(|path| self.dir.join(path));
        let candidates = declared
            .into_iter()
            .chain([self.dir.join("src/lib.rs"), self.dir.join("src/main.rs")]);

        for root in candidates {
            if root.is_file() {
                return Ok(CrateRoot {
                    name,
                    root,
                    dir: self.dir.clone(),
                });
            }
        }

        Err(DocketError::Manifest {
            path: self.manifest_path(),
            message: "no library or binary root found".to_string(),
        })
    }

    /// Member directories of a workspace, with trailing `/*` globs expanded.
    pub fn workspace_members(&self) -> Result<Vec<PathBuf>> {
        let Some(workspace) = &self.manifest.workspace else {
            return Ok(Vec::new());
        };

        let excluded: Vec<PathBuf> = workspace
            .exclude
            .iter()
            .map(|path| self.dir.join(path))
            .collect();

        let mut members = Vec::new();
        for member in &workspace.members {
            if let Some(parent) = member.strip_suffix("/*") {
                let parent = self.dir.join(parent);
                let entries = fs::read_dir(&parent).map_err(|e| DocketError::Manifest {
                    path: self.manifest_path(),
                    message: format!("cannot read workspace members in {}: {e}", parent.display()),
                })?;
                let mut found: Vec<PathBuf> = entries
                    .filter_map(|entry| entry.ok().map(|entry| entry.path()))
                    .filter(|path| path.join("Cargo.toml").is_file())
                    .collect();
                found.sort();
                members.extend(found);
            } else {
                members.push(self.dir.join(member));
            }
        }

        members.retain(|member| !excluded.contains(member));
        debug!(count = members.len(), workspace = %self.dir.display(), "expanded workspace members");
        Ok(members)
    }
}

/// Crate names use `_` where package names may use `-`.
pub fn normalize_crate_name(name: &str) -> String {
    name.replace('-', "_")
}
