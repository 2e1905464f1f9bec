//! Index building from crate sources.
//!
//! [`IndexBuilder`] is the seam between the facade and whatever reads sources. The default
//! [`SourceIndexer`] understands three kinds of source:
//!
//! - a `.rs` file, documented as a crate root by walking its module tree with `syn`;
//! - a directory holding a `Cargo.toml`, documented through its library (or binary) root, or
//!   through every member when the manifest is a virtual workspace;
//! - a rustdoc `.json` file, converted directly.
//!
//! With `--rustdoc`, crate sources are documented through rustdoc JSON generated on the nightly
//! toolchain instead of the `syn` walker.

mod attrs;
mod rustdoc;
mod signature;
mod typefmt;
mod walker;

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

pub use self::rustdoc::RustdocConverter;
pub use self::walker::{ModuleWalker, WalkOptions};
use crate::args::DocArgs;
use crate::error::{DocketError, Result};
use crate::manifest::{CargoPath, CrateRoot, normalize_crate_name};
use crate::model::{Index, Package};

/// Builds an [`Index`] from parsed arguments.
pub trait IndexBuilder {
    /// Read every source named in `args` and assemble the index.
    ///
    /// Implementations fail on the first unresolvable source and never return a partial index.
    fn build(&self, args: &DocArgs) -> Result<Index>;
}

/// The default [`IndexBuilder`], reading Rust sources, crate directories and rustdoc JSON.
#[derive(Debug, Clone, Copy, Default)]
pub struct SourceIndexer;

impl IndexBuilder for SourceIndexer {
    fn build(&self, args: &DocArgs) -> Result<Index> {
        let options = WalkOptions {
            include_private: args.document_private_items,
            exclude: args.exclude_set()?,
        };

        let mut index = Index::new();
        for source in &args.sources {
            for package in self.packages(source, args, &options)? {
                index.insert(package)?;
            }
        }
        info!(packages = index.len(), "built documentation index");
        Ok(index)
    }
}

impl SourceIndexer {
    fn packages(
        &self,
        source: &Path,
        args: &DocArgs,
        options: &WalkOptions,
    ) -> Result<Vec<Package>> {
        if !source.exists() {
            return Err(DocketError::SourceNotFound(source.to_path_buf()));
        }

        if source.is_dir() {
            let cargo_path = CargoPath::load(source)?;
            if !cargo_path.is_workspace() {
                let root = cargo_path.crate_root()?;
                return Ok(vec![self.crate_package(
                    &root,
                    args.crate_name.as_deref(),
                    args,
                    options,
                )?]);
            }
            if args.crate_name.is_some() {
                return Err(DocketError::InvalidArgs(
                    "--crate-name cannot rename the members of a workspace".to_string(),
                ));
            }
            let mut packages = Vec::new();
            for member in cargo_path.workspace_members()? {
                let root = CargoPath::load(&member)?.crate_root()?;
                packages.push(self.crate_package(&root, None, args, options)?);
            }
            return Ok(packages);
        }

        match source.extension().and_then(|ext| ext.to_str()) {
            Some("rs") => {
                let name = match &args.crate_name {
                    Some(name) => name.clone(),
                    None => package_name(source),
                };
                if args.rustdoc {
                    let dir = manifest_dir(source)?;
                    let root = CrateRoot {
                        name: name.clone(),
                        root: source.to_path_buf(),
                        dir,
                    };
                    return Ok(vec![self.crate_package(&root, Some(&name), args, options)?]);
                }
                let walker = ModuleWalker::new(options);
                Ok(vec![walker.walk_crate(source, &name)?])
            }
            Some("json") => {
                debug!(source = %source.display(), "reading rustdoc JSON");
                let krate = rustdoc::load(source)?;
                let package = RustdocConverter::new(&krate, options)
                    .convert(args.crate_name.as_deref())?;
                Ok(vec![package])
            }
            _ => Err(DocketError::UnsupportedSource(source.to_path_buf())),
        }
    }

    fn crate_package(
        &self,
        root: &CrateRoot,
        name: Option<&str>,
        args: &DocArgs,
        options: &WalkOptions,
    ) -> Result<Package> {
        let name = name.unwrap_or(&root.name);
        if args.rustdoc {
            let manifest_path = root.dir.join("Cargo.toml");
            let json_path = rustdoc::generate(&manifest_path, args.document_private_items)?;
            let krate = rustdoc::load(&json_path)?;
            return RustdocConverter::new(&krate, options).convert(Some(name));
        }
        ModuleWalker::new(options).walk_crate(&root.root, name)
    }
}

/// Package name for a crate root file given on its own.
///
/// `lib.rs`, `main.rs` and `mod.rs` take the crate name from the nearest manifest, falling back to
/// the enclosing directory (skipping `src`). Any other file is named after its stem.
pub fn package_name(file: &Path) -> String {
    let stem = file
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default();
    if !matches!(stem.as_str(), "lib" | "main" | "mod") {
        return normalize_crate_name(&stem);
    }

    let absolute = fs::canonicalize(file).unwrap_or_else(|_| file.to_path_buf());
    let parent = absolute.parent().map(Path::to_path_buf).unwrap_or_default();

    if stem != "mod"
        && let Some(dir) = CargoPath::nearest(&parent)
        && let Ok(cargo_path) = CargoPath::load(&dir)
        && let Some(name) = cargo_path.crate_name()
    {
        return name;
    }

    let dir_name = parent
        .ancestors()
        .filter_map(|dir| dir.file_name())
        .map(|name| name.to_string_lossy().into_owned())
        .find(|name| name != "src");
    dir_name.map_or(stem, |name| normalize_crate_name(&name))
}

fn manifest_dir(file: &Path) -> Result<PathBuf> {
    let absolute = fs::canonicalize(file).map_err(|source| DocketError::SourceRead {
        path: file.to_path_buf(),
        source,
    })?;
    absolute
        .parent()
        .and_then(CargoPath::nearest)
        .ok_or_else(|| DocketError::Manifest {
            path: file.to_path_buf(),
            message: "no Cargo.toml found above the source file".to_string(),
        })
}
