//! Docket builds documentation indexes for Rust sources and turns them into JSON or HTML.
//!
//! An index is built from compiler-driver style arguments naming crate root files, crate
//! directories or rustdoc JSON files. It maps each top-level package (a crate) to a tree of
//! documented entities: modules, types, functions and their members. The index can then be
//! serialized to `index.json` or rendered to a directory of HTML pages through a Tera template.
//!
//! The [`Docket`] facade composes these steps:
//!
//! ```no_run
//! use std::path::Path;
//!
//! use libdocket::Docket;
//!
//! let docket = Docket::new().with_project("geo");
//! let index = docket.create_index(["-d", "docs", "crates/geo"])?;
//! docket.build_docs_with_builtin_template(Path::new("docs"), &[], index)?;
//! # Ok::<(), libdocket::DocketError>(())
//! ```
//!
//! Sources are read with `syn` by default. Passing `--rustdoc` documents crates through rustdoc
//! JSON instead, which requires the nightly toolchain to be installed.

mod args;
mod docket;
mod error;
mod highlight;
pub mod json;
mod manifest;
mod model;
mod outline;
pub mod render;
mod search;
mod source;
mod toolchain;

pub use crate::{
    args::DocArgs,
    docket::Docket,
    error::{DocketError, ErrorKind, Result},
    highlight::{highlight_html, highlight_terminal},
    model::{
        Comment, CommentSection, Deprecation, Entity, EntityKind, Index, PATH_SEPARATOR, Package,
        SourceLocation, Visibility, Walk,
    },
    outline::{outline, outline_colored},
    render::{Renderer, Template},
    search::{SearchDomain, SearchEntry, SearchIndex, SearchOptions, describe_domains},
    source::{IndexBuilder, ModuleWalker, RustdocConverter, SourceIndexer, WalkOptions},
};
