use std::ffi::OsString;
use std::path::{Path, PathBuf};

use tracing::info;

use crate::{
    args::DocArgs,
    error::Result,
    json,
    model::Index,
    render::{Renderer, Template},
    source::{IndexBuilder, SourceIndexer},
};

/// Docket builds documentation indexes and turns them into JSON or HTML.
///
/// The facade holds configuration only. Every call is independent: [`Docket::create_index`]
/// reads sources through the configured [`IndexBuilder`], and the resulting [`Index`] is handed
/// by value to exactly one consumer, either [`Docket::write_json`] or [`Docket::build_docs`].
///
/// # Arguments
///
/// Index arguments follow compiler-driver conventions:
///
/// - `SOURCES...`: crate root `.rs` files, crate directories, or rustdoc `.json` files
/// - `-d DIR`: output directory, ignored by the index builder
/// - `--crate-name NAME`: rename the package built from a single source
/// - `--document-private-items`: include non-public items
/// - `--exclude REGEX`: skip entities whose full path matches
/// - `--rustdoc`: generate rustdoc JSON with the nightly toolchain
///
/// # Examples
///
/// ```no_run
/// use libdocket::Docket;
///
/// let docket = Docket::new();
/// let index = docket.create_index(["-d", "docs", "src/Foo.rs"])?;
/// assert!(index.contains("Foo"));
/// docket.write_json(index, "docs".as_ref())?;
/// # Ok::<(), libdocket::DocketError>(())
/// ```
#[derive(Debug, Clone)]
pub struct Docket<B = SourceIndexer> {
    /// Reads sources into an index.
    index_builder: B,

    /// Renderer settings used by `build_docs`.
    renderer: Renderer,
}

impl Default for Docket {
    fn default() -> Self {
        Self::new()
    }
}

impl Docket {
    /// Creates a Docket reading sources with [`SourceIndexer`], with syntax highlighting and
    /// the search index enabled.
    pub fn new() -> Self {
        Self {
            index_builder: SourceIndexer,
            renderer: Renderer::new(),
        }
    }
}

impl<B: IndexBuilder> Docket<B> {
    /// Replace the index builder.
    pub fn with_index_builder<C: IndexBuilder>(self, index_builder: C) -> Docket<C> {
        Docket {
            index_builder,
            renderer: self.renderer,
        }
    }

    /// Enables or disables syntax highlighting of code blocks in rendered pages.
    pub fn with_highlighting(mut self, highlight: bool) -> Self {
        self.renderer = self.renderer.with_highlighting(highlight);
        self
    }

    /// Enables or disables writing `search-index.json` with rendered pages.
    pub fn with_search_index(mut self, search_index: bool) -> Self {
        self.renderer = self.renderer.with_search_index(search_index);
        self
    }

    /// Sets the project name shown on rendered pages.
    pub fn with_project(mut self, project: impl Into<String>) -> Self {
        self.renderer = self.renderer.with_project(project);
        self
    }

    /// Sets the project version shown on rendered pages.
    pub fn with_project_version(mut self, version: impl Into<String>) -> Self {
        self.renderer = self.renderer.with_project_version(version);
        self
    }

    /// Parse `args` and build an index from the sources they name.
    ///
    /// Fails with a build error when the arguments are malformed or a source cannot be
    /// resolved. No partial index is ever returned.
    pub fn create_index<I, T>(&self, args: I) -> Result<Index>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        let args = DocArgs::parse_args(args)?;
        self.index_builder.build(&args)
    }

    /// Build an index from `args` and serialize it to JSON.
    pub fn create_json_index<I, T>(&self, args: I) -> Result<String>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        json::to_json(&self.create_index(args)?)
    }

    /// Render `index` into `output_dir` using the template at `template_path`, copying each of
    /// `resources` into `output_dir/static/`.
    ///
    /// The template and resources are checked before anything is written, so a failure there
    /// leaves `output_dir` untouched.
    #[allow(clippy::needless_pass_by_value)]
    pub fn build_docs(
        &self,
        output_dir: &Path,
        template_path: &Path,
        resources: &[PathBuf],
        index: Index,
    ) -> Result<()> {
        let template = Template::load(template_path)?;
        info!(template = %template_path.display(), "loaded template");
        self.renderer
            .render(&index, &template, resources, output_dir)
    }

    /// Like [`Docket::build_docs`], rendering with the built-in template.
    #[allow(clippy::needless_pass_by_value)]
    pub fn build_docs_with_builtin_template(
        &self,
        output_dir: &Path,
        resources: &[PathBuf],
        index: Index,
    ) -> Result<()> {
        self.renderer
            .render(&index, &Template::builtin()?, resources, output_dir)
    }

    /// Serialize `index` to `output_dir/index.json`, creating `output_dir` if needed.
    ///
    /// Returns the path of the written file.
    #[allow(clippy::needless_pass_by_value)]
    pub fn write_json(&self, index: Index, output_dir: &Path) -> Result<PathBuf> {
        json::write_index(&index, output_dir)
    }
}
