//! HTML rendering of an [`Index`].
//!
//! Rendering happens in two phases. Everything that can fail without touching the output
//! directory runs first: resource checks and rendering every page into memory. Only then is
//! the output directory created and written, so a failed render leaves no partial site behind.

pub mod layout;
pub mod markdown;
pub mod template;

use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{debug, info};

use self::{
    layout::{Links, ROOT_PAGE, SEARCH_INDEX_FILE, STATIC_DIR, anchor, page_href, root_prefix},
    markdown::{Markdown, html_escape},
};
pub use self::template::Template;
use crate::{
    error::{DocketError, Result},
    model::{Deprecation, Entity, EntityKind, Index},
    search::SearchIndex,
};

/// Value of the `generator` meta tag.
const GENERATOR: &str = concat!("docket ", env!("CARGO_PKG_VERSION"));

/// Renders an index into a directory of HTML pages.
#[derive(Debug, Clone)]
pub struct Renderer {
    /// Highlight code blocks in documentation.
    highlight: bool,
    /// Write `search-index.json` next to the root page.
    search_index: bool,
    /// Project name shown in page titles and the sidebar.
    project: Option<String>,
    /// Project version shown in the sidebar.
    project_version: Option<String>,
}

impl Default for Renderer {
    fn default() -> Self {
        Self::new()
    }
}

impl Renderer {
    /// Create a renderer with highlighting and the search index enabled.
    pub fn new() -> Self {
        Self {
            highlight: true,
            search_index: true,
            project: None,
            project_version: None,
        }
    }

    /// Enable or disable syntax highlighting of code blocks.
    pub fn with_highlighting(mut self, highlight: bool) -> Self {
        self.highlight = highlight;
        self
    }

    /// Enable or disable writing `search-index.json`.
    pub fn with_search_index(mut self, search_index: bool) -> Self {
        self.search_index = search_index;
        self
    }

    /// Set the project name.
    pub fn with_project(mut self, project: impl Into<String>) -> Self {
        self.project = Some(project.into());
        self
    }

    /// Set the project version.
    pub fn with_project_version(mut self, version: impl Into<String>) -> Self {
        self.project_version = Some(version.into());
        self
    }

    /// Render `index` through `template` into `out`, copying `resources` to `out/static/`.
    ///
    /// Existing files in `out` are overwritten when a page of the same name is produced and
    /// left alone otherwise.
    pub fn render(
        &self,
        index: &Index,
        template: &Template,
        resources: &[PathBuf],
        out: &Path,
    ) -> Result<()> {
        for package in index.packages() {
            if let Some(entity) = package.unsafe_page_name() {
                return Err(DocketError::UnsafeName(format!(
                    "{} {}",
                    entity.kind.label(),
                    entity.path_string()
                )));
            }
        }
        let resources = plan_resources(resources)?;
        let links = Links::new(index);
        let pages = self.render_pages(index, template, &links, &resources)?;
        let search_index = if self.search_index {
            let entries = SearchIndex::with_links(index, &links);
            Some(serde_json::to_string_pretty(&entries).map_err(DocketError::SearchIndex)?)
        } else {
            None
        };

        create_dir(out)?;
        for (href, html) in &pages {
            let path = out.join(href);
            if let Some(parent) = path.parent() {
                create_dir(parent)?;
            }
            write_file(&path, html)?;
        }

        if !resources.is_empty() {
            let static_dir = out.join(STATIC_DIR);
            create_dir(&static_dir)?;
            for resource in &resources {
                let dest = static_dir.join(&resource.name);
                fs::copy(&resource.source, &dest)
                    .map_err(|source| DocketError::OutputWrite { path: dest, source })?;
            }
        }

        if let Some(search_index) = search_index {
            write_file(&out.join(SEARCH_INDEX_FILE), &search_index)?;
        }

        info!(
            out = %out.display(),
            pages = pages.len(),
            resources = resources.len(),
            "rendered documentation"
        );
        Ok(())
    }

    /// Render every page to `(href, html)` pairs, root page first.
    fn render_pages(
        &self,
        index: &Index,
        template: &Template,
        links: &Links,
        resources: &[Resource],
    ) -> Result<Vec<(String, String)>> {
        let site = SiteContext {
            project: self.project.clone(),
            version: self.project_version.clone(),
            generator: GENERATOR,
            packages: index
                .packages()
                .filter_map(|package| {
                    Some(NavLink {
                        name: package.name.clone(),
                        href: links.href(&package.name)?.to_string(),
                        summary: package.summary().map(str::to_string),
                    })
                })
                .collect(),
        };
        let pass = PagePass {
            renderer: self,
            template,
            links,
            markdown: Markdown::new(links, self.highlight),
            resources,
            site: &site,
        };

        let mut pages = vec![(ROOT_PAGE.to_string(), pass.root_page()?)];
        for package in index.packages() {
            pass.collect(package, &package.path, &mut pages)?;
        }
        Ok(pages)
    }
}

/// A resource and the file name it is copied to.
#[derive(Debug)]
struct Resource {
    source: PathBuf,
    name: String,
}

/// Check that every resource exists and that no two share a file name.
fn plan_resources(resources: &[PathBuf]) -> Result<Vec<Resource>> {
    let mut seen = HashSet::new();
    let mut planned = Vec::with_capacity(resources.len());
    for source in resources {
        if !source.is_file() {
            return Err(DocketError::ResourceNotFound(source.clone()));
        }
        let name = source
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .ok_or_else(|| DocketError::ResourceNotFound(source.clone()))?;
        if !seen.insert(name.clone()) {
            return Err(DocketError::ResourceConflict(name));
        }
        planned.push(Resource {
            source: source.clone(),
            name,
        });
    }
    Ok(planned)
}

fn create_dir(path: &Path) -> Result<()> {
    fs::create_dir_all(path).map_err(|source| DocketError::OutputWrite {
        path: path.to_path_buf(),
        source,
    })
}

fn write_file(path: &Path, contents: &str) -> Result<()> {
    debug!(path = %path.display(), "writing");
    fs::write(path, contents).map_err(|source| DocketError::OutputWrite {
        path: path.to_path_buf(),
        source,
    })
}

#[derive(Serialize)]
struct SiteContext {
    project: Option<String>,
    version: Option<String>,
    generator: &'static str,
    packages: Vec<NavLink>,
}

#[derive(Serialize)]
struct NavLink {
    name: String,
    href: String,
    summary: Option<String>,
}

#[derive(Serialize)]
struct PageContext<'a> {
    site: &'a SiteContext,
    page: PageInfo,
    entity: Option<EntityContext>,
}

#[derive(Serialize)]
struct PageInfo {
    title: String,
    kind: &'static str,
    /// Relative path from this page back to the output root.
    root: String,
    breadcrumbs: Vec<NavLink>,
    stylesheets: Vec<String>,
    scripts: Vec<String>,
    search_index: Option<String>,
}

#[derive(Serialize)]
struct EntityContext {
    name: String,
    kind: &'static str,
    path: String,
    signature: Option<String>,
    docs: Option<String>,
    deprecation: Option<Deprecation>,
    source: Option<String>,
    sections: Vec<SectionContext>,
}

#[derive(Serialize)]
struct SectionContext {
    id: String,
    title: &'static str,
    items: Vec<MemberContext>,
}

#[derive(Serialize)]
struct MemberContext {
    name: String,
    kind: &'static str,
    signature: Option<String>,
    docs: Option<String>,
    /// Link to the member's own page.
    href: Option<String>,
    /// Fragment for members rendered inline.
    anchor: Option<String>,
    deprecated: bool,
}

/// State shared by every page of one render.
struct PagePass<'a> {
    renderer: &'a Renderer,
    template: &'a Template,
    links: &'a Links,
    markdown: Markdown<'a>,
    resources: &'a [Resource],
    site: &'a SiteContext,
}

impl PagePass<'_> {
    fn root_page(&self) -> Result<String> {
        let title = self
            .renderer
            .project
            .clone()
            .unwrap_or_else(|| "Documentation".to_string());
        self.template.render(PageContext {
            site: self.site,
            page: self.page_info(title, "index", ""),
            entity: None,
        })
    }

    /// Render `entity` if it has a page, then recurse into members. `scope` is the path of the
    /// nearest enclosing module, used to resolve intra-doc links.
    fn collect(
        &self,
        entity: &Entity,
        scope: &[String],
        pages: &mut Vec<(String, String)>,
    ) -> Result<()> {
        let scope = if entity.kind == EntityKind::Package {
            entity.path.as_slice()
        } else {
            scope
        };
        if let Some(href) = page_href(entity) {
            debug!(path = %entity.path_string(), href, "rendering page");
            let html = self.entity_page(entity, scope, &href)?;
            pages.push((href, html));
        }
        for member in &entity.members {
            self.collect(member, scope, pages)?;
        }
        Ok(())
    }

    fn entity_page(&self, entity: &Entity, scope: &[String], href: &str) -> Result<String> {
        let root = root_prefix(href);
        let mut page = self.page_info(entity.path_string(), entity.kind.label(), &root);
        page.breadcrumbs = self.breadcrumbs(entity, &root);

        let mut grouped: BTreeMap<EntityKind, Vec<&Entity>> = BTreeMap::new();
        for member in &entity.members {
            grouped.entry(member.kind).or_default().push(member);
        }
        let sections = grouped
            .into_iter()
            .map(|(kind, members)| SectionContext {
                id: kind.section_title().to_lowercase().replace(' ', "-"),
                title: kind.section_title(),
                items: members
                    .into_iter()
                    .map(|member| self.member(member, scope, &root))
                    .collect(),
            })
            .collect();

        let context = EntityContext {
            name: entity.name.clone(),
            kind: entity.kind.label(),
            path: entity.path_string(),
            signature: entity.signature.clone(),
            docs: entity
                .comment
                .as_ref()
                .map(|comment| self.markdown.render(&comment.raw, scope, &root)),
            deprecation: entity.deprecation.clone(),
            source: entity
                .source
                .as_ref()
                .map(|source| format!("{}:{}", source.file, source.line)),
            sections,
        };
        self.template.render(PageContext {
            site: self.site,
            page,
            entity: Some(context),
        })
    }

    /// Members with their own page show a linked summary, inline members their full docs.
    fn member(&self, member: &Entity, scope: &[String], root: &str) -> MemberContext {
        let (href, anchor, text) = if member.kind.has_page() {
            let href = self
                .links
                .href(&member.path_string())
                .map(|href| format!("{root}{href}"));
            (href, None, member.summary())
        } else {
            let raw = member.comment.as_ref().map(|comment| comment.raw.as_str());
            (None, Some(anchor(member)), raw)
        };
        MemberContext {
            name: member.name.clone(),
            kind: member.kind.label(),
            signature: member.signature.clone(),
            docs: text.map(|text| self.markdown.render(text, scope, root)),
            href,
            anchor,
            deprecated: member.deprecation.is_some(),
        }
    }

    /// Links to every ancestor of `entity`, outermost first.
    fn breadcrumbs(&self, entity: &Entity, root: &str) -> Vec<NavLink> {
        (1..entity.path.len())
            .filter_map(|depth| {
                let path = entity.path[..depth].join("::");
                let href = self.links.href(&path)?;
                Some(NavLink {
                    name: entity.path[depth - 1].clone(),
                    href: format!("{root}{href}"),
                    summary: None,
                })
            })
            .collect()
    }

    fn page_info(&self, title: String, kind: &'static str, root: &str) -> PageInfo {
        let static_href =
            |resource: &Resource| format!("{root}{STATIC_DIR}/{}", html_escape(&resource.name));
        PageInfo {
            title,
            kind,
            root: root.to_string(),
            breadcrumbs: Vec::new(),
            stylesheets: self
                .resources
                .iter()
                .filter(|resource| resource.name.ends_with(".css"))
                .map(static_href)
                .collect(),
            scripts: self
                .resources
                .iter()
                .filter(|resource| resource.name.ends_with(".js"))
                .map(static_href)
                .collect(),
            search_index: self
                .renderer
                .search_index
                .then(|| format!("{root}{SEARCH_INDEX_FILE}")),
        }
    }
}
