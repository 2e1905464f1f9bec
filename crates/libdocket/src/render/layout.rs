//! Output file layout and hyperlink targets.
//!
//! Packages render to `<pkg>/<sub>/index.html`, page-worthy entities to
//! `<pkg>/<sub>/<kind>.<Name>.html`, and everything else to an anchor on its parent's page.
//! Hrefs are relative to the output root and always use `/`.

use std::collections::BTreeMap;

use crate::model::{Entity, EntityKind, Index, PATH_SEPARATOR};

/// Site root page.
pub const ROOT_PAGE: &str = "index.html";
/// Directory receiving copied resources.
pub const STATIC_DIR: &str = "static";
/// Flat search index written next to the root page.
pub const SEARCH_INDEX_FILE: &str = "search-index.json";

/// Href of the page documenting `entity`, or `None` when it renders on its parent's page.
pub fn page_href(entity: &Entity) -> Option<String> {
    if entity.kind == EntityKind::Package {
        let mut segments = entity.path.clone();
        segments.push(ROOT_PAGE.to_string());
        return Some(segments.join("/"));
    }
    if !entity.kind.has_page() {
        return None;
    }
    let (_, parents) = entity.path.split_last()?;
    let mut segments = parents.to_vec();
    segments.push(format!("{}.{}.html", file_prefix(entity.kind), entity.name));
    Some(segments.join("/"))
}

fn file_prefix(kind: EntityKind) -> &'static str {
    match kind {
        EntityKind::TypeAlias => "type",
        EntityKind::Function => "fn",
        other => other.label(),
    }
}

/// Fragment identifying a member on its parent's page.
pub fn anchor(entity: &Entity) -> String {
    let prefix = match entity.kind {
        EntityKind::Field => "structfield",
        EntityKind::Variant => "variant",
        EntityKind::Method => "method",
        EntityKind::AssocConst => "associatedconstant",
        EntityKind::AssocType => "associatedtype",
        EntityKind::Impl => "impl",
        other => other.label(),
    };
    let name: String = entity
        .name
        .chars()
        .map(|c| if c.is_alphanumeric() || c == '_' { c } else { '-' })
        .collect();
    format!("{prefix}.{name}")
}

/// `../` repeated once per directory level of `href`.
pub fn root_prefix(href: &str) -> String {
    "../".repeat(href.matches('/').count())
}

/// Href for every entity in an index, keyed by `::`-joined path.
#[derive(Debug, Clone, Default)]
pub struct Links {
    hrefs: BTreeMap<String, String>,
}

impl Links {
    /// Compute links for every entity in `index`.
    pub fn new(index: &Index) -> Self {
        let mut links = Self::default();
        for package in index.packages() {
            links.visit(package, None);
        }
        links
    }

    fn visit(&mut self, entity: &Entity, parent_page: Option<&str>) {
        let href = match (page_href(entity), parent_page) {
            (Some(page), _) => page,
            (None, Some(parent)) => format!("{parent}#{}", anchor(entity)),
            (None, None) => return,
        };
        let page = href.split('#').next().unwrap_or(&href).to_string();
        self.hrefs.insert(entity.path_string(), href);
        for member in &entity.members {
            self.visit(member, Some(&page));
        }
    }

    /// Href of the entity at `path`.
    pub fn href(&self, path: &str) -> Option<&str> {
        self.hrefs.get(path).map(String::as_str)
    }

    /// Resolve an intra-doc link target such as `` `Point` ``, `crate::geo::area()` or
    /// `super::Shape`, searching outward from the module at `scope`.
    pub fn resolve(&self, target: &str, scope: &[String]) -> Option<&str> {
        let target = clean_target(target)?;

        let (base, rest): (&[String], &str) = if let Some(rest) = target.strip_prefix("crate::") {
            (scope.get(..1)?, rest)
        } else if let Some(rest) = target.strip_prefix("self::") {
            (scope, rest)
        } else if let Some(rest) = target.strip_prefix("super::") {
            (scope.split_last().map(|(_, parent)| parent)?, rest)
        } else {
            for depth in (1..=scope.len()).rev() {
                let module = scope[..depth].join(PATH_SEPARATOR);
                let candidate = format!("{module}{PATH_SEPARATOR}{target}");
                if let Some(href) = self.href(&candidate) {
                    return Some(href);
                }
            }
            return self.href(target);
        };

        let mut candidate = base.join(PATH_SEPARATOR);
        if !rest.is_empty() {
            candidate.push_str(PATH_SEPARATOR);
            candidate.push_str(rest);
        }
        self.href(&candidate)
    }
}

/// Strip backticks, `kind@` disambiguators, and trailing `()` or `!`.
fn clean_target(target: &str) -> Option<&str> {
    let mut target = target.trim().trim_matches('`').trim();
    if let Some((prefix, rest)) = target.split_once('@')
        && prefix.chars().all(|c| c.is_ascii_alphabetic())
    {
        target = rest;
    }
    target = target
        .strip_suffix("()")
        .or_else(|| target.strip_suffix('!'))
        .unwrap_or(target);
    let valid = !target.is_empty()
        && target
            .chars()
            .all(|c| c.is_alphanumeric() || c == '_' || c == ':');
    valid.then_some(target)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::model::Package;

    fn index() -> Index {
        let mut package = Package::new("geo");
        let root = package.path.clone();
        let mut shapes = Entity::new(EntityKind::Package, "shapes", &root);
        let mut point = Entity::new(EntityKind::Struct, "Point", &shapes.path);
        point
            .members
            .push(Entity::new(EntityKind::Field, "x", &point.path));
        point
            .members
            .push(Entity::new(EntityKind::Impl, "From<(f64, f64)>", &point.path));
        shapes.members.push(point);
        package.members_mut().push(shapes);
        package
            .members_mut()
            .push(Entity::new(EntityKind::Function, "area", &root));
        Index::from_packages([package]).unwrap()
    }

    #[test]
    fn page_paths() {
        let index = index();
        let links = Links::new(&index);
        assert_eq!(links.href("geo"), Some("geo/index.html"));
        assert_eq!(links.href("geo::shapes"), Some("geo/shapes/index.html"));
        assert_eq!(
            links.href("geo::shapes::Point"),
            Some("geo/shapes/struct.Point.html")
        );
        assert_eq!(
            links.href("geo::shapes::Point::x"),
            Some("geo/shapes/struct.Point.html#structfield.x")
        );
        assert_eq!(
            links.href("geo::shapes::Point::From<(f64, f64)>"),
            Some("geo/shapes/struct.Point.html#impl.From--f64--f64--")
        );
        assert_eq!(links.href("geo::area"), Some("geo/fn.area.html"));
    }

    #[test]
    fn root_prefix_counts_directories() {
        assert_eq!(root_prefix("index.html"), "");
        assert_eq!(root_prefix("geo/shapes/struct.Point.html"), "../../");
    }

    #[test]
    fn resolves_relative_and_qualified_targets() {
        let index = index();
        let links = Links::new(&index);
        let scope = vec!["geo".to_string(), "shapes".to_string()];
        assert_eq!(
            links.resolve("`Point`", &scope),
            Some("geo/shapes/struct.Point.html")
        );
        assert_eq!(links.resolve("area()", &scope), Some("geo/fn.area.html"));
        assert_eq!(links.resolve("crate::area", &scope), Some("geo/fn.area.html"));
        assert_eq!(
            links.resolve("super::shapes", &scope),
            Some("geo/shapes/index.html")
        );
        assert_eq!(
            links.resolve("struct@Point", &scope),
            Some("geo/shapes/struct.Point.html")
        );
        assert_eq!(links.resolve("Missing", &scope), None);
        assert_eq!(links.resolve("not a path", &scope), None);
    }
}
