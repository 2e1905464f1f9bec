//! Documentation data model.
//!
//! An [`Index`] maps top-level package names to [`Package`] trees. Packages own an ordered list of
//! [`Entity`] members, and entities nest further (a struct owns its fields and methods, a module
//! owns its items). The model is plain data: it serializes with serde and carries no references
//! back into the sources it was built from.

use std::collections::{BTreeMap, btree_map};
use std::ops::Deref;

use serde::{Deserialize, Serialize};

use crate::error::{DocketError, Result};

/// Separator between path segments in rendered paths.
pub const PATH_SEPARATOR: &str = "::";

/// The kind of a documented entity.
///
/// Declaration order is the order in which member sections are presented.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    /// A crate root or module.
    Package,
    /// A macro_rules! definition.
    Macro,
    /// Struct definition.
    Struct,
    /// Enum definition.
    Enum,
    /// Union definition.
    Union,
    /// Trait definition.
    Trait,
    /// Type alias.
    TypeAlias,
    /// Free function.
    Function,
    /// Module-level constant.
    Constant,
    /// Static item.
    Static,
    /// Named or positional field.
    Field,
    /// Enum variant.
    Variant,
    /// Associated type of a trait or impl.
    AssocType,
    /// Associated constant of a trait or impl.
    AssocConst,
    /// Method of a trait or inherent impl.
    Method,
    /// Trait implementation attached to a type.
    Impl,
}

impl EntityKind {
    /// Short keyword-like label.
    pub fn label(self) -> &'static str {
        match self {
            Self::Package => "mod",
            Self::Macro => "macro",
            Self::Struct => "struct",
            Self::Enum => "enum",
            Self::Union => "union",
            Self::Trait => "trait",
            Self::TypeAlias => "type",
            Self::Function => "fn",
            Self::Constant => "constant",
            Self::Static => "static",
            Self::Field => "field",
            Self::Variant => "variant",
            Self::AssocType => "associated type",
            Self::AssocConst => "associated constant",
            Self::Method => "method",
            Self::Impl => "impl",
        }
    }

    /// Heading used when members of this kind are grouped on a page.
    pub fn section_title(self) -> &'static str {
        match self {
            Self::Package => "Modules",
            Self::Macro => "Macros",
            Self::Struct => "Structs",
            Self::Enum => "Enums",
            Self::Union => "Unions",
            Self::Trait => "Traits",
            Self::TypeAlias => "Type Aliases",
            Self::Function => "Functions",
            Self::Constant => "Constants",
            Self::Static => "Statics",
            Self::Field => "Fields",
            Self::Variant => "Variants",
            Self::AssocType => "Associated Types",
            Self::AssocConst => "Associated Constants",
            Self::Method => "Methods",
            Self::Impl => "Trait Implementations",
        }
    }

    /// Whether entities of this kind get a page of their own when rendered.
    pub fn has_page(self) -> bool {
        !matches!(
            self,
            Self::Field
                | Self::Variant
                | Self::AssocType
                | Self::AssocConst
                | Self::Method
                | Self::Impl
        )
    }
}

/// Visibility of a documented entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Visibility {
    /// `pub`
    Public,
    /// `pub(crate)`, `pub(super)` and `pub(in path)`
    Crate,
    /// No visibility qualifier.
    Private,
}

impl Visibility {
    /// Whether the entity is part of the public API.
    pub fn is_public(self) -> bool {
        self == Self::Public
    }
}

/// Parsed documentation comment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    /// Full markdown text.
    pub raw: String,
    /// First paragraph of the text.
    pub summary: String,
    /// Top-level `# Heading` sections such as Examples or Errors.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sections: Vec<CommentSection>,
}

/// A named section within a documentation comment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommentSection {
    /// Heading text without the leading `#`.
    pub name: String,
    /// Markdown body up to the next top-level heading.
    pub content: String,
}

impl Comment {
    /// Parse raw markdown into a comment. Returns `None` for blank input.
    pub fn parse(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return None;
        }

        let summary = trimmed
            .lines()
            .take_while(|line| !line.trim().is_empty())
            .map(str::trim)
            .collect::<Vec<_>>()
            .join(" ");

        Some(Self {
            raw: trimmed.to_string(),
            summary,
            sections: extract_sections(trimmed),
        })
    }
}

fn extract_sections(text: &str) -> Vec<CommentSection> {
    let mut sections = Vec::new();
    let mut current: Option<(String, String)> = None;
    let mut in_fence = false;

    for line in text.lines() {
        if line.trim_start().starts_with("```") {
            in_fence = !in_fence;
        }
        if !in_fence && let Some(name) = line.strip_prefix("# ") {
            if let Some((name, content)) = current.take() {
                sections.push(CommentSection {
                    name,
                    content: content.trim().to_string(),
                });
            }
            current = Some((name.trim().to_string(), String::new()));
        } else if let Some((_, content)) = current.as_mut() {
            content.push_str(line);
            content.push('\n');
        }
    }

    if let Some((name, content)) = current {
        sections.push(CommentSection {
            name,
            content: content.trim().to_string(),
        });
    }

    sections
}

/// Deprecation notice attached to an entity.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Deprecation {
    /// Version the entity was deprecated in.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub since: Option<String>,
    /// Free-form explanation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

/// Where an entity was declared.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceLocation {
    /// Source file, as it was named when the index was built.
    pub file: String,
    /// 1-based line number.
    pub line: u32,
}

/// A documented entity and its nested members.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entity {
    /// What kind of item this is.
    pub kind: EntityKind,
    /// Short name.
    pub name: String,
    /// Fully qualified path, one segment per nesting level, ending with `name`.
    pub path: Vec<String>,
    /// Declared visibility.
    pub visibility: Visibility,
    /// Declaration without body, formatted as Rust.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signature: Option<String>,
    /// Documentation comment.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<Comment>,
    /// Deprecation notice.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deprecation: Option<Deprecation>,
    /// Declaration site.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<SourceLocation>,
    /// Nested members in declaration order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub members: Vec<Self>,
}

impl Entity {
    /// Create an entity with no documentation, signature or members.
    pub fn new(kind: EntityKind, name: impl Into<String>, parent: &[String]) -> Self {
        let name = name.into();
        let mut path = parent.to_vec();
        path.push(name.clone());
        Self {
            kind,
            name,
            path,
            visibility: Visibility::Public,
            signature: None,
            comment: None,
            deprecation: None,
            source: None,
            members: Vec::new(),
        }
    }

    /// The path joined with `::`.
    pub fn path_string(&self) -> String {
        self.path.join(PATH_SEPARATOR)
    }

    /// First member with the given kind and name.
    pub fn member(&self, kind: EntityKind, name: &str) -> Option<&Self> {
        self.members
            .iter()
            .find(|member| member.kind == kind && member.name == name)
    }

    /// First member with the given name, of any kind.
    pub fn member_named(&self, name: &str) -> Option<&Self> {
        self.members.iter().find(|member| member.name == name)
    }

    /// Depth-first iterator over this entity and all nested members.
    pub fn walk(&self) -> Walk<'_> {
        Walk { stack: vec![self] }
    }

    /// Look up a descendant by path segments relative to this entity.
    ///
    /// A module wins over a same-named item while segments remain, since only modules and types
    /// hold further named members.
    pub fn descendant(&self, segments: &[&str]) -> Option<&Self> {
        let mut current = self;
        for (position, segment) in segments.iter().enumerate() {
            let is_last = position + 1 == segments.len();
            current = if is_last {
                current.member_named(segment)
            } else {
                current
                    .member(EntityKind::Package, segment)
                    .or_else(|| current.member_named(segment))
            }?;
        }
        Some(current)
    }

    /// The first entity in this subtree that gets its own page but whose name cannot be used as
    /// a file name.
    pub fn unsafe_page_name(&self) -> Option<&Self> {
        self.walk()
            .find(|entity| entity.kind.has_page() && !is_page_name(&entity.name))
    }

    /// Short documentation summary, if the entity is documented.
    pub fn summary(&self) -> Option<&str> {
        self.comment.as_ref().map(|comment| comment.summary.as_str())
    }
}

/// Whether `name` can become an output path segment: letters, digits and `_` only.
pub fn is_page_name(name: &str) -> bool {
    !name.is_empty() && name.chars().all(|c| c.is_alphanumeric() || c == '_')
}

/// Depth-first pre-order traversal over an entity tree.
pub struct Walk<'a> {
    /// Entities still to visit, top of stack first.
    stack: Vec<&'a Entity>,
}

impl<'a> Iterator for Walk<'a> {
    type Item = &'a Entity;

    fn next(&mut self) -> Option<Self::Item> {
        let entity = self.stack.pop()?;
        self.stack.extend(entity.members.iter().rev());
        Some(entity)
    }
}

/// A top-level package: an [`Entity`] whose kind is [`EntityKind::Package`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Entity", into = "Entity")]
pub struct Package(Entity);

impl Package {
    /// Create an empty package with the given name.
    pub fn new(name: impl Into<String>) -> Self {
        Self(Entity::new(EntityKind::Package, name, &[]))
    }

    /// Mutable access to the package's members.
    pub fn members_mut(&mut self) -> &mut Vec<Entity> {
        &mut self.0.members
    }

    /// Set the package documentation.
    pub fn set_comment(&mut self, comment: Option<Comment>) {
        self.0.comment = comment;
    }

    /// Set the package declaration site.
    pub fn set_source(&mut self, source: Option<SourceLocation>) {
        self.0.source = source;
    }

    /// The underlying entity.
    pub fn as_entity(&self) -> &Entity {
        &self.0
    }

    /// Fold another package with the same name into this one.
    ///
    /// Members are appended in order. A member whose kind and name already exist is an error.
    pub fn merge(&mut self, other: Self) -> Result<()> {
        let other = other.0;
        for member in other.members {
            if self.member(member.kind, &member.name).is_some() {
                return Err(DocketError::DuplicateEntity(format!(
                    "{} {}",
                    member.kind.label(),
                    member.path_string()
                )));
            }
            self.0.members.push(member);
        }
        if self.0.comment.is_none() {
            self.0.comment = other.comment;
        }
        if self.0.source.is_none() {
            self.0.source = other.source;
        }
        Ok(())
    }
}

impl Deref for Package {
    type Target = Entity;

    fn deref(&self) -> &Entity {
        &self.0
    }
}

impl TryFrom<Entity> for Package {
    type Error = DocketError;

    fn try_from(entity: Entity) -> Result<Self> {
        if entity.kind != EntityKind::Package {
            return Err(DocketError::InvalidIndex(format!(
                "top-level entity {} is a {}, not a package",
                entity.name,
                entity.kind.label()
            )));
        }
        if entity.path.len() != 1 || entity.path[0] != entity.name {
            return Err(DocketError::InvalidIndex(format!(
                "top-level package {} has path {}",
                entity.name,
                entity.path_string()
            )));
        }
        if let Some(unsafe_entity) = entity.unsafe_page_name() {
            return Err(DocketError::InvalidIndex(format!(
                "{} {} cannot be used as an output file name",
                unsafe_entity.kind.label(),
                unsafe_entity.path_string()
            )));
        }
        Ok(Self(entity))
    }
}

impl From<Package> for Entity {
    fn from(package: Package) -> Self {
        package.0
    }
}

/// Mapping from top-level package name to its documentation tree.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(
    try_from = "BTreeMap<String, Package>",
    into = "BTreeMap<String, Package>"
)]
pub struct Index {
    /// Packages keyed by their own name.
    packages: BTreeMap<String, Package>,
}

impl Index {
    /// Create an empty index.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a package, merging it into an existing package of the same name.
    pub fn insert(&mut self, package: Package) -> Result<()> {
        match self.packages.entry(package.name.clone()) {
            btree_map::Entry::Vacant(slot) => {
                slot.insert(package);
                Ok(())
            }
            btree_map::Entry::Occupied(mut slot) => slot.get_mut().merge(package),
        }
    }

    /// Look up a top-level package.
    pub fn get(&self, name: &str) -> Option<&Package> {
        self.packages.get(name)
    }

    /// Whether a top-level package with this name exists.
    pub fn contains(&self, name: &str) -> bool {
        self.packages.contains_key(name)
    }

    /// Iterate packages in key order.
    pub fn packages(&self) -> impl Iterator<Item = &Package> {
        self.packages.values()
    }

    /// Package names in key order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.packages.keys().map(String::as_str)
    }

    /// Number of top-level packages.
    pub fn len(&self) -> usize {
        self.packages.len()
    }

    /// Whether the index has no packages.
    pub fn is_empty(&self) -> bool {
        self.packages.is_empty()
    }

    /// Depth-first iterator over every entity in every package.
    pub fn entities(&self) -> impl Iterator<Item = &Entity> {
        self.packages.values().flat_map(|package| package.walk())
    }

    /// Resolve a `::`-separated path to an entity.
    pub fn find(&self, path: &str) -> Option<&Entity> {
        let mut segments = path.split(PATH_SEPARATOR);
        let package = self.packages.get(segments.next()?)?;
        let rest: Vec<&str> = segments.collect();
        package.descendant(&rest)
    }

    /// Build an index from packages, merging packages that share a name.
    pub fn from_packages(packages: impl IntoIterator<Item = Package>) -> Result<Self> {
        let mut index = Self::new();
        for package in packages {
            index.insert(package)?;
        }
        Ok(index)
    }

    /// Consume the index, returning the underlying map.
    pub fn into_packages(self) -> BTreeMap<String, Package> {
        self.packages
    }
}

impl TryFrom<BTreeMap<String, Package>> for Index {
    type Error = DocketError;

    fn try_from(packages: BTreeMap<String, Package>) -> Result<Self> {
        if let Some((key, package)) = packages.iter().find(|(key, package)| **key != package.name) {
            return Err(DocketError::InvalidIndex(format!(
                "key {key} holds package {}",
                package.name
            )));
        }
        Ok(Self { packages })
    }
}

impl From<Index> for BTreeMap<String, Package> {
    fn from(index: Index) -> Self {
        index.packages
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn package_with(name: &str, members: &[(EntityKind, &str)]) -> Package {
        let mut package = Package::new(name);
        let parent = package.path.clone();
        for (kind, member) in members {
            package
                .members_mut()
                .push(Entity::new(*kind, *member, &parent));
        }
        package
    }

    #[test]
    fn comment_summary_is_first_paragraph() {
        let comment = Comment::parse("  Adds two numbers\ntogether.\n\nLonger text.  ").unwrap();
        assert_eq!(comment.summary, "Adds two numbers together.");
        assert_eq!(comment.raw, "Adds two numbers\ntogether.\n\nLonger text.");
        assert!(Comment::parse(" \n ").is_none());
    }

    #[test]
    fn comment_sections_skip_code_fences() {
        let raw = "Summary.\n\n# Examples\n\n```\n# hidden line\nlet x = 1;\n```\n\n# Errors\n\nFails.";
        let comment = Comment::parse(raw).unwrap();
        let names: Vec<&str> = comment.sections.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["Examples", "Errors"]);
        assert!(comment.sections[0].content.contains("# hidden line"));
        assert_eq!(comment.sections[1].content, "Fails.");
    }

    #[test]
    fn walk_is_depth_first_in_declaration_order() {
        let mut package = package_with("root", &[(EntityKind::Struct, "A")]);
        let parent = package.members_mut()[0].path.clone();
        package.members_mut()[0]
            .members
            .push(Entity::new(EntityKind::Field, "x", &parent));
        package
            .members_mut()
            .push(Entity::new(EntityKind::Function, "f", &["root".to_string()]));

        let paths: Vec<String> = package.walk().map(Entity::path_string).collect();
        assert_eq!(paths, vec!["root", "root::A", "root::A::x", "root::f"]);
    }

    #[test]
    fn insert_merges_same_package() {
        let mut index = Index::new();
        index
            .insert(package_with("geo", &[(EntityKind::Struct, "Point")]))
            .unwrap();
        index
            .insert(package_with("geo", &[(EntityKind::Function, "Point")]))
            .unwrap();
        assert_eq!(index.len(), 1);
        assert_eq!(index.get("geo").unwrap().members.len(), 2);
        assert!(index.find("geo::Point").is_some());
    }

    #[test]
    fn insert_rejects_duplicate_members() {
        let mut index = Index::new();
        index
            .insert(package_with("geo", &[(EntityKind::Struct, "Point")]))
            .unwrap();
        let err = index
            .insert(package_with("geo", &[(EntityKind::Struct, "Point")]))
            .unwrap_err();
        assert!(matches!(err, DocketError::DuplicateEntity(ref path) if path == "struct geo::Point"));
    }

    #[test]
    fn package_rejects_non_package_entity() {
        let entity = Entity::new(EntityKind::Struct, "Point", &[]);
        assert!(Package::try_from(entity).is_err());
    }

    #[test]
    fn index_rejects_mismatched_keys() {
        let mut map = BTreeMap::new();
        map.insert("other".to_string(), Package::new("geo"));
        assert!(matches!(
            Index::try_from(map),
            Err(DocketError::InvalidIndex(_))
        ));
    }

    #[test]
    fn package_rejects_path_like_names() {
        for name in ["../escaped", "a/b", "a\\b", "x\"y", ""] {
            let entity = Entity::new(EntityKind::Package, name, &[]);
            assert!(
                matches!(Package::try_from(entity), Err(DocketError::InvalidIndex(_))),
                "{name}"
            );
        }

        let mut package = package_with("geo", &[]);
        let parent = package.path.clone();
        package
            .members_mut()
            .push(Entity::new(EntityKind::Struct, "../Point", &parent));
        assert!(Package::try_from(Entity::from(package)).is_err());

        let mut package = package_with("geo", &[]);
        let parent = package.path.clone();
        package
            .members_mut()
            .push(Entity::new(EntityKind::Impl, "std::fmt::Display", &parent));
        assert!(Package::try_from(Entity::from(package)).is_ok());
    }

    #[test]
    fn find_prefers_modules_for_inner_segments() {
        let mut package = package_with(
            "k",
            &[(EntityKind::Function, "x"), (EntityKind::Package, "x")],
        );
        let module_path = package.members_mut()[1].path.clone();
        package.members_mut()[1]
            .members
            .push(Entity::new(EntityKind::Struct, "Inner", &module_path));
        let index = Index::from_packages([package]).unwrap();

        let inner = index.find("k::x::Inner").unwrap();
        assert_eq!(inner.path_string(), "k::x::Inner");
        assert_eq!(index.find("k::x").unwrap().kind, EntityKind::Function);
    }

    #[test]
    fn from_packages_sorts_names() {
        let index = Index::from_packages([Package::new("b"), Package::new("a")]).unwrap();
        assert_eq!(index.names().collect::<Vec<_>>(), vec!["a", "b"]);
    }
}
