//! Builds documentation packages from Rust source files.
//!
//! The walker starts at a crate root, parses every file with `syn`, and follows `mod name;`
//! declarations to their files the way rustc does. Each documented item becomes an [`Entity`];
//! inherent impls are folded into the type they implement once the whole module is known.

use std::fs;
use std::path::{Path, PathBuf};

use proc_macro2::Span;
use regex::RegexSet;
use syn::ext::IdentExt;
use syn::spanned::Spanned;
use syn::{Attribute, Fields, ImplItem, Item, ItemImpl, ItemMod, TraitItem, Type};
use tracing::debug;

use super::attrs;
use super::signature::Signatures;
use crate::error::{DocketError, Result};
use crate::model::{Comment, Entity, EntityKind, Package, SourceLocation, Visibility};

/// Filters applied while walking.
#[derive(Debug, Clone, Default)]
pub struct WalkOptions {
    /// Include non-public items.
    pub include_private: bool,
    /// Entities whose full path matches are skipped with their subtree.
    pub exclude: Option<RegexSet>,
}

/// Where a module's items live and where its child modules are found.
struct Scope<'p> {
    /// File the items were parsed from.
    file: &'p Path,
    /// Directory searched for `mod name;` files.
    dir: PathBuf,
    /// Path of the module owning the items.
    path: Vec<String>,
    /// Whether the items sit inside an inline `mod name { .. }` block.
    inline: bool,
}

/// Walks a crate's module tree and produces a [`Package`].
pub struct ModuleWalker<'a> {
    options: &'a WalkOptions,
    signatures: Signatures,
}

impl<'a> ModuleWalker<'a> {
    /// Create a walker with the given filters.
    pub fn new(options: &'a WalkOptions) -> Self {
        Self {
            options,
            signatures: Signatures::default(),
        }
    }

    /// Document the crate rooted at `root`, naming the package `name`.
    pub fn walk_crate(&self, root: &Path, name: &str) -> Result<Package> {
        debug!(root = %root.display(), name, "walking crate");
        let file = parse_file(root)?;

        let mut package = Package::new(name);
        package.set_comment(attrs::doc_text(&file.attrs).and_then(|text| Comment::parse(&text)));
        package.set_source(Some(SourceLocation {
            file: root.display().to_string(),
            line: 1,
        }));

        let scope = Scope {
            file: root,
            dir: parent_dir(root),
            path: vec![name.to_string()],
            inline: false,
        };
        *package.members_mut() = self.walk_items(&file.items, &scope)?;
        Ok(package)
    }

    fn walk_items(&self, items: &[Item], scope: &Scope<'_>) -> Result<Vec<Entity>> {
        let mut members = Vec::new();
        let mut impls = Vec::new();

        for item in items {
            if let Item::Impl(item_impl) = item {
                if !is_skipped(&item_impl.attrs) {
                    impls.push(item_impl);
                }
                continue;
            }
            if let Some(entity) = self.item(item, scope)? {
                push_unique(&mut members, entity);
            }
        }

        for item_impl in impls {
            self.attach_impl(item_impl, &mut members, scope)?;
        }

        Ok(members)
    }

    fn item(&self, item: &Item, scope: &Scope<'_>) -> Result<Option<Entity>> {
        let Some(attrs) = item_attrs(item) else {
            return Ok(None);
        };
        if is_skipped(attrs) {
            return Ok(None);
        }

        let (kind, ident, visibility) = match item {
            Item::Fn(item) => (EntityKind::Function, &item.sig.ident, visibility(&item.vis)),
            Item::Struct(item) => (EntityKind::Struct, &item.ident, visibility(&item.vis)),
            Item::Enum(item) => (EntityKind::Enum, &item.ident, visibility(&item.vis)),
            Item::Union(item) => (EntityKind::Union, &item.ident, visibility(&item.vis)),
            Item::Trait(item) => (EntityKind::Trait, &item.ident, visibility(&item.vis)),
            Item::Type(item) => (EntityKind::TypeAlias, &item.ident, visibility(&item.vis)),
            Item::Const(item) => (EntityKind::Constant, &item.ident, visibility(&item.vis)),
            Item::Static(item) => (EntityKind::Static, &item.ident, visibility(&item.vis)),
            Item::Mod(item) => (EntityKind::Package, &item.ident, visibility(&item.vis)),
            Item::Macro(item) if item.mac.path.is_ident("macro_rules") => {
                let Some(ident) = &item.ident else {
                    return Ok(None);
                };
                let visibility = if attrs::is_macro_export(&item.attrs) {
                    Visibility::Public
                } else {
                    Visibility::Private
                };
                (EntityKind::Macro, ident, visibility)
            }
            _ => return Ok(None),
        };

        let name = ident.unraw().to_string();
        if name == "_" || !self.includes(visibility) {
            return Ok(None);
        }

        let mut entity = Entity::new(kind, name, &scope.path);
        entity.visibility = visibility;
        if self.is_excluded(&entity) {
            debug!(path = %entity.path_string(), "excluded");
            return Ok(None);
        }

        entity.signature = self.signatures.item(item)?;
        entity.deprecation = attrs::deprecation(attrs);
        entity.source = Some(location(scope.file, ident.span()));

        let mut docs = attrs::doc_text(attrs);
        entity.members = match item {
            Item::Struct(item) => self.fields(&item.fields, &entity, scope.file)?,
            Item::Union(item) => {
                self.fields(&Fields::Named(item.fields.clone()), &entity, scope.file)?
            }
            Item::Enum(item) => {
                let mut variants = Vec::new();
                for variant in &item.variants {
                    if is_skipped(&variant.attrs) {
                        continue;
                    }
                    let mut member = self.member(
                        EntityKind::Variant,
                        variant.ident.unraw().to_string(),
                        entity.visibility,
                        &variant.attrs,
                        &entity,
                        location(scope.file, variant.ident.span()),
                    );
                    if self.is_excluded(&member) {
                        continue;
                    }
                    member.signature = Some(self.signatures.variant(variant)?);
                    push_unique(&mut variants, member);
                }
                variants
            }
            Item::Trait(item) => self.trait_items(&item.items, &entity, scope.file)?,
            Item::Mod(item) => {
                let (file_docs, members) = self.module(item, &entity, scope)?;
                docs = join_docs(docs, file_docs);
                members
            }
            _ => Vec::new(),
        };
        entity.comment = docs.and_then(|text| Comment::parse(&text));

        Ok(Some(entity))
    }

    /// Walk a module body, returning any file-level `//!` docs and the module's members.
    fn module(
        &self,
        item: &ItemMod,
        entity: &Entity,
        scope: &Scope<'_>,
    ) -> Result<(Option<String>, Vec<Entity>)> {
        let name = item.ident.unraw().to_string();
        let path_attr = attrs::path_override(&item.attrs);

        if let Some((_, items)) = &item.content {
            let child = Scope {
                file: scope.file,
                dir: scope.dir.join(path_attr.as_deref().unwrap_or(&name)),
                path: entity.path.clone(),
                inline: true,
            };
            return Ok((None, self.walk_items(items, &child)?));
        }

        let candidates = match &path_attr {
            Some(path) if scope.inline => vec![scope.dir.join(path)],
            Some(path) => vec![parent_dir(scope.file).join(path)],
            None => vec![
                scope.dir.join(format!("{name}.rs")),
                scope.dir.join(&name).join("mod.rs"),
            ],
        };
        let file_path = candidates
            .into_iter()
            .find(|candidate| candidate.is_file())
            .ok_or_else(|| DocketError::ModuleNotFound {
                module: entity.path_string(),
                declared_in: scope.file.to_path_buf(),
            })?;

        debug!(module = %entity.path_string(), file = %file_path.display(), "resolved module file");
        let file = parse_file(&file_path)?;
        let is_mod_rs = path_attr.is_some()
            || file_path.file_name().is_some_and(|file_name| file_name == "mod.rs");
        let dir = if is_mod_rs {
            parent_dir(&file_path)
        } else {
            parent_dir(&file_path).join(&name)
        };

        let child = Scope {
            file: &file_path,
            dir,
            path: entity.path.clone(),
            inline: false,
        };
        let members = self.walk_items(&file.items, &child)?;
        Ok((attrs::doc_text(&file.attrs), members))
    }

    fn fields(&self, fields: &Fields, parent: &Entity, file: &Path) -> Result<Vec<Entity>> {
        let mut members = Vec::new();
        for (position, field) in fields.iter().enumerate() {
            if is_skipped(&field.attrs) {
                continue;
            }
            let visibility = visibility(&field.vis);
            if !self.includes(visibility) {
                continue;
            }
            let name = field
                .ident
                .as_ref()
                .map_or_else(|| position.to_string(), |ident| ident.unraw().to_string());
            let span = field
                .ident
                .as_ref()
                .map_or_else(|| field.ty.span(), |ident| ident.span());
            let mut member = self.member(
                EntityKind::Field,
                name,
                visibility,
                &field.attrs,
                parent,
                location(file, span),
            );
            if self.is_excluded(&member) {
                continue;
            }
            member.signature = Some(self.signatures.field(field, &member.name)?);
            members.push(member);
        }
        Ok(members)
    }

    fn trait_items(&self, items: &[TraitItem], parent: &Entity, file: &Path) -> Result<Vec<Entity>> {
        let mut members = Vec::new();
        for item in items {
            let (kind, ident, item_attrs) = match item {
                TraitItem::Fn(item) => (EntityKind::Method, &item.sig.ident, &item.attrs),
                TraitItem::Const(item) => (EntityKind::AssocConst, &item.ident, &item.attrs),
                TraitItem::Type(item) => (EntityKind::AssocType, &item.ident, &item.attrs),
                _ => continue,
            };
            if is_skipped(item_attrs) {
                continue;
            }
            let mut member = self.member(
                kind,
                ident.unraw().to_string(),
                parent.visibility,
                item_attrs,
                parent,
                location(file, ident.span()),
            );
            if self.is_excluded(&member) {
                continue;
            }
            member.signature = Some(self.signatures.trait_item(item)?);
            push_unique(&mut members, member);
        }
        Ok(members)
    }

    fn attach_impl(
        &self,
        item_impl: &ItemImpl,
        members: &mut [Entity],
        scope: &Scope<'_>,
    ) -> Result<()> {
        let Some(target) = self_type_name(&item_impl.self_ty) else {
            debug!(module = %scope.path.join("::"), "skipping impl for non-path type");
            return Ok(());
        };
        let Some(owner) = members.iter_mut().find(|member| {
            member.name == target
                && matches!(
                    member.kind,
                    EntityKind::Struct | EntityKind::Enum | EntityKind::Union | EntityKind::TypeAlias
                )
        }) else {
            debug!(target, module = %scope.path.join("::"), "no documented type for impl");
            return Ok(());
        };

        match &item_impl.trait_ {
            Some((negative, _, _)) if negative.is_some() => Ok(()),
            Some((_, trait_path, _)) => {
                let name = self.signatures.path(trait_path)?;
                let mut member = self.member(
                    EntityKind::Impl,
                    name,
                    owner.visibility,
                    &item_impl.attrs,
                    owner,
                    location(scope.file, item_impl.impl_token.span()),
                );
                if self.is_excluded(&member) {
                    return Ok(());
                }
                member.signature = self.signatures.item(&Item::Impl(item_impl.clone()))?;
                push_unique(&mut owner.members, member);
                Ok(())
            }
            None => {
                for item in &item_impl.items {
                    let (kind, ident, item_attrs, vis) = match item {
                        ImplItem::Fn(item) => {
                            (EntityKind::Method, &item.sig.ident, &item.attrs, &item.vis)
                        }
                        ImplItem::Const(item) => {
                            (EntityKind::AssocConst, &item.ident, &item.attrs, &item.vis)
                        }
                        ImplItem::Type(item) => {
                            (EntityKind::AssocType, &item.ident, &item.attrs, &item.vis)
                        }
                        _ => continue,
                    };
                    let visibility = visibility(vis);
                    if is_skipped(item_attrs) || !self.includes(visibility) {
                        continue;
                    }
                    let mut member = self.member(
                        kind,
                        ident.unraw().to_string(),
                        visibility,
                        item_attrs,
                        owner,
                        location(scope.file, ident.span()),
                    );
                    if self.is_excluded(&member) {
                        continue;
                    }
                    member.signature = Some(self.signatures.impl_item(item)?);
                    push_unique(&mut owner.members, member);
                }
                Ok(())
            }
        }
    }

    /// A nested member with docs, deprecation and location filled in.
    fn member(
        &self,
        kind: EntityKind,
        name: String,
        visibility: Visibility,
        attrs: &[Attribute],
        parent: &Entity,
        source: SourceLocation,
    ) -> Entity {
        let mut member = Entity::new(kind, name, &parent.path);
        member.visibility = visibility;
        member.comment = attrs::doc_text(attrs).and_then(|text| Comment::parse(&text));
        member.deprecation = attrs::deprecation(attrs);
        member.source = Some(source);
        member
    }

    fn includes(&self, visibility: Visibility) -> bool {
        visibility.is_public() || self.options.include_private
    }

    fn is_excluded(&self, entity: &Entity) -> bool {
        self.options
            .exclude
            .as_ref()
            .is_some_and(|set| set.is_match(&entity.path_string()))
    }
}

fn parse_file(path: &Path) -> Result<syn::File> {
    let content = fs::read_to_string(path).map_err(|source| DocketError::SourceRead {
        path: path.to_path_buf(),
        source,
    })?;
    syn::parse_file(&content).map_err(|e| {
        let start = e.span().start();
        DocketError::Parse {
            path: path.to_path_buf(),
            message: format!("{e} (line {}, column {})", start.line, start.column + 1),
        }
    })
}

fn parent_dir(path: &Path) -> PathBuf {
    path.parent().map(Path::to_path_buf).unwrap_or_default()
}

fn location(file: &Path, span: Span) -> SourceLocation {
    SourceLocation {
        file: file.display().to_string(),
        line: u32::try_from(span.start().line).unwrap_or(u32::MAX),
    }
}

fn visibility(vis: &syn::Visibility) -> Visibility {
    match vis {
        syn::Visibility::Public(_) => Visibility::Public,
        syn::Visibility::Restricted(_) => Visibility::Crate,
        syn::Visibility::Inherited => Visibility::Private,
    }
}

fn is_skipped(attrs: &[Attribute]) -> bool {
    attrs::is_cfg_test(attrs) || attrs::is_doc_hidden(attrs)
}

fn item_attrs(item: &Item) -> Option<&[Attribute]> {
    let attrs = match item {
        Item::Const(item) => &item.attrs,
        Item::Enum(item) => &item.attrs,
        Item::Fn(item) => &item.attrs,
        Item::Impl(item) => &item.attrs,
        Item::Macro(item) => &item.attrs,
        Item::Mod(item) => &item.attrs,
        Item::Static(item) => &item.attrs,
        Item::Struct(item) => &item.attrs,
        Item::Trait(item) => &item.attrs,
        Item::Type(item) => &item.attrs,
        Item::Union(item) => &item.attrs,
        _ => return None,
    };
    Some(attrs)
}

/// The last path segment of an impl's self type, e.g. `Point` for `impl<T> geo::Point<T>`.
fn self_type_name(ty: &Type) -> Option<String> {
    match ty {
        Type::Path(type_path) if type_path.qself.is_none() => type_path
            .path
            .segments
            .last()
            .map(|segment| segment.ident.unraw().to_string()),
        Type::Group(group) => self_type_name(&group.elem),
        Type::Paren(paren) => self_type_name(&paren.elem),
        _ => None,
    }
}

/// Append `entity` unless a member of the same kind and name exists; the first one wins.
pub(super) fn push_unique(members: &mut Vec<Entity>, entity: Entity) {
    if members
        .iter()
        .any(|member| member.kind == entity.kind && member.name == entity.name)
    {
        debug!(path = %entity.path_string(), "keeping first of duplicate definitions");
        return;
    }
    members.push(entity);
}

fn join_docs(outer: Option<String>, inner: Option<String>) -> Option<String> {
    match (outer, inner) {
        (Some(outer), Some(inner)) => Some(format!("{outer}\n\n{inner}")),
        (outer, inner) => outer.or(inner),
    }
}
