//! Conversion of rustdoc JSON into documentation packages.

use std::fs;
use std::path::{Path, PathBuf};

use rustdoc_types::{
    Crate, Id, Item, ItemEnum, StructKind, VariantKind, Visibility as RustdocVisibility,
};
use tracing::{debug, info};

use super::typefmt;
use super::walker::{WalkOptions, push_unique};
use crate::error::{DocketError, Result};
use crate::model::{
    Comment, Deprecation, Entity, EntityKind, Package, SourceLocation, Visibility,
};
use crate::toolchain;

/// Generate rustdoc JSON for the crate described by `manifest_path` and return the JSON path.
pub fn generate(manifest_path: &Path, document_private_items: bool) -> Result<PathBuf> {
    toolchain::ensure_nightly()?;
    info!(manifest = %manifest_path.display(), "generating rustdoc JSON");
    rustdoc_json::Builder::default()
        .toolchain("nightly")
        .manifest_path(manifest_path)
        .document_private_items(document_private_items)
        .silent(true)
        .build()
        .map_err(|e| DocketError::Rustdoc(e.to_string()))
}

/// Read a rustdoc JSON file.
pub fn load(path: &Path) -> Result<Crate> {
    let content = fs::read_to_string(path).map_err(|source| DocketError::SourceRead {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&content)
        .map_err(|e| DocketError::Rustdoc(format!("{}: {e}", path.display())))
}

/// Converts a rustdoc [`Crate`] into a [`Package`].
pub struct RustdocConverter<'a> {
    krate: &'a Crate,
    options: &'a WalkOptions,
}

impl<'a> RustdocConverter<'a> {
    /// Create a converter over `krate`.
    pub fn new(krate: &'a Crate, options: &'a WalkOptions) -> Self {
        Self { krate, options }
    }

    /// Convert the crate root, naming the package `name` or else after the root module.
    pub fn convert(&self, name: Option<&str>) -> Result<Package> {
        let root = self.item(&self.krate.root).ok_or_else(|| {
            DocketError::Rustdoc("crate root is missing from the index".to_string())
        })?;
        let ItemEnum::Module(module) = &root.inner else {
            return Err(DocketError::Rustdoc("crate root is not a module".to_string()));
        };
        let name = name
            .map(str::to_string)
            .or_else(|| root.name.clone())
            .ok_or_else(|| DocketError::Rustdoc("crate root has no name".to_string()))?;

        let mut package = Package::new(&name);
        package.set_comment(comment(root));
        package.set_source(location(root));
        let parent = package.path.clone();
        *package.members_mut() = self.items(&module.items, &parent)?;
        debug!(package = %name, members = package.members.len(), "converted rustdoc crate");
        Ok(package)
    }

    fn item(&self, id: &Id) -> Option<&'a Item> {
        self.krate.index.get(id)
    }

    fn items(&self, ids: &[Id], parent: &[String]) -> Result<Vec<Entity>> {
        let mut members = Vec::new();
        for id in ids {
            let Some(item) = self.item(id) else {
                continue;
            };
            if let Some(entity) = self.module_item(item, parent)? {
                push_unique(&mut members, entity);
            }
        }
        Ok(members)
    }

    fn module_item(&self, item: &Item, parent: &[String]) -> Result<Option<Entity>> {
        let kind = match &item.inner {
            ItemEnum::Module(_) => EntityKind::Package,
            ItemEnum::Struct(_) => EntityKind::Struct,
            ItemEnum::Enum(_) => EntityKind::Enum,
            ItemEnum::Union(_) => EntityKind::Union,
            ItemEnum::Trait(_) => EntityKind::Trait,
            ItemEnum::TypeAlias(_) => EntityKind::TypeAlias,
            ItemEnum::Function(_) => EntityKind::Function,
            ItemEnum::Constant { .. } => EntityKind::Constant,
            ItemEnum::Static(_) => EntityKind::Static,
            ItemEnum::Macro(_) => EntityKind::Macro,
            _ => return Ok(None),
        };
        let Some(mut entity) = self.entity(item, kind, parent, None) else {
            return Ok(None);
        };

        entity.signature = Some(signature(item, &entity));
        entity.members = match &item.inner {
            ItemEnum::Module(module) => self.items(&module.items, &entity.path)?,
            ItemEnum::Struct(struct_) => {
                let fields: Vec<Id> = match &struct_.kind {
                    StructKind::Unit => Vec::new(),
                    StructKind::Tuple(fields) => fields.iter().flatten().copied().collect(),
                    StructKind::Plain { fields, .. } => fields.clone(),
                };
                let mut members = self.fields(&fields, &entity);
                members.extend(self.impls(&struct_.impls, &entity));
                members
            }
            ItemEnum::Union(union_) => {
                let mut members = self.fields(&union_.fields, &entity);
                members.extend(self.impls(&union_.impls, &entity));
                members
            }
            ItemEnum::Enum(enum_) => {
                let mut members = self.variants(&enum_.variants, &entity);
                members.extend(self.impls(&enum_.impls, &entity));
                members
            }
            ItemEnum::Trait(trait_) => self.assoc_items(&trait_.items, &entity, true),
            _ => Vec::new(),
        };
        Ok(Some(entity))
    }

    /// Build an entity for `item`, or `None` when filters drop it. `inherited` replaces
    /// rustdoc's default visibility for variants and trait members.
    fn entity(
        &self,
        item: &Item,
        kind: EntityKind,
        parent: &[String],
        inherited: Option<Visibility>,
    ) -> Option<Entity> {
        let name = item.name.clone()?;
        let visibility = match (&item.visibility, inherited) {
            (RustdocVisibility::Default, Some(inherited)) => inherited,
            (visibility, _) => convert_visibility(visibility),
        };
        if !visibility.is_public() && !self.options.include_private {
            return None;
        }

        let mut entity = Entity::new(kind, name, parent);
        entity.visibility = visibility;
        if self
            .options
            .exclude
            .as_ref()
            .is_some_and(|set| set.is_match(&entity.path_string()))
        {
            debug!(path = %entity.path_string(), "excluded");
            return None;
        }
        entity.comment = comment(item);
        entity.deprecation = item.deprecation.as_ref().map(|deprecation| Deprecation {
            since: deprecation.since.clone(),
            note: deprecation.note.clone(),
        });
        entity.source = location(item);
        Some(entity)
    }

    fn fields(&self, ids: &[Id], parent: &Entity) -> Vec<Entity> {
        let mut members = Vec::new();
        for id in ids {
            let Some(item) = self.item(id) else {
                continue;
            };
            let ItemEnum::StructField(field_type) = &item.inner else {
                continue;
            };
            if let Some(mut entity) = self.entity(item, EntityKind::Field, &parent.path, None) {
                entity.signature = Some(format!(
                    "{}{}: {}",
                    visibility_prefix(entity.visibility),
                    entity.name,
                    typefmt::ty(field_type)
                ));
                members.push(entity);
            }
        }
        members
    }

    fn variants(&self, ids: &[Id], parent: &Entity) -> Vec<Entity> {
        let mut members = Vec::new();
        for id in ids {
            let Some(item) = self.item(id) else {
                continue;
            };
            let ItemEnum::Variant(variant) = &item.inner else {
                continue;
            };
            let Some(mut entity) =
                self.entity(item, EntityKind::Variant, &parent.path, Some(parent.visibility))
            else {
                continue;
            };

            let mut signature = entity.name.clone();
            match &variant.kind {
                VariantKind::Plain => {}
                VariantKind::Tuple(fields) => {
                    let types: Vec<String> = fields
                        .iter()
                        .flatten()
                        .filter_map(|field| self.field_type(field))
                        .collect();
                    signature.push_str(&format!("({})", types.join(", ")));
                }
                VariantKind::Struct { fields, .. } => {
                    let named: Vec<String> = fields
                        .iter()
                        .filter_map(|field| {
                            let name = self.item(field)?.name.clone()?;
                            Some(format!("{name}: {}", self.field_type(field)?))
                        })
                        .collect();
                    signature.push_str(&format!(" {{ {} }}", named.join(", ")));
                }
            }
            if let Some(discriminant) = &variant.discriminant {
                signature.push_str(&format!(" = {}", discriminant.expr));
            }
            entity.signature = Some(signature);
            push_unique(&mut members, entity);
        }
        members
    }

    fn field_type(&self, id: &Id) -> Option<String> {
        match &self.item(id)?.inner {
            ItemEnum::StructField(field_type) => Some(typefmt::ty(field_type)),
            _ => None,
        }
    }

    fn impls(&self, ids: &[Id], owner: &Entity) -> Vec<Entity> {
        let mut members = Vec::new();
        for id in ids {
            let Some(item) = self.item(id) else {
                continue;
            };
            let ItemEnum::Impl(impl_) = &item.inner else {
                continue;
            };
            if impl_.is_synthetic || impl_.is_negative || impl_.blanket_impl.is_some() {
                continue;
            }

            match &impl_.trait_ {
                None => {
                    for member in self.assoc_items(&impl_.items, owner, false) {
                        push_unique(&mut members, member);
                    }
                }
                Some(trait_path) => {
                    let name = typefmt::path(trait_path);
                    let mut entity = Entity::new(EntityKind::Impl, name, &owner.path);
                    entity.visibility = owner.visibility;
                    entity.comment = comment(item);
                    entity.source = location(item);
                    let unsafety = if impl_.is_unsafe { "unsafe " } else { "" };
                    entity.signature = Some(format!(
                        "{unsafety}impl{} {} for {}{}",
                        typefmt::generics(&impl_.generics),
                        entity.name,
                        typefmt::ty(&impl_.for_),
                        typefmt::where_clause(&impl_.generics)
                    ));
                    push_unique(&mut members, entity);
                }
            }
        }
        members
    }

    /// Methods, associated constants and associated types of a trait or inherent impl.
    fn assoc_items(&self, ids: &[Id], owner: &Entity, in_trait: bool) -> Vec<Entity> {
        let inherited = in_trait.then_some(owner.visibility);
        let mut members = Vec::new();
        for id in ids {
            let Some(item) = self.item(id) else {
                continue;
            };
            let kind = match &item.inner {
                ItemEnum::Function(_) => EntityKind::Method,
                ItemEnum::AssocConst { .. } => EntityKind::AssocConst,
                ItemEnum::AssocType { .. } => EntityKind::AssocType,
                _ => continue,
            };
            if let Some(mut entity) = self.entity(item, kind, &owner.path, inherited) {
                entity.signature = Some(signature(item, &entity));
                push_unique(&mut members, entity);
            }
        }
        members
    }
}

fn convert_visibility(visibility: &RustdocVisibility) -> Visibility {
    match visibility {
        RustdocVisibility::Public => Visibility::Public,
        RustdocVisibility::Crate | RustdocVisibility::Restricted { .. } => {
            Visibility::Crate
        }
        RustdocVisibility::Default => Visibility::Private,
    }
}

fn visibility_prefix(visibility: Visibility) -> &'static str {
    match visibility {
        Visibility::Public => "pub ",
        Visibility::Crate => "pub(crate) ",
        Visibility::Private => "",
    }
}

fn comment(item: &Item) -> Option<Comment> {
    item.docs.as_deref().and_then(Comment::parse)
}

fn location(item: &Item) -> Option<SourceLocation> {
    item.span.as_ref().map(|span| SourceLocation {
        file: span.filename.display().to_string(),
        line: u32::try_from(span.begin.0).unwrap_or(u32::MAX),
    })
}

/// Declaration line for an item, in the same shape the source walker produces.
fn signature(item: &Item, entity: &Entity) -> String {
    let vis = match entity.kind {
        EntityKind::Macro => "",
        _ => visibility_prefix(entity.visibility),
    };
    let name = &entity.name;
    match &item.inner {
        ItemEnum::Module(_) => format!("{vis}mod {name}"),
        ItemEnum::Struct(struct_) => format!(
            "{vis}struct {name}{}{}",
            typefmt::generics(&struct_.generics),
            typefmt::where_clause(&struct_.generics)
        ),
        ItemEnum::Union(union_) => format!(
            "{vis}union {name}{}{}",
            typefmt::generics(&union_.generics),
            typefmt::where_clause(&union_.generics)
        ),
        ItemEnum::Enum(enum_) => format!(
            "{vis}enum {name}{}{}",
            typefmt::generics(&enum_.generics),
            typefmt::where_clause(&enum_.generics)
        ),
        ItemEnum::Trait(trait_) => {
            let unsafety = if trait_.is_unsafe { "unsafe " } else { "" };
            let supertraits = if trait_.bounds.is_empty() {
                String::new()
            } else {
                format!(": {}", typefmt::bounds(&trait_.bounds))
            };
            format!(
                "{vis}{unsafety}trait {name}{}{supertraits}{}",
                typefmt::generics(&trait_.generics),
                typefmt::where_clause(&trait_.generics)
            )
        }
        ItemEnum::TypeAlias(alias) => format!(
            "{vis}type {name}{}{} = {}",
            typefmt::generics(&alias.generics),
            typefmt::where_clause(&alias.generics),
            typefmt::ty(&alias.type_)
        ),
        ItemEnum::Function(function) => {
            let header = &function.header;
            let mut qualifiers = String::new();
            if header.is_const {
                qualifiers.push_str("const ");
            }
            if header.is_async {
                qualifiers.push_str("async ");
            }
            if header.is_unsafe {
                qualifiers.push_str("unsafe ");
            }
            // Trait methods carry no visibility of their own.
            let vis = if matches!(item.visibility, RustdocVisibility::Default)
                && entity.kind == EntityKind::Method
            {
                ""
            } else {
                vis
            };
            format!(
                "{vis}{qualifiers}fn {name}{}({}){}{}",
                typefmt::generics(&function.generics),
                typefmt::inputs(&function.sig),
                typefmt::output(&function.sig),
                typefmt::where_clause(&function.generics)
            )
        }
        ItemEnum::Constant { type_, const_ } => {
            format!("{vis}const {name}: {} = {}", typefmt::ty(type_), const_.expr)
        }
        ItemEnum::Static(static_) => {
            let mutability = if static_.is_mutable { "mut " } else { "" };
            format!("{vis}static {mutability}{name}: {}", typefmt::ty(&static_.type_))
        }
        ItemEnum::Macro(_) => format!("macro_rules! {name}"),
        ItemEnum::AssocConst { type_, .. } => format!("const {name}: {}", typefmt::ty(type_)),
        ItemEnum::AssocType { bounds, type_, .. } => {
            let mut rendered = format!("type {name}");
            if !bounds.is_empty() {
                rendered.push_str(&format!(": {}", typefmt::bounds(bounds)));
            }
            if let Some(default) = type_ {
                rendered.push_str(&format!(" = {}", typefmt::ty(default)));
            }
            rendered
        }
        _ => format!("{vis}{name}"),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use pretty_assertions::assert_eq;
    use regex::RegexSet;
    use rustdoc_types::{
        Abi, Crate, Enum, Function, FunctionHeader, FunctionSignature, Generics, Id, Impl, Item,
        ItemEnum, Module, Path, Struct, StructKind, Target, Trait, Type, Variant, VariantKind,
    };

    use super::*;

    fn empty_generics() -> Generics {
        Generics {
            params: Vec::new(),
            where_predicates: Vec::new(),
        }
    }

    fn header() -> FunctionHeader {
        FunctionHeader {
            is_const: false,
            is_unsafe: false,
            is_async: false,
            abi: Abi::Rust,
        }
    }

    fn item(id: Id, name: Option<&str>, visibility: RustdocVisibility, inner: ItemEnum) -> Item {
        Item {
            id,
            crate_id: 0,
            name: name.map(str::to_string),
            span: None,
            visibility,
            docs: name.map(|name| format!("Docs for {name}.")),
            links: HashMap::new(),
            attrs: Vec::new(),
            deprecation: None,
            inner,
        }
    }

    fn method(id: Id, name: &str, visibility: RustdocVisibility) -> Item {
        item(
            id,
            Some(name),
            visibility,
            ItemEnum::Function(Function {
                sig: FunctionSignature {
                    inputs: vec![(
                        "self".into(),
                        Type::BorrowedRef {
                            lifetime: None,
                            is_mutable: false,
                            type_: Box::new(Type::Generic("Self".into())),
                        },
                    )],
                    output: Some(Type::Primitive("f64".into())),
                    is_c_variadic: false,
                },
                generics: empty_generics(),
                header: header(),
                has_body: true,
            }),
        )
    }

    fn fixture_crate() -> Crate {
        let root = Id(0);
        let shape = Id(1);
        let field = Id(2);
        let inherent = Id(3);
        let area = Id(4);
        let drawable = Id(5);
        let draw = Id(6);
        let drawable_impl = Id(7);
        let color = Id(8);
        let red = Id(9);
        let hidden = Id(10);

        let mut index = HashMap::new();
        let insert = |index: &mut HashMap<Id, Item>, item: Item| {
            index.insert(item.id, item);
        };

        insert(
            &mut index,
            item(
                root,
                Some("shapes"),
                RustdocVisibility::Public,
                ItemEnum::Module(Module {
                    is_crate: true,
                    items: vec![shape, drawable, color, hidden],
                    is_stripped: false,
                }),
            ),
        );
        insert(
            &mut index,
            item(
                shape,
                Some("Shape"),
                RustdocVisibility::Public,
                ItemEnum::Struct(Struct {
                    kind: StructKind::Plain {
                        fields: vec![field],
                        has_stripped_fields: false,
                    },
                    generics: empty_generics(),
                    impls: vec![inherent, drawable_impl],
                }),
            ),
        );
        insert(
            &mut index,
            item(
                field,
                Some("sides"),
                RustdocVisibility::Public,
                ItemEnum::StructField(Type::Primitive("u32".into())),
            ),
        );
        insert(
            &mut index,
            item(
                inherent,
                None,
                RustdocVisibility::Default,
                ItemEnum::Impl(Impl {
                    is_unsafe: false,
                    generics: empty_generics(),
                    provided_trait_methods: Vec::new(),
                    trait_: None,
                    for_: Type::ResolvedPath(Path {
                        path: "Shape".into(),
                        id: shape,
                        args: None,
                    }),
                    items: vec![area],
                    is_negative: false,
                    is_synthetic: false,
                    blanket_impl: None,
                }),
            ),
        );
        insert(&mut index, method(area, "area", RustdocVisibility::Public));
        insert(
            &mut index,
            item(
                drawable,
                Some("Drawable"),
                RustdocVisibility::Public,
                ItemEnum::Trait(Trait {
                    is_auto: false,
                    is_unsafe: false,
                    is_dyn_compatible: true,
                    items: vec![draw],
                    generics: empty_generics(),
                    bounds: Vec::new(),
                    implementations: vec![drawable_impl],
                }),
            ),
        );
        insert(&mut index, method(draw, "draw", RustdocVisibility::Default));
        insert(
            &mut index,
            item(
                drawable_impl,
                None,
                RustdocVisibility::Default,
                ItemEnum::Impl(Impl {
                    is_unsafe: false,
                    generics: empty_generics(),
                    provided_trait_methods: Vec::new(),
                    trait_: Some(Path {
                        path: "Drawable".into(),
                        id: drawable,
                        args: None,
                    }),
                    for_: Type::ResolvedPath(Path {
                        path: "Shape".into(),
                        id: shape,
                        args: None,
                    }),
                    items: Vec::new(),
                    is_negative: false,
                    is_synthetic: false,
                    blanket_impl: None,
                }),
            ),
        );
        insert(
            &mut index,
            item(
                color,
                Some("Color"),
                RustdocVisibility::Public,
                ItemEnum::Enum(Enum {
                    generics: empty_generics(),
                    has_stripped_variants: false,
                    variants: vec![red],
                    impls: Vec::new(),
                }),
            ),
        );
        insert(
            &mut index,
            item(
                red,
                Some("Red"),
                RustdocVisibility::Default,
                ItemEnum::Variant(Variant {
                    kind: VariantKind::Plain,
                    discriminant: None,
                }),
            ),
        );
        insert(
            &mut index,
            item(
                hidden,
                Some("internal"),
                RustdocVisibility::Crate,
                ItemEnum::Module(Module {
                    is_crate: false,
                    items: Vec::new(),
                    is_stripped: false,
                }),
            ),
        );

        Crate {
            root,
            crate_version: Some("0.1.0".into()),
            includes_private: false,
            index,
            paths: HashMap::new(),
            external_crates: HashMap::new(),
            target: Target {
                triple: "test-target".into(),
                target_features: Vec::new(),
            },
            format_version: 0,
        }
    }

    #[test]
    fn converts_items_and_members() {
        let krate = fixture_crate();
        let options = WalkOptions::default();
        let package = RustdocConverter::new(&krate, &options).convert(None).unwrap();

        assert_eq!(package.name, "shapes");
        let names: Vec<&str> = package.members.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, vec!["Shape", "Drawable", "Color"]);

        let shape = package.member(EntityKind::Struct, "Shape").unwrap();
        assert_eq!(shape.signature.as_deref(), Some("pub struct Shape"));
        let members: Vec<(EntityKind, &str)> = shape
            .members
            .iter()
            .map(|m| (m.kind, m.name.as_str()))
            .collect();
        assert_eq!(
            members,
            vec![
                (EntityKind::Field, "sides"),
                (EntityKind::Method, "area"),
                (EntityKind::Impl, "Drawable"),
            ]
        );
        assert_eq!(
            shape.members[1].signature.as_deref(),
            Some("pub fn area(&self) -> f64")
        );
        assert_eq!(
            shape.members[2].signature.as_deref(),
            Some("impl Drawable for Shape")
        );
        assert_eq!(shape.members[1].path_string(), "shapes::Shape::area");
    }

    #[test]
    fn trait_items_and_variants_inherit_visibility() {
        let krate = fixture_crate();
        let options = WalkOptions::default();
        let package = RustdocConverter::new(&krate, &options).convert(None).unwrap();

        let draw = package.descendant(&["Drawable", "draw"]).unwrap();
        assert_eq!(draw.visibility, Visibility::Public);
        assert_eq!(draw.signature.as_deref(), Some("fn draw(&self) -> f64"));
        assert_eq!(
            package.descendant(&["Color", "Red"]).unwrap().visibility,
            Visibility::Public
        );
    }

    #[test]
    fn private_items_and_exclusions() {
        let krate = fixture_crate();
        let options = WalkOptions {
            include_private: true,
            exclude: Some(RegexSet::new(["::Color$"]).unwrap()),
        };
        let package = RustdocConverter::new(&krate, &options)
            .convert(Some("renamed"))
            .unwrap();
        assert_eq!(package.name, "renamed");
        assert!(package.member(EntityKind::Package, "internal").is_some());
        assert!(package.member(EntityKind::Enum, "Color").is_none());
    }
}
