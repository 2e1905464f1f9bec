//! Declaration formatting for parsed items.
//!
//! Signatures are produced by stripping bodies, fields and attributes from a `syn` node, printing
//! it through prettyplease, and then trimming the empty body back off. Nodes that cannot stand at
//! item level on their own (fields, variants, associated items) are wrapped in a throwaway
//! container item first and unwrapped after formatting.

use proc_macro2::{Span, TokenStream};
use quote::{ToTokens, quote};
use rust_format::{Formatter, PrettyPlease};
use syn::{
    Field, Fields, Ident, ImplItem, Item, Path, TraitItem, Variant, Visibility, parse_quote,
};

use crate::error::Result;

/// Placeholder name for wrapper items.
const WRAPPER: &str = "__DocketWrapper";

/// Formats item declarations into display signatures.
#[derive(Default)]
pub struct Signatures {
    formatter: PrettyPlease,
}

impl Signatures {
    /// Signature of a module-level item, or `None` for items that are not documented.
    pub fn item(&self, item: &Item) -> Result<Option<String>> {
        let signature = match item {
            Item::Fn(item) => {
                let mut item = item.clone();
                item.attrs.clear();
                item.block = Box::new(parse_quote!({}));
                strip_braces(&self.format(item.to_token_stream())?)
            }
            Item::Struct(item) => {
                let mut item = item.clone();
                item.attrs.clear();
                item.fields = Fields::Unit;
                item.semi_token = Some(Default::default());
                strip_semicolon(&self.format(item.to_token_stream())?)
            }
            Item::Union(item) => {
                let mut item = item.clone();
                item.attrs.clear();
                item.fields.named.clear();
                strip_braces(&self.format(item.to_token_stream())?)
            }
            Item::Enum(item) => {
                let mut item = item.clone();
                item.attrs.clear();
                item.variants.clear();
                strip_braces(&self.format(item.to_token_stream())?)
            }
            Item::Trait(item) => {
                let mut item = item.clone();
                item.attrs.clear();
                item.items.clear();
                strip_braces(&self.format(item.to_token_stream())?)
            }
            Item::Impl(item) => {
                let mut item = item.clone();
                item.attrs.clear();
                item.items.clear();
                strip_braces(&self.format(item.to_token_stream())?)
            }
            Item::Const(item) => {
                let mut item = item.clone();
                item.attrs.clear();
                strip_semicolon(&self.format(item.to_token_stream())?)
            }
            Item::Static(item) => {
                let mut item = item.clone();
                item.attrs.clear();
                strip_semicolon(&self.format(item.to_token_stream())?)
            }
            Item::Type(item) => {
                let mut item = item.clone();
                item.attrs.clear();
                strip_semicolon(&self.format(item.to_token_stream())?)
            }
            Item::Mod(item) => format!("{}mod {}", visibility_prefix(&item.vis), item.ident),
            Item::Macro(item) => match &item.ident {
                Some(ident) => format!("macro_rules! {ident}"),
                None => return Ok(None),
            },
            _ => return Ok(None),
        };
        Ok(Some(signature))
    }

    /// Signature of a struct or union field: `pub name: Type`.
    pub fn field(&self, field: &Field, name: &str) -> Result<String> {
        Ok(format!(
            "{}{name}: {}",
            visibility_prefix(&field.vis),
            self.type_of(&field.ty)?
        ))
    }

    /// Signature of an enum variant, including its payload and discriminant.
    pub fn variant(&self, variant: &Variant) -> Result<String> {
        let mut variant = variant.clone();
        variant.attrs.clear();
        let wrapper = wrapper();
        let formatted = self.format(quote!(enum #wrapper { #variant }))?;
        Ok(strip_trailing(&unwrap_container(&formatted), ','))
    }

    /// Signature of a trait item.
    pub fn trait_item(&self, item: &TraitItem) -> Result<String> {
        let mut item = item.clone();
        match &mut item {
            TraitItem::Fn(item) => {
                item.attrs.clear();
                item.default = None;
                item.semi_token = Some(Default::default());
            }
            TraitItem::Const(item) => item.attrs.clear(),
            TraitItem::Type(item) => item.attrs.clear(),
            _ => {}
        }
        let wrapper = wrapper();
        let formatted = self.format(quote!(trait #wrapper { #item }))?;
        Ok(strip_semicolon(&unwrap_container(&formatted)))
    }

    /// Signature of an inherent impl item.
    pub fn impl_item(&self, item: &ImplItem) -> Result<String> {
        let mut item = item.clone();
        let is_fn = matches!(item, ImplItem::Fn(_));
        match &mut item {
            ImplItem::Fn(item) => {
                item.attrs.clear();
                item.block = parse_quote!({});
            }
            ImplItem::Const(item) => item.attrs.clear(),
            ImplItem::Type(item) => item.attrs.clear(),
            _ => {}
        }
        let wrapper = wrapper();
        let inner = unwrap_container(&self.format(quote!(impl #wrapper { #item }))?);
        Ok(if is_fn {
            strip_braces(&inner)
        } else {
            strip_semicolon(&inner)
        })
    }

    /// A path, such as the trait named by an impl, rendered as a type.
    pub fn path(&self, path: &Path) -> Result<String> {
        let ty: syn::Type = parse_quote!(#path);
        self.type_of(&ty)
    }

    /// A type, rendered on one line.
    pub fn type_of(&self, ty: &syn::Type) -> Result<String> {
        let wrapper = wrapper();
        let formatted = self.format(quote!(type #wrapper = #ty;))?;
        let prefix = format!("type {WRAPPER} = ");
        let body = strip_semicolon(&formatted);
        Ok(collapse_whitespace(
            body.strip_prefix(&prefix).unwrap_or(&body),
        ))
    }

    fn format(&self, tokens: TokenStream) -> Result<String> {
        Ok(self.formatter.format_str(tokens.to_string())?)
    }
}

fn wrapper() -> Ident {
    Ident::new(WRAPPER, Span::call_site())
}

/// `pub `, `pub(crate) `, `pub(in some::path) ` or nothing.
pub fn visibility_prefix(vis: &Visibility) -> String {
    match vis {
        Visibility::Public(_) => "pub ".to_string(),
        Visibility::Restricted(restricted) => {
            let path = restricted
                .path
                .segments
                .iter()
                .map(|segment| segment.ident.to_string())
                .collect::<Vec<_>>()
                .join("::");
            if restricted.in_token.is_some() {
                format!("pub(in {path}) ")
            } else {
                format!("pub({path}) ")
            }
        }
        Visibility::Inherited => String::new(),
    }
}

/// Drop a trailing `{}` or `{ }` body.
fn strip_braces(formatted: &str) -> String {
    let trimmed = formatted.trim_end();
    if let Some(rest) = trimmed.strip_suffix('}')
        && let Some(rest) = rest.trim_end().strip_suffix('{')
    {
        return rest.trim_end().to_string();
    }
    trimmed.to_string()
}

fn strip_semicolon(formatted: &str) -> String {
    strip_trailing(formatted, ';')
}

fn strip_trailing(formatted: &str, ch: char) -> String {
    let trimmed = formatted.trim_end();
    trimmed.strip_suffix(ch).unwrap_or(trimmed).trim_end().to_string()
}

/// The lines between a wrapper item's braces, dedented by one level.
fn unwrap_container(formatted: &str) -> String {
    let lines: Vec<&str> = formatted.trim_end().lines().collect();
    if lines.len() < 3 {
        return formatted.trim().to_string();
    }
    lines[1..lines.len() - 1]
        .iter()
        .map(|line| line.strip_prefix("    ").unwrap_or(line))
        .collect::<Vec<_>>()
        .join("\n")
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
