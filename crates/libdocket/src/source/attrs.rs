//! Attribute inspection: doc comments, `cfg(test)`, `doc(hidden)`, `deprecated`, `path`.

use proc_macro2::TokenTree;
use syn::{Attribute, Expr, ExprLit, Lit, Meta, Token};
use tracing::debug;

use crate::model::Deprecation;

/// Collect doc comment text from `///`, `//!`, `/** */` and `#[doc = ".."]` attributes, with the
/// common leading indentation removed.
pub fn doc_text(attrs: &[Attribute]) -> Option<String> {
    let mut lines: Vec<String> = Vec::new();
    for attr in attrs {
        if attr.path().is_ident("doc")
            && let Meta::NameValue(meta) = &attr.meta
            && let Expr::Lit(ExprLit {
                lit: Lit::Str(lit_str),
                ..
            }) = &meta.value
        {
            lines.extend(lit_str.value().lines().map(str::to_string));
        }
    }

    let text = unindent(&lines);
    if text.trim().is_empty() {
        None
    } else {
        Some(text)
    }
}

/// Width of a line's leading ASCII space and tab run, in bytes.
fn indent_width(line: &str) -> usize {
    line.bytes().take_while(|b| *b == b' ' || *b == b'\t').count()
}

fn unindent(lines: &[String]) -> String {
    let indent = lines
        .iter()
        .filter(|line| !line.trim().is_empty())
        .map(|line| indent_width(line))
        .min()
        .unwrap_or(0);

    lines
        .iter()
        .map(|line| line[indent.min(indent_width(line))..].trim_end())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Whether the item is compiled only for tests.
pub fn is_cfg_test(attrs: &[Attribute]) -> bool {
    attrs.iter().any(|attr| {
        attr.path().is_ident("cfg")
            && attr
                .parse_args::<syn::Ident>()
                .is_ok_and(|ident| ident == "test")
    })
}

/// Whether the item carries `#[doc(hidden)]`.
pub fn is_doc_hidden(attrs: &[Attribute]) -> bool {
    attrs.iter().any(|attr| {
        if attr.path().is_ident("doc")
            && let Meta::List(list) = &attr.meta
        {
            list.tokens
                .to_string()
                .split(',')
                .any(|part| part.trim() == "hidden")
        } else {
            false
        }
    })
}

/// Whether a `macro_rules!` definition is exported.
pub fn is_macro_export(attrs: &[Attribute]) -> bool {
    attrs.iter().any(|attr| attr.path().is_ident("macro_export"))
}

/// Parse `#[deprecated]`, `#[deprecated = ".."]` and `#[deprecated(since = "..", note = "..")]`.
pub fn deprecation(attrs: &[Attribute]) -> Option<Deprecation> {
    let attr = attrs
        .iter()
        .find(|attr| attr.path().is_ident("deprecated"))?;

    let mut deprecation = Deprecation::default();
    match &attr.meta {
        Meta::Path(_) => {}
        Meta::NameValue(meta) => {
            if let Expr::Lit(ExprLit {
                lit: Lit::Str(note),
                ..
            }) = &meta.value
            {
                deprecation.note = Some(note.value());
            }
        }
        Meta::List(_) => {
            let parsed = attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("since") || meta.path.is_ident("note") {
                    let value = string_value(&meta.value()?.parse::<Expr>()?);
                    if meta.path.is_ident("since") {
                        deprecation.since = value;
                    } else {
                        deprecation.note = value;
                    }
                } else if meta.input.peek(Token![=]) {
                    meta.value()?.parse::<Expr>()?;
                } else if !meta.input.is_empty() && !meta.input.peek(Token![,]) {
                    meta.input.parse::<TokenTree>()?;
                }
                Ok(())
            });
            if let Err(error) = parsed {
                debug!(%error, "malformed deprecated attribute");
            }
        }
    }
    Some(deprecation)
}

fn string_value(expr: &Expr) -> Option<String> {
    match expr {
        Expr::Lit(ExprLit {
            lit: Lit::Str(lit), ..
        }) => Some(lit.value()),
        _ => None,
    }
}

/// The value of a `#[path = ".."]` attribute.
pub fn path_override(attrs: &[Attribute]) -> Option<String> {
    attrs.iter().find_map(|attr| {
        if attr.path().is_ident("path")
            && let Meta::NameValue(meta) = &attr.meta
            && let Expr::Lit(ExprLit {
                lit: Lit::Str(path),
                ..
            }) = &meta.value
        {
            Some(path.value())
        } else {
            None
        }
    })
}
