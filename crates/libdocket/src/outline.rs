//! Compact text outline of an [`Index`], one declaration per line.

use crate::{
    error::Result,
    highlight::highlight_terminal,
    model::{Entity, Index},
};

/// Indentation added per nesting level.
const INDENT: &str = "    ";

/// Outline every package in `index`, separated by blank lines.
///
/// ```text
/// package geo
///     pub struct Point
///         pub x: f64
///     pub fn origin() -> Point
/// ```
pub fn outline(index: &Index) -> String {
    index
        .packages()
        .map(|package| {
            let mut out = format!("package {}\n", package.name);
            for member in &package.members {
                push_entity(&mut out, member, 1);
            }
            out
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Like [`outline`], with ANSI syntax highlighting for terminals.
pub fn outline_colored(index: &Index) -> Result<String> {
    highlight_terminal(&outline(index))
}

fn push_entity(out: &mut String, entity: &Entity, depth: usize) {
    out.push_str(&INDENT.repeat(depth));
    match &entity.signature {
        Some(signature) => out.push_str(&collapse_whitespace(signature)),
        None => {
            out.push_str(entity.kind.label());
            out.push(' ');
            out.push_str(&entity.name);
        }
    }
    out.push('\n');
    for member in &entity.members {
        push_entity(out, member, depth + 1);
    }
}

/// Join multi-line signatures onto one line.
fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::model::{EntityKind, Package};

    #[test]
    fn nested_members_are_indented() {
        let mut package = Package::new("geo");
        let root = package.path.clone();
        let mut point = Entity::new(EntityKind::Struct, "Point", &root);
        point.signature = Some("pub struct Point".to_string());
        let mut x = Entity::new(EntityKind::Field, "x", &point.path);
        x.signature = Some("pub x: f64".to_string());
        point.members.push(x);
        let mut new = Entity::new(EntityKind::Method, "new", &point.path);
        new.signature = Some("pub fn new(\n    x: f64,\n) -> Self".to_string());
        point.members.push(new);
        package.members_mut().push(point);
        package
            .members_mut()
            .push(Entity::new(EntityKind::Macro, "point", &root));

        let index = Index::from_packages([package, Package::new("empty")]).unwrap();
        assert_eq!(
            outline(&index),
            "package empty\n\
             \n\
             package geo\n\
             \x20   pub struct Point\n\
             \x20       pub x: f64\n\
             \x20       pub fn new( x: f64, ) -> Self\n\
             \x20   macro point\n"
        );
    }

    #[test]
    fn empty_index_has_empty_outline() {
        assert_eq!(outline(&Index::new()), "");
    }
}
