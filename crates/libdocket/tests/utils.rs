// Dead code detection breaks here, because the integration test crates all use a disjoint set of
// the pub items.
#![allow(dead_code)]

use std::{fs, path::Path};

use libdocket::{Docket, Index, outline};
use pretty_assertions::assert_eq;
use tempfile::TempDir;

/// Name of the fixture crate written by [`write_crate`].
pub const CRATE_NAME: &str = "dummy_crate";

fn normalize_whitespace(s: &str) -> String {
    let lines: Vec<&str> = s
        .lines()
        .map(|line| line.trim_end())
        .filter(|line| !line.is_empty())
        .collect();

    if lines.is_empty() {
        return String::new();
    }

    // Find the minimum indentation
    let min_indent = lines
        .iter()
        .map(|line| line.len() - line.trim_start().len())
        .min()
        .unwrap_or(0);

    lines
        .into_iter()
        .map(|line| &line[min_indent..])
        .collect::<Vec<&str>>()
        .join("\n")
}

/// Write a crate with `source` as its `src/lib.rs`.
pub fn write_crate(source: &str) -> TempDir {
    let temp_dir = TempDir::new().unwrap();
    let src = temp_dir.path().join("src");
    fs::create_dir(&src).unwrap();
    fs::write(src.join("lib.rs"), source).unwrap();
    fs::write(
        temp_dir.path().join("Cargo.toml"),
        format!(
            r#"
                [package]
                name = "{}"
                version = "0.1.0"
                edition = "2021"
            "#,
            CRATE_NAME.replace('_', "-")
        ),
    )
    .unwrap();
    temp_dir
}

/// Write `files` (relative path, contents) under a fresh directory.
pub fn write_tree(files: &[(&str, &str)]) -> TempDir {
    let temp_dir = TempDir::new().unwrap();
    for (path, contents) in files {
        let path = temp_dir.path().join(path);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, contents).unwrap();
    }
    temp_dir
}

/// Index the crate at `dir`, with extra index arguments.
pub fn index_dir(dir: &Path, extra: &[&str]) -> Index {
    let mut args = vec![dir.display().to_string()];
    args.extend(extra.iter().map(|arg| arg.to_string()));
    Docket::new().create_index(args).unwrap()
}

/// Index a crate whose `lib.rs` is `source`.
pub fn index_source(source: &str, private_items: bool) -> Index {
    let temp_dir = write_crate(source);
    let extra: &[&str] = if private_items {
        &["--document-private-items"]
    } else {
        &[]
    };
    index_dir(temp_dir.path(), extra)
}

/// Outline of a single-package index without the `package` header line.
pub fn package_outline(index: &Index) -> String {
    let text = outline(index);
    let body: Vec<&str> = text.lines().skip(1).collect();
    normalize_whitespace(&body.join("\n"))
}

fn check(source: &str, expected: &str, private_items: bool) {
    let index = index_source(source, private_items);
    assert_eq!(
        package_outline(&index),
        normalize_whitespace(expected),
    );
}

/// Outline of the public API
pub fn rt(source: &str, expected_outline: &str) {
    check(source, expected_outline, false);
}

/// Outline including private items
pub fn rt_private(source: &str, expected_outline: &str) {
    check(source, expected_outline, true);
}

pub fn index_err(source: &str, expected_error: &str) {
    let temp_dir = write_crate(source);
    let result = Docket::new().create_index([temp_dir.path().display().to_string()]);

    assert!(result.is_err(), "Expected an error, but indexing succeeded");
    let error_string = result.unwrap_err().to_string();

    assert!(
        error_string.contains(expected_error),
        "Error mismatch.\nExpected to contain: {}\nGot: {}",
        expected_error,
        error_string
    );
}

#[macro_export]
macro_rules! gen_tests {
    ($prefix:ident, {
        $(rt {
            $rt_name:ident: {
                input: $rt_input:expr,
                output: $rt_output:expr
            }
        })*
        $(rt_private {
            $rt_private_name:ident: {
                input: $rt_private_input:expr,
                output: $rt_private_output:expr
            }
        })*
        $(rt_err {
            $rt_err_name:ident: {
                input: $rt_err_input:expr,
                error: $rt_err_error:expr
            }
        })*
    }) => {
        mod $prefix {
            use super::*;

            $(
                #[test]
                fn $rt_name() {
                    rt($rt_input, $rt_output);
                }
            )*

            $(
                #[test]
                fn $rt_private_name() {
                    rt_private($rt_private_input, $rt_private_output);
                }
            )*

            $(
                #[test]
                fn $rt_err_name() {
                    index_err($rt_err_input, $rt_err_error);
                }
            )*
        }
    };
}
