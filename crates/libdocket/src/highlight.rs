//! Syntax highlighting for code, as HTML for rendered pages and ANSI escapes for terminals.

use once_cell::sync::Lazy;
use syntect::{
    easy::HighlightLines,
    highlighting::{Style, Theme, ThemeSet},
    html::highlighted_html_for_string,
    parsing::{SyntaxReference, SyntaxSet},
    util::{LinesWithEndings, as_24_bit_terminal_escaped},
};
use tracing::warn;

use crate::error::Result;

/// Lazily loaded syntect syntax definitions including newline handling.
static SYNTAX_SET: Lazy<SyntaxSet> = Lazy::new(SyntaxSet::load_defaults_newlines);
/// Shared theme catalog for syntax highlighting.
static THEME_SET: Lazy<ThemeSet> = Lazy::new(ThemeSet::load_defaults);
/// Cached lookup for the Rust syntax definition.
static RUST_SYNTAX: Lazy<Option<&'static SyntaxReference>> =
    Lazy::new(|| SYNTAX_SET.find_syntax_by_extension("rs"));
/// Light theme used for HTML pages.
static HTML_THEME: Lazy<Option<&'static Theme>> =
    Lazy::new(|| THEME_SET.themes.get("InspiredGitHub"));
/// Dark theme used for terminal output.
static TERMINAL_THEME: Lazy<Option<&'static Theme>> =
    Lazy::new(|| THEME_SET.themes.get("Solarized (dark)"));

/// Highlight `code` as HTML with inline styles.
///
/// `lang` is a fence token such as `rust` or `toml`. Returns `None` when no syntax matches the
/// token, so callers can fall back to plain escaped text.
pub fn highlight_html(code: &str, lang: &str) -> Result<Option<String>> {
    let syntax = if lang == "rust" {
        *RUST_SYNTAX
    } else {
        SYNTAX_SET.find_syntax_by_token(lang)
    };
    let (Some(syntax), Some(theme)) = (syntax, *HTML_THEME) else {
        return Ok(None);
    };
    Ok(Some(highlighted_html_for_string(
        code,
        &SYNTAX_SET,
        syntax,
        theme,
    )?))
}

/// Applies syntax highlighting to Rust code using the Solarized (dark) theme.
///
/// Returns the input unchanged when the syntax or theme is unavailable.
pub fn highlight_terminal(code: &str) -> Result<String> {
    let (Some(syntax), Some(theme)) = (*RUST_SYNTAX, *TERMINAL_THEME) else {
        warn!("Rust syntax or terminal theme unavailable; printing without color");
        return Ok(code.to_string());
    };
    let mut h = HighlightLines::new(syntax, theme);

    let mut output = String::new();
    for line in LinesWithEndings::from(code) {
        let ranges: Vec<(Style, &str)> = h.highlight_line(line, &SYNTAX_SET)?;
        output.push_str(&as_24_bit_terminal_escaped(&ranges[..], false));
    }
    Ok(output)
}
