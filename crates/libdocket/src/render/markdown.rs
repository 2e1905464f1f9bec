//! Markdown to HTML rendering with syntax highlighting and intra-doc links.

use pulldown_cmark::{
    BrokenLink, CodeBlockKind, CowStr, Event, Options, Parser, Tag, TagEnd, html,
};
use tracing::warn;

use super::layout::Links;
use crate::highlight::highlight_html;

/// Fence attributes that rustdoc treats as Rust code.
const RUST_FENCE_ATTRIBUTES: &[&str] = &[
    "rust",
    "ignore",
    "should_panic",
    "no_run",
    "compile_fail",
    "test_harness",
    "allow_fail",
    "edition2015",
    "edition2018",
    "edition2021",
    "edition2024",
];

/// Renders documentation comments for one page.
pub struct Markdown<'a> {
    links: &'a Links,
    highlight: bool,
}

impl<'a> Markdown<'a> {
    /// Create a renderer resolving links through `links`.
    pub fn new(links: &'a Links, highlight: bool) -> Self {
        Self { links, highlight }
    }

    /// Render `text` to HTML. Intra-doc links resolve relative to the module path `scope` and are
    /// prefixed with `root`, the page's relative path to the output root.
    pub fn render(&self, text: &str, scope: &[String], root: &str) -> String {
        let mut options = Options::empty();
        options.insert(Options::ENABLE_STRIKETHROUGH);
        options.insert(Options::ENABLE_TABLES);

        let callback = |link: BrokenLink<'_>| {
            self.links
                .resolve(&link.reference, scope)
                .map(|href| (CowStr::from(format!("{root}{href}")), CowStr::from("")))
        };
        let parser = Parser::new_with_broken_link_callback(text, options, Some(callback))
            .map(|event| self.resolve_inline_link(event, scope, root));
        let parser = CodeBlockHighlighter::new(parser, self.highlight);

        let mut output = String::new();
        html::push_html(&mut output, parser);
        output
    }

    /// Rewrite `[text](path::Item)` links whose destination names an indexed entity.
    fn resolve_inline_link<'e>(&self, event: Event<'e>, scope: &[String], root: &str) -> Event<'e> {
        match event {
            Event::Start(Tag::Link {
                link_type,
                dest_url,
                title,
                id,
            }) => {
                let dest_url = match self.links.resolve(&dest_url, scope) {
                    Some(href) if !dest_url.contains('/') => CowStr::from(format!("{root}{href}")),
                    _ => dest_url,
                };
                Event::Start(Tag::Link {
                    link_type,
                    dest_url,
                    title,
                    id,
                })
            }
            other => other,
        }
    }
}

/// Iterator adapter that replaces code blocks with highlighted HTML.
struct CodeBlockHighlighter<I> {
    inner: I,
    highlight: bool,
    in_code_block: bool,
    code_lang: Option<String>,
    code_buffer: String,
}

impl<I> CodeBlockHighlighter<I> {
    fn new(inner: I, highlight: bool) -> Self {
        Self {
            inner,
            highlight,
            in_code_block: false,
            code_lang: None,
            code_buffer: String::new(),
        }
    }

    fn render_block(&self) -> String {
        let lang = self.code_lang.as_deref();
        let code = if lang == Some("rust") {
            strip_hidden_lines(&self.code_buffer)
        } else {
            self.code_buffer.clone()
        };

        if self.highlight
            && let Some(lang) = lang
        {
            match highlight_html(&code, lang) {
                Ok(Some(highlighted)) => return highlighted,
                Ok(None) => {}
                Err(e) => warn!(lang, error = %e, "highlighting failed; emitting plain code"),
            }
        }

        let lang_class = lang
            .map(|lang| format!(" class=\"language-{}\"", html_escape(lang)))
            .unwrap_or_default();
        format!("<pre><code{lang_class}>{}</code></pre>\n", html_escape(&code))
    }
}

impl<'a, I> Iterator for CodeBlockHighlighter<I>
where
    I: Iterator<Item = Event<'a>>,
{
    type Item = Event<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let event = self.inner.next()?;
            match event {
                Event::Start(Tag::CodeBlock(kind)) => {
                    self.in_code_block = true;
                    self.code_buffer.clear();
                    self.code_lang = match kind {
                        CodeBlockKind::Fenced(info) => fence_language(&info),
                        CodeBlockKind::Indented => None,
                    };
                }
                Event::End(TagEnd::CodeBlock) => {
                    self.in_code_block = false;
                    return Some(Event::Html(self.render_block().into()));
                }
                Event::Text(text) if self.in_code_block => self.code_buffer.push_str(&text),
                other => return Some(other),
            }
        }
    }
}

/// Language of a fenced block. Untagged fences and rustdoc test attributes mean Rust.
fn fence_language(info: &str) -> Option<String> {
    let tokens: Vec<&str> = info
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|token| !token.is_empty())
        .collect();
    let is_rust = tokens.iter().all(|token| {
        RUST_FENCE_ATTRIBUTES.contains(token)
            || (token.starts_with('E') && token[1..].chars().all(|c| c.is_ascii_digit()))
    });
    if is_rust {
        Some("rust".to_string())
    } else {
        tokens.first().map(|token| (*token).to_string())
    }
}

/// Drop doctest lines hidden with `# `, keeping `##` escapes as a literal `#`.
fn strip_hidden_lines(code: &str) -> String {
    let mut output = String::new();
    for line in code.lines() {
        let trimmed = line.trim_start();
        if trimmed == "#" || trimmed.starts_with("# ") {
            continue;
        }
        if let Some(rest) = trimmed.strip_prefix("##") {
            let indent = &line[..line.len() - trimmed.len()];
            output.push_str(indent);
            output.push('#');
            output.push_str(rest);
        } else {
            output.push_str(line);
        }
        output.push('\n');
    }
    output
}

/// Escape HTML special characters
pub(super) fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#x27;")
}
