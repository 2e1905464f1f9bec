use std::fs;
use std::path::Path;

use serde::Serialize;
use tera::{Context, Tera};

use crate::error::{DocketError, Result};

/// Name the page template is registered under. The `.html` suffix turns on HTML auto-escaping.
const TEMPLATE_NAME: &str = "page.html";

/// Template shipped with the library.
const BUILTIN_TEMPLATE: &str = include_str!("../../templates/page.html");

/// A compiled page template.
pub struct Template {
    tera: Tera,
}

impl Template {
    /// The built-in template.
    pub fn builtin() -> Result<Self> {
        Self::from_source(BUILTIN_TEMPLATE)
    }

    /// Load and compile the template at `path`.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.is_file() {
            return Err(DocketError::TemplateNotFound(path.to_path_buf()));
        }
        let source = fs::read_to_string(path).map_err(|source| DocketError::TemplateRead {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_source(&source)
    }

    /// Compile template source text.
    pub fn from_source(source: &str) -> Result<Self> {
        let mut tera = Tera::default();
        tera.add_raw_template(TEMPLATE_NAME, source)?;
        Ok(Self { tera })
    }

    /// Render one page. The context must serialize to a map.
    pub fn render<S: Serialize>(&self, context: S) -> Result<String> {
        let context = Context::from_serialize(context)?;
        Ok(self.tera.render(TEMPLATE_NAME, &context)?)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use tempfile::tempdir;

    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn output_is_escaped() {
        let template = Template::from_source("<p>{{ value }}</p>").unwrap();
        let html = template.render(json!({ "value": "<b>&" })).unwrap();
        assert_eq!(html, "<p>&lt;b&gt;&amp;</p>");
    }

    #[test]
    fn syntax_errors_surface_at_load() {
        let err = Template::from_source("{% for %}").err().unwrap();
        assert_eq!(err.kind(), ErrorKind::Render);
    }

    #[test]
    fn missing_template_file() {
        let temp_dir = tempdir().unwrap();
        let err = Template::load(&temp_dir.path().join("missing.html")).err().unwrap();
        assert!(matches!(err, DocketError::TemplateNotFound(_)));
    }

    #[test]
    fn builtin_compiles() {
        assert!(Template::builtin().is_ok());
    }
}
