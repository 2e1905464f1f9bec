//! Compiler-driver style arguments for the index builder.

use std::ffi::OsString;
use std::path::PathBuf;

use clap::Parser;
use regex::RegexSet;

use crate::error::{DocketError, Result};

/// Arguments accepted by [`crate::Docket::create_index`].
///
/// The vector is parsed without a binary name, so `["-d", "docs", "src/lib.rs"]` is a complete
/// argument list.
#[derive(Debug, Clone, PartialEq, Eq, Parser)]
#[command(name = "docket-index", no_binary_name = true, disable_help_flag = true)]
pub struct DocArgs {
    /// Crate root files, crate directories or rustdoc JSON files
    #[arg(required = true, value_name = "SOURCES")]
    pub sources: Vec<PathBuf>,

    /// Output directory for generated documentation
    #[arg(short = 'd', long = "out-dir", value_name = "DIR")]
    pub out_dir: Option<PathBuf>,

    /// Override the top-level package name (single source only)
    #[arg(long, value_name = "NAME")]
    pub crate_name: Option<String>,

    /// Include non-public items
    #[arg(long, alias = "private", default_value_t = false)]
    pub document_private_items: bool,

    /// Skip entities whose full path matches this regular expression
    #[arg(long, value_name = "REGEX")]
    pub exclude: Vec<String>,

    /// Generate rustdoc JSON with the nightly toolchain instead of reading sources directly
    #[arg(long, default_value_t = false)]
    pub rustdoc: bool,
}

impl DocArgs {
    /// Parse and validate an argument vector.
    pub fn parse_args<I, T>(args: I) -> Result<Self>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        let parsed = Self::try_parse_from(args)
            .map_err(|e| DocketError::InvalidArgs(e.to_string().trim().to_string()))?;
        parsed.validate()?;
        Ok(parsed)
    }

    fn validate(&self) -> Result<()> {
        if self.crate_name.is_some() && self.sources.len() > 1 {
            return Err(DocketError::InvalidArgs(
                "--crate-name can only be used with a single source".to_string(),
            ));
        }
        if let Some(name) = &self.crate_name
            && !is_identifier(name)
        {
            return Err(DocketError::InvalidArgs(format!(
                "--crate-name {name:?} is not a valid identifier"
            )));
        }
        self.exclude_set()?;
        Ok(())
    }

    /// Compile the `--exclude` patterns. Returns `None` when no pattern was given.
    pub fn exclude_set(&self) -> Result<Option<RegexSet>> {
        if self.exclude.is_empty() {
            return Ok(None);
        }
        RegexSet::new(&self.exclude)
            .map(Some)
            .map_err(|e| DocketError::InvalidArgs(format!("invalid --exclude pattern: {e}")))
    }
}

/// Crate names follow rustc: a letter or `_` first, then letters, digits and `_`.
fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    chars
        .next()
        .is_some_and(|first| first.is_alphabetic() || first == '_')
        && chars.all(|c| c.is_alphanumeric() || c == '_')
}
