use std::{io, path::PathBuf};

use thiserror::Error;

/// Broad category of a [`DocketError`], matching the pipeline stage that failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Argument parsing or source resolution failed while building an index.
    Build,
    /// Template loading, resource copying or page output failed while rendering.
    Render,
    /// Reading or writing a serialized index failed.
    Io,
}

/// Errors produced by the indexing, serialization and rendering pipeline.
#[derive(Error, Debug)]
pub enum DocketError {
    /// The argument vector could not be parsed.
    #[error("Invalid arguments: {0}")]
    InvalidArgs(String),

    /// A source path named on the command line does not exist.
    #[error("Source not found: {0}")]
    SourceNotFound(PathBuf),

    /// A source path exists but is not a crate root, crate directory or rustdoc JSON file.
    #[error("Unsupported source: {0}")]
    UnsupportedSource(PathBuf),

    /// A source file could not be read.
    #[error("Failed to read {path}: {source}")]
    SourceRead {
        /// File being read.
        path: PathBuf,
        /// Underlying IO error.
        source: io::Error,
    },

    /// A source file is not valid Rust.
    #[error("Failed to parse {path}: {message}")]
    Parse {
        /// File being parsed.
        path: PathBuf,
        /// Parser diagnostic.
        message: String,
    },

    /// A `mod name;` declaration has no backing file.
    #[error("Module `{module}` declared in {declared_in} has no source file")]
    ModuleNotFound {
        /// Fully qualified module path.
        module: String,
        /// File containing the declaration.
        declared_in: PathBuf,
    },

    /// Two sources contributed the same entity to one package.
    #[error("Duplicate entity: {0}")]
    DuplicateEntity(String),

    /// A Cargo manifest could not be read or describes no documentable crate.
    #[error("Manifest error in {path}: {message}")]
    Manifest {
        /// Manifest path.
        path: PathBuf,
        /// Description of the problem.
        message: String,
    },

    /// Rustdoc JSON could not be generated or decoded.
    #[error("Rustdoc JSON error: {0}")]
    Rustdoc(String),

    /// The nightly toolchain required for rustdoc JSON is unavailable.
    #[error("Toolchain error: {0}")]
    Toolchain(String),

    /// A signature could not be formatted.
    #[error("Formatting error: {0}")]
    Format(#[from] rust_format::Error),

    /// The template path does not exist.
    #[error("Template not found: {0}")]
    TemplateNotFound(PathBuf),

    /// The template exists but could not be read.
    #[error("Failed to read template {path}: {source}")]
    TemplateRead {
        /// Template path.
        path: PathBuf,
        /// Underlying IO error.
        source: io::Error,
    },

    /// The template failed to compile or render.
    #[error("Template error: {0}")]
    Template(#[from] tera::Error),

    /// A resource to copy does not exist.
    #[error("Resource not found: {0}")]
    ResourceNotFound(PathBuf),

    /// Two resources would be copied to the same output file.
    #[error("Resources share the file name {0}")]
    ResourceConflict(String),

    /// A rendered file could not be written.
    #[error("Failed to write {path}: {source}")]
    OutputWrite {
        /// Output path.
        path: PathBuf,
        /// Underlying IO error.
        source: io::Error,
    },

    /// An entity that gets its own page has a name that is not a plain identifier.
    #[error("{0} cannot be used as an output file name")]
    UnsafeName(String),

    /// The search index could not be serialized.
    #[error("Failed to serialize the search index: {0}")]
    SearchIndex(serde_json::Error),

    /// Syntax highlighting failed.
    #[error("Highlighting error: {0}")]
    Highlight(#[from] syntect::Error),

    /// Filesystem failure while reading or writing a serialized index.
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// JSON encoding or decoding failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A decoded index violates the model invariants.
    #[error("Invalid index: {0}")]
    InvalidIndex(String),
}

impl DocketError {
    /// The pipeline stage this error belongs to.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidArgs(_)
            | Self::SourceNotFound(_)
            | Self::UnsupportedSource(_)
            | Self::SourceRead { .. }
            | Self::Parse { .. }
            | Self::ModuleNotFound { .. }
            | Self::DuplicateEntity(_)
            | Self::Manifest { .. }
            | Self::Rustdoc(_)
            | Self::Toolchain(_)
            | Self::Format(_) => ErrorKind::Build,
            Self::TemplateNotFound(_)
            | Self::TemplateRead { .. }
            | Self::Template(_)
            | Self::ResourceNotFound(_)
            | Self::ResourceConflict(_)
            | Self::OutputWrite { .. }
            | Self::UnsafeName(_)
            | Self::SearchIndex(_)
            | Self::Highlight(_) => ErrorKind::Render,
            Self::Io(_) | Self::Json(_) | Self::InvalidIndex(_) => ErrorKind::Io,
        }
    }
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, DocketError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn render_failures_are_render_kind() {
        let json = serde_json::from_str::<u8>("x").unwrap_err();
        assert_eq!(DocketError::SearchIndex(json).kind(), ErrorKind::Render);
        assert_eq!(
            DocketError::UnsafeName("mod ../escaped".to_string()).kind(),
            ErrorKind::Render
        );

        let json = serde_json::from_str::<u8>("x").unwrap_err();
        assert_eq!(DocketError::from(json).kind(), ErrorKind::Io);
    }
}
