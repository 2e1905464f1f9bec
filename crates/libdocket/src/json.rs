//! JSON serialization of an [`Index`].

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use tracing::info;

use crate::error::Result;
use crate::model::Index;

/// File name used by [`write_index`].
pub const INDEX_FILE_NAME: &str = "index.json";

/// Serialize an index to pretty-printed JSON, keyed by package name.
pub fn to_json(index: &Index) -> Result<String> {
    Ok(serde_json::to_string_pretty(index)?)
}

/// Parse JSON produced by [`to_json`].
///
/// Fails when a key does not match its package name or a top-level entry is not a package.
pub fn from_json(text: &str) -> Result<Index> {
    Ok(serde_json::from_str(text)?)
}

/// Write `index` to `dir/index.json`, creating `dir` if needed, and return the written path.
pub fn write_index(index: &Index, dir: &Path) -> Result<PathBuf> {
    fs::create_dir_all(dir)?;
    let path = dir.join(INDEX_FILE_NAME);
    let mut writer = BufWriter::new(File::create(&path)?);
    serde_json::to_writer_pretty(&mut writer, index)?;
    writer.write_all(b"\n")?;
    writer.flush()?;
    info!(path = %path.display(), packages = index.len(), "wrote JSON index");
    Ok(path)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use tempfile::tempdir;

    use super::*;
    use crate::error::{DocketError, ErrorKind};
    use crate::model::{Comment, Entity, EntityKind, Package};

    fn sample() -> Index {
        let mut package = Package::new("Foo");
        package.set_comment(Comment::parse("Crate \"docs\" with <html> & quotes."));
        let mut function = Entity::new(EntityKind::Function, "run", &["Foo".to_string()]);
        function.signature = Some("pub fn run()".to_string());
        package.members_mut().push(function);
        Index::from_packages([package, Package::new("Bar")]).unwrap()
    }

    #[test]
    fn keys_are_package_names_in_order() {
        let text = to_json(&sample()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        let keys: Vec<&String> = value.as_object().unwrap().keys().collect();
        assert_eq!(keys, vec!["Bar", "Foo"]);
        assert_eq!(value["Foo"]["members"][0]["kind"], "function");
    }

    #[test]
    fn round_trip_preserves_index() {
        let index = sample();
        assert_eq!(from_json(&to_json(&index).unwrap()).unwrap(), index);
    }

    #[test]
    fn mismatched_key_is_rejected() {
        let text = r#"{"Other": {"kind": "package", "name": "Foo", "path": ["Foo"], "visibility": "public"}}"#;
        let err = from_json(text).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Io);
        assert!(matches!(err, DocketError::Json(_)));
    }

    #[test]
    fn path_like_names_are_rejected() {
        let text = r#"{"geo": {"kind": "package", "name": "geo", "path": ["geo"], "visibility": "public",
            "members": [{"kind": "struct", "name": "../../x", "path": ["geo", "../../x"], "visibility": "public"}]}}"#;
        let err = from_json(text).unwrap_err();
        assert!(matches!(err, DocketError::Json(_)));
        assert!(err.to_string().contains("cannot be used as an output file name"));
    }

    #[test]
    fn write_index_creates_directory() {
        let temp_dir = tempdir().unwrap();
        let out = temp_dir.path().join("nested/out");
        let path = write_index(&sample(), &out).unwrap();
        assert_eq!(path, out.join(INDEX_FILE_NAME));
        let written = fs::read_to_string(&path).unwrap();
        assert_eq!(from_json(&written).unwrap(), sample());
    }
}
