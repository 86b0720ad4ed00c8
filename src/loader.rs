//! Schema Loading
//!
//! Reads schema documents from a single file or a directory tree and
//! compiles them, in path order, into one package.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use walkdir::WalkDir;

use crate::checksum::Checksum;
use crate::config::GenerationConfig;
use crate::error::Result;
use crate::model::Package;
use crate::rules::SchemaMapper;

/// Directories never searched for schemas
const SKIP_DIRS: &[&str] = &["target", ".git", "node_modules"];

/// One schema document and the symbolic name its root type is compiled under
#[derive(Debug, Clone)]
pub struct SchemaSource {
    pub name: String,
    pub path: PathBuf,
    pub document: serde_json::Value,
}

impl SchemaSource {
    /// Read and parse a schema file; the name is the file stem without any
    /// `.schema` suffix (`person.schema.json` -> `person`).
    pub fn read(path: &Path) -> anyhow::Result<Self> {
        let content = fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;
        let document = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse JSON in {}", path.display()))?;

        let stem = path
            .file_stem()
            .and_then(|s| s.to_str())
            .with_context(|| format!("No usable file name in {}", path.display()))?;
        let name = stem.strip_suffix(".schema").unwrap_or(stem).to_string();

        Ok(Self {
            name,
            path: path.to_path_buf(),
            document,
        })
    }
}

/// Load one schema file, or every `*.json` file under a directory sorted by
/// path.
pub fn load_sources(path: &Path) -> anyhow::Result<Vec<SchemaSource>> {
    if path.is_file() {
        return Ok(vec![SchemaSource::read(path)?]);
    }
    if !path.is_dir() {
        anyhow::bail!("Schema source {} does not exist", path.display());
    }

    let mut sources = Vec::new();
    let walker = WalkDir::new(path)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| e.depth() == 0 || !e.file_type().is_dir() || !is_skipped(e.file_name().to_str()));
    for entry in walker {
        let entry = entry.with_context(|| format!("Failed to walk {}", path.display()))?;
        let file = entry.path();
        if entry.file_type().is_file() && file.extension().is_some_and(|ext| ext == "json") {
            sources.push(SchemaSource::read(file)?);
        }
    }

    tracing::info!("Found {} schema files under {}", sources.len(), path.display());
    Ok(sources)
}

fn is_skipped(name: Option<&str>) -> bool {
    name.is_some_and(|n| SKIP_DIRS.contains(&n))
}

/// Checksum over the sources, in the order given
pub fn sources_checksum(sources: &[SchemaSource]) -> Checksum {
    Checksum::combine(sources.iter().map(|s| (s.name.as_str(), &s.document)))
}

/// Compile every source into a fresh package named by the config.
///
/// Sources share the package, so a type name declared by one source cannot
/// be declared again by another.
pub fn compile_sources(sources: &[SchemaSource], config: &GenerationConfig) -> Result<Package> {
    let mapper = SchemaMapper::new(config.clone());
    let mut package = Package::new(config.package.clone());
    for source in sources {
        mapper.generate(&mut package, &source.name, &source.document)?;
    }
    Ok(package)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::GenerationError;

    fn write(dir: &Path, relative: &str, content: &str) {
        let path = dir.join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    #[test]
    fn test_load_directory_sorted() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "b/zeta.json", r#"{"type": "object"}"#);
        write(dir.path(), "a/person.schema.json", r#"{"type": "object"}"#);
        write(dir.path(), "a/notes.txt", "not a schema");
        write(dir.path(), "target/stale.json", r#"{"type": "object"}"#);

        let sources = load_sources(dir.path()).unwrap();

        let names: Vec<_> = sources.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["person", "zeta"]);
    }

    #[test]
    fn test_load_single_file_and_errors() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "order.json", r#"{"type": "object"}"#);
        write(dir.path(), "broken.json", "{");

        let sources = load_sources(&dir.path().join("order.json")).unwrap();
        assert_eq!(sources.len(), 1);
        assert_eq!(sources[0].name, "order");

        let err = load_sources(&dir.path().join("broken.json")).unwrap_err();
        assert!(err.to_string().contains("Failed to parse JSON"));
        assert!(load_sources(&dir.path().join("missing")).is_err());
    }

    #[test]
    fn test_compile_into_one_package() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "address.json", r#"{"type": "object", "properties": {"city": {"type": "string"}}}"#);
        write(dir.path(), "person.json", r#"{"type": "object", "properties": {"name": {"type": "string"}}}"#);
        let sources = load_sources(dir.path()).unwrap();

        let config = GenerationConfig {
            package: "people".to_string(),
            ..GenerationConfig::default()
        };
        let package = compile_sources(&sources, &config).unwrap();

        assert_eq!(package.name(), "people");
        assert!(package.contains("Address"));
        assert!(package.contains("Person"));
    }

    #[test]
    fn test_cross_source_collision() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "a.json", r#"{"properties": {"home": {"type": "object"}}}"#);
        write(dir.path(), "b.json", r#"{"properties": {"home": {"type": "object"}}}"#);
        let sources = load_sources(dir.path()).unwrap();

        let err = compile_sources(&sources, &GenerationConfig::default()).unwrap_err();
        assert!(matches!(err, GenerationError::TypeAlreadyExists { ref name, .. } if name == "Home"));
    }
}
