//! Loading tag files (JSON) and rule definition files (YAML)
//!
//! Files are read and parsed up front (in parallel with the `parallel`
//! feature) and then inserted into the stores one at a time, in the order
//! they were given, so duplicate-name errors always blame the later file.

use eyre::{Result, WrapErr};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::catalog::Catalog;
use crate::error::CatalogError;
use crate::rules::{RuleDefinition, RuleStore};
use crate::tags::TagStore;

const NESTED_TAG_HINT: &str = "anchor text must follow its description-list term on its own line";

/// Tags parsed out of one tag file, in file order.
#[derive(Debug, Clone, PartialEq)]
pub struct TagFile {
    pub source_file: String,
    pub tags: Vec<(String, String)>,
}

/// One parsed rule definition file.
#[derive(Debug, Clone, PartialEq)]
pub struct DefinitionFile {
    pub source_file: String,
    pub chapter: String,
    pub entries: Vec<RuleDefinition>,
}

/// Parse the contents of a tag file.
///
/// The file must be a JSON object with a `tags` object mapping names to strings.
pub fn parse_tag_file(source_file: &str, content: &str) -> Result<TagFile, CatalogError> {
    let value: serde_json::Value = serde_json::from_str(content)
        .map_err(|e| CatalogError::schema(source_file, format!("invalid JSON: {e}")))?;

    let Some(tags) = value.get("tags") else {
        return Err(CatalogError::schema(source_file, "missing 'tags' key"));
    };
    let Some(tags) = tags.as_object() else {
        return Err(CatalogError::schema(source_file, "'tags' is not an object"));
    };

    let mut parsed = Vec::with_capacity(tags.len());
    for (name, text) in tags {
        match text.as_str() {
            Some(text) => parsed.push((name.clone(), text.to_string())),
            None => {
                return Err(CatalogError::schema(
                    source_file,
                    format!("tag {name} value is not a string ({NESTED_TAG_HINT})"),
                ));
            }
        }
    }

    Ok(TagFile {
        source_file: source_file.to_string(),
        tags: parsed,
    })
}

/// Parse the contents of a rule definition file.
pub fn parse_definition_file(
    source_file: &str,
    content: &str,
) -> Result<DefinitionFile, CatalogError> {
    let value: serde_yaml::Value = serde_yaml::from_str(content)
        .map_err(|e| CatalogError::schema(source_file, format!("invalid YAML: {e}")))?;

    let chapter = match value.get("chapter_name") {
        None => return Err(CatalogError::schema(source_file, "missing 'chapter_name' key")),
        Some(v) => v
            .as_str()
            .ok_or_else(|| CatalogError::schema(source_file, "'chapter_name' is not a string"))?
            .to_string(),
    };

    let entries = match value.get("normative_rule_definitions") {
        None => {
            return Err(CatalogError::schema(
                source_file,
                "missing 'normative_rule_definitions' key",
            ));
        }
        Some(v) => v.as_sequence().ok_or_else(|| {
            CatalogError::schema(source_file, "'normative_rule_definitions' is not a list")
        })?,
    };

    let entries = entries
        .iter()
        .enumerate()
        .map(|(index, entry)| {
            serde_yaml::from_value::<RuleDefinition>(entry.clone()).map_err(|e| {
                CatalogError::schema(
                    source_file,
                    format!("normative rule definition entry #{}: {e}", index + 1),
                )
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(DefinitionFile {
        source_file: source_file.to_string(),
        chapter,
        entries,
    })
}

fn read_source(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).wrap_err_with(|| format!("Failed to read {}", path.display()))
}

fn display_name(path: &Path) -> String {
    path.display().to_string()
}

fn read_tag_file(path: &Path) -> Result<TagFile> {
    let content = read_source(path)?;
    Ok(parse_tag_file(&display_name(path), &content)?)
}

fn read_definition_file(path: &Path) -> Result<DefinitionFile> {
    let content = read_source(path)?;
    Ok(parse_definition_file(&display_name(path), &content)?)
}

/// Read and parse every file, preserving input order in the result.
fn read_all<T: Send>(paths: &[PathBuf], read: fn(&Path) -> Result<T>) -> Result<Vec<T>> {
    #[cfg(feature = "parallel")]
    let results = {
        use rayon::prelude::*;
        paths.par_iter().map(|p| read(p)).collect()
    };

    #[cfg(not(feature = "parallel"))]
    let results = paths.iter().map(|p| read(p)).collect();

    results
}

/// Load tag files into `store`.
pub fn load_tags(store: &mut TagStore, paths: &[PathBuf]) -> Result<()> {
    for file in read_all(paths, read_tag_file)? {
        let count = file.tags.len();
        for (name, text) in file.tags {
            store.add(file.source_file.as_str(), name, text)?;
        }
        debug!("Loaded {count} tags from {}", file.source_file);
    }
    Ok(())
}

/// Load rule definition files into `store`.
pub fn load_definitions(store: &mut RuleStore, paths: &[PathBuf]) -> Result<()> {
    for file in read_all(paths, read_definition_file)? {
        let added = store
            .add_file(&file.source_file, &file.chapter, &file.entries)
            .wrap_err_with(|| format!("Failed to load definitions from {}", file.source_file))?;
        debug!(
            "Loaded {added} normative rules from {} (chapter {})",
            file.source_file, file.chapter
        );
    }
    Ok(())
}

/// Load both stores and log what was found.
pub fn load_catalog(tag_paths: &[PathBuf], definition_paths: &[PathBuf]) -> Result<Catalog> {
    let mut catalog = Catalog::default();
    load_tags(&mut catalog.tags, tag_paths)?;
    load_definitions(&mut catalog.rules, definition_paths)?;

    info!(
        "Loaded {} tags from {} files and {} normative rules from {} files",
        catalog.tags.len(),
        tag_paths.len(),
        catalog.rules.len(),
        definition_paths.len()
    );
    info!(
        "{} implementation-defined behaviors ({} WARL, {} WLRL)",
        catalog.rules.impl_def_count(),
        catalog.rules.category_count(crate::names::ImplDefCategory::WARL),
        catalog.rules.category_count(crate::names::ImplDefCategory::WLRL),
    );
    Ok(catalog)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tag_file_requires_tags_object() {
        let err = parse_tag_file("t.json", r#"{"other": {}}"#).unwrap_err();
        assert!(err.to_string().contains("missing 'tags'"), "{err}");

        let err = parse_tag_file("t.json", r#"{"tags": ["norm:a"]}"#).unwrap_err();
        assert!(err.to_string().contains("not an object"), "{err}");

        let err = parse_tag_file("t.json", "not json").unwrap_err();
        assert!(matches!(err, CatalogError::Schema { .. }));
    }

    #[test]
    fn nested_tag_value_carries_hint() {
        let err =
            parse_tag_file("t.json", r#"{"tags": {"norm:a": {"nested": "x"}}}"#).unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("norm:a"), "{msg}");
        assert!(msg.contains("description-list term"), "{msg}");
    }

    #[test]
    fn tag_file_parses_names_and_text() {
        let file = parse_tag_file(
            "t.json",
            r#"{"tags": {"norm:a": "Alpha text", "norm:b": "Beta"}}"#,
        )
        .unwrap();
        assert_eq!(file.tags.len(), 2);
        assert!(file.tags.contains(&("norm:a".to_string(), "Alpha text".to_string())));
    }

    #[test]
    fn definition_file_requires_both_keys() {
        let err = parse_definition_file("d.yaml", "normative_rule_definitions: []\n").unwrap_err();
        assert!(err.to_string().contains("chapter_name"), "{err}");

        let err = parse_definition_file("d.yaml", "chapter_name: Foo\n").unwrap_err();
        assert!(err.to_string().contains("normative_rule_definitions"), "{err}");
    }

    #[test]
    fn bad_entry_names_file_and_index() {
        let yaml = "chapter_name: Foo\nnormative_rule_definitions:\n  - name: ok\n  - name: bad\n    instances: notalist\n";
        let err = parse_definition_file("d.yaml", yaml).unwrap_err();
        let msg = err.to_string();
        assert!(msg.starts_with("d.yaml:"), "{msg}");
        assert!(msg.contains("#2"), "{msg}");
    }

    #[test]
    fn load_from_disk_in_argument_order() {
        let dir = tempfile::tempdir().unwrap();
        let first = dir.path().join("a-tags.json");
        let second = dir.path().join("b-tags.json");
        std::fs::write(&first, r#"{"tags": {"norm:x": "one"}}"#).unwrap();
        std::fs::write(&second, r#"{"tags": {"norm:x": "two"}}"#).unwrap();

        let mut store = TagStore::new();
        let err = load_tags(&mut store, &[first.clone(), second.clone()]).unwrap_err();
        let dup = err
            .downcast_ref::<CatalogError>()
            .expect("duplicate should surface as CatalogError");
        match dup {
            CatalogError::DuplicateName {
                file, first_file, ..
            } => {
                assert_eq!(file, &second.display().to_string());
                assert_eq!(first_file, &first.display().to_string());
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn missing_file_is_an_error() {
        let mut store = RuleStore::new();
        let err = load_definitions(&mut store, &[PathBuf::from("/nonexistent/defs.yaml")])
            .unwrap_err();
        assert!(format!("{err:#}").contains("Failed to read"));
    }
}
