//! Normative tags: named anchors extracted from the standard's documents.

use facet::Facet;
use std::collections::BTreeMap;

use crate::error::CatalogError;

/// One extracted anchor and its text.
#[derive(Debug, Clone, PartialEq, Eq, Facet)]
pub struct Tag {
    /// Anchor name, unique across every loaded tag file (e.g. "norm:misa_mxl")
    pub name: String,
    /// Tag file the anchor was extracted into
    pub source_file: String,
    /// AsciiDoc-flavored text of the anchor
    pub text: String,
}

/// All tags for a standard, merged from any number of tag files.
#[derive(Debug, Clone, Default)]
pub struct TagStore {
    tags: BTreeMap<String, Tag>,
}

impl TagStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a tag.
    ///
    /// Fails if `name` is already known (from this or any other file) or if
    /// `text` is empty.
    pub fn add(
        &mut self,
        source_file: impl Into<String>,
        name: impl Into<String>,
        text: impl Into<String>,
    ) -> Result<(), CatalogError> {
        let source_file = source_file.into();
        let name = name.into();
        let text = text.into();

        if let Some(existing) = self.tags.get(&name) {
            return Err(CatalogError::DuplicateName {
                what: "Tag",
                name,
                file: source_file,
                first_file: existing.source_file.clone(),
            });
        }

        if text.is_empty() {
            return Err(CatalogError::schema(
                source_file,
                format!("Tag name {name} has empty text"),
            ));
        }

        self.tags.insert(
            name.clone(),
            Tag {
                name,
                source_file,
                text,
            },
        );
        Ok(())
    }

    /// Look up a tag by name.
    pub fn get(&self, name: &str) -> Option<&Tag> {
        self.tags.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.tags.contains_key(name)
    }

    /// All tags, sorted by name.
    pub fn all(&self) -> impl Iterator<Item = &Tag> {
        self.tags.values()
    }

    /// Distinct tag files that contributed at least one tag, sorted.
    pub fn source_files(&self) -> Vec<&str> {
        let mut files: Vec<&str> = self.tags.values().map(|t| t.source_file.as_str()).collect();
        files.sort_unstable();
        files.dedup();
        files
    }

    pub fn len(&self) -> usize {
        self.tags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duplicate_tag_names_cite_both_files() {
        let mut store = TagStore::new();
        store.add("a-tags.json", "norm:foo", "Foo text").unwrap();

        let err = store.add("b-tags.json", "norm:foo", "Other text").unwrap_err();
        assert_eq!(
            err,
            CatalogError::DuplicateName {
                what: "Tag",
                name: "norm:foo".to_string(),
                file: "b-tags.json".to_string(),
                first_file: "a-tags.json".to_string(),
            }
        );
        let msg = err.to_string();
        assert!(msg.contains("a-tags.json"), "{msg}");
        assert!(msg.contains("b-tags.json"), "{msg}");

        // Same file is still a duplicate
        assert!(store.add("a-tags.json", "norm:foo", "again").is_err());
        assert_eq!(store.get("norm:foo").unwrap().text, "Foo text");
    }

    #[test]
    fn empty_text_is_rejected() {
        let mut store = TagStore::new();
        let err = store.add("tags.json", "norm:empty", "").unwrap_err();
        assert!(matches!(err, CatalogError::Schema { .. }));
        assert!(store.is_empty());
    }

    #[test]
    fn get_returns_none_for_unknown_names() {
        let store = TagStore::new();
        assert!(store.get("norm:nope").is_none());
    }

    #[test]
    fn all_is_sorted_by_name() {
        let mut store = TagStore::new();
        store.add("b.json", "norm:zeta", "z").unwrap();
        store.add("a.json", "norm:alpha", "a").unwrap();
        store.add("b.json", "norm:mu", "m").unwrap();

        let names: Vec<&str> = store.all().map(|t| t.name.as_str()).collect();
        assert_eq!(names, ["norm:alpha", "norm:mu", "norm:zeta"]);
        assert_eq!(store.source_files(), ["a.json", "b.json"]);
        assert_eq!(store.len(), 3);
    }
}
