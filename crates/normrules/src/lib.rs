//! normrules library - Build and validate normative rule catalogs
//!
//! This library exposes the pieces behind the `normrules` binary (input
//! assembly, catalog loading and the report builders) for testing and
//! embedding purposes.

pub mod config;
pub mod output;

use config::Config;
use eyre::Result;
use normrules_core::{Catalog, CatalogError, Tag, ValidationPolicy, ValidationReport, load_catalog};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Maps each tag file to the URL of the document its tags were extracted from.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagUrls(BTreeMap<String, String>);

impl TagUrls {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, tag_file: impl Into<String>, url: impl Into<String>) {
        self.0.insert(tag_file.into(), url.into());
    }

    /// Build from `[tag-file, url, tag-file, url, ...]` as collected from `--tag2url`.
    pub fn from_pairs(values: &[String]) -> Result<Self> {
        if values.len() % 2 != 0 {
            eyre::bail!("--tag2url takes a tag file and a URL");
        }
        let mut urls = Self::new();
        for pair in values.chunks(2) {
            urls.insert(pair[0].clone(), pair[1].clone());
        }
        Ok(urls)
    }

    /// URL for the document `tag` came from.
    pub fn url_for(&self, tag: &Tag) -> Result<&str, CatalogError> {
        self.0
            .get(&tag.source_file)
            .map(String::as_str)
            .ok_or_else(|| CatalogError::MissingUrl {
                tag: tag.name.clone(),
                tag_file: tag.source_file.clone(),
            })
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Everything one run reads: sources, tag URLs and the validation policy.
///
/// Config file entries come first; command-line arguments are appended.
#[derive(Debug, Clone, Default)]
pub struct Inputs {
    pub definitions: Vec<PathBuf>,
    pub tags: Vec<PathBuf>,
    pub tag_urls: TagUrls,
    pub lenient: bool,
}

impl Inputs {
    pub fn from_config(config: &Config, base: &Path) -> Self {
        let mut tag_urls = TagUrls::new();
        for source in &config.tags {
            if let Some(url) = &source.url {
                tag_urls.insert(base.join(&source.path).display().to_string(), url.clone());
            }
        }
        Self {
            definitions: config.definition_paths(base),
            tags: config.tag_paths(base),
            tag_urls,
            lenient: config.warn_unreferenced,
        }
    }

    pub fn policy(&self) -> ValidationPolicy {
        ValidationPolicy {
            lenient: self.lenient,
        }
    }

    /// Fail unless at least one definition file and one tag file were given.
    pub fn require_sources(&self) -> Result<()> {
        if self.definitions.is_empty() {
            eyre::bail!("Missing normative rule definition file(s): pass -d or list them in the config");
        }
        if self.tags.is_empty() {
            eyre::bail!("Missing normative tag file(s): pass -t or list them in the config");
        }
        Ok(())
    }
}

/// Load both stores and run the cross-reference validator.
pub fn load_and_validate(inputs: &Inputs) -> Result<(Catalog, ValidationReport)> {
    inputs.require_sources()?;

    for path in &inputs.definitions {
        debug!("Normative rule definition file {}", path.display());
    }
    for path in &inputs.tags {
        debug!("Normative tag file {}", path.display());
    }
    for (tag_file, url) in inputs.tag_urls.iter() {
        debug!("Normative tag file {tag_file} links to URL {url}");
    }

    let catalog = load_catalog(&inputs.tags, &inputs.definitions)?;
    let report = catalog.validate(inputs.policy());
    report.log_findings();

    info!(
        "Validated {} normative rules against {} tags ({} referenced)",
        report.total_rules, report.total_tags, report.referenced_tags
    );
    Ok((catalog, report))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TagSource;

    #[test]
    fn tag2url_pairs() {
        let values = vec![
            "a-tags.json".to_string(),
            "https://example.org/a.html".to_string(),
            "b-tags.json".to_string(),
            "https://example.org/b.html".to_string(),
        ];
        let urls = TagUrls::from_pairs(&values).unwrap();
        let tag = Tag {
            name: "norm:x".to_string(),
            source_file: "b-tags.json".to_string(),
            text: "x".to_string(),
        };
        assert_eq!(urls.url_for(&tag).unwrap(), "https://example.org/b.html");

        assert!(TagUrls::from_pairs(&values[..3]).is_err());
    }

    #[test]
    fn missing_url_names_tag_and_file() {
        let tag = Tag {
            name: "norm:x".to_string(),
            source_file: "orphan-tags.json".to_string(),
            text: "x".to_string(),
        };
        let err = TagUrls::new().url_for(&tag).unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("norm:x") && msg.contains("orphan-tags.json"), "{msg}");
    }

    #[test]
    fn config_inputs_key_urls_by_resolved_path() {
        let config = Config {
            definitions: vec!["rules.yaml".to_string()],
            tags: vec![TagSource {
                path: "tags.json".to_string(),
                url: Some("https://example.org/doc.html".to_string()),
            }],
            warn_unreferenced: true,
        };
        let inputs = Inputs::from_config(&config, Path::new("/std"));
        let tag = Tag {
            name: "norm:y".to_string(),
            source_file: inputs.tags[0].display().to_string(),
            text: "y".to_string(),
        };
        assert_eq!(inputs.tag_urls.url_for(&tag).unwrap(), "https://example.org/doc.html");
        assert!(inputs.policy().lenient);
    }

    #[test]
    fn sources_are_required() {
        let inputs = Inputs::default();
        assert!(inputs.require_sources().is_err());
    }
}
