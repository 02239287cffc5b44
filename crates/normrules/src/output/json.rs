//! JSON catalog: one entry per rule with its tags resolved

use eyre::{Result, WrapErr};
use normrules_core::{Catalog, Rule, markup};
use serde::Serialize;

use crate::TagUrls;

#[derive(Debug, Serialize)]
struct CatalogJson<'a> {
    normative_rules: Vec<RuleJson<'a>>,
}

#[derive(Debug, Serialize)]
struct RuleJson<'a> {
    name: &'a str,
    def_filename: &'a str,
    chapter_name: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    kind: Option<&'static str>,
    #[serde(rename = "impl-def-behavior")]
    impl_def_behavior: bool,
    #[serde(skip_serializing_if = "no_instances")]
    instances: &'a [String],
    #[serde(rename = "impl-def-category", skip_serializing_if = "Option::is_none")]
    impl_def_category: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    summary: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    note: Option<&'a str>,
    #[serde(rename = "clarification-text", skip_serializing_if = "Option::is_none")]
    clarification_text: Option<&'a str>,
    #[serde(rename = "clarification-link", skip_serializing_if = "Option::is_none")]
    clarification_link: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<&'a str>,
    tags: Vec<TagJson<'a>>,
}

#[derive(Debug, Serialize)]
struct TagJson<'a> {
    name: &'a str,
    context: bool,
    text: String,
    tag_filename: &'a str,
    stds_doc_url: &'a str,
}

fn no_instances(instances: &&[String]) -> bool {
    instances.is_empty()
}

fn rule_json<'a>(catalog: &'a Catalog, urls: &'a TagUrls, rule: &'a Rule) -> Result<RuleJson<'a>> {
    let mut tags = Vec::with_capacity(rule.tag_refs.len());
    for tag_ref in &rule.tag_refs {
        let Some(tag) = catalog.tags.get(&tag_ref.name) else {
            eyre::bail!(
                "Normative rule {} defined in file {} references non-existent tag {}",
                rule.name,
                rule.source_file,
                tag_ref.name
            );
        };
        let url = urls.url_for(tag)?;
        let text = markup::render_tag_text(&tag.text, url)
            .wrap_err_with(|| format!("Failed to convert text of tag {}", tag.name))?;

        tags.push(TagJson {
            name: &tag.name,
            context: tag_ref.is_context,
            text,
            tag_filename: &tag.source_file,
            stds_doc_url: url,
        });
    }

    Ok(RuleJson {
        name: &rule.name,
        def_filename: &rule.source_file,
        chapter_name: &rule.chapter,
        kind: rule.kind.map(|k| k.as_str()),
        impl_def_behavior: rule.is_impl_def,
        instances: &rule.instances,
        impl_def_category: rule.impl_def_category.map(|c| c.as_str()),
        summary: rule.summary.as_deref(),
        note: rule.note.as_deref(),
        clarification_text: rule.clarification_text.as_deref(),
        clarification_link: rule.clarification_link.as_deref(),
        description: rule.description.as_deref(),
        tags,
    })
}

/// Render the catalog as pretty-printed JSON, rules in definition order.
pub fn render(catalog: &Catalog, urls: &TagUrls) -> Result<String> {
    let normative_rules = catalog
        .rules
        .rules()
        .iter()
        .map(|rule| rule_json(catalog, urls, rule))
        .collect::<Result<Vec<_>>>()?;

    Ok(serde_json::to_string_pretty(&CatalogJson { normative_rules })?)
}
