//! Normative rule definitions and the rule store.

use facet::Facet;
use serde::Deserialize;
use std::collections::{BTreeSet, HashMap};

use crate::error::CatalogError;
use crate::names::{ImplDefCategory, RuleKind, check_rule_name};

/// One entry of `normative_rule_definitions` as written in a definition file.
///
/// Field shapes are enforced by deserialization; the cross-field invariants
/// are enforced when the entry is turned into [`Rule`]s.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct RuleDefinition {
    pub name: Option<String>,
    pub names: Option<Vec<String>>,
    pub summary: Option<String>,
    pub note: Option<String>,
    pub description: Option<String>,
    #[serde(rename = "clarification-link")]
    pub clarification_link: Option<String>,
    #[serde(rename = "clarification-text")]
    pub clarification_text: Option<String>,
    pub kind: Option<String>,
    #[serde(rename = "impl-def-behavior")]
    pub impl_def_behavior: Option<bool>,
    #[serde(rename = "impl-def-category")]
    pub impl_def_category: Option<String>,
    pub instance: Option<String>,
    pub instances: Option<Vec<String>>,
    pub tag: Option<String>,
    pub tags: Option<Vec<TagRefEntry>>,
}

/// A tag reference as written: either a bare tag name or a `{name, context}` record.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum TagRefEntry {
    Name(String),
    Record {
        name: Option<String>,
        #[serde(default)]
        context: bool,
    },
}

/// Reference from a rule to a tag, resolved by name against the tag store.
#[derive(Debug, Clone, PartialEq, Eq, Facet)]
pub struct TagReference {
    pub name: String,
    /// Background context rather than normative text
    pub is_context: bool,
}

impl TagReference {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            is_context: false,
        }
    }

    pub fn context(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            is_context: true,
        }
    }
}

/// A validated normative rule.
#[derive(Debug, Clone, PartialEq, Eq, Facet)]
pub struct Rule {
    pub name: String,
    /// Definition file the rule came from
    pub source_file: String,
    pub chapter: String,
    #[facet(default)]
    pub summary: Option<String>,
    #[facet(default)]
    pub note: Option<String>,
    #[facet(default)]
    pub description: Option<String>,
    #[facet(default)]
    pub kind: Option<RuleKind>,
    pub is_impl_def: bool,
    #[facet(default)]
    pub impl_def_category: Option<ImplDefCategory>,
    pub instances: Vec<String>,
    #[facet(default)]
    pub clarification_link: Option<String>,
    #[facet(default)]
    pub clarification_text: Option<String>,
    pub tag_refs: Vec<TagReference>,
}

impl Rule {
    /// Build a rule named `name` from a definition entry.
    ///
    /// Checks run in a fixed order and stop at the first violation: kind
    /// membership, category requires impl-def, category membership, instances
    /// require a kind, and finally the name pattern.
    pub fn from_definition(
        name: &str,
        source_file: &str,
        chapter: &str,
        def: &RuleDefinition,
    ) -> Result<Self, CatalogError> {
        let tag_refs = parse_tag_refs(name, source_file, def)?;

        let kind = match def.kind.as_deref() {
            None => None,
            Some(value) => Some(RuleKind::parse(value).ok_or_else(|| {
                CatalogError::UnknownKind {
                    rule: name.to_string(),
                    value: value.to_string(),
                    allowed: RuleKind::allowed(),
                }
            })?),
        };

        let is_impl_def = def.impl_def_behavior.unwrap_or(false);

        let impl_def_category = match def.impl_def_category.as_deref() {
            None => None,
            Some(value) => {
                if !is_impl_def {
                    return Err(CatalogError::CategoryWithoutImplDef {
                        rule: name.to_string(),
                    });
                }
                Some(ImplDefCategory::parse(value).ok_or_else(|| {
                    CatalogError::UnknownImplDefCategory {
                        rule: name.to_string(),
                        value: value.to_string(),
                        allowed: ImplDefCategory::allowed(),
                    }
                })?)
            }
        };

        let mut instances = Vec::new();
        instances.extend(def.instance.iter().cloned());
        instances.extend(def.instances.iter().flatten().cloned());
        if kind.is_none() && !instances.is_empty() {
            return Err(CatalogError::InstancesWithoutKind {
                rule: name.to_string(),
            });
        }

        check_rule_name(name, is_impl_def)?;

        Ok(Rule {
            name: name.to_string(),
            source_file: source_file.to_string(),
            chapter: chapter.to_string(),
            summary: def.summary.clone(),
            note: def.note.clone(),
            description: def.description.clone(),
            kind,
            is_impl_def,
            impl_def_category,
            instances,
            clarification_link: def.clarification_link.clone(),
            clarification_text: def.clarification_text.clone(),
            tag_refs,
        })
    }
}

fn parse_tag_refs(
    rule: &str,
    source_file: &str,
    def: &RuleDefinition,
) -> Result<Vec<TagReference>, CatalogError> {
    let mut refs = Vec::new();
    if let Some(tag) = &def.tag {
        refs.push(TagReference::new(tag.clone()));
    }
    for entry in def.tags.iter().flatten() {
        match entry {
            TagRefEntry::Name(name) => refs.push(TagReference::new(name.clone())),
            TagRefEntry::Record {
                name: Some(name),
                context,
            } => refs.push(TagReference {
                name: name.clone(),
                is_context: *context,
            }),
            TagRefEntry::Record { name: None, .. } => {
                return Err(CatalogError::schema(
                    source_file,
                    format!("Normative rule {rule} has a tag reference missing its name"),
                ));
            }
        }
    }
    Ok(refs)
}

/// All normative rules, in definition order.
#[derive(Debug, Clone, Default)]
pub struct RuleStore {
    rules: Vec<Rule>,
    by_name: HashMap<String, usize>,
}

impl RuleStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add every entry of one definition file.
    ///
    /// An entry with a `names` list expands into one independent rule per name.
    /// Returns the number of rules added.
    pub fn add_file(
        &mut self,
        source_file: &str,
        chapter: &str,
        entries: &[RuleDefinition],
    ) -> Result<usize, CatalogError> {
        let before = self.rules.len();
        for (index, def) in entries.iter().enumerate() {
            for name in resolve_names(source_file, index, def)? {
                self.add_one(name, source_file, chapter, def)?;
            }
        }
        Ok(self.rules.len() - before)
    }

    /// Add a single rule built from `def` under `name`.
    pub fn add_one(
        &mut self,
        name: &str,
        source_file: &str,
        chapter: &str,
        def: &RuleDefinition,
    ) -> Result<&Rule, CatalogError> {
        if let Some(&idx) = self.by_name.get(name) {
            return Err(CatalogError::DuplicateName {
                what: "Normative rule",
                name: name.to_string(),
                file: source_file.to_string(),
                first_file: self.rules[idx].source_file.clone(),
            });
        }

        let rule = Rule::from_definition(name, source_file, chapter, def)?;
        self.by_name.insert(rule.name.clone(), self.rules.len());
        self.rules.push(rule);
        Ok(&self.rules[self.rules.len() - 1])
    }

    pub fn get(&self, name: &str) -> Option<&Rule> {
        self.by_name.get(name).map(|&idx| &self.rules[idx])
    }

    /// Rules in the order they were defined.
    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    /// Distinct chapter names, sorted.
    pub fn chapters(&self) -> Vec<&str> {
        let chapters: BTreeSet<&str> = self.rules.iter().map(|r| r.chapter.as_str()).collect();
        chapters.into_iter().collect()
    }

    /// Number of implementation-defined rules.
    pub fn impl_def_count(&self) -> usize {
        self.rules.iter().filter(|r| r.is_impl_def).count()
    }

    /// Number of rules in an implementation-defined category.
    pub fn category_count(&self, category: ImplDefCategory) -> usize {
        self.rules
            .iter()
            .filter(|r| r.impl_def_category == Some(category))
            .count()
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

fn resolve_names<'a>(
    source_file: &str,
    index: usize,
    def: &'a RuleDefinition,
) -> Result<Vec<&'a str>, CatalogError> {
    if let Some(name) = &def.name {
        return Ok(vec![name.as_str()]);
    }
    match &def.names {
        Some(names) if !names.is_empty() => Ok(names.iter().map(String::as_str).collect()),
        Some(_) => Err(CatalogError::schema(
            source_file,
            format!("normative rule definition entry #{} has an empty names list", index + 1),
        )),
        None => Err(CatalogError::schema(
            source_file,
            format!(
                "missing name/names in normative rule definition entry #{}",
                index + 1
            ),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn def(yaml: &str) -> RuleDefinition {
        serde_yaml::from_str(yaml).expect("test definition must parse")
    }

    #[test]
    fn tag_reference_shapes_are_normalized() {
        let d = def(r#"
name: rule-a
tag: norm:one
tags:
  - norm:two
  - name: norm:three
    context: true
  - name: norm:four
"#);
        let rule = Rule::from_definition("rule-a", "ch.yaml", "ch", &d).unwrap();
        assert_eq!(
            rule.tag_refs,
            vec![
                TagReference::new("norm:one"),
                TagReference::new("norm:two"),
                TagReference::context("norm:three"),
                TagReference::new("norm:four"),
            ]
        );
    }

    #[test]
    fn summary_only_rules_have_no_tag_refs() {
        let d = def("name: lonely\nsummary: Just a summary\n");
        let rule = Rule::from_definition("lonely", "ch.yaml", "ch", &d).unwrap();
        assert!(rule.tag_refs.is_empty());
        assert_eq!(rule.summary.as_deref(), Some("Just a summary"));
    }

    #[test]
    fn tag_record_without_name_is_a_schema_error() {
        let d = def("name: r1\ntags:\n  - context: true\n");
        let err = Rule::from_definition("r1", "ch.yaml", "ch", &d).unwrap_err();
        assert!(matches!(err, CatalogError::Schema { .. }), "{err}");
    }

    #[test]
    fn category_requires_impl_def() {
        let d = def("name: MISA_MXL\nimpl-def-category: WARL\n");
        let err = Rule::from_definition("MISA_MXL", "ch.yaml", "ch", &d).unwrap_err();
        assert_eq!(
            err,
            CatalogError::CategoryWithoutImplDef {
                rule: "MISA_MXL".to_string()
            }
        );

        let d = def("name: MISA_MXL\nimpl-def-behavior: true\nimpl-def-category: WARL\n");
        let rule = Rule::from_definition("MISA_MXL", "ch.yaml", "ch", &d).unwrap();
        assert_eq!(rule.impl_def_category, Some(ImplDefCategory::WARL));
    }

    #[test]
    fn category_check_precedes_category_membership() {
        let d = def("name: X_Y\nimpl-def-category: BOGUS\n");
        let err = Rule::from_definition("X_Y", "ch.yaml", "ch", &d).unwrap_err();
        assert!(matches!(err, CatalogError::CategoryWithoutImplDef { .. }));

        let d = def("name: X_Y\nimpl-def-behavior: true\nimpl-def-category: BOGUS\n");
        let err = Rule::from_definition("X_Y", "ch.yaml", "ch", &d).unwrap_err();
        assert!(err.to_string().contains("WARL,WLRL"), "{err}");
    }

    #[test]
    fn instances_require_kind() {
        let d = def("name: r1\ninstances: [v1]\n");
        let err = Rule::from_definition("r1", "ch.yaml", "ch", &d).unwrap_err();
        assert_eq!(
            err,
            CatalogError::InstancesWithoutKind {
                rule: "r1".to_string()
            }
        );

        let d = def("name: r1\nkind: csr\ninstance: mstatus\ninstances: [sstatus, vsstatus]\n");
        let rule = Rule::from_definition("r1", "ch.yaml", "ch", &d).unwrap();
        assert_eq!(rule.kind, Some(RuleKind::Csr));
        assert_eq!(rule.instances, ["mstatus", "sstatus", "vsstatus"]);
    }

    #[test]
    fn unknown_kind_lists_allowed_values() {
        let d = def("name: r1\nkind: register\n");
        let err = Rule::from_definition("r1", "ch.yaml", "ch", &d).unwrap_err();
        assert!(matches!(err, CatalogError::UnknownKind { .. }));
        assert!(err.to_string().contains("csr_field"));
    }

    #[test]
    fn kind_is_checked_before_name_pattern() {
        let d = def("name: bad name\nkind: register\n");
        let err = Rule::from_definition("bad name", "ch.yaml", "ch", &d).unwrap_err();
        assert!(matches!(err, CatalogError::UnknownKind { .. }));
    }

    #[test]
    fn name_pattern_depends_on_impl_def() {
        let d = def("name: misa_mxl\nimpl-def-behavior: true\n");
        let err = Rule::from_definition("misa_mxl", "ch.yaml", "ch", &d).unwrap_err();
        assert!(matches!(err, CatalogError::BadNamePattern { .. }));

        let d = def("name: MISA_MXL\nimpl-def-behavior: true\n");
        assert!(Rule::from_definition("MISA_MXL", "ch.yaml", "ch", &d).is_ok());
    }

    #[test]
    fn names_fan_out_into_independent_rules() {
        let entries = vec![def(
            "names: [alpha, beta, gamma]\nsummary: Shared\ntags: [\"norm:shared\"]\n",
        )];
        let mut store = RuleStore::new();
        let added = store.add_file("ch.yaml", "Chapter", &entries).unwrap();
        assert_eq!(added, 3);

        let names: Vec<&str> = store.rules().iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, ["alpha", "beta", "gamma"]);
        for rule in store.rules() {
            assert_eq!(rule.summary.as_deref(), Some("Shared"));
            assert_eq!(rule.tag_refs, vec![TagReference::new("norm:shared")]);
        }

        // Each rule owns its fields
        let mut alpha = store.get("alpha").unwrap().clone();
        alpha.summary = Some("Changed".to_string());
        assert_eq!(store.get("beta").unwrap().summary.as_deref(), Some("Shared"));
    }

    #[test]
    fn entry_without_any_name_is_a_schema_error() {
        let entries = vec![def("summary: nameless\n")];
        let mut store = RuleStore::new();
        let err = store.add_file("ch.yaml", "Chapter", &entries).unwrap_err();
        match err {
            CatalogError::Schema { file, message } => {
                assert_eq!(file, "ch.yaml");
                assert!(message.contains("name/names"), "{message}");
            }
            other => panic!("expected schema error, got {other:?}"),
        }

        let entries = vec![def("names: []\n")];
        assert!(store.add_file("ch.yaml", "Chapter", &entries).is_err());
    }

    #[test]
    fn duplicate_rule_names_cite_prior_file() {
        let mut store = RuleStore::new();
        store
            .add_file("a.yaml", "A", &[def("name: shared-rule\n")])
            .unwrap();
        let err = store
            .add_file("b.yaml", "B", &[def("name: shared-rule\n")])
            .unwrap_err();
        assert_eq!(
            err,
            CatalogError::DuplicateName {
                what: "Normative rule",
                name: "shared-rule".to_string(),
                file: "b.yaml".to_string(),
                first_file: "a.yaml".to_string(),
            }
        );

        // Duplicates inside one fan-out are caught too
        let err = store
            .add_file("c.yaml", "C", &[def("names: [twin, twin]\n")])
            .unwrap_err();
        assert!(matches!(err, CatalogError::DuplicateName { .. }));
    }

    #[test]
    fn counts_and_chapters() {
        let mut store = RuleStore::new();
        store
            .add_file(
                "a.yaml",
                "Zeta",
                &[
                    def("name: A_ONE\nimpl-def-behavior: true\nimpl-def-category: WARL\n"),
                    def("name: A_TWO\nimpl-def-behavior: true\n"),
                ],
            )
            .unwrap();
        store
            .add_file("b.yaml", "Alpha", &[def("name: plain\n")])
            .unwrap();

        assert_eq!(store.chapters(), ["Alpha", "Zeta"]);
        assert_eq!(store.impl_def_count(), 2);
        assert_eq!(store.category_count(ImplDefCategory::WARL), 1);
        assert_eq!(store.category_count(ImplDefCategory::WLRL), 0);
        assert_eq!(store.len(), 3);
    }
}
