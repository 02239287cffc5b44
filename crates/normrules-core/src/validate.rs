//! Cross-reference validation between the rule store and the tag store

use facet::Facet;
use std::collections::HashSet;
use tracing::{error, warn};

use crate::names::{is_clarification_link, is_reserved_name};
use crate::rules::Rule;
use crate::tags::TagStore;

/// How strictly unreferenced tags are treated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ValidationPolicy {
    /// Unreferenced tags become warnings instead of errors
    pub lenient: bool,
}

impl ValidationPolicy {
    pub fn strict() -> Self {
        Self { lenient: false }
    }

    pub fn lenient() -> Self {
        Self { lenient: true }
    }
}

/// A rule references a tag that no tag file defines.
#[derive(Debug, Clone, PartialEq, Eq, Facet)]
pub struct MissingTag {
    pub rule: String,
    pub tag: String,
    /// Definition file of the rule
    pub file: String,
}

/// A rule name uses the prefix reserved for tags.
#[derive(Debug, Clone, PartialEq, Eq, Facet)]
pub struct BadRuleName {
    pub rule: String,
    pub file: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Facet)]
#[facet(rename_all = "snake_case")]
#[repr(u8)]
pub enum ClarificationProblem {
    /// `clarification-text` given without `clarification-link`
    TextWithoutLink,
    /// `clarification-link` is not a GitHub issue URL
    LinkNotAnIssue,
}

#[derive(Debug, Clone, PartialEq, Eq, Facet)]
pub struct ClarificationIssue {
    pub rule: String,
    pub file: String,
    pub problem: ClarificationProblem,
    #[facet(default)]
    pub link: Option<String>,
}

/// A tag that no rule references.
#[derive(Debug, Clone, PartialEq, Eq, Facet)]
pub struct UnreferencedTag {
    pub tag: String,
    /// Tag file the tag came from
    pub file: String,
}

/// Outcome of one validation pass.
///
/// Every finding is collected before the verdict is taken, so a single run
/// reports all problems at once.
#[derive(Debug, Clone, PartialEq, Eq, Facet)]
pub struct ValidationReport {
    pub total_rules: usize,
    pub total_tags: usize,
    /// Distinct tags referenced by at least one rule
    pub referenced_tags: usize,
    pub missing_tags: Vec<MissingTag>,
    pub bad_names: Vec<BadRuleName>,
    pub clarification_issues: Vec<ClarificationIssue>,
    pub unreferenced_tags: Vec<UnreferencedTag>,
    pub lenient: bool,
}

impl ValidationReport {
    /// Validate `rules` against `tags` in a single pass.
    pub fn compute(tags: &TagStore, rules: &[Rule], policy: ValidationPolicy) -> Self {
        let mut seen: HashSet<&str> = HashSet::new();
        let mut missing_tags = Vec::new();
        let mut bad_names = Vec::new();
        let mut clarification_issues = Vec::new();

        for rule in rules {
            for tag_ref in &rule.tag_refs {
                if tags.contains(&tag_ref.name) {
                    seen.insert(tag_ref.name.as_str());
                } else {
                    missing_tags.push(MissingTag {
                        rule: rule.name.clone(),
                        tag: tag_ref.name.clone(),
                        file: rule.source_file.clone(),
                    });
                }
            }

            if is_reserved_name(&rule.name) {
                bad_names.push(BadRuleName {
                    rule: rule.name.clone(),
                    file: rule.source_file.clone(),
                });
            }

            match (&rule.clarification_link, &rule.clarification_text) {
                (None, Some(_)) => clarification_issues.push(ClarificationIssue {
                    rule: rule.name.clone(),
                    file: rule.source_file.clone(),
                    problem: ClarificationProblem::TextWithoutLink,
                    link: None,
                }),
                (Some(link), _) if !is_clarification_link(link) => {
                    clarification_issues.push(ClarificationIssue {
                        rule: rule.name.clone(),
                        file: rule.source_file.clone(),
                        problem: ClarificationProblem::LinkNotAnIssue,
                        link: Some(link.clone()),
                    })
                }
                _ => {}
            }
        }

        let unreferenced_tags = tags
            .all()
            .filter(|tag| !seen.contains(tag.name.as_str()))
            .map(|tag| UnreferencedTag {
                tag: tag.name.clone(),
                file: tag.source_file.clone(),
            })
            .collect();

        ValidationReport {
            total_rules: rules.len(),
            total_tags: tags.len(),
            referenced_tags: seen.len(),
            missing_tags,
            bad_names,
            clarification_issues,
            unreferenced_tags,
            lenient: policy.lenient,
        }
    }

    pub fn missing_tag_count(&self) -> usize {
        self.missing_tags.len()
    }

    pub fn bad_name_count(&self) -> usize {
        self.bad_names.len()
    }

    pub fn unreferenced_count(&self) -> usize {
        self.unreferenced_tags.len()
    }

    pub fn clarification_count(&self) -> usize {
        self.clarification_issues.len()
    }

    /// Whether the catalog may be handed to the report builders.
    ///
    /// Clarification findings are reported as errors but do not gate the run.
    pub fn is_passing(&self) -> bool {
        self.missing_tag_count() == 0
            && self.bad_name_count() == 0
            && (self.unreferenced_count() == 0 || self.lenient)
    }

    /// Emit one log event per finding.
    pub fn log_findings(&self) {
        for m in &self.missing_tags {
            error!(
                "Normative rule {} defined in file {} references non-existent tag {}",
                m.rule, m.file, m.tag
            );
        }
        for b in &self.bad_names {
            error!(
                "Normative rule {} defined in file {} starts with reserved prefix 'norm:'",
                b.rule, b.file
            );
        }
        for c in &self.clarification_issues {
            match c.problem {
                ClarificationProblem::TextWithoutLink => error!(
                    "Normative rule {} defined in file {} has clarification-text but no clarification-link",
                    c.rule, c.file
                ),
                ClarificationProblem::LinkNotAnIssue => error!(
                    "Normative rule {} defined in file {} has clarification-link {} that is not a GitHub issue",
                    c.rule,
                    c.file,
                    c.link.as_deref().unwrap_or_default()
                ),
            }
        }
        for u in &self.unreferenced_tags {
            if self.lenient {
                warn!("Tag {} in file {} not referenced by any normative rule", u.tag, u.file);
            } else {
                error!("Tag {} in file {} not referenced by any normative rule", u.tag, u.file);
            }
        }
    }
}
