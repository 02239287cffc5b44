//! Rule naming conventions and the closed enumerations used by rule definitions.

use facet::Facet;
use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt::{Display, Formatter};

use crate::error::CatalogError;

/// Prefix reserved for tag names. Rule names must not use it.
pub const NORM_PREFIX: &str = "norm:";

/// Name pattern for ordinary normative rules.
pub const NORM_RULE_NAME_PATTERN: &str = r"^[a-zA-Z][a-zA-Z0-9_-]+$";

/// Name pattern for implementation-defined rules.
pub const IMPLDEF_NAME_PATTERN: &str = r"^[A-Z][A-Z0-9_]+$";

/// Clarification links must point at an issue in the RISC-V GitHub organization.
pub const CLARIFICATION_LINK_PATTERN: &str = r"^https://(www\.)?github\.com/riscv/.+/issues/[0-9]+$";

static NORM_RULE_NAME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(NORM_RULE_NAME_PATTERN).expect("valid rule name regex"));
static IMPLDEF_NAME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(IMPLDEF_NAME_PATTERN).expect("valid impl-def name regex"));
static CLARIFICATION_LINK_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(CLARIFICATION_LINK_PATTERN).expect("valid clarification link regex"));

/// What a rule's `instances` refer to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Facet)]
#[facet(rename_all = "snake_case")]
#[repr(u8)]
pub enum RuleKind {
    Extension,
    ExtensionDependency,
    Instruction,
    Csr,
    CsrField,
}

impl RuleKind {
    pub const ALL: [RuleKind; 5] = [
        RuleKind::Extension,
        RuleKind::ExtensionDependency,
        RuleKind::Instruction,
        RuleKind::Csr,
        RuleKind::CsrField,
    ];

    /// Parse a kind from its definition-file spelling
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "extension" => Some(RuleKind::Extension),
            "extension_dependency" => Some(RuleKind::ExtensionDependency),
            "instruction" => Some(RuleKind::Instruction),
            "csr" => Some(RuleKind::Csr),
            "csr_field" => Some(RuleKind::CsrField),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RuleKind::Extension => "extension",
            RuleKind::ExtensionDependency => "extension_dependency",
            RuleKind::Instruction => "instruction",
            RuleKind::Csr => "csr",
            RuleKind::CsrField => "csr_field",
        }
    }

    /// Comma-separated list of accepted spellings, for error messages
    pub fn allowed() -> String {
        join_allowed(Self::ALL.iter().map(Self::as_str))
    }
}

impl Display for RuleKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Category of an implementation-defined behavior.
#[allow(clippy::upper_case_acronyms)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Facet)]
#[repr(u8)]
pub enum ImplDefCategory {
    /// Write Any, Read Legal
    WARL,
    /// Write Legal, Read Legal
    WLRL,
}

impl ImplDefCategory {
    pub const ALL: [ImplDefCategory; 2] = [ImplDefCategory::WARL, ImplDefCategory::WLRL];

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "WARL" => Some(ImplDefCategory::WARL),
            "WLRL" => Some(ImplDefCategory::WLRL),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ImplDefCategory::WARL => "WARL",
            ImplDefCategory::WLRL => "WLRL",
        }
    }

    pub fn allowed() -> String {
        join_allowed(Self::ALL.iter().map(Self::as_str))
    }
}

impl Display for ImplDefCategory {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

fn join_allowed<'a>(names: impl Iterator<Item = &'a str>) -> String {
    names.collect::<Vec<_>>().join(",")
}

/// The name pattern that applies to a rule, selected by its impl-def flag.
pub fn name_pattern(is_impl_def: bool) -> &'static str {
    if is_impl_def {
        IMPLDEF_NAME_PATTERN
    } else {
        NORM_RULE_NAME_PATTERN
    }
}

/// Check a rule name against the pattern selected by `is_impl_def`.
pub fn check_rule_name(name: &str, is_impl_def: bool) -> Result<(), CatalogError> {
    let re = if is_impl_def {
        &*IMPLDEF_NAME_RE
    } else {
        &*NORM_RULE_NAME_RE
    };
    if re.is_match(name) {
        Ok(())
    } else {
        Err(CatalogError::BadNamePattern {
            rule: name.to_string(),
            pattern: name_pattern(is_impl_def),
        })
    }
}

/// Returns true if the name uses the prefix reserved for tags.
pub fn is_reserved_name(name: &str) -> bool {
    name.starts_with(NORM_PREFIX)
}

/// Returns true if `link` looks like a RISC-V GitHub issue link.
pub fn is_clarification_link(link: &str) -> bool {
    CLARIFICATION_LINK_RE.is_match(link)
}
