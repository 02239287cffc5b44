//! normrules-core - Core library for normative rule catalogs
//!
//! This crate provides the building blocks for:
//! - Collecting tags (named anchors extracted from a standard's documents)
//! - Collecting normative rule definitions that reference those tags
//! - Validating that every reference resolves and every tag is used
//! - Converting the AsciiDoc-flavored text of tags and rules to HTML
//! - Detecting tag changes between two extractions of the same document
//!
//! # Features
//!
//! - `parallel` - Read and parse source files in parallel (brings in `rayon`)
//!
//! # Building and validating a catalog
//!
//! ```
//! use normrules_core::{Catalog, RuleDefinition, RuleStore, TagStore, ValidationPolicy};
//!
//! let mut tags = TagStore::new();
//! tags.add("priv-tags.json", "norm:misa_mxl", "MXL encodes the native base ISA width").unwrap();
//! tags.add("priv-tags.json", "norm:misa_unused", "Never referenced").unwrap();
//!
//! let def: RuleDefinition = serde_yaml::from_str(
//!     "name: MISA_MXL\nimpl-def-behavior: true\ntags: [\"norm:misa_mxl\"]",
//! ).unwrap();
//! let mut rules = RuleStore::new();
//! rules.add_file("priv.yaml", "Machine-Level ISA", &[def]).unwrap();
//!
//! let catalog = Catalog::new(tags, rules);
//!
//! let strict = catalog.validate(ValidationPolicy::strict());
//! assert!(!strict.is_passing());
//! assert_eq!(strict.unreferenced_tags[0].tag, "norm:misa_unused");
//!
//! let lenient = catalog.validate(ValidationPolicy::lenient());
//! assert!(lenient.is_passing());
//! ```
//!
//! # Converting markup
//!
//! ```
//! use normrules_core::markup;
//!
//! assert_eq!(markup::convert("That is *strong* stuff!"), "That is <b>strong</b> stuff!");
//! assert_eq!(markup::convert("Sara**h**"), "Sara<b>h</b>");
//!
//! let html = markup::render_tag_text("See <<sec-x,here>>", "priv.html").unwrap();
//! assert_eq!(html, r#"See <a href="priv.html#sec-x">here</a>"#);
//! ```

mod catalog;
pub mod changes;
mod error;
pub mod markup;
mod names;
mod rules;
mod sources;
mod tags;
mod validate;

pub use catalog::Catalog;
pub use error::{CatalogError, MarkupError};
pub use names::{
    CLARIFICATION_LINK_PATTERN, IMPLDEF_NAME_PATTERN, ImplDefCategory, NORM_PREFIX,
    NORM_RULE_NAME_PATTERN, RuleKind, check_rule_name, is_clarification_link, is_reserved_name,
    name_pattern,
};
pub use rules::{Rule, RuleDefinition, RuleStore, TagRefEntry, TagReference};
pub use sources::{
    DefinitionFile, TagFile, load_catalog, load_definitions, load_tags, parse_definition_file,
    parse_tag_file,
};
pub use tags::{Tag, TagStore};
pub use validate::{
    BadRuleName, ClarificationIssue, ClarificationProblem, MissingTag, UnreferencedTag,
    ValidationPolicy, ValidationReport,
};
