//! Typed errors for catalog construction and markup conversion

use thiserror::Error;

/// Structural error raised while building the tag or rule store.
///
/// These abort loading immediately; no partially built catalog is ever
/// handed to the validator.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CatalogError {
    /// A tag or rule name was registered twice.
    #[error("{what} name {name} in file {file} already defined in file {first_file}")]
    DuplicateName {
        /// "Tag" or "Normative rule"
        what: &'static str,
        name: String,
        file: String,
        first_file: String,
    },

    /// Input had the wrong shape (missing key, wrong container type, ...).
    #[error("{file}: {message}")]
    Schema { file: String, message: String },

    #[error(
        "Don't recognize kind '{value}' for normative rule {rule}\nAllowed kinds are: {allowed}"
    )]
    UnknownKind {
        rule: String,
        value: String,
        allowed: String,
    },

    #[error(
        "Don't recognize impl-def-category '{value}' for normative rule {rule}\nAllowed impl-def-categories are: {allowed}"
    )]
    UnknownImplDefCategory {
        rule: String,
        value: String,
        allowed: String,
    },

    #[error("Normative rule {rule} has impl-def-category property but impl-def-behavior isn't true")]
    CategoryWithoutImplDef { rule: String },

    #[error("Normative rule {rule} defines instances but no kind")]
    InstancesWithoutKind { rule: String },

    #[error("Normative rule '{rule}' doesn't match regex pattern '{pattern}'")]
    BadNamePattern { rule: String, pattern: &'static str },

    /// A referenced tag's source file has no URL mapping.
    #[error("No tag file to URL mapping for tag file {tag_file} (needed by tag {tag})")]
    MissingUrl { tag: String, tag_file: String },
}

impl CatalogError {
    pub(crate) fn schema(file: impl Into<String>, message: impl Into<String>) -> Self {
        CatalogError::Schema {
            file: file.into(),
            message: message.into(),
        }
    }
}

/// Malformed cross-reference syntax found during markup conversion.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MarkupError {
    #[error("Hyperlink '{0}' is empty")]
    EmptyLink(String),

    #[error("Hyperlink '{0}' contains too many commas")]
    TooManyCommas(String),
}
