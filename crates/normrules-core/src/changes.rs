//! Detecting tag changes between two extractions of the same document
//!
//! Text is compared after collapsing whitespace and removing inline
//! formatting, so re-wrapping a paragraph or adding emphasis is not a change.

use eyre::{Result, WrapErr, eyre};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::BTreeMap;
use std::path::Path;

/// Display width for tag text in change reports.
pub const TRUNCATE_AT: usize = 100;

/// A tag present in both files whose normalized text differs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModifiedTag {
    pub reference: String,
    pub current: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagChanges {
    /// In current but not in reference
    pub added: BTreeMap<String, String>,
    /// In reference but not in current
    pub deleted: BTreeMap<String, String>,
    pub modified: BTreeMap<String, ModifiedTag>,
}

impl TagChanges {
    pub fn any_changes(&self) -> bool {
        !(self.added.is_empty() && self.deleted.is_empty() && self.modified.is_empty())
    }

    pub fn total_changes(&self) -> usize {
        self.added.len() + self.deleted.len() + self.modified.len()
    }

    /// Deletions and modifications invalidate existing rule references; additions don't.
    pub fn has_breaking_changes(&self) -> bool {
        !(self.deleted.is_empty() && self.modified.is_empty())
    }
}

/// Compare two tag sets.
pub fn detect_changes(
    reference: &BTreeMap<String, String>,
    current: &BTreeMap<String, String>,
) -> TagChanges {
    let mut changes = TagChanges::default();

    for (name, text) in current {
        match reference.get(name) {
            None => {
                changes.added.insert(name.clone(), text.clone());
            }
            Some(ref_text) if normalize_text(ref_text) != normalize_text(text) => {
                changes.modified.insert(
                    name.clone(),
                    ModifiedTag {
                        reference: ref_text.clone(),
                        current: text.clone(),
                    },
                );
            }
            Some(_) => {}
        }
    }

    for (name, text) in reference {
        if !current.contains_key(name) {
            changes.deleted.insert(name.clone(), text.clone());
        }
    }

    changes
}

static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("valid regex"));

fn compile_strip(patterns: &[(&str, &'static str)]) -> Vec<(Regex, &'static str)> {
    patterns
        .iter()
        .map(|&(pattern, rep)| (Regex::new(pattern).expect("valid strip regex"), rep))
        .collect()
}

/// Bold and unconstrained italic; removed before constrained italic.
static STRIP_EMPHASIS: Lazy<Vec<(Regex, &'static str)>> = Lazy::new(|| {
    compile_strip(&[
        (r"\*\*([^*]+?)\*\*", "${1}"),
        (r"\*([^*]+?)\*", "${1}"),
        (r"__([^_]+?)__", "${1}"),
    ])
});

/// Monospace, super/subscript, roles, cross-references and passthrough.
static STRIP_OTHER: Lazy<Vec<(Regex, &'static str)>> = Lazy::new(|| {
    compile_strip(&[
        (r"`([^`]+?)`", "${1}"),
        (r"\^([^\^]+?)\^", "${1}"),
        (r"~([^~]+?)~", "${1}"),
        (r"\[[^\]]+\]#([^#]+?)#", "${1}"),
        (r"&lt;&lt;[^,&]+,([^&]+)&gt;&gt;", "${1}"),
        (r"&lt;&lt;[^&]+&gt;&gt;", ""),
        (r"\+\+\+([^+]+?)\+\+\+", "${1}"),
    ])
});

/// Collapse whitespace runs and strip inline formatting.
pub fn normalize_text(text: &str) -> String {
    let collapsed = WHITESPACE.replace_all(text.trim(), " ");
    strip_formatting(&collapsed)
}

fn apply(text: String, patterns: &[(Regex, &'static str)]) -> String {
    patterns.iter().fold(text, |acc, (re, rep)| {
        re.replace_all(&acc, *rep).into_owned()
    })
}

fn strip_formatting(text: &str) -> String {
    let result = apply(text.to_string(), &STRIP_EMPHASIS);
    let result = strip_constrained_italic(&result);
    apply(result, &STRIP_OTHER).trim().to_string()
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// Remove `_x_` when neither underscore touches a word character on its outer side.
fn strip_constrained_italic(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut copied = 0;
    let mut i = 0;

    while let Some(offset) = text[i..].find('_') {
        let open = i + offset;
        let outer_ok = !text[..open].chars().next_back().is_some_and(is_word_char);
        let close = text[open + 1..].find('_').map(|o| open + 1 + o);

        match close {
            Some(close)
                if outer_ok
                    && close > open + 1
                    && !text[close + 1..].chars().next().is_some_and(is_word_char) =>
            {
                out.push_str(&text[copied..open]);
                out.push_str(&text[open + 1..close]);
                copied = close + 1;
                i = close + 1;
            }
            _ => i = open + 1,
        }
    }

    out.push_str(&text[copied..]);
    out
}

/// Shorten `text` to [`TRUNCATE_AT`] characters for display.
pub fn truncate(text: &str) -> String {
    match text.char_indices().nth(TRUNCATE_AT) {
        None => text.to_string(),
        Some((cut, _)) => format!("{}...", &text[..cut]),
    }
}

/// Merge added tags into the reference file, rewriting it as pretty JSON.
///
/// Returns the tag counts before and after the merge.
pub fn merge_additions(path: &Path, changes: &TagChanges) -> Result<(usize, usize)> {
    let content = std::fs::read_to_string(path)
        .wrap_err_with(|| format!("Failed to read {}", path.display()))?;
    let mut data: serde_json::Value = serde_json::from_str(&content)
        .wrap_err_with(|| format!("Failed to parse JSON from {}", path.display()))?;

    let tags = data
        .get_mut("tags")
        .and_then(serde_json::Value::as_object_mut)
        .ok_or_else(|| eyre!("{}: missing 'tags' object", path.display()))?;

    let before = tags.len();
    for (name, text) in &changes.added {
        tags.insert(name.clone(), serde_json::Value::String(text.clone()));
    }
    let after = tags.len();

    let json = serde_json::to_string_pretty(&data)?;
    std::fs::write(path, json).wrap_err_with(|| format!("Failed to write {}", path.display()))?;
    Ok((before, after))
}
