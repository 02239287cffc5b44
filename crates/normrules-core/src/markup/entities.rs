//! Character entity cleanup

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

static ESCAPED_NAMED: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"&amp;(\w+);").expect("valid entity regex"));
static ESCAPED_DECIMAL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"&amp;#(\d+);").expect("valid entity regex"));
static ESCAPED_HEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"&amp;#x([0-9a-fA-F]+);").expect("valid entity regex"));
static NAMED: Lazy<Regex> = Lazy::new(|| Regex::new(r"&(\w+);").expect("valid entity regex"));

/// Undo a second round of ampersand escaping applied by the tag extractor.
///
/// `&amp;ne;` becomes `&ne;`, `&amp;#8800;` becomes `&#8800;` and
/// `&amp;#x2260;` becomes `&#x2260;`.
pub fn repair_escaped(text: &str) -> String {
    let text = ESCAPED_NAMED.replace_all(text, "&${1};");
    let text = ESCAPED_DECIMAL.replace_all(&text, "&#${1};");
    ESCAPED_HEX.replace_all(&text, "&#x${1};").into_owned()
}

/// Code point for a supported named entity.
pub fn code_point(name: &str) -> Option<u32> {
    let cp = match name {
        "ge" => 8805,
        "le" => 8804,
        "ne" => 8800,
        "equiv" => 8801,
        "lt" => 60,
        "gt" => 62,
        "amp" => 38,
        "quot" => 34,
        "apos" => 39,
        "nbsp" => 160,
        "times" => 215,
        "divide" => 247,
        "plusmn" => 177,
        "deg" => 176,
        "micro" => 181,
        "para" => 182,
        "middot" => 183,
        "raquo" => 187,
        "laquo" => 171,
        "frac12" => 189,
        "frac14" => 188,
        "frac34" => 190,
        _ => return None,
    };
    Some(cp)
}

/// Rewrite known named entities as numeric ones; unknown names are left alone.
pub fn named_to_numeric(text: &str) -> String {
    NAMED
        .replace_all(text, |caps: &Captures| match code_point(&caps[1]) {
            Some(cp) => format!("&#{cp};"),
            None => caps[0].to_string(),
        })
        .into_owned()
}
