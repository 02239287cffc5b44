//! Cross-reference links (`<<anchor>>` and `<<anchor,text>>`)

use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::MarkupError;

static LINK: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(<<|&#60;&#60;)(.+?)(>>|&#62;&#62;)").expect("valid cross-reference regex")
});

/// HTML anchor pointing at `name` in `target` (the current page when `None`).
pub fn anchor_link(name: &str, text: &str, target: Option<&str>) -> String {
    format!(r#"<a href="{}#{name}">{text}</a>"#, target.unwrap_or(""))
}

/// Replace every cross-reference in `text` with an HTML link.
pub fn resolve_links(text: &str, target: Option<&str>) -> Result<String, MarkupError> {
    let mut out = String::with_capacity(text.len());
    let mut copied = 0;

    for caps in LINK.captures_iter(text) {
        let (Some(whole), Some(content)) = (caps.get(0), caps.get(2)) else {
            continue;
        };
        let content = content.as_str();
        let parts: Vec<&str> = content.split(',').map(str::trim).collect();

        let link = match parts.as_slice() {
            [name, ..] if name.is_empty() => {
                return Err(MarkupError::EmptyLink(content.to_string()));
            }
            [name] => anchor_link(name, name, target),
            [name, text] => anchor_link(name, text, target),
            _ => return Err(MarkupError::TooManyCommas(content.to_string())),
        };

        out.push_str(&text[copied..whole.start()]);
        out.push_str(&link);
        copied = whole.end();
    }

    out.push_str(&text[copied..]);
    Ok(out)
}
