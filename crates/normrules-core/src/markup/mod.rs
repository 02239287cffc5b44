//! AsciiDoc-flavored text to HTML
//!
//! [`convert`] runs a fixed, ordered list of passes ([`PIPELINE`]) over the
//! whole string. Order matters: double delimiters are handled before single
//! ones so `**x**` is not read as two empty constrained spans, and the
//! delimiter passes run before entity cleanup.
//!
//! Pseudo-tables, newlines and cross-reference links are handled after
//! conversion by [`render_definition_text`] and [`render_tag_text`].

mod entities;
mod links;
mod spans;
mod table;

pub use entities::{code_point, named_to_numeric, repair_escaped};
pub use links::{anchor_link, resolve_links};
pub use spans::{constrained, subscript, superscript, unconstrained, underline};
pub use table::{MAX_TABLE_ROWS, cells, expand_tables};

use crate::error::MarkupError;

/// A named, pure rewrite of the whole text.
pub type Pass = (&'static str, fn(&str) -> String);

/// Conversion passes, in the order [`convert`] applies them.
pub const PIPELINE: &[Pass] = &[
    ("unconstrained", unconstrained),
    ("constrained", constrained),
    ("superscript", superscript),
    ("subscript", subscript),
    ("underline", underline),
    ("repair_escaped", repair_escaped),
    ("named_to_numeric", named_to_numeric),
];

/// Convert inline markup to HTML.
pub fn convert(text: &str) -> String {
    PIPELINE
        .iter()
        .fold(text.to_string(), |acc, (_, pass)| pass(&acc))
}

pub fn newlines_to_breaks(text: &str) -> String {
    text.replace('\n', "<br>")
}

/// Render a rule's summary, note, description or clarification text.
///
/// Cross-references point into the current page.
pub fn render_definition_text(text: &str) -> Result<String, MarkupError> {
    render(text, None)
}

/// Render a tag's text; cross-references point into the tag's source document.
pub fn render_tag_text(text: &str, target: &str) -> Result<String, MarkupError> {
    render(text, Some(target))
}

fn render(text: &str, target: Option<&str>) -> Result<String, MarkupError> {
    let html = newlines_to_breaks(&expand_tables(&convert(text)));
    resolve_links(&html, target)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_text_is_unchanged() {
        assert_eq!(convert("hello"), "hello");
        assert_eq!(convert(""), "");
    }

    #[test]
    fn pipeline_order() {
        let names: Vec<&str> = PIPELINE.iter().map(|(name, _)| *name).collect();
        assert_eq!(
            names,
            [
                "unconstrained",
                "constrained",
                "superscript",
                "subscript",
                "underline",
                "repair_escaped",
                "named_to_numeric",
            ]
        );
    }

    #[test]
    fn convert_mixes_passes() {
        assert_eq!(
            convert("The *value* is 2^XLEN^ &amp;ge; x~0~"),
            "The <b>value</b> is 2<sup>XLEN</sup> &#8805; x<sub>0</sub>"
        );
        assert_eq!(convert("a*b*c"), "a*b*c");
        assert_eq!(convert("Sara**h**"), "Sara<b>h</b>");
        assert_eq!(convert("**a*b*c**"), "<b>a*b*c</b>");
    }

    #[test]
    fn unconstrained_runs_before_constrained() {
        assert_eq!(
            constrained(&unconstrained("**a*b*c**")),
            "<b>a*b*c</b>"
        );
        // Constrained first treats the outer pair as two single delimiters
        let reversed = unconstrained(&constrained("**a*b*c**"));
        assert_eq!(reversed, "<b><b>a*b*c</b></b>");
        assert_ne!(reversed, convert("**a*b*c**"));
    }

    #[test]
    fn tag_text_links_into_the_target_document() {
        let html = render_tag_text("See &lt;&lt;sec-csr,CSRs&gt;&gt;.\nDone", "priv.html").unwrap();
        assert_eq!(html, r#"See <a href="priv.html#sec-csr">CSRs</a>.<br>Done"#);
    }

    #[test]
    fn definition_text_links_stay_on_page() {
        let html = render_definition_text("Refer to <<MISA_MXL>>").unwrap();
        assert_eq!(html, r##"Refer to <a href="#MISA_MXL">MISA_MXL</a>"##);
    }

    #[test]
    fn render_propagates_link_errors() {
        assert!(matches!(
            render_definition_text("<<a,b,c>>"),
            Err(MarkupError::TooManyCommas(_))
        ));
    }

    #[test]
    fn render_expands_tables_before_breaking_lines() {
        let html = render_definition_text("H1|H2\n===\na| *b*\n===\nafter").unwrap();
        assert_eq!(
            html,
            "<table><thead><tr><th>H1</th><th>H2</th></tr></thead>\
             <tbody><tr><td>a</td><td><b>b</b></td></tr></tbody></table><br>after"
        );
    }
}
