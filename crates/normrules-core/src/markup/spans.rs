//! Inline formatting spans: bold, italic, monospace, super/subscript, underline

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

/// A paired formatting delimiter and the HTML element it becomes.
#[derive(Debug, Clone, Copy)]
struct Span {
    delim: char,
    element: &'static str,
}

const BOLD: Span = Span {
    delim: '*',
    element: "b",
};
const ITALIC: Span = Span {
    delim: '_',
    element: "i",
};
const MONOSPACE: Span = Span {
    delim: '`',
    element: "code",
};

const SPANS: [Span; 3] = [BOLD, ITALIC, MONOSPACE];

/// Characters allowed right after a constrained closing delimiter.
const CLOSE_PUNCTUATION: &[char] = &[',', ';', '"', '.', '?', '!'];

static UNCONSTRAINED_BOLD: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\*\*(.+?)\*\*").expect("valid bold regex"));
static UNCONSTRAINED_ITALIC: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"__(.+?)__").expect("valid italic regex"));
static UNCONSTRAINED_MONOSPACE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"``(.+?)``").expect("valid monospace regex"));

static SUPERSCRIPT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\^(\S+?)\^").expect("valid superscript regex"));
static SUBSCRIPT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"~(\S+?)~").expect("valid subscript regex"));
static UNDERLINE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\[\.underline\]#([^#]+)#").expect("valid underline regex"));

fn unconstrained_regex(span: Span) -> &'static Regex {
    match span.delim {
        '*' => &*UNCONSTRAINED_BOLD,
        '_' => &*UNCONSTRAINED_ITALIC,
        _ => &*UNCONSTRAINED_MONOSPACE,
    }
}

fn wrap(element: &str, content: &str) -> String {
    format!("<{element}>{content}</{element}>")
}

/// Formatting inside an already captured span.
fn nested(content: &str) -> String {
    constrained(&unconstrained(content))
}

fn unconstrained_span(text: &str, span: Span) -> String {
    unconstrained_regex(span)
        .replace_all(text, |caps: &Captures| wrap(span.element, &nested(&caps[1])))
        .into_owned()
}

/// Double-delimiter spans (`**b**`, `__i__`, ``` ``m`` ```), usable mid-word.
pub fn unconstrained(text: &str) -> String {
    SPANS
        .iter()
        .fold(text.to_string(), |acc, &span| unconstrained_span(&acc, span))
}

/// Single-delimiter spans (`*b*`, `_i_`, `` `m` ``), which must stand as whole words.
pub fn constrained(text: &str) -> String {
    SPANS
        .iter()
        .fold(text.to_string(), |acc, &span| constrained_span(&acc, span))
}

fn constrained_span(text: &str, span: Span) -> String {
    let mut out = String::with_capacity(text.len());
    let mut copied = 0;
    let mut i = 0;

    while i < text.len() {
        let Some(c) = text[i..].chars().next() else {
            break;
        };

        if c == span.delim && opens_at(text, i) {
            let content_start = i + c.len_utf8();
            if let Some(close) = find_close(text, content_start, span.delim) {
                out.push_str(&text[copied..i]);
                out.push_str(&wrap(span.element, &nested(&text[content_start..close])));
                i = close + span.delim.len_utf8();
                copied = i;
                continue;
            }
        }

        i += c.len_utf8();
    }

    out.push_str(&text[copied..]);
    out
}

/// An opening delimiter sits at the start of the text or right after whitespace.
fn opens_at(text: &str, i: usize) -> bool {
    text[..i].chars().next_back().is_none_or(char::is_whitespace)
}

/// Find the shortest valid closing delimiter for content starting at `start`.
///
/// Content is non-empty, starts and ends with non-whitespace and stays on one
/// line. The closing delimiter must be followed by end of text, whitespace or
/// sentence punctuation.
fn find_close(text: &str, start: usize, delim: char) -> Option<usize> {
    let rest = &text[start..];
    let first = rest.chars().next()?;
    if first.is_whitespace() {
        return None;
    }

    let mut prev = first;
    for (offset, c) in rest.char_indices().skip(1) {
        if c == '\n' {
            return None;
        }
        if c == delim && !prev.is_whitespace() {
            let close = start + offset;
            if closes_at(text, close + delim.len_utf8()) {
                return Some(close);
            }
        }
        prev = c;
    }
    None
}

fn closes_at(text: &str, after: usize) -> bool {
    match text[after..].chars().next() {
        None => true,
        Some(c) => c.is_whitespace() || CLOSE_PUNCTUATION.contains(&c),
    }
}

/// `2^32^` becomes `2<sup>32</sup>`.
pub fn superscript(text: &str) -> String {
    SUPERSCRIPT.replace_all(text, "<sup>${1}</sup>").into_owned()
}

/// `X~i~` becomes `X<sub>i</sub>`.
pub fn subscript(text: &str) -> String {
    SUBSCRIPT.replace_all(text, "<sub>${1}</sub>").into_owned()
}

pub fn underline(text: &str) -> String {
    UNDERLINE
        .replace_all(text, r#"<span class="underline">${1}</span>"#)
        .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constrained_needs_word_boundaries() {
        assert_eq!(constrained("a*b*c"), "a*b*c");
        assert_eq!(
            constrained("That is *strong* stuff!"),
            "That is <b>strong</b> stuff!"
        );
        assert_eq!(constrained("*strong*"), "<b>strong</b>");
        assert_eq!(constrained("This is *strong*!"), "This is <b>strong</b>!");
        assert_eq!(constrained("say \"_this_\""), "say \"_this_\"");
    }

    #[test]
    fn constrained_rejects_padded_content() {
        assert_eq!(constrained("a * b * c"), "a * b * c");
        assert_eq!(constrained("x *b * y"), "x *b * y");
        assert_eq!(constrained("x ** y"), "x ** y");
    }

    #[test]
    fn constrained_does_not_cross_lines() {
        assert_eq!(constrained("*one\ntwo*"), "*one\ntwo*");
    }

    #[test]
    fn constrained_extends_past_invalid_closers() {
        // The first `*` is followed by `b`, so the span runs to the next one
        assert_eq!(constrained("*a*b* done"), "<b>a*b</b> done");
    }

    #[test]
    fn constrained_single_character_content() {
        assert_eq!(constrained("set `x` now"), "set <code>x</code> now");
        assert_eq!(constrained("an _i_."), "an <i>i</i>.");
    }

    #[test]
    fn unconstrained_works_mid_word() {
        assert_eq!(unconstrained("Sara**h**"), "Sara<b>h</b>");
        assert_eq!(unconstrained("**man**ual"), "<b>man</b>ual");
        assert_eq!(unconstrained("x``y``z"), "x<code>y</code>z");
    }

    #[test]
    fn spans_nest() {
        assert_eq!(
            unconstrained("**bold _and italic_**"),
            "<b>bold <i>and italic</i></b>"
        );
        assert_eq!(
            constrained("a *bold `code`* b"),
            "a <b>bold <code>code</code></b> b"
        );
    }

    #[test]
    fn continuous_spans_have_no_whitespace() {
        assert_eq!(superscript("2^32^"), "2<sup>32</sup>");
        assert_eq!(superscript("a ^b c^"), "a ^b c^");
        assert_eq!(subscript("X~i~"), "X<sub>i</sub>");
    }

    #[test]
    fn underline_role() {
        assert_eq!(
            underline("[.underline]#must#"),
            r#"<span class="underline">must</span>"#
        );
    }
}
