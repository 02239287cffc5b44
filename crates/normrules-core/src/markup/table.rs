//! Pseudo-tables emitted by the tag extractor
//!
//! A table arrives as `heading\n===\nrow¶row¶row\n===`, with cells separated
//! by `|`.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

/// Rows rendered before the table is cut short with an ellipsis row.
pub const MAX_TABLE_ROWS: usize = 12;

const ROW_SEPARATOR: char = '¶';
const CELL_SEPARATOR: char = '|';

static TABLE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)(.*?)===\n(.+)\n===").expect("valid table regex"));

/// Split one row (or the heading) into trimmed cells.
///
/// An empty row has no cells; trailing empty cells are kept.
pub fn cells(row: &str) -> Vec<&str> {
    if row.is_empty() {
        return Vec::new();
    }
    row.split(CELL_SEPARATOR).map(str::trim).collect()
}

fn render_table(caps: &Captures) -> String {
    let heading = caps[1].trim_end_matches('\n');
    let body = &caps[2];

    let mut html = String::from("<table>");

    let heading_cells = cells(heading);
    if !heading_cells.is_empty() {
        html.push_str("<thead><tr>");
        for cell in heading_cells {
            html.push_str(&format!("<th>{cell}</th>"));
        }
        html.push_str("</tr></thead>");
    }

    html.push_str("<tbody>");
    for (index, row) in body.split(ROW_SEPARATOR).enumerate() {
        if index > MAX_TABLE_ROWS {
            break;
        }
        html.push_str("<tr>");
        for cell in cells(row) {
            if index < MAX_TABLE_ROWS {
                html.push_str(&format!("<td>{cell}</td>"));
            } else {
                html.push_str("<td>...</td>");
            }
        }
        html.push_str("</tr>");
    }
    html.push_str("</tbody></table>");

    html
}

/// Replace every pseudo-table in `text` with an HTML table.
pub fn expand_tables(text: &str) -> String {
    TABLE.replace_all(text, render_table).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_with_heading() {
        let text = "Name | Value\n===\na | 1¶b | 2\n===";
        assert_eq!(
            expand_tables(text),
            "<table><thead><tr><th>Name</th><th>Value</th></tr></thead>\
             <tbody><tr><td>a</td><td>1</td></tr><tr><td>b</td><td>2</td></tr></tbody></table>"
        );
    }

    #[test]
    fn empty_heading_has_no_thead() {
        let text = "===\nx|y\n===";
        assert_eq!(
            expand_tables(text),
            "<table><tbody><tr><td>x</td><td>y</td></tr></tbody></table>"
        );
    }

    #[test]
    fn trailing_empty_cells_are_kept() {
        assert_eq!(cells("a | b |"), ["a", "b", ""]);
        assert!(cells("").is_empty());
    }

    #[test]
    fn long_tables_are_truncated_with_ellipsis_row() {
        let rows: Vec<String> = (1..=15).map(|i| format!("r{i} | v{i}")).collect();
        let text = format!("===\n{}\n===", rows.join("¶"));
        let html = expand_tables(&text);

        assert_eq!(html.matches("<tr>").count(), 13);
        assert!(html.contains("<td>r12</td>"));
        assert!(!html.contains("r13"));
        assert!(html.ends_with("<tr><td>...</td><td>...</td></tr></tbody></table>"));
    }

    #[test]
    fn text_without_table_is_unchanged() {
        assert_eq!(expand_tables("plain == text"), "plain == text");
    }
}
