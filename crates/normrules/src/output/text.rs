//! Terminal reports: the validation summary and the tag change report

use normrules_core::ValidationReport;
use normrules_core::changes::{TagChanges, truncate};
use owo_colors::OwoColorize;
use std::path::Path;

/// Render a validation report for `normrules check`.
pub fn render_validation(report: &ValidationReport) -> String {
    let mut output = String::new();

    output.push('\n');
    output.push_str(&format!("{} Normative Rule Validation\n", "##".bold()));
    output.push('\n');
    output.push_str(&format!(
        "Rules: {}  Tags: {} ({} referenced)\n",
        report.total_rules.to_string().cyan(),
        report.total_tags.to_string().cyan(),
        report.referenced_tags
    ));
    output.push('\n');

    if !report.missing_tags.is_empty() {
        output.push_str(&format!(
            "{} Missing Tags ({}):\n",
            "!".red().bold(),
            report.missing_tag_count()
        ));
        for m in &report.missing_tags {
            output.push_str(&format!(
                "  {} {} in {} references {}\n",
                "-".red(),
                m.rule,
                m.file.dimmed(),
                m.tag.yellow()
            ));
        }
        output.push('\n');
    }

    if !report.bad_names.is_empty() {
        output.push_str(&format!(
            "{} Reserved Rule Names ({}):\n",
            "!".red().bold(),
            report.bad_name_count()
        ));
        for b in &report.bad_names {
            output.push_str(&format!(
                "  {} {} in {}\n",
                "-".red(),
                b.rule.yellow(),
                b.file.dimmed()
            ));
        }
        output.push('\n');
    }

    if !report.clarification_issues.is_empty() {
        output.push_str(&format!(
            "{} Clarification Problems ({}):\n",
            "!".red().bold(),
            report.clarification_count()
        ));
        for c in &report.clarification_issues {
            let problem = match &c.link {
                None => "clarification-text without clarification-link".to_string(),
                Some(link) => format!("{link} is not a GitHub issue"),
            };
            output.push_str(&format!(
                "  {} {} in {}: {}\n",
                "-".red(),
                c.rule.yellow(),
                c.file.dimmed(),
                problem
            ));
        }
        output.push('\n');
    }

    if !report.unreferenced_tags.is_empty() {
        let marker = if report.lenient {
            "?".yellow().bold().to_string()
        } else {
            "!".red().bold().to_string()
        };
        output.push_str(&format!(
            "{} Unreferenced Tags ({}):\n",
            marker,
            report.unreferenced_count()
        ));
        for u in &report.unreferenced_tags {
            output.push_str(&format!(
                "  {} {} in {}\n",
                "-".yellow(),
                u.tag,
                u.file.dimmed()
            ));
        }
        output.push('\n');
    }

    if report.is_passing() {
        output.push_str(&format!("{} Catalog is valid\n", "OK".green().bold()));
    } else {
        output.push_str(&format!("{} Catalog has errors\n", "FAIL".red().bold()));
    }

    output
}

/// Render the result of comparing two tag files for `normrules diff`.
pub fn render_changes(
    reference: &Path,
    current: &Path,
    changes: &TagChanges,
    verbose: bool,
) -> String {
    let mut output = String::new();

    output.push_str(&format!("Reference file: {}\n", reference.display()));
    output.push_str(&format!("Current file: {}\n", current.display()));
    output.push('\n');

    if !changes.any_changes() {
        output.push_str(&format!("{}\n", "No changes detected.".green()));
        return output;
    }

    if !changes.added.is_empty() {
        output.push_str(&format!(
            "{} Added {} tag(s):\n",
            "+".green().bold(),
            changes.added.len()
        ));
        for (name, text) in &changes.added {
            output.push_str(&format!("  * \"{}\": \"{}\"\n", name.green(), truncate(text)));
        }
        output.push('\n');
    }

    if !changes.deleted.is_empty() {
        output.push_str(&format!(
            "{} Deleted {} tag(s):\n",
            "-".red().bold(),
            changes.deleted.len()
        ));
        for (name, text) in &changes.deleted {
            output.push_str(&format!("  * \"{}\": \"{}\"\n", name.red(), truncate(text)));
        }
        output.push('\n');
    }

    if !changes.modified.is_empty() {
        output.push_str(&format!(
            "{} Modified {} tag(s):\n",
            "~".yellow().bold(),
            changes.modified.len()
        ));
        for (name, modified) in &changes.modified {
            output.push_str(&format!("  * \"{}\":\n", name.yellow()));
            output.push_str(&format!(
                "      Reference: \"{}\"\n",
                truncate(&modified.reference)
            ));
            output.push_str(&format!(
                "      Current:   \"{}\"\n",
                truncate(&modified.current)
            ));
        }
        output.push('\n');
    }

    if verbose {
        output.push_str(&format!(
            "Summary: {} added, {} deleted, {} modified ({} total)\n",
            changes.added.len(),
            changes.deleted.len(),
            changes.modified.len(),
            changes.total_changes()
        ));
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use normrules_core::changes::ModifiedTag;
    use normrules_core::{MissingTag, UnreferencedTag};

    fn report() -> ValidationReport {
        ValidationReport {
            total_rules: 3,
            total_tags: 4,
            referenced_tags: 3,
            missing_tags: Vec::new(),
            bad_names: Vec::new(),
            clarification_issues: Vec::new(),
            unreferenced_tags: Vec::new(),
            lenient: false,
        }
    }

    #[test]
    fn clean_report_is_ok() {
        let out = render_validation(&report());
        assert!(out.contains("Normative Rule Validation"));
        assert!(out.contains("Catalog is valid"));
        assert!(!out.contains("Missing Tags"));
    }

    #[test]
    fn findings_are_listed_and_fail() {
        let mut report = report();
        report.missing_tags.push(MissingTag {
            rule: "r1".to_string(),
            tag: "norm:foo".to_string(),
            file: "defs.yaml".to_string(),
        });
        report.unreferenced_tags.push(UnreferencedTag {
            tag: "norm:unused".to_string(),
            file: "tags.json".to_string(),
        });

        let out = render_validation(&report);
        assert!(out.contains("Missing Tags (1):"));
        assert!(out.contains("norm:foo"));
        assert!(out.contains("Unreferenced Tags (1):"));
        assert!(out.contains("norm:unused"));
        assert!(out.contains("Catalog has errors"));
    }

    #[test]
    fn no_changes() {
        let out = render_changes(
            Path::new("old.json"),
            Path::new("new.json"),
            &TagChanges::default(),
            true,
        );
        assert!(out.starts_with("Reference file: old.json\nCurrent file: new.json\n"));
        assert!(out.contains("No changes detected."));
        assert!(!out.contains("Summary:"));
    }

    #[test]
    fn changes_are_grouped_and_truncated() {
        let mut changes = TagChanges::default();
        changes
            .added
            .insert("norm:new".to_string(), "x".repeat(150));
        changes
            .deleted
            .insert("norm:gone".to_string(), "bye".to_string());
        changes.modified.insert(
            "norm:edit".to_string(),
            ModifiedTag {
                reference: "old".to_string(),
                current: "new".to_string(),
            },
        );

        let out = render_changes(Path::new("a.json"), Path::new("b.json"), &changes, false);
        assert!(out.contains("Added 1 tag(s):"));
        assert!(out.contains(&format!("\"{}...\"", "x".repeat(100))));
        assert!(out.contains("Deleted 1 tag(s):"));
        assert!(out.contains("Modified 1 tag(s):"));
        assert!(out.contains("Reference: \"old\""));
        assert!(out.contains("Current:   \"new\""));
        assert!(!out.contains("Summary:"));

        let verbose = render_changes(Path::new("a.json"), Path::new("b.json"), &changes, true);
        assert!(verbose.contains("Summary: 1 added, 1 deleted, 1 modified (3 total)"));
    }
}
