//! Single-page HTML catalog
//!
//! Layout: a sidebar linking every table, a grand-total heading, one table per
//! chapter, then (when any exist) implementation-defined behaviors grouped by
//! category and by chapter.

use eyre::{Result, WrapErr};
use normrules_core::{Catalog, ImplDefCategory, Rule, markup};
use std::collections::BTreeMap;

use crate::TagUrls;

const NORM_RULES_CH_TABLE: &str = "table-norm-rules-ch-";
const IMPLDEFS_NO_CAT_TABLE: &str = "table-impldefs-no-cat";
const IMPLDEFS_CAT_TABLE: &str = "table-impldefs-impl-cat-";
const IMPLDEFS_CH_TABLE: &str = "table-impldefs-ch-";

const STYLE: &str = r#"    .underline { text-decoration: underline; }
    :root { --sidebar-width: 200px; --accent: #0366d6; --muted: #6b7280; --bg: #f8fafc; --card: #ffffff; }
    html { scroll-behavior: smooth; }
    body { font-family: system-ui, -apple-system, Segoe UI, Roboto, Helvetica, Arial, sans-serif; margin: 0; background: var(--bg); color: #111; }
    .app { display: grid; grid-template-columns: var(--sidebar-width) 1fr; min-height: 100vh; }
    .sidebar { position: sticky; top: 0; height: 100vh; padding: 24px; box-sizing: border-box; overflow-y: auto; background: linear-gradient(180deg, #ffffff, #f1f5f9); border-right: 1px solid rgba(15, 23, 42, 0.04); }
    .sidebar h2 { margin: 0 0 2px; font-size: 18px; }
    .nav { display: flex; flex-direction: column; gap: 2px; }
    .nav a { display: block; font-size: 14px; padding: 2px 10px; border-radius: 6px; text-decoration: none; color: var(--accent); font-weight: 600; }
    .nav a.active { background: rgba(3, 102, 214, 0.12); }
    main { padding: 28px 36px; }
    .section { background: var(--card); border-radius: 12px; padding: 20px; margin-bottom: 22px; }
    .grand-total-heading { font-size: 24px; font-weight: bold; }
    table { border-collapse: collapse; margin-top: 12px; table-layout: auto; }
    th, td { padding: 10px 12px; border: 1px solid #e6edf3; text-align: left; overflow-wrap: break-word; white-space: normal; }
    th { background: #f3f7fb; font-weight: 700; }
    table caption.sticky-caption { position: sticky; top: 0; z-index: 20; background: #ffffff; padding: 8px 12px; font-weight: bold; text-align: left; border-bottom: 1px solid #e6edf3; white-space: nowrap; }
    table thead th { position: sticky; top: 38px; z-index: 10; }
    .col-name { width: 20%; }
    .col-description { width: 60%; }
    .col-location { width: 20%; }
    @media (max-width: 820px) {
      .app { grid-template-columns: 1fr; }
      .sidebar { position: relative; height: auto; border-right: none; }
      main { padding: 18px; }
    }
"#;

const SCRIPT: &str = r#"  <script>
    const links = document.querySelectorAll('.nav a');
    const observer = new IntersectionObserver(entries => {
      for (const entry of entries) {
        if (!entry.isIntersecting) continue;
        links.forEach(a => a.classList.remove('active'));
        const link = document.querySelector('.nav a[data-target="' + entry.target.id + '"]');
        if (link) link.classList.add('active');
      }
    }, { rootMargin: '-40% 0px -40% 0px' });
    document.querySelectorAll('section[id]').forEach(s => observer.observe(s));
  </script>
"#;

/// Which cells a table shows for each rule.
#[derive(Debug, Clone, Copy)]
struct RowLayout {
    /// Chapter tables own the anchor; other tables link back to it
    name_is_anchor: bool,
    omit_impl_def: bool,
    omit_category: bool,
}

const CHAPTER_ROWS: RowLayout = RowLayout {
    name_is_anchor: true,
    omit_impl_def: false,
    omit_category: false,
};

const IMPL_DEF_ROWS: RowLayout = RowLayout {
    name_is_anchor: false,
    omit_impl_def: true,
    omit_category: false,
};

const CATEGORY_ROWS: RowLayout = RowLayout {
    name_is_anchor: false,
    omit_impl_def: true,
    omit_category: true,
};

/// Rules grouped the ways the page presents them.
struct Groups<'a> {
    /// Sorted; a chapter's table number is its index plus one
    chapters: Vec<&'a str>,
    by_chapter: BTreeMap<&'a str, Vec<&'a Rule>>,
    impl_defs_by_chapter: BTreeMap<&'a str, Vec<&'a Rule>>,
    no_category: Vec<&'a Rule>,
    by_category: Vec<(ImplDefCategory, Vec<&'a Rule>)>,
}

impl<'a> Groups<'a> {
    fn new(rules: &'a [Rule]) -> Self {
        let mut by_chapter: BTreeMap<&str, Vec<&Rule>> = BTreeMap::new();
        let mut impl_defs_by_chapter: BTreeMap<&str, Vec<&Rule>> = BTreeMap::new();
        let mut no_category = Vec::new();
        let mut by_category: Vec<(ImplDefCategory, Vec<&Rule>)> = ImplDefCategory::ALL
            .iter()
            .map(|&cat| (cat, Vec::new()))
            .collect();

        for rule in rules {
            by_chapter.entry(rule.chapter.as_str()).or_default().push(rule);
            if !rule.is_impl_def {
                continue;
            }
            impl_defs_by_chapter
                .entry(rule.chapter.as_str())
                .or_default()
                .push(rule);
            match rule.impl_def_category {
                None => no_category.push(rule),
                Some(cat) => {
                    if let Some((_, list)) = by_category.iter_mut().find(|(c, _)| *c == cat) {
                        list.push(rule);
                    }
                }
            }
        }

        no_category.sort_by(|a, b| a.name.cmp(&b.name));
        for (_, list) in &mut by_category {
            list.sort_by(|a, b| a.name.cmp(&b.name));
        }

        Groups {
            chapters: by_chapter.keys().copied().collect(),
            by_chapter,
            impl_defs_by_chapter,
            no_category,
            by_category,
        }
    }

    fn any_impl_defs(&self) -> bool {
        !self.impl_defs_by_chapter.is_empty()
    }

    fn categories(&self) -> impl Iterator<Item = (ImplDefCategory, &[&'a Rule])> {
        self.by_category
            .iter()
            .filter(|(_, list)| !list.is_empty())
            .map(|(cat, list)| (*cat, list.as_slice()))
    }

    /// Chapters with impl-def rules, with their table number
    fn impl_def_chapters(&self) -> impl Iterator<Item = (usize, &'a str, &[&'a Rule])> {
        self.chapters.iter().enumerate().filter_map(|(i, chapter)| {
            self.impl_defs_by_chapter
                .get(chapter)
                .map(|list| (i + 1, *chapter, list.as_slice()))
        })
    }

    fn table_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = (1..=self.chapters.len())
            .map(|n| format!("{NORM_RULES_CH_TABLE}{n}"))
            .collect();
        if !self.no_category.is_empty() {
            ids.push(IMPLDEFS_NO_CAT_TABLE.to_string());
        }
        for (cat, _) in self.categories() {
            ids.push(format!("{IMPLDEFS_CAT_TABLE}{cat}"));
        }
        for (n, _, _) in self.impl_def_chapters() {
            ids.push(format!("{IMPLDEFS_CH_TABLE}{n}"));
        }
        ids
    }
}

fn plural(n: usize) -> &'static str {
    if n == 1 { "" } else { "s" }
}

/// Caption text such as "5 Normative Rules: Includes 2 Implementation-Defined
/// Behaviors (1 No Category, 1 WARL)".
pub fn counts_caption(rules: &[&Rule]) -> String {
    let total = rules.len();
    let mut caption = format!("{total} Normative Rule{}", plural(total));

    let impl_defs = rules.iter().filter(|r| r.is_impl_def).count();
    if impl_defs == 0 {
        return caption;
    }
    caption.push_str(&format!(
        ": Includes {impl_defs} Implementation-Defined Behavior{}",
        plural(impl_defs)
    ));

    let per_category: Vec<(ImplDefCategory, usize)> = ImplDefCategory::ALL
        .iter()
        .map(|&cat| {
            let count = rules
                .iter()
                .filter(|r| r.impl_def_category == Some(cat))
                .count();
            (cat, count)
        })
        .filter(|(_, count)| *count > 0)
        .collect();

    if !per_category.is_empty() {
        let categorized: usize = per_category.iter().map(|(_, n)| n).sum();
        let mut parts = vec![format!("{} No Category", impl_defs - categorized)];
        parts.extend(per_category.iter().map(|(cat, n)| format!("{n} {cat}")));
        caption.push_str(&format!(" ({})", parts.join(", ")));
    }
    caption
}

fn render_head(output: &mut String, table_ids: &[String]) {
    output.push_str("<!doctype html>\n<html lang=\"en\">\n<head>\n");
    output.push_str("  <meta charset=\"utf-8\" />\n");
    output.push_str("  <meta name=\"viewport\" content=\"width=device-width, initial-scale=1\" />\n");
    output.push_str("  <title>Normative Rules per Chapter</title>\n");
    output.push_str("  <style>\n");
    output.push_str(STYLE);
    for id in table_ids {
        output.push_str(&format!(
            "    #{id} > table {{ table-layout: fixed; width: 100% }}\n"
        ));
    }
    output.push_str("  </style>\n</head>\n");
}

fn nav_link(output: &mut String, id: &str, label: &str) {
    output.push_str(&format!(
        "      <a href=\"#{id}\" data-target=\"{id}\">{label}</a>\n"
    ));
}

fn render_sidebar(output: &mut String, groups: &Groups) {
    output.push_str("  <aside class=\"sidebar\">\n");
    output.push_str("    <h2>All Normative Rules</h2>\n");
    output.push_str("    <nav class=\"nav\" id=\"nav-chapters\">\n");
    for (i, chapter) in groups.chapters.iter().enumerate() {
        nav_link(output, &format!("{NORM_RULES_CH_TABLE}{}", i + 1), chapter);
    }
    output.push_str("    </nav>\n");

    if groups.any_impl_defs() {
        output.push_str("    <h2>Implementation-Defined Behaviors</h2>\n");
        output.push_str("    <nav class=\"nav\" id=\"nav-impldefs\">\n");
        if !groups.no_category.is_empty() {
            nav_link(output, IMPLDEFS_NO_CAT_TABLE, "No category");
        }
        for (cat, _) in groups.categories() {
            nav_link(
                output,
                &format!("{IMPLDEFS_CAT_TABLE}{cat}"),
                &format!("{cat} category"),
            );
        }
        for (n, chapter, _) in groups.impl_def_chapters() {
            nav_link(output, &format!("{IMPLDEFS_CH_TABLE}{n}"), chapter);
        }
        output.push_str("    </nav>\n");
    }
    output.push_str("  </aside>\n");
}

fn render_table(
    output: &mut String,
    id: &str,
    caption: &str,
    rules: &[&Rule],
    layout: RowLayout,
    catalog: &Catalog,
    urls: &TagUrls,
) -> Result<()> {
    output.push_str(&format!("      <section id=\"{id}\" class=\"section\">\n"));
    output.push_str("        <table>\n");
    output.push_str(&format!(
        "          <caption class=\"sticky-caption\">{caption}</caption>\n"
    ));
    output.push_str("          <colgroup>\n");
    output.push_str("            <col class=\"col-name\">\n");
    output.push_str("            <col class=\"col-description\">\n");
    output.push_str("            <col class=\"col-location\">\n");
    output.push_str("          </colgroup>\n");
    output.push_str("          <thead>\n");
    output.push_str(
        "            <tr><th>Rule Name</th><th>Rule Description</th><th>Origin of Description</th></tr>\n",
    );
    output.push_str("          </thead>\n");
    output.push_str("          <tbody>\n");
    for rule in rules {
        render_rule(output, rule, layout, catalog, urls)
            .wrap_err_with(|| format!("Failed to render normative rule {}", rule.name))?;
    }
    output.push_str("          </tbody>\n");
    output.push_str("        </table>\n");
    output.push_str("      </section>\n");
    Ok(())
}

/// The (content, origin) cell pairs shown for one rule.
fn rule_cells(
    rule: &Rule,
    layout: RowLayout,
    catalog: &Catalog,
    urls: &TagUrls,
) -> Result<Vec<(String, String)>> {
    let mut cells = Vec::new();

    for (value, property) in [
        (&rule.summary, "summary"),
        (&rule.note, "note"),
        (&rule.description, "description"),
    ] {
        if let Some(text) = value {
            cells.push((
                markup::render_definition_text(text)?,
                format!("Rule's \"{property}\" property"),
            ));
        }
    }

    if let Some(kind) = rule.kind {
        cells.push((kind.to_string(), "Rule's \"kind\" property".to_string()));
    }

    match rule.instances.as_slice() {
        [] => {}
        [one] => cells.push((one.clone(), "Rule's \"instance\" property".to_string())),
        many => cells.push((
            format!("[{}]", many.join(", ")),
            "Rule's \"instances\" property".to_string(),
        )),
    }

    if rule.is_impl_def && !layout.omit_impl_def {
        cells.push((
            "Implementation-defined behavior".to_string(),
            "Rule's property".to_string(),
        ));
    }

    if let Some(cat) = rule.impl_def_category.filter(|_| !layout.omit_category) {
        cells.push((
            cat.to_string(),
            "Implementation-defined behavior category".to_string(),
        ));
    }

    for tag_ref in &rule.tag_refs {
        let Some(tag) = catalog.tags.get(&tag_ref.name) else {
            eyre::bail!(
                "Normative rule {} defined in file {} references non-existent tag {}",
                rule.name,
                rule.source_file,
                tag_ref.name
            );
        };
        let url = urls.url_for(tag)?;

        let mut text = markup::render_tag_text(&tag.text, url)?;
        if text.trim().is_empty() {
            text = "(No text available)".to_string();
        }
        if tag_ref.is_context {
            text.insert_str(0, "[CONTEXT] ");
        }
        cells.push((text, markup::anchor_link(&tag.name, &tag.name, Some(url))));
    }

    if let Some(link) = &rule.clarification_link {
        let text = match &rule.clarification_text {
            Some(text) => markup::render_definition_text(text)?,
            None => "(No clarification text available)".to_string(),
        };
        cells.push((
            format!("[CLARIFICATION] {text}"),
            format!("<a href=\"{link}\">GitHub Issue</a>"),
        ));
    }

    Ok(cells)
}

fn render_rule(
    output: &mut String,
    rule: &Rule,
    layout: RowLayout,
    catalog: &Catalog,
    urls: &TagUrls,
) -> Result<()> {
    let mut cells = rule_cells(rule, layout, catalog, urls)?;
    if cells.is_empty() {
        cells.push((String::new(), String::new()));
    }

    let name = &rule.name;
    for (i, (content, origin)) in cells.iter().enumerate() {
        output.push_str("            <tr>\n");
        if i == 0 {
            let span = cells.len();
            if layout.name_is_anchor {
                output.push_str(&format!(
                    "              <td rowspan={span} id=\"{name}\">{name}</td>\n"
                ));
            } else {
                output.push_str(&format!(
                    "              <td rowspan={span}><a href=\"#{name}\">{name}</a></td>\n"
                ));
            }
        }
        output.push_str(&format!("              <td>{content}</td>\n"));
        output.push_str(&format!("              <td>{origin}</td>\n"));
        output.push_str("            </tr>\n");
    }
    Ok(())
}

/// Render the whole catalog as one HTML page.
pub fn render(catalog: &Catalog, urls: &TagUrls) -> Result<String> {
    let rules = catalog.rules.rules();
    let groups = Groups::new(rules);
    let all: Vec<&Rule> = rules.iter().collect();

    let mut output = String::new();
    render_head(&mut output, &groups.table_ids());
    output.push_str("<body>\n  <div class=\"app\">\n");
    render_sidebar(&mut output, &groups);
    output.push_str("    <main>\n");
    output.push_str(&format!(
        "      <h1 class=\"grand-total-heading\">{}</h1>\n",
        counts_caption(&all)
    ));

    for (i, chapter) in groups.chapters.iter().enumerate() {
        let chapter_rules = &groups.by_chapter[chapter];
        render_table(
            &mut output,
            &format!("{NORM_RULES_CH_TABLE}{}", i + 1),
            &format!("Chapter {chapter}: {}", counts_caption(chapter_rules)),
            chapter_rules,
            CHAPTER_ROWS,
            catalog,
            urls,
        )?;
    }

    if groups.any_impl_defs() {
        if !groups.no_category.is_empty() {
            render_table(
                &mut output,
                IMPLDEFS_NO_CAT_TABLE,
                &impl_def_caption("No Category (A-Z)", groups.no_category.len()),
                &groups.no_category,
                IMPL_DEF_ROWS,
                catalog,
                urls,
            )?;
        }

        for (cat, cat_rules) in groups.categories() {
            render_table(
                &mut output,
                &format!("{IMPLDEFS_CAT_TABLE}{cat}"),
                &impl_def_caption(&format!("{cat} Category (A-Z)"), cat_rules.len()),
                cat_rules,
                CATEGORY_ROWS,
                catalog,
                urls,
            )?;
        }

        for (n, chapter, chapter_rules) in groups.impl_def_chapters() {
            render_table(
                &mut output,
                &format!("{IMPLDEFS_CH_TABLE}{n}"),
                &impl_def_caption(&format!("Chapter {chapter}"), chapter_rules.len()),
                chapter_rules,
                IMPL_DEF_ROWS,
                catalog,
                urls,
            )?;
        }
    }

    output.push_str("    </main>\n  </div>\n");
    output.push_str(SCRIPT);
    output.push_str("</body>\n</html>\n");
    Ok(output)
}

fn impl_def_caption(prefix: &str, count: usize) -> String {
    format!("{prefix}: All {count} Implementation-Defined Behaviors")
}
