//! normrules - Build and validate normative rule catalogs
//!
//! Commands:
//! - normrules build -d rules.yaml -t doc-tags.json --tag2url doc-tags.json URL out.json
//! - normrules check -d rules.yaml -t doc-tags.json
//! - normrules diff reference-tags.json current-tags.json

use clap::{Args, Parser, Subcommand};
use eyre::{Result, WrapErr};
use normrules::output::{self, CatalogFormat, ReportFormat};
use normrules::{Inputs, TagUrls, config, load_and_validate};
use normrules_core::changes::{detect_changes, merge_additions};
use normrules_core::parse_tag_file;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

/// Build, validate and compare normative rule catalogs
#[derive(Parser, Debug)]
#[command(name = "normrules")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Log debug output (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

/// Sources shared by `build` and `check`
#[derive(Args, Debug)]
struct SourceArgs {
    /// Normative rule definition file (YAML), repeatable
    #[arg(short = 'd', long = "def", value_name = "FILE")]
    definitions: Vec<PathBuf>,

    /// Normative tag file (JSON), repeatable
    #[arg(short = 't', long = "tag", value_name = "FILE")]
    tags: Vec<PathBuf>,

    /// Only warn about tags no rule references
    #[arg(short = 'w', long = "warn-unreferenced")]
    warn_unreferenced: bool,

    /// Path to config file (default: normrules.yaml if present)
    #[arg(short = 'c', long)]
    config: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Validate the catalog and write it as JSON or HTML
    Build {
        #[command(flatten)]
        sources: SourceArgs,

        /// URL of the document a tag file was extracted from, repeatable
        #[arg(long = "tag2url", num_args = 2, value_names = ["TAG_FILE", "URL"])]
        tag2url: Vec<String>,

        /// Write an HTML page
        #[arg(long, conflicts_with = "json")]
        html: bool,

        /// Write JSON (default)
        #[arg(long)]
        json: bool,

        /// Output file
        output: PathBuf,
    },

    /// Validate the catalog and print a summary
    Check {
        #[command(flatten)]
        sources: SourceArgs,

        /// Summary format
        #[arg(long, value_enum, default_value_t = ReportFormat::Text)]
        format: ReportFormat,
    },

    /// Compare two tag files and report added, deleted and modified tags
    Diff {
        /// Tag file to compare against
        reference: PathBuf,

        /// Freshly extracted tag file
        current: PathBuf,

        /// Merge added tags into the reference file
        #[arg(short = 'u', long = "update-reference")]
        update_reference: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Command::Build {
            sources,
            tag2url,
            html,
            json: _,
            output,
        } => {
            let format = if html {
                CatalogFormat::Html
            } else {
                CatalogFormat::Json
            };
            run_build(&sources, &tag2url, format, &output)
        }
        Command::Check { sources, format } => run_check(&sources, format),
        Command::Diff {
            reference,
            current,
            update_reference,
        } => run_diff(&reference, &current, update_reference, cli.verbose),
    }
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// Config file entries first, then command-line arguments.
fn gather_inputs(sources: &SourceArgs, tag2url: &[String]) -> Result<Inputs> {
    let mut inputs = match config::find_config(sources.config.as_deref())? {
        Some((config, base)) => {
            info!("Using config relative to {}", base.display());
            Inputs::from_config(&config, &base)
        }
        None => Inputs::default(),
    };

    inputs.definitions.extend(sources.definitions.iter().cloned());
    inputs.tags.extend(sources.tags.iter().cloned());
    for (tag_file, url) in TagUrls::from_pairs(tag2url)?.iter() {
        inputs.tag_urls.insert(tag_file, url);
    }
    inputs.lenient |= sources.warn_unreferenced;
    Ok(inputs)
}

fn run_build(
    sources: &SourceArgs,
    tag2url: &[String],
    format: CatalogFormat,
    output_path: &Path,
) -> Result<()> {
    let inputs = gather_inputs(sources, tag2url)?;
    if inputs.tag_urls.is_empty() {
        eyre::bail!("Missing tag file to URL mapping: pass --tag2url or give each tag file a url in the config");
    }

    let (catalog, report) = load_and_validate(&inputs)?;
    if !report.is_passing() {
        error!("Validation failed; not writing {}", output_path.display());
        std::process::exit(1);
    }

    let rendered = output::render_catalog(&catalog, &inputs.tag_urls, format)
        .wrap_err_with(|| format!("Failed to build {}", output_path.display()))?;
    std::fs::write(output_path, rendered)
        .wrap_err_with(|| format!("Failed to write {}", output_path.display()))?;

    info!(
        "Wrote {} normative rules to {}",
        catalog.rules.len(),
        output_path.display()
    );
    Ok(())
}

fn run_check(sources: &SourceArgs, format: ReportFormat) -> Result<()> {
    let inputs = gather_inputs(sources, &[])?;
    let (_catalog, report) = load_and_validate(&inputs)?;

    print!("{}", output::render_report(&report, format));

    if !report.is_passing() {
        std::process::exit(1);
    }
    Ok(())
}

fn read_tags(path: &Path) -> Result<BTreeMap<String, String>> {
    let content = std::fs::read_to_string(path)
        .wrap_err_with(|| format!("Failed to read {}", path.display()))?;
    let file = parse_tag_file(&path.display().to_string(), &content)?;
    Ok(file.tags.into_iter().collect())
}

fn run_diff(reference: &Path, current: &Path, update_reference: bool, verbose: bool) -> Result<()> {
    let reference_tags = read_tags(reference)?;
    let current_tags = read_tags(current)?;
    let changes = detect_changes(&reference_tags, &current_tags);

    print!(
        "{}",
        output::text::render_changes(reference, current, &changes, verbose)
    );

    if update_reference && !changes.added.is_empty() {
        let (before, after) = merge_additions(reference, &changes)?;
        info!(
            "Updated {}: {} tags before, {} after",
            reference.display(),
            before,
            after
        );
    }

    if changes.has_breaking_changes() {
        error!("Deleted or modified tags found; existing rule references may be stale");
        std::process::exit(1);
    }
    Ok(())
}
