//! Report builders for validated catalogs and validation results

pub mod html;
pub mod json;
pub mod text;

use eyre::Result;
use normrules_core::{Catalog, ValidationReport};

use crate::TagUrls;

/// Format of the catalog written by `normrules build`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CatalogFormat {
    #[default]
    Json,
    Html,
}

/// Format of the summary printed by `normrules check`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum ReportFormat {
    #[default]
    Text,
    Json,
}

/// Render a validated catalog.
pub fn render_catalog(catalog: &Catalog, urls: &TagUrls, format: CatalogFormat) -> Result<String> {
    match format {
        CatalogFormat::Json => json::render(catalog, urls),
        CatalogFormat::Html => html::render(catalog, urls),
    }
}

/// Render a validation report.
pub fn render_report(report: &ValidationReport, format: ReportFormat) -> String {
    match format {
        ReportFormat::Text => text::render_validation(report),
        ReportFormat::Json => {
            facet_json::to_string_pretty(report).expect("JSON serialization failed")
        }
    }
}
