//! Configuration schema for normrules
//!
//! Config lives at `normrules.yaml` in the working directory unless `-c` points
//! elsewhere. Paths inside it are relative to the config file.
//!
//! ```yaml
//! definitions:
//!   - rules/priv.yaml
//! tags:
//!   - path: build/priv-tags.json
//!     url: https://riscv.github.io/riscv-isa-manual/priv.html
//! warn_unreferenced: false
//! ```

use eyre::{Result, WrapErr};
use facet::Facet;
use std::path::{Path, PathBuf};

/// Default config file name, looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "normrules.yaml";

/// Root configuration
#[derive(Debug, Clone, Default, Facet)]
pub struct Config {
    /// Rule definition files (YAML)
    #[facet(default)]
    pub definitions: Vec<String>,

    /// Tag files (JSON) and the published documents they were extracted from
    #[facet(default)]
    pub tags: Vec<TagSource>,

    /// Report unreferenced tags as warnings instead of errors
    #[facet(default)]
    pub warn_unreferenced: bool,
}

/// One tag file
#[derive(Debug, Clone, Facet)]
pub struct TagSource {
    pub path: String,

    /// URL of the rendered document the tags link into
    #[facet(default)]
    pub url: Option<String>,
}

impl Config {
    /// Definition file paths, resolved against `base`.
    pub fn definition_paths(&self, base: &Path) -> Vec<PathBuf> {
        self.definitions.iter().map(|p| base.join(p)).collect()
    }

    /// Tag file paths, resolved against `base`.
    pub fn tag_paths(&self, base: &Path) -> Vec<PathBuf> {
        self.tags.iter().map(|t| base.join(&t.path)).collect()
    }
}

/// Load and parse a config file.
pub fn load_config(path: &Path) -> Result<Config> {
    if !path.exists() {
        eyre::bail!(
            "Config file not found at {}\n\n\
             Create a config file listing your sources:\n\n\
             definitions:\n  \
               - rules/chapter.yaml\n\
             tags:\n  \
               - path: build/doc-tags.json\n    \
                 url: https://example.org/doc.html",
            path.display()
        );
    }

    let content = std::fs::read_to_string(path)
        .wrap_err_with(|| format!("Failed to read config file: {}", path.display()))?;

    let config: Config = facet_yaml::from_str(&content)
        .wrap_err_with(|| format!("Failed to parse config file: {}", path.display()))?;

    Ok(config)
}

/// Load the config named by `-c`, or the default file if it exists.
///
/// Returns the config together with the directory its paths are relative to.
pub fn find_config(explicit: Option<&Path>) -> Result<Option<(Config, PathBuf)>> {
    let path = match explicit {
        Some(path) => path.to_path_buf(),
        None => {
            let default = PathBuf::from(DEFAULT_CONFIG_FILE);
            if !default.exists() {
                return Ok(None);
            }
            default
        }
    };

    let config = load_config(&path)?;
    let base = path
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."));
    Ok(Some((config, base)))
}
