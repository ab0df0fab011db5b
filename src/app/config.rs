use crate::app::errors::ConfigurationError;
use crate::app::models::{Configuration, ExclusionMode};
use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

/// Contents of `~/.config/code_slicer/exclusions.toml`.
#[derive(Deserialize, Debug, Clone, Default, PartialEq)]
pub struct ExclusionPresets {
    #[serde(default)]
    pub mode: ExclusionMode,
    #[serde(default)]
    pub patterns: Vec<String>,
}

fn presets_path() -> Result<PathBuf> {
    let home = dirs::home_dir().context("Could not determine home directory")?;
    Ok(home
        .join(".config")
        .join("code_slicer")
        .join("exclusions.toml"))
}

/// Reads a presets file. A missing file means "no presets".
pub fn load_exclusion_presets_from(path: &Path) -> Result<Option<ExclusionPresets>> {
    if !path.exists() {
        return Ok(None);
    }

    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read exclusion presets at {:?}", path))?;
    let presets: ExclusionPresets = toml::from_str(&content)
        .with_context(|| format!("Failed to parse exclusion presets at {:?}", path))?;

    log::debug!(
        "Loaded {} exclusion pattern(s) from {:?} (mode: {:?})",
        presets.patterns.len(),
        path,
        presets.mode
    );
    Ok(Some(presets))
}

/// Applies the user's exclusion presets, if any, on top of the parsed configuration.
pub fn resolve_config(config: Configuration) -> Result<Configuration> {
    let presets = load_exclusion_presets_from(&presets_path()?)?;
    Ok(apply_presets(config, presets))
}

fn apply_presets(config: Configuration, presets: Option<ExclusionPresets>) -> Configuration {
    match presets {
        Some(presets) => config.with_exclusions(presets.patterns, presets.mode),
        None => config,
    }
}

/// Checks the solution path, then the root specification; stops at the first failure.
///
/// The root specification is only required to be non-blank. Whether the file,
/// member or route it names exists is decided when the root is resolved.
pub fn validate(config: &Configuration) -> Result<(), ConfigurationError> {
    let solution = config.solution_path();
    if solution.as_os_str().to_string_lossy().trim().is_empty() || !solution.is_file() {
        return Err(ConfigurationError::MissingOrInvalidSolution {
            path: solution.to_path_buf(),
        });
    }

    if config.root_spec().trim().is_empty() {
        return Err(ConfigurationError::MissingRootSpecification);
    }

    Ok(())
}
