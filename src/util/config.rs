//! Configuration file support for wireup.
//!
//! Two locations are read:
//! - Global: `<platform config dir>/config.toml` - user-wide defaults
//! - Project: `wireup.toml`, found by searching upward from the working
//!   directory
//!
//! Project config takes precedence over global config, and command-line
//! flags take precedence over both.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::resolver::ResolveOptions;
use crate::synth::{SynthOptions, DEFAULT_FILE_NAME, DEFAULT_OUTPUT_DIR, DEFAULT_SPLIT_THRESHOLD};

/// Name of the project config file.
pub const CONFIG_FILE: &str = "wireup.toml";

/// Descriptor file read when nothing else is configured.
pub const DEFAULT_DESCRIPTORS: &str = "wireup.descriptors.json";

/// wireup configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub input: InputConfig,
    pub output: OutputConfig,
    pub resolution: ResolutionConfig,
    pub defaults: DefaultsConfig,
}

/// Where descriptors come from.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InputConfig {
    /// Descriptor file, or a directory of `*.json` files
    pub descriptors: Option<PathBuf>,
}

/// Where and how generated units are written.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub dir: Option<PathBuf>,
    pub file_name: Option<String>,
    /// Group count at which output is split per group
    pub split_threshold: Option<usize>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolutionConfig {
    /// Break same-name ties by source-directory proximity
    pub colocated_tiebreak: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DefaultsConfig {
    /// Literal used for unmanaged `string` slots
    pub string_placeholder: Option<String>,
}

impl Config {
    /// Load configuration from a file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file: {}", path.display()))?;

        toml::from_str(&contents)
            .with_context(|| format!("failed to parse config file: {}", path.display()))
    }

    /// Load configuration with fallback to defaults if file doesn't exist.
    pub fn load_or_default(path: &Path) -> Self {
        if path.exists() {
            Self::load(path).unwrap_or_else(|e| {
                tracing::warn!("Failed to load config from {}: {:#}", path.display(), e);
                Self::default()
            })
        } else {
            Self::default()
        }
    }

    /// Merge another config into this one (other takes precedence).
    pub fn merge(&mut self, other: Config) {
        if other.input.descriptors.is_some() {
            self.input.descriptors = other.input.descriptors;
        }

        if other.output.dir.is_some() {
            self.output.dir = other.output.dir;
        }
        if other.output.file_name.is_some() {
            self.output.file_name = other.output.file_name;
        }
        if other.output.split_threshold.is_some() {
            self.output.split_threshold = other.output.split_threshold;
        }

        if other.resolution.colocated_tiebreak.is_some() {
            self.resolution.colocated_tiebreak = other.resolution.colocated_tiebreak;
        }

        if other.defaults.string_placeholder.is_some() {
            self.defaults.string_placeholder = other.defaults.string_placeholder;
        }
    }

    /// Resolve relative paths in this config against `base`.
    pub fn rebase(&mut self, base: &Path) {
        if let Some(path) = self.input.descriptors.take() {
            self.input.descriptors = Some(base.join(path));
        }
        if let Some(dir) = self.output.dir.take() {
            self.output.dir = Some(base.join(dir));
        }
    }

    pub fn descriptors(&self) -> PathBuf {
        self.input
            .descriptors
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DESCRIPTORS))
    }

    pub fn resolve_options(&self) -> ResolveOptions {
        ResolveOptions {
            colocated_tiebreak: self.resolution.colocated_tiebreak.unwrap_or(false),
        }
    }

    pub fn synth_options(&self) -> SynthOptions {
        SynthOptions {
            output_dir: self
                .output
                .dir
                .clone()
                .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT_DIR)),
            file_name: self
                .output
                .file_name
                .clone()
                .unwrap_or_else(|| DEFAULT_FILE_NAME.to_string()),
            split_threshold: self.output.split_threshold.unwrap_or(DEFAULT_SPLIT_THRESHOLD),
            string_placeholder: self.defaults.string_placeholder.clone().unwrap_or_default(),
        }
    }
}

/// Load merged configuration from global and project locations.
///
/// Order of precedence (highest to lowest):
/// 1. Project config (wireup.toml)
/// 2. Global config
/// 3. Defaults
///
/// Relative paths in the project config are taken relative to the
/// directory containing it.
pub fn load_config(global_path: Option<&Path>, project_path: Option<&Path>) -> Config {
    let mut config = Config::default();

    if let Some(global_path) = global_path.filter(|p| p.exists()) {
        config.merge(Config::load_or_default(global_path));
    }

    if let Some(project_path) = project_path.filter(|p| p.exists()) {
        let mut project = Config::load_or_default(project_path);
        if let Some(root) = project_path.parent() {
            project.rebase(root);
        }
        config.merge(project);
    }

    config
}
