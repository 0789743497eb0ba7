//! Global context for wireup operations.
//!
//! Provides centralized access to the working directory, config locations
//! and output settings.

use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use anyhow::{Context, Result};
use directories::ProjectDirs;

use crate::util::config::{load_config, Config, CONFIG_FILE};

/// Project directories for wireup
static PROJECT_DIRS: LazyLock<Option<ProjectDirs>> =
    LazyLock::new(|| ProjectDirs::from("com", "wireup", "wireup"));

/// Global context containing configuration paths and output settings.
#[derive(Debug, Clone)]
pub struct GlobalContext {
    /// Current working directory
    cwd: PathBuf,

    /// Directory holding the global config, if the platform has one
    config_dir: Option<PathBuf>,

    verbose: bool,

    color: bool,
}

impl GlobalContext {
    /// Create a new GlobalContext rooted at the process working directory.
    pub fn new() -> Result<Self> {
        let cwd = std::env::current_dir().context("failed to get current directory")?;
        Ok(Self::with_cwd(cwd))
    }

    /// Create a GlobalContext with a specific working directory.
    pub fn with_cwd(cwd: PathBuf) -> Self {
        GlobalContext {
            cwd,
            config_dir: PROJECT_DIRS.as_ref().map(|d| d.config_dir().to_path_buf()),
            verbose: false,
            color: true,
        }
    }

    /// Use a different global config directory (or none).
    pub fn with_config_dir(mut self, dir: Option<PathBuf>) -> Self {
        self.config_dir = dir;
        self
    }

    pub fn set_verbose(&mut self, verbose: bool) {
        self.verbose = verbose;
    }

    pub fn set_color(&mut self, color: bool) {
        self.color = color;
    }

    pub fn cwd(&self) -> &Path {
        &self.cwd
    }

    pub fn is_verbose(&self) -> bool {
        self.verbose
    }

    pub fn color(&self) -> bool {
        self.color
    }

    /// Get the global configuration file path.
    pub fn config_path(&self) -> Option<PathBuf> {
        self.config_dir.as_ref().map(|dir| dir.join("config.toml"))
    }

    /// Find `wireup.toml` starting from cwd and searching upward.
    pub fn find_config(&self) -> Option<PathBuf> {
        let mut current = self.cwd.clone();
        loop {
            let candidate = current.join(CONFIG_FILE);
            if candidate.is_file() {
                return Some(candidate);
            }
            if !current.pop() {
                return None;
            }
        }
    }

    /// Directory relative paths are resolved against: the directory of the
    /// project config, or cwd when there is none.
    pub fn project_root(&self) -> PathBuf {
        self.find_config()
            .and_then(|p| p.parent().map(Path::to_path_buf))
            .unwrap_or_else(|| self.cwd.clone())
    }

    /// Load the merged global and project configuration.
    pub fn load_config(&self) -> Config {
        let global = self.config_path();
        let project = self.find_config();
        match &project {
            Some(path) => tracing::debug!("using config {}", path.display()),
            None => tracing::debug!("no {} found above {}", CONFIG_FILE, self.cwd.display()),
        }

        let mut config = load_config(global.as_deref(), project.as_deref());
        // Defaults are relative to the project root too.
        let root = self.project_root();
        if config.input.descriptors.is_none() {
            config.input.descriptors = Some(root.join(config.descriptors()));
        }
        if config.output.dir.is_none() {
            config.output.dir = Some(root.join(config.synth_options().output_dir));
        }
        config
    }

    /// Resolve a command-line path against cwd.
    pub fn resolve_path(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.cwd.join(path)
        }
    }
}
