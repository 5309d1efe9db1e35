use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::api::{DEFAULT_GITIGNORE_API, DEFAULT_LICENSE_API};
use crate::error::{GitmanError, Result};
use crate::models::TemplateKind;

pub const CONFIG_FILE: &str = "config.yaml";
/// Project-local override directory, relative to the working directory.
pub const PROJECT_CONFIG_DIR: &str = ".gitman";

/// User settings read from `config.yaml`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
pub struct Config {
    /// Persist freshly fetched gitignore templates into `.cache/gitignores`.
    #[serde(alias = "cachegitignores")]
    pub cache_gitignores: bool,

    /// Persist freshly fetched licenses into `.cache/licenses`.
    #[serde(alias = "cachelicenses")]
    pub cache_licenses: bool,

    #[serde(alias = "gitignoreapi")]
    pub gitignore_api: String,

    #[serde(alias = "licenseapi")]
    pub license_api: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            cache_gitignores: false,
            cache_licenses: false,
            gitignore_api: DEFAULT_GITIGNORE_API.to_string(),
            license_api: DEFAULT_LICENSE_API.to_string(),
        }
    }
}

impl Config {
    /// Loads the project-local config if present, otherwise `<root>/config.yaml`.
    ///
    /// The root file is created with defaults when missing or empty.
    pub fn load(root: &Path, project_dir: &Path) -> Result<Self> {
        let root_file = root.join(CONFIG_FILE);
        if !root_file.exists() || fs::metadata(&root_file).map(|m| m.len() == 0).unwrap_or(false) {
            Self::default().save(&root_file)?;
            tracing::info!("Wrote default config to {}", root_file.display());
        }

        let project_file = project_dir.join(PROJECT_CONFIG_DIR).join(CONFIG_FILE);
        if project_file.is_file() {
            return Self::load_from_file(&project_file);
        }
        Self::load_from_file(&root_file)
    }

    fn load_from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| GitmanError::io(path, e))?;
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        let config = serde_yaml::from_str(&content).map_err(|e| GitmanError::Config {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        tracing::debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    fn save(&self, path: &Path) -> Result<()> {
        let content = serde_yaml::to_string(self).map_err(|e| GitmanError::Config {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        fs::write(path, content).map_err(|e| GitmanError::io(path, e))
    }

    /// Whether fresh remote templates of `kind` are written through to the cache.
    pub fn cache_policy(&self, kind: TemplateKind) -> bool {
        match kind {
            TemplateKind::Gitignore => self.cache_gitignores,
            TemplateKind::License => self.cache_licenses,
        }
    }
}

/// Platform config directory joined with `gitman`.
pub fn default_root() -> Result<PathBuf> {
    directories::BaseDirs::new()
        .map(|dirs| dirs.config_dir().join("gitman"))
        .ok_or_else(|| GitmanError::Other(anyhow::anyhow!("Failed to determine config directory")))
}

/// Creates the config root if needed.
pub fn ensure_root(root: &Path) -> Result<()> {
    fs::create_dir_all(root).map_err(|e| GitmanError::io(root, e))
}
