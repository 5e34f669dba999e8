use crate::feed::DEFAULT_FEED_URL;
use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

/// Overrides the data directory (favorites, log file).
pub const DATA_DIR_ENV: &str = "ONTHISDAY_DATA_DIR";

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct Config {
    pub feed_url: String,
    pub allow_insecure_certs: bool,
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            feed_url: DEFAULT_FEED_URL.to_string(),
            allow_insecure_certs: false,
            log_level: "info".to_string(),
        }
    }
}

impl Config {
    fn project_dirs() -> Option<ProjectDirs> {
        ProjectDirs::from("org", "onthisday", "onthisday")
    }

    pub fn get_path() -> Option<PathBuf> {
        Self::project_dirs().map(|proj| proj.config_dir().join("config.toml"))
    }

    /// Loads `config.toml` from the user's config dir. A missing file yields defaults.
    pub fn load() -> Result<Self> {
        match Self::get_path() {
            Some(path) => Self::load_from(&path),
            None => Ok(Self::default()),
        }
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
        Self::parse(&content).with_context(|| format!("parsing {}", path.display()))
    }

    pub fn parse(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Directory holding `favorites.json` and the log file.
    pub fn data_dir() -> Option<PathBuf> {
        if let Ok(dir) = env::var(DATA_DIR_ENV)
            && !dir.is_empty()
        {
            return Some(PathBuf::from(dir));
        }
        Self::project_dirs().map(|proj| proj.data_dir().to_path_buf())
    }
}
