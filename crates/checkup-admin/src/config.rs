use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use tracing::debug;
use url::Url;

use crate::api::DEFAULT_API_BASE_URL;

pub const ENV_API_BASE_URL: &str = "CHECKUP_API_BASE_URL";
pub const ENV_DATA_DIR: &str = "CHECKUP_DATA_DIR";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdminConfig {
    pub api_base_url: String,
    /// Drafts and the stored session live here.
    pub data_dir: Option<PathBuf>,
    pub locale: Option<String>,
}

impl Default for AdminConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            data_dir: None,
            locale: None,
        }
    }
}

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("app", "checkapp", "checkup-admin")
}

impl AdminConfig {
    pub fn default_path() -> Option<PathBuf> {
        project_dirs().map(|dirs| dirs.config_dir().join("config.toml"))
    }

    /// Reads `path` (or the default location) and applies environment
    /// overrides. A missing file yields the defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = path.map(Path::to_path_buf).or_else(Self::default_path);
        let mut config = match &path {
            Some(path) if path.exists() => {
                let raw = fs::read_to_string(path)
                    .with_context(|| format!("failed to read config {}", path.display()))?;
                toml::from_str(&raw)
                    .with_context(|| format!("failed to parse config {}", path.display()))?
            }
            _ => AdminConfig::default(),
        };
        config.apply_env(|key| std::env::var(key).ok());
        debug!(?path, api = %config.api_base_url, "configuration loaded");
        Ok(config)
    }

    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(url) = lookup(ENV_API_BASE_URL).filter(|value| !value.trim().is_empty()) {
            self.api_base_url = url;
        }
        if let Some(dir) = lookup(ENV_DATA_DIR).filter(|value| !value.trim().is_empty()) {
            self.data_dir = Some(PathBuf::from(dir));
        }
    }

    pub fn base_url(&self) -> Result<Url> {
        Url::parse(&self.api_base_url)
            .with_context(|| format!("invalid api_base_url '{}'", self.api_base_url))
    }

    pub fn data_dir(&self) -> Result<PathBuf> {
        if let Some(dir) = &self.data_dir {
            return Ok(dir.clone());
        }
        project_dirs()
            .map(|dirs| dirs.data_dir().to_path_buf())
            .context("cannot determine a data directory; set CHECKUP_DATA_DIR")
    }

    pub fn drafts_dir(&self) -> Result<PathBuf> {
        Ok(self.data_dir()?.join("drafts"))
    }

    pub fn session_path(&self) -> Result<PathBuf> {
        Ok(self.data_dir()?.join("session.json"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_values_and_env_overrides() {
        let dir = tempfile::TempDir::new().expect("tempdir");
        let path = dir.path().join("config.toml");
        fs::write(
            &path,
            "api_base_url = \"https://api.example.test/api\"\nlocale = \"ru\"\n",
        )
        .expect("write");

        let mut config: AdminConfig =
            toml::from_str(&fs::read_to_string(&path).expect("read")).expect("parse");
        assert_eq!(config.locale.as_deref(), Some("ru"));
        assert_eq!(config.data_dir, None);

        config.apply_env(|key| match key {
            ENV_DATA_DIR => Some("/tmp/checkup".into()),
            ENV_API_BASE_URL => Some("  ".into()),
            _ => None,
        });
        assert_eq!(config.api_base_url, "https://api.example.test/api");
        assert_eq!(
            config.session_path().expect("session path"),
            PathBuf::from("/tmp/checkup/session.json")
        );
    }

    #[test]
    fn defaults_point_at_local_backend() {
        let config = AdminConfig::default();
        assert_eq!(
            config.base_url().expect("url").as_str(),
            "http://localhost:3001/api"
        );
    }
}
