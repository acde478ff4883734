use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {config_path}: {source}")]
    ConfigReadError {
        config_path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file at {config_path}: {source}")]
    ConfigParseError {
        config_path: PathBuf,
        source: toml::de::Error,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    pub manuscript_path: PathBuf,
    /// Base directory for transcluded code samples, relative to the manuscript
    #[serde(default = "default_resources_dir")]
    pub resources_dir: PathBuf,
    /// Chapter list, one file per line in book order
    #[serde(default = "default_manifest")]
    pub manifest: PathBuf,
    #[serde(default = "default_build_path")]
    pub build_path: PathBuf,
    #[serde(default)]
    pub dedent_lecture_lines: bool,
}

fn default_resources_dir() -> PathBuf {
    PathBuf::from("resources")
}

fn default_manifest() -> PathBuf {
    PathBuf::from("Book.txt")
}

fn default_build_path() -> PathBuf {
    PathBuf::from("build")
}

impl Config {
    /// Default settings for the manuscript at `manuscript_path`
    pub fn new(manuscript_path: impl Into<PathBuf>) -> Self {
        Self {
            manuscript_path: manuscript_path.into(),
            resources_dir: default_resources_dir(),
            manifest: default_manifest(),
            build_path: default_build_path(),
            dedent_lecture_lines: false,
        }
    }

    pub fn load_from_path<P: AsRef<Path>>(config_path: P) -> Result<Option<Self>, ConfigError> {
        let config_path = config_path.as_ref();
        if !config_path.exists() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(config_path).map_err(|source| {
            ConfigError::ConfigReadError {
                config_path: config_path.to_path_buf(),
                source,
            }
        })?;

        let mut config: Config =
            toml::from_str(&content).map_err(|source| ConfigError::ConfigParseError {
                config_path: config_path.to_path_buf(),
                source,
            })?;

        // Expand shell variables and tilde in the loaded paths
        for path in [
            &mut config.manuscript_path,
            &mut config.resources_dir,
            &mut config.manifest,
            &mut config.build_path,
        ] {
            if let Some(expanded) = Self::expand_path(path) {
                *path = expanded;
            }
        }

        Ok(Some(config))
    }

    pub fn load() -> Result<Option<Self>, ConfigError> {
        let config_path = Self::config_path();
        Self::load_from_path(&config_path)
    }

    pub fn save_to_path<P: AsRef<Path>>(&self, config_path: P) -> anyhow::Result<()> {
        let config_path = config_path.as_ref();
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(config_path, content)?;
        Ok(())
    }

    pub fn save(&self) -> anyhow::Result<()> {
        let config_path = Self::config_path();
        self.save_to_path(&config_path)
    }

    pub fn config_path() -> PathBuf {
        let config_dir = shellexpand::tilde("~/.config/pandocify");
        PathBuf::from(config_dir.as_ref()).join("config.toml")
    }

    /// Transclusion base directory; absolute settings are kept as they are
    pub fn resources_path(&self) -> PathBuf {
        self.manuscript_path.join(&self.resources_dir)
    }

    pub fn manifest_path(&self) -> PathBuf {
        self.manuscript_path.join(&self.manifest)
    }

    /// Output directory; absolute settings are kept as they are
    pub fn build_dir(&self) -> PathBuf {
        self.manuscript_path.join(&self.build_path)
    }

    fn expand_path(path: &Path) -> Option<PathBuf> {
        let path_str = path.to_string_lossy();
        match shellexpand::full(&path_str) {
            Ok(expanded) => Some(PathBuf::from(expanded.as_ref())),
            Err(_) => None,
        }
    }
}
