//! Optional `tyshape.toml` configuration.

use serde::Deserialize;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const DEFAULT_CONFIG_FILE: &str = "tyshape.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("invalid config {}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// Root configuration structure for tyshape.toml.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct TyshapeConfig {
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub log: LogConfig,
}

/// `[output]` section.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct OutputConfig {
    /// Pretty-print JSON.
    pub pretty: Option<bool>,
}

/// `[log]` section.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct LogConfig {
    /// Filter used when `TYSHAPE_LOG` is not set, e.g. "warn" or "tyshape_core=debug".
    pub level: Option<String>,
}

impl TyshapeConfig {
    /// Load `path` if given, otherwise `tyshape.toml` in the current
    /// directory. Only the implicit file may be missing.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => Self::load_from_path(path),
            None => {
                let default = Path::new(DEFAULT_CONFIG_FILE);
                if default.exists() {
                    Self::load_from_path(default)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    pub fn load_from_path(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn parse(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }
}

impl OutputConfig {
    pub fn pretty(&self) -> bool {
        self.pretty.unwrap_or(true)
    }
}

impl LogConfig {
    pub fn level(&self) -> &str {
        self.level.as_deref().unwrap_or("warn")
    }
}
