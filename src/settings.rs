//! Application settings
//!
//! Read from an optional JSON file, then overridden by environment variables.
//! Binaries apply their own command-line flags last.

use crate::error::{read_json, Error, Result};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

pub const ENV_CONFIG: &str = "LINKSHELF_CONFIG";
pub const ENV_BIND: &str = "LINKSHELF_BIND";
pub const ENV_TAXONOMY: &str = "LINKSHELF_TAXONOMY";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    /// Address the HTTP server listens on
    #[serde(default = "default_bind")]
    pub bind: String,
    /// Taxonomy JSON file; the built-in table is used when unset
    #[serde(default)]
    pub taxonomy_path: Option<PathBuf>,
    /// Largest accepted request body. Exports with scraped page content get big.
    #[serde(default = "default_body_limit")]
    pub body_limit_bytes: usize,
}

fn default_bind() -> String {
    "127.0.0.1:3741".to_string()
}

fn default_body_limit() -> usize {
    32 * 1024 * 1024
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            taxonomy_path: None,
            body_limit_bytes: default_body_limit(),
        }
    }
}

impl Settings {
    /// Load from `path` if given (a missing file is then an error), else defaults.
    pub fn from_file(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(p) => read_json(p),
            None => Ok(Self::default()),
        }
    }

    /// Apply overrides from an environment lookup (`std::env::var` in production).
    pub fn apply_env<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(bind) = lookup(ENV_BIND).filter(|s| !s.is_empty()) {
            self.bind = bind;
        }
        if let Some(path) = lookup(ENV_TAXONOMY).filter(|s| !s.is_empty()) {
            self.taxonomy_path = Some(PathBuf::from(path));
        }
        self
    }

    /// Command-line flags, applied after the environment.
    pub fn apply_overrides(mut self, bind: Option<String>, taxonomy_path: Option<PathBuf>) -> Self {
        if let Some(bind) = bind {
            self.bind = bind;
        }
        if let Some(path) = taxonomy_path {
            self.taxonomy_path = Some(path);
        }
        self
    }

    /// Config file (explicit path, else `LINKSHELF_CONFIG`) plus environment overrides.
    /// Not validated: callers apply their flags first, then call `validate`.
    pub fn load(config_path: Option<&Path>) -> Result<Self> {
        let env_path = std::env::var(ENV_CONFIG).ok().filter(|s| !s.is_empty()).map(PathBuf::from);
        let path = config_path.map(Path::to_path_buf).or(env_path);
        Ok(Self::from_file(path.as_deref())?.apply_env(|key| std::env::var(key).ok()))
    }

    pub fn validate(&self) -> Result<()> {
        self.bind_addr()?;
        if self.body_limit_bytes == 0 {
            return Err(Error::InvalidSetting("bodyLimitBytes must be greater than zero".into()));
        }
        Ok(())
    }

    pub fn bind_addr(&self) -> Result<SocketAddr> {
        self.bind
            .parse()
            .map_err(|e| Error::InvalidSetting(format!("bind '{}': {}", self.bind, e)))
    }
}
