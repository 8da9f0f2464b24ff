//! `~/.dealsync/config.yaml` loading and per-brand credential resolution.
//!
//! ```yaml
//! api_url: https://api.example.com/v1
//! timeout_secs: 30
//! credentials:
//!   - brand: team-42
//!     email: ops@example.com
//!     password: secret
//! ```
//!
//! `DEALSYNC_API_URL` overrides `api_url` when set.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::remote::Credentials;
use crate::types::{BrandId, BrandUnit};

pub const API_URL_ENV: &str = "DEALSYNC_API_URL";

const DEFAULT_TIMEOUT_SECS: u64 = 30;

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

/// Sign-in credentials bound to one organizational unit.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BrandCredentials {
    pub brand: BrandId,
    pub email: String,
    pub password: String,
}

impl std::fmt::Debug for BrandCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BrandCredentials")
            .field("brand", &self.brand)
            .field("email", &self.email)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    pub api_url: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default)]
    pub credentials: Vec<BrandCredentials>,
}

impl Config {
    /// Parse and validate a YAML document. `path` is only used for error context.
    pub fn from_yaml(contents: &str, path: &Path) -> Result<Self, ConfigError> {
        let config: Config = serde_yaml::from_str(contents).map_err(|source| {
            ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            }
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Apply environment overrides using `lookup` as the variable source.
    pub fn with_env_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(url) = lookup(API_URL_ENV).filter(|u| !u.trim().is_empty()) {
            self.api_url = url;
        }
        self
    }

    fn validate(&self) -> Result<(), ConfigError> {
        let url = self.api_url.trim();
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(ConfigError::Invalid(format!(
                "api_url must be an http(s) URL, got '{url}'"
            )));
        }
        if self.timeout_secs == 0 {
            return Err(ConfigError::Invalid("timeout_secs must be positive".into()));
        }
        Ok(())
    }
}

/// Credentials for the most specific unit of `hierarchy` that has any.
pub fn resolve_credentials(
    book: &[BrandCredentials],
    hierarchy: &[BrandUnit],
) -> Option<Credentials> {
    hierarchy.iter().find_map(|unit| {
        book.iter()
            .find(|entry| entry.brand == unit.id)
            .map(|entry| Credentials {
                email: entry.email.clone(),
                password: entry.password.clone(),
            })
    })
}

/// `<home>/.dealsync/config.yaml`. Pure, no I/O.
pub fn config_path_at(home: &Path) -> PathBuf {
    home.join(".dealsync").join("config.yaml")
}

/// Load `<home>/.dealsync/config.yaml`, applying process environment overrides.
pub fn load_at(home: &Path) -> Result<Config, ConfigError> {
    let path = config_path_at(home);
    if !path.exists() {
        return Err(ConfigError::NotFound { path });
    }
    let contents = std::fs::read_to_string(&path).map_err(|source| ConfigError::Io {
        path: path.clone(),
        source,
    })?;
    let config = Config::from_yaml(&contents, &path)?;
    Ok(config.with_env_overrides(|key| std::env::var(key).ok()))
}

/// `load_at` convenience wrapper.
pub fn load() -> Result<Config, ConfigError> {
    let home = dirs::home_dir().ok_or(ConfigError::HomeNotFound)?;
    load_at(&home)
}
