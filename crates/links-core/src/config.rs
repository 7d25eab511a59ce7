//! Service configuration

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use url::Url;

use links_resolver::{ArgEncoding, ResolverSettings};

use crate::error::CoreError;
use crate::Result;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Path to the database file
    pub database_path: PathBuf,
    /// Public base URL, used in expand links and the OpenSearch description
    pub app_url: String,
    /// Fallback search engine URL template
    pub search_engine: String,
    /// Alias recorded for fallback searches
    pub fallback_alias: String,
    /// Whether template arguments are percent-encoded
    pub arg_encoding: ArgEncoding,
    /// HTTP listen address
    pub bind: String,
}

impl Config {
    pub fn new(data_dir: PathBuf) -> Self {
        let resolver = ResolverSettings::default();

        Self {
            database_path: data_dir.join("links.db"),
            app_url: resolver.app_url,
            search_engine: resolver.search_engine,
            fallback_alias: resolver.fallback_alias,
            arg_encoding: resolver.arg_encoding,
            bind: "127.0.0.1:8090".to_string(),
        }
    }

    pub fn data_dir() -> PathBuf {
        dirs::data_local_dir()
            .map(|d| d.join("links"))
            .unwrap_or_else(|| PathBuf::from(".links"))
    }

    /// Read a TOML config file. Missing keys take their defaults.
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&raw)
            .map_err(|e| CoreError::Config(format!("{}: {e}", path.display())))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        Url::parse(&self.app_url)
            .map_err(|e| CoreError::Config(format!("app_url {:?}: {e}", self.app_url)))?;

        if self.search_engine.trim().is_empty() {
            return Err(CoreError::Config(
                "search_engine cannot be empty".to_string(),
            ));
        }

        Ok(())
    }

    pub fn resolver_settings(&self) -> ResolverSettings {
        ResolverSettings {
            app_url: self.app_url.trim_end_matches('/').to_string(),
            search_engine: self.search_engine.clone(),
            fallback_alias: self.fallback_alias.clone(),
            arg_encoding: self.arg_encoding,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new(Self::data_dir())
    }
}
