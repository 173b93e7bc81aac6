//! Wink configuration: packaged defaults merged under the host's `wink.toml`.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

/// Packaged default configuration, published under the `wink-config` tag.
pub const DEFAULT_CONFIG: &str = include_str!("../../config/wink.toml");

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Config {
    /// Host middleware group applied to every wink route.
    pub middleware_group: String,
    /// Optional domain constraint for the route groups.
    pub domain: Option<String>,
    /// URL prefix the package mounts under.
    pub path: String,
    pub authentication: Authentication,
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Authentication {
    /// Gates registration of the login and password reset routes.
    pub routes_enabled: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            middleware_group: "web".to_string(),
            domain: None,
            path: "wink".to_string(),
            authentication: Authentication::default(),
        }
    }
}

impl Default for Authentication {
    fn default() -> Self {
        Self {
            routes_enabled: true,
        }
    }
}

impl Config {
    /// Load the host configuration file over the packaged defaults. Keys
    /// missing from the file keep their default values; no file at all means
    /// the defaults are used unchanged.
    ///
    /// # Errors
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };

        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;

        toml::from_str(&raw).with_context(|| format!("Failed to parse {}", path.display()))
    }

    /// Normalized URL prefix; empty when the configured path is empty, so
    /// the routes mount at the host root.
    #[must_use]
    pub fn route_prefix(&self) -> String {
        let trimmed = self.path.trim_matches('/');
        if trimmed.is_empty() {
            String::new()
        } else {
            format!("/{trimmed}")
        }
    }
}
