//! Renderer configuration.
//!
//! [`RendererConfig`] can be built in code or loaded from YAML. Every field
//! has a default, so a YAML document only needs the keys it changes:
//!
//! ```yaml
//! base_dir: site/lua
//! endpoints: pages
//! capacity: 8
//! reuse: true
//! bootstrap: !module runtime
//! ```
//!
//! With the defaults, templates are looked up as `lua/endpoints/<name>.lua`,
//! reuse is disabled and each state receives the built-in runtime.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::pool::DEFAULT_CAPACITY;
use crate::runtime::{Bootstrap, InstanceFactory};

/// Default directory holding the Lua sources.
pub const DEFAULT_BASE_DIR: &str = "lua";

/// Default subdirectory of the base directory holding template modules.
pub const DEFAULT_ENDPOINTS: &str = "endpoints";

/// Settings for a [`Renderer`](crate::Renderer).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RendererConfig {
    /// Directory holding shared modules and the endpoints directory.
    pub base_dir: PathBuf,
    /// Subdirectory of `base_dir` holding template modules.
    pub endpoints: String,
    /// Maximum number of idle states kept for reuse.
    pub capacity: usize,
    /// Keep released states for later renders.
    pub reuse: bool,
    /// Helper definitions installed into each new state.
    pub bootstrap: Bootstrap,
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            base_dir: PathBuf::from(DEFAULT_BASE_DIR),
            endpoints: DEFAULT_ENDPOINTS.to_string(),
            capacity: DEFAULT_CAPACITY,
            reuse: false,
            bootstrap: Bootstrap::Builtin,
        }
    }
}

impl RendererConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_base_dir(mut self, base_dir: impl Into<PathBuf>) -> Self {
        self.base_dir = base_dir.into();
        self
    }

    pub fn with_endpoints(mut self, endpoints: impl Into<String>) -> Self {
        self.endpoints = endpoints.into();
        self
    }

    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    /// Enables or disables keeping released states.
    pub fn with_reuse(mut self, reuse: bool) -> Self {
        self.reuse = reuse;
        self
    }

    pub fn with_bootstrap(mut self, bootstrap: Bootstrap) -> Self {
        self.bootstrap = bootstrap;
        self
    }

    /// Parses and validates a YAML document.
    ///
    /// ```rust
    /// use luaweave::RendererConfig;
    ///
    /// let config = RendererConfig::from_yaml("reuse: true\ncapacity: 2").unwrap();
    /// assert!(config.reuse);
    /// assert_eq!(config.capacity, 2);
    /// assert_eq!(config.endpoints, "endpoints");
    /// ```
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a YAML file.
    ///
    /// A relative `base_dir` in the file is taken relative to the file's own
    /// directory.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let yaml = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let mut config = Self::from_yaml(&yaml)?;
        if config.base_dir.is_relative() {
            if let Some(parent) = path.parent() {
                config.base_dir = parent.join(&config.base_dir);
            }
        }
        Ok(config)
    }

    /// Checks that the endpoints name can be embedded in `package.path`.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.endpoints.trim().is_empty() {
            return Err(ConfigError::Invalid("endpoints must not be empty".into()));
        }
        if let Some(bad) = self.endpoints.chars().find(|c| matches!(c, '?' | ';')) {
            return Err(ConfigError::Invalid(format!(
                "endpoints must not contain '{bad}': {}",
                self.endpoints
            )));
        }
        Ok(())
    }

    /// Builds the state factory described by this configuration.
    pub fn factory(&self) -> InstanceFactory {
        InstanceFactory::new(&self.base_dir, &self.endpoints, self.bootstrap.clone())
    }
}
