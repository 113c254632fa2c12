//! Configuration management for the Consul client and its watches.
//!
//! Provides hierarchical configuration loading and validation with:
//! - Default values as code base
//! - Configuration file support
//! - Environment variable overrides
//! - Component-wise validation
mod client;
mod monitoring;
mod watch;
pub use client::*;
pub use monitoring::*;
pub use watch::*;

#[cfg(test)]
mod client_test;

use std::env;

use config::Config;
use config::Environment;
use config::File;
use serde::Deserialize;
use serde::Serialize;

use crate::Result;

/// Prefix of environment variables overriding configuration values,
/// e.g. `CONSUL__CLIENT__PORT=8501`
pub(crate) const ENV_PREFIX: &str = "CONSUL";

/// Top-level configuration container
///
/// Sources are merged with increasing priority:
/// 1. Default values from code implementation
/// 2. Configuration file specified by `CONFIG_PATH`
/// 3. Environment variables (highest priority)
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct ConsulConfig {
    /// Connection, auth and request settings
    #[serde(default)]
    pub client: ClientConfig,
    /// Blocking-query watch settings
    #[serde(default)]
    pub watch: WatchConfig,
    /// Metrics endpoint of the binary
    #[serde(default)]
    pub monitoring: MonitoringConfig,
}

impl ConsulConfig {
    /// Loads configuration from hierarchical sources without validation.
    ///
    /// # Note
    /// Validation is deferred so callers can layer further overrides with
    /// [`with_override_config`](ConsulConfig::with_override_config).
    /// Callers MUST call [`validate`](ConsulConfig::validate) before use.
    ///
    /// # Examples
    /// ```ignore
    /// std::env::set_var("CONFIG_PATH", "config/consul.toml");
    /// std::env::set_var("CONSUL__CLIENT__DC", "dc2");
    /// let cfg = ConsulConfig::new()?.validate()?;
    /// ```
    pub fn new() -> Result<Self> {
        let mut builder = Config::builder().add_source(Config::try_from(&Self::default())?);

        if let Ok(config_path) = env::var("CONFIG_PATH") {
            builder = builder.add_source(File::with_name(&config_path).required(true));
        }

        builder = builder.add_source(environment());

        let config: Self = builder.build()?.try_deserialize()?;
        Ok(config)
    }

    /// Applies additional configuration overrides from file without validation.
    ///
    /// Environment variables still win over the file.
    pub fn with_override_config(
        &self,
        path: &str,
    ) -> Result<Self> {
        let config: Self = Config::builder()
            .add_source(Config::try_from(self)?)
            .add_source(File::with_name(path))
            .add_source(environment())
            .build()?
            .try_deserialize()?;
        Ok(config)
    }

    /// Validates configuration and returns validated instance.
    pub fn validate(self) -> Result<Self> {
        self.client.validate()?;
        self.watch.validate()?;
        self.monitoring.validate()?;
        Ok(self)
    }
}

fn environment() -> Environment {
    Environment::with_prefix(ENV_PREFIX)
        .separator("__")
        .ignore_empty(true)
        .try_parsing(true)
        .list_separator(",")
        .with_list_parse_key("watch.keys")
        .with_list_parse_key("watch.prefixes")
}
