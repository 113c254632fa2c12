use std::time::Duration;

use super::Client;
use super::Dispatcher;
use crate::ClientConfig;
use crate::Result;
use crate::WatchConfig;

pub struct ClientBuilder {
    config: ClientConfig,
    watch_config: WatchConfig,
}

impl Default for ClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ClientBuilder {
    /// Create a new builder with default config
    pub fn new() -> Self {
        Self {
            config: ClientConfig::default(),
            watch_config: WatchConfig::default(),
        }
    }

    /// Agent host (default: localhost)
    pub fn host(
        mut self,
        host: impl Into<String>,
    ) -> Self {
        self.config.host = host.into();
        self
    }

    /// Agent HTTP port (default: 8500)
    pub fn port(
        mut self,
        port: u16,
    ) -> Self {
        self.config.port = port;
        self
    }

    /// Enable/disable https (default: disabled)
    pub fn ssl(
        mut self,
        enable: bool,
    ) -> Self {
        self.config.ssl = enable;
        self
    }

    pub fn acl_token(
        mut self,
        token: impl Into<String>,
    ) -> Self {
        self.config.acl_token = Some(token.into());
        self
    }

    /// Datacenter used by calls that do not name one
    pub fn dc(
        mut self,
        dc: impl Into<String>,
    ) -> Self {
        self.config.dc = Some(dc.into());
        self
    }

    /// Set request timeout (default: none). `Duration::ZERO` disables it.
    pub fn timeout(
        mut self,
        timeout: Duration,
    ) -> Self {
        self.config.timeout_ms = timeout.as_millis() as u64;
        self
    }

    /// Set connection timeout (default: 1s)
    pub fn connect_timeout(
        mut self,
        timeout: Duration,
    ) -> Self {
        self.config.connect_timeout_ms = timeout.as_millis() as u64;
        self
    }

    pub fn user_agent(
        mut self,
        user_agent: impl Into<String>,
    ) -> Self {
        self.config.user_agent = user_agent.into();
        self
    }

    /// Blocking wait and backoff limit of watches created by the client
    pub fn watch_config(
        mut self,
        watch_config: WatchConfig,
    ) -> Self {
        self.watch_config = watch_config;
        self
    }

    /// Completely replaces the connection configuration
    ///
    /// # Warning: Configuration Override
    /// This will discard all previous settings configured through individual
    /// methods like [`host`](ClientBuilder::host) or
    /// [`timeout`](ClientBuilder::timeout).
    ///
    /// # Example: Full Configuration
    /// ```ignore
    /// use consul_watch::{ClientBuilder, ClientConfig};
    ///
    /// let custom_config = ClientConfig {
    ///     port: 8501,
    ///     ssl: true,
    ///     ..ClientConfig::default()
    /// };
    ///
    /// let builder = ClientBuilder::new().set_config(custom_config);
    /// ```
    pub fn set_config(
        mut self,
        config: ClientConfig,
    ) -> Self {
        self.config = config;
        self
    }

    /// Validates the configuration and builds the client
    ///
    /// No connection is opened here; the first call connects lazily.
    pub fn build(self) -> Result<Client> {
        self.config.validate()?;
        self.watch_config.validate()?;
        let dispatcher = Dispatcher::new(self.config)?;
        Ok(Client::from_parts(dispatcher, self.watch_config))
    }
}
