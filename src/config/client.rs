use std::time::Duration;

use config::ConfigError;
use reqwest::Url;
use serde::Deserialize;
use serde::Serialize;

use crate::constants::DEFAULT_HOST;
use crate::constants::DEFAULT_PORT;
use crate::constants::DEFAULT_USER_AGENT;
use crate::Error;
use crate::Result;

/// Connection and request settings shared by every call of one client
///
/// # Key Configuration Areas
/// - Target agent address (host, port, TLS)
/// - Defaults merged into each request (datacenter, ACL token)
/// - Request lifecycle control (timeouts, user agent)
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ClientConfig {
    /// Agent host name or address
    /// Default: "localhost"
    #[serde(default = "default_host")]
    pub host: String,

    /// Agent HTTP port
    /// Default: 8500
    #[serde(default = "default_port")]
    pub port: u16,

    /// Use https instead of http
    /// Default: false
    #[serde(default)]
    pub ssl: bool,

    /// Token sent in the `X-Consul-Token` header of every request
    #[serde(default)]
    pub acl_token: Option<String>,

    /// Datacenter applied to requests that do not name one
    #[serde(default)]
    pub dc: Option<String>,

    /// Request completion timeout in milliseconds, 0 disables it
    /// Default: 0
    #[serde(default)]
    pub timeout_ms: u64,

    /// TCP connect timeout in milliseconds
    /// Default: 1000
    #[serde(default = "default_connect_timeout_ms")]
    pub connect_timeout_ms: u64,

    /// Value of the `User-Agent` header
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            ssl: false,
            acl_token: None,
            dc: None,
            timeout_ms: 0,
            connect_timeout_ms: default_connect_timeout_ms(),
            user_agent: default_user_agent(),
        }
    }
}

impl ClientConfig {
    /// Builds a configuration from a URI such as
    /// `consul://consul.example.com:8500/?dc=dc1&acl=00000000-0000-0000-0000-000000000000`.
    ///
    /// The scheme is ignored. The token may be given as `acl` or `aclToken`.
    pub fn from_uri(uri: &str) -> Result<Self> {
        let url = Url::parse(uri)
            .map_err(|e| Error::Config(ConfigError::Message(format!("Invalid agent URI {uri}: {e}"))))?;
        let host = url
            .host_str()
            .ok_or_else(|| Error::Config(ConfigError::Message(format!("Agent URI {uri} has no host"))))?;

        let param = |names: &[&str]| {
            names.iter().find_map(|name| {
                url.query_pairs()
                    .find(|(k, _)| k == name)
                    .map(|(_, v)| v.into_owned())
                    .filter(|v| !v.is_empty())
            })
        };

        Ok(Self {
            host: host.to_string(),
            port: url.port().unwrap_or(DEFAULT_PORT),
            dc: param(&["dc"]),
            acl_token: param(&["acl", "aclToken"]),
            ..Self::default()
        })
    }

    pub fn validate(&self) -> Result<()> {
        if self.host.trim().is_empty() {
            return Err(Error::Config(ConfigError::Message("client.host cannot be empty".into())));
        }
        if self.port == 0 {
            return Err(Error::Config(ConfigError::Message("client.port must be > 0".into())));
        }
        if self.connect_timeout_ms == 0 {
            return Err(Error::Config(ConfigError::Message(
                "client.connect_timeout_ms must be > 0".into(),
            )));
        }
        Ok(())
    }

    /// Base address every request path is appended to
    pub fn base_url(&self) -> String {
        let scheme = if self.ssl { "https" } else { "http" };
        format!("{}://{}:{}", scheme, self.host, self.port)
    }

    /// Request timeout, `None` when disabled
    pub fn request_timeout(&self) -> Option<Duration> {
        (self.timeout_ms > 0).then(|| Duration::from_millis(self.timeout_ms))
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }
}

fn default_host() -> String {
    DEFAULT_HOST.to_string()
}
fn default_port() -> u16 {
    DEFAULT_PORT
}
fn default_connect_timeout_ms() -> u64 {
    1000
}
fn default_user_agent() -> String {
    DEFAULT_USER_AGENT.to_string()
}
