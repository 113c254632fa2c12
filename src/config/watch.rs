use std::time::Duration;

use config::ConfigError;
use serde::Deserialize;
use serde::Serialize;
use tracing::warn;

use crate::constants::BLOCKING_WAIT;
use crate::constants::DELAY_LIMIT_SECONDS;
use crate::constants::MAX_BLOCKING_WAIT_SECS;
use crate::Error;
use crate::Result;

/// Blocking-query watch settings
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct WatchConfig {
    /// Server-side wait of each blocking query, e.g. "30s" or "5m".
    /// Values above ten minutes are capped.
    /// Default: "10m"
    #[serde(default = "default_wait")]
    pub wait: String,

    /// Upper bound in seconds of the delay between failed polls
    /// Default: 180
    #[serde(default = "default_delay_limit_secs")]
    pub delay_limit_secs: u64,

    /// Keys watched by the `consul-watch` binary
    #[serde(default)]
    pub keys: Vec<String>,

    /// Key prefixes watched by the `consul-watch` binary
    #[serde(default)]
    pub prefixes: Vec<String>,
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            wait: default_wait(),
            delay_limit_secs: default_delay_limit_secs(),
            keys: Vec::new(),
            prefixes: Vec::new(),
        }
    }
}

impl WatchConfig {
    pub fn validate(&self) -> Result<()> {
        if parse_wait(&self.wait).is_none() {
            return Err(Error::Config(ConfigError::Message(format!(
                "watch.wait '{}' is not a duration like \"30s\" or \"10m\"",
                self.wait
            ))));
        }
        if self.delay_limit_secs == 0 {
            return Err(Error::Config(ConfigError::Message(
                "watch.delay_limit_secs must be > 0".into(),
            )));
        }
        Ok(())
    }

    /// The wait string actually sent to the store, capped to ten minutes.
    ///
    /// Falls back to the default when the configured value cannot be parsed.
    pub fn effective_wait(&self) -> String {
        match parse_wait(&self.wait) {
            Some(d) if d.as_secs() > MAX_BLOCKING_WAIT_SECS => {
                warn!("watch.wait {} exceeds the store limit, capping to {}", self.wait, BLOCKING_WAIT);
                BLOCKING_WAIT.to_string()
            }
            Some(_) => self.wait.clone(),
            None => BLOCKING_WAIT.to_string(),
        }
    }
}

/// Parses duration strings in the store's format: one or more
/// `<number><unit>` segments with units `ms`, `s`, `m` or `h`.
pub fn parse_wait(value: &str) -> Option<Duration> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }

    let mut total = Duration::ZERO;
    let mut rest = value;
    while !rest.is_empty() {
        let digits = rest.find(|c: char| !c.is_ascii_digit()).unwrap_or(rest.len());
        if digits == 0 {
            return None;
        }
        let amount: u64 = rest[..digits].parse().ok()?;
        rest = &rest[digits..];

        let unit_len = rest.find(|c: char| c.is_ascii_digit()).unwrap_or(rest.len());
        let segment = match &rest[..unit_len] {
            "ms" => Duration::from_millis(amount),
            "s" => Duration::from_secs(amount),
            "m" => Duration::from_secs(amount.checked_mul(60)?),
            "h" => Duration::from_secs(amount.checked_mul(3600)?),
            _ => return None,
        };
        total = total.checked_add(segment)?;
        rest = &rest[unit_len..];
    }
    Some(total)
}

fn default_wait() -> String {
    BLOCKING_WAIT.to_string()
}
fn default_delay_limit_secs() -> u64 {
    DELAY_LIMIT_SECONDS
}
