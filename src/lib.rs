//! Async client for the Consul HTTP API with blocking-query watches.
//!
//! One-shot calls go through [`Client::execute`] or the resource clients;
//! long-lived observation goes through [`Watch`], which keeps a blocking
//! query open, delivers each change exactly once and backs off on failure.

mod client;
mod config;
mod constants;
mod errors;
mod metrics;
mod types;
pub mod watch;

pub use client::*;
pub use config::*;
pub use constants::DELAY_LIMIT_SECONDS;
pub use errors::*;
pub use metrics::*;
pub use types::*;
pub use watch::Versioned;
pub use watch::Watch;
pub use watch::WatchResult;
pub use watch::WatchSource;


//-----------------------------------------------------------
// Test utils

#[cfg(test)]
pub mod test_utils;
