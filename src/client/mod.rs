//! HTTP client of the store
//!
//! Every call goes through one generic path:
//! - [`Query`] encodes the parameters of a call
//! - [`Dispatcher`] turns an [`Operation`] into one HTTP exchange and
//!   injects datacenter, token and timeout
//! - the response classifier maps the status code to body, empty value or
//!   error, and reads the `X-Consul-Index` header
//!
//! Resource clients ([`KvClient`], [`CatalogClient`], [`HealthClient`],
//! [`EventClient`]) are thin mappers on top of that path.
//!
//! # Basic Usage
//! ```no_run
//! use consul_watch::Client;
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() {
//!     let client = Client::builder().host("127.0.0.1").dc("dc1").build().unwrap();
//!
//!     client.kv().put_value("app/mode", "blue", None).await.unwrap();
//!     let entry = client.kv().get_value("app/mode", None).await.unwrap();
//!     println!("mode: {:?}", entry.and_then(|kv| kv.value));
//!
//!     let watch = client.watch_key("app/mode");
//!     watch.set_handler(|result| println!("changed: {:?}", result.next()));
//!     watch.start().unwrap();
//! }
//! ```

mod builder;
mod catalog;
mod dispatcher;
mod event;
mod health;
mod kv;
mod query;
mod response;

pub use builder::*;
pub use catalog::*;
pub use dispatcher::*;
pub use event::*;
pub use health::*;
pub use kv::*;
pub use query::*;
pub use response::RawResponse;
pub use response::ResponseMeta;

#[cfg(test)]
mod kv_test;

use crate::watch::EventsWatch;
use crate::watch::KeyPrefixWatch;
use crate::watch::KeyWatch;
use crate::watch::NodesWatch;
use crate::watch::ServiceWatch;
use crate::watch::ServicesWatch;
use crate::watch::Watch;
use crate::watch::WatchSource;
use crate::ClientConfig;
use crate::Result;
use crate::WatchConfig;

/// Main entry point for talking to one agent
///
/// Cheap to clone; clones share the dispatcher and its connection pool.
/// Dropping the last clone closes the pooled connections.
///
/// Created through [`builder()`](Client::builder), [`new()`](Client::new) or
/// [`from_uri()`](Client::from_uri).
#[derive(Clone)]
pub struct Client {
    pub(super) dispatcher: Dispatcher,
    pub(super) watch_config: WatchConfig,

    pub(super) kv: KvClient,
    pub(super) catalog: CatalogClient,
    pub(super) health: HealthClient,
    pub(super) events: EventClient,
}

impl Client {
    pub fn builder() -> ClientBuilder {
        ClientBuilder::new()
    }

    /// Creates a client with default watch settings
    pub fn new(config: ClientConfig) -> Result<Self> {
        ClientBuilder::new().set_config(config).build()
    }

    /// Creates a client from `consul://host:port/?dc=..&acl=..`
    pub fn from_uri(uri: &str) -> Result<Self> {
        Self::new(ClientConfig::from_uri(uri)?)
    }

    pub(super) fn from_parts(
        dispatcher: Dispatcher,
        watch_config: WatchConfig,
    ) -> Self {
        Self {
            kv: KvClient::new(dispatcher.clone()),
            catalog: CatalogClient::new(dispatcher.clone()),
            health: HealthClient::new(dispatcher.clone()),
            events: EventClient::new(dispatcher.clone()),
            dispatcher,
            watch_config,
        }
    }

    pub fn config(&self) -> &ClientConfig {
        self.dispatcher.config()
    }

    /// Shared dispatcher, e.g. for an [`OperationSource`](crate::watch::OperationSource)
    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    pub fn watch_config(&self) -> &WatchConfig {
        &self.watch_config
    }

    /// Access the key-value operations client
    pub fn kv(&self) -> &KvClient {
        &self.kv
    }

    pub fn catalog(&self) -> &CatalogClient {
        &self.catalog
    }

    pub fn health(&self) -> &HealthClient {
        &self.health
    }

    pub fn events(&self) -> &EventClient {
        &self.events
    }

    /// Executes any operation once, without retries
    pub async fn execute<T>(
        &self,
        operation: Operation<T>,
    ) -> Result<T> {
        self.dispatcher.execute(operation).await
    }

    /// Configuration and member info of the local agent, as raw JSON
    pub async fn agent_info(&self) -> Result<serde_json::Value> {
        self.dispatcher
            .execute(Operation::get_json("/v1/agent/self"))
            .await
    }

    /// Creates an unstarted watch over `source` with this client's watch settings
    pub fn watch<S: WatchSource>(
        &self,
        source: S,
    ) -> Watch<S> {
        Watch::new(source, &self.watch_config)
    }

    pub fn watch_key(
        &self,
        key: impl Into<String>,
    ) -> Watch<KeyWatch> {
        self.watch(KeyWatch::new(self.kv.clone(), key))
    }

    pub fn watch_key_prefix(
        &self,
        prefix: impl Into<String>,
    ) -> Watch<KeyPrefixWatch> {
        self.watch(KeyPrefixWatch::new(self.kv.clone(), prefix))
    }

    pub fn watch_services(&self) -> Watch<ServicesWatch> {
        self.watch(ServicesWatch::new(self.catalog.clone()))
    }

    /// Watches the health entries of one service. `passing` keeps only
    /// instances whose checks all pass.
    pub fn watch_service(
        &self,
        service: impl Into<String>,
        passing: bool,
    ) -> Watch<ServiceWatch> {
        self.watch(ServiceWatch::new(self.health.clone(), service, passing))
    }

    pub fn watch_events(
        &self,
        name: impl Into<String>,
    ) -> Watch<EventsWatch> {
        self.watch(EventsWatch::new(self.events.clone(), name))
    }

    pub fn watch_nodes(&self) -> Watch<NodesWatch> {
        self.watch(NodesWatch::new(self.catalog.clone()))
    }
}
