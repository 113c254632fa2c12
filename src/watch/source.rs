use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;

use super::Indexed;
use super::Versioned;
use crate::client::BlockingQueryOptions;
use crate::client::CatalogClient;
use crate::client::Dispatcher;
use crate::client::EventClient;
use crate::client::HealthClient;
use crate::client::KvClient;
use crate::client::Operation;
use crate::types::EventList;
use crate::types::KeyValue;
use crate::types::KeyValueList;
use crate::types::NodeList;
use crate::types::ServiceEntryList;
use crate::types::ServiceList;
use crate::Result;

/// A fetchable, indexable resource
///
/// `fetch` is issued with the last known index and the blocking wait; it
/// returns the value together with the index of the response.
#[cfg_attr(test, automock(type Value = String;))]
#[async_trait]
pub trait WatchSource: Send + Sync + 'static {
    type Value: Clone + PartialEq + fmt::Debug + Send + Sync + 'static;

    async fn fetch(
        &self,
        options: BlockingQueryOptions,
    ) -> Result<Versioned<Self::Value>>;

    /// Short label used in logs
    fn describe(&self) -> String;
}

/// One key. An absent key is observed as the default [`KeyValue`].
pub struct KeyWatch {
    kv: KvClient,
    key: String,
}

impl KeyWatch {
    pub fn new(
        kv: KvClient,
        key: impl Into<String>,
    ) -> Self {
        Self { kv, key: key.into() }
    }
}

#[async_trait]
impl WatchSource for KeyWatch {
    type Value = KeyValue;

    async fn fetch(
        &self,
        options: BlockingQueryOptions,
    ) -> Result<Versioned<KeyValue>> {
        self.kv.versioned_value(&self.key, Some(&options)).await
    }

    fn describe(&self) -> String {
        format!("key:{}", self.key)
    }
}

/// Every key under a prefix
pub struct KeyPrefixWatch {
    kv: KvClient,
    prefix: String,
}

impl KeyPrefixWatch {
    pub fn new(
        kv: KvClient,
        prefix: impl Into<String>,
    ) -> Self {
        Self {
            kv,
            prefix: prefix.into(),
        }
    }
}

#[async_trait]
impl WatchSource for KeyPrefixWatch {
    type Value = KeyValueList;

    async fn fetch(
        &self,
        options: BlockingQueryOptions,
    ) -> Result<Versioned<KeyValueList>> {
        self.kv.get_values(&self.prefix, Some(&options)).await.map(Versioned::from)
    }

    fn describe(&self) -> String {
        format!("keyprefix:{}", self.prefix)
    }
}

/// Services of the catalog
pub struct ServicesWatch {
    catalog: CatalogClient,
}

impl ServicesWatch {
    pub fn new(catalog: CatalogClient) -> Self {
        Self { catalog }
    }
}

#[async_trait]
impl WatchSource for ServicesWatch {
    type Value = ServiceList;

    async fn fetch(
        &self,
        options: BlockingQueryOptions,
    ) -> Result<Versioned<ServiceList>> {
        self.catalog.services(Some(&options)).await.map(Versioned::from)
    }

    fn describe(&self) -> String {
        "services".to_string()
    }
}

/// Health entries of one service
pub struct ServiceWatch {
    health: HealthClient,
    service: String,
    passing: bool,
}

impl ServiceWatch {
    pub fn new(
        health: HealthClient,
        service: impl Into<String>,
        passing: bool,
    ) -> Self {
        Self {
            health,
            service: service.into(),
            passing,
        }
    }
}

#[async_trait]
impl WatchSource for ServiceWatch {
    type Value = ServiceEntryList;

    async fn fetch(
        &self,
        options: BlockingQueryOptions,
    ) -> Result<Versioned<ServiceEntryList>> {
        self.health
            .service_nodes(&self.service, self.passing, Some(&options))
            .await
            .map(Versioned::from)
    }

    fn describe(&self) -> String {
        format!("service:{}", self.service)
    }
}

/// Events named `name`
pub struct EventsWatch {
    events: EventClient,
    name: String,
}

impl EventsWatch {
    pub fn new(
        events: EventClient,
        name: impl Into<String>,
    ) -> Self {
        Self {
            events,
            name: name.into(),
        }
    }
}

#[async_trait]
impl WatchSource for EventsWatch {
    type Value = EventList;

    async fn fetch(
        &self,
        options: BlockingQueryOptions,
    ) -> Result<Versioned<EventList>> {
        self.events.list(Some(&self.name), Some(&options)).await.map(Versioned::from)
    }

    fn describe(&self) -> String {
        format!("event:{}", self.name)
    }
}

/// Nodes of the catalog
pub struct NodesWatch {
    catalog: CatalogClient,
}

impl NodesWatch {
    pub fn new(catalog: CatalogClient) -> Self {
        Self { catalog }
    }
}

#[async_trait]
impl WatchSource for NodesWatch {
    type Value = NodeList;

    async fn fetch(
        &self,
        options: BlockingQueryOptions,
    ) -> Result<Versioned<NodeList>> {
        self.catalog.nodes(Some(&options)).await.map(Versioned::from)
    }

    fn describe(&self) -> String {
        "nodes".to_string()
    }
}

type OperationFactory<T> = Arc<dyn Fn(BlockingQueryOptions) -> Operation<T> + Send + Sync>;

/// Watches any caller-built operation whose result carries its index
///
/// The factory is called once per poll with the blocking options to apply.
/// ```ignore
/// let source = OperationSource::new(client.dispatcher(), "acl-tokens", |options| {
///     Operation::get("/v1/acl/tokens", |raw| Ok(Tokens { index: raw.index(), list: raw.json()? }))
///         .query(Query::from(&options))
/// });
/// ```
pub struct OperationSource<T> {
    dispatcher: Dispatcher,
    label: String,
    factory: OperationFactory<T>,
}

impl<T> OperationSource<T> {
    pub fn new(
        dispatcher: Dispatcher,
        label: impl Into<String>,
        factory: impl Fn(BlockingQueryOptions) -> Operation<T> + Send + Sync + 'static,
    ) -> Self {
        Self {
            dispatcher,
            label: label.into(),
            factory: Arc::new(factory),
        }
    }
}

#[async_trait]
impl<T> WatchSource for OperationSource<T>
where
    T: Indexed + Clone + PartialEq + fmt::Debug + Send + Sync + 'static,
{
    type Value = T;

    async fn fetch(
        &self,
        options: BlockingQueryOptions,
    ) -> Result<Versioned<T>> {
        let operation = (self.factory)(options);
        self.dispatcher.execute(operation).await.map(Versioned::from)
    }

    fn describe(&self) -> String {
        self.label.clone()
    }
}
