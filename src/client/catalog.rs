use std::collections::BTreeMap;

use super::BlockingQueryOptions;
use super::Dispatcher;
use super::Operation;
use super::Query;
use crate::types::NodeList;
use crate::types::ServiceList;
use crate::Result;

/// Read access to the service catalog
#[derive(Clone)]
pub struct CatalogClient {
    dispatcher: Dispatcher,
}

impl CatalogClient {
    pub(crate) fn new(dispatcher: Dispatcher) -> Self {
        Self { dispatcher }
    }

    /// Services registered in the datacenter, with their tags
    pub async fn services(
        &self,
        options: Option<&BlockingQueryOptions>,
    ) -> Result<ServiceList> {
        let operation = Operation::get("/v1/catalog/services", |raw| {
            let services: BTreeMap<String, Option<Vec<String>>> = raw.json()?;
            Ok(ServiceList::from_catalog(raw.index(), services))
        })
        .query(Query::new().blocking(options));
        self.dispatcher.execute(operation).await
    }

    /// Nodes registered in the datacenter
    pub async fn nodes(
        &self,
        options: Option<&BlockingQueryOptions>,
    ) -> Result<NodeList> {
        let operation = Operation::get("/v1/catalog/nodes", |raw| {
            Ok(NodeList {
                index: raw.index(),
                list: raw.json()?,
            })
        })
        .query(Query::new().blocking(options));
        self.dispatcher.execute(operation).await
    }
}
