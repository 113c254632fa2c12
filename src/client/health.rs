use super::dispatcher::encode_path;
use super::BlockingQueryOptions;
use super::Dispatcher;
use super::Operation;
use super::Query;
use crate::types::ServiceEntryList;
use crate::Error;
use crate::Result;

#[derive(Clone)]
pub struct HealthClient {
    dispatcher: Dispatcher,
}

impl HealthClient {
    pub(crate) fn new(dispatcher: Dispatcher) -> Self {
        Self { dispatcher }
    }

    /// Instances of `service` with their node and checks
    ///
    /// # Parameters
    /// - `passing`: only return instances whose checks all pass
    pub async fn service_nodes(
        &self,
        service: &str,
        passing: bool,
        options: Option<&BlockingQueryOptions>,
    ) -> Result<ServiceEntryList> {
        if service.is_empty() {
            return Err(Error::InvalidRequest("service name cannot be empty".into()));
        }
        let operation = Operation::get(format!("/v1/health/service/{}", encode_path(service)), |raw| {
            Ok(ServiceEntryList {
                index: raw.index(),
                list: raw.json()?,
            })
        })
        .query(Query::new().flag("passing", passing).blocking(options));
        self.dispatcher.execute(operation).await
    }
}
