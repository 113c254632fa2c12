use tracing::debug;

use super::dispatcher::encode_path;
use super::BlockingQueryOptions;
use super::Dispatcher;
use super::Operation;
use super::Query;
use crate::types::Event;
use crate::types::EventList;
use crate::types::EventOptions;
use crate::Error;
use crate::Result;

/// User events: fire and list
#[derive(Clone)]
pub struct EventClient {
    dispatcher: Dispatcher,
}

impl EventClient {
    pub(crate) fn new(dispatcher: Dispatcher) -> Self {
        Self { dispatcher }
    }

    /// Fires event `name`, optionally filtered to nodes, services or tags
    pub async fn fire(
        &self,
        name: &str,
        options: Option<&EventOptions>,
    ) -> Result<Event> {
        if name.is_empty() {
            return Err(Error::InvalidRequest("event name cannot be empty".into()));
        }
        let mut query = Query::new();
        let mut payload = String::new();
        if let Some(options) = options {
            query = query
                .put_opt("node", options.node.as_deref())
                .put_opt("service", options.service.as_deref())
                .put_opt("tag", options.tag.as_deref());
            payload = options.payload.clone().unwrap_or_default();
        }
        let operation = Operation::put(format!("/v1/event/fire/{}", encode_path(name)), |raw| raw.json::<Event>())
            .query(query)
            .text_body(payload);
        let event = self.dispatcher.execute(operation).await?;
        debug!("[EventClient::fire] {} -> {}", name, event.id);
        Ok(event)
    }

    /// Most recent events known to the agent, optionally only those named `name`
    pub async fn list(
        &self,
        name: Option<&str>,
        options: Option<&BlockingQueryOptions>,
    ) -> Result<EventList> {
        let operation = Operation::get("/v1/event/list", |raw| {
            Ok(EventList {
                index: raw.index(),
                list: raw.json()?,
            })
        })
        .query(Query::new().put_opt("name", name).blocking(options));
        self.dispatcher.execute(operation).await
    }
}
