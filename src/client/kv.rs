use tracing::debug;

use super::dispatcher::encode_path;
use super::BlockingQueryOptions;
use super::Dispatcher;
use super::Operation;
use super::Query;
use super::RawResponse;
use crate::types::KeyValue;
use crate::types::KeyValueList;
use crate::types::KeyValueOptions;
use crate::watch::Versioned;
use crate::Error;
use crate::Result;

const KV_PATH: &str = "/v1/kv/";

/// Key-value store client interface
///
/// Reads map `404 Not Found` to an absent value or an empty list: the store
/// answers 404 for missing keys and empty prefixes.
#[derive(Clone)]
pub struct KvClient {
    dispatcher: Dispatcher,
}

impl KvClient {
    pub(crate) fn new(dispatcher: Dispatcher) -> Self {
        Self { dispatcher }
    }

    /// Reads one key
    ///
    /// # Returns
    /// - `Ok(Some(KeyValue))` if the key exists
    /// - `Ok(None)` if it does not
    pub async fn get_value(
        &self,
        key: &str,
        options: Option<&BlockingQueryOptions>,
    ) -> Result<Option<KeyValue>> {
        let versioned = self.versioned_value(key, options).await?;
        Ok(Some(versioned.value).filter(KeyValue::is_present))
    }

    /// Reads one key together with the response index, which is also
    /// returned for a missing key
    pub(crate) async fn versioned_value(
        &self,
        key: &str,
        options: Option<&BlockingQueryOptions>,
    ) -> Result<Versioned<KeyValue>> {
        self.dispatcher.execute(value_operation(key, options)).await
    }

    /// Reads every entry under `prefix`
    pub async fn get_values(
        &self,
        prefix: &str,
        options: Option<&BlockingQueryOptions>,
    ) -> Result<KeyValueList> {
        self.dispatcher.execute(values_operation(prefix, options)).await
    }

    /// Lists the keys under `prefix` without their values
    pub async fn get_keys(
        &self,
        prefix: &str,
        options: Option<&BlockingQueryOptions>,
    ) -> Result<Vec<String>> {
        let query = Query::new().flag("keys", true).blocking(options);
        let operation = Operation::get(kv_path(prefix), |raw| raw.json::<Vec<String>>())
            .query(query)
            .empty_on_not_found(|_| Vec::new());
        self.dispatcher.execute(operation).await
    }

    /// Writes `value` under `key`
    ///
    /// # Returns
    /// The store's verdict: `false` when a check-and-set or lock condition
    /// rejected the write.
    pub async fn put_value(
        &self,
        key: &str,
        value: impl Into<String>,
        options: Option<&KeyValueOptions>,
    ) -> Result<bool> {
        if key.is_empty() {
            return Err(Error::InvalidRequest("key cannot be empty".into()));
        }
        let mut query = Query::new();
        if let Some(options) = options {
            query = query
                .put_opt("flags", (options.flags != 0).then_some(options.flags))
                .put_opt("acquire", options.acquire_session.as_deref())
                .put_opt("release", options.release_session.as_deref())
                .put_opt("cas", options.cas_index);
        }
        let operation = Operation::put(kv_path(key), parse_verdict)
            .query(query)
            .text_body(value);
        let written = self.dispatcher.execute(operation).await?;
        debug!("[KvClient::put_value] {} written: {}", key, written);
        Ok(written)
    }

    /// Deletes one key. Deleting a missing key succeeds.
    pub async fn delete_value(
        &self,
        key: &str,
    ) -> Result<()> {
        let operation = Operation::delete(kv_path(key), |_| Ok(()));
        self.dispatcher.execute(operation).await
    }

    /// Deletes `prefix` and every key below it
    pub async fn delete_values(
        &self,
        prefix: &str,
    ) -> Result<()> {
        let operation = Operation::delete(kv_path(prefix), |_| Ok(())).query(Query::new().flag("recurse", true));
        self.dispatcher.execute(operation).await
    }
}

/// Single key read; an absent key reads as the default entry at the
/// response's index
fn value_operation(
    key: &str,
    options: Option<&BlockingQueryOptions>,
) -> Operation<Versioned<KeyValue>> {
    Operation::get(kv_path(key), |raw| {
        let index = raw.index();
        let entries: Vec<KeyValue> = raw.json()?;
        let value = entries.into_iter().next().unwrap_or_default();
        Ok(Versioned::new(value, index))
    })
    .query(Query::new().blocking(options))
    .empty_on_not_found(|meta| Versioned::new(KeyValue::default(), meta.index))
}

fn values_operation(
    prefix: &str,
    options: Option<&BlockingQueryOptions>,
) -> Operation<KeyValueList> {
    Operation::get(kv_path(prefix), |raw| {
        Ok(KeyValueList {
            index: raw.index(),
            list: raw.json()?,
        })
    })
    .query(Query::new().flag("recurse", true).blocking(options))
    .empty_on_not_found(|meta| KeyValueList {
        index: meta.index,
        list: Vec::new(),
    })
}

fn kv_path(key: &str) -> String {
    format!("{}{}", KV_PATH, encode_path(key.trim_start_matches('/')))
}

fn parse_verdict(raw: RawResponse) -> Result<bool> {
    match raw.text()?.as_str() {
        "true" => Ok(true),
        "false" => Ok(false),
        other => Err(Error::Decode(format!("expected true or false, got '{other}'"))),
    }
}
