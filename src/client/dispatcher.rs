use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use reqwest::Method;
use reqwest::Url;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;
use tracing::warn;

use super::response::classify;
use super::response::parse_index;
use super::response::Classified;
use super::response::RawResponse;
use super::response::ResponseMeta;
use super::response::STATUS_CONFLICT;
use super::response::STATUS_OK;
use super::Query;
use crate::constants::DC_PARAM;
use crate::constants::INDEX_HEADER;
use crate::constants::TOKEN_HEADER;
use crate::metrics::REQUESTS_TOTAL;
use crate::ClientConfig;
use crate::Error;
use crate::Result;

type Mapper<T> = Box<dyn FnOnce(RawResponse) -> Result<T> + Send>;
type EmptyMapper<T> = Box<dyn FnOnce(ResponseMeta) -> T + Send>;

/// One logical call against the HTTP API
///
/// Built per call and consumed by [`Dispatcher::execute`]. The mapper turns
/// an accepted response into the typed result; the store's resource schemas
/// live entirely in mappers.
pub struct Operation<T> {
    method: Method,
    path: String,
    query: Query,
    body: Option<Vec<u8>>,
    allowed: Vec<u16>,
    timeout: Option<Duration>,
    mapper: Mapper<T>,
    empty: Option<EmptyMapper<T>>,
}

impl<T> Operation<T> {
    /// Creates an operation accepting only `200 OK`
    pub fn new(
        method: Method,
        path: impl Into<String>,
        mapper: impl FnOnce(RawResponse) -> Result<T> + Send + 'static,
    ) -> Self {
        Self {
            method,
            path: path.into(),
            query: Query::new(),
            body: None,
            allowed: vec![STATUS_OK],
            timeout: None,
            mapper: Box::new(mapper),
            empty: None,
        }
    }

    pub fn get(
        path: impl Into<String>,
        mapper: impl FnOnce(RawResponse) -> Result<T> + Send + 'static,
    ) -> Self {
        Self::new(Method::GET, path, mapper)
    }

    pub fn put(
        path: impl Into<String>,
        mapper: impl FnOnce(RawResponse) -> Result<T> + Send + 'static,
    ) -> Self {
        Self::new(Method::PUT, path, mapper)
    }

    pub fn delete(
        path: impl Into<String>,
        mapper: impl FnOnce(RawResponse) -> Result<T> + Send + 'static,
    ) -> Self {
        Self::new(Method::DELETE, path, mapper)
    }

    pub fn query(
        mut self,
        query: Query,
    ) -> Self {
        self.query = query;
        self
    }

    /// Sends `body` serialized as JSON
    pub fn json_body<B: Serialize + ?Sized>(
        mut self,
        body: &B,
    ) -> Result<Self> {
        self.body = Some(serde_json::to_vec(body).map_err(|e| Error::InvalidRequest(e.to_string()))?);
        Ok(self)
    }

    /// Sends `body` as raw text
    pub fn text_body(
        mut self,
        body: impl Into<String>,
    ) -> Self {
        self.body = Some(body.into().into_bytes());
        self
    }

    /// Treats `status` as a non-error for this call
    pub fn allow(
        mut self,
        status: u16,
    ) -> Self {
        if !self.allowed.contains(&status) {
            self.allowed.push(status);
        }
        self
    }

    /// Accepts `409 Conflict`, the status transaction endpoints answer with
    /// when a write was rolled back. The mapper sees the conflict body.
    pub fn allow_conflict(self) -> Self {
        self.allow(STATUS_CONFLICT)
    }

    /// Maps `404 Not Found` to an empty value instead of an error.
    ///
    /// Used by idempotent reads where absence of the resource is a valid
    /// answer and must not look like a failure.
    pub fn empty_on_not_found(
        mut self,
        empty: impl FnOnce(ResponseMeta) -> T + Send + 'static,
    ) -> Self {
        self.empty = Some(Box::new(empty));
        self
    }

    /// Overrides the configured request timeout for this call only
    pub fn timeout(
        mut self,
        timeout: Duration,
    ) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn query_params(&self) -> &Query {
        &self.query
    }
}

impl<T: DeserializeOwned + 'static> Operation<T> {
    /// GET whose body deserializes straight into `T`
    pub fn get_json(path: impl Into<String>) -> Self {
        Self::get(path, |raw| raw.json())
    }
}

impl<T> fmt::Debug for Operation<T> {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.debug_struct("Operation")
            .field("method", &self.method)
            .field("path", &self.path)
            .field("query", &self.query)
            .field("allowed", &self.allowed)
            .field("empty_on_not_found", &self.empty.is_some())
            .finish()
    }
}

/// Issues one HTTP exchange per [`Operation`]
///
/// Cheap to clone. All clones share one connection pool; the pool is
/// synchronized internally, so calls from any task go straight to it and
/// no caller-side lock is needed.
#[derive(Clone)]
pub struct Dispatcher {
    http: reqwest::Client,
    config: Arc<ClientConfig>,
}

impl Dispatcher {
    pub fn new(config: ClientConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(config.user_agent.clone())
            .connect_timeout(config.connect_timeout())
            .build()
            .map_err(|e| Error::InvalidRequest(format!("failed to build HTTP client: {e}")))?;
        Ok(Self {
            http,
            config: Arc::new(config),
        })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Executes `operation` once. Never retries.
    ///
    /// The configured datacenter is a fallback: it is only added when the
    /// operation did not name one itself.
    ///
    /// # Errors
    /// - [`Error::Transport`] when no response was received
    /// - [`Error::Timeout`] when the request timeout elapsed
    /// - [`Error::Protocol`] when the status is not allowed
    /// - [`Error::Decode`] when the mapper cannot parse the body
    pub async fn execute<T>(
        &self,
        operation: Operation<T>,
    ) -> Result<T> {
        let Operation {
            method,
            path,
            mut query,
            body,
            allowed,
            timeout,
            mapper,
            empty,
        } = operation;

        if let Some(dc) = &self.config.dc {
            query = query.put_if_absent(DC_PARAM, dc);
        }
        let url = self.url(&path, &query)?;
        debug!("[Dispatcher::execute] {} {}", method, url);

        let mut request = self.http.request(method.clone(), url);
        if let Some(token) = &self.config.acl_token {
            request = request.header(TOKEN_HEADER, token);
        }
        if let Some(timeout) = timeout.or_else(|| self.config.request_timeout()) {
            request = request.timeout(timeout);
        }
        if let Some(body) = body {
            request = request.body(body);
        }

        let response = match request.send().await {
            Ok(response) => response,
            Err(e) => {
                let err = Error::from(e);
                record(&method, &err);
                debug!("[Dispatcher::execute] {} {} failed: {}", method, path, err);
                return Err(err);
            }
        };

        let status = response.status();
        let reason = status.canonical_reason().unwrap_or_default().to_string();
        let index = parse_index(response.headers().get(INDEX_HEADER).and_then(|v| v.to_str().ok()));
        let body = match response.bytes().await {
            Ok(bytes) => bytes.to_vec(),
            Err(e) => {
                let err = Error::from(e);
                record(&method, &err);
                return Err(err);
            }
        };

        let outcome = classify(status.as_u16(), &reason, index, body, &allowed, empty.is_some()).and_then(
            |classified| match (classified, empty) {
                (Classified::Body(raw), _) => mapper(raw),
                (Classified::Empty(meta), Some(empty)) => Ok(empty(meta)),
                (Classified::Empty(meta), None) => Err(Error::protocol(meta.status, &reason, &[])),
            },
        );

        match &outcome {
            Ok(_) => {
                REQUESTS_TOTAL.with_label_values(&[method.as_str(), "success"]).inc();
            }
            Err(err) => {
                warn!("[Dispatcher::execute] {} {} -> {}", method, path, err);
                record(&method, err);
            }
        }
        outcome
    }

    fn url(
        &self,
        path: &str,
        query: &Query,
    ) -> Result<Url> {
        let mut url = Url::parse(&format!("{}{}", self.config.base_url(), path))
            .map_err(|e| Error::InvalidRequest(format!("invalid request path {path}: {e}")))?;
        if !query.is_empty() {
            url.set_query(Some(&query.encode()));
        }
        Ok(url)
    }
}

fn record(
    method: &Method,
    err: &Error,
) {
    let outcome = match err {
        Error::Transport { .. } => "transport",
        Error::Timeout(_) => "timeout",
        Error::Protocol { .. } => "protocol",
        Error::Decode(_) => "decode",
        _ => "other",
    };
    REQUESTS_TOTAL.with_label_values(&[method.as_str(), outcome]).inc();
}

/// Percent-encodes every segment of a key while keeping `/` separators
pub(crate) fn encode_path(key: &str) -> String {
    key.split('/')
        .map(|segment| urlencoding::encode(segment).into_owned())
        .collect::<Vec<_>>()
        .join("/")
}
