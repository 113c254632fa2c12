//! In-process stand-in for the store's HTTP API, shared by unit tests
//!
//! Responses are scripted per test and served in order; every request is
//! recorded for assertions. Once the script runs out the server behaves like
//! an idle store holding a blocking query.

use std::collections::VecDeque;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::net::TcpListener;
use tokio::net::TcpSocket;
use tokio::net::TcpStream;
use tokio::sync::oneshot;
use warp::http::HeaderMap;
use warp::http::Method;
use warp::http::Response;
use warp::http::StatusCode;
use warp::hyper::body::Bytes;
use warp::Filter;

use crate::constants::INDEX_HEADER;
use crate::ClientConfig;

/// One scripted reply
#[derive(Debug, Clone)]
pub struct MockResponse {
    pub status: u16,
    pub index: Option<u64>,
    pub body: String,
    pub delay: Option<Duration>,
}

impl MockResponse {
    pub fn ok(body: impl Into<String>) -> Self {
        Self {
            status: 200,
            index: None,
            body: body.into(),
            delay: None,
        }
    }

    pub fn status(
        status: u16,
        body: impl Into<String>,
    ) -> Self {
        Self {
            status,
            ..Self::ok(body)
        }
    }

    pub fn not_found() -> Self {
        Self::status(404, "")
    }

    pub fn with_index(
        mut self,
        index: u64,
    ) -> Self {
        self.index = Some(index);
        self
    }

    pub fn with_delay(
        mut self,
        delay: Duration,
    ) -> Self {
        self.delay = Some(delay);
        self
    }
}

/// What the server saw
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: Method,
    pub path: String,
    pub query: String,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl RecordedRequest {
    /// Value of a query parameter; flags read as `Some("")`
    pub fn param(
        &self,
        key: &str,
    ) -> Option<String> {
        self.query.split('&').find_map(|pair| {
            let mut parts = pair.splitn(2, '=');
            let k = parts.next()?;
            (k == key).then(|| {
                urlencoding::decode(parts.next().unwrap_or_default())
                    .map(|v| v.into_owned())
                    .unwrap_or_default()
            })
        })
    }

    pub fn header(
        &self,
        name: &str,
    ) -> Option<String> {
        self.headers.get(name).and_then(|v| v.to_str().ok()).map(str::to_string)
    }
}

#[derive(Default)]
struct MockState {
    script: Mutex<VecDeque<MockResponse>>,
    requests: Mutex<Vec<RecordedRequest>>,
}

pub struct MockStore {
    addr: SocketAddr,
    state: Arc<MockState>,
    _shutdown: oneshot::Sender<()>,
}

impl MockStore {
    /// Binds an ephemeral local port and serves `script` in order
    pub async fn start(script: Vec<MockResponse>) -> Self {
        let state = Arc::new(MockState {
            script: Mutex::new(script.into()),
            requests: Mutex::new(Vec::new()),
        });

        let shared = state.clone();
        let route = warp::method()
            .and(warp::path::full())
            .and(warp::query::raw().or(warp::any().map(String::new)).unify())
            .and(warp::header::headers_cloned())
            .and(warp::body::bytes())
            .and_then(move |method, path: warp::path::FullPath, query, headers, body| {
                let state = shared.clone();
                async move {
                    state.requests.lock().push(RecordedRequest {
                        method,
                        path: path.as_str().to_string(),
                        query,
                        headers,
                        body,
                    });
                    let scripted = state.script.lock().pop_front();
                    Ok::<_, warp::Rejection>(reply(scripted).await)
                }
            });

        let (tx, rx) = oneshot::channel::<()>();
        let (addr, server) = warp::serve(route).bind_with_graceful_shutdown(([127, 0, 0, 1], 0), async move {
            let _ = rx.await;
        });
        tokio::spawn(server);

        Self {
            addr,
            state,
            _shutdown: tx,
        }
    }

    pub fn port(&self) -> u16 {
        self.addr.port()
    }

    /// Client configuration pointing at this server
    pub fn config(&self) -> ClientConfig {
        ClientConfig {
            host: "127.0.0.1".to_string(),
            port: self.port(),
            ..ClientConfig::default()
        }
    }

    pub fn push(
        &self,
        response: MockResponse,
    ) {
        self.state.script.lock().push_back(response);
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.state.requests.lock().clone()
    }

    pub fn last_request(&self) -> Option<RecordedRequest> {
        self.state.requests.lock().last().cloned()
    }
}

/// Client configuration for a local port nothing listens on
pub fn closed_port_config() -> ClientConfig {
    let port = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    };
    ClientConfig {
        host: "127.0.0.1".to_string(),
        port,
        ..ClientConfig::default()
    }
}

/// A local port whose TCP handshakes never complete
///
/// The listener has a backlog of one and never accepts. Its queue is filled
/// up front, so later connection attempts hang until the client's connect
/// timeout elapses.
pub struct StalledEndpoint {
    port: u16,
    _listener: TcpListener,
    _queued: Vec<TcpStream>,
}

impl StalledEndpoint {
    pub async fn start() -> Self {
        let socket = TcpSocket::new_v4().unwrap();
        socket.bind(SocketAddr::from(([127, 0, 0, 1], 0))).unwrap();
        let listener = socket.listen(1).unwrap();
        let port = listener.local_addr().unwrap().port();

        let mut queued = Vec::new();
        for _ in 0..8 {
            match tokio::time::timeout(Duration::from_millis(100), TcpStream::connect(("127.0.0.1", port))).await {
                Ok(Ok(stream)) => queued.push(stream),
                _ => break,
            }
        }

        Self {
            port,
            _listener: listener,
            _queued: queued,
        }
    }

    /// Client configuration with a short connect timeout
    pub fn config(&self) -> ClientConfig {
        ClientConfig {
            host: "127.0.0.1".to_string(),
            port: self.port,
            connect_timeout_ms: 200,
            ..ClientConfig::default()
        }
    }
}

async fn reply(scripted: Option<MockResponse>) -> Response<String> {
    let Some(scripted) = scripted else {
        // Idle store: hold the blocking query
        tokio::time::sleep(Duration::from_secs(3600)).await;
        return Response::builder()
            .status(StatusCode::OK)
            .body("[]".to_string())
            .unwrap_or_default();
    };

    if let Some(delay) = scripted.delay {
        tokio::time::sleep(delay).await;
    }
    let mut builder = Response::builder()
        .status(StatusCode::from_u16(scripted.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR));
    if let Some(index) = scripted.index {
        builder = builder.header(INDEX_HEADER, index.to_string());
    }
    builder.body(scripted.body).unwrap_or_default()
}
