use lazy_static::lazy_static;
use prometheus::register_int_counter_vec;
use prometheus::Encoder;
use prometheus::IntCounterVec;
use tokio::sync::watch;
use tracing::error;
use tracing::info;
use warp::Filter;
use warp::Rejection;
use warp::Reply;


lazy_static! {
    /// Outcome of every dispatched request: success, transport, timeout, protocol, decode
    pub static ref REQUESTS_TOTAL: IntCounterVec = register_int_counter_vec!(
        "consul_requests_total",
        "Requests issued against the HTTP API by outcome",
        &["method", "outcome"]
    )
    .expect("metric can not be created");

    /// Watch loop events: change, unchanged, timeout, failure
    pub static ref WATCH_EVENTS_TOTAL: IntCounterVec = register_int_counter_vec!(
        "consul_watch_events_total",
        "Blocking-query watch poll outcomes",
        &["kind"]
    )
    .expect("metric can not be created");
}

/// Serves `/metrics` until `shutdown_signal` fires
pub async fn start_server(
    port: u16,
    mut shutdown_signal: watch::Receiver<()>,
) {
    let metrics_route = warp::path!("metrics").and_then(metrics_handler);

    info!("Serving metrics on port {}", port);
    let (_, server) = warp::serve(metrics_route).bind_with_graceful_shutdown(([0, 0, 0, 0], port), async move {
        let _ = shutdown_signal.changed().await;
    });
    server.await;
}

pub(crate) async fn metrics_handler() -> Result<impl Reply, Rejection> {
    let encoder = prometheus::TextEncoder::new();

    let mut buffer = Vec::new();
    if let Err(e) = encoder.encode(&prometheus::gather(), &mut buffer) {
        error!("could not encode metrics: {}", e);
    }
    let body = String::from_utf8(buffer).unwrap_or_else(|e| {
        error!("metrics could not be from_utf8'd: {}", e);
        String::default()
    });
    Ok(body)
}
