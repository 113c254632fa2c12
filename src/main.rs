use consul_watch::start_server;
use consul_watch::Client;
use consul_watch::ConsulConfig;
use consul_watch::Result;
use consul_watch::Watch;
use consul_watch::WatchResult;
use consul_watch::WatchSource;
use tokio::signal::unix::signal;
use tokio::signal::unix::SignalKind;
use tokio::sync::watch;
use tracing::error;
use tracing::info;
use tracing::warn;
use tracing_subscriber::EnvFilter;

#[tokio::main(flavor = "multi_thread", worker_threads = 2)]
async fn main() -> Result<()> {
    // Initializing Logs
    init_observability();

    let settings = ConsulConfig::new()?.validate()?;

    // Initializing Shutdown Signal
    let (graceful_tx, graceful_rx) = watch::channel(());

    if settings.monitoring.prometheus_enabled {
        tokio::spawn(start_server(settings.monitoring.prometheus_port, graceful_rx.clone()));
    }

    let client = Client::builder()
        .set_config(settings.client.clone())
        .watch_config(settings.watch.clone())
        .build()?;
    info!("Watching agent at {}", client.config().base_url());

    let mut key_watches = Vec::new();
    for key in &settings.watch.keys {
        let watch = client.watch_key(key.as_str());
        let key = key.clone();
        watch.set_handler(move |result| {
            log_result(&key, result, |kv| kv.value.clone().unwrap_or_default());
        });
        watch.start()?;
        key_watches.push(watch);
    }

    let mut prefix_watches = Vec::new();
    for prefix in &settings.watch.prefixes {
        let watch = client.watch_key_prefix(prefix.as_str());
        let prefix = prefix.clone();
        watch.set_handler(move |result| {
            log_result(&prefix, result, |list| {
                list.list
                    .iter()
                    .map(|kv| format!("{}={}", kv.key, kv.value.as_deref().unwrap_or_default()))
                    .collect::<Vec<_>>()
                    .join(", ")
            });
        });
        watch.start()?;
        prefix_watches.push(watch);
    }

    if key_watches.is_empty() && prefix_watches.is_empty() {
        warn!("Nothing to watch: set watch.keys or watch.prefixes");
    }

    info!("Application started. Waiting for CTRL+C signal...");
    // Listen on Shutdown Signal
    tokio::spawn(async {
        if let Err(e) = graceful_shutdown(graceful_tx).await {
            error!("Failed to shutdown: {:?}", e);
        }
    });

    let mut shutdown = graceful_rx;
    let _ = shutdown.changed().await;

    stop_all(&key_watches);
    stop_all(&prefix_watches);

    println!("Exiting program.");
    Ok(())
}

fn log_result<T>(
    target: &str,
    result: WatchResult<T>,
    render: impl Fn(&T) -> String,
) {
    match (result.cause(), result.next()) {
        (Some(cause), _) => warn!("{}: watch failed: {}", target, cause),
        (None, Some(next)) => info!(
            "{}: {} -> {}",
            target,
            result.prev().map(&render).unwrap_or_else(|| "<none>".to_string()),
            render(next)
        ),
        (None, None) => {}
    }
}

fn stop_all<S: WatchSource>(watches: &[Watch<S>]) {
    for watch in watches {
        if let Err(e) = watch.stop() {
            error!("Failed to stop {}: {}", watch.source().describe(), e);
        }
    }
}

async fn graceful_shutdown(graceful_tx: watch::Sender<()>) -> std::io::Result<()> {
    let mut sigint = signal(SignalKind::interrupt())?;
    let mut sigterm = signal(SignalKind::terminate())?;
    tokio::select! {
        _ = sigint.recv() => {
            info!("SIGINT detected.");
        },
        _ = sigterm.recv() => {
            info!("SIGTERM detected.");
        },
    }

    info!("Shutting down watches..");
    if graceful_tx.send(()).is_err() {
        error!("Failed to send shutdown signal: receiver dropped");
    }
    Ok(())
}

fn init_observability() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}
