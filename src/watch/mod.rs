//! Long-poll watches over blocking queries
//!
//! A [`Watch`] owns one polling task. Each poll blocks on the store until
//! the resource changes past the last seen index or the wait elapses:
//! - a changed `(value, index)` is delivered to the handler exactly once
//! - an unchanged state or a timeout loops again immediately
//! - any other error is delivered as a failure, then the task sleeps
//!   `min(n², delay_limit)` seconds before retrying at the same index
//! - an error that cannot heal by retrying (see [`Error::is_retryable`]) is
//!   delivered as a failure and ends the polling task
//!
//! Lifecycle misuse (double start, stop before start, double stop) is an
//! error, never a silent no-op.

mod backoff;
mod result;
mod source;
mod state;

pub(crate) use backoff::*;
pub use result::*;
pub use source::*;
pub use state::*;

#[cfg(test)]
mod backoff_test;
#[cfg(test)]
mod state_test;

use std::sync::atomic::AtomicBool;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;

use arc_swap::ArcSwapOption;
use parking_lot::Mutex;
use parking_lot::ReentrantMutex;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::debug;
use tracing::error;
use tracing::info;
use tracing::warn;

use crate::client::BlockingQueryOptions;
use crate::metrics::WATCH_EVENTS_TOTAL;
use crate::Error;
use crate::LifecycleError;
use crate::Result;
use crate::WatchConfig;

struct Handler<T>(Box<dyn Fn(WatchResult<T>) + Send + Sync>);

enum Lifecycle {
    Created,
    Running(JoinHandle<()>),
    Stopped,
}

/// State shared between the handle and its polling task
struct Shared<T> {
    handler: ArcSwapOption<Handler<T>>,
    stopped: AtomicBool,
    cancel: CancellationToken,
    /// Held while a notification is delivered. Re-entrant so a handler may
    /// stop its own watch.
    delivery: ReentrantMutex<()>,
}

impl<T> Shared<T> {
    fn is_stopped(&self) -> bool {
        self.stopped.load(Ordering::Acquire)
    }

    /// Hands `result` to the handler unless the watch was stopped.
    /// Returns false once stopped.
    fn deliver(
        &self,
        result: WatchResult<T>,
    ) -> bool {
        let _guard = self.delivery.lock();
        if self.is_stopped() {
            return false;
        }
        if let Some(handler) = self.handler.load_full() {
            (handler.0)(result);
        }
        !self.is_stopped()
    }
}

/// Handle of one watched resource
///
/// ```ignore
/// let watch = client.watch_key("service/web/leader");
/// watch.set_handler(|result| {
///     if let Some(kv) = result.next() {
///         println!("leader is now {:?}", kv.value);
///     }
/// });
/// watch.start()?;
/// // ...
/// watch.stop()?;
/// ```
///
/// Dropping a running watch cancels its task without notifying.
pub struct Watch<S: WatchSource> {
    source: Arc<S>,
    wait: String,
    delay_limit: Duration,
    shared: Arc<Shared<S::Value>>,
    lifecycle: Mutex<Lifecycle>,
}

impl<S: WatchSource> Watch<S> {
    pub fn new(
        source: S,
        config: &WatchConfig,
    ) -> Self {
        Self {
            source: Arc::new(source),
            wait: config.effective_wait(),
            delay_limit: Duration::from_secs(config.delay_limit_secs),
            shared: Arc::new(Shared {
                handler: ArcSwapOption::empty(),
                stopped: AtomicBool::new(false),
                cancel: CancellationToken::new(),
                delivery: ReentrantMutex::new(()),
            }),
            lifecycle: Mutex::new(Lifecycle::Created),
        }
    }

    /// Sets the callback receiving every change and failure, replacing any
    /// previous one. May be called before or after `start`.
    pub fn set_handler(
        &self,
        handler: impl Fn(WatchResult<S::Value>) + Send + Sync + 'static,
    ) -> &Self {
        self.shared.handler.store(Some(Arc::new(Handler(Box::new(handler)))));
        self
    }

    /// Spawns the polling task on the current tokio runtime
    ///
    /// # Errors
    /// - [`LifecycleError::AlreadyStarted`] if the watch was started before,
    ///   including a watch that has since been stopped
    /// - [`Error::InvalidRequest`] when called outside a tokio runtime
    pub fn start(&self) -> Result<()> {
        let mut lifecycle = self.lifecycle.lock();
        if !matches!(*lifecycle, Lifecycle::Created) {
            return Err(LifecycleError::AlreadyStarted.into());
        }
        let runtime = tokio::runtime::Handle::try_current()
            .map_err(|e| Error::InvalidRequest(format!("watch must be started inside a tokio runtime: {e}")))?;

        info!("[Watch::start] {} wait={}", self.source.describe(), self.wait);
        let task = runtime.spawn(poll_loop(
            self.source.clone(),
            self.shared.clone(),
            self.wait.clone(),
            self.delay_limit,
        ));
        *lifecycle = Lifecycle::Running(task);
        Ok(())
    }

    /// Stops the watch
    ///
    /// No notification is delivered after this returns. A poll already in
    /// flight is dropped and its outcome discarded. Safe to call from inside
    /// the handler.
    ///
    /// # Errors
    /// - [`LifecycleError::NotStarted`] if the watch was never started
    /// - [`LifecycleError::AlreadyStopped`] on a second call
    pub fn stop(&self) -> Result<()> {
        {
            let mut lifecycle = self.lifecycle.lock();
            match &*lifecycle {
                Lifecycle::Created => return Err(LifecycleError::NotStarted.into()),
                Lifecycle::Stopped => return Err(LifecycleError::AlreadyStopped.into()),
                Lifecycle::Running(_) => {}
            }
            *lifecycle = Lifecycle::Stopped;
        }

        // Waits for a delivery running on another thread
        let _guard = self.shared.delivery.lock();
        self.shared.stopped.store(true, Ordering::Release);
        self.shared.cancel.cancel();
        info!("[Watch::stop] {}", self.source.describe());
        Ok(())
    }

    /// True while the polling task is alive. A task that gave up on a
    /// non-retryable error is no longer running, but still has to be stopped.
    pub fn is_running(&self) -> bool {
        matches!(&*self.lifecycle.lock(), Lifecycle::Running(task) if !task.is_finished())
    }

    pub fn source(&self) -> &S {
        &self.source
    }
}

impl<S: WatchSource> Drop for Watch<S> {
    fn drop(&mut self) {
        self.shared.stopped.store(true, Ordering::Release);
        self.shared.cancel.cancel();
    }
}

async fn poll_loop<S: WatchSource>(
    source: Arc<S>,
    shared: Arc<Shared<S::Value>>,
    wait: String,
    delay_limit: Duration,
) {
    let label = source.describe();
    let mut state = WatchState::<S::Value>::initial();
    let mut backoff = Backoff::new(delay_limit);

    while !shared.is_stopped() {
        let options = BlockingQueryOptions::new(state.index(), wait.as_str());
        let outcome = tokio::select! {
            _ = shared.cancel.cancelled() => break,
            outcome = source.fetch(options) => outcome,
        };

        match outcome {
            Ok(versioned) => {
                backoff.reset();
                let next = WatchState::from(versioned);
                if next == state {
                    WATCH_EVENTS_TOTAL.with_label_values(&["unchanged"]).inc();
                    debug!("[poll_loop] {} unchanged at index {}", label, state.index());
                    continue;
                }

                let prev = std::mem::replace(&mut state, next).into_value();
                debug!("[poll_loop] {} changed, index {}", label, state.index());
                WATCH_EVENTS_TOTAL.with_label_values(&["change"]).inc();
                if !shared.deliver(WatchResult::succeeded(prev, state.value().cloned())) {
                    break;
                }
            }
            Err(e) if e.is_timeout() => {
                WATCH_EVENTS_TOTAL.with_label_values(&["timeout"]).inc();
                debug!("[poll_loop] {} blocking query timed out, polling again", label);
            }
            Err(e) if !e.is_retryable() => {
                error!("[poll_loop] {} cannot be polled: {}. Giving up", label, e);
                WATCH_EVENTS_TOTAL.with_label_values(&["failure"]).inc();
                shared.deliver(WatchResult::failed(state.value().cloned(), e));
                break;
            }
            Err(e) => {
                let delay = backoff.next_delay();
                if backoff.failures() > 1 {
                    error!(
                        "[poll_loop] {} failed {} times in a row: {}. Retrying in {:?}",
                        label,
                        backoff.failures(),
                        e,
                        delay
                    );
                } else {
                    warn!("[poll_loop] {} failed: {}. Retrying in {:?}", label, e, delay);
                }
                WATCH_EVENTS_TOTAL.with_label_values(&["failure"]).inc();
                if !shared.deliver(WatchResult::failed(state.value().cloned(), e)) {
                    break;
                }
                tokio::select! {
                    _ = shared.cancel.cancelled() => break,
                    _ = tokio::time::sleep(delay) => {}
                }
            }
        }
    }
    debug!("[poll_loop] {} exited", label);
}
