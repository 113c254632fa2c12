use std::time::Duration;

/// Failure delay of a watch: `min(n², limit)` seconds after the n-th
/// consecutive failure
#[derive(Debug, Clone)]
pub(crate) struct Backoff {
    failures: u32,
    limit: Duration,
}

impl Backoff {
    pub(crate) fn new(limit: Duration) -> Self {
        Self { failures: 0, limit }
    }

    /// Counts one more failure and returns how long to wait before retrying
    pub(crate) fn next_delay(&mut self) -> Duration {
        self.failures = self.failures.saturating_add(1);
        let n = u64::from(self.failures);
        Duration::from_secs(n.saturating_mul(n)).min(self.limit)
    }

    pub(crate) fn reset(&mut self) {
        self.failures = 0;
    }

    pub(crate) fn failures(&self) -> u32 {
        self.failures
    }
}
