use std::future::Future;
use std::time::Duration;

use tracing::{debug, warn};

use crate::error::{Error, Result};

/// How often and how patiently a backend retries one request
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    /// Attempts including the first; values below 1 behave as 1
    pub attempts: u32,
    pub delay: Duration,
}

impl RetryPolicy {
    pub const fn new(attempts: u32, delay_ms: u64) -> Self {
        Self {
            attempts,
            delay: Duration::from_millis(delay_ms),
        }
    }

    /// A single attempt, no retry
    pub const fn once() -> Self {
        Self::new(1, 0)
    }

    /// Run `op` until it succeeds, fails permanently, or attempts run out.
    ///
    /// Only errors for which [`Error::is_transient`] holds are retried. A
    /// rate limit with a `retry_after` hint waits that long instead of the
    /// configured delay.
    pub async fn run<T, F, Fut>(&self, mut op: F) -> Result<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let attempts = self.attempts.max(1);
        let mut attempt = 1;

        loop {
            match op().await {
                Ok(value) => return Ok(value),
                Err(e) if e.is_transient() && attempt < attempts => {
                    let wait = match &e {
                        Error::TranslationRateLimited {
                            retry_after: Some(secs),
                        } => Duration::from_secs(*secs),
                        _ => self.delay,
                    };
                    warn!(
                        "Attempt {}/{} failed: {}; retrying in {:?}",
                        attempt, attempts, e, wait
                    );
                    tokio::time::sleep(wait).await;
                    attempt += 1;
                }
                Err(e) => {
                    debug!("Giving up after {} attempt(s): {}", attempt, e);
                    return Err(e);
                }
            }
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::once()
    }
}
