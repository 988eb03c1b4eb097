//! Fixed-delay retry for transient fetch failures.
//!
//! Permanent errors (404, other 4xx, undecodable bodies) are returned on the
//! first attempt.

use std::future::Future;
use std::time::Duration;

use crate::error::ScraperError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Additional attempts after the first failure.
    pub max_retries: u32,
    /// Sleep between attempts. Constant, not exponential.
    pub delay: Duration,
}

impl RetryPolicy {
    #[must_use]
    pub fn new(max_retries: u32, delay: Duration) -> Self {
        Self { max_retries, delay }
    }

    #[must_use]
    pub fn none() -> Self {
        Self::new(0, Duration::ZERO)
    }

    /// Runs `operation` until it succeeds, fails permanently, or the retry
    /// budget is spent. With `max_retries = 3` the operation runs at most
    /// four times and the last error is returned.
    ///
    /// # Errors
    ///
    /// Returns the first non-transient error, or the last transient one once
    /// retries are exhausted.
    pub async fn run<T, F, Fut>(&self, mut operation: F) -> Result<T, ScraperError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, ScraperError>>,
    {
        let mut attempt = 0u32;

        loop {
            let err = match operation().await {
                Ok(value) => return Ok(value),
                Err(err) => err,
            };

            if !err.is_transient() || attempt >= self.max_retries {
                return Err(err);
            }
            attempt += 1;

            tracing::warn!(
                attempt,
                max_retries = self.max_retries,
                delay_secs = self.delay.as_secs(),
                error = %err,
                "transient fetch error, retrying after fixed delay"
            );
            tokio::time::sleep(self.delay).await;
        }
    }
}
