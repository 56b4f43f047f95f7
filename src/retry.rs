//! Exponential backoff with jitter for transient failures.

use std::future::Future;
use std::time::Duration;

use rand::Rng as _;

/// Errors that can tell a transient failure from a permanent one.
pub trait Transient {
    fn is_transient(&self) -> bool;
}

#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Retries after the first attempt.
    pub max_retries: u32,
    pub base_delay: Duration,
    pub max_delay: Duration,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 2,
            base_delay: Duration::from_secs(5),
            max_delay: Duration::from_secs(60),
        }
    }
}

impl RetryConfig {
    /// Wait before retry number `retry` (0-based): the base delay doubled per
    /// retry, capped at `max_delay`, plus up to one base delay of jitter.
    pub fn backoff(&self, retry: u32) -> Duration {
        let factor = 1u32.checked_shl(retry).unwrap_or(u32::MAX);
        let exponential = self.base_delay.saturating_mul(factor).min(self.max_delay);
        let base_ms = self.base_delay.as_millis() as u64;
        let jitter = if base_ms > 0 {
            rand::thread_rng().gen_range(0..base_ms)
        } else {
            0
        };
        exponential + Duration::from_millis(jitter)
    }
}

/// Run `operation` until it succeeds, fails permanently, or retries run out.
///
/// The attempt number (0-based) is passed to `operation`. The error of the
/// last attempt is returned.
pub async fn with_retries<T, E, F, Fut>(config: &RetryConfig, mut operation: F) -> Result<T, E>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: Transient + std::fmt::Display,
{
    let mut attempt = 0;
    loop {
        match operation(attempt).await {
            Ok(value) => return Ok(value),
            Err(e) if !e.is_transient() || attempt >= config.max_retries => return Err(e),
            Err(e) => {
                let delay = config.backoff(attempt);
                tracing::warn!(
                    "Transient error (attempt {}/{}), retrying in {:.1}s: {}",
                    attempt + 1,
                    config.max_retries + 1,
                    delay.as_secs_f64(),
                    e
                );
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
        }
    }
}
