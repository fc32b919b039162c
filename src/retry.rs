//! Retry policy for translator batch requests.
//!
//! A batch is retried only for failures that may clear on their own: rate
//! limiting, server errors, dropped connections and garbled responses. When
//! Azure answers 429 with a `Retry-After` header, that wait replaces the
//! exponential backoff.

use crate::translation::TranslateError;
use reqwest::header::{HeaderMap, RETRY_AFTER};
use std::future::Future;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, warn};

/// Upper bound on a server-requested wait.
const MAX_RETRY_AFTER: Duration = Duration::from_secs(60);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Attempts per batch, including the first one
    pub max_attempts: u32,
    /// Wait before the first retry; doubled for each further retry
    pub base_delay: Duration,
    /// Cap on the backoff wait
    pub max_delay: Duration,
}

impl RetryPolicy {
    /// `max_attempts` attempts with 1s, 2s, 4s, 5s, 5s, ... between them.
    pub fn new(max_attempts: u32) -> Self {
        Self {
            max_attempts,
            base_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(5),
        }
    }

    pub fn with_delays(mut self, base_delay: Duration, max_delay: Duration) -> Self {
        self.base_delay = base_delay;
        self.max_delay = max_delay;
        self
    }

    /// Backoff before retry number `retry` (1-based).
    fn backoff(&self, retry: u32) -> Duration {
        let factor = 2u32.saturating_pow(retry.saturating_sub(1));
        self.base_delay.saturating_mul(factor).min(self.max_delay)
    }

    /// Wait before retrying after `error`.
    pub fn delay_after(&self, error: &TranslateError, retry: u32) -> Duration {
        match error {
            TranslateError::RateLimited {
                retry_after: Some(wait),
                ..
            } => (*wait).min(MAX_RETRY_AFTER),
            _ => self.backoff(retry),
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(1)
    }
}

/// Whether a failed batch is worth sending again.
/// Other 4xx responses (bad key, bad language code, oversized request) are final.
pub fn is_retryable(error: &TranslateError) -> bool {
    match error {
        TranslateError::RateLimited { .. } => true,
        TranslateError::Api { status, .. } => {
            *status == reqwest::StatusCode::TOO_MANY_REQUESTS || status.is_server_error()
        }
        TranslateError::Request(_) | TranslateError::Decode(_) => true,
    }
}

/// Seconds from a `Retry-After` header. The HTTP-date form is not used by
/// the translator service and is ignored.
pub fn parse_retry_after(headers: &HeaderMap) -> Option<Duration> {
    headers
        .get(RETRY_AFTER)?
        .to_str()
        .ok()?
        .trim()
        .parse::<u64>()
        .ok()
        .map(Duration::from_secs)
}

/// Send one batch, retrying per `policy`. Returns the last error once the
/// attempts are used up or the error is final.
pub async fn send_with_retry<T, F, Fut>(
    policy: &RetryPolicy,
    target_language: &str,
    mut send: F,
) -> Result<T, TranslateError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, TranslateError>>,
{
    let attempts = policy.max_attempts.max(1);
    let mut attempt = 1;

    loop {
        match send().await {
            Ok(result) => {
                if attempt > 1 {
                    debug!(
                        "Batch to {} succeeded on attempt {}/{}",
                        target_language, attempt, attempts
                    );
                }
                return Ok(result);
            }
            Err(e) if attempt < attempts && is_retryable(&e) => {
                let delay = policy.delay_after(&e, attempt);
                warn!(
                    "Batch to {} failed on attempt {}/{} ({}), retrying in {:?}",
                    target_language, attempt, attempts, e, delay
                );
                sleep(delay).await;
                attempt += 1;
            }
            Err(e) => return Err(e),
        }
    }
}
