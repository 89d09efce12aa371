//! Fixed-budget retry for the outer crawl loop.
//!
//! Only transport-class failures ([`CrawlError::is_retryable`]) are retried, with a
//! constant delay between attempts. Anything else is returned on the spot.

use std::time::Duration;

use tracing::error;

use crate::error::CrawlError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first. Zero is treated as one.
    pub attempts: u32,
    pub delay: Duration,
}

impl RetryPolicy {
    pub fn new(attempts: u32, delay: Duration) -> Self {
        Self { attempts, delay }
    }
}

/// Why a retried operation gave up.
#[derive(Debug)]
pub enum RetryFailure {
    /// Every attempt failed with a retryable error; holds the last one.
    Exhausted { attempts: u32, last: CrawlError },
    Fatal(CrawlError),
}

impl RetryFailure {
    pub fn error(&self) -> &CrawlError {
        match self {
            RetryFailure::Exhausted { last, .. } => last,
            RetryFailure::Fatal(e) => e,
        }
    }
}

/// Run `operation` until it succeeds, fails fatally, or the attempt budget runs out.
///
/// `sleep` is called between attempts with the policy delay; the binary passes
/// [`std::thread::sleep`].
pub fn retry<T, F, Z>(policy: RetryPolicy, mut sleep: Z, mut operation: F) -> Result<T, RetryFailure>
where
    F: FnMut(u32) -> Result<T, CrawlError>,
    Z: FnMut(Duration),
{
    let limit = policy.attempts.max(1);
    let mut attempt = 1u32;
    loop {
        match operation(attempt) {
            Ok(value) => return Ok(value),
            Err(err) if !err.is_retryable() => {
                error!(attempt, error = %err, "Non-retryable failure");
                return Err(RetryFailure::Fatal(err));
            }
            Err(err) if attempt >= limit => {
                error!(attempts = attempt, error = %err, "Giving up after {} attempts", attempt);
                return Err(RetryFailure::Exhausted {
                    attempts: attempt,
                    last: err,
                });
            }
            Err(err) => {
                error!(
                    attempt,
                    limit,
                    delay_secs = policy.delay.as_secs_f64(),
                    error = %err,
                    "Crawl attempt failed, retrying"
                );
                sleep(policy.delay);
                attempt += 1;
            }
        }
    }
}
