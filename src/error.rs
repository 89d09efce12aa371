use chrono::NaiveDate;
use thiserror::Error;

/// Errors raised while crawling the stats API and writing artifacts.
#[derive(Debug, Error)]
pub enum CrawlError {
    /// Connection refused, reset, DNS failure or any other transport fault.
    #[error("network error: {0}")]
    Network(String),

    #[error("request timed out: {0}")]
    Timeout(String),

    /// The server answered with a non-2xx status.
    #[error("HTTP {status} from {url}")]
    Http { status: u16, url: String },

    /// The response body was not the JSON shape we expected.
    #[error("failed to decode {context}: {source}")]
    Decode {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to store {key}: {reason}")]
    Storage { key: String, reason: String },

    #[error("invalid date range: start {start} is after end {end}")]
    InvalidDateRange { start: NaiveDate, end: NaiveDate },

    #[error("configuration error: {0}")]
    Config(String),
}

impl CrawlError {
    /// Transport and HTTP failures are worth another attempt; everything else is fatal.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            CrawlError::Network(_) | CrawlError::Timeout(_) | CrawlError::Http { .. }
        )
    }

    /// Classify a `ureq` failure for a request against `url`.
    pub(crate) fn from_ureq(err: ureq::Error, url: &str) -> Self {
        match err {
            ureq::Error::StatusCode(status) => CrawlError::Http {
                status,
                url: url.to_string(),
            },
            ureq::Error::Timeout(t) => CrawlError::Timeout(format!("{} ({:?})", url, t)),
            other => CrawlError::Network(format!("{}: {}", url, other)),
        }
    }
}
