use std::time::Duration;

use tracing::{debug, error, info, instrument};

use crate::config::CrawlConfig;
use crate::crawler::{CrawlSummary, Crawler, DateRange};
use crate::error::CrawlError;
use crate::nhl::{NhlApi, StatsApi};
use crate::retry::{retry, RetryFailure, RetryPolicy};
use crate::s3::S3Store;
use crate::storage::{MemoryStore, ObjectStore, Storage};

/// Final result of a run, mapped to the process exit code.
#[derive(Debug)]
pub enum RunStatus {
    Success(CrawlSummary),
    /// The pass finished but some games were skipped or not written.
    Partial(CrawlSummary),
    Failed(RetryFailure),
}

impl RunStatus {
    pub fn exit_code(&self) -> u8 {
        match self {
            RunStatus::Success(_) => 0,
            RunStatus::Failed(_) => 1,
            RunStatus::Partial(_) => 2,
        }
    }
}

/// Build the API client and object store from `config` and crawl with retries.
pub fn run(config: &CrawlConfig) -> Result<RunStatus, CrawlError> {
    let api = NhlApi::new(&config.api_base, config.http_timeout);
    let policy = RetryPolicy::new(config.retry_limit, config.retry_delay);
    info!(
        start = %config.date_range.start(),
        end = %config.date_range.end(),
        bucket = %config.bucket,
        api_base = %api.base(),
        dry_run = config.dry_run,
        "Loading data for games"
    );

    if config.dry_run {
        let crawler = Crawler::new(api, Storage::new(&config.bucket, MemoryStore::new()));
        let status = crawl_with_retry(&crawler, config.date_range, policy, std::thread::sleep);
        let store = crawler.storage().store();
        let keys = store.keys(&config.bucket);
        for key in &keys {
            if let Some(body) = store.get(&config.bucket, key) {
                debug!(key = %key, csv = %String::from_utf8_lossy(&body), "Rendered game");
            }
        }
        info!(objects = keys.len(), "Dry run, nothing written");
        return Ok(status);
    }

    let credentials = config
        .credentials
        .clone()
        .ok_or_else(|| CrawlError::Config("missing object store credentials".to_string()))?;
    let store = S3Store::new(
        config.endpoint.as_deref(),
        &config.region,
        credentials,
        config.http_timeout,
    )?;
    info!(endpoint = %store.endpoint(), "Writing to object store");
    let crawler = Crawler::new(api, Storage::new(&config.bucket, store));
    Ok(crawl_with_retry(&crawler, config.date_range, policy, std::thread::sleep))
}

/// Run `crawler` over `range` under `policy`, reporting the outcome.
#[instrument(level = "info", skip(crawler, sleep))]
pub fn crawl_with_retry<A, S, Z>(
    crawler: &Crawler<A, S>,
    range: DateRange,
    policy: RetryPolicy,
    sleep: Z,
) -> RunStatus
where
    A: StatsApi,
    S: ObjectStore,
    Z: FnMut(Duration),
{
    let result = retry(policy, sleep, |attempt| {
        info!(attempt, "Starting crawl attempt");
        crawler.crawl(range)
    });
    match result {
        Ok(summary) if summary.is_complete() => {
            info!(finished_at = %chrono::Utc::now(), stored = summary.stored, "Successful crawl finished");
            RunStatus::Success(summary)
        }
        Ok(summary) => {
            error!(
                stored = summary.stored,
                fetch_failures = summary.fetch_failures,
                store_failures = summary.store_failures,
                "Crawl finished with failed games"
            );
            RunStatus::Partial(summary)
        }
        Err(failure) => {
            match &failure {
                RetryFailure::Exhausted { attempts, .. } => error!(
                    attempts,
                    error = %failure.error(),
                    "API query failed after {} attempts",
                    attempts
                ),
                RetryFailure::Fatal(_) => error!(error = %failure.error(), "Crawl aborted"),
            }
            RunStatus::Failed(failure)
        }
    }
}
