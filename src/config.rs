use std::time::Duration;

use chrono::NaiveDate;
use clap::Parser;

use crate::crawler::DateRange;
use crate::error::CrawlError;
use crate::nhl::DEFAULT_API_BASE;
use crate::s3::Credentials;

/// First week of the 2021-22 regular season.
pub const DEFAULT_START: &str = "2021-10-12";
pub const DEFAULT_END: &str = "2021-10-19";

#[derive(Debug, Clone, Parser)]
#[command(name = "nhl-crawler")]
#[command(about = "Crawl NHL boxscores and store per-game skater stats as CSV")]
pub struct Cli {
    /// First date to crawl (YYYY-MM-DD).
    #[arg(long = "start-date", alias = "startDate")]
    pub start_date: Option<NaiveDate>,

    /// Last date to crawl, inclusive (YYYY-MM-DD).
    #[arg(long = "end-date", alias = "endDate")]
    pub end_date: Option<NaiveDate>,

    #[arg(long, env = "DEST_BUCKET", default_value = "output")]
    pub bucket: String,

    /// Object store endpoint override, e.g. a local MinIO.
    #[arg(long, env = "S3_ENDPOINT_URL")]
    pub endpoint: Option<String>,

    #[arg(long, env = "AWS_REGION", default_value = "us-east-1")]
    pub region: String,

    #[arg(long, env = "AWS_ACCESS_KEY_ID", hide_env_values = true)]
    pub access_key_id: Option<String>,

    #[arg(long, env = "AWS_SECRET_ACCESS_KEY", hide_env_values = true)]
    pub secret_access_key: Option<String>,

    #[arg(long, env = "AWS_SESSION_TOKEN", hide_env_values = true)]
    pub session_token: Option<String>,

    #[arg(long, env = "NHL_API_BASE", default_value = DEFAULT_API_BASE)]
    pub api_base: String,

    /// Total crawl attempts on transport errors.
    #[arg(long, default_value_t = 5)]
    pub retry_limit: u32,

    #[arg(long, default_value_t = 5)]
    pub retry_delay_secs: u64,

    /// Per-request timeout for API and object store calls.
    #[arg(long, default_value_t = 30)]
    pub http_timeout_secs: u64,

    /// Render every game but skip the object store.
    #[arg(long)]
    pub dry_run: bool,
}

/// Everything a crawl run needs, resolved and validated.
#[derive(Debug, Clone)]
pub struct CrawlConfig {
    pub bucket: String,
    pub endpoint: Option<String>,
    pub region: String,
    pub credentials: Option<Credentials>,
    pub api_base: String,
    pub retry_limit: u32,
    pub retry_delay: Duration,
    pub http_timeout: Duration,
    pub date_range: DateRange,
    pub dry_run: bool,
}

impl Cli {
    pub fn into_config(self) -> Result<CrawlConfig, CrawlError> {
        let date_range = resolve_date_range(self.start_date, self.end_date)?;

        let credentials = match (self.access_key_id, self.secret_access_key) {
            (Some(access_key_id), Some(secret_access_key)) => Some(Credentials {
                access_key_id,
                secret_access_key,
                session_token: self.session_token,
            }),
            (None, None) => None,
            _ => {
                return Err(CrawlError::Config(
                    "AWS_ACCESS_KEY_ID and AWS_SECRET_ACCESS_KEY must be set together".to_string(),
                ));
            }
        };
        if credentials.is_none() && !self.dry_run {
            return Err(CrawlError::Config(
                "object store credentials are required unless --dry-run is set".to_string(),
            ));
        }
        if self.retry_limit == 0 {
            return Err(CrawlError::Config("--retry-limit must be at least 1".to_string()));
        }

        Ok(CrawlConfig {
            bucket: self.bucket,
            endpoint: self.endpoint.filter(|e| !e.trim().is_empty()),
            region: self.region,
            credentials,
            api_base: self.api_base,
            retry_limit: self.retry_limit,
            retry_delay: Duration::from_secs(self.retry_delay_secs),
            http_timeout: Duration::from_secs(self.http_timeout_secs),
            date_range,
            dry_run: self.dry_run,
        })
    }
}

/// Both absent: the default week. One absent: a single-day range on the other.
pub fn resolve_date_range(
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
) -> Result<DateRange, CrawlError> {
    let (start, end) = match (start, end) {
        (Some(s), Some(e)) => (s, e),
        (Some(s), None) => (s, s),
        (None, Some(e)) => (e, e),
        (None, None) => (parse_date(DEFAULT_START)?, parse_date(DEFAULT_END)?),
    };
    DateRange::new(start, end)
}

fn parse_date(s: &str) -> Result<NaiveDate, CrawlError> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .map_err(|e| CrawlError::Config(format!("invalid date {}: {}", s, e)))
}
