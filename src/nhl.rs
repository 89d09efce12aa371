use std::time::Duration;

use chrono::NaiveDate;
use serde::de::DeserializeOwned;
use tracing::{debug, error, info_span, instrument};

use crate::error::CrawlError;
use crate::model::boxscore::BoxscoreResponse;
use crate::model::schedule::ScheduleResponse;

pub const DEFAULT_API_BASE: &str = "https://statsapi.web.nhl.com/api/v1";

/// Read-only view of the stats API used by the crawler.
pub trait StatsApi {
    /// All schedule dates in `[start, end]`, returned in a single unpaginated response.
    fn schedule(&self, start: NaiveDate, end: NaiveDate) -> Result<ScheduleResponse, CrawlError>;

    fn boxscore(&self, game_pk: i64) -> Result<BoxscoreResponse, CrawlError>;
}

impl<T: StatsApi + ?Sized> StatsApi for &T {
    fn schedule(&self, start: NaiveDate, end: NaiveDate) -> Result<ScheduleResponse, CrawlError> {
        (**self).schedule(start, end)
    }

    fn boxscore(&self, game_pk: i64) -> Result<BoxscoreResponse, CrawlError> {
        (**self).boxscore(game_pk)
    }
}

/// Blocking client for the NHL stats API.
#[derive(Debug, Clone)]
pub struct NhlApi {
    base: String,
    agent: ureq::Agent,
}

impl NhlApi {
    /// Build a client against `base` (e.g. [`DEFAULT_API_BASE`]) with a global per-request timeout.
    pub fn new(base: impl Into<String>, timeout: Duration) -> Self {
        let base = base.into().trim_end_matches('/').to_string();
        let agent: ureq::Agent = ureq::Agent::config_builder()
            .timeout_global(Some(timeout))
            .build()
            .into();
        Self { base, agent }
    }

    pub fn base(&self) -> &str {
        &self.base
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base, path)
    }

    fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, String)],
        context: &str,
    ) -> Result<T, CrawlError> {
        let response_result = {
            let _span = info_span!("nhl_fetch", url = %url).entered();
            let mut request = self.agent.get(url);
            for (name, value) in query {
                request = request.query(*name, value);
            }
            request.call()
        };
        let response = response_result.map_err(|e| {
            error!(error = %e, url = %url, "Request failed");
            CrawlError::from_ureq(e, url)
        })?;
        let body = response
            .into_body()
            .read_to_string()
            .map_err(|e| CrawlError::from_ureq(e, url))?;
        debug!(bytes = body.len(), context, "Read response body");
        serde_json::from_str::<T>(&body).map_err(|source| {
            error!(error = %source, context, "Failed to deserialize response");
            CrawlError::Decode {
                context: context.to_string(),
                source,
            }
        })
    }
}

impl StatsApi for NhlApi {
    #[instrument(level = "info", skip(self))]
    fn schedule(&self, start: NaiveDate, end: NaiveDate) -> Result<ScheduleResponse, CrawlError> {
        let query = [
            ("startDate", start.format("%Y-%m-%d").to_string()),
            ("endDate", end.format("%Y-%m-%d").to_string()),
        ];
        self.get_json(&self.url("schedule"), &query, "schedule")
    }

    #[instrument(level = "info", skip(self))]
    fn boxscore(&self, game_pk: i64) -> Result<BoxscoreResponse, CrawlError> {
        let url = self.url(&format!("game/{}/boxscore", game_pk));
        self.get_json(&url, &[], "boxscore")
    }
}
