use std::time::Duration;

use chrono::NaiveDate;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use nhl_stats_crawler::config::CrawlConfig;
use nhl_stats_crawler::crawler::DateRange;
use nhl_stats_crawler::error::CrawlError;
use nhl_stats_crawler::runner::{self, RunStatus};
use nhl_stats_crawler::s3::Credentials;

fn opening_night() -> DateRange {
    let d = NaiveDate::from_ymd_opt(2021, 10, 12).unwrap();
    DateRange::new(d, d).unwrap()
}

fn config(api_base: String) -> CrawlConfig {
    CrawlConfig {
        bucket: "output".to_string(),
        endpoint: None,
        region: "us-east-1".to_string(),
        credentials: None,
        api_base,
        retry_limit: 2,
        retry_delay: Duration::ZERO,
        http_timeout: Duration::from_secs(5),
        date_range: opening_night(),
        dry_run: true,
    }
}

async fn run_blocking(config: CrawlConfig) -> Result<RunStatus, CrawlError> {
    // ureq blocks, so keep it off the async runtime.
    tokio::task::spawn_blocking(move || runner::run(&config))
        .await
        .expect("join")
}

#[tokio::test]
async fn dry_run_crawls_against_api_base() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/schedule"))
        .and(query_param("startDate", "2021-10-12"))
        .and(query_param("endDate", "2021-10-12"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "totalGames": 1,
            "dates": [ { "date": "2021-10-12", "games": [ { "gamePk": 2021020001 } ] } ]
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v1/game/2021020001/boxscore"))
        .respond_with(
            ResponseTemplate::new(200).set_body_string(include_str!("resources/boxscore.json")),
        )
        .expect(1)
        .mount(&server)
        .await;

    let status = run_blocking(config(format!("{}/api/v1", server.uri())))
        .await
        .expect("run");

    match &status {
        RunStatus::Success(summary) => {
            assert_eq!(summary.games, 1);
            assert_eq!(summary.stored, 1);
            assert_eq!(summary.records, 2);
        }
        other => panic!("unexpected status: {:?}", other),
    }
    assert_eq!(status.exit_code(), 0);
}

#[tokio::test]
async fn dry_run_with_unreachable_api_fails_after_retries() {
    let status = run_blocking(config("http://127.0.0.1:1/api/v1".to_string()))
        .await
        .expect("run");

    assert!(matches!(status, RunStatus::Failed(_)), "got {:?}", status);
    assert_eq!(status.exit_code(), 1);
}

#[tokio::test]
async fn rejects_endpoint_without_http_scheme() {
    let mut config = config("http://127.0.0.1:1/api/v1".to_string());
    config.dry_run = false;
    config.endpoint = Some("localhost:9000".to_string());
    config.credentials = Some(Credentials {
        access_key_id: "AKID".to_string(),
        secret_access_key: "secret".to_string(),
        session_token: None,
    });

    let err = run_blocking(config).await.unwrap_err();

    assert!(matches!(err, CrawlError::Config(_)), "got {:?}", err);
}

#[tokio::test]
async fn missing_credentials_are_a_config_error() {
    let mut config = config("http://127.0.0.1:1/api/v1".to_string());
    config.dry_run = false;

    let err = run_blocking(config).await.unwrap_err();

    assert!(matches!(err, CrawlError::Config(_)), "got {:?}", err);
}
