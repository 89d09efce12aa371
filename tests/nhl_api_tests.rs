use std::time::Duration;

use chrono::{Duration as Days, NaiveDate};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use nhl_stats_crawler::error::CrawlError;
use nhl_stats_crawler::model::boxscore::BoxscoreResponse;
use nhl_stats_crawler::model::schedule::ScheduleResponse;
use nhl_stats_crawler::nhl::{NhlApi, StatsApi};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// One empty schedule entry per day in `[start, end]`, the way the API answers.
fn schedule_body(start: NaiveDate, end: NaiveDate) -> serde_json::Value {
    let mut dates = Vec::new();
    let mut day = start;
    while day <= end {
        dates.push(serde_json::json!({ "date": day.to_string(), "games": [] }));
        day += Days::days(1);
    }
    serde_json::json!({ "totalGames": 0, "dates": dates })
}

async fn fetch_schedule(
    base: String,
    start: NaiveDate,
    end: NaiveDate,
) -> Result<ScheduleResponse, CrawlError> {
    // ureq blocks, so keep it off the async runtime.
    tokio::task::spawn_blocking(move || {
        NhlApi::new(base, Duration::from_secs(5)).schedule(start, end)
    })
    .await
    .expect("join")
}

async fn fetch_boxscore(base: String, game_pk: i64) -> Result<BoxscoreResponse, CrawlError> {
    tokio::task::spawn_blocking(move || NhlApi::new(base, Duration::from_secs(5)).boxscore(game_pk))
        .await
        .expect("join")
}

async fn mount_schedule(server: &MockServer, start: NaiveDate, end: NaiveDate) {
    Mock::given(method("GET"))
        .and(path("/api/v1/schedule"))
        .and(query_param("startDate", start.format("%Y-%m-%d").to_string()))
        .and(query_param("endDate", end.format("%Y-%m-%d").to_string()))
        .respond_with(ResponseTemplate::new(200).set_body_json(schedule_body(start, end)))
        .expect(1)
        .mount(server)
        .await;
}

#[tokio::test]
async fn single_day_schedule_has_one_date() {
    let server = MockServer::start().await;
    let day = date(2022, 1, 1);
    mount_schedule(&server, day, day).await;

    let schedule = fetch_schedule(format!("{}/api/v1", server.uri()), day, day)
        .await
        .expect("schedule");

    assert_eq!(schedule.dates.len(), 1);
    assert_eq!(schedule.dates[0].date, day);
}

#[tokio::test]
async fn multi_day_schedule_has_one_entry_per_day() {
    let server = MockServer::start().await;
    let (start, end) = (date(2022, 1, 1), date(2022, 1, 3));
    mount_schedule(&server, start, end).await;

    let schedule = fetch_schedule(format!("{}/api/v1", server.uri()), start, end)
        .await
        .expect("schedule");

    assert_eq!(schedule.dates.len(), 3);
}

#[tokio::test]
async fn long_schedule_is_not_truncated() {
    let server = MockServer::start().await;
    let (start, end) = (date(2022, 1, 1), date(2022, 1, 21));
    mount_schedule(&server, start, end).await;

    // Trailing slash on the base is tolerated.
    let schedule = fetch_schedule(format!("{}/api/v1/", server.uri()), start, end)
        .await
        .expect("schedule");

    assert_eq!(schedule.dates.len(), 21);
    assert_eq!(schedule.dates.last().unwrap().date, end);
    assert!(schedule.dates.iter().all(|d| d.games.is_empty()));
}

#[tokio::test]
async fn boxscore_uses_game_path() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/game/2021020001/boxscore"))
        .respond_with(
            ResponseTemplate::new(200).set_body_string(include_str!("resources/boxscore.json")),
        )
        .expect(1)
        .mount(&server)
        .await;

    let boxscore = fetch_boxscore(format!("{}/api/v1", server.uri()), 2021020001)
        .await
        .expect("boxscore");

    assert_eq!(boxscore.teams.home.team.name, "Montréal Canadiens");
    assert_eq!(boxscore.teams.away.players.len(), 2);
}

#[tokio::test]
async fn server_error_maps_to_http_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/game/1/boxscore"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let err = fetch_boxscore(format!("{}/api/v1", server.uri()), 1)
        .await
        .unwrap_err();

    assert!(matches!(err, CrawlError::Http { status: 503, .. }), "got {:?}", err);
    assert!(err.is_retryable());
}

#[tokio::test]
async fn malformed_body_maps_to_decode_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/schedule"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>not json</html>"))
        .mount(&server)
        .await;

    let err = fetch_schedule(format!("{}/api/v1", server.uri()), date(2022, 1, 1), date(2022, 1, 1))
        .await
        .unwrap_err();

    assert!(matches!(err, CrawlError::Decode { .. }), "got {:?}", err);
    assert!(!err.is_retryable());
}

#[tokio::test]
async fn refused_connection_maps_to_network_error() {
    let err = fetch_boxscore("http://127.0.0.1:1/api/v1".to_string(), 1)
        .await
        .unwrap_err();

    assert!(matches!(err, CrawlError::Network(_)), "got {:?}", err);
    assert!(err.is_retryable());
}

#[tokio::test]
async fn slow_response_times_out() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/game/1/boxscore"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(3)))
        .mount(&server)
        .await;

    let base = format!("{}/api/v1", server.uri());
    let err = tokio::task::spawn_blocking(move || {
        NhlApi::new(base, Duration::from_millis(200)).boxscore(1)
    })
    .await
    .expect("join")
    .unwrap_err();

    assert!(err.is_retryable(), "got {:?}", err);
    assert!(
        matches!(err, CrawlError::Timeout(_) | CrawlError::Network(_)),
        "got {:?}",
        err
    );
}
