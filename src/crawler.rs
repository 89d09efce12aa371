use chrono::NaiveDate;
use tracing::{info, instrument, warn};

use crate::error::CrawlError;
use crate::model::boxscore::BoxscoreResponse;
use crate::model::schedule::GameSummary;
use crate::model::stat_line::{self, StatLine};
use crate::nhl::StatsApi;
use crate::storage::{ObjectStore, Storage, StorageKey};

/// Inclusive calendar-date range. Construction rejects `start > end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    start: NaiveDate,
    end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, CrawlError> {
        if start > end {
            return Err(CrawlError::InvalidDateRange { start, end });
        }
        Ok(Self { start, end })
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    /// Number of calendar days covered, both ends included.
    pub fn days(&self) -> i64 {
        (self.end - self.start).num_days() + 1
    }
}

/// What happened to a single game.
#[derive(Debug)]
pub enum GameOutcome {
    Stored { key: StorageKey, records: usize },
    FetchFailed { game_pk: i64, error: CrawlError },
    StoreFailed { key: StorageKey, error: CrawlError },
}

/// Counters for one crawl pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CrawlSummary {
    pub dates: usize,
    pub games: usize,
    pub stored: usize,
    pub records: usize,
    pub fetch_failures: usize,
    pub store_failures: usize,
}

impl CrawlSummary {
    /// True when every scheduled game was fetched and written.
    pub fn is_complete(&self) -> bool {
        self.fetch_failures == 0 && self.store_failures == 0
    }

    fn record(&mut self, outcome: &GameOutcome) {
        self.games += 1;
        match outcome {
            GameOutcome::Stored { records, .. } => {
                self.stored += 1;
                self.records += records;
            }
            GameOutcome::FetchFailed { .. } => self.fetch_failures += 1,
            GameOutcome::StoreFailed { .. } => self.store_failures += 1,
        }
    }
}

/// Pull every skater's line out of a boxscore.
///
/// Players without `skaterStats` (goalies, scratches) are skipped. Output is home
/// side first then away, each ordered by player id, so the result does not depend
/// on the JSON object order of the `players` map.
pub fn extract_stat_lines(boxscore: &BoxscoreResponse) -> Vec<StatLine> {
    let mut lines = Vec::new();
    for (side, team) in boxscore.teams.sides() {
        let mut side_lines: Vec<StatLine> = team
            .players
            .values()
            .filter_map(|player| {
                let stats = player.stats.skater_stats?;
                Some(StatLine {
                    player_id: player.person.id,
                    team_name: team.team.name.clone(),
                    full_name: player.person.full_name.clone(),
                    assists: stats.assists,
                    goals: stats.goals,
                    side,
                })
            })
            .collect();
        side_lines.sort_by_key(|l| l.player_id);
        lines.extend(side_lines);
    }
    lines
}

/// Sequential schedule → boxscore → CSV → object store pipeline.
pub struct Crawler<A, S> {
    api: A,
    storage: Storage<S>,
}

impl<A: StatsApi, S: ObjectStore> Crawler<A, S> {
    pub fn new(api: A, storage: Storage<S>) -> Self {
        Self { api, storage }
    }

    pub fn storage(&self) -> &Storage<S> {
        &self.storage
    }

    /// Crawl every game in `range`.
    ///
    /// Only the schedule fetch can fail the whole pass; each game's fetch and write
    /// is isolated and reported through the returned summary.
    #[instrument(level = "info", skip(self, range), fields(start = %range.start(), end = %range.end()))]
    pub fn crawl(&self, range: DateRange) -> Result<CrawlSummary, CrawlError> {
        info!(started_at = %chrono::Utc::now(), "Initializing schedule load");
        let schedule = self.api.schedule(range.start(), range.end())?;
        info!(dates = schedule.dates.len(), total_games = ?schedule.total_games, "Loaded schedule");

        let mut summary = CrawlSummary::default();
        for date in &schedule.dates {
            summary.dates += 1;
            info!(date = %date.date, games = date.games.len(), "Loading games");
            for game in &date.games {
                let outcome = self.crawl_game(game);
                summary.record(&outcome);
            }
        }

        info!(
            dates = summary.dates,
            games = summary.games,
            stored = summary.stored,
            records = summary.records,
            fetch_failures = summary.fetch_failures,
            store_failures = summary.store_failures,
            finished_at = %chrono::Utc::now(),
            "Crawl pass finished"
        );
        Ok(summary)
    }

    /// Fetch, extract and store one game.
    pub fn crawl_game(&self, game: &GameSummary) -> GameOutcome {
        let game_pk = game.game_pk;
        let matchup = game.matchup();
        let state = game.status.as_ref().and_then(|s| s.detailed_state.as_deref());
        info!(
            game_pk,
            matchup = matchup.as_deref().unwrap_or("unknown"),
            state = state.unwrap_or("unknown"),
            "Querying boxscore"
        );

        let boxscore = match self.api.boxscore(game_pk) {
            Ok(b) => b,
            Err(error) => {
                warn!(game_pk, error = %error, "Skipping game, boxscore fetch failed");
                return GameOutcome::FetchFailed { game_pk, error };
            }
        };

        let lines = extract_stat_lines(&boxscore);
        let payload = stat_line::to_csv(&lines);
        let key = StorageKey::for_game(game_pk);
        match self.storage.store_game(&key, payload.as_bytes()) {
            Ok(()) => GameOutcome::Stored {
                key,
                records: lines.len(),
            },
            Err(error) => GameOutcome::StoreFailed { key, error },
        }
    }
}
