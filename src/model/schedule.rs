use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Response of `GET /schedule?startDate=..&endDate=..`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleResponse {
    #[serde(default)]
    pub total_games: Option<u32>,
    #[serde(default)]
    pub dates: Vec<ScheduleDate>,
}

/// One calendar date in the schedule, with its games in API order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleDate {
    pub date: NaiveDate,
    #[serde(default)]
    pub games: Vec<GameSummary>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameSummary {
    pub game_pk: i64,
    #[serde(default)]
    pub game_date: Option<String>,
    #[serde(default)]
    pub status: Option<GameStatus>,
    #[serde(default)]
    pub teams: Option<ScheduleTeams>,
}

impl GameSummary {
    /// "Away @ Home" for log lines, when the schedule carried team names.
    pub fn matchup(&self) -> Option<String> {
        let teams = self.teams.as_ref()?;
        Some(format!("{} @ {}", teams.away.team.name, teams.home.team.name))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameStatus {
    #[serde(default)]
    pub detailed_state: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleTeams {
    pub away: ScheduleSide,
    pub home: ScheduleSide,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleSide {
    pub team: TeamRef,
}

/// Minimal team reference shared by schedule and boxscore payloads.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TeamRef {
    #[serde(default)]
    pub id: Option<i64>,
    pub name: String,
}
