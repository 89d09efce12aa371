use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::model::schedule::TeamRef;

/// Response of `GET /game/{gamePk}/boxscore`. Only the fields we extract are modeled.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BoxscoreResponse {
    pub teams: BoxscoreTeams,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BoxscoreTeams {
    pub home: TeamBoxscore,
    pub away: TeamBoxscore,
}

impl BoxscoreTeams {
    /// Both sides, home first.
    pub fn sides(&self) -> [(Side, &TeamBoxscore); 2] {
        [(Side::Home, &self.home), (Side::Away, &self.away)]
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TeamBoxscore {
    pub team: TeamRef,
    /// Keyed by `"ID{personId}"`; map order carries no meaning.
    #[serde(default)]
    pub players: HashMap<String, PlayerBoxscore>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerBoxscore {
    pub person: Person,
    #[serde(default)]
    pub stats: PlayerStats,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Person {
    pub id: i64,
    pub full_name: String,
    #[serde(default)]
    pub current_team: Option<TeamRef>,
}

/// Goalies carry `goalieStats` and scratches carry nothing, so skater stats are optional.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerStats {
    #[serde(default)]
    pub skater_stats: Option<SkaterStats>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SkaterStats {
    pub assists: u32,
    pub goals: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Home,
    Away,
}

impl Side {
    pub fn as_str(&self) -> &'static str {
        match self {
            Side::Home => "home",
            Side::Away => "away",
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
