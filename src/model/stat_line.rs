use serde::{Deserialize, Serialize};

use crate::model::boxscore::Side;

/// Column order of every stored game table.
pub const CSV_HEADER: [&str; 6] = [
    "player_person_id",
    "player_person_currentTeam_name",
    "player_person_fullName",
    "player_stats_skaterStats_assists",
    "player_stats_skaterStats_goals",
    "side",
];

/// One skater's line for one game.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatLine {
    pub player_id: i64,
    pub team_name: String,
    pub full_name: String,
    pub assists: u32,
    pub goals: u32,
    pub side: Side,
}

impl StatLine {
    fn fields(&self) -> [String; 6] {
        [
            self.player_id.to_string(),
            self.team_name.clone(),
            self.full_name.clone(),
            self.assists.to_string(),
            self.goals.to_string(),
            self.side.to_string(),
        ]
    }
}

/// Render stat lines as CSV with a header row. An empty slice yields the header alone.
pub fn to_csv(lines: &[StatLine]) -> String {
    let mut out = String::with_capacity(128 + lines.len() * 64);
    push_row(&mut out, CSV_HEADER.iter().copied());
    for line in lines {
        let fields = line.fields();
        push_row(&mut out, fields.iter().map(|s| s.as_str()));
    }
    out
}

fn push_row<'a>(out: &mut String, fields: impl Iterator<Item = &'a str>) {
    for (i, field) in fields.enumerate() {
        if i > 0 {
            out.push(',');
        }
        push_field(out, field);
    }
    out.push('\n');
}

fn push_field(out: &mut String, field: &str) {
    if field.contains([',', '"', '\n', '\r']) {
        out.push('"');
        out.push_str(&field.replace('"', "\"\""));
        out.push('"');
    } else {
        out.push_str(field);
    }
}
