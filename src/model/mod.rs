pub mod boxscore;
pub mod schedule;
pub mod stat_line;
