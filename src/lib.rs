pub mod config;
pub mod crawler;
pub mod error;
pub mod model;
pub mod nhl;
pub mod retry;
pub mod runner;
pub mod s3;
pub mod storage;
