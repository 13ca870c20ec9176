pub mod batting_log;
pub mod boxscore_ingest;
pub mod config;
pub mod digest;
pub mod http_client;
pub mod logging;
pub mod matchup;
pub mod matchup_fetch;
pub mod matchup_locate;
pub mod matchup_outcome;
pub mod matchup_stats;
pub mod object_store;
pub mod service;
pub mod summarizer;
