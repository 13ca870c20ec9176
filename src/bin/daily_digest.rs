use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};

use mlb_trending::batting_log::days_before;
use mlb_trending::config::AppConfig;
use mlb_trending::digest::generate_daily_digest;
use mlb_trending::logging::init_logging;
use mlb_trending::object_store::object_store_from_config;
use mlb_trending::summarizer::GeminiSummarizer;

fn main() -> Result<()> {
    let config = AppConfig::from_env();
    init_logging(&config.log)?;

    let games_date = match std::env::args().nth(1) {
        Some(raw) => NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
            .with_context(|| format!("invalid date argument {raw}"))?,
        None => days_before(Local::now().date_naive(), 1).context("no date before today")?,
    };

    let summarizer = GeminiSummarizer::from_config(&config.summarizer)?;
    let store = object_store_from_config(&config.object_store)?;
    let key = generate_daily_digest(&summarizer, store.as_ref(), games_date)?;

    println!("Uploaded digest for {games_date} to {key}");
    Ok(())
}
