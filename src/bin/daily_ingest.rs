use anyhow::{Context, Result, anyhow};
use chrono::{Local, NaiveDate};

use mlb_trending::batting_log::{SqliteBattingLog, days_before};
use mlb_trending::boxscore_ingest;
use mlb_trending::config::AppConfig;
use mlb_trending::logging::init_logging;

fn main() -> Result<()> {
    let config = AppConfig::from_env();
    init_logging(&config.log)?;

    let game_date = match parse_date_arg() {
        Some(raw) => NaiveDate::parse_from_str(&raw, "%Y-%m-%d")
            .with_context(|| format!("invalid --date value {raw}"))?,
        None => days_before(Local::now().date_naive(), 1).context("no date before today")?,
    };
    let db_path = config
        .database
        .path
        .clone()
        .ok_or_else(|| anyhow!("unable to resolve sqlite path"))?;

    let mut log = SqliteBattingLog::open(&db_path)?;
    let summary = boxscore_ingest::ingest_date(&mut log, game_date)?;

    println!("Daily ingest complete");
    println!("DB: {}", db_path.display());
    println!("Date: {}", summary.game_date);
    println!("Games: {}/{}", summary.games_succeeded, summary.games_found);
    println!(
        "Batting lines: {} parsed, {} new",
        summary.lines_parsed, summary.lines_inserted
    );
    if !summary.errors.is_empty() {
        println!("Errors: {}", summary.errors.len());
        for err in summary.errors.iter().take(8) {
            println!(" - {err}");
        }
    }

    Ok(())
}

fn parse_date_arg() -> Option<String> {
    let args = std::env::args().skip(1).collect::<Vec<_>>();
    for (idx, arg) in args.iter().enumerate() {
        if let Some(raw) = arg.strip_prefix("--date=") {
            let trimmed = raw.trim();
            if !trimmed.is_empty() {
                return Some(trimmed.to_string());
            }
        }
        if arg == "--date"
            && let Some(next) = args.get(idx + 1)
            && !next.trim().is_empty()
        {
            return Some(next.trim().to_string());
        }
    }
    None
}
