use std::process::ExitCode;

use anyhow::{Context, Result, anyhow};
use tracing::warn;

use mlb_trending::batting_log::SqliteBattingLog;
use mlb_trending::config::AppConfig;
use mlb_trending::logging::init_logging;
use mlb_trending::matchup::MatchupExtractor;
use mlb_trending::object_store::object_store_from_config;
use mlb_trending::service::{ApiResponse, StatsService};

const USAGE: &str = "usage: mlb_trending <command>
  health
  search <name>
  hot <days>
  player <player_id> [--days N | --season]
  digest
  trivia
  matchup <batter> <pitcher>";

fn main() -> ExitCode {
    match run() {
        Ok(resp) => {
            println!("{}", render(&resp));
            if resp.is_success() {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            }
        }
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::from(2)
        }
    }
}

fn run() -> Result<ApiResponse> {
    let config = AppConfig::from_env();
    init_logging(&config.log)?;

    let args = std::env::args().skip(1).collect::<Vec<_>>();
    let Some(command) = args.first() else {
        return Err(anyhow!(USAGE));
    };
    let rest = &args[1..];

    let service = build_service(&config)?;
    let resp = match command.as_str() {
        "health" => service.health(),
        "search" => service.search_player(&rest.join(" ")),
        "hot" => {
            let days = rest
                .first()
                .map(|raw| raw.trim().parse::<u32>())
                .transpose()
                .context("hot expects a day count")?
                .unwrap_or(7);
            service.whos_hot(days)
        }
        "player" => {
            let player_id = rest.first().ok_or_else(|| anyhow!(USAGE))?;
            service.player_stats(player_id, parse_window_arg(&rest[1..]).as_deref())
        }
        "digest" => service.daily_digest(),
        "trivia" => service.daily_trivia(),
        "matchup" => service.batter_vs_pitcher(
            rest.first().map(String::as_str),
            rest.get(1).map(String::as_str),
        ),
        other => return Err(anyhow!("unknown command {other}\n{USAGE}")),
    };
    Ok(resp)
}

fn build_service(config: &AppConfig) -> Result<StatsService> {
    let db_path = config
        .database
        .path
        .as_deref()
        .ok_or_else(|| anyhow!("unable to resolve sqlite path"))?;
    let batting_log = SqliteBattingLog::open(db_path)?;

    let object_store = match object_store_from_config(&config.object_store) {
        Ok(store) => Some(store),
        Err(err) => {
            warn!(error = %err, "object store unavailable");
            None
        }
    };

    let matchup = MatchupExtractor::from_config(&config.matchup)?;
    Ok(StatsService::new(Box::new(batting_log), object_store, matchup))
}

fn parse_window_arg(args: &[String]) -> Option<String> {
    for (idx, arg) in args.iter().enumerate() {
        if arg == "--season" {
            return Some("season".to_string());
        }
        if let Some(raw) = arg.strip_prefix("--days=") {
            return Some(raw.to_string());
        }
        if arg == "--days" {
            return args.get(idx + 1).cloned();
        }
    }
    None
}

fn render(resp: &ApiResponse) -> String {
    serde_json::to_string_pretty(&resp.body).unwrap_or_else(|_| resp.body.to_string())
}
