use anyhow::{Context, Result, anyhow};
use chrono::NaiveDate;
use reqwest::blocking::Client;
use serde::Deserialize;
use serde_json::Value;
use tracing::{info, warn};

use crate::batting_log::{DailyBattingLine, SqliteBattingLog};
use crate::http_client::http_client;

const MLB_SCHEDULE_URL: &str = "https://statsapi.mlb.com/api/v1/schedule?sportId=1&date=";
const MLB_GAME_URL: &str = "https://statsapi.mlb.com/api/v1/game";

#[derive(Debug, Clone)]
pub struct IngestSummary {
    pub game_date: NaiveDate,
    pub games_found: usize,
    pub games_succeeded: usize,
    pub lines_parsed: usize,
    pub lines_inserted: usize,
    pub errors: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct ScheduleResponse {
    #[serde(default)]
    dates: Vec<ScheduleDate>,
}

#[derive(Debug, Deserialize)]
struct ScheduleDate {
    #[serde(default)]
    games: Vec<ScheduleGame>,
}

#[derive(Debug, Deserialize)]
struct ScheduleGame {
    #[serde(rename = "gamePk")]
    game_pk: u64,
}

pub fn parse_schedule_json(raw: &str) -> Result<Vec<u64>> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed == "null" {
        return Ok(Vec::new());
    }
    let schedule: ScheduleResponse =
        serde_json::from_str(trimmed).context("invalid schedule json")?;
    Ok(schedule
        .dates
        .into_iter()
        .flat_map(|d| d.games)
        .map(|g| g.game_pk)
        .collect())
}

/// Every player on either side with a non-empty `stats.batting` object.
pub fn parse_boxscore_json(raw: &str, game_date: NaiveDate) -> Result<Vec<DailyBattingLine>> {
    let root: Value = serde_json::from_str(raw.trim()).context("invalid boxscore json")?;
    let teams = root
        .get("teams")
        .ok_or_else(|| anyhow!("boxscore missing teams"))?;

    let mut out = Vec::new();
    for side in ["home", "away"] {
        let Some(team) = teams.get(side) else {
            continue;
        };
        let team_name = team
            .get("team")
            .and_then(|t| t.get("name"))
            .and_then(|x| x.as_str())
            .unwrap_or_default();
        let Some(players) = team.get("players").and_then(|x| x.as_object()) else {
            continue;
        };
        for (player_id, player) in players {
            if let Some(line) = parse_batting_line(player_id, player, team_name, game_date) {
                out.push(line);
            }
        }
    }
    Ok(out)
}

fn parse_batting_line(
    player_id: &str,
    player: &Value,
    team: &str,
    game_date: NaiveDate,
) -> Option<DailyBattingLine> {
    let batting = player
        .get("stats")
        .and_then(|s| s.get("batting"))
        .and_then(|b| b.as_object())
        .filter(|b| !b.is_empty())?;
    let player_name = player
        .get("person")
        .and_then(|p| p.get("fullName"))
        .and_then(|x| x.as_str())?;
    let stat = |key: &str| {
        batting
            .get(key)
            .and_then(|x| x.as_u64())
            .and_then(|n| u32::try_from(n).ok())
            .unwrap_or(0)
    };
    Some(DailyBattingLine {
        player_id: player_id.to_string(),
        player_name: player_name.to_string(),
        team: team.to_string(),
        game_date,
        hits: stat("hits"),
        at_bats: stat("atBats"),
        home_runs: stat("homeRuns"),
        rbi: stat("rbi"),
        runs: stat("runs"),
        walks: stat("baseOnBalls"),
        strikeouts: stat("strikeOuts"),
    })
}

pub fn fetch_game_ids(client: &Client, game_date: NaiveDate) -> Result<Vec<u64>> {
    let url = format!("{MLB_SCHEDULE_URL}{game_date}");
    let body = fetch_text(client, &url).context("schedule request failed")?;
    parse_schedule_json(&body)
}

pub fn fetch_boxscore_lines(
    client: &Client,
    game_id: u64,
    game_date: NaiveDate,
) -> Result<Vec<DailyBattingLine>> {
    let url = format!("{MLB_GAME_URL}/{game_id}/boxscore");
    let body = fetch_text(client, &url).context("boxscore request failed")?;
    parse_boxscore_json(&body, game_date)
}

fn fetch_text(client: &Client, url: &str) -> Result<String> {
    let resp = client.get(url).send().context("request failed")?;
    let status = resp.status();
    let body = resp.text().context("failed reading body")?;
    if !status.is_success() {
        return Err(anyhow!("http {}: {}", status, body));
    }
    Ok(body)
}

/// Pulls every game on `game_date` into the log. A failed boxscore is
/// recorded in the summary and the remaining games still load.
pub fn ingest_date(log: &mut SqliteBattingLog, game_date: NaiveDate) -> Result<IngestSummary> {
    let client = http_client()?;
    let game_ids = fetch_game_ids(client, game_date)?;
    info!(%game_date, games = game_ids.len(), "fetched schedule");

    let mut lines = Vec::new();
    let mut games_succeeded = 0usize;
    let mut errors = Vec::new();
    for game_id in &game_ids {
        match fetch_boxscore_lines(client, *game_id, game_date) {
            Ok(game_lines) => {
                lines.extend(game_lines);
                games_succeeded += 1;
            }
            Err(err) => {
                warn!(game_id, error = %format!("{err:#}"), "boxscore fetch failed");
                errors.push(format!("game {game_id}: {err:#}"));
            }
        }
    }

    let lines_inserted = log.insert_daily_lines(&lines)?;
    info!(parsed = lines.len(), inserted = lines_inserted, "stored batting lines");

    Ok(IngestSummary {
        game_date,
        games_found: game_ids.len(),
        games_succeeded,
        lines_parsed: lines.len(),
        lines_inserted,
        errors,
    })
}
