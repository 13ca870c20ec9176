use std::path::Path;

use anyhow::{Context, Result};
use chrono::{Duration, NaiveDate};
use rusqlite::{Connection, params};
use serde::Serialize;
use thiserror::Error;

use crate::matchup_stats::{format_rate, ratio};

pub const SEARCH_LIMIT: usize = 20;
pub const TRENDING_MIN_AT_BATS: u32 = 20;

/// One player's batting line for one game date.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DailyBattingLine {
    pub player_id: String,
    pub player_name: String,
    pub team: String,
    pub game_date: NaiveDate,
    pub hits: u32,
    pub at_bats: u32,
    pub home_runs: u32,
    pub rbi: u32,
    pub runs: u32,
    pub walks: u32,
    pub strikeouts: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlayerMatch {
    pub player_id: String,
    pub player_name: String,
    pub team: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TrendingPlayer {
    pub player_id: String,
    pub player_name: String,
    pub team: String,
    pub hits: u32,
    pub at_bats: u32,
    pub home_runs: u32,
    pub rbi: u32,
    pub runs: u32,
    pub avg: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlayerTotals {
    pub player_name: String,
    pub team: String,
    pub hits: u32,
    pub at_bats: u32,
    pub home_runs: u32,
    pub rbi: u32,
    pub walks: u32,
    pub avg: String,
    pub obp: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatWindow {
    Days(u32),
    Season,
}

impl StatWindow {
    pub const DEFAULT: StatWindow = StatWindow::Days(7);

    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        if raw.eq_ignore_ascii_case("season") {
            return Some(Self::Season);
        }
        raw.parse::<u32>().ok().map(Self::Days)
    }

    /// First date in the window; `None` for the whole season.
    pub fn since(self, today: NaiveDate) -> Result<Option<NaiveDate>, WindowOutOfRange> {
        match self {
            Self::Days(days) => days_before(today, days)
                .map(Some)
                .ok_or(WindowOutOfRange { days }),
            Self::Season => Ok(None),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("a {days}-day window reaches past the supported date range")]
pub struct WindowOutOfRange {
    pub days: u32,
}

pub fn days_before(today: NaiveDate, days: u32) -> Option<NaiveDate> {
    today.checked_sub_signed(Duration::days(i64::from(days)))
}

/// Read side of the per-game batting table.
pub trait BattingLogSource {
    fn search_players(&self, query: &str) -> Result<Vec<PlayerMatch>>;
    fn trending(&self, since: NaiveDate, min_at_bats: u32) -> Result<Vec<TrendingPlayer>>;
    /// Grouped by (name, team), so a traded player yields one row per club.
    fn player_totals(&self, player_id: &str, since: Option<NaiveDate>) -> Result<Vec<PlayerTotals>>;
}

pub struct SqliteBattingLog {
    conn: Connection,
}

impl SqliteBattingLog {
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).ok();
        }
        let conn =
            Connection::open(path).with_context(|| format!("open sqlite db {}", path.display()))?;
        Self::with_connection(conn)
    }

    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().context("open in-memory sqlite db")?;
        Self::with_connection(conn)
    }

    fn with_connection(conn: Connection) -> Result<Self> {
        init_schema(&conn)?;
        Ok(Self { conn })
    }

    /// Returns the number of new rows; lines already stored for the same
    /// player and date are left untouched.
    pub fn insert_daily_lines(&mut self, lines: &[DailyBattingLine]) -> Result<usize> {
        let tx = self.conn.transaction().context("begin insert transaction")?;
        let mut inserted = 0usize;
        {
            let mut stmt = tx
                .prepare(
                    "INSERT INTO player_daily_stats (
                        player_id, player_name, team, game_date, hits, at_bats,
                        home_runs, rbi, runs, walks, strikeouts
                    ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
                    ON CONFLICT (player_id, game_date) DO NOTHING",
                )
                .context("prepare daily line insert")?;
            for line in lines {
                inserted += stmt
                    .execute(params![
                        line.player_id,
                        line.player_name,
                        line.team,
                        line.game_date.to_string(),
                        line.hits,
                        line.at_bats,
                        line.home_runs,
                        line.rbi,
                        line.runs,
                        line.walks,
                        line.strikeouts,
                    ])
                    .with_context(|| format!("insert line for {}", line.player_id))?;
            }
        }
        tx.commit().context("commit insert transaction")?;
        Ok(inserted)
    }
}

pub fn init_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS player_daily_stats (
            player_id TEXT NOT NULL,
            player_name TEXT NOT NULL,
            team TEXT NOT NULL,
            game_date TEXT NOT NULL,
            hits INTEGER NOT NULL DEFAULT 0,
            at_bats INTEGER NOT NULL DEFAULT 0,
            home_runs INTEGER NOT NULL DEFAULT 0,
            rbi INTEGER NOT NULL DEFAULT 0,
            runs INTEGER NOT NULL DEFAULT 0,
            walks INTEGER NOT NULL DEFAULT 0,
            strikeouts INTEGER NOT NULL DEFAULT 0,
            PRIMARY KEY (player_id, game_date)
        );
        CREATE INDEX IF NOT EXISTS idx_player_daily_stats_date ON player_daily_stats(game_date);
        CREATE INDEX IF NOT EXISTS idx_player_daily_stats_name ON player_daily_stats(player_name);
        "#,
    )
    .context("create sqlite schema")?;
    Ok(())
}

impl BattingLogSource for SqliteBattingLog {
    fn search_players(&self, query: &str) -> Result<Vec<PlayerMatch>> {
        let query = query.trim();
        if query.is_empty() {
            return Ok(Vec::new());
        }
        let pattern = format!("%{}%", query.to_lowercase());
        let mut stmt = self
            .conn
            .prepare(
                "SELECT DISTINCT player_id, player_name, team
                 FROM player_daily_stats
                 WHERE LOWER(player_name) LIKE ?1
                 ORDER BY player_name
                 LIMIT ?2",
            )
            .context("prepare player search")?;
        let rows = stmt
            .query_map(params![pattern, SEARCH_LIMIT as i64], |row| {
                Ok(PlayerMatch {
                    player_id: row.get(0)?,
                    player_name: row.get(1)?,
                    team: row.get(2)?,
                })
            })
            .context("run player search")?;
        rows.collect::<rusqlite::Result<Vec<_>>>()
            .context("read player search rows")
    }

    fn trending(&self, since: NaiveDate, min_at_bats: u32) -> Result<Vec<TrendingPlayer>> {
        let mut stmt = self
            .conn
            .prepare(
                "SELECT player_id, player_name, team,
                        SUM(hits), SUM(at_bats), SUM(home_runs), SUM(rbi), SUM(runs)
                 FROM player_daily_stats
                 WHERE game_date >= ?1
                 GROUP BY player_id, player_name, team
                 HAVING SUM(at_bats) >= ?2
                 ORDER BY CAST(SUM(hits) AS REAL) / NULLIF(SUM(at_bats), 0) DESC, player_name",
            )
            .context("prepare trending query")?;
        let rows = stmt
            .query_map(params![since.to_string(), min_at_bats], |row| {
                let hits: u32 = row.get(3)?;
                let at_bats: u32 = row.get(4)?;
                Ok(TrendingPlayer {
                    player_id: row.get(0)?,
                    player_name: row.get(1)?,
                    team: row.get(2)?,
                    hits,
                    at_bats,
                    home_runs: row.get(5)?,
                    rbi: row.get(6)?,
                    runs: row.get(7)?,
                    avg: format_rate(ratio(hits, at_bats)),
                })
            })
            .context("run trending query")?;
        rows.collect::<rusqlite::Result<Vec<_>>>()
            .context("read trending rows")
    }

    fn player_totals(&self, player_id: &str, since: Option<NaiveDate>) -> Result<Vec<PlayerTotals>> {
        // A season window has no lower bound on game_date.
        let since = since.map(|d| d.to_string()).unwrap_or_default();
        let mut stmt = self
            .conn
            .prepare(
                "SELECT player_name, team,
                        SUM(hits), SUM(at_bats), SUM(home_runs), SUM(rbi), SUM(walks)
                 FROM player_daily_stats
                 WHERE player_id = ?1 AND game_date >= ?2
                 GROUP BY player_name, team
                 ORDER BY MAX(game_date) DESC",
            )
            .context("prepare player totals query")?;
        let rows = stmt
            .query_map(params![player_id, since], |row| {
                let hits: u32 = row.get(2)?;
                let at_bats: u32 = row.get(3)?;
                let walks: u32 = row.get(6)?;
                Ok(PlayerTotals {
                    player_name: row.get(0)?,
                    team: row.get(1)?,
                    hits,
                    at_bats,
                    home_runs: row.get(4)?,
                    rbi: row.get(5)?,
                    walks,
                    avg: format_rate(ratio(hits, at_bats)),
                    obp: format_rate(ratio(hits + walks, at_bats + walks)),
                })
            })
            .context("run player totals query")?;
        rows.collect::<rusqlite::Result<Vec<_>>>()
            .context("read player totals rows")
    }
}
