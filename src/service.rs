//! Request handlers behind the web client's endpoints. Each returns the
//! status code and JSON body to send; routing lives elsewhere.

use chrono::{Local, NaiveDate};
use serde::Serialize;
use serde_json::{Value, json};
use tracing::{debug, error, info, warn};

use crate::batting_log::{BattingLogSource, StatWindow, TRENDING_MIN_AT_BATS, days_before};
use crate::digest::{fetch_digest, fetch_trivia};
use crate::matchup::{MatchupError, MatchupExtractor};
use crate::object_store::{ObjectStore, ObjectStoreError};

#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    pub status: u16,
    pub body: Value,
}

impl ApiResponse {
    pub fn ok(body: Value) -> Self {
        Self { status: 200, body }
    }

    pub fn json<T: Serialize>(value: &T) -> Self {
        match serde_json::to_value(value) {
            Ok(body) => Self::ok(body),
            Err(err) => Self::error(500, format!("failed to encode response: {err}")),
        }
    }

    pub fn error(status: u16, message: impl Into<String>) -> Self {
        Self {
            status,
            body: json!({ "error": message.into() }),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

pub fn matchup_error_status(err: &MatchupError) -> u16 {
    match err {
        MatchupError::MissingInput => 400,
        MatchupError::HeaderNotFound
        | MatchupError::TableNotFound
        | MatchupError::NoPlateAppearances => 404,
        MatchupError::Upstream { .. } => 502,
    }
}

pub struct StatsService {
    batting_log: Box<dyn BattingLogSource>,
    object_store: Option<Box<dyn ObjectStore>>,
    matchup: MatchupExtractor,
    today: Option<NaiveDate>,
}

impl StatsService {
    pub fn new(
        batting_log: Box<dyn BattingLogSource>,
        object_store: Option<Box<dyn ObjectStore>>,
        matchup: MatchupExtractor,
    ) -> Self {
        Self {
            batting_log,
            object_store,
            matchup,
            today: None,
        }
    }

    /// Pins the date used for relative windows and digest keys.
    pub fn with_today(mut self, today: NaiveDate) -> Self {
        self.today = Some(today);
        self
    }

    fn today(&self) -> NaiveDate {
        self.today.unwrap_or_else(|| Local::now().date_naive())
    }

    pub fn health(&self) -> ApiResponse {
        ApiResponse::ok(json!({ "status": "ok" }))
    }

    pub fn search_player(&self, name: &str) -> ApiResponse {
        match self.batting_log.search_players(name) {
            Ok(players) => {
                debug!(query = name, matches = players.len(), "player search");
                ApiResponse::json(&players)
            }
            Err(err) => internal_error("player search", &err),
        }
    }

    pub fn whos_hot(&self, days: u32) -> ApiResponse {
        let Some(since) = days_before(self.today(), days) else {
            return ApiResponse::error(400, format!("invalid days value: {days}"));
        };
        match self.batting_log.trending(since, TRENDING_MIN_AT_BATS) {
            Ok(players) => {
                debug!(%since, players = players.len(), "trending leaderboard");
                ApiResponse::json(&players)
            }
            Err(err) => internal_error("trending leaderboard", &err),
        }
    }

    /// `days` is a day count or `season`; missing means seven days.
    pub fn player_stats(&self, player_id: &str, days: Option<&str>) -> ApiResponse {
        let window = match days {
            None => StatWindow::DEFAULT,
            Some(raw) => match StatWindow::parse(raw) {
                Some(window) => window,
                None => return ApiResponse::error(400, format!("invalid days value: {raw}")),
            },
        };
        let since = match window.since(self.today()) {
            Ok(since) => since,
            Err(err) => return ApiResponse::error(400, format!("invalid days value: {err}")),
        };
        let totals = match self.batting_log.player_totals(player_id, since) {
            Ok(totals) => totals,
            Err(err) => return internal_error("player stats", &err),
        };
        match totals.as_slice() {
            [] => ApiResponse::ok(json!({})),
            [single] => ApiResponse::json(single),
            _ => ApiResponse::json(&totals),
        }
    }

    pub fn daily_digest(&self) -> ApiResponse {
        let Some(store) = self.object_store.as_deref() else {
            return digest_response(500, "Server misconfiguration: object store bucket missing.");
        };
        match fetch_digest(store, self.today()) {
            Ok(digest) => ApiResponse::ok(json!({ "digest": digest })),
            Err(ObjectStoreError::NotFound { key }) => {
                info!(key = %key, "digest not yet available");
                digest_response(404, "Digest not yet available.")
            }
            Err(err) => {
                error!(error = %err, "digest fetch failed");
                digest_response(500, format!("Error accessing object store: {err}"))
            }
        }
    }

    pub fn daily_trivia(&self) -> ApiResponse {
        let Some(store) = self.object_store.as_deref() else {
            return ApiResponse::error(500, "Server misconfiguration: object store bucket missing.");
        };
        match fetch_trivia(store, self.today()) {
            Ok(trivia) => ApiResponse::ok(json!({ "trivia": trivia })),
            Err(ObjectStoreError::NotFound { .. }) => {
                ApiResponse::error(404, "Trivia not yet available.")
            }
            Err(err) => {
                error!(error = %err, "trivia fetch failed");
                ApiResponse::error(500, format!("Error accessing object store: {err}"))
            }
        }
    }

    pub fn batter_vs_pitcher(&self, batter: Option<&str>, pitcher: Option<&str>) -> ApiResponse {
        let (Some(batter), Some(pitcher)) = (present(batter), present(pitcher)) else {
            return ApiResponse::error(400, MatchupError::MissingInput.to_string());
        };

        info!(
            batter,
            pitcher,
            classifier = self.matchup.classifier().as_str(),
            "matchup lookup"
        );
        match self.matchup.lookup(batter, pitcher) {
            Ok(report) => {
                debug!(
                    pa = report.stats.plate_appearances,
                    ab = report.stats.at_bats,
                    hits = report.stats.hits,
                    avg = %report.stats.avg,
                    ops = %report.stats.ops,
                    "matchup computed"
                );
                ApiResponse::json(&report)
            }
            Err(err) => {
                let status = matchup_error_status(&err);
                if err.is_not_found() {
                    info!(batter, pitcher, kind = ?err.kind(), "matchup not found");
                } else {
                    warn!(
                        batter,
                        pitcher,
                        upstream_status = ?err.upstream_status(),
                        error = %err,
                        "matchup upstream failure"
                    );
                }
                ApiResponse::error(status, err.to_string())
            }
        }
    }
}

fn present(name: Option<&str>) -> Option<&str> {
    name.filter(|n| !n.trim().is_empty())
}

fn digest_response(status: u16, message: impl Into<String>) -> ApiResponse {
    ApiResponse {
        status,
        body: json!({ "digest": message.into() }),
    }
}

fn internal_error(what: &str, err: &anyhow::Error) -> ApiResponse {
    error!(error = %format!("{err:#}"), "{what} failed");
    ApiResponse::error(500, format!("{what} failed"))
}
