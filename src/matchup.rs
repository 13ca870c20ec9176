//! Batter-vs-pitcher lookup: fetch the matchup page, find the plate
//! appearance log table, and derive rate stats from its rows.

use serde::Serialize;
use thiserror::Error;

use crate::config::MatchupConfig;
use crate::matchup_fetch::{PageSource, page_source_for};
use crate::matchup_locate::{MatchupTable, locate_matchup_table, matchup_url};
use crate::matchup_outcome::ClassifierMode;
use crate::matchup_stats::{MatchupStatLine, MatchupStatistics, aggregate};

#[derive(Debug, Error)]
pub enum MatchupError {
    #[error("Both batter and pitcher names are required")]
    MissingInput,
    #[error("Plate Appearance Logs header not found.")]
    HeaderNotFound,
    #[error("Table not found after Plate Appearance Logs header.")]
    TableNotFound,
    #[error("No valid plate appearances found.")]
    NoPlateAppearances,
    #[error("{message}")]
    Upstream { status: Option<u16>, message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchupErrorKind {
    MissingInput,
    HeaderNotFound,
    TableNotFound,
    NoPlateAppearances,
    UpstreamFetchError,
}

impl MatchupError {
    pub fn upstream(status: Option<u16>, message: impl Into<String>) -> Self {
        Self::Upstream {
            status,
            message: message.into(),
        }
    }

    pub fn from_transport(err: reqwest::Error) -> Self {
        let status = err.status().map(|s| s.as_u16());
        let message = match status {
            Some(code) => format!("HTTP Error: {code}"),
            None if err.is_timeout() => "upstream request timed out".to_string(),
            None => format!("upstream request failed: {err}"),
        };
        Self::Upstream { status, message }
    }

    pub fn kind(&self) -> MatchupErrorKind {
        match self {
            Self::MissingInput => MatchupErrorKind::MissingInput,
            Self::HeaderNotFound => MatchupErrorKind::HeaderNotFound,
            Self::TableNotFound => MatchupErrorKind::TableNotFound,
            Self::NoPlateAppearances => MatchupErrorKind::NoPlateAppearances,
            Self::Upstream { .. } => MatchupErrorKind::UpstreamFetchError,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::HeaderNotFound | Self::TableNotFound | Self::NoPlateAppearances
        )
    }

    pub fn upstream_status(&self) -> Option<u16> {
        match self {
            Self::Upstream { status, .. } => *status,
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MatchupReport {
    pub batter: String,
    pub pitcher: String,
    pub stats: MatchupStatLine,
}

pub struct MatchupExtractor {
    base_url: String,
    source: Box<dyn PageSource>,
    classifier: ClassifierMode,
}

impl MatchupExtractor {
    pub fn new(base_url: impl Into<String>, source: Box<dyn PageSource>, classifier: ClassifierMode) -> Self {
        Self {
            base_url: base_url.into(),
            source,
            classifier,
        }
    }

    pub fn from_config(config: &MatchupConfig) -> Result<Self, MatchupError> {
        Ok(Self::new(
            config.base_url.clone(),
            page_source_for(config)?,
            config.classifier,
        ))
    }

    pub fn classifier(&self) -> ClassifierMode {
        self.classifier
    }

    pub fn locate(&self, batter: &str, pitcher: &str) -> Result<MatchupTable, MatchupError> {
        let url = matchup_url(&self.base_url, batter, pitcher);
        let html = self.source.fetch_page(&url)?;
        locate_matchup_table(&html)
    }

    pub fn statistics(&self, batter: &str, pitcher: &str) -> Result<MatchupStatistics, MatchupError> {
        let table = self.locate(batter, pitcher)?;
        aggregate(&table, &self.classifier)
    }

    pub fn lookup(&self, batter: &str, pitcher: &str) -> Result<MatchupReport, MatchupError> {
        if batter.trim().is_empty() || pitcher.trim().is_empty() {
            return Err(MatchupError::MissingInput);
        }
        let stats = self.statistics(batter, pitcher)?;
        Ok(MatchupReport {
            batter: batter.to_string(),
            pitcher: pitcher.to_string(),
            stats: stats.stat_line(),
        })
    }
}
