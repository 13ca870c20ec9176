use std::path::PathBuf;
use std::time::Duration;

use tracing::warn;

use crate::logging::{LogConfig, LogFormat, parse_level};
use crate::matchup_fetch::RetrievalStrategy;
use crate::matchup_outcome::ClassifierMode;

const APP_DIR: &str = "mlb_trending";
const DB_FILE: &str = "player_daily_stats.sqlite";

pub const DEFAULT_MATCHUP_URL: &str = "https://doinksports.com/research/mlb/batter-vs-pitcher";
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0";
pub const DEFAULT_WEBDRIVER_URL: &str = "http://localhost:4444";
pub const DEFAULT_AWS_REGION: &str = "us-west-1";
pub const DEFAULT_SUMMARIZER_MODEL: &str = "gemini-pro";
pub const DEFAULT_SUMMARIZER_ENDPOINT: &str =
    "https://generativelanguage.googleapis.com/v1beta/models";

#[derive(Debug, Clone)]
pub struct MatchupConfig {
    pub base_url: String,
    pub retrieval: RetrievalStrategy,
    pub classifier: ClassifierMode,
    pub user_agent: String,
    pub request_timeout: Duration,
    pub settle_delay: Duration,
    pub webdriver_url: String,
}

impl Default for MatchupConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_MATCHUP_URL.to_string(),
            retrieval: RetrievalStrategy::default(),
            classifier: ClassifierMode::default(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            request_timeout: Duration::from_secs(10),
            settle_delay: Duration::from_secs(5),
            webdriver_url: DEFAULT_WEBDRIVER_URL.to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub path: Option<PathBuf>,
}

#[derive(Debug, Clone)]
pub struct ObjectStoreConfig {
    pub bucket: Option<String>,
    pub region: String,
    // S3-compatible endpoint (MinIO, R2); AWS is derived from the region otherwise.
    pub endpoint_url: Option<String>,
    pub access_key_id: Option<String>,
    pub secret_access_key: Option<String>,
    pub session_token: Option<String>,
    pub local_dir: Option<PathBuf>,
}

impl Default for ObjectStoreConfig {
    fn default() -> Self {
        Self {
            bucket: None,
            region: DEFAULT_AWS_REGION.to_string(),
            endpoint_url: None,
            access_key_id: None,
            secret_access_key: None,
            session_token: None,
            local_dir: None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct SummarizerConfig {
    pub api_key: Option<String>,
    pub model: String,
    pub endpoint: String,
}

impl Default for SummarizerConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: DEFAULT_SUMMARIZER_MODEL.to_string(),
            endpoint: DEFAULT_SUMMARIZER_ENDPOINT.to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub matchup: MatchupConfig,
    pub database: DatabaseConfig,
    pub object_store: ObjectStoreConfig,
    pub summarizer: SummarizerConfig,
    pub log: LogConfig,
}

impl AppConfig {
    /// Loads `.env.local` then `.env` (neither overrides the real environment).
    pub fn from_env() -> Self {
        let _ = dotenvy::from_filename(".env.local");
        let _ = dotenvy::from_filename(".env");
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let mut matchup = MatchupConfig::default();
        if let Some(url) = get("MATCHUP_BASE_URL") {
            matchup.base_url = url.trim().trim_end_matches('?').to_string();
        }
        if let Some(raw) = get("MATCHUP_RETRIEVAL") {
            match RetrievalStrategy::parse(&raw) {
                Some(strategy) => matchup.retrieval = strategy,
                None => warn!(value = %raw, "unknown MATCHUP_RETRIEVAL, using plain"),
            }
        }
        if let Some(raw) = get("MATCHUP_CLASSIFIER") {
            match ClassifierMode::parse(&raw) {
                Some(mode) => matchup.classifier = mode,
                None => warn!(value = %raw, "unknown MATCHUP_CLASSIFIER, using exact"),
            }
        }
        if let Some(ua) = get("MATCHUP_USER_AGENT") {
            matchup.user_agent = ua;
        }
        if let Some(secs) = get("MATCHUP_TIMEOUT_SECS").and_then(|v| v.trim().parse::<u64>().ok()) {
            matchup.request_timeout = Duration::from_secs(secs.max(1));
        }
        if let Some(ms) = get("MATCHUP_SETTLE_MS").and_then(|v| v.trim().parse::<u64>().ok()) {
            matchup.settle_delay = Duration::from_millis(ms);
        }
        if let Some(url) = get("WEBDRIVER_URL") {
            matchup.webdriver_url = url;
        }

        let database = DatabaseConfig {
            path: get("MLB_DB_PATH")
                .map(PathBuf::from)
                .or_else(|| app_data_dir().map(|dir| dir.join(DB_FILE))),
        };

        let object_store = ObjectStoreConfig {
            bucket: get("S3_BUCKET"),
            region: get("AWS_REGION").unwrap_or_else(|| DEFAULT_AWS_REGION.to_string()),
            endpoint_url: get("OBJECT_STORE_URL"),
            access_key_id: get("AWS_ACCESS_KEY_ID"),
            secret_access_key: get("AWS_SECRET_ACCESS_KEY"),
            session_token: get("AWS_SESSION_TOKEN"),
            local_dir: get("OBJECT_STORE_DIR").map(PathBuf::from),
        };

        let mut summarizer = SummarizerConfig {
            api_key: get("GEMINI_API_KEY"),
            ..SummarizerConfig::default()
        };
        if let Some(model) = get("GEMINI_MODEL") {
            summarizer.model = model;
        }

        let mut log = LogConfig::default();
        if let Some(level) = get("LOG_LEVEL").as_deref().and_then(parse_level) {
            log.level = level;
        }
        if let Some(format) = get("LOG_FORMAT").as_deref().and_then(LogFormat::parse) {
            log.format = format;
        }

        Self {
            matchup,
            database,
            object_store,
            summarizer,
            log,
        }
    }
}

pub fn app_data_dir() -> Option<PathBuf> {
    if let Ok(base) = std::env::var("XDG_CACHE_HOME") {
        if !base.trim().is_empty() {
            return Some(PathBuf::from(base).join(APP_DIR));
        }
    }
    let home = std::env::var("HOME").ok()?;
    if home.trim().is_empty() {
        return None;
    }
    Some(PathBuf::from(home).join(".cache").join(APP_DIR))
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::path::PathBuf;
    use std::time::Duration;

    use super::{AppConfig, DEFAULT_MATCHUP_URL};
    use crate::matchup_fetch::RetrievalStrategy;
    use crate::matchup_outcome::ClassifierMode;

    fn config_from(pairs: &[(&str, &str)]) -> AppConfig {
        let env: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|key| env.get(key).cloned())
    }

    #[test]
    fn defaults_without_environment() {
        let cfg = config_from(&[]);
        assert_eq!(cfg.matchup.base_url, DEFAULT_MATCHUP_URL);
        assert_eq!(cfg.matchup.retrieval, RetrievalStrategy::Plain);
        assert_eq!(cfg.matchup.classifier, ClassifierMode::Exact);
        assert_eq!(cfg.object_store.region, "us-west-1");
        assert!(cfg.object_store.bucket.is_none());
        assert!(cfg.summarizer.api_key.is_none());
    }

    #[test]
    fn environment_overrides_are_applied() {
        let cfg = config_from(&[
            ("MATCHUP_RETRIEVAL", "headless"),
            ("MATCHUP_CLASSIFIER", "fuzzy"),
            ("MATCHUP_SETTLE_MS", "2500"),
            ("MLB_DB_PATH", "/tmp/stats.sqlite"),
            ("S3_BUCKET", "digests"),
            ("AWS_REGION", "us-east-2"),
            ("AWS_ACCESS_KEY_ID", "AKIDEXAMPLE"),
            ("AWS_SECRET_ACCESS_KEY", "secret"),
            ("GEMINI_API_KEY", "k"),
        ]);
        assert_eq!(cfg.matchup.retrieval, RetrievalStrategy::Headless);
        assert_eq!(cfg.matchup.classifier, ClassifierMode::Fuzzy);
        assert_eq!(cfg.matchup.settle_delay, Duration::from_millis(2500));
        assert_eq!(cfg.database.path, Some(PathBuf::from("/tmp/stats.sqlite")));
        assert_eq!(cfg.object_store.bucket.as_deref(), Some("digests"));
        assert_eq!(cfg.object_store.region, "us-east-2");
        assert_eq!(cfg.object_store.access_key_id.as_deref(), Some("AKIDEXAMPLE"));
        assert_eq!(cfg.object_store.secret_access_key.as_deref(), Some("secret"));
        assert!(cfg.object_store.session_token.is_none());
        assert_eq!(cfg.summarizer.api_key.as_deref(), Some("k"));
    }

    #[test]
    fn blank_and_invalid_values_fall_back() {
        let cfg = config_from(&[
            ("S3_BUCKET", "  "),
            ("MATCHUP_CLASSIFIER", "regex"),
            ("MATCHUP_TIMEOUT_SECS", "soon"),
        ]);
        assert!(cfg.object_store.bucket.is_none());
        assert_eq!(cfg.matchup.classifier, ClassifierMode::Exact);
        assert_eq!(cfg.matchup.request_timeout, Duration::from_secs(10));
    }
}
