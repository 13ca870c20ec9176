use std::time::Duration;

use fantoccini::ClientBuilder;
use reqwest::blocking::Client;
use reqwest::header::USER_AGENT;
use serde_json::json;
use tracing::{debug, warn};

use crate::config::MatchupConfig;
use crate::http_client::build_client;
use crate::matchup::MatchupError;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RetrievalStrategy {
    /// One GET; the logs table is in the server-rendered HTML.
    #[default]
    Plain,
    /// Load in a WebDriver-controlled browser and wait for client-side rendering.
    Headless,
}

impl RetrievalStrategy {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "plain" | "http" => Some(Self::Plain),
            "headless" | "browser" => Some(Self::Headless),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Plain => "plain",
            Self::Headless => "headless",
        }
    }
}

/// Returns the HTML for a URL.
pub trait PageSource {
    fn fetch_page(&self, url: &str) -> Result<String, MatchupError>;
}

pub fn page_source_for(config: &MatchupConfig) -> Result<Box<dyn PageSource>, MatchupError> {
    match config.retrieval {
        RetrievalStrategy::Plain => Ok(Box::new(PlainFetcher::new(config)?)),
        RetrievalStrategy::Headless => Ok(Box::new(HeadlessRenderer::new(config))),
    }
}

pub struct PlainFetcher {
    client: Client,
    user_agent: String,
}

impl PlainFetcher {
    pub fn new(config: &MatchupConfig) -> Result<Self, MatchupError> {
        let client = build_client(config.request_timeout)
            .map_err(|err| MatchupError::upstream(None, format!("{err:#}")))?;
        Ok(Self {
            client,
            user_agent: config.user_agent.clone(),
        })
    }
}

impl PageSource for PlainFetcher {
    fn fetch_page(&self, url: &str) -> Result<String, MatchupError> {
        let resp = self
            .client
            .get(url)
            .header(USER_AGENT, &self.user_agent)
            .send()
            .map_err(MatchupError::from_transport)?;
        let status = resp.status();
        if !status.is_success() {
            return Err(MatchupError::upstream(
                Some(status.as_u16()),
                format!("HTTP Error: {}", status.as_u16()),
            ));
        }
        resp.text().map_err(MatchupError::from_transport)
    }
}

/// Renders through a WebDriver endpoint (chromedriver, geckodriver).
///
/// Waits a fixed settle delay after navigation instead of polling for the
/// table, so a slow page can still come back without it.
const SESSION_CLOSE_GRACE: Duration = Duration::from_secs(2);

pub struct HeadlessRenderer {
    webdriver_url: String,
    user_agent: String,
    settle_delay: Duration,
    timeout: Duration,
}

impl HeadlessRenderer {
    pub fn new(config: &MatchupConfig) -> Self {
        Self {
            webdriver_url: config.webdriver_url.clone(),
            user_agent: config.user_agent.clone(),
            settle_delay: config.settle_delay,
            timeout: config.request_timeout,
        }
    }

    async fn render(&self, url: &str) -> Result<String, MatchupError> {
        let client = match await_session(self.connect(), self.timeout, SESSION_CLOSE_GRACE).await {
            SessionWait::Ready(connected) => connected?,
            SessionWait::Expired(late) => {
                if let Some(late) = late
                    && let Err(err) = late.close().await
                {
                    warn!(error = %err, "failed to close late webdriver session");
                }
                return Err(MatchupError::upstream(None, "webdriver session timed out"));
            }
        };

        let loaded = tokio::time::timeout(self.timeout + self.settle_delay, async {
            client
                .goto(url)
                .await
                .map_err(|err| MatchupError::upstream(None, format!("navigate: {err}")))?;
            tokio::time::sleep(self.settle_delay).await;
            client
                .source()
                .await
                .map_err(|err| MatchupError::upstream(None, format!("read page source: {err}")))
        })
        .await;

        // The session is closed on every path, including timeout.
        if let Err(err) = client.close().await {
            warn!(error = %err, "failed to close webdriver session");
        }

        loaded.unwrap_or_else(|_| Err(MatchupError::upstream(None, "page render timed out")))
    }

    async fn connect(&self) -> Result<fantoccini::Client, MatchupError> {
        let mut caps = serde_json::Map::new();
        caps.insert(
            "goog:chromeOptions".to_string(),
            json!({
                "args": [
                    "--headless=new",
                    "--disable-gpu",
                    "--no-sandbox",
                    format!("--user-agent={}", self.user_agent),
                ]
            }),
        );
        let mut builder = ClientBuilder::rustls()
            .map_err(|err| MatchupError::upstream(None, format!("tls setup: {err}")))?;
        builder.capabilities(caps);
        builder
            .connect(&self.webdriver_url)
            .await
            .map_err(|err| MatchupError::upstream(None, format!("webdriver session: {err}")))
    }
}

enum SessionWait<T, E> {
    Ready(Result<T, E>),
    /// Deadline passed; carries a session that still arrived within the grace period.
    Expired(Option<T>),
}

async fn await_session<T, E>(
    connecting: impl Future<Output = Result<T, E>>,
    deadline: Duration,
    grace: Duration,
) -> SessionWait<T, E> {
    let mut connecting = std::pin::pin!(connecting);
    match tokio::time::timeout(deadline, &mut connecting).await {
        Ok(connected) => SessionWait::Ready(connected),
        Err(_) => match tokio::time::timeout(grace, connecting).await {
            Ok(Ok(late)) => SessionWait::Expired(Some(late)),
            _ => SessionWait::Expired(None),
        },
    }
}

impl PageSource for HeadlessRenderer {
    fn fetch_page(&self, url: &str) -> Result<String, MatchupError> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|err| MatchupError::upstream(None, format!("render runtime: {err}")))?;
        debug!(url, settle_ms = self.settle_delay.as_millis() as u64, "rendering page");
        runtime.block_on(self.render(url))
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::{RetrievalStrategy, SessionWait, await_session};

    fn run<F: Future>(fut: F) -> F::Output {
        tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .expect("runtime")
            .block_on(fut)
    }

    async fn session_after(delay_ms: u64) -> Result<u32, String> {
        tokio::time::sleep(Duration::from_millis(delay_ms)).await;
        Ok(7)
    }

    #[test]
    fn session_within_deadline_is_ready() {
        let wait = run(await_session(
            session_after(0),
            Duration::from_secs(5),
            Duration::from_secs(5),
        ));
        assert!(matches!(wait, SessionWait::Ready(Ok(7))));
    }

    #[test]
    fn session_after_deadline_is_handed_back_for_release() {
        let wait = run(await_session(
            session_after(50),
            Duration::from_millis(5),
            Duration::from_secs(5),
        ));
        assert!(matches!(wait, SessionWait::Expired(Some(7))));
    }

    #[test]
    fn session_past_grace_is_dropped() {
        let wait = run(await_session(
            session_after(500),
            Duration::from_millis(5),
            Duration::from_millis(5),
        ));
        assert!(matches!(wait, SessionWait::Expired(None)));
    }

    #[test]
    fn strategy_parses_config_values() {
        assert_eq!(RetrievalStrategy::parse("plain"), Some(RetrievalStrategy::Plain));
        assert_eq!(RetrievalStrategy::parse("HEADLESS"), Some(RetrievalStrategy::Headless));
        assert_eq!(RetrievalStrategy::parse("auto"), None);
    }
}
