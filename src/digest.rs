use anyhow::{Context, Result};
use chrono::NaiveDate;
use tracing::info;

use crate::batting_log::days_before;
use crate::object_store::{ObjectStore, ObjectStoreError};
use crate::summarizer::Summarizer;

pub const DIGEST_CONTENT_TYPE: &str = "text/plain";

pub fn digest_key(date: NaiveDate) -> String {
    format!("{}.txt", date.format("%Y-%m-%d"))
}

pub fn trivia_key(date: NaiveDate) -> String {
    format!("trivia/{}.txt", date.format("%Y-%m-%d"))
}

pub fn digest_prompt(games_date: NaiveDate) -> String {
    format!(
        "Summarize the MLB games played on {} for a daily digest: final scores, \
         standout performances, and notable milestones.",
        games_date.format("%A, %B %-d, %Y")
    )
}

/// The digest published for `today` covers yesterday's games.
pub fn fetch_digest(store: &dyn ObjectStore, today: NaiveDate) -> Result<String, ObjectStoreError> {
    let games_date = days_before(today, 1).ok_or_else(|| ObjectStoreError::NotFound {
        key: format!("digest before {today}"),
    })?;
    store.get_text(&digest_key(games_date))
}

pub fn fetch_trivia(store: &dyn ObjectStore, today: NaiveDate) -> Result<String, ObjectStoreError> {
    store.get_text(&trivia_key(today))
}

/// Summarizes `games_date` and stores the result under its digest key.
pub fn generate_daily_digest(
    summarizer: &dyn Summarizer,
    store: &dyn ObjectStore,
    games_date: NaiveDate,
) -> Result<String> {
    let summary = summarizer
        .summarize(&digest_prompt(games_date))
        .context("summarize games")?;
    let key = digest_key(games_date);
    store
        .put_text(&key, &summary, DIGEST_CONTENT_TYPE)
        .with_context(|| format!("upload digest {key}"))?;
    info!(key = %key, chars = summary.len(), "uploaded daily digest");
    Ok(key)
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::{digest_key, digest_prompt, trivia_key};

    #[test]
    fn keys_use_iso_dates() {
        let date = NaiveDate::from_ymd_opt(2025, 7, 4).expect("valid date");
        assert_eq!(digest_key(date), "2025-07-04.txt");
        assert_eq!(trivia_key(date), "trivia/2025-07-04.txt");
    }

    #[test]
    fn prompt_names_the_day() {
        let date = NaiveDate::from_ymd_opt(2025, 7, 4).expect("valid date");
        assert!(digest_prompt(date).contains("Friday, July 4, 2025"));
    }
}
