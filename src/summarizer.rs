use anyhow::{Context, Result, anyhow};
use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};

use crate::config::SummarizerConfig;
use crate::http_client::http_client;

pub trait Summarizer {
    fn summarize(&self, prompt: &str) -> Result<String>;
}

/// Gemini `generateContent` client.
pub struct GeminiSummarizer {
    client: Client,
    api_key: String,
    model: String,
    endpoint: String,
}

impl GeminiSummarizer {
    pub fn from_config(config: &SummarizerConfig) -> Result<Self> {
        let api_key = config
            .api_key
            .clone()
            .ok_or_else(|| anyhow!("GEMINI_API_KEY is not set"))?;
        Ok(Self {
            client: http_client()?.clone(),
            api_key,
            model: config.model.clone(),
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
        })
    }
}

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    contents: Vec<RequestContent<'a>>,
}

#[derive(Debug, Serialize)]
struct RequestContent<'a> {
    parts: Vec<RequestPart<'a>>,
}

#[derive(Debug, Serialize)]
struct RequestPart<'a> {
    text: &'a str,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: CandidateContent,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    #[serde(default)]
    text: String,
}

impl Summarizer for GeminiSummarizer {
    fn summarize(&self, prompt: &str) -> Result<String> {
        let url = format!("{}/{}:generateContent", self.endpoint, self.model);
        let request = GenerateRequest {
            contents: vec![RequestContent {
                parts: vec![RequestPart { text: prompt }],
            }],
        };
        let resp = self
            .client
            .post(&url)
            .query(&[("key", self.api_key.as_str())])
            .json(&request)
            .send()
            .context("summarization request failed")?;
        let status = resp.status();
        let body = resp.text().context("failed reading summarization body")?;
        if !status.is_success() {
            return Err(anyhow!("http {}: {}", status, body));
        }
        parse_generate_content_json(&body)
    }
}

/// Text of the first part of the first candidate.
pub fn parse_generate_content_json(raw: &str) -> Result<String> {
    let resp: GenerateResponse =
        serde_json::from_str(raw.trim()).context("invalid generateContent json")?;
    resp.candidates
        .into_iter()
        .next()
        .and_then(|c| c.content.parts.into_iter().next())
        .map(|p| p.text)
        .filter(|text| !text.trim().is_empty())
        .ok_or_else(|| anyhow!("summarization returned no text"))
}

#[cfg(test)]
mod tests {
    use super::parse_generate_content_json;

    #[test]
    fn reads_first_candidate_text() {
        let raw = r#"{"candidates":[{"content":{"parts":[{"text":"Giants win 4-2."},{"text":"ignored"}]}}]}"#;
        assert_eq!(
            parse_generate_content_json(raw).expect("should parse"),
            "Giants win 4-2."
        );
    }

    #[test]
    fn empty_candidates_is_an_error() {
        assert!(parse_generate_content_json(r#"{"candidates":[]}"#).is_err());
        assert!(parse_generate_content_json(r#"{"promptFeedback":{}}"#).is_err());
    }
}
