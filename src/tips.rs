//! Flavor tips shown between rounds.
//!
//! Tips come from a [`TipProvider`]. Fetching never affects the game: any error or
//! timeout is replaced by [`FALLBACK_TIP`], an empty answer by [`EMPTY_TIP`].

use std::future::Future;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::TipError;
use crate::level::Level;

/// Shown when the service answers with no text.
pub const EMPTY_TIP: &str = "Ready? Keep a close eye on the fruit!";
/// Shown when the service fails or times out.
pub const FALLBACK_TIP: &str = "When one fruit adds up to five, ring the bell before anyone else!";
/// Shown until the first tip for a level arrives.
pub const PLACEHOLDER_TIP: &str = "Watch the fruit!";

pub const DEFAULT_TIP_TIMEOUT: Duration = Duration::from_secs(8);

/// Source of one-sentence encouragement per level.
pub trait TipProvider: Send + Sync + 'static {
    fn fetch_tip(&self, level: Level) -> impl Future<Output = Result<String, TipError>> + Send;
}

/// Resolves a tip for `level`, never failing.
pub async fn tip_or_fallback<P: TipProvider>(provider: &P, level: Level, timeout: Duration) -> String {
    match tokio::time::timeout(timeout, provider.fetch_tip(level)).await {
        Ok(Ok(text)) if !text.trim().is_empty() => text.trim().to_string(),
        Ok(Ok(_)) | Ok(Err(TipError::EmptyResponse)) => EMPTY_TIP.to_string(),
        Ok(Err(err)) => {
            warn!(level = %level, error = %err, "tip service failed");
            FALLBACK_TIP.to_string()
        }
        Err(_) => {
            warn!(level = %level, error = %TipError::Timeout(timeout), "tip service failed");
            FALLBACK_TIP.to_string()
        }
    }
}

/// Offline tips picked from a fixed list.
#[derive(Clone, Debug)]
pub struct StaticTips {
    tips: Vec<String>,
}

impl StaticTips {
    pub fn new(tips: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            tips: tips.into_iter().map(Into::into).collect(),
        }
    }
}

impl Default for StaticTips {
    fn default() -> Self {
        Self::new([
            "Strawberries blush when they reach five. Be ready!",
            "Bananas come in bunches; count them fast!",
            "A lime a minute keeps the slow hands away.",
            "Plums pile up quietly. Don't let them sneak past a target!",
            "Two cards, one fruit: add them up before you ring.",
        ])
    }
}

impl TipProvider for StaticTips {
    async fn fetch_tip(&self, level: Level) -> Result<String, TipError> {
        if self.tips.is_empty() {
            return Err(TipError::EmptyResponse);
        }
        let index = (level.get() as usize - 1) % self.tips.len();
        Ok(self.tips[index].clone())
    }
}

/// Settings for the hosted text-generation tip service.
#[derive(Clone, Debug)]
pub struct TipConfig {
    pub api_key: Option<String>,
    pub model: String,
    pub endpoint: String,
    pub timeout: Duration,
}

impl TipConfig {
    pub const API_KEY_ENV: &'static str = "GEMINI_API_KEY";

    /// Defaults with the API key taken from `GEMINI_API_KEY`.
    pub fn from_env() -> Self {
        Self {
            api_key: std::env::var(Self::API_KEY_ENV).ok().filter(|key| !key.is_empty()),
            ..Self::default()
        }
    }
}

impl Default for TipConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: String::from("gemini-1.5-flash"),
            endpoint: String::from("https://generativelanguage.googleapis.com/v1beta"),
            timeout: DEFAULT_TIP_TIMEOUT,
        }
    }
}

#[derive(Serialize)]
struct GenerateRequest<'a> {
    contents: [Content<'a>; 1],
}

#[derive(Serialize)]
struct Content<'a> {
    parts: [Part<'a>; 1],
}

#[derive(Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Deserialize, Default)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

impl GenerateResponse {
    fn into_text(self) -> Option<String> {
        self.candidates
            .into_iter()
            .filter_map(|candidate| candidate.content)
            .flat_map(|content| content.parts)
            .find_map(|part| part.text)
    }
}

/// Tips generated by a hosted language model over HTTP.
#[derive(Clone, Debug)]
pub struct GenerativeTips {
    client: reqwest::Client,
    config: TipConfig,
}

impl GenerativeTips {
    pub fn new(config: TipConfig) -> Result<Self, TipError> {
        let client = reqwest::Client::builder().timeout(config.timeout).build()?;
        Ok(Self { client, config })
    }

    fn prompt(level: Level) -> String {
        format!(
            "Write one short, fun sentence of encouragement and a tip for level {level} \
             of a fruit-counting bell card game. Keep it fruit themed!"
        )
    }
}

impl TipProvider for GenerativeTips {
    async fn fetch_tip(&self, level: Level) -> Result<String, TipError> {
        let api_key = self
            .config
            .api_key
            .as_deref()
            .ok_or(TipError::NotConfigured("GEMINI_API_KEY is not set"))?;
        let url = format!(
            "{}/models/{}:generateContent",
            self.config.endpoint.trim_end_matches('/'),
            self.config.model
        );
        let prompt = Self::prompt(level);
        let body = GenerateRequest {
            contents: [Content {
                parts: [Part { text: &prompt }],
            }],
        };
        debug!(level = %level, model = %self.config.model, "requesting tip");
        let response: GenerateResponse = self
            .client
            .post(url)
            .query(&[("key", api_key)])
            .json(&body)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        response.into_text().ok_or(TipError::EmptyResponse)
    }
}
