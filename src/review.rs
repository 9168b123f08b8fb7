use std::path::PathBuf;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use thiserror::Error;
use tracing::{debug, warn};

use crate::language::Language;
use crate::proposal::SegmentReview;
use crate::rules;

/// Editor persona and output contract sent ahead of every review request
///
/// The per-language rule set is appended separately so users can replace
/// it without touching the persona.
pub const EDITOR_SYSTEM_PROMPT: &str = "\
You are a strict, meticulous Publisher's Editor with expertise in both Greek and English language rules. Your role is to review text and identify ALL necessary corrections.

## Your Editing Philosophy
- Be thorough: catch every error, no matter how small
- Be precise: explain exactly which rule applies
- Be consistent: apply the same standards throughout

## Output Requirements
Respond with a JSON object of the form {\"edits\": [...]} where each edit has the fields \"original_text\", \"revised_text\", \"rule_category\", and \"reasoning\".
For EACH edit you identify:
1. Quote the EXACT original text
2. Provide the corrected text
3. Categorize the rule type (Grammar, Style, Formatting, Punctuation, Spelling, Syntax, Greek-Final-Nu, Monotonic, Other)
4. Explain WHY, citing the specific rule

If the text is already correct, return {\"edits\": []}.";

/// Default Gemini model used for reviews
pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";

const GEMINI_ENDPOINT: &str = "https://generativelanguage.googleapis.com/v1beta/models";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// Error types for the Reviewer collaborator
#[derive(Debug, Error)]
pub enum ReviewError {
    /// The only pre-flight fatal: reported once before any batch starts
    #[error("GEMINI_API_KEY not found. Set it in the environment or pass it explicitly.")]
    MissingApiKey,
    #[error("Request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Reviewer returned HTTP {0}")]
    Status(reqwest::StatusCode),
    #[error("Malformed reviewer response: {0}")]
    Malformed(String),
}

/// External collaborator that produces edit proposals for a text segment
///
/// Implementations are opaque to the core: proposals come back as
/// untrusted input and are located, filtered, and reconciled downstream.
#[async_trait]
pub trait Reviewer: Send + Sync {
    /// Review one text segment and return structured edit suggestions
    async fn review_segment(
        &self,
        text: &str,
        language: Language,
    ) -> Result<SegmentReview, ReviewError>;
}

/// Gemini-backed Reviewer with structured JSON output
pub struct GeminiReviewer {
    client: Client,
    api_key: String,
    model: String,
    temperature: f32,
    rules_dir: Option<PathBuf>,
}

impl GeminiReviewer {
    /// Create a reviewer
    ///
    /// Reads `GEMINI_API_KEY` when no key is given. A missing key is the
    /// only unrecoverable condition in the system and is reported here,
    /// before any analysis begins.
    pub fn new(api_key: Option<String>) -> Result<Self, ReviewError> {
        let api_key = api_key
            .filter(|key| !key.is_empty())
            .or_else(|| std::env::var("GEMINI_API_KEY").ok())
            .filter(|key| !key.is_empty())
            .ok_or(ReviewError::MissingApiKey)?;

        Ok(Self {
            client: Client::new(),
            api_key,
            model: DEFAULT_MODEL.to_string(),
            temperature: 0.2,
            rules_dir: None,
        })
    }

    /// Override the model name
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Override the sampling temperature
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    /// Load replacement rule sets from this directory instead of the
    /// embedded defaults
    pub fn with_rules_dir(mut self, dir: PathBuf) -> Self {
        self.rules_dir = Some(dir);
        self
    }

    /// Build the full prompt for one segment: persona, rule set, language
    /// hint, and the fenced text to review
    fn build_prompt(&self, text: &str, language: Language) -> String {
        let rule_set = rules::load_rules(self.rules_dir.as_deref(), language);
        format!(
            "{EDITOR_SYSTEM_PROMPT}\n\n## Rule Set\n\n{rule_set}\n\n## Text to Review\n\n{hint}\n\n```\n{text}\n```\n\nAnalyze this text thoroughly. Identify ALL errors and provide corrections with detailed reasoning. If the text is perfect, return an empty edits array.",
            hint = language.hint(),
        )
    }
}

/// Parse the text body of a reviewer response into a review
///
/// An empty body means no edits; anything that is not the expected JSON
/// shape is malformed.
fn parse_review(text: &str) -> Result<SegmentReview, ReviewError> {
    if text.trim().is_empty() {
        return Ok(SegmentReview::default());
    }
    serde_json::from_str(text).map_err(|error| ReviewError::Malformed(error.to_string()))
}

#[async_trait]
impl Reviewer for GeminiReviewer {
    async fn review_segment(
        &self,
        text: &str,
        language: Language,
    ) -> Result<SegmentReview, ReviewError> {
        let url = format!("{}/{}:generateContent", GEMINI_ENDPOINT, self.model);
        let body = serde_json::json!({
            "contents": [{
                "role": "user",
                "parts": [{ "text": self.build_prompt(text, language) }],
            }],
            "generationConfig": {
                "temperature": self.temperature,
                "responseMimeType": "application/json",
            },
        });

        debug!(model = %self.model, chars = text.len(), "sending review request");

        let response = self
            .client
            .post(&url)
            .query(&[("key", self.api_key.as_str())])
            .timeout(REQUEST_TIMEOUT)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            warn!(%status, "review request rejected");
            return Err(ReviewError::Status(status));
        }

        let payload: serde_json::Value = response.json().await?;
        let answer = payload["candidates"][0]["content"]["parts"][0]["text"]
            .as_str()
            .unwrap_or_default();

        parse_review(answer)
    }
}
