use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::GeminiConfig;
use crate::error::ClassifyError;
use crate::taxonomy::TaxonomyRegistry;
use crate::types::{CandidateError, RawJudgment};

pub const DEFAULT_API_URL: &str =
    "https://generativelanguage.googleapis.com/v1beta/models/gemini-2.0-flash:generateContent";

/// Judgment-producing capability backed by the Gemini `generateContent` API.
#[derive(Clone)]
pub struct GeminiClient {
    http: reqwest::Client,
    config: GeminiConfig,
}

impl GeminiClient {
    pub fn new(config: GeminiConfig) -> Result<Self, ClassifyError> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("log-triage/", env!("CARGO_PKG_VERSION")))
            .connect_timeout(config.connect_timeout)
            .build()?;
        Ok(Self { http, config })
    }

    pub fn has_api_key(&self) -> bool {
        self.config.api_key.is_some()
    }

    pub async fn classify(
        &self,
        registry: &TaxonomyRegistry,
        candidate: CandidateError,
    ) -> Result<RawJudgment, ClassifyError> {
        let prompt = build_prompt(registry, &candidate);
        let text = self.generate(&prompt).await?;
        debug!(line = candidate.line_number, response = %text, "judgment received");
        Ok(RawJudgment::from_text(&text))
    }

    /// Sends one prompt and returns the first candidate's text.
    pub async fn generate(&self, prompt: &str) -> Result<String, ClassifyError> {
        let api_key = self
            .config
            .api_key
            .as_deref()
            .ok_or(ClassifyError::MissingApiKey)?;

        let request = GenerateContentRequest {
            contents: vec![RequestContent {
                parts: vec![RequestPart {
                    text: prompt.to_string(),
                }],
            }],
        };

        let response = self
            .http
            .post(&self.config.api_url)
            .header("x-goog-api-key", api_key)
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let mut body = response.text().await.unwrap_or_default();
            truncate_at_char_boundary(&mut body, self.config.max_error_body_bytes);
            return Err(ClassifyError::Upstream { status, body });
        }

        let parsed: GenerateContentResponse = response.json().await?;
        first_text(parsed).ok_or(ClassifyError::EmptyResponse)
    }
}

pub fn build_prompt(registry: &TaxonomyRegistry, candidate: &CandidateError) -> String {
    let severities = registry.severities().join(", ");
    let categories = registry
        .categories()
        .iter()
        .map(|c| c.name())
        .collect::<Vec<_>>()
        .join(", ");
    let subcategories = registry
        .categories()
        .iter()
        .map(|c| {
            let names: Vec<&str> = c.subcategories().iter().map(|s| s.name.as_str()).collect();
            format!("- {}: {}", c.name(), names.join(", "))
        })
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "You are an expert system administrator analyzing log errors. Provide concise, actionable analysis.

Analyze this log error and provide:
1. Severity rating - MUST be one of: {severities}
2. Category - one of: {categories}
3. Subcategory - must match one of the subcategories under the chosen category:
{subcategories}
4. Brief description of the issue
5. Potential impact

Log entry:
{content}

Respond ONLY with valid JSON format with keys: severity, category, subcategory, description, impact
IMPORTANT: Use ONLY the predefined categories and severity levels.",
        content = candidate.content,
    )
}

fn first_text(response: GenerateContentResponse) -> Option<String> {
    response
        .candidates
        .into_iter()
        .next()?
        .content?
        .parts
        .into_iter()
        .find_map(|p| p.text)
        .filter(|t| !t.trim().is_empty())
}

fn truncate_at_char_boundary(s: &mut String, max_bytes: usize) {
    if s.len() <= max_bytes {
        return;
    }
    let mut end = max_bytes;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    s.truncate(end);
}

#[derive(Debug, Serialize)]
struct GenerateContentRequest {
    contents: Vec<RequestContent>,
}

#[derive(Debug, Serialize)]
struct RequestContent {
    parts: Vec<RequestPart>,
}

#[derive(Debug, Serialize)]
struct RequestPart {
    text: String,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<ResponseCandidate>,
}

#[derive(Debug, Deserialize)]
struct ResponseCandidate {
    content: Option<ResponseContent>,
}

#[derive(Debug, Deserialize)]
struct ResponseContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    text: Option<String>,
}
