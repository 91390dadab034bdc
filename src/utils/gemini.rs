use crate::credentials::ApiKey;
use crate::error::{AssistantError, Result};
use crate::evidence::EvidenceBlob;
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use serde::{Deserialize, Serialize};

const API_KEY_HEADER: &str = "x-goog-api-key";

#[derive(Debug, Serialize)]
struct GenerateRequest {
    contents: Vec<Content>,
}

#[derive(Debug, Serialize)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum Part {
    Text { text: String },
    Inline { inline_data: InlineData },
}

#[derive(Debug, Serialize)]
struct InlineData {
    mime_type: String,
    data: String,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

/// Client for the hosted text-generation service. Makes exactly one call per
/// `generate` with no retry and no timeout.
pub struct GeminiClient {
    http: reqwest::Client,
    api_base: String,
    model: String,
    key: ApiKey,
}

impl GeminiClient {
    pub fn new(key: ApiKey, api_base: &str, model: &str) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_base: api_base.trim_end_matches('/').to_string(),
            model: model.to_string(),
            key,
        }
    }

    /// The key travels in a header, never in the URL, so transport errors
    /// that quote the URL cannot leak it.
    pub fn endpoint(&self) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.api_base,
            urlencoding::encode(&self.model)
        )
    }

    pub async fn generate(&self, prompt: &str, media: &[EvidenceBlob]) -> Result<String> {
        let body = build_request(prompt, media);
        tracing::debug!(
            model = %self.model,
            prompt_chars = prompt.chars().count(),
            attachments = media.len(),
            "sending generation request"
        );

        let response = self
            .http
            .post(self.endpoint())
            .header(API_KEY_HEADER, self.key.expose())
            .json(&body)
            .send()
            .await
            .map_err(|e| AssistantError::Http(e.without_url()))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| AssistantError::Http(e.without_url()))?;
        if !status.is_success() {
            return Err(AssistantError::Service {
                status: status.as_u16(),
                body: text,
            });
        }

        reply_text(&text)
    }
}

fn build_request(prompt: &str, media: &[EvidenceBlob]) -> GenerateRequest {
    let mut parts = vec![Part::Text {
        text: prompt.to_string(),
    }];
    parts.extend(media.iter().map(|blob| Part::Inline {
        inline_data: InlineData {
            mime_type: blob.mime_type.clone(),
            data: STANDARD.encode(&blob.data),
        },
    }));

    GenerateRequest {
        contents: vec![Content { parts }],
    }
}

/// Joins the text parts of the first candidate.
fn reply_text(body: &str) -> Result<String> {
    let response: GenerateResponse = serde_json::from_str(body)
        .map_err(|e| AssistantError::MalformedReply(format!("{e}: {body}")))?;

    let text: String = response
        .candidates
        .into_iter()
        .next()
        .and_then(|c| c.content)
        .map(|content| {
            content
                .parts
                .into_iter()
                .filter_map(|p| p.text)
                .collect()
        })
        .unwrap_or_default();

    if text.trim().is_empty() {
        return Err(AssistantError::EmptyReply);
    }
    Ok(text)
}
