//! Gemini agent with the `google_search` grounding tool.
//!
//! Sends a single generateContent call per request, seeded with the prior
//! conversation turns as alternating user/model contents. No retry, no
//! timeout; upstream failures surface the provider's error message verbatim.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Serialize;
use serde_json::Value;

use crate::domain::errors::DomainError;
use crate::ports::search::{ConversationTurn, GroundedAnswer, GroundedSearch};

const BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta/models";
const DEFAULT_MODEL: &str = "gemini-2.0-flash-exp";

/// Agent calling Gemini generateContent with web grounding enabled.
#[derive(Clone)]
pub struct GeminiAgent {
    client: Client,
    api_key: String,
    model: String,
}

impl GeminiAgent {
    /// Creates a new agent using the provided API key.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.into(),
            model: DEFAULT_MODEL.to_string(),
        }
    }

    /// Overrides the Gemini model name if needed.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }
}

#[async_trait]
impl GroundedSearch for GeminiAgent {
    async fn generate(
        &self,
        history: &[ConversationTurn],
        query: &str,
    ) -> Result<GroundedAnswer, DomainError> {
        let trimmed = query.trim();
        if trimmed.is_empty() {
            return Err(DomainError::validation("Query cannot be empty"));
        }

        let url = format!(
            "{}/{model}:generateContent?key={api_key}",
            BASE_URL,
            model = self.model,
            api_key = self.api_key
        );

        let request = GenerateContentRequest {
            contents: build_contents(history, trimmed),
            tools: vec![Tool::default()],
            generation_config: GenerationConfig::default(),
        };

        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|err| DomainError::external(err.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to read error body".to_string());
            return Err(map_http_error(status, body));
        }

        let payload: Value = response
            .json()
            .await
            .map_err(|err| DomainError::external(err.to_string()))?;

        let text = extract_text(&payload).unwrap_or_default();
        let grounding = extract_grounding(&payload);

        tracing::debug!(
            "gemini answered {} chars (grounded: {})",
            text.len(),
            grounding.is_some()
        );

        Ok(GroundedAnswer { text, grounding })
    }
}

// ============================================
// Request Types
// ============================================

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    contents: Vec<Content>,
    tools: Vec<Tool>,
    generation_config: GenerationConfig,
}

#[derive(Serialize)]
struct Content {
    role: String,
    parts: Vec<Part>,
}

#[derive(Serialize)]
struct Part {
    text: String,
}

#[derive(Serialize, Default)]
struct Tool {
    #[serde(rename = "google_search")]
    google_search: GoogleSearchConfig,
}

#[derive(Serialize, Default)]
struct GoogleSearchConfig {}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f32,
    top_p: f32,
    top_k: u32,
    max_output_tokens: u32,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            temperature: 0.9,
            top_p: 1.0,
            top_k: 1,
            max_output_tokens: 2048,
        }
    }
}

// ============================================
// Helper Functions
// ============================================

fn build_contents(history: &[ConversationTurn], query: &str) -> Vec<Content> {
    let mut contents = Vec::with_capacity(history.len() * 2 + 1);
    for turn in history {
        contents.push(Content {
            role: "user".to_string(),
            parts: vec![Part {
                text: turn.query.clone(),
            }],
        });
        contents.push(Content {
            role: "model".to_string(),
            parts: vec![Part {
                text: turn.response.clone(),
            }],
        });
    }
    contents.push(Content {
        role: "user".to_string(),
        parts: vec![Part {
            text: query.to_string(),
        }],
    });
    contents
}

fn extract_text(root: &Value) -> Option<String> {
    let candidates = root.get("candidates")?.as_array()?;

    let mut collected = Vec::new();
    for candidate in candidates {
        if let Some(parts) = candidate
            .get("content")
            .and_then(|content| content.get("parts"))
            .and_then(|parts| parts.as_array())
        {
            for part in parts {
                if let Some(text) = part.get("text").and_then(|t| t.as_str()) {
                    let trimmed = text.trim();
                    if !trimmed.is_empty() {
                        collected.push(trimmed.to_string());
                    }
                }
            }
        }
    }

    if collected.is_empty() {
        None
    } else {
        Some(collected.join("\n\n"))
    }
}

fn extract_grounding(root: &Value) -> Option<Value> {
    root.get("candidates")?
        .as_array()?
        .first()?
        .get("groundingMetadata")
        .cloned()
}

fn map_http_error(status: StatusCode, body: String) -> DomainError {
    let message = serde_json::from_str::<Value>(&body)
        .ok()
        .and_then(|json| {
            json.get("error")
                .and_then(|err| err.get("message"))
                .and_then(|msg| msg.as_str())
                .map(|msg| msg.to_string())
        })
        .unwrap_or_else(|| format!("Gemini API error ({}): {}", status.as_u16(), body));

    DomainError::external(message)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_contents_alternate_user_and_model() {
        let history = vec![
            ConversationTurn {
                query: "capital of France".to_string(),
                response: "Paris.".to_string(),
            },
            ConversationTurn {
                query: "population?".to_string(),
                response: "About 2.1 million.".to_string(),
            },
        ];

        let contents = build_contents(&history, "and the mayor?");
        assert_eq!(contents.len(), 5);
        assert_eq!(contents[0].role, "user");
        assert_eq!(contents[0].parts[0].text, "capital of France");
        assert_eq!(contents[1].role, "model");
        assert_eq!(contents[1].parts[0].text, "Paris.");
        assert_eq!(contents[3].role, "model");
        assert_eq!(contents[4].role, "user");
        assert_eq!(contents[4].parts[0].text, "and the mayor?");
    }

    #[test]
    fn test_request_serializes_tool_and_config() {
        let request = GenerateContentRequest {
            contents: build_contents(&[], "hello"),
            tools: vec![Tool::default()],
            generation_config: GenerationConfig::default(),
        };

        let value = serde_json::to_value(&request).unwrap();
        assert!(value["tools"][0]["google_search"].is_object());
        assert_eq!(value["generationConfig"]["maxOutputTokens"], 2048);
        assert_eq!(value["generationConfig"]["topK"], 1);
    }

    #[test]
    fn test_extract_text_joins_parts() {
        let payload = json!({
            "candidates": [{
                "content": { "parts": [
                    { "text": "First part." },
                    { "text": "  " },
                    { "text": "Second part." }
                ]}
            }]
        });

        assert_eq!(
            extract_text(&payload).as_deref(),
            Some("First part.\n\nSecond part.")
        );
    }

    #[test]
    fn test_extract_grounding_takes_first_candidate() {
        let payload = json!({
            "candidates": [
                { "groundingMetadata": { "groundingChunks": [] } },
                { "groundingMetadata": { "groundingChunks": [{ "web": {} }] } }
            ]
        });

        let grounding = extract_grounding(&payload).unwrap();
        assert_eq!(grounding["groundingChunks"].as_array().unwrap().len(), 0);
    }

    #[test]
    fn test_extract_grounding_absent() {
        let payload = json!({ "candidates": [{ "content": { "parts": [] } }] });
        assert!(extract_grounding(&payload).is_none());
    }

    #[test]
    fn test_http_error_surfaces_provider_message() {
        let err = map_http_error(
            StatusCode::BAD_REQUEST,
            r#"{"error": {"message": "API key not valid"}}"#.to_string(),
        );
        assert_eq!(err.to_string(), "API key not valid");
    }

    #[test]
    fn test_http_error_falls_back_to_body() {
        let err = map_http_error(StatusCode::BAD_GATEWAY, "upstream down".to_string());
        assert_eq!(err.to_string(), "Gemini API error (502): upstream down");
    }
}
