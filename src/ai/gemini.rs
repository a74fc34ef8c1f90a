// Gemini generateContent client
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::{AiError, Enhancement, Enricher, OPINION_FALLBACK};
use crate::config::AiConfig;

/// Client for the Gemini `generateContent` endpoint
pub struct GeminiClient {
    config: AiConfig,
    client: reqwest::Client,
}

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    contents: Vec<Content<'a>>,
    #[serde(rename = "generationConfig", skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationConfig>,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    parts: Vec<Part<'a>>,
}

#[derive(Debug, Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
struct GenerationConfig {
    #[serde(rename = "responseMimeType")]
    response_mime_type: &'static str,
}

#[derive(Debug, Default, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    #[serde(default)]
    text: Option<String>,
}

impl GenerateResponse {
    /// Text of the first candidate, with all its parts joined
    fn text(&self) -> String {
        self.candidates
            .first()
            .and_then(|c| c.content.as_ref())
            .map(|content| {
                content
                    .parts
                    .iter()
                    .filter_map(|p| p.text.as_deref())
                    .collect::<String>()
            })
            .unwrap_or_default()
    }
}

impl GeminiClient {
    pub fn new(config: AiConfig) -> Self {
        Self {
            config,
            client: reqwest::Client::new(),
        }
    }

    fn url(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.config.endpoint, self.config.model
        )
    }

    /// Send one prompt and return the generated text, possibly empty
    async fn generate(&self, prompt: &str, json_response: bool) -> Result<String, AiError> {
        let api_key = self.config.api_key.as_deref().ok_or(AiError::MissingApiKey)?;

        let request = GenerateRequest {
            contents: vec![Content {
                parts: vec![Part { text: prompt }],
            }],
            generation_config: json_response.then_some(GenerationConfig {
                response_mime_type: "application/json",
            }),
        };

        debug!("Sending generateContent request to {}", self.url());

        let response = self
            .client
            .post(self.url())
            .header("x-goog-api-key", api_key)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AiError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let body: GenerateResponse = response.json().await?;
        Ok(body.text())
    }

    async fn request_enhancement(
        &self,
        title: &str,
        description: &str,
    ) -> Result<Enhancement, AiError> {
        let prompt = format!(
            "Based on the movie title \"{}\" and basic description \"{}\", provide a professional \
             movie synopsis (approx 30 words) and a catchy tagline. Return as JSON with \
             \"synopsis\" and \"tagline\" fields.",
            title, description
        );

        let text = self.generate(&prompt, true).await?;
        let text = text.trim();
        let json = if text.is_empty() { "{}" } else { text };
        Ok(serde_json::from_str(json)?)
    }

    async fn request_opinion(&self, title: &str) -> Result<String, AiError> {
        let prompt = format!(
            "Give a one-sentence witty \"View in 4K\" expert recommendation for a movie called \"{}\".",
            title
        );
        let text = self.generate(&prompt, false).await?;
        Ok(text.trim().to_string())
    }
}

#[async_trait]
impl Enricher for GeminiClient {
    async fn enhance(&self, title: &str, description: &str) -> Option<Enhancement> {
        match self.request_enhancement(title, description).await {
            Ok(enhancement) => Some(enhancement),
            Err(e) => {
                warn!("Enhancement request for {:?} failed: {}", title, e);
                None
            }
        }
    }

    async fn opinion(&self, title: &str) -> String {
        match self.request_opinion(title).await {
            Ok(text) if !text.is_empty() => text,
            Ok(_) => {
                warn!("Opinion request for {:?} returned no text", title);
                OPINION_FALLBACK.to_string()
            }
            Err(e) => {
                warn!("Opinion request for {:?} failed: {}", title, e);
                OPINION_FALLBACK.to_string()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const MODEL_PATH: &str = "/v1beta/models/test-model:generateContent";

    fn client_for(server: &MockServer) -> GeminiClient {
        GeminiClient::new(AiConfig {
            api_key: Some("AIza-test".to_string()),
            model: "test-model".to_string(),
            endpoint: server.uri(),
        })
    }

    fn reply(text: &str) -> ResponseTemplate {
        ResponseTemplate::new(200).set_body_json(json!({
            "candidates": [{ "content": { "parts": [{ "text": text }] } }]
        }))
    }

    #[tokio::test]
    async fn enhance_requests_json_and_parses_fields() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(MODEL_PATH))
            .and(header("x-goog-api-key", "AIza-test"))
            .and(body_partial_json(json!({
                "generationConfig": { "responseMimeType": "application/json" }
            })))
            .respond_with(reply(r#"{"synopsis":"A lake at dawn.","tagline":"Still waters."}"#))
            .expect(1)
            .mount(&server)
            .await;

        let result = client_for(&server).enhance("My Clip", "lake").await;
        assert_eq!(
            result,
            Some(Enhancement {
                synopsis: Some("A lake at dawn.".to_string()),
                tagline: Some("Still waters.".to_string()),
            })
        );
    }

    #[tokio::test]
    async fn enhance_treats_empty_text_as_empty_object() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "candidates": [] })))
            .mount(&server)
            .await;

        let result = client_for(&server).enhance("My Clip", "").await;
        assert_eq!(result, Some(Enhancement::default()));
    }

    #[tokio::test]
    async fn enhance_returns_none_on_rejection() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(403).set_body_string("API key not valid"))
            .mount(&server)
            .await;

        assert_eq!(client_for(&server).enhance("My Clip", "typed").await, None);
    }

    #[tokio::test]
    async fn enhance_returns_none_on_non_json_text() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(reply("Sure! Here is a synopsis..."))
            .mount(&server)
            .await;

        assert_eq!(client_for(&server).enhance("My Clip", "typed").await, None);
    }

    #[tokio::test]
    async fn opinion_returns_generated_sentence() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(MODEL_PATH))
            .respond_with(reply("  Pure neon bliss in every pixel.\n"))
            .mount(&server)
            .await;

        assert_eq!(
            client_for(&server).opinion("Neon Nights").await,
            "Pure neon bliss in every pixel."
        );
    }

    #[tokio::test]
    async fn opinion_falls_back_on_error_or_empty_text() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500))
            .up_to_n_times(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .respond_with(reply(""))
            .mount(&server)
            .await;

        let client = client_for(&server);
        assert_eq!(client.opinion("Neon Nights").await, OPINION_FALLBACK);
        assert_eq!(client.opinion("Neon Nights").await, OPINION_FALLBACK);
    }

    #[tokio::test]
    async fn missing_key_skips_the_request() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(reply("unused"))
            .expect(0)
            .mount(&server)
            .await;

        let client = GeminiClient::new(AiConfig {
            api_key: None,
            model: "test-model".to_string(),
            endpoint: server.uri(),
        });
        assert_eq!(client.opinion("Neon Nights").await, OPINION_FALLBACK);
        assert_eq!(client.enhance("Neon Nights", "").await, None);
    }
}
