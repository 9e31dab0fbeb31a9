//! Generative Model Gateway
//!
//! Sends multimodal `generateContent` requests to the primary gateway endpoint
//! (API key in a header) and, when that fails, once to the direct fallback
//! endpoint (API key as a query parameter). There is no further retry.

use async_trait::async_trait;
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, instrument, warn};

use crate::config::{GatewaySettings, GenerationConfig};
use crate::constants::gateway as gateway_constants;
use crate::media::InlineImage;
use crate::types::{BugsightError, Result};

// =============================================================================
// Request
// =============================================================================

/// One model call: system prompt, user prompt and optional attachments
#[derive(Debug, Clone, Default)]
pub struct ModelRequest {
    pub system_prompt: String,
    pub prompt: String,
    pub image: Option<InlineImage>,
    /// Passed as text only; video bytes are never uploaded
    pub video_ref: Option<String>,
}

impl ModelRequest {
    pub fn new(system_prompt: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            system_prompt: system_prompt.into(),
            prompt: prompt.into(),
            image: None,
            video_ref: None,
        }
    }

    pub fn with_image(mut self, image: InlineImage) -> Self {
        self.image = Some(image);
        self
    }

    pub fn with_video_ref(mut self, video_ref: impl Into<String>) -> Self {
        self.video_ref = Some(video_ref.into());
        self
    }
}

// =============================================================================
// Client abstraction
// =============================================================================

/// Text-generation backend used by the analysis pipeline
#[async_trait]
pub trait ModelClient: Send + Sync {
    /// Send a request and return the raw response text
    async fn generate(&self, request: &ModelRequest) -> Result<String>;

    /// Model identifier reported in results
    fn model(&self) -> &str;
}

pub type SharedModelClient = Arc<dyn ModelClient>;

// =============================================================================
// Wire types
// =============================================================================

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest<'a> {
    contents: Vec<Content<'a>>,
    generation_config: WireGenerationConfig,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    parts: Vec<Part<'a>>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum Part<'a> {
    Text { text: String },
    InlineData { inline_data: InlineData<'a> },
}

#[derive(Debug, Serialize)]
struct InlineData<'a> {
    mime_type: &'a str,
    data: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct WireGenerationConfig {
    temperature: f32,
    top_p: f32,
    max_output_tokens: u32,
}

impl From<&GenerationConfig> for WireGenerationConfig {
    fn from(config: &GenerationConfig) -> Self {
        Self {
            temperature: config.temperature,
            top_p: config.top_p,
            max_output_tokens: config.max_output_tokens,
        }
    }
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
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
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

fn build_body<'a>(
    request: &'a ModelRequest,
    generation: &GenerationConfig,
) -> GenerateContentRequest<'a> {
    let mut parts = vec![Part::Text {
        text: format!("{}\n\n{}", request.system_prompt, request.prompt),
    }];

    if let Some(image) = &request.image {
        parts.push(Part::InlineData {
            inline_data: InlineData {
                mime_type: &image.mime_type,
                data: &image.data,
            },
        });
    }

    if let Some(video_ref) = &request.video_ref {
        parts.push(Part::Text {
            text: format!("Video recording of the bug: {}", video_ref),
        });
    }

    GenerateContentRequest {
        contents: vec![Content { parts }],
        generation_config: generation.into(),
    }
}

/// Pull `candidates[0].content.parts[0].text` out of a response envelope
fn extract_text(body: &str) -> Result<String> {
    let envelope: GenerateContentResponse =
        serde_json::from_str(body).map_err(BugsightError::ResponseParse)?;

    envelope
        .candidates
        .into_iter()
        .next()
        .and_then(|c| c.content)
        .and_then(|c| c.parts.into_iter().next())
        .and_then(|p| p.text)
        .ok_or(BugsightError::NoResponseText)
}

// =============================================================================
// Gateway
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Endpoint {
    Primary,
    Fallback,
}

impl Endpoint {
    fn as_str(self) -> &'static str {
        match self {
            Self::Primary => "primary",
            Self::Fallback => "fallback",
        }
    }
}

/// HTTP client for the model API with primary → fallback substitution
pub struct ModelGateway {
    settings: GatewaySettings,
    client: reqwest::Client,
}

impl std::fmt::Debug for ModelGateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModelGateway")
            .field("settings", &self.settings)
            .finish()
    }
}

impl ModelGateway {
    pub fn new(settings: GatewaySettings) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(settings.timeout)
            .build()
            .map_err(|e| BugsightError::Http(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { settings, client })
    }

    fn url(&self, base: &str) -> String {
        format!(
            "{}/{}/models/{}:generateContent",
            base,
            gateway_constants::API_VERSION,
            self.settings.model
        )
    }

    /// One POST; returns the body of a 2xx response
    async fn attempt(&self, endpoint: Endpoint, body: &GenerateContentRequest<'_>) -> Result<String> {
        let key = self.settings.api_key.expose_secret();
        let builder = match endpoint {
            Endpoint::Primary => self
                .client
                .post(self.url(&self.settings.primary_base))
                .header(gateway_constants::API_KEY_HEADER, key),
            Endpoint::Fallback => self
                .client
                .post(self.url(&self.settings.fallback_base))
                .query(&[(gateway_constants::API_KEY_PARAM, key)]),
        };

        let response = builder.json(body).send().await.map_err(|e| {
            // reqwest errors embed the URL, which carries the key on the fallback
            BugsightError::Gateway {
                status: None,
                body: e.without_url().to_string(),
            }
        })?;

        let status = response.status();
        let text = response.text().await.unwrap_or_default();

        if !status.is_success() {
            return Err(BugsightError::Gateway {
                status: Some(status.as_u16()),
                body: text,
            });
        }

        Ok(text)
    }
}

#[async_trait]
impl ModelClient for ModelGateway {
    #[instrument(skip_all, fields(model = %self.settings.model, image = request.image.is_some(), video = request.video_ref.is_some()))]
    async fn generate(&self, request: &ModelRequest) -> Result<String> {
        let start = Instant::now();
        let body = build_body(request, &self.settings.generation);

        let raw = match self.attempt(Endpoint::Primary, &body).await {
            Ok(raw) => raw,
            Err(primary_error) => {
                warn!(
                    endpoint = Endpoint::Primary.as_str(),
                    error = %primary_error,
                    "Primary endpoint failed, trying fallback"
                );
                self.attempt(Endpoint::Fallback, &body).await.map_err(|e| {
                    warn!(endpoint = Endpoint::Fallback.as_str(), error = %e, "Fallback endpoint failed");
                    e
                })?
            }
        };

        debug!(bytes = raw.len(), "Received model response");
        let text = extract_text(&raw)?;

        info!(
            elapsed_ms = start.elapsed().as_millis() as u64,
            chars = text.len(),
            "Model call complete"
        );
        Ok(text)
    }

    fn model(&self) -> &str {
        &self.settings.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::SecretString;
    use serde_json::{Value, json};
    use std::time::Duration;
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const API_PATH: &str = "/v1beta/models/gemini-2.0-flash:generateContent";

    fn settings(primary: &str, fallback: &str) -> GatewaySettings {
        GatewaySettings {
            primary_base: primary.to_string(),
            fallback_base: fallback.to_string(),
            model: "gemini-2.0-flash".to_string(),
            api_key: SecretString::from("test-key"),
            timeout: Duration::from_secs(5),
            generation: GenerationConfig::default(),
        }
    }

    fn envelope(text: &str) -> Value {
        json!({"candidates": [{"content": {"parts": [{"text": text}]}}]})
    }

    fn request() -> ModelRequest {
        ModelRequest::new("SYSTEM", "PROMPT")
    }

    #[test]
    fn test_body_shape() {
        let request = request()
            .with_image(InlineImage {
                mime_type: "image/jpeg".to_string(),
                data: "QUJD".to_string(),
            })
            .with_video_ref("https://videos.example.com/v.mp4");
        let body = serde_json::to_value(build_body(&request, &GenerationConfig::default())).unwrap();

        let parts = body["contents"][0]["parts"].as_array().unwrap();
        assert_eq!(parts.len(), 3);
        assert_eq!(parts[0]["text"], "SYSTEM\n\nPROMPT");
        assert_eq!(parts[1]["inline_data"]["mime_type"], "image/jpeg");
        assert_eq!(parts[1]["inline_data"]["data"], "QUJD");
        assert!(
            parts[2]["text"]
                .as_str()
                .unwrap()
                .contains("https://videos.example.com/v.mp4")
        );

        let generation = &body["generationConfig"];
        assert_eq!(generation["maxOutputTokens"], 4096);
        assert!((generation["temperature"].as_f64().unwrap() - 0.3).abs() < 1e-6);
        assert!((generation["topP"].as_f64().unwrap() - 0.95).abs() < 1e-6);
    }

    #[test]
    fn test_body_text_only() {
        let request = request();
        let body = serde_json::to_value(build_body(&request, &GenerationConfig::default())).unwrap();
        assert_eq!(body["contents"][0]["parts"].as_array().unwrap().len(), 1);
    }

    #[test]
    fn test_extract_text_missing() {
        assert!(matches!(
            extract_text(r#"{"candidates": []}"#),
            Err(BugsightError::NoResponseText)
        ));
        assert!(matches!(
            extract_text(r#"{"candidates": [{"content": {"parts": [{}]}}]}"#),
            Err(BugsightError::NoResponseText)
        ));
        assert!(matches!(
            extract_text("<html>"),
            Err(BugsightError::ResponseParse(_))
        ));
    }

    #[tokio::test]
    async fn test_primary_success_skips_fallback() {
        let primary = MockServer::start().await;
        let fallback = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path(API_PATH))
            .and(header("x-goog-api-key", "test-key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(envelope("primary text")))
            .expect(1)
            .mount(&primary)
            .await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(envelope("fallback text")))
            .expect(0)
            .mount(&fallback)
            .await;

        let gateway = ModelGateway::new(settings(&primary.uri(), &fallback.uri())).unwrap();
        assert_eq!(gateway.generate(&request()).await.unwrap(), "primary text");
    }

    #[tokio::test]
    async fn test_fallback_after_primary_error() {
        let primary = MockServer::start().await;
        let fallback = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path(API_PATH))
            .respond_with(ResponseTemplate::new(500).set_body_string("upstream down"))
            .expect(1)
            .mount(&primary)
            .await;
        Mock::given(method("POST"))
            .and(path(API_PATH))
            .and(query_param("key", "test-key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(envelope("from fallback")))
            .expect(1)
            .mount(&fallback)
            .await;

        let gateway = ModelGateway::new(settings(&primary.uri(), &fallback.uri())).unwrap();
        assert_eq!(gateway.generate(&request()).await.unwrap(), "from fallback");
    }

    #[tokio::test]
    async fn test_fallback_after_unreachable_primary() {
        let fallback = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(envelope("ok")))
            .mount(&fallback)
            .await;

        let gateway = ModelGateway::new(settings("http://127.0.0.1:9", &fallback.uri())).unwrap();
        assert_eq!(gateway.generate(&request()).await.unwrap(), "ok");
    }

    #[tokio::test]
    async fn test_both_endpoints_fail() {
        let primary = MockServer::start().await;
        let fallback = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&primary)
            .await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(503).set_body_string("quota exceeded"))
            .mount(&fallback)
            .await;

        let gateway = ModelGateway::new(settings(&primary.uri(), &fallback.uri())).unwrap();
        let err = gateway.generate(&request()).await.unwrap_err();

        assert!(matches!(err, BugsightError::Gateway { status: Some(503), .. }));
        let message = err.to_string();
        assert!(message.contains("503"));
        assert!(message.contains("quota exceeded"));
    }

    #[tokio::test]
    async fn test_success_without_text_is_not_gateway_failure() {
        let primary = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"candidates": []})))
            .mount(&primary)
            .await;

        let gateway = ModelGateway::new(settings(&primary.uri(), "http://127.0.0.1:9")).unwrap();
        assert!(matches!(
            gateway.generate(&request()).await,
            Err(BugsightError::NoResponseText)
        ));
    }

    #[test]
    fn test_debug_redacts_key() {
        let gateway = ModelGateway::new(settings("http://a", "http://b")).unwrap();
        let debug = format!("{:?}", gateway);
        assert!(!debug.contains("test-key"));
        assert!(debug.contains("[REDACTED]"));
    }
}
