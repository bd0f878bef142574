//! One HTTP caption client shared by every vision API.
//!
//! An API is described by a [`CaptionApi`] dialect: where to post, how to
//! authenticate, how to shape the request body and how to read the reply.
//! [`HttpBackend`] owns the request cycle, the error mapping and the caption
//! cleanup, so every backend fails and tidies the same way.

use std::time::{Duration, Instant};

use async_trait::async_trait;

use super::backend::{CaptionBackend, CaptionRequest, CaptionResponse};
use super::tidy::tidy_caption;
use crate::error::PipelineError;

/// Characters of an error response body kept in the error message.
const ERROR_BODY_CHARS: usize = 200;

/// Availability checks never wait longer than this.
const HEALTH_TIMEOUT: Duration = Duration::from_secs(5);

/// What a dialect read out of a successful reply.
#[derive(Debug, Default)]
pub(crate) struct RawCaption {
    /// Model output before cleanup
    pub text: String,
    /// The model stopped because it reached `max_tokens`
    pub truncated: bool,
    /// Model that answered, when the API reports it
    pub model: Option<String>,
    pub tokens_used: Option<u32>,
}

/// Wire format of one vision API.
pub(crate) trait CaptionApi: Send + Sync {
    /// Backend name for logs and error messages.
    fn name(&self) -> &'static str;

    /// Endpoint caption requests are posted to.
    fn url(&self) -> &str;

    /// Add authentication headers.
    fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        request
    }

    /// JSON body asking `model` to caption the request image.
    fn body(&self, model: &str, request: &CaptionRequest) -> serde_json::Value;

    /// Read the caption out of a 2xx response body.
    fn parse(&self, body: &[u8]) -> Result<RawCaption, String>;

    /// URL that answers 2xx when the service is up. `None` skips the check.
    fn health_url(&self) -> Option<String> {
        None
    }

    fn timeout(&self) -> Duration;
}

/// A [`CaptionBackend`] speaking one [`CaptionApi`] dialect.
pub(crate) struct HttpBackend<A> {
    api: A,
    model: String,
    client: reqwest::Client,
}

impl<A: CaptionApi> HttpBackend<A> {
    pub fn new(api: A, model: &str) -> Self {
        Self {
            api,
            model: model.to_string(),
            client: reqwest::Client::new(),
        }
    }
}

fn inference(message: String, status_code: Option<u16>) -> PipelineError {
    PipelineError::Inference {
        message,
        status_code,
    }
}

#[async_trait]
impl<A: CaptionApi> CaptionBackend for HttpBackend<A> {
    fn name(&self) -> &str {
        self.api.name()
    }

    fn model(&self) -> &str {
        &self.model
    }

    async fn is_available(&self) -> bool {
        let Some(url) = self.api.health_url() else {
            return true;
        };
        match self.client.get(&url).timeout(HEALTH_TIMEOUT).send().await {
            Ok(resp) => resp.status().is_success(),
            Err(_) => false,
        }
    }

    async fn generate(&self, request: &CaptionRequest) -> Result<CaptionResponse, PipelineError> {
        let name = self.api.name();
        let start = Instant::now();

        let post = self
            .client
            .post(self.api.url())
            .json(&self.api.body(&self.model, request))
            .timeout(self.api.timeout());

        let resp = self
            .api
            .authorize(post)
            .send()
            .await
            .map_err(|e| inference(format!("{name} request failed: {e}"), None))?;

        let status = resp.status();
        let body = resp
            .bytes()
            .await
            .map_err(|e| inference(format!("{name} response unreadable: {e}"), None))?;

        if !status.is_success() {
            let text = String::from_utf8_lossy(&body);
            let snippet: String = text.trim().chars().take(ERROR_BODY_CHARS).collect();
            return Err(inference(
                format!("{name} HTTP {status}: {snippet}"),
                Some(status.as_u16()),
            ));
        }

        let raw = self
            .api
            .parse(&body)
            .map_err(|e| inference(format!("Failed to parse {name} response: {e}"), None))?;

        let text = tidy_caption(&raw.text, raw.truncated)
            .ok_or_else(|| inference(format!("{name} returned an empty caption"), None))?;

        Ok(CaptionResponse {
            text,
            model: raw.model.unwrap_or_else(|| self.model.clone()),
            tokens_used: raw.tokens_used,
            latency_ms: start.elapsed().as_millis() as u64,
        })
    }

    fn timeout(&self) -> Duration {
        self.api.timeout()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ModelConfig;
    use crate::model::anthropic::Anthropic;
    use crate::model::backend::ImageInput;
    use crate::model::ollama::Ollama;
    use axum::http::StatusCode;
    use axum::routing::{get, post};
    use axum::{Json, Router};
    use serde_json::json;

    async fn serve(app: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{addr}")
    }

    /// Ollama-shaped server answering every generate call with `status` and `body`.
    async fn ollama_server(status: StatusCode, body: &'static str) -> String {
        serve(
            Router::new()
                .route("/api/generate", post(move || async move { (status, body) }))
                .route("/api/tags", get(|| async { r#"{"models":[]}"# })),
        )
        .await
    }

    fn request() -> CaptionRequest {
        CaptionRequest::new(ImageInput::from_bytes(&[1, 2, 3], "jpeg"), &ModelConfig::default())
    }

    #[tokio::test]
    async fn test_caption_is_cleaned() {
        let base = ollama_server(
            StatusCode::OK,
            r#"{"response":"Caption: \"A cat asleep on a sofa.\"\n\nAnything else?","done_reason":"stop","prompt_eval_count":30,"eval_count":9}"#,
        )
        .await;
        let backend = HttpBackend::new(Ollama::new(&base), "llava");

        let resp = backend.generate(&request()).await.unwrap();
        assert_eq!(resp.text, "A cat asleep on a sofa.");
        assert_eq!(resp.model, "llava");
        assert_eq!(resp.tokens_used, Some(39));
    }

    #[tokio::test]
    async fn test_request_body_reaches_server() {
        // Echo the prompt and image back as the caption
        let app = Router::new().route(
            "/api/generate",
            post(|Json(body): Json<serde_json::Value>| async move {
                let echoed = format!(
                    "{} {} {}",
                    body["model"].as_str().unwrap_or(""),
                    body["images"][0].as_str().unwrap_or(""),
                    body["stream"]
                );
                Json(json!({ "response": echoed }))
            }),
        );
        let base = serve(app).await;
        let backend = HttpBackend::new(Ollama::new(&base), "llava:13b");

        let resp = backend.generate(&request()).await.unwrap();
        assert_eq!(resp.text, "llava:13b AQID false");
    }

    #[tokio::test]
    async fn test_truncated_reply_ends_on_full_sentence() {
        let base = ollama_server(
            StatusCode::OK,
            r#"{"response":"A harbor at sunrise. Fishing boats line the","done_reason":"length"}"#,
        )
        .await;
        let backend = HttpBackend::new(Ollama::new(&base), "llava");

        let resp = backend.generate(&request()).await.unwrap();
        assert_eq!(resp.text, "A harbor at sunrise.");
    }

    #[tokio::test]
    async fn test_http_error_carries_status_and_body() {
        let base = ollama_server(StatusCode::INTERNAL_SERVER_ERROR, "model crashed").await;
        let backend = HttpBackend::new(Ollama::new(&base), "llava");

        let err = backend.generate(&request()).await.unwrap_err();
        assert!(matches!(
            err,
            PipelineError::Inference {
                status_code: Some(500),
                ..
            }
        ));
        assert!(err.to_string().contains("ollama HTTP 500"));
        assert!(err.to_string().contains("model crashed"));
    }

    #[tokio::test]
    async fn test_long_error_body_is_shortened() {
        let long: &'static str = Box::leak("x".repeat(5000).into_boxed_str());
        let base = ollama_server(StatusCode::BAD_GATEWAY, long).await;
        let backend = HttpBackend::new(Ollama::new(&base), "llava");

        let message = backend.generate(&request()).await.unwrap_err().to_string();
        assert!(message.len() < 400);
    }

    #[tokio::test]
    async fn test_empty_caption_is_an_error() {
        let base = ollama_server(StatusCode::OK, r#"{"response":"  \n\n "}"#).await;
        let backend = HttpBackend::new(Ollama::new(&base), "llava");

        let err = backend.generate(&request()).await.unwrap_err();
        assert!(err.to_string().contains("ollama returned an empty caption"));
    }

    #[tokio::test]
    async fn test_malformed_reply_is_parse_error() {
        let base = ollama_server(StatusCode::OK, "<html>proxy error</html>").await;
        let backend = HttpBackend::new(Ollama::new(&base), "llava");

        let err = backend.generate(&request()).await.unwrap_err();
        assert!(err.to_string().contains("Failed to parse ollama response"));
    }

    #[tokio::test]
    async fn test_availability_follows_health_url() {
        let base = ollama_server(StatusCode::OK, "{}").await;
        assert!(HttpBackend::new(Ollama::new(&base), "llava").is_available().await);

        // Port 9 (discard) is essentially never serving HTTP locally.
        let down = HttpBackend::new(Ollama::new("http://127.0.0.1:9"), "llava");
        assert!(!down.is_available().await);

        // No health endpoint: configured means available
        let hosted = HttpBackend::new(Anthropic::new("sk-ant-test"), "claude-3-5-haiku-latest");
        assert!(hosted.is_available().await);
    }
}
