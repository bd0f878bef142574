//! Ollama dialect for local vision models.
//!
//! No authentication, just a running Ollama with a vision model pulled.

use std::time::Duration;

use serde::Deserialize;
use serde_json::json;

use super::backend::CaptionRequest;
use super::http::{CaptionApi, RawCaption};

pub(crate) struct Ollama {
    endpoint: String,
    generate_url: String,
}

impl Ollama {
    pub fn new(endpoint: &str) -> Self {
        let endpoint = endpoint.trim_end_matches('/').to_string();
        Self {
            generate_url: format!("{endpoint}/api/generate"),
            endpoint,
        }
    }
}

/// Non-streaming `/api/generate` reply.
#[derive(Deserialize)]
struct GenerateReply {
    response: String,
    #[serde(default)]
    done_reason: Option<String>,
    #[serde(default)]
    prompt_eval_count: Option<u32>,
    #[serde(default)]
    eval_count: Option<u32>,
}

impl CaptionApi for Ollama {
    fn name(&self) -> &'static str {
        "ollama"
    }

    fn url(&self) -> &str {
        &self.generate_url
    }

    fn body(&self, model: &str, request: &CaptionRequest) -> serde_json::Value {
        json!({
            "model": model,
            "prompt": request.prompt,
            "images": [request.image.data],
            "stream": false,
            "options": {
                "temperature": request.temperature,
                "num_predict": request.max_tokens,
            },
        })
    }

    fn parse(&self, body: &[u8]) -> Result<RawCaption, String> {
        let reply: GenerateReply = serde_json::from_slice(body).map_err(|e| e.to_string())?;
        let tokens_used = match (reply.prompt_eval_count, reply.eval_count) {
            (Some(p), Some(e)) => Some(p + e),
            (None, Some(e)) => Some(e),
            _ => None,
        };
        Ok(RawCaption {
            truncated: reply.done_reason.as_deref() == Some("length"),
            text: reply.response,
            model: None,
            tokens_used,
        })
    }

    fn health_url(&self) -> Option<String> {
        Some(format!("{}/api/tags", self.endpoint))
    }

    fn timeout(&self) -> Duration {
        // Vision models running locally can be slow
        Duration::from_secs(120)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ModelConfig;
    use crate::model::backend::ImageInput;

    #[test]
    fn test_endpoint_trailing_slash_trimmed() {
        let api = Ollama::new("http://localhost:11434/");
        assert_eq!(api.url(), "http://localhost:11434/api/generate");
        assert_eq!(
            api.health_url().as_deref(),
            Some("http://localhost:11434/api/tags")
        );
    }

    #[test]
    fn test_body_sends_raw_base64_and_token_cap() {
        let config = ModelConfig {
            max_tokens: 64,
            ..ModelConfig::default()
        };
        let request = CaptionRequest::new(ImageInput::from_bytes(&[1, 2, 3], "jpeg"), &config);
        let body = Ollama::new("http://localhost:11434").body("llava", &request);
        assert_eq!(body["images"][0], "AQID");
        assert_eq!(body["options"]["num_predict"], 64);
        assert_eq!(body["stream"], false);
    }

    #[test]
    fn test_length_stop_marks_truncated() {
        let api = Ollama::new("http://localhost:11434");
        let raw = api
            .parse(br#"{"response":"A dog","done_reason":"length","eval_count":64}"#)
            .unwrap();
        assert!(raw.truncated);
        assert_eq!(raw.tokens_used, Some(64));

        let raw = api.parse(br#"{"response":" a cat "}"#).unwrap();
        assert!(!raw.truncated);
        assert!(raw.tokens_used.is_none());
    }
}
