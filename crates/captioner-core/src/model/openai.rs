//! Chat Completions dialect, spoken by OpenAI and by Hyperbolic.
//!
//! The image travels as a data URL in the user message content array.

use std::time::Duration;

use serde::Deserialize;
use serde_json::json;

use super::backend::CaptionRequest;
use super::http::{CaptionApi, RawCaption};

const OPENAI_URL: &str = "https://api.openai.com/v1/chat/completions";

pub(crate) struct ChatCompletions {
    name: &'static str,
    url: String,
    api_key: String,
}

impl ChatCompletions {
    pub fn openai(api_key: &str) -> Self {
        Self {
            name: "openai",
            url: OPENAI_URL.to_string(),
            api_key: api_key.to_string(),
        }
    }

    /// Hyperbolic is OpenAI-compatible under its own base endpoint.
    pub fn hyperbolic(endpoint: &str, api_key: &str) -> Self {
        Self {
            name: "hyperbolic",
            url: format!("{}/chat/completions", endpoint.trim_end_matches('/')),
            api_key: api_key.to_string(),
        }
    }
}

#[derive(Deserialize)]
struct ChatReply {
    choices: Vec<Choice>,
    #[serde(default)]
    model: Option<String>,
    #[serde(default)]
    usage: Option<ChatUsage>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

#[derive(Deserialize)]
struct ChatUsage {
    total_tokens: u32,
}

impl CaptionApi for ChatCompletions {
    fn name(&self) -> &'static str {
        self.name
    }

    fn url(&self) -> &str {
        &self.url
    }

    fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        request.bearer_auth(&self.api_key)
    }

    fn body(&self, model: &str, request: &CaptionRequest) -> serde_json::Value {
        json!({
            "model": model,
            "max_tokens": request.max_tokens,
            "temperature": request.temperature,
            "messages": [{
                "role": "user",
                "content": [
                    { "type": "image_url", "image_url": { "url": request.image.data_url() } },
                    { "type": "text", "text": request.prompt },
                ],
            }],
        })
    }

    fn parse(&self, body: &[u8]) -> Result<RawCaption, String> {
        let reply: ChatReply = serde_json::from_slice(body).map_err(|e| e.to_string())?;
        let choice = reply
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| "no choices in reply".to_string())?;

        Ok(RawCaption {
            text: choice.message.content.unwrap_or_default(),
            truncated: choice.finish_reason.as_deref() == Some("length"),
            model: reply.model,
            tokens_used: reply.usage.map(|u| u.total_tokens),
        })
    }

    fn timeout(&self) -> Duration {
        Duration::from_secs(60)
    }
}
