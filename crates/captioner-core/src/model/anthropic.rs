//! Anthropic Messages API dialect.
//!
//! The image goes in as a base64 content block ahead of the text prompt.

use std::time::Duration;

use serde::Deserialize;
use serde_json::json;

use super::backend::CaptionRequest;
use super::http::{CaptionApi, RawCaption};

const MESSAGES_URL: &str = "https://api.anthropic.com/v1/messages";
const API_VERSION: &str = "2023-06-01";

pub(crate) struct Anthropic {
    api_key: String,
}

impl Anthropic {
    pub fn new(api_key: &str) -> Self {
        Self {
            api_key: api_key.to_string(),
        }
    }
}

#[derive(Deserialize)]
struct MessagesReply {
    content: Vec<Block>,
    #[serde(default)]
    model: Option<String>,
    #[serde(default)]
    stop_reason: Option<String>,
    #[serde(default)]
    usage: Option<Usage>,
}

#[derive(Deserialize)]
struct Block {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Deserialize)]
struct Usage {
    input_tokens: u32,
    output_tokens: u32,
}

impl CaptionApi for Anthropic {
    fn name(&self) -> &'static str {
        "anthropic"
    }

    fn url(&self) -> &str {
        MESSAGES_URL
    }

    fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        request
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", API_VERSION)
    }

    fn body(&self, model: &str, request: &CaptionRequest) -> serde_json::Value {
        json!({
            "model": model,
            "max_tokens": request.max_tokens,
            "temperature": request.temperature,
            "messages": [{
                "role": "user",
                "content": [
                    {
                        "type": "image",
                        "source": {
                            "type": "base64",
                            "media_type": request.image.media_type,
                            "data": request.image.data,
                        },
                    },
                    { "type": "text", "text": request.prompt },
                ],
            }],
        })
    }

    fn parse(&self, body: &[u8]) -> Result<RawCaption, String> {
        let reply: MessagesReply = serde_json::from_slice(body).map_err(|e| e.to_string())?;
        Ok(RawCaption {
            text: reply.content.into_iter().filter_map(|b| b.text).collect(),
            truncated: reply.stop_reason.as_deref() == Some("max_tokens"),
            model: reply.model,
            tokens_used: reply.usage.map(|u| u.input_tokens + u.output_tokens),
        })
    }

    fn timeout(&self) -> Duration {
        Duration::from_secs(60)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ModelConfig;
    use crate::model::backend::ImageInput;

    #[test]
    fn test_image_block_precedes_prompt() {
        let request = CaptionRequest::new(
            ImageInput::from_bytes(&[1, 2, 3], "png"),
            &ModelConfig::default(),
        );
        let body = Anthropic::new("sk-ant-test").body("claude-3-5-haiku-latest", &request);
        let content = &body["messages"][0]["content"];
        assert_eq!(content[0]["type"], "image");
        assert_eq!(content[0]["source"]["media_type"], "image/png");
        assert_eq!(content[0]["source"]["data"], "AQID");
        assert_eq!(content[1]["type"], "text");
    }

    #[test]
    fn test_reply_joins_text_blocks() {
        let raw = br#"{
            "content": [{"type":"text","text":"A cat "},{"type":"text","text":"on a mat."}],
            "model": "claude-3-5-haiku-latest",
            "stop_reason": "end_turn",
            "usage": {"input_tokens": 10, "output_tokens": 5}
        }"#;
        let caption = Anthropic::new("k").parse(raw).unwrap();
        assert_eq!(caption.text, "A cat on a mat.");
        assert_eq!(caption.tokens_used, Some(15));
        assert!(!caption.truncated);
    }

    #[test]
    fn test_max_tokens_stop_marks_truncated() {
        let raw = br#"{"content":[{"type":"text","text":"A cat on"}],"stop_reason":"max_tokens"}"#;
        let caption = Anthropic::new("k").parse(raw).unwrap();
        assert!(caption.truncated);
        assert!(caption.model.is_none());
    }
}
