//! Streaming image download from a user-supplied URL.

use futures_util::StreamExt;
use reqwest::header::CONTENT_TYPE;
use reqwest::Url;
use std::time::Duration;

use crate::config::FetchConfig;
use crate::error::PipelineError;

/// Downloads image bytes over HTTP(S) with a body size limit.
pub struct ImageFetcher {
    client: reqwest::Client,
    max_download_mb: u64,
    timeout_ms: Option<u64>,
}

/// Raw response body and what the server said about it.
#[derive(Debug, Clone)]
pub struct FetchedBytes {
    /// Final URL after redirects
    pub url: String,
    /// Complete response body
    pub bytes: Vec<u8>,
    /// `Content-Type` header, if present
    pub content_type: Option<String>,
}

impl ImageFetcher {
    /// Create a fetcher with the given settings.
    pub fn new(config: &FetchConfig) -> Result<Self, reqwest::Error> {
        let mut builder = reqwest::Client::builder().user_agent(config.user_agent.clone());
        if let Some(ms) = config.timeout_ms {
            builder = builder.timeout(Duration::from_millis(ms));
        }

        Ok(Self {
            client: builder.build()?,
            max_download_mb: config.max_download_mb,
            timeout_ms: config.timeout_ms,
        })
    }

    fn max_bytes(&self) -> u64 {
        self.max_download_mb.saturating_mul(1024 * 1024)
    }

    /// GET the URL and collect the body chunk by chunk.
    ///
    /// Non-2xx responses, transport failures and bodies over the size limit
    /// are all reported as errors; nothing partial is returned.
    pub async fn fetch(&self, raw_url: &str) -> Result<FetchedBytes, PipelineError> {
        let url = parse_url(raw_url)?;
        tracing::debug!(url = %url, "Fetching image");

        let resp = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| self.transport_error(raw_url, e))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(PipelineError::Fetch {
                url: raw_url.to_string(),
                message: format!("HTTP {status}"),
                status_code: Some(status.as_u16()),
            });
        }

        let max_bytes = self.max_bytes();
        if let Some(len) = resp.content_length() {
            if len > max_bytes {
                return Err(self.too_large(raw_url, len));
            }
        }

        let final_url = resp.url().to_string();
        let content_type = resp
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(String::from);

        let capacity = resp.content_length().unwrap_or(0).min(max_bytes) as usize;
        let mut bytes = Vec::with_capacity(capacity);
        let mut stream = resp.bytes_stream();

        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(|e| self.transport_error(raw_url, e))?;
            let total = bytes.len() as u64 + chunk.len() as u64;
            if total > max_bytes {
                return Err(self.too_large(raw_url, total));
            }
            bytes.extend_from_slice(&chunk);
        }

        tracing::debug!(
            url = %final_url,
            bytes = bytes.len(),
            content_type = content_type.as_deref().unwrap_or("-"),
            "Fetched image bytes"
        );

        Ok(FetchedBytes {
            url: final_url,
            bytes,
            content_type,
        })
    }

    fn transport_error(&self, url: &str, e: reqwest::Error) -> PipelineError {
        if e.is_timeout() {
            if let Some(timeout_ms) = self.timeout_ms {
                return PipelineError::Timeout {
                    url: url.to_string(),
                    stage: "fetch".to_string(),
                    timeout_ms,
                };
            }
        }
        PipelineError::Fetch {
            url: url.to_string(),
            message: e.to_string(),
            status_code: e.status().map(|s| s.as_u16()),
        }
    }

    fn too_large(&self, url: &str, size: u64) -> PipelineError {
        PipelineError::ResponseTooLarge {
            url: url.to_string(),
            size_mb: size.div_ceil(1024 * 1024),
            max_mb: self.max_download_mb,
        }
    }
}

/// Parse user input as an absolute http or https URL.
pub fn parse_url(raw: &str) -> Result<Url, PipelineError> {
    let url = Url::parse(raw.trim()).map_err(|e| PipelineError::InvalidUrl {
        url: raw.to_string(),
        message: e.to_string(),
    })?;

    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(PipelineError::InvalidUrl {
            url: raw.to_string(),
            message: format!("unsupported scheme '{other}', expected http or https"),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_url_accepts_http_and_https() {
        assert!(parse_url("https://example.com/cat.jpg").is_ok());
        assert!(parse_url("  http://example.com/cat.jpg  ").is_ok());
    }

    #[test]
    fn test_parse_url_rejects_other_schemes() {
        let err = parse_url("file:///etc/passwd").unwrap_err();
        assert!(err.to_string().contains("unsupported scheme 'file'"));
    }

    #[test]
    fn test_parse_url_rejects_garbage() {
        let err = parse_url("not a url").unwrap_err();
        assert!(matches!(err, PipelineError::InvalidUrl { .. }));
    }

    #[test]
    fn test_too_large_rounds_up() {
        let fetcher = ImageFetcher::new(&FetchConfig {
            max_download_mb: 1,
            ..FetchConfig::default()
        })
        .unwrap();
        let err = fetcher.too_large("https://example.com/big.png", 1024 * 1024 + 1);
        assert!(err.to_string().contains("(2MB > 1MB)"));
    }

    #[tokio::test]
    async fn test_connection_refused_is_fetch_error() {
        let fetcher = ImageFetcher::new(&FetchConfig::default()).unwrap();
        let err = fetcher.fetch("http://127.0.0.1:9/cat.jpg").await.unwrap_err();
        assert!(matches!(err, PipelineError::Fetch { status_code: None, .. }));
    }
}
