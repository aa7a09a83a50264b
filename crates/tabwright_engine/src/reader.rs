use std::time::Duration;

use bytes::BytesMut;
use engine_logging::engine_trace;
use futures_util::StreamExt;

use crate::types::{FailureKind, FetchError};

pub const DEFAULT_READER_URL: &str = "https://r.jina.ai/";

#[derive(Debug, Clone)]
pub struct ReaderSettings {
    /// Reader service prefix; the page URL is appended verbatim.
    pub endpoint: String,
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
    pub max_bytes: u64,
    pub headers: Vec<(String, String)>,
}

impl Default for ReaderSettings {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_READER_URL.to_string(),
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(30),
            max_bytes: 20 * 1024 * 1024,
            headers: vec![
                ("X-Engine".to_string(), "direct".to_string()),
                ("X-Return-Format".to_string(), "markdown".to_string()),
                ("X-Timeout".to_string(), "2".to_string()),
            ],
        }
    }
}

/// Extracts readable text for a page.
#[async_trait::async_trait]
pub trait ContentReader: Send + Sync {
    async fn extract(&self, url: &str) -> Result<String, FetchError>;
}

/// Reader backed by an HTTP text-extraction service.
#[derive(Debug, Clone)]
pub struct ReqwestReader {
    settings: ReaderSettings,
}

impl ReqwestReader {
    pub fn new(settings: ReaderSettings) -> Self {
        Self { settings }
    }

    fn build_client(&self) -> Result<reqwest::Client, FetchError> {
        reqwest::Client::builder()
            .connect_timeout(self.settings.connect_timeout)
            .timeout(self.settings.request_timeout)
            .build()
            .map_err(|err| FetchError::new(FailureKind::Network, err.to_string()))
    }

    fn reader_url(&self, url: &str) -> String {
        let endpoint = self.settings.endpoint.trim_end_matches('/');
        format!("{endpoint}/{url}")
    }
}

#[async_trait::async_trait]
impl ContentReader for ReqwestReader {
    async fn extract(&self, url: &str) -> Result<String, FetchError> {
        reqwest::Url::parse(url)
            .map_err(|err| FetchError::new(FailureKind::InvalidUrl, err.to_string()))?;
        let target = reqwest::Url::parse(&self.reader_url(url))
            .map_err(|err| FetchError::new(FailureKind::InvalidUrl, err.to_string()))?;
        let client = self.build_client()?;

        let mut request = client.get(target);
        for (name, value) in &self.settings.headers {
            request = request.header(name.as_str(), value.as_str());
        }
        let response = request.send().await.map_err(map_reqwest_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::new(
                FailureKind::HttpStatus(status.as_u16()),
                status.canonical_reason().unwrap_or("request failed"),
            ));
        }

        if let Some(content_len) = response.content_length() {
            if content_len > self.settings.max_bytes {
                return Err(FetchError::new(
                    FailureKind::TooLarge {
                        max_bytes: self.settings.max_bytes,
                        actual: Some(content_len),
                    },
                    "response too large",
                ));
            }
        }

        let mut bytes = BytesMut::new();
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(map_reqwest_error)?;
            let next_len = bytes.len() as u64 + chunk.len() as u64;
            if next_len > self.settings.max_bytes {
                return Err(FetchError::new(
                    FailureKind::TooLarge {
                        max_bytes: self.settings.max_bytes,
                        actual: Some(next_len),
                    },
                    "response too large",
                ));
            }
            bytes.extend_from_slice(&chunk);
        }

        engine_trace!("Read {} bytes for {}", bytes.len(), url);
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }
}

fn map_reqwest_error(err: reqwest::Error) -> FetchError {
    if err.is_timeout() {
        return FetchError::new(FailureKind::Timeout, err.to_string());
    }
    FetchError::new(FailureKind::Network, err.to_string())
}
