//! Document fetching: download the PDF bytes behind a URL.
//!
//! ## Why keep the document in memory?
//!
//! pdfium can load a document straight from a byte buffer, so nothing ever
//! touches the file system. The cost is that the whole document is resident
//! for the duration of the request, which is why the download is capped at
//! `max_document_bytes`. The cap is checked against `Content-Length` before
//! reading and again after every chunk, so a server that omits or lies about
//! the length still cannot push more than one chunk past the limit.
//!
//! Dropping the future returned by [`DocumentFetcher::fetch`] aborts the
//! request and releases the connection.

use crate::config::QuizConfig;
use crate::error::QuizError;
use async_trait::async_trait;
use reqwest::Url;
use std::time::Duration;
use tracing::{debug, info};

/// Retrieves the raw bytes of a document.
#[async_trait]
pub trait DocumentFetcher: Send + Sync {
    async fn fetch(&self, url: &Url) -> Result<Vec<u8>, QuizError>;
}

/// [`DocumentFetcher`] over HTTP(S) with a timeout and a size cap.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: reqwest::Client,
    timeout_secs: u64,
    max_bytes: u64,
}

impl HttpFetcher {
    pub fn new(timeout_secs: u64, max_bytes: u64) -> Result<Self, QuizError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .user_agent(concat!("pdf2quiz/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| QuizError::InvalidConfig(format!("HTTP client: {e}")))?;

        Ok(Self {
            client,
            timeout_secs,
            max_bytes,
        })
    }

    pub fn from_config(config: &QuizConfig) -> Result<Self, QuizError> {
        Self::new(config.fetch_timeout_secs, config.max_document_bytes)
    }

    fn map_reqwest_error(&self, url: &Url, e: reqwest::Error) -> QuizError {
        if e.is_timeout() {
            QuizError::DownloadTimeout {
                url: url.to_string(),
                secs: self.timeout_secs,
            }
        } else {
            QuizError::DownloadFailed {
                url: url.to_string(),
                reason: e.to_string(),
                status: e.status().map(|s| s.as_u16()),
            }
        }
    }

    fn too_large(&self, url: &Url) -> QuizError {
        QuizError::DocumentTooLarge {
            url: url.to_string(),
            limit: self.max_bytes,
        }
    }
}

#[async_trait]
impl DocumentFetcher for HttpFetcher {
    async fn fetch(&self, url: &Url) -> Result<Vec<u8>, QuizError> {
        info!("Downloading document from: {}", url);

        let mut response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| self.map_reqwest_error(url, e))?;

        if !response.status().is_success() {
            return Err(QuizError::DownloadFailed {
                url: url.to_string(),
                reason: format!("HTTP {}", response.status()),
                status: Some(response.status().as_u16()),
            });
        }

        if let Some(declared) = response.content_length() {
            if declared > self.max_bytes {
                debug!("Declared length {} exceeds limit {}", declared, self.max_bytes);
                return Err(self.too_large(url));
            }
        }

        let capacity = response
            .content_length()
            .map(|n| n as usize)
            .unwrap_or(64 * 1024);
        let mut body = Vec::with_capacity(capacity);

        while let Some(chunk) = response
            .chunk()
            .await
            .map_err(|e| self.map_reqwest_error(url, e))?
        {
            if body.len() as u64 + chunk.len() as u64 > self.max_bytes {
                return Err(self.too_large(url));
            }
            body.extend_from_slice(&chunk);
        }

        info!("Downloaded {} bytes", body.len());
        Ok(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_from_default_config() {
        let fetcher = HttpFetcher::from_config(&QuizConfig::default()).unwrap();
        assert_eq!(fetcher.timeout_secs, 60);
        assert_eq!(fetcher.max_bytes, crate::config::DEFAULT_MAX_DOCUMENT_BYTES);
    }

    // Network behaviour (status codes, size cap, timeout) is covered by
    // tests/fetch.rs against a local mock server.
}
