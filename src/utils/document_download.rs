use async_trait::async_trait;
use reqwest::{header, Client};
use tracing::{info, warn};

use crate::utils::scrape_proxy::FetchError;

// Firefox ESR User-Agent; some bulletin hosts reject default client identifiers
pub const FIREFOX_UA: &str =
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10.15; rv:115.0) Gecko/20100101 Firefox/115.0";

const PDF_LIMIT_BYTES: usize = 100 * 1024 * 1024; // 100 MiB

/// Body and declared type of a downloaded document.
#[derive(Debug, Clone)]
pub struct DownloadedDocument {
    pub bytes: Vec<u8>,
    pub content_type: Option<String>,
}

#[async_trait]
pub trait DocumentDownloader: Send + Sync {
    async fn download(&self, url: &str) -> Result<DownloadedDocument, FetchError>;
}

pub struct HttpDocumentDownloader {
    client: Client,
    limit: usize,
}

impl HttpDocumentDownloader {
    pub fn new() -> Result<Self, FetchError> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(60))
            .build()?;

        Ok(Self {
            client,
            limit: PDF_LIMIT_BYTES,
        })
    }

    #[cfg(test)]
    fn with_limit(limit: usize) -> Self {
        Self {
            client: Client::new(),
            limit,
        }
    }
}

#[async_trait]
impl DocumentDownloader for HttpDocumentDownloader {
    async fn download(&self, url: &str) -> Result<DownloadedDocument, FetchError> {
        info!(target: "document_download", url = url, "Starting PDF download");

        let response = self
            .client
            .get(url)
            .header(header::USER_AGENT, FIREFOX_UA)
            .send()
            .await
            .map_err(|e| {
                warn!(target: "document_download", url = url, "HTTP transport error: {}", e);
                FetchError::Request(e)
            })?;

        let status = response.status();
        if !status.is_success() {
            warn!(target: "document_download", url = url, status = status.as_u16(), "HTTP non-success status");
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let content_type = response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|ct| ct.to_str().ok())
            .map(|s| s.to_string());

        if let Some(declared) = response.content_length() {
            if declared as usize > self.limit {
                warn!(target: "document_download", url = url, size = declared, limit = self.limit, "Declared size over limit; refusing");
                return Err(FetchError::TooLarge {
                    url: url.to_string(),
                    size: declared as usize,
                    limit: self.limit,
                });
            }
        }

        let bytes = response.bytes().await?;
        let size = bytes.len();
        if size > self.limit {
            warn!(target: "document_download", url = url, size = size, limit = self.limit, "Body over limit; refusing");
            return Err(FetchError::TooLarge {
                url: url.to_string(),
                size,
                limit: self.limit,
            });
        }

        info!(target: "document_download", url = url, size = size, ct = ?content_type, "PDF download completed");
        Ok(DownloadedDocument {
            bytes: bytes.to_vec(),
            content_type,
        })
    }
}
