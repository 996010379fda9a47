use async_trait::async_trait;
use reqwest::{header, Client};
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, warn};
use url::Url;

#[derive(Error, Debug)]
pub enum FetchError {
    #[error("HTTP request error: {0}")]
    Request(#[from] reqwest::Error),

    #[error("HTTP error {status} while fetching {url}")]
    Status { url: String, status: u16 },

    #[error("Document at {url} exceeds the allowed size limit ({size} > {limit} bytes)")]
    TooLarge { url: String, size: usize, limit: usize },
}

/// Source of rendered HTML for a page URL.
///
/// The archive listing is JavaScript-driven, so the production implementation
/// goes through an external rendering proxy. Tests substitute in-process fakes.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    async fn fetch_html(&self, url: &str) -> Result<String, FetchError>;
}

#[derive(Debug, Deserialize)]
struct ScrapeProxyResponse {
    html: String,
}

pub struct ScrapeProxyClient {
    client: Client,
    endpoint: Url,
}

impl ScrapeProxyClient {
    pub fn new(endpoint: Url) -> Result<Self, FetchError> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()?;

        Ok(Self { client, endpoint })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

#[async_trait]
impl PageFetcher for ScrapeProxyClient {
    async fn fetch_html(&self, url: &str) -> Result<String, FetchError> {
        debug!(target: "scrape_proxy", endpoint = %self.endpoint, url = url, "Requesting rendered HTML");

        let response = self
            .client
            .get(self.endpoint.clone())
            .query(&[("url", url)])
            .header(header::ACCEPT, "application/json")
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            warn!(target: "scrape_proxy", url = url, status = status.as_u16(), "Scrape proxy returned non-success status");
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let body = response.json::<ScrapeProxyResponse>().await?;
        debug!(target: "scrape_proxy", url = url, len = body.html.len(), "Received rendered HTML");
        Ok(body.html)
    }
}
