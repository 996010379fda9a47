use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{Html, Selector};
use tracing::{debug, info};

use crate::utils::publication_locator::PublicationPeriod;
use crate::utils::scrape_proxy::{FetchError, PageFetcher};

pub const DEFAULT_ARCHIVE_BASE: &str = "https://www.sgg.gov.ma/Portals/0/BO";

static NOISE_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("script, style").expect("valid noise selector"));

static BODY_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("body").expect("valid body selector"));

static PDF_LINK_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse(r#"a[href$=".pdf"]"#).expect("valid pdf link selector"));

static WHITESPACE_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("valid whitespace regex"));

/// Location of the bulletin archive. Listing pages live at `{base}/{year}/{month}/`.
#[derive(Debug, Clone)]
pub struct ArchiveConfig {
    base_url: String,
}

impl ArchiveConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { base_url }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn listing_url(&self, period: PublicationPeriod) -> String {
        format!("{}/{}/", self.base_url, period)
    }
}

impl Default for ArchiveConfig {
    fn default() -> Self {
        Self::new(DEFAULT_ARCHIVE_BASE)
    }
}

/// A resolved bulletin PDF.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentReference {
    pub url: String,
    pub period: PublicationPeriod,
}

/// Looks up the newest bulletin PDF listed for `period`.
///
/// Returns `Ok(None)` when the listing has no PDF links. A non-success answer
/// from the scraping proxy is an error and is not turned into `None`.
pub async fn lookup(
    fetcher: &dyn PageFetcher,
    archive: &ArchiveConfig,
    period: PublicationPeriod,
) -> Result<Option<DocumentReference>, FetchError> {
    let listing_url = archive.listing_url(period);
    info!(target: "archive_lookup", url = %listing_url, "Fetching archive listing");

    let html = fetcher.fetch_html(&listing_url).await?;

    match last_pdf_href(&html) {
        Some(href) => {
            let url = format!("{}{}", listing_url, href);
            debug!(target: "archive_lookup", href = %href, url = %url, "PDF link selected");
            Ok(Some(DocumentReference { url, period }))
        }
        None => {
            info!(target: "archive_lookup", url = %listing_url, "No PDF link on listing page");
            Ok(None)
        }
    }
}

/// Raw `href` of the last `.pdf` anchor in document order, ignoring anything
/// inside `<script>` or `<style>`.
pub fn last_pdf_href(html: &str) -> Option<String> {
    if html.trim().is_empty() {
        return None;
    }

    let mut document = Html::parse_document(html);

    let noise: Vec<_> = document
        .select(&NOISE_SELECTOR)
        .map(|element| element.id())
        .collect();
    for id in noise {
        if let Some(mut node) = document.tree.get_mut(id) {
            node.detach();
        }
    }

    let body_html = document
        .select(&BODY_SELECTOR)
        .next()
        .map(|body| body.inner_html())
        .unwrap_or_else(|| document.root_element().html());
    let collapsed = WHITESPACE_RUN.replace_all(&body_html, " ");

    let fragment = Html::parse_fragment(&collapsed);
    fragment
        .select(&PDF_LINK_SELECTOR)
        .filter_map(|anchor| anchor.value().attr("href"))
        .last()
        .map(str::to_string)
}
