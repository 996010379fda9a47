pub mod companies_tool;
pub mod page_tool;

use std::sync::Arc;

use tracing::{info, warn};

use crate::error::BulletinError;
use crate::utils::document_download::DocumentDownloader;
use crate::utils::pdf::{is_pdf, PdfError};
use crate::utils::publication_locator::{Located, PublicationLocator};

/// Collaborators shared by every request. Holds no per-request state.
pub struct BulletinContext {
    pub locator: PublicationLocator,
    pub downloader: Arc<dyn DocumentDownloader>,
    pub max_pages: u32,
}

/// Resolves the latest bulletin and downloads it.
async fn latest_document(ctx: &BulletinContext) -> Result<Vec<u8>, BulletinError> {
    let reference = match ctx.locator.locate_latest().await? {
        Located::Found(reference) => reference,
        Located::NotFound { tried } => return Err(BulletinError::NotFound { tried }),
    };

    let document = ctx.downloader.download(&reference.url).await?;

    let head_len = std::cmp::min(512, document.bytes.len());
    if !is_pdf(document.content_type.as_deref(), &document.bytes[..head_len]) {
        let content_type = document
            .content_type
            .unwrap_or_else(|| "unknown".to_string());
        warn!(target: "bulletin", url = %reference.url, ct = %content_type, "Downloaded document is not a PDF");
        return Err(PdfError::NotPdf { content_type }.into());
    }

    info!(target: "bulletin", url = %reference.url, period = %reference.period, size = document.bytes.len(), "Bulletin downloaded");
    Ok(document.bytes)
}
