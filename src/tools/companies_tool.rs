use tracing::info;

use super::{latest_document, BulletinContext};
use crate::error::BulletinError;
use crate::utils::pdf::{extract_text_blocking, ExtractionRequest, ExtractionResult};

/// Text of the first pages of the latest bulletin, where company notices are published.
pub struct CompaniesTool;

impl CompaniesTool {
    pub fn new() -> Self {
        Self
    }

    pub async fn execute(&self, ctx: &BulletinContext) -> Result<ExtractionResult, BulletinError> {
        info!(target: "bulletin", max_pages = ctx.max_pages, "Extracting bulletin opening pages");
        let bytes = latest_document(ctx).await?;
        Ok(extract_text_blocking(bytes, ExtractionRequest::first_pages(ctx.max_pages)).await?)
    }
}
