use serde::Deserialize;
use tracing::info;

use super::{latest_document, BulletinContext};
use crate::error::BulletinError;
use crate::utils::pdf::{extract_text_blocking, ExtractionRequest, ExtractionResult};

#[derive(Debug, Default, Deserialize)]
pub struct PageParams {
    pub page: Option<String>,
}

/// Text of one page of the latest bulletin.
pub struct PageTextTool;

impl PageTextTool {
    pub fn new() -> Self {
        Self
    }

    pub async fn execute(
        &self,
        ctx: &BulletinContext,
        params: PageParams,
    ) -> Result<ExtractionResult, BulletinError> {
        // Validate before touching the network
        let page = parse_page(params.page.as_deref())?;

        info!(target: "bulletin", page = page, "Extracting bulletin page");
        let bytes = latest_document(ctx).await?;
        Ok(extract_text_blocking(bytes, ExtractionRequest::single_page(page)).await?)
    }
}

fn parse_page(raw: Option<&str>) -> Result<u32, BulletinError> {
    let raw = match raw.map(str::trim) {
        Some(value) if !value.is_empty() => value,
        _ => {
            return Err(BulletinError::Validation(
                "Missing required query parameter 'page'".to_string(),
            ))
        }
    };

    match raw.parse::<u32>() {
        Ok(page) if page >= 1 => Ok(page),
        _ => Err(BulletinError::Validation(format!(
            "Invalid 'page' parameter '{}': expected a positive integer",
            raw
        ))),
    }
}
