// Page-addressable PDF text extraction.
// Pages before the requested one are never decoded.

use std::collections::BTreeMap;

use lopdf::content::{Content, Operation};
use lopdf::{Document, Object, ObjectId};
use thiserror::Error;
use tracing::{debug, info};

/// Page bound used by the aggregate endpoint.
pub const DEFAULT_MAX_PAGES: u32 = 50;

#[derive(Error, Debug)]
pub enum PdfError {
    #[error("Failed to parse PDF content: {0}")]
    Parse(#[from] lopdf::Error),

    #[error("Downloaded document is not a PDF (content type: {content_type})")]
    NotPdf { content_type: String },

    #[error("PDF extraction task failed: {0}")]
    Task(String),
}

/// Which pages to visit and which to emit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExtractionRequest {
    pub max_page: u32,
    pub target_page: Option<u32>,
}

impl ExtractionRequest {
    /// Bounded-single-page mode: walk up to `page` and emit only that page.
    pub fn single_page(page: u32) -> Self {
        Self {
            max_page: page,
            target_page: Some(page),
        }
    }

    /// Emit every page up to `max_page`.
    pub fn first_pages(max_page: u32) -> Self {
        Self {
            max_page,
            target_page: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractionResult {
    pub text: String,
}

/// Decodes `bytes` and extracts text according to `request`.
pub fn extract_text(bytes: &[u8], request: &ExtractionRequest) -> Result<ExtractionResult, PdfError> {
    let started = std::time::Instant::now();
    let document = Document::load_mem(bytes)?;
    let pages = document.get_pages();
    let page_count = pages.len() as u32;
    debug!(target: "pdf", page_count = page_count, max_page = request.max_page, target_page = ?request.target_page, "PDF decoded");

    let text = collect_pages(page_count, request, |page| match pages.get(&page) {
        Some(&page_id) => page_text_runs(&document, page_id),
        None => Ok(String::new()),
    })?;

    info!(target: "pdf", elapsed_ms = started.elapsed().as_millis() as u64, len = text.len(), "PDF extraction succeeded");
    Ok(ExtractionResult { text })
}

/// Runs [`extract_text`] on the blocking pool.
pub async fn extract_text_blocking(
    bytes: Vec<u8>,
    request: ExtractionRequest,
) -> Result<ExtractionResult, PdfError> {
    tokio::task::spawn_blocking(move || extract_text(&bytes, &request))
        .await
        .map_err(|e| PdfError::Task(e.to_string()))?
}

/// Walks pages `1..=min(max_page, page_count)` and joins what `render` yields.
///
/// In bounded-single-page mode `render` is called for the target page only.
/// Empty page texts are dropped so they never leave doubled separators.
fn collect_pages<E>(
    page_count: u32,
    request: &ExtractionRequest,
    mut render: impl FnMut(u32) -> Result<String, E>,
) -> Result<String, E> {
    let last = request.max_page.min(page_count);
    let mut parts: Vec<String> = Vec::new();

    for page in 1..=last {
        let text = match request.target_page {
            Some(target) if page != target => String::new(),
            _ => render(page)?,
        };
        if !text.is_empty() {
            parts.push(text);
        }
    }

    Ok(parts.join(" ").trim().to_string())
}

// TJ displacements below this (thousandths of text space) read as a word gap
const TJ_WORD_GAP: f32 = -250.0;

/// Text runs of one page joined with single spaces.
///
/// Each text-showing operator (`Tj`, `TJ`, `'`, `"`) is one run, whether or not
/// it shares a `BT`/`ET` block with other runs.
fn page_text_runs(document: &Document, page_id: ObjectId) -> Result<String, PdfError> {
    let encodings: BTreeMap<Vec<u8>, String> = document
        .get_page_fonts(page_id)
        .into_iter()
        .map(|(name, font)| {
            let encoding = font
                .get(b"Encoding")
                .and_then(Object::as_name_str)
                .unwrap_or("StandardEncoding")
                .to_string();
            (name, encoding)
        })
        .collect();

    let content = Content::decode(&document.get_page_content(page_id)?)?;

    let mut runs = Vec::new();
    let mut encoding: Option<&str> = None;
    for operation in &content.operations {
        match operation.operator.as_str() {
            "Tf" => {
                encoding = operation
                    .operands
                    .first()
                    .and_then(|name| name.as_name().ok())
                    .and_then(|name| encodings.get(name))
                    .map(String::as_str);
            }
            "Tj" | "TJ" | "'" | "\"" => {
                if let Some(run) = operation_run(operation, encoding) {
                    runs.push(run);
                }
            }
            _ => {}
        }
    }

    Ok(join_runs(runs))
}

/// Decoded text shown by one operator, or `None` when it shows nothing.
fn operation_run(operation: &Operation, encoding: Option<&str>) -> Option<String> {
    // `"` carries word and char spacing before the string
    let shown = match operation.operator.as_str() {
        "\"" => operation.operands.get(2),
        _ => operation.operands.first(),
    }?;

    let mut run = String::new();
    match shown {
        Object::String(bytes, _) => run.push_str(&Document::decode_text(encoding, bytes)),
        Object::Array(items) => {
            for item in items {
                match item {
                    Object::String(bytes, _) => {
                        run.push_str(&Document::decode_text(encoding, bytes))
                    }
                    Object::Integer(n) if (*n as f32) < TJ_WORD_GAP => run.push(' '),
                    Object::Real(n) if (*n as f32) < TJ_WORD_GAP => run.push(' '),
                    _ => {}
                }
            }
        }
        _ => return None,
    }

    Some(run)
}

fn join_runs(runs: Vec<String>) -> String {
    runs.iter()
        .flat_map(|run| run.split_whitespace())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Returns true if given content-type or head indicates a PDF file.
/// - Content-Type: application/pdf (case-insensitive, substring match)
/// - Magic bytes: %PDF-
pub fn is_pdf(content_type: Option<&str>, head: &[u8]) -> bool {
    let ct = content_type.unwrap_or("").to_ascii_lowercase();
    ct.contains("application/pdf") || head.starts_with(b"%PDF-")
}
