//! In-process fakes for the network collaborators, plus a small PDF builder.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, Stream};

use crate::utils::document_download::{DocumentDownloader, DownloadedDocument};
use crate::utils::scrape_proxy::{FetchError, PageFetcher};

/// Answers every URL with the same HTML.
pub struct StaticFetcher {
    html: String,
    requested: Mutex<Vec<String>>,
}

impl StaticFetcher {
    pub fn new(html: impl Into<String>) -> Self {
        Self {
            html: html.into(),
            requested: Mutex::new(Vec::new()),
        }
    }

    pub fn requested(&self) -> Vec<String> {
        self.requested.lock().unwrap().clone()
    }

    pub fn calls(&self) -> usize {
        self.requested.lock().unwrap().len()
    }
}

#[async_trait]
impl PageFetcher for StaticFetcher {
    async fn fetch_html(&self, url: &str) -> Result<String, FetchError> {
        self.requested.lock().unwrap().push(url.to_string());
        Ok(self.html.clone())
    }
}

/// Answers per URL; unknown URLs get an empty page, `fail` URLs get a 503.
pub struct ScriptedFetcher {
    pages: HashMap<String, String>,
    failing: Vec<String>,
    requested: Mutex<Vec<String>>,
}

impl ScriptedFetcher {
    pub fn new() -> Self {
        Self {
            pages: HashMap::new(),
            failing: Vec::new(),
            requested: Mutex::new(Vec::new()),
        }
    }

    pub fn page(mut self, url: &str, html: &str) -> Self {
        self.pages.insert(url.to_string(), html.to_string());
        self
    }

    pub fn fail(mut self, url: &str) -> Self {
        self.failing.push(url.to_string());
        self
    }

    pub fn requested(&self) -> Vec<String> {
        self.requested.lock().unwrap().clone()
    }
}

#[async_trait]
impl PageFetcher for ScriptedFetcher {
    async fn fetch_html(&self, url: &str) -> Result<String, FetchError> {
        self.requested.lock().unwrap().push(url.to_string());
        if self.failing.iter().any(|u| u == url) {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: 503,
            });
        }
        Ok(self
            .pages
            .get(url)
            .cloned()
            .unwrap_or_else(|| "<html><body></body></html>".to_string()))
    }
}

/// Serves fixed bytes for every download.
pub struct StaticDownloader {
    bytes: Vec<u8>,
    content_type: Option<String>,
    requested: Mutex<Vec<String>>,
}

impl StaticDownloader {
    pub fn pdf(bytes: Vec<u8>) -> Self {
        Self {
            bytes,
            content_type: Some("application/pdf".to_string()),
            requested: Mutex::new(Vec::new()),
        }
    }

    pub fn html(body: &str) -> Self {
        Self {
            bytes: body.as_bytes().to_vec(),
            content_type: Some("text/html; charset=utf-8".to_string()),
            requested: Mutex::new(Vec::new()),
        }
    }

    pub fn requested(&self) -> Vec<String> {
        self.requested.lock().unwrap().clone()
    }

    pub fn calls(&self) -> usize {
        self.requested.lock().unwrap().len()
    }
}

#[async_trait]
impl DocumentDownloader for StaticDownloader {
    async fn download(&self, url: &str) -> Result<DownloadedDocument, FetchError> {
        self.requested.lock().unwrap().push(url.to_string());
        Ok(DownloadedDocument {
            bytes: self.bytes.clone(),
            content_type: self.content_type.clone(),
        })
    }
}

/// Builds a PDF whose page `n` shows the lines of `pages[n - 1]`.
pub fn build_pdf(pages: &[&[&str]]) -> Vec<u8> {
    let contents = pages
        .iter()
        .map(|lines| {
            let mut operations = Vec::new();
            for (i, line) in lines.iter().enumerate() {
                operations.push(Operation::new("BT", vec![]));
                operations.push(Operation::new("Tf", vec!["F1".into(), 12.into()]));
                operations.push(Operation::new(
                    "Td",
                    vec![72.into(), (720 - 20 * i as i64).into()],
                ));
                operations.push(Operation::new("Tj", vec![Object::string_literal(*line)]));
                operations.push(Operation::new("ET", vec![]));
            }
            operations
        })
        .collect();
    assemble_pdf(contents)
}

/// A text-showing operator inside a shared text block.
pub enum BlockRun<'a> {
    /// `(text) Tj`
    Shown(&'a str),
    /// `[(a) -20 (b) -20 ...] TJ` with tight kerning between the pieces.
    Kerned(&'a [&'a str]),
    /// `[(a) -600 (b)] TJ`, a kerning gap wide enough to read as a space.
    Spaced(&'a str, &'a str),
}

/// One page whose runs all sit in a single `BT`/`ET` block, each moved down a line with `Td`.
pub fn build_block_pdf(runs: &[BlockRun<'_>]) -> Vec<u8> {
    let mut operations = vec![
        Operation::new("BT", vec![]),
        Operation::new("Tf", vec!["F1".into(), 12.into()]),
        Operation::new("Td", vec![72.into(), 720.into()]),
    ];
    for run in runs {
        let shown = match run {
            BlockRun::Shown(text) => Operation::new("Tj", vec![Object::string_literal(*text)]),
            BlockRun::Kerned(pieces) => {
                let mut items: Vec<Object> = Vec::new();
                for (i, piece) in pieces.iter().enumerate() {
                    if i > 0 {
                        items.push((-20).into());
                    }
                    items.push(Object::string_literal(*piece));
                }
                Operation::new("TJ", vec![Object::Array(items)])
            }
            BlockRun::Spaced(left, right) => Operation::new(
                "TJ",
                vec![Object::Array(vec![
                    Object::string_literal(*left),
                    (-600).into(),
                    Object::string_literal(*right),
                ])],
            ),
        };
        operations.push(shown);
        operations.push(Operation::new("Td", vec![0.into(), (-14).into()]));
    }
    operations.push(Operation::new("ET", vec![]));
    assemble_pdf(vec![operations])
}

fn assemble_pdf(contents: Vec<Vec<Operation>>) -> Vec<u8> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
        "Encoding" => "WinAnsiEncoding",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! {
            "F1" => font_id,
        },
    });

    let mut kids: Vec<Object> = Vec::with_capacity(contents.len());
    for operations in contents {
        let content = Content { operations };
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
            "Resources" => resources_id,
        });
        kids.push(page_id.into());
    }

    let count = kids.len() as i64;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
            "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut out = Vec::new();
    doc.save_to(&mut out).unwrap();
    out
}

/// One single-line page per entry.
pub fn build_simple_pdf(pages: &[&str]) -> Vec<u8> {
    let pages: Vec<[&str; 1]> = pages.iter().map(|p| [*p]).collect();
    let refs: Vec<&[&str]> = pages.iter().map(|p| p.as_slice()).collect();
    build_pdf(&refs)
}
