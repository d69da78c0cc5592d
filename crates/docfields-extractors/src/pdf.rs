//! PDF text extraction using lopdf.
//!
//! Text is read page by page in page order and concatenated. A document
//! with zero pages yields an empty string, which is a valid outcome and
//! distinct from a document that cannot be parsed at all.

use async_trait::async_trait;
use lopdf::Document;
use tracing::{debug, warn};

use crate::error::{ExtractError, ExtractResult};
use crate::types::ExtractedContent;
use crate::Extractor;

/// PDF content extractor.
///
/// Parsing is CPU-bound, so the async [`Extractor`] implementation runs it
/// under `spawn_blocking` to avoid stalling the async runtime.
#[derive(Debug, Clone, Default)]
pub struct PdfExtractor;

impl PdfExtractor {
    /// Create new PDF extractor.
    pub fn new() -> Self {
        Self
    }

    /// Extract the text of every page, in page order.
    ///
    /// A page whose text cannot be decoded contributes an empty string.
    pub fn extract_pages(content: &[u8]) -> ExtractResult<Vec<String>> {
        let document =
            Document::load_mem(content).map_err(|e| ExtractError::DocumentParse(e.to_string()))?;

        // BTreeMap keyed by page number, so iteration is in page order
        let pages = document.get_pages();
        let mut texts = Vec::with_capacity(pages.len());

        for page_number in pages.keys() {
            match document.extract_text(&[*page_number]) {
                Ok(text) => texts.push(text),
                Err(e) => {
                    warn!(page = page_number, "Failed to extract PDF page text: {}", e);
                    texts.push(String::new());
                }
            }
        }

        Ok(texts)
    }

    /// Extract the concatenated, trimmed text of the whole document.
    ///
    /// Returns the text together with the page count.
    pub fn extract_text(content: &[u8]) -> ExtractResult<(String, usize)> {
        let pages = Self::extract_pages(content)?;
        let page_count = pages.len();
        let text = pages.concat().trim().to_string();
        Ok((text, page_count))
    }
}

#[async_trait]
impl Extractor for PdfExtractor {
    async fn extract(&self, content: &[u8]) -> ExtractResult<ExtractedContent> {
        let content_len = content.len();
        let content = content.to_vec();

        let (text, page_count) =
            tokio::task::spawn_blocking(move || Self::extract_text(&content)).await??;

        debug!(page_count, text_len = text.len(), "Extracted PDF text");

        Ok(ExtractedContent::pdf(text, page_count, content_len))
    }

    fn mime_type(&self) -> &'static str {
        "application/pdf"
    }

    fn name(&self) -> &str {
        "lopdf"
    }
}
