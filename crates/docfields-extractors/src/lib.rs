//! docfields-extractors - Reading uploaded documents before they reach the model.
//!
//! PDFs are parsed to text with lopdf. PNG and JPEG uploads carry no text;
//! they are fully decoded to prove the bytes match the declared type, then
//! forwarded unchanged. [`ExtractionPipeline`] picks the extractor from the
//! declared MIME type.
//!
//! # Example
//!
//! ```ignore
//! use docfields_extractors::ExtractionPipeline;
//!
//! let pipeline = ExtractionPipeline::with_defaults();
//! let content = pipeline.extract(&pdf_bytes, "application/pdf").await?;
//! println!("{} page(s)", content.page_count().unwrap_or(0));
//! ```

mod error;
mod pipeline;
mod types;

pub mod image;
pub mod pdf;

pub use crate::image::ImageExtractor;
pub use crate::pdf::PdfExtractor;
pub use error::{ExtractError, ExtractResult};
pub use pipeline::ExtractionPipeline;
pub use types::{ExtractedContent, Modality};

use async_trait::async_trait;

/// Reads or validates uploads of one declared MIME type.
#[async_trait]
pub trait Extractor: Send + Sync {
    /// Parse or validate the upload bytes.
    async fn extract(&self, content: &[u8]) -> ExtractResult<ExtractedContent>;

    /// The MIME type this extractor is registered under.
    fn mime_type(&self) -> &'static str;

    /// Short name for logs.
    fn name(&self) -> &str;
}
