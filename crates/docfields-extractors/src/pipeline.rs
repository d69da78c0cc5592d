//! Routing of uploads to the extractor for their declared type.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use tracing::debug;

use crate::error::{ExtractError, ExtractResult};
use crate::image::ImageExtractor;
use crate::pdf::PdfExtractor;
use crate::types::ExtractedContent;
use crate::Extractor;

/// Maps declared MIME types to extractors.
///
/// Lookup uses the MIME essence (parameters after `;` dropped, ASCII
/// lowercase), so `Application/PDF; name=x.pdf` routes like
/// `application/pdf`.
pub struct ExtractionPipeline {
    routes: HashMap<&'static str, Arc<dyn Extractor>>,
}

impl ExtractionPipeline {
    /// Pipeline with no extractors registered.
    pub fn empty() -> Self {
        Self {
            routes: HashMap::new(),
        }
    }

    /// PDF, PNG and JPEG extractors.
    pub fn with_defaults() -> Self {
        Self::empty()
            .register(Arc::new(PdfExtractor::new()))
            .register(Arc::new(ImageExtractor::png()))
            .register(Arc::new(ImageExtractor::jpeg()))
    }

    /// Register an extractor, replacing any previous one for its MIME type.
    pub fn register(mut self, extractor: Arc<dyn Extractor>) -> Self {
        self.routes.insert(extractor.mime_type(), extractor);
        self
    }

    fn route(&self, mime_type: &str) -> Option<&Arc<dyn Extractor>> {
        let essence = mime_type
            .split(';')
            .next()
            .unwrap_or_default()
            .trim()
            .to_ascii_lowercase();
        self.routes.get(essence.as_str())
    }

    /// Run `content` through the extractor for `mime_type`.
    pub async fn extract(
        &self,
        content: &[u8],
        mime_type: &str,
    ) -> ExtractResult<ExtractedContent> {
        let extractor = self
            .route(mime_type)
            .ok_or_else(|| ExtractError::UnsupportedType(mime_type.to_string()))?;

        let started = Instant::now();
        let extracted = extractor.extract(content).await?;
        debug!(
            extractor = extractor.name(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            text_len = extracted.text.len(),
            "Upload extracted"
        );

        Ok(extracted)
    }

    /// Whether an extractor is registered for `mime_type`.
    pub fn supports(&self, mime_type: &str) -> bool {
        self.route(mime_type).is_some()
    }

    /// Registered MIME types, sorted.
    pub fn supported_types(&self) -> Vec<&'static str> {
        let mut types: Vec<_> = self.routes.keys().copied().collect();
        types.sort_unstable();
        types
    }
}

impl Default for ExtractionPipeline {
    fn default() -> Self {
        Self::with_defaults()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    struct Fixed(&'static str);

    #[async_trait]
    impl Extractor for Fixed {
        async fn extract(&self, content: &[u8]) -> ExtractResult<ExtractedContent> {
            Ok(ExtractedContent::pdf(self.0.to_string(), 1, content.len()))
        }

        fn mime_type(&self) -> &'static str {
            "application/pdf"
        }

        fn name(&self) -> &str {
            "fixed"
        }
    }

    #[test]
    fn test_defaults_cover_accepted_types() {
        let pipeline = ExtractionPipeline::with_defaults();
        assert_eq!(
            pipeline.supported_types(),
            vec!["application/pdf", "image/jpeg", "image/png"]
        );
        assert!(!pipeline.supports("image/gif"));
    }

    #[test]
    fn test_routing_uses_mime_essence() {
        let pipeline = ExtractionPipeline::with_defaults();
        assert!(pipeline.supports("Application/PDF; name=nota.pdf"));
        assert!(pipeline.supports(" image/PNG "));
        assert!(!pipeline.supports(""));
    }

    #[tokio::test]
    async fn test_unsupported_type_error() {
        let result = ExtractionPipeline::empty().extract(b"test", "video/mp4").await;
        assert!(matches!(result, Err(ExtractError::UnsupportedType(_))));
    }

    #[tokio::test]
    async fn test_register_replaces_existing_route() {
        let pipeline = ExtractionPipeline::with_defaults().register(Arc::new(Fixed("stub text")));
        let content = pipeline.extract(b"anything", "application/pdf").await.unwrap();
        assert_eq!(content.text, "stub text");
        assert_eq!(content.source_bytes, 8);
    }

    #[tokio::test]
    async fn test_broken_pdf_is_parse_error() {
        let pipeline = ExtractionPipeline::with_defaults();
        let result = pipeline.extract(b"%PDF-broken", "application/pdf").await;
        assert!(matches!(result, Err(ExtractError::DocumentParse(_))));
    }
}
