//! Image validation for uploads that are forwarded to the model as bytes.
//!
//! Images carry no text of their own here; the extractor only proves the
//! bytes fully decode as the declared format before they leave the process.

use async_trait::async_trait;
use image::ImageFormat;

use crate::error::{ExtractError, ExtractResult};
use crate::types::ExtractedContent;
use crate::Extractor;

/// Image extractor bound to a single declared format.
#[derive(Debug, Clone)]
pub struct ImageExtractor {
    format: ImageFormat,
}

impl ImageExtractor {
    /// Create an extractor that accepts PNG images.
    pub fn png() -> Self {
        Self {
            format: ImageFormat::Png,
        }
    }

    /// Create an extractor that accepts JPEG images.
    pub fn jpeg() -> Self {
        Self {
            format: ImageFormat::Jpeg,
        }
    }

    /// Short format name ("png" or "jpeg").
    pub fn format_name(&self) -> &'static str {
        match self.format {
            ImageFormat::Png => "png",
            _ => "jpeg",
        }
    }

    /// Detect image format from magic bytes.
    fn detect_format(content: &[u8]) -> Option<&'static str> {
        match image::guess_format(content).ok()? {
            ImageFormat::Png => Some("png"),
            ImageFormat::Jpeg => Some("jpeg"),
            ImageFormat::Gif => Some("gif"),
            ImageFormat::WebP => Some("webp"),
            ImageFormat::Bmp => Some("bmp"),
            ImageFormat::Tiff => Some("tiff"),
            _ => Some("unknown"),
        }
    }

    /// Fully decode `content` as this extractor's format.
    ///
    /// Returns the image dimensions on success.
    pub fn validate(&self, content: &[u8]) -> ExtractResult<(u32, u32)> {
        if let Some(detected) = Self::detect_format(content) {
            if detected != self.format_name() {
                return Err(ExtractError::Image(format!(
                    "Declared {} but content looks like {}",
                    self.format_name(),
                    detected
                )));
            }
        }

        let decoded = image::load_from_memory_with_format(content, self.format)
            .map_err(|e| ExtractError::Image(e.to_string()))?;

        Ok((decoded.width(), decoded.height()))
    }
}

#[async_trait]
impl Extractor for ImageExtractor {
    async fn extract(&self, content: &[u8]) -> ExtractResult<ExtractedContent> {
        let content_len = content.len();
        let bytes = content.to_vec();
        let validator = self.clone();

        let dimensions =
            tokio::task::spawn_blocking(move || validator.validate(&bytes)).await??;

        Ok(ExtractedContent::image(
            self.format_name(),
            dimensions,
            content_len,
        ))
    }

    fn mime_type(&self) -> &'static str {
        match self.format {
            ImageFormat::Png => "image/png",
            _ => "image/jpeg",
        }
    }

    fn name(&self) -> &str {
        "image"
    }
}
