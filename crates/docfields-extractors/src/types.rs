//! Extraction output types.

/// What the upload turned out to be, with the facts learned while reading it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Modality {
    /// Parsed PDF document.
    Pdf { page_count: usize },
    /// Fully decoded image.
    Image {
        /// Short format name ("png" or "jpeg").
        format: &'static str,
        width: u32,
        height: u32,
    },
}

/// Result of running an upload through its extractor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedContent {
    /// Document text. Always empty for images, which are forwarded as bytes.
    pub text: String,
    pub modality: Modality,
    /// Size of the upload in bytes.
    pub source_bytes: usize,
}

impl ExtractedContent {
    /// Text read from a PDF.
    pub fn pdf(text: String, page_count: usize, source_bytes: usize) -> Self {
        Self {
            text,
            modality: Modality::Pdf { page_count },
            source_bytes,
        }
    }

    /// A validated image.
    pub fn image(format: &'static str, (width, height): (u32, u32), source_bytes: usize) -> Self {
        Self {
            text: String::new(),
            modality: Modality::Image {
                format,
                width,
                height,
            },
            source_bytes,
        }
    }

    /// Whether no meaningful text was extracted. Whitespace counts as none.
    pub fn is_empty(&self) -> bool {
        self.text.trim().is_empty()
    }

    /// Page count, for PDFs.
    pub fn page_count(&self) -> Option<usize> {
        match self.modality {
            Modality::Pdf { page_count } => Some(page_count),
            Modality::Image { .. } => None,
        }
    }
}
