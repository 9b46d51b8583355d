//! PDF text extraction
//!
//! Extraction is behind a trait so the harvester can be driven with a stub in tests.
//! The default implementation uses the pure-Rust `pdf-extract` crate on a blocking
//! thread; a panic inside the parser surfaces as an ordinary error.

use crate::HarvestError;
use async_trait::async_trait;

/// Marker prefixed to home-page content extracted from a PDF target
pub const PDF_MARKER: &str = "[PDF CONTENT EXTRACTED]";

/// Builds the marker prefixed to subpage content extracted from a PDF
pub fn pdf_source_marker(url: &str) -> String {
    format!("[PDF CONTENT EXTRACTED FROM: {}]", url)
}

/// A capability that turns a PDF byte buffer into plain text
#[async_trait]
pub trait PdfTextExtractor: Send + Sync {
    async fn extract_text(&self, bytes: Vec<u8>) -> Result<String, HarvestError>;
}

/// Default extractor backed by `pdf-extract`
#[derive(Debug, Clone, Copy, Default)]
pub struct PdfExtractLib;

#[async_trait]
impl PdfTextExtractor for PdfExtractLib {
    async fn extract_text(&self, bytes: Vec<u8>) -> Result<String, HarvestError> {
        tokio::task::spawn_blocking(move || pdf_extract::extract_text_from_mem(&bytes))
            .await
            .map_err(|e| HarvestError::Pdf(format!("extraction task failed: {}", e)))?
            .map_err(|e| HarvestError::Pdf(format!("{:?}", e)))
    }
}

/// Quick magic-number check used for diagnostics
pub fn looks_like_pdf(bytes: &[u8]) -> bool {
    bytes.starts_with(b"%PDF-")
}
