use lopdf::Document;

use crate::{ExtractionError, FailureKind};

pub trait TextExtractor: Send + Sync {
    /// Extracts the text of a normalized container. The result is not trimmed.
    fn extract_text(&self, bytes: &[u8]) -> Result<String, ExtractionError>;
}

/// Extracts the text of every page, in page order.
#[derive(Debug, Default, Clone, Copy)]
pub struct LopdfTextExtractor;

impl TextExtractor for LopdfTextExtractor {
    fn extract_text(&self, bytes: &[u8]) -> Result<String, ExtractionError> {
        let document = Document::load_mem(bytes)
            .map_err(|err| ExtractionError::new(FailureKind::Extract, err.to_string()))?;
        let pages: Vec<u32> = document.get_pages().keys().copied().collect();
        if pages.is_empty() {
            return Ok(String::new());
        }
        document
            .extract_text(&pages)
            .map_err(|err| ExtractionError::new(FailureKind::Extract, err.to_string()))
    }
}
