use std::path::Path;

use lopdf::Document;

use crate::{ExtractionError, FailureKind};

/// Decodes an attachment into a structured document.
pub trait ContainerCodec: Send + Sync {
    fn open(&self, path: &Path) -> Result<Box<dyn OpenContainer>, ExtractionError>;
}

/// A decoded document that can be re-serialized into canonical bytes.
pub trait OpenContainer: Send {
    fn normalize(self: Box<Self>) -> Result<Vec<u8>, ExtractionError>;
}

/// PDF codec backed by `lopdf`.
///
/// Loading tolerates mild structural damage (lopdf rebuilds broken xref tables),
/// and saving writes a fresh file with a consistent cross-reference table,
/// which the text extractor then parses.
#[derive(Debug, Default, Clone, Copy)]
pub struct LopdfCodec;

impl ContainerCodec for LopdfCodec {
    fn open(&self, path: &Path) -> Result<Box<dyn OpenContainer>, ExtractionError> {
        let document = Document::load(path)
            .map_err(|err| ExtractionError::new(FailureKind::Open, err.to_string()))?;
        Ok(Box::new(LopdfContainer { document }))
    }
}

struct LopdfContainer {
    document: Document,
}

impl OpenContainer for LopdfContainer {
    fn normalize(mut self: Box<Self>) -> Result<Vec<u8>, ExtractionError> {
        let mut bytes = Vec::new();
        self.document
            .save_to(&mut bytes)
            .map_err(|err| ExtractionError::new(FailureKind::Normalize, err.to_string()))?;
        Ok(bytes)
    }
}
