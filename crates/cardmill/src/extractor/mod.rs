//! Text extraction: bytes in, plain text out.
//!
//! The core does not parse rich document formats itself; it routes by MIME
//! type to whatever `TextExtractor` implementations are registered. A
//! plain-text/markdown extractor ships built in; PDF/OCR extractors are
//! external collaborators registered by the embedding application.

pub mod plain;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ExtractError {
    #[error("Unsupported document type: {0}")]
    UnsupportedMime(String),

    #[error("Failed to decode document text: {0}")]
    Decode(String),

    #[error(
        "Extracted only {chars} characters (minimum {min}); the document is \
         likely scanned or otherwise unextractable"
    )]
    InsufficientText { chars: usize, min: usize },

    #[error("Text extraction failed: {0}")]
    Failed(String),
}

/// Contract for turning uploaded bytes into plain text.
pub trait TextExtractor: Send + Sync {
    fn extract(&self, bytes: &[u8], mime_type: &str) -> Result<String, ExtractError>;
    fn supports(&self, mime_type: &str) -> bool;
}

/// Routes extraction requests to the first registered extractor that
/// supports the MIME type.
pub struct ExtractorRegistry {
    extractors: Vec<Box<dyn TextExtractor>>,
}

impl ExtractorRegistry {
    /// Registry with the built-in plain-text extractor only.
    pub fn new() -> Self {
        Self {
            extractors: vec![Box::new(plain::PlainTextExtractor::new())],
        }
    }

    /// Registers an additional extractor. Later registrations take
    /// precedence over the built-ins for MIME types both support.
    pub fn register(&mut self, extractor: Box<dyn TextExtractor>) {
        self.extractors.insert(0, extractor);
    }

    pub fn extract(&self, bytes: &[u8], mime_type: &str) -> Result<String, ExtractError> {
        for extractor in &self.extractors {
            if extractor.supports(mime_type) {
                return extractor.extract(bytes, mime_type);
            }
        }
        Err(ExtractError::UnsupportedMime(mime_type.to_string()))
    }
}

impl Default for ExtractorRegistry {
    fn default() -> Self {
        Self::new()
    }
}
