//! Built-in extractor for plain-text and markdown uploads.

use super::{ExtractError, TextExtractor};

const SUPPORTED: &[&str] = &["text/plain", "text/markdown", "text/x-markdown"];

pub struct PlainTextExtractor;

impl PlainTextExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl Default for PlainTextExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl TextExtractor for PlainTextExtractor {
    fn extract(&self, bytes: &[u8], _mime_type: &str) -> Result<String, ExtractError> {
        String::from_utf8(bytes.to_vec()).map_err(|e| ExtractError::Decode(e.to_string()))
    }

    fn supports(&self, mime_type: &str) -> bool {
        // Ignore charset parameters ("text/plain; charset=utf-8").
        let essence = mime_type.split(';').next().unwrap_or(mime_type).trim();
        SUPPORTED.contains(&essence)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extracts_utf8() {
        let extractor = PlainTextExtractor::new();
        let text = extractor.extract("héllo wörld".as_bytes(), "text/plain").unwrap();
        assert_eq!(text, "héllo wörld");
    }

    #[test]
    fn test_rejects_invalid_utf8() {
        let extractor = PlainTextExtractor::new();
        let result = extractor.extract(&[0xff, 0xfe, 0x00], "text/plain");
        assert!(matches!(result, Err(ExtractError::Decode(_))));
    }

    #[test]
    fn test_supports_with_charset_parameter() {
        let extractor = PlainTextExtractor::new();
        assert!(extractor.supports("text/plain; charset=utf-8"));
        assert!(extractor.supports("text/markdown"));
        assert!(!extractor.supports("application/pdf"));
    }
}
