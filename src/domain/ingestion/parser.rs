//! Document parser trait and types

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt::Debug;

use crate::domain::DomainError;

/// Kind of clinical document the pipeline understands
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum DocumentKind {
    /// Plain text notes
    PlainText,
    /// PDF documents with an embedded text layer
    Pdf,
    /// CCDA/CCD clinical documents (CDA-flavored XML)
    CcdaXml,
}

impl DocumentKind {
    /// Human-readable label used in upload reports
    pub fn label(&self) -> &'static str {
        match self {
            Self::PlainText => "Text",
            Self::Pdf => "PDF",
            Self::CcdaXml => "CCDA/XML",
        }
    }

    /// Get file extensions associated with this document kind
    pub fn extensions(&self) -> &'static [&'static str] {
        match self {
            Self::PlainText => &["txt"],
            Self::Pdf => &["pdf"],
            Self::CcdaXml => &["xml", "ccd", "ccda"],
        }
    }

    /// Get MIME types associated with this document kind
    pub fn mime_types(&self) -> &'static [&'static str] {
        match self {
            Self::PlainText => &["text/plain"],
            Self::Pdf => &["application/pdf"],
            Self::CcdaXml => &["application/xml", "text/xml"],
        }
    }
}

/// An uploaded document as handed over by the upload layer
///
/// The byte buffer is owned by the request that carried it and is never
/// mutated by the pipeline.
#[derive(Debug, Clone)]
pub struct DocumentSource {
    /// Raw file bytes
    pub bytes: Vec<u8>,
    /// Original filename, if the client sent one
    pub filename: Option<String>,
    /// MIME type declared by the client
    pub declared_mime: Option<String>,
}

impl DocumentSource {
    /// Create a source from raw bytes
    pub fn from_bytes(bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            bytes: bytes.into(),
            filename: None,
            declared_mime: None,
        }
    }

    /// Set the original filename
    pub fn with_filename(mut self, filename: impl Into<String>) -> Self {
        self.filename = Some(filename.into());
        self
    }

    /// Set the declared MIME type
    pub fn with_mime(mut self, mime: impl Into<String>) -> Self {
        self.declared_mime = Some(mime.into());
        self
    }

    /// Decode the buffer as UTF-8, replacing invalid sequences
    pub fn text_lossy(&self) -> String {
        String::from_utf8_lossy(&self.bytes).into_owned()
    }
}

/// Result of parsing a document
#[derive(Debug, Clone, Serialize)]
pub struct ParsedDocument {
    /// Which parser produced the content
    pub kind: DocumentKind,
    /// Normalized plain-text content
    pub content: String,
}

impl ParsedDocument {
    /// Create a parsed document
    pub fn new(kind: DocumentKind, content: impl Into<String>) -> Self {
        Self {
            kind,
            content: content.into(),
        }
    }
}

/// Trait for document parsers
#[async_trait]
pub trait DocumentParser: Send + Sync + Debug {
    /// The document kind this parser produces
    fn kind(&self) -> DocumentKind;

    /// Get supported file extensions (e.g., ["txt"])
    fn supported_extensions(&self) -> &[&str] {
        self.kind().extensions()
    }

    /// Get supported MIME types (e.g., ["text/plain"])
    fn supported_mime_types(&self) -> &[&str] {
        self.kind().mime_types()
    }

    /// Parse a document into normalized plain text
    async fn parse(&self, source: &DocumentSource) -> Result<ParsedDocument, DomainError>;

    /// Check if this parser supports a given filename
    fn supports_file(&self, filename: &str) -> bool {
        let ext = filename
            .rsplit('.')
            .next()
            .map(|s| s.to_lowercase())
            .unwrap_or_default();

        self.supported_extensions()
            .iter()
            .any(|e| e.eq_ignore_ascii_case(&ext))
    }

    /// Check if this parser supports a given MIME type
    fn supports_mime(&self, mime: &str) -> bool {
        self.supported_mime_types()
            .iter()
            .any(|m| mime.starts_with(*m))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_kind_labels() {
        assert_eq!(DocumentKind::PlainText.label(), "Text");
        assert_eq!(DocumentKind::Pdf.label(), "PDF");
        assert_eq!(DocumentKind::CcdaXml.label(), "CCDA/XML");
    }

    #[test]
    fn test_document_kind_extensions() {
        assert_eq!(DocumentKind::PlainText.extensions(), &["txt"]);
        assert_eq!(DocumentKind::Pdf.extensions(), &["pdf"]);
        assert_eq!(DocumentKind::CcdaXml.extensions(), &["xml", "ccd", "ccda"]);
    }

    #[test]
    fn test_source_builder() {
        let source = DocumentSource::from_bytes(b"note".to_vec())
            .with_filename("note.txt")
            .with_mime("text/plain");

        assert_eq!(source.filename, Some("note.txt".to_string()));
        assert_eq!(source.declared_mime, Some("text/plain".to_string()));
        assert_eq!(source.bytes, b"note");
    }

    #[test]
    fn test_text_lossy_replaces_invalid_utf8() {
        let source = DocumentSource::from_bytes(vec![0xff, 0xfe]);
        let text = source.text_lossy();
        assert!(!text.is_empty());
    }

    #[test]
    fn test_kind_serialization() {
        let json = serde_json::to_string(&DocumentKind::CcdaXml).unwrap();
        assert_eq!(json, "\"ccda_xml\"");
    }
}
