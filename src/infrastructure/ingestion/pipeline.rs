//! Document ingestion pipeline
//!
//! The single entry point the rest of the system depends on: sniff the
//! format of an uploaded document and dispatch to the matching parser.
//! Each call is a pure function of its input buffer; concurrent calls
//! share nothing.

use crate::domain::ingestion::{
    resolve_kind, DocumentKind, DocumentParser, DocumentSource, ParsedDocument,
};
use crate::domain::DomainError;

use super::parsers::{CcdaParser, PdfParser, PlainTextParser};

/// Pipeline dispatching uploads to format-specific parsers
#[derive(Debug, Default)]
pub struct DocumentPipeline {
    plain_text: PlainTextParser,
    pdf: PdfParser,
    ccda: CcdaParser,
}

impl DocumentPipeline {
    /// Create a new pipeline
    pub fn new() -> Self {
        Self::default()
    }

    /// Sniff the document kind and parse it into normalized text
    ///
    /// Only the PDF path can fail; every other input degrades to a
    /// best-effort text rendering.
    pub async fn parse(&self, source: &DocumentSource) -> Result<ParsedDocument, DomainError> {
        let kind = resolve_kind(
            source.filename.as_deref(),
            source.declared_mime.as_deref(),
            &source.bytes,
        );

        tracing::debug!(
            kind = kind.label(),
            filename = source.filename.as_deref().unwrap_or("<unnamed>"),
            size = source.bytes.len(),
            "dispatching document"
        );

        let parser: &dyn DocumentParser = match kind {
            DocumentKind::PlainText => &self.plain_text,
            DocumentKind::Pdf => &self.pdf,
            DocumentKind::CcdaXml => &self.ccda,
        };

        let parsed = parser.parse(source).await?;

        tracing::info!(
            kind = parsed.kind.label(),
            content_length = parsed.content.len(),
            "document parsed"
        );

        Ok(parsed)
    }
}

/// Parse a single uploaded document
///
/// Convenience entry point over [`DocumentPipeline`] for callers that
/// hold the raw upload fields rather than a [`DocumentSource`].
pub async fn parse_document(
    bytes: impl Into<Vec<u8>>,
    filename: &str,
    declared_mime: &str,
) -> Result<ParsedDocument, DomainError> {
    let source = DocumentSource::from_bytes(bytes)
        .with_filename(filename)
        .with_mime(declared_mime);

    DocumentPipeline::new().parse(&source).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_plain_text_dispatch() {
        let result = parse_document(b"  note body  ".to_vec(), "note.txt", "text/plain")
            .await
            .unwrap();

        assert_eq!(result.kind, DocumentKind::PlainText);
        assert_eq!(result.kind.label(), "Text");
        assert_eq!(result.content, "note body");
    }

    #[tokio::test]
    async fn test_ccda_dispatch_by_extension() {
        let xml = b"<ClinicalDocument><component><structuredBody><component><section><title>Plan</title><text>Rest.</text></section></component></structuredBody></component></ClinicalDocument>".to_vec();

        let result = parse_document(xml, "summary.ccda", "application/octet-stream")
            .await
            .unwrap();

        assert_eq!(result.kind, DocumentKind::CcdaXml);
        assert_eq!(result.kind.label(), "CCDA/XML");
        assert!(result.content.contains("PLAN:\nRest."));
    }

    #[tokio::test]
    async fn test_ccda_dispatch_by_content_sniff() {
        let xml = b"<?xml version=\"1.0\"?><notes><n>sniffed</n></notes>".to_vec();

        let result = parse_document(xml, "export.bin", "application/octet-stream")
            .await
            .unwrap();

        assert_eq!(result.kind, DocumentKind::CcdaXml);
        assert!(result.content.contains("sniffed"));
    }

    #[tokio::test]
    async fn test_pdf_dispatch_surfaces_extraction_error() {
        let result = parse_document(b"not a pdf".to_vec(), "scan.pdf", "application/pdf").await;

        assert!(matches!(result, Err(DomainError::Extraction { .. })));
    }

    #[tokio::test]
    async fn test_unknown_kind_defaults_to_text() {
        let result = parse_document(b"free form".to_vec(), "note", "application/octet-stream")
            .await
            .unwrap();

        assert_eq!(result.kind, DocumentKind::PlainText);
        assert_eq!(result.content, "free form");
    }

    #[tokio::test]
    async fn test_parse_is_deterministic() {
        let xml = b"<ClinicalDocument><component><structuredBody><component><section><title>Meds</title><text><list><item>Aspirin</item></list></text></section></component></structuredBody></component></ClinicalDocument>".to_vec();

        let first = parse_document(xml.clone(), "doc.xml", "text/xml")
            .await
            .unwrap();
        let second = parse_document(xml, "doc.xml", "text/xml").await.unwrap();

        assert_eq!(first.content, second.content);
    }

    #[tokio::test]
    async fn test_input_buffer_not_mutated() {
        let bytes = b"  padded note  ".to_vec();
        let source = DocumentSource::from_bytes(bytes.clone())
            .with_filename("note.txt")
            .with_mime("text/plain");

        let pipeline = DocumentPipeline::new();
        pipeline.parse(&source).await.unwrap();

        assert_eq!(source.bytes, bytes);
    }

    #[tokio::test]
    async fn test_empty_input_yields_empty_content() {
        let result = parse_document(Vec::new(), "empty.txt", "text/plain")
            .await
            .unwrap();

        assert_eq!(result.content, "");
    }
}
