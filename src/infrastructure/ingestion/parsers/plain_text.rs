//! Plain text document parser

use async_trait::async_trait;

use crate::domain::ingestion::{DocumentKind, DocumentParser, DocumentSource, ParsedDocument};
use crate::domain::DomainError;

/// Parser for plain text notes
///
/// Decode is lossy: invalid UTF-8 is replaced, never rejected.
#[derive(Debug, Clone, Default)]
pub struct PlainTextParser;

impl PlainTextParser {
    /// Create a new plain text parser
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl DocumentParser for PlainTextParser {
    fn kind(&self) -> DocumentKind {
        DocumentKind::PlainText
    }

    async fn parse(&self, source: &DocumentSource) -> Result<ParsedDocument, DomainError> {
        let content = source.text_lossy().trim().to_string();

        Ok(ParsedDocument::new(DocumentKind::PlainText, content))
    }
}
