//! PDF document parser
//!
//! Pulls the embedded text layer out of a PDF buffer, then cleans up the
//! layout artifacts extraction leaves behind (blank lines from page breaks
//! and columns) and re-separates recognized clinical section headings so
//! the note reads section by section again.

use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::domain::ingestion::{DocumentKind, DocumentParser, DocumentSource, ParsedDocument};
use crate::domain::DomainError;

/// Shown to the user when the text layer is missing or unreadable
const EXTRACTION_FAILED_MESSAGE: &str =
    "Failed to extract text from PDF. The file may be scanned/image-based or corrupted.";

/// Common clinical note section headings, matched at line start.
/// Every occurrence is reformatted, not only the first.
static SECTION_HEADING_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"(?im)^(CHIEF COMPLAINT|CC)[:.]?",
        r"(?im)^(HISTORY OF PRESENT ILLNESS|HPI)[:.]?",
        r"(?im)^(PAST MEDICAL HISTORY|PMH)[:.]?",
        r"(?im)^(MEDICATIONS|CURRENT MEDICATIONS|MEDS)[:.]?",
        r"(?im)^(ALLERGIES)[:.]?",
        r"(?im)^(PHYSICAL EXAM|PHYSICAL EXAMINATION|PE)[:.]?",
        r"(?im)^(ASSESSMENT|IMPRESSION)[:.]?",
        r"(?im)^(PLAN|TREATMENT PLAN)[:.]?",
        r"(?im)^(REVIEW OF SYSTEMS|ROS)[:.]?",
        r"(?im)^(VITAL SIGNS|VITALS)[:.]?",
        r"(?im)^(SOCIAL HISTORY|SH)[:.]?",
        r"(?im)^(FAMILY HISTORY|FH)[:.]?",
    ]
    .iter()
    .map(|p| Regex::new(p).unwrap())
    .collect()
});

/// Parser for PDF documents with an embedded text layer
#[derive(Debug, Clone, Default)]
pub struct PdfParser;

impl PdfParser {
    /// Create a new PDF parser
    pub fn new() -> Self {
        Self
    }

    /// Drop empty lines and per-line leading/trailing whitespace
    fn normalize_lines(text: &str) -> String {
        text.lines()
            .map(|line| line.trim())
            .filter(|line| !line.is_empty())
            .collect::<Vec<&str>>()
            .join("\n")
    }

    /// Insert blank lines before recognized section headings and append a
    /// trailing colon to each
    fn reformat_headings(text: &str) -> String {
        let mut result = text.to_string();

        for pattern in SECTION_HEADING_PATTERNS.iter() {
            result = pattern.replace_all(&result, "\n\n${1}:").into_owned();
        }

        result
    }
}

#[async_trait]
impl DocumentParser for PdfParser {
    fn kind(&self) -> DocumentKind {
        DocumentKind::Pdf
    }

    async fn parse(&self, source: &DocumentSource) -> Result<ParsedDocument, DomainError> {
        let raw = pdf_extract::extract_text_from_mem(&source.bytes).map_err(|e| {
            tracing::debug!(error = %e, "pdf text-layer extraction failed");
            DomainError::extraction(EXTRACTION_FAILED_MESSAGE)
        })?;

        if raw.trim().is_empty() {
            return Err(DomainError::extraction(EXTRACTION_FAILED_MESSAGE));
        }

        let text = Self::normalize_lines(&raw);
        let text = Self::reformat_headings(&text);

        Ok(ParsedDocument::new(
            DocumentKind::Pdf,
            text.trim().to_string(),
        ))
    }
}
