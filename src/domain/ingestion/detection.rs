//! Format sniffing for uploaded documents
//!
//! Resolution order: filename extension and declared MIME type per kind
//! (PDF, then CCDA/XML, then plain text), then a content-prefix sniff,
//! then a fail-open default of plain text. The sniffer never rejects an
//! input.

use super::parser::DocumentKind;

/// How many leading bytes the content sniff inspects
const SNIFF_PREFIX_LEN: usize = 100;

/// Detect document kind from a filename extension
pub fn detect_kind_from_filename(filename: &str) -> Option<DocumentKind> {
    let ext = filename.rsplit('.').next()?.to_lowercase();

    match ext.as_str() {
        "pdf" => Some(DocumentKind::Pdf),
        "xml" | "ccd" | "ccda" => Some(DocumentKind::CcdaXml),
        "txt" => Some(DocumentKind::PlainText),
        _ => None,
    }
}

/// Detect document kind from a declared MIME type
pub fn detect_kind_from_mime(mime: &str) -> Option<DocumentKind> {
    let mime_lower = mime.to_lowercase();

    if mime_lower.starts_with("application/pdf") {
        return Some(DocumentKind::Pdf);
    }

    if mime_lower.starts_with("application/xml") || mime_lower.starts_with("text/xml") {
        return Some(DocumentKind::CcdaXml);
    }

    if mime_lower.starts_with("text/plain") {
        return Some(DocumentKind::PlainText);
    }

    None
}

/// Inspect the first bytes of the buffer for an XML signature
pub fn sniff_content_prefix(bytes: &[u8]) -> Option<DocumentKind> {
    let prefix_len = bytes.len().min(SNIFF_PREFIX_LEN);
    let prefix = String::from_utf8_lossy(&bytes[..prefix_len]);

    if prefix.contains("<?xml") || prefix.contains("<ClinicalDocument") {
        return Some(DocumentKind::CcdaXml);
    }

    None
}

/// Resolve the document kind for an upload
///
/// Extension and declared MIME type are checked in order of kind
/// precedence; a content sniff is the last resort before defaulting to
/// plain text.
pub fn resolve_kind(
    filename: Option<&str>,
    declared_mime: Option<&str>,
    bytes: &[u8],
) -> DocumentKind {
    let by_filename = filename.and_then(detect_kind_from_filename);
    let by_mime = declared_mime.and_then(detect_kind_from_mime);

    for kind in [
        DocumentKind::Pdf,
        DocumentKind::CcdaXml,
        DocumentKind::PlainText,
    ] {
        if by_filename == Some(kind) || by_mime == Some(kind) {
            return kind;
        }
    }

    sniff_content_prefix(bytes).unwrap_or(DocumentKind::PlainText)
}
