//! Document ingestion domain types and traits
//!
//! This module provides:
//! - `DocumentParser` trait and the source/result types it operates on
//! - Format sniffing (extension, MIME type, content prefix)
//! - Upload validation against the ingestion contract

pub mod detection;
pub mod parser;
pub mod validation;

// Re-export main types
pub use detection::{
    detect_kind_from_filename, detect_kind_from_mime, resolve_kind, sniff_content_prefix,
};
pub use parser::{DocumentKind, DocumentParser, DocumentSource, ParsedDocument};
pub use validation::{validate_upload, UploadLimits, ALLOWED_EXTENSIONS, ALLOWED_MIME_TYPES};
