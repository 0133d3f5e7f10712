//! Upload validation for ingestion
//!
//! The upload layer enforces these limits before the pipeline runs; the
//! pipeline itself trusts its input. Messages are written for end users.

use crate::domain::DomainError;

/// File extensions accepted by the upload contract
pub const ALLOWED_EXTENSIONS: &[&str] = &["pdf", "xml", "ccd", "ccda", "txt"];

/// MIME types accepted by the upload contract
pub const ALLOWED_MIME_TYPES: &[&str] = &[
    "application/pdf",
    "application/xml",
    "text/xml",
    "text/plain",
    "application/octet-stream",
];

const DEFAULT_MAX_FILE_SIZE: usize = 10 * 1024 * 1024;

/// Size limits applied to uploaded documents
#[derive(Debug, Clone, Copy)]
pub struct UploadLimits {
    /// Maximum accepted file size in bytes
    pub max_file_size: usize,
}

impl Default for UploadLimits {
    fn default() -> Self {
        Self {
            max_file_size: DEFAULT_MAX_FILE_SIZE,
        }
    }
}

impl UploadLimits {
    pub fn new(max_file_size: usize) -> Self {
        Self { max_file_size }
    }
}

/// Check whether a filename carries an allowed extension
pub fn is_allowed_extension(filename: &str) -> bool {
    let ext = match filename.rsplit('.').next() {
        Some(e) if e.len() < filename.len() => e.to_lowercase(),
        _ => return false,
    };

    ALLOWED_EXTENSIONS.iter().any(|a| *a == ext)
}

/// Check whether a declared MIME type is on the allow-list
pub fn is_allowed_mime(mime: &str) -> bool {
    let mime_lower = mime.to_lowercase();

    ALLOWED_MIME_TYPES
        .iter()
        .any(|a| mime_lower.starts_with(a))
}

/// Validate an upload against the contract
///
/// A file passes the type check if either its extension or its declared
/// MIME type is allowed.
pub fn validate_upload(
    filename: &str,
    declared_mime: &str,
    size: usize,
    limits: &UploadLimits,
) -> Result<(), DomainError> {
    if !is_allowed_mime(declared_mime) && !is_allowed_extension(filename) {
        return Err(DomainError::validation(
            "Invalid file type. Allowed: PDF, XML, CCD, CCDA, TXT",
        ));
    }

    if size > limits.max_file_size {
        return Err(DomainError::validation(
            "File too large. Maximum size is 10MB.",
        ));
    }

    Ok(())
}
