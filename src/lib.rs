//! clinidoc
//!
//! Clinical document ingestion and normalization pipeline:
//! - Format sniffing across PDF, CCDA/CCD XML, and plain-text uploads
//! - PDF text-layer extraction with clinical section heading cleanup
//! - CCDA section-by-section plain-text rendering with a generic
//!   tree-scrape fallback for non-conformant XML

pub mod cli;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use config::AppConfig;
pub use domain::ingestion::{DocumentKind, DocumentSource, ParsedDocument, UploadLimits};
pub use domain::DomainError;
pub use infrastructure::ingestion::{parse_document, DocumentPipeline};
