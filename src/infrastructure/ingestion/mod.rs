//! Ingestion infrastructure: parser implementations and the pipeline

pub mod parsers;
pub mod pipeline;
pub mod xml_tree;

pub use pipeline::{parse_document, DocumentPipeline};
