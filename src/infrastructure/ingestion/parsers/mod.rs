//! Document parser implementations

mod ccda;
mod pdf;
mod plain_text;

pub use ccda::{CcdaParser, Section, ShapeMismatch};
pub use pdf::PdfParser;
pub use plain_text::PlainTextParser;
