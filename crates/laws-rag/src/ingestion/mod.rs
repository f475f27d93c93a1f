//! Document ingestion: text extraction and section splitting

mod parser;
mod splitter;

pub use parser::{load_document_text, DocumentFormat};
pub use splitter::split_sections;
