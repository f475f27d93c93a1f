//! laws-rag: question answering over the Laws of the Seven Kingdoms
//!
//! The source document is split into numbered sections, each section is
//! embedded into an in-memory vector index, and questions are answered by a
//! language model grounded on the closest sections, with citations back to
//! the section numbers.

pub mod config;
pub mod error;
pub mod generation;
pub mod index;
pub mod ingestion;
pub mod providers;
pub mod server;
pub mod service;
pub mod types;

pub use config::RagConfig;
pub use error::{Error, Result};
pub use index::SectionIndex;
pub use service::QueryService;
pub use types::{
    query::QueryRequest,
    response::{Citation, QueryResult},
    section::SectionRecord,
};
