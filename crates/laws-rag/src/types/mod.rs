//! Core types for the laws RAG service

pub mod query;
pub mod response;
pub mod section;

pub use query::QueryRequest;
pub use response::{Citation, HealthStatus, QueryResult, ReadinessStatus};
pub use section::{IndexedChunk, RetrievedSection, SectionRecord};
