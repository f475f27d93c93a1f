//! Answer generation helpers: prompt construction and citation assembly

pub mod citation;
pub mod prompt;

pub use citation::{assemble, MAX_EXCERPT_CHARS};
pub use prompt::PromptBuilder;
