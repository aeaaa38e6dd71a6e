//! Completion endpoint implementations

pub mod openai;

// Re-export for convenience
pub use openai::CompletionClient;
