//! Generation collaborator trait

use async_trait::async_trait;

use crate::error::Result;

/// Trait for LLM-based generation
///
/// The collaborator receives an instruction and an assembled context and
/// returns free-form text that is expected, but not guaranteed, to parse as a
/// JSON object. Callers must tolerate anything it returns.
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Generate a response that should be a single JSON object
    async fn generate_json(&self, system: &str, user: &str) -> Result<String>;

    /// Check if the provider is healthy and available
    async fn health_check(&self) -> Result<bool>;

    /// Provider name for logging
    fn name(&self) -> &str;

    /// Model identifier in use
    fn model(&self) -> &str;
}
