use anyhow::Result;
use async_trait::async_trait;

/// Single-shot text completion. Returns the model's raw text, which may be
/// empty when the provider sent no content.
#[async_trait]
pub trait LlmClient: Send + Sync {
    async fn complete(&self, prompt: &str) -> Result<String>;
}
