pub mod hooks;
pub mod llm;

use async_trait::async_trait;

use crate::error::ClientError;
use hooks::PromptTemplate;

/// Text generation behind the hook writer and the AI chat.
#[async_trait]
pub trait ContentGenerator: Send + Sync {
    async fn generate(&self, topic: &str, style: &PromptTemplate) -> Result<String, ClientError>;

    async fn answer(&self, question: &str) -> Result<String, ClientError>;
}
