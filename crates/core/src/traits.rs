use crate::ChatError;
use async_trait::async_trait;

#[async_trait]
pub trait ChatBackend {
    async fn is_available(&self) -> bool;

    async fn list_models(&self) -> Result<Vec<String>, ChatError>;

    async fn complete(&self, model: &str, prompt: &str) -> Result<String, ChatError>;
}
