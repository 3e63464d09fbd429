use crate::errors::CoreError;
use crate::models::{CompletionRequest, CompletionResponse};
use async_trait::async_trait;

/// Trait for multimodal completion backends.
///
/// One call per analysis request; implementations must not retry.
#[async_trait]
pub trait CompletionBackend: Send + Sync {
    /// Short backend name for log fields.
    fn name(&self) -> &'static str;

    /// Send the system instruction, user text and image, and return the generated text.
    async fn complete(&self, request: &CompletionRequest) -> Result<CompletionResponse, CoreError>;
}
