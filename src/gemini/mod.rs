pub mod extract;
pub mod image_client;

use crate::{
    error::GenerationError,
    models::{GenerationRequest, GenerationResponse},
};
use async_trait::async_trait;

pub use extract::{extract_image, Extraction};
pub use image_client::GeminiImageClient;

/// The external multimodal model, as seen by the try-on service.
///
/// Constructed once at startup and shared by every request; tests substitute
/// their own implementation. `request_id` is the caller's correlation id and
/// prefixes every log line about the call.
#[async_trait]
pub trait ImageGenerator: Send + Sync {
    async fn generate(
        &self,
        request_id: &str,
        request: &GenerationRequest,
    ) -> Result<GenerationResponse, GenerationError>;

    fn model(&self) -> &str;
}
