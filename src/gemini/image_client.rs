use crate::{
    config::GeminiConfig,
    error::{GenerationError, ProvadorError, Result},
    gemini::ImageGenerator,
    models::{ApiErrorEnvelope, GenerationRequest, GenerationResponse},
};
use async_trait::async_trait;
use reqwest::Client;

#[derive(Clone)]
pub struct GeminiImageClient {
    client: Client,
    api_key: String,
    model: String,
    api_base: String,
}

impl GeminiImageClient {
    pub fn new(config: GeminiConfig) -> Result<Self> {
        let api_key = config
            .api_key
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| ProvadorError::ConfigError("Gemini API key is required".into()))?;

        Ok(Self {
            client: Client::new(),
            api_key,
            model: config.model,
            api_base: config.api_base,
        })
    }

    pub fn endpoint(&self) -> String {
        let model = self.model.trim();
        let model_path = if model.starts_with("models/") {
            model.to_string()
        } else {
            format!("models/{}", model)
        };
        format!("{}/{}:generateContent", self.api_base, model_path)
    }
}

#[async_trait]
impl ImageGenerator for GeminiImageClient {
    async fn generate(
        &self,
        request_id: &str,
        request: &GenerationRequest,
    ) -> std::result::Result<GenerationResponse, GenerationError> {
        log::info!("[{}] Generating image with model: {}", request_id, self.model);

        let response = self
            .client
            .post(self.endpoint())
            .header("x-goog-api-key", &self.api_key)
            .json(request)
            .send()
            .await
            .map_err(|e| {
                log::error!("[{}] Gemini transport error: {:?}", request_id, e);
                GenerationError::Transport(e.to_string())
            })?;

        let status = response.status();
        let body = response.text().await.map_err(|e| {
            log::error!("[{}] Gemini response body could not be read: {}", request_id, e);
            GenerationError::Transport(e.to_string())
        })?;

        if !status.is_success() {
            let message = serde_json::from_str::<ApiErrorEnvelope>(&body)
                .map(|envelope| match envelope.error.status {
                    Some(code) if !envelope.error.message.is_empty() => {
                        format!("{} - {}", code, envelope.error.message)
                    }
                    _ => envelope.error.message,
                })
                .unwrap_or_else(|_| body.chars().take(200).collect());
            log::error!("[{}] Gemini API error {}: {}", request_id, status.as_u16(), message);
            return Err(GenerationError::Http {
                status: status.as_u16(),
                message,
            });
        }

        serde_json::from_str(&body).map_err(|e| {
            log::error!("[{}] Gemini response is not valid JSON: {}", request_id, e);
            GenerationError::InvalidResponse(e.to_string())
        })
    }

    fn model(&self) -> &str {
        &self.model
    }
}
