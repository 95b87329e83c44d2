pub mod normalize;
pub mod prompt;

use crate::{
    error::TryOnError,
    gemini::{extract_image, Extraction, ImageGenerator},
    logger,
    models::GeneratedArtifact,
    storage::TransientStore,
};
use std::sync::Arc;
use uuid::Uuid;

pub use normalize::normalize;
pub use prompt::{build_request, TRY_ON_INSTRUCTION};

pub const PERSON_FIELD: &str = "fotoPessoa";
pub const GARMENT_FIELD: &str = "fotoRoupa";

/// Runs one try-on: validate, normalize, ask the model, pick out the image.
///
/// Holds no per-request state; a single instance serves all requests.
#[derive(Clone)]
pub struct TryOnService {
    generator: Arc<dyn ImageGenerator>,
    store: Option<TransientStore>,
    fallback_mime: String,
}

impl TryOnService {
    pub fn new(generator: Arc<dyn ImageGenerator>, fallback_mime: impl Into<String>) -> Self {
        Self {
            generator,
            store: None,
            fallback_mime: fallback_mime.into(),
        }
    }

    pub fn with_store(mut self, store: TransientStore) -> Self {
        self.store = Some(store);
        self
    }

    pub fn store(&self) -> Option<&TransientStore> {
        self.store.as_ref()
    }

    pub async fn handle_try_on(
        &self,
        person_raw: Option<&str>,
        garment_raw: Option<&str>,
    ) -> Result<GeneratedArtifact, TryOnError> {
        let request_id = Uuid::new_v4().simple().to_string();
        let request_id = &request_id[..8];

        let (person_raw, garment_raw) = match (person_raw, garment_raw) {
            (Some(person), Some(garment)) if !person.is_empty() && !garment.is_empty() => {
                (person, garment)
            }
            _ => {
                log::warn!("[{}] Rejected try-on: missing image field", request_id);
                return Err(TryOnError::MissingImages);
            }
        };

        let person = normalize(Some(person_raw), &self.fallback_mime).map_err(|source| {
            log::warn!("[{}] {} rejected: {}", request_id, PERSON_FIELD, source);
            TryOnError::InvalidImage {
                field: PERSON_FIELD,
                source,
            }
        })?;
        let garment = normalize(Some(garment_raw), &self.fallback_mime).map_err(|source| {
            log::warn!("[{}] {} rejected: {}", request_id, GARMENT_FIELD, source);
            TryOnError::InvalidImage {
                field: GARMENT_FIELD,
                source,
            }
        })?;

        log::info!(
            "[{}] Images normalized: person {} ({} chars), garment {} ({} chars)",
            request_id,
            person.mime_type,
            person.data.len(),
            garment.mime_type,
            garment.data.len()
        );

        let request = build_request(&person, &garment);

        let response = {
            let _timer = logger::timer(&format!(
                "[{}] {} generateContent",
                request_id,
                self.generator.model()
            ));
            self.generator.generate(request_id, &request).await
        }
        .map_err(|e| {
            log::error!("[{}] Model call failed: {}", request_id, e);
            TryOnError::Generation(e)
        })?;

        let (mime_type, data, bytes) = match extract_image(&response) {
            Extraction::ImageFound {
                mime_type,
                data,
                bytes,
            } => (mime_type, data, bytes),
            Extraction::TextOnly { text, reason } => {
                log::warn!(
                    "[{}] Model returned no image (reason: {}); text: {}",
                    request_id,
                    reason.as_deref().unwrap_or("none"),
                    text.as_deref().unwrap_or("<none>")
                );
                return Err(TryOnError::NoImageReturned);
            }
            Extraction::Malformed(detail) => {
                log::error!("[{}] Model image could not be decoded: {}", request_id, detail);
                return Err(TryOnError::UnreadableImage(detail));
            }
        };

        let filename = TransientStore::filename_for(&mime_type);
        let stored = match &self.store {
            Some(store) => Some(store.write(&filename, &bytes).await.map_err(|e| {
                log::error!("[{}] Could not write {}: {}", request_id, filename, e);
                TryOnError::Artifact(e.to_string())
            })?),
            None => None,
        };
        let artifact = GeneratedArtifact {
            mime_type,
            data,
            bytes,
            filename,
            stored,
        };

        log::info!(
            "[{}] ✅ Generated {} ({} bytes)",
            request_id,
            artifact.filename,
            artifact.bytes.len()
        );
        Ok(artifact)
    }
}
