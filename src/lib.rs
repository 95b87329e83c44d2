pub mod config;
pub mod error;
pub mod gemini;
pub mod logger;
pub mod models;
#[cfg(feature = "server")]
pub mod server;
pub mod storage;
pub mod tryon;

pub use config::{ArtifactConfig, Config, GeminiConfig};
pub use error::{GenerationError, NormalizationError, ProvadorError, Result, TryOnError};
pub use gemini::{GeminiImageClient, ImageGenerator};
pub use models::{GeneratedArtifact, NormalizedImage, TryOnRequest, TryOnResponse};
pub use storage::TransientStore;
pub use tryon::TryOnService;
