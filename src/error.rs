use thiserror::Error;

/// Why a client-supplied image field could not be turned into a `NormalizedImage`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NormalizationError {
    #[error("image is missing or empty")]
    MissingImage,
    #[error("image payload is not valid base64: {0}")]
    InvalidBase64(String),
    #[error("image payload is malformed (nested data URL)")]
    MalformedPayload,
}

/// Failures talking to the external generation model.
#[derive(Debug, Clone, Error)]
pub enum GenerationError {
    #[error("Transport error: {0}")]
    Transport(String),
    #[error("Model API returned HTTP {status}: {message}")]
    Http { status: u16, message: String },
    #[error("Invalid model response: {0}")]
    InvalidResponse(String),
}

/// Outcome classification of a failed try-on request.
#[derive(Debug, Error)]
pub enum TryOnError {
    #[error("Both fotoPessoa and fotoRoupa are required")]
    MissingImages,
    #[error("{field}: {source}")]
    InvalidImage {
        field: &'static str,
        #[source]
        source: NormalizationError,
    },
    #[error("The model returned no image")]
    NoImageReturned,
    #[error("The model returned an unreadable image: {0}")]
    UnreadableImage(String),
    #[error(transparent)]
    Generation(#[from] GenerationError),
    #[error("Failed to store generated image: {0}")]
    Artifact(String),
}

impl TryOnError {
    pub fn status_code(&self) -> u16 {
        match self {
            TryOnError::MissingImages | TryOnError::InvalidImage { .. } => 400,
            TryOnError::NoImageReturned => 502,
            TryOnError::UnreadableImage(_)
            | TryOnError::Generation(_)
            | TryOnError::Artifact(_) => 500,
        }
    }
}

/// Startup and process-level errors.
#[derive(Debug, Error)]
pub enum ProvadorError {
    #[error("Configuration error: {0}")]
    ConfigError(String),
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Logger error: {0}")]
    LoggerError(String),
    #[error("Server error: {0}")]
    ServerError(String),
}

pub type Result<T> = std::result::Result<T, ProvadorError>;
