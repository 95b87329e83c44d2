use crate::error::{ProvadorError, Result};
use std::env;
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_MODEL: &str = "gemini-2.5-flash-image";
pub const DEFAULT_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_FALLBACK_MIME: &str = "image/jpeg";

#[derive(Debug, Clone)]
pub struct GeminiConfig {
    pub api_key: Option<String>,
    pub model: String,
    pub api_base: String,
}

#[derive(Debug, Clone)]
pub struct ArtifactConfig {
    pub dir: PathBuf,
    pub persist: bool,
    pub ttl: Duration,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub max_body_mb: usize,
    pub fallback_mime: String,
    pub gemini: GeminiConfig,
    pub artifacts: ArtifactConfig,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        GeminiConfig {
            api_key: None,
            model: DEFAULT_MODEL.to_string(),
            api_base: DEFAULT_API_BASE.to_string(),
        }
    }
}

impl GeminiConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_env() -> Self {
        let api_key = non_empty_env("GEMINI_API_KEY");
        let model = non_empty_env("GEMINI_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string());
        let api_base = non_empty_env("GEMINI_API_BASE")
            .map(|base| base.trim_end_matches('/').to_string())
            .unwrap_or_else(|| DEFAULT_API_BASE.to_string());

        GeminiConfig {
            api_key,
            model,
            api_base,
        }
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into().trim_end_matches('/').to_string();
        self
    }
}

impl Default for ArtifactConfig {
    fn default() -> Self {
        ArtifactConfig {
            dir: PathBuf::from("./assets/temp"),
            persist: true,
            ttl: Duration::from_secs(3600),
        }
    }
}

impl ArtifactConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_env() -> Self {
        let defaults = Self::default();
        let dir = non_empty_env("TEMP_DIR")
            .map(PathBuf::from)
            .unwrap_or(defaults.dir);
        let persist = non_empty_env("PERSIST_ARTIFACTS").map_or(defaults.persist, |val| val != "false");
        let ttl = non_empty_env("ARTIFACT_TTL_SECS")
            .and_then(|s| s.parse().ok())
            .map(Duration::from_secs)
            .unwrap_or(defaults.ttl);

        ArtifactConfig { dir, persist, ttl }
    }

    pub fn with_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.dir = dir.into();
        self
    }

    pub fn with_persist(mut self, persist: bool) -> Self {
        self.persist = persist;
        self
    }

    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            host: "0.0.0.0".to_string(),
            port: 8080,
            max_body_mb: 50,
            fallback_mime: DEFAULT_FALLBACK_MIME.to_string(),
            gemini: GeminiConfig::default(),
            artifacts: ArtifactConfig::default(),
        }
    }
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_env() -> Self {
        let defaults = Self::default();
        let host = non_empty_env("HOST").unwrap_or(defaults.host);
        let port = non_empty_env("PORT")
            .and_then(|port| port.parse().ok())
            .unwrap_or(defaults.port);
        let max_body_mb = non_empty_env("MAX_BODY_MB")
            .and_then(|mb| mb.parse().ok())
            .unwrap_or(defaults.max_body_mb);
        let fallback_mime = non_empty_env("FALLBACK_MIME")
            .map(|mime| mime.to_ascii_lowercase())
            .unwrap_or(defaults.fallback_mime);

        Config {
            host,
            port,
            max_body_mb,
            fallback_mime,
            gemini: GeminiConfig::from_env(),
            artifacts: ArtifactConfig::from_env(),
        }
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    pub fn with_fallback_mime(mut self, mime: impl Into<String>) -> Self {
        self.fallback_mime = mime.into();
        self
    }

    pub fn with_gemini(mut self, config: GeminiConfig) -> Self {
        self.gemini = config;
        self
    }

    pub fn with_artifacts(mut self, config: ArtifactConfig) -> Self {
        self.artifacts = config;
        self
    }

    pub fn max_body_bytes(&self) -> usize {
        self.max_body_mb * 1024 * 1024
    }

    /// The service refuses to start without a credential for the model API.
    pub fn validate(&self) -> Result<()> {
        match self.gemini.api_key.as_deref() {
            Some(key) if !key.trim().is_empty() => {}
            _ => {
                return Err(ProvadorError::ConfigError(
                    "GEMINI_API_KEY is not set".into(),
                ))
            }
        }

        let valid_mime = self
            .fallback_mime
            .strip_prefix("image/")
            .map_or(false, |subtype| !subtype.is_empty());
        if !valid_mime {
            return Err(ProvadorError::ConfigError(format!(
                "FALLBACK_MIME must look like image/<subtype>, got '{}'",
                self.fallback_mime
            )));
        }

        Ok(())
    }
}

fn non_empty_env(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::new();
        assert_eq!(config.port, 8080);
        assert_eq!(config.fallback_mime, "image/jpeg");
        assert_eq!(config.gemini.model, DEFAULT_MODEL);
        assert!(config.artifacts.persist);
        assert_eq!(config.max_body_bytes(), 50 * 1024 * 1024);
    }

    #[test]
    fn test_missing_api_key_is_fatal() {
        let config = Config::new();
        assert!(matches!(
            config.validate(),
            Err(ProvadorError::ConfigError(_))
        ));

        let blank = Config::new().with_gemini(GeminiConfig::new().with_api_key("   "));
        assert!(blank.validate().is_err());

        let ok = Config::new().with_gemini(GeminiConfig::new().with_api_key("secret"));
        assert!(ok.validate().is_ok());
    }

    #[test]
    fn test_fallback_mime_must_be_image() {
        let config = Config::new()
            .with_gemini(GeminiConfig::new().with_api_key("secret"))
            .with_fallback_mime("text/plain");
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_api_base_trailing_slash_is_trimmed() {
        let gemini = GeminiConfig::new().with_api_base("http://localhost:1234/");
        assert_eq!(gemini.api_base, "http://localhost:1234");
    }
}
