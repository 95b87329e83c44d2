use crate::storage::ArtifactGuard;
use serde::Serialize;
use std::path::{Path, PathBuf};

/// A validated image ready to be forwarded to the model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedImage {
    pub mime_type: String,
    pub data: String, // Base64, no whitespace, no data-URL prefix
}

/// The image the model produced for a try-on request.
///
/// When persisted, the file on disk lives only as long as this value unless
/// [`GeneratedArtifact::retain`] is called once the response is ready.
#[derive(Debug)]
pub struct GeneratedArtifact {
    pub mime_type: String,
    pub data: String, // Base64 exactly as returned by the model
    pub bytes: Vec<u8>,
    pub filename: String,
    pub stored: Option<ArtifactGuard>,
}

impl GeneratedArtifact {
    pub fn data_url(&self) -> String {
        format!("data:{};base64,{}", self.mime_type, self.data)
    }

    pub fn path(&self) -> Option<&Path> {
        self.stored.as_ref().and_then(ArtifactGuard::path)
    }

    pub fn retain(mut self) -> Option<PathBuf> {
        self.stored.take().map(ArtifactGuard::keep)
    }
}

pub fn extension_for_mime(mime_type: &str) -> &'static str {
    match mime_type {
        "image/jpeg" | "image/jpg" => "jpg",
        "image/webp" => "webp",
        "image/gif" => "gif",
        _ => "png",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_data_url() {
        let artifact = GeneratedArtifact {
            mime_type: "image/png".into(),
            data: "iVBORw0K".into(),
            bytes: vec![],
            filename: "provador_1.png".into(),
            stored: None,
        };
        assert_eq!(artifact.data_url(), "data:image/png;base64,iVBORw0K");
    }

    #[test]
    fn test_extension_for_mime() {
        assert_eq!(extension_for_mime("image/jpeg"), "jpg");
        assert_eq!(extension_for_mime("image/webp"), "webp");
        assert_eq!(extension_for_mime("image/png"), "png");
        assert_eq!(extension_for_mime("image/x-unknown"), "png");
    }
}
