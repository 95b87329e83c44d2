//! Locates the generated image in a `generateContent` response.

use crate::models::GenerationResponse;
use base64::{engine::general_purpose::STANDARD, Engine as _};

pub const DEFAULT_OUTPUT_MIME: &str = "image/png";

#[derive(Debug, Clone, PartialEq)]
pub enum Extraction {
    ImageFound {
        mime_type: String,
        data: String,
        bytes: Vec<u8>,
    },
    /// The model answered without an image. The text, if any, is for operators only.
    TextOnly {
        text: Option<String>,
        reason: Option<String>,
    },
    /// An image part was present but its payload could not be decoded.
    Malformed(String),
}

/// Scans the first candidate's parts in order and returns the first inline
/// image; without one, captures the first text part as a diagnostic.
pub fn extract_image(response: &GenerationResponse) -> Extraction {
    let candidate = match response.candidates.first() {
        Some(candidate) => candidate,
        None => {
            return Extraction::TextOnly {
                text: None,
                reason: response
                    .prompt_feedback
                    .as_ref()
                    .and_then(|feedback| feedback.block_reason.clone()),
            }
        }
    };

    let parts = candidate
        .content
        .as_ref()
        .map(|content| content.parts.as_slice())
        .unwrap_or_default();

    let image = parts
        .iter()
        .filter_map(|part| part.inline_data.as_ref())
        .find(|inline| !inline.data.is_empty());

    if let Some(inline) = image {
        let mime_type = inline
            .mime_type
            .as_deref()
            .map(str::to_ascii_lowercase)
            .filter(|mime| mime.starts_with("image/"))
            .unwrap_or_else(|| DEFAULT_OUTPUT_MIME.to_string());

        return match STANDARD.decode(inline.data.as_bytes()) {
            Ok(bytes) if !bytes.is_empty() => Extraction::ImageFound {
                mime_type,
                data: inline.data.clone(),
                bytes,
            },
            Ok(_) => Extraction::Malformed("image part decodes to zero bytes".into()),
            Err(e) => Extraction::Malformed(e.to_string()),
        };
    }

    Extraction::TextOnly {
        text: parts.iter().find_map(|part| part.text.clone()),
        reason: candidate.finish_reason.clone(),
    }
}
