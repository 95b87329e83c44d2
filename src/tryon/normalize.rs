//! Turns whatever the client sent for an image field into a clean
//! `{ mime_type, data }` pair.
//!
//! Accepted shapes: a full data URL, anything containing a `base64,` marker
//! (partial or mangled prefixes), or bare base64, each possibly wrapped in
//! whitespace or line breaks.

use crate::{error::NormalizationError, models::NormalizedImage};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use once_cell::sync::Lazy;
use regex::Regex;

static DATA_URL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?is)^data:(image/[a-z0-9.+-]+);base64,(.*)$").expect("data URL pattern is valid")
});

const BASE64_MARKER: &str = "base64,";

pub fn normalize(raw: Option<&str>, fallback_mime: &str) -> Result<NormalizedImage, NormalizationError> {
    let raw = match raw {
        Some(raw) if !raw.trim().is_empty() => raw,
        _ => return Err(NormalizationError::MissingImage),
    };

    let cleaned: String = raw.chars().filter(|c| *c != '\r' && *c != '\n').collect();
    let cleaned = cleaned.trim();

    let (mime_type, data) = if let Some(captures) = DATA_URL.captures(cleaned) {
        (captures[1].to_ascii_lowercase(), strip_whitespace(&captures[2]))
    } else if let Some(index) = cleaned.find(BASE64_MARKER) {
        (
            fallback_mime.to_string(),
            strip_whitespace(&cleaned[index + BASE64_MARKER.len()..]),
        )
    } else {
        (fallback_mime.to_string(), strip_whitespace(cleaned))
    };

    // Checked before decoding so a nested data URL is reported as such and not
    // as generic bad base64.
    if data
        .as_bytes()
        .get(..5)
        .map_or(false, |prefix| prefix.eq_ignore_ascii_case(b"data:"))
    {
        return Err(NormalizationError::MalformedPayload);
    }

    match STANDARD.decode(data.as_bytes()) {
        Ok(bytes) if !bytes.is_empty() => Ok(NormalizedImage { mime_type, data }),
        Ok(_) => Err(NormalizationError::InvalidBase64("payload decodes to zero bytes".into())),
        Err(e) => Err(NormalizationError::InvalidBase64(e.to_string())),
    }
}

fn strip_whitespace(value: &str) -> String {
    value.chars().filter(|c| !c.is_whitespace()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const PNG_1X1: &str = "iVBORw0KGgoAAAANSUhEUgAAAAEAAAABCAYAAAAfFcSJAAAADUlEQVR42mNk+M9QDwADhgGAWjR9awAAAABJRU5ErkJggg==";

    #[test]
    fn test_data_url_yields_declared_mime() {
        let raw = format!("data:image/png;base64,{}", PNG_1X1);
        let image = normalize(Some(&raw), "image/jpeg").unwrap();
        assert_eq!(image.mime_type, "image/png");
        assert_eq!(image.data, PNG_1X1);
    }

    #[test]
    fn test_data_url_mime_is_lowercased() {
        let raw = format!("DATA:Image/WebP;base64,{}", PNG_1X1);
        let image = normalize(Some(&raw), "image/jpeg").unwrap();
        assert_eq!(image.mime_type, "image/webp");
    }

    #[test]
    fn test_whitespace_inside_payload_is_removed() {
        let (head, tail) = PNG_1X1.split_at(20);
        let raw = format!("  data:image/png;base64,{}\r\n  {} \n", head, tail);
        let image = normalize(Some(&raw), "image/jpeg").unwrap();
        assert_eq!(image.data, PNG_1X1);
    }

    #[test]
    fn test_bare_base64_uses_fallback_mime() {
        let raw = format!("\n{}\n", PNG_1X1);
        let image = normalize(Some(&raw), "image/jpeg").unwrap();
        assert_eq!(image.mime_type, "image/jpeg");
        assert_eq!(image.data, PNG_1X1);

        let image = normalize(Some(PNG_1X1), "image/png").unwrap();
        assert_eq!(image.mime_type, "image/png");
    }

    #[test]
    fn test_partial_prefix_uses_marker() {
        let raw = format!("image/png;base64,{}", PNG_1X1);
        let image = normalize(Some(&raw), "image/jpeg").unwrap();
        assert_eq!(image.mime_type, "image/jpeg");
        assert_eq!(image.data, PNG_1X1);
    }

    #[test]
    fn test_non_image_data_url_falls_back() {
        let raw = format!("data:application/octet-stream;base64,{}", PNG_1X1);
        let image = normalize(Some(&raw), "image/jpeg").unwrap();
        assert_eq!(image.mime_type, "image/jpeg");
        assert_eq!(image.data, PNG_1X1);
    }

    #[test]
    fn test_missing_or_blank_input() {
        assert_eq!(normalize(None, "image/jpeg"), Err(NormalizationError::MissingImage));
        assert_eq!(normalize(Some(""), "image/jpeg"), Err(NormalizationError::MissingImage));
        assert_eq!(
            normalize(Some(" \r\n\t "), "image/jpeg"),
            Err(NormalizationError::MissingImage)
        );
    }

    #[test]
    fn test_invalid_base64() {
        let result = normalize(Some("not base64!!"), "image/jpeg");
        assert!(matches!(result, Err(NormalizationError::InvalidBase64(_))));
    }

    #[test]
    fn test_non_ascii_input_is_invalid_base64() {
        for raw in ["ééé", "daté:xyz", "🙂🙂", "data:image/png;base64,ééé"] {
            let result = normalize(Some(raw), "image/jpeg");
            assert!(
                matches!(result, Err(NormalizationError::InvalidBase64(_))),
                "{:?} gave {:?}",
                raw,
                result
            );
        }
    }

    #[test]
    fn test_empty_payload_after_prefix() {
        let result = normalize(Some("data:image/png;base64,"), "image/jpeg");
        assert!(matches!(result, Err(NormalizationError::InvalidBase64(_))));
    }

    #[test]
    fn test_nested_data_url_is_malformed() {
        let raw = format!("data:image/png;base64,data:image/png;base64,{}", PNG_1X1);
        assert_eq!(
            normalize(Some(&raw), "image/jpeg"),
            Err(NormalizationError::MalformedPayload)
        );
    }

    #[test]
    fn test_normalizing_twice_is_stable() {
        let raw = format!("data:image/png;base64,{}\n", PNG_1X1);
        let first = normalize(Some(&raw), "image/jpeg").unwrap();
        let second = normalize(Some(&first.data), "image/jpeg").unwrap();
        assert_eq!(first.data, second.data);
    }
}
