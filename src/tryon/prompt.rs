use crate::models::{Content, GenerationConfig, GenerationRequest, NormalizedImage, Part};

/// Fixed instruction sent with every try-on. Callers cannot add to it.
pub const TRY_ON_INSTRUCTION: &str = "Realistic full-body photograph. \
Dress the person from the first image in the garment from the second image. \
Keep the person's face, body shape, pose, skin tone, lighting and background exactly as they are. \
Reproduce the garment faithfully, preserving its exact color, texture, pattern, shape and details. \
Return only the final edited image.";

/// Builds the single-turn request: instruction, person image, garment image.
pub fn build_request(person: &NormalizedImage, garment: &NormalizedImage) -> GenerationRequest {
    GenerationRequest {
        contents: vec![Content {
            role: Some("user".to_string()),
            parts: vec![
                Part::text(TRY_ON_INSTRUCTION),
                Part::inline_image(person.mime_type.clone(), person.data.clone()),
                Part::inline_image(garment.mime_type.clone(), garment.data.clone()),
            ],
        }],
        generation_config: Some(GenerationConfig {
            response_modalities: vec!["TEXT".to_string(), "IMAGE".to_string()],
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parts_are_ordered_instruction_person_garment() {
        let person = NormalizedImage {
            mime_type: "image/png".into(),
            data: "UEVSU09O".into(),
        };
        let garment = NormalizedImage {
            mime_type: "image/jpeg".into(),
            data: "R0FSTUVOVA==".into(),
        };

        let request = build_request(&person, &garment);
        let parts = request.parts();

        assert_eq!(parts.len(), 3);
        assert_eq!(parts[0].text.as_deref(), Some(TRY_ON_INSTRUCTION));
        let person_part = parts[1].inline_data.as_ref().unwrap();
        assert_eq!(person_part.mime_type.as_deref(), Some("image/png"));
        assert_eq!(person_part.data, "UEVSU09O");
        let garment_part = parts[2].inline_data.as_ref().unwrap();
        assert_eq!(garment_part.mime_type.as_deref(), Some("image/jpeg"));
        assert_eq!(garment_part.data, "R0FSTUVOVA==");
    }
}
