use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Body of `POST /tryon`. Fields are kept loosely typed so that a number or
/// `null` in place of an image is reported as a missing image, not a parse error.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TryOnRequest {
    #[serde(rename = "fotoPessoa", default)]
    pub foto_pessoa: Option<Value>,
    #[serde(rename = "fotoRoupa", default)]
    pub foto_roupa: Option<Value>,
}

impl TryOnRequest {
    pub fn new(person: impl Into<String>, garment: impl Into<String>) -> Self {
        TryOnRequest {
            foto_pessoa: Some(Value::String(person.into())),
            foto_roupa: Some(Value::String(garment.into())),
        }
    }

    pub fn person(&self) -> Option<&str> {
        self.foto_pessoa.as_ref().and_then(Value::as_str)
    }

    pub fn garment(&self) -> Option<&str> {
        self.foto_roupa.as_ref().and_then(Value::as_str)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TryOnResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub image: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub message: Option<String>,
}

impl TryOnResponse {
    pub fn image(data_url: String) -> Self {
        TryOnResponse {
            success: true,
            image: Some(data_url),
            message: None,
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        TryOnResponse {
            success: false,
            image: None,
            message: Some(message.into()),
        }
    }
}
