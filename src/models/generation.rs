use crate::error::{Result, SketchGenError};
use serde::{Deserialize, Serialize};

/// Where the source image comes from. Remote references are fetched and
/// inlined before the model is invoked; Bedrock only accepts inline bytes.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ImageSource {
    #[serde(rename_all = "camelCase")]
    Inline { data: String, media_type: String },
    Remote { uri: String },
    DataUri { uri: String },
}

impl ImageSource {
    pub fn from_url(url: &str) -> Self {
        if url.starts_with("data:") {
            ImageSource::DataUri {
                uri: url.to_string(),
            }
        } else {
            ImageSource::Remote {
                uri: url.to_string(),
            }
        }
    }
}

/// Splits a `data:<media-type>;base64,<payload>` URI into its media type and
/// base64 payload.
pub fn parse_data_uri(uri: &str) -> Result<(String, String)> {
    let rest = uri
        .strip_prefix("data:")
        .ok_or_else(|| SketchGenError::ImageError("not a data URI".into()))?;

    let (header, payload) = rest
        .split_once(',')
        .ok_or_else(|| SketchGenError::ImageError("data URI missing payload".into()))?;

    let media_type = header
        .strip_suffix(";base64")
        .ok_or_else(|| SketchGenError::ImageError("data URI is not base64 encoded".into()))?;

    let media_type = if media_type.is_empty() {
        "image/png".to_string()
    } else {
        media_type.to_string()
    };

    Ok((media_type, payload.to_string()))
}

/// One fragment of the prompt handed to the model client.
#[derive(Debug, Clone)]
pub enum PromptPart {
    Text(String),
    InlineImage { data: String, media_type: String },
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationRequest {
    pub image: ImageSource,
    #[serde(default)]
    pub model_id: Option<String>,
    #[serde(default)]
    pub image_id: Option<String>,
    #[serde(default)]
    pub image_description: Option<String>,
    #[serde(default)]
    pub use_component_library: bool,
}

impl GenerationRequest {
    pub fn new(image: ImageSource) -> Self {
        Self {
            image,
            model_id: None,
            image_id: None,
            image_description: None,
            use_component_library: false,
        }
    }

    pub fn with_model(mut self, model_id: impl Into<String>) -> Self {
        self.model_id = Some(model_id.into());
        self
    }

    pub fn with_image_id(mut self, image_id: impl Into<String>) -> Self {
        self.image_id = Some(image_id.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.image_description = Some(description.into());
        self
    }

    pub fn with_component_library(mut self, enabled: bool) -> Self {
        self.use_component_library = enabled;
        self
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationResponse {
    pub code: String,
    pub model: String,
    pub repair_attempted: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_data_uri() {
        let (media_type, payload) = parse_data_uri("data:image/jpeg;base64,abc123").unwrap();
        assert_eq!(media_type, "image/jpeg");
        assert_eq!(payload, "abc123");
    }

    #[test]
    fn test_parse_data_uri_defaults_media_type() {
        let (media_type, _) = parse_data_uri("data:;base64,abc123").unwrap();
        assert_eq!(media_type, "image/png");
    }

    #[test]
    fn test_parse_data_uri_rejects_plain_urls() {
        assert!(parse_data_uri("https://example.com/a.png").is_err());
        assert!(parse_data_uri("data:image/png,not-base64").is_err());
    }

    #[test]
    fn test_image_source_from_url() {
        assert!(matches!(
            ImageSource::from_url("data:image/png;base64,xyz"),
            ImageSource::DataUri { .. }
        ));
        assert!(matches!(
            ImageSource::from_url("https://example.com/shot.png"),
            ImageSource::Remote { .. }
        ));
    }
}
