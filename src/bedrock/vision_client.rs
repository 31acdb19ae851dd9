use crate::{
    codefix::ModelInvoker,
    error::{Result, SketchGenError},
    models::{parse_data_uri, ImageSource, ModelInfo, PromptPart},
};
use async_trait::async_trait;
use aws_sdk_bedrockruntime::{error::ProvideErrorMetadata, primitives::Blob, Client};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use serde_json::json;

#[derive(Clone)]
pub struct VisionClient {
    client: Client,
    http: reqwest::Client,
    max_tokens: i32,
    temperature: f32,
}

impl VisionClient {
    pub fn new(client: Client, max_tokens: i32, temperature: f32) -> Self {
        Self {
            client,
            http: reqwest::Client::new(),
            max_tokens,
            temperature,
        }
    }

    pub fn supported_models() -> Vec<ModelInfo> {
        vec![
            ModelInfo {
                id: "anthropic.claude-3-5-sonnet-20240620-v1:0".to_string(),
                name: "Claude 3.5 Sonnet".to_string(),
                provider: "Anthropic".to_string(),
                description: "Best quality for layout-faithful components".to_string(),
            },
            ModelInfo {
                id: "anthropic.claude-3-haiku-20240307-v1:0".to_string(),
                name: "Claude 3 Haiku".to_string(),
                provider: "Anthropic".to_string(),
                description: "Fastest turnaround, simpler components".to_string(),
            },
            ModelInfo {
                id: "amazon.nova-pro-v1:0".to_string(),
                name: "Amazon Nova Pro".to_string(),
                provider: "Amazon".to_string(),
                description: "Multimodal Nova model, balanced cost".to_string(),
            },
            ModelInfo {
                id: "amazon.nova-lite-v1:0".to_string(),
                name: "Amazon Nova Lite".to_string(),
                provider: "Amazon".to_string(),
                description: "Cheapest multimodal option".to_string(),
            },
        ]
    }

    /// Resolves any image reference into an inline prompt part. Bedrock only
    /// accepts embedded bytes, so remote URIs are fetched and re-encoded.
    pub async fn resolve_image(&self, source: &ImageSource) -> Result<PromptPart> {
        match source {
            ImageSource::Inline { data, media_type } => Ok(PromptPart::InlineImage {
                data: data.clone(),
                media_type: media_type.clone(),
            }),
            ImageSource::DataUri { uri } => {
                let (media_type, data) = parse_data_uri(uri)?;
                Ok(PromptPart::InlineImage { data, media_type })
            }
            ImageSource::Remote { uri } => {
                log::info!("Fetching remote image reference: {}", uri);
                let response = self
                    .http
                    .get(uri)
                    .send()
                    .await
                    .map_err(|e| SketchGenError::ImageError(e.to_string()))?;

                let media_type = response
                    .headers()
                    .get(reqwest::header::CONTENT_TYPE)
                    .and_then(|v| v.to_str().ok())
                    .map(|v| v.split(';').next().unwrap_or(v).trim().to_string())
                    .unwrap_or_else(|| "image/png".to_string());

                let bytes = response
                    .bytes()
                    .await
                    .map_err(|e| SketchGenError::ImageError(e.to_string()))?;

                Ok(PromptPart::InlineImage {
                    data: BASE64.encode(&bytes),
                    media_type,
                })
            }
        }
    }

    pub async fn generate(&self, model_id: &str, parts: &[PromptPart]) -> Result<String> {
        let request_payload = self.build_request_payload(model_id, parts)?;
        let request_json = serde_json::to_string(&request_payload)
            .map_err(|e| SketchGenError::SerializationError(e.to_string()))?;

        log::info!("Invoking model: {}", model_id);
        log::debug!("Generation request payload bytes: {}", request_json.len());

        let response = self
            .client
            .invoke_model()
            .model_id(model_id)
            .content_type("application/json")
            .accept("application/json")
            .body(Blob::new(request_json.into_bytes()))
            .send()
            .await
            .map_err(|e| {
                log::error!("AWS SDK generation error details: {:?}", e);

                if let Some(service_error) = e.as_service_error() {
                    SketchGenError::AwsServiceError(format!(
                        "Bedrock service error: {} - {}",
                        service_error.code().unwrap_or("unknown"),
                        service_error.message().unwrap_or("no message")
                    ))
                } else {
                    SketchGenError::AwsError(format!("AWS SDK error: {}", e))
                }
            })?;

        let response_bytes = response.body.into_inner();
        let response_str = String::from_utf8(response_bytes)
            .map_err(|e| SketchGenError::ResponseError(e.to_string()))?;

        Ok(extract_completion_text(&response_str, model_id))
    }

    fn build_request_payload(
        &self,
        model_id: &str,
        parts: &[PromptPart],
    ) -> Result<serde_json::Value> {
        let payload = match model_id {
            id if id.starts_with("anthropic.claude") || id.starts_with("arn:aws:bedrock") => {
                let content: Vec<serde_json::Value> = parts
                    .iter()
                    .map(|part| match part {
                        PromptPart::Text(text) => json!({
                            "type": "text",
                            "text": text
                        }),
                        PromptPart::InlineImage { data, media_type } => json!({
                            "type": "image",
                            "source": {
                                "type": "base64",
                                "media_type": media_type,
                                "data": data
                            }
                        }),
                    })
                    .collect();

                json!({
                    "messages": [
                        {
                            "role": "user",
                            "content": content
                        }
                    ],
                    "max_tokens": self.max_tokens,
                    "temperature": self.temperature,
                    "anthropic_version": "bedrock-2023-05-31"
                })
            }
            id if id.starts_with("amazon.nova") => {
                let content: Vec<serde_json::Value> = parts
                    .iter()
                    .map(|part| match part {
                        PromptPart::Text(text) => json!({ "text": text }),
                        PromptPart::InlineImage { data, media_type } => json!({
                            "image": {
                                "format": nova_image_format(media_type),
                                "source": { "bytes": data }
                            }
                        }),
                    })
                    .collect();

                json!({
                    "messages": [
                        {
                            "role": "user",
                            "content": content
                        }
                    ],
                    "inferenceConfig": {
                        "maxTokens": self.max_tokens,
                        "temperature": self.temperature
                    }
                })
            }
            _ => {
                return Err(SketchGenError::RequestError(format!(
                    "Unsupported model ID: {}",
                    model_id
                )))
            }
        };

        Ok(payload)
    }
}

#[async_trait]
impl ModelInvoker for VisionClient {
    async fn generate(&self, model_id: &str, parts: Vec<PromptPart>) -> Result<String> {
        VisionClient::generate(self, model_id, &parts).await
    }
}

fn nova_image_format(media_type: &str) -> &'static str {
    match media_type {
        "image/jpeg" | "image/jpg" => "jpeg",
        "image/webp" => "webp",
        "image/gif" => "gif",
        _ => "png",
    }
}

/// Pulls the completion text out of a provider response body. Unexpected
/// shapes degrade to an empty string instead of an error; the sanitation
/// pipeline downstream copes with garbage better than the handler copes with
/// a panic.
fn extract_completion_text(response_str: &str, model_id: &str) -> String {
    let json: serde_json::Value = match serde_json::from_str(response_str) {
        Ok(json) => json,
        Err(_) => {
            log::warn!("model response was not JSON; passing body through as text");
            return response_str.to_string();
        }
    };

    let text = match model_id {
        id if id.starts_with("amazon.nova") => json["output"]["message"]["content"]
            .as_array()
            .map(|blocks| {
                blocks
                    .iter()
                    .filter_map(|block| block["text"].as_str())
                    .collect::<Vec<_>>()
                    .join("")
            })
            .unwrap_or_default(),
        _ => json["content"]
            .as_array()
            .map(|blocks| {
                blocks
                    .iter()
                    .filter_map(|block| block["text"].as_str())
                    .collect::<Vec<_>>()
                    .join("")
            })
            .unwrap_or_else(|| json["completion"].as_str().unwrap_or("").to_string()),
    };

    if text.is_empty() {
        log::warn!("model response for {} had no extractable text", model_id);
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_anthropic_completion() {
        let body = r#"{"content":[{"type":"text","text":"const a = 1;"}],"stop_reason":"end_turn"}"#;
        assert_eq!(
            extract_completion_text(body, "anthropic.claude-3-haiku-20240307-v1:0"),
            "const a = 1;"
        );
    }

    #[test]
    fn test_extract_nova_completion() {
        let body = r#"{"output":{"message":{"content":[{"text":"<div/>"}]}}}"#;
        assert_eq!(extract_completion_text(body, "amazon.nova-lite-v1:0"), "<div/>");
    }

    #[test]
    fn test_unexpected_shape_degrades_to_empty() {
        assert_eq!(
            extract_completion_text(r#"{"surprise":true}"#, "anthropic.claude-3"),
            ""
        );
    }

    #[test]
    fn test_non_json_body_passes_through() {
        assert_eq!(extract_completion_text("plain text", "anthropic.claude-3"), "plain text");
    }

    #[test]
    fn test_nova_image_format_mapping() {
        assert_eq!(nova_image_format("image/jpeg"), "jpeg");
        assert_eq!(nova_image_format("image/png"), "png");
        assert_eq!(nova_image_format("application/octet-stream"), "png");
    }
}
